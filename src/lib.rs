//! # Chordsheet
//!
//! Reconstructs structured chord-sheet documents from unstructured input:
//! either a raw string of chord/lyric text, or spatially-positioned OCR
//! tokens from a scanned image.
//!
//! The pipeline runs one direction: positioned tokens are rebuilt into
//! whitespace-faithful text lines (`grid`), lines are classified as chords
//! or lyrics (`classify`), chord lines are aligned word-by-word onto the
//! lyrics beneath them (`align`), and the result is grouped into labeled
//! sections (`section`). The chord grammar (`chord`) is shared by the
//! classifier, the aligner and the standalone transposer.
//!
//! Every step is pure, synchronous data transformation. Malformed content
//! never fails a run: ungrammatical chords come back as empty slots and
//! empty input yields an empty document. Only an impossible input shape
//! (a token with non-finite geometry) is an error.

pub mod align;
pub mod chord;
pub mod classify;
pub mod error;
pub mod grid;
pub mod options;
pub mod section;
pub mod sheet;
pub mod store;
pub mod transpose;

pub use chord::{Accidental, Chord, ChordToken, NoteLetter, Quality};
pub use error::SheetError;
pub use grid::PositionedToken;
pub use options::ReconstructOptions;
pub use sheet::{ChordSheet, Line, Section, SectionKind, Word};
pub use store::SheetStore;
pub use transpose::transpose_sheet;

/// Reconstruct a document from plain text with default options.
/// This is the main entry point for the library.
pub fn reconstruct(text: &str) -> ChordSheet {
    reconstruct_with_options(text, &ReconstructOptions::default())
}

/// Reconstruct a document from plain text with explicit tuning.
pub fn reconstruct_with_options(text: &str, options: &ReconstructOptions) -> ChordSheet {
    section::assemble(text, options)
}

/// Reconstruct a document from blocks of positioned OCR tokens: grid
/// reconstruction first, then the text pipeline. Fails only when a token's
/// shape is malformed.
pub fn reconstruct_tokens(
    blocks: &[Vec<PositionedToken>],
    options: &ReconstructOptions,
) -> Result<ChordSheet, SheetError> {
    let text = grid::reconstruct_blocks(blocks, options)?;
    Ok(section::assemble(&text, options))
}
