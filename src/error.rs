//! # Error Types
//!
//! This module defines all error types for the chordsheet pipeline.
//!
//! The pipeline never fails for malformed *content*: ungrammatical chords
//! parse to `None`, empty input produces a document with zero sections, and
//! unmatched alignment leaves words without chords. Errors exist only for a
//! malformed input *shape* (a positioned token with impossible geometry) and
//! for an unreadable options file.
//!
//! ## Usage
//! ```rust
//! use chordsheet::{reconstruct_tokens, PositionedToken, ReconstructOptions, SheetError};
//!
//! let bad = vec![vec![PositionedToken::new("C", f32::NAN, 0.0, 8.0, 10.0, 90.0)]];
//! match reconstruct_tokens(&bad, &ReconstructOptions::default()) {
//!     Err(SheetError::InvalidToken { index, message }) => {
//!         eprintln!("Bad token at {}: {}", index, message);
//!     }
//!     _ => unreachable!(),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    /// A positioned token from the OCR collaborator has impossible geometry.
    ///
    /// Raised before clustering when a coordinate is non-finite or an extent
    /// is negative. The index refers to the flattened token list as given.
    #[error("Invalid token at index {index}: {message}")]
    InvalidToken { index: usize, message: String },

    /// The reconstruction options file could not be parsed.
    #[error("Invalid options: {0}")]
    OptionsError(String),
}
