//! # Document Model
//!
//! This module defines the structured chord-sheet document emitted by the
//! pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! ChordSheet
//!   ├── title / artist / language
//!   ├── key, tempo, capo (optional)
//!   └── Vec<Section>
//!         ├── id: generated, sequential
//!         ├── kind: SectionKind (verse/chorus/bridge/intro/outro)
//!         ├── label: human text from the matched header
//!         └── Vec<Line>
//!               └── Vec<Word>
//!                     ├── text: lyric token (may be empty on chord-only lines)
//!                     └── chord: Option<ChordToken>
//! ```
//!
//! Lines are direction-agnostic: a right-to-left lyric keeps its words in
//! buffer order and rendering direction stays a presentation concern.
//!
//! The whole hierarchy round-trips losslessly through JSON; the chord slot
//! uses the object-vs-short-string encoding from the `chord` module.

use serde::{Deserialize, Serialize};

use crate::chord::ChordToken;

/// A lyric token with an optional chord drawn above or adjacent to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chord: Option<ChordToken>,
}

impl Word {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chord: None,
        }
    }

    pub fn with_chord(text: impl Into<String>, chord: ChordToken) -> Self {
        Self {
            text: text.into(),
            chord: Some(chord),
        }
    }
}

/// An ordered sequence of words.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    pub words: Vec<Word>,
}

impl Line {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }
}

/// Semantic section types recognized by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    #[default]
    Verse,
    Chorus,
    Bridge,
    Intro,
    Outro,
}

/// A labeled run of lines. Sections keep the order they were encountered in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub kind: SectionKind,
    pub label: String,
    pub lines: Vec<Line>,
}

/// The finished document: immutable output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChordSheet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    /// ISO-style language guess from a dominant-script scan of the lyrics.
    #[serde(default)]
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tempo: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub capo: Option<u8>,
    pub sections: Vec<Section>,
}

impl ChordSheet {
    /// Total number of lines across all sections.
    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord;
    use pretty_assertions::assert_eq;

    fn sample_sheet() -> ChordSheet {
        ChordSheet {
            title: "Sample".to_string(),
            artist: "Nobody".to_string(),
            language: "en".to_string(),
            key: Some("C".to_string()),
            tempo: None,
            capo: Some(2),
            sections: vec![Section {
                id: "section-1".to_string(),
                kind: SectionKind::Verse,
                label: "Verse".to_string(),
                lines: vec![Line::new(vec![
                    Word::with_chord("Hello", chord::parse("C").unwrap()),
                    Word::plain("my"),
                    Word::with_chord("friend", chord::parse("N.C.").unwrap()),
                ])],
            }],
        }
    }

    #[test]
    fn test_json_round_trip() {
        let sheet = sample_sheet();
        let json = serde_json::to_string(&sheet).unwrap();
        let back: ChordSheet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sheet);
    }

    #[test]
    fn test_json_shape() {
        let sheet = sample_sheet();
        let value = serde_json::to_value(&sheet).unwrap();
        let words = &value["sections"][0]["lines"][0]["words"];
        // Structured chord is an object, special marker is a short string,
        // a chordless word has no chord field at all.
        assert!(words[0]["chord"].is_object());
        assert!(words[1].get("chord").is_none());
        assert_eq!(words[2]["chord"], "N.C.");
        assert_eq!(value["sections"][0]["kind"], "verse");
    }

    #[test]
    fn test_line_count() {
        assert_eq!(sample_sheet().line_count(), 1);
        assert_eq!(ChordSheet::default().line_count(), 0);
    }
}
