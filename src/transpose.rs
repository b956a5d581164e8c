//! # Document Transposition
//!
//! Maps every chord in a finished document through the chord transposer,
//! producing a new document. The key field moves with the chords when it
//! parses as one; special markers, raw strings and unparseable keys pass
//! through unchanged.

use crate::chord;
use crate::sheet::{ChordSheet, Line, Section, Word};

/// Transpose a whole chord sheet by the given number of semitones.
pub fn transpose_sheet(sheet: &ChordSheet, semitones: i32) -> ChordSheet {
    if semitones.rem_euclid(12) == 0 {
        return sheet.clone();
    }

    let sections = sheet
        .sections
        .iter()
        .map(|section| Section {
            id: section.id.clone(),
            kind: section.kind,
            label: section.label.clone(),
            lines: section.lines.iter().map(|l| transpose_line(l, semitones)).collect(),
        })
        .collect();

    let key = sheet.key.as_ref().map(|key| {
        match chord::parse(key) {
            Some(token) => chord::transpose(&token, semitones).to_string(),
            None => key.clone(),
        }
    });

    ChordSheet {
        key,
        sections,
        ..sheet.clone()
    }
}

fn transpose_line(line: &Line, semitones: i32) -> Line {
    Line::new(
        line.words
            .iter()
            .map(|word| Word {
                text: word.text.clone(),
                chord: word
                    .chord
                    .as_ref()
                    .map(|token| chord::transpose(token, semitones)),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::ChordToken;
    use crate::sheet::SectionKind;

    fn sheet_in_c() -> ChordSheet {
        ChordSheet {
            key: Some("C".to_string()),
            sections: vec![Section {
                id: "section-1".to_string(),
                kind: SectionKind::Verse,
                label: "Verse".to_string(),
                lines: vec![Line::new(vec![
                    Word::with_chord("Hello", chord::parse("C").unwrap()),
                    Word::with_chord("my", chord::parse("Am7").unwrap()),
                    Word::plain("dear"),
                    Word::with_chord("friend", ChordToken::NoChord),
                ])],
            }],
            ..ChordSheet::default()
        }
    }

    fn chords_of(sheet: &ChordSheet) -> Vec<String> {
        sheet.sections[0].lines[0]
            .words
            .iter()
            .filter_map(|w| w.chord.as_ref().map(|c| c.to_string()))
            .collect()
    }

    #[test]
    fn test_transpose_whole_sheet() {
        let up = transpose_sheet(&sheet_in_c(), 2);
        assert_eq!(up.key.as_deref(), Some("D"));
        assert_eq!(chords_of(&up), vec!["D", "Bm7", "N.C."]);
        // Lyrics and chordless words are untouched.
        assert_eq!(up.sections[0].lines[0].words[2].text, "dear");
        assert!(up.sections[0].lines[0].words[2].chord.is_none());
    }

    #[test]
    fn test_zero_shift_is_identity() {
        let sheet = sheet_in_c();
        assert_eq!(transpose_sheet(&sheet, 0), sheet);
        assert_eq!(transpose_sheet(&sheet, 12), sheet);
    }

    #[test]
    fn test_unparseable_key_is_kept() {
        let mut sheet = sheet_in_c();
        sheet.key = Some("Q major".to_string());
        let up = transpose_sheet(&sheet, 3);
        assert_eq!(up.key.as_deref(), Some("Q major"));
    }
}
