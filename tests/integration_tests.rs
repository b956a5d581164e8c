//! Integration tests for the chordsheet pipeline
//!
//! Tests the full reconstruction path from raw text or positioned OCR
//! tokens to the finished document.

use chordsheet::{
    reconstruct, reconstruct_tokens, reconstruct_with_options, transpose_sheet, ChordSheet,
    PositionedToken, ReconstructOptions, SectionKind, SheetError, Word,
};

fn chord_names(words: &[Word]) -> Vec<Option<String>> {
    words
        .iter()
        .map(|w| w.chord.as_ref().map(|c| c.to_string()))
        .collect()
}

#[test]
fn test_section_boundaries() {
    let sheet = reconstruct("[Verse]\nA B\nwords\n[Chorus]\nC D\nmore");
    assert_eq!(sheet.sections.len(), 2, "expected exactly two sections");
    assert_eq!(sheet.sections[0].kind, SectionKind::Verse);
    assert_eq!(sheet.sections[1].kind, SectionKind::Chorus);
    assert_eq!(sheet.sections[0].lines.len(), 1);
    assert_eq!(sheet.sections[1].lines.len(), 1);
}

#[test]
fn test_chord_lyric_alignment() {
    let sheet = reconstruct("C       Am      F\nHello   my      friend");
    assert_eq!(sheet.sections.len(), 1);
    let words = &sheet.sections[0].lines[0].words;
    assert_eq!(words[0].text, "Hello");
    assert_eq!(words[1].text, "my");
    assert_eq!(words[2].text, "friend");
    assert_eq!(
        chord_names(words),
        vec![
            Some("C".to_string()),
            Some("Am".to_string()),
            Some("F".to_string())
        ]
    );
}

#[test]
fn test_empty_input_yields_empty_document() {
    assert!(reconstruct("").sections.is_empty());
    assert!(reconstruct("   \n\n  ").sections.is_empty());

    let empty = reconstruct_tokens(&[], &ReconstructOptions::default()).unwrap();
    assert!(empty.sections.is_empty());
}

#[test]
fn test_ocr_token_path() {
    let block = vec![
        PositionedToken::new("C", 0.0, 0.0, 10.0, 10.0, 95.0),
        PositionedToken::new("Am", 80.0, 0.0, 20.0, 10.0, 88.0),
        PositionedToken::new("Hello", 0.0, 20.0, 50.0, 10.0, 92.0),
        PositionedToken::new("my", 80.0, 20.0, 20.0, 10.0, 90.0),
    ];
    let sheet = reconstruct_tokens(&[block], &ReconstructOptions::default()).unwrap();
    assert_eq!(sheet.sections.len(), 1);
    let words = &sheet.sections[0].lines[0].words;
    assert_eq!(words[0].text, "Hello");
    assert_eq!(
        chord_names(words),
        vec![Some("C".to_string()), Some("Am".to_string())]
    );
}

#[test]
fn test_ocr_blocks_stay_independent() {
    let left = vec![
        PositionedToken::new("C", 0.0, 0.0, 10.0, 10.0, 95.0),
        PositionedToken::new("Hello", 0.0, 20.0, 50.0, 10.0, 92.0),
    ];
    let right = vec![
        PositionedToken::new("G", 400.0, 0.0, 10.0, 10.0, 95.0),
        PositionedToken::new("world", 400.0, 20.0, 50.0, 10.0, 92.0),
    ];
    let sheet = reconstruct_tokens(&[left, right], &ReconstructOptions::default()).unwrap();
    assert_eq!(sheet.sections.len(), 1);
    assert_eq!(sheet.sections[0].lines.len(), 2);
    let first = &sheet.sections[0].lines[0].words;
    let second = &sheet.sections[0].lines[1].words;
    assert_eq!(chord_names(first), vec![Some("C".to_string())]);
    assert_eq!(second[0].text, "world");
    assert_eq!(chord_names(second), vec![Some("G".to_string())]);
}

#[test]
fn test_malformed_token_shape_is_an_error() {
    let bad = vec![vec![PositionedToken::new("C", f32::NAN, 0.0, 8.0, 10.0, 90.0)]];
    match reconstruct_tokens(&bad, &ReconstructOptions::default()) {
        Err(SheetError::InvalidToken { index: 0, .. }) => {}
        other => panic!("expected an invalid-token error, got {:?}", other),
    }
}

#[test]
fn test_bracket_markup_is_stripped() {
    let sheet = reconstruct("[tab][ch]C[/ch] [ch]Am[/ch] [ch]F[/ch]\nHello my friend[/tab]");
    let words = &sheet.sections[0].lines[0].words;
    assert_eq!(words.len(), 3);
    assert_eq!(
        chord_names(words),
        vec![
            Some("C".to_string()),
            Some("Am".to_string()),
            Some("F".to_string())
        ]
    );
}

#[test]
fn test_unterminated_markup_drops_no_line() {
    let sheet = reconstruct("[ch]C [ch]Am\nHello my");
    assert_eq!(sheet.sections.len(), 1);
    let words = &sheet.sections[0].lines[0].words;
    assert_eq!(words[0].text, "Hello");
    assert_eq!(
        chord_names(words),
        vec![Some("C".to_string()), Some("Am".to_string())]
    );
}

#[test]
fn test_rtl_document() {
    let sheet = reconstruct("C   Am\n\u{5d0}\u{5d1}\u{5d2} \u{5d3}\u{5d4}\u{5d5}");
    assert_eq!(sheet.language, "he");
    let words = &sheet.sections[0].lines[0].words;
    // The first buffer word renders at the right edge, so the left-edge
    // chord belongs to the second buffer word.
    assert_eq!(
        chord_names(words),
        vec![Some("Am".to_string()), Some("C".to_string())]
    );
}

#[test]
fn test_document_transposition() {
    let sheet = reconstruct("[Chorus]\nC       Am\nHello   my");
    let up = transpose_sheet(&sheet, 2);
    let words = &up.sections[0].lines[0].words;
    assert_eq!(
        chord_names(words),
        vec![Some("D".to_string()), Some("Bm".to_string())]
    );
    // Transposing back recovers the original document.
    assert_eq!(transpose_sheet(&up, -2), sheet);
}

#[test]
fn test_document_json_round_trip() {
    let sheet = reconstruct("[Verse]\nC       N.C.\nHello   friend\nplain lyrics");
    let json = serde_json::to_string(&sheet).unwrap();
    let back: ChordSheet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, sheet);

    let value = serde_json::to_value(&sheet).unwrap();
    let words = &value["sections"][0]["lines"][0]["words"];
    assert!(words[0]["chord"].is_object(), "structured chord is an object");
    assert_eq!(words[1]["chord"], "N.C.", "marker is a short string");
}

#[test]
fn test_classifier_tuning_is_respected() {
    let text = "Stop    C  G\nHello   my friend";
    let defaults = reconstruct(text);
    // 2 of 3 tokens parse: a chord line under the default ratio.
    assert!(defaults.sections[0].lines[0]
        .words
        .iter()
        .any(|w| w.chord.is_some()));

    let strict = ReconstructOptions {
        chord_line_ratio: 0.8,
        chord_line_max_misses: 0,
        ..ReconstructOptions::default()
    };
    let sheet = reconstruct_with_options(text, &strict);
    // Both lines now read as lyrics.
    assert_eq!(sheet.sections[0].lines.len(), 2);
    assert!(sheet.sections[0]
        .lines
        .iter()
        .all(|l| l.words.iter().all(|w| w.chord.is_none())));
}

#[test]
fn test_trailing_chord_line_is_kept() {
    let sheet = reconstruct("[Outro]\nC  G  Am");
    assert_eq!(sheet.sections[0].kind, SectionKind::Outro);
    let words = &sheet.sections[0].lines[0].words;
    assert_eq!(words.len(), 3);
    assert!(words.iter().all(|w| w.text.is_empty() && w.chord.is_some()));
}
