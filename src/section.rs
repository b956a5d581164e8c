//! # Section Assembler
//!
//! Walks classified lines in order and groups them into labeled sections,
//! emitting the finished document.
//!
//! A header line - a bracketed or colon-suffixed section keyword such as
//! `[Chorus]` or `Verse 2:`, in English or one of the localized keyword
//! tables - closes the current section (when it has content) and opens a
//! new one. Non-header lines append to the current section, implicitly
//! opening a default verse when nothing is open yet. A chord line
//! immediately followed by a lyric line becomes one aligned line; a chord
//! line with nothing beneath it becomes a line of chord-only words so no
//! detected chord is lost.
//!
//! Bracketed chords like `[Am]` never open a section: only known keywords
//! do.

use tracing::debug;

use crate::align;
use crate::chord;
use crate::classify;
use crate::options::ReconstructOptions;
use crate::sheet::{ChordSheet, Line, Section, SectionKind, Word};

/// Localized header keywords, lowercased. English plus the Spanish, German,
/// French, Italian, Portuguese and Russian spellings seen in scraped tabs.
const VERSE_WORDS: &[&str] = &[
    "verse", "verso", "strophe", "couplet", "strofa", "estrofe", "куплет",
];
const CHORUS_WORDS: &[&str] = &[
    "chorus",
    "coro",
    "estribillo",
    "refrain",
    "refrão",
    "ritornello",
    "припев",
];
const BRIDGE_WORDS: &[&str] = &["bridge", "puente", "brücke", "pont", "ponte", "бридж"];
const INTRO_WORDS: &[&str] = &["intro", "introduction", "вступление"];
const OUTRO_WORDS: &[&str] = &["outro", "coda", "final", "кода"];

/// Assemble a document from newline-delimited text.
pub fn assemble(text: &str, options: &ReconstructOptions) -> ChordSheet {
    let lines: Vec<String> = text.lines().map(classify::strip_markup).collect();

    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;
    let mut next_id = 1usize;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim_end();
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        if let Some((kind, label)) = detect_header(line) {
            close_section(&mut sections, current.take());
            current = Some(new_section(&mut next_id, kind, label));
            i += 1;
            continue;
        }

        let section = current.get_or_insert_with(|| {
            new_section(&mut next_id, SectionKind::Verse, "Verse".to_string())
        });

        if classify::is_chord_line(line, options) {
            let next = lines.get(i + 1).map(|l| l.trim_end());
            let lyric_follows = next.is_some_and(|l| {
                !l.trim().is_empty() && detect_header(l).is_none() && !classify::is_chord_line(l, options)
            });
            if let (true, Some(lyric)) = (lyric_follows, next) {
                section.lines.push(Line::new(align::align(line, lyric, options)));
                i += 2;
            } else {
                section.lines.push(chord_only_line(line));
                i += 1;
            }
        } else {
            let words = line.split_whitespace().map(Word::plain).collect();
            section.lines.push(Line::new(words));
            i += 1;
        }
    }
    close_section(&mut sections, current.take());

    let language = detect_language(&sections);
    debug!(sections = sections.len(), %language, "assembled document");

    ChordSheet {
        language,
        sections,
        ..ChordSheet::default()
    }
}

fn new_section(next_id: &mut usize, kind: SectionKind, label: String) -> Section {
    let section = Section {
        id: format!("section-{}", next_id),
        kind,
        label,
        lines: Vec::new(),
    };
    *next_id += 1;
    section
}

/// A section only makes it into the document with at least one line.
fn close_section(sections: &mut Vec<Section>, section: Option<Section>) {
    if let Some(section) = section {
        if !section.lines.is_empty() {
            sections.push(section);
        }
    }
}

/// Recognize a section header and derive its kind and human label.
///
/// Accepts `[Chorus]`, `Chorus:`, `[Verse 2]`, `Verso 1:` and the like. The
/// keyword may carry a trailing number; anything else inside the brackets
/// disqualifies the line, so a bracketed chord is not a header.
pub fn detect_header(line: &str) -> Option<(SectionKind, String)> {
    let trimmed = line.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix('[') {
        rest.strip_suffix(']').unwrap_or(rest)
    } else if let Some(rest) = trimmed.strip_suffix(':') {
        rest
    } else {
        return None;
    };

    let inner = inner.trim();
    let mut parts = inner.split_whitespace();
    let keyword = parts.next()?.to_lowercase();
    let rest: Vec<&str> = parts.collect();
    // Only a section number may follow the keyword.
    if rest.len() > 1 || rest.iter().any(|p| !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let kind = if VERSE_WORDS.contains(&keyword.as_str()) {
        SectionKind::Verse
    } else if CHORUS_WORDS.contains(&keyword.as_str()) {
        SectionKind::Chorus
    } else if BRIDGE_WORDS.contains(&keyword.as_str()) {
        SectionKind::Bridge
    } else if INTRO_WORDS.contains(&keyword.as_str()) {
        SectionKind::Intro
    } else if OUTRO_WORDS.contains(&keyword.as_str()) {
        SectionKind::Outro
    } else {
        return None;
    };

    Some((kind, inner.to_string()))
}

/// A chord line with no lyric line beneath it: every chord becomes a word
/// with empty lyric text.
fn chord_only_line(chord_line: &str) -> Line {
    let words = align::spans(&align::normalize(chord_line))
        .into_iter()
        .filter_map(|span| chord::parse_lenient(&span.text))
        .map(|token| Word::with_chord("", token))
        .collect();
    Line::new(words)
}

/// Dominant-script language guess over the document's lyric text. Fills the
/// document's language field; nothing more.
fn detect_language(sections: &[Section]) -> String {
    let mut hebrew = 0usize;
    let mut arabic = 0usize;
    let mut cyrillic = 0usize;
    let mut latin = 0usize;

    for c in sections
        .iter()
        .flat_map(|s| &s.lines)
        .flat_map(|l| &l.words)
        .flat_map(|w| w.text.chars())
    {
        match c as u32 {
            0x0590..=0x05FF => hebrew += 1,
            0x0600..=0x06FF | 0x0750..=0x077F => arabic += 1,
            0x0400..=0x04FF => cyrillic += 1,
            _ if c.is_ascii_alphabetic() => latin += 1,
            _ => {}
        }
    }

    let top = hebrew.max(arabic).max(cyrillic).max(latin);
    if top == 0 || top == latin {
        "en".to_string()
    } else if top == hebrew {
        "he".to_string()
    } else if top == arabic {
        "ar".to_string()
    } else {
        "ru".to_string()
    }
}
