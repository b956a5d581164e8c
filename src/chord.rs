//! # Chord Model
//!
//! This module defines the chord grammar, its parser, canonical serializer,
//! and semitone transposer.
//!
//! ## Type Hierarchy
//! ```text
//! ChordToken (enum)
//!   ├── Parsed(Chord)     structured chord
//!   │     ├── root: NoteLetter (A-G)
//!   │     ├── accidental: Option<Accidental> (#, b)
//!   │     ├── quality: Quality (major/minor/dim/aug/sus2/sus4)
//!   │     ├── extension: Option<u8> ({5,6,7,9,11,13})
//!   │     ├── add: Option<u8> ({2,4,6,9})
//!   │     ├── bass: Option<NoteLetter> (slash chord, letter only)
//!   │     └── explicit_major: bool ("Cmaj7" vs "C7", "Cmmaj7")
//!   ├── NoChord           "N.C."
//!   ├── Muted             "x"
//!   └── Raw(String)       unparsed legacy string
//! ```
//!
//! ## Parsing
//!
//! Two named entry points share the same grammar:
//! - [`parse`] - strict; accepts exactly the grammar, returns `None` for
//!   anything else. `to_string()` of the result reproduces the canonical
//!   spelling, so `parse` followed by serialization is idempotent.
//! - [`parse_lenient`] - rewrites common OCR-garbled substrings (Unicode
//!   accidental glyphs, spelled-out "minor", the truncated "di" of "dim")
//!   and then runs the strict parse.
//!
//! Parsing never panics and never returns an error: an ungrammatical chord
//! is `None`, and the caller decides whether absence matters.
//!
//! ## Related Modules
//! - `classify` - uses the lenient grammar to recognize chord lines
//! - `align` - attaches parsed chords to lyric words
//! - `transpose` - maps whole documents through [`transpose`]

use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Canonical spelling of the no-chord marker.
pub const NO_CHORD: &str = "N.C.";
/// Canonical spelling of the muted-strum marker.
pub const MUTED: &str = "x";

/// Extensions the grammar accepts (anything else fails the parse).
const EXTENSIONS: [u32; 6] = [5, 6, 7, 9, 11, 13];
/// Added tones the grammar accepts.
const ADDED_TONES: [u32; 4] = [2, 4, 6, 9];

/// Note letters A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteLetter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NoteLetter {
    /// Parse a single uppercase letter.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(NoteLetter::A),
            'B' => Some(NoteLetter::B),
            'C' => Some(NoteLetter::C),
            'D' => Some(NoteLetter::D),
            'E' => Some(NoteLetter::E),
            'F' => Some(NoteLetter::F),
            'G' => Some(NoteLetter::G),
            _ => None,
        }
    }

    fn as_char(&self) -> char {
        match self {
            NoteLetter::A => 'A',
            NoteLetter::B => 'B',
            NoteLetter::C => 'C',
            NoteLetter::D => 'D',
            NoteLetter::E => 'E',
            NoteLetter::F => 'F',
            NoteLetter::G => 'G',
        }
    }
}

/// Sharp or flat. A natural root simply carries no accidental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    Sharp, // #
    Flat,  // b
}

/// Chord quality. Major is the default when nothing is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
}

/// A structured chord symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub root: NoteLetter,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub accidental: Option<Accidental>,
    #[serde(default)]
    pub quality: Quality,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extension: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub add: Option<u8>,
    /// Bass note of a slash chord. Only the letter is kept; an accidental
    /// written on the bass note is dropped by the parser.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bass: Option<NoteLetter>,
    /// True when "maj" was written out, distinguishing "Cmaj7" from "C7"
    /// and marking the minor-major case "Cmmaj7".
    #[serde(default)]
    pub explicit_major: bool,
}

impl Chord {
    /// A bare major triad on the given root.
    pub fn major(root: NoteLetter) -> Self {
        Self {
            root,
            accidental: None,
            quality: Quality::Major,
            extension: None,
            add: None,
            bass: None,
            explicit_major: false,
        }
    }
}

/// A chord slot as it appears in a document: a structured chord, one of the
/// two special markers, or a legacy string that was never parsed.
///
/// The JSON encoding follows the document contract: `Parsed` serializes as
/// an object, everything else as a short string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordToken {
    Parsed(Chord),
    NoChord,
    Muted,
    Raw(String),
}

impl Serialize for ChordToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChordToken::Parsed(chord) => chord.serialize(serializer),
            ChordToken::NoChord => serializer.serialize_str(NO_CHORD),
            ChordToken::Muted => serializer.serialize_str(MUTED),
            ChordToken::Raw(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for ChordToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Object(Chord),
            Text(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Object(chord) => ChordToken::Parsed(chord),
            Repr::Text(text) if text == NO_CHORD => ChordToken::NoChord,
            Repr::Text(text) if text == MUTED => ChordToken::Muted,
            Repr::Text(text) => ChordToken::Raw(text),
        })
    }
}

/// Strict parse of a chord symbol. Returns `None` for anything the grammar
/// does not accept, never a best-guess approximation.
pub fn parse(text: &str) -> Option<ChordToken> {
    if is_no_chord(text) {
        return Some(ChordToken::NoChord);
    }
    if text == "x" || text == "X" {
        return Some(ChordToken::Muted);
    }

    let mut rest = text;

    // Root note is mandatory; fail fast without one.
    let root = NoteLetter::from_char(rest.chars().next()?)?;
    rest = &rest[1..];

    // Accidental detection is context-sensitive: a 'b' here is a flat only
    // when it is not the start of a quality word.
    let accidental = if let Some(r) = rest.strip_prefix('#') {
        rest = r;
        Some(Accidental::Sharp)
    } else if rest.starts_with('b') && !starts_quality_word(rest) {
        rest = &rest[1..];
        Some(Accidental::Flat)
    } else {
        None
    };

    // Quality detection order matters: dim before maj before m, so that
    // "dim" is not read as a bare 'd' failure and "maj" is not read as
    // minor + "aj".
    let mut explicit_major = false;
    let quality = if let Some(r) = rest.strip_prefix("dim") {
        rest = r;
        Quality::Diminished
    } else if let Some(r) = rest.strip_prefix("maj") {
        rest = r;
        explicit_major = true;
        Quality::Major
    } else if let Some(r) = rest.strip_prefix('m') {
        rest = r;
        // Minor-major chords: a minor triad carrying a major extension.
        if let Some(r) = rest.strip_prefix("maj") {
            rest = r;
            explicit_major = true;
        }
        Quality::Minor
    } else if let Some(r) = rest.strip_prefix("aug") {
        rest = r;
        Quality::Augmented
    } else if let Some(r) = rest.strip_prefix("sus") {
        rest = r;
        if let Some(r) = rest.strip_prefix('2') {
            rest = r;
            Quality::Sus2
        } else if let Some(r) = rest.strip_prefix('4') {
            rest = r;
            Quality::Sus4
        } else {
            // Bare "sus" defaults to sus4.
            Quality::Sus4
        }
    } else {
        Quality::Major
    };

    // Remaining digits become the extension, restricted to the known set.
    let extension = match take_digits(&mut rest) {
        Some(n) if EXTENSIONS.contains(&n) => Some(n as u8),
        Some(_) => return None,
        None => None,
    };

    let add = if let Some(r) = rest.strip_prefix("add") {
        rest = r;
        match take_digits(&mut rest) {
            Some(n) if ADDED_TONES.contains(&n) => Some(n as u8),
            _ => return None,
        }
    } else {
        None
    };

    let bass = if let Some(r) = rest.strip_prefix('/') {
        rest = r;
        let letter = NoteLetter::from_char(rest.chars().next()?)?;
        rest = &rest[1..];
        // An accidental on the bass note is consumed and dropped.
        if let Some(r) = rest.strip_prefix(['#', 'b']) {
            rest = r;
        }
        Some(letter)
    } else {
        None
    };

    if !rest.is_empty() {
        return None;
    }

    Some(ChordToken::Parsed(Chord {
        root,
        accidental,
        quality,
        extension,
        add,
        bass,
        explicit_major,
    }))
}

/// Lenient parse: repair common OCR-garbled spellings, then run the strict
/// grammar. The repairs are a separate pre-pass so the strict path stays
/// exactly round-trippable.
pub fn parse_lenient(text: &str) -> Option<ChordToken> {
    parse(&repair(text))
}

/// Rewrites applied before a lenient parse.
fn repair(text: &str) -> String {
    let mut fixed = text.trim().replace('♯', "#").replace('♭', "b");
    if fixed.contains("minor") {
        fixed = fixed.replace("minor", "m");
    } else if fixed.contains("Minor") {
        fixed = fixed.replace("Minor", "m");
    }
    // OCR often truncates "dim" to "di".
    if fixed.ends_with("di") {
        fixed.push('m');
    }
    fixed
}

fn is_no_chord(text: &str) -> bool {
    matches!(text.to_ascii_uppercase().as_str(), "N.C." | "N.C" | "NC")
}

fn starts_quality_word(s: &str) -> bool {
    s.starts_with("maj") || s.starts_with("dim") || s.starts_with("aug")
}

/// Consume leading ASCII digits from `rest` and parse them as a number.
/// An absurdly long digit run parses as `u32::MAX`, which no restriction
/// set contains, so the caller rejects it.
fn take_digits(rest: &mut &str) -> Option<u32> {
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let digits = &rest[..end];
    *rest = &rest[end..];
    Some(digits.parse().unwrap_or(u32::MAX))
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.as_char())?;
        match self.accidental {
            Some(Accidental::Sharp) => write!(f, "#")?,
            Some(Accidental::Flat) => write!(f, "b")?,
            None => {}
        }
        match self.quality {
            // Major is spelled out only when explicitly written with an
            // extension ("Cmaj7"); a bare explicit "Cmaj" canonicalizes
            // to "C".
            Quality::Major => {
                if self.explicit_major && self.extension.is_some() {
                    write!(f, "maj")?;
                }
            }
            Quality::Minor => {
                write!(f, "m")?;
                if self.explicit_major && self.extension.is_some() {
                    write!(f, "maj")?;
                }
            }
            Quality::Diminished => write!(f, "dim")?,
            Quality::Augmented => write!(f, "aug")?,
            Quality::Sus2 => write!(f, "sus2")?,
            Quality::Sus4 => write!(f, "sus4")?,
        }
        if let Some(ext) = self.extension {
            write!(f, "{}", ext)?;
        }
        if let Some(add) = self.add {
            write!(f, "add{}", add)?;
        }
        if let Some(bass) = self.bass {
            write!(f, "/{}", bass.as_char())?;
        }
        Ok(())
    }
}

impl fmt::Display for ChordToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChordToken::Parsed(chord) => chord.fmt(f),
            ChordToken::NoChord => write!(f, "{}", NO_CHORD),
            ChordToken::Muted => write!(f, "{}", MUTED),
            ChordToken::Raw(text) => write!(f, "{}", text),
        }
    }
}

/// Pitch class (0-11, C = 0) of a letter with an optional accidental.
fn pitch_class(letter: NoteLetter, accidental: Option<Accidental>) -> i32 {
    let base: i32 = match letter {
        NoteLetter::C => 0,
        NoteLetter::D => 2,
        NoteLetter::E => 4,
        NoteLetter::F => 5,
        NoteLetter::G => 7,
        NoteLetter::A => 9,
        NoteLetter::B => 11,
    };
    let offset = match accidental {
        Some(Accidental::Sharp) => 1,
        Some(Accidental::Flat) => -1,
        None => 0,
    };
    (base + offset).rem_euclid(12)
}

/// Map a pitch class back to a spelling. Fixed preference table, no double
/// accidentals: sharps for C#/F#/G#, flats for Eb/Bb.
fn spell_pitch_class(pc: i32) -> (NoteLetter, Option<Accidental>) {
    match pc.rem_euclid(12) {
        0 => (NoteLetter::C, None),
        1 => (NoteLetter::C, Some(Accidental::Sharp)),
        2 => (NoteLetter::D, None),
        3 => (NoteLetter::E, Some(Accidental::Flat)),
        4 => (NoteLetter::E, None),
        5 => (NoteLetter::F, None),
        6 => (NoteLetter::F, Some(Accidental::Sharp)),
        7 => (NoteLetter::G, None),
        8 => (NoteLetter::G, Some(Accidental::Sharp)),
        9 => (NoteLetter::A, None),
        10 => (NoteLetter::B, Some(Accidental::Flat)),
        11 => (NoteLetter::B, None),
        _ => unreachable!(),
    }
}

/// Transpose a chord token by the given number of semitones.
///
/// The root (and the bass letter of a slash chord) move through the
/// pitch-class circle and come back spelled by the preference table.
/// Special markers and raw strings pass through unchanged, as does any
/// chord when the effective shift is zero.
pub fn transpose(token: &ChordToken, semitones: i32) -> ChordToken {
    let shift = semitones.rem_euclid(12);
    if shift == 0 {
        return token.clone();
    }
    match token {
        ChordToken::Parsed(chord) => {
            let (root, accidental) =
                spell_pitch_class(pitch_class(chord.root, chord.accidental) + shift);
            // The bass slot keeps only a letter, so the table's accidental
            // is dropped the same way the parser drops a written one.
            let bass = chord
                .bass
                .map(|b| spell_pitch_class(pitch_class(b, None) + shift).0);
            ChordToken::Parsed(Chord {
                root,
                accidental,
                bass,
                ..chord.clone()
            })
        }
        other => other.clone(),
    }
}
