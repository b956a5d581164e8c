//! # Chord/Word Alignment
//!
//! Associates each chord on a chord line with the lyric word beneath it.
//!
//! ## Proportional path
//! When the chord line carries spacing information, both lines are measured
//! in character columns and every offset is normalized to [0,1] against the
//! longer of the two lines, so equal columns coincide. Each (word, chord)
//! pair is scored by how much of the chord's span the word covers and how
//! close their centers sit; candidates clearing the acceptance thresholds
//! are sorted by score and assigned greedily, each chord to at most one
//! word and each word to at most one chord. This is a deliberate heuristic,
//! not an optimal bipartite matching: the greedy order is the behavior the
//! expected fixtures pin down.
//!
//! ## Right-to-left lyrics
//! Chord symbols are always written left to right, but the lyric script
//! beneath them may read right to left. The lyric buffer keeps logical
//! order, so each word's interval is mirrored into visual space
//! (`[1-end, 1-start]`) before matching, and both candidate lists are
//! walked in visual order. Acceptance is stricter than for left-to-right
//! text.
//!
//! ## Index fallback
//! A chord line with no run of two or more spaces has lost its spacing
//! information (single-spaced pasted text). Chords then map to words by
//! token index, with a small window around the same index to tolerate
//! drift between the two lines.
//!
//! Words that no chord claims keep an empty chord slot; that is expected,
//! not an error.

use std::cmp::Ordering;

use tracing::debug;

use crate::chord::{self, ChordToken};
use crate::options::ReconstructOptions;
use crate::sheet::Word;

/// A whitespace-separated token with its character-column interval.
#[derive(Debug, Clone)]
pub(crate) struct Span {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Split a line into tokens with character-column offsets (end exclusive).
pub(crate) fn spans(line: &str) -> Vec<Span> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    let mut buf = String::new();
    let mut column = 0;

    for (i, c) in line.chars().enumerate() {
        column = i;
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                out.push(Span {
                    text: std::mem::take(&mut buf),
                    start: s,
                    end: i,
                });
            }
        } else {
            if start.is_none() {
                start = Some(i);
            }
            buf.push(c);
        }
    }
    if let Some(s) = start {
        out.push(Span {
            text: buf,
            start: s,
            end: column + 1,
        });
    }

    out
}

/// Canonicalize whitespace so column arithmetic is meaningful: tabs become
/// four spaces, exotic spaces become plain spaces, trailing whitespace goes.
pub(crate) fn normalize(line: &str) -> String {
    let mut out = String::new();
    for c in line.chars() {
        match c {
            '\t' => out.push_str("    "),
            '\u{00a0}' | '\u{2007}' | '\u{2009}' | '\u{202f}' => out.push(' '),
            _ => out.push(c),
        }
    }
    out.truncate(out.trim_end().len());
    out
}

/// Hebrew and Arabic code-point ranges, the scripts the aligner treats as
/// right-to-left.
pub(crate) fn is_rtl(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c as u32,
            0x0590..=0x05FF | 0x0600..=0x06FF | 0x0750..=0x077F | 0xFB1D..=0xFB4F)
    })
}

/// A chord or word interval in normalized [0,1] coordinates.
#[derive(Debug, Clone)]
struct Interval {
    index: usize,
    start: f32,
    end: f32,
}

impl Interval {
    fn center(&self) -> f32 {
        (self.start + self.end) / 2.0
    }

    fn width(&self) -> f32 {
        self.end - self.start
    }
}

/// Align a chord line above a lyric line into a sequence of words.
pub fn align(chord_line: &str, lyric_line: &str, options: &ReconstructOptions) -> Vec<Word> {
    let chords = normalize(chord_line);
    let lyrics = normalize(lyric_line);

    if !has_spacing(&chords) {
        debug!("chord line has no spacing information, falling back to index matching");
        return align_by_index(&chords, &lyrics, options);
    }

    let total = chords.chars().count().max(lyrics.chars().count());
    if total == 0 {
        return Vec::new();
    }
    let scale = total as f32;
    let rtl = is_rtl(&lyrics);

    let mut words: Vec<Word> = Vec::new();
    let mut word_intervals: Vec<Interval> = Vec::new();
    for (index, span) in spans(&lyrics).into_iter().enumerate() {
        let start = span.start as f32 / scale;
        let end = span.end as f32 / scale;
        // Mirror a right-to-left word into the visual space the chord line
        // was written against.
        let (start, end) = if rtl {
            (1.0 - end, 1.0 - start)
        } else {
            (start, end)
        };
        words.push(Word::plain(span.text));
        word_intervals.push(Interval { index, start, end });
    }

    let mut chord_tokens: Vec<ChordToken> = Vec::new();
    let mut chord_intervals: Vec<Interval> = Vec::new();
    for span in spans(&chords) {
        if let Some(token) = chord::parse_lenient(&span.text) {
            chord_intervals.push(Interval {
                index: chord_tokens.len(),
                start: span.start as f32 / scale,
                end: span.end as f32 / scale,
            });
            chord_tokens.push(token);
        }
    }

    // Extraction order is buffer order; matching walks visual order.
    if rtl {
        word_intervals.reverse();
        chord_intervals.reverse();
    }

    let (overlap_threshold, distance_frac) = if rtl {
        (options.overlap_threshold_rtl, options.center_distance_frac_rtl)
    } else {
        (options.overlap_threshold_ltr, options.center_distance_frac_ltr)
    };

    struct Candidate {
        score: f32,
        word: usize,
        chord: usize,
    }

    let mut candidates: Vec<Candidate> = Vec::new();
    for word in &word_intervals {
        for chord_iv in &chord_intervals {
            let overlap = (word.end.min(chord_iv.end) - word.start.max(chord_iv.start)).max(0.0);
            let ratio = if chord_iv.width() > 0.0 {
                overlap / chord_iv.width()
            } else {
                0.0
            };
            let distance = (word.center() - chord_iv.center()).abs();

            let accepted =
                ratio > overlap_threshold || distance < distance_frac * word.width();
            if accepted {
                candidates.push(Candidate {
                    score: ratio * options.overlap_weight
                        + 1.0 / (1.0 + distance * options.distance_weight),
                    word: word.index,
                    chord: chord_iv.index,
                });
            }
        }
    }

    // Highest score first; ties resolve by buffer position so the result
    // is deterministic.
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.word.cmp(&b.word))
            .then(a.chord.cmp(&b.chord))
    });

    let mut chord_used = vec![false; chord_tokens.len()];
    for candidate in candidates {
        if chord_used[candidate.chord] || words[candidate.word].chord.is_some() {
            continue;
        }
        chord_used[candidate.chord] = true;
        words[candidate.word].chord = Some(chord_tokens[candidate.chord].clone());
    }

    words
}

/// A run of two or more spaces is the signal that column positions are
/// meaningful.
fn has_spacing(chord_line: &str) -> bool {
    chord_line.contains("  ")
}

/// Fallback for spacing-free chord lines: the n-th chord maps to the n-th
/// word, searching a small window around that index when the slot is
/// already taken or out of range.
fn align_by_index(chord_line: &str, lyric_line: &str, options: &ReconstructOptions) -> Vec<Word> {
    let mut words: Vec<Word> = spans(lyric_line)
        .into_iter()
        .map(|span| Word::plain(span.text))
        .collect();
    if words.is_empty() {
        return words;
    }

    let tokens = spans(chord_line)
        .into_iter()
        .filter_map(|span| chord::parse_lenient(&span.text));

    for (i, token) in tokens.enumerate() {
        let lo = i.saturating_sub(options.index_window);
        let hi = (i + options.index_window).min(words.len() - 1);
        let slot = (lo..=hi)
            .filter(|&j| words[j].chord.is_none())
            .min_by_key(|&j| j.abs_diff(i));
        if let Some(j) = slot {
            words[j].chord = Some(token);
        }
    }

    words
}
