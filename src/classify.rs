//! # Line Classification
//!
//! Decides whether a text line is "mostly chords" or "mostly lyrics", and
//! strips the bracket markup some tab sources wrap around their content.
//!
//! A line is a chord line when the fraction of its whitespace-separated
//! tokens accepted by the lenient chord grammar exceeds the configured
//! ratio, or - as a secondary rule for short lines - when at least one
//! token matches and the non-matching tokens number no more than the
//! configured limit.
//!
//! Markup stripping removes `[ch]`/`[/ch]` wrappers and `[tab]`/`[/tab]`
//! block markers wherever they appear. Unterminated markers are tolerated;
//! no line is ever dropped because of malformed markup.

use tracing::debug;

use crate::chord;
use crate::options::ReconstructOptions;

/// Remove `[ch]`, `[/ch]`, `[tab]` and `[/tab]` markers, keeping the text
/// they wrapped. Best-effort: a marker with no closing partner is removed
/// just the same.
pub fn strip_markup(line: &str) -> String {
    line.replace("[ch]", "")
        .replace("[/ch]", "")
        .replace("[tab]", "")
        .replace("[/tab]", "")
}

/// Classify a line as a chord line or not.
pub fn is_chord_line(line: &str, options: &ReconstructOptions) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return false;
    }

    let matches = tokens
        .iter()
        .filter(|t| chord::parse_lenient(t).is_some())
        .count();
    let misses = tokens.len() - matches;

    let ratio = matches as f32 / tokens.len() as f32;
    let chord_line =
        ratio > options.chord_line_ratio || (matches > 0 && misses <= options.chord_line_max_misses);
    debug!(
        matches,
        misses,
        chord_line,
        line = %line,
        "classified line"
    );
    chord_line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> bool {
        is_chord_line(line, &ReconstructOptions::default())
    }

    #[test]
    fn test_all_chords_is_a_chord_line() {
        assert!(classify("C Am F G"));
        assert!(classify("C       Am      F"));
        assert!(classify("N.C. Bm7 E"));
    }

    #[test]
    fn test_mostly_lyrics_is_not_a_chord_line() {
        assert!(!classify("The quick brown fox jumped C"));
        assert!(!classify("hello world"));
        assert!(!classify(""));
        assert!(!classify("   "));
    }

    #[test]
    fn test_secondary_rule_tolerates_few_misses() {
        // 1 match, 3 misses: below the ratio but within the miss limit.
        assert!(classify("palm mute riff Am"));
        // 1 match, 4 misses: over the limit on both rules.
        assert!(!classify("sing this one real soft C"));
    }

    #[test]
    fn test_markup_is_stripped() {
        assert_eq!(strip_markup("[ch]Am[/ch] [ch]F[/ch]"), "Am F");
        assert_eq!(strip_markup("[tab]C  G[/tab]"), "C  G");
        assert_eq!(strip_markup("no markup here"), "no markup here");
    }

    #[test]
    fn test_unterminated_markup_is_tolerated() {
        assert_eq!(strip_markup("[ch]Am"), "Am");
        assert_eq!(strip_markup("[tab]C  G"), "C  G");
        assert_eq!(strip_markup("Am[/ch]"), "Am");
    }

    #[test]
    fn test_stripped_markup_classifies_as_chords() {
        let line = strip_markup("[ch]C[/ch]   [ch]Am[/ch]");
        assert!(classify(&line));
    }
}
