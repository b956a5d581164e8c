use serde::Deserialize;

use crate::error::SheetError;

/// Tunable knobs for the reconstruction pipeline.
///
/// Every threshold named by the pipeline lives here so callers (and the CLI's
/// `--options` YAML file) can adjust them without touching code. The defaults
/// are the values the algorithms were calibrated with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReconstructOptions {
    /// OCR tokens at or below this confidence (0-100) are discarded.
    pub min_confidence: f32,
    /// A token joins the current line cluster when its vertical center lies
    /// within this factor times the running mean token height.
    pub line_merge_factor: f32,
    /// A horizontal gap wider than this factor times the median token width
    /// gets whitespace reinstated.
    pub gap_space_factor: f32,
    /// Proxy character width, as a factor of the median token width, used to
    /// convert a gap into a space count.
    pub char_width_factor: f32,
    /// A line is a chord line when the fraction of tokens matching the chord
    /// grammar exceeds this ratio.
    pub chord_line_ratio: f32,
    /// Secondary rule: a line with at least one chord token and no more than
    /// this many non-matching tokens is also a chord line.
    pub chord_line_max_misses: usize,
    /// Overlap-ratio acceptance threshold for left-to-right lyrics.
    pub overlap_threshold_ltr: f32,
    /// Overlap-ratio acceptance threshold for right-to-left lyrics (stricter).
    pub overlap_threshold_rtl: f32,
    /// Center-distance acceptance, as a fraction of the word's width (LTR).
    pub center_distance_frac_ltr: f32,
    /// Center-distance acceptance, as a fraction of the word's width (RTL).
    pub center_distance_frac_rtl: f32,
    /// Weight of the overlap ratio in the candidate score.
    pub overlap_weight: f32,
    /// Weight of the center distance in the candidate score.
    pub distance_weight: f32,
    /// Search window around the same token index for the index-matching
    /// alignment fallback.
    pub index_window: usize,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            min_confidence: 30.0,
            line_merge_factor: 0.6,
            gap_space_factor: 0.6,
            char_width_factor: 0.8,
            chord_line_ratio: 0.35,
            chord_line_max_misses: 3,
            overlap_threshold_ltr: 0.3,
            overlap_threshold_rtl: 0.5,
            center_distance_frac_ltr: 0.5,
            center_distance_frac_rtl: 0.3,
            overlap_weight: 1.0,
            distance_weight: 10.0,
            index_window: 1,
        }
    }
}

impl ReconstructOptions {
    /// Parse options from a YAML document. Unspecified fields keep their
    /// defaults.
    pub fn from_yaml(source: &str) -> Result<Self, SheetError> {
        serde_yaml::from_str(source).map_err(|e| SheetError::OptionsError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ReconstructOptions::default();
        assert_eq!(options.min_confidence, 30.0);
        assert_eq!(options.chord_line_max_misses, 3);
        assert!(options.overlap_threshold_rtl > options.overlap_threshold_ltr);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let options = ReconstructOptions::from_yaml("chord-line-ratio: 0.4\n").unwrap();
        assert_eq!(options.chord_line_ratio, 0.4);
        assert_eq!(options.min_confidence, 30.0);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let result = ReconstructOptions::from_yaml("chord-line-ratio: [not a number");
        assert!(matches!(result, Err(SheetError::OptionsError(_))));
    }
}
