//! # Grid Reconstructor
//!
//! This module rebuilds plain-text lines from spatially-positioned OCR
//! tokens, reinstating the whitespace that encodes chord/lyric column
//! alignment.
//!
//! ## Purpose
//! An OCR engine returns recognized tokens with bounding boxes, not
//! pre-aligned text columns. The chord sheet's vertical alignment only
//! survives if the horizontal gaps between tokens are converted back into
//! space characters, which is what this module does:
//! 1. drop tokens at or below the confidence threshold
//! 2. sort the remainder by vertical center
//! 3. greedily cluster tokens into lines using a running mean of each
//!    line's center and token height
//! 4. sort each line by horizontal position
//! 5. reinstate whitespace from the horizontal gaps, using the median
//!    token width as a proxy character width
//!
//! Independent spatial blocks (columns of a multi-column source) are
//! reconstructed separately and joined with a blank line, so one column
//! never bleeds into another.
//!
//! ## Entry Point
//! `reconstruct_blocks(blocks, options) -> Result<String, SheetError>`
//!
//! The only failure is a malformed input shape: a token with a non-finite
//! coordinate or a negative extent. Low-confidence or empty tokens are
//! content, not shape, and are silently dropped.
//!
//! ## Related Modules
//! - `classify` - consumes the reconstructed lines
//! - `error` - `SheetError::InvalidToken` for impossible geometry

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SheetError;
use crate::options::ReconstructOptions;

/// A recognized character or symbol with its bounding box and recognition
/// confidence, as delivered by the OCR collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedToken {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Recognition confidence, 0-100.
    pub confidence: f32,
}

impl PositionedToken {
    pub fn new(
        text: impl Into<String>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        confidence: f32,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Reconstruct text from blocks of positioned tokens.
///
/// Each block becomes one text region; regions are joined with a blank
/// line. Fails only when a token's geometry is impossible.
pub fn reconstruct_blocks(
    blocks: &[Vec<PositionedToken>],
    options: &ReconstructOptions,
) -> Result<String, SheetError> {
    validate_shape(blocks)?;

    let texts: Vec<String> = blocks
        .iter()
        .map(|block| reconstruct_block(block, options))
        .filter(|text| !text.is_empty())
        .collect();

    Ok(texts.join("\n\n"))
}

/// Reject tokens whose geometry cannot describe a bounding box. The index
/// refers to the flattened token list as given.
fn validate_shape(blocks: &[Vec<PositionedToken>]) -> Result<(), SheetError> {
    for (index, token) in blocks.iter().flatten().enumerate() {
        let fields = [
            ("x", token.x),
            ("y", token.y),
            ("width", token.width),
            ("height", token.height),
            ("confidence", token.confidence),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(SheetError::InvalidToken {
                    index,
                    message: format!("non-finite {}", name),
                });
            }
        }
        if token.width < 0.0 || token.height < 0.0 {
            return Err(SheetError::InvalidToken {
                index,
                message: "negative extent".to_string(),
            });
        }
    }
    Ok(())
}

fn reconstruct_block(tokens: &[PositionedToken], options: &ReconstructOptions) -> String {
    let mut kept: Vec<&PositionedToken> = tokens
        .iter()
        .filter(|t| t.confidence > options.min_confidence && !t.text.is_empty())
        .collect();
    kept.sort_by(|a, b| {
        a.center_y()
            .partial_cmp(&b.center_y())
            .unwrap_or(Ordering::Equal)
    });

    let mut lines = cluster_lines(&kept, options);
    debug!(
        tokens = kept.len(),
        lines = lines.len(),
        "clustered block into lines"
    );

    for line in &mut lines {
        line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    }

    lines
        .iter()
        .map(|line| render_line(line, options))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Greedy top-to-bottom clustering. A token joins the current line when its
/// vertical center lies within `line_merge_factor` times the line's running
/// mean token height of the running mean center; both means update
/// incrementally as tokens join.
fn cluster_lines<'a>(
    sorted: &[&'a PositionedToken],
    options: &ReconstructOptions,
) -> Vec<Vec<&'a PositionedToken>> {
    let mut lines: Vec<Vec<&PositionedToken>> = Vec::new();
    let mut mean_center = 0.0f32;
    let mut mean_height = 0.0f32;
    let mut count = 0usize;

    for token in sorted {
        let center = token.center_y();
        let joins = count > 0 && (center - mean_center).abs() <= options.line_merge_factor * mean_height;
        if let (true, Some(line)) = (joins, lines.last_mut()) {
            line.push(token);
            count += 1;
            mean_center += (center - mean_center) / count as f32;
            mean_height += (token.height - mean_height) / count as f32;
        } else {
            lines.push(vec![token]);
            mean_center = center;
            mean_height = token.height;
            count = 1;
        }
    }

    lines
}

/// Rebuild one line of text, inserting `max(1, floor(gap / (median * 0.8)))`
/// spaces wherever the gap between consecutive tokens exceeds
/// `median * 0.6` (factors are the configured defaults).
fn render_line(tokens: &[&PositionedToken], options: &ReconstructOptions) -> String {
    let median = median_width(tokens);
    let mut out = String::new();
    let mut prev_end: Option<f32> = None;

    for token in tokens {
        if let Some(end) = prev_end {
            let gap = token.x - end;
            if median > 0.0 && gap > median * options.gap_space_factor {
                let spaces = (gap / (median * options.char_width_factor)).floor() as usize;
                out.push_str(&" ".repeat(spaces.max(1)));
            }
        }
        out.push_str(&token.text);
        prev_end = Some(token.x + token.width);
    }

    out
}

/// Median token width, the proxy for one character's width on this line.
fn median_width(tokens: &[&PositionedToken]) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }
    let mut widths: Vec<f32> = tokens.iter().map(|t| t.width).collect();
    widths.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = widths.len() / 2;
    if widths.len() % 2 == 0 {
        (widths[mid - 1] + widths[mid]) / 2.0
    } else {
        widths[mid]
    }
}
