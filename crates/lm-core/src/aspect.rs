//! Output aspect ratios accepted by the generation service.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    Landscape16x9,
    /// Match the source image; resolved locally before sending.
    #[default]
    #[serde(rename = "Original")]
    Original,
}

/// Fixed ratios in resolution order, paired with their width/height value.
const CANDIDATES: [(AspectRatio, f32); 5] = [
    (AspectRatio::Square, 1.0),
    (AspectRatio::Portrait3x4, 0.75),
    (AspectRatio::Landscape4x3, 1.33),
    (AspectRatio::Portrait9x16, 0.5625),
    (AspectRatio::Landscape16x9, 1.777),
];

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Original => "Original",
        }
    }

    /// Nearest fixed ratio for an image of `width × height`.
    /// Ties go to the earlier candidate; degenerate sizes map to 1:1.
    pub fn nearest(width: u32, height: u32) -> AspectRatio {
        if width == 0 || height == 0 {
            return AspectRatio::Square;
        }
        let ratio = width as f32 / height as f32;
        let mut best = CANDIDATES[0];
        for candidate in &CANDIDATES[1..] {
            if (ratio - candidate.1).abs() < (ratio - best.1).abs() {
                best = *candidate;
            }
        }
        best.0
    }

    /// Replace `Original` with the nearest fixed ratio for the given size.
    pub fn resolve(self, width: u32, height: u32) -> AspectRatio {
        match self {
            AspectRatio::Original => AspectRatio::nearest(width, height),
            fixed => fixed,
        }
    }

    /// Video only supports 16:9 and 9:16.
    pub fn for_video(self, width: u32, height: u32) -> AspectRatio {
        match self.resolve(width, height) {
            AspectRatio::Portrait3x4 | AspectRatio::Portrait9x16 => AspectRatio::Portrait9x16,
            _ => AspectRatio::Landscape16x9,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_resolves_to_nearest() {
        assert_eq!(AspectRatio::Original.resolve(1920, 1080), AspectRatio::Landscape16x9);
        assert_eq!(AspectRatio::Original.resolve(1080, 1920), AspectRatio::Portrait9x16);
        assert_eq!(AspectRatio::Original.resolve(1000, 1000), AspectRatio::Square);
        assert_eq!(AspectRatio::Original.resolve(1200, 900), AspectRatio::Landscape4x3);
        assert_eq!(AspectRatio::Original.resolve(900, 1200), AspectRatio::Portrait3x4);
        assert_eq!(AspectRatio::Original.resolve(0, 10), AspectRatio::Square);
    }

    #[test]
    fn fixed_ratios_pass_through() {
        assert_eq!(AspectRatio::Portrait3x4.resolve(1920, 1080), AspectRatio::Portrait3x4);
    }

    #[test]
    fn video_ratio_is_landscape_or_portrait() {
        assert_eq!(AspectRatio::Square.for_video(10, 10), AspectRatio::Landscape16x9);
        assert_eq!(AspectRatio::Portrait3x4.for_video(10, 10), AspectRatio::Portrait9x16);
        assert_eq!(AspectRatio::Original.for_video(900, 1600), AspectRatio::Portrait9x16);
    }

    #[test]
    fn wire_names() {
        assert_eq!(AspectRatio::Landscape16x9.to_string(), "16:9");
    }
}
