//! Attributed-text styling for card titles and descriptions.
//!
//! Pure formatting only: glyph layout and rasterization are the host's
//! concern. The pipeline attaches these values to text elements as-is.

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FontWeight {
    Regular,
    Semibold,
    Bold,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StyledText {
    pub text: String,
    pub family: String,
    pub size_pt: f32,
    pub weight: FontWeight,
    /// Straight-alpha RGBA fill color.
    pub color: [u8; 4],
    /// Line cap; `None` means unlimited wrapping.
    pub max_lines: Option<u32>,
}

/// Title style: large and bold, white so it reads over the gradient fade.
pub fn styled_title(text: &str) -> StyledText {
    StyledText {
        text: text.to_string(),
        family: "sans-serif".to_string(),
        size_pt: 24.0,
        weight: FontWeight::Bold,
        color: [255, 255, 255, 255],
        max_lines: Some(2),
    }
}

/// Description style: compact body text over the light panel.
pub fn styled_description(text: &str) -> StyledText {
    StyledText {
        text: text.to_string(),
        family: "sans-serif".to_string(),
        size_pt: 14.0,
        weight: FontWeight::Regular,
        color: [51, 51, 51, 255],
        max_lines: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_bold_white_and_capped() {
        let t = styled_title("Kapok Tree");
        assert_eq!(t.text, "Kapok Tree");
        assert_eq!(t.weight, FontWeight::Bold);
        assert_eq!(t.color, [255, 255, 255, 255]);
        assert_eq!(t.max_lines, Some(2));
    }

    #[test]
    fn description_wraps_without_cap() {
        let t = styled_description("Emergent canopy giant");
        assert_eq!(t.weight, FontWeight::Regular);
        assert_eq!(t.max_lines, None);
        assert!(t.size_pt < styled_title("x").size_pt);
    }

    #[test]
    fn styling_is_pure() {
        assert_eq!(styled_title("a"), styled_title("a"));
        assert_eq!(styled_description("b"), styled_description("b"));
    }
}
