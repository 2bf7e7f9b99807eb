//! Horizontal centering of link tooltips.
//!
//! The tooltip sits after a 14px-wide icon; shifting it left by its own width
//! minus that offset centers it under the icon. The width is whatever the
//! page would render, so it comes from a [`WidthMeasure`].

use cedoc_config::TooltipConfig;
use cedoc_html::TreeNode;

use crate::synthesizer::TOOLTIP_TEXT_CLASS;

/// Width of the link icon the tooltip is centered on.
pub const TOOLTIP_OFFSET: i64 = 14;

/// Rendered width of an element, in CSS pixels.
pub trait WidthMeasure: Send + Sync {
    /// Width the element would occupy when rendered.
    fn measure(&self, node: &TreeNode) -> u32;
}

/// Width estimate from text length: `chars * char_width + padding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextWidthEstimate {
    /// Average glyph advance in pixels.
    pub char_width: u32,
    /// Horizontal padding plus borders in pixels.
    pub padding: u32,
}

impl TextWidthEstimate {
    /// Estimate from configuration.
    #[must_use]
    pub fn new(config: &TooltipConfig) -> Self {
        Self {
            char_width: config.char_width,
            padding: config.padding,
        }
    }
}

impl Default for TextWidthEstimate {
    fn default() -> Self {
        Self::new(&TooltipConfig::default())
    }
}

impl WidthMeasure for TextWidthEstimate {
    fn measure(&self, node: &TreeNode) -> u32 {
        let chars = u32::try_from(node.text_content().chars().count()).unwrap_or(u32::MAX);
        chars
            .saturating_mul(self.char_width)
            .saturating_add(self.padding)
    }
}

/// Left margin centering a tooltip of rendered width `width`: `-(width - 14)`.
#[must_use]
pub fn margin_left(width: u32) -> i64 {
    -(i64::from(width) - TOOLTIP_OFFSET)
}

/// Set `margin-left` on every tooltip text element below `root`.
///
/// Runs over the whole page, including tooltips from earlier runs, after all
/// links have been inserted. Returns the number of tooltips adjusted.
pub fn center_tooltips(root: &mut TreeNode, measure: &dyn WidthMeasure) -> usize {
    let mut centered = 0;
    root.for_each_mut(&mut |node| {
        if node.has_class(TOOLTIP_TEXT_CLASS) {
            let margin = margin_left(measure.measure(node));
            set_style_property(node, "margin-left", &format!("{margin}px"));
            centered += 1;
        }
    });
    centered
}

/// Set one declaration of the inline `style`, keeping the others.
fn set_style_property(node: &mut TreeNode, property: &str, value: &str) {
    let mut declarations: Vec<String> = node
        .attr("style")
        .unwrap_or("")
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            decl.split_once(':')
                .is_none_or(|(name, _)| !name.trim().eq_ignore_ascii_case(property))
        })
        .map(str::to_owned)
        .collect();
    declarations.push(format!("{property}: {value}"));
    node.set_attr("style", format!("{};", declarations.join("; ")));
}
