//! Compiler Explorer link fragments.

use cedoc_config::ExplorerConfig;
use cedoc_html::TreeNode;

use crate::error::SessionError;
use crate::profile::LanguageProfile;
use crate::session::SessionDescriptor;

/// Class of the element holding the tooltip text.
pub const TOOLTIP_TEXT_CLASS: &str = "tooltiptext";

/// Class list of the appended link container.
const LINK_CONTAINER_CLASS: &str = "tooltip-container godbolt-link";

/// Builds and appends Compiler Explorer links to code blocks.
#[derive(Debug, Clone)]
pub struct LinkSynthesizer {
    clientstate_base: String,
    favicon_url: String,
    tooltip_text: String,
}

impl LinkSynthesizer {
    /// Create a synthesizer for a Compiler Explorer instance.
    #[must_use]
    pub fn new(explorer: &ExplorerConfig) -> Self {
        Self {
            clientstate_base: explorer.clientstate_base(),
            favicon_url: explorer.favicon_url.clone(),
            tooltip_text: explorer.tooltip_text.clone(),
        }
    }

    /// Client-state link opening `source` with the profile's compiler.
    pub fn link_url(
        &self,
        source: &str,
        profile: &LanguageProfile,
    ) -> Result<String, SessionError> {
        SessionDescriptor::for_source(source, profile).to_url(&self.clientstate_base)
    }

    /// Link fragment: icon anchor plus tooltip text.
    ///
    /// ```html
    /// <div class="tooltip-container godbolt-link">
    ///   <a target="_blank" href="URL"><img src="FAVICON"></a>
    ///   <span class="tooltiptext">View in Compiler Explorer</span>
    /// </div>
    /// ```
    pub fn link_fragment(&self, url: &str) -> TreeNode {
        let icon = TreeNode::new("img").with_attr("src", &self.favicon_url);
        let anchor = TreeNode::new("a")
            .with_attr("target", "_blank")
            .with_attr("href", url)
            .with_children(vec![icon]);
        let tooltip = TreeNode::new("span")
            .with_attr("class", TOOLTIP_TEXT_CLASS)
            .with_text(&self.tooltip_text);

        TreeNode::new("div")
            .with_attr("class", LINK_CONTAINER_CLASS)
            .with_children(vec![anchor, tooltip])
    }

    /// Append a link for the block's current text as the container's last child.
    ///
    /// The descriptor is built from the text before anything is appended.
    /// Returns the link URL.
    pub fn annotate(
        &self,
        pre: &mut TreeNode,
        profile: &LanguageProfile,
    ) -> Result<String, SessionError> {
        let url = self.link_url(&pre.text_content(), profile)?;
        pre.children.push(self.link_fragment(&url));
        Ok(url)
    }
}

impl Default for LinkSynthesizer {
    fn default() -> Self {
        Self::new(&ExplorerConfig::default())
    }
}
