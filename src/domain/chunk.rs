use serde::{Deserialize, Serialize};

/// sentinel fragment text that renders as a paragraph break
pub const NEW_LINE_SYMBOL: &str = "<NEW_LINE_SYMBOL>";

/// a strict total order over platform-hosted video renditions, lowest first.
/// adaptive/live/streaming tiers are intentionally absent: they are excluded
/// from ranking entirely (§4.2, §9)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenditionTier {
    Lowest,
    Tiny,
    Low,
    Medium,
    High,
    FullHd,
    QuadHd,
    UltraHd,
}

impl RenditionTier {
    /// ranked lowest-to-highest; used by [`crate::quality::best`]
    pub const RANKED: [RenditionTier; 8] = [
        RenditionTier::Lowest,
        RenditionTier::Tiny,
        RenditionTier::Low,
        RenditionTier::Medium,
        RenditionTier::High,
        RenditionTier::FullHd,
        RenditionTier::QuadHd,
        RenditionTier::UltraHd,
    ];
}

/// one encoded variant of a platform-hosted video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendition {
    pub tier: RenditionTier,
    pub url: String,
}

/// one text run within a [`Chunk::Text`] chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub link_url: Option<String>,
    /// 0 = body text, 1-6 = `<h1>`..`<h6>`
    pub header_level: u8,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl TextFragment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link_url: None,
            header_level: 0,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    /// the sentinel paragraph-break fragment
    pub fn new_line() -> Self {
        Self::plain(NEW_LINE_SYMBOL)
    }

    pub fn is_new_line(&self) -> bool {
        self.header_level == 0 && self.text == NEW_LINE_SYMBOL
    }
}

/// one node of a (possibly nested) textual list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub fragments: Vec<TextFragment>,
    pub children: Vec<ListItem>,
}

/// a normalized, already-classified piece of a post's body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Chunk {
    Text(Vec<TextFragment>),
    /// local path relative to the post's destination directory, once downloaded
    Image { local_path: String },
    /// `filename` is the intended name from the wire payload, not the
    /// storage URL's last path segment (which is typically an opaque hash)
    File { filename: String, local_path: String },
    /// `local_path` is `None` until C8 downloads it
    PlatformVideo {
        title: String,
        local_path: Option<String>,
    },
    ExternalVideo { local_path: Option<String> },
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    Audio {
        title: String,
        local_path: Option<String>,
    },
}
