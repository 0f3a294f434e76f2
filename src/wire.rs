//! raw JSON shapes returned by the platform API (§6); never constructed by
//! hand outside of tests, only deserialized
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PostsPageResponse {
    pub data: Vec<RawPost>,
    pub extra: PageExtra,
}

#[derive(Debug, Deserialize)]
pub struct PageExtra {
    pub offset: String,
    pub is_last: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(rename = "hasAccess")]
    pub has_access: bool,
    #[serde(rename = "signedQuery", default)]
    pub signed_query: String,
    #[serde(default)]
    pub data: Vec<RawChunk>,
}

/// one `data[]` entry; the `type` discriminator decides the shape. Unknown
/// discriminants are rejected at the classifier boundary (§6), not here:
/// `serde(other)` would silently coerce them, so an explicit `Unknown`
/// variant is kept instead and turned into a `ValidationError` by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawChunk {
    Text {
        content: String,
    },
    Header {
        content: String,
        #[serde(default)]
        level: u8,
    },
    Link {
        content: String,
        url: String,
    },
    List {
        #[serde(default)]
        items: Vec<RawListItem>,
        #[serde(default)]
        ordered: bool,
    },
    Image {
        url: String,
    },
    File {
        url: String,
        #[serde(default)]
        filename: String,
    },
    OkVideo {
        #[serde(default)]
        title: String,
        #[serde(default)]
        complete: bool,
        #[serde(default)]
        player_urls: Vec<RawRendition>,
    },
    Video {
        url: String,
    },
    AudioFile {
        #[serde(default)]
        title: String,
        #[serde(default)]
        complete: bool,
        url: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawListItem {
    #[serde(default)]
    pub content: Vec<RawChunk>,
    #[serde(default)]
    pub items: Vec<RawListItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRendition {
    #[serde(rename = "type")]
    pub tier: String,
    pub url: String,
}
