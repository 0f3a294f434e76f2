use super::chunk::Chunk;
use chrono::{DateTime, Utc};

/// the platform's unit of content, after [`crate::classify`] has mapped it
/// from the wire shape; never mutated after construction
#[derive(Debug, Clone)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub has_access: bool,
    pub signed_query: String,
    pub chunks: Vec<Chunk>,
}

impl Post {
    /// `"Not title (id_<first 8 chars>)"`, used when the remote title is empty
    pub fn synthesize_title(id: &str) -> String {
        format!("Not title (id_{})", id_prefix(id))
    }

    pub fn id_prefix(&self) -> &str {
        id_prefix(&self.id)
    }
}

/// first 8 characters of `id`, as a prefix folder/title suffix (§4.4). Slices
/// on a char boundary rather than a raw byte offset, so a non-ASCII id (none
/// seen from the platform in practice, but not guaranteed) can't panic here.
pub fn id_prefix(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((byte_offset, _)) => &id[..byte_offset],
        None => id,
    }
}
