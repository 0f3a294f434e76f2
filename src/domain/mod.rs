//! normalized, in-memory domain model (post-mapping; see [`crate::wire`] for the raw JSON shapes)
pub mod chunk;
pub mod filter;
pub mod post;

pub use chunk::{Chunk, ListItem, Rendition, RenditionTier, TextFragment};
pub use filter::FilterCategory;
pub use post::{id_prefix, Post};
