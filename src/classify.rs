//! content classifier / mapper (C6): converts a raw wire post into a
//! normalized [`Post`], flagging incomplete media per §4.6
use crate::domain::{Chunk, FilterCategory, ListItem, Post, Rendition, RenditionTier, TextFragment};
use crate::error::{AppError, Result};
use crate::quality;
use crate::wire::{RawChunk, RawListItem, RawPost, RawRendition};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// the mapped post plus the set of categories the mapper itself discovered
/// were incomplete on the remote (§3 "incomplete-media markers")
pub struct Classified {
    pub post: Post,
    pub incomplete: HashSet<FilterCategory>,
}

pub fn classify(raw: RawPost, preferred_quality: RenditionTier) -> Result<Classified> {
    let created_at = parse_timestamp(&raw.created_at)?;
    let updated_at = parse_timestamp(&raw.updated_at)?;

    let mut chunks = Vec::new();
    let mut incomplete = HashSet::new();
    let mut text_run: Vec<TextFragment> = Vec::new();

    for raw_chunk in raw.data {
        match raw_chunk {
            RawChunk::Text { content } => {
                text_run.push(TextFragment::plain(content));
                text_run.push(TextFragment::new_line());
            }
            RawChunk::Header { content, level } => {
                let mut fragment = TextFragment::plain(content);
                fragment.header_level = level.min(6);
                text_run.push(fragment);
            }
            RawChunk::Link { content, url } => {
                let mut fragment = TextFragment::plain(content);
                fragment.link_url = Some(url);
                text_run.push(fragment);
            }
            RawChunk::List { items, ordered } => {
                flush_text_run(&mut text_run, &mut chunks);
                chunks.push(Chunk::List {
                    ordered,
                    items: items.into_iter().map(map_list_item).collect(),
                });
            }
            RawChunk::Image { url } => {
                flush_text_run(&mut text_run, &mut chunks);
                chunks.push(Chunk::Image { local_path: url });
            }
            RawChunk::File { url, filename } => {
                flush_text_run(&mut text_run, &mut chunks);
                let signed_url = format!("{url}{}", raw.signed_query);
                chunks.push(Chunk::File {
                    filename,
                    local_path: signed_url,
                });
            }
            RawChunk::OkVideo {
                title,
                complete,
                player_urls,
            } => {
                flush_text_run(&mut text_run, &mut chunks);
                if !complete {
                    incomplete.insert(FilterCategory::BoostyVideos);
                    continue;
                }
                let renditions = map_renditions(player_urls);
                if let Some(chosen) = quality::best(&renditions, preferred_quality) {
                    chunks.push(Chunk::PlatformVideo {
                        title,
                        local_path: Some(chosen.url.clone()),
                    });
                }
            }
            RawChunk::Video { url } => {
                flush_text_run(&mut text_run, &mut chunks);
                chunks.push(Chunk::ExternalVideo {
                    local_path: Some(url),
                });
            }
            RawChunk::AudioFile {
                title,
                complete,
                url,
            } => {
                flush_text_run(&mut text_run, &mut chunks);
                if !complete {
                    incomplete.insert(FilterCategory::Audio);
                    continue;
                }
                chunks.push(Chunk::Audio {
                    title,
                    local_path: Some(url),
                });
            }
            RawChunk::Unknown => {
                return Err(AppError::ValidationError(
                    "post data contained an unrecognized chunk type".to_string(),
                ));
            }
        }
    }
    flush_text_run(&mut text_run, &mut chunks);

    let title = if raw.title.trim().is_empty() {
        Post::synthesize_title(&raw.id)
    } else {
        raw.title
    };

    Ok(Classified {
        post: Post {
            id: raw.id,
            title,
            created_at,
            updated_at,
            has_access: raw.has_access,
            signed_query: raw.signed_query,
            chunks,
        },
        incomplete,
    })
}

fn flush_text_run(run: &mut Vec<TextFragment>, chunks: &mut Vec<Chunk>) {
    if !run.is_empty() {
        chunks.push(Chunk::Text(std::mem::take(run)));
    }
}

fn map_list_item(raw: RawListItem) -> ListItem {
    let mut fragments = Vec::new();
    for chunk in raw.content {
        match chunk {
            RawChunk::Text { content } => fragments.push(TextFragment::plain(content)),
            RawChunk::Header { content, level } => {
                let mut fragment = TextFragment::plain(content);
                fragment.header_level = level.min(6);
                fragments.push(fragment);
            }
            RawChunk::Link { content, url } => {
                let mut fragment = TextFragment::plain(content);
                fragment.link_url = Some(url);
                fragments.push(fragment);
            }
            // a list item's inline content is textual only; any other
            // chunk type nested here is dropped rather than rejected, since
            // the wire format does not define ordering for it
            _ => {}
        }
    }

    ListItem {
        fragments,
        children: raw.items.into_iter().map(map_list_item).collect(),
    }
}

fn map_renditions(raw: Vec<RawRendition>) -> Vec<Rendition> {
    raw.into_iter()
        .filter_map(|r| {
            let tier = tier_from_str(&r.tier)?;
            Some(Rendition { tier, url: r.url })
        })
        .collect()
}

fn tier_from_str(s: &str) -> Option<RenditionTier> {
    Some(match s {
        "ultra_hd" => RenditionTier::UltraHd,
        "quad_hd" => RenditionTier::QuadHd,
        "full_hd" => RenditionTier::FullHd,
        "high" => RenditionTier::High,
        "medium" => RenditionTier::Medium,
        "low" => RenditionTier::Low,
        "tiny" => RenditionTier::Tiny,
        "lowest" => RenditionTier::Lowest,
        // adaptive/live/streaming tiers are excluded from ranking (§4.2, §9)
        _ => return None,
    })
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::ValidationError(format!("invalid timestamp {s:?}: {e}")))
}
