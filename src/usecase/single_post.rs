//! single-post use case (C8)
use super::DownloadContext;
use crate::classify::classify;
use crate::domain::{Chunk, FilterCategory};
use crate::download;
use crate::error::Result;
use crate::progress::{Level, Total};
use crate::render;
use crate::wire::RawPost;
use std::collections::HashSet;
use std::path::Path;
use tracing::instrument;

/// run the full C8 sequence for one post: map, diff against the cache,
/// download the missing categories, render, and commit.
#[instrument(skip(raw_post, ctx), fields(post_id = %raw_post.id))]
pub async fn execute(destination_dir: &Path, raw_post: RawPost, ctx: &DownloadContext) -> Result<()> {
    let classified = classify(raw_post, ctx.preferred_quality)?;
    let post = classified.post;

    let requested: HashSet<FilterCategory> = ctx.filters.difference(&classified.incomplete).copied().collect();

    let missing = ctx.cache.get_missing(
        &post.id,
        &post.title,
        post.updated_at,
        &requested,
        destination_dir,
    )?;

    if missing.is_empty() {
        ctx.progress.info(&format!("skip (cached): {}", post.title));
        return Ok(());
    }

    let available = categories_with_content(&post.chunks);
    if missing.intersection(&available).next().is_none() {
        ctx.progress.info(&format!("skip (no matching content): {}", post.title));
        return Ok(());
    }

    tokio::fs::create_dir_all(destination_dir).await?;
    let task = ctx.progress.create_task(
        &post.title,
        Total::Known(post.chunks.len() as u64),
        Level::Post,
    );

    let post_content_needed = missing.contains(&FilterCategory::PostContent);
    let mut render_chunks = Vec::new();

    for chunk in post.chunks {
        let outcome = process_chunk(chunk, destination_dir, &missing, post_content_needed, &post.signed_query, ctx).await;
        match outcome {
            Ok(Some(rendered)) => render_chunks.push(rendered),
            Ok(None) => {}
            Err(e) => {
                ctx.progress.complete_task(task);
                return Err(e);
            }
        }
        ctx.progress.update_task(task, 1, None, None);
    }

    if post_content_needed {
        render::render(destination_dir, &render_chunks, &ctx.cancel).await?;
    }

    let completed: HashSet<FilterCategory> = missing.intersection(&available).copied().collect();
    ctx.cache.record_completion(&post.id, &post.title, post.updated_at, &completed)?;

    ctx.progress.complete_task(task);
    ctx.progress.success(&format!("done: {}", post.title));
    Ok(())
}

/// downloads (or skips) one chunk, returning the chunk to carry into the
/// rendered HTML when the body is being (re)written this run
async fn process_chunk(
    chunk: Chunk,
    destination_dir: &Path,
    missing: &HashSet<FilterCategory>,
    post_content_needed: bool,
    signed_query: &str,
    ctx: &DownloadContext,
) -> Result<Option<Chunk>> {
    let _ = signed_query;
    match chunk {
        Chunk::Text(_) | Chunk::List { .. } => Ok(post_content_needed.then_some(chunk)),

        Chunk::Image { local_path: url } => {
            if !post_content_needed {
                return Ok(None);
            }
            let dir = destination_dir.join("images");
            let name = filename_from_url(&url);
            let path = download::download(&ctx.client.download, &url, &dir, &name, true, &ctx.cancel, |_| {}).await?;
            Ok(Some(Chunk::Image {
                local_path: relative_path(destination_dir, &path),
            }))
        }

        Chunk::PlatformVideo { title, local_path } => {
            let Some(url) = local_path else { return Ok(None) };
            if !missing.contains(&FilterCategory::BoostyVideos) {
                return Ok(None);
            }
            let dir = destination_dir.join("boosty_videos");
            let name = filename_from_url(&url);
            let path = download::download(&ctx.client.download, &url, &dir, &name, true, &ctx.cancel, |_| {}).await?;
            Ok(post_content_needed.then_some(Chunk::PlatformVideo {
                title,
                local_path: Some(relative_path(destination_dir, &path)),
            }))
        }

        Chunk::ExternalVideo { local_path } => {
            let Some(url) = local_path else { return Ok(None) };
            if !missing.contains(&FilterCategory::ExternalVideos) {
                return Ok(None);
            }
            let dir = destination_dir.join("external_videos");
            let path = ctx.external_video.download(&url, &dir).await?;
            Ok(post_content_needed.then_some(Chunk::ExternalVideo {
                local_path: Some(relative_path(destination_dir, &path)),
            }))
        }

        Chunk::File { filename, local_path: url } => {
            if !missing.contains(&FilterCategory::Files) {
                return Ok(None);
            }
            let dir = destination_dir.join("files");
            let path = download::download(&ctx.client.download, &url, &dir, &filename, false, &ctx.cancel, |_| {}).await?;
            Ok(post_content_needed.then_some(Chunk::File {
                filename,
                local_path: relative_path(destination_dir, &path),
            }))
        }

        Chunk::Audio { title, local_path } => {
            let Some(url) = local_path else { return Ok(None) };
            if !missing.contains(&FilterCategory::Audio) {
                return Ok(None);
            }
            let dir = destination_dir.join("audio");
            let name = filename_from_url(&url);
            let path = download::download(&ctx.client.download, &url, &dir, &name, true, &ctx.cancel, |_| {}).await?;
            Ok(post_content_needed.then_some(Chunk::Audio {
                title,
                local_path: Some(relative_path(destination_dir, &path)),
            }))
        }
    }
}

/// the set of categories a post actually has chunks for; a category in
/// `missing` with no matching chunk here must never be recorded as complete
/// (§9 open question, decided against collapsing the two checks)
fn categories_with_content(chunks: &[Chunk]) -> HashSet<FilterCategory> {
    let mut set = HashSet::new();
    for chunk in chunks {
        let category = match chunk {
            Chunk::Text(_) | Chunk::List { .. } | Chunk::Image { .. } => FilterCategory::PostContent,
            Chunk::PlatformVideo { .. } => FilterCategory::BoostyVideos,
            Chunk::ExternalVideo { .. } => FilterCategory::ExternalVideos,
            Chunk::File { .. } => FilterCategory::Files,
            Chunk::Audio { .. } => FilterCategory::Audio,
        };
        set.insert(category);
    }
    set
}

fn filename_from_url(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    let last_segment = without_query.rsplit('/').next().unwrap_or(without_query);
    let decoded = urlencoding::decode(last_segment)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| last_segment.to_string());
    if decoded.is_empty() {
        "download".to_string()
    } else {
        decoded
    }
}

fn relative_path(base: &Path, full: &Path) -> String {
    full.strip_prefix(base)
        .unwrap_or(full)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PostCache;
    use crate::client::PlatformClient;
    use crate::domain::RenditionTier;
    use crate::external_video::NullExternalVideoDownloader;
    use crate::progress::NullReporter;
    use crate::wire::{RawChunk, RawPost};
    use std::sync::Arc;
    use tempfile::tempdir;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(cache_root: &Path, client: PlatformClient) -> DownloadContext {
        DownloadContext {
            client,
            external_video: Arc::new(NullExternalVideoDownloader),
            cache: PostCache::open(cache_root).unwrap(),
            filters: crate::domain::FilterCategory::ALL.into_iter().collect(),
            preferred_quality: RenditionTier::High,
            progress: Arc::new(NullReporter),
            cancel: CancellationToken::new(),
        }
    }

    fn sample_raw(data: Vec<RawChunk>) -> RawPost {
        RawPost {
            id: "id123456".to_string(),
            title: "Hello".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            has_access: true,
            signed_query: "".to_string(),
            data,
        }
    }

    #[tokio::test]
    async fn downloads_image_and_renders_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pngbytes".to_vec()))
            .mount(&server)
            .await;

        let cache_dir = tempdir().unwrap();
        let dest_dir = tempdir().unwrap();
        let client = PlatformClient::new(&server.uri(), "", "").unwrap();
        let ctx = context(cache_dir.path(), client);

        let raw = sample_raw(vec![RawChunk::Image {
            url: format!("{}/img.png", server.uri()),
        }]);

        execute(dest_dir.path(), raw, &ctx).await.unwrap();

        assert!(dest_dir.path().join("images/img.png").exists());
        assert!(dest_dir.path().join(render::OUTPUT_FILENAME).exists());
    }

    #[tokio::test]
    async fn second_run_with_same_filters_skips_as_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pngbytes".to_vec()))
            .mount(&server)
            .await;

        let cache_dir = tempdir().unwrap();
        let dest_dir = tempdir().unwrap();
        let client = PlatformClient::new(&server.uri(), "", "").unwrap();
        let ctx = context(cache_dir.path(), client);

        let raw = sample_raw(vec![RawChunk::Image {
            url: format!("{}/img.png", server.uri()),
        }]);

        execute(dest_dir.path(), raw, &ctx).await.unwrap();
        std::fs::remove_file(dest_dir.path().join("images/img.png")).unwrap();

        let raw_again = sample_raw(vec![RawChunk::Image {
            url: format!("{}/img.png", server.uri()),
        }]);
        execute(dest_dir.path(), raw_again, &ctx).await.unwrap();

        assert!(!dest_dir.path().join("images/img.png").exists());
    }

    #[test]
    fn filename_from_url_strips_query_and_decodes() {
        assert_eq!(filename_from_url("http://x/a%20b.png?sig=1"), "a b.png");
    }
}
