//! all-posts use case (C9): drives pagination, sanitizes titles, and runs
//! C8 per post with bounded retry
use super::DownloadContext;
use crate::classify::parse_timestamp;
use crate::domain::{id_prefix, Post};
use crate::error::{AppError, Result};
use crate::sanitize;
use crate::usecase::single_post;
use crate::wire::RawPost;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument, warn};

const PAGE_SIZE: u32 = 20;
const MAX_POST_ATTEMPTS: u32 = 5;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// drive pagination for `author`, writing posts under `destination_root/author/...`
#[instrument(skip(ctx), fields(%author))]
pub async fn execute(author: &str, destination_root: &Path, delay_seconds: f64, ctx: &DownloadContext) -> Result<()> {
    let author_root = destination_root.join(author);
    tokio::fs::create_dir_all(&author_root).await?;

    let mut offset = String::new();
    let mut page_number = 0u32;

    loop {
        if ctx.cancel.is_cancelled() {
            return Err(AppError::DownloadCancelledError);
        }

        let page = ctx
            .client
            .execute_with_retry(|| ctx.client.get_author_posts(author, PAGE_SIZE, &offset))
            .await?;

        for raw_post in page.data {
            if ctx.cancel.is_cancelled() {
                return Err(AppError::DownloadCancelledError);
            }
            process_post(raw_post, &author_root, ctx).await?;
        }

        page_number += 1;
        info!(page_number, "finished page");

        if page.extra.is_last {
            break;
        }
        offset = page.extra.offset;

        tokio::time::sleep(Duration::from_secs_f64(delay_seconds)).await;
    }

    Ok(())
}

async fn process_post(raw_post: RawPost, author_root: &Path, ctx: &DownloadContext) -> Result<()> {
    if !raw_post.has_access {
        warn!(post_id = %raw_post.id, "skipping inaccessible post");
        ctx.progress.warning(&format!("skip (no access): {}", raw_post.id));
        return Ok(());
    }

    let title = if raw_post.title.trim().is_empty() {
        Post::synthesize_title(&raw_post.id)
    } else {
        raw_post.title.clone()
    };
    let sanitized_title = sanitize::sanitize(&title, 200).replace('.', "").trim().to_string();
    let created_at = parse_timestamp(&raw_post.created_at)?;

    let destination_dir = post_destination_dir(author_root, &sanitized_title, &raw_post.id, created_at);
    ctx.cache.ensure_folder_matches(&raw_post.id, &sanitized_title, created_at)?;

    run_with_retry(&destination_dir, raw_post, ctx).await
}

fn post_destination_dir(author_root: &Path, title: &str, id: &str, created_at: chrono::DateTime<chrono::Utc>) -> PathBuf {
    let date = created_at.format("%Y-%m-%d");
    let prefix = id_prefix(id);
    author_root.join(format!("{date} - {title} ({prefix})"))
}

pub(crate) async fn run_with_retry(destination_dir: &Path, raw_post: RawPost, ctx: &DownloadContext) -> Result<()> {
    let mut attempt = 0;
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match single_post::execute(destination_dir, raw_post.clone(), ctx).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_cancelled() => return Err(e),
            Err(AppError::DownloadError(msg)) if attempt + 1 < MAX_POST_ATTEMPTS => {
                attempt += 1;
                warn!(attempt, post_id = %raw_post.id, %msg, "post download failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
            Err(AppError::DownloadError(msg)) => {
                warn!(post_id = %raw_post.id, %msg, "post skipped after exhausting retries");
                ctx.progress.error(&format!("skip (download failed): {}", raw_post.id));
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PostCache;
    use crate::client::PlatformClient;
    use crate::domain::RenditionTier;
    use crate::external_video::NullExternalVideoDownloader;
    use crate::progress::NullReporter;
    use crate::usecase::DownloadContext;
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

    #[tokio::test]
    async fn paginates_until_is_last_and_writes_posts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blog/alice/post/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{
                    "id": "abcd1234",
                    "title": "Hello",
                    "createdAt": "2024-01-01T00:00:00Z",
                    "updatedAt": "2024-01-01T00:00:00Z",
                    "hasAccess": true,
                    "signedQuery": "",
                    "data": []
                }],
                "extra": { "offset": "", "is_last": true }
            })))
            .mount(&server)
            .await;

        let cache_dir = tempdir().unwrap();
        let dest_dir = tempdir().unwrap();
        let client = PlatformClient::new(&server.uri(), "", "").unwrap();
        let ctx = context(cache_dir.path(), client);

        execute("alice", dest_dir.path(), 1.0, &ctx).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dest_dir.path().join("alice")).unwrap().collect();
        assert!(entries.iter().any(|e| e.as_ref().unwrap().file_name().to_string_lossy().contains("Hello")));
    }

    #[tokio::test]
    async fn inaccessible_post_is_skipped_without_caching() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blog/alice/post/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{
                    "id": "lockedid",
                    "title": "Locked",
                    "createdAt": "2024-01-01T00:00:00Z",
                    "updatedAt": "2024-01-01T00:00:00Z",
                    "hasAccess": false,
                    "signedQuery": "",
                    "data": []
                }],
                "extra": { "offset": "", "is_last": true }
            })))
            .mount(&server)
            .await;

        let cache_dir = tempdir().unwrap();
        let dest_dir = tempdir().unwrap();
        let client = PlatformClient::new(&server.uri(), "", "").unwrap();
        let ctx = context(cache_dir.path(), client);

        execute("alice", dest_dir.path(), 1.0, &ctx).await.unwrap();

        let missing = ctx
            .cache
            .get_missing(
                "lockedid",
                "Locked",
                parse_timestamp("2024-01-01T00:00:00Z").unwrap(),
                &ctx.filters,
                dest_dir.path(),
            )
            .unwrap();
        assert_eq!(missing, ctx.filters);
    }
}
