//! top-level wiring: parses arguments, loads configuration, assembles the
//! download context, and dispatches to the use cases
use crate::app::logging;
use crate::cache::PostCache;
use crate::cli::Cli;
use crate::client::PlatformClient;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::external_video::{ExternalVideoDownloader, ProcessExternalVideoDownloader};
use crate::progress::{IndicatifReporter, ProgressReporter};
use crate::usecase::{all_posts, DownloadContext};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

const PLATFORM_BASE_URL: &str = "https://api.boosty.to/v1";

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let options = cli.into_run_options();

    logging::setup()?;

    let config = Config::load(&options.config_path)?;
    let target_root = options
        .destination_directory
        .clone()
        .unwrap_or_else(|| config.downloading_settings.target_directory.clone());

    let client = PlatformClient::new(PLATFORM_BASE_URL, &config.auth.cookie, &config.auth.auth_header)?;
    let author_root = target_root.join(&options.username);
    let cache = PostCache::open(&author_root)?;

    if options.clean_cache {
        cache.purge_all()?;
        info!(username = %options.username, "cache cleared");
        return Ok(());
    }

    if options.total_post_check {
        let count = count_posts(&client, &options.username).await?;
        println!("{count}");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    let reporter: Arc<dyn ProgressReporter> = IndicatifReporter::new();
    let external_video: Arc<dyn ExternalVideoDownloader> =
        Arc::new(ProcessExternalVideoDownloader::new("yt-dlp", vec!["-o".to_string(), "{dest}/%(title)s.%(ext)s".to_string(), "{url}".to_string()]));

    let ctx = DownloadContext {
        client,
        external_video,
        cache,
        filters: options.filters,
        preferred_quality: options.preferred_quality,
        progress: reporter,
        cancel,
    };

    match options.post_url {
        Some(post_url) => run_single_post(&options.username, &post_url, &target_root, &ctx).await,
        None => all_posts::execute(&options.username, &target_root, options.request_delay_seconds, &ctx).await,
    }
}

async fn run_single_post(author: &str, post_url: &str, target_root: &std::path::Path, ctx: &DownloadContext) -> Result<()> {
    let post_id = post_id_from_url(post_url);
    let raw_post = ctx.client.get_post(author, post_id).await?;

    let author_root = target_root.join(author);
    tokio::fs::create_dir_all(&author_root).await?;

    let title = if raw_post.title.trim().is_empty() {
        crate::domain::Post::synthesize_title(&raw_post.id)
    } else {
        raw_post.title.clone()
    };
    let sanitized_title = crate::sanitize::sanitize(&title, 200).replace('.', "").trim().to_string();
    let created_at = crate::classify::parse_timestamp(&raw_post.created_at)?;
    let date = created_at.format("%Y-%m-%d");
    let prefix = crate::domain::id_prefix(&raw_post.id);
    let destination_dir = author_root.join(format!("{date} - {sanitized_title} ({prefix})"));

    ctx.cache.ensure_folder_matches(&raw_post.id, &sanitized_title, created_at)?;
    all_posts::run_with_retry(&destination_dir, raw_post, ctx).await
}

fn post_id_from_url(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

async fn count_posts(client: &PlatformClient, author: &str) -> Result<usize> {
    let mut offset = String::new();
    let mut total = 0usize;
    loop {
        let page = client.execute_with_retry(|| client.get_author_posts(author, 50, &offset)).await?;
        total += page.data.len();
        if page.extra.is_last {
            break;
        }
        offset = page.extra.offset;
    }
    Ok(total)
}

fn spawn_interrupt_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            cancel.cancel();
        }
    });
}

/// maps each fatal error kind to a distinct process exit code (§7), so
/// wrapper scripts can distinguish failure modes without parsing log lines
pub fn exit_code(err: &AppError) -> i32 {
    match err {
        AppError::NoUsername(_) => 2,
        AppError::Unauthorized => 3,
        AppError::ValidationError(_) => 4,
        AppError::UnknownApiError { .. } => 5,
        AppError::ConfigError(_) => 6,
        AppError::CacheError(_) => 7,
        AppError::DownloadCancelledError => 130,
        _ => 1,
    }
}
