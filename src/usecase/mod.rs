//! use cases (C8/C9): the orchestration layer sitting atop every leaf component
pub mod all_posts;
pub mod single_post;

use crate::cache::PostCache;
use crate::client::PlatformClient;
use crate::domain::{FilterCategory, RenditionTier};
use crate::external_video::ExternalVideoDownloader;
use crate::progress::ProgressReporter;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// the collaborators threaded explicitly through C8/C9 instead of a global
/// singleton (§9 "retrying HTTP session as an ambient capability")
pub struct DownloadContext {
    pub client: PlatformClient,
    pub external_video: Arc<dyn ExternalVideoDownloader>,
    pub cache: PostCache,
    pub filters: HashSet<FilterCategory>,
    pub preferred_quality: RenditionTier,
    pub progress: Arc<dyn ProgressReporter>,
    pub cancel: CancellationToken,
}
