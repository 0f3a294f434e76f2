//! command-line argument parsing (A3); a thin, out-of-scope shim that maps
//! flags onto the typed `RunOptions` the core actually consumes
use crate::domain::{FilterCategory, RenditionTier};
use clap::{Parser, ValueEnum};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ContentTypeFilterArg {
    Files,
    PostContent,
    BoostyVideos,
    ExternalVideos,
}

impl From<ContentTypeFilterArg> for FilterCategory {
    fn from(arg: ContentTypeFilterArg) -> Self {
        match arg {
            ContentTypeFilterArg::Files => FilterCategory::Files,
            ContentTypeFilterArg::PostContent => FilterCategory::PostContent,
            ContentTypeFilterArg::BoostyVideos => FilterCategory::BoostyVideos,
            ContentTypeFilterArg::ExternalVideos => FilterCategory::ExternalVideos,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum VideoQualityArg {
    SmallestSize,
    Low,
    Medium,
    High,
    Highest,
}

impl From<VideoQualityArg> for RenditionTier {
    fn from(arg: VideoQualityArg) -> Self {
        match arg {
            VideoQualityArg::SmallestSize => RenditionTier::Lowest,
            VideoQualityArg::Low => RenditionTier::Low,
            VideoQualityArg::Medium => RenditionTier::Medium,
            VideoQualityArg::High => RenditionTier::High,
            VideoQualityArg::Highest => RenditionTier::UltraHd,
        }
    }
}

/// archives a subscription blog author's posts
#[derive(Debug, Parser)]
#[command(name = "boosty-dl", version, about)]
pub struct Cli {
    /// author handle to archive
    pub username: String,

    /// single-post mode: archive only this post url
    #[arg(short = 'p', long)]
    pub post_url: Option<String>,

    /// content categories to download (repeatable, default: all)
    #[arg(short = 'f', long = "content-type-filter")]
    pub content_type_filter: Vec<ContentTypeFilterArg>,

    /// preferred platform-video rendition
    #[arg(short = 'q', long, default_value = "high")]
    pub preferred_video_quality: VideoQualityArg,

    /// seconds to wait between pagination requests, minimum 1.0
    #[arg(short = 'd', long, default_value_t = 2.5)]
    pub request_delay_seconds: f64,

    /// count posts and exit
    #[arg(short = 't', long)]
    pub total_post_check: bool,

    /// purge the cache for this author and exit
    #[arg(short = 'c', long)]
    pub clean_cache: bool,

    /// overrides the config file's target directory
    #[arg(long)]
    pub destination_directory: Option<PathBuf>,

    /// path to config.yaml
    #[arg(long = "config", default_value = "config.yaml")]
    pub config_path: PathBuf,
}

/// flags resolved into the domain types the core consumes (§3 `RunOptions`)
pub struct RunOptions {
    pub username: String,
    pub post_url: Option<String>,
    pub filters: HashSet<FilterCategory>,
    pub preferred_quality: RenditionTier,
    pub request_delay_seconds: f64,
    pub total_post_check: bool,
    pub clean_cache: bool,
    pub destination_directory: Option<PathBuf>,
    pub config_path: PathBuf,
}

impl Cli {
    pub fn into_run_options(self) -> RunOptions {
        let filters: HashSet<FilterCategory> = if self.content_type_filter.is_empty() {
            FilterCategory::ALL.into_iter().collect()
        } else {
            self.content_type_filter.into_iter().map(FilterCategory::from).collect()
        };

        RunOptions {
            username: self.username,
            post_url: self.post_url,
            filters,
            preferred_quality: self.preferred_video_quality.into(),
            request_delay_seconds: self.request_delay_seconds.max(1.0),
            total_post_check: self.total_post_check,
            clean_cache: self.clean_cache,
            destination_directory: self.destination_directory,
            config_path: self.config_path,
        }
    }
}
