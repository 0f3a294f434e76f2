use serde::{Deserialize, Serialize};
use std::fmt;

/// one of the closed set of content categories a run can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    PostContent,
    Files,
    BoostyVideos,
    ExternalVideos,
    Audio,
}

impl FilterCategory {
    /// every category, used as the default "download everything" request
    pub const ALL: [FilterCategory; 5] = [
        FilterCategory::PostContent,
        FilterCategory::Files,
        FilterCategory::BoostyVideos,
        FilterCategory::ExternalVideos,
        FilterCategory::Audio,
    ];

    /// the string stored in the cache record, stable across releases
    pub fn as_str(self) -> &'static str {
        match self {
            FilterCategory::PostContent => "post_content",
            FilterCategory::Files => "files",
            FilterCategory::BoostyVideos => "boosty_videos",
            FilterCategory::ExternalVideos => "external_videos",
            FilterCategory::Audio => "audio",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<FilterCategory> {
        Some(match s {
            "post_content" => FilterCategory::PostContent,
            "files" => FilterCategory::Files,
            "boosty_videos" => FilterCategory::BoostyVideos,
            "external_videos" => FilterCategory::ExternalVideos,
            "audio" => FilterCategory::Audio,
            _ => return None,
        })
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
