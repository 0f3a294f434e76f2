use crate::domain::FilterCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// on-disk representation of a cache row; serialized with `postcard` the
/// same way the teacher persists `E6Post` into `redb`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub post_id: String,
    pub title: String,
    pub last_updated: DateTime<Utc>,
    pub categories: Vec<String>,
}

impl CacheRecord {
    pub fn new(
        post_id: &str,
        title: &str,
        last_updated: DateTime<Utc>,
        categories: &HashSet<FilterCategory>,
    ) -> Self {
        Self {
            post_id: post_id.to_string(),
            title: title.to_string(),
            last_updated,
            categories: categories.iter().map(|c| c.as_str().to_string()).collect(),
        }
    }

    pub fn category_set(&self) -> HashSet<FilterCategory> {
        self.categories
            .iter()
            .filter_map(|s| FilterCategory::from_str_opt(s))
            .collect()
    }
}
