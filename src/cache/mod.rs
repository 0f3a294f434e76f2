//! durable per-author post cache (C4), backed by `redb` the same way the
//! teacher's `PostCache` persists post bodies — here it persists completion
//! state instead
mod record;

pub use record::CacheRecord;

use crate::domain::{id_prefix, FilterCategory};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const POSTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("posts");

pub const CACHE_FILENAME: &str = "post_cache.db";

/// durable per-(author, post id) completion cache. one instance per author
/// run; never shared across concurrent tasks (§5).
pub struct PostCache {
    db: Database,
    /// `<target_root>/<author>`, needed to build/rename post folders
    author_root: PathBuf,
}

impl PostCache {
    /// open (creating if absent) `post_cache.db` under `author_root`
    pub fn open(author_root: &Path) -> Result<Self> {
        std::fs::create_dir_all(author_root)?;
        let db_path = author_root.join(CACHE_FILENAME);
        let db = Database::create(&db_path)?;

        {
            let txn = db.begin_write()?;
            txn.open_table(POSTS_TABLE)?;
            txn.commit()?;
        }

        Ok(Self {
            db,
            author_root: author_root.to_path_buf(),
        })
    }

    fn get_record(&self, post_id: &str) -> Result<Option<CacheRecord>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(POSTS_TABLE)?;
        match table.get(post_id)? {
            Some(bytes) => {
                let record: CacheRecord = postcard::from_bytes(bytes.value())
                    .map_err(|e| AppError::CacheError(format!("corrupt cache record: {e}")))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn put_record(&self, record: &CacheRecord) -> Result<()> {
        let bytes = postcard::to_allocvec(record)
            .map_err(|e| AppError::CacheError(format!("failed to encode cache record: {e}")))?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(POSTS_TABLE)?;
            table.insert(record.post_id.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    fn delete_record(&self, post_id: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(POSTS_TABLE)?;
            table.remove(post_id)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// categories still needing download for this post, per §4.4
    pub fn get_missing(
        &self,
        post_id: &str,
        current_title: &str,
        remote_updated_at: DateTime<Utc>,
        requested: &HashSet<FilterCategory>,
        destination_dir: &Path,
    ) -> Result<HashSet<FilterCategory>> {
        let Some(record) = self.get_record(post_id)? else {
            return Ok(requested.clone());
        };

        let stale = record.last_updated != remote_updated_at
            || record.title != current_title
            || !destination_dir.exists();

        if stale {
            self.delete_record(post_id)?;
            return Ok(requested.clone());
        }

        let stored: HashSet<FilterCategory> = record.category_set();
        Ok(requested.difference(&stored).copied().collect())
    }

    /// rename `<date> - <old_title>` to `<date> - <current_title>` if the
    /// cached title differs and the old folder still exists, per §4.4
    pub fn ensure_folder_matches(
        &self,
        post_id: &str,
        current_title: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let Some(record) = self.get_record(post_id)? else {
            return Ok(());
        };

        if record.title == current_title {
            return Ok(());
        }

        let date = created_at.format("%Y-%m-%d");
        let prefix = id_prefix(post_id);
        let old_name = format!("{date} - {} ({prefix})", record.title);
        let new_name = format!("{date} - {current_title} ({prefix})");

        let old_path = self.author_root.join(&old_name);
        let new_path = self.author_root.join(&new_name);

        if old_path.exists() && !new_path.exists() {
            // best-effort: if the rename fails the post is simply
            // re-downloaded to the new location on this run
            let _ = std::fs::rename(&old_path, &new_path);
        }

        Ok(())
    }

    /// upsert the completion record, per §4.4. if a prior record exists with
    /// the same timestamp, the completed categories are unioned rather than
    /// replaced (so a partial-filter run atop an existing record accumulates).
    pub fn record_completion(
        &self,
        post_id: &str,
        title: &str,
        remote_updated_at: DateTime<Utc>,
        completed: &HashSet<FilterCategory>,
    ) -> Result<()> {
        let mut categories: HashSet<FilterCategory> = completed.clone();

        if let Some(existing) = self.get_record(post_id)? {
            if existing.last_updated == remote_updated_at {
                categories.extend(existing.category_set());
            }
        }

        let record = CacheRecord::new(post_id, title, remote_updated_at, &categories);
        self.put_record(&record)
    }

    pub fn purge(&self, post_id: &str) -> Result<()> {
        self.delete_record(post_id)
    }

    pub fn purge_all(&self) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(POSTS_TABLE)?;
            let keys: Vec<String> = table
                .iter()?
                .filter_map(|entry| entry.ok())
                .map(|(k, _)| k.value().to_string())
                .collect();
            for key in keys {
                table.remove(key.as_str())?;
            }
        }
        txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn missing_post_returns_all_requested() {
        let dir = tempdir().unwrap();
        let cache = PostCache::open(dir.path()).unwrap();
        let requested: HashSet<_> = [FilterCategory::Files, FilterCategory::PostContent]
            .into_iter()
            .collect();

        let missing = cache
            .get_missing("p1", "Title", ts("2024-01-01T00:00:00Z"), &requested, dir.path())
            .unwrap();
        assert_eq!(missing, requested);
    }

    #[test]
    fn cached_categories_are_subtracted() {
        let dir = tempdir().unwrap();
        let post_dir = dir.path().join("post");
        std::fs::create_dir_all(&post_dir).unwrap();
        let cache = PostCache::open(dir.path()).unwrap();

        let completed: HashSet<_> = [FilterCategory::Files].into_iter().collect();
        cache
            .record_completion("p1", "Title", ts("2024-01-01T00:00:00Z"), &completed)
            .unwrap();

        let requested: HashSet<_> = [FilterCategory::Files, FilterCategory::PostContent]
            .into_iter()
            .collect();
        let missing = cache
            .get_missing("p1", "Title", ts("2024-01-01T00:00:00Z"), &requested, &post_dir)
            .unwrap();
        assert_eq!(missing, [FilterCategory::PostContent].into_iter().collect());
    }

    #[test]
    fn staleness_triggers_full_redownload() {
        let dir = tempdir().unwrap();
        let post_dir = dir.path().join("post");
        std::fs::create_dir_all(&post_dir).unwrap();
        let cache = PostCache::open(dir.path()).unwrap();

        let completed: HashSet<_> = [FilterCategory::Files, FilterCategory::PostContent]
            .into_iter()
            .collect();
        cache
            .record_completion("p1", "Title", ts("2024-01-01T00:00:00Z"), &completed)
            .unwrap();

        let missing = cache
            .get_missing(
                "p1",
                "Title",
                ts("2024-02-01T00:00:00Z"),
                &completed,
                &post_dir,
            )
            .unwrap();
        assert_eq!(missing, completed);
    }

    #[test]
    fn missing_destination_dir_forces_redownload() {
        let dir = tempdir().unwrap();
        let cache = PostCache::open(dir.path()).unwrap();
        let requested: HashSet<_> = [FilterCategory::Files].into_iter().collect();
        cache
            .record_completion("p1", "Title", ts("2024-01-01T00:00:00Z"), &requested)
            .unwrap();

        let vanished = dir.path().join("gone");
        let missing = cache
            .get_missing("p1", "Title", ts("2024-01-01T00:00:00Z"), &requested, &vanished)
            .unwrap();
        assert_eq!(missing, requested);
    }

    #[test]
    fn record_completion_unions_same_timestamp() {
        let dir = tempdir().unwrap();
        let post_dir = dir.path().join("post");
        std::fs::create_dir_all(&post_dir).unwrap();
        let cache = PostCache::open(dir.path()).unwrap();
        let ts1 = ts("2024-01-01T00:00:00Z");

        cache
            .record_completion("p1", "Title", ts1, &[FilterCategory::Files].into_iter().collect())
            .unwrap();
        cache
            .record_completion(
                "p1",
                "Title",
                ts1,
                &[FilterCategory::PostContent].into_iter().collect(),
            )
            .unwrap();

        let missing = cache
            .get_missing(
                "p1",
                "Title",
                ts1,
                &[FilterCategory::Files, FilterCategory::PostContent]
                    .into_iter()
                    .collect(),
                &post_dir,
            )
            .unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn ensure_folder_matches_renames_on_title_change() {
        let dir = tempdir().unwrap();
        let created = ts("2024-01-01T00:00:00Z");
        let cache = PostCache::open(dir.path()).unwrap();
        cache
            .record_completion(
                "p1abcdef",
                "Old",
                created,
                &[FilterCategory::Files].into_iter().collect(),
            )
            .unwrap();

        let old_dir = dir.path().join("2024-01-01 - Old (p1abcdef)");
        std::fs::create_dir_all(&old_dir).unwrap();

        cache.ensure_folder_matches("p1abcdef", "New", created).unwrap();

        let new_dir = dir.path().join("2024-01-01 - New (p1abcdef)");
        assert!(new_dir.exists());
        assert!(!old_dir.exists());
    }

    #[test]
    fn purge_removes_record() {
        let dir = tempdir().unwrap();
        let post_dir = dir.path().join("post");
        std::fs::create_dir_all(&post_dir).unwrap();
        let cache = PostCache::open(dir.path()).unwrap();
        let cats: HashSet<_> = [FilterCategory::Files].into_iter().collect();
        cache
            .record_completion("p1", "Title", ts("2024-01-01T00:00:00Z"), &cats)
            .unwrap();

        cache.purge("p1").unwrap();

        let missing = cache
            .get_missing("p1", "Title", ts("2024-01-01T00:00:00Z"), &cats, &post_dir)
            .unwrap();
        assert_eq!(missing, cats);
    }

    #[test]
    fn cache_survives_reopen() {
        let dir = tempdir().unwrap();
        let post_dir = dir.path().join("post");
        std::fs::create_dir_all(&post_dir).unwrap();
        let cats: HashSet<_> = [FilterCategory::Files].into_iter().collect();

        {
            let cache = PostCache::open(dir.path()).unwrap();
            cache
                .record_completion("p1", "Title", ts("2024-01-01T00:00:00Z"), &cats)
                .unwrap();
        }

        let cache = PostCache::open(dir.path()).unwrap();
        let missing = cache
            .get_missing("p1", "Title", ts("2024-01-01T00:00:00Z"), &cats, &post_dir)
            .unwrap();
        assert!(missing.is_empty());
    }
}
