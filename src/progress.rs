//! hierarchical progress reporting (C10)
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// total for a task, when known up front
#[derive(Debug, Clone, Copy)]
pub enum Total {
    Known(u64),
    Unknown,
}

/// an indent level in the implicit page/post/file tree (§4.10)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Page = 0,
    Post = 1,
    File = 2,
}

/// narrow interface the core depends on; `implementations SHOULD queue
/// updates onto a single renderer to avoid torn output` (§9). A null-object
/// implementation ([`NullReporter`]) is required for tests.
pub trait ProgressReporter: Send + Sync {
    fn create_task(&self, description: &str, total: Total, level: Level) -> TaskId;
    fn update_task(&self, task: TaskId, advance: u64, total: Option<u64>, description: Option<&str>);
    fn complete_task(&self, task: TaskId);

    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
    fn success(&self, message: &str);
    fn notice(&self, message: &str);
    fn wait(&self, message: &str);
}

/// opaque handle to a created task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// [`indicatif`]-backed renderer, mirrors the teacher's `ProgressManager`
/// (`MultiProgress` + `Arc<RwLock<HashMap<..>>>`) generalized from a flat bar
/// registry to the indent-level task tree §4.10 requires.
pub struct IndicatifReporter {
    multi: MultiProgress,
    bars: RwLock<HashMap<u64, ProgressBar>>,
    next_id: std::sync::atomic::AtomicU64,
}

impl IndicatifReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            multi: MultiProgress::new(),
            bars: RwLock::new(HashMap::new()),
            next_id: std::sync::atomic::AtomicU64::new(0),
        })
    }

    fn style_for(level: Level, total: Total) -> ProgressStyle {
        let indent = "  ".repeat(level as usize);
        let template = match total {
            Total::Known(_) => format!(
                "{indent}{{spinner:.green}} {{msg}} [{{bar:25}}] {{pos}}/{{len}}"
            ),
            Total::Unknown => format!("{indent}{{spinner:.green}} {{msg}} {{pos}} bytes"),
        };
        ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }
}

impl ProgressReporter for IndicatifReporter {
    fn create_task(&self, description: &str, total: Total, level: Level) -> TaskId {
        let id = self.next_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let len = match total {
            Total::Known(n) => n,
            Total::Unknown => u64::MAX,
        };

        let bar = self.multi.add(ProgressBar::new(len));
        bar.set_style(Self::style_for(level, total));
        bar.set_message(description.to_string());

        self.bars.write().expect("progress bar map poisoned").insert(id, bar);
        TaskId(id)
    }

    fn update_task(&self, task: TaskId, advance: u64, total: Option<u64>, description: Option<&str>) {
        let bars = self.bars.read().expect("progress bar map poisoned");
        if let Some(bar) = bars.get(&task.0) {
            if let Some(total) = total {
                bar.set_length(total);
            }
            if let Some(description) = description {
                bar.set_message(description.to_string());
            }
            bar.inc(advance);
        }
    }

    fn complete_task(&self, task: TaskId) {
        let mut bars = self.bars.write().expect("progress bar map poisoned");
        if let Some(bar) = bars.remove(&task.0) {
            bar.finish_and_clear();
        }
    }

    fn info(&self, message: &str) {
        self.multi.suspend(|| tracing::info!("{message}"));
    }

    fn warning(&self, message: &str) {
        self.multi.suspend(|| tracing::warn!("{message}"));
    }

    fn error(&self, message: &str) {
        self.multi.suspend(|| tracing::error!("{message}"));
    }

    fn success(&self, message: &str) {
        self.multi.suspend(|| tracing::info!("{message}"));
    }

    fn notice(&self, message: &str) {
        self.multi.suspend(|| tracing::info!("{message}"));
    }

    fn wait(&self, message: &str) {
        self.multi.suspend(|| tracing::info!("{message}"));
    }
}

/// discards every update; required by §9 for deterministic tests
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn create_task(&self, _description: &str, _total: Total, _level: Level) -> TaskId {
        TaskId(0)
    }

    fn update_task(&self, _task: TaskId, _advance: u64, _total: Option<u64>, _description: Option<&str>) {}

    fn complete_task(&self, _task: TaskId) {}

    fn info(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn notice(&self, _message: &str) {}
    fn wait(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_reporter_never_panics() {
        let reporter = NullReporter;
        let task = reporter.create_task("x", Total::Known(10), Level::File);
        reporter.update_task(task, 5, None, None);
        reporter.complete_task(task);
        reporter.info("hi");
        reporter.notice("hi");
        reporter.wait("hi");
    }
}
