//! Progress reporting for long-running exports

/// Progress callback, purely observational
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// One progress update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportProgress {
    /// What is being worked on, e.g. "Exporting Mesh body"
    pub task: String,
    /// 0..=100
    pub percent: u8,
}

impl ExportProgress {
    pub fn new(task: impl Into<String>, percent: u8) -> Self {
        Self {
            task: task.into(),
            percent: percent.min(100),
        }
    }
}

/// Forwards updates to an optional callback
#[derive(Default)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressCallback>) -> Self {
        Self { callback }
    }

    pub fn report(&self, task: impl Into<String>, percent: u8) {
        if let Some(callback) = &self.callback {
            callback(ExportProgress::new(task, percent));
        }
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_reporter_forwards_updates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new(Some(Box::new(move |p| {
            sink.lock().unwrap().push(p);
        })));

        reporter.report("Exporting Mesh body", 50);
        reporter.report("Done", 200);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].task, "Exporting Mesh body");
        assert_eq!(seen[1].percent, 100);
    }

    #[test]
    fn test_reporter_without_callback() {
        ProgressReporter::default().report("ignored", 10);
    }
}
