/// Something that can show the user an export is running.
pub trait ProgressIndicator: Send + Sync {
    fn show(&self, message: &str);
    fn hide(&self);
}

/// Shows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;
impl ProgressIndicator for NoProgress {
    fn show(&self, _message: &str) {}
    fn hide(&self) {}
}

/// Reports progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;
impl ProgressIndicator for LogProgress {
    fn show(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn hide(&self) {
        tracing::debug!("Done");
    }
}

/// Keeps an indicator visible for as long as it lives.
///
/// `hide` runs exactly once, when the guard is dropped, whether the export
/// returned normally, bailed out with `?`, or its future was dropped
/// mid-flight.
#[must_use = "the indicator is hidden as soon as the guard is dropped"]
pub struct ProgressGuard<'a> {
    indicator: &'a dyn ProgressIndicator,
}

impl<'a> ProgressGuard<'a> {
    pub fn show(indicator: &'a dyn ProgressIndicator, message: &str) -> Self {
        indicator.show(message);
        Self { indicator }
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.indicator.hide();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every call, for asserting on show/hide pairing.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingProgress {
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl RecordingProgress {
        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProgressIndicator for RecordingProgress {
        fn show(&self, message: &str) {
            self.calls.lock().unwrap().push(format!("show: {message}"));
        }

        fn hide(&self) {
            self.calls.lock().unwrap().push("hide".to_string());
        }
    }

    #[test]
    fn test_guard_hides_on_drop() {
        let progress = RecordingProgress::default();
        {
            let _guard = ProgressGuard::show(&progress, "Working");
            assert_eq!(progress.calls(), ["show: Working"]);
        }
        assert_eq!(progress.calls(), ["show: Working", "hide"]);
    }

    #[test]
    fn test_guard_hides_on_early_return() {
        fn fails(progress: &dyn ProgressIndicator) -> Result<(), ()> {
            let _guard = ProgressGuard::show(progress, "Working");
            Err(())?;
            Ok(())
        }
        let progress = RecordingProgress::default();
        assert!(fails(&progress).is_err());
        assert_eq!(progress.calls(), ["show: Working", "hide"]);
    }
}
