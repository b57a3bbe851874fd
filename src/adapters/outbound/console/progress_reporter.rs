use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// This adapter implements the ProgressReporter port, writing progress
/// information to stderr so it doesn't interfere with stdout output.
/// Uses indicatif for rich progress bar display. The bar is shared by the
/// worker tasks of a stage, so it sits behind a mutex.
pub struct StderrProgressReporter {
    progress_bar: Mutex<Option<ProgressBar>>,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            progress_bar: Mutex::new(None),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) - {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn get_or_create_progress_bar(&self, total: usize) -> Option<ProgressBar> {
        let mut slot = self.progress_bar.lock().ok()?;
        match slot.as_ref() {
            Some(pb) if pb.length() == Some(total as u64) && !pb.is_finished() => Some(pb.clone()),
            _ => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(Self::style());
                *slot = Some(pb.clone());
                Some(pb)
            }
        }
    }

    fn finish(&self) {
        if let Ok(mut slot) = self.progress_bar.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        match self.progress_bar.lock().ok().and_then(|slot| slot.clone()) {
            Some(pb) => pb.println(message),
            None => eprintln!("{}", message),
        }
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        let Some(pb) = self.get_or_create_progress_bar(total) else {
            return;
        };
        pb.set_position(current as u64);
        if let Some(msg) = message {
            pb.set_message(msg.to_string());
        }
        if current >= total {
            self.finish();
        }
    }

    fn report_completion(&self, message: &str) {
        self.finish();
        eprintln!();
        eprintln!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_progress_reporter_lifecycle() {
        let reporter = StderrProgressReporter::new();
        // Can't easily test stderr output, but verify it doesn't panic
        reporter.report("Test message");
        reporter.report_progress(5, 10, Some("graph-scan"));
        reporter.report("while the bar is visible");
        reporter.report_progress(10, 10, None);
        assert!(reporter.progress_bar.lock().unwrap().is_none());
        reporter.report_completion("Test completion");
    }

    #[test]
    fn test_new_total_starts_new_bar() {
        let reporter = StderrProgressReporter::new();
        reporter.report_progress(1, 10, None);
        reporter.report_progress(1, 4, None);
        let length = reporter.progress_bar.lock().unwrap().as_ref().and_then(|pb| pb.length());
        assert_eq!(length, Some(4));
    }

    #[test]
    fn test_shared_across_threads() {
        let reporter: Arc<dyn ProgressReporter> = Arc::new(StderrProgressReporter::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let reporter = Arc::clone(&reporter);
                std::thread::spawn(move || reporter.report_progress(i, 8, Some("worker")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
