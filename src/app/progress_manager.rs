//! Progress UI (spinner) for search runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Which query the search is currently on, shared with the spinner task.
#[derive(Debug, Default)]
pub(crate) struct QueryProgress {
    current: AtomicUsize,
    query: Mutex<String>,
}

impl QueryProgress {
    /// Records that query number `number` (1-based) has started.
    pub(crate) fn start_query(&self, number: usize, query: &str) {
        self.current.store(number, Ordering::SeqCst);
        if let Ok(mut current) = self.query.lock() {
            query.clone_into(&mut current);
        }
    }

    fn message(&self, total: usize) -> String {
        let current = self.current.load(Ordering::SeqCst).min(total);
        let query = self
            .query
            .lock()
            .map(|query| query.clone())
            .unwrap_or_default();
        if query.is_empty() {
            format!("[{current}/{total}] Searching...")
        } else {
            format!("[{current}/{total}] Searching \"{query}\"...")
        }
    }
}

/// Spawns the progress UI (spinner) when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_spinner` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_spinner: bool,
    progress: Arc<QueryProgress>,
    total: usize,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_spinner {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_spinner_inner(progress, total, Arc::clone(&stop));
    (Some(handle), stop)
}

fn spawn_spinner_inner(
    progress: Arc<QueryProgress>,
    total: usize,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        while !stop.load(Ordering::SeqCst) {
            spinner.set_message(progress.message(total));
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        spinner.finish_and_clear();
    })
}
