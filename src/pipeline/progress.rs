// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for query/source pairs
// reference: uses indicatif for progress bars and tracks fetch metrics

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub pairs_succeeded: usize,
    pub pairs_failed: usize,
    pub patents_written: usize,
    pub duplicates_skipped: usize,
    pub duration_secs: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pairs_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        (self.pairs_succeeded + self.pairs_failed) as f64 / self.duration_secs as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.pairs_succeeded + self.pairs_failed;
        if total == 0 {
            return 0.0;
        }
        (self.pairs_succeeded as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    pairs_succeeded: AtomicUsize,
    pairs_failed: AtomicUsize,
    patents_written: AtomicUsize,
    duplicates_skipped: AtomicUsize,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn with_color(total_pairs: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();
        Self::build(multi_progress, total_pairs, colored)
    }

    /// A tracker that counts but never draws.
    pub fn hidden(total_pairs: usize) -> Self {
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        Self::build(multi_progress, total_pairs, false)
    }

    fn build(multi_progress: MultiProgress, total_pairs: usize, colored: bool) -> Self {
        let main_bar = create_progress_bar(&multi_progress, total_pairs as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            pairs_succeeded: AtomicUsize::new(0),
            pairs_failed: AtomicUsize::new(0),
            patents_written: AtomicUsize::new(0),
            duplicates_skipped: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn start_pair(&self, query: &str, source: &str) {
        self.main_bar.set_message(format!("{} @ {}", query, source));
    }

    pub fn inc_pairs_succeeded(&self) {
        self.pairs_succeeded.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_pairs_failed(&self) {
        self.pairs_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn add_patent(&self) {
        self.patents_written.fetch_add(1, Ordering::SeqCst);
        self.update_detail_bar();
    }

    pub fn add_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Download complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            pairs_succeeded: self.pairs_succeeded.load(Ordering::SeqCst),
            pairs_failed: self.pairs_failed.load(Ordering::SeqCst),
            patents_written: self.patents_written.load(Ordering::SeqCst),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let patents = self.patents_written.load(Ordering::SeqCst);
        let failed = self.pairs_failed.load(Ordering::SeqCst);

        self.detail_bar
            .set_message(format!("Patents: {} | Failed pairs: {}", patents, failed));
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    if colored {
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )
                .expect("Failed to create progress bar template")
                .progress_chars("█▓▒░"),
        );
    } else {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}")
                .expect("Failed to create progress bar template")
                .progress_chars("=>-"),
        );
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .expect("Failed to create detail bar template");
    bar.set_style(style);
    bar
}
