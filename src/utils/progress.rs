use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar construction shared by the batch commands
pub struct ProgressUtils;

impl ProgressUtils {
    /// Spinner for store queries of unknown length
    pub fn create_query_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb
    }

    /// Progress bar for applying a batch of labels
    pub fn create_batch_progress(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("📋 [{elapsed_precise}] [{bar:40.yellow/cyan}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        pb
    }
}

/// Common progress bar messages
pub struct ProgressMessages;

impl ProgressMessages {
    pub const COLLECTING: &'static str = "Collecting assets without ALT text...";
    pub const COMPLETED: &'static str = "✅ Completed";

    pub fn applying(asset_id: i64) -> String {
        format!("🏷️  Asset #{}", asset_id)
    }
}
