//! Progress display helpers for the pipeline stages

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a stage spinner, or `None` when progress display is disabled
/// (unattended runs keep their logs line-oriented).
pub fn create_stage_spinner(enabled: bool, message: &str) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(&format!("{{spinner}} {message}..."))
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    Some(pb)
}

/// Creates a byte progress bar for a download. Falls back to a spinner with a
/// byte counter when the server does not announce a length.
pub fn create_download_bar(enabled: bool, total_bytes: Option<u64>, file_name: &str) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let pb = match total_bytes {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {bytes} {msg}")
                    .unwrap()
                    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
            pb
        }
    };
    pb.set_message(file_name.to_string());
    Some(pb)
}

/// Clears a finished bar, if one was shown.
pub fn finish_progress_bar(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}
