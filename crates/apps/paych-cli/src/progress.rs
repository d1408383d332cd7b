//! Progress spinner for commands that wait on the chain.

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::output::OutputFormat;

/// Create a spinner progress bar with a message.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run an async operation with a spinner, returning the result.
///
/// The spinner only shows in human mode; JSON output stays clean.
pub async fn with_spinner<F, T>(format: OutputFormat, msg: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let pb = match format {
        OutputFormat::Human => spinner(msg),
        OutputFormat::Json => ProgressBar::hidden(),
    };
    let result = fut.await;
    pb.finish_and_clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_creation() {
        let pb = spinner("Testing...");
        pb.finish_with_message("Done");
    }

    #[tokio::test]
    async fn test_with_spinner() {
        let result = with_spinner(OutputFormat::Human, "Processing...", async { 42 }).await;
        assert_eq!(result, 42);

        let result = with_spinner(OutputFormat::Json, "Processing...", async { "quiet" }).await;
        assert_eq!(result, "quiet");
    }
}
