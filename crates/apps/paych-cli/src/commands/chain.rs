//! Devnet commands.

use crate::config::CliConfig;
use crate::context::CliContext;
use crate::error::CliResult;
use crate::output::{ChainHeadOutput, OutputFormat, Render};

/// Execute the `chain head` command.
pub async fn head(config: CliConfig, format: OutputFormat) -> CliResult<String> {
    let ctx = CliContext::locked(config)?;
    let epoch = ctx.manager.epoch().await?;
    Ok(ChainHeadOutput { epoch }.render(format))
}

/// Execute the `chain mine` command.
pub fn mine(config: CliConfig, format: OutputFormat, blocks: u64) -> CliResult<String> {
    let ctx = CliContext::locked(config)?;
    let epoch = ctx.chain.mine(blocks)?;
    Ok(ChainHeadOutput { epoch }.render(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_mine_advances_head() {
        let temp_dir = TempDir::new().unwrap();
        let config = CliConfig::with_base_dir(temp_dir.path());

        let output = head(config.clone(), OutputFormat::Json).await.unwrap();
        assert!(output.contains("\"epoch\": 0"));

        mine(config.clone(), OutputFormat::Human, 3).unwrap();
        let output = mine(config.clone(), OutputFormat::Json, 2).unwrap();
        assert!(output.contains("\"epoch\": 5"));

        let output = head(config, OutputFormat::Json).await.unwrap();
        assert!(output.contains("\"epoch\": 5"));
    }
}
