use anyhow::Result;
use async_trait::async_trait;

use crate::providers::{StatusSink, StatusUpdate};

/// Status sink that reports progress through the log stream.
pub struct LogStatusSink;

#[async_trait]
impl StatusSink for LogStatusSink {
    async fn publish(&self, update: StatusUpdate) -> Result<()> {
        match &update.partial_error {
            Some(error) => tracing::info!(
                stage = update.stage,
                progress = update.progress_percent,
                %error,
                "pipeline progress"
            ),
            None => tracing::info!(
                stage = update.stage,
                progress = update.progress_percent,
                "pipeline progress"
            ),
        }
        Ok(())
    }
}
