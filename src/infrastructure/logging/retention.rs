//! Log retention
//!
//! Deletes rolled log files older than the configured retention period.
//! `tracing-appender` names rolled files `<prefix>.<date>`, so files are
//! matched by prefix rather than extension.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use tracing::{info, warn};

/// File name prefix of every log file written by the logger
pub const LOG_FILE_PREFIX: &str = "stepsync.log";

/// Retention policy for rolled log files
#[derive(Debug, Clone, Copy)]
pub struct LogRetention {
    retention_days: u32,
}

impl LogRetention {
    pub const fn new(retention_days: u32) -> Self {
        Self { retention_days }
    }

    /// Delete log files in `log_dir` last modified before the retention cutoff
    ///
    /// Returns the number of files deleted.
    pub async fn cleanup_old_logs(&self, log_dir: impl AsRef<Path>) -> Result<usize> {
        let log_dir = log_dir.as_ref();

        if !log_dir.exists() {
            warn!(path = %log_dir.display(), "log directory does not exist");
            return Ok(0);
        }

        let cutoff = Utc::now()
            .checked_sub_signed(Duration::days(i64::from(self.retention_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut deleted_count = 0;

        let mut entries = tokio::fs::read_dir(log_dir)
            .await
            .context("failed to read log directory")?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .context("failed to read directory entry")?
        {
            let path = entry.path();
            let is_log = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
            if !is_log {
                continue;
            }

            let modified: DateTime<Utc> = entry
                .metadata()
                .await
                .context("failed to get file metadata")?
                .modified()
                .context("failed to get file modification time")?
                .into();

            if modified < cutoff {
                tokio::fs::remove_file(&path)
                    .await
                    .context("failed to delete old log file")?;

                info!(path = %path.display(), age_days = (Utc::now() - modified).num_days(), "deleted old log file");
                deleted_count += 1;
            }
        }

        if deleted_count > 0 {
            info!(count = deleted_count, "cleaned up old log files");
        }

        Ok(deleted_count)
    }
}
