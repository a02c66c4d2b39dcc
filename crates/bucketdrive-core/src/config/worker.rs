//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Scheduled task configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the in-process scheduler runs.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for the expired-link sweep.
    #[serde(default = "default_link_sweep_cron")]
    pub link_sweep_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            link_sweep_cron: default_link_sweep_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_link_sweep_cron() -> String {
    "0 */15 * * * *".to_string()
}
