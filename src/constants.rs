//! Application-wide constants

use std::path::PathBuf;

/// Maximum lines to retain in output buffer
pub const OUTPUT_BUFFER_SIZE: usize = 500;

/// Event poll timeout in milliseconds
pub const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Spinner animation interval in milliseconds
pub const SPINNER_TICK_MS: u128 = 100;

/// Channel buffer size for task messages
pub const TASK_CHANNEL_SIZE: usize = 100;

/// Exit code reported when a command could not be spawned at all
pub const SPAWN_FAILURE_CODE: i32 = 127;

/// Screen log filename (full task output, ANSI-stripped)
pub const SCREEN_LOG_FILE: &str = "screen.log";

/// Data directory for logs (~/.local/share/upkeep)
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("upkeep"))
        .unwrap_or_else(|| PathBuf::from("/tmp/upkeep"))
}

/// Config directory (~/.config/upkeep)
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("upkeep"))
        .unwrap_or_else(|| PathBuf::from("/tmp/upkeep"))
}
