//! Shared tracing initialization — pipeline logs append to extractor.log.
//!
//! The host application shell and any test harness can call this so that
//! every pipeline event lands in one file under the app data directory.

use std::path::PathBuf;
use std::sync::Mutex;

/// Data directory for logs and the question library.
/// `~/.local/share/quizmill` (platform equivalent), cwd fallback.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quizmill")
}

/// Initialize tracing to `{data_dir}/extractor.log` (append mode).
pub fn init_file_tracing() {
    use tracing_subscriber::EnvFilter;

    let dir = data_dir();
    std::fs::create_dir_all(&dir).ok();
    let log_path = dir.join("extractor.log");

    // Append mode so the GUI shell and background workers share the file.
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("quizmill: cannot open {}: {}", log_path.display(), e);
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_target(true)
        .with_ansi(false)
        .init();
}
