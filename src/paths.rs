/// Path resolution for config and capture output.
///
/// When the binary runs inside a macOS `.app` bundle the working directory is
/// unpredictable (Finder sets it to `/`), so the config lives in the user's
/// config directory. During development (`cargo run`) it stays in the
/// project working directory.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "ar-measure";

/// Returns `true` when the running binary lives inside a macOS `.app` bundle
/// (i.e. the executable path contains `*.app/Contents/MacOS/`).
pub fn is_bundled() -> bool {
    bundle_contents_dir().is_some()
}

/// Returns the `Contents/` directory of the enclosing `.app` bundle, or
/// `None` when running outside a bundle.
fn bundle_contents_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let mut path = exe.as_path();
    loop {
        let parent = path.parent()?;
        if path.file_name().map(|n| n == "MacOS").unwrap_or(false)
            && parent.file_name().map(|n| n == "Contents").unwrap_or(false)
        {
            return Some(parent.to_path_buf());
        }
        path = parent;
    }
}

/// Configuration directory.
///
/// - **Bundled**: platform config dir, e.g. `~/Library/Application Support/ar-measure/`
/// - **Dev**: current working directory
pub fn config_dir() -> PathBuf {
    if is_bundled() {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR)
    } else {
        std::env::current_dir().unwrap_or_default()
    }
}

/// Where snapshots are written. Transient: the system temp directory.
pub fn capture_dir() -> PathBuf {
    std::env::temp_dir().join(APP_DIR)
}

/// Ensure a directory exists, creating it and all parents if necessary.
/// Returns the path unchanged for chaining.
pub fn ensure_dir(path: &Path) -> &Path {
    let _ = std::fs::create_dir_all(path);
    path
}
