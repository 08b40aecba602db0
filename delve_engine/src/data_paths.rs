use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "DELVE_DATA_DIR";

/// Cached path to the directory containing the game's data files.
static DATA_ROOT: LazyLock<PathBuf> = LazyLock::new(detect_data_root);

/// The resolved data root.
pub fn data_root() -> &'static Path {
    DATA_ROOT.as_path()
}

/// Resolve the most likely location of the data directory.
fn detect_data_root() -> PathBuf {
    let mut candidates = Vec::new();

    if let Ok(dir) = env::var(DATA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        candidates.push(PathBuf::from(dir));
    }

    // Common layouts: workspace root and flattened `data/`.
    candidates.push(PathBuf::from("delve_engine/data"));
    candidates.push(PathBuf::from("data"));

    if let Ok(exe_path) = env::current_exe()
        && let Some(dir) = exe_path.parent()
    {
        candidates.push(dir.join("delve_engine/data"));
        candidates.push(dir.join("data"));

        if let Some(parent) = dir.parent() {
            candidates.push(parent.join("delve_engine/data"));
            candidates.push(parent.join("data"));
        }
    }

    candidates
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from("delve_engine/data"))
}
