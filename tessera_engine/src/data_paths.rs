use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Environment variable that overrides data root detection.
pub const DATA_DIR_ENV: &str = "TESSERA_DATA_DIR";

const ENGINE_DATA_DIR: &str = "tessera_engine/data";

/// Cached path to the directory holding authored conversation and event documents.
static DATA_ROOT: LazyLock<PathBuf> = LazyLock::new(|| {
    env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| detect_data_root(env::current_exe().ok().as_deref()))
});

/// Construct a data path relative to the resolved data root.
pub fn data_path(relative: impl AsRef<Path>) -> PathBuf {
    DATA_ROOT.join(relative)
}

/// Resolve the most likely location of the data directory.
fn detect_data_root(exe_path: Option<&Path>) -> PathBuf {
    candidate_roots(exe_path)
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from(ENGINE_DATA_DIR))
}

fn candidate_roots(exe_path: Option<&Path>) -> Vec<PathBuf> {
    // workspace root first, then a flattened `data/` next to the binary
    let mut candidates = vec![PathBuf::from(ENGINE_DATA_DIR), PathBuf::from("data")];

    if let Some(dir) = exe_path.and_then(Path::parent) {
        candidates.push(dir.join(ENGINE_DATA_DIR));
        candidates.push(dir.join("data"));

        if let Some(parent) = dir.parent() {
            candidates.push(parent.join(ENGINE_DATA_DIR));
            candidates.push(parent.join("data"));
        }
    }
    candidates
}
