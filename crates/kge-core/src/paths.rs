//! Default Karabiner-Elements locations.
//!
//! - `~/.config/karabiner/karabiner.json`
//! - `~/.config/karabiner/complex_modifications/*.json`

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const HOST_DIR: &str = "karabiner";
const CONFIG_FILE: &str = "karabiner.json";
const RULESETS_DIR: &str = "complex_modifications";

pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(HOST_DIR))
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

pub fn rulesets_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(RULESETS_DIR))
}

/// `*.json` files directly inside `dir`, sorted. A missing dir lists nothing.
pub fn list_rulesets(dir: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    out.sort();
    out
}
