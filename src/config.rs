use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostics::CompileError;

pub const CONFIG_FILE: &str = "mi.toml";

/// Settings for one analysis run, read from the `[analyzer]` table of `mi.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Inject the standard library before user text.
    pub stdlib: bool,
    /// Treat warnings as a failed check.
    pub deny_warnings: bool,
    /// Stop recording errors after this many. 0 = unlimited.
    pub max_errors: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { stdlib: true, deny_warnings: false, max_errors: 100 }
    }
}

// ---- TOML deserialization types ----

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    analyzer: AnalyzerConfig,
}

// ---- Discovery ----

/// Walk from start_dir up to .git or FS root, looking for mi.toml.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        // .git may be a file in worktrees and submodules
        if dir.join(".git").exists() {
            return None;
        }
        if !dir.pop() {
            return None;
        }
    }
}

// ---- Parsing ----

pub fn parse_config(content: &str, path: &Path) -> Result<AnalyzerConfig, CompileError> {
    let parsed: TomlConfig = toml::from_str(content).map_err(|e| {
        CompileError::config(format!("{CONFIG_FILE}: invalid syntax: {e}"), path.to_path_buf())
    })?;
    Ok(parsed.analyzer)
}

pub fn load_config(path: &Path) -> Result<AnalyzerConfig, CompileError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CompileError::config(format!("{CONFIG_FILE}: could not read file: {e}"), path.to_path_buf())
    })?;
    parse_config(&content, path)
}

/// Configuration governing `source_file`: the nearest mi.toml, or defaults.
pub fn config_for_file(source_file: &Path) -> Result<AnalyzerConfig, CompileError> {
    let start = source_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    match find_config(start) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using analyzer config");
            load_config(&path)
        }
        None => Ok(AnalyzerConfig::default()),
    }
}
