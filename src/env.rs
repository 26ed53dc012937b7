// Env file module: a small `.env` reader that copies `KEY=VALUE` pairs into
// the process environment before the configuration is built. Variables that
// are already set always win over the file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// File name looked up next to the executable, in the working directory and
/// in the user's config directory.
pub const DOTENV_FILE: &str = ".env";

/// Parse `.env` content into `(key, value)` pairs in file order.
///
/// Blank lines, `#` comments and lines without `=` are skipped. Keys and
/// values are trimmed and one layer of matching `"` or `'` quotes is removed
/// from the value.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        if line.is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        pairs.push((key.to_string(), strip_quotes(value.trim()).to_string()));
    }
    pairs
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Load `path` into the process environment without overwriting anything
/// that is already set. Returns how many variables were newly set.
///
/// A missing file is a silent no-op; read errors are logged as warnings and
/// never abort the program.
pub fn load_dotenv(path: &Path) -> usize {
    if !path.exists() {
        return 0;
    }
    match apply_file(path) {
        Ok(applied) => {
            log::debug!("loaded {} variable(s) from {}", applied, path.display());
            applied
        }
        Err(e) => {
            log::warn!(".env load failed: {:#}", e);
            0
        }
    }
}

fn apply_file(path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut applied = 0;
    for (key, value) in parse_dotenv(&content) {
        if key.contains('\0') || value.contains('\0') {
            log::warn!("skipping {} in {}: NUL byte", key.replace('\0', "\\0"), path.display());
            continue;
        }
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
            applied += 1;
        }
    }
    Ok(applied)
}

/// Files to load, highest precedence first. An explicit path replaces the
/// default search list.
pub fn dotenv_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(DOTENV_FILE));
    }
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join(DOTENV_FILE);
        if !candidates.contains(&path) {
            candidates.push(path);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("veg-poster").join(DOTENV_FILE));
    }
    candidates
}

/// Load every candidate in order. Earlier files win because loading never
/// overwrites.
pub fn load_all(explicit: Option<&Path>) -> usize {
    dotenv_candidates(explicit)
        .iter()
        .map(|path| load_dotenv(path))
        .sum()
}
