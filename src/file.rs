// src/file.rs

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::config::consts::MOD_FILE_PREFIX;
use crate::error::ToolError;

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::other(format!(
            "Path exists but is not a directory: {}",
            dir.display()
        )));
    }
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    Ok(())
}

/* ---------------- Mod files ---------------- */

/// `{"mod": ["paragraph", ...]}`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModFile {
    #[serde(rename = "mod")]
    pub paragraphs: Vec<String>,
}

/// `<dir>/mod.paragraphs.<band>`
pub fn mod_file_path(dir: &Path, band: &str) -> PathBuf {
    dir.join(format!("{MOD_FILE_PREFIX}.{band}"))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ToolError> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|source| ToolError::Json { path: path.to_path_buf(), source })?;
    fs::write(path, json + "\n")?;
    Ok(())
}

pub fn write_mod_file(path: &Path, paragraphs: &[String]) -> Result<(), ToolError> {
    write_json(path, &ModFile { paragraphs: paragraphs.to_vec() })
}

/// Paragraphs of a mod file, as stored. A file without a `mod` list is an error.
pub fn load_paragraphs(path: &Path) -> Result<Vec<String>, ToolError> {
    let text = fs::read_to_string(path)?;
    let file: ModFile = serde_json::from_str(&text)
        .map_err(|source| ToolError::Json { path: path.to_path_buf(), source })?;
    Ok(file.paragraphs)
}
