//! Recursive discovery of markdown files under a documentation root.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect every markdown file under `root`, skipping hidden directories
/// and dependency-manager directories by name.
///
/// A missing root yields an empty list, not an error. Results are sorted
/// for deterministic ordering across rebuilds.
pub fn scan_markdown(root: &Path, extra_excludes: &[String]) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut default_excludes = vec![
        "**/.*/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/target/**".to_string(),
        "**/vendor/**".to_string(),
    ];
    default_excludes.extend(extra_excludes.iter().cloned());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                // One unreadable directory must not abort the walk.
                eprintln!("[scan] skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(".md") {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
