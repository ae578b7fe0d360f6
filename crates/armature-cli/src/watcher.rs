// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! File system watching for recompilation.
//!
//! Debounced, extension-filtered, recursive watching over the source and
//! public directories. The callback receives project-relative paths and
//! runs on the watcher thread; callers serialize their own recompiles.

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Debounce window between a burst of file events and one callback.
const DEBOUNCE: Duration = Duration::from_millis(300);

/// File extensions that trigger a recompile.
const WATCHED_EXTENSIONS: [&str; 7] = ["ts", "tsx", "js", "jsx", "css", "html", "json"];

/// Watches the project for changes to compilable files.
pub struct FileWatcher {
    #[allow(dead_code)]
    debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl FileWatcher {
    /// Creates a watcher over `roots`.
    ///
    /// `base_path` is stripped from event paths before they reach
    /// `on_change`. Only files with a watched extension trigger the
    /// callback; a root that does not exist yet is skipped.
    pub fn new<F>(roots: Vec<PathBuf>, base_path: PathBuf, on_change: F) -> anyhow::Result<Self>
    where
        F: Fn(Vec<PathBuf>) + Send + 'static,
    {
        let mut debouncer = new_debouncer(DEBOUNCE, None, move |result: DebounceEventResult| {
            if let Ok(events) = &result {
                let changed_paths: Vec<PathBuf> = events
                    .iter()
                    .flat_map(|e| e.paths.iter())
                    .filter(|p| is_watched(p))
                    .map(|p| p.strip_prefix(&base_path).unwrap_or(p).to_path_buf())
                    .collect();

                if !changed_paths.is_empty() {
                    on_change(changed_paths);
                }
            }
        })?;

        for root in roots {
            if root.exists() {
                debouncer.watch(&root, RecursiveMode::Recursive)?;
            }
        }

        Ok(Self { debouncer })
    }
}

fn is_watched(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WATCHED_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watched_extensions_are_recognized() {
        assert!(is_watched(Path::new("src/index.tsx")));
        assert!(is_watched(Path::new("src/app.css")));
        assert!(is_watched(Path::new("public/index.html")));
        assert!(!is_watched(Path::new("src/notes.md")));
        assert!(!is_watched(Path::new("src/Makefile")));
    }
}
