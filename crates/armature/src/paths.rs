// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Fixed project filesystem locations.
//!
//! All locations are derived from an explicit project root by string
//! joining only. Resolution never touches the filesystem, so it is safe to
//! call before any of the directories exist; a missing directory is a
//! concern for later stages.

use std::path::{Path, PathBuf};

/// The fixed set of locations every build and serve run works with.
///
/// Computed once per process, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Project root.
    pub root: PathBuf,
    /// Source tree (`src/`).
    pub src: PathBuf,
    /// Static assets copied verbatim into the output (`public/`).
    pub public: PathBuf,
    /// Bundled asset sources referenced from code (`src/assets/`).
    pub assets: PathBuf,
    /// Build output directory (`dist/`).
    pub dist: PathBuf,
    /// Type-check configuration file (`tsconfig.json`).
    pub tsconfig: PathBuf,
}

impl ResolvedPaths {
    /// Resolves all fixed locations under `root`.
    pub fn resolve(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            src: root.join("src"),
            public: root.join("public"),
            assets: root.join("src").join("assets"),
            dist: root.join("dist"),
            tsconfig: root.join("tsconfig.json"),
        }
    }

    /// The HTML entry template inside the public directory.
    pub fn html_template(&self) -> PathBuf {
        self.public.join("index.html")
    }

    /// The service-worker source, compiled in production when present.
    pub fn service_worker(&self) -> PathBuf {
        self.src.join("serviceWorker.ts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_hang_off_the_given_root() {
        let paths = ResolvedPaths::resolve(Path::new("/work/app"));
        assert_eq!(paths.root, Path::new("/work/app"));
        assert_eq!(paths.src, Path::new("/work/app/src"));
        assert_eq!(paths.public, Path::new("/work/app/public"));
        assert_eq!(paths.assets, Path::new("/work/app/src/assets"));
        assert_eq!(paths.dist, Path::new("/work/app/dist"));
        assert_eq!(paths.tsconfig, Path::new("/work/app/tsconfig.json"));
        assert_eq!(paths.html_template(), Path::new("/work/app/public/index.html"));
        assert_eq!(
            paths.service_worker(),
            Path::new("/work/app/src/serviceWorker.ts")
        );
    }

    #[test]
    fn resolution_is_pure() {
        let a = ResolvedPaths::resolve(Path::new("/nonexistent/project"));
        let b = ResolvedPaths::resolve(Path::new("/nonexistent/project"));
        assert_eq!(a, b);
    }
}
