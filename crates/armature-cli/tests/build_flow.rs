// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Build-orchestrator flow tests against a stub compiler.

use armature::{BuildResult, EmittedAsset, Options, PipelineDescription, ResolvedPaths};
use armature_cli::commands::build;
use armature_cli::compiler::{Compile, CompilerError};
use std::fs;
use std::sync::Mutex;

/// Stands in for the bundler: records the pipeline and emits one asset.
struct StubCompiler {
    seen: Mutex<Option<PipelineDescription>>,
}

impl StubCompiler {
    fn new() -> Self {
        Self {
            seen: Mutex::new(None),
        }
    }
}

impl Compile for StubCompiler {
    fn compile(&self, pipeline: &PipelineDescription) -> Result<BuildResult, CompilerError> {
        let scripts = pipeline.output_dir.join("static/js");
        fs::create_dir_all(&scripts)?;
        fs::write(scripts.join("main.js"), b"console.log(1)")?;
        if let Ok(mut seen) = self.seen.lock() {
            *seen = Some(pipeline.clone());
        }
        Ok(BuildResult {
            assets: vec![EmittedAsset {
                name: "static/js/main.js".to_string(),
                size: 14,
            }],
            ..BuildResult::default()
        })
    }
}

#[test]
fn stale_output_never_survives_a_build() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ResolvedPaths::resolve(dir.path());

    // Stale output from a previous run, plus static assets to carry over.
    fs::create_dir_all(&paths.dist).unwrap();
    fs::write(paths.dist.join("stale.js"), "old").unwrap();
    fs::create_dir_all(paths.public.join("icons")).unwrap();
    fs::write(paths.public.join("favicon.ico"), "icon").unwrap();
    fs::write(paths.public.join("icons/app.svg"), "<svg/>").unwrap();

    let compiler = StubCompiler::new();
    let options = Options::default().production();
    let result = build::execute(&paths, &options, &compiler).unwrap();

    // Clean happened before copy, copy before compile.
    assert!(!paths.dist.join("stale.js").exists());
    assert_eq!(
        fs::read_to_string(paths.dist.join("favicon.ico")).unwrap(),
        "icon"
    );
    assert_eq!(
        fs::read_to_string(paths.dist.join("icons/app.svg")).unwrap(),
        "<svg/>"
    );
    assert!(paths.dist.join("static/js/main.js").exists());
    assert_eq!(result.assets.len(), 1);
}

#[test]
fn the_compiler_sees_a_production_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ResolvedPaths::resolve(dir.path());

    let compiler = StubCompiler::new();
    let options = Options::default().production();
    build::execute(&paths, &options, &compiler).unwrap();

    let seen = compiler.seen.lock().unwrap().clone().unwrap();
    assert!(seen.minify);
    assert!(seen.naming.hashed());
    assert_eq!(seen.output_dir, paths.dist);
}

#[test]
fn absent_output_and_public_directories_are_fine() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ResolvedPaths::resolve(dir.path());

    let compiler = StubCompiler::new();
    let options = Options::default().production();
    let result = build::execute(&paths, &options, &compiler).unwrap();
    assert!(result.errors.is_empty());
}

#[test]
fn tooling_failure_propagates_without_a_result() {
    struct BrokenCompiler;
    impl Compile for BrokenCompiler {
        fn compile(&self, _: &PipelineDescription) -> Result<BuildResult, CompilerError> {
            Err(CompilerError::BundlerMissing)
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let paths = ResolvedPaths::resolve(dir.path());
    let options = Options::default().production();
    let err = build::execute(&paths, &options, &BrokenCompiler).unwrap_err();
    assert!(matches!(err, CompilerError::BundlerMissing));
}
