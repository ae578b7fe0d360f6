// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Build command: one-shot production build.
//!
//! Strict sequence: reset the output directory, copy static assets into
//! it, compile once with a production pipeline, render the summary. Each
//! step's failure aborts the rest. Tooling failure exits non-zero with no
//! summary; errors *in* the compiled project are rendered and do not change
//! the exit behavior.

use crate::compiler::{BundlerProcess, Compile, CompilerError};
use crate::config;
use crate::format::print_build_summary;
use armature::{derive, BuildResult, Options, ResolvedPaths};
use console::style;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Runs the build command against the current directory.
pub async fn run() -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let paths = ResolvedPaths::resolve(&root);
    let options = config::load_options(&paths.root).production();

    let compiler = match BundlerProcess::locate(&paths) {
        Ok(compiler) => compiler,
        Err(err) => fail(&err),
    };

    match execute(&paths, &options, &compiler) {
        Ok(result) => {
            print_build_summary(&result);
            Ok(())
        }
        Err(err) => fail(&err),
    }
}

/// The build sequence, separated from process concerns for testing.
///
/// Ordering is the contract: the output directory is deleted first
/// (absence is not an error), static assets are copied next, and only then
/// does the compiler write, so stale output can never survive a
/// successful run.
pub fn execute(
    paths: &ResolvedPaths,
    options: &Options,
    compiler: &dyn Compile,
) -> Result<BuildResult, CompilerError> {
    let start = Instant::now();

    match fs::remove_dir_all(&paths.dist) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    if paths.public.exists() {
        copy_dir_recursive(&paths.public, &paths.dist)?;
    }

    let pipeline = derive(options, paths);
    let mut result = compiler.compile(&pipeline)?;
    // Wall clock covers the whole run, clean and copy included.
    result.elapsed = start.elapsed();
    Ok(result)
}

/// Recursively copy a directory
fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Reports a tooling failure with its cause chain and exits non-zero.
fn fail(err: &CompilerError) -> ! {
    eprintln!("{}", style("Build failed").red());
    eprintln!("{}", err);
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = std::error::Error::source(cause);
    }
    std::process::exit(1);
}
