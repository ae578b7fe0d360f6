// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! External bundler adapter.
//!
//! The transformation engine is an external collaborator: a bundler
//! executable driven over its process interface. This module owns the seam
//! ([`Compile`]) and the implementation that maps a pipeline description
//! onto the bundler's argument surface, classifies its diagnostics, and
//! executes the auxiliary artifact generators afterwards.
//!
//! Two failure tiers apply. A [`CompilerError`] means the tooling itself
//! could not run, and the orchestrators abort on it. Errors *within* the
//! compiled project are data, carried in the returned
//! [`BuildResult`](armature::BuildResult) and rendered, never aborted on.

use armature::{BuildResult, PipelineDescription};
use thiserror::Error;

/// Auxiliary artifact generation.
pub mod artifacts;
/// The bundler process implementation.
pub mod bundler;

pub use bundler::BundlerProcess;

/// One compilation pass against a fully derived pipeline.
pub trait Compile {
    /// Runs the pipeline once.
    ///
    /// `Err` is reserved for tooling failure; project diagnostics come back
    /// inside the `BuildResult`.
    fn compile(&self, pipeline: &PipelineDescription) -> Result<BuildResult, CompilerError>;
}

/// Tooling-level failures: the compiler itself could not execute.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// No bundler executable could be located.
    #[error("no bundler executable found: set ARMATURE_BUNDLER or put `esbuild` on PATH")]
    BundlerMissing,

    /// The bundler process could not be launched.
    #[error("failed to launch bundler `{binary}`: {source}")]
    Launch {
        /// The executable that failed to start.
        binary: String,
        /// The underlying launch error.
        #[source]
        source: std::io::Error,
    },

    /// The bundler terminated abnormally without reporting diagnostics.
    #[error("bundler exited abnormally: {detail}")]
    Abnormal {
        /// Whatever the process left on stderr.
        detail: String,
    },

    /// Filesystem trouble while generating auxiliary artifacts.
    #[error("artifact generation failed: {0}")]
    Io(#[from] std::io::Error),

    /// A generated artifact could not be serialized.
    #[error("artifact serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
