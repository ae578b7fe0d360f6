// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! Armature CLI library.
//!
//! This crate provides the command-line interface for the armature build
//! tool: a one-shot production build and a long-running development server,
//! both driven by the pipeline description the core crate derives.
//!
//! # Usage
//!
//! This crate is primarily used through the `armature` binary:
//!
//! ```bash
//! armature build    # One-shot production build
//! armature start    # Development server with live reload
//! ```
//!
//! # Configuration
//!
//! Projects are configured via `armature.toml` at the project root; absence
//! of the file means defaults throughout.

/// CLI commands (build, start).
pub mod commands;
/// External bundler adapter and auxiliary artifact generation.
pub mod compiler;
/// Options-file loading from `armature.toml`.
pub mod config;
/// Console formatting for build and serve summaries.
pub mod format;
/// Development server with live reload and API proxying.
pub mod server;
/// File system watching for recompilation.
pub mod watcher;
