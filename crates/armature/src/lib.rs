// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! Armature core: build-configuration synthesis for browser client projects.
//!
//! Given a small set of high-level options (production vs. development,
//! UI-framework vs. plain, template variables, static-asset serving), this
//! crate deterministically derives the full pipeline description a bundler
//! needs to turn a source tree into a deployable artifact set.
//!
//! The crate is pure: no process spawning, no network access, no filesystem
//! access. Everything effectful (invoking the bundler, serving, watching)
//! lives in `armature-cli`.
//!
//! # Components
//!
//! - [`options`]: the user-tunable knobs and their defaults
//! - [`paths`]: fixed project locations derived from an explicit root
//! - [`template`]: `%TOKEN%` substitution for the HTML entry document
//! - [`stylemacro`]: `alphaLight()`/`alphaDark()` stylesheet macro rewriting
//! - [`pipeline`]: the configuration derivation engine
//! - [`report`]: the per-compilation result record

/// Per-file output and scoped-class naming schemes.
pub mod naming;
/// User-tunable build options and their defaults.
pub mod options;
/// Fixed project filesystem locations.
pub mod paths;
/// Pipeline derivation: options in, fully resolved rules out.
pub mod pipeline;
/// Compilation pass results.
pub mod report;
/// Stylesheet color-macro translation.
pub mod stylemacro;
/// Placeholder substitution for the HTML entry document.
pub mod template;

pub use naming::OutputNaming;
pub use options::{BuildOptions, Options, ServeOptions, TemplateValue};
pub use paths::ResolvedPaths;
pub use pipeline::{derive, Generator, PipelineDescription, Rule, TransformStep};
pub use report::{BuildResult, EmittedAsset};
pub use stylemacro::MacroTranslator;
pub use template::substitute;
