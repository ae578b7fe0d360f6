// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `build`: one-shot production build into `dist/`
//! - `start`: development server with recompilation on change

/// Production build command.
pub mod build;
/// Development server command.
pub mod start;
