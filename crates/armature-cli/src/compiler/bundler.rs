// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The bundler process implementation of [`Compile`].
//!
//! Locates an esbuild-compatible executable, expands the pipeline
//! description into its argument surface, and turns process output back
//! into a [`BuildResult`].

use super::{Compile, CompilerError};
use armature::pipeline::{JsxMode, SourceMapStyle, TransformStep};
use armature::{BuildResult, EmittedAsset, PipelineDescription, ResolvedPaths, TemplateValue};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

/// Environment variable naming an explicit bundler executable.
pub const BUNDLER_ENV: &str = "ARMATURE_BUNDLER";

/// Executable searched on PATH when the variable is unset.
const BUNDLER_BINARY: &str = "esbuild";

/// Drives the external bundler for one project.
#[derive(Debug, Clone)]
pub struct BundlerProcess {
    binary: PathBuf,
    paths: ResolvedPaths,
}

impl BundlerProcess {
    /// Locates the bundler executable for `paths`.
    ///
    /// `ARMATURE_BUNDLER` wins when set; otherwise PATH is searched for
    /// `esbuild`. Absence is a tooling failure, reported before any build
    /// work starts.
    pub fn locate(paths: &ResolvedPaths) -> Result<Self, CompilerError> {
        let binary = match std::env::var_os(BUNDLER_ENV) {
            Some(explicit) => PathBuf::from(explicit),
            None => find_in_path(BUNDLER_BINARY).ok_or(CompilerError::BundlerMissing)?,
        };

        tracing::debug!("using bundler at {}", binary.display());

        Ok(Self {
            binary,
            paths: paths.clone(),
        })
    }

    /// The resolved project paths this bundler works against.
    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    #[cfg(test)]
    pub(crate) fn for_tests(binary: PathBuf, paths: ResolvedPaths) -> Self {
        Self { binary, paths }
    }

    /// Expands the pipeline description into bundler arguments.
    fn arguments(&self, pipeline: &PipelineDescription) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        args.push(pipeline.entry.clone().into_os_string());
        args.push("--bundle".into());

        let mut outdir = OsString::from("--outdir=");
        outdir.push(&pipeline.output_dir);
        args.push(outdir);

        args.push(format!("--entry-names={}", entry_names(&pipeline.naming.script)).into());
        args.push(format!("--chunk-names={}", entry_names(&pipeline.naming.script_chunk)).into());
        args.push(format!("--public-path={}", pipeline.public_path).into());

        if pipeline.minify {
            args.push("--minify".into());
        }

        args.push(
            match pipeline.source_maps {
                SourceMapStyle::External => "--sourcemap=linked",
                SourceMapStyle::Inline => "--sourcemap=inline",
            }
            .into(),
        );

        // Per-step options the bundler understands natively.
        for rule in &pipeline.rules {
            for step in &rule.steps {
                match step {
                    TransformStep::Transpile(transpile) => match &transpile.jsx {
                        JsxMode::Automatic { import_source } => {
                            args.push("--jsx=automatic".into());
                            args.push(format!("--jsx-import-source={}", import_source).into());
                        }
                        JsxMode::Factory { function, fragment } => {
                            args.push("--jsx=transform".into());
                            args.push(format!("--jsx-factory={}", function).into());
                            args.push(format!("--jsx-fragment={}", fragment).into());
                        }
                    },
                    TransformStep::ScopedStyles { .. } => {
                        args.push("--loader:.module.css=local-css".into());
                    }
                    TransformStep::StyleNesting => {
                        args.push("--supported:nesting=false".into());
                    }
                    // The macro pass runs over emitted styles, not here.
                    TransformStep::StyleMacros => {}
                    TransformStep::StyleLoad { .. } => {}
                }
            }
        }

        if let Some(defines) = pipeline.defines() {
            for (name, value) in defines {
                args.push(
                    format!("--define:process.env.{}={}", name, define_value(value)).into(),
                );
            }
        }

        args.push("--color=false".into());
        args.push("--log-level=warning".into());

        args
    }

    /// Runs the bundler once and classifies what it reported.
    fn invoke(&self, args: Vec<OsString>) -> Result<(Vec<String>, Vec<String>), CompilerError> {
        let output = Command::new(&self.binary)
            .args(&args)
            .current_dir(&self.paths.root)
            .output()
            .map_err(|source| CompilerError::Launch {
                binary: self.binary.display().to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let (errors, warnings) = classify_diagnostics(&stderr);

        // A non-zero exit with nothing classifiable means the tool itself
        // broke, not the project.
        if !output.status.success() && errors.is_empty() {
            return Err(CompilerError::Abnormal {
                detail: stderr.trim().to_string(),
            });
        }

        Ok((errors, warnings))
    }

    /// Runs one bundler pass for an auxiliary single-file entry.
    pub(crate) fn invoke_single(
        &self,
        entry: &Path,
        outfile: &Path,
        minify: bool,
    ) -> Result<(Vec<String>, Vec<String>), CompilerError> {
        let mut args: Vec<OsString> = Vec::new();
        args.push(entry.to_path_buf().into_os_string());
        args.push("--bundle".into());
        let mut out = OsString::from("--outfile=");
        out.push(outfile);
        args.push(out);
        if minify {
            args.push("--minify".into());
        }
        args.push("--color=false".into());
        args.push("--log-level=warning".into());

        self.invoke(args)
    }

    /// Lists the files currently under the output directory, name-sorted.
    pub(crate) fn emitted_files(&self, output_dir: &Path) -> Vec<EmittedAsset> {
        let pattern = format!("{}/**/*", output_dir.display());
        let mut assets: Vec<EmittedAsset> = glob::glob(&pattern)
            .into_iter()
            .flatten()
            .flatten()
            .filter(|path| path.is_file())
            .filter_map(|path| {
                let name = path
                    .strip_prefix(output_dir)
                    .ok()?
                    .to_string_lossy()
                    .replace('\\', "/");
                let size = std::fs::metadata(&path).ok()?.len();
                Some(EmittedAsset { name, size })
            })
            .collect();
        assets.sort_by(|a, b| a.name.cmp(&b.name));
        assets
    }
}

impl Compile for BundlerProcess {
    fn compile(&self, pipeline: &PipelineDescription) -> Result<BuildResult, CompilerError> {
        let start = Instant::now();

        let (mut errors, mut warnings) = self.invoke(self.arguments(pipeline))?;

        self.run_generators(pipeline, &mut errors, &mut warnings)?;

        Ok(BuildResult {
            elapsed: start.elapsed(),
            assets: self.emitted_files(&pipeline.output_dir),
            errors,
            warnings,
        })
    }
}

/// Turns a naming template into the bundler's extensionless form.
///
/// `static/js/[name].[hash].js` → `static/js/[name].[hash]`; the bundler
/// appends the extension itself.
fn entry_names(template: &str) -> String {
    template
        .strip_suffix(".js")
        .or_else(|| template.strip_suffix(".css"))
        .unwrap_or(template)
        .to_string()
}

/// Renders a template value as a bundler define.
///
/// Strings are JSON-quoted so they stay string literals in compiled code;
/// numbers and booleans are substituted bare.
fn define_value(value: &TemplateValue) -> String {
    match value {
        TemplateValue::String(s) => serde_json::to_string(s).unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Splits bundler stderr into error and warning messages.
///
/// Marker lines open a message; indented follow-up lines (source excerpts,
/// notes) are folded into it. Anything unmarked outside a message is
/// ignored; the bundler's chatter is not a diagnostic.
fn classify_diagnostics(stderr: &str) -> (Vec<String>, Vec<String>) {
    enum Tier {
        Error,
        Warning,
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut current: Option<(Tier, String)> = None;

    for line in stderr.lines() {
        let tier = if line.contains("[ERROR]") {
            Some((Tier::Error, strip_marker(line, "[ERROR]")))
        } else if line.contains("[WARNING]") {
            Some((Tier::Warning, strip_marker(line, "[WARNING]")))
        } else {
            None
        };

        match tier {
            Some((tier, message)) => {
                flush(&mut current, &mut errors, &mut warnings);
                current = Some((tier, message));
            }
            None => {
                if let Some((_, message)) = current.as_mut() {
                    if line.trim().is_empty() {
                        flush(&mut current, &mut errors, &mut warnings);
                    } else {
                        message.push('\n');
                        message.push_str(line.trim_end());
                    }
                }
            }
        }
    }
    flush(&mut current, &mut errors, &mut warnings);

    return (errors, warnings);

    fn flush(
        current: &mut Option<(Tier, String)>,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) {
        if let Some((tier, message)) = current.take() {
            match tier {
                Tier::Error => errors.push(message),
                Tier::Warning => warnings.push(message),
            }
        }
    }

    fn strip_marker(line: &str, marker: &str) -> String {
        match line.split_once(marker) {
            Some((_, rest)) => rest.trim_start().to_string(),
            None => line.trim().to_string(),
        }
    }
}

/// Searches PATH for an executable.
pub(crate) fn find_in_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use armature::{derive, Options};

    #[test]
    fn entry_names_drop_the_extension() {
        assert_eq!(
            entry_names("static/js/[name].[hash].js"),
            "static/js/[name].[hash]"
        );
        assert_eq!(entry_names("static/js/[name].js"), "static/js/[name]");
        assert_eq!(
            entry_names("static/css/[name].[hash].css"),
            "static/css/[name].[hash]"
        );
    }

    #[test]
    fn define_values_keep_their_types() {
        assert_eq!(
            define_value(&TemplateValue::String("v1".to_string())),
            "\"v1\""
        );
        assert_eq!(define_value(&TemplateValue::Integer(3)), "3");
        assert_eq!(define_value(&TemplateValue::Bool(true)), "true");
    }

    #[test]
    fn diagnostics_split_by_marker() {
        let stderr = "\
✘ [ERROR] Could not resolve \"./missing\"

    src/index.ts:1:20:
      1 │ import { x } from \"./missing\";

▲ [WARNING] Duplicate key \"a\" in object literal

    src/data.ts:3:4:
";
        let (errors, warnings) = classify_diagnostics(stderr);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Could not resolve"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Duplicate key"));
    }

    #[test]
    fn follow_up_lines_fold_into_the_message() {
        let stderr = "✘ [ERROR] Syntax error\n    src/app.ts:5:0:\n      5 │ ???\n";
        let (errors, _) = classify_diagnostics(stderr);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Syntax error"));
        assert!(errors[0].contains("src/app.ts:5:0"));
    }

    #[test]
    fn chatter_without_markers_is_ignored() {
        let (errors, warnings) = classify_diagnostics("  dist/static/js/main.js  12.0kb\n");
        assert!(errors.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn arguments_reflect_the_pipeline() {
        let paths = ResolvedPaths::resolve(Path::new("/project"));
        let bundler = BundlerProcess {
            binary: PathBuf::from("/usr/bin/esbuild"),
            paths: paths.clone(),
        };

        let production = derive(&Options::default().production(), &paths);
        let args: Vec<String> = bundler
            .arguments(&production)
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(args.contains(&"--minify".to_string()));
        assert!(args.contains(&"--sourcemap=linked".to_string()));
        assert!(args.iter().any(|a| a.contains("[hash]")));
        assert!(args.contains(&"--jsx=automatic".to_string()));

        let development = derive(&Options::default(), &paths);
        let args: Vec<String> = bundler
            .arguments(&development)
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(!args.contains(&"--minify".to_string()));
        assert!(args.contains(&"--sourcemap=inline".to_string()));
        assert!(!args.iter().any(|a| a.contains("[hash]")));
    }

    #[test]
    fn plain_pipeline_uses_the_factory_and_nesting_args() {
        let paths = ResolvedPaths::resolve(Path::new("/project"));
        let bundler = BundlerProcess {
            binary: PathBuf::from("/usr/bin/esbuild"),
            paths: paths.clone(),
        };
        let options = Options {
            uses_ui_framework: false,
            ..Options::default()
        };
        let args: Vec<String> = bundler
            .arguments(&derive(&options, &paths))
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(args.contains(&"--jsx=transform".to_string()));
        assert!(args.contains(&"--jsx-factory=createElement".to_string()));
        assert!(args.contains(&"--supported:nesting=false".to_string()));
    }
}
