// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Auxiliary artifact generation.
//!
//! After the bundler pass, the pipeline's generators run in order: the
//! stylesheet macro post-pass, the rendered HTML entry document, the
//! type-check pass, the service-worker script + asset manifest, and the
//! bundle-composition report. Each generator degrades per tier: a missing
//! optional input is skipped with a debug log, a missing required input
//! becomes a project error, and only filesystem trouble aborts.

use super::bundler::{find_in_path, BundlerProcess};
use super::CompilerError;
use armature::naming::content_hash;
use armature::pipeline::{Generator, TransformStep};
use armature::stylemacro::MacroTranslator;
use armature::{substitute, PipelineDescription, TemplateValue};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;

impl BundlerProcess {
    /// Runs every generator the pipeline carries, in order.
    pub(crate) fn run_generators(
        &self,
        pipeline: &PipelineDescription,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) -> Result<(), CompilerError> {
        fs::create_dir_all(&pipeline.output_dir)?;

        if pipeline.has_step(&TransformStep::StyleMacros) {
            self.rewrite_emitted_styles(&pipeline.output_dir)?;
        }

        for generator in &pipeline.generators {
            match generator {
                Generator::HtmlEntry {
                    template,
                    substitutions,
                } => self.render_html_entry(pipeline, template, substitutions, errors)?,
                // Constants are injected as defines when the bundler is
                // invoked; nothing is left to do here.
                Generator::EnvConstants { .. } => {}
                Generator::TypeCheck { config } => self.type_check(config, errors)?,
                Generator::ServiceWorkerManifest {
                    source,
                    output,
                    exclude,
                } => self.service_worker(pipeline, source, output, exclude, errors, warnings)?,
                Generator::BundleReport { output } => self.bundle_report(pipeline, output)?,
            }
        }

        Ok(())
    }

    /// Applies the color-macro translation to every emitted stylesheet.
    fn rewrite_emitted_styles(&self, output_dir: &Path) -> Result<(), CompilerError> {
        let translator = MacroTranslator::new();
        let pattern = format!("{}/**/*.css", output_dir.display());
        for path in glob::glob(&pattern).into_iter().flatten().flatten() {
            let css = fs::read_to_string(&path)?;
            let translated = translator.translate_stylesheet(&css);
            if translated != css {
                fs::write(&path, translated)?;
            }
        }
        Ok(())
    }

    /// Renders the HTML entry document into the output directory.
    ///
    /// Placeholders are substituted (with `PUBLIC_PATH` always present),
    /// then tags referencing the emitted entry assets are injected.
    fn render_html_entry(
        &self,
        pipeline: &PipelineDescription,
        template: &Path,
        substitutions: &BTreeMap<String, TemplateValue>,
        errors: &mut Vec<String>,
    ) -> Result<(), CompilerError> {
        let content = match fs::read_to_string(template) {
            Ok(content) => content,
            Err(_) => {
                errors.push(format!(
                    "entry template not found at {}",
                    template.display()
                ));
                return Ok(());
            }
        };

        let mut variables = substitutions.clone();
        variables.insert(
            "PUBLIC_PATH".to_string(),
            TemplateValue::String(pipeline.public_path.trim_end_matches('/').to_string()),
        );
        let mut document = substitute(&content, &variables);

        let assets = self.emitted_files(&pipeline.output_dir);
        let links: String = assets
            .iter()
            .filter(|a| a.name.starts_with("static/css/") && a.name.ends_with(".css"))
            .filter(|a| !a.name.contains(".chunk."))
            .map(|a| {
                format!(
                    "<link rel=\"stylesheet\" href=\"{}{}\">",
                    pipeline.public_path, a.name
                )
            })
            .collect::<Vec<_>>()
            .join("");
        let scripts: String = assets
            .iter()
            .filter(|a| a.name.starts_with("static/js/") && a.name.ends_with(".js"))
            .filter(|a| !a.name.contains(".chunk."))
            .map(|a| {
                format!(
                    "<script defer src=\"{}{}\"></script>",
                    pipeline.public_path, a.name
                )
            })
            .collect::<Vec<_>>()
            .join("");

        document = inject_before(&document, "</head>", &links);
        document = inject_before(&document, "</body>", &scripts);

        fs::write(pipeline.output_dir.join("index.html"), document)?;
        Ok(())
    }

    /// Type-checks the project without emitting.
    ///
    /// Skipped with a debug log when the config file or the checker
    /// executable is absent; diagnostics fold into the project errors.
    fn type_check(&self, config: &Path, errors: &mut Vec<String>) -> Result<(), CompilerError> {
        if !config.exists() {
            tracing::debug!("no {}, skipping type check", config.display());
            return Ok(());
        }
        let Some(tsc) = find_in_path("tsc") else {
            tracing::debug!("tsc not found on PATH, skipping type check");
            return Ok(());
        };

        let output = Command::new(&tsc)
            .arg("--noEmit")
            .arg("--pretty")
            .arg("false")
            .arg("-p")
            .arg(config)
            .current_dir(&self.paths().root)
            .output()
            .map_err(|source| CompilerError::Launch {
                binary: tsc.display().to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            if line.contains("error TS") {
                errors.push(line.trim().to_string());
            }
        }
        Ok(())
    }

    /// Compiles the service-worker script and writes its asset manifest.
    fn service_worker(
        &self,
        pipeline: &PipelineDescription,
        source: &Path,
        output: &str,
        exclude: &[String],
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) -> Result<(), CompilerError> {
        if !source.exists() {
            tracing::debug!("no {}, skipping service worker", source.display());
            return Ok(());
        }

        let outfile = pipeline.output_dir.join("service-worker.js");
        let (sw_errors, sw_warnings) = self.invoke_single(source, &outfile, pipeline.minify)?;
        errors.extend(sw_errors);
        warnings.extend(sw_warnings);

        let excluded: Vec<glob::Pattern> = exclude
            .iter()
            .filter_map(|pattern| glob::Pattern::new(pattern).ok())
            .collect();

        let entries: Vec<serde_json::Value> = self
            .emitted_files(&pipeline.output_dir)
            .iter()
            .filter(|asset| !excluded.iter().any(|p| p.matches(&asset.name)))
            .map(|asset| {
                let bytes = read_asset(&pipeline.output_dir, &asset.name);
                json!({
                    "url": format!("{}{}", pipeline.public_path, asset.name),
                    "revision": content_hash(&bytes),
                })
            })
            .collect();

        fs::write(
            pipeline.output_dir.join(output),
            serde_json::to_vec_pretty(&entries)?,
        )?;
        Ok(())
    }

    /// Writes the bundle-composition report.
    fn bundle_report(
        &self,
        pipeline: &PipelineDescription,
        output: &str,
    ) -> Result<(), CompilerError> {
        let entries: Vec<serde_json::Value> = self
            .emitted_files(&pipeline.output_dir)
            .iter()
            .filter(|asset| {
                asset.name.starts_with("static/js/") || asset.name.starts_with("static/css/")
            })
            .map(|asset| json!({ "name": asset.name, "size": asset.size }))
            .collect();

        fs::write(
            pipeline.output_dir.join(output),
            serde_json::to_vec_pretty(&entries)?,
        )?;
        Ok(())
    }
}

fn inject_before(document: &str, anchor: &str, fragment: &str) -> String {
    if fragment.is_empty() {
        return document.to_string();
    }
    match document.find(anchor) {
        Some(pos) => {
            let mut out = String::with_capacity(document.len() + fragment.len());
            out.push_str(&document[..pos]);
            out.push_str(fragment);
            out.push_str(&document[pos..]);
            out
        }
        None => format!("{}{}", document, fragment),
    }
}

fn read_asset(output_dir: &Path, name: &str) -> Vec<u8> {
    fs::read(output_dir.join(name)).unwrap_or_default()
}
