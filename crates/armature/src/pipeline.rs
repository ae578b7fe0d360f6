// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Configuration derivation: [`Options`] in, [`PipelineDescription`] out.
//!
//! [`derive`] resolves every conditional branch up front and returns plain
//! data: an ordered rule list, naming templates, optimization toggles and
//! auxiliary generators. It is total; every option has a default, so no
//! input is invalid and derivation never fails. Structural problems (a
//! missing entry file, say) surface downstream when the pipeline executes.

use crate::naming::{output_naming, OutputNaming};
use crate::options::{normalize_base_path, Options, TemplateValue};
use crate::paths::ResolvedPaths;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A fully resolved compilation pipeline for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDescription {
    /// The single entry file.
    pub entry: PathBuf,
    /// Where artifacts are emitted.
    pub output_dir: PathBuf,
    /// Base URL path prefixed to every emitted asset reference.
    pub public_path: String,
    /// Filename templates for emitted artifacts.
    pub naming: OutputNaming,
    /// Minify emitted scripts and styles.
    pub minify: bool,
    /// Source-map flavor.
    pub source_maps: SourceMapStyle,
    /// Instrument the bundle for live reloading.
    pub live_reload: bool,
    /// Per-file-type transform chains, evaluated in order.
    pub rules: Vec<Rule>,
    /// Auxiliary artifact generators, executed in order after compilation.
    pub generators: Vec<Generator>,
}

/// Source-map flavor per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMapStyle {
    /// Full maps in standalone `.map` files (production).
    External,
    /// Lightweight maps embedded in the artifact (development).
    Inline,
}

/// One file-pattern rule: which files, and what happens to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Glob patterns selecting the files this rule applies to.
    pub patterns: Vec<String>,
    /// Transform chain, applied in order.
    pub steps: Vec<TransformStep>,
}

impl Rule {
    fn new(patterns: &[&str], steps: Vec<TransformStep>) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            steps,
        }
    }

    /// Whether `path` is selected by this rule.
    pub fn matches(&self, path: &Path) -> bool {
        self.matcher().is_match(path)
    }

    /// Compiles the glob matcher for this rule.
    ///
    /// Patterns are crate-authored literals, so compilation cannot fail.
    pub fn matcher(&self) -> GlobSet {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.patterns {
            builder.add(Glob::new(pattern).unwrap());
        }
        builder.build().unwrap()
    }

    /// Whether this rule's chain contains `step`.
    pub fn has_step(&self, step: &TransformStep) -> bool {
        self.steps.contains(step)
    }
}

/// One named transform in a rule's chain.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformStep {
    /// Source transpilation for script files.
    Transpile(TranspileOptions),
    /// Per-file, per-identifier class-name scoping for stylesheets.
    ScopedStyles {
        /// Hash the generated names instead of deriving readable ones.
        hashed: bool,
    },
    /// Color-macro rewriting (`alphaLight`/`alphaDark`), non-framework only.
    StyleMacros,
    /// Lower nested selectors to flat ones.
    StyleNesting,
    /// Hand the (pre-processed) stylesheet to the bundler.
    StyleLoad {
        /// Extract into standalone style artifacts instead of inlining.
        extract: bool,
    },
}

/// Options for the script transpilation step.
#[derive(Debug, Clone, PartialEq)]
pub struct TranspileOptions {
    /// How markup-in-code syntax is lowered.
    pub jsx: JsxMode,
    /// Inject fast-refresh instrumentation (development, framework only).
    pub refresh: bool,
}

/// Markup-in-code lowering strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum JsxMode {
    /// Framework-aware automatic runtime.
    Automatic {
        /// Module providing the runtime.
        import_source: String,
    },
    /// Plain element-creation calls through a named factory.
    Factory {
        /// Factory function for elements.
        function: String,
        /// Factory expression for fragments.
        fragment: String,
    },
}

/// An auxiliary artifact generator.
///
/// Each variant appears at most once in a pipeline, activated by a pure
/// predicate of the options.
#[derive(Debug, Clone, PartialEq)]
pub enum Generator {
    /// Render the HTML entry document: placeholder substitution plus tags
    /// referencing the emitted entry assets.
    HtmlEntry {
        /// Template document inside the public directory.
        template: PathBuf,
        /// Placeholder values; `PUBLIC_PATH` is always added at render time.
        substitutions: BTreeMap<String, TemplateValue>,
    },
    /// Expose the template variables to compiled code as build-time
    /// constant replacements.
    EnvConstants {
        /// Constant name → value.
        defines: BTreeMap<String, TemplateValue>,
    },
    /// Type-check the project without emitting.
    TypeCheck {
        /// The type-check configuration file.
        config: PathBuf,
    },
    /// Compile the service-worker script and write its asset manifest.
    ServiceWorkerManifest {
        /// Service-worker source file.
        source: PathBuf,
        /// Manifest filename inside the output directory.
        output: String,
        /// Filename patterns excluded from the manifest.
        exclude: Vec<String>,
    },
    /// Write a bundle-composition report.
    BundleReport {
        /// Report filename inside the output directory.
        output: String,
    },
}

/// Manifest filename for the service-worker generator.
pub const ASSET_MANIFEST: &str = "asset-manifest.json";
/// Report filename for the bundle analyzer.
pub const BUNDLE_REPORT: &str = "bundle-report.json";

/// Derives the pipeline for one compilation run.
///
/// Pure and deterministic: equal inputs produce equal descriptions. Each
/// decision below is an independent predicate over the options, resolved
/// here once so nothing downstream branches on modes again.
pub fn derive(options: &Options, paths: &ResolvedPaths) -> PipelineDescription {
    let production = options.is_production;
    let framework = options.uses_ui_framework;

    // Exactly one entry file, selected by the framework flag.
    let entry = if framework {
        paths.src.join("index.tsx")
    } else {
        paths.src.join("index.ts")
    };

    // Base path for emitted asset URLs: the app mount path in production
    // when one is supplied, the configured prefix (default "/") otherwise.
    let public_path = match options.build.normalized_app_path() {
        Some(app_path) if production => app_path,
        _ => normalize_base_path(&options.public_path_prefix),
    };

    let script_rule = Rule::new(
        &["**/*.ts", "**/*.tsx"],
        vec![TransformStep::Transpile(TranspileOptions {
            jsx: if framework {
                JsxMode::Automatic {
                    import_source: "react".to_string(),
                }
            } else {
                JsxMode::Factory {
                    function: "createElement".to_string(),
                    fragment: "Fragment".to_string(),
                }
            },
            refresh: !production && framework,
        })],
    );

    let style_steps = if framework {
        // Framework projects scope class names and never see the macros.
        vec![
            TransformStep::ScopedStyles { hashed: production },
            TransformStep::StyleLoad {
                extract: production,
            },
        ]
    } else {
        vec![
            TransformStep::StyleMacros,
            TransformStep::StyleNesting,
            TransformStep::StyleLoad {
                extract: production,
            },
        ]
    };
    let style_rule = Rule::new(&["**/*.css"], style_steps);

    // Generators, in execution order. Each predicate is spelled out; none
    // may fire twice.
    let mut generators = Vec::new();
    generators.push(Generator::HtmlEntry {
        template: paths.html_template(),
        substitutions: options.template_variables.clone(),
    });
    if !options.template_variables.is_empty() {
        generators.push(Generator::EnvConstants {
            defines: options.template_variables.clone(),
        });
    }
    generators.push(Generator::TypeCheck {
        config: paths.tsconfig.clone(),
    });
    if production {
        generators.push(Generator::ServiceWorkerManifest {
            source: paths.service_worker(),
            output: ASSET_MANIFEST.to_string(),
            exclude: vec![
                "*.map".to_string(),
                ASSET_MANIFEST.to_string(),
                "*LICENSE*".to_string(),
            ],
        });
    }
    if production && options.build.analyze_bundle {
        generators.push(Generator::BundleReport {
            output: BUNDLE_REPORT.to_string(),
        });
    }

    PipelineDescription {
        entry,
        output_dir: paths.dist.clone(),
        public_path,
        naming: output_naming(production),
        minify: production,
        source_maps: if production {
            SourceMapStyle::External
        } else {
            SourceMapStyle::Inline
        },
        live_reload: !production && framework,
        rules: vec![script_rule, style_rule],
        generators,
    }
}

impl PipelineDescription {
    /// The rule governing `path`, if any.
    pub fn rule_for(&self, path: &Path) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// Whether any rule carries `step`.
    pub fn has_step(&self, step: &TransformStep) -> bool {
        self.rules.iter().any(|rule| rule.has_step(step))
    }

    /// The build-time constant defines, when present.
    pub fn defines(&self) -> Option<&BTreeMap<String, TemplateValue>> {
        self.generators.iter().find_map(|g| match g {
            Generator::EnvConstants { defines } => Some(defines),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn paths() -> ResolvedPaths {
        ResolvedPaths::resolve(Path::new("/project"))
    }

    fn plain(production: bool) -> Options {
        let options = Options {
            uses_ui_framework: false,
            ..Options::default()
        };
        if production {
            options.production()
        } else {
            options
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let options = Options::default().production();
        assert_eq!(derive(&options, &paths()), derive(&options, &paths()));
    }

    #[test]
    fn production_names_are_hashed_development_names_are_not() {
        assert!(derive(&Options::default().production(), &paths()).naming.hashed());
        assert!(!derive(&Options::default(), &paths()).naming.hashed());
    }

    #[test]
    fn production_enables_minify_and_external_maps() {
        let pipeline = derive(&Options::default().production(), &paths());
        assert!(pipeline.minify);
        assert_eq!(pipeline.source_maps, SourceMapStyle::External);
        assert!(!pipeline.live_reload);
    }

    #[test]
    fn development_framework_gets_live_reload_and_refresh() {
        let pipeline = derive(&Options::default(), &paths());
        assert!(!pipeline.minify);
        assert_eq!(pipeline.source_maps, SourceMapStyle::Inline);
        assert!(pipeline.live_reload);
        let rule = pipeline.rule_for(Path::new("src/index.tsx")).unwrap();
        match &rule.steps[0] {
            TransformStep::Transpile(t) => assert!(t.refresh),
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn plain_development_has_no_live_reload() {
        let pipeline = derive(&plain(false), &paths());
        assert!(!pipeline.live_reload);
    }

    #[test]
    fn framework_flag_selects_the_entry_file() {
        let framework = derive(&Options::default(), &paths());
        assert_eq!(framework.entry, Path::new("/project/src/index.tsx"));
        let plain = derive(&plain(false), &paths());
        assert_eq!(plain.entry, Path::new("/project/src/index.ts"));
    }

    #[test]
    fn framework_styles_are_scoped_without_macros() {
        let pipeline = derive(&Options::default(), &paths());
        let rule = pipeline.rule_for(Path::new("src/app.css")).unwrap();
        assert!(rule.has_step(&TransformStep::ScopedStyles { hashed: false }));
        assert!(!rule.has_step(&TransformStep::StyleMacros));
    }

    #[test]
    fn plain_styles_get_macros_and_nesting() {
        let pipeline = derive(&plain(false), &paths());
        let rule = pipeline.rule_for(Path::new("src/app.css")).unwrap();
        assert!(rule.has_step(&TransformStep::StyleMacros));
        assert!(rule.has_step(&TransformStep::StyleNesting));
        assert!(rule.has_step(&TransformStep::StyleLoad { extract: false }));
    }

    #[test]
    fn style_extraction_is_production_only() {
        let dev = derive(&Options::default(), &paths());
        assert!(dev.has_step(&TransformStep::StyleLoad { extract: false }));
        let prod = derive(&Options::default().production(), &paths());
        assert!(prod.has_step(&TransformStep::StyleLoad { extract: true }));
    }

    #[test]
    fn app_path_sets_the_production_base_path() {
        let mut options = plain(true);
        options.build.app_path = Some("sub/".to_string());
        let pipeline = derive(&options, &paths());
        assert_eq!(pipeline.public_path, "/sub/");
        assert_eq!(pipeline.entry, Path::new("/project/src/index.ts"));
    }

    #[test]
    fn app_path_is_ignored_in_development() {
        let mut options = Options::default();
        options.build.app_path = Some("sub/".to_string());
        let pipeline = derive(&options, &paths());
        assert_eq!(pipeline.public_path, "/");
    }

    #[test]
    fn template_variables_activate_defines() {
        let mut options = Options::default();
        assert!(derive(&options, &paths()).defines().is_none());
        options.template_variables.insert(
            "NAME".to_string(),
            TemplateValue::String("demo".to_string()),
        );
        let pipeline = derive(&options, &paths());
        assert_eq!(
            pipeline.defines().unwrap()["NAME"],
            TemplateValue::String("demo".to_string())
        );
    }

    #[test]
    fn service_worker_manifest_is_production_only() {
        let count = |options: &Options| {
            derive(options, &paths())
                .generators
                .iter()
                .filter(|g| matches!(g, Generator::ServiceWorkerManifest { .. }))
                .count()
        };
        assert_eq!(count(&Options::default()), 0);
        assert_eq!(count(&Options::default().production()), 1);
    }

    #[test]
    fn manifest_excludes_maps_itself_and_licenses() {
        let pipeline = derive(&Options::default().production(), &paths());
        let exclude = pipeline
            .generators
            .iter()
            .find_map(|g| match g {
                Generator::ServiceWorkerManifest { exclude, .. } => Some(exclude.clone()),
                _ => None,
            })
            .unwrap();
        assert!(exclude.contains(&"*.map".to_string()));
        assert!(exclude.contains(&ASSET_MANIFEST.to_string()));
        assert!(exclude.iter().any(|p| p.contains("LICENSE")));
    }

    #[test]
    fn bundle_report_requires_production_and_the_flag() {
        let has_report = |options: &Options| {
            derive(options, &paths())
                .generators
                .iter()
                .any(|g| matches!(g, Generator::BundleReport { .. }))
        };
        let mut options = Options::default();
        options.build.analyze_bundle = true;
        assert!(!has_report(&options));
        assert!(has_report(&options.clone().production()));
        assert!(!has_report(&Options::default().production()));
    }

    #[test]
    fn generators_appear_at_most_once() {
        let mut options = Options::default().production();
        options.build.analyze_bundle = true;
        options
            .template_variables
            .insert("A".to_string(), TemplateValue::Integer(1));
        let pipeline = derive(&options, &paths());
        let discriminants: Vec<_> = pipeline
            .generators
            .iter()
            .map(std::mem::discriminant)
            .collect();
        let mut deduped = discriminants.clone();
        deduped.dedup();
        assert_eq!(discriminants.len(), deduped.len());
        assert_eq!(discriminants.len(), 5);
    }

    #[test]
    fn html_entry_is_always_generated() {
        for options in [Options::default(), Options::default().production()] {
            let pipeline = derive(&options, &paths());
            assert!(matches!(
                pipeline.generators.first(),
                Some(Generator::HtmlEntry { .. })
            ));
        }
    }

    #[test]
    fn rules_route_files_by_pattern() {
        let pipeline = derive(&Options::default(), &paths());
        assert!(pipeline.rule_for(Path::new("src/deep/mod.ts")).is_some());
        assert!(pipeline.rule_for(Path::new("src/app.css")).is_some());
        assert!(pipeline.rule_for(Path::new("src/logo.svg")).is_none());
    }
}
