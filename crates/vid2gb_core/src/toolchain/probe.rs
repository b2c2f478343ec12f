//! Dependency probe over executables and interpreter libraries.

use std::path::PathBuf;

use crate::config::ToolSettings;
use crate::io::{CommandRunner, CommandSpec};

const RGBDS_HINT: &str = "Install RGBDS from: https://rgbds.gbdev.io/";

/// What kind of dependency a requirement names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Executable resolved on `PATH`.
    Executable,
    /// Module importable by the encoder interpreter.
    Library,
}

/// One required dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub kind: DependencyKind,
    /// Program or module name.
    pub name: String,
    /// What it is used for.
    pub description: String,
    /// How to install it.
    pub hint: Option<String>,
}

impl Requirement {
    pub fn executable(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: DependencyKind::Executable,
            name: name.into(),
            description: description.into(),
            hint: None,
        }
    }

    pub fn library(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: DependencyKind::Library,
            name: name.into(),
            description: description.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// A requirement that could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    pub requirement: Requirement,
    pub reason: String,
}

/// Outcome of a full probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Executables found, with their resolved paths.
    pub found: Vec<(String, PathBuf)>,
    /// Libraries that imported successfully.
    pub libraries: Vec<String>,
    pub missing: Vec<MissingDependency>,
}

impl ProbeReport {
    /// True when nothing is missing.
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }

    /// Human-readable listing of every missing item, one per line.
    pub fn render_missing(&self) -> String {
        let mut lines = Vec::new();
        let mut hints: Vec<&str> = Vec::new();

        for missing in &self.missing {
            let req = &missing.requirement;
            let kind = match req.kind {
                DependencyKind::Executable => "",
                DependencyKind::Library => "library ",
            };
            lines.push(format!(
                "  - {} ({}{}): {}",
                req.description, kind, req.name, missing.reason
            ));
            if let Some(hint) = req.hint.as_deref() {
                if !hints.contains(&hint) {
                    hints.push(hint);
                }
            }
        }

        for hint in hints {
            lines.push(format!("  {}", hint));
        }
        lines.join("\n")
    }
}

/// The fixed set of dependencies for a toolchain configuration.
#[derive(Debug, Clone)]
pub struct DependencyProbe {
    /// Interpreter used to import library requirements.
    interpreter: String,
    requirements: Vec<Requirement>,
}

impl DependencyProbe {
    /// Requirements derived from the tool settings.
    pub fn from_settings(tools: &ToolSettings) -> Self {
        let mut requirements = vec![
            Requirement::executable(&tools.transcoder, "FFmpeg (for video/audio processing)"),
            Requirement::executable(&tools.interpreter, "Python 3 (frame and audio encoders)"),
            Requirement::executable(&tools.assembler, "RGBDS assembler").with_hint(RGBDS_HINT),
            Requirement::executable(&tools.linker, "RGBDS linker").with_hint(RGBDS_HINT),
            Requirement::executable(&tools.rom_fixer, "RGBDS ROM fixer").with_hint(RGBDS_HINT),
            Requirement::executable(&tools.build_tool, "Build tool"),
        ];

        for module in &tools.libraries {
            requirements.push(
                Requirement::library(module, format!("Python library '{}'", module))
                    .with_hint(format!("Install with: pip install {}", pip_package(module))),
            );
        }

        Self {
            interpreter: tools.interpreter.clone(),
            requirements,
        }
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Check every requirement; never stops at the first miss.
    pub fn run(&self, runner: &dyn CommandRunner) -> ProbeReport {
        let mut report = ProbeReport::default();
        let interpreter_found = runner.locate(&self.interpreter).is_some();

        for req in &self.requirements {
            match req.kind {
                DependencyKind::Executable => match runner.locate(&req.name) {
                    Some(path) => report.found.push((req.name.clone(), path)),
                    None => report.missing.push(MissingDependency {
                        requirement: req.clone(),
                        reason: "not found in PATH".to_string(),
                    }),
                },
                DependencyKind::Library => {
                    if !interpreter_found {
                        report.missing.push(MissingDependency {
                            requirement: req.clone(),
                            reason: format!("cannot check without {}", self.interpreter),
                        });
                        continue;
                    }
                    match self.import_library(runner, &req.name) {
                        Ok(()) => report.libraries.push(req.name.clone()),
                        Err(reason) => report.missing.push(MissingDependency {
                            requirement: req.clone(),
                            reason,
                        }),
                    }
                }
            }
        }

        tracing::debug!(
            "Probe: {} executables, {} libraries found, {} missing",
            report.found.len(),
            report.libraries.len(),
            report.missing.len()
        );

        report
    }

    fn import_library(&self, runner: &dyn CommandRunner, module: &str) -> Result<(), String> {
        let spec = CommandSpec::new(&self.interpreter)
            .arg("-c")
            .arg(format!("import {}", module));

        match runner.run(&spec) {
            Ok(output) if output.success() => Ok(()),
            Ok(_) => Err("import failed".to_string()),
            Err(e) => Err(format!("failed to run {}: {}", self.interpreter, e)),
        }
    }
}

/// Probe the toolchain described by `tools`.
pub fn probe_dependencies(tools: &ToolSettings, runner: &dyn CommandRunner) -> ProbeReport {
    DependencyProbe::from_settings(tools).run(runner)
}

/// Package name providing an importable module.
fn pip_package(module: &str) -> &str {
    match module {
        "PIL" => "Pillow",
        other => other,
    }
}
