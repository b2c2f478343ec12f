//! Core types for the orchestrator pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use crate::build::{BuildInvoker, BuiltRom, DeliveredRom};
use crate::config::Settings;
use crate::extraction::{AudioExtractor, ExtractedAudio, FrameExtractor, FrameSet};
use crate::io::CommandRunner;
use crate::logging::RunLogger;
use crate::models::PipelineRun;
use crate::patcher::PatchOutcome;
use crate::toolchain::ProbeReport;

use super::errors::{PipelineError, PipelineResult};

/// Read-only context passed to pipeline steps.
///
/// Contains the run parameters and shared resources that steps can read
/// but not modify. Mutable state goes in `RunState`.
pub struct Context {
    /// Parameters of this conversion.
    pub run: PipelineRun,
    /// Application settings.
    pub settings: Settings,
    /// Executes external tools.
    pub runner: Arc<dyn CommandRunner>,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
}

impl Context {
    /// Create a new context for a run.
    pub fn new(
        run: PipelineRun,
        settings: Settings,
        runner: Arc<dyn CommandRunner>,
        logger: Arc<RunLogger>,
    ) -> Self {
        Self {
            run,
            settings,
            runner,
            logger,
        }
    }

    /// Label used in errors and logs.
    pub fn run_name(&self) -> String {
        self.run.label()
    }

    /// Reject runs that cannot start: a missing input or build-rules file.
    /// No tool is invoked before this passes.
    pub fn validate(&self) -> PipelineResult<()> {
        if !self.run.input.is_file() {
            return Err(PipelineError::validation_failed(
                self.run_name(),
                format!("Input file '{}' not found", self.run.input.display()),
            ));
        }

        let build_file = self.build_invoker().build_file_path();
        if !build_file.is_file() {
            return Err(PipelineError::validation_failed(
                self.run_name(),
                format!(
                    "{} not found at {}",
                    self.settings.paths.build_file,
                    build_file.display()
                ),
            ));
        }
        Ok(())
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.run.repo_path(&self.settings.paths.frames_dir)
    }

    pub fn sound_path(&self) -> PathBuf {
        self.run.repo_path(&self.settings.paths.sound_file)
    }

    pub fn asm_source(&self) -> PathBuf {
        self.run.repo_path(&self.settings.paths.asm_source)
    }

    pub fn frame_extractor(&self) -> FrameExtractor<'_> {
        FrameExtractor::new(
            self.runner.as_ref(),
            &self.settings.tools.transcoder,
            self.frames_dir(),
        )
        .with_extension(&self.settings.frames.extension)
        .with_scale_filter(&self.settings.frames.scale_filter)
    }

    pub fn audio_extractor(&self) -> AudioExtractor<'_> {
        AudioExtractor::new(self.runner.as_ref(), &self.settings.tools.transcoder)
    }

    pub fn build_invoker(&self) -> BuildInvoker<'_> {
        BuildInvoker::new(
            self.runner.as_ref(),
            &self.run.repo_root,
            &self.settings.tools.build_tool,
        )
        .with_build_file(&self.settings.paths.build_file)
        .with_artifact(&self.settings.paths.artifact)
    }
}

/// Position of a run in the conversion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Init,
    DependenciesChecked,
    Patched,
    FramesExtracted,
    AudioExtracted,
    AudioSkipped,
    Built,
    Done,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Init => "INIT",
            Stage::DependenciesChecked => "DEPENDENCIES_CHECKED",
            Stage::Patched => "PATCHED",
            Stage::FramesExtracted => "FRAMES_EXTRACTED",
            Stage::AudioExtracted => "AUDIO_EXTRACTED",
            Stage::AudioSkipped => "AUDIO_SKIPPED",
            Stage::Built => "BUILT",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// Each step's output is stored in its own field; steps add data but do
/// not overwrite what earlier steps recorded.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Current stage.
    pub stage: Stage,
    /// Every stage entered, in order (starting with `Init`).
    pub history: Vec<Stage>,
    /// When the run started.
    pub started_at: Option<String>,
    /// Dependency probe results.
    pub probe: Option<ProbeReport>,
    /// What the syntax patch did.
    pub patch: Option<PatchOutcome>,
    /// Extracted frame sequence.
    pub frames: Option<FrameSet>,
    /// Extracted waveform, when audio succeeded.
    pub audio: Option<ExtractedAudio>,
    /// ROM left by the build.
    pub rom: Option<BuiltRom>,
    /// ROM copied to the requested output.
    pub delivered: Option<DeliveredRom>,
    /// Warnings from degraded stages.
    pub warnings: Vec<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            stage: Stage::Init,
            history: vec![Stage::Init],
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Move to `stage`. Terminal stages are never left.
    pub fn advance(&mut self, stage: Stage) {
        if self.stage.is_terminal() {
            return;
        }
        self.stage = stage;
        self.history.push(stage);
    }

    pub fn fail(&mut self) {
        self.advance(Stage::Failed);
    }

    pub fn reached(&self, stage: Stage) -> bool {
        self.history.contains(&stage)
    }

    /// Waveform to hand to the build: extracted and still on disk.
    pub fn sound_for_build(&self) -> Option<PathBuf> {
        self.audio
            .as_ref()
            .map(|a| a.path.clone())
            .filter(|p| p.exists())
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    /// Per-step bookkeeping.
    pub steps: super::pipeline::PipelineRunResult,
    /// Final run state.
    pub state: RunState,
}

impl ConversionSummary {
    pub fn rom(&self) -> Option<&DeliveredRom> {
        self.state.delivered.as_ref()
    }

    pub fn frame_count(&self) -> usize {
        self.state.frames.as_ref().map_or(0, |f| f.count)
    }

    /// Whether the ROM was built with a soundtrack.
    pub fn with_audio(&self) -> bool {
        self.state.rom.as_ref().is_some_and(|r| r.with_audio)
    }

    pub fn warnings(&self) -> &[String] {
        &self.state.warnings
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step did not run because the run disabled it.
    Skipped(String),
    /// An optional step failed; the run continues without its output.
    Degraded(String),
}
