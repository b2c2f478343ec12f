//! End-to-end runs of the standard pipeline against a scripted toolchain.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use super::*;
use crate::config::Settings;
use crate::io::{CommandOutput, CommandRunner, CommandSpec};
use crate::logging::{init_test_tracing, LogConfig, LogLevel, RunLogger};
use crate::models::{PipelineRun, Pulldown, ResolutionProfile};
use crate::patcher::PatchOutcome;

#[derive(Default)]
struct Script {
    missing_tools: Vec<&'static str>,
    missing_libraries: bool,
    fail_frames: bool,
    fail_audio: bool,
    fail_build: bool,
}

/// Stands in for the external tools; writes the files they would write.
struct ScriptedRunner {
    script: Script,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn programs(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.program.clone()).collect()
    }

    fn make_call(&self) -> Option<CommandSpec> {
        self.calls
            .lock()
            .iter()
            .find(|c| c.program == "make")
            .cloned()
    }
}

fn exit(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        self.calls.lock().push(spec.clone());
        let args = spec.arg_strings();
        let last = args.last().cloned().unwrap_or_default();

        match spec.program.as_str() {
            "python3" if self.script.missing_libraries => {
                Ok(exit(1, "ModuleNotFoundError: No module named 'PIL'"))
            }
            "python3" => Ok(exit(0, "")),
            "ffmpeg" if args.iter().any(|a| a == "-vn") => {
                if self.script.fail_audio {
                    return Ok(exit(1, "Output file #0 does not contain any stream"));
                }
                fs::write(&last, vec![0u8; 2048])?;
                Ok(exit(0, ""))
            }
            "ffmpeg" => {
                if self.script.fail_frames {
                    return Ok(exit(1, "clip.mp4: Invalid data found when processing input"));
                }
                let dir = Path::new(&last).parent().map(Path::to_path_buf).unwrap_or_default();
                for n in 1..=3 {
                    fs::write(dir.join(format!("{}.bmp", n)), b"BM")?;
                }
                Ok(exit(0, ""))
            }
            "make" => {
                if self.script.fail_build {
                    return Ok(exit(2, "error: src/video.asm(12): syntax error"));
                }
                let cwd = spec.cwd.clone().unwrap_or_default();
                fs::write(cwd.join("video.gb"), vec![0u8; 64 * 1024])?;
                Ok(exit(0, ""))
            }
            other => panic!("unexpected program {}", other),
        }
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        if self.script.missing_tools.contains(&name) {
            None
        } else {
            Some(PathBuf::from("/usr/bin").join(name))
        }
    }
}

struct Fixture {
    dir: TempDir,
    runner: Arc<ScriptedRunner>,
}

impl Fixture {
    fn new(script: Script) -> Self {
        Self::in_dir(script, TempDir::new().unwrap())
    }

    /// Fixture whose paths are relative to the working directory.
    fn relative(script: Script) -> Self {
        let fx = Self::in_dir(script, TempDir::new_in(".").unwrap());
        assert!(fx.dir.path().is_relative());
        fx
    }

    fn in_dir(script: Script, dir: TempDir) -> Self {
        init_test_tracing();
        let repo = dir.path().join("player");
        fs::create_dir_all(repo.join("src")).unwrap();
        fs::write(repo.join("Makefile"), "all:\n").unwrap();
        fs::write(
            repo.join("src/video.asm"),
            "; player\nFRAME_COUNT EQU 3\nSECTION \"main\", ROM0\n",
        )
        .unwrap();
        fs::write(dir.path().join("clip.mp4"), b"not really a video").unwrap();

        Self {
            dir,
            runner: Arc::new(ScriptedRunner::new(script)),
        }
    }

    fn repo(&self) -> PathBuf {
        self.dir.path().join("player")
    }

    fn run(&self) -> PipelineRun {
        PipelineRun::new(
            self.dir.path().join("clip.mp4"),
            self.dir.path().join("out.gb"),
            self.repo(),
        )
    }

    fn context(&self, run: PipelineRun) -> Context {
        self.context_with_logger(run, RunLogger::console("clip.mp4"))
    }

    fn context_with_logger(&self, run: PipelineRun, logger: RunLogger) -> Context {
        Context::new(
            run,
            Settings::default(),
            Arc::clone(&self.runner) as Arc<dyn CommandRunner>,
            Arc::new(logger),
        )
    }
}

#[test]
fn full_run_produces_rom() {
    let fx = Fixture::new(Script::default());
    let ctx = fx.context(
        fx.run()
            .with_profile(ResolutionProfile::Medium)
            .with_pulldown(Pulldown::new(0.5).unwrap()),
    );

    let summary = run_conversion(&create_standard_pipeline(), &ctx).unwrap();

    assert_eq!(summary.state.stage, Stage::Done);
    assert_eq!(
        summary.state.history,
        vec![
            Stage::Init,
            Stage::DependenciesChecked,
            Stage::Patched,
            Stage::FramesExtracted,
            Stage::AudioExtracted,
            Stage::Built,
            Stage::Done,
        ]
    );
    assert_eq!(summary.frame_count(), 3);
    assert!(summary.with_audio());
    assert!(summary.warnings().is_empty());

    let rom = summary.rom().unwrap();
    assert_eq!(rom.size_bytes, 64 * 1024);
    assert!(fx.dir.path().join("out.gb").exists());

    let make = fx.runner.make_call().unwrap();
    let params = make.arg_strings();
    assert!(params.contains(&"CONFIG=1".to_string()));
    assert!(params.contains(&"PULLDOWN=0.5".to_string()));
    assert!(params.contains(&"FRAMEEXT=bmp".to_string()));
    assert!(params.iter().any(|p| p.starts_with("SOUND=")));
    assert_eq!(make.cwd.as_deref(), Some(fx.repo().as_path()));

    let asm = fs::read_to_string(fx.repo().join("src/video.asm")).unwrap();
    assert!(asm.contains("DEF FRAME_COUNT EQU 3"));
    assert!(matches!(
        summary.state.patch,
        Some(PatchOutcome::Patched { qualified: 1, .. })
    ));
}

#[test]
fn audio_failure_degrades_to_silent_rom() {
    let fx = Fixture::new(Script {
        fail_audio: true,
        ..Default::default()
    });
    let warnings = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&warnings);
    let logger = RunLogger::new(
        "clip.mp4",
        LogConfig::default(),
        None,
        Some(Box::new(move |level: LogLevel, msg: &str| {
            if level == LogLevel::Warn {
                sink.lock().push(msg.to_string());
            }
        })),
    )
    .unwrap();
    let ctx = fx.context_with_logger(fx.run(), logger);

    let summary = run_conversion(&create_standard_pipeline(), &ctx).unwrap();

    assert_eq!(summary.state.stage, Stage::Done);
    assert!(summary.state.reached(Stage::AudioSkipped));
    assert!(!summary.state.reached(Stage::AudioExtracted));
    assert_eq!(summary.steps.steps_degraded, vec!["Audio"]);
    assert!(!summary.with_audio());
    assert_eq!(summary.warnings().len(), 1);

    let make = fx.runner.make_call().unwrap();
    assert!(!make.arg_strings().iter().any(|p| p.starts_with("SOUND=")));

    let logged = warnings.lock();
    assert!(logged.iter().any(|w| w.contains("continuing without audio")));
}

fn sound_argument(make: &CommandSpec) -> Option<String> {
    make.arg_strings()
        .iter()
        .find_map(|a| a.strip_prefix("SOUND=").map(str::to_string))
}

#[test]
fn sound_path_resolves_from_build_directory() {
    let fx = Fixture::relative(Script::default());
    let ctx = fx.context(fx.run());
    assert!(ctx.run.repo_root.is_relative());

    let summary = run_conversion(&create_standard_pipeline(), &ctx).unwrap();
    assert!(summary.with_audio());

    let make = fx.runner.make_call().unwrap();
    let cwd = make.cwd.clone().unwrap();
    let sound = sound_argument(&make).unwrap();
    assert!(Path::new(&sound).is_absolute());
    assert!(cwd.join(&sound).is_file());
}

#[test]
fn resolved_run_passes_absolute_paths_to_build() {
    let fx = Fixture::relative(Script::default());
    let ctx = fx.context(fx.run().resolved().unwrap());

    run_conversion(&create_standard_pipeline(), &ctx).unwrap();

    let make = fx.runner.make_call().unwrap();
    assert!(make.cwd.as_deref().is_some_and(Path::is_absolute));
    let sound = sound_argument(&make).unwrap();
    assert!(make.cwd.unwrap().join(sound).is_file());
}

#[test]
fn audio_disabled_is_skipped() {
    let fx = Fixture::new(Script::default());
    let ctx = fx.context(fx.run().with_audio(false));

    let summary = run_conversion(&create_standard_pipeline(), &ctx).unwrap();

    assert_eq!(summary.steps.steps_skipped, vec!["Audio"]);
    assert!(summary.state.reached(Stage::AudioSkipped));
    assert!(summary.warnings().is_empty());
    let ffmpeg_calls = fx.runner.programs().iter().filter(|p| *p == "ffmpeg").count();
    assert_eq!(ffmpeg_calls, 1);
}

#[test]
fn stale_sound_file_is_not_embedded() {
    let fx = Fixture::new(Script::default());
    fs::write(fx.repo().join("sound.wav"), b"old").unwrap();
    let ctx = fx.context(fx.run().with_audio(false));

    let summary = run_conversion(&create_standard_pipeline(), &ctx).unwrap();

    assert!(!summary.with_audio());
    let make = fx.runner.make_call().unwrap();
    assert!(!make.arg_strings().iter().any(|p| p.starts_with("SOUND=")));
}

#[test]
fn missing_input_spawns_nothing() {
    let fx = Fixture::new(Script::default());
    let mut run = fx.run();
    run.input = fx.dir.path().join("absent.mp4");
    let ctx = fx.context(run);

    let err = run_conversion(&create_standard_pipeline(), &ctx).unwrap_err();

    assert!(matches!(err, PipelineError::ValidationFailed { .. }));
    assert!(fx.runner.programs().is_empty());
}

#[test]
fn missing_dependencies_are_all_reported() {
    let fx = Fixture::new(Script {
        missing_tools: vec!["rgbasm", "rgbfix"],
        ..Default::default()
    });
    let ctx = fx.context(fx.run());

    let err = run_conversion(&create_standard_pipeline(), &ctx).unwrap_err();

    assert_eq!(err.step_name(), Some("Dependencies"));
    let msg = err.to_string();
    assert!(msg.contains("rgbasm"));
    assert!(msg.contains("rgbfix"));
    assert!(!fx.runner.programs().iter().any(|p| p == "ffmpeg" || p == "make"));
}

#[test]
fn missing_library_is_fatal() {
    let fx = Fixture::new(Script {
        missing_libraries: true,
        ..Default::default()
    });
    let ctx = fx.context(fx.run());

    let err = run_conversion(&create_standard_pipeline(), &ctx).unwrap_err();

    assert_eq!(err.step_name(), Some("Dependencies"));
    assert!(err.to_string().contains("Pillow"));
}

#[test]
fn frame_failure_surfaces_transcoder_stderr() {
    let fx = Fixture::new(Script {
        fail_frames: true,
        ..Default::default()
    });
    let ctx = fx.context(fx.run());

    let err = run_conversion(&create_standard_pipeline(), &ctx).unwrap_err();

    assert_eq!(err.step_name(), Some("Frames"));
    assert!(err.to_string().contains("Invalid data found when processing input"));
    assert!(fx.runner.make_call().is_none());
}

#[test]
fn missing_build_file_aborts_before_any_work() {
    let fx = Fixture::new(Script::default());
    fs::remove_file(fx.repo().join("Makefile")).unwrap();
    let ctx = fx.context(fx.run());

    let err = run_conversion(&create_standard_pipeline(), &ctx).unwrap_err();

    assert!(matches!(err, PipelineError::ValidationFailed { .. }));
    assert!(err.to_string().contains("Makefile"));
    assert!(fx.runner.programs().is_empty());
    assert!(!fx.repo().join("frames").exists());
    assert!(!fx.dir.path().join("out.gb").exists());
}

#[test]
fn build_failure_is_fatal_with_diagnostics() {
    let fx = Fixture::new(Script {
        fail_build: true,
        ..Default::default()
    });
    let ctx = fx.context(fx.run());

    let err = run_conversion(&create_standard_pipeline(), &ctx).unwrap_err();

    assert_eq!(err.step_name(), Some("Build"));
    assert!(err.to_string().contains("syntax error"));
    assert!(!fx.dir.path().join("out.gb").exists());
}

#[test]
fn patch_failure_is_not_fatal() {
    let fx = Fixture::new(Script::default());
    let asm = fx.repo().join("src/video.asm");
    fs::remove_file(&asm).unwrap();
    fs::create_dir_all(&asm).unwrap();
    let ctx = fx.context(fx.run());

    let summary = run_conversion(&create_standard_pipeline(), &ctx).unwrap();

    assert_eq!(summary.steps.steps_degraded, vec!["Patch"]);
    assert!(summary.state.reached(Stage::Patched));
    assert_eq!(summary.state.stage, Stage::Done);
}

#[test]
fn skip_patch_leaves_source_alone() {
    let fx = Fixture::new(Script::default());
    let ctx = fx.context(fx.run().with_patch(false));

    let summary = run_conversion(&create_standard_pipeline(), &ctx).unwrap();

    assert_eq!(summary.steps.steps_skipped, vec!["Patch"]);
    let asm = fs::read_to_string(fx.repo().join("src/video.asm")).unwrap();
    assert!(asm.contains("\nFRAME_COUNT EQU 3"));
    assert!(!fx.repo().join("src/video.asm.bak").exists());
}

#[test]
fn cancelled_run_stops_before_next_step() {
    let fx = Fixture::new(Script::default());
    let ctx = fx.context(fx.run());
    let pipeline = create_standard_pipeline();
    pipeline.cancel_handle().cancel();

    let err = run_conversion(&pipeline, &ctx).unwrap_err();

    assert!(err.is_cancelled());
    assert!(fx.runner.programs().is_empty());
}
