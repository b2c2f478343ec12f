//! Build tool invocation and artifact delivery.
//!
//! The build tool runs in the repository root with named parameters:
//!
//! ```text
//! make CONFIG=<profile> PULLDOWN=<multiplier> FRAMEEXT=<ext> [SOUND=<wav>]
//! ```
//!
//! It is expected to leave the ROM at a fixed path under the root, which is
//! then copied to the requested output.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::io::{CommandRunner, CommandSpec};
use crate::models::{Pulldown, ResolutionProfile};

/// Errors from the build stage.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The build-rules file is absent from the repository root.
    #[error("{} not found at {}", .file, .path.display())]
    MissingBuildFile { file: String, path: PathBuf },

    /// The build tool could not be started.
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// Non-zero exit; both captured streams are kept verbatim.
    #[error("{tool} failed with exit code {exit_code}:\n{stderr}{stdout}")]
    BuildFailed {
        tool: String,
        exit_code: i32,
        stderr: String,
        stdout: String,
    },

    /// The build reported success but produced no ROM.
    #[error("{} not found after build", .0.display())]
    ArtifactMissing(PathBuf),

    /// Copying the ROM to its destination failed.
    #[error("Failed to copy ROM to {}: {source}", .path.display())]
    Deliver {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for build operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Named parameters for one build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    pub profile: ResolutionProfile,
    pub pulldown: Pulldown,
    /// Frame file extension tag.
    pub frame_extension: String,
    /// Waveform to embed; only passed when it exists at invocation time.
    pub sound: Option<PathBuf>,
}

/// ROM left by a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRom {
    pub path: PathBuf,
    /// Whether the `SOUND` parameter was passed.
    pub with_audio: bool,
    /// Rendered command line, for reporting.
    pub command: String,
    /// Captured stdout of the build tool.
    pub log: String,
}

/// ROM copied to its final destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredRom {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl DeliveredRom {
    pub fn size_mib(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Drives the external build tool inside the repository root.
pub struct BuildInvoker<'a> {
    runner: &'a dyn CommandRunner,
    repo_root: PathBuf,
    build_tool: String,
    build_file: String,
    artifact: String,
}

impl<'a> BuildInvoker<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        repo_root: impl Into<PathBuf>,
        build_tool: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            repo_root: repo_root.into(),
            build_tool: build_tool.into(),
            build_file: "Makefile".to_string(),
            artifact: "video.gb".to_string(),
        }
    }

    pub fn with_build_file(mut self, build_file: impl Into<String>) -> Self {
        self.build_file = build_file.into();
        self
    }

    pub fn with_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifact = artifact.into();
        self
    }

    pub fn build_file_path(&self) -> PathBuf {
        self.repo_root.join(&self.build_file)
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.repo_root.join(&self.artifact)
    }

    /// Fail unless the build-rules file exists.
    pub fn ensure_build_file(&self) -> BuildResult<PathBuf> {
        let path = self.build_file_path();
        if path.is_file() {
            Ok(path)
        } else {
            Err(BuildError::MissingBuildFile {
                file: self.build_file.clone(),
                path,
            })
        }
    }

    /// Named parameters in invocation order.
    pub fn parameters(&self, request: &BuildRequest) -> Vec<String> {
        let mut params = vec![
            format!("CONFIG={}", request.profile.id()),
            format!("PULLDOWN={}", request.pulldown.to_arg()),
            format!("FRAMEEXT={}", request.frame_extension),
        ];

        if let Some(sound) = request.sound.as_deref().filter(|p| p.exists()) {
            params.push(format!("SOUND={}", sound.display()));
        }

        params
    }

    pub fn command(&self, request: &BuildRequest) -> CommandSpec {
        CommandSpec::new(&self.build_tool)
            .args(self.parameters(request))
            .current_dir(&self.repo_root)
    }

    /// Run the build and confirm the ROM exists.
    pub fn build(&self, request: &BuildRequest) -> BuildResult<BuiltRom> {
        self.ensure_build_file()?;

        let spec = self.command(request);
        let with_audio = spec
            .arg_strings()
            .iter()
            .any(|a| a.starts_with("SOUND="));

        let output = self.runner.run(&spec).map_err(|e| BuildError::Spawn {
            tool: self.build_tool.clone(),
            source: e,
        })?;

        if !output.success() {
            return Err(BuildError::BuildFailed {
                tool: self.build_tool.clone(),
                exit_code: output.code(),
                stderr: output.stderr,
                stdout: output.stdout,
            });
        }

        let rom = self.artifact_path();
        if !rom.is_file() {
            return Err(BuildError::ArtifactMissing(rom));
        }

        Ok(BuiltRom {
            path: rom,
            with_audio,
            command: spec.display(),
            log: output.stdout,
        })
    }

    /// Copy the built ROM to `destination`, leaving the original in place.
    pub fn deliver(&self, destination: &Path) -> BuildResult<DeliveredRom> {
        let rom = self.artifact_path();
        if !rom.is_file() {
            return Err(BuildError::ArtifactMissing(rom));
        }

        let size_bytes = fs::copy(&rom, destination).map_err(|e| BuildError::Deliver {
            path: destination.to_path_buf(),
            source: e,
        })?;

        Ok(DeliveredRom {
            path: destination.to_path_buf(),
            size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CommandOutput;
    use parking_lot::Mutex;
    use tempfile::tempdir;

    /// Build tool double: optionally writes the ROM, records invocations.
    struct FakeMake {
        exit_code: i32,
        write_rom: bool,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl FakeMake {
        fn new(exit_code: i32, write_rom: bool) -> Self {
            Self {
                exit_code,
                write_rom,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for FakeMake {
        fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
            self.calls.lock().push(spec.clone());
            if self.write_rom {
                let cwd = spec.cwd.clone().unwrap();
                fs::write(cwd.join("video.gb"), vec![0u8; 2048]).unwrap();
            }
            Ok(CommandOutput {
                exit_code: Some(self.exit_code),
                stdout: "rgbasm -o video.o src/video.asm\n".to_string(),
                stderr: if self.exit_code == 0 {
                    String::new()
                } else {
                    "error: src/video.asm(12): syntax error\n".to_string()
                },
            })
        }

        fn locate(&self, _program: &str) -> Option<PathBuf> {
            None
        }
    }

    fn request(sound: Option<PathBuf>) -> BuildRequest {
        BuildRequest {
            profile: ResolutionProfile::Medium,
            pulldown: Pulldown::new(0.5).unwrap(),
            frame_extension: "bmp".to_string(),
            sound,
        }
    }

    #[test]
    fn parameters_without_sound() {
        let runner = FakeMake::new(0, true);
        let invoker = BuildInvoker::new(&runner, "/repo", "make");
        assert_eq!(
            invoker.parameters(&request(None)),
            vec!["CONFIG=1", "PULLDOWN=0.5", "FRAMEEXT=bmp"]
        );
    }

    #[test]
    fn sound_parameter_requires_existing_file() {
        let dir = tempdir().unwrap();
        let runner = FakeMake::new(0, true);
        let invoker = BuildInvoker::new(&runner, dir.path(), "make");

        let wav = dir.path().join("sound.wav");
        assert_eq!(invoker.parameters(&request(Some(wav.clone()))).len(), 3);

        fs::write(&wav, b"RIFF").unwrap();
        let params = invoker.parameters(&request(Some(wav.clone())));
        assert_eq!(params.last().unwrap(), &format!("SOUND={}", wav.display()));
    }

    #[test]
    fn missing_build_file_aborts_before_invocation() {
        let dir = tempdir().unwrap();
        let runner = FakeMake::new(0, true);
        let invoker = BuildInvoker::new(&runner, dir.path(), "make");

        let err = invoker.build(&request(None)).unwrap_err();
        assert!(matches!(err, BuildError::MissingBuildFile { .. }));
        assert!(runner.calls.lock().is_empty());
    }

    #[test]
    fn builds_in_repo_root_and_delivers_copy() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        let runner = FakeMake::new(0, true);
        let invoker = BuildInvoker::new(&runner, dir.path(), "make");

        let rom = invoker.build(&request(None)).unwrap();
        assert_eq!(rom.path, dir.path().join("video.gb"));
        assert!(!rom.with_audio);
        assert_eq!(runner.calls.lock()[0].cwd.as_deref(), Some(dir.path()));

        let out = dir.path().join("out").join("movie.gb");
        fs::create_dir_all(out.parent().unwrap()).unwrap();
        let delivered = invoker.deliver(&out).unwrap();
        assert_eq!(delivered.size_bytes, 2048);
        assert!(dir.path().join("video.gb").exists());
        assert!(out.exists());
    }

    #[test]
    fn failure_surfaces_both_streams() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        let runner = FakeMake::new(2, false);
        let invoker = BuildInvoker::new(&runner, dir.path(), "make");

        let err = invoker.build(&request(None)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("exit code 2"));
        assert!(msg.contains("syntax error"));
        assert!(msg.contains("rgbasm -o video.o"));
    }

    #[test]
    fn success_without_rom_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        let runner = FakeMake::new(0, false);
        let invoker = BuildInvoker::new(&runner, dir.path(), "make");

        let err = invoker.build(&request(None)).unwrap_err();
        assert!(matches!(err, BuildError::ArtifactMissing(_)));
    }
}
