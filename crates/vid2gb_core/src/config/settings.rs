//! Settings struct with TOML-based sections.
//!
//! Defaults describe the layout of the dmg-badapple-av player repository
//! and the RGBDS toolchain.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Repository-relative paths.
    #[serde(default)]
    pub paths: PathSettings,

    /// External executables and encoder libraries.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Frame extraction parameters.
    #[serde(default)]
    pub frames: FrameSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Paths inside the player repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Directory receiving the numbered frames.
    #[serde(default = "default_frames_dir")]
    pub frames_dir: String,

    /// Temporary waveform handed to the build.
    #[serde(default = "default_sound_file")]
    pub sound_file: String,

    /// Build-rules file that must exist at the repository root.
    #[serde(default = "default_build_file")]
    pub build_file: String,

    /// ROM image produced by the build.
    #[serde(default = "default_artifact")]
    pub artifact: String,

    /// Assembly source patched for newer assembler syntax.
    #[serde(default = "default_asm_source")]
    pub asm_source: String,

    /// Suffix appended to the assembly source name for its backup.
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,
}

fn default_frames_dir() -> String {
    "frames".to_string()
}

fn default_sound_file() -> String {
    "sound.wav".to_string()
}

fn default_build_file() -> String {
    "Makefile".to_string()
}

fn default_artifact() -> String {
    "video.gb".to_string()
}

fn default_asm_source() -> String {
    "src/video.asm".to_string()
}

fn default_backup_suffix() -> String {
    ".bak".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            frames_dir: default_frames_dir(),
            sound_file: default_sound_file(),
            build_file: default_build_file(),
            artifact: default_artifact(),
            asm_source: default_asm_source(),
            backup_suffix: default_backup_suffix(),
        }
    }
}

/// External programs the pipeline drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Video/audio transcoder.
    #[serde(default = "default_transcoder")]
    pub transcoder: String,

    /// Interpreter running the frame and audio encoders.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    #[serde(default = "default_assembler")]
    pub assembler: String,

    #[serde(default = "default_linker")]
    pub linker: String,

    #[serde(default = "default_rom_fixer")]
    pub rom_fixer: String,

    #[serde(default = "default_build_tool")]
    pub build_tool: String,

    /// Interpreter modules the encoders import.
    #[serde(default = "default_libraries")]
    pub libraries: Vec<String>,
}

fn default_transcoder() -> String {
    "ffmpeg".to_string()
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_assembler() -> String {
    "rgbasm".to_string()
}

fn default_linker() -> String {
    "rgblink".to_string()
}

fn default_rom_fixer() -> String {
    "rgbfix".to_string()
}

fn default_build_tool() -> String {
    "make".to_string()
}

fn default_libraries() -> Vec<String> {
    vec!["PIL".to_string(), "soundfile".to_string()]
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            transcoder: default_transcoder(),
            interpreter: default_interpreter(),
            assembler: default_assembler(),
            linker: default_linker(),
            rom_fixer: default_rom_fixer(),
            build_tool: default_build_tool(),
            libraries: default_libraries(),
        }
    }
}

/// Frame extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSettings {
    /// Image extension, also passed to the build as the frame tag.
    #[serde(default = "default_frame_extension")]
    pub extension: String,

    /// Resampling filter used when scaling.
    #[serde(default = "default_scale_filter")]
    pub scale_filter: String,
}

fn default_frame_extension() -> String {
    "bmp".to_string()
}

fn default_scale_filter() -> String {
    "lanczos".to_string()
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            extension: default_frame_extension(),
            scale_filter: default_scale_filter(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for console output.
    #[serde(default)]
    pub level: LogLevel,

    /// Prefix run log lines with a timestamp.
    #[serde(default)]
    pub show_timestamps: bool,

    /// Optional file mirroring the run log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            show_timestamps: false,
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[tools]"));
        assert!(toml.contains("build_file = \"Makefile\""));
    }

    #[test]
    fn settings_round_trip() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[tools]\nbuild_tool = \"gmake\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.tools.build_tool, "gmake");
        assert_eq!(parsed.tools.transcoder, "ffmpeg");
        assert_eq!(parsed.paths.artifact, "video.gb");
        assert_eq!(parsed.frames.extension, "bmp");
        assert_eq!(parsed.tools.libraries, vec!["PIL", "soundfile"]);
    }

    #[test]
    fn empty_file_is_default() {
        let parsed: Settings = toml::from_str("").unwrap();
        assert_eq!(parsed, Settings::default());
    }
}
