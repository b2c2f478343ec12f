use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;

use vid2gb_core::config::{ConfigManager, Settings};
use vid2gb_core::io::SystemRunner;
use vid2gb_core::logging::{init_tracing, LogConfig, LogLevel, RunLogger};
use vid2gb_core::models::{PipelineRun, Pulldown, ResolutionProfile};
use vid2gb_core::orchestrator::{
    create_standard_pipeline, run_conversion, Context, ConversionSummary, PipelineError,
};

const RULE: &str = "======================================================================";

#[derive(Parser, Debug)]
#[command(
    name = "vid2gb",
    version,
    about = "Convert a video file into a playable Game Boy ROM"
)]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Output ROM path.
    output: PathBuf,

    /// Player repository root (holds the Makefile and src/video.asm).
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Resolution profile: 0 = 160x72, 1 = 160x64, 2 = 160x56.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    config: u8,

    /// Frame-rate divisor applied to 30 fps (0.5 = 60 fps, 2.0 = 15 fps).
    #[arg(long, default_value_t = Pulldown::default())]
    fps_multiplier: Pulldown,

    /// Build a silent ROM.
    #[arg(long, default_value_t = false)]
    no_audio: bool,

    /// Leave the assembly source untouched.
    #[arg(long, default_value_t = false)]
    skip_patch: bool,

    /// Settings file (written with defaults if missing).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log every command and tool output.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let cancelled = err
                .downcast_ref::<PipelineError>()
                .is_some_and(PipelineError::is_cancelled);
            if cancelled {
                eprintln!("\nConversion cancelled");
            } else {
                eprintln!("\nError: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.settings.as_deref())?;
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        settings.logging.level
    };
    init_tracing(level);

    let run = PipelineRun::new(&cli.input, &cli.output, &cli.repo)
        .with_profile(ResolutionProfile::resolve(cli.config))
        .with_pulldown(cli.fps_multiplier)
        .with_audio(!cli.no_audio)
        .with_patch(!cli.skip_patch)
        .resolved()
        .context("resolve input, output and repository paths")?;
    print_banner(&run);

    let logger = create_logger(&run, &settings, level)?;
    let ctx = Context::new(run, settings, Arc::new(SystemRunner::new()), Arc::new(logger));
    let pipeline = create_standard_pipeline();
    let cancel = pipeline.cancel_handle();

    // Child processes share the terminal's process group and see the
    // interrupt too; the pipeline reports whatever stage they break as
    // cancelled.
    let mut worker = tokio::task::spawn_blocking(move || run_conversion(&pipeline, &ctx));
    let joined = tokio::select! {
        res = &mut worker => res,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupt received, stopping after the current stage");
            cancel.cancel();
            worker.await
        }
    };

    let summary = joined.context("conversion worker stopped unexpectedly")??;
    print_summary(&summary);
    Ok(())
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let mut manager = ConfigManager::new(path);
    manager
        .load_or_create()
        .with_context(|| format!("load settings '{}'", path.display()))?;
    Ok(manager.into_settings())
}

fn create_logger(run: &PipelineRun, settings: &Settings, level: LogLevel) -> anyhow::Result<RunLogger> {
    let config = LogConfig {
        level,
        show_timestamps: settings.logging.show_timestamps,
    };

    match settings.logging.log_file.as_deref() {
        Some(file) => {
            let path = PathBuf::from(file);
            RunLogger::new(run.label(), config, Some(&path), None)
                .with_context(|| format!("open log file '{}'", path.display()))
        }
        None => Ok(RunLogger::new(run.label(), config, None, None)?),
    }
}

fn print_banner(run: &PipelineRun) {
    println!("{RULE}");
    println!("vid2gb - video to Game Boy ROM converter");
    println!("{RULE}");
    println!("Input:       {}", run.input.display());
    println!("Output:      {}", run.output.display());
    println!("Resolution:  {}", run.profile);
    println!(
        "Target FPS:  {:.1} fps (pulldown {})",
        run.pulldown.frame_rate(),
        run.pulldown
    );
    println!(
        "Audio:       {}",
        if run.audio_enabled { "Enabled" } else { "Disabled" }
    );
    println!("{RULE}");
}

fn print_summary(summary: &ConversionSummary) {
    println!("\n{RULE}");
    println!("SUCCESS! Game Boy ROM created");
    println!("{RULE}");
    if let Some(rom) = summary.rom() {
        println!("\nOutput: {} ({:.2} MB)", rom.path.display(), rom.size_mib());
    }
    println!(
        "Frames: {}, audio: {}",
        summary.frame_count(),
        if summary.with_audio() { "yes" } else { "no" }
    );
    for warning in summary.warnings() {
        println!("Warning: {warning}");
    }

    println!("\nNext steps:");
    println!("  1. Test in an emulator (BGB, SameBoy, mGBA)");
    println!("  2. Load onto a flashcart for real hardware");
    println!("\nTips:");
    println!("  - If the ROM is too large, try --fps-multiplier 2.0 for 15 fps");
    println!("  - If the ROM is too large, try --config 1 or --config 2");
    println!("  - Use --no-audio to reduce ROM size significantly");
}
