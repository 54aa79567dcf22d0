use std::{fs, path::PathBuf, process, time::Instant};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use framesift::{
    FrameRange, FrameSource, ProcessingMode, ReferencePolicy, SelectionConfig, SelectionObserver,
    SiftError, SourceOpener, VideoOpener, WorkerReport, encode, select_frames,
};

const CLI_AFTER_HELP: &str = "Examples:\n  framesift -i input.mp4 -d frames -t 0.5\n  framesift -i input.mp4 -d frames -t 0.3 -w 8 --progress\n  framesift -i input.mp4 -d frames -t 0.5 --reference-policy every-frame --json";

/// Exit code for filesystem, source-open, and job-completeness failures.
/// Argument errors exit with 1, handled by the clap layer.
const EXIT_FATAL: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "framesift",
    version,
    about = "Scan a video in parallel and keep only the frames that changed",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Source video to process.
    #[arg(short, long)]
    input: PathBuf,

    /// Destination directory for the kept frames (created if absent).
    #[arg(short, long)]
    destination: PathBuf,

    /// Change-detection threshold, between 0.0 and 1.0.
    #[arg(short, long, value_parser = parse_threshold)]
    threshold: f64,

    /// Processing mode (0 or 1). Reserved; has no effect yet.
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    mode: u8,

    /// Worker threads to scan with.
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    workers: u64,

    /// Reference-update policy (fixed, every-frame, on-select).
    #[arg(long, default_value = "fixed", value_parser = parse_reference_policy)]
    reference_policy: ReferencePolicy,

    /// Output image extension (jpg, png, bmp, ...).
    #[arg(long, default_value = "jpg")]
    ext: String,

    /// Show a progress bar while writing frames.
    #[arg(long)]
    progress: bool,

    /// Print a machine-readable JSON run summary instead of text.
    #[arg(long)]
    json: bool,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,
}

fn parse_threshold(value: &str) -> Result<f64, String> {
    let parsed: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if (0.0..=1.0).contains(&parsed) {
        Ok(parsed)
    } else {
        Err("threshold must be between 0.0 and 1.0".to_string())
    }
}

fn parse_reference_policy(value: &str) -> Result<ReferencePolicy, String> {
    match value.to_ascii_lowercase().as_str() {
        "fixed" | "never" => Ok(ReferencePolicy::Fixed),
        "every-frame" | "every" => Ok(ReferencePolicy::EveryFrame),
        "on-select" | "select" => Ok(ReferencePolicy::OnSelect),
        _ => Err(format!(
            "`{value}` is not a reference policy (fixed, every-frame, on-select)"
        )),
    }
}

fn parse_mode(value: u8) -> ProcessingMode {
    match value {
        1 => ProcessingMode::Alternate,
        _ => ProcessingMode::Standard,
    }
}

fn policy_name(policy: ReferencePolicy) -> &'static str {
    match policy {
        ReferencePolicy::Fixed => "fixed",
        ReferencePolicy::EveryFrame => "every-frame",
        ReferencePolicy::OnSelect => "on-select",
    }
}

/// Observer that narrates worker lifecycles through the log facade,
/// matching the per-worker lines of the original tool.
struct LogObserver;

impl SelectionObserver for LogObserver {
    fn worker_started(&self, range: &FrameRange) {
        log::info!(
            "Worker {} started ({} frames from index {})",
            range.id,
            range.length,
            range.start
        );
    }

    fn worker_finished(&self, report: &WorkerReport) {
        log::info!(
            "Worker {} finished in {:.3} seconds with {} selected of {} scanned",
            report.range_id,
            report.elapsed.as_secs_f64(),
            report.selected,
            report.scanned
        );
    }
}

fn run(cli: &Cli) -> Result<(), SiftError> {
    log::info!("Started, preparing the job");

    if !cli.destination.exists() {
        log::warn!(
            "Destination {} does not exist, creating it",
            cli.destination.display()
        );
        fs::create_dir_all(&cli.destination)?;
    }

    if !cli.input.exists() {
        return Err(SiftError::SourceOpen {
            path: cli.input.clone(),
            reason: "no such file".to_string(),
        });
    }

    let opener = VideoOpener::new(&cli.input);
    let probe = opener.open()?;
    log::info!(
        "Input ready: {}x{} @ {:.2} fps, about {} frames",
        probe.width(),
        probe.height(),
        probe.frames_per_second(),
        probe.total_frames()
    );
    drop(probe);

    let config = SelectionConfig::new(cli.threshold)
        .with_workers(cli.workers as usize)
        .with_mode(parse_mode(cli.mode))
        .with_reference_policy(cli.reference_policy);

    let started = Instant::now();
    let frames = select_frames(&opener, &config, &LogObserver)?;
    log::info!("All workers finished, writing {} frames", frames.len());

    let extension = cli.ext.trim_start_matches('.').to_ascii_lowercase();
    let progress_bar = if cli.progress {
        let pb = ProgressBar::new(frames.len() as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        Some(pb)
    } else {
        None
    };

    for (position, frame) in frames.iter().enumerate() {
        let path = encode::frame_path(&cli.destination, position, &extension);
        encode::write_frame(frame, &path)?;

        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }
        log::debug!("Saved frame {} -> {}", frame.index, path.display());
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("done");
    }

    let elapsed = started.elapsed();
    if cli.json {
        let payload = json!({
            "input": cli.input.display().to_string(),
            "destination": cli.destination.display().to_string(),
            "threshold": cli.threshold,
            "workers": cli.workers,
            "reference_policy": policy_name(cli.reference_policy),
            "selected_frames": frames.len(),
            "elapsed_seconds": elapsed.as_secs_f64(),
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(rendered) => println!("{rendered}"),
            Err(error) => log::warn!("Failed to render JSON summary: {error}"),
        }
    } else {
        println!(
            "{} {}",
            "success:".green().bold(),
            format!(
                "Wrote {} frame(s) to {} in {:.2}s",
                frames.len(),
                cli.destination.display(),
                elapsed.as_secs_f64()
            )
            .green()
        );
    }

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // --help and --version surface as "errors" but exit cleanly.
            let code = if error.use_stderr() { 1 } else { 0 };
            let _ = error.print();
            process::exit(code);
        }
    };

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(error) = run(&cli) {
        eprintln!("{} {error}", "error:".red().bold());
        process::exit(EXIT_FATAL);
    }
}
