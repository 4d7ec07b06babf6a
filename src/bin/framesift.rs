use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framesift::{
    BatchExtractor, DecoderLogLevel, ExportSpec, FrameCountStrategy, FrameExporter, FrameSource,
    OrganizeOptions, Player, PlayerOptions, ProgressCallback, ProgressInfo, SessionEnd,
    StopSignal, TerminalSurface, VideoSource, find_files_with_extensions, organize_library,
    set_decoder_log_level, spawn_surface_watcher,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framesift play clip.mp4\n  framesift extract --input videos/ --out frames --ext png,jpg --quality 90,95 --all\n  framesift extract --input clip.mp4 --out frames\n  framesift organize --input videos/ --suffix height=9m\n  framesift probe clip.mp4 --json";

#[derive(Debug, Parser)]
#[command(
    name = "framesift",
    version,
    about = "Review videos frame by frame and sift still frames out to disk",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional output.
    #[arg(long)]
    verbose: bool,

    /// Proceed where the command would otherwise refuse (existing output
    /// directories, already-formatted file names).
    #[arg(short, long)]
    force: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Play a video in the terminal (watch-only: pause and quit, no
    /// stepping or saving).
    #[command(
        about = "Play a video in the terminal",
        after_help = "Keys:\n  SPACE  pause/play\n  ESC/q  quit"
    )]
    Play {
        /// Input video path.
        input: String,
    },

    /// Extract frames, either all of them or interactively.
    #[command(
        about = "Extract still frames from videos",
        after_help = "Without --all each video opens an interactive review session:\n  SPACE  pause/play\n  a/LEFT d/RIGHT  step one frame\n  s  save the frame on screen\n  ESC/q  quit\nWith --all every frame of every input is written without interaction."
    )]
    Extract {
        /// Input video file or a directory to scan.
        #[arg(long)]
        input: String,

        /// Root directory for extracted frames (one subdirectory per video).
        #[arg(long)]
        out: PathBuf,

        /// Video extensions matched when --input is a directory.
        #[arg(long, value_delimiter = ',', default_value = "mp4")]
        valid_ext: Vec<String>,

        /// Output image formats.
        #[arg(long, value_delimiter = ',', default_value = "png,jpg")]
        ext: Vec<String>,

        /// Quality levels for lossy formats; one file per level.
        #[arg(long, value_delimiter = ',', default_value = "95")]
        quality: Vec<u8>,

        /// Extract every frame without interaction.
        #[arg(long)]
        all: bool,

        /// Count frames exactly (full decode scan) before extracting, for
        /// accurate progress totals.
        #[arg(long)]
        count_frames: bool,
    },

    /// Clean and rename a video folder by modification timestamp.
    #[command(
        about = "Delete sidecar files and rename videos to their timestamps",
        after_help = "Examples:\n  framesift organize --input videos/ --delete-ext lrv,thm\n  framesift organize --input videos/ --suffix height=9m --force"
    )]
    Organize {
        /// Folder to organize.
        #[arg(long)]
        input: String,

        /// Extensions of videos to rename.
        #[arg(long, value_delimiter = ',', default_value = "mp4")]
        valid_ext: Vec<String>,

        /// Extensions of sidecar files to delete.
        #[arg(long, value_delimiter = ',', default_value = "lrv,thm")]
        delete_ext: Vec<String>,

        /// Suffix appended to renamed files, e.g. height=9m.
        #[arg(long, default_value = "")]
        suffix: String,
    },

    /// Print video metadata (alias: metadata).
    #[command(about = "Print video metadata", visible_alias = "metadata")]
    Probe {
        /// Input video path.
        input: String,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,

        /// Count frames exactly instead of trusting the container.
        #[arg(long)]
        count_frames: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn count_strategy(exact: bool) -> FrameCountStrategy {
    if exact {
        FrameCountStrategy::ScanAndCount
    } else {
        FrameCountStrategy::Reported
    }
}

/// Resolve an extract/organize input into the list of videos to process.
fn collect_inputs(
    input: &str,
    valid_extensions: &[String],
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let path = Path::new(input);
    if !path.exists() {
        return Err(format!("No such file or directory: {input}").into());
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let videos = find_files_with_extensions(path, valid_extensions)?;
    if videos.is_empty() {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("0 video files {valid_extensions:?} found in '{input}'").yellow()
        );
    }
    Ok(videos)
}

fn video_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string())
}

/// Feeds library progress callbacks into an indicatif bar, one update per
/// exported frame, overwriting in place.
struct FrameProgressBar {
    bar: ProgressBar,
}

impl ProgressCallback for FrameProgressBar {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        if let Some(frame) = info.current_frame {
            self.bar.set_message(format!("frame {frame:06}"));
        }
    }
}

fn frame_progress_bar() -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let bar = ProgressBar::no_length();
    let style =
        ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
    bar.set_style(style.progress_chars("##-"));
    Ok(bar)
}

fn run_batch_extract(
    videos: &[PathBuf],
    out: &Path,
    spec: ExportSpec,
    exact_count: bool,
    global: &GlobalOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if out.exists() && !global.force {
        return Err(format!(
            "output directory already exists: {} (use --force)",
            out.display()
        )
        .into());
    }

    let mut total_frames = 0_u64;
    let mut failed = 0_usize;

    for (position, video) in videos.iter().enumerate() {
        println!(
            "{} {}",
            format!("VIDEO {}/{}:", position + 1, videos.len()).bold(),
            video.display()
        );

        let bar = frame_progress_bar()?;
        let extractor = BatchExtractor::new(out, spec.clone())
            .with_count_strategy(count_strategy(exact_count))
            .with_progress(Arc::new(FrameProgressBar { bar: bar.clone() }));

        match extractor.extract_file(video) {
            Ok(frames) => {
                bar.finish_with_message("done");
                total_frames += frames;
                println!(
                    "    Extracted {frames} frames from {}",
                    video_stem(video)
                );
            }
            Err(error) => {
                // One file failing never takes the batch down with it.
                bar.abandon_with_message("failed");
                failed += 1;
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("skipping {}: {error}", video.display()).yellow()
                );
            }
        }
    }

    println!(
        "{} {}",
        "success:".green().bold(),
        format!(
            "Extracted {total_frames} frame(s) from {} file(s) ({failed} failed) to {}",
            videos.len() - failed,
            out.display()
        )
        .green()
    );
    Ok(())
}

fn run_interactive_extract(
    videos: &[PathBuf],
    out: &Path,
    spec: ExportSpec,
    global: &GlobalOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    // FFmpeg writing warnings to stderr would corrupt the alternate screen.
    set_decoder_log_level(DecoderLogLevel::Quiet);

    let signal = StopSignal::new();
    let mut surface = TerminalSurface::new()?;
    spawn_surface_watcher(surface.probe(), signal.clone());

    let mut saved_total = 0_u64;
    let mut sessions = Vec::new();
    let mut skipped = Vec::new();

    for video in videos {
        // The stepper needs a reliable upper clamp, so count exactly.
        let source = match VideoSource::open_with(video, FrameCountStrategy::ScanAndCount) {
            Ok(source) => source,
            Err(error) => {
                skipped.push((video.clone(), error));
                continue;
            }
        };
        let stem = video_stem(video);
        let exporter = FrameExporter::new(out.join(&stem), &stem, spec.clone())?;

        let summary = Player::new(source, &mut surface, signal.clone())
            .with_exporter(exporter)
            .with_title(
                video
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )
            .run()?;

        saved_total += summary.frames_saved;
        let ended = summary.ended;
        sessions.push((video.clone(), summary));

        if matches!(ended, SessionEnd::Quit | SessionEnd::SurfaceClosed) {
            break;
        }
    }

    // Leave the alternate screen before printing the summary.
    drop(surface);

    for (video, error) in &skipped {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("skipped {}: {error}", video.display()).yellow()
        );
    }
    for (video, summary) in &sessions {
        println!(
            "{}: {} frame(s) shown, {} saved",
            video.display(),
            summary.frames_shown,
            summary.frames_saved
        );
        if global.verbose {
            println!("    ended: {:?}", summary.ended);
        }
    }
    println!(
        "{} {}",
        "success:".green().bold(),
        format!("Saved {saved_total} frame(s) to {}", out.display()).green()
    );
    Ok(())
}

fn run_play(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(input);
    if !path.exists() {
        return Err(format!("No such file or directory: {input}").into());
    }

    set_decoder_log_level(DecoderLogLevel::Quiet);

    let source = VideoSource::open(path)?;
    let signal = StopSignal::new();
    let surface = TerminalSurface::new()?;
    spawn_surface_watcher(surface.probe(), signal.clone());

    let summary = Player::new(source, surface, signal)
        .with_options(PlayerOptions {
            step_enabled: false,
        })
        .with_title(
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )
        .run()?;

    println!("Played {} frame(s)", summary.frames_shown);
    Ok(())
}

fn run_probe(
    input: &str,
    as_json: bool,
    exact_count: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = VideoSource::open_with(input, count_strategy(exact_count))?;
    let metadata = source.metadata().clone();

    if as_json {
        let payload = json!({
            "path": input,
            "width": metadata.width,
            "height": metadata.height,
            "fps": metadata.frames_per_second,
            "frame_count": metadata.frame_count,
            "frame_count_exact": exact_count,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "Video: {}x{} @ {:.2} fps",
            metadata.width, metadata.height, metadata.frames_per_second
        );
        match metadata.frame_count {
            Some(count) if exact_count => println!("Frames: {count}"),
            Some(count) => println!("Frames: ~{count} (container estimate)"),
            None => println!("Frames: unknown (rerun with --count-frames)"),
        }
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { input } => run_play(&input)?,
        Commands::Extract {
            input,
            out,
            valid_ext,
            ext,
            quality,
            all,
            count_frames,
        } => {
            let videos = collect_inputs(&input, &valid_ext)?;
            if videos.is_empty() {
                return Ok(());
            }
            let spec = ExportSpec::from_options(&ext, &quality)?;
            if all {
                run_batch_extract(&videos, &out, spec, count_frames, &cli.global)?;
            } else {
                run_interactive_extract(&videos, &out, spec, &cli.global)?;
            }
        }
        Commands::Organize {
            input,
            valid_ext,
            delete_ext,
            suffix,
        } => {
            let options = OrganizeOptions {
                valid_extensions: valid_ext,
                delete_extensions: delete_ext,
                suffix: suffix.trim_matches('_').to_string(),
                force: cli.global.force,
            };
            let summary = organize_library(Path::new(&input), &options)?;
            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "{} deleted, {} renamed, {} already formatted",
                    summary.deleted, summary.renamed, summary.skipped
                )
                .green()
            );
        }
        Commands::Probe {
            input,
            json,
            count_frames,
        } => run_probe(&input, json, count_frames)?,
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framesift", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
