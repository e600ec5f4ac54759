// demos/track_sequence.rs
//
// Replay a directory of recorded VLC frames through one processing path and
// write the results next to each other as PNGs.
//
// Usage:
//   cargo run --example track_sequence --release -- --input frames/ --output out/
//   cargo run --example track_sequence --release -- -i frames/ -o out/ --mode canny
//   cargo run --example track_sequence --release -- -i frames/ -o out/ --show
//
// Frames are processed in file-name order. With --show a window displays
// each result; Q/Esc quits early.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, ValueEnum};
use minifb::{Key, Window, WindowOptions};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rm_vision::config::ProcessingConfig;
use rm_vision::convert::save_gray;
use rm_vision::image::Image;
use rm_vision::marker::NoMarkers;
use rm_vision::processing::{process_with_canny, process_with_markers, process_with_optical_flow};
use rm_vision::sensor::GrayFrame;
use rm_vision::tracking::FrameTrackingCache;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Sparse optical-flow trails
    Flow,
    /// Canny edge map
    Canny,
    /// Marker outlines
    Markers,
}

#[derive(Parser, Debug)]
#[command(name = "track_sequence", about = "Run a processing path over recorded VLC frames")]
struct Args {
    /// Directory of grayscale frames (PNG or JPEG)
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,

    /// Directory for the result images
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Mode::Flow)]
    mode: Mode,

    /// JSON processing configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<usize>,

    /// Show results in a window while processing
    #[arg(long)]
    show: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn list_frames(dir: &Path) -> rm_vision::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Gray to 0RGB for minifb.
fn to_framebuffer(img: &Image<u8>) -> Vec<u32> {
    img.as_slice()
        .iter()
        .map(|&v| {
            let v = v as u32;
            (v << 16) | (v << 8) | v
        })
        .collect()
}

fn main() -> rm_vision::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    let config = match &args.config {
        Some(path) => ProcessingConfig::from_json_file(path)?,
        None => ProcessingConfig::default(),
    };

    let mut frames = list_frames(&args.input)?;
    if let Some(max) = args.max_frames {
        frames.truncate(max);
    }
    if frames.is_empty() {
        warn!(dir = %args.input.display(), "no frames found");
        return Ok(());
    }
    fs::create_dir_all(&args.output)?;
    info!(count = frames.len(), mode = ?args.mode, "processing frames");

    let mut cache = FrameTrackingCache::from_config(config.tracking.clone())?;
    let mut window: Option<Window> = None;
    let start = Instant::now();

    for (i, path) in frames.iter().enumerate() {
        let frame = GrayFrame::from_path(path)?;

        let result = match args.mode {
            Mode::Flow => process_with_optical_flow(&frame, &mut cache),
            Mode::Canny => process_with_canny(&frame, &config.edges),
            Mode::Markers => process_with_markers(&frame, &NoMarkers).map(|m| m.image),
        };
        let result = match result {
            Ok(img) => img,
            Err(e) => {
                warn!(frame = %path.display(), error = %e, "frame skipped");
                continue;
            }
        };

        if matches!(args.mode, Mode::Flow) {
            let stats = cache.last_stats();
            info!(frame = i, tracked = stats.tracked, lost = stats.lost, alive = stats.total);
        }

        let name = path.file_stem().map(|s| s.to_os_string()).unwrap_or_else(|| format!("{i:06}").into());
        save_gray(&result, args.output.join(name).with_extension("png"))?;

        if args.show {
            if window.is_none() {
                match Window::new("rm-vision", result.width(), result.height(), WindowOptions::default()) {
                    Ok(mut w) => {
                        w.set_target_fps(30);
                        window = Some(w);
                    }
                    Err(e) => {
                        warn!(error = %e, "cannot open window, continuing without display");
                    }
                }
            }
            if let Some(w) = window.as_mut() {
                if !w.is_open() || w.is_key_down(Key::Escape) || w.is_key_down(Key::Q) {
                    break;
                }
                if let Err(e) = w.update_with_buffer(&to_framebuffer(&result), result.width(), result.height()) {
                    warn!(error = %e, "window update failed");
                }
            }
        }
    }

    let elapsed = start.elapsed();
    info!(
        frames = frames.len(),
        ms_per_frame = elapsed.as_secs_f64() * 1000.0 / frames.len() as f64,
        "done"
    );
    Ok(())
}
