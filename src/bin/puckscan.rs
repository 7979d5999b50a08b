use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use puck_scan::fixtures::{encode_symbol, render_symbol};
use puck_scan::tools::{frame_paths, grayscale_stats, load_gray, save_gray};
use puck_scan::{ScanConfig, ScanSession, SymbolDecoder, load_config};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "puckscan", version, about = "Data Matrix puck scanning tools")]
struct Cli {
    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode every symbol in a single image
    Decode {
        #[arg(long)]
        image: PathBuf,
        /// JSON scan configuration (decoder section is used)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Treat images as successive frames and aggregate them into a plate
    Scan {
        /// JSON scan configuration (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the frame budget
        #[arg(long)]
        max_frames: Option<usize>,
        /// Print the plate summary as JSON
        #[arg(long)]
        json: bool,
        /// Image files or directories of images
        #[arg(required = true)]
        frames: Vec<PathBuf>,
    },
    /// Write a synthetic symbol image
    Render {
        #[arg(long)]
        text: String,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 8)]
        module_px: usize,
        /// Light border width in modules
        #[arg(long, default_value_t = 2)]
        quiet_zone: usize,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Command::Decode { image, config } => decode_cmd(&image, config.as_deref()),
        Command::Scan {
            config,
            max_frames,
            json,
            frames,
        } => scan_cmd(config.as_deref(), max_frames, json, &frames),
        Command::Render {
            text,
            out,
            module_px,
            quiet_zone,
        } => render_cmd(&text, &out, module_px, quiet_zone),
    }
}

fn read_config(path: Option<&Path>) -> Result<ScanConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(ScanConfig::default()),
    }
}

fn decode_cmd(image: &Path, config: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let config = read_config(config)?;
    let frame = load_gray(image)?;
    let stats = grayscale_stats(frame.as_bytes());
    debug!(
        "grayscale range {}-{}, average {}",
        stats.min, stats.max, stats.avg
    );

    let start = Instant::now();
    let symbols = SymbolDecoder::new(config.decoder).decode_frame(&frame);
    let elapsed = start.elapsed();

    println!("Image: {} ({}x{})", image.display(), frame.width(), frame.height());
    println!("Found {} symbols in {:.2?}", symbols.len(), elapsed);
    for (i, symbol) in symbols.iter().enumerate() {
        let center = symbol.bounds.center();
        println!(
            "  Symbol {}: center=({:.1}, {:.1}) status={:?} corrections={} payload={:?}",
            i,
            center.x,
            center.y,
            symbol.status,
            symbol.correction_count,
            symbol.text()
        );
    }
    Ok(())
}

fn scan_cmd(
    config: Option<&Path>,
    max_frames: Option<usize>,
    json: bool,
    frames: &[PathBuf],
) -> Result<(), Box<dyn Error>> {
    let mut config = read_config(config)?;
    if let Some(max_frames) = max_frames {
        config.limits.max_frames = max_frames;
    }
    let mut session = ScanSession::from_config(&config)?;

    for path in frame_paths(frames) {
        if let Some(reason) = session.stop_reason(&config.limits) {
            info!("stopping: {reason:?}");
            break;
        }
        let frame = match load_gray(&path) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                continue;
            }
        };
        let report = session.ingest_frame(&frame);
        info!(
            "{}: {} symbol(s), plate {}",
            path.display(),
            report.merge.outcomes.len(),
            report.completeness
        );
    }

    let frames_processed = session.frames_processed();
    let summary = session.into_plate().summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Plate {} after {} frame(s)",
            summary.completeness, frames_processed
        );
        for slot in &summary.slots {
            match (&slot.payload, slot.status) {
                (Some(payload), Some(status)) => println!("  {:>2}: {payload} ({status:?})", slot.slot),
                (None, Some(status)) => println!("  {:>2}: <unreadable> ({status:?})", slot.slot),
                _ => println!("  {:>2}: <empty>", slot.slot),
            }
        }
    }
    Ok(())
}

fn render_cmd(text: &str, out: &Path, module_px: usize, quiet_zone: usize) -> Result<(), Box<dyn Error>> {
    let grid = encode_symbol(text.as_bytes())?;
    let image = render_symbol(&grid, module_px.max(1), quiet_zone);
    save_gray(&image, out)?;
    println!(
        "Wrote {}x{} symbol ({} px) to {}",
        grid.dimension(),
        grid.dimension(),
        image.width(),
        out.display()
    );
    Ok(())
}
