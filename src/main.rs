//! Document Capture
//!
//! Command-line front end: binarizes captured frames, segments them into
//! text regions, recognizes them and optionally classifies the result.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::Serialize;
use std::path::PathBuf;
use std::thread;

use document_capture::classify::{Classifier, HttpClassifier};
use document_capture::config::{get_config, init_config};
use document_capture::imaging::{self, FileFrameSource, FrameSource, RegionDescriptor};
use document_capture::ocr::TesseractRecognizer;
use document_capture::pipeline::{
    create_work_queue, run_frame_worker, FrameWorkItem, PipelineOptions, RecognitionMode,
};
use document_capture::{logging, paths};

#[derive(Parser, Debug)]
#[command(name = "document-capture")]
#[command(version)]
#[command(about = "Binarize captured documents, split them into text regions and recognize them", long_about = None)]
struct Cli {
    /// Config file (defaults to config.json next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the threshold and text regions of each image as JSON
    Scan {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Write the binarized version of an image
    Binarize {
        image: PathBuf,
        output: PathBuf,
    },

    /// Recognize (and optionally classify) one or more captured frames
    Process {
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Recognize each region separately or the whole binarized frame
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Language hint for the recognizer (e.g. eng, deu)
        #[arg(long)]
        language: Option<String>,

        /// Send recognized text to the configured classification service
        #[arg(long)]
        classify: bool,

        /// JSON-lines report path (defaults to <output_dir>/results.jsonl)
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Regions,
    WholeFrame,
}

impl From<ModeArg> for RecognitionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Regions => RecognitionMode::Regions,
            ModeArg::WholeFrame => RecognitionMode::WholeFrame,
        }
    }
}

#[derive(Serialize)]
struct ScanOutput<'a> {
    image: &'a str,
    width: u32,
    height: u32,
    threshold: u8,
    regions: Vec<RegionDescriptor>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log panics before the process goes down
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        log::error!("[PANIC]{} {}", location, panic_info);
        eprintln!("[PANIC]{} {}", location, panic_info);
    }));

    // Ensure output directories exist
    paths::ensure_directories().context("Failed to create output directories")?;

    logging::init(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    init_config(cli.config.as_deref());

    match cli.command {
        Commands::Scan { images } => run_scan(images),
        Commands::Binarize { image, output } => run_binarize(image, output),
        Commands::Process {
            images,
            mode,
            language,
            classify,
            report,
        } => run_process(images, mode, language, classify, report),
    }
}

fn run_scan(images: Vec<PathBuf>) -> Result<()> {
    let mut source = FileFrameSource::new(images);

    while let Some(frame) = source.next_frame() {
        let mut frame = frame?;
        let (width, height) = frame.buffer.dimensions();
        let threshold = imaging::binarize(&mut frame.buffer)?;
        let regions = imaging::scan_regions(&frame.buffer);

        let output = ScanOutput {
            image: &frame.origin,
            width,
            height,
            threshold,
            regions,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}

fn run_binarize(image: PathBuf, output: PathBuf) -> Result<()> {
    let mut frame = imaging::source::load_frame(&image)?.buffer;
    let threshold = imaging::binarize(&mut frame)?;
    frame
        .save(&output)
        .with_context(|| format!("Failed to save {}", output.display()))?;
    log::info!(
        "Binarized {} with threshold {} -> {}",
        image.display(),
        threshold,
        output.display()
    );
    Ok(())
}

fn run_process(
    images: Vec<PathBuf>,
    mode: Option<ModeArg>,
    language: Option<String>,
    classify: bool,
    report: Option<PathBuf>,
) -> Result<()> {
    let config = get_config();

    let recognizer = TesseractRecognizer::from_config(&config.recognition)
        .map_err(|e| anyhow!("Recognition unavailable: {}", e))?;

    let classifier: Option<Box<dyn Classifier>> = if classify {
        Some(Box::new(
            HttpClassifier::from_config(&config.classification)
                .map_err(|e| anyhow!("Classification unavailable: {}", e))?,
        ))
    } else {
        None
    };

    let mut options = PipelineOptions::from_config(config);
    if let Some(mode) = mode {
        options.mode = mode.into();
    }
    options.language = language;

    let report_path = report.unwrap_or_else(|| paths::get_output_dir().join("results.jsonl"));
    log::info!(
        "Processing {} frames ({:?} mode), report: {}",
        images.len(),
        options.mode,
        report_path.display()
    );

    let (sender, receiver) = create_work_queue();
    let worker_report_path = report_path.clone();
    let worker = thread::spawn(move || {
        run_frame_worker(
            receiver,
            Box::new(recognizer),
            classifier,
            options,
            worker_report_path,
        )
    });

    let total = images.len();
    for (i, image) in images.into_iter().enumerate() {
        sender
            .send(FrameWorkItem::new(image, i as u32 + 1))
            .map_err(|_| anyhow!("Frame worker stopped unexpectedly"))?;
    }
    drop(sender);

    let processed = worker
        .join()
        .map_err(|_| anyhow!("Frame worker panicked"))?;

    log::info!(
        "Done: {}/{} frames processed, report at {}",
        processed,
        total,
        report_path.display()
    );
    Ok(())
}
