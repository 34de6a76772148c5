//! Capture-to-text orchestration.
//!
//! This module provides:
//! - Segmentation of one frame: threshold → binarize → scan → extract
//! - Recognition of the regions (or the whole binarized frame)
//! - Optional classification of the recognized text
//! - A background worker that processes queued frame files

pub mod queue;
pub mod report_writer;
pub mod worker;

pub use queue::{create_work_queue, FrameWorkItem};
pub use worker::run_frame_worker;

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::classify::{Classification, ClassificationError, Classifier};
use crate::config::AppConfig;
use crate::imaging::{
    binarize, extract, scan_regions, PixelBuffer, PreconditionError, RegionDescriptor, SourceError,
};
use crate::ocr::{dispatch_regions, RecognitionError, RecognizedText, Recognizer, RegionOutcome};

/// What is handed to the recognizer for each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionMode {
    /// Every scanned region separately, in scan order
    #[default]
    Regions,
    /// The binarized frame as a single unit
    WholeFrame,
}

/// Whole-frame failures, split so callers can degrade gracefully.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no usable image: {0}")]
    NoUsableImage(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("recognition unavailable: {0}")]
    RecognitionUnavailable(#[source] RecognitionError),
    #[error("classification unavailable: {0}")]
    ClassificationUnavailable(#[source] ClassificationError),
}

impl From<PreconditionError> for PipelineError {
    fn from(e: PreconditionError) -> Self {
        PipelineError::NoUsableImage(Box::new(e))
    }
}

impl From<SourceError> for PipelineError {
    fn from(e: SourceError) -> Self {
        PipelineError::NoUsableImage(Box::new(e))
    }
}

/// Per-run pipeline settings.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    pub mode: RecognitionMode,
    /// Language hint passed to the recognizer; its own default when `None`
    pub language: Option<String>,
    pub min_region_width: u32,
    pub workers: usize,
    /// Directory to save binarized frames into, if any
    pub save_binarized_dir: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl PipelineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            mode: config.segmentation.mode,
            language: None,
            min_region_width: config.segmentation.min_region_width,
            workers: config.segmentation.workers,
            save_binarized_dir: config
                .output
                .save_binarized
                .then(crate::paths::get_output_dir),
        }
    }
}

/// A binarized frame and the regions cut out of it.
#[derive(Debug, Clone)]
pub struct SegmentedFrame {
    pub threshold: u8,
    pub binarized: PixelBuffer,
    /// Regions in scan order, each with its own copy of the pixels
    pub regions: Vec<(RegionDescriptor, PixelBuffer)>,
}

/// Binarizes `frame` with its Otsu threshold and extracts every dark run
/// at least `min_region_width` pixels wide.
pub fn segment_frame(
    mut frame: PixelBuffer,
    min_region_width: u32,
) -> Result<SegmentedFrame, PreconditionError> {
    let threshold = binarize(&mut frame)?;

    let scanned = scan_regions(&frame);
    let scanned_count = scanned.len();
    let regions = scanned
        .into_iter()
        .filter(|r| r.width >= min_region_width)
        .map(|r| extract(&frame, &r).map(|sub| (r, sub)))
        .collect::<Result<Vec<_>, _>>()?;

    log::info!(
        "Segmented {}x{} frame: threshold {}, {} regions covering {} px ({} below min width)",
        frame.width(),
        frame.height(),
        threshold,
        regions.len(),
        regions.iter().map(|(r, _)| r.area()).sum::<u64>(),
        scanned_count - regions.len()
    );

    Ok(SegmentedFrame {
        threshold,
        binarized: frame,
        regions,
    })
}

/// Recognition results for one frame.
#[derive(Debug)]
pub struct FrameReport {
    pub threshold: u8,
    pub mode: RecognitionMode,
    /// Per-region outcomes in scan order (empty in whole-frame mode)
    pub regions: Vec<RegionOutcome>,
    /// Whole-frame result (only in whole-frame mode)
    pub whole_frame: Option<RecognizedText>,
    /// Successful, non-empty texts joined in scan order, one unit per line
    pub text: String,
    pub binarized_path: Option<PathBuf>,
}

impl FrameReport {
    /// Scan indices of regions whose recognition failed.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.regions
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.index)
            .collect()
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

fn join_texts<'a>(texts: impl Iterator<Item = &'a RecognizedText>) -> String {
    texts
        .filter(|t| !t.is_empty())
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Saves the binarized frame as `binarized_<timestamp>.png` in `dir`.
fn save_binarized(frame: &PixelBuffer, dir: &Path) -> Result<PathBuf, image::ImageError> {
    std::fs::create_dir_all(dir).map_err(image::ImageError::IoError)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
    let path = dir.join(format!("binarized_{}.png", timestamp));
    frame.save(&path)?;
    Ok(path)
}

/// Runs segmentation and recognition over one captured frame.
///
/// Zero regions is a valid, empty report. In region mode individual failures
/// are kept in the report; only when every attempted unit failed is the
/// whole frame reported as `RecognitionUnavailable`.
pub fn process_frame(
    frame: PixelBuffer,
    recognizer: &dyn Recognizer,
    options: &PipelineOptions,
) -> Result<FrameReport, PipelineError> {
    let segmented = segment_frame(frame, options.min_region_width)?;
    let language = options.language.as_deref();

    let binarized_path = options.save_binarized_dir.as_ref().and_then(|dir| {
        match save_binarized(&segmented.binarized, dir) {
            Ok(path) => {
                log::info!("Binarized frame saved: {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::warn!("Failed to save binarized frame: {}", e);
                None
            }
        }
    });

    match options.mode {
        RecognitionMode::WholeFrame => {
            let recognized = recognizer
                .recognize(&segmented.binarized, language)
                .map_err(PipelineError::RecognitionUnavailable)?;
            Ok(FrameReport {
                threshold: segmented.threshold,
                mode: options.mode,
                regions: Vec::new(),
                text: join_texts(std::iter::once(&recognized)),
                whole_frame: Some(recognized),
                binarized_path,
            })
        }
        RecognitionMode::Regions => {
            let mut outcomes =
                dispatch_regions(recognizer, &segmented.regions, language, options.workers);

            if !outcomes.is_empty() && outcomes.iter().all(|o| !o.is_success()) {
                let first = outcomes.swap_remove(0);
                if let Err(e) = first.result {
                    return Err(PipelineError::RecognitionUnavailable(e));
                }
            }

            let text = join_texts(outcomes.iter().filter_map(|o| o.result.as_ref().ok()));
            Ok(FrameReport {
                threshold: segmented.threshold,
                mode: options.mode,
                regions: outcomes,
                whole_frame: None,
                text,
                binarized_path,
            })
        }
    }
}

/// Recognized text plus the (optional) classification of that text.
#[derive(Debug)]
pub struct DocumentReport {
    pub frame: FrameReport,
    /// `None` when no classifier was given or there was no text to classify
    pub classification: Option<Result<Classification, PipelineError>>,
}

impl DocumentReport {
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref().and_then(|c| c.as_ref().ok())
    }

    /// The `ClassificationUnavailable` error, if classification was attempted and failed.
    pub fn classification_error(&self) -> Option<&PipelineError> {
        self.classification.as_ref().and_then(|c| c.as_ref().err())
    }
}

/// Processes a frame and classifies the recognized text.
///
/// A classification failure does not discard the recognized text; it is
/// kept in the returned report.
pub fn process_document(
    frame: PixelBuffer,
    recognizer: &dyn Recognizer,
    classifier: Option<&dyn Classifier>,
    options: &PipelineOptions,
) -> Result<DocumentReport, PipelineError> {
    let frame = process_frame(frame, recognizer, options)?;

    let classification = match classifier {
        Some(_) if !frame.has_text() => {
            log::info!("No text recognized; skipping classification");
            None
        }
        Some(classifier) => Some(
            classifier
                .classify(&frame.text)
                .map_err(PipelineError::ClassificationUnavailable),
        ),
        None => None,
    };

    if let Some(Err(e)) = &classification {
        log::warn!("{}", e);
    }

    Ok(DocumentReport {
        frame,
        classification,
    })
}
