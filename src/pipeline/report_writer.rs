//! JSON-lines report writer.
//!
//! One object per processed frame, appended so a crash never loses earlier
//! results. Failed frames get a record too, carrying the error instead of text.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::queue::FrameWorkItem;
use super::{DocumentReport, PipelineError, RecognitionMode};
use crate::imaging::RegionDescriptor;

#[derive(Debug, Serialize)]
pub struct RegionRecord {
    pub index: usize,
    pub region: RegionDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportRecord {
    pub sequence: u32,
    pub source: PathBuf,
    pub queued_at: String,
    pub processed_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RecognitionMode>,
    pub regions: Vec<RegionRecord>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binarized_path: Option<PathBuf>,
    /// Whole-frame failure, or the classification failure for a frame that has text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportRecord {
    fn base(item: &FrameWorkItem) -> Self {
        Self {
            sequence: item.sequence,
            source: item.source.clone(),
            queued_at: item.queued_at.to_rfc3339(),
            processed_at: Local::now().to_rfc3339(),
            threshold: None,
            mode: None,
            regions: Vec::new(),
            text: String::new(),
            category: None,
            tags: Vec::new(),
            binarized_path: None,
            error: None,
        }
    }

    pub fn from_report(item: &FrameWorkItem, report: &DocumentReport) -> Self {
        let frame = &report.frame;
        let regions = frame
            .regions
            .iter()
            .map(|o| RegionRecord {
                index: o.index,
                region: o.region,
                text: o.result.as_ref().ok().map(|t| t.text.clone()),
                error: o.result.as_ref().err().map(|e| e.to_string()),
            })
            .collect();

        Self {
            threshold: Some(frame.threshold),
            mode: Some(frame.mode),
            regions,
            text: frame.text.clone(),
            category: report.classification().map(|c| c.category.clone()),
            tags: report
                .classification()
                .map(|c| c.tags.clone())
                .unwrap_or_default(),
            binarized_path: frame.binarized_path.clone(),
            error: report.classification_error().map(|e| e.to_string()),
            ..Self::base(item)
        }
    }

    pub fn from_error(item: &FrameWorkItem, error: &PipelineError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::base(item)
        }
    }
}

/// Appends one record as a single JSON line, creating the file if needed.
pub fn append_record(path: &Path, record: &ReportRecord) -> Result<()> {
    let line = serde_json::to_string(record).context("Failed to serialize report record")?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    writeln!(file, "{}", line).context("Failed to write report record")?;
    Ok(())
}

pub fn append_report(path: &Path, item: &FrameWorkItem, report: &DocumentReport) -> Result<()> {
    append_record(path, &ReportRecord::from_report(item, report))
}

pub fn append_failure(path: &Path, item: &FrameWorkItem, error: &PipelineError) -> Result<()> {
    append_record(path, &ReportRecord::from_error(item, error))
}
