//! Work queue between the frame producer and the pipeline worker thread.
//!
//! Uses std::sync::mpsc channel for single-producer, single-consumer communication.
//! The producer sends frame file paths, the worker receives and processes them.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

/// A frame waiting to be processed.
#[derive(Debug, Clone)]
pub struct FrameWorkItem {
    /// Path to the captured frame image
    pub source: PathBuf,
    /// Sequence number (1-based)
    pub sequence: u32,
    /// When the frame was queued
    pub queued_at: DateTime<Local>,
}

impl FrameWorkItem {
    pub fn new(source: PathBuf, sequence: u32) -> Self {
        Self {
            source,
            sequence,
            queued_at: Local::now(),
        }
    }
}

/// Creates a new work queue.
///
/// The channel is unbounded: frames queue up if recognition is slower than capture.
pub fn create_work_queue() -> (Sender<FrameWorkItem>, Receiver<FrameWorkItem>) {
    channel()
}
