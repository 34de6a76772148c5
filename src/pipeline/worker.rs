//! Pipeline worker thread.
//!
//! Receives frame paths from the work queue, runs each frame through the
//! pipeline and appends the outcome to the report file.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use super::queue::FrameWorkItem;
use super::report_writer::{append_failure, append_report};
use super::{process_document, PipelineError, PipelineOptions};
use crate::classify::Classifier;
use crate::imaging::source::load_frame;
use crate::ocr::Recognizer;

/// Runs the worker loop until the channel is closed (sender dropped).
///
/// A frame that fails is recorded and skipped; the loop keeps going.
/// Returns the number of frames that produced a report.
pub fn run_frame_worker(
    receiver: Receiver<FrameWorkItem>,
    recognizer: Box<dyn Recognizer>,
    classifier: Option<Box<dyn Classifier>>,
    options: PipelineOptions,
    report_path: PathBuf,
) -> usize {
    log::info!("Frame worker started");
    let mut processed = 0;

    while let Ok(item) = receiver.recv() {
        log::info!(
            "Frame worker: processing frame {} ({})",
            item.sequence,
            item.source.display()
        );

        let result = load_frame(&item.source)
            .map_err(PipelineError::from)
            .and_then(|frame| {
                process_document(
                    frame.buffer,
                    &*recognizer,
                    classifier.as_deref(),
                    &options,
                )
            });

        let written = match &result {
            Ok(report) => {
                processed += 1;
                log::info!(
                    "Frame {} complete: threshold {}, {} regions, {} failed",
                    item.sequence,
                    report.frame.threshold,
                    report.frame.regions.len(),
                    report.frame.failed_indices().len()
                );
                append_report(&report_path, &item, report)
            }
            Err(e) => {
                log::error!("Frame {} failed: {}", item.sequence, e);
                append_failure(&report_path, &item, e)
            }
        };

        if let Err(e) = written {
            // Continue anyway - the frame file is still on disk for a retry
            log::error!("Frame worker: failed to write report for frame {}: {:#}", item.sequence, e);
        }
    }

    log::info!("Frame worker: channel closed, exiting");
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::queue::create_work_queue;
    use crate::pipeline::tests::{document_frame, SizeRecognizer};
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_worker_exits_when_channel_closes() {
        let dir = tempdir().unwrap();
        let report_path = dir.path().join("results.jsonl");
        let (sender, receiver) = create_work_queue();

        let handle = thread::spawn(move || {
            run_frame_worker(
                receiver,
                Box::new(SizeRecognizer::new(None)),
                None,
                PipelineOptions::default(),
                report_path,
            )
        });

        drop(sender);

        assert_eq!(handle.join().expect("Worker thread panicked"), 0);
    }

    #[test]
    fn test_worker_processes_frames_and_records_failures() {
        let dir = tempdir().unwrap();
        let report_path = dir.path().join("results.jsonl");
        let frame_path = dir.path().join("frame.png");
        document_frame().save(&frame_path).unwrap();

        let (sender, receiver) = create_work_queue();
        sender.send(FrameWorkItem::new(frame_path, 1)).unwrap();
        sender
            .send(FrameWorkItem::new(dir.path().join("missing.png"), 2))
            .unwrap();
        drop(sender);

        let processed = run_frame_worker(
            receiver,
            Box::new(SizeRecognizer::new(None)),
            None,
            PipelineOptions::default(),
            report_path.clone(),
        );

        assert_eq!(processed, 1);

        let contents = std::fs::read_to_string(&report_path).unwrap();
        let records: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["text"], "3x1\n1x1\n2x1");
        assert!(records[1]["error"].as_str().unwrap().starts_with("no usable image"));
    }
}
