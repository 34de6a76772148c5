//! Fans region sub-buffers out to a recognizer.
//!
//! Regions are recognized on a bounded set of scoped worker threads. Each
//! outcome carries the region's scan index, so results are re-associated by
//! tag and returned in scan order whatever order they complete in. A failed
//! region never stops its siblings.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::channel;
use std::thread;

use super::engine::{RecognitionError, RecognizedText, Recognizer};
use crate::imaging::{PixelBuffer, RegionDescriptor};

/// Result of recognizing one region.
#[derive(Debug)]
pub struct RegionOutcome {
    /// Position of the region in the scanned region list
    pub index: usize,
    pub region: RegionDescriptor,
    pub result: Result<RecognizedText, RecognitionError>,
}

impl RegionOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Recognizes every `(region, sub_buffer)` pair using up to `workers` threads.
pub fn dispatch_regions(
    recognizer: &dyn Recognizer,
    regions: &[(RegionDescriptor, PixelBuffer)],
    language: Option<&str>,
    workers: usize,
) -> Vec<RegionOutcome> {
    if regions.is_empty() {
        return Vec::new();
    }

    let workers = workers.clamp(1, regions.len());
    let next = AtomicUsize::new(0);
    let (sender, receiver) = channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let sender = sender.clone();
            let next = &next;
            scope.spawn(move || {
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some((region, buffer)) = regions.get(index) else {
                        break;
                    };

                    let result = recognizer.recognize(buffer, language);
                    if let Err(e) = &result {
                        log::warn!("Recognition failed for region {} ({}): {}", index, region, e);
                    }

                    let outcome = RegionOutcome {
                        index,
                        region: *region,
                        result,
                    };
                    if sender.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(sender);

    let mut outcomes: Vec<RegionOutcome> = receiver.into_iter().collect();
    outcomes.sort_by_key(|o| o.index);

    log::debug!(
        "Dispatched {} regions on {} workers: {} succeeded",
        outcomes.len(),
        workers,
        outcomes.iter().filter(|o| o.is_success()).count()
    );

    outcomes
}
