//! Text recognition boundary.
//!
//! The recognizer itself is an external capability behind the `Recognizer`
//! trait. This module provides the Tesseract command-line backend and the
//! per-region fan-out used by the pipeline.

pub mod dispatch;
pub mod engine;
pub mod tesseract;

pub use dispatch::{dispatch_regions, RegionOutcome};
pub use engine::{normalize_text, OcrLine, OcrWord, RecognitionError, RecognizedText, Recognizer};
pub use tesseract::TesseractRecognizer;
