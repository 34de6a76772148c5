//! Document capture core.
//!
//! Binarizes captured frames with an Otsu threshold, splits the dark pixels
//! into row-local text regions, and hands each region to a text recognizer.
//! Recognized text can then be sent to a classification service.

pub mod classify;
pub mod config;
pub mod imaging;
pub mod logging;
pub mod ocr;
pub mod paths;
pub mod pipeline;
