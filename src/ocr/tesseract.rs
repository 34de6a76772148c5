//! Recognizer backed by the Tesseract command-line tool.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

use super::engine::{parse_tsv_output, RecognitionError, RecognizedText, Recognizer};
use crate::config::RecognitionConfig;
use crate::imaging::PixelBuffer;

/// Common install locations checked when tesseract is not on PATH.
const COMMON_EXECUTABLE_PATHS: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    default_language: String,
    page_segmentation_mode: u8,
}

impl TesseractRecognizer {
    pub fn new(executable: PathBuf, tessdata: Option<PathBuf>, config: &RecognitionConfig) -> Self {
        Self {
            executable,
            tessdata,
            default_language: config.language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }

    /// Locates the executable and tessdata directory described by `config`.
    pub fn from_config(config: &RecognitionConfig) -> Result<Self, RecognitionError> {
        let executable = find_tesseract_executable(config.tesseract_path.as_deref())?;
        let tessdata = find_tessdata_dir(config.tessdata_dir.as_deref());

        let recognizer = Self::new(executable, tessdata, config);
        log::info!(
            "Using tesseract at {} (tessdata: {})",
            recognizer.executable().display(),
            recognizer
                .tessdata
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "engine default".to_string())
        );

        Ok(recognizer)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Arguments after the input and output paths.
    fn engine_args(&self, language: Option<&str>) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(tessdata) = &self.tessdata {
            args.push("--tessdata-dir".to_string());
            args.push(tessdata.display().to_string());
        }
        args.push("-l".to_string());
        args.push(language.unwrap_or(&self.default_language).to_string());
        args.push("--psm".to_string());
        args.push(self.page_segmentation_mode.to_string());
        // Output TSV format
        args.push("tsv".to_string());
        args
    }
}

impl Recognizer for TesseractRecognizer {
    fn recognize(
        &self,
        image: &PixelBuffer,
        language: Option<&str>,
    ) -> Result<RecognizedText, RecognitionError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RecognitionError::EmptyImage { width, height });
        }

        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        image.save_with_format(temp_input.path(), image::ImageFormat::Png)?;

        // Create temporary output file (Tesseract adds .tsv extension)
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let output = Command::new(&self.executable)
            .arg(temp_input.path())
            .arg(&output_base)
            .args(self.engine_args(language))
            .output()
            .map_err(|e| {
                RecognitionError::EngineNotFound(format!("{}: {}", self.executable.display(), e))
            })?;

        let tsv_path = format!("{}.tsv", output_base);
        if !output.status.success() {
            // The engine may have written partial output before failing
            let _ = std::fs::remove_file(&tsv_path);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::EngineFailed(stderr.trim().to_string()));
        }

        let tsv_content = std::fs::read_to_string(&tsv_path).map_err(|e| {
            RecognitionError::InvalidOutput(format!("failed to read {}: {}", tsv_path, e))
        })?;
        let _ = std::fs::remove_file(&tsv_path);

        let lines = parse_tsv_output(&tsv_content)?;
        let recognized = RecognizedText::from_lines(lines);
        log::debug!(
            "Recognized {}x{} image: {} lines, confidence {:.0}",
            width,
            height,
            recognized.lines.len(),
            recognized.confidence
        );
        Ok(recognized)
    }
}

/// Finds the Tesseract executable: configured path, then PATH, then common
/// install locations.
pub fn find_tesseract_executable(configured: Option<&Path>) -> Result<PathBuf, RecognitionError> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        log::warn!("Configured tesseract {} does not exist", path.display());
    }

    // Check PATH
    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    for path in COMMON_EXECUTABLE_PATHS {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(RecognitionError::EngineNotFound(
        "tesseract not found. Install Tesseract-OCR or set recognition.tesseract_path".to_string(),
    ))
}

/// Finds a tessdata directory, or `None` to let Tesseract use its built-in default.
pub fn find_tessdata_dir(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_dir() {
            return Some(path.to_path_buf());
        }
        log::warn!("Configured tessdata {} is not a directory", path.display());
    }

    // Check TESSDATA_PREFIX environment variable
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if p.join("tessdata").is_dir() {
            return Some(p.join("tessdata"));
        }
        if p.is_dir() {
            return Some(p);
        }
    }

    let local = crate::paths::get_data_dir().join("tessdata");
    if local.is_dir() {
        return Some(local);
    }

    None
}
