use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::imaging::PixelBuffer;

/// Failure of a single recognition call.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("recognition engine not found: {0}")]
    EngineNotFound(String),
    #[error("recognition engine failed: {0}")]
    EngineFailed(String),
    #[error("unreadable engine output: {0}")]
    InvalidOutput(String),
    #[error("cannot recognize an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },
    #[error("I/O error during recognition: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode image for recognition: {0}")]
    Encode(#[from] image::ImageError),
}

/// Represents a line of OCR text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct OcrLine {
    pub text: String,
    pub words: Vec<OcrWord>,
    pub confidence: f32,
}

/// Represents a single word from OCR with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub confidence: f32,
}

/// Text recognized from one buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean word confidence (0-100), 0 when nothing was read
    pub confidence: f32,
    pub lines: Vec<OcrLine>,
}

impl RecognizedText {
    /// Builds the result from structured lines, joining them with newlines.
    pub fn from_lines(lines: Vec<OcrLine>) -> Self {
        let text = normalize_text(
            &lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        );

        let word_count: usize = lines.iter().map(|l| l.words.len()).sum();
        let confidence = if word_count > 0 {
            lines
                .iter()
                .flat_map(|l| l.words.iter())
                .map(|w| w.confidence)
                .sum::<f32>()
                / word_count as f32
        } else {
            0.0
        };

        Self {
            text,
            confidence,
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The recognition capability: pixels plus an optional language hint in,
/// text out. Implementations must be callable from several threads at once.
pub trait Recognizer: Send + Sync {
    fn recognize(
        &self,
        image: &PixelBuffer,
        language: Option<&str>,
    ) -> Result<RecognizedText, RecognitionError>;
}

fn blank_run_regex() -> &'static Regex {
    static BLANK_RUN: OnceLock<Regex> = OnceLock::new();
    BLANK_RUN.get_or_init(|| Regex::new(r"[ \t\u{00A0}\u{3000}]+").expect("valid regex"))
}

/// Collapses blank runs inside each line to one space, trims every line and
/// drops lines left empty.
pub fn normalize_text(raw: &str) -> String {
    let blank_run = blank_run_regex();
    raw.lines()
        .map(|line| blank_run.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses Tesseract TSV output into structured OcrLine data
pub fn parse_tsv_output(tsv: &str) -> Result<Vec<OcrLine>, RecognitionError> {
    if tsv.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut lines_iter = tsv.lines();
    if !lines_iter.next().is_some_and(|header| header.starts_with("level")) {
        return Err(RecognitionError::InvalidOutput(
            "missing TSV header".to_string(),
        ));
    }

    let mut lines: Vec<OcrLine> = Vec::new();
    let mut current_key: Option<(i32, i32, i32)> = None;
    let mut current_words: Vec<OcrWord> = Vec::new();

    for line in lines_iter {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
        //             left, top, width, height, conf, text
        let level: i32 = fields[0].parse().unwrap_or(-1);
        // Level 5 = word
        if level != 5 {
            continue;
        }

        let text = fields[11].trim();
        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (
            fields[2].parse().unwrap_or(-1),
            fields[3].parse().unwrap_or(-1),
            fields[4].parse().unwrap_or(-1),
        );

        if current_key.is_some_and(|k| k != key) {
            push_line(&mut lines, std::mem::take(&mut current_words));
        }
        current_key = Some(key);

        current_words.push(OcrWord {
            text: text.to_string(),
            confidence: conf,
        });
    }

    // Don't forget the last line
    push_line(&mut lines, current_words);

    Ok(lines)
}

fn push_line(lines: &mut Vec<OcrLine>, words: Vec<OcrWord>) {
    if words.is_empty() {
        return;
    }
    let confidence = words.iter().map(|w| w.confidence).sum::<f32>() / words.len() as f32;
    let text = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    lines.push(OcrLine {
        text,
        words,
        confidence,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word(block: i32, par: i32, line: i32, conf: f32, text: &str) -> String {
        format!("5\t1\t{}\t{}\t{}\t1\t0\t0\t10\t10\t{}\t{}", block, par, line, conf, text)
    }

    #[test]
    fn test_parse_tsv_groups_words_by_line() {
        let tsv = [
            HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t".to_string(),
            word(1, 1, 1, 90.0, "Invoice"),
            word(1, 1, 1, 80.0, "#42"),
            word(1, 1, 2, 70.0, "Total:"),
            word(2, 1, 1, 60.0, "Paid"),
        ]
        .join("\n");

        let lines = parse_tsv_output(&tsv).unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "Invoice #42");
        assert_eq!(lines[0].confidence, 85.0);
        assert_eq!(lines[1].text, "Total:");
        // Same line number in a different block is a different line.
        assert_eq!(lines[2].text, "Paid");
    }

    #[test]
    fn test_parse_tsv_skips_empty_and_unconfident_words() {
        let tsv = [
            HEADER.to_string(),
            word(1, 1, 1, -1.0, "ghost"),
            word(1, 1, 1, 50.0, " "),
            word(1, 1, 1, 88.0, "real"),
        ]
        .join("\n");

        let lines = parse_tsv_output(&tsv).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].words.len(), 1);
        assert_eq!(lines[0].text, "real");
    }

    #[test]
    fn test_parse_tsv_empty_output() {
        assert!(parse_tsv_output("").unwrap().is_empty());
        assert!(parse_tsv_output(HEADER).unwrap().is_empty());
    }

    #[test]
    fn test_parse_tsv_rejects_garbage() {
        assert!(matches!(
            parse_tsv_output("Error opening data file"),
            Err(RecognitionError::InvalidOutput(_))
        ));
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(
            normalize_text("  Dear \t  Sir,\n\n   \nAmount\u{00A0}\u{00A0}due  "),
            "Dear Sir,\nAmount due"
        );
        assert_eq!(normalize_text(" \n \n"), "");
    }

    #[test]
    fn test_recognized_text_from_lines() {
        let lines = vec![
            OcrLine {
                text: "a  b".to_string(),
                words: vec![
                    OcrWord { text: "a".to_string(), confidence: 90.0 },
                    OcrWord { text: "b".to_string(), confidence: 70.0 },
                ],
                confidence: 80.0,
            },
            OcrLine {
                text: "c".to_string(),
                words: vec![OcrWord { text: "c".to_string(), confidence: 50.0 }],
                confidence: 50.0,
            },
        ];

        let recognized = RecognizedText::from_lines(lines);
        assert_eq!(recognized.text, "a b\nc");
        assert_eq!(recognized.confidence, 70.0);
        assert!(!recognized.is_empty());
        assert!(RecognizedText::from_lines(Vec::new()).is_empty());
    }
}
