//! Frame source boundary.
//!
//! Camera capture is not handled here; frames come from image files that a
//! capture tool (or the user) has already written to disk.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::buffer::PixelBuffer;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to load frame {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// One captured frame and where it came from.
#[derive(Debug, Clone)]
pub struct Frame {
    pub origin: String,
    pub buffer: PixelBuffer,
}

/// Supplies frames one at a time until exhausted.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Result<Frame, SourceError>>;
}

/// Decodes image files in the order they were given.
pub struct FileFrameSource {
    paths: VecDeque<PathBuf>,
}

impl FileFrameSource {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for FileFrameSource {
    fn next_frame(&mut self) -> Option<Result<Frame, SourceError>> {
        let path = self.paths.pop_front()?;
        Some(load_frame(&path))
    }
}

/// Loads any format the `image` crate can decode and converts it to RGBA.
pub fn load_frame(path: &Path) -> Result<Frame, SourceError> {
    let buffer = image::open(path)
        .map_err(|source| SourceError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    log::debug!(
        "Loaded frame {} ({}x{})",
        path.display(),
        buffer.width(),
        buffer.height()
    );

    Ok(Frame {
        origin: path.display().to_string(),
        buffer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_file_source_yields_frames_in_order() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        PixelBuffer::from_pixel(3, 2, Rgba([10, 20, 30, 255])).save(&first).unwrap();
        PixelBuffer::from_pixel(5, 1, Rgba([1, 2, 3, 255])).save(&second).unwrap();

        let mut source = FileFrameSource::new([&first, &second]);
        assert_eq!(source.remaining(), 2);

        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.buffer.dimensions(), (3, 2));
        assert_eq!(*frame.buffer.get_pixel(0, 0), Rgba([10, 20, 30, 255]));

        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.buffer.dimensions(), (5, 1));

        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_missing_file_is_reported_not_skipped() {
        let dir = tempdir().unwrap();
        let mut source = FileFrameSource::new([dir.path().join("absent.png")]);

        match source.next_frame() {
            Some(Err(SourceError::Decode { path, .. })) => {
                assert!(path.ends_with("absent.png"))
            }
            other => panic!("unexpected: {:?}", other.map(|r| r.map(|f| f.origin))),
        }
    }
}
