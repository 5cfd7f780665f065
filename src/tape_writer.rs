/*
    TapeFox

    Copyright 2024 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/tape_writer.rs

    Implements an output helper for writing tape images to a file.
*/

use std::path::PathBuf;

use crate::{TapeError, TapeImage};

pub struct TapeWriter<'img> {
    pub image: &'img TapeImage,
    pub path:  Option<PathBuf>,
}

impl<'img> TapeWriter<'img> {
    pub fn new(img: &'img TapeImage) -> Self {
        Self { image: img, path: None }
    }

    pub fn with_path(self, path: PathBuf) -> Self {
        Self {
            path: Some(path),
            ..self
        }
    }

    /// Compose the image and write it out. The file is not touched if the image cannot be
    /// composed.
    pub fn write(self) -> Result<(), TapeError> {
        let Some(path) = self.path
        else {
            return Err(TapeError::ParameterError("No output path specified".to_string()));
        };

        let data = self.image.to_bytes()?;
        log::debug!("write(): writing {} bytes to {}", data.len(), path.display());
        std::fs::write(&path, data).map_err(|e| TapeError::WriteError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_path() {
        let image = TapeImage::create();
        assert!(matches!(
            TapeWriter::new(&image).write(),
            Err(TapeError::ParameterError(_))
        ));
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let image = TapeImage::create();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.cdt");
        assert!(matches!(
            TapeWriter::new(&image).with_path(path).write(),
            Err(TapeError::WriteError(_))
        ));
    }
}
