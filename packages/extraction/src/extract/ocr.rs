//! OCR toolchain wrapper.
//!
//! Shells out to tesseract for recognition and to poppler's `pdftoppm`
//! for page rasterization, the same external toolchain the rest of the
//! document stack assumes. Availability is probed once at
//! initialization and the resulting [`OcrEngine`] handle is threaded
//! explicitly to the extractors that need it — there is no hidden
//! global flag.

use std::fs;
use std::process::Command;

use tracing::{debug, info, warn};

use crate::error::{OcrError, OcrResult};

/// Rasterization resolution for PDF page OCR.
pub const OCR_DPI: u32 = 300;

/// Handle to a probed, working OCR toolchain.
#[derive(Debug, Clone)]
pub struct OcrEngine {
    tesseract: String,
    pdftoppm: String,
    language: String,
}

impl OcrEngine {
    /// Probe the default toolchain.
    ///
    /// Runs `tesseract --version`; returns `None` when the binary is
    /// missing or broken, which callers treat as "OCR disabled".
    pub fn probe() -> Option<Self> {
        Self::probe_commands("tesseract", "pdftoppm")
    }

    /// Probe specific binaries (useful for nonstandard installs).
    pub fn probe_commands(tesseract: &str, pdftoppm: &str) -> Option<Self> {
        match Command::new(tesseract).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                info!(
                    version = %version.lines().next().unwrap_or("unknown"),
                    "OCR engine available"
                );
                Some(Self {
                    tesseract: tesseract.to_string(),
                    pdftoppm: pdftoppm.to_string(),
                    language: "eng".to_string(),
                })
            }
            Ok(output) => {
                warn!(status = ?output.status.code(), "tesseract probe failed");
                None
            }
            Err(err) => {
                warn!(error = %err, "OCR engine not available");
                None
            }
        }
    }

    /// Set the recognition language (default `eng`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Recognize text in an encoded image.
    ///
    /// Uses `--psm 6`: the input is assumed to be a single uniform
    /// block of text, which fits resume pages.
    pub fn recognize(&self, image_bytes: &[u8]) -> OcrResult<String> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.png");
        fs::write(&input, image_bytes)?;

        let output = Command::new(&self.tesseract)
            .arg(&input)
            .arg("stdout")
            .args(["-l", &self.language])
            .args(["--psm", "6"])
            .output()?;

        if !output.status.success() {
            return Err(OcrError::Command {
                tool: self.tesseract.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "OCR recognized text");
        Ok(text)
    }

    /// Rasterize one PDF page to a PNG at [`OCR_DPI`].
    ///
    /// Page numbers are 1-based, matching the PDF page tree.
    pub fn rasterize_pdf_page(&self, pdf_bytes: &[u8], page: u32) -> OcrResult<Vec<u8>> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.pdf");
        fs::write(&input, pdf_bytes)?;
        let prefix = dir.path().join("page");

        let output = Command::new(&self.pdftoppm)
            .arg("-png")
            .args(["-r", &OCR_DPI.to_string()])
            .args(["-f", &page.to_string()])
            .args(["-l", &page.to_string()])
            .arg(&input)
            .arg(&prefix)
            .output()?;

        if !output.status.success() {
            return Err(OcrError::Command {
                tool: self.pdftoppm.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        // pdftoppm zero-pads the page number in its output name, so
        // scan the directory instead of guessing the padding.
        for entry in fs::read_dir(dir.path())? {
            let path = entry?.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with("page") && name.ends_with(".png") {
                return Ok(fs::read(&path)?);
            }
        }
        Err(OcrError::MissingPageImage { page })
    }
}
