//! PDF → PNG conversion of a resume's first page, used as the review preview.
//!
//! Shells out to poppler's `pdftoppm`. The binary is looked up on PATH
//! unless an explicit path is configured.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::models::file::PNG_MIME;
use crate::models::FileHandle;

const RASTER_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("pdftoppm not found")]
    NotFound,

    #[error("conversion failed: {0}")]
    Failed(String),

    #[error("conversion timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait PdfRasterizer: Send + Sync {
    async fn rasterize(&self, pdf: &FileHandle) -> Result<FileHandle, RasterError>;
}

pub struct Pdftoppm {
    executable: Option<PathBuf>,
    dpi: u32,
}

impl Pdftoppm {
    pub fn new(configured: Option<&str>, dpi: u32) -> Self {
        let executable = configured
            .map(PathBuf::from)
            .or_else(|| which::which("pdftoppm").ok());
        if executable.is_none() {
            warn!("pdftoppm not found on PATH; preview conversion will fail");
        }
        Self { executable, dpi }
    }
}

#[async_trait]
impl PdfRasterizer for Pdftoppm {
    async fn rasterize(&self, pdf: &FileHandle) -> Result<FileHandle, RasterError> {
        let exe = self.executable.as_ref().ok_or(RasterError::NotFound)?;

        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("input.pdf");
        let output_base = workdir.path().join("page");
        tokio::fs::write(&input, &pdf.bytes).await?;

        let run = Command::new(exe)
            .arg("-png")
            .arg("-singlefile")
            .args(["-f", "1", "-l", "1"])
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(&input)
            .arg(&output_base)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(Duration::from_secs(RASTER_TIMEOUT_SECS), run)
            .await
            .map_err(|_| RasterError::Timeout(RASTER_TIMEOUT_SECS))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RasterError::Failed(stderr.trim().to_string()));
        }

        let png = tokio::fs::read(output_base.with_extension("png")).await?;
        if png.is_empty() {
            return Err(RasterError::Failed("empty image".to_string()));
        }
        debug!("Rasterized {} into {} bytes of PNG", pdf.name, png.len());

        Ok(FileHandle::new(
            format!("{}.png", pdf.stem()),
            PNG_MIME,
            Bytes::from(png),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::file::PDF_MIME;

    #[tokio::test]
    async fn test_missing_binary_reports_not_found() {
        let raster = Pdftoppm {
            executable: None,
            dpi: 150,
        };
        let pdf = FileHandle::new("cv.pdf", PDF_MIME, Bytes::from_static(b"%PDF"));
        assert!(matches!(
            raster.rasterize(&pdf).await,
            Err(RasterError::NotFound)
        ));
    }
}
