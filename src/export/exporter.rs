//! Defines the [DocumentExporter] struct, which confirms, normalizes, rasterizes and
//! delivers a document as a downloadable PNG.

use crate::error::KioskError;
use crate::export::config::CaptureConfig;
use crate::export::document::DocumentNode;
use crate::export::normalize::StyleNormalizer;
use crate::export::raster::{Rasterizer, SoftwareRasterizer};
use crate::verification::flow::VerificationFlow;
use crate::verification::inline::InlineVerification;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use image_025::{ImageFormat, RgbaImage};
use log::{debug, error, warn};
use std::io::Cursor;

/// A blocking yes/no interaction shown before each capture.
pub trait Confirmation {
    /// Returns `true` if the signer accepts the given prompt.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: FnMut(&str) -> bool,
{
    #[inline]
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A completed verification flow stands in for the confirmation prompt.
impl Confirmation for VerificationFlow {
    #[inline]
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.has_passed()
    }
}

/// An inline question gate confirms only while every question holds its expected answer.
impl Confirmation for InlineVerification {
    #[inline]
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.is_satisfied()
    }
}

/// Receives the finished capture as a file download.
pub trait DownloadSink {
    fn offer(&mut self, file_name: &str, data_url: &str);
}

/// Shows user-visible notices.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// The result of a single export attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The signer declined the confirmation step. Nothing was captured.
    Declined,

    /// The capture was offered to the download sink under the given file name.
    Delivered { file_name: String },

    /// Rasterization or encoding failed and a retry notice was shown.
    Failed,
}

/// Produces a single PNG image of a document tree.
///
/// Each export works on a clone of the given tree: unsupported colors are replaced (or
/// their nodes dropped) on the clone only, so the caller's tree and every piece of session
/// state survive a failed or declined export untouched.
pub struct DocumentExporter {
    config: CaptureConfig,
    rasterizer: Box<dyn Rasterizer>,
}

impl DocumentExporter {
    /// Creates a new [DocumentExporter] using the [SoftwareRasterizer].
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            rasterizer: Box::new(SoftwareRasterizer),
        }
    }

    /// Replaces the rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self
    }

    #[inline]
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Runs the full export: confirmation, capture, then delivery.
    ///
    /// Declining the confirmation returns [ExportOutcome::Declined] with no notice. Any
    /// capture error is logged and reported through the notifier; the export may simply
    /// be attempted again.
    pub fn export(
        &self,
        root: &DocumentNode,
        confirmation: &mut dyn Confirmation,
        sink: &mut dyn DownloadSink,
        notifier: &mut dyn Notifier,
    ) -> ExportOutcome {
        if !confirmation.confirm(self.config.confirmation_prompt()) {
            debug!("export declined");

            return ExportOutcome::Declined;
        }

        match self.capture(root) {
            Ok(data_url) => {
                let file_name = self.config.file_name_at(Utc::now().timestamp_millis());

                sink.offer(&file_name, &data_url);

                debug!("export delivered as {}", file_name);

                ExportOutcome::Delivered { file_name }
            }
            Err(err) => {
                error!("document capture failed: {}", err);

                notifier.notify(self.config.failure_notice());

                ExportOutcome::Failed
            }
        }
    }

    /// Normalizes a clone of the given tree, rasterizes it and returns the result as a
    /// PNG data URL.
    pub fn capture(&self, root: &DocumentNode) -> Result<String, KioskError> {
        let mut document = root.clone();

        let report = StyleNormalizer::new(self.config.fallback_rules()).normalize(&mut document)?;

        if report.substituted > 0 {
            debug!("substituted {} unsupported colors", report.substituted);
        }

        if !report.excluded.is_empty() {
            warn!("excluded from capture: {}", report.excluded.join(", "));
        }

        let image = self.rasterizer.rasterize(&document, &self.config)?;

        encode_png_data_url(&image)
    }
}

/// Encodes the given image as a `data:image/png;base64,` URL.
pub fn encode_png_data_url(image: &RgbaImage) -> Result<String, KioskError> {
    let mut bytes: Vec<u8> = Vec::new();

    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::PixelRect;

    #[test]
    fn test_png_data_url_prefix_and_signature() -> Result<(), KioskError> {
        let url = encode_png_data_url(&RgbaImage::new(2, 2))?;

        let payload = url
            .strip_prefix("data:image/png;base64,")
            .expect("data URL prefix");

        let bytes = STANDARD.decode(payload).expect("valid base64");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        Ok(())
    }

    #[test]
    fn test_capture_normalizes_a_clone() -> Result<(), KioskError> {
        let root = DocumentNode::new("root", PixelRect::new(0.0, 0.0, 8.0, 8.0))
            .with_background("oklch(1 0 0)");

        let exporter = DocumentExporter::new(CaptureConfig::new());
        let url = exporter.capture(&root)?;

        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(root.style().background_color.as_deref(), Some("oklch(1 0 0)"));

        Ok(())
    }
}
