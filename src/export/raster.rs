//! Defines the [Rasterizer] trait and [SoftwareRasterizer], its built-in implementation.

use crate::bitmap::{KioskBitmap, PixelRect};
use crate::color::KioskColor;
use crate::error::KioskError;
use crate::export::config::{CaptureConfig, CrossOriginPolicy};
use crate::export::document::{DocumentNode, ImageOrigin, NodeContent};
use image_025::RgbaImage;
use log::debug;

/// Converts a document tree into a flat pixel image.
pub trait Rasterizer {
    /// Renders the given tree into a new image, honoring the background, scale and
    /// cross-origin policy of the given configuration.
    fn rasterize(&self, root: &DocumentNode, config: &CaptureConfig) -> Result<RgbaImage, KioskError>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for Box<R> {
    #[inline]
    fn rasterize(&self, root: &DocumentNode, config: &CaptureConfig) -> Result<RgbaImage, KioskError> {
        (**self).rasterize(root, config)
    }
}

/// Paints each node's background, border and content in tree order, children after parents.
///
/// Colors must be in a notation [KioskColor::parse_css()] understands; anything else fails
/// the whole capture with [KioskError::UnsupportedColor].
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareRasterizer;

impl SoftwareRasterizer {
    fn paint(
        &self,
        bitmap: &mut KioskBitmap,
        node: &DocumentNode,
        bounds: PixelRect,
        config: &CaptureConfig,
    ) -> Result<(), KioskError> {
        let scale = config.scale();
        let target = bounds.scaled(scale);
        let style = node.style();

        if let Some(background) = style.background_color.as_deref() {
            bitmap.fill_rect(target, KioskColor::parse_css(background)?);
        }

        if style.border_width > 0.0 {
            if let Some(border) = style.border_color.as_deref() {
                bitmap.stroke_rect(target, style.border_width * scale, KioskColor::parse_css(border)?);
            }
        }

        match node.content() {
            NodeContent::Empty => {}
            NodeContent::Text {
                text,
                font_size,
                alignment,
            } => {
                let color = match style.color.as_deref() {
                    Some(color) => KioskColor::parse_css(color)?,
                    None => KioskColor::BLACK,
                };

                bitmap.draw_text(text, target, font_size * scale, *alignment, color);
            }
            NodeContent::Image { image, origin } => {
                if *origin == ImageOrigin::CrossOrigin
                    && config.cross_origin() == CrossOriginPolicy::Exclude
                {
                    debug!("skipping cross-origin image in {}", node.name());
                } else {
                    bitmap.draw_image(image, target);
                }
            }
        }

        for child in node.children() {
            let child_bounds = child.bounds().offset(bounds.x, bounds.y);

            self.paint(bitmap, child, child_bounds, config)?;
        }

        Ok(())
    }
}

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(&self, root: &DocumentNode, config: &CaptureConfig) -> Result<RgbaImage, KioskError> {
        let bounds = root.bounds();

        let width = (bounds.width * config.scale()).round();
        let height = (bounds.height * config.scale()).round();

        if width < 1.0 || height < 1.0 {
            return Err(KioskError::EmptyCaptureArea);
        }

        if width > KioskBitmap::MAX_DIMENSION as f32 || height > KioskBitmap::MAX_DIMENSION as f32 {
            return Err(KioskError::ImageSizeOutOfBounds);
        }

        let mut bitmap = KioskBitmap::new(width as u32, height as u32, config.background())?;

        self.paint(
            &mut bitmap,
            root,
            PixelRect::new(0.0, 0.0, bounds.width, bounds.height),
            config,
        )?;

        bitmap.as_image()
    }
}
