//! Defines the [KioskBitmap] struct, an owned RGBA pixel buffer shared by ink surfaces
//! and the document rasterizer.

use crate::color::KioskColor;
use crate::error::{KioskError, KioskImageError};
use image_025::RgbaImage;
use vecmath::{vec2_add, vec2_len, vec2_scale, vec2_sub, Vector2};

/// The device coordinate system when rendering a bitmap.
pub type Pixels = u32;

/// Horizontal placement of a line of text within its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlignment {
    /// Align text to the left edge of the box.
    Left,
    /// Center text horizontally within the box.
    Center,
    /// Align text to the right edge of the box.
    Right,
}

/// An axis-aligned rectangle in device pixels. The origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns a copy of this rectangle with every coordinate multiplied by `factor`.
    #[inline]
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Returns a copy of this rectangle translated by the given offset.
    #[inline]
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// An owned, row-major, unpadded RGBA8 pixel buffer.
///
/// Every drawing primitive clips to the buffer bounds and alpha-blends onto the existing
/// content, so callers never need to pre-clip coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct KioskBitmap {
    width: Pixels,
    height: Pixels,
    data: Vec<u8>,
}

impl KioskBitmap {
    /// The largest width or height a bitmap may have.
    pub const MAX_DIMENSION: Pixels = 16_384;

    /// Creates a new [KioskBitmap] of the given size, filled with the given background color.
    pub fn new(width: Pixels, height: Pixels, background: KioskColor) -> Result<Self, KioskError> {
        if width == 0 || height == 0 {
            return Err(KioskError::EmptyCaptureArea);
        }

        if width > Self::MAX_DIMENSION || height > Self::MAX_DIMENSION {
            return Err(KioskError::ImageSizeOutOfBounds);
        }

        let data = background
            .to_rgba()
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Returns the width of this [KioskBitmap] in pixels.
    #[inline]
    pub fn width(&self) -> Pixels {
        self.width
    }

    /// Returns the height of this [KioskBitmap] in pixels.
    #[inline]
    pub fn height(&self) -> Pixels {
        self.height
    }

    /// Returns the raw RGBA bytes of this [KioskBitmap].
    #[inline]
    pub fn as_raw_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the pixels of this [KioskBitmap] in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    /// Returns the pixel at the given position, or `None` if it lies outside the bitmap.
    pub fn pixel(&self, x: Pixels, y: Pixels) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        self.pixels()
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Returns `true` if at least one pixel satisfies the given predicate.
    #[inline]
    pub fn any_pixel(&self, predicate: impl Fn(&[u8; 4]) -> bool) -> bool {
        self.pixels().iter().any(predicate)
    }

    /// Replaces every pixel with the given color, ignoring any existing content.
    pub fn fill(&mut self, color: KioskColor) {
        let rgba = color.to_rgba();

        bytemuck::cast_slice_mut::<u8, [u8; 4]>(&mut self.data)
            .iter_mut()
            .for_each(|pixel| *pixel = rgba);
    }

    /// Fills the given rectangle, blending with the existing content.
    pub fn fill_rect(&mut self, rect: PixelRect, color: KioskColor) {
        if color.alpha() == 0 {
            return;
        }

        let left = rect.x.round().max(0.0) as i64;
        let top = rect.y.round().max(0.0) as i64;
        let right = ((rect.x + rect.width).round() as i64).min(self.width as i64);
        let bottom = ((rect.y + rect.height).round() as i64).min(self.height as i64);

        for y in top..bottom {
            for x in left..right {
                self.blend_pixel(x, y, color.to_rgba());
            }
        }
    }

    /// Draws the outline of the given rectangle with the given thickness, inset into the
    /// rectangle the way a CSS border is.
    pub fn stroke_rect(&mut self, rect: PixelRect, thickness: f32, color: KioskColor) {
        if thickness <= 0.0 {
            return;
        }

        let t = thickness.min(rect.width / 2.0).min(rect.height / 2.0);

        self.fill_rect(PixelRect::new(rect.x, rect.y, rect.width, t), color);
        self.fill_rect(
            PixelRect::new(rect.x, rect.y + rect.height - t, rect.width, t),
            color,
        );
        self.fill_rect(
            PixelRect::new(rect.x, rect.y + t, t, rect.height - 2.0 * t),
            color,
        );
        self.fill_rect(
            PixelRect::new(rect.x + rect.width - t, rect.y + t, t, rect.height - 2.0 * t),
            color,
        );
    }

    /// Draws a thick line using filled circle stamps, giving round caps and joins.
    ///
    /// The segment is first clipped to the bitmap bounds widened by the pen radius.
    pub fn draw_thick_line(&mut self, from: Vector2<f32>, to: Vector2<f32>, width: f32, color: KioskColor) {
        let half_width = (width / 2.0).ceil().max(1.0) as i64;

        let margin = half_width as f32 + 1.0;

        let Some((from, to)) = clip_segment(
            from,
            to,
            [-margin, -margin],
            [self.width as f32 + margin, self.height as f32 + margin],
        ) else {
            return;
        };

        let delta = vec2_sub(to, from);
        let len = vec2_len(delta);
        let steps = (len * 2.0).max(1.0) as i32;
        let rgba = color.to_rgba();

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let [px, py] = vec2_add(from, vec2_scale(delta, t));
            let (px, py) = (px as i64, py as i64);

            for dy in -half_width..=half_width {
                for dx in -half_width..=half_width {
                    if dx * dx + dy * dy <= half_width * half_width {
                        // Overlapping stamps keep the darker value.
                        self.darken_pixel(px + dx, py + dy, rgba);
                    }
                }
            }
        }
    }

    /// Draws a single line of text as solid glyph blocks, vertically centered within the
    /// given box.
    ///
    /// Glyph widths are approximated from the font size: half an em for ASCII characters and
    /// a full em for everything else. Spaces advance without drawing.
    pub fn draw_text(
        &mut self,
        text: &str,
        bounds: PixelRect,
        font_size: f32,
        alignment: TextAlignment,
        color: KioskColor,
    ) {
        if text.is_empty() || font_size <= 0.0 {
            return;
        }

        let advance = |c: char| if c.is_ascii() { font_size * 0.5 } else { font_size };
        let text_width: f32 = text.chars().map(advance).sum();

        let mut x = match alignment {
            TextAlignment::Left => bounds.x,
            TextAlignment::Center => bounds.x + (bounds.width - text_width) / 2.0,
            TextAlignment::Right => bounds.x + bounds.width - text_width,
        };

        let glyph_height = font_size * 0.7;
        let y = bounds.y + (bounds.height - glyph_height) / 2.0;

        for c in text.chars() {
            let cell = advance(c);

            if !c.is_whitespace() {
                self.fill_rect(
                    PixelRect::new(x + cell * 0.1, y, cell * 0.8, glyph_height),
                    color,
                );
            }

            x += cell;
        }
    }

    /// Draws the given image scaled into the given rectangle using nearest-neighbour
    /// sampling, blending with the existing content.
    pub fn draw_image(&mut self, image: &RgbaImage, bounds: PixelRect) {
        if image.width() == 0 || image.height() == 0 || bounds.width <= 0.0 || bounds.height <= 0.0
        {
            return;
        }

        let left = bounds.x.round() as i64;
        let top = bounds.y.round() as i64;
        let width = bounds.width.round().max(1.0) as i64;
        let height = bounds.height.round().max(1.0) as i64;

        for dy in 0..height {
            let source_y = ((dy * image.height() as i64) / height) as u32;

            for dx in 0..width {
                let source_x = ((dx * image.width() as i64) / width) as u32;

                self.blend_pixel(left + dx, top + dy, image.get_pixel(source_x, source_y).0);
            }
        }
    }

    /// Copies this [KioskBitmap] into a new [RgbaImage].
    pub fn as_image(&self) -> Result<RgbaImage, KioskError> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or(KioskError::ImageError(KioskImageError::BufferSizeMismatch))
    }

    #[inline]
    fn index_of(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            None
        } else {
            Some((y as usize * self.width as usize + x as usize) * 4)
        }
    }

    fn blend_pixel(&mut self, x: i64, y: i64, source: [u8; 4]) {
        let Some(index) = self.index_of(x, y) else {
            return;
        };

        let alpha = source[3] as u32;

        if alpha == 0 {
            return;
        }

        let target = &mut self.data[index..index + 4];

        if alpha == 255 {
            target.copy_from_slice(&source);
            return;
        }

        for channel in 0..3 {
            target[channel] = ((source[channel] as u32 * alpha
                + target[channel] as u32 * (255 - alpha)
                + 127)
                / 255) as u8;
        }

        target[3] = (alpha + (target[3] as u32 * (255 - alpha) + 127) / 255).min(255) as u8;
    }

    fn darken_pixel(&mut self, x: i64, y: i64, source: [u8; 4]) {
        let Some(index) = self.index_of(x, y) else {
            return;
        };

        let target = &mut self.data[index..index + 4];

        for channel in 0..3 {
            target[channel] = target[channel].min(source[channel]);
        }

        target[3] = target[3].max(source[3]);
    }
}

/// Clips the segment between the given points to the given axis-aligned box using the
/// Liang-Barsky parametric test. Returns `None` if no part of the segment lies inside the box
/// or if either point is not finite.
fn clip_segment(
    from: Vector2<f32>,
    to: Vector2<f32>,
    min: Vector2<f32>,
    max: Vector2<f32>,
) -> Option<(Vector2<f32>, Vector2<f32>)> {
    if !from.iter().chain(to.iter()).all(|value| value.is_finite()) {
        return None;
    }

    let delta = vec2_sub(to, from);

    let mut enter = 0.0_f32;
    let mut exit = 1.0_f32;

    for axis in 0..2 {
        for (p, q) in [
            (-delta[axis], from[axis] - min[axis]),
            (delta[axis], max[axis] - from[axis]),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;

                if p < 0.0 {
                    if r > exit {
                        return None;
                    }

                    enter = enter.max(r);
                } else {
                    if r < enter {
                        return None;
                    }

                    exit = exit.min(r);
                }
            }
        }
    }

    Some((
        vec2_add(from, vec2_scale(delta, enter)),
        vec2_add(from, vec2_scale(delta, exit)),
    ))
}
