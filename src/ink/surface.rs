//! Defines the [InkSurface] struct, a single signature field that captures freehand pointer
//! or touch input and decides whether the field has actually been signed.

use crate::bitmap::{KioskBitmap, PixelRect, Pixels, TextAlignment};
use crate::color::KioskColor;
use crate::ink::stroke::{InkStroke, InkStrokePoint};
use log::debug;

/// The width, in pixels, of every rendered ink stroke.
pub const INK_STROKE_WIDTH: f32 = 2.0;

/// Every color channel of a pixel must be strictly below this value for the pixel to count
/// as real ink. The placeholder gray sits far above it.
pub const REAL_INK_THRESHOLD: u8 = 128;

/// The font size used for placeholder labels and name watermarks.
pub const PLACEHOLDER_FONT_SIZE: f32 = 30.0;

/// Returns `true` if the given RGBA pixel is dark enough to have come from a pen stroke.
#[inline]
pub fn is_real_ink(pixel: &[u8; 4]) -> bool {
    pixel[3] != 0
        && pixel[0] < REAL_INK_THRESHOLD
        && pixel[1] < REAL_INK_THRESHOLD
        && pixel[2] < REAL_INK_THRESHOLD
}

/// Receives signed-state changes from the [InkSurface] objects it owns.
pub trait SignatureObserver {
    /// Called when the surface with the given key becomes signed or is cleared.
    fn signature_changed(&mut self, key: &str, signed: bool);
}

/// A pointer position in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub client_x: f32,
    pub client_y: f32,
}

impl PointerPosition {
    #[inline]
    pub fn new(client_x: f32, client_y: f32) -> Self {
        Self { client_x, client_y }
    }
}

/// A single input event delivered to an [InkSurface]. Mouse and touch input map onto the
/// same events; for touch input the first touch point is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Mouse button pressed or touch started.
    Down(PointerPosition),

    /// Pointer moved, pressed or not.
    Move(PointerPosition),

    /// Mouse button released or touch ended.
    Up,

    /// Pointer left the surface.
    Leave,
}

/// A single signature field.
///
/// The surface renders strokes into its own [KioskBitmap] as they are captured. When the
/// pointer is released the bitmap is scanned for real ink (see [is_real_ink()]); the first
/// time any is found the surface becomes signed and its observer is notified. A surface
/// created with a zero-sized drawing area has no bitmap, and silently ignores all input.
#[derive(Debug, Clone)]
pub struct InkSurface {
    key: String,
    origin: InkStrokePoint,
    bitmap: Option<KioskBitmap>,
    strokes: Vec<InkStroke>,
    active: Option<InkStroke>,
    signed: bool,
    placeholder_label: Option<String>,
    watermark: Option<String>,
    placeholder_visible: bool,
}

impl InkSurface {
    /// Creates a new [InkSurface] identified by the given key, with a drawing area of
    /// the given size.
    pub fn new(key: impl Into<String>, width: Pixels, height: Pixels) -> Self {
        let key = key.into();

        let bitmap = match KioskBitmap::new(width, height, KioskColor::WHITE) {
            Ok(bitmap) => Some(bitmap),
            Err(err) => {
                debug!("ink surface {} has no drawable area: {}", key, err);

                None
            }
        };

        Self {
            key,
            origin: InkStrokePoint::new(0.0, 0.0),
            bitmap,
            strokes: Vec::new(),
            active: None,
            signed: false,
            placeholder_label: None,
            watermark: None,
            placeholder_visible: true,
        }
    }

    /// Sets the client coordinates of this surface's top-left corner. Pointer positions are
    /// translated by this offset into surface-local coordinates.
    pub fn with_origin(mut self, client_x: f32, client_y: f32) -> Self {
        self.origin = InkStrokePoint::new(client_x, client_y);
        self
    }

    /// Sets the placeholder label shown until the first stroke begins.
    pub fn with_placeholder_label(mut self, label: impl Into<String>) -> Self {
        self.placeholder_label = Some(label.into());
        self.redraw();
        self
    }

    /// Sets the persistent name watermark drawn beneath the signature strokes.
    pub fn with_watermark(mut self, name: impl Into<String>) -> Self {
        self.set_watermark(Some(name.into()));
        self
    }

    /// Returns the key identifying this surface within its signature set.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns `true` if real ink has been captured since this surface was created
    /// or last cleared.
    #[inline]
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Returns `true` if this surface has a drawing area.
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.bitmap.is_some()
    }

    /// Returns `true` while the placeholder is still displayed, i.e. before the first
    /// stroke following creation or a clear.
    #[inline]
    pub fn is_placeholder_visible(&self) -> bool {
        self.placeholder_visible
    }

    /// Returns `true` while a stroke is in progress.
    #[inline]
    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the completed strokes on this surface.
    #[inline]
    pub fn strokes(&self) -> &[InkStroke] {
        &self.strokes
    }

    /// Returns the placeholder label, if any.
    #[inline]
    pub fn placeholder_label(&self) -> Option<&str> {
        self.placeholder_label.as_deref()
    }

    /// Returns the name watermark, if any.
    #[inline]
    pub fn watermark(&self) -> Option<&str> {
        self.watermark.as_deref()
    }

    /// Returns the rendered content of this surface, if it has a drawing area.
    #[inline]
    pub fn bitmap(&self) -> Option<&KioskBitmap> {
        self.bitmap.as_ref()
    }

    /// Replaces the name watermark and re-renders the surface from its retained strokes.
    /// The signed state is not affected.
    pub fn set_watermark(&mut self, name: Option<String>) {
        self.watermark = name.filter(|name| !name.trim().is_empty());
        self.redraw();
    }

    /// Dispatches a single input event to the matching stroke operation.
    pub fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
        observer: &mut dyn SignatureObserver,
    ) {
        match event {
            PointerEvent::Down(position) => self.begin_stroke(self.to_local(position)),
            PointerEvent::Move(position) => self.extend_stroke(self.to_local(position)),
            PointerEvent::Up | PointerEvent::Leave => self.end_stroke(observer),
        }
    }

    /// Starts a new stroke at the given surface-local point. On the first interaction the
    /// placeholder is wiped, leaving only the name watermark if one is set.
    pub fn begin_stroke(&mut self, point: InkStrokePoint) {
        if self.bitmap.is_none() {
            return;
        }

        if self.placeholder_visible {
            self.placeholder_visible = false;
            self.redraw();
        }

        if let Some(previous) = self.active.replace(InkStroke::starting_at(point)) {
            self.strokes.push(previous);
        }
    }

    /// Appends the given surface-local point to the active stroke and renders the connecting
    /// segment. Ignored when no stroke is active.
    pub fn extend_stroke(&mut self, point: InkStrokePoint) {
        let (Some(bitmap), Some(stroke)) = (self.bitmap.as_mut(), self.active.as_mut()) else {
            return;
        };

        if let Some(previous) = stroke.push(point) {
            bitmap.draw_thick_line(
                previous.as_vector(),
                point.as_vector(),
                INK_STROKE_WIDTH,
                KioskColor::INK,
            );
        }
    }

    /// Closes the active stroke and scans the surface for real ink, notifying the observer
    /// the first time any is found. Ignored when no stroke is active.
    pub fn end_stroke(&mut self, observer: &mut dyn SignatureObserver) {
        let Some(stroke) = self.active.take() else {
            return;
        };

        self.strokes.push(stroke);

        if self.signed {
            return;
        }

        let has_ink = self
            .bitmap
            .as_ref()
            .map(|bitmap| bitmap.any_pixel(is_real_ink))
            .unwrap_or(false);

        if has_ink {
            debug!("ink surface {} signed", self.key);

            self.signed = true;
            observer.signature_changed(&self.key, true);
        }
    }

    /// Wipes all strokes, restores the placeholder and watermark, and marks this surface
    /// as unsigned.
    pub fn clear(&mut self, observer: &mut dyn SignatureObserver) {
        if self.bitmap.is_none() {
            return;
        }

        self.strokes.clear();
        self.active = None;
        self.placeholder_visible = true;
        self.signed = false;
        self.redraw();

        debug!("ink surface {} cleared", self.key);

        observer.signature_changed(&self.key, false);
    }

    #[inline]
    fn to_local(&self, position: PointerPosition) -> InkStrokePoint {
        InkStrokePoint::new(position.client_x - self.origin.x, position.client_y - self.origin.y)
    }

    /// Re-renders the background, placeholder, watermark and every retained stroke.
    fn redraw(&mut self) {
        let Some(bitmap) = self.bitmap.as_mut() else {
            return;
        };

        bitmap.fill(KioskColor::WHITE);

        let bounds = PixelRect::new(0.0, 0.0, bitmap.width() as f32, bitmap.height() as f32);

        let label = match (&self.watermark, &self.placeholder_label) {
            (Some(watermark), _) => Some(watermark),
            (None, Some(label)) if self.placeholder_visible => Some(label),
            _ => None,
        };

        if let Some(label) = label {
            bitmap.draw_text(
                label,
                bounds,
                PLACEHOLDER_FONT_SIZE,
                TextAlignment::Center,
                KioskColor::PLACEHOLDER,
            );
        }

        for stroke in self.strokes.iter().chain(self.active.iter()) {
            for (from, to) in stroke.segments() {
                bitmap.draw_thick_line(
                    from.as_vector(),
                    to.as_vector(),
                    INK_STROKE_WIDTH,
                    KioskColor::INK,
                );
            }
        }
    }
}
