//! `signature-kiosk` collects handwritten signatures on a touch or mouse surface, gates
//! signing behind a sequence of yes/no verification questions, and exports the finished
//! document as a PNG image.
//!
//! The pieces fit together through a [KioskSession](session::KioskSession):
//!
//! - each signature field is an [InkSurface](ink::surface::InkSurface) that renders strokes
//!   and detects real ink as opposed to its light gray placeholder,
//! - a [SignatureSet](signatures::SignatureSet) tracks which fields are signed,
//! - a [VerificationFlow](verification::flow::VerificationFlow) asks its questions strictly
//!   in order and only completes through a correct answer to the last one,
//! - a [DocumentExporter](export::exporter::DocumentExporter) confirms, replaces colors the
//!   rasterizer cannot interpret, rasterizes at 2x on white and hands the PNG to a
//!   download sink.
//!
//! All state is scoped to a single session and nothing is persisted.

pub mod bitmap;
pub mod color;
pub mod error;
pub mod export;
pub mod identity;
pub mod ink;
pub mod session;
pub mod signatures;
pub mod verification;

#[cfg(any(test, all(target_arch = "wasm32", feature = "wasm_session")))]
mod setting;

#[cfg(all(target_arch = "wasm32", feature = "wasm_session"))]
pub mod wasm;

/// A prelude for conveniently importing all public `signature-kiosk` definitions at once.
///
/// Usage:
/// ```
/// use signature_kiosk::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        bitmap::*, color::*, error::*, export::config::*, export::document::*,
        export::exporter::*, export::normalize::*, export::raster::*, identity::*,
        ink::stroke::*, ink::surface::*, session::*, signatures::*, verification::flow::*,
        verification::inline::*, verification::question::*,
    };
}
