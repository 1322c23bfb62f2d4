//! Freehand ink capture for signature fields.

pub mod stroke;
pub mod surface;
