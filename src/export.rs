//! Capture of a document tree into a single downloadable raster image.

pub mod config;
pub mod document;
pub mod exporter;
pub mod normalize;
pub mod raster;
