//! Defines the [KioskError] enum, used to wrap every error condition raised by this crate.

use image_025::ImageError;
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A wrapped internal library error from the image encoder.
#[derive(Debug)]
pub enum KioskImageError {
    /// The encoder rejected the pixel buffer or failed while writing PNG data.
    Encoding(ImageError),

    /// A pixel buffer did not match the dimensions it was declared with.
    BufferSizeMismatch,
}

/// A custom error type for every fallible operation in this crate.
#[derive(Debug)]
pub enum KioskError {
    /// A question set was constructed without any questions.
    NoQuestions,

    /// A signature set was constructed without any fields.
    NoSignatureFields,

    /// Two signature fields were registered under the same key.
    DuplicateSignatureField(String),

    /// A signed-state change or pointer event referred to a field that was never registered.
    UnknownSignatureField(String),

    /// An answer was submitted for a question other than the one currently being asked.
    QuestionOutOfOrder { expected: usize, submitted: usize },

    /// An answer index fell outside the question set.
    QuestionIndexOutOfBounds(usize),

    /// Signing was attempted before the verification questions were passed.
    VerificationRequired,

    /// Export was attempted while an inline question still lacked its expected answer.
    /// `first_failing` is the lowest such index, where the signer should be directed.
    VerificationIncomplete { first_failing: usize },

    /// Export was attempted while at least one signature field was still empty.
    SignaturesIncomplete,

    /// An entry of an untyped host configuration is missing a setting or holds a value of
    /// the wrong type or range.
    InvalidSetting { entry: String, setting: &'static str },

    /// A color value was expressed in a format the rasterizer cannot interpret.
    UnsupportedColor(String),

    /// The document to capture has zero width or height.
    EmptyCaptureArea,

    /// The capture area multiplied by the scale factor exceeds the maximum bitmap size.
    ImageSizeOutOfBounds,

    /// The image encoder failed.
    ImageError(KioskImageError),
}

impl Display for KioskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:#?}", self)
    }
}

impl Error for KioskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            KioskError::ImageError(KioskImageError::Encoding(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<ImageError> for KioskError {
    #[inline]
    fn from(err: ImageError) -> Self {
        KioskError::ImageError(KioskImageError::Encoding(err))
    }
}
