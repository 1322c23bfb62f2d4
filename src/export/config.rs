//! Defines the [CaptureConfig] struct, a builder-based approach to configuring a single
//! document capture.

use crate::color::KioskColor;
use crate::export::normalize::{ColorFallbackRule, DEFAULT_COLOR_FALLBACK_RULES};

/// How images loaded from another origin are treated during capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossOriginPolicy {
    /// Include cross-origin images even though they taint the output.
    AllowTaint,

    /// Leave cross-origin images out of the capture.
    Exclude,
}

/// Configures the confirmation, normalization, rasterization and delivery of a capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    background: KioskColor,
    scale: f32,
    cross_origin: CrossOriginPolicy,
    fallback_rules: Vec<ColorFallbackRule>,
    confirmation_prompt: String,
    failure_notice: String,
    file_name_prefix: String,
}

impl CaptureConfig {
    pub const DEFAULT_SCALE: f32 = 2.0;

    /// Creates a new [CaptureConfig] with an opaque white background, 2x supersampling,
    /// cross-origin images allowed and the default color fallback rules.
    pub fn new() -> Self {
        Self {
            background: KioskColor::WHITE,
            scale: Self::DEFAULT_SCALE,
            cross_origin: CrossOriginPolicy::AllowTaint,
            fallback_rules: DEFAULT_COLOR_FALLBACK_RULES.clone(),
            confirmation_prompt: "Did you complete and sign this application yourself?".to_string(),
            failure_notice: "Capture failed. Please try again.".to_string(),
            file_name_prefix: "signature-document".to_string(),
        }
    }

    /// Sets the color painted beneath the captured document.
    #[inline]
    pub fn set_background(mut self, background: KioskColor) -> Self {
        self.background = background;
        self
    }

    /// Sets the supersampling factor. Values below `1.0` are raised to `1.0`.
    #[inline]
    pub fn set_scale(mut self, scale: f32) -> Self {
        self.scale = scale.max(1.0);
        self
    }

    #[inline]
    pub fn set_cross_origin(mut self, policy: CrossOriginPolicy) -> Self {
        self.cross_origin = policy;
        self
    }

    /// Replaces the color fallback rules.
    #[inline]
    pub fn set_fallback_rules(mut self, rules: Vec<ColorFallbackRule>) -> Self {
        self.fallback_rules = rules;
        self
    }

    /// Appends a single color fallback rule. Rules are matched in order.
    #[inline]
    pub fn add_fallback_rule(mut self, rule: ColorFallbackRule) -> Self {
        self.fallback_rules.push(rule);
        self
    }

    /// Sets the question asked before each capture.
    #[inline]
    pub fn set_confirmation_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.confirmation_prompt = prompt.into();
        self
    }

    /// Sets the notice shown when a capture fails.
    #[inline]
    pub fn set_failure_notice(mut self, notice: impl Into<String>) -> Self {
        self.failure_notice = notice.into();
        self
    }

    /// Sets the prefix of the downloaded file name.
    #[inline]
    pub fn set_file_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_name_prefix = prefix.into();
        self
    }

    #[inline]
    pub fn background(&self) -> KioskColor {
        self.background
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn cross_origin(&self) -> CrossOriginPolicy {
        self.cross_origin
    }

    #[inline]
    pub fn fallback_rules(&self) -> &[ColorFallbackRule] {
        &self.fallback_rules
    }

    #[inline]
    pub fn confirmation_prompt(&self) -> &str {
        &self.confirmation_prompt
    }

    #[inline]
    pub fn failure_notice(&self) -> &str {
        &self.failure_notice
    }

    /// Returns the download file name for a capture taken at the given Unix time in
    /// milliseconds, e.g. `signature-document-1718000000000.png`.
    #[inline]
    pub fn file_name_at(&self, unix_millis: i64) -> String {
        format!("{}-{}.png", self.file_name_prefix, unix_millis)
    }
}

impl Default for CaptureConfig {
    #[inline]
    fn default() -> Self {
        CaptureConfig::new()
    }
}
