//! Defines the [IdentityField] struct, the signer's name as typed on the kiosk.

/// A free-text name field restricted to uppercase Latin letters and spaces.
///
/// Any other character is dropped as it is typed. A non-empty value is used as the name
/// watermark beneath the signer's strokes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityField {
    value: String,
}

impl IdentityField {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the given character may be entered into an [IdentityField].
    #[inline]
    pub fn is_permitted(c: char) -> bool {
        c.is_ascii_uppercase() || c == ' '
    }

    /// Replaces the value with the given input, stripped of every character that is not
    /// permitted. Returns the accepted value.
    pub fn set_value(&mut self, input: &str) -> &str {
        self.value = input.chars().filter(|c| Self::is_permitted(*c)).collect();

        &self.value
    }

    /// Appends the given typed input, stripped of every character that is not permitted.
    pub fn type_text(&mut self, input: &str) {
        self.value
            .extend(input.chars().filter(|c| Self::is_permitted(*c)));
    }

    /// Removes the last character, if any.
    pub fn backspace(&mut self) {
        self.value.pop();
    }

    /// Returns the current value exactly as accepted.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the watermark text derived from the current value, or `None` if the value
    /// holds nothing but spaces.
    pub fn watermark(&self) -> Option<&str> {
        let trimmed = self.value.trim();

        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}
