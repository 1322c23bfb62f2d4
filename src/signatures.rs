//! Defines the [SignatureSet] struct, aggregating the signed state of every signature field
//! in a session.

use crate::error::KioskError;
use crate::ink::surface::SignatureObserver;
use log::warn;

#[cfg(doc)]
use crate::ink::surface::InkSurface;

/// The signed state of a fixed, ordered set of signature fields.
///
/// Fields are registered once at construction and can never be added or removed.
/// The only mutation is [SignatureSet::set_signed()], which each [InkSurface] reaches
/// through the [SignatureObserver] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSet {
    fields: Vec<(String, bool)>,
}

impl SignatureSet {
    /// Creates a new [SignatureSet] with every given key unsigned.
    pub fn new<I, K>(keys: I) -> Result<Self, KioskError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut fields: Vec<(String, bool)> = Vec::new();

        for key in keys {
            let key = key.into();

            if fields.iter().any(|(existing, _)| *existing == key) {
                return Err(KioskError::DuplicateSignatureField(key));
            }

            fields.push((key, false));
        }

        if fields.is_empty() {
            return Err(KioskError::NoSignatureFields);
        }

        Ok(Self { fields })
    }

    /// Records the signed state of the field with the given key.
    pub fn set_signed(&mut self, key: &str, signed: bool) -> Result<(), KioskError> {
        match self.fields.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, state)) => {
                *state = signed;

                Ok(())
            }
            None => Err(KioskError::UnknownSignatureField(key.to_string())),
        }
    }

    /// Returns the signed state of the field with the given key, or `None` if no such
    /// field is registered.
    pub fn is_signed(&self, key: &str) -> Option<bool> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, signed)| *signed)
    }

    /// Returns `true` if every registered field is signed.
    #[inline]
    pub fn all_signed(&self) -> bool {
        self.fields.iter().all(|(_, signed)| *signed)
    }

    /// Returns the keys of the fields that are not yet signed, in registration order.
    pub fn unsigned_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields
            .iter()
            .filter(|(_, signed)| !*signed)
            .map(|(key, _)| key.as_str())
    }

    /// Returns the registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    /// Returns the number of registered fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false`; a [SignatureSet] holds at least one field.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl SignatureObserver for SignatureSet {
    fn signature_changed(&mut self, key: &str, signed: bool) {
        if let Err(err) = self.set_signed(key, signed) {
            warn!("ignoring signature change: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_signed_tracks_every_field() -> Result<(), KioskError> {
        let mut set = SignatureSet::new(["a", "b"])?;

        assert!(!set.all_signed());

        set.set_signed("a", true)?;
        assert!(!set.all_signed());

        set.set_signed("b", true)?;
        assert!(set.all_signed());

        set.set_signed("a", false)?;
        assert!(!set.all_signed());
        assert_eq!(set.unsigned_keys().collect::<Vec<_>>(), vec!["a"]);

        Ok(())
    }

    #[test]
    fn test_construction_rejects_empty_and_duplicate_keys() {
        assert!(matches!(
            SignatureSet::new(Vec::<String>::new()),
            Err(KioskError::NoSignatureFields)
        ));
        assert!(matches!(
            SignatureSet::new(["a", "a"]),
            Err(KioskError::DuplicateSignatureField(key)) if key == "a"
        ));
    }

    #[test]
    fn test_unknown_keys_do_not_mutate() -> Result<(), KioskError> {
        let mut set = SignatureSet::new(["signer1", "signer2", "signer3"])?;

        assert!(matches!(
            set.set_signed("signer4", true),
            Err(KioskError::UnknownSignatureField(_))
        ));

        set.signature_changed("signer4", true);

        assert_eq!(set.unsigned_keys().count(), 3);
        assert_eq!(set.is_signed("signer4"), None);
        assert_eq!(set.is_signed("signer1"), Some(false));

        Ok(())
    }
}
