//! Defines the [KioskSession] struct, the session-scoped store that owns every piece of
//! kiosk state for a single signing transaction, and the [KioskConfig] builder used to
//! create it.

use crate::bitmap::{PixelRect, Pixels, TextAlignment};
use crate::error::KioskError;
use crate::export::config::CaptureConfig;
use crate::export::document::{DocumentNode, ImageOrigin};
use crate::export::exporter::{
    Confirmation, DocumentExporter, DownloadSink, ExportOutcome, Notifier,
};
use crate::export::raster::Rasterizer;
use crate::identity::IdentityField;
use crate::ink::surface::{InkSurface, PointerEvent};
use crate::signatures::SignatureSet;
use crate::verification::flow::{VerificationFlow, VerificationStep};
use crate::verification::inline::InlineVerification;
use crate::verification::question::QuestionSet;
use log::debug;

const DOCUMENT_PADDING: f32 = 24.0;
const ROW_GAP: f32 = 12.0;
const TITLE_HEIGHT: f32 = 40.0;
const LINE_HEIGHT: f32 = 24.0;

/// The kiosk theme's heading color, as computed by the browser.
const THEME_HEADING_COLOR: &str = "oklch(0.21 0.034 264.665)";
const LABEL_COLOR: &str = "#1f2937";
const FIELD_BORDER_COLOR: &str = "#d1d5db";

/// Configures a single signature field.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureFieldConfig {
    key: String,
    label: String,
    width: Pixels,
    height: Pixels,
    placeholder: Option<String>,
    origin: (f32, f32),
    shows_identity: bool,
}

impl SignatureFieldConfig {
    /// Creates a new [SignatureFieldConfig] for a field of the given size.
    pub fn new(key: impl Into<String>, label: impl Into<String>, width: Pixels, height: Pixels) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            width,
            height,
            placeholder: None,
            origin: (0.0, 0.0),
            shows_identity: false,
        }
    }

    /// Sets the placeholder label drawn on the empty field.
    pub fn set_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the client coordinates of the field's top-left corner.
    pub fn set_origin(mut self, client_x: f32, client_y: f32) -> Self {
        self.origin = (client_x, client_y);
        self
    }

    /// Draws the signer's name from the identity field as a watermark on this field.
    pub fn set_shows_identity(mut self, shows_identity: bool) -> Self {
        self.shows_identity = shows_identity;
        self
    }
}

/// How the signer answers the verification questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationMode {
    /// One question at a time, strictly in order, through a [VerificationFlow].
    #[default]
    Sequential,

    /// Every question on the page at once, answerable in any order, through an
    /// [InlineVerification]. Signing and capture stay blocked until every answer matches.
    Inline,
}

/// Configures a [KioskSession].
pub struct KioskConfig {
    title: String,
    questions: QuestionSet,
    fields: Vec<SignatureFieldConfig>,
    verification_mode: VerificationMode,
    require_verification_before_signing: bool,
    capture: CaptureConfig,
    rasterizer: Option<Box<dyn Rasterizer>>,
}

impl KioskConfig {
    /// Creates a new [KioskConfig] asking the given questions, with no signature fields.
    pub fn new(questions: QuestionSet) -> Self {
        Self {
            title: String::new(),
            questions,
            fields: Vec::new(),
            verification_mode: VerificationMode::Sequential,
            require_verification_before_signing: true,
            capture: CaptureConfig::new(),
            rasterizer: None,
        }
    }

    /// Sets the heading drawn at the top of the captured document.
    pub fn set_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Adds a signature field. Fields appear in the document in the order they are added.
    pub fn add_signature_field(mut self, field: SignatureFieldConfig) -> Self {
        self.fields.push(field);
        self
    }

    /// Selects how the verification questions are answered. Defaults to
    /// [VerificationMode::Sequential].
    pub fn set_verification_mode(mut self, mode: VerificationMode) -> Self {
        self.verification_mode = mode;
        self
    }

    /// Controls whether pointer input is refused until the verification questions have passed.
    /// Defaults to `true`.
    pub fn set_require_verification_before_signing(mut self, required: bool) -> Self {
        self.require_verification_before_signing = required;
        self
    }

    pub fn set_capture_config(mut self, capture: CaptureConfig) -> Self {
        self.capture = capture;
        self
    }

    /// Replaces the rasterizer used for export.
    pub fn set_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Some(Box::new(rasterizer));
        self
    }
}

/// All the state of one signing transaction.
///
/// A session is created when the kiosk page loads and dropped when it is left or reloaded;
/// nothing outlives it except the exported image.
pub struct KioskSession {
    title: String,
    identity: IdentityField,
    mode: VerificationMode,
    verification: VerificationFlow,
    inline: InlineVerification,
    signatures: SignatureSet,
    surfaces: Vec<InkSurface>,
    labels: Vec<String>,
    identity_fields: Vec<bool>,
    require_verification: bool,
    exporter: DocumentExporter,
}

impl KioskSession {
    /// Creates a new [KioskSession] from the given configuration.
    pub fn new(config: KioskConfig) -> Result<Self, KioskError> {
        let signatures = SignatureSet::new(config.fields.iter().map(|field| field.key.clone()))?;

        let mut surfaces = Vec::with_capacity(config.fields.len());
        let mut labels = Vec::with_capacity(config.fields.len());
        let mut identity_fields = Vec::with_capacity(config.fields.len());

        for field in config.fields {
            let mut surface = InkSurface::new(field.key, field.width, field.height)
                .with_origin(field.origin.0, field.origin.1);

            if let Some(placeholder) = field.placeholder {
                surface = surface.with_placeholder_label(placeholder);
            }

            surfaces.push(surface);
            labels.push(field.label);
            identity_fields.push(field.shows_identity);
        }

        let mut exporter = DocumentExporter::new(config.capture);

        if let Some(rasterizer) = config.rasterizer {
            exporter = exporter.with_rasterizer(rasterizer);
        }

        Ok(Self {
            title: config.title,
            identity: IdentityField::new(),
            mode: config.verification_mode,
            inline: InlineVerification::new(config.questions.clone()),
            verification: VerificationFlow::new(config.questions),
            signatures,
            surfaces,
            labels,
            identity_fields,
            require_verification: config.require_verification_before_signing,
            exporter,
        })
    }

    /// Replaces the signer's name, stripped of anything but uppercase letters and spaces,
    /// and redraws the watermark on every field that shows it. Returns the accepted value.
    pub fn set_identity(&mut self, input: &str) -> &str {
        self.identity.set_value(input);

        let watermark = self.identity.watermark().map(str::to_string);

        for (surface, shows_identity) in self.surfaces.iter_mut().zip(&self.identity_fields) {
            if *shows_identity {
                surface.set_watermark(watermark.clone());
            }
        }

        self.identity.value()
    }

    #[inline]
    pub fn identity(&self) -> &IdentityField {
        &self.identity
    }

    #[inline]
    pub fn verification_mode(&self) -> VerificationMode {
        self.mode
    }

    #[inline]
    pub fn verification(&self) -> &VerificationFlow {
        &self.verification
    }

    #[inline]
    pub fn inline_verification(&self) -> &InlineVerification {
        &self.inline
    }

    /// Returns `true` once the verification questions have been passed: the sequential flow
    /// has completed, or every inline question holds its expected answer.
    pub fn is_verified(&self) -> bool {
        match self.mode {
            VerificationMode::Sequential => self.verification.has_passed(),
            VerificationMode::Inline => self.inline.is_satisfied(),
        }
    }

    /// Records the answer to an inline question. Answers may be given, and changed, in
    /// any order.
    #[inline]
    pub fn set_inline_answer(&mut self, index: usize, answer: bool) -> Result<(), KioskError> {
        self.inline.set_answer(index, answer)
    }

    /// Answers the sequential verification question currently being asked.
    #[inline]
    pub fn answer(&mut self, answer: bool) -> VerificationStep {
        self.verification.answer(answer)
    }

    /// Answers the sequential verification question at the given index.
    #[inline]
    pub fn submit_answer(&mut self, index: usize, answer: bool) -> Result<VerificationStep, KioskError> {
        self.verification.submit(index, answer)
    }

    /// Abandons verification, clearing every answer. Signatures already captured are kept.
    pub fn cancel_verification(&mut self) {
        match self.mode {
            VerificationMode::Sequential => self.verification.cancel(),
            VerificationMode::Inline => self.inline.reset(),
        }
    }

    #[inline]
    pub fn signatures(&self) -> &SignatureSet {
        &self.signatures
    }

    /// Returns `true` if every signature field has been signed.
    #[inline]
    pub fn is_all_signed(&self) -> bool {
        self.signatures.all_signed()
    }

    /// Returns `true` if the session satisfies every precondition of an export.
    #[inline]
    pub fn can_export(&self) -> bool {
        self.is_verified() && self.is_all_signed()
    }

    /// Returns the surface with the given key.
    pub fn surface(&self, key: &str) -> Option<&InkSurface> {
        self.surfaces.iter().find(|surface| surface.key() == key)
    }

    /// Returns every surface in this session, in configuration order.
    #[inline]
    pub fn surfaces(&self) -> &[InkSurface] {
        &self.surfaces
    }

    /// Delivers a pointer or touch event to the surface with the given key.
    pub fn pointer_event(&mut self, key: &str, event: PointerEvent) -> Result<(), KioskError> {
        if self.require_verification && !self.is_verified() {
            return Err(KioskError::VerificationRequired);
        }

        let surface = self
            .surfaces
            .iter_mut()
            .find(|surface| surface.key() == key)
            .ok_or_else(|| KioskError::UnknownSignatureField(key.to_string()))?;

        surface.handle_pointer_event(event, &mut self.signatures);

        Ok(())
    }

    /// Clears the surface with the given key.
    pub fn clear_signature(&mut self, key: &str) -> Result<(), KioskError> {
        let surface = self
            .surfaces
            .iter_mut()
            .find(|surface| surface.key() == key)
            .ok_or_else(|| KioskError::UnknownSignatureField(key.to_string()))?;

        surface.clear(&mut self.signatures);

        Ok(())
    }

    /// Builds the visual tree captured on export: the title, the signer's name, and every
    /// signature field with its label, stacked vertically.
    pub fn document(&self) -> Result<DocumentNode, KioskError> {
        let content_width = self
            .surfaces
            .iter()
            .filter_map(InkSurface::bitmap)
            .map(|bitmap| bitmap.width() as f32)
            .fold(320.0_f32, f32::max);

        let width = content_width + 2.0 * DOCUMENT_PADDING;

        let mut y = DOCUMENT_PADDING;
        let mut children = Vec::new();

        children.push(
            DocumentNode::new("title", PixelRect::new(DOCUMENT_PADDING, y, content_width, TITLE_HEIGHT))
                .with_color(THEME_HEADING_COLOR)
                .with_text(self.title.clone(), 24.0, TextAlignment::Center),
        );
        y += TITLE_HEIGHT + ROW_GAP;

        children.push(
            DocumentNode::new("identity", PixelRect::new(DOCUMENT_PADDING, y, content_width, LINE_HEIGHT))
                .with_color(LABEL_COLOR)
                .with_text(self.identity.value().to_string(), 16.0, TextAlignment::Left),
        );
        y += LINE_HEIGHT + ROW_GAP;

        for (surface, label) in self.surfaces.iter().zip(&self.labels) {
            children.push(
                DocumentNode::new(
                    format!("{}-label", surface.key()),
                    PixelRect::new(DOCUMENT_PADDING, y, content_width, LINE_HEIGHT),
                )
                .with_color(LABEL_COLOR)
                .with_text(label.clone(), 12.0, TextAlignment::Left),
            );
            y += LINE_HEIGHT;

            let (field_width, field_height) = surface
                .bitmap()
                .map(|bitmap| (bitmap.width() as f32, bitmap.height() as f32))
                .unwrap_or((content_width, 0.0));

            let mut field = DocumentNode::new(
                surface.key().to_string(),
                PixelRect::new(DOCUMENT_PADDING, y, field_width, field_height),
            )
            .with_border(FIELD_BORDER_COLOR, 2.0);

            if let Some(bitmap) = surface.bitmap() {
                field = field.with_image(bitmap.as_image()?, ImageOrigin::SameOrigin);
            }

            children.push(field);
            y += field_height + ROW_GAP;
        }

        let root = children.into_iter().fold(
            DocumentNode::new("document", PixelRect::new(0.0, 0.0, width, y - ROW_GAP + DOCUMENT_PADDING))
                .with_background("#ffffff"),
            DocumentNode::with_child,
        );

        Ok(root)
    }

    /// Exports the document after asking the given confirmation.
    ///
    /// Refused with [KioskError::VerificationRequired], [KioskError::VerificationIncomplete]
    /// or [KioskError::SignaturesIncomplete] before anything is shown if the session is not
    /// ready. Otherwise the outcome of the
    /// export attempt is returned; no session state is changed either way.
    pub fn export(
        &self,
        confirmation: &mut dyn Confirmation,
        sink: &mut dyn DownloadSink,
        notifier: &mut dyn Notifier,
    ) -> Result<ExportOutcome, KioskError> {
        self.ensure_exportable()?;

        let document = self.document()?;

        Ok(self.exporter.export(&document, confirmation, sink, notifier))
    }

    /// Exports the document using the passed verification questions as the confirmation
    /// step.
    pub fn export_verified(
        &mut self,
        sink: &mut dyn DownloadSink,
        notifier: &mut dyn Notifier,
    ) -> Result<ExportOutcome, KioskError> {
        self.ensure_exportable()?;

        let document = self.document()?;

        let confirmation: &mut dyn Confirmation = match self.mode {
            VerificationMode::Sequential => &mut self.verification,
            VerificationMode::Inline => &mut self.inline,
        };

        Ok(self.exporter.export(&document, confirmation, sink, notifier))
    }

    fn ensure_exportable(&self) -> Result<(), KioskError> {
        match self.mode {
            VerificationMode::Sequential => {
                if !self.verification.has_passed() {
                    return Err(KioskError::VerificationRequired);
                }
            }
            VerificationMode::Inline => {
                if let Some((index, question)) = self.inline.first_failing() {
                    debug!(
                        "export refused, inline question {} failing: {}",
                        index,
                        question.error_message()
                    );

                    return Err(KioskError::VerificationIncomplete {
                        first_failing: index,
                    });
                }
            }
        }

        if !self.is_all_signed() {
            debug!(
                "export refused, unsigned fields: {:?}",
                self.signatures.unsigned_keys().collect::<Vec<_>>()
            );

            return Err(KioskError::SignaturesIncomplete);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ink::surface::PointerPosition;
    use crate::verification::question::Question;

    fn config() -> KioskConfig {
        KioskConfig::new(
            QuestionSet::new([Question::new("signed in person?", true, "sign in person")]).unwrap(),
        )
        .set_title("APPLICATION")
        .add_signature_field(
            SignatureFieldConfig::new("applicant", "Applicant", 240, 80)
                .set_placeholder("SIGN")
                .set_shows_identity(true),
        )
        .add_signature_field(SignatureFieldConfig::new("witness", "Witness", 240, 80))
    }

    fn sign(session: &mut KioskSession, key: &str) -> Result<(), KioskError> {
        session.pointer_event(key, PointerEvent::Down(PointerPosition::new(10.0, 40.0)))?;
        session.pointer_event(key, PointerEvent::Move(PointerPosition::new(120.0, 50.0)))?;
        session.pointer_event(key, PointerEvent::Up)
    }

    #[test]
    fn test_signing_requires_verification_by_default() -> Result<(), KioskError> {
        let mut session = KioskSession::new(config())?;

        assert!(matches!(
            sign(&mut session, "applicant"),
            Err(KioskError::VerificationRequired)
        ));

        assert_eq!(session.answer(true), VerificationStep::Completed);
        sign(&mut session, "applicant")?;

        assert_eq!(session.signatures().is_signed("applicant"), Some(true));
        assert!(!session.is_all_signed());

        Ok(())
    }

    #[test]
    fn test_identity_becomes_watermark_on_bound_fields_only() -> Result<(), KioskError> {
        let mut session = KioskSession::new(config())?;

        assert_eq!(session.set_identity("Park JI 9"), "P JI ");

        assert_eq!(
            session.surface("applicant").and_then(InkSurface::watermark),
            Some("P JI")
        );
        assert_eq!(session.surface("witness").and_then(InkSurface::watermark), None);

        Ok(())
    }

    #[test]
    fn test_document_contains_every_field() -> Result<(), KioskError> {
        let session = KioskSession::new(config())?;
        let document = session.document()?;

        assert!(document.find("title").is_some());
        assert!(document.find("applicant").is_some());
        assert!(document.find("witness-label").is_some());
        assert_eq!(document.bounds().width, 240.0_f32.max(320.0) + 48.0);

        Ok(())
    }

    #[test]
    fn test_unknown_field_is_reported() -> Result<(), KioskError> {
        let mut session = KioskSession::new(
            config().set_require_verification_before_signing(false),
        )?;

        assert!(matches!(
            session.clear_signature("notary"),
            Err(KioskError::UnknownSignatureField(key)) if key == "notary"
        ));

        Ok(())
    }

    #[test]
    fn test_inline_mode_gates_signing_on_every_answer() -> Result<(), KioskError> {
        let mut session =
            KioskSession::new(config().set_verification_mode(VerificationMode::Inline))?;

        assert!(matches!(
            sign(&mut session, "applicant"),
            Err(KioskError::VerificationRequired)
        ));

        session.set_inline_answer(0, true)?;
        assert!(session.is_verified());
        sign(&mut session, "applicant")?;

        session.cancel_verification();
        assert!(!session.is_verified());
        assert_eq!(session.inline_verification().answer(0), None);
        assert_eq!(session.signatures().is_signed("applicant"), Some(true));

        Ok(())
    }

    #[test]
    fn test_duplicate_field_keys_are_rejected() {
        let config = config().add_signature_field(SignatureFieldConfig::new("witness", "Again", 10, 10));

        assert!(matches!(
            KioskSession::new(config),
            Err(KioskError::DuplicateSignatureField(_))
        ));
    }
}
