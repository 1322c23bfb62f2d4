use base64::{engine::general_purpose, Engine as _};
use image_025::RgbaImage;
use rand::Rng;
use signature_kiosk::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Default)]
struct RecordingObserver {
    changes: Vec<(String, bool)>,
}

impl SignatureObserver for RecordingObserver {
    fn signature_changed(&mut self, key: &str, signed: bool) {
        self.changes.push((key.to_string(), signed));
    }
}

#[derive(Default)]
struct RecordingSink {
    offers: Vec<(String, String)>,
}

impl DownloadSink for RecordingSink {
    fn offer(&mut self, file_name: &str, data_url: &str) {
        self.offers.push((file_name.to_string(), data_url.to_string()));
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Vec<String>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

/// Fails every capture while its switch is on.
struct SwitchableRasterizer {
    failing: Rc<Cell<bool>>,
}

impl Rasterizer for SwitchableRasterizer {
    fn rasterize(&self, root: &DocumentNode, config: &CaptureConfig) -> Result<RgbaImage, KioskError> {
        if self.failing.get() {
            Err(KioskError::EmptyCaptureArea)
        } else {
            SoftwareRasterizer.rasterize(root, config)
        }
    }
}

fn four_questions() -> Result<QuestionSet, KioskError> {
    QuestionSet::new([
        Question::new("Are you the applicant named above?", true, "Only the applicant may sign."),
        Question::new("Has anyone told you what to answer?", false, "Please ask staff for help."),
        Question::new("Have you read the whole application?", true, "Please read it first."),
        Question::new("Is everything on it true?", true, "Please correct the application."),
    ])
}

fn kiosk_config() -> Result<KioskConfig, KioskError> {
    Ok(KioskConfig::new(four_questions()?)
        .set_title("MEMBERSHIP APPLICATION")
        .add_signature_field(
            SignatureFieldConfig::new("applicant", "Applicant signature", 240, 80)
                .set_placeholder("SIGN HERE")
                .set_shows_identity(true),
        )
        .add_signature_field(
            SignatureFieldConfig::new("co-applicant", "Co-applicant signature", 240, 80)
                .set_origin(0.0, 200.0),
        ))
}

fn verify(session: &mut KioskSession) {
    for answer in [true, false, true, true] {
        session.answer(answer);
    }
}

fn sign(session: &mut KioskSession, key: &str, origin_y: f32) -> Result<(), KioskError> {
    session.pointer_event(key, PointerEvent::Down(PointerPosition::new(20.0, origin_y + 40.0)))?;
    session.pointer_event(key, PointerEvent::Move(PointerPosition::new(90.0, origin_y + 30.0)))?;
    session.pointer_event(key, PointerEvent::Move(PointerPosition::new(160.0, origin_y + 50.0)))?;
    session.pointer_event(key, PointerEvent::Up)
}

fn ready_session() -> Result<KioskSession, KioskError> {
    let mut session = KioskSession::new(kiosk_config()?)?;

    session.set_identity("JANE DOE");
    verify(&mut session);
    sign(&mut session, "applicant", 0.0)?;
    sign(&mut session, "co-applicant", 200.0)?;

    Ok(session)
}

#[test]
fn test_correct_answers_complete_after_exactly_four_submissions() -> TestResult {
    let completions = Rc::new(Cell::new(0));
    let counter = completions.clone();

    let mut flow = VerificationFlow::new(four_questions()?)
        .with_on_complete(move || counter.set(counter.get() + 1));

    let steps = [true, false, true, true]
        .into_iter()
        .map(|answer| flow.answer(answer))
        .collect::<Vec<_>>();

    assert_eq!(
        steps,
        vec![
            VerificationStep::Answering(1),
            VerificationStep::Answering(2),
            VerificationStep::Answering(3),
            VerificationStep::Completed,
        ]
    );
    assert!(!steps
        .iter()
        .any(|step| matches!(step, VerificationStep::Rejected { .. })));
    assert_eq!(completions.get(), 1);
    assert!(flow.has_passed());

    Ok(())
}

#[test]
fn test_wrong_answer_freezes_until_corrected() -> TestResult {
    let mut session = KioskSession::new(kiosk_config()?)?;

    assert_eq!(
        session.submit_answer(0, false)?,
        VerificationStep::Rejected {
            index: 0,
            message: "Only the applicant may sign.".to_string(),
        }
    );

    assert!(matches!(
        session.submit_answer(1, false),
        Err(KioskError::QuestionOutOfOrder {
            expected: 0,
            submitted: 1
        })
    ));
    assert_eq!(session.verification().current_index(), 0);

    assert_eq!(session.submit_answer(0, true)?, VerificationStep::Answering(1));
    assert_eq!(session.verification().last_error(), None);
    assert_eq!(
        session.verification().progress(),
        vec![
            QuestionProgress::Answered,
            QuestionProgress::Current,
            QuestionProgress::Pending,
            QuestionProgress::Pending,
        ]
    );

    Ok(())
}

#[test]
fn test_marks_without_real_ink_never_sign() {
    let mut rng = rand::thread_rng();

    let mut surface = InkSurface::new("applicant", 240, 80)
        .with_placeholder_label("SIGN HERE")
        .with_watermark("JANE DOE");

    let mut observer = RecordingObserver::default();

    for _ in 0..64 {
        let point = InkStrokePoint::new(rng.gen_range(0.0..240.0), rng.gen_range(0.0..80.0));

        surface.begin_stroke(point);
        surface.end_stroke(&mut observer);
    }

    assert!(!surface.is_signed());
    assert!(observer.changes.is_empty());

    let bitmap = surface.bitmap().expect("drawable surface");

    assert!(bitmap.any_pixel(|pixel| *pixel != [255, 255, 255, 255]));
    assert!(!bitmap.any_pixel(is_real_ink));
}

#[test]
fn test_real_ink_threshold() {
    let mut rng = rand::thread_rng();

    for _ in 0..256 {
        let faint: u8 = rng.gen_range(REAL_INK_THRESHOLD..=255);
        let dark: u8 = rng.gen_range(0..REAL_INK_THRESHOLD);

        assert!(!is_real_ink(&[faint, faint, faint, 255]));
        assert!(!is_real_ink(&[dark, dark, faint, 255]));
        assert!(is_real_ink(&[dark, dark, dark, 255]));
        assert!(!is_real_ink(&[dark, dark, dark, 0]));
    }
}

#[test]
fn test_signed_notification_fires_once_per_clear_cycle() {
    let mut surface = InkSurface::new("applicant", 240, 80);
    let mut observer = RecordingObserver::default();

    let scribble = |surface: &mut InkSurface, observer: &mut RecordingObserver| {
        surface.begin_stroke(InkStrokePoint::new(10.0, 10.0));
        surface.extend_stroke(InkStrokePoint::new(100.0, 60.0));
        surface.end_stroke(observer);
    };

    scribble(&mut surface, &mut observer);
    scribble(&mut surface, &mut observer);
    scribble(&mut surface, &mut observer);

    assert_eq!(observer.changes, vec![("applicant".to_string(), true)]);

    surface.clear(&mut observer);
    assert!(!surface.is_signed());
    assert!(surface.strokes().is_empty());

    scribble(&mut surface, &mut observer);
    scribble(&mut surface, &mut observer);

    assert_eq!(
        observer.changes,
        vec![
            ("applicant".to_string(), true),
            ("applicant".to_string(), false),
            ("applicant".to_string(), true),
        ]
    );
}

#[test]
fn test_all_signed_requires_every_field() -> TestResult {
    let mut signatures = SignatureSet::new(["applicant", "co-applicant"])?;

    assert!(!signatures.all_signed());

    signatures.set_signed("applicant", true)?;
    assert!(!signatures.all_signed());

    signatures.set_signed("co-applicant", true)?;
    assert!(signatures.all_signed());

    signatures.set_signed("applicant", false)?;
    assert!(!signatures.all_signed());
    assert_eq!(signatures.unsigned_keys().collect::<Vec<_>>(), vec!["applicant"]);

    Ok(())
}

#[test]
fn test_export_refused_before_any_prompt_when_not_ready() -> TestResult {
    let mut session = KioskSession::new(kiosk_config()?)?;
    let mut prompted = false;

    let mut sink = RecordingSink::default();
    let mut notifier = RecordingNotifier::default();

    let result = session.export(
        &mut |_: &str| {
            prompted = true;
            true
        },
        &mut sink,
        &mut notifier,
    );
    assert!(matches!(result, Err(KioskError::VerificationRequired)));

    verify(&mut session);
    sign(&mut session, "applicant", 0.0)?;

    let result = session.export(
        &mut |_: &str| {
            prompted = true;
            true
        },
        &mut sink,
        &mut notifier,
    );
    assert!(matches!(result, Err(KioskError::SignaturesIncomplete)));

    assert!(!prompted);
    assert!(sink.offers.is_empty());
    assert!(notifier.notices.is_empty());

    Ok(())
}

#[test]
fn test_declined_export_leaves_state_unchanged() -> TestResult {
    let session = ready_session()?;
    let before = session.document()?;

    let mut prompts = Vec::new();
    let mut sink = RecordingSink::default();
    let mut notifier = RecordingNotifier::default();

    let outcome = session.export(
        &mut |prompt: &str| {
            prompts.push(prompt.to_string());
            false
        },
        &mut sink,
        &mut notifier,
    )?;

    assert_eq!(outcome, ExportOutcome::Declined);
    assert_eq!(
        prompts,
        vec!["Did you complete and sign this application yourself?".to_string()]
    );
    assert!(sink.offers.is_empty());
    assert!(notifier.notices.is_empty());
    assert!(session.is_verified());
    assert!(session.is_all_signed());
    assert_eq!(session.document()?, before);

    Ok(())
}

#[test]
fn test_failed_capture_notifies_and_can_be_retried() -> TestResult {
    let failing = Rc::new(Cell::new(true));

    let mut session = KioskSession::new(kiosk_config()?.set_rasterizer(SwitchableRasterizer {
        failing: failing.clone(),
    }))?;

    session.set_identity("JANE DOE");
    verify(&mut session);
    sign(&mut session, "applicant", 0.0)?;
    sign(&mut session, "co-applicant", 200.0)?;

    let before = session.document()?;

    let mut sink = RecordingSink::default();
    let mut notifier = RecordingNotifier::default();

    let outcome = session.export(&mut |_: &str| true, &mut sink, &mut notifier)?;

    assert_eq!(outcome, ExportOutcome::Failed);
    assert_eq!(notifier.notices, vec!["Capture failed. Please try again.".to_string()]);
    assert!(sink.offers.is_empty());
    assert_eq!(session.document()?, before);
    assert!(session.can_export());

    failing.set(false);

    let outcome = session.export(&mut |_: &str| true, &mut sink, &mut notifier)?;

    assert!(matches!(outcome, ExportOutcome::Delivered { .. }));
    assert_eq!(sink.offers.len(), 1);
    assert_eq!(notifier.notices.len(), 1);

    Ok(())
}

#[test]
fn test_delivered_export_is_a_supersampled_png() -> TestResult {
    let session = ready_session()?;

    let mut sink = RecordingSink::default();
    let mut notifier = RecordingNotifier::default();

    let outcome = session.export(&mut |_: &str| true, &mut sink, &mut notifier)?;

    let (file_name, data_url) = sink.offers.first().expect("one offered download");

    assert_eq!(
        outcome,
        ExportOutcome::Delivered {
            file_name: file_name.clone()
        }
    );

    let millis = file_name
        .strip_prefix("signature-document-")
        .and_then(|rest| rest.strip_suffix(".png"))
        .expect("file name pattern");
    assert!(millis.parse::<i64>()? > 0);

    let payload = data_url
        .strip_prefix("data:image/png;base64,")
        .expect("PNG data URL");

    let image = image_025::load_from_memory(&general_purpose::STANDARD.decode(payload)?)?.to_rgba8();
    let document = session.document()?;

    assert_eq!(image.width() as f32, document.bounds().width * 2.0);
    assert_eq!(image.height() as f32, document.bounds().height * 2.0);
    assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert!(image.pixels().any(|pixel| is_real_ink(&pixel.0)));
    assert!(notifier.notices.is_empty());

    Ok(())
}

#[test]
fn test_export_verified_uses_the_passed_flow_as_confirmation() -> TestResult {
    let mut session = ready_session()?;

    let mut sink = RecordingSink::default();
    let mut notifier = RecordingNotifier::default();

    let outcome = session.export_verified(&mut sink, &mut notifier)?;

    assert!(matches!(outcome, ExportOutcome::Delivered { .. }));
    assert_eq!(sink.offers.len(), 1);

    session.cancel_verification();

    assert!(matches!(
        session.export_verified(&mut sink, &mut notifier),
        Err(KioskError::VerificationRequired)
    ));
    assert!(session.is_all_signed());
    assert_eq!(sink.offers.len(), 1);

    Ok(())
}

#[test]
fn test_clearing_one_field_blocks_export_again() -> TestResult {
    let mut session = ready_session()?;

    assert!(session.can_export());

    session.clear_signature("co-applicant")?;

    assert!(!session.can_export());
    assert_eq!(
        session.signatures().unsigned_keys().collect::<Vec<_>>(),
        vec!["co-applicant"]
    );
    assert_eq!(
        session.surface("applicant").and_then(InkSurface::watermark),
        Some("JANE DOE")
    );

    Ok(())
}

#[test]
fn test_inline_gate_blocks_export_until_every_answer_matches() -> TestResult {
    let mut session =
        KioskSession::new(kiosk_config()?.set_verification_mode(VerificationMode::Inline))?;

    for (index, answer) in [true, false, true, true].into_iter().enumerate().rev() {
        session.set_inline_answer(index, answer)?;
    }

    sign(&mut session, "applicant", 0.0)?;
    sign(&mut session, "co-applicant", 200.0)?;

    session.set_inline_answer(3, false)?;
    session.set_inline_answer(1, true)?;

    let mut prompted = false;
    let mut sink = RecordingSink::default();
    let mut notifier = RecordingNotifier::default();

    let result = session.export(
        &mut |_: &str| {
            prompted = true;
            true
        },
        &mut sink,
        &mut notifier,
    );

    assert!(matches!(
        result,
        Err(KioskError::VerificationIncomplete { first_failing: 1 })
    ));
    assert!(matches!(
        session.export_verified(&mut sink, &mut notifier),
        Err(KioskError::VerificationIncomplete { first_failing: 1 })
    ));
    assert!(!prompted);
    assert!(sink.offers.is_empty());
    assert!(notifier.notices.is_empty());
    assert!(session.is_all_signed());

    session.set_inline_answer(1, false)?;
    session.set_inline_answer(3, true)?;

    assert!(session.is_verified());
    assert!(matches!(
        session.export_verified(&mut sink, &mut notifier)?,
        ExportOutcome::Delivered { .. }
    ));
    assert_eq!(sink.offers.len(), 1);

    Ok(())
}
