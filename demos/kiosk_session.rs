use base64::{engine::general_purpose, Engine as _};
use signature_kiosk::prelude::*;
use std::error::Error;
use std::f32::consts::PI;

/// Writes every offered capture into the working directory.
struct FileSink;

impl DownloadSink for FileSink {
    fn offer(&mut self, file_name: &str, data_url: &str) {
        let bytes = data_url
            .strip_prefix("data:image/png;base64,")
            .ok_or_else(|| "not a PNG data URL".to_string())
            .and_then(|payload| {
                general_purpose::STANDARD
                    .decode(payload)
                    .map_err(|err| err.to_string())
            });

        match bytes.and_then(|bytes| std::fs::write(file_name, bytes).map_err(|err| err.to_string())) {
            Ok(()) => println!("Saved {}", file_name),
            Err(err) => eprintln!("Unable to save {}: {}", file_name, err),
        }
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, message: &str) {
        eprintln!("NOTICE: {}", message);
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    // A session is configured with its verification questions and the signature fields
    // shown on the page. The origin of each field is where its top-left corner sits in
    // client coordinates, so raw pointer positions can be delivered unchanged.

    let questions = QuestionSet::new([
        Question::new(
            "Are you the person named on this application?",
            true,
            "Only the applicant may sign this application.",
        ),
        Question::new(
            "Has anyone pressured you to sign?",
            false,
            "Please speak to a member of staff before continuing.",
        ),
    ])?;

    let config = KioskConfig::new(questions)
        .set_title("MEMBERSHIP APPLICATION")
        .add_signature_field(
            SignatureFieldConfig::new("applicant", "Applicant signature", 480, 160)
                .set_placeholder("SIGN HERE")
                .set_origin(100.0, 300.0)
                .set_shows_identity(true),
        );

    let mut session = KioskSession::new(config)?;

    println!("Accepted name: {:?}", session.set_identity("Jane Q. Doe"));

    // Signing is refused until every question has been answered correctly.

    if let Err(err) = session.pointer_event("applicant", PointerEvent::Up) {
        println!("Pointer refused before verification: {}", err);
    }

    for answer in [true, true, false] {
        let (position, count) = session.verification().position();

        let prompt = session.verification().current_question().prompt().to_string();

        match session.answer(answer) {
            VerificationStep::Rejected { message, .. } => {
                println!("[{}/{}] {} -> {}: {}", position, count, prompt, answer, message)
            }
            step => println!("[{}/{}] {} -> {}: {:?}", position, count, prompt, answer, step),
        }
    }

    // Draw a loose cursive wave across the field, one pointer event at a time.

    session.pointer_event(
        "applicant",
        PointerEvent::Down(PointerPosition::new(140.0, 380.0)),
    )?;

    for step in 1..=80 {
        let t = step as f32 / 80.0;

        session.pointer_event(
            "applicant",
            PointerEvent::Move(PointerPosition::new(
                140.0 + t * 380.0,
                380.0 + (t * 6.0 * PI).sin() * 30.0,
            )),
        )?;
    }

    session.pointer_event("applicant", PointerEvent::Up)?;

    println!("All fields signed: {}", session.is_all_signed());

    let outcome = session.export(
        &mut |prompt: &str| {
            println!("{} yes", prompt);
            true
        },
        &mut FileSink,
        &mut ConsoleNotifier,
    )?;

    println!("Export outcome: {:?}", outcome);

    Ok(())
}
