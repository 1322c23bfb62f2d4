//! Exposes a [KioskSession] to JavaScript through `wasm-bindgen`, with the browser window
//! providing the confirmation prompt, failure notices and file download.
//!
//! ```javascript
//! import init, { WasmKioskSession } from 'signature-kiosk';
//!
//! await init();
//!
//! const session = new WasmKioskSession(
//!     "APPLICATION",
//!     [["applicant", "Applicant", 480, 160, "SIGN HERE"]],
//!     [["Are you the applicant?", true, "Only the applicant may sign."]],
//! );
//! ```

use crate::error::KioskError;
use crate::export::exporter::{Confirmation, DownloadSink, ExportOutcome, Notifier};
use crate::ink::surface::{PointerEvent, PointerPosition};
use crate::session::{KioskConfig, KioskSession, SignatureFieldConfig};
use crate::setting::{required_flag, required_size, required_text};
use crate::verification::flow::VerificationStep;
use crate::verification::question::{Question, QuestionSet};
use js_sys::Array;
use log::{error, Level};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlAnchorElement, Window};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if console_log::init_with_level(Level::Debug).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
}

#[inline]
fn to_js_error(err: KioskError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

/// Shows prompts and notices through the browser's modal dialogs and delivers captures
/// through a temporary download link.
struct BrowserWindow {
    window: Window,
}

impl Confirmation for BrowserWindow {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.window.confirm_with_message(prompt).unwrap_or(false)
    }
}

impl Notifier for BrowserWindow {
    fn notify(&mut self, message: &str) {
        if let Err(err) = self.window.alert_with_message(message) {
            error!("unable to show notice: {:?}", err);
        }
    }
}

impl DownloadSink for BrowserWindow {
    fn offer(&mut self, file_name: &str, data_url: &str) {
        let anchor = self
            .window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))
            .and_then(|document| document.create_element("a"))
            .and_then(|element| element.dyn_into::<HtmlAnchorElement>().map_err(JsValue::from));

        match anchor {
            Ok(anchor) => {
                anchor.set_href(data_url);
                anchor.set_download(file_name);
                anchor.click();
            }
            Err(err) => error!("unable to offer download {}: {:?}", file_name, err),
        }
    }
}

/// Reads one `[key, label, width, height, placeholder?]` field entry.
fn signature_field(name: &str, entry: &Array) -> Result<SignatureFieldConfig, KioskError> {
    let key = required_text(entry.get(0).as_string(), name, "key")?;
    let label = required_text(entry.get(1).as_string(), name, "label")?;
    let width = required_size(entry.get(2).as_f64(), name, "width")?;
    let height = required_size(entry.get(3).as_f64(), name, "height")?;

    let mut field = SignatureFieldConfig::new(key, label, width, height).set_shows_identity(true);

    let placeholder = entry.get(4);

    if !placeholder.is_undefined() && !placeholder.is_null() {
        field = field.set_placeholder(required_text(placeholder.as_string(), name, "placeholder")?);
    }

    Ok(field)
}

/// A [KioskSession] owned by JavaScript.
#[wasm_bindgen]
pub struct WasmKioskSession {
    session: KioskSession,
}

#[wasm_bindgen]
impl WasmKioskSession {
    /// Creates a new session.
    ///
    /// `fields` holds one `[key, label, width, height, placeholder?]` array per signature
    /// field; `questions` holds one `[prompt, expectedAnswer, errorMessage]` array per
    /// verification question.
    #[wasm_bindgen(constructor)]
    pub fn new(title: String, fields: Array, questions: Array) -> Result<WasmKioskSession, JsValue> {
        let questions = questions
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let name = format!("question {}", index);
                let entry = Array::from(&entry);

                Ok(Question::new(
                    required_text(entry.get(0).as_string(), &name, "prompt")?,
                    required_flag(entry.get(1).as_bool(), &name, "expected answer")?,
                    required_text(entry.get(2).as_string(), &name, "error message")?,
                ))
            })
            .collect::<Result<Vec<_>, KioskError>>()
            .map_err(to_js_error)?;

        let mut config = KioskConfig::new(QuestionSet::new(questions).map_err(to_js_error)?)
            .set_title(title);

        for (index, entry) in fields.iter().enumerate() {
            let field = signature_field(&format!("field {}", index), &Array::from(&entry))
                .map_err(to_js_error)?;

            config = config.add_signature_field(field);
        }

        Ok(Self {
            session: KioskSession::new(config).map_err(to_js_error)?,
        })
    }

    /// Replaces the signer's name and returns the accepted value.
    pub fn set_identity(&mut self, input: &str) -> String {
        self.session.set_identity(input).to_string()
    }

    /// Returns the prompt of the question currently being asked.
    pub fn current_prompt(&self) -> String {
        self.session
            .verification()
            .current_question()
            .prompt()
            .to_string()
    }

    /// Answers the current verification question. Returns the question's error message if
    /// the answer was wrong, or `undefined` otherwise.
    pub fn answer(&mut self, answer: bool) -> Option<String> {
        match self.session.answer(answer) {
            VerificationStep::Rejected { message, .. } => Some(message),
            VerificationStep::Answering(_) | VerificationStep::Completed => None,
        }
    }

    pub fn cancel_verification(&mut self) {
        self.session.cancel_verification();
    }

    pub fn is_verified(&self) -> bool {
        self.session.is_verified()
    }

    pub fn is_all_signed(&self) -> bool {
        self.session.is_all_signed()
    }

    pub fn pointer_down(&mut self, key: &str, client_x: f32, client_y: f32) -> Result<(), JsValue> {
        self.session
            .pointer_event(key, PointerEvent::Down(PointerPosition::new(client_x, client_y)))
            .map_err(to_js_error)
    }

    pub fn pointer_move(&mut self, key: &str, client_x: f32, client_y: f32) -> Result<(), JsValue> {
        self.session
            .pointer_event(key, PointerEvent::Move(PointerPosition::new(client_x, client_y)))
            .map_err(to_js_error)
    }

    pub fn pointer_up(&mut self, key: &str) -> Result<(), JsValue> {
        self.session
            .pointer_event(key, PointerEvent::Up)
            .map_err(to_js_error)
    }

    pub fn pointer_leave(&mut self, key: &str) -> Result<(), JsValue> {
        self.session
            .pointer_event(key, PointerEvent::Leave)
            .map_err(to_js_error)
    }

    pub fn clear(&mut self, key: &str) -> Result<(), JsValue> {
        self.session.clear_signature(key).map_err(to_js_error)
    }

    /// Returns the RGBA pixels of the given field, suitable for an `ImageData`.
    pub fn surface_pixels(&self, key: &str) -> Option<Vec<u8>> {
        self.session
            .surface(key)
            .and_then(|surface| surface.bitmap())
            .map(|bitmap| bitmap.as_raw_bytes().to_vec())
    }

    pub fn surface_width(&self, key: &str) -> u32 {
        self.session
            .surface(key)
            .and_then(|surface| surface.bitmap())
            .map(|bitmap| bitmap.width())
            .unwrap_or(0)
    }

    pub fn surface_height(&self, key: &str) -> u32 {
        self.session
            .surface(key)
            .and_then(|surface| surface.bitmap())
            .map(|bitmap| bitmap.height())
            .unwrap_or(0)
    }

    /// Asks for confirmation and downloads the captured document. Returns the downloaded
    /// file name, or `undefined` if the signer declined or the capture failed.
    pub fn export(&self) -> Result<Option<String>, JsValue> {
        let window = window()?;

        let mut confirmation = BrowserWindow {
            window: window.clone(),
        };
        let mut sink = BrowserWindow {
            window: window.clone(),
        };
        let mut notifier = BrowserWindow { window };

        let outcome = self
            .session
            .export(&mut confirmation, &mut sink, &mut notifier)
            .map_err(to_js_error)?;

        match outcome {
            ExportOutcome::Delivered { file_name } => Ok(Some(file_name)),
            ExportOutcome::Declined | ExportOutcome::Failed => Ok(None),
        }
    }
}
