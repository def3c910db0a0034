//! Browser front end: DOM token rendering, keyboard input and the frame loop.
//!
//! Layout: a fixed panel with the question line, the typed answer, score /
//! streak / timer, a feedback line and the counting area. Digits type the
//! answer, Enter submits, Backspace / Escape edit, Space plays the counting
//! animation for the current question and `R` resets the score.
use std::cell::RefCell;
use std::rc::Rc;

use tracing::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, window};

use crate::layout::Group;
use crate::reveal::RenderSink;
use crate::score::format_clock;
use crate::session::{DrillSession, Outcome, SeededSession};
use crate::settings::{MAX_NUMBER_RANGE, Settings};
use crate::tokens::{RandomSource, TokenSupplier};

/// No answer can exceed `MAX_NUMBER_RANGE`, so no more digits than it has.
const MAX_TYPED_DIGITS: usize = decimal_digits(MAX_NUMBER_RANGE);
const FEEDBACK_MS: f64 = 2_000.0;

// --- Keyboard ----------------------------------------------------------------

const fn decimal_digits(mut n: u32) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// What a key press asks the session to do after the typing buffer is updated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Submit,
    ShowCounting,
    ResetScore,
}

/// Apply `key` (a `KeyboardEvent.key` value) to the typing buffer.
pub fn apply_key(typing: &mut String, key: &str) -> KeyAction {
    match key {
        "Escape" => typing.clear(),
        "Backspace" => {
            typing.pop();
        }
        "Enter" => return KeyAction::Submit,
        " " => return KeyAction::ShowCounting,
        "r" | "R" => return KeyAction::ResetScore,
        k if k.len() == 1 && k.bytes().all(|b| b.is_ascii_digit()) => {
            if typing.len() < MAX_TYPED_DIGITS {
                typing.push_str(k);
            }
        }
        _ => {}
    }
    KeyAction::None
}

/// Feedback line text and CSS class for an answer outcome.
pub fn feedback_for(outcome: Outcome) -> Option<(String, &'static str)> {
    match outcome {
        Outcome::Ignored => None,
        Outcome::Empty => Some(("Type an answer first!".to_string(), "wrong")),
        Outcome::Correct { streak, streak_reward: true } => Some((format!("Great job! {streak} in a row! 🔥"), "correct")),
        Outcome::Correct { .. } => Some(("Great job! ✨".to_string(), "correct")),
        Outcome::Wrong { answer } => Some((format!("The answer is {answer}, try the next one!"), "wrong")),
    }
}

// --- DOM sink ----------------------------------------------------------------

struct DomSink {
    doc: Document,
    container: Element,
    rows: Vec<Element>,
    tokens: Vec<Element>,
}

impl DomSink {
    fn row(&mut self, row: u32) -> Option<&Element> {
        while self.rows.len() <= row as usize {
            let div = self.doc.create_element("div").ok()?;
            div.set_class_name("object-row");
            self.container.append_child(&div).ok()?;
            self.rows.push(div);
        }
        self.rows.get(row as usize)
    }
}

impl RenderSink for DomSink {
    fn clear(&mut self) {
        self.container.set_inner_html("");
        self.rows.clear();
        self.tokens.clear();
    }

    fn place(&mut self, row: u32, _column: u32, group: Group, token: &str, style: &str) {
        let Ok(obj) = self.doc.create_element("div") else { return };
        let class = match group {
            Group::Primary => format!("counting-object {style}"),
            Group::Secondary => format!("counting-object {style} group2 merging"),
        };
        obj.set_class_name(&class);
        obj.set_attribute("data-icon", token).ok();
        obj.set_text_content(Some(token));
        // Tokens arrive left to right per row, so appending keeps the column order.
        if let Some(parent) = self.row(row) {
            parent.append_child(&obj).ok();
        }
        self.tokens.push(obj);
    }

    fn mark_removed(&mut self, index: usize) {
        if let Some(obj) = self.tokens.get(index) {
            let class = obj.class_name();
            obj.set_class_name(&format!("{class} grayed-out"));
        }
    }
}

// --- App state ---------------------------------------------------------------

struct View {
    question: Element,
    typed: Element,
    score: Element,
    streak: Element,
    timer: Element,
    feedback: Element,
}

struct AppState {
    session: SeededSession,
    sink: DomSink,
    view: View,
    typing: String,
    shown_round: u64,
    feedback: Option<(String, &'static str, f64)>,
}

thread_local! {
    static APP_STATE: RefCell<Option<AppState>> = const { RefCell::new(None) };
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(feature = "rng")]
fn random_seed(now: f64) -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            warn!(error = %e, "crypto rng unavailable, seeding from clock");
            now.to_bits()
        }
    }
}

#[cfg(not(feature = "rng"))]
fn random_seed(now: f64) -> u64 {
    now.to_bits()
}

fn child(doc: &Document, parent: &Element, id: &str, class: &str) -> Result<Element, JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el);
    }
    let el = doc.create_element("div")?;
    el.set_id(id);
    el.set_class_name(class);
    parent.append_child(&el)?;
    Ok(el)
}

/// Mount the drill into the page. `settings_json` is the host's saved settings
/// document (partial documents are fine); `None` uses defaults.
#[wasm_bindgen]
pub fn start_game(settings_json: Option<String>) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let settings = match settings_json.as_deref() {
        Some(json) => Settings::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => Settings::default(),
    };
    let now = now_ms();
    let session = SeededSession::seeded(settings, random_seed(now), now)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let root = match doc.get_element_by_id("cd-root") {
        Some(el) => el,
        None => {
            let el = doc.create_element("div")?;
            el.set_id("cd-root");
            el.set_class_name("drill");
            body.append_child(&el)?;
            el
        }
    };
    let view = View {
        question: child(&doc, &root, "cd-question", "question-display")?,
        typed: child(&doc, &root, "cd-answer", "answer-input")?,
        score: child(&doc, &root, "cd-score", "score")?,
        streak: child(&doc, &root, "cd-streak", "streak")?,
        timer: child(&doc, &root, "cd-timer", "timer")?,
        feedback: child(&doc, &root, "cd-feedback", "feedback-message")?,
    };
    let counting = child(&doc, &root, "cd-counting", "object-counting")?;
    let sink = DomSink { doc: doc.clone(), container: counting, rows: Vec::new(), tokens: Vec::new() };

    APP_STATE.with(|cell| {
        cell.replace(Some(AppState {
            session,
            sink,
            view,
            typing: String::new(),
            shown_round: 0,
            feedback: None,
        }))
    });

    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            APP_STATE.with(|cell| {
                if let Some(state) = cell.borrow_mut().as_mut() {
                    let key = evt.key();
                    if key == " " {
                        evt.prevent_default();
                    }
                    on_key(state, &key, now_ms());
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    start_frame_loop();
    Ok(())
}

fn on_key(state: &mut AppState, key: &str, now: f64) {
    if let Some((text, class)) = handle_key(&mut state.session, &mut state.typing, key, now) {
        state.feedback = Some((text, class, now));
    }
}

/// Route one key press to `session`. Returns the feedback line to show, if any.
pub fn handle_key<R: RandomSource, T: TokenSupplier>(
    session: &mut DrillSession<R, T>,
    typing: &mut String,
    key: &str,
    now: f64,
) -> Option<(String, &'static str)> {
    match apply_key(typing, key) {
        KeyAction::None => None,
        KeyAction::Submit => {
            let outcome = session.submit(typing.as_str(), now);
            if matches!(outcome, Outcome::Correct { .. } | Outcome::Wrong { .. }) {
                typing.clear();
            }
            feedback_for(outcome)
        }
        KeyAction::ShowCounting => match session.show_counting(now) {
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "counting animation unavailable");
                Some((e.to_string(), "wrong"))
            }
        },
        KeyAction::ResetScore => {
            session.reset_score(now);
            info!("score reset");
            Some(("Score reset".to_string(), "correct"))
        }
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        APP_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                frame(state, ts);
            }
        });
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn frame(state: &mut AppState, now: f64) {
    state.session.tick(now, &mut state.sink);
    if state.session.round_number() != state.shown_round {
        state.shown_round = state.session.round_number();
        state.typing.clear();
    }
    if state.feedback.as_ref().is_some_and(|(_, _, at)| now - at > FEEDBACK_MS) {
        state.feedback = None;
    }
    paint(state, now);
}

fn paint(state: &AppState, now: f64) {
    let v = &state.view;
    if let Some(round) = state.session.round() {
        let p = round.problem;
        let shown = match round.outcome {
            Some(Outcome::Wrong { answer }) => format!("{} {} {} = {}", p.num1(), p.operator(), p.num2(), answer),
            _ => p.prompt(),
        };
        v.question.set_text_content(Some(&shown));
    }
    v.typed.set_text_content(Some(&state.typing));
    let stats = state.session.stats(now);
    v.score.set_text_content(Some(&stats.score.to_string()));
    v.streak.set_text_content(Some(&stats.streak.to_string()));
    if state.session.settings().enable_timer {
        v.timer.set_text_content(Some(&format_clock(stats.elapsed_ms)));
    } else {
        v.timer.set_text_content(None);
    }
    match &state.feedback {
        Some((text, class, _)) => {
            v.feedback.set_class_name(&format!("feedback-message {class} show"));
            v.feedback.set_text_content(Some(text));
        }
        None => v.feedback.set_class_name("feedback-message"),
    }
}
