//! Count Drill core crate.
//!
//! Addition / subtraction practice for young learners. The interesting part is
//! [`layout`], which turns a problem into timed placements of emoji counters;
//! [`reveal`] replays those placements frame by frame and [`session`] drives
//! rounds, scoring and settings. [`web`] wires it all into a browser page via
//! `start_game()`; with the `console_log` feature, log output lands in the
//! devtools console.

use wasm_bindgen::prelude::*;

#[cfg(feature = "console_log")]
pub mod console;
pub mod layout;
pub mod problem;
pub mod reveal;
pub mod score;
pub mod session;
pub mod settings;
pub mod tokens;
pub mod web;

pub use layout::{
    Group, Layout, LayoutConfig, LayoutError, LayoutWarning, Operator, PlacementEvent, RemovalEvent, lay_out,
    layout_addition, layout_for, layout_subtraction,
};
pub use problem::{AnswerCheck, NumberRange, Problem, ProblemError, ProblemGenerator, QuestionType, check_answer};
pub use reveal::{RenderSink, Reveal, RevealQueue};
pub use score::{ScoreBoard, ScoreStats, format_clock};
pub use session::{DrillSession, Outcome, Round, SeededSession};
pub use settings::{Settings, SettingsError};
pub use tokens::{CategoryTokens, FixedTokens, IconCategory, Lcg, RandomSource, TokenPair, TokenSupplier};
pub use web::start_game;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(feature = "console_log")]
    {
        let level = if cfg!(debug_assertions) {
            tracing_subscriber::filter::LevelFilter::DEBUG
        } else {
            tracing_subscriber::filter::LevelFilter::INFO
        };
        console::init(level);
    }
}

/// Compute a counting layout from JS and hand it back as JSON, for hosts that
/// render tokens themselves instead of using `start_game()`.
#[wasm_bindgen]
pub fn counting_layout_json(num1: i32, num2: i32, operator: char, items_per_row: u32) -> Result<String, JsValue> {
    let config = LayoutConfig { items_per_row, ..LayoutConfig::default() };
    let layout = layout_for(i64::from(num1), i64::from(num2), operator, &config)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&layout).map_err(|e| JsValue::from_str(&e.to_string()))
}
