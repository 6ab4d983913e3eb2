//! Collab Kitchen core crate.
//!
//! "Collaboration 101 (through food!)" is a linear illustrated story: a kitchen
//! title scene, two intro cards, a chat between Timothee and his mum, a
//! drag-and-drop recipe game, a quiz with explanation cards and a soup
//! simulation. Each screen is a small state machine owned by the
//! [`NarrativeEngine`]; the browser shell in `web` only forwards input and draws
//! whatever the engine's motion [`Stage`] says.
//!
//! Everything outside `web` is plain Rust and runs under `cargo test` on the host.

use wasm_bindgen::prelude::*;

pub mod chat;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod motion;
pub mod quiz;
pub mod recipe;
pub mod scene;
pub mod soup;
mod web;

pub use chat::{MESSAGE_SCRIPT, Message, MessageSequencer, Sender};
pub use config::{FeedbackTiming, StoryConfig};
pub use engine::{Handoff, NarrativeEngine, Phase};
pub use error::{StoryError, StoryResult};
pub use motion::{Easing, Pose, Rect, Stage, Surface, Target};
pub use quiz::{AnswerMark, ExplanationStep, QuizController};
pub use recipe::{Ingredient, RecipeGame, RecipeState};
pub use scene::{Scene, SceneRouter, Trigger};
pub use soup::{HeatLevel, SoupSimulation, SoupStep};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of feeding one user action into a controller.
///
/// Invalid or out-of-order actions are never errors in this story; they are
/// simply `Ignored` and leave state untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

// -----------------------------------------------------------------------------
// Unified entrypoints
// -----------------------------------------------------------------------------

/// Mount the story into `document.body` with the default configuration.
#[wasm_bindgen]
pub fn start_story() -> Result<(), JsValue> {
    web::start(StoryConfig::default()).map_err(JsValue::from)
}

/// Mount the story with a JSON configuration (see [`StoryConfig`]).
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_story_with_config(json: &str) -> Result<(), JsValue> {
    let config = StoryConfig::from_json(json)?;
    web::start(config).map_err(JsValue::from)
}

/// Back to the title scene; every controller starts over.
#[wasm_bindgen]
pub fn reset_story() {
    web::reset();
}
