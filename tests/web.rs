// Browser tests: `wasm-pack test --headless --firefox`. They mount the real
// page and poke it through the DOM, the way a player would.
#![cfg(target_arch = "wasm32")]

use collab_kitchen::{Ingredient, reset_story, start_story};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window()
        .and_then(|w| w.document())
        .expect("browser document")
}

#[wasm_bindgen_test]
fn start_mounts_every_interactive_element() {
    start_story().expect("story starts");
    let doc = document();
    for id in [
        "collab-kitchen-root",
        "lets-eat-btn",
        "intro1-next",
        "intro2-next",
        "chat-next",
        "drop-zone",
        "recipe-next",
        "quiz-option-0",
        "quiz-option-1",
        "quiz-option-2",
        "explanation-next",
        "stirring-range",
        "simmer-range",
        "heat-low",
        "heat-medium",
        "heat-high",
        "soup-next",
        "reset-btn",
    ] {
        assert!(doc.get_element_by_id(id).is_some(), "missing #{id}");
    }
    for ingredient in Ingredient::ALL {
        assert!(doc.get_element_by_id(ingredient.id()).is_some());
    }
}

#[wasm_bindgen_test]
fn starting_twice_keeps_one_page() {
    start_story().expect("first start");
    start_story().expect("second start");
    let roots = document()
        .query_selector_all("#collab-kitchen-root")
        .expect("query");
    assert_eq!(roots.length(), 1);
}

#[wasm_bindgen_test]
fn reset_is_safe_at_any_time() {
    reset_story();
    start_story().expect("story starts");
    reset_story();
    reset_story();
    assert!(document().get_element_by_id("collab-kitchen-root").is_some());
}
