//! Per-frame projection of engine state onto the DOM.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use crate::engine::NarrativeEngine;
use crate::error::StoryResult;
use crate::motion::Pose;
use crate::quiz::{AnswerMark, ExplanationStep, QUIZ_OPTIONS};
use crate::recipe::Ingredient;
use crate::soup::{HeatLevel, SoupSimulation, SoupStep, format_remaining, spoon_period_s};

use super::dom::{self, BUBBLE_COUNT, VEGETABLE_COUNT, html_element};

pub fn frame(doc: &Document, engine: &NarrativeEngine, now: f64) -> StoryResult<()> {
    let stage = engine.stage();
    for target in stage.targets() {
        if let Some(el) = html_element(doc, target.id()) {
            apply_pose(&el, &stage.pose(target, now))?;
        }
    }
    chat(doc, engine)?;
    recipe(doc, engine)?;
    quiz(doc, engine)?;
    if let Some(soup) = engine.soup() {
        soup_panel(doc, soup, now)?;
    }
    Ok(())
}

fn apply_pose(el: &HtmlElement, pose: &Pose) -> StoryResult<()> {
    let style = el.style();
    style.set_property("transform", &pose.css_transform())?;
    style.set_property("filter", &pose.css_filter())?;
    style.set_property("opacity", &format!("{:.3}", pose.opacity))?;
    style.set_property("display", if pose.display { "" } else { "none" })?;
    Ok(())
}

fn show(doc: &Document, id: &str, visible: bool) -> StoryResult<()> {
    if let Some(el) = doc.get_element_by_id(id) {
        el.class_list().toggle_with_force("hidden", !visible)?;
    }
    Ok(())
}

fn set_text(doc: &Document, id: &str, content: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        if el.text_content().as_deref() != Some(content) {
            el.set_text_content(Some(content));
        }
    }
}

fn set_disabled(el: &Element, disabled: bool) -> StoryResult<()> {
    if disabled {
        el.set_attribute("disabled", "")?;
    } else {
        el.remove_attribute("disabled")?;
    }
    Ok(())
}

fn chat(doc: &Document, engine: &NarrativeEngine) -> StoryResult<()> {
    let Some(chat) = engine.chat() else {
        show(doc, "chat-next", false)?;
        show(doc, "chat-typing", false)?;
        if let Some(thread) = doc.get_element_by_id("chat-thread") {
            thread.set_inner_html("");
        }
        return Ok(());
    };
    if let Some(thread) = doc.get_element_by_id("chat-thread") {
        let shown = thread.child_element_count() as usize;
        if shown > chat.transcript().len() {
            thread.set_inner_html("");
        }
        let shown = thread.child_element_count() as usize;
        for message in chat.transcript().iter().skip(shown) {
            dom::chat_line(doc, &thread, message.sender, message.content)?;
        }
    }
    show(doc, "chat-typing", chat.is_revealing())?;
    show(doc, "chat-next", chat.can_request_next())?;
    Ok(())
}

fn recipe(doc: &Document, engine: &NarrativeEngine) -> StoryResult<()> {
    let Some(game) = engine.recipe() else {
        return Ok(());
    };
    let state = game.state();
    set_text(doc, "recipe-narration", state.narration());
    show(doc, "recipe-next", game.shows_next())?;
    show(doc, "recipe-bubble", game.shows_dish())?;
    if let (Some(src), Some(img)) = (state.dish_image(), doc.get_element_by_id("recipe-dish")) {
        if img.get_attribute("src").as_deref() != Some(src) {
            img.set_attribute("src", src)?;
        }
    }
    for ingredient in Ingredient::ALL {
        if let Some(el) = doc.get_element_by_id(ingredient.id()) {
            let draggable = game.is_draggable(ingredient);
            el.set_attribute("draggable", if draggable { "true" } else { "false" })?;
            el.class_list()
                .toggle_with_force("placed", game.placed().contains(&ingredient))?;
        }
    }
    show(doc, "pantry-eggs", game.eggs_on_shelf())?;
    Ok(())
}

fn quiz(doc: &Document, engine: &NarrativeEngine) -> StoryResult<()> {
    let Some(quiz) = engine.quiz() else {
        return Ok(());
    };
    let step = quiz.step();
    let asking = step == ExplanationStep::Quiz;
    show(doc, "quiz-speech", asking)?;
    show(doc, "quiz-options", asking)?;
    show(doc, "quiz-content", !asking && step != ExplanationStep::Soup)?;
    set_text(doc, "quiz-speech", quiz.feedback());
    for index in 0..QUIZ_OPTIONS.len() {
        let Some(el) = doc.get_element_by_id(&format!("quiz-option-{index}")) else {
            continue;
        };
        let mark = quiz.mark(index);
        let classes = el.class_list();
        classes.toggle_with_force("correct", mark == AnswerMark::Correct)?;
        classes.toggle_with_force("incorrect", mark == AnswerMark::Incorrect)?;
        set_disabled(&el, mark == AnswerMark::Incorrect)?;
    }
    set_text(doc, "quiz-heading", step.heading().unwrap_or_default());
    show(doc, "quiz-heading", step.heading().is_some())?;
    set_text(doc, "quiz-body", step.body());
    show(doc, "combo-stage", step == ExplanationStep::Combination)?;
    show(doc, "explanation-next", step.next().is_some())?;
    Ok(())
}

fn soup_panel(doc: &Document, soup: &SoupSimulation, now: f64) -> StoryResult<()> {
    let step = soup.step();
    let cooking = step != SoupStep::Intro;
    show(doc, "soup-heading", !cooking)?;
    show(doc, "soup-pot", cooking)?;
    show(doc, "soup-controls", cooking)?;
    set_text(doc, "soup-speech", soup.speech());
    show(doc, "soup-next", step.next().is_some())?;

    show(doc, "stirring-control", step.shows_stirring())?;
    show(doc, "heat-control", step.shows_heat())?;
    show(doc, "simmer-control", step.shows_simmer())?;
    show(doc, "intensity-control", step.shows_meter())?;

    sync_range(doc, "stirring-range", soup.stirring_speed());
    sync_range(doc, "simmer-range", soup.simmer_speed());
    set_text(
        doc,
        "simmer-timer",
        &format!("Simmer time: {}", format_remaining(soup.remaining_s())),
    );
    for level in HeatLevel::ALL {
        let id = format!("heat-{}", level.label().to_ascii_lowercase());
        if let Some(el) = doc.get_element_by_id(&id) {
            el.class_list().toggle_with_force("active", soup.heat() == level)?;
        }
    }
    if let Some(fill) = html_element(doc, "intensity-fill") {
        fill.style()
            .set_property("width", &format!("{:.1}%", soup.intensity()))?;
    }
    set_text(doc, "intensity-value", &format!("{:.0}", soup.intensity()));

    let secs = now / 1000.0;
    if let Some(spoon) = html_element(doc, "spoon") {
        let angle = if soup.spoon_spinning() {
            let period = spoon_period_s(soup.stirring_speed()).max(0.5);
            (secs / period).fract() * 360.0
        } else {
            0.0
        };
        spoon.style().set_property("transform", &format!("rotate({angle:.1}deg)"))?;
    }

    let lift = soup.heat().bubble_lift();
    for i in 0..BUBBLE_COUNT {
        if let Some(bubble) = html_element(doc, &format!("soup-bubble-{i}")) {
            // staggered, ping-ponging rise
            let duration = 1.0 + (i % 3) as f64 * 0.5;
            let phase = ((secs - i as f64 * 0.2) / duration).rem_euclid(2.0);
            let k = if phase > 1.0 { 2.0 - phase } else { phase };
            let style = bubble.style();
            style.set_property("transform", &format!("translateY({:.1}px)", -20.0 * lift * k))?;
            style.set_property("opacity", &format!("{:.2}", 1.0 - k))?;
        }
    }

    let jiggle = soup.vegetable_jiggle_px();
    for i in 0..VEGETABLE_COUNT {
        if let Some(piece) = html_element(doc, &format!("soup-vegetable-{i}")) {
            let transform = match jiggle {
                Some(amount) => {
                    let t = secs * 2.0 * std::f64::consts::PI + i as f64;
                    format!(
                        "translate({:.1}px, {:.1}px) rotate({:.1}deg)",
                        amount * t.sin(),
                        amount * (t * 1.3).cos(),
                        amount * 2.0 * (t * 0.7).sin()
                    )
                }
                None => "none".to_string(),
            };
            piece.style().set_property("transform", &transform)?;
        }
    }
    show(doc, "soup-steam", soup.heat().has_steam())?;
    Ok(())
}

fn sync_range(doc: &Document, id: &str, value: u8) {
    let Some(input) = doc
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    else {
        return;
    };
    let value = value.to_string();
    if input.value() != value {
        input.set_value(&value);
    }
}
