//! Browser shell: builds the page, forwards input to the engine and runs the
//! animation-frame loop that ticks the engine and redraws.
//!
//! All engine access goes through the `SHELL` thread-local; each listener and
//! each frame borrows it once and releases it before returning.

mod dom;
mod render;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, DragEvent, Event, HtmlInputElement, window};

use crate::config::StoryConfig;
use crate::engine::NarrativeEngine;
use crate::error::{StoryError, StoryResult};
use crate::logging;
use crate::quiz::QUIZ_OPTIONS;
use crate::recipe::{DROP_ZONE, Ingredient};
use crate::scene::Trigger;
use crate::soup::HeatLevel;

use dom::DomSurface;

struct Shell {
    engine: NarrativeEngine,
    surface: DomSurface,
}

thread_local! {
    static SHELL: RefCell<Option<Shell>> = const { RefCell::new(None) };
    static LOOP_RUNNING: Cell<bool> = const { Cell::new(false) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub fn start(config: StoryConfig) -> StoryResult<()> {
    logging::init(&config.log_filter);
    let win = window().ok_or(StoryError::NoWindow)?;
    let doc = win.document().ok_or(StoryError::NoDocument)?;

    if doc.get_element_by_id(dom::ROOT_ID).is_none() {
        dom::build(&doc)?;
        attach_listeners(&doc)?;
    }

    let engine = NarrativeEngine::new(config);
    SHELL.with(|cell| {
        cell.replace(Some(Shell {
            engine,
            surface: DomSurface::new(doc),
        }))
    });
    start_loop();
    info!("story started");
    Ok(())
}

pub fn reset() {
    with_shell(|shell, _now| shell.engine.reset());
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn with_shell(f: impl FnOnce(&mut Shell, f64)) {
    let now = now_ms();
    SHELL.with(|cell| {
        if let Some(shell) = cell.borrow_mut().as_mut() {
            f(shell, now);
        }
    });
}

fn start_loop() {
    if LOOP_RUNNING.with(|running| running.replace(true)) {
        return;
    }
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        SHELL.with(|cell| {
            if let Some(shell) = cell.borrow_mut().as_mut() {
                shell.engine.tick(ts, &shell.surface);
                if let Err(err) = render::frame(shell.surface.document(), &shell.engine, ts) {
                    warn!(%err, "render failed");
                }
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

fn listen(
    doc: &Document,
    id: &str,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> StoryResult<()> {
    let el = doc
        .get_element_by_id(id)
        .ok_or_else(|| StoryError::Dom(format!("missing #{id}")))?;
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    el.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

fn on_click(
    doc: &Document,
    id: &str,
    action: impl Fn(&mut Shell, f64) + 'static,
) -> StoryResult<()> {
    listen(doc, id, "click", move |_| with_shell(|shell, now| action(shell, now)))
}

fn range_value(event: &Event) -> Option<i32> {
    let input: HtmlInputElement = event.target()?.dyn_into().ok()?;
    input.value().parse().ok()
}

fn attach_listeners(doc: &Document) -> StoryResult<()> {
    on_click(doc, "lets-eat-btn", |shell, now| {
        shell.engine.advance_scene(Trigger::LetsEat, now, &shell.surface);
    })?;
    for id in ["intro1-next", "intro2-next"] {
        on_click(doc, id, |shell, now| {
            shell.engine.advance_scene(Trigger::Next, now, &shell.surface);
        })?;
    }
    on_click(doc, "chat-next", |shell, now| {
        shell.engine.chat_next(now);
    })?;
    on_click(doc, "recipe-next", |shell, _now| {
        shell.engine.recipe_next();
    })?;
    for index in 0..QUIZ_OPTIONS.len() {
        on_click(doc, &format!("quiz-option-{index}"), move |shell, now| {
            shell.engine.select_quiz_option(index, now);
        })?;
    }
    on_click(doc, "explanation-next", |shell, now| {
        shell.engine.explanation_next(now);
    })?;
    on_click(doc, "soup-next", |shell, now| {
        shell.engine.soup_next(now);
    })?;
    for level in HeatLevel::ALL {
        let id = format!("heat-{}", level.label().to_ascii_lowercase());
        on_click(doc, &id, move |shell, _now| {
            shell.engine.set_heat(level);
        })?;
    }
    on_click(doc, "reset-btn", |shell, _now| shell.engine.reset())?;

    listen(doc, "stirring-range", "input", |event| {
        if let Some(speed) = range_value(&event) {
            with_shell(|shell, _now| {
                shell.engine.set_stirring_speed(speed);
            });
        }
    })?;
    listen(doc, "simmer-range", "input", |event| {
        if let Some(speed) = range_value(&event) {
            with_shell(|shell, now| {
                shell.engine.set_simmer_speed(speed, now);
            });
        }
    })?;

    attach_drag_and_drop(doc)
}

fn attach_drag_and_drop(doc: &Document) -> StoryResult<()> {
    for ingredient in Ingredient::ALL {
        listen(doc, ingredient.id(), "dragstart", move |event| {
            if let Some(transfer) = event
                .dyn_ref::<DragEvent>()
                .and_then(DragEvent::data_transfer)
            {
                let _ = transfer.set_data("text/plain", ingredient.id());
            }
        })?;
    }

    let zone_id = DROP_ZONE.id();
    let zone_doc = doc.clone();
    listen(doc, zone_id, "dragover", move |event| {
        event.prevent_default();
        if let Some(zone) = zone_doc.get_element_by_id(zone_id) {
            let _ = zone.class_list().add_1("drag-over");
        }
    })?;
    let zone_doc = doc.clone();
    listen(doc, zone_id, "dragleave", move |_| {
        if let Some(zone) = zone_doc.get_element_by_id(zone_id) {
            let _ = zone.class_list().remove_1("drag-over");
        }
    })?;
    let zone_doc = doc.clone();
    listen(doc, zone_id, "drop", move |event| {
        event.prevent_default();
        if let Some(zone) = zone_doc.get_element_by_id(zone_id) {
            let _ = zone.class_list().remove_1("drag-over");
        }
        let payload = event
            .dyn_ref::<DragEvent>()
            .and_then(DragEvent::data_transfer)
            .and_then(|transfer| transfer.get_data("text/plain").ok());
        let Some(ingredient) = payload.as_deref().and_then(Ingredient::from_id) else {
            return;
        };
        with_shell(|shell, now| {
            shell.engine.drop_ingredient(ingredient, now, &shell.surface);
        });
    })?;
    Ok(())
}
