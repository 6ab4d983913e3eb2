//! DOM construction for every scene and panel, plus the [`Surface`] the
//! engine measures the page through.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::chat::Sender;
use crate::error::{StoryError, StoryResult};
use crate::motion::{Rect, Surface, Target};
use crate::quiz::QUIZ_OPTIONS;
use crate::recipe::Ingredient;
use crate::scene::{BYLINE, INTRO1_TEXT, INTRO2_TEXT, TITLE};
use crate::soup::HeatLevel;

pub const ROOT_ID: &str = "collab-kitchen-root";
pub const BUBBLE_COUNT: usize = 6;
pub const VEGETABLE_COUNT: usize = 4;

const SCRAMBLED_EGGS_URL: &str = "https://i.imgur.com/dazghvv.png";

const STYLE: &str = r#"
#collab-kitchen-root { position: fixed; inset: 0; overflow: hidden; font-family: "Patrick Hand", cursive; background: #fdf1dc; color: #78350f; }
#collab-kitchen-root .scene, #collab-kitchen-root .panel { position: absolute; inset: 0; display: flex; flex-direction: column; align-items: center; justify-content: center; gap: 1rem; will-change: transform; }
#collab-kitchen-root button { font-family: inherit; font-size: 1.4rem; border: none; border-radius: 999px; padding: .6rem 2rem; background: #f97316; color: #fff; cursor: pointer; }
#collab-kitchen-root button[disabled] { pointer-events: none; }
#collab-kitchen-root .hidden { display: none !important; }
#kitchen-title { font-size: 3rem; text-align: center; }
#kitchen-title small { display: block; font-size: 1.2rem; }
#click-prompts { display: flex; gap: 40vw; }
#countertop { position: relative; width: 70vw; height: 30vh; background: #b45309; border-radius: 1rem; }
#knife { position: absolute; left: 10%; top: 20%; width: 30%; height: 8%; background: #9ca3af; }
#vegetable { position: absolute; right: 15%; top: 25%; width: 15%; aspect-ratio: 1; border-radius: 50%; background: #16a34a; }
#reset-btn { position: fixed; top: 1rem; right: 1rem; z-index: 10; }
.chat-line { display: flex; align-items: center; gap: .5rem; max-width: 40rem; }
.chat-line img { width: 3rem; height: 3rem; border-radius: 50%; }
.chat-line.mom { flex-direction: row-reverse; }
.chat-line p { background: #fff; border-radius: 1rem; padding: .5rem 1rem; }
#ingredient-shelf { display: flex; gap: 1rem; }
.ingredient { width: 6rem; height: 6rem; }
.ingredient img { width: 100%; height: 100%; object-fit: contain; pointer-events: none; }
.ingredient[draggable="true"] { cursor: grab; outline: 3px dashed #f97316; border-radius: 1rem; }
#bread-ingredient { background: #d97706; border-radius: 1rem; }
#drop-zone { width: 14rem; height: 14rem; border-radius: 50%; border: 4px dashed #b45309; }
#drop-zone.drag-over { background: rgba(249, 115, 22, .15); }
#recipe-dish { width: 10rem; }
#pantry { position: absolute; right: 2rem; top: 40%; }
#pantry-eggs { width: 5rem; }
#quiz-options { display: flex; flex-direction: column; gap: 1rem; width: min(36rem, 90vw); }
#quiz-options button { background: #fff; color: #78350f; }
#quiz-options button.correct { background: #22c55e; color: #fff; }
#quiz-options button.incorrect { background: #ef4444; color: #fff; }
#combo-stage { position: relative; height: 10rem; width: 24rem; }
#combo-stage img { position: absolute; width: 7rem; height: 7rem; object-fit: contain; top: 1.5rem; }
#combo-egg { left: 15%; }
#combo-milk { right: 15%; }
#combo-scrambled { left: calc(50% - 3.5rem); }
#soup-pot { position: relative; width: 18rem; height: 12rem; border-radius: 50%; background: #ea580c; overflow: hidden; }
.soup-bubble { position: absolute; bottom: 20%; width: .8rem; height: .8rem; border-radius: 50%; background: rgba(255, 255, 255, .6); }
.soup-vegetable { position: absolute; top: 40%; width: 1.5rem; height: 1rem; border-radius: .3rem; background: #65a30d; }
#soup-steam { position: absolute; top: -2rem; width: 100%; text-align: center; opacity: .6; }
#spoon { position: absolute; left: 45%; top: 10%; width: .8rem; height: 8rem; background: #a8a29e; transform-origin: 50% 100%; }
#intensity-meter { width: 20rem; height: 1.2rem; background: #e5e7eb; border-radius: 999px; overflow: hidden; }
#intensity-fill { height: 100%; background: linear-gradient(90deg, #3b82f6, #22c55e, #ef4444); }
#heat-control button.active { background: #b91c1c; }
"#;

/// The page as the engine sees it.
pub struct DomSurface {
    doc: Document,
}

impl DomSurface {
    pub fn new(doc: Document) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }
}

impl Surface for DomSurface {
    fn has_handle(&self, target: Target) -> bool {
        self.doc.get_element_by_id(target.id()).is_some()
    }

    fn measure(&self, target: Target) -> Option<Rect> {
        let rect = self.doc.get_element_by_id(target.id())?.get_bounding_client_rect();
        Some(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()))
    }
}

pub fn html_element(doc: &Document, id: &str) -> Option<HtmlElement> {
    doc.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
}

fn node(
    doc: &Document,
    parent: &Element,
    tag: &str,
    id: &str,
    class: &str,
) -> StoryResult<Element> {
    let el = doc.create_element(tag)?;
    if !id.is_empty() {
        el.set_id(id);
    }
    if !class.is_empty() {
        el.set_class_name(class);
    }
    parent.append_child(&el)?;
    Ok(el)
}

fn text(
    doc: &Document,
    parent: &Element,
    tag: &str,
    id: &str,
    content: &str,
) -> StoryResult<Element> {
    let el = node(doc, parent, tag, id, "")?;
    el.set_text_content(Some(content));
    Ok(el)
}

fn button(doc: &Document, parent: &Element, id: &str, label: &str) -> StoryResult<Element> {
    let el = text(doc, parent, "button", id, label)?;
    el.set_attribute("type", "button")?;
    Ok(el)
}

fn image(
    doc: &Document,
    parent: &Element,
    id: &str,
    src: &str,
    alt: &str,
) -> StoryResult<Element> {
    let el = node(doc, parent, "img", id, "")?;
    el.set_attribute("src", src)?;
    el.set_attribute("alt", alt)?;
    Ok(el)
}

fn range(doc: &Document, parent: &Element, id: &str, value: u8) -> StoryResult<Element> {
    let el = node(doc, parent, "input", id, "")?;
    el.set_attribute("type", "range")?;
    el.set_attribute("min", "0")?;
    el.set_attribute("max", "100")?;
    el.set_attribute("value", &value.to_string())?;
    Ok(el)
}

/// Build the whole story under `body`. Every scene and panel exists from the
/// start; the stage decides which are visible.
pub fn build(doc: &Document) -> StoryResult<()> {
    let body = doc.body().ok_or(StoryError::NoBody)?;
    let head = doc.head().ok_or_else(|| StoryError::Dom("no document head".into()))?;
    let style = doc.create_element("style")?;
    style.set_text_content(Some(STYLE));
    head.append_child(&style)?;

    let root = doc.create_element("div")?;
    root.set_id(ROOT_ID);
    body.append_child(&root)?;

    build_kitchen(doc, &root)?;
    build_intro(doc, &root, "scene-intro1", INTRO1_TEXT, "intro1-next")?;
    build_intro(doc, &root, "scene-intro2", INTRO2_TEXT, "intro2-next")?;
    build_chat(doc, &root)?;

    let board = node(doc, &root, "section", "scene-cutting-board", "scene")?;
    build_recipe(doc, &board)?;
    build_quiz(doc, &board)?;
    build_soup(doc, &board)?;

    button(doc, &root, "reset-btn", "reset")?.set_attribute("aria-label", "Reset to landing page")?;
    Ok(())
}

fn build_kitchen(doc: &Document, root: &Element) -> StoryResult<()> {
    let scene = node(doc, root, "section", "scene-kitchen", "scene")?;
    let title = text(doc, &scene, "h1", "kitchen-title", TITLE)?;
    text(doc, &title, "small", "", BYLINE)?;
    let prompts = node(doc, &scene, "div", "click-prompts", "")?;
    prompts.set_attribute("aria-hidden", "true")?;
    text(doc, &prompts, "p", "click-prompt-left", "click!")?;
    text(doc, &prompts, "p", "click-prompt-right", "click!")?;
    let counter = node(doc, &scene, "div", "countertop", "")?;
    node(doc, &counter, "div", "knife", "")?;
    node(doc, &counter, "div", "vegetable", "")?;
    button(doc, &scene, "lets-eat-btn", "let's eat!")?;
    Ok(())
}

fn build_intro(
    doc: &Document,
    root: &Element,
    id: &str,
    copy: &str,
    next_id: &str,
) -> StoryResult<()> {
    let scene = node(doc, root, "section", id, "scene")?;
    text(doc, &scene, "p", "", copy)?.set_class_name("intro-copy");
    button(doc, &scene, next_id, "Next")?;
    Ok(())
}

fn build_chat(doc: &Document, root: &Element) -> StoryResult<()> {
    let scene = node(doc, root, "section", "scene-chat", "scene")?;
    let header = node(doc, &scene, "div", "chat-header", "")?;
    for sender in [Sender::Boy, Sender::Mom] {
        image(doc, &header, "", sender.avatar_url(), sender.display_name())?;
    }
    node(doc, &scene, "div", "chat-thread", "")?;
    text(doc, &scene, "p", "chat-typing", "…")?;
    button(doc, &scene, "chat-next", "Next")?;
    Ok(())
}

/// One line of the chat thread.
pub fn chat_line(
    doc: &Document,
    thread: &Element,
    sender: Sender,
    content: &str,
) -> StoryResult<()> {
    let class = match sender {
        Sender::Boy => "chat-line boy",
        Sender::Mom => "chat-line mom",
    };
    let line = node(doc, thread, "div", "", class)?;
    image(doc, &line, "", sender.avatar_url(), sender.display_name())?;
    let bubble = node(doc, &line, "div", "", "")?;
    text(doc, &bubble, "strong", "", sender.display_name())?;
    text(doc, &bubble, "p", "", content)?;
    Ok(())
}

fn build_recipe(doc: &Document, board: &Element) -> StoryResult<()> {
    let panel = node(doc, board, "div", "recipe-panel", "panel")?;
    text(doc, &panel, "p", "recipe-narration", "")?;
    let bubble = node(doc, &panel, "div", "recipe-bubble", "")?;
    image(doc, &bubble, "recipe-dish", "", "Recipe")?;
    node(doc, &panel, "div", "drop-zone", "")?;
    let shelf = node(doc, &panel, "div", "ingredient-shelf", "")?;
    for ingredient in Ingredient::ALL {
        let item = node(doc, &shelf, "div", ingredient.id(), "ingredient")?;
        item.set_attribute("draggable", "false")?;
        match ingredient.image_url() {
            Some(src) => {
                image(doc, &item, "", src, ingredient.label())?;
            }
            None => item.set_text_content(Some(ingredient.label())),
        }
    }
    // Spare eggs in the pantry corner, gone once the eggs are used.
    let pantry = node(doc, &panel, "div", "pantry", "")?;
    image(doc, &pantry, "pantry-eggs", Ingredient::Eggs.image_url().unwrap_or_default(), "Eggs")?;
    button(doc, &panel, "recipe-next", "Next")?;
    Ok(())
}

fn build_quiz(doc: &Document, board: &Element) -> StoryResult<()> {
    let panel = node(doc, board, "div", "quiz-panel", "panel")?;
    image(doc, &panel, "quiz-mom", Sender::Mom.avatar_url(), Sender::Mom.display_name())?;
    text(doc, &panel, "p", "quiz-speech", "")?;
    let options = node(doc, &panel, "div", "quiz-options", "")?;
    for (index, option) in QUIZ_OPTIONS.iter().enumerate() {
        button(doc, &options, &format!("quiz-option-{index}"), option)?;
    }
    let content = node(doc, &panel, "div", "quiz-content", "")?;
    text(doc, &content, "h2", "quiz-heading", "")?;
    text(doc, &content, "p", "quiz-body", "")?;
    let combo = node(doc, &content, "div", "combo-stage", "")?;
    image(doc, &combo, "combo-egg", Ingredient::Eggs.image_url().unwrap_or_default(), "Egg")?;
    image(doc, &combo, "combo-milk", Ingredient::Milk.image_url().unwrap_or_default(), "Milk")?;
    image(doc, &combo, "combo-scrambled", SCRAMBLED_EGGS_URL, "Scrambled Eggs")?;
    button(doc, &content, "explanation-next", "Next")?;
    Ok(())
}

fn build_soup(doc: &Document, board: &Element) -> StoryResult<()> {
    let panel = node(doc, board, "div", "soup-panel", "panel")?;
    text(doc, &panel, "h2", "soup-heading", "Time to Cook a Soup!")?;
    text(doc, &panel, "p", "soup-speech", "")?;

    let pot = node(doc, &panel, "div", "soup-pot", "")?;
    let bubbles = node(doc, &pot, "div", "soup-bubbles", "")?;
    for i in 0..BUBBLE_COUNT {
        let bubble = node(doc, &bubbles, "span", &format!("soup-bubble-{i}"), "soup-bubble")?;
        bubble.set_attribute("style", &format!("left: {}%", 10 + i * 14))?;
    }
    let veg = node(doc, &pot, "div", "soup-vegetables", "")?;
    for i in 0..VEGETABLE_COUNT {
        let piece = node(doc, &veg, "span", &format!("soup-vegetable-{i}"), "soup-vegetable")?;
        piece.set_attribute("style", &format!("left: {}%", 15 + i * 20))?;
    }
    text(doc, &pot, "div", "soup-steam", "~ ~ ~")?;
    node(doc, &pot, "div", "spoon", "")?;

    let controls = node(doc, &panel, "div", "soup-controls", "")?;
    let stirring = node(doc, &controls, "label", "stirring-control", "")?;
    text(doc, &stirring, "span", "", "Stirring speed")?;
    range(doc, &stirring, "stirring-range", 50)?;

    let heat = node(doc, &controls, "div", "heat-control", "")?;
    text(doc, &heat, "span", "", "Heat")?;
    for level in HeatLevel::ALL {
        let id = format!("heat-{}", level.label().to_ascii_lowercase());
        button(doc, &heat, &id, level.label())?;
    }

    let simmer = node(doc, &controls, "label", "simmer-control", "")?;
    text(doc, &simmer, "span", "simmer-timer", "")?;
    range(doc, &simmer, "simmer-range", 50)?;

    let meter_box = node(doc, &controls, "div", "intensity-control", "")?;
    text(doc, &meter_box, "span", "", "Intensity Meter")?;
    let meter = node(doc, &meter_box, "div", "intensity-meter", "")?;
    node(doc, &meter, "div", "intensity-fill", "")?;
    text(doc, &meter_box, "span", "intensity-value", "")?;

    button(doc, &panel, "soup-next", "Next")?;
    Ok(())
}
