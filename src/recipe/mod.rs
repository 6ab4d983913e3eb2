//! Drag-and-drop recipe game on the cutting board.
//!
//! Stages advance either on "Next" or when the stage's ingredients have been
//! dropped into the zone:
//!
//! ```text
//! initial -Next-> drag-eggs -eggs-> sunny-side-up -Next-> drag-milk -milk->
//! scrambled-eggs -Next-> drag-tomato-spinach -tomato+spinach-> colorful-scrambled
//! -Next-> drag-bread -bread-> french-toast -Next-> final -Next-> quiz
//! ```
//!
//! Both kinds of edge live in the tables below; nothing else moves the state.

pub mod placement;

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::Outcome;
use crate::engine::{Handoff, Outbox};
use crate::motion::{Easing, Rect, Stage, Target};

pub use placement::{CORRECTION_MS, SNAP_MS};

pub const DROP_ZONE: Target = Target("drop-zone");
pub const RECIPE_PANEL: Target = Target("recipe-panel");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ingredient {
    Eggs,
    Milk,
    Tomato,
    Spinach,
    Bread,
}

impl Ingredient {
    pub const ALL: [Ingredient; 5] = [
        Ingredient::Eggs,
        Ingredient::Milk,
        Ingredient::Tomato,
        Ingredient::Spinach,
        Ingredient::Bread,
    ];

    /// Element id, also the drag payload.
    pub fn id(self) -> &'static str {
        match self {
            Ingredient::Eggs => "eggs-ingredient",
            Ingredient::Milk => "milk-ingredient",
            Ingredient::Tomato => "tomato-ingredient",
            Ingredient::Spinach => "spinach-ingredient",
            Ingredient::Bread => "bread-ingredient",
        }
    }

    pub fn from_id(id: &str) -> Option<Ingredient> {
        Self::ALL.into_iter().find(|i| i.id() == id)
    }

    pub fn target(self) -> Target {
        Target(self.id())
    }

    pub fn label(self) -> &'static str {
        match self {
            Ingredient::Eggs => "Eggs",
            Ingredient::Milk => "Milk",
            Ingredient::Tomato => "Tomato",
            Ingredient::Spinach => "Spinach",
            Ingredient::Bread => "Bread",
        }
    }

    /// Bread is drawn as a plain block, everything else has a picture.
    pub fn image_url(self) -> Option<&'static str> {
        match self {
            Ingredient::Eggs => Some("https://i.imgur.com/V8GJcsc.png"),
            Ingredient::Milk => Some("https://i.imgur.com/Z0nOFR2.png"),
            Ingredient::Tomato => Some("https://i.imgur.com/FFkdVzo.png"),
            Ingredient::Spinach => Some("https://i.imgur.com/Pt0tRNK.png"),
            Ingredient::Bread => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecipeState {
    Initial,
    DragEggs,
    SunnySideUp,
    DragMilk,
    ScrambledEggs,
    DragTomatoSpinach,
    ColorfulScrambled,
    DragBread,
    FrenchToast,
    Final,
    Quiz,
}

/// Edges taken on "Next".
const NEXT_EDGES: &[(RecipeState, RecipeState)] = &[
    (RecipeState::Initial, RecipeState::DragEggs),
    (RecipeState::SunnySideUp, RecipeState::DragMilk),
    (RecipeState::ScrambledEggs, RecipeState::DragTomatoSpinach),
    (RecipeState::ColorfulScrambled, RecipeState::DragBread),
    (RecipeState::FrenchToast, RecipeState::Final),
    (RecipeState::Final, RecipeState::Quiz),
];

/// Edges taken once every listed ingredient has been dropped in this stage.
const DROP_GATES: &[(RecipeState, &[Ingredient], RecipeState)] = &[
    (RecipeState::DragEggs, &[Ingredient::Eggs], RecipeState::SunnySideUp),
    (RecipeState::DragMilk, &[Ingredient::Milk], RecipeState::ScrambledEggs),
    (
        RecipeState::DragTomatoSpinach,
        &[Ingredient::Tomato, Ingredient::Spinach],
        RecipeState::ColorfulScrambled,
    ),
    (RecipeState::DragBread, &[Ingredient::Bread], RecipeState::FrenchToast),
];

impl RecipeState {
    pub fn after_next(self) -> Option<RecipeState> {
        NEXT_EDGES
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| *to)
    }

    /// Required ingredients and destination, for drag stages.
    pub fn drop_gate(self) -> Option<(&'static [Ingredient], RecipeState)> {
        DROP_GATES
            .iter()
            .find(|(from, _, _)| *from == self)
            .map(|(_, needs, to)| (*needs, *to))
    }

    /// Exactly the ingredients that accept drag input in this state.
    pub fn draggable(self) -> &'static [Ingredient] {
        self.drop_gate().map(|(needs, _)| needs).unwrap_or(&[])
    }

    pub fn accepts_next(self) -> bool {
        self.after_next().is_some()
    }

    pub fn narration(self) -> &'static str {
        match self {
            RecipeState::Initial => "So many ingredients.",
            RecipeState::DragEggs => "Try dragging the eggs to the center.",
            RecipeState::SunnySideUp => {
                "Sunny-side-up egg! Amazing, but so ordinary. Can we spice things up?"
            }
            RecipeState::DragMilk => "Try dragging milk to the eggs to create something new!",
            RecipeState::ScrambledEggs => {
                "Wow, scrambled eggs! Who knew more ingredients create cool recipes? Let's try more."
            }
            RecipeState::DragTomatoSpinach => {
                "Let's add tomato and spinach to our eggs. Drag them to the center!"
            }
            RecipeState::ColorfulScrambled => {
                "Wow wow! So colorful and innovative! Let's try one more."
            }
            RecipeState::DragBread => "Let's try adding bread. Drag it to the center!",
            RecipeState::FrenchToast => {
                "Something completely new! Who would have thought all this was possible if we added new ingredients into the mix?"
            }
            RecipeState::Final => {
                "Just like cooking, collaboration brings together different 'ingredients' (ideas and skills) to create something better than what any one person could make alone!"
            }
            RecipeState::Quiz => "",
        }
    }

    /// Dish shown in the recipe bubble.
    pub fn dish_image(self) -> Option<&'static str> {
        match self {
            RecipeState::SunnySideUp => Some("https://i.imgur.com/8xMexev.jpeg"),
            RecipeState::ScrambledEggs => Some("https://i.imgur.com/dazghvv.png"),
            RecipeState::ColorfulScrambled => Some("https://i.imgur.com/1xyXsUX.png"),
            RecipeState::FrenchToast => Some("https://i.imgur.com/KxFzw32.png"),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RecipeState::Initial => "initial",
            RecipeState::DragEggs => "drag-eggs",
            RecipeState::SunnySideUp => "sunny-side-up",
            RecipeState::DragMilk => "drag-milk",
            RecipeState::ScrambledEggs => "scrambled-eggs",
            RecipeState::DragTomatoSpinach => "drag-tomato-spinach",
            RecipeState::ColorfulScrambled => "colorful-scrambled",
            RecipeState::DragBread => "drag-bread",
            RecipeState::FrenchToast => "french-toast",
            RecipeState::Final => "final",
            RecipeState::Quiz => "quiz",
        }
    }
}

/// A dropped ingredient waiting for its post-snap containment check.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingCheck {
    ingredient: Ingredient,
    check_at: f64,
}

#[derive(Debug)]
pub struct RecipeGame {
    state: RecipeState,
    dropped: BTreeSet<Ingredient>,
    placed: Vec<Ingredient>,
    eggs_on_shelf: bool,
    pending_checks: Vec<PendingCheck>,
    handed_off: bool,
}

impl Default for RecipeGame {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeGame {
    pub fn new() -> Self {
        Self {
            state: RecipeState::Initial,
            dropped: BTreeSet::new(),
            placed: Vec::new(),
            eggs_on_shelf: true,
            pending_checks: Vec::new(),
            handed_off: false,
        }
    }

    pub fn state(&self) -> RecipeState {
        self.state
    }

    pub fn dropped(&self) -> &BTreeSet<Ingredient> {
        &self.dropped
    }

    /// Ingredients sitting in the drop zone, in drop order.
    pub fn placed(&self) -> &[Ingredient] {
        &self.placed
    }

    pub fn eggs_on_shelf(&self) -> bool {
        self.eggs_on_shelf
    }

    pub fn draggable(&self) -> &'static [Ingredient] {
        self.state.draggable()
    }

    pub fn is_draggable(&self, ingredient: Ingredient) -> bool {
        self.draggable().contains(&ingredient)
    }

    pub fn shows_next(&self) -> bool {
        self.state.accepts_next()
    }

    pub fn shows_dish(&self) -> bool {
        self.state.dish_image().is_some()
    }

    pub fn next(&mut self, outbox: &mut Outbox) -> Outcome {
        match self.state.after_next() {
            Some(to) => {
                self.enter(to, outbox);
                Outcome::Applied
            }
            None => {
                debug!(state = self.state.name(), "recipe next ignored");
                Outcome::Ignored
            }
        }
    }

    /// Accept a drop of `ingredient`. Only the current stage's ingredients
    /// count; anything else is ignored.
    pub fn on_drop(&mut self, ingredient: Ingredient, outbox: &mut Outbox) -> Outcome {
        let Some((needs, to)) = self.state.drop_gate() else {
            debug!(state = self.state.name(), ?ingredient, "drop outside a drag stage");
            return Outcome::Ignored;
        };
        if !needs.contains(&ingredient) {
            debug!(state = self.state.name(), ?ingredient, "drop of inert ingredient");
            return Outcome::Ignored;
        }
        self.dropped.insert(ingredient);
        if !self.placed.contains(&ingredient) {
            self.placed.push(ingredient);
        }
        if ingredient == Ingredient::Eggs {
            self.eggs_on_shelf = false;
        }
        if needs.iter().all(|need| self.dropped.contains(need)) {
            self.enter(to, outbox);
        }
        Outcome::Applied
    }

    /// Drop with visual feedback: the element is snapped toward the zone centre
    /// and re-checked once the snap tween lands.
    pub fn drop_with_snap(
        &mut self,
        ingredient: Ingredient,
        zone: Rect,
        element: Rect,
        stage: &mut Stage,
        now: f64,
        outbox: &mut Outbox,
    ) -> Outcome {
        let outcome = self.on_drop(ingredient, outbox);
        if outcome.is_applied() {
            let (dx, dy) = placement::snap_offset(&zone, &element);
            let target = ingredient.target();
            let current = stage.pose(target, now);
            stage.animate_to(
                target,
                current
                    .with_offset_px(current.dx_px + dx, current.dy_px + dy)
                    .with_scale(0.7)
                    .with_opacity(0.9),
                now,
                SNAP_MS,
                Easing::Linear,
            );
            self.pending_checks.retain(|c| c.ingredient != ingredient);
            self.pending_checks.push(PendingCheck {
                ingredient,
                check_at: now + SNAP_MS,
            });
        }
        outcome
    }

    /// Run containment checks that are due. `measure` reports where an element
    /// and the zone actually ended up.
    pub fn tick(&mut self, stage: &mut Stage, now: f64, measure: &dyn Fn(Target) -> Option<Rect>) {
        let (due, later): (Vec<PendingCheck>, Vec<PendingCheck>) =
            std::mem::take(&mut self.pending_checks)
                .into_iter()
                .partition(|c| now >= c.check_at);
        self.pending_checks = later;
        for check in due {
            let target = check.ingredient.target();
            let (Some(zone), Some(settled)) = (measure(DROP_ZONE), measure(target)) else {
                continue;
            };
            if let Some((dx, dy)) = placement::correction(&zone, &settled) {
                debug!(ingredient = ?check.ingredient, dx, dy, "correcting drop placement");
                let current = stage.pose(target, now);
                stage.animate_to(
                    target,
                    current.with_offset_px(current.dx_px + dx, current.dy_px + dy),
                    now,
                    CORRECTION_MS,
                    Easing::Linear,
                );
            }
        }
    }

    fn enter(&mut self, to: RecipeState, outbox: &mut Outbox) {
        info!(from = self.state.name(), to = to.name(), "recipe stage");
        self.state = to;
        self.dropped.clear();
        if to == RecipeState::Quiz && !self.handed_off {
            self.handed_off = true;
            outbox.post(Handoff::RecipeFinished);
        }
    }

    pub fn teardown(&mut self) {
        self.pending_checks.clear();
    }
}
