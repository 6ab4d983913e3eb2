// Property tests for the rules that must hold whatever order or values the
// player throws at the controllers.

use collab_kitchen::engine::Outbox;
use collab_kitchen::soup::{intensity, tick_interval_ms};
use collab_kitchen::{
    FeedbackTiming, HeatLevel, Ingredient, RecipeGame, RecipeState, SoupSimulation, SoupStep,
};
use proptest::prelude::*;

fn recipe_at(target: RecipeState) -> (RecipeGame, Outbox) {
    let mut game = RecipeGame::new();
    let mut outbox = Outbox::default();
    let path = [
        (RecipeState::Initial, None),
        (RecipeState::DragEggs, Some(Ingredient::Eggs)),
        (RecipeState::SunnySideUp, None),
        (RecipeState::DragMilk, Some(Ingredient::Milk)),
        (RecipeState::ScrambledEggs, None),
    ];
    for (state, drop) in path {
        if game.state() == target {
            break;
        }
        assert_eq!(game.state(), state);
        match drop {
            Some(ingredient) => game.on_drop(ingredient, &mut outbox),
            None => game.next(&mut outbox),
        };
    }
    if game.state() != target {
        game.next(&mut outbox);
    }
    assert_eq!(game.state(), target);
    (game, outbox)
}

fn heat() -> impl Strategy<Value = HeatLevel> {
    prop::sample::select(HeatLevel::ALL.to_vec())
}

fn simulation_at_all_controls(speed: i32) -> SoupSimulation {
    let mut soup = SoupSimulation::new(120, FeedbackTiming::Previous);
    for _ in 0..3 {
        soup.advance(0.0);
    }
    soup.set_simmer_speed(speed, 0.0);
    soup.advance(0.0);
    assert_eq!(soup.step(), SoupStep::AllControls);
    soup
}

proptest! {
    #[test]
    fn tomato_and_spinach_in_any_order(order in prop::sample::subsequence(
        vec![Ingredient::Tomato, Ingredient::Spinach, Ingredient::Tomato, Ingredient::Spinach],
        2..=4,
    )) {
        let (mut game, mut outbox) = recipe_at(RecipeState::DragTomatoSpinach);
        for ingredient in &order {
            game.on_drop(*ingredient, &mut outbox);
        }
        let both = order.contains(&Ingredient::Tomato) && order.contains(&Ingredient::Spinach);
        let expected = if both {
            RecipeState::ColorfulScrambled
        } else {
            RecipeState::DragTomatoSpinach
        };
        prop_assert_eq!(game.state(), expected);
    }

    #[test]
    fn wrong_ingredients_never_move_the_recipe(
        drops in prop::collection::vec(prop::sample::select(Ingredient::ALL.to_vec()), 0..12),
    ) {
        let (mut game, mut outbox) = recipe_at(RecipeState::DragMilk);
        for ingredient in drops.into_iter().filter(|i| *i != Ingredient::Milk) {
            prop_assert!(!game.on_drop(ingredient, &mut outbox).is_applied());
            prop_assert_eq!(game.state(), RecipeState::DragMilk);
        }
        prop_assert!(outbox.is_empty());
    }

    #[test]
    fn intensity_stays_on_the_meter(
        stirring in 0u8..=100,
        level in heat(),
        remaining in 0u32..=120,
    ) {
        let value = intensity(stirring, level, remaining);
        prop_assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn faster_simmer_never_counts_slower(
        a in 1i32..=100,
        b in 1i32..=100,
        elapsed in 0u32..20_000,
    ) {
        let (slow, fast) = if a <= b { (a, b) } else { (b, a) };
        let mut slow_soup = simulation_at_all_controls(slow);
        let mut fast_soup = simulation_at_all_controls(fast);
        slow_soup.tick(f64::from(elapsed));
        fast_soup.tick(f64::from(elapsed));
        prop_assert!(fast_soup.remaining_s() <= slow_soup.remaining_s());
    }

    #[test]
    fn out_of_range_speeds_are_clamped(speed in any::<i32>()) {
        let mut soup = SoupSimulation::new(120, FeedbackTiming::Current);
        soup.advance(0.0);
        soup.set_stirring_speed(speed);
        prop_assert!(soup.stirring_speed() <= 100);
        prop_assert!((0.0..=100.0).contains(&soup.intensity()));
    }
}

#[test]
fn paused_simmer_holds_the_clock() {
    let mut soup = simulation_at_all_controls(0);
    soup.tick(60_000.0);
    assert_eq!(soup.remaining_s(), 120);
    assert_eq!(tick_interval_ms(0), None);
}
