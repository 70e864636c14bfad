//! End-to-end generation properties through the public API.

use std::collections::HashSet;

use zebra_core::{BinaryOp, Category, CategorySet, Clue, Grid, TargetFact};
use zebra_gen::{GenerateConfig, Seed, clue_count_bounds, generate_puzzle};
use zebra_solver::apply;

fn categories() -> Vec<Category> {
    vec![
        Category::nominal("name", ["Alice", "Bob", "Charlie"]),
        Category::nominal("snack", ["Chips", "Popcorn", "Candy"]),
        Category::ordinal("age", [20, 30, 40]),
    ]
}

fn target() -> TargetFact {
    TargetFact::new("name", "Alice", "snack")
}

/// Replays the proof chain on a blank grid and checks the result matches
/// the puzzle's solution.
fn assert_replay_solves(puzzle: &zebra_core::Puzzle) {
    let cats = CategorySet::new(puzzle.categories.clone()).unwrap();
    let mut grid = Grid::new(puzzle.categories.clone()).unwrap();
    for step in &puzzle.proof {
        let deductions = apply(&mut grid, &step.clue);
        assert_eq!(deductions, step.deductions, "replay diverged: {:?}", step.clue);
    }
    assert!(grid.is_solved());
    for entity in 0..cats.k() {
        let base = cats.label(0, entity);
        for c in 1..cats.len() {
            let value = cats.label(c, puzzle.solution.value_of(c, entity));
            assert!(
                grid.is_possible(&cats.category(0).id, base, &cats.category(c).id, value),
                "replayed grid disagrees with the recorded solution"
            );
        }
    }
}

#[test]
fn trivial_three_by_three_generates_and_solves() {
    let puzzle = generate_puzzle(categories(), Some(target()), GenerateConfig::seeded(1234))
        .unwrap();
    assert!(
        (3..=9).contains(&puzzle.clues.len()),
        "unexpected clue count {}",
        puzzle.clues.len()
    );
    assert_replay_solves(&puzzle);
}

#[test]
fn generation_is_deterministic_per_seed() {
    let a = generate_puzzle(categories(), Some(target()), GenerateConfig::seeded(42)).unwrap();
    let b = generate_puzzle(categories(), Some(target()), GenerateConfig::seeded(42)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn textual_seeds_hash_deterministically() {
    let config = || GenerateConfig {
        seed: Some(Seed::Text("zebra".to_owned())),
        ..GenerateConfig::default()
    };
    let a = generate_puzzle(categories(), Some(target()), config()).unwrap();
    let b = generate_puzzle(categories(), Some(target()), config()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn every_clue_is_truthful_against_the_solution() {
    let puzzle = generate_puzzle(categories(), Some(target()), GenerateConfig::seeded(7)).unwrap();
    let cats = CategorySet::new(puzzle.categories.clone()).unwrap();
    for clue in &puzzle.clues {
        assert!(clue.holds(&cats, &puzzle.solution), "untruthful: {clue:?}");
    }
}

#[test]
fn no_clue_states_the_target_fact_directly() {
    for seed in 0..10u32 {
        let puzzle =
            generate_puzzle(categories(), Some(target()), GenerateConfig::seeded(seed)).unwrap();
        let cats = CategorySet::new(puzzle.categories.clone()).unwrap();
        let answer = puzzle
            .solution
            .answer(&cats, 0, 0, cats.index_of("snack").unwrap());
        for clue in &puzzle.clues {
            if let Clue::Binary {
                op: BinaryOp::Is,
                lhs,
                rhs,
            } = clue
            {
                let states_target = (lhs.cat == "name"
                    && lhs.value == "Alice".into()
                    && rhs.cat == "snack"
                    && rhs.value == *answer)
                    || (rhs.cat == "name"
                        && rhs.value == "Alice".into()
                        && lhs.cat == "snack"
                        && lhs.value == *answer);
                assert!(!states_target, "direct target clue leaked: {clue:?}");
            }
        }
    }
}

#[test]
fn chain_clues_and_clue_set_agree() {
    let puzzle = generate_puzzle(categories(), Some(target()), GenerateConfig::seeded(11)).unwrap();
    let from_chain: Vec<_> = puzzle.proof.iter().map(|s| s.clue.clone()).collect();
    assert_eq!(puzzle.clues, from_chain);
}

#[test]
fn exact_clue_count_is_honored() {
    let config = GenerateConfig {
        target_clue_count: Some(4),
        ..GenerateConfig::seeded(1234)
    };
    let puzzle = generate_puzzle(categories(), Some(target()), config).unwrap();
    assert_eq!(puzzle.clues.len(), 4);
    assert_replay_solves(&puzzle);
}

#[test]
fn impossible_exact_count_fails_within_the_deadline() {
    let config = GenerateConfig {
        target_clue_count: Some(100),
        timeout_ms: Some(300),
        ..GenerateConfig::seeded(1)
    };
    let started = std::time::Instant::now();
    let err = generate_puzzle(categories(), Some(target()), config).unwrap_err();
    assert_eq!(err.to_string(), "Could not generate puzzle");
    // Deadline plus slack for the in-flight candidate evaluation.
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}

#[test]
fn candidate_sampling_still_generates() {
    let config = GenerateConfig {
        max_candidates: Some(8),
        ..GenerateConfig::seeded(99)
    };
    let puzzle = generate_puzzle(categories(), Some(target()), config).unwrap();
    assert_replay_solves(&puzzle);
}

#[test]
fn variant_mix_exceeds_two_on_average() {
    let mut total_variants = 0usize;
    let runs = 20u32;
    for seed in 0..runs {
        let puzzle =
            generate_puzzle(categories(), Some(target()), GenerateConfig::seeded(seed)).unwrap();
        let kinds: HashSet<_> = puzzle.clues.iter().map(Clue::kind).collect();
        total_variants += kinds.len();
    }
    assert!(
        total_variants as f64 / f64::from(runs) > 2.0,
        "average distinct variants {} too low",
        total_variants as f64 / f64::from(runs)
    );
}

#[test]
fn cross_ordinal_puzzles_generate_with_two_ordinal_categories() {
    let cats = vec![
        Category::nominal("name", ["Alice", "Bob", "Charlie"]),
        Category::ordinal("age", [20, 30, 40]),
        Category::ordinal("height", [150, 160, 170]),
    ];
    let puzzle = generate_puzzle(
        cats,
        Some(TargetFact::new("name", "Bob", "height")),
        GenerateConfig::seeded(5),
    )
    .unwrap();
    assert_replay_solves(&puzzle);
}

#[test]
fn bounds_estimator_reports_a_sane_range() {
    let bounds = clue_count_bounds(categories(), Some(target())).unwrap();
    assert!(bounds.min >= 1);
    assert!(bounds.min <= bounds.max);
}

#[test]
fn bounds_estimator_validates_the_target() {
    let err = clue_count_bounds(categories(), Some(TargetFact::new("name", "Alice", "name")))
        .unwrap_err();
    assert!(matches!(
        err,
        zebra_core::ConfigurationError::TargetCategoriesEqual
    ));
}
