//! Puzzle generation: solution fabrication, clue selection, and the
//! exact-count search.
//!
//! The greedy engine clones the working grid for every candidate clue,
//! applies it through the solver, scores the result and commits the best
//! candidate to the real grid. The exact-count engine runs the same
//! evaluation inside a depth-first search with a wall-clock budget,
//! refusing any branch that would finish the grid before the requested
//! chain length.

use std::rc::Rc;
use std::time::{Duration, Instant};

use smallvec::SmallVec;
use zebra_core::{
    BinaryOp, Category, CategorySet, Clue, ClueKind, ConfigurationError, Grid, Item, ProofStep,
    Puzzle, Solution, TargetFact,
};

use crate::enumerate::enumerate_clues;
use crate::score::{ScoreMode, TARGET_AND_GRID_SOLVED, TARGET_SOLVED_EARLY, TargetRef, score_clue};
use crate::seed::{Mulberry32, seed_from_text, seed_from_time};

#[cfg(feature = "telemetry-tracing")]
use tracing::trace;

#[cfg(not(feature = "telemetry-tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

/// Safety cap on greedy selection rounds. Reaching it means the scorer
/// stopped finding progress, not a normal outcome.
const MAX_STEPS: usize = 100;

/// Wall-clock budget for the exact-count search when the caller gives
/// none.
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Greedy runs per scorer in the bounds estimator.
const BOUNDS_ITERATIONS: u32 = 10;

/// Seed material: either the integer itself or text to hash.
#[derive(Debug, Clone)]
pub enum Seed {
    Value(u32),
    Text(String),
}

/// Generation options. Every field has a workable default: unlimited
/// candidate evaluation, no exact clue count, a time-derived seed.
#[derive(Debug, Clone, Default)]
pub struct GenerateConfig {
    /// PRNG seed; time-derived when absent.
    pub seed: Option<Seed>,
    /// Candidates evaluated per greedy round; all of them when absent.
    pub max_candidates: Option<usize>,
    /// Requests exactly this many clues via the backtracking engine.
    pub target_clue_count: Option<usize>,
    /// Deadline for the backtracking engine.
    pub timeout_ms: Option<u64>,
    /// Restricts the clue forms the generator may use.
    pub allowed_clue_types: Option<Vec<ClueKind>>,
}

impl GenerateConfig {
    pub fn seeded(seed: u32) -> Self {
        Self {
            seed: Some(Seed::Value(seed)),
            ..Self::default()
        }
    }
}

/// Clue-count range reachable by the greedy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClueCountBounds {
    pub min: usize,
    pub max: usize,
}

/// Generates one puzzle over `categories`.
///
/// The target fact, when absent, is synthesized deterministically from
/// the seed. The returned puzzle's proof chain replays to the solved
/// grid, its clues are truthful against its solution, and no clue hands
/// the target fact over directly.
pub fn generate_puzzle(
    categories: Vec<Category>,
    target: Option<TargetFact>,
    config: GenerateConfig,
) -> Result<Puzzle, ConfigurationError> {
    if let Some(limit) = config.max_candidates
        && limit < 1
    {
        return Err(ConfigurationError::MaxCandidatesTooSmall);
    }

    let cats = Rc::new(CategorySet::new(categories)?);
    let allowed = allowed_kinds(&cats, config.allowed_clue_types.as_deref())?;

    let seed = resolve_seed(config.seed.as_ref());
    let mut rng = Mulberry32::new(seed);

    let solution = build_solution(&cats, &mut rng);
    let (target_ref, target_fact) = resolve_target(&cats, target, &mut rng)?;
    let pool = build_pool(&cats, &solution, &allowed, &target_ref);
    trace!(seed, pool = pool.len(), "gen.start");

    let proof = match config.target_clue_count {
        Some(count) => exact_chain(
            &cats,
            &target_ref,
            &pool,
            &mut rng,
            count,
            config.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        )?,
        None => greedy_chain(
            &cats,
            &target_ref,
            pool,
            &mut rng,
            config.max_candidates,
            ScoreMode::Quality,
        )?,
    };
    trace!(clues = proof.len(), "gen.accept");

    Ok(Puzzle {
        categories: cats.categories().to_vec(),
        clues: proof.iter().map(|step| step.clue.clone()).collect(),
        solution,
        proof,
        target: target_fact,
    })
}

/// Runs the greedy engine repeatedly with the most- and
/// fewest-deductions scorers and reports the clue-count range it
/// reached. Individual failed runs are skipped.
pub fn clue_count_bounds(
    categories: Vec<Category>,
    target: Option<TargetFact>,
) -> Result<ClueCountBounds, ConfigurationError> {
    let cats = Rc::new(CategorySet::new(categories)?);
    if let Some(fact) = &target {
        validate_target(&cats, fact)?;
    }

    let mut min: Option<usize> = None;
    let mut max: Option<usize> = None;
    for iteration in 0..BOUNDS_ITERATIONS {
        let mut rng = Mulberry32::new(iteration);
        let solution = build_solution(&cats, &mut rng);
        let Ok((target_ref, _)) = resolve_target(&cats, target.clone(), &mut rng) else {
            continue;
        };
        let pool = build_pool(&cats, &solution, &ClueKind::ALL, &target_ref);

        if let Ok(chain) = greedy_chain(
            &cats,
            &target_ref,
            pool.clone(),
            &mut rng,
            None,
            ScoreMode::MostDeductions,
        ) {
            min = Some(min.map_or(chain.len(), |m| m.min(chain.len())));
        }
        if let Ok(chain) = greedy_chain(
            &cats,
            &target_ref,
            pool,
            &mut rng,
            None,
            ScoreMode::FewestDeductions,
        ) {
            max = Some(max.map_or(chain.len(), |m| m.max(chain.len())));
        }
    }

    match (min, max) {
        (Some(min), Some(max)) => Ok(ClueCountBounds { min, max }),
        _ => Err(ConfigurationError::CouldNotGenerate),
    }
}

fn resolve_seed(seed: Option<&Seed>) -> u32 {
    match seed {
        Some(Seed::Value(value)) => *value,
        Some(Seed::Text(text)) => seed_from_text(text),
        None => seed_from_time(),
    }
}

/// The effective clue-kind set. An explicit constraint set is validated
/// against the categories; an absent one allows everything and lets the
/// enumerator emit whatever the categories support.
fn allowed_kinds(
    cats: &CategorySet,
    explicit: Option<&[ClueKind]>,
) -> Result<Vec<ClueKind>, ConfigurationError> {
    let Some(kinds) = explicit else {
        return Ok(ClueKind::ALL.to_vec());
    };
    let has = |kind: ClueKind| kinds.contains(&kind);
    let ords = cats.ordinal_indices();

    // At least one identity-resolving form must survive, or no clue set
    // can ever pin entities down.
    if !(has(ClueKind::Binary) || has(ClueKind::Ordinal) || has(ClueKind::CrossOrdinal)) {
        return Err(ConfigurationError::InvalidConstraints);
    }
    let ordinal_dependent = has(ClueKind::Ordinal)
        || has(ClueKind::Superlative)
        || has(ClueKind::Unary)
        || has(ClueKind::CrossOrdinal);
    if ordinal_dependent && ords.is_empty() {
        return Err(ConfigurationError::InvalidConstraints);
    }
    if has(ClueKind::Unary) {
        let mixed = ords.iter().any(|&o| {
            let parities: SmallVec<[bool; 8]> = cats.category(o)
                .values
                .iter()
                .filter_map(|v| v.as_int())
                .map(|n| n.rem_euclid(2) == 1)
                .collect();
            parities.contains(&true) && parities.contains(&false)
        });
        if !mixed {
            return Err(ConfigurationError::InvalidConstraints);
        }
    }
    if has(ClueKind::CrossOrdinal) && ords.len() < 2 {
        return Err(ConfigurationError::InvalidConstraints);
    }
    Ok(kinds.to_vec())
}

/// Shuffle-and-zip solution construction: the first category is the
/// base; every other category's values are permuted against it.
fn build_solution(cats: &CategorySet, rng: &mut Mulberry32) -> Solution {
    let k = cats.k();
    let mut perms: Vec<Vec<usize>> = Vec::with_capacity(cats.len());
    perms.push((0..k).collect());
    for _ in 1..cats.len() {
        let mut perm: Vec<usize> = (0..k).collect();
        rng.shuffle(&mut perm);
        perms.push(perm);
    }
    Solution::from_perms(perms)
}

fn validate_target(
    cats: &CategorySet,
    fact: &TargetFact,
) -> Result<TargetRef, ConfigurationError> {
    let cat = cats
        .index_of(&fact.cat)
        .ok_or_else(|| ConfigurationError::UnknownTargetCategory(fact.cat.clone()))?;
    let wanted = cats
        .index_of(&fact.wanted)
        .ok_or_else(|| ConfigurationError::UnknownTargetCategory(fact.wanted.clone()))?;
    if cat == wanted {
        return Err(ConfigurationError::TargetCategoriesEqual);
    }
    let val = cats
        .value_index(cat, &fact.value)
        .ok_or_else(|| ConfigurationError::UnknownTargetValue {
            category: fact.cat.clone(),
            value: fact.value.clone(),
        })?;
    Ok(TargetRef { cat, val, wanted })
}

fn resolve_target(
    cats: &CategorySet,
    target: Option<TargetFact>,
    rng: &mut Mulberry32,
) -> Result<(TargetRef, TargetFact), ConfigurationError> {
    match target {
        Some(fact) => {
            let target_ref = validate_target(cats, &fact)?;
            Ok((target_ref, fact))
        }
        None => {
            let cat = rng.pick(cats.len());
            let val = rng.pick(cats.k());
            let mut wanted = rng.pick(cats.len() - 1);
            if wanted >= cat {
                wanted += 1;
            }
            let fact = TargetFact {
                cat: cats.category(cat).id.clone(),
                value: cats.label(cat, val).clone(),
                wanted: cats.category(wanted).id.clone(),
            };
            Ok((TargetRef { cat, val, wanted }, fact))
        }
    }
}

/// The candidate pool: every truthful clue of an allowed kind, minus any
/// binary placement that states the target fact outright.
fn build_pool(
    cats: &CategorySet,
    solution: &Solution,
    allowed: &[ClueKind],
    target: &TargetRef,
) -> Vec<Clue> {
    let answer = solution.value_of(target.wanted, solution.entity_of(target.cat, target.val));
    let subject = Item {
        cat: cats.category(target.cat).id.clone(),
        value: cats.label(target.cat, target.val).clone(),
    };
    let answer_item = Item {
        cat: cats.category(target.wanted).id.clone(),
        value: cats.label(target.wanted, answer).clone(),
    };

    enumerate_clues(cats, solution)
        .into_iter()
        .filter(|clue| allowed.contains(&clue.kind()))
        .filter(|clue| !is_direct_target(clue, &subject, &answer_item))
        .collect()
}

/// A binary placement whose endpoints are exactly the target fact and
/// its answer, in either orientation.
fn is_direct_target(clue: &Clue, subject: &Item, answer: &Item) -> bool {
    match clue {
        Clue::Binary {
            op: BinaryOp::Is,
            lhs,
            rhs,
        } => (lhs == subject && rhs == answer) || (lhs == answer && rhs == subject),
        _ => false,
    }
}

/// Greedy selection: score every candidate on a cloned grid, commit the
/// best, drop candidates that stopped deducing, repeat until solved.
fn greedy_chain(
    cats: &Rc<CategorySet>,
    target: &TargetRef,
    mut available: Vec<Clue>,
    rng: &mut Mulberry32,
    max_candidates: Option<usize>,
    mode: ScoreMode,
) -> Result<Vec<ProofStep>, ConfigurationError> {
    let mut grid = Grid::from_set(Rc::clone(cats));
    let mut chain: Vec<ProofStep> = Vec::new();
    let mut history: Vec<Clue> = Vec::new();

    for _ in 0..MAX_STEPS {
        if grid.is_solved() {
            return Ok(chain);
        }
        if available.is_empty() {
            break;
        }

        let limit = max_candidates.unwrap_or(usize::MAX);
        let evaluated_all = limit >= available.len();
        if !evaluated_all {
            rng.shuffle(&mut available);
        }

        let mut best: Option<(usize, f64)> = None;
        let mut closer: Option<usize> = None;
        let mut spent: SmallVec<[usize; 16]> = SmallVec::new();
        for idx in 0..available.len().min(limit) {
            let mut trial = grid.clone();
            let deductions = zebra_solver::apply(&mut trial, &available[idx]);
            if deductions == 0 {
                spent.push(idx);
                continue;
            }
            let score = score_clue(&trial, target, deductions, &available[idx], &history, mode);
            if score >= TARGET_AND_GRID_SOLVED {
                if closer.is_none() {
                    closer = Some(idx);
                }
            } else if score > 0.0 {
                let better = match best {
                    None => true,
                    Some((_, top)) => {
                        score > top || (score == top && rng.next_f64() < 0.5)
                    }
                };
                if better {
                    best = Some((idx, score));
                }
            }
        }

        let Some(choice) = closer.or(best.map(|(idx, _)| idx)) else {
            // Nothing scored: with the whole pool evaluated and the grid
            // unchanged, no later round can do better.
            if evaluated_all {
                break;
            }
            spent.sort_unstable();
            for &idx in spent.iter().rev() {
                available.swap_remove(idx);
            }
            continue;
        };
        let deductions = zebra_solver::apply(&mut grid, &available[choice]);
        let clue = available[choice].clone();
        trace!(deductions, remaining = available.len(), "gen.pick");
        history.push(clue.clone());
        chain.push(ProofStep { clue, deductions });

        spent.push(choice);
        spent.sort_unstable();
        for &idx in spent.iter().rev() {
            available.swap_remove(idx);
        }
    }

    if grid.is_solved() {
        Ok(chain)
    } else {
        Err(ConfigurationError::CouldNotGenerate)
    }
}

struct DeadlineExpired;

struct ExactCandidate {
    idx: usize,
    after: Grid,
    deductions: usize,
    score: f64,
}

/// Depth-first search for a chain of exactly `count` clues, under a
/// wall-clock budget.
fn exact_chain(
    cats: &Rc<CategorySet>,
    target: &TargetRef,
    pool: &[Clue],
    rng: &mut Mulberry32,
    count: usize,
    timeout_ms: u64,
) -> Result<Vec<ProofStep>, ConfigurationError> {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    let grid = Grid::from_set(Rc::clone(cats));
    let mut chain: Vec<ProofStep> = Vec::new();
    let mut history: Vec<Clue> = Vec::new();
    match descend(
        &grid,
        pool,
        target,
        count,
        deadline,
        rng,
        &mut chain,
        &mut history,
    ) {
        Ok(true) => Ok(chain),
        Ok(false) | Err(DeadlineExpired) => Err(ConfigurationError::CouldNotGenerate),
    }
}

#[allow(clippy::too_many_arguments)]
fn descend(
    grid: &Grid,
    pool: &[Clue],
    target: &TargetRef,
    count: usize,
    deadline: Instant,
    rng: &mut Mulberry32,
    chain: &mut Vec<ProofStep>,
    history: &mut Vec<Clue>,
) -> Result<bool, DeadlineExpired> {
    if Instant::now() >= deadline {
        return Err(DeadlineExpired);
    }
    if grid.is_solved() {
        return Ok(chain.len() == count);
    }
    if chain.len() >= count {
        return Ok(false);
    }

    // Schedule check: ahead of it, spend clues slowly; behind it, prefer
    // heavy hitters.
    let stats = grid.stats();
    let progress = (stats.total - stats.current) as f64 / (stats.total - stats.solution) as f64;
    let expected = (chain.len() + 1) as f64 / count as f64;
    let behind = progress < expected;

    let mut candidates: Vec<ExactCandidate> = Vec::new();
    for (idx, clue) in pool.iter().enumerate() {
        let mut after = grid.clone();
        let deductions = zebra_solver::apply(&mut after, clue);
        if deductions == 0 {
            continue;
        }
        // Reserve room: nothing may finish the grid before the chain is
        // one clue short of the requested length.
        if after.is_solved() && chain.len() + 1 < count {
            continue;
        }
        let quality = score_clue(&after, target, deductions, clue, history, ScoreMode::Quality);
        if quality <= TARGET_SOLVED_EARLY {
            continue;
        }
        let pacing = if behind {
            deductions as f64 * 10.0
        } else {
            10.0 / deductions as f64
        };
        candidates.push(ExactCandidate {
            idx,
            after,
            deductions,
            score: quality + pacing + rng.next_f64(),
        });
    }
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    trace!(depth = chain.len(), candidates = candidates.len(), "gen.descend");

    for candidate in candidates {
        let clue = pool[candidate.idx].clone();
        history.push(clue.clone());
        chain.push(ProofStep {
            clue,
            deductions: candidate.deductions,
        });
        if descend(
            &candidate.after,
            pool,
            target,
            count,
            deadline,
            rng,
            chain,
            history,
        )? {
            return Ok(true);
        }
        chain.pop();
        history.pop();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Category> {
        vec![
            Category::nominal("name", ["Alice", "Bob", "Charlie"]),
            Category::nominal("snack", ["Chips", "Popcorn", "Candy"]),
            Category::ordinal("age", [20, 30, 40]),
        ]
    }

    #[test]
    fn zero_max_candidates_is_rejected() {
        let config = GenerateConfig {
            max_candidates: Some(0),
            ..GenerateConfig::seeded(1)
        };
        assert!(matches!(
            generate_puzzle(categories(), None, config),
            Err(ConfigurationError::MaxCandidatesTooSmall)
        ));
    }

    #[test]
    fn constraints_without_identity_resolving_forms_are_rejected() {
        let config = GenerateConfig {
            allowed_clue_types: Some(vec![ClueKind::Superlative, ClueKind::Unary]),
            ..GenerateConfig::seeded(1)
        };
        let err = generate_puzzle(categories(), None, config).unwrap_err();
        assert_eq!(err.to_string(), "Invalid Constraints");
    }

    #[test]
    fn ordinal_constraints_need_an_ordinal_category() {
        let cats = vec![
            Category::nominal("name", ["Alice", "Bob"]),
            Category::nominal("snack", ["Chips", "Candy"]),
        ];
        let config = GenerateConfig {
            allowed_clue_types: Some(vec![ClueKind::Binary, ClueKind::Ordinal]),
            ..GenerateConfig::seeded(1)
        };
        assert!(matches!(
            generate_puzzle(cats, None, config),
            Err(ConfigurationError::InvalidConstraints)
        ));
    }

    #[test]
    fn unary_constraints_need_mixed_parity() {
        let cats = vec![
            Category::nominal("name", ["Alice", "Bob"]),
            Category::ordinal("age", [20, 40]),
        ];
        let config = GenerateConfig {
            allowed_clue_types: Some(vec![ClueKind::Binary, ClueKind::Unary]),
            ..GenerateConfig::seeded(1)
        };
        assert!(matches!(
            generate_puzzle(cats, None, config),
            Err(ConfigurationError::InvalidConstraints)
        ));
    }

    #[test]
    fn cross_ordinal_constraints_need_two_ordinal_categories() {
        let config = GenerateConfig {
            allowed_clue_types: Some(vec![ClueKind::Binary, ClueKind::CrossOrdinal]),
            ..GenerateConfig::seeded(1)
        };
        assert!(matches!(
            generate_puzzle(categories(), None, config),
            Err(ConfigurationError::InvalidConstraints)
        ));
    }

    #[test]
    fn target_referencing_unknown_value_is_rejected() {
        let target = TargetFact::new("name", "Dora", "snack");
        assert!(matches!(
            generate_puzzle(categories(), Some(target), GenerateConfig::seeded(1)),
            Err(ConfigurationError::UnknownTargetValue { .. })
        ));
    }

    #[test]
    fn target_must_span_two_categories() {
        let target = TargetFact::new("name", "Alice", "name");
        assert!(matches!(
            generate_puzzle(categories(), Some(target), GenerateConfig::seeded(1)),
            Err(ConfigurationError::TargetCategoriesEqual)
        ));
    }

    #[test]
    fn solution_construction_is_seed_deterministic() {
        let cats = Rc::new(CategorySet::new(categories()).unwrap());
        let a = build_solution(&cats, &mut Mulberry32::new(7));
        let b = build_solution(&cats, &mut Mulberry32::new(7));
        assert_eq!(a, b);
    }

    #[test]
    fn synthesized_target_is_deterministic() {
        let cats = Rc::new(CategorySet::new(categories()).unwrap());
        let (_, a) = resolve_target(&cats, None, &mut Mulberry32::new(5)).unwrap();
        let (_, b) = resolve_target(&cats, None, &mut Mulberry32::new(5)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.cat, a.wanted);
    }
}
