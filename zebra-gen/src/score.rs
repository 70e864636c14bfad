//! Clue scoring: how attractive is a candidate, given the grid it
//! produces and the chain chosen so far?
//!
//! Two sentinels outrank the formula: a clue that finishes target and
//! grid together scores +10⁶, a clue that gives the target away while
//! the grid is still ambiguous scores −10⁶ and is never chosen. In
//! between, the score rewards deductions and overall progress, weighted
//! by a per-variant complexity bonus and damped exponentially by
//! repetition of subjects, dimensions and clue structure.

use smallvec::SmallVec;
use zebra_core::{BinaryOp, Clue, Grid, Item};

/// Awarded to a clue that resolves the target row and completes the grid
/// in the same application.
pub const TARGET_AND_GRID_SOLVED: f64 = 1_000_000.0;

/// Assigned to a clue that resolves the target row while the rest of the
/// grid is still ambiguous.
pub const TARGET_SOLVED_EARLY: f64 = -1_000_000.0;

/// Resolved target coordinates: the (category, value) row whose `wanted`
/// column answers the puzzle.
#[derive(Debug, Clone, Copy)]
pub struct TargetRef {
    pub cat: usize,
    pub val: usize,
    pub wanted: usize,
}

/// Which preference the greedy engine is optimizing for. `Quality` is
/// the generation default; the deduction-count modes drive the bounds
/// estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    Quality,
    MostDeductions,
    FewestDeductions,
}

/// Scores a candidate against the grid state `after` its application.
pub fn score_clue(
    after: &Grid,
    target: &TargetRef,
    deductions: usize,
    clue: &Clue,
    history: &[Clue],
    mode: ScoreMode,
) -> f64 {
    let target_row_solved = after.row_count_at(target.cat, target.val, target.wanted) == 1;
    if target_row_solved {
        return if after.is_solved() {
            TARGET_AND_GRID_SOLVED
        } else {
            TARGET_SOLVED_EARLY
        };
    }
    match mode {
        ScoreMode::Quality => quality(after, deductions, clue, history),
        ScoreMode::MostDeductions => deductions as f64,
        ScoreMode::FewestDeductions => 1.0 / deductions as f64,
    }
}

fn quality(after: &Grid, deductions: usize, clue: &Clue, history: &[Clue]) -> f64 {
    let base = deductions as f64;
    let stats = after.stats();
    let completeness =
        (stats.total - stats.current) as f64 / (stats.total - stats.solution) as f64;
    (base * complexity(clue) + completeness * 5.0) * 0.4f64.powf(repetition(clue, history))
}

/// Per-variant bonus multiplier, tuned to counteract the natural
/// dominance of plain placement facts.
fn complexity(clue: &Clue) -> f64 {
    match clue {
        Clue::Binary {
            op: BinaryOp::Is, ..
        } => 1.0,
        Clue::Binary {
            op: BinaryOp::IsNot,
            ..
        } => 5.0,
        Clue::Ordinal { .. } => 1.5,
        Clue::Superlative { .. } => 1.2,
        Clue::Unary { .. } => 1.2,
        Clue::CrossOrdinal { .. } => 1.5,
    }
}

/// The clue's primary subject: the item a reader would call "who the
/// clue is about".
fn primary_subject(clue: &Clue) -> &Item {
    match clue {
        Clue::Binary { lhs, .. } | Clue::Ordinal { lhs, .. } => lhs,
        Clue::Superlative { target, .. } | Clue::Unary { target, .. } => target,
        Clue::CrossOrdinal { a, .. } => &a.item,
    }
}

/// Secondary subject, where the variant has one worth half weight.
fn secondary_subject(clue: &Clue) -> Option<&Item> {
    match clue {
        Clue::Binary {
            op: BinaryOp::IsNot,
            rhs,
            ..
        } => Some(rhs),
        Clue::Binary {
            op: BinaryOp::Is, ..
        } => None,
        Clue::Ordinal { rhs, .. } => Some(rhs),
        Clue::Superlative { .. } | Clue::Unary { .. } => None,
        Clue::CrossOrdinal { b, .. } => Some(&b.item),
    }
}

/// Every item the clue mentions at all.
fn mentions(clue: &Clue) -> SmallVec<[&Item; 2]> {
    match clue {
        Clue::Binary { lhs, rhs, .. } | Clue::Ordinal { lhs, rhs, .. } => {
            SmallVec::from_slice(&[lhs, rhs])
        }
        Clue::Superlative { target, .. } | Clue::Unary { target, .. } => {
            SmallVec::from_slice(&[target])
        }
        Clue::CrossOrdinal { a, b, .. } => SmallVec::from_slice(&[&a.item, &b.item]),
    }
}

/// Ordinal dimensions the clue leans on.
fn dimensions(clue: &Clue) -> SmallVec<[&str; 2]> {
    match clue {
        Clue::Binary { .. } => SmallVec::new(),
        Clue::Ordinal { ord, .. }
        | Clue::Superlative { ord, .. }
        | Clue::Unary { ord, .. } => SmallVec::from_slice(&[ord.as_str()]),
        Clue::CrossOrdinal { a, b, .. } => SmallVec::from_slice(&[a.ord.as_str(), b.ord.as_str()]),
    }
}

fn is_binary_is(clue: &Clue) -> bool {
    matches!(
        clue,
        Clue::Binary {
            op: BinaryOp::Is,
            ..
        }
    )
}

/// Accumulated repetition exponent: subjects already talked about,
/// dimensions already leaned on, and runs of the same clue shape.
fn repetition(clue: &Clue, history: &[Clue]) -> f64 {
    let mut r = 0.0;

    let primary = primary_subject(clue);
    r += history
        .iter()
        .filter(|h| mentions(h).contains(&primary))
        .count() as f64;
    if let Some(secondary) = secondary_subject(clue) {
        r += 0.5
            * history
                .iter()
                .filter(|h| mentions(h).contains(&secondary))
                .count() as f64;
    }

    let dims = dimensions(clue);
    if !dims.is_empty() {
        r += 0.5
            * history
                .iter()
                .filter(|h| dimensions(h).iter().any(|d| dims.contains(d)))
                .count() as f64;
    }

    if let Some(prev) = history.last()
        && prev.kind() == clue.kind()
    {
        r += 2.0;
        if is_binary_is(prev) && is_binary_is(clue) {
            r += 2.0;
        }
        if history.len() >= 2 && history[history.len() - 2].kind() == clue.kind() {
            r += 5.0;
        }
    }

    r
}
