//! Clue application and the global deduction fixed point.
//!
//! Design goals, matching the rest of the family:
//! - **Deterministic**: stable sweep order, no hash-iteration dependence.
//! - **Total**: `apply` never fails; malformed or unknown references
//!   contribute zero deductions.
//! - **Allocation-free sweeps**: the inner loops walk `u64` row masks.

use zebra_core::{BinaryOp, CategorySet, Clue, CrossOp, Grid, Item, SuperlativeOp};

#[cfg(feature = "tracing")]
use tracing::trace;

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

/// Applies one clue to the grid in place and returns the number of cell
/// eliminations it caused, variant pruning and follow-on deductions
/// combined.
pub fn apply(grid: &mut Grid, clue: &Clue) -> usize {
    let pruned = prune(grid, clue);
    let propagated = propagate(grid);
    trace!(pruned, propagated, "solver.apply");
    pruned + propagated
}

/// Iterator over the set bit positions of a row mask.
fn bits(mask: u64) -> impl Iterator<Item = usize> {
    let mut rest = mask;
    std::iter::from_fn(move || {
        if rest == 0 {
            None
        } else {
            let i = rest.trailing_zeros() as usize;
            rest &= rest - 1;
            Some(i)
        }
    })
}

fn resolve(cats: &CategorySet, item: &Item) -> Option<(usize, usize)> {
    let c = cats.index_of(&item.cat)?;
    let v = cats.value_index(c, &item.value)?;
    Some((c, v))
}

fn ordinal_index(cats: &CategorySet, ord: &str) -> Option<usize> {
    let o = cats.index_of(ord)?;
    cats.category(o).is_ordinal().then_some(o)
}

/// Asserts that (c1, v1) and (c2, v2) belong to the same entity: every
/// sibling of the cell in its row and column is eliminated. The cell
/// itself must still be marked possible; it is never rewritten.
fn assert_is(grid: &mut Grid, c1: usize, v1: usize, c2: usize, v2: usize) -> usize {
    let k = grid.k();
    let mut changes = 0usize;
    for v in 0..k {
        if v != v2 {
            changes += usize::from(grid.set_at(c1, v1, c2, v, false));
        }
    }
    for v in 0..k {
        if v != v1 {
            changes += usize::from(grid.set_at(c1, v, c2, v2, false));
        }
    }
    changes
}

/// Variant-specific pruning: one walk of the clue's meaning against the
/// current grid.
fn prune(grid: &mut Grid, clue: &Clue) -> usize {
    match clue {
        Clue::Binary { op, lhs, rhs } => {
            let cats = grid.categories();
            let (Some((c1, v1)), Some((c2, v2))) = (resolve(cats, lhs), resolve(cats, rhs)) else {
                return 0;
            };
            if c1 == c2 {
                return 0;
            }
            match op {
                BinaryOp::Is => assert_is(grid, c1, v1, c2, v2),
                BinaryOp::IsNot => usize::from(grid.set_at(c1, v1, c2, v2, false)),
            }
        }
        Clue::Ordinal { op, lhs, rhs, ord } => {
            let cats = grid.categories();
            let (Some((c1, v1)), Some((c2, v2)), Some(o)) =
                (resolve(cats, lhs), resolve(cats, rhs), ordinal_index(cats, ord))
            else {
                return 0;
            };
            if c1 == o || c2 == o {
                return 0;
            }
            let lhs_ranks = grid.row_mask_at(c1, v1, o);
            let rhs_ranks = grid.row_mask_at(c2, v2, o);
            let mut changes = 0usize;
            for r1 in bits(lhs_ranks) {
                if !bits(rhs_ranks).any(|r2| op.compare(r1, r2)) {
                    changes += usize::from(grid.set_at(c1, v1, o, r1, false));
                }
            }
            for r2 in bits(rhs_ranks) {
                if !bits(lhs_ranks).any(|r1| op.compare(r1, r2)) {
                    changes += usize::from(grid.set_at(c2, v2, o, r2, false));
                }
            }
            changes
        }
        Clue::Superlative { op, target, ord } => {
            let cats = grid.categories();
            let (Some((c, v)), Some(o)) = (resolve(cats, target), ordinal_index(cats, ord)) else {
                return 0;
            };
            if c == o {
                return 0;
            }
            let last = grid.k() - 1;
            match op {
                SuperlativeOp::Min => assert_is(grid, c, v, o, 0),
                SuperlativeOp::Max => assert_is(grid, c, v, o, last),
                SuperlativeOp::NotMin => usize::from(grid.set_at(c, v, o, 0, false)),
                SuperlativeOp::NotMax => usize::from(grid.set_at(c, v, o, last, false)),
            }
        }
        Clue::Unary {
            parity,
            target,
            ord,
        } => {
            let cats = grid.categories();
            let (Some((c, v)), Some(o)) = (resolve(cats, target), ordinal_index(cats, ord)) else {
                return 0;
            };
            if c == o {
                return 0;
            }
            let mut wrong_parity = 0u64;
            for rank in 0..grid.k() {
                match grid.categories().label(o, rank).as_int() {
                    Some(n) if !parity.matches(n) => wrong_parity |= 1u64 << rank,
                    Some(_) => {}
                    None => return 0,
                }
            }
            let mut changes = 0usize;
            for rank in bits(wrong_parity) {
                changes += usize::from(grid.set_at(c, v, o, rank, false));
            }
            changes
        }
        Clue::CrossOrdinal { op, a, b } => {
            let cats = grid.categories();
            let (Some((ca, va)), Some((cb, vb))) = (resolve(cats, &a.item), resolve(cats, &b.item))
            else {
                return 0;
            };
            let (Some(oa), Some(ob)) =
                (ordinal_index(cats, &a.ord), ordinal_index(cats, &b.ord))
            else {
                return 0;
            };
            if oa == ob {
                return 0;
            }
            let k = grid.k();
            let derive = |rank: usize, offset: i32| -> Option<usize> {
                let d = rank as i64 + offset as i64;
                (0..k as i64).contains(&d).then_some(d as usize)
            };

            let mut changes = 0usize;
            match op {
                CrossOp::Match => {
                    // Retain only anchor placements whose derived value can
                    // still pair with some derived value of the other side.
                    let a_ranks = grid.row_mask_at(ca, va, oa);
                    let b_ranks = grid.row_mask_at(cb, vb, ob);
                    for p1 in bits(a_ranks) {
                        let compatible = derive(p1, a.offset).is_some_and(|d1| {
                            bits(b_ranks).any(|p2| {
                                derive(p2, b.offset)
                                    .is_some_and(|d2| grid.is_possible_at(oa, d1, ob, d2))
                            })
                        });
                        if !compatible && ca != oa {
                            changes += usize::from(grid.set_at(ca, va, oa, p1, false));
                        }
                    }
                    let a_ranks = grid.row_mask_at(ca, va, oa);
                    for p2 in bits(b_ranks) {
                        let compatible = derive(p2, b.offset).is_some_and(|d2| {
                            bits(a_ranks).any(|p1| {
                                derive(p1, a.offset)
                                    .is_some_and(|d1| grid.is_possible_at(oa, d1, ob, d2))
                            })
                        });
                        if !compatible && cb != ob {
                            changes += usize::from(grid.set_at(cb, vb, ob, p2, false));
                        }
                    }
                    // Both ends pinned: the derived pair is one entity.
                    let a_ranks = grid.row_mask_at(ca, va, oa);
                    let b_ranks = grid.row_mask_at(cb, vb, ob);
                    if a_ranks.count_ones() == 1 && b_ranks.count_ones() == 1 {
                        let d1 = derive(a_ranks.trailing_zeros() as usize, a.offset);
                        let d2 = derive(b_ranks.trailing_zeros() as usize, b.offset);
                        if let (Some(d1), Some(d2)) = (d1, d2) {
                            changes += assert_is(grid, oa, d1, ob, d2);
                        }
                    }
                }
                CrossOp::NotMatch => {
                    let a_ranks = grid.row_mask_at(ca, va, oa);
                    let b_ranks = grid.row_mask_at(cb, vb, ob);
                    let a_pinned = (a_ranks.count_ones() == 1)
                        .then(|| derive(a_ranks.trailing_zeros() as usize, a.offset))
                        .flatten();
                    let b_pinned = (b_ranks.count_ones() == 1)
                        .then(|| derive(b_ranks.trailing_zeros() as usize, b.offset))
                        .flatten();
                    match (a_pinned, b_pinned) {
                        (Some(d1), Some(d2)) => {
                            changes += usize::from(grid.set_at(oa, d1, ob, d2, false));
                        }
                        (Some(d1), None) => {
                            changes += forbid_forced_coincidence(
                                grid, oa, d1, ob, cb, vb, b.offset,
                            );
                        }
                        (None, Some(d2)) => {
                            changes += forbid_forced_coincidence(
                                grid, ob, d2, oa, ca, va, a.offset,
                            );
                        }
                        (None, None) => {}
                    }
                }
            }
            changes
        }
    }
}

/// One side of a NotMatch is pinned to the value `d1` of `oa`. If that
/// entity's value in `ob` is already forced, the floating anchor may not
/// sit at any rank deriving to it.
fn forbid_forced_coincidence(
    grid: &mut Grid,
    oa: usize,
    d1: usize,
    ob: usize,
    float_cat: usize,
    float_val: usize,
    offset: i32,
) -> usize {
    if float_cat == ob {
        return 0;
    }
    let link = grid.row_mask_at(oa, d1, ob);
    if link.count_ones() != 1 {
        return 0;
    }
    let forced = link.trailing_zeros() as i64;
    let k = grid.k() as i64;
    let mut changes = 0usize;
    for rank in bits(grid.row_mask_at(float_cat, float_val, ob)) {
        let derived = rank as i64 + offset as i64;
        if derived == forced && (0..k).contains(&derived) {
            changes += usize::from(grid.set_at(float_cat, float_val, ob, rank, false));
        }
    }
    changes
}

/// Global deduction fixed point: uniqueness and transitivity sweeps
/// repeated until a pass changes nothing.
fn propagate(grid: &mut Grid) -> usize {
    let c = grid.categories().len();
    let k = grid.k();
    let mut total = 0usize;
    loop {
        let mut changes = 0usize;

        // Uniqueness: a value claimed by a determined row is gone for
        // every sibling row.
        for c1 in 0..c {
            for c2 in 0..c {
                if c1 == c2 {
                    continue;
                }
                for v1 in 0..k {
                    let row = grid.row_mask_at(c1, v1, c2);
                    if row.count_ones() == 1 {
                        let v2 = row.trailing_zeros() as usize;
                        for other in 0..k {
                            if other != v1 {
                                changes += usize::from(grid.set_at(c1, other, c2, v2, false));
                            }
                        }
                    }
                }
            }
        }

        // Transitivity through a middle category.
        for c1 in 0..c {
            for c2 in 0..c {
                if c2 == c1 {
                    continue;
                }
                for c3 in 0..c {
                    if c3 == c1 || c3 == c2 {
                        continue;
                    }
                    for v1 in 0..k {
                        // Positive: a doubly determined path pins the
                        // endpoints to one entity.
                        let via = grid.row_mask_at(c1, v1, c2);
                        if via.count_ones() == 1 {
                            let v2 = via.trailing_zeros() as usize;
                            let onward = grid.row_mask_at(c2, v2, c3);
                            if onward.count_ones() == 1 {
                                let v3 = onward.trailing_zeros() as usize;
                                if grid.is_possible_at(c1, v1, c3, v3)
                                    && grid.row_count_at(c1, v1, c3) > 1
                                {
                                    changes += assert_is(grid, c1, v1, c3, v3);
                                }
                            }
                        }
                        // Negative: no surviving path through c2 rules the
                        // pairing out.
                        let via = grid.row_mask_at(c1, v1, c2);
                        for v3 in bits(grid.row_mask_at(c1, v1, c3)) {
                            if via & grid.row_mask_at(c3, v3, c2) == 0 {
                                changes += usize::from(grid.set_at(c1, v1, c3, v3, false));
                            }
                        }
                    }
                }
            }
        }

        if changes == 0 {
            break;
        }
        total += changes;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use zebra_core::{Category, Clue, Item, OrdinalOp};

    fn pair_grid() -> Grid {
        Grid::new(vec![
            Category::nominal("name", ["Alice", "Bob"]),
            Category::nominal("snack", ["Chips", "Popcorn"]),
        ])
        .unwrap()
    }

    #[test]
    fn binary_is_derives_both_negations() {
        let mut grid = pair_grid();
        let d = apply(
            &mut grid,
            &Clue::is(Item::new("name", "Alice"), Item::new("snack", "Chips")),
        );
        assert_eq!(d, 2);
        assert!(!grid.is_possible("name", &"Alice".into(), "snack", &"Popcorn".into()));
        assert!(!grid.is_possible("name", &"Bob".into(), "snack", &"Chips".into()));
        assert!(grid.is_solved());
    }

    #[test]
    fn unknown_references_deduce_nothing() {
        let mut grid = pair_grid();
        let before = grid.stats();
        let d = apply(
            &mut grid,
            &Clue::is(Item::new("name", "Dora"), Item::new("snack", "Chips")),
        );
        assert_eq!(d, 0);
        assert_eq!(grid.stats(), before);
    }

    #[test]
    fn applying_to_a_solved_grid_is_idempotent() {
        let mut grid = pair_grid();
        let clue = Clue::is(Item::new("name", "Alice"), Item::new("snack", "Chips"));
        apply(&mut grid, &clue);
        assert!(grid.is_solved());
        let stats = grid.stats();
        assert_eq!(apply(&mut grid, &clue), 0);
        assert_eq!(grid.stats(), stats);
    }

    #[test]
    fn deductions_equal_live_count_delta() {
        let mut grid = Grid::new(vec![
            Category::nominal("name", ["Alice", "Bob", "Charlie"]),
            Category::nominal("snack", ["Chips", "Popcorn", "Candy"]),
            Category::ordinal("age", [20, 30, 40]),
        ])
        .unwrap();
        let before = grid.stats().current;
        let d = apply(
            &mut grid,
            &Clue::is(Item::new("name", "Alice"), Item::new("snack", "Chips")),
        );
        assert_eq!(before - grid.stats().current, d);
    }

    #[test]
    fn ordinal_comparison_trims_both_ends() {
        let mut grid = Grid::new(vec![
            Category::nominal("name", ["Alice", "Bob", "Charlie"]),
            Category::ordinal("age", [20, 30, 40]),
        ])
        .unwrap();
        let d = apply(
            &mut grid,
            &Clue::Ordinal {
                op: OrdinalOp::GreaterThan,
                lhs: Item::new("name", "Alice"),
                rhs: Item::new("name", "Bob"),
                ord: "age".to_owned(),
            },
        );
        assert_eq!(d, 2);
        assert!(!grid.is_possible("name", &"Alice".into(), "age", &20.into()));
        assert!(!grid.is_possible("name", &"Bob".into(), "age", &40.into()));
    }
}
