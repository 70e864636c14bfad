//! Enumeration of every clue instance that is truthful against a chosen
//! solution.
//!
//! Output order is a pure function of the categories: binary clues walk
//! id-ordered category pairs, everything else walks categories and
//! values in declaration order. Randomness enters only through the
//! generator's shuffles.

use zebra_core::{
    Anchor, BinaryOp, CategorySet, Clue, CrossOp, Item, OrdinalOp, Parity, Solution, SuperlativeOp,
};

/// Cross-ordinal anchors range over this offset window.
const CROSS_OFFSETS: [i32; 3] = [-1, 0, 1];

fn item(cats: &CategorySet, cat: usize, value: usize) -> Item {
    Item {
        cat: cats.category(cat).id.clone(),
        value: cats.label(cat, value).clone(),
    }
}

/// Produces the complete truthful clue universe for `solution`.
pub fn enumerate_clues(cats: &CategorySet, solution: &Solution) -> Vec<Clue> {
    let k = cats.k();
    let ords = cats.ordinal_indices();
    let mut clues = Vec::new();

    // Binary facts across every id-ordered category pair.
    let mut by_id: Vec<usize> = (0..cats.len()).collect();
    by_id.sort_by(|&a, &b| cats.category(a).id.cmp(&cats.category(b).id));
    for (i, &c1) in by_id.iter().enumerate() {
        for &c2 in &by_id[i + 1..] {
            for v1 in 0..k {
                for v2 in 0..k {
                    let op = if solution.entity_of(c1, v1) == solution.entity_of(c2, v2) {
                        BinaryOp::Is
                    } else {
                        BinaryOp::IsNot
                    };
                    clues.push(Clue::Binary {
                        op,
                        lhs: item(cats, c1, v1),
                        rhs: item(cats, c2, v2),
                    });
                }
            }
        }
    }

    // Superlatives: each item's relation to both extremes of each
    // ordinal dimension.
    for &o in &ords {
        for t in 0..cats.len() {
            if t == o {
                continue;
            }
            for v in 0..k {
                let rank = solution.value_of(o, solution.entity_of(t, v));
                let ord = cats.category(o).id.clone();
                clues.push(Clue::Superlative {
                    op: if rank == 0 {
                        SuperlativeOp::Min
                    } else {
                        SuperlativeOp::NotMin
                    },
                    target: item(cats, t, v),
                    ord: ord.clone(),
                });
                clues.push(Clue::Superlative {
                    op: if rank == k - 1 {
                        SuperlativeOp::Max
                    } else {
                        SuperlativeOp::NotMax
                    },
                    target: item(cats, t, v),
                    ord,
                });
            }
        }
    }

    // Strict ordinal comparisons between distinct entities, items drawn
    // from outside the ordinal dimension.
    for &o in &ords {
        let items: Vec<(usize, usize)> = (0..cats.len())
            .filter(|&c| c != o)
            .flat_map(|c| (0..k).map(move |v| (c, v)))
            .collect();
        for (i, &(c1, v1)) in items.iter().enumerate() {
            for &(c2, v2) in &items[i + 1..] {
                let e1 = solution.entity_of(c1, v1);
                let e2 = solution.entity_of(c2, v2);
                if e1 == e2 {
                    continue;
                }
                let op = if solution.value_of(o, e1) > solution.value_of(o, e2) {
                    OrdinalOp::GreaterThan
                } else {
                    OrdinalOp::LessThan
                };
                clues.push(Clue::Ordinal {
                    op,
                    lhs: item(cats, c1, v1),
                    rhs: item(cats, c2, v2),
                    ord: cats.category(o).id.clone(),
                });
            }
        }
    }

    // Parity of each item's value in each ordinal dimension.
    for &o in &ords {
        for t in 0..cats.len() {
            if t == o {
                continue;
            }
            for v in 0..k {
                let rank = solution.value_of(o, solution.entity_of(t, v));
                let Some(n) = cats.label(o, rank).as_int() else {
                    continue;
                };
                clues.push(Clue::Unary {
                    parity: if n.rem_euclid(2) == 1 {
                        Parity::Odd
                    } else {
                        Parity::Even
                    },
                    target: item(cats, t, v),
                    ord: cats.category(o).id.clone(),
                });
            }
        }
    }

    // Cross-ordinal anchors need two ordinal dimensions.
    if ords.len() >= 2 {
        for &oa in &ords {
            for &ob in &ords {
                if oa == ob {
                    continue;
                }
                emit_cross_ordinal(cats, solution, oa, ob, &mut clues);
            }
        }
    }

    clues
}

fn emit_cross_ordinal(
    cats: &CategorySet,
    solution: &Solution,
    oa: usize,
    ob: usize,
    clues: &mut Vec<Clue>,
) {
    let k = cats.k();
    let derived = |o: usize, cat: usize, value: usize, offset: i32| -> Option<usize> {
        let rank = solution.value_of(o, solution.entity_of(cat, value)) as i64 + i64::from(offset);
        (0..k as i64)
            .contains(&rank)
            .then(|| solution.entity_of(o, rank as usize))
    };

    for ca in 0..cats.len() {
        for va in 0..k {
            for off_a in CROSS_OFFSETS {
                let Some(e1) = derived(oa, ca, va, off_a) else {
                    continue;
                };
                for cb in 0..cats.len() {
                    for vb in 0..k {
                        for off_b in CROSS_OFFSETS {
                            let Some(e2) = derived(ob, cb, vb, off_b) else {
                                continue;
                            };
                            clues.push(Clue::CrossOrdinal {
                                op: if e1 == e2 {
                                    CrossOp::Match
                                } else {
                                    CrossOp::NotMatch
                                },
                                a: Anchor {
                                    item: item(cats, ca, va),
                                    ord: cats.category(oa).id.clone(),
                                    offset: off_a,
                                },
                                b: Anchor {
                                    item: item(cats, cb, vb),
                                    ord: cats.category(ob).id.clone(),
                                    offset: off_b,
                                },
                            });
                        }
                    }
                }
            }
        }
    }
}
