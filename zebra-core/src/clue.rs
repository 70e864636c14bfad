use crate::category::{CategorySet, Label};
use crate::solution::Solution;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One (category, value) reference inside a clue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    pub cat: String,
    pub value: Label,
}

impl Item {
    pub fn new(cat: &str, value: impl Into<Label>) -> Self {
        Self {
            cat: cat.to_owned(),
            value: value.into(),
        }
    }
}

/// A cross-ordinal anchor: the entity sitting `offset` ranks away (in
/// `ord`) from the item's own rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Anchor {
    pub item: Item,
    pub ord: String,
    pub offset: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinaryOp {
    Is,
    IsNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrdinalOp {
    GreaterThan,
    LessThan,
    NotGreaterThan,
    NotLessThan,
}

impl OrdinalOp {
    /// Compares two rank indices under this operator.
    pub fn compare(self, lhs: usize, rhs: usize) -> bool {
        match self {
            OrdinalOp::GreaterThan => lhs > rhs,
            OrdinalOp::LessThan => lhs < rhs,
            OrdinalOp::NotGreaterThan => lhs <= rhs,
            OrdinalOp::NotLessThan => lhs >= rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SuperlativeOp {
    Min,
    Max,
    NotMin,
    NotMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Parity {
    Odd,
    Even,
}

impl Parity {
    pub fn matches(self, n: i64) -> bool {
        match self {
            Parity::Odd => n.rem_euclid(2) == 1,
            Parity::Even => n.rem_euclid(2) == 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CrossOp {
    Match,
    NotMatch,
}

/// Tag set for constraining which clue forms a generator may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ClueKind {
    Binary,
    Ordinal,
    Superlative,
    Unary,
    CrossOrdinal,
}

impl ClueKind {
    pub const ALL: [ClueKind; 5] = [
        ClueKind::Binary,
        ClueKind::Ordinal,
        ClueKind::Superlative,
        ClueKind::Unary,
        ClueKind::CrossOrdinal,
    ];
}

/// A clue, as a closed sum.
///
/// Every site that interprets clues (solver dispatch, enumerator
/// emission, scorer complexity table, display) matches exhaustively, so
/// a new variant forces an update everywhere at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Clue {
    /// `lhs` and `rhs` belong (Is) or do not belong (IsNot) to the same
    /// entity.
    Binary {
        op: BinaryOp,
        lhs: Item,
        rhs: Item,
    },
    /// `lhs`'s entity compares to `rhs`'s entity by rank in `ord`. The
    /// two items refer to different entities and neither lives in `ord`.
    Ordinal {
        op: OrdinalOp,
        lhs: Item,
        rhs: Item,
        ord: String,
    },
    /// `target`'s entity holds (or does not hold) the extreme rank of
    /// `ord`.
    Superlative {
        op: SuperlativeOp,
        target: Item,
        ord: String,
    },
    /// The numeric value `target`'s entity holds in `ord` has the given
    /// parity.
    Unary {
        parity: Parity,
        target: Item,
        ord: String,
    },
    /// The entities derived from the two anchors coincide (Match) or
    /// differ (NotMatch).
    CrossOrdinal { op: CrossOp, a: Anchor, b: Anchor },
}

impl Clue {
    pub fn is(lhs: Item, rhs: Item) -> Self {
        Clue::Binary {
            op: BinaryOp::Is,
            lhs,
            rhs,
        }
    }

    pub fn is_not(lhs: Item, rhs: Item) -> Self {
        Clue::Binary {
            op: BinaryOp::IsNot,
            lhs,
            rhs,
        }
    }

    pub fn kind(&self) -> ClueKind {
        match self {
            Clue::Binary { .. } => ClueKind::Binary,
            Clue::Ordinal { .. } => ClueKind::Ordinal,
            Clue::Superlative { .. } => ClueKind::Superlative,
            Clue::Unary { .. } => ClueKind::Unary,
            Clue::CrossOrdinal { .. } => ClueKind::CrossOrdinal,
        }
    }

    /// Evaluates the clue against a solution. Clues that reference
    /// unknown categories or values, or that are structurally malformed
    /// (an ordinal comparison anchored inside its own ordinal category,
    /// an out-of-range cross-ordinal offset), evaluate to false.
    pub fn holds(&self, cats: &CategorySet, solution: &Solution) -> bool {
        match self {
            Clue::Binary { op, lhs, rhs } => {
                let (Some(e1), Some(e2)) = (
                    solution.entity_of_item(cats, lhs),
                    solution.entity_of_item(cats, rhs),
                ) else {
                    return false;
                };
                match op {
                    BinaryOp::Is => e1 == e2,
                    BinaryOp::IsNot => e1 != e2,
                }
            }
            Clue::Ordinal { op, lhs, rhs, ord } => {
                let Some(o) = cats.index_of(ord) else {
                    return false;
                };
                if lhs.cat == *ord || rhs.cat == *ord {
                    return false;
                }
                let (Some(e1), Some(e2)) = (
                    solution.entity_of_item(cats, lhs),
                    solution.entity_of_item(cats, rhs),
                ) else {
                    return false;
                };
                e1 != e2 && op.compare(solution.value_of(o, e1), solution.value_of(o, e2))
            }
            Clue::Superlative { op, target, ord } => {
                let Some(o) = cats.index_of(ord) else {
                    return false;
                };
                let Some(e) = solution.entity_of_item(cats, target) else {
                    return false;
                };
                let rank = solution.value_of(o, e);
                let last = cats.k() - 1;
                match op {
                    SuperlativeOp::Min => rank == 0,
                    SuperlativeOp::Max => rank == last,
                    SuperlativeOp::NotMin => rank != 0,
                    SuperlativeOp::NotMax => rank != last,
                }
            }
            Clue::Unary {
                parity,
                target,
                ord,
            } => {
                let Some(o) = cats.index_of(ord) else {
                    return false;
                };
                let Some(e) = solution.entity_of_item(cats, target) else {
                    return false;
                };
                let Some(n) = cats.label(o, solution.value_of(o, e)).as_int() else {
                    return false;
                };
                parity.matches(n)
            }
            Clue::CrossOrdinal { op, a, b } => {
                let (Some(e1), Some(e2)) = (
                    derived_entity(cats, solution, a),
                    derived_entity(cats, solution, b),
                ) else {
                    return false;
                };
                match op {
                    CrossOp::Match => e1 == e2,
                    CrossOp::NotMatch => e1 != e2,
                }
            }
        }
    }
}

/// The entity an anchor points at: the one whose rank in `anchor.ord` is
/// the anchor item's rank plus the offset.
fn derived_entity(cats: &CategorySet, solution: &Solution, anchor: &Anchor) -> Option<usize> {
    let o = cats.index_of(&anchor.ord)?;
    let e = solution.entity_of_item(cats, &anchor.item)?;
    let rank = solution.value_of(o, e) as i64 + anchor.offset as i64;
    if rank < 0 || rank >= cats.k() as i64 {
        return None;
    }
    Some(solution.entity_of(o, rank as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    fn setup() -> (CategorySet, Solution) {
        let cats = CategorySet::new(vec![
            Category::nominal("name", ["Alice", "Bob", "Charlie"]),
            Category::nominal("snack", ["Chips", "Popcorn", "Candy"]),
            Category::ordinal("age", [20, 30, 40]),
        ])
        .unwrap();
        // Alice: Popcorn, 40. Bob: Candy, 20. Charlie: Chips, 30.
        let solution = Solution::from_perms(vec![
            vec![0, 1, 2],
            vec![1, 2, 0],
            vec![2, 0, 1],
        ]);
        (cats, solution)
    }

    #[test]
    fn binary_truth_follows_the_solution() {
        let (cats, sol) = setup();
        assert!(Clue::is(Item::new("name", "Alice"), Item::new("snack", "Popcorn")).holds(&cats, &sol));
        assert!(!Clue::is(Item::new("name", "Alice"), Item::new("snack", "Chips")).holds(&cats, &sol));
        assert!(Clue::is_not(Item::new("name", "Bob"), Item::new("snack", "Chips")).holds(&cats, &sol));
    }

    #[test]
    fn ordinal_comparisons_use_rank() {
        let (cats, sol) = setup();
        let clue = Clue::Ordinal {
            op: OrdinalOp::GreaterThan,
            lhs: Item::new("name", "Alice"),
            rhs: Item::new("name", "Charlie"),
            ord: "age".to_owned(),
        };
        assert!(clue.holds(&cats, &sol));
        let clue = Clue::Ordinal {
            op: OrdinalOp::NotLessThan,
            lhs: Item::new("name", "Bob"),
            rhs: Item::new("snack", "Popcorn"),
            ord: "age".to_owned(),
        };
        assert!(!clue.holds(&cats, &sol));
    }

    #[test]
    fn ordinal_anchored_in_its_own_category_is_malformed() {
        let (cats, sol) = setup();
        let clue = Clue::Ordinal {
            op: OrdinalOp::GreaterThan,
            lhs: Item::new("age", 40),
            rhs: Item::new("name", "Bob"),
            ord: "age".to_owned(),
        };
        assert!(!clue.holds(&cats, &sol));
    }

    #[test]
    fn superlative_and_parity_truth() {
        let (cats, sol) = setup();
        let max = Clue::Superlative {
            op: SuperlativeOp::Max,
            target: Item::new("name", "Alice"),
            ord: "age".to_owned(),
        };
        assert!(max.holds(&cats, &sol));
        let not_min = Clue::Superlative {
            op: SuperlativeOp::NotMin,
            target: Item::new("name", "Charlie"),
            ord: "age".to_owned(),
        };
        assert!(not_min.holds(&cats, &sol));
        let even = Clue::Unary {
            parity: Parity::Even,
            target: Item::new("name", "Bob"),
            ord: "age".to_owned(),
        };
        assert!(even.holds(&cats, &sol));
    }

    #[test]
    fn cross_ordinal_offsets_derive_entities() {
        let cats = CategorySet::new(vec![
            Category::nominal("name", ["Alice", "Bob"]),
            Category::ordinal("age", [10, 20]),
            Category::ordinal("height", [100, 200]),
        ])
        .unwrap();
        // Alice: age 10, height 200. Bob: age 20, height 100.
        let sol = Solution::from_perms(vec![vec![0, 1], vec![0, 1], vec![1, 0]]);
        let coincide = Clue::CrossOrdinal {
            op: CrossOp::Match,
            a: Anchor {
                item: Item::new("age", 10),
                ord: "age".to_owned(),
                offset: 0,
            },
            b: Anchor {
                item: Item::new("height", 200),
                ord: "height".to_owned(),
                offset: 0,
            },
        };
        assert!(coincide.holds(&cats, &sol));
        let shifted = Clue::CrossOrdinal {
            op: CrossOp::NotMatch,
            a: Anchor {
                item: Item::new("age", 10),
                ord: "age".to_owned(),
                offset: 1,
            },
            b: Anchor {
                item: Item::new("height", 200),
                ord: "height".to_owned(),
                offset: 0,
            },
        };
        // Age rank 1 is Bob; height 200 is Alice.
        assert!(shifted.holds(&cats, &sol));
        let out_of_range = Clue::CrossOrdinal {
            op: CrossOp::Match,
            a: Anchor {
                item: Item::new("age", 20),
                ord: "age".to_owned(),
                offset: 1,
            },
            b: Anchor {
                item: Item::new("height", 100),
                ord: "height".to_owned(),
                offset: 0,
            },
        };
        assert!(!out_of_range.holds(&cats, &sol));
    }
}
