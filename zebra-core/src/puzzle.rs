use crate::category::{Category, Label};
use crate::clue::Clue;
use crate::solution::Solution;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The question a puzzle is built around: the value of `wanted` held by
/// the entity identified by (`cat`, `value`). The generator arranges the
/// clue chain so this row resolves only when the whole grid does.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetFact {
    pub cat: String,
    pub value: Label,
    pub wanted: String,
}

impl TargetFact {
    pub fn new(cat: &str, value: impl Into<Label>, wanted: &str) -> Self {
        Self {
            cat: cat.to_owned(),
            value: value.into(),
            wanted: wanted.to_owned(),
        }
    }
}

/// One link of the proof chain: a clue and the number of grid-cell
/// changes its application caused.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProofStep {
    pub clue: Clue,
    pub deductions: usize,
}

/// A finished puzzle: replaying `proof` left to right on a blank grid
/// reaches `solution`. `clues` is the chain's clue multiset; no order is
/// implied beyond the chain itself.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Puzzle {
    pub categories: Vec<Category>,
    pub solution: Solution,
    pub clues: Vec<Clue>,
    pub proof: Vec<ProofStep>,
    pub target: TargetFact,
}
