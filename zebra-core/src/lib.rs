#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod category;
pub mod clue;
pub mod error;
pub mod grid;
pub mod puzzle;
pub mod solution;

pub use crate::category::{Category, CategorySet, Kind, Label, MAX_VALUES};
pub use crate::clue::{
    Anchor, BinaryOp, Clue, ClueKind, CrossOp, Item, OrdinalOp, Parity, SuperlativeOp,
};
pub use crate::error::ConfigurationError;
pub use crate::grid::{Grid, GridStats};
pub use crate::puzzle::{ProofStep, Puzzle, TargetFact};
pub use crate::solution::Solution;
