#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod enumerate;
pub mod generator;
pub mod score;
pub mod seed;

pub use crate::enumerate::enumerate_clues;
pub use crate::generator::{
    ClueCountBounds, GenerateConfig, Seed, clue_count_bounds, generate_puzzle,
};
pub use crate::score::{ScoreMode, TargetRef, score_clue};
pub use crate::seed::{Mulberry32, seed_from_text};
pub use zebra_core::{ConfigurationError, Puzzle};
