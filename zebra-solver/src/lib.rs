#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod solver;

pub use crate::solver::apply;
pub use zebra_core::{Clue, Grid};
