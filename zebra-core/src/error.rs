use thiserror::Error;

use crate::category::Label;

/// The single error taxonomy of the crate family.
///
/// Everything that can go wrong is an invalid input or an unreachable
/// generation goal; both are reported at the outermost API boundary.
/// Grid mutation and clue application never raise.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("at least two categories are required")]
    NotEnoughCategories,

    #[error("duplicate category id `{0}`")]
    DuplicateCategory(String),

    #[error("category `{0}` needs at least two values")]
    CategoryTooSmall(String),

    #[error("category `{category}` has {len} values, exceeding max {max}")]
    CategoryTooLarge {
        category: String,
        len: usize,
        max: usize,
    },

    #[error("category `{category}` has {len} values, expected {expected}")]
    ValueCountMismatch {
        category: String,
        len: usize,
        expected: usize,
    },

    #[error("duplicate value {value} in category `{category}`")]
    DuplicateValue { category: String, value: Label },

    #[error("ordinal category `{0}` must hold numeric values")]
    OrdinalNotNumeric(String),

    #[error("ordinal category `{0}` values must be sorted ascending")]
    OrdinalNotSorted(String),

    #[error("unknown category `{0}` in target fact")]
    UnknownTargetCategory(String),

    #[error("unknown value {value} in target category `{category}`")]
    UnknownTargetValue { category: String, value: Label },

    #[error("target fact categories must be distinct")]
    TargetCategoriesEqual,

    #[error("max_candidates must be at least 1")]
    MaxCandidatesTooSmall,

    #[error("Invalid Constraints")]
    InvalidConstraints,

    #[error("Could not generate puzzle")]
    CouldNotGenerate,
}
