use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// The grid stores one `u64` row mask per (pair, value), so a category
/// may hold at most 64 values.
pub const MAX_VALUES: usize = 64;

/// A value label. Unique only within its own category; the same label
/// may appear in several categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Label {
    Int(i64),
    Text(String),
}

impl Label {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Label::Int(n) => Some(*n),
            Label::Text(_) => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(n) => write!(f, "{n}"),
            Label::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Label {
    fn from(n: i64) -> Self {
        Label::Int(n)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Text(s.to_owned())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::Text(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Kind {
    Nominal,
    /// Values are numeric, sorted ascending, and the position in the
    /// value list is the ordinal rank.
    Ordinal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Category {
    pub id: String,
    pub kind: Kind,
    pub values: Vec<Label>,
}

impl Category {
    pub fn nominal(id: &str, values: impl IntoIterator<Item = impl Into<Label>>) -> Self {
        Self {
            id: id.to_owned(),
            kind: Kind::Nominal,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ordinal(id: &str, values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            id: id.to_owned(),
            kind: Kind::Ordinal,
            values: values.into_iter().map(Label::Int).collect(),
        }
    }

    pub fn is_ordinal(&self) -> bool {
        self.kind == Kind::Ordinal
    }
}

/// A validated set of categories with index lookups.
///
/// Construction enforces every structural invariant the rest of the
/// family relies on: unique ids, unique values per category, a shared
/// value count K, and numeric ascending values for ordinal categories.
#[derive(Debug, Clone)]
pub struct CategorySet {
    cats: Vec<Category>,
    k: usize,
    by_id: HashMap<String, usize>,
    value_index: Vec<HashMap<Label, usize>>,
}

impl CategorySet {
    pub fn new(categories: Vec<Category>) -> Result<Self, ConfigurationError> {
        if categories.len() < 2 {
            return Err(ConfigurationError::NotEnoughCategories);
        }

        let k = categories[0].values.len();
        if k < 2 {
            return Err(ConfigurationError::CategoryTooSmall(
                categories[0].id.clone(),
            ));
        }
        if k > MAX_VALUES {
            return Err(ConfigurationError::CategoryTooLarge {
                category: categories[0].id.clone(),
                len: k,
                max: MAX_VALUES,
            });
        }

        let mut by_id = HashMap::with_capacity(categories.len());
        let mut value_index = Vec::with_capacity(categories.len());

        for (ci, cat) in categories.iter().enumerate() {
            if by_id.insert(cat.id.clone(), ci).is_some() {
                return Err(ConfigurationError::DuplicateCategory(cat.id.clone()));
            }
            if cat.values.len() != k {
                return Err(ConfigurationError::ValueCountMismatch {
                    category: cat.id.clone(),
                    len: cat.values.len(),
                    expected: k,
                });
            }

            let mut index = HashMap::with_capacity(k);
            for (vi, value) in cat.values.iter().enumerate() {
                if index.insert(value.clone(), vi).is_some() {
                    return Err(ConfigurationError::DuplicateValue {
                        category: cat.id.clone(),
                        value: value.clone(),
                    });
                }
            }

            if cat.is_ordinal() {
                let mut prev: Option<i64> = None;
                for value in &cat.values {
                    let Some(n) = value.as_int() else {
                        return Err(ConfigurationError::OrdinalNotNumeric(cat.id.clone()));
                    };
                    if let Some(p) = prev
                        && p >= n
                    {
                        return Err(ConfigurationError::OrdinalNotSorted(cat.id.clone()));
                    }
                    prev = Some(n);
                }
            }

            value_index.push(index);
        }

        Ok(Self {
            cats: categories,
            k,
            by_id,
            value_index,
        })
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.cats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cats.is_empty()
    }

    /// Shared value count K.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn categories(&self) -> &[Category] {
        &self.cats
    }

    pub fn category(&self, index: usize) -> &Category {
        &self.cats[index]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn value_index(&self, cat: usize, value: &Label) -> Option<usize> {
        self.value_index[cat].get(value).copied()
    }

    pub fn label(&self, cat: usize, value: usize) -> &Label {
        &self.cats[cat].values[value]
    }

    /// Indices of ordinal categories, in declaration order.
    pub fn ordinal_indices(&self) -> Vec<usize> {
        self.cats
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_ordinal())
            .map(|(i, _)| i)
            .collect()
    }
}
