use crate::category::{CategorySet, Label};
use crate::clue::Item;

/// The hidden assignment: a bijection per category pair.
///
/// Entity `e` is the hidden tuple identified by value `e` of the base
/// category (`perms[0]` is the identity); `perms[c][e]` is the value
/// index that entity holds in category `c`. The reverse index
/// `inv[c][v]` (value back to entity) is built once at construction
/// and rebuilt when deserializing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(into = "Vec<Vec<usize>>", from = "Vec<Vec<usize>>")
)]
pub struct Solution {
    perms: Vec<Vec<usize>>,
    inv: Vec<Vec<usize>>,
}

impl Solution {
    /// Builds the reverse index from per-category permutations.
    /// `perms[c]` maps entity to value index and must be a bijection.
    pub fn from_perms(perms: Vec<Vec<usize>>) -> Self {
        let inv = perms
            .iter()
            .map(|perm| {
                let mut back = vec![0usize; perm.len()];
                for (entity, &value) in perm.iter().enumerate() {
                    back[value] = entity;
                }
                back
            })
            .collect();
        Self { perms, inv }
    }

    pub fn num_categories(&self) -> usize {
        self.perms.len()
    }

    pub fn k(&self) -> usize {
        self.perms.first().map_or(0, Vec::len)
    }

    /// Value index entity `e` holds in category `cat`.
    pub fn value_of(&self, cat: usize, entity: usize) -> usize {
        self.perms[cat][entity]
    }

    /// Entity holding value index `value` in category `cat`.
    pub fn entity_of(&self, cat: usize, value: usize) -> usize {
        self.inv[cat][value]
    }

    /// Entity an (id, label) item refers to, if the item resolves.
    pub fn entity_of_item(&self, cats: &CategorySet, item: &Item) -> Option<usize> {
        let c = cats.index_of(&item.cat)?;
        let v = cats.value_index(c, &item.value)?;
        Some(self.entity_of(c, v))
    }

    /// The label of `wanted` held by the entity identified by
    /// (`cat`, `value`); the answer to a target fact.
    pub fn answer<'a>(
        &self,
        cats: &'a CategorySet,
        cat: usize,
        value: usize,
        wanted: usize,
    ) -> &'a Label {
        let entity = self.entity_of(cat, value);
        cats.label(wanted, self.value_of(wanted, entity))
    }
}

impl From<Vec<Vec<usize>>> for Solution {
    fn from(perms: Vec<Vec<usize>>) -> Self {
        Self::from_perms(perms)
    }
}

impl From<Solution> for Vec<Vec<usize>> {
    fn from(solution: Solution) -> Self {
        solution.perms
    }
}
