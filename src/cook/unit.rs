//! Unit resolution: turning a trait template into one concrete selection
//!
//! Which combination is chosen per admitted unit is a pluggable policy:
//! weighted random sampling is the default, and a sequential enumerator is
//! provided for callers that want deterministic coverage of the
//! combination space.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::collection::{TraitCategory, TraitTemplate};
use crate::error::{CookError, CookResult};

/// One resolved trait choice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraitSelection {
    pub category: String,
    pub value: String,
}

impl TraitSelection {
    pub fn new(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            value: value.into(),
        }
    }
}

/// Strategy for resolving one unit's trait combination from a template
pub trait UnitResolver: Send + Sync {
    fn resolve(&self, template: &TraitTemplate) -> CookResult<Vec<TraitSelection>>;
}

/// Weighted random sampling over the trait tree.
///
/// Each category independently samples one option proportionally to its
/// weight; nested categories of the chosen option are sampled recursively.
pub struct WeightedRandomResolver {
    rng: Mutex<StdRng>,
}

impl WeightedRandomResolver {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Seeded resolver for reproducible sampling in tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn resolve_category(
        rng: &mut StdRng,
        category: &TraitCategory,
        selections: &mut Vec<TraitSelection>,
    ) -> CookResult<()> {
        let total: u64 = category.options.iter().map(|o| u64::from(o.weight)).sum();
        if total == 0 {
            return Err(CookError::unit_resolution(format!(
                "category {} has no selectable options",
                category.name
            )));
        }

        let mut roll = rng.random_range(0..total);
        for option in &category.options {
            let weight = u64::from(option.weight);
            if roll < weight {
                selections.push(TraitSelection::new(&category.name, &option.value));
                for child in &option.children {
                    Self::resolve_category(rng, child, selections)?;
                }
                return Ok(());
            }
            roll -= weight;
        }
        unreachable!("roll is bounded by the weight total");
    }
}

impl Default for WeightedRandomResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitResolver for WeightedRandomResolver {
    fn resolve(&self, template: &TraitTemplate) -> CookResult<Vec<TraitSelection>> {
        let mut rng = self.rng.lock().unwrap();
        let mut selections = Vec::new();
        for category in &template.categories {
            Self::resolve_category(&mut rng, category, &mut selections)?;
        }
        Ok(selections)
    }
}

/// Deterministic enumeration of the combination space.
///
/// Successive calls walk the cartesian product of top-level options in
/// mixed-radix order, cycling once the space is exhausted. Option weights
/// are ignored; weight-0 options are still excluded.
pub struct SequentialResolver {
    counter: AtomicU64,
}

impl SequentialResolver {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    fn resolve_category(
        index: &mut u64,
        category: &TraitCategory,
        selections: &mut Vec<TraitSelection>,
    ) -> CookResult<()> {
        let options: Vec<_> = category.options.iter().filter(|o| o.weight > 0).collect();
        if options.is_empty() {
            return Err(CookError::unit_resolution(format!(
                "category {} has no selectable options",
                category.name
            )));
        }

        let len = options.len() as u64;
        let option = options[(*index % len) as usize];
        *index /= len;
        selections.push(TraitSelection::new(&category.name, &option.value));
        for child in &option.children {
            Self::resolve_category(index, child, selections)?;
        }
        Ok(())
    }
}

impl Default for SequentialResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitResolver for SequentialResolver {
    fn resolve(&self, template: &TraitTemplate) -> CookResult<Vec<TraitSelection>> {
        let mut index = self.counter.fetch_add(1, Ordering::SeqCst);
        let mut selections = Vec::new();
        for category in &template.categories {
            Self::resolve_category(&mut index, category, &mut selections)?;
        }
        Ok(selections)
    }
}
