//! Collection definitions read by the cook engine
//!
//! Collections are mutated by the collection-management endpoints, which are
//! not part of this crate; the orchestrator treats them as read-only input.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::owner::OwnerRef;

/// Flat parameter overrides passed through to the generator
pub type ParamOverrides = HashMap<String, serde_json::Value>;

/// Reference to the external generator that produces items for a collection.
///
/// A collection invokes exactly one of a parameterized tool or a multi-step
/// spell; the closed enum makes the "both set" document shape
/// unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorRef {
    /// Single-invocation parameterized tool
    Tool(String),
    /// Multi-step spell; intermediate sub-steps do not count toward supply
    Spell(String),
}

impl GeneratorRef {
    /// The generator identifier, regardless of kind
    pub fn id(&self) -> &str {
        match self {
            GeneratorRef::Tool(id) | GeneratorRef::Spell(id) => id,
        }
    }

    /// Whether this generator is a multi-step spell
    pub fn is_spell(&self) -> bool {
        matches!(self, GeneratorRef::Spell(_))
    }
}

/// One selectable option within a trait category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraitOption {
    /// Option value, e.g. "emerald" for a "background" category
    pub value: String,
    /// Relative sampling weight; options with weight 0 are never selected
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Nested categories that only apply when this option is selected
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TraitCategory>,
}

fn default_weight() -> u32 {
    1
}

impl TraitOption {
    /// Create an option with the default weight and no children
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            weight: default_weight(),
            children: Vec::new(),
        }
    }

    /// Create an option with an explicit weight
    pub fn weighted(value: impl Into<String>, weight: u32) -> Self {
        Self {
            value: value.into(),
            weight,
            children: Vec::new(),
        }
    }
}

/// A named trait category with weighted or enumerated options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraitCategory {
    pub name: String,
    pub options: Vec<TraitOption>,
}

impl TraitCategory {
    pub fn new(name: impl Into<String>, options: Vec<TraitOption>) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// Tree of trait categories a collection draws its units from
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraitTemplate {
    #[serde(default)]
    pub categories: Vec<TraitCategory>,
}

impl TraitTemplate {
    /// Template with no categories; units carry only parameter overrides
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(categories: Vec<TraitCategory>) -> Self {
        Self { categories }
    }
}

/// Durable definition of what a cook produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub owner: OwnerRef,
    pub generator: GeneratorRef,
    /// The cook's goal; zero means the collection is not active
    #[serde(default)]
    pub target_supply: u64,
    #[serde(default)]
    pub traits: TraitTemplate,
    #[serde(default)]
    pub params: ParamOverrides,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_ref_serializes_as_single_keyed_document() {
        let tool = GeneratorRef::Tool("tool-1".to_string());
        assert_eq!(serde_json::to_string(&tool).unwrap(), r#"{"tool":"tool-1"}"#);

        let spell: GeneratorRef = serde_json::from_str(r#"{"spell":"spell-2"}"#).unwrap();
        assert!(spell.is_spell());
        assert_eq!(spell.id(), "spell-2");
    }

    #[test]
    fn option_weight_defaults_to_one() {
        let option: TraitOption = serde_json::from_str(r#"{"value":"emerald"}"#).unwrap();
        assert_eq!(option.weight, 1);
        assert!(option.children.is_empty());
    }
}
