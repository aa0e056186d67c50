#![deny(warnings)]

//! Core domain models and invariants for bomcost.
//!
//! This crate defines the named-resource namespace shared by terminal
//! resources and recipes, recipe bills of materials, cost breakdown rows,
//! and the `Catalog` snapshot the cost engine evaluates against, with
//! validation helpers to guarantee basic invariants.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Case-sensitive name shared by terminal resources and recipes,
/// e.g. "Tritanium" or "Hauler Mk II".
///
/// The two roles are disjoint by convention only: a name priced as a
/// terminal resource today may be defined as a recipe later, so callers
/// must always re-check which role applies at lookup time.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceName(pub String);

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceName {
    fn from(s: &str) -> Self {
        ResourceName(s.to_string())
    }
}

/// One bill-of-materials line as captured when the recipe was authored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeComponent {
    /// Consumed resource; may itself name a recipe.
    pub resource_name: ResourceName,
    /// Amount consumed per production run of the owning recipe (> 0).
    pub quantity: Decimal,
    /// Advisory price captured at authoring time. Written through to the
    /// stored terminal price; never consulted during costing.
    pub unit_price: Decimal,
}

/// A manufactured item: output quantity per run plus its BOM and any
/// one-off acquisition costs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe name within the shared resource namespace.
    pub name: ResourceName,
    /// Units produced per run (> 0).
    pub output_quantity: Decimal,
    /// Optional category tag (e.g. a ship type) used for efficiency defaults.
    #[serde(default)]
    pub category: Option<String>,
    /// Components consumed per run.
    pub components: Vec<RecipeComponent>,
    /// One-off blueprint acquisition price.
    #[serde(default)]
    pub blueprint_cost: Option<Decimal>,
    /// One-off cost of creating the blueprint.
    #[serde(default)]
    pub blueprint_creation_cost: Option<Decimal>,
    /// One-off cost of creating the recipe itself.
    #[serde(default)]
    pub creation_cost: Option<Decimal>,
    /// Separate one-off component list priced without efficiency scaling.
    #[serde(default)]
    pub blueprint_components: Vec<RecipeComponent>,
}

impl Recipe {
    /// Whether any one-off cost or blueprint component list is present.
    pub fn has_additions(&self) -> bool {
        self.blueprint_cost.is_some()
            || self.blueprint_creation_cost.is_some()
            || self.creation_cost.is_some()
            || !self.blueprint_components.is_empty()
    }
}

/// One row of the flattened base-resource breakdown of a costing result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdownEntry {
    /// Terminal resource name.
    pub resource_name: ResourceName,
    /// Total quantity consumed across all paths of the BOM graph.
    pub quantity: Decimal,
    /// Stored unit price at evaluation time.
    pub unit_price: Decimal,
    /// `quantity * unit_price`, recomputed from the merged quantity.
    pub total_cost: Decimal,
}

/// Default production efficiency when none was ever configured.
pub fn default_global_efficiency() -> Decimal {
    Decimal::ONE_HUNDRED
}

/// Immutable snapshot of recipes, terminal prices, and efficiency settings.
///
/// One costing call evaluates against a single `Catalog` so a recipe's
/// definition cannot change mid-walk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Catalog {
    /// Recipe definitions (unique names).
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    /// Stored unit prices for terminal resources.
    #[serde(default)]
    pub resource_prices: BTreeMap<ResourceName, Decimal>,
    /// Per-category efficiency defaults, keyed by category tag.
    #[serde(default)]
    pub category_efficiencies: BTreeMap<String, Decimal>,
    /// Global efficiency fallback (percentage; 100 = no loss).
    #[serde(default = "default_global_efficiency")]
    pub global_efficiency: Decimal,
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog {
            recipes: Vec::new(),
            resource_prices: BTreeMap::new(),
            category_efficiencies: BTreeMap::new(),
            global_efficiency: default_global_efficiency(),
        }
    }
}

impl Catalog {
    /// Look up a recipe by name.
    pub fn find_recipe(&self, name: &ResourceName) -> Option<&Recipe> {
        self.recipes.iter().find(|r| &r.name == name)
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Resource and recipe names must be non-empty.
    #[error("resource name must not be empty")]
    EmptyName,
    /// Output quantity must be strictly positive.
    #[error("recipe '{0}' must have positive output quantity")]
    NonPositiveOutput(ResourceName),
    /// Component quantities must be strictly positive.
    #[error("component '{resource}' of recipe '{recipe}' must have positive quantity")]
    NonPositiveQuantity {
        /// Owning recipe.
        recipe: ResourceName,
        /// Offending component.
        resource: ResourceName,
    },
    /// Prices and one-off costs must be non-negative.
    #[error("negative monetary value for '{0}'")]
    NegativeMoney(ResourceName),
    /// Recipe names must be unique within a catalog.
    #[error("duplicate recipe name '{0}'")]
    DuplicateRecipe(ResourceName),
    /// Efficiency percentages must be strictly positive.
    #[error("efficiency for '{0}' must be greater than zero")]
    NonPositiveEfficiency(String),
}

/// Validate one BOM line in the context of its owning recipe.
pub fn validate_component(
    recipe: &ResourceName,
    component: &RecipeComponent,
) -> Result<(), ValidationError> {
    if component.resource_name.0.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if component.quantity <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveQuantity {
            recipe: recipe.clone(),
            resource: component.resource_name.clone(),
        });
    }
    if component.unit_price < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(
            component.resource_name.clone(),
        ));
    }
    Ok(())
}

/// Validate a recipe definition.
pub fn validate_recipe(recipe: &Recipe) -> Result<(), ValidationError> {
    if recipe.name.0.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if recipe.output_quantity <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveOutput(recipe.name.clone()));
    }
    for component in recipe.components.iter().chain(&recipe.blueprint_components) {
        validate_component(&recipe.name, component)?;
    }
    for cost in [
        recipe.blueprint_cost,
        recipe.blueprint_creation_cost,
        recipe.creation_cost,
    ]
    .into_iter()
    .flatten()
    {
        if cost < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney(recipe.name.clone()));
        }
    }
    Ok(())
}

/// Validate a catalog, including name uniqueness across recipes.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    let mut names: BTreeSet<&ResourceName> = BTreeSet::new();
    for recipe in &catalog.recipes {
        validate_recipe(recipe)?;
        if !names.insert(&recipe.name) {
            return Err(ValidationError::DuplicateRecipe(recipe.name.clone()));
        }
    }
    for (name, price) in &catalog.resource_prices {
        if name.0.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if *price < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney(name.clone()));
        }
    }
    for (category, efficiency) in &catalog.category_efficiencies {
        if *efficiency <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveEfficiency(category.clone()));
        }
    }
    if catalog.global_efficiency <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveEfficiency("global".to_string()));
    }
    Ok(())
}
