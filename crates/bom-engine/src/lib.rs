#![deny(warnings)]

//! Recipe cost resolution engine for bomcost.
//!
//! This crate provides validated utilities for:
//! - Resolving the effective production efficiency for a costing request
//! - Recursively expanding a recipe's bill of materials with cycle detection
//! - Aggregating run cost and a flattened base-resource breakdown
//! - Folding in one-off blueprint and creation costs
//!
//! All arithmetic is exact base-10 decimal; the engine is pure and
//! synchronous, reading the store only through [`CostStore`].

use bom_core::{Catalog, CostBreakdownEntry, Recipe, RecipeComponent, ResourceName};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Hard recursion cap for stores whose answers are not self-consistent.
///
/// The visiting set already bounds depth by the number of distinct recipe
/// names on a path; this cap only catches hostile inputs before they
/// exhaust the stack.
pub const MAX_DEPTH: usize = 64;

/// Errors produced by the cost engine.
///
/// Every variant is fatal for the current call and propagates verbatim to
/// the caller; the engine never retries or substitutes defaults.
#[derive(Debug, Error, PartialEq)]
pub enum CostError {
    /// The requested top-level recipe has no definition.
    #[error("recipe '{0}' is not defined")]
    RecipeNotFound(ResourceName),
    /// A terminal resource on some path has never been priced.
    #[error("no price registered for resource '{0}'")]
    ResourcePriceNotFound(ResourceName),
    /// A recipe name reappeared on its own expansion path.
    #[error("circular reference detected for resource '{0}'")]
    CircularReference(ResourceName),
    /// Resolved efficiency was not strictly positive.
    #[error("efficiency must be greater than 0, got {0}")]
    InvalidEfficiency(Decimal),
    /// A recipe's output quantity was not strictly positive.
    #[error("recipe '{0}' must have positive output quantity")]
    InvalidRecipe(ResourceName),
    /// Expansion exceeded [`MAX_DEPTH`].
    #[error("recursion depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),
}

/// Which tier supplied the effective efficiency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencySource {
    /// Explicit per-request override.
    Custom,
    /// Stored default for the recipe's category.
    Category,
    /// Stored global default.
    Global,
}

impl fmt::Display for EfficiencySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            EfficiencySource::Custom => "custom",
            EfficiencySource::Category => "category",
            EfficiencySource::Global => "global",
        };
        f.write_str(tag)
    }
}

/// Read-only data-access contract the engine evaluates against.
///
/// Implementations must answer each lookup atomically; the engine re-reads
/// on every visit and never caches a name's resource/recipe role.
pub trait CostStore {
    /// Full recipe definition, or `None` if `name` is not a recipe.
    fn recipe(&self, name: &ResourceName) -> Option<Recipe>;
    /// Stored terminal unit price, or `None` if never priced.
    fn resource_unit_price(&self, name: &ResourceName) -> Option<Decimal>;
    /// Stored efficiency default for a category, if any.
    fn category_efficiency(&self, category: &str) -> Option<Decimal>;
    /// Global efficiency default (100 when never configured).
    fn global_efficiency(&self) -> Decimal;
}

impl CostStore for Catalog {
    fn recipe(&self, name: &ResourceName) -> Option<Recipe> {
        self.find_recipe(name).cloned()
    }

    fn resource_unit_price(&self, name: &ResourceName) -> Option<Decimal> {
        self.resource_prices.get(name).copied()
    }

    fn category_efficiency(&self, category: &str) -> Option<Decimal> {
        self.category_efficiencies.get(category).copied()
    }

    fn global_efficiency(&self) -> Decimal {
        self.global_efficiency
    }
}

/// Pick the effective efficiency: explicit override, then category default,
/// then global default.
pub fn resolve_efficiency<S: CostStore>(
    store: &S,
    explicit: Option<Decimal>,
    category: Option<&str>,
) -> Result<(Decimal, EfficiencySource), CostError> {
    let (value, source) = if let Some(value) = explicit {
        (value, EfficiencySource::Custom)
    } else if let Some(value) = category.and_then(|c| store.category_efficiency(c)) {
        (value, EfficiencySource::Category)
    } else {
        (store.global_efficiency(), EfficiencySource::Global)
    };
    if value <= Decimal::ZERO {
        return Err(CostError::InvalidEfficiency(value));
    }
    Ok((value, source))
}

/// Result of one costing call.
#[derive(Clone, Debug, Serialize)]
pub struct CostResult {
    /// Target recipe name.
    pub recipe_name: ResourceName,
    /// Effective efficiency percentage.
    pub efficiency: Decimal,
    /// Tier the efficiency came from.
    pub efficiency_source: EfficiencySource,
    /// Category tag of the target recipe, if any.
    pub category: Option<String>,
    /// Units produced per run.
    pub output_quantity: Decimal,
    /// Total cost of one production run.
    pub run_cost: Decimal,
    /// `run_cost / output_quantity`.
    pub unit_cost: Decimal,
    /// Flattened base-resource breakdown, sorted by name.
    pub breakdown: Vec<CostBreakdownEntry>,
    /// One-off blueprint acquisition price, if set.
    pub blueprint_cost: Option<Decimal>,
    /// One-off recipe creation cost, if set.
    pub creation_cost: Option<Decimal>,
    /// One-off blueprint creation cost, if set.
    pub blueprint_creation_cost: Option<Decimal>,
    /// Cost of the blueprint component list (multiplier 1), if present.
    pub blueprint_components_cost: Option<Decimal>,
    /// Base-resource breakdown of the blueprint component list.
    pub blueprint_breakdown: Vec<CostBreakdownEntry>,
    /// `run_cost` plus every present one-off cost; `None` when the recipe
    /// carries no additions.
    pub total_with_additions: Option<Decimal>,
    /// `total_with_additions / output_quantity`.
    pub unit_cost_with_additions: Option<Decimal>,
}

#[derive(Clone, Copy, Debug)]
struct BreakdownAcc {
    quantity: Decimal,
    unit_price: Decimal,
}

type Breakdown = BTreeMap<ResourceName, BreakdownAcc>;

/// Price one production run of `recipe_name` against `store`.
///
/// `efficiency_override` takes precedence over the recipe category's stored
/// default and the global default. The quantity multiplier is
/// `efficiency / 100`: higher efficiency is cheaper, and 50% efficiency
/// consumes half the nominal quantities. The multiplier scales the target
/// run's direct component quantities once; sub-recipe runs are priced
/// nominally and folded in as unit costs, so run cost is exactly linear in
/// the multiplier.
pub fn calculate_cost<S: CostStore>(
    store: &S,
    recipe_name: &ResourceName,
    efficiency_override: Option<Decimal>,
) -> Result<CostResult, CostError> {
    let recipe = store
        .recipe(recipe_name)
        .ok_or_else(|| CostError::RecipeNotFound(recipe_name.clone()))?;
    if recipe.output_quantity <= Decimal::ZERO {
        return Err(CostError::InvalidRecipe(recipe.name.clone()));
    }

    let (efficiency, efficiency_source) =
        resolve_efficiency(store, efficiency_override, recipe.category.as_deref())?;
    let multiplier = efficiency / Decimal::ONE_HUNDRED;
    debug!(recipe = %recipe_name, %efficiency, %efficiency_source, "costing recipe");

    let mut visiting = BTreeSet::from([recipe_name.clone()]);
    let (run_cost, breakdown) =
        evaluate_components(store, &recipe.components, &mut visiting, multiplier, 0)?;
    let unit_cost = run_cost / recipe.output_quantity;

    // One-off blueprint component list: never scaled by efficiency or
    // output quantity.
    let (blueprint_components_cost, blueprint_breakdown) = if recipe.blueprint_components.is_empty()
    {
        (None, Vec::new())
    } else {
        let mut visiting = BTreeSet::from([recipe_name.clone()]);
        let (cost, acc) = evaluate_components(
            store,
            &recipe.blueprint_components,
            &mut visiting,
            Decimal::ONE,
            0,
        )?;
        (Some(cost), finalize_breakdown(acc))
    };

    let (total_with_additions, unit_cost_with_additions) = if recipe.has_additions() {
        let total = run_cost
            + blueprint_components_cost.unwrap_or(Decimal::ZERO)
            + recipe.blueprint_cost.unwrap_or(Decimal::ZERO)
            + recipe.creation_cost.unwrap_or(Decimal::ZERO)
            + recipe.blueprint_creation_cost.unwrap_or(Decimal::ZERO);
        (Some(total), Some(total / recipe.output_quantity))
    } else {
        (None, None)
    };

    Ok(CostResult {
        recipe_name: recipe_name.clone(),
        efficiency,
        efficiency_source,
        category: recipe.category.clone(),
        output_quantity: recipe.output_quantity,
        run_cost,
        unit_cost,
        breakdown: finalize_breakdown(breakdown),
        blueprint_cost: recipe.blueprint_cost,
        creation_cost: recipe.creation_cost,
        blueprint_creation_cost: recipe.blueprint_creation_cost,
        blueprint_components_cost,
        blueprint_breakdown,
        total_with_additions,
        unit_cost_with_additions,
    })
}

/// Expand a component list, accumulating run cost and the flattened
/// base-resource breakdown.
///
/// `visiting` holds the recipe names on the active expansion path; a name
/// reappearing there is a cycle. Membership mirrors the call stack, so the
/// same name may appear in two independent branches of the graph.
fn evaluate_components<S: CostStore>(
    store: &S,
    components: &[RecipeComponent],
    visiting: &mut BTreeSet<ResourceName>,
    multiplier: Decimal,
    depth: usize,
) -> Result<(Decimal, Breakdown), CostError> {
    if depth >= MAX_DEPTH {
        return Err(CostError::DepthLimitExceeded(MAX_DEPTH));
    }

    let mut run_cost = Decimal::ZERO;
    let mut breakdown = Breakdown::new();

    for component in components {
        let effective_quantity = component.quantity * multiplier;

        // Role is re-checked on every visit: a name priced as a terminal
        // resource yesterday may be a recipe today.
        if let Some(sub) = store.recipe(&component.resource_name) {
            if visiting.contains(&component.resource_name) {
                return Err(CostError::CircularReference(component.resource_name.clone()));
            }
            if sub.output_quantity <= Decimal::ZERO {
                return Err(CostError::InvalidRecipe(sub.name.clone()));
            }

            visiting.insert(component.resource_name.clone());
            let result =
                evaluate_components(store, &sub.components, visiting, Decimal::ONE, depth + 1);
            visiting.remove(&component.resource_name);
            let (sub_run_cost, sub_breakdown) = result?;

            // Convert the nominal run into cost and quantities per unit of
            // the sub-recipe's output, then scale by this line's quantity.
            let sub_unit_cost = sub_run_cost / sub.output_quantity;
            run_cost += effective_quantity * sub_unit_cost;
            for (name, acc) in sub_breakdown {
                let quantity_per_unit = acc.quantity / sub.output_quantity;
                merge(
                    &mut breakdown,
                    name,
                    quantity_per_unit * effective_quantity,
                    acc.unit_price,
                );
            }
        } else {
            let unit_price = store
                .resource_unit_price(&component.resource_name)
                .ok_or_else(|| {
                    CostError::ResourcePriceNotFound(component.resource_name.clone())
                })?;
            run_cost += effective_quantity * unit_price;
            merge(
                &mut breakdown,
                component.resource_name.clone(),
                effective_quantity,
                unit_price,
            );
        }
    }

    Ok((run_cost, breakdown))
}

fn merge(breakdown: &mut Breakdown, name: ResourceName, quantity: Decimal, unit_price: Decimal) {
    let entry = breakdown.entry(name).or_insert(BreakdownAcc {
        quantity: Decimal::ZERO,
        unit_price,
    });
    entry.quantity += quantity;
    // A base resource has a single stored price, so last write is safe.
    entry.unit_price = unit_price;
}

/// Finalize the aggregate into sorted rows, recomputing each total from the
/// merged quantity to avoid compounding rounding error.
fn finalize_breakdown(breakdown: Breakdown) -> Vec<CostBreakdownEntry> {
    breakdown
        .into_iter()
        .map(|(resource_name, acc)| CostBreakdownEntry {
            resource_name,
            quantity: acc.quantity,
            unit_price: acc.unit_price,
            total_cost: acc.quantity * acc.unit_price,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bom_core::Recipe;
    use proptest::prelude::*;

    fn component(name: &str, quantity: i64) -> RecipeComponent {
        RecipeComponent {
            resource_name: name.into(),
            quantity: Decimal::new(quantity, 0),
            unit_price: Decimal::ZERO,
        }
    }

    fn recipe(name: &str, output: i64, components: Vec<RecipeComponent>) -> Recipe {
        Recipe {
            name: name.into(),
            output_quantity: Decimal::new(output, 0),
            category: None,
            components,
            blueprint_cost: None,
            blueprint_creation_cost: None,
            creation_cost: None,
            blueprint_components: vec![],
        }
    }

    /// Scenario from the Widget/Gadget/Bolt family: Widget (output 1) needs
    /// 2x Bolt (price 3) and 1x Gadget (output 2, needs 4x Bolt).
    fn widget_catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog
            .recipes
            .push(recipe("Widget", 1, vec![component("Bolt", 2), component("Gadget", 1)]));
        catalog
            .recipes
            .push(recipe("Gadget", 2, vec![component("Bolt", 4)]));
        catalog
            .resource_prices
            .insert("Bolt".into(), Decimal::new(3, 0));
        catalog
    }

    #[test]
    fn widget_at_full_efficiency() {
        let catalog = widget_catalog();
        let result = calculate_cost(&catalog, &"Widget".into(), None).unwrap();
        assert_eq!(result.run_cost, Decimal::new(12, 0));
        assert_eq!(result.unit_cost, Decimal::new(12, 0));
        assert_eq!(result.efficiency, Decimal::ONE_HUNDRED);
        assert_eq!(result.efficiency_source, EfficiencySource::Global);
        assert_eq!(result.breakdown.len(), 1);
        let bolt = &result.breakdown[0];
        assert_eq!(bolt.resource_name, "Bolt".into());
        assert_eq!(bolt.quantity, Decimal::new(4, 0));
        assert_eq!(bolt.total_cost, Decimal::new(12, 0));
        assert_eq!(result.total_with_additions, None);
    }

    #[test]
    fn half_efficiency_halves_run_cost() {
        let catalog = widget_catalog();
        let result =
            calculate_cost(&catalog, &"Widget".into(), Some(Decimal::new(50, 0))).unwrap();
        assert_eq!(result.run_cost, Decimal::new(6, 0));
        assert_eq!(result.efficiency_source, EfficiencySource::Custom);
    }

    #[test]
    fn cycle_is_detected() {
        let mut catalog = Catalog::default();
        catalog
            .recipes
            .push(recipe("Widget", 1, vec![component("Bolt", 2), component("Gadget", 1)]));
        catalog
            .recipes
            .push(recipe("Gadget", 1, vec![component("Widget", 1)]));
        catalog
            .resource_prices
            .insert("Bolt".into(), Decimal::new(3, 0));
        let err = calculate_cost(&catalog, &"Widget".into(), None).unwrap_err();
        assert!(matches!(err, CostError::CircularReference(_)));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut catalog = Catalog::default();
        catalog
            .recipes
            .push(recipe("Widget", 1, vec![component("Widget", 1)]));
        let err = calculate_cost(&catalog, &"Widget".into(), None).unwrap_err();
        assert_eq!(err, CostError::CircularReference("Widget".into()));
    }

    #[test]
    fn sub_recipe_cost_is_normalized_per_unit() {
        // Gadget: run cost 100, output 5 => contributes 20 per unit.
        let mut catalog = Catalog::default();
        catalog
            .recipes
            .push(recipe("Widget", 1, vec![component("Gadget", 1)]));
        catalog
            .recipes
            .push(recipe("Gadget", 5, vec![component("Ore", 10)]));
        catalog
            .resource_prices
            .insert("Ore".into(), Decimal::new(10, 0));
        let result = calculate_cost(&catalog, &"Widget".into(), None).unwrap();
        assert_eq!(result.run_cost, Decimal::new(20, 0));
        let ore = &result.breakdown[0];
        assert_eq!(ore.quantity, Decimal::new(2, 0)); // 10 / 5
    }

    #[test]
    fn missing_price_is_named_even_when_nested() {
        let mut catalog = Catalog::default();
        catalog
            .recipes
            .push(recipe("A", 1, vec![component("B", 1)]));
        catalog.recipes.push(recipe("B", 1, vec![component("C", 1)]));
        catalog
            .recipes
            .push(recipe("C", 1, vec![component("Unobtanium", 1)]));
        let err = calculate_cost(&catalog, &"A".into(), None).unwrap_err();
        assert_eq!(err, CostError::ResourcePriceNotFound("Unobtanium".into()));
    }

    #[test]
    fn top_level_recipe_must_exist() {
        let catalog = Catalog::default();
        let err = calculate_cost(&catalog, &"Ghost".into(), None).unwrap_err();
        assert_eq!(err, CostError::RecipeNotFound("Ghost".into()));
    }

    #[test]
    fn sub_recipe_with_zero_output_is_invalid() {
        let mut catalog = Catalog::default();
        catalog
            .recipes
            .push(recipe("Widget", 1, vec![component("Gadget", 1)]));
        catalog.recipes.push(recipe("Gadget", 0, vec![]));
        let err = calculate_cost(&catalog, &"Widget".into(), None).unwrap_err();
        assert_eq!(err, CostError::InvalidRecipe("Gadget".into()));
    }

    #[test]
    fn efficiency_tiers_resolve_in_priority_order() {
        let mut catalog = widget_catalog();
        catalog.recipes[0].category = Some("Hauler".to_string());
        catalog
            .category_efficiencies
            .insert("Hauler".to_string(), Decimal::new(80, 0));
        catalog.global_efficiency = Decimal::new(90, 0);

        let by_category = calculate_cost(&catalog, &"Widget".into(), None).unwrap();
        assert_eq!(by_category.efficiency, Decimal::new(80, 0));
        assert_eq!(by_category.efficiency_source, EfficiencySource::Category);

        let custom =
            calculate_cost(&catalog, &"Widget".into(), Some(Decimal::new(60, 0))).unwrap();
        assert_eq!(custom.efficiency, Decimal::new(60, 0));
        assert_eq!(custom.efficiency_source, EfficiencySource::Custom);

        catalog.category_efficiencies.clear();
        let global = calculate_cost(&catalog, &"Widget".into(), None).unwrap();
        assert_eq!(global.efficiency, Decimal::new(90, 0));
        assert_eq!(global.efficiency_source, EfficiencySource::Global);
    }

    #[test]
    fn zero_efficiency_is_rejected() {
        let catalog = widget_catalog();
        let err = calculate_cost(&catalog, &"Widget".into(), Some(Decimal::ZERO)).unwrap_err();
        assert_eq!(err, CostError::InvalidEfficiency(Decimal::ZERO));
    }

    #[test]
    fn shared_sub_recipe_in_sibling_branches_is_legal() {
        // Frame appears under both Hull and Deck; only path-local repeats
        // are cycles.
        let mut catalog = Catalog::default();
        catalog.recipes.push(recipe(
            "Ship",
            1,
            vec![component("Hull", 1), component("Deck", 1)],
        ));
        catalog
            .recipes
            .push(recipe("Hull", 1, vec![component("Frame", 2)]));
        catalog
            .recipes
            .push(recipe("Deck", 1, vec![component("Frame", 3)]));
        catalog
            .recipes
            .push(recipe("Frame", 1, vec![component("Steel", 2)]));
        catalog
            .resource_prices
            .insert("Steel".into(), Decimal::new(5, 0));
        let result = calculate_cost(&catalog, &"Ship".into(), None).unwrap();
        // 5 frames of 2 steel each.
        assert_eq!(result.run_cost, Decimal::new(50, 0));
        let steel = &result.breakdown[0];
        assert_eq!(steel.quantity, Decimal::new(10, 0));
    }

    #[test]
    fn recipe_role_wins_over_stored_price() {
        // Gadget has a stale stored price and a recipe definition; the
        // definition must win.
        let mut catalog = widget_catalog();
        catalog
            .resource_prices
            .insert("Gadget".into(), Decimal::new(1_000, 0));
        let result = calculate_cost(&catalog, &"Widget".into(), None).unwrap();
        assert_eq!(result.run_cost, Decimal::new(12, 0));
    }

    #[test]
    fn depth_limit_guards_hostile_chains() {
        let mut catalog = Catalog::default();
        for i in 0..(MAX_DEPTH + 10) {
            catalog.recipes.push(recipe(
                &format!("Stage{i}"),
                1,
                vec![component(&format!("Stage{}", i + 1), 1)],
            ));
        }
        catalog.resource_prices.insert(
            format!("Stage{}", MAX_DEPTH + 10).as_str().into(),
            Decimal::ONE,
        );
        let err = calculate_cost(&catalog, &"Stage0".into(), None).unwrap_err();
        assert_eq!(err, CostError::DepthLimitExceeded(MAX_DEPTH));
    }

    #[test]
    fn additions_fold_into_grand_total() {
        let mut catalog = widget_catalog();
        catalog.recipes[0].blueprint_cost = Some(Decimal::new(100, 0));
        catalog.recipes[0].creation_cost = Some(Decimal::new(30, 0));
        catalog.recipes[0].blueprint_creation_cost = Some(Decimal::new(20, 0));
        catalog.recipes[0].blueprint_components = vec![component("Bolt", 5)];

        // Half efficiency must not scale the blueprint component list.
        let result =
            calculate_cost(&catalog, &"Widget".into(), Some(Decimal::new(50, 0))).unwrap();
        assert_eq!(result.run_cost, Decimal::new(6, 0));
        assert_eq!(result.blueprint_components_cost, Some(Decimal::new(15, 0)));
        assert_eq!(result.blueprint_breakdown.len(), 1);
        assert_eq!(result.blueprint_breakdown[0].quantity, Decimal::new(5, 0));
        assert_eq!(
            result.total_with_additions,
            Some(Decimal::new(6 + 15 + 100 + 30 + 20, 0))
        );
        assert_eq!(
            result.unit_cost_with_additions,
            Some(Decimal::new(171, 0))
        );
    }

    #[test]
    fn blueprint_list_alone_triggers_additions() {
        let mut catalog = widget_catalog();
        catalog.recipes[0].blueprint_components = vec![component("Bolt", 1)];
        let result = calculate_cost(&catalog, &"Widget".into(), None).unwrap();
        assert_eq!(result.blueprint_components_cost, Some(Decimal::new(3, 0)));
        assert_eq!(result.total_with_additions, Some(Decimal::new(15, 0)));
    }

    #[test]
    fn breakdown_is_sorted_case_sensitively() {
        let mut catalog = Catalog::default();
        catalog.recipes.push(recipe(
            "Kit",
            1,
            vec![
                component("zinc", 1),
                component("Brass", 1),
                component("alloy", 1),
            ],
        ));
        for name in ["zinc", "Brass", "alloy"] {
            catalog.resource_prices.insert(name.into(), Decimal::ONE);
        }
        let result = calculate_cost(&catalog, &"Kit".into(), None).unwrap();
        let names: Vec<&str> = result
            .breakdown
            .iter()
            .map(|e| e.resource_name.0.as_str())
            .collect();
        assert_eq!(names, vec!["Brass", "alloy", "zinc"]);
    }

    proptest! {
        /// Run cost is exactly linear in the efficiency multiplier.
        #[test]
        fn run_cost_scales_linearly(efficiency in 1i64..400) {
            let catalog = widget_catalog();
            let full = calculate_cost(
                &catalog,
                &"Widget".into(),
                Some(Decimal::new(efficiency, 0)),
            ).unwrap();
            let half = calculate_cost(
                &catalog,
                &"Widget".into(),
                Some(Decimal::new(efficiency, 0) / Decimal::TWO),
            ).unwrap();
            prop_assert_eq!(half.run_cost * Decimal::TWO, full.run_cost);
        }

        /// The breakdown totals always sum to the run cost exactly.
        #[test]
        fn breakdown_conserves_run_cost(bolt_price in 1i64..1_000,
                                        nut_price in 1i64..1_000,
                                        bolts in 1i64..100,
                                        nuts in 1i64..100,
                                        gadgets in 1i64..10,
                                        efficiency in 1i64..300) {
            let mut catalog = Catalog::default();
            catalog.recipes.push(recipe(
                "Widget",
                1,
                vec![
                    component("Bolt", bolts),
                    component("Gadget", gadgets),
                ],
            ));
            catalog.recipes.push(recipe(
                "Gadget",
                2,
                vec![component("Bolt", 4), component("Nut", nuts)],
            ));
            catalog.resource_prices.insert("Bolt".into(), Decimal::new(bolt_price, 0));
            catalog.resource_prices.insert("Nut".into(), Decimal::new(nut_price, 0));

            let result = calculate_cost(
                &catalog,
                &"Widget".into(),
                Some(Decimal::new(efficiency, 0)),
            ).unwrap();
            let total: Decimal = result.breakdown.iter().map(|e| e.total_cost).sum();
            prop_assert_eq!(total, result.run_cost);
        }
    }
}
