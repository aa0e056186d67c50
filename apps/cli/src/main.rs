#![deny(warnings)]

//! Headless CLI for pricing recipes against a SQLite store or a YAML
//! catalog file.

use anyhow::{bail, Context, Result};
use bom_core::{validate_catalog, Catalog, ResourceName};
use bom_engine::{calculate_cost, CostResult, EfficiencySource};
use bom_store::RecipeStore;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Opts {
    db: String,
    catalog: Option<String>,
    efficiency: Option<String>,
    category: Option<String>,
    json: bool,
    positional: Vec<String>,
}

fn parse_args() -> (Option<String>, Opts) {
    let mut command: Option<String> = None;
    let mut opts = Opts {
        db: bom_store::default_sqlite_url().to_string(),
        catalog: None,
        efficiency: None,
        category: None,
        json: false,
        positional: vec![],
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--db" => {
                if let Some(value) = it.next() {
                    opts.db = value;
                }
            }
            "--catalog" => opts.catalog = it.next(),
            "--efficiency" => opts.efficiency = it.next(),
            "--category" => opts.category = it.next(),
            "--json" => opts.json = true,
            _ => {
                if command.is_none() {
                    command = Some(arg);
                } else {
                    opts.positional.push(arg);
                }
            }
        }
    }
    (command, opts)
}

fn print_usage() {
    println!("bomcost - recipe cost calculator");
    println!();
    println!("Commands:");
    println!("  price <recipe> [--efficiency N] [--db URL | --catalog FILE] [--json]");
    println!("  import --catalog FILE [--db URL]");
    println!("  set-price <resource> <price> [--db URL]");
    println!("  set-efficiency <value> [--category NAME] [--db URL]");
    println!("  show <recipe> [--db URL | --catalog FILE]");
    println!("  recipes [FRAGMENT] [--db URL]");
    println!("  version");
}

fn parse_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).with_context(|| format!("cannot parse decimal value from '{raw}'"))
}

async fn load_snapshot(opts: &Opts) -> Result<Catalog> {
    if let Some(path) = &opts.catalog {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read catalog file '{path}'"))?;
        let catalog: Catalog =
            serde_yaml::from_str(&text).with_context(|| format!("cannot parse '{path}'"))?;
        validate_catalog(&catalog)?;
        Ok(catalog)
    } else {
        let store = RecipeStore::connect(&opts.db).await?;
        Ok(store.load_catalog().await?)
    }
}

fn format_money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn print_report(result: &CostResult) {
    let efficiency_line = match (result.efficiency_source, result.category.as_deref()) {
        (EfficiencySource::Category, Some(category)) => {
            format!("Efficiency of type '{category}': {}%", result.efficiency)
        }
        (EfficiencySource::Global, _) => format!("Efficiency (global): {}%", result.efficiency),
        _ => format!("Efficiency: {}%", result.efficiency),
    };
    println!("Costing '{}'", result.recipe_name);
    println!("{efficiency_line}");
    match &result.category {
        Some(category) => println!("Category: {category}"),
        None => println!("Category: not set"),
    }
    println!("Output per run: {}", result.output_quantity);
    println!("Unit cost: {}", format_money(result.unit_cost));
    println!();
    println!("Recipe:");
    println!("  components: {}", format_money(result.run_cost));
    match result.creation_cost {
        Some(cost) => println!("  creation cost: {}", format_money(cost)),
        None => println!("  creation cost: not set (ignored)"),
    }
    println!("Blueprint:");
    match result.blueprint_components_cost {
        Some(cost) => println!("  components: {}", format_money(cost)),
        None => println!("  components: not set (ignored)"),
    }
    match result.blueprint_creation_cost {
        Some(cost) => println!("  creation cost: {}", format_money(cost)),
        None => println!("  creation cost: not set (ignored)"),
    }
    match result.blueprint_cost {
        Some(cost) => println!("  purchase cost: {}", format_money(cost)),
        None => println!("  purchase cost: not set (ignored)"),
    }
    println!();
    println!("Base resources:");
    for entry in &result.breakdown {
        println!(
            "  {}: {} @ {} = {}",
            entry.resource_name,
            entry.quantity,
            entry.unit_price,
            format_money(entry.total_cost)
        );
    }
    if !result.blueprint_breakdown.is_empty() {
        println!("Blueprint resources:");
        for entry in &result.blueprint_breakdown {
            println!(
                "  {}: {} @ {} = {}",
                entry.resource_name,
                entry.quantity,
                entry.unit_price,
                format_money(entry.total_cost)
            );
        }
    }
    println!();
    println!("Total (components only): {}", format_money(result.run_cost));
    if let Some(total) = result.total_with_additions {
        println!("Total with additions: {}", format_money(total));
    }
    if let Some(unit) = result.unit_cost_with_additions {
        println!("Unit cost with additions: {}", format_money(unit));
    }
}

async fn price(opts: &Opts) -> Result<()> {
    let name = opts
        .positional
        .first()
        .context("usage: price <recipe> [--efficiency N] [--db URL | --catalog FILE] [--json]")?;
    let efficiency = opts.efficiency.as_deref().map(parse_decimal).transpose()?;
    let catalog = load_snapshot(opts).await?;
    let result = calculate_cost(&catalog, &ResourceName(name.clone()), efficiency)?;
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }
    Ok(())
}

async fn import(opts: &Opts) -> Result<()> {
    let path = opts
        .catalog
        .as_ref()
        .context("usage: import --catalog FILE [--db URL]")?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read catalog file '{path}'"))?;
    let catalog: Catalog =
        serde_yaml::from_str(&text).with_context(|| format!("cannot parse '{path}'"))?;
    validate_catalog(&catalog)?;

    let store = RecipeStore::connect(&opts.db).await?;
    for recipe in &catalog.recipes {
        store.upsert_recipe(recipe).await?;
    }
    for (name, price) in &catalog.resource_prices {
        store.set_resource_price(name, *price).await?;
    }
    for (category, efficiency) in &catalog.category_efficiencies {
        store.set_category_efficiency(category, *efficiency).await?;
    }
    store
        .set_global_efficiency(catalog.global_efficiency)
        .await?;
    info!(
        recipes = catalog.recipes.len(),
        resources = catalog.resource_prices.len(),
        "catalog imported"
    );
    println!(
        "Imported {} recipes and {} resource prices into {}",
        catalog.recipes.len(),
        catalog.resource_prices.len(),
        opts.db
    );
    Ok(())
}

async fn set_price(opts: &Opts) -> Result<()> {
    let [name, raw] = opts.positional.as_slice() else {
        bail!("usage: set-price <resource> <price> [--db URL]");
    };
    let price = parse_decimal(raw)?;
    if price < Decimal::ZERO {
        bail!("price must not be negative");
    }
    let store = RecipeStore::connect(&opts.db).await?;
    store
        .set_resource_price(&ResourceName(name.clone()), price)
        .await?;
    println!("Price for '{name}' set to {price}");
    Ok(())
}

async fn set_efficiency(opts: &Opts) -> Result<()> {
    let raw = opts
        .positional
        .first()
        .context("usage: set-efficiency <value> [--category NAME] [--db URL]")?;
    let value = parse_decimal(raw)?;
    if value <= Decimal::ZERO {
        bail!("efficiency must be greater than 0");
    }
    let store = RecipeStore::connect(&opts.db).await?;
    match &opts.category {
        Some(category) => {
            store.set_category_efficiency(category, value).await?;
            println!("Efficiency for type '{category}' set to {value}%");
        }
        None => {
            store.set_global_efficiency(value).await?;
            println!("Global efficiency set to {value}%");
        }
    }
    Ok(())
}

async fn show(opts: &Opts) -> Result<()> {
    let name = opts
        .positional
        .first()
        .context("usage: show <recipe> [--db URL | --catalog FILE]")?;
    let catalog = load_snapshot(opts).await?;
    match catalog.find_recipe(&ResourceName(name.clone())) {
        Some(recipe) => print!("{}", serde_yaml::to_string(recipe)?),
        None => bail!("recipe '{name}' is not defined"),
    }
    Ok(())
}

async fn recipes(opts: &Opts) -> Result<()> {
    let fragment = opts.positional.first().map(String::as_str).unwrap_or("");
    let store = RecipeStore::connect(&opts.db).await?;
    let names = store.search_recipe_names(fragment, 25).await?;
    if names.is_empty() {
        println!("No recipes found");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (command, opts) = parse_args();
    let Some(command) = command else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "price" => price(&opts).await,
        "import" => import(&opts).await,
        "set-price" => set_price(&opts).await,
        "set-efficiency" => set_efficiency(&opts).await,
        "show" => show(&opts).await,
        "recipes" => recipes(&opts).await,
        "version" => {
            println!(
                "bomcost {} ({} {})",
                env!("CARGO_PKG_VERSION"),
                env!("GIT_SHA"),
                env!("BUILD_DATE")
            );
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command '{other}'");
        }
    }
}
