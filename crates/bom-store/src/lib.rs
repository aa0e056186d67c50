#![deny(warnings)]

//! SQLite persistence for recipes, terminal prices, and efficiency settings.
//!
//! Monetary and quantity columns are stored as TEXT and parsed as
//! [`Decimal`] so values round-trip exactly. The pool is capped at one
//! connection, which serializes writers the same way the rest of the
//! system expects.

use bom_core::{default_global_efficiency, Catalog, Recipe, RecipeComponent, ResourceName};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Returns the default SQLite URL used for local catalogs.
pub fn default_sqlite_url() -> &'static str {
    "sqlite://./bomcost.db"
}

const GLOBAL_EFFICIENCY_KEY: &str = "global_efficiency";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS resources (
        name TEXT PRIMARY KEY,
        unit_price TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS recipes (
        name TEXT PRIMARY KEY,
        output_quantity TEXT NOT NULL,
        category TEXT,
        blueprint_cost TEXT,
        creation_cost TEXT,
        blueprint_creation_cost TEXT
    )",
    "CREATE TABLE IF NOT EXISTS recipe_components (
        recipe_name TEXT NOT NULL REFERENCES recipes(name) ON DELETE CASCADE,
        resource_name TEXT NOT NULL,
        quantity TEXT NOT NULL,
        unit_price TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS blueprint_components (
        recipe_name TEXT NOT NULL REFERENCES recipes(name) ON DELETE CASCADE,
        resource_name TEXT NOT NULL,
        quantity TEXT NOT NULL,
        unit_price TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS category_efficiency (
        category TEXT PRIMARY KEY,
        efficiency TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS config (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
];

/// Errors produced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored TEXT column did not parse as a decimal.
    #[error("stored value '{value}' for {context} is not a decimal")]
    MalformedDecimal {
        /// Column or setting the value came from.
        context: String,
        /// Raw stored text.
        value: String,
    },
}

fn parse_stored_decimal(context: &str, value: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(value).map_err(|_| StoreError::MalformedDecimal {
        context: context.to_string(),
        value: value.to_string(),
    })
}

fn parse_opt_decimal(context: &str, value: Option<String>) -> Result<Option<Decimal>, StoreError> {
    value.map(|v| parse_stored_decimal(context, &v)).transpose()
}

/// SQLite-backed store for recipes, prices, and efficiency settings.
pub struct RecipeStore {
    pool: SqlitePool,
}

impl RecipeStore {
    /// Open (creating if missing) the database at `url` and ensure the
    /// schema exists. The global efficiency is seeded to 100 on first use.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = RecipeStore { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        sqlx::query("INSERT INTO config(key, value) VALUES(?, ?) ON CONFLICT(key) DO NOTHING")
            .bind(GLOBAL_EFFICIENCY_KEY)
            .bind(default_global_efficiency().to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert or replace a recipe definition, replacing its component lists
    /// and writing each component's advisory price through to `resources`.
    pub async fn upsert_recipe(&self, recipe: &Recipe) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO recipes(name, output_quantity, category, blueprint_cost, \
                                 creation_cost, blueprint_creation_cost) \
             VALUES(?, ?, ?, ?, ?, ?) \
             ON CONFLICT(name) DO UPDATE SET \
                 output_quantity = excluded.output_quantity, \
                 category = excluded.category, \
                 blueprint_cost = excluded.blueprint_cost, \
                 creation_cost = excluded.creation_cost, \
                 blueprint_creation_cost = excluded.blueprint_creation_cost",
        )
        .bind(&recipe.name.0)
        .bind(recipe.output_quantity.to_string())
        .bind(recipe.category.clone())
        .bind(recipe.blueprint_cost.map(|c| c.to_string()))
        .bind(recipe.creation_cost.map(|c| c.to_string()))
        .bind(recipe.blueprint_creation_cost.map(|c| c.to_string()))
        .execute(&mut *tx)
        .await?;

        let lists = [
            ("recipe_components", &recipe.components),
            ("blueprint_components", &recipe.blueprint_components),
        ];
        for (table, components) in lists {
            let delete = format!("DELETE FROM {table} WHERE recipe_name = ?");
            sqlx::query(&delete)
                .bind(&recipe.name.0)
                .execute(&mut *tx)
                .await?;
            let insert = format!(
                "INSERT INTO {table}(recipe_name, resource_name, quantity, unit_price) \
                 VALUES(?, ?, ?, ?)"
            );
            for component in components {
                sqlx::query(&insert)
                    .bind(&recipe.name.0)
                    .bind(&component.resource_name.0)
                    .bind(component.quantity.to_string())
                    .bind(component.unit_price.to_string())
                    .execute(&mut *tx)
                    .await?;
                // Advisory authoring-time price refreshes the stored one.
                sqlx::query(
                    "INSERT INTO resources(name, unit_price) VALUES(?, ?) \
                     ON CONFLICT(name) DO UPDATE SET \
                         unit_price = excluded.unit_price, \
                         updated_at = CURRENT_TIMESTAMP",
                )
                .bind(&component.resource_name.0)
                .bind(component.unit_price.to_string())
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
        debug!(recipe = %recipe.name, "recipe upserted");
        Ok(())
    }

    /// Delete a recipe and its component lists. Returns whether it existed.
    pub async fn delete_recipe(&self, name: &ResourceName) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM recipes WHERE name = ?")
            .bind(&name.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch a full recipe definition.
    pub async fn get_recipe(&self, name: &ResourceName) -> Result<Option<Recipe>, StoreError> {
        let row = sqlx::query(
            "SELECT output_quantity, category, blueprint_cost, creation_cost, \
                    blueprint_creation_cost \
             FROM recipes WHERE name = ?",
        )
        .bind(&name.0)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let output_quantity: String = row.try_get("output_quantity")?;
        let recipe = Recipe {
            name: name.clone(),
            output_quantity: parse_stored_decimal("output_quantity", &output_quantity)?,
            category: row.try_get("category")?,
            components: self.fetch_components("recipe_components", name).await?,
            blueprint_cost: parse_opt_decimal("blueprint_cost", row.try_get("blueprint_cost")?)?,
            creation_cost: parse_opt_decimal("creation_cost", row.try_get("creation_cost")?)?,
            blueprint_creation_cost: parse_opt_decimal(
                "blueprint_creation_cost",
                row.try_get("blueprint_creation_cost")?,
            )?,
            blueprint_components: self.fetch_components("blueprint_components", name).await?,
        };
        Ok(Some(recipe))
    }

    async fn fetch_components(
        &self,
        table: &str,
        name: &ResourceName,
    ) -> Result<Vec<RecipeComponent>, StoreError> {
        let sql = format!(
            "SELECT resource_name, quantity, unit_price FROM {table} \
             WHERE recipe_name = ? ORDER BY resource_name"
        );
        let rows = sqlx::query(&sql)
            .bind(&name.0)
            .fetch_all(&self.pool)
            .await?;
        let mut components = Vec::with_capacity(rows.len());
        for row in rows {
            let resource_name: String = row.try_get("resource_name")?;
            let quantity: String = row.try_get("quantity")?;
            let unit_price: String = row.try_get("unit_price")?;
            components.push(RecipeComponent {
                resource_name: ResourceName(resource_name),
                quantity: parse_stored_decimal("quantity", &quantity)?,
                unit_price: parse_stored_decimal("unit_price", &unit_price)?,
            });
        }
        Ok(components)
    }

    /// Set or clear a recipe's one-off costs. Returns whether the recipe
    /// exists.
    pub async fn set_one_off_costs(
        &self,
        name: &ResourceName,
        blueprint_cost: Option<Decimal>,
        creation_cost: Option<Decimal>,
        blueprint_creation_cost: Option<Decimal>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE recipes SET blueprint_cost = ?, creation_cost = ?, \
                                blueprint_creation_cost = ? \
             WHERE name = ?",
        )
        .bind(blueprint_cost.map(|c| c.to_string()))
        .bind(creation_cost.map(|c| c.to_string()))
        .bind(blueprint_creation_cost.map(|c| c.to_string()))
        .bind(&name.0)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store a terminal resource price.
    pub async fn set_resource_price(
        &self,
        name: &ResourceName,
        price: Decimal,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO resources(name, unit_price) VALUES(?, ?) \
             ON CONFLICT(name) DO UPDATE SET \
                 unit_price = excluded.unit_price, \
                 updated_at = CURRENT_TIMESTAMP",
        )
        .bind(&name.0)
        .bind(price.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Stored terminal price, or `None` if never priced.
    pub async fn get_resource_unit_price(
        &self,
        name: &ResourceName,
    ) -> Result<Option<Decimal>, StoreError> {
        let row = sqlx::query("SELECT unit_price FROM resources WHERE name = ?")
            .bind(&name.0)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let raw: String = row.try_get("unit_price")?;
                Ok(Some(parse_stored_decimal("unit_price", &raw)?))
            }
            None => Ok(None),
        }
    }

    /// Store the global efficiency percentage.
    pub async fn set_global_efficiency(&self, efficiency: Decimal) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO config(key, value) VALUES(?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(GLOBAL_EFFICIENCY_KEY)
        .bind(efficiency.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Global efficiency; unset or unparsable values fall back to 100.
    pub async fn get_global_efficiency(&self) -> Result<Decimal, StoreError> {
        let row = sqlx::query("SELECT value FROM config WHERE key = ?")
            .bind(GLOBAL_EFFICIENCY_KEY)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(default_global_efficiency());
        };
        let raw: String = row.try_get("value")?;
        match Decimal::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!(%raw, "stored global efficiency is not a decimal, using 100");
                Ok(default_global_efficiency())
            }
        }
    }

    /// Store an efficiency default for a category.
    pub async fn set_category_efficiency(
        &self,
        category: &str,
        efficiency: Decimal,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO category_efficiency(category, efficiency) VALUES(?, ?) \
             ON CONFLICT(category) DO UPDATE SET efficiency = excluded.efficiency",
        )
        .bind(category)
        .bind(efficiency.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Stored category efficiency, if any.
    pub async fn get_category_efficiency(
        &self,
        category: &str,
    ) -> Result<Option<Decimal>, StoreError> {
        let row = sqlx::query("SELECT efficiency FROM category_efficiency WHERE category = ?")
            .bind(category)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let raw: String = row.try_get("efficiency")?;
                Ok(Some(parse_stored_decimal("category efficiency", &raw)?))
            }
            None => Ok(None),
        }
    }

    /// Remove a category's efficiency default, falling resolution back to
    /// the global value. Returns whether one was stored.
    pub async fn delete_category_efficiency(&self, category: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM category_efficiency WHERE category = ?")
            .bind(category)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Categories referenced by stored recipes, sorted.
    pub async fn known_categories(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT category FROM recipes \
             WHERE category IS NOT NULL ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut categories = Vec::with_capacity(rows.len());
        for row in rows {
            categories.push(row.try_get("category")?);
        }
        Ok(categories)
    }

    /// Case-insensitive substring search over recipe names, sorted.
    pub async fn search_recipe_names(
        &self,
        fragment: &str,
        limit: i64,
    ) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT name FROM recipes WHERE name LIKE ? ORDER BY name LIMIT ?")
            .bind(format!("%{fragment}%"))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        let mut names = Vec::with_capacity(rows.len());
        for row in rows {
            names.push(row.try_get("name")?);
        }
        Ok(names)
    }

    /// Read the whole store into an immutable [`Catalog`] snapshot so one
    /// costing call sees a consistent view.
    pub async fn load_catalog(&self) -> Result<Catalog, StoreError> {
        let mut catalog = Catalog::default();

        let names = self.search_recipe_names("", i64::MAX).await?;
        for name in names {
            if let Some(recipe) = self.get_recipe(&ResourceName(name)).await? {
                catalog.recipes.push(recipe);
            }
        }

        let rows = sqlx::query("SELECT name, unit_price FROM resources")
            .fetch_all(&self.pool)
            .await?;
        for row in rows {
            let name: String = row.try_get("name")?;
            let raw: String = row.try_get("unit_price")?;
            catalog
                .resource_prices
                .insert(ResourceName(name), parse_stored_decimal("unit_price", &raw)?);
        }

        let rows = sqlx::query("SELECT category, efficiency FROM category_efficiency")
            .fetch_all(&self.pool)
            .await?;
        for row in rows {
            let category: String = row.try_get("category")?;
            let raw: String = row.try_get("efficiency")?;
            catalog
                .category_efficiencies
                .insert(category, parse_stored_decimal("category efficiency", &raw)?);
        }

        catalog.global_efficiency = self.get_global_efficiency().await?;
        debug!(
            recipes = catalog.recipes.len(),
            resources = catalog.resource_prices.len(),
            "catalog snapshot loaded"
        );
        Ok(catalog)
    }
}
