//! # Sample Catalog
//!
//! The starter catalog of a fresh store: three categories, five products
//! and the usual açaí toppings. Used by the `seed` binary and the terminal
//! `init` command.
//!
//! "Lanches" is created third, so on an empty database it gets id 3, the
//! default kitchen category.

use acaizen_core::{AddonInput, CategoryInput, ProductInput};
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;

/// (name, description)
const CATEGORIES: &[(&str, &str)] = &[
    ("Açaí", "Açaí tradicional e especial"),
    ("Bebidas", "Sucos, refrigerantes e outras bebidas"),
    ("Lanches", "Sanduíches e outros lanches"),
];

/// (name, price in cents, description, category index, stock)
const PRODUCTS: &[(&str, i64, &str, usize, i64)] = &[
    ("Açaí Tradicional 300ml", 1590, "Açaí puro 300ml", 0, 100),
    ("Açaí Tradicional 500ml", 2090, "Açaí puro 500ml", 0, 100),
    ("Refrigerante Lata", 500, "Refrigerante em lata", 1, 50),
    ("Suco Natural", 800, "Suco natural de frutas", 1, 20),
    ("Sanduíche Natural", 1200, "Sanduíche natural com salada", 2, 15),
];

/// Toppings offered on both açaí sizes (product indexes 0 and 1).
const ACAI_TOPPINGS: &[(&str, i64)] = &[
    ("Granola", 200),
    ("Leite Condensado", 250),
    ("Banana", 150),
    ("Morango", 300),
];

/// What [`seed_sample_catalog`] created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub addons: usize,
}

/// Creates the sample catalog when the store has no categories yet.
///
/// ## Returns
/// `None` when the catalog already had data and nothing was written.
pub async fn seed_sample_catalog(db: &Database) -> DbResult<Option<SeedSummary>> {
    if !db.categories().list_all().await?.is_empty() {
        info!("Catalog already populated, skipping sample data");
        return Ok(None);
    }

    let mut summary = SeedSummary::default();

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        let category = db
            .categories()
            .create(&CategoryInput {
                name: name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;
        category_ids.push(category.id);
        summary.categories += 1;
    }

    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for &(name, price_cents, description, category, stock) in PRODUCTS {
        let product = db
            .products()
            .create(&ProductInput {
                name: name.to_string(),
                price_cents,
                description: description.to_string(),
                image: None,
                category_id: category_ids[category],
                stock,
                has_addons: false,
            })
            .await?;
        product_ids.push(product.id);
        summary.products += 1;
    }

    for &product_id in &product_ids[..2] {
        for &(name, price_cents) in ACAI_TOPPINGS {
            db.addons()
                .create(&AddonInput {
                    name: name.to_string(),
                    price_cents,
                    product_id,
                })
                .await?;
            summary.addons += 1;
        }
    }

    info!(
        categories = summary.categories,
        products = summary.products,
        addons = summary.addons,
        "Sample catalog created"
    );
    Ok(Some(summary))
}
