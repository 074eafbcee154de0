//! # Catalog Commands
//!
//! Products, categories, addons and the product CSV.
//!
//! Rules live in the repositories: a category in use cannot be deleted,
//! deleting a product deletes its addons, and the `has_addons` flag follows
//! the addon list.

use acaizen_core::{Addon, AddonInput, Category, CategoryInput, Product, ProductInput};
use acaizen_db::products_csv::{self, CsvImportSummary};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::DbState;

// =============================================================================
// Products
// =============================================================================

/// Products, optionally restricted to one category (the POS tabs).
pub async fn list_products(db: &DbState, category_id: Option<i64>) -> Result<Vec<Product>, ApiError> {
    debug!(?category_id, "list_products command");
    let products = db.inner().products();
    let list = match category_id {
        Some(id) => products.list_by_category(id).await?,
        None => products.list_all().await?,
    };
    Ok(list)
}

pub async fn get_product(db: &DbState, id: i64) -> Result<Product, ApiError> {
    db.inner()
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))
}

pub async fn create_product(db: &DbState, input: ProductInput) -> Result<Product, ApiError> {
    debug!(name = %input.name, "create_product command");
    ensure_category(db, input.category_id).await?;
    let product = db.inner().products().create(&input).await?;
    info!(product_id = product.id, name = %product.name, "Product created");
    Ok(product)
}

pub async fn update_product(db: &DbState, id: i64, input: ProductInput) -> Result<Product, ApiError> {
    debug!(product_id = id, "update_product command");
    ensure_category(db, input.category_id).await?;
    Ok(db.inner().products().update(id, &input).await?)
}

/// Deletes a product and its addons. Past sales keep their snapshots.
pub async fn delete_product(db: &DbState, id: i64) -> Result<(), ApiError> {
    debug!(product_id = id, "delete_product command");
    db.inner().products().delete(id).await?;
    info!(product_id = id, "Product deleted");
    Ok(())
}

async fn ensure_category(db: &DbState, category_id: i64) -> Result<(), ApiError> {
    match db.inner().categories().get_by_id(category_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::validation(format!(
            "Category {} does not exist",
            category_id
        ))),
    }
}

// =============================================================================
// Categories
// =============================================================================

pub async fn list_categories(db: &DbState) -> Result<Vec<Category>, ApiError> {
    Ok(db.inner().categories().list_all().await?)
}

pub async fn create_category(db: &DbState, input: CategoryInput) -> Result<Category, ApiError> {
    debug!(name = %input.name, "create_category command");
    Ok(db.inner().categories().create(&input).await?)
}

pub async fn update_category(db: &DbState, id: i64, input: CategoryInput) -> Result<Category, ApiError> {
    Ok(db.inner().categories().update(id, &input).await?)
}

/// Deletes a category, refused while any product still uses it.
pub async fn delete_category(db: &DbState, id: i64) -> Result<(), ApiError> {
    debug!(category_id = id, "delete_category command");
    db.inner().categories().delete(id).await?;
    info!(category_id = id, "Category deleted");
    Ok(())
}

// =============================================================================
// Addons
// =============================================================================

/// All addons, or those of one product (the addon picker).
pub async fn list_addons(db: &DbState, product_id: Option<i64>) -> Result<Vec<Addon>, ApiError> {
    let addons = db.inner().addons();
    let list = match product_id {
        Some(id) => addons.list_for_product(id).await?,
        None => addons.list_all().await?,
    };
    Ok(list)
}

pub async fn create_addon(db: &DbState, input: AddonInput) -> Result<Addon, ApiError> {
    debug!(product_id = input.product_id, name = %input.name, "create_addon command");
    Ok(db.inner().addons().create(&input).await?)
}

pub async fn update_addon(db: &DbState, id: i64, input: AddonInput) -> Result<Addon, ApiError> {
    Ok(db.inner().addons().update(id, &input).await?)
}

pub async fn delete_addon(db: &DbState, id: i64) -> Result<(), ApiError> {
    debug!(addon_id = id, "delete_addon command");
    Ok(db.inner().addons().delete(id).await?)
}

// =============================================================================
// Product CSV
// =============================================================================

/// The catalog as CSV (`Nome,Preço,Descrição,Categoria,Estoque,Tem Adicionais`).
pub async fn export_products_csv(db: &DbState) -> Result<String, ApiError> {
    debug!("export_products_csv command");
    Ok(products_csv::export_products_csv(db.inner()).await?)
}

/// Imports products from CSV text, creating unknown categories.
pub async fn import_products_csv(db: &DbState, csv: &str) -> Result<CsvImportSummary, ApiError> {
    debug!(bytes = csv.len(), "import_products_csv command");
    let summary = products_csv::import_products_csv(db.inner(), csv).await?;
    info!(
        imported = summary.imported,
        skipped = summary.skipped,
        categories_created = summary.categories_created.len(),
        "Products imported"
    );
    Ok(summary)
}

/// `produtos_acaizen_{unix millis}.csv`
pub fn products_csv_file_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("produtos_acaizen_{}.csv", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{product_named, test_context};

    fn input(name: &str, category_id: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price_cents: 1200,
            description: String::new(),
            image: None,
            category_id,
            stock: 5,
            has_addons: false,
        }
    }

    #[tokio::test]
    async fn test_product_crud() {
        let ctx = test_context().await;
        let category = list_categories(&ctx.db).await.unwrap()[0].clone();

        let product = create_product(&ctx.db, input("Tapioca", category.id)).await.unwrap();
        assert_eq!(get_product(&ctx.db, product.id).await.unwrap().name, "Tapioca");

        let updated = update_product(&ctx.db, product.id, input("Tapioca de Queijo", category.id))
            .await
            .unwrap();
        assert_eq!(updated.name, "Tapioca de Queijo");

        delete_product(&ctx.db, product.id).await.unwrap();
        let err = get_product(&ctx.db, product.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_product_needs_existing_category() {
        let ctx = test_context().await;
        let err = create_product(&ctx.db, input("Tapioca", 999)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_category_in_use_cannot_be_deleted() {
        let ctx = test_context().await;
        let acai = product_named(&ctx, "Açaí Tradicional 300ml").await;

        let err = delete_category(&ctx.db, acai.category_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(list_categories(&ctx.db)
            .await
            .unwrap()
            .iter()
            .any(|c| c.id == acai.category_id));
        assert_eq!(get_product(&ctx.db, acai.id).await.unwrap(), acai);

        let empty = create_category(
            &ctx.db,
            CategoryInput {
                name: "Sobremesas".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        delete_category(&ctx.db, empty.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_addon_flag_follows_addons() {
        let ctx = test_context().await;
        let juice = product_named(&ctx, "Suco Natural").await;
        assert!(!juice.has_addons);

        let addon = create_addon(
            &ctx.db,
            AddonInput {
                name: "Gelo".to_string(),
                price_cents: 0,
                product_id: juice.id,
            },
        )
        .await
        .unwrap();
        assert!(get_product(&ctx.db, juice.id).await.unwrap().has_addons);
        assert_eq!(list_addons(&ctx.db, Some(juice.id)).await.unwrap().len(), 1);

        delete_addon(&ctx.db, addon.id).await.unwrap();
        assert!(!get_product(&ctx.db, juice.id).await.unwrap().has_addons);
    }

    #[tokio::test]
    async fn test_csv_import_creates_unknown_category() {
        let ctx = test_context().await;
        let csv = "Nome,Preço,Descrição,Categoria,Estoque,Tem Adicionais\n\
                   Brigadeiro,3.50,Chocolate,Doces,20,Não\n\
                   ,4.00,Sem nome,Doces,1,Não\n";

        let summary = import_products_csv(&ctx.db, csv).await.unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.categories_created, vec!["Doces".to_string()]);

        let doces = ctx.db.inner().categories().find_by_name("doces").await.unwrap().unwrap();
        let products = list_products(&ctx.db, Some(doces.id)).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price_cents, 350);

        let exported = export_products_csv(&ctx.db).await.unwrap();
        assert!(exported.starts_with("Nome,Preço,Descrição,Categoria,Estoque,Tem Adicionais"));
        assert!(exported.contains("Brigadeiro,3.50,Chocolate,Doces,20,Não"));
    }

    #[test]
    fn test_products_csv_file_name() {
        use chrono::TimeZone;
        let now = chrono::Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(products_csv_file_name(now), "produtos_acaizen_1700000000123.csv");
    }
}
