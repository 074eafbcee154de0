//! # Product Catalog CSV
//!
//! Spreadsheet-friendly export and import of the product list.
//!
//! ```text
//! Nome,Preço,Descrição,Categoria,Estoque,Tem Adicionais
//! Açaí 300ml,15.90,Açaí tradicional,Açaí,50,Sim
//! "Suco ""Detox""",8.00,,Bebidas,20,Não
//! ```
//!
//! ## Import Rules
//! - Headers are matched case-insensitively; `Nome` and `Preço` are required
//! - Rows with a blank name or an unreadable price are skipped
//! - Unknown category names are created on the fly
//! - A blank category falls back to the first category (created when the
//!   store has none)

use acaizen_core::{Category, CategoryInput, Money, ProductInput};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;

/// Header row written by [`export_products_csv`].
pub const CSV_HEADERS: [&str; 6] = ["Nome", "Preço", "Descrição", "Categoria", "Estoque", "Tem Adicionais"];

/// Category created when an import needs a fallback and none exists.
pub const FALLBACK_CATEGORY_NAME: &str = "Geral";

/// Outcome of [`import_products_csv`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub categories_created: Vec<String>,
}

/// Writes every product as CSV.
pub async fn export_products_csv(db: &Database) -> DbResult<String> {
    let products = db.products().list_all().await?;
    let categories = db.categories().list_all().await?;

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for product in &products {
        let category = categories
            .iter()
            .find(|c| c.id == product.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or("");

        let price = product.price().to_decimal_string();
        let stock = product.stock.to_string();
        writer.write_record([
            product.name.as_str(),
            price.as_str(),
            product.description.as_str(),
            category,
            stock.as_str(),
            if product.has_addons { "Sim" } else { "Não" },
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DbError::Internal(e.to_string()))?;
    let csv = String::from_utf8(bytes).map_err(|e| DbError::Internal(e.to_string()))?;

    info!(products = products.len(), "Products exported to CSV");
    Ok(csv)
}

struct Columns {
    name: usize,
    price: usize,
    description: Option<usize>,
    category: Option<usize>,
    stock: Option<usize>,
    has_addons: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> DbResult<Columns> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase() == wanted)
        };

        let (Some(name), Some(price)) = (find("nome"), find("preço")) else {
            return Err(DbError::InvalidData(
                "CSV must contain the columns Nome and Preço".to_string(),
            ));
        };

        Ok(Columns {
            name,
            price,
            description: find("descrição"),
            category: find("categoria"),
            stock: find("estoque"),
            has_addons: find("tem adicionais"),
        })
    }
}

fn field<'r>(record: &'r StringRecord, index: Option<usize>) -> &'r str {
    index.and_then(|i| record.get(i)).unwrap_or("").trim()
}

/// Imports products from CSV text, appending to the catalog.
pub async fn import_products_csv(db: &Database, csv: &str) -> DbResult<CsvImportSummary> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(csv.as_bytes());

    let columns = Columns::locate(reader.headers()?)?;
    let mut categories = db.categories().list_all().await?;
    let mut summary = CsvImportSummary::default();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let name = field(&record, Some(columns.name));
        if name.is_empty() {
            debug!(line = line + 2, "Skipping CSV row without a name");
            summary.skipped += 1;
            continue;
        }

        let price_text = field(&record, Some(columns.price));
        let price = if price_text.is_empty() {
            Money::zero()
        } else {
            match Money::parse_decimal(price_text) {
                Ok(price) => price,
                Err(err) => {
                    warn!(line = line + 2, %err, "Skipping CSV row with an invalid price");
                    summary.skipped += 1;
                    continue;
                }
            }
        };

        let category_name = field(&record, columns.category);
        let category_id = resolve_category(db, &mut categories, category_name, &mut summary).await?;

        let input = ProductInput {
            name: name.to_string(),
            price_cents: price.cents(),
            description: field(&record, columns.description).to_string(),
            image: None,
            category_id,
            stock: field(&record, columns.stock).parse().unwrap_or(0),
            has_addons: field(&record, columns.has_addons).eq_ignore_ascii_case("sim"),
        };

        match db.products().create(&input).await {
            Ok(_) => summary.imported += 1,
            Err(DbError::Rule(err)) => {
                warn!(line = line + 2, %err, "Skipping invalid CSV row");
                summary.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        imported = summary.imported,
        skipped = summary.skipped,
        categories_created = summary.categories_created.len(),
        "Products imported from CSV"
    );
    Ok(summary)
}

async fn resolve_category(
    db: &Database,
    categories: &mut Vec<Category>,
    name: &str,
    summary: &mut CsvImportSummary,
) -> DbResult<i64> {
    if name.is_empty() {
        if let Some(first) = categories.first() {
            return Ok(first.id);
        }
        return create_category(db, categories, FALLBACK_CATEGORY_NAME, summary).await;
    }

    let wanted = name.to_lowercase();
    if let Some(existing) = categories.iter().find(|c| c.name.trim().to_lowercase() == wanted) {
        return Ok(existing.id);
    }

    create_category(db, categories, name, summary).await
}

async fn create_category(
    db: &Database,
    categories: &mut Vec<Category>,
    name: &str,
    summary: &mut CsvImportSummary,
) -> DbResult<i64> {
    let created = db
        .categories()
        .create(&CategoryInput {
            name: name.to_string(),
            description: None,
        })
        .await?;

    summary.categories_created.push(created.name.clone());
    let id = created.id;
    categories.push(created);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{acai_input, test_db};

    #[tokio::test]
    async fn test_unknown_category_created_and_empty_name_skipped() {
        let (db, _) = test_db().await;
        let csv = "Nome,Preço,Descrição,Categoria,Estoque,Tem Adicionais\n\
                   Brigadeiro,3.50,Chocolate,Doces,30,Não\n\
                   ,9.99,Sem nome,Doces,1,Não\n\
                   Beijinho,\"3,50\",Coco,doces,25,Sim\n";

        let summary = import_products_csv(&db, csv).await.unwrap();

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.categories_created, vec!["Doces".to_string()]);

        let doces = db.categories().find_by_name("Doces").await.unwrap().unwrap();
        let products = db.products().list_by_category(doces.id).await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].price_cents, 350);
        assert!(products[1].has_addons);
    }

    #[tokio::test]
    async fn test_missing_required_columns() {
        let (db, _) = test_db().await;
        let err = import_products_csv(&db, "Produto,Valor\nX,1\n").await.unwrap_err();
        assert!(matches!(err, DbError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_blank_category_uses_first_category() {
        let (db, first_category) = test_db().await;
        let csv = "nome,preço\nÁgua,3.00\n";

        let summary = import_products_csv(&db, csv).await.unwrap();
        assert_eq!(summary.imported, 1);
        assert!(summary.categories_created.is_empty());
        assert_eq!(db.products().list_all().await.unwrap()[0].category_id, first_category);
    }

    #[tokio::test]
    async fn test_export_quotes_and_reimports() {
        let (db, category_id) = test_db().await;
        let mut input = acai_input(category_id);
        input.name = "Açaí \"Especial\", 500ml".to_string();
        db.products().create(&input).await.unwrap();

        let csv = export_products_csv(&db).await.unwrap();
        assert!(csv.starts_with("Nome,Preço,Descrição,Categoria,Estoque,Tem Adicionais\n"));
        assert!(csv.contains("\"Açaí \"\"Especial\"\", 500ml\",15.90"));

        let summary = import_products_csv(&db, &csv).await.unwrap();
        assert_eq!(summary.imported, 1);
        let products = db.products().list_all().await.unwrap();
        assert_eq!(products[1].name, "Açaí \"Especial\", 500ml");
        assert_eq!(products[1].category_id, category_id);
    }
}
