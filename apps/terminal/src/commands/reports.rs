//! # Report Commands
//!
//! The sales report over the whole sales log, and its CSV export.
//!
//! ## CSV Layout
//! ```text
//! Relatório de Vendas - Hoje
//!
//! Resumo
//! Total de Vendas,3
//! Valor Total,R$ 55.80
//! Ticket Médio,R$ 18.60
//!
//! Formas de Pagamento
//! Método,Quantidade,Valor
//! Dinheiro,2,R$ 45.80
//! ...
//!
//! Produtos Mais Vendidos
//! Produto,Quantidade,Faturamento
//! Açaí Tradicional 300ml,2,R$ 35.80
//! ```

use std::path::{Path, PathBuf};

use acaizen_core::report::{summarize, ReportFilter, SalesReport};
use acaizen_core::Money;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::DbState;

/// Computes the report for `filter` as of now.
pub async fn sales_report(db: &DbState, filter: ReportFilter) -> Result<SalesReport, ApiError> {
    sales_report_at(db, filter, Utc::now()).await
}

/// Computes the report for `filter` as of `now`.
///
/// Day boundaries follow the store's configured UTC offset.
pub async fn sales_report_at(
    db: &DbState,
    filter: ReportFilter,
    now: DateTime<Utc>,
) -> Result<SalesReport, ApiError> {
    debug!(?filter, "sales_report command");
    let store = db.inner().store_config().get_or_init().await?;
    let sales = db.inner().sales().list_all().await?;
    Ok(summarize(&sales, filter, now, store.local_offset()))
}

fn brl(cents: i64) -> String {
    format!("R$ {}", Money::from_cents(cents).to_decimal_string())
}

fn csv_section(rows: &[Vec<String>]) -> Result<String, ApiError> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| ApiError::internal(format!("CSV write failed: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::internal(format!("CSV write failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::internal(e.to_string()))
}

/// Renders a computed report as CSV.
pub fn sales_report_csv(report: &SalesReport) -> Result<String, ApiError> {
    let title = vec![vec![format!(
        "Relatório de Vendas - {}",
        report.filter.range.title()
    )]];

    let summary = vec![
        vec!["Resumo".to_string()],
        vec!["Total de Vendas".to_string(), report.sale_count.to_string()],
        vec!["Valor Total".to_string(), brl(report.total_cents)],
        vec!["Ticket Médio".to_string(), brl(report.average_ticket_cents)],
    ];

    let mut payments = vec![
        vec!["Formas de Pagamento".to_string()],
        vec!["Método".to_string(), "Quantidade".to_string(), "Valor".to_string()],
    ];
    payments.extend(report.payment_breakdown.iter().map(|p| {
        vec![p.label.clone(), p.count.to_string(), brl(p.amount_cents)]
    }));

    let mut products = vec![
        vec!["Produtos Mais Vendidos".to_string()],
        vec![
            "Produto".to_string(),
            "Quantidade".to_string(),
            "Faturamento".to_string(),
        ],
    ];
    products.extend(report.top_products.iter().map(|p| {
        vec![p.name.clone(), p.quantity.to_string(), brl(p.revenue_cents)]
    }));

    let sections = [
        csv_section(&title)?,
        csv_section(&summary)?,
        csv_section(&payments)?,
        csv_section(&products)?,
    ];
    Ok(sections.join("\n"))
}

/// `relatorio_vendas_acaizen_{unix millis}.csv`
pub fn report_file_name(now: DateTime<Utc>) -> String {
    format!("relatorio_vendas_acaizen_{}.csv", now.timestamp_millis())
}

/// Computes the report and writes its CSV into `dir`.
pub async fn export_sales_report_csv(
    db: &DbState,
    filter: ReportFilter,
    dir: &Path,
) -> Result<PathBuf, ApiError> {
    let now = Utc::now();
    let report = sales_report_at(db, filter, now).await?;
    let csv = sales_report_csv(&report)?;

    let path = dir.join(report_file_name(now));
    tokio::fs::create_dir_all(dir)
        .await
        .and(tokio::fs::write(&path, csv).await)
        .map_err(|e| ApiError::internal(format!("Failed to write {}: {}", path.display(), e)))?;

    info!(path = %path.display(), sales = report.sale_count, "Sales report exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use acaizen_core::checkout::PaymentInput;
    use acaizen_core::report::{DateRange, PaymentFilter};
    use acaizen_core::PaymentMethod;

    use crate::commands::cart::add_to_cart;
    use crate::commands::sale::{finalize_sale, FinalizeSaleRequest};
    use crate::test_support::{product_named, test_context};
    use crate::AppContext;

    async fn sell(ctx: &AppContext, name: &str, quantity: i64, payment: PaymentInput) {
        let product = product_named(ctx, name).await;
        add_to_cart(&ctx.db, &ctx.cart, product.id, Some(quantity), &[])
            .await
            .unwrap();
        let request = FinalizeSaleRequest {
            payment,
            customer_name: None,
            print: false,
        };
        finalize_sale(&ctx.db, &ctx.cart, &ctx.session, &ctx.printer, &ctx.config.checkout, request)
            .await
            .unwrap();
    }

    async fn sample(ctx: &AppContext) {
        sell(ctx, "Açaí Tradicional 300ml", 2, PaymentInput::cash(Money::from_cents(5000))).await;
        sell(ctx, "Refrigerante Lata", 1, PaymentInput::new(PaymentMethod::Pix)).await;
        sell(ctx, "Suco Natural", 1, PaymentInput::cash(Money::from_cents(800))).await;
    }

    #[tokio::test]
    async fn test_today_report() {
        let ctx = test_context().await;
        sample(&ctx).await;

        let report = sales_report(&ctx.db, ReportFilter::default()).await.unwrap();
        assert_eq!(report.sale_count, 3);
        assert_eq!(report.total_cents, 3180 + 500 + 800);
        assert_eq!(report.average_ticket_cents, 1493);
        assert_eq!(report.payment_breakdown.len(), 4);

        let cash = &report.payment_breakdown[0];
        assert_eq!((cash.count, cash.amount_cents), (2, 3980));
        let credit = &report.payment_breakdown[1];
        assert_eq!((credit.count, credit.amount_cents), (0, 0));

        assert_eq!(report.top_products[0].name, "Açaí Tradicional 300ml");
        assert_eq!(report.top_products[0].revenue_cents, 3180);
    }

    #[tokio::test]
    async fn test_payment_filter_and_idempotence() {
        let ctx = test_context().await;
        sample(&ctx).await;

        let filter = ReportFilter {
            range: DateRange::Month,
            payment: PaymentFilter::Pix,
        };
        let first = sales_report(&ctx.db, filter).await.unwrap();
        let second = sales_report(&ctx.db, filter).await.unwrap();
        assert_eq!(first.sale_count, 1);
        assert_eq!(first.total_cents, 500);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );

        let yesterday = ReportFilter {
            range: DateRange::Yesterday,
            payment: PaymentFilter::All,
        };
        let empty = sales_report(&ctx.db, yesterday).await.unwrap();
        assert_eq!(empty.sale_count, 0);
        assert_eq!(empty.average_ticket_cents, 0);
        assert!(empty.top_products.is_empty());
    }

    #[tokio::test]
    async fn test_report_csv_layout() {
        let ctx = test_context().await;
        sample(&ctx).await;
        let report = sales_report(&ctx.db, ReportFilter::default()).await.unwrap();

        let csv = sales_report_csv(&report).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Relatório de Vendas - Hoje");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Resumo");
        assert_eq!(lines[3], "Total de Vendas,3");
        assert_eq!(lines[4], "Valor Total,R$ 44.80");
        assert_eq!(lines[5], "Ticket Médio,R$ 14.93");
        assert!(csv.contains("Método,Quantidade,Valor\nDinheiro,2,R$ 39.80\n"));
        assert!(csv.contains("Produto,Quantidade,Faturamento\nAçaí Tradicional 300ml,2,R$ 31.80\n"));
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let ctx = test_context().await;
        sample(&ctx).await;
        let dir = tempfile::tempdir().unwrap();

        let path = export_sales_report_csv(&ctx.db, ReportFilter::default(), dir.path())
            .await
            .unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("relatorio_vendas_acaizen_"));
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .starts_with("Relatório de Vendas - Hoje"));
    }
}
