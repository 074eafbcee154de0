//! # Açaízen Back-Office CLI
//!
//! Runs the terminal commands that make sense outside the sales screen.
//!
//! ## Usage
//! ```bash
//! acaizen init                                  # settings, admin, sample catalog
//! acaizen report --range week --payment pix     # print a sales report
//! acaizen report --range today --csv ~/Relatorios
//! acaizen products export produtos.csv
//! acaizen products import produtos.csv
//! acaizen backup export                         # acaizen_backup_YYYY-MM-DD.json
//! acaizen backup import acaizen_backup_2024-03-09.json
//! acaizen reprint 42 --download
//! acaizen test-printer
//! acaizen users
//!
//! # Another database or config file
//! acaizen --db ./dev.db --config ./acaizen.toml report
//! ```

use std::path::PathBuf;

use acaizen_core::report::{DateRange, PaymentFilter, ReportFilter};
use acaizen_core::Money;
use acaizen_db::seed::seed_sample_catalog;
use acaizen_terminal::commands::{catalog, receipt, reports, settings};
use acaizen_terminal::state::TerminalConfig;
use acaizen_terminal::{init_tracing, AppContext};
use chrono::Utc;
use clap::{Parser, Subcommand};

/// Açaízen POS back-office tool
#[derive(Debug, Parser)]
#[command(name = "acaizen", version)]
struct Cli {
    /// Config file (defaults to acaizen.toml in the platform config dir)
    #[arg(short, long, env = "ACAIZEN_CONFIG")]
    config: Option<PathBuf>,

    /// Database file, overriding the configuration
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create store settings, the default admin and the sample catalog
    Init,

    /// Print the sales report, optionally exporting it as CSV
    Report {
        /// today | yesterday | week | month
        #[arg(long, default_value = "today", value_parser = parse_range)]
        range: DateRange,

        /// all | cash | credit | debit | pix
        #[arg(long, default_value = "all", value_parser = parse_payment)]
        payment: PaymentFilter,

        /// Write the report CSV into this directory
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Product catalog CSV
    Products {
        #[command(subcommand)]
        action: Transfer,
    },

    /// Full JSON backup
    Backup {
        #[command(subcommand)]
        action: Transfer,
    },

    /// Render the receipt of a past sale again
    Reprint {
        sale_id: i64,

        /// Write the receipt HTML to the download directory
        #[arg(long)]
        download: bool,

        /// Send the receipt to the print helper
        #[arg(long)]
        print: bool,
    },

    /// Print the printer test page
    TestPrinter,

    /// List user accounts
    Users,
}

#[derive(Debug, Subcommand)]
enum Transfer {
    /// Write to FILE (a dated name in the current directory by default)
    Export { file: Option<PathBuf> },
    /// Read from FILE
    Import { file: PathBuf },
}

fn parse_range(value: &str) -> Result<DateRange, String> {
    DateRange::parse(value).ok_or_else(|| format!("unknown range '{}'", value))
}

fn parse_payment(value: &str) -> Result<PaymentFilter, String> {
    PaymentFilter::parse(value).ok_or_else(|| format!("unknown payment filter '{}'", value))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = TerminalConfig::load(cli.config)?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    init_tracing(&config.logging);

    let ctx = AppContext::bootstrap(config).await?;
    run(&ctx, cli.command).await?;
    ctx.db.inner().close().await;
    Ok(())
}

async fn run(ctx: &AppContext, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Init => {
            let store = settings::get_store_config(&ctx.db).await?;
            println!("✓ Store: {}", store.store_name);
            match seed_sample_catalog(ctx.db.inner()).await? {
                Some(summary) => println!(
                    "✓ Created {} categories, {} products, {} addons",
                    summary.categories, summary.products, summary.addons
                ),
                None => println!("⚠ Catalog already has data, nothing seeded"),
            }
        }

        Command::Report { range, payment, csv } => {
            let filter = ReportFilter { range, payment };
            let report = reports::sales_report(&ctx.db, filter).await?;
            println!("Relatório de Vendas - {}", range.title());
            println!("  Vendas:       {}", report.sale_count);
            println!("  Total:        {}", Money::from_cents(report.total_cents).to_brl());
            println!(
                "  Ticket médio: {}",
                Money::from_cents(report.average_ticket_cents).to_brl()
            );
            for p in &report.payment_breakdown {
                println!(
                    "  {:<10} {:>4}  {}",
                    p.label,
                    p.count,
                    Money::from_cents(p.amount_cents).to_brl()
                );
            }
            for (rank, product) in report.top_products.iter().enumerate() {
                println!(
                    "  {}. {} x{}  {}",
                    rank + 1,
                    product.name,
                    product.quantity,
                    Money::from_cents(product.revenue_cents).to_brl()
                );
            }
            if let Some(dir) = csv {
                let path = reports::export_sales_report_csv(&ctx.db, filter, &dir).await?;
                println!("✓ CSV written to {}", path.display());
            }
        }

        Command::Products { action: Transfer::Export { file } } => {
            let csv = catalog::export_products_csv(&ctx.db).await?;
            let path = file.unwrap_or_else(|| PathBuf::from(catalog::products_csv_file_name(Utc::now())));
            tokio::fs::write(&path, csv).await?;
            println!("✓ Products exported to {}", path.display());
        }

        Command::Products { action: Transfer::Import { file } } => {
            let csv = tokio::fs::read_to_string(&file).await?;
            let summary = catalog::import_products_csv(&ctx.db, &csv).await?;
            println!("✓ Imported {} products, skipped {}", summary.imported, summary.skipped);
            for name in &summary.categories_created {
                println!("  + category {}", name);
            }
        }

        Command::Backup { action: Transfer::Export { file } } => {
            let json = settings::export_backup(&ctx.db).await?;
            let path = file.unwrap_or_else(|| {
                PathBuf::from(settings::backup_file_name(Utc::now().date_naive()))
            });
            tokio::fs::write(&path, json).await?;
            println!("✓ Backup written to {}", path.display());
        }

        Command::Backup { action: Transfer::Import { file } } => {
            let json = tokio::fs::read_to_string(&file).await?;
            let summary = settings::import_backup(&ctx.db, &json).await?;
            println!(
                "✓ Restored {} users, {} categories, {} products, {} addons, {} sales",
                summary.users, summary.categories, summary.products, summary.addons, summary.sales
            );
        }

        Command::Reprint { sale_id, download, print } => {
            let artifact = receipt::reprint_sale(&ctx.db, sale_id).await?;
            println!("{}", artifact.plain_text);
            if download {
                let path = receipt::download_receipt(&artifact, &ctx.config.receipts).await?;
                println!("✓ Receipt saved to {}", path.display());
            }
            if print {
                if receipt::print_receipt(&ctx.printer, &artifact).await {
                    println!("✓ Sent to printer");
                } else {
                    println!("⚠ Printer unavailable");
                }
            }
        }

        Command::TestPrinter => {
            settings::test_printer(&ctx.db, &ctx.printer).await?;
            println!("✓ Test page printed");
        }

        Command::Users => {
            // No login on the CLI: read the repository directly
            for user in ctx.db.inner().users().list_all().await? {
                println!("{:<8} {:<30} {}", user.role.as_str(), user.email, user.name);
            }
        }
    }
    Ok(())
}
