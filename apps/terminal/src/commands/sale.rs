//! # Sale Commands
//!
//! Finalizing the cart into a stored sale, and reading sales back.
//!
//! ## Checkout State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    finalize_sale                                        │
//! │                                                                         │
//! │   Idle ──► Validating ──► Persisting ──► ReceiptReady { sale_id }       │
//! │                │               │                                        │
//! │                ▼               ▼                                        │
//! │            Rejected        Rejected                                     │
//! │     (empty cart, cash   (store failure:                                 │
//! │      below total)        nothing written,                               │
//! │                          cart kept for retry)                           │
//! │                                                                         │
//! │  After the sale is committed (never undone from here on):               │
//! │    1. stock -= qty, one statement per line, failures only logged        │
//! │    2. kitchen lines picked, the sold lines leave the cart               │
//! │    3. receipt + kitchen ticket rendered, state ReceiptReady             │
//! │    4. optional print in a background task (failures only logged)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines added to the cart while the sale is being stored are not part of
//! it and stay in the cart. The next sale never waits on the print helper.

use acaizen_core::checkout::{draft_sale, kitchen_lines, CheckoutState, KitchenTicket, PaymentInput};
use acaizen_core::receipt::{render_kitchen_ticket, render_receipt, ReceiptArtifact, StoreInfo};
use acaizen_core::Sale;
use acaizen_print::PrinterDispatcher;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{CartState, CheckoutSettings, DbState, PrinterState, SessionState};

/// What the payment dialog submits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeSaleRequest {
    pub payment: PaymentInput,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Send the receipt (and kitchen ticket) to the print helper.
    #[serde(default)]
    pub print: bool,
}

/// Whether each artifact reached the print helper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOutcome {
    pub receipt: bool,
    /// `None` when there was no kitchen ticket to print.
    pub kitchen: Option<bool>,
}

/// Prints running in the background for one finalized sale.
///
/// Dropping the job does not cancel it.
#[derive(Debug)]
pub struct PrintJob {
    handle: JoinHandle<PrintOutcome>,
    has_kitchen_ticket: bool,
}

impl PrintJob {
    fn spawn(
        dispatcher: PrinterDispatcher,
        receipt: ReceiptArtifact,
        kitchen_ticket: Option<ReceiptArtifact>,
    ) -> Self {
        let has_kitchen_ticket = kitchen_ticket.is_some();
        let handle = tokio::spawn(async move {
            let kitchen = async {
                match &kitchen_ticket {
                    Some(ticket) => Some(dispatcher.send_kitchen_ticket(ticket).await),
                    None => None,
                }
            };
            let (receipt, kitchen) = tokio::join!(dispatcher.send_receipt(&receipt), kitchen);
            PrintOutcome { receipt, kitchen }
        });
        PrintJob {
            handle,
            has_kitchen_ticket,
        }
    }

    /// Waits for both prints to settle.
    pub async fn outcome(self) -> PrintOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "Print task did not finish");
                PrintOutcome {
                    receipt: false,
                    kitchen: self.has_kitchen_ticket.then_some(false),
                }
            }
        }
    }
}

/// The finalized sale with its rendered artifacts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeSaleResponse {
    pub sale: Sale,
    pub receipt: ReceiptArtifact,
    pub kitchen_ticket: Option<ReceiptArtifact>,
    /// Background prints; `None` when printing was not requested.
    #[serde(skip)]
    pub print_job: Option<PrintJob>,
}

/// Turns the cart into a stored sale.
///
/// ## Errors
/// - `UNAUTHORIZED`: nobody is logged in
/// - `BUSINESS_LOGIC`: another finalization is still running
/// - `CART_ERROR`: empty cart
/// - `PAYMENT_ERROR`: cash received below the total
/// - `DATABASE_ERROR`: the sale could not be stored
///
/// In every error case nothing is stored and the cart is unchanged.
pub async fn finalize_sale(
    db: &DbState,
    cart: &CartState,
    session: &SessionState,
    printer: &PrinterState,
    settings: &CheckoutSettings,
    request: FinalizeSaleRequest,
) -> Result<FinalizeSaleResponse, ApiError> {
    debug!(method = request.payment.method.as_str(), "finalize_sale command");

    let operator = session
        .operator()
        .ok_or_else(|| ApiError::unauthorized("Log in before finalizing a sale"))?;

    session.begin_checkout()?;

    let snapshot = cart.snapshot();
    let customer_name = request
        .customer_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(&settings.default_customer_name);

    let draft = match draft_sale(&snapshot, &request.payment, Some(customer_name), &operator, Utc::now()) {
        Ok(draft) => draft,
        Err(err) => return Err(reject(session, err.into())),
    };

    let store = match db.inner().store_config().get_or_init().await {
        Ok(store) => store,
        Err(err) => return Err(reject(session, err.into())),
    };

    session.set_checkout(CheckoutState::Persisting);
    let decrements = draft.stock_decrements();

    let sale = match db.inner().sales().record_sale(draft).await {
        Ok(sale) => sale,
        Err(err) => return Err(reject(session, err.into())),
    };

    info!(
        sale_id = sale.id,
        total = sale.total_cents,
        items = sale.items.len(),
        operator = %sale.operator_name,
        "Sale finalized"
    );

    let products = db.inner().products();
    for (product_id, quantity) in decrements {
        if let Err(err) = products.adjust_stock(product_id, -quantity).await {
            warn!(sale_id = sale.id, product_id, quantity, error = %err, "Stock decrement failed");
        }
    }

    let kitchen = kitchen_lines(&snapshot, settings.kitchen_category_id);
    cart.with_cart_mut(|c| c.remove_sold(&snapshot));

    let store_info = StoreInfo::from(&store);
    let receipt = render_receipt(&sale, &store_info);
    let kitchen_ticket =
        KitchenTicket::for_sale(&sale, kitchen).map(|ticket| render_kitchen_ticket(&ticket, &store_info));

    session.set_checkout(CheckoutState::ReceiptReady { sale_id: sale.id });

    let print_job = if request.print {
        let dispatcher = printer.dispatcher().await;
        Some(PrintJob::spawn(dispatcher, receipt.clone(), kitchen_ticket.clone()))
    } else {
        None
    };

    Ok(FinalizeSaleResponse {
        sale,
        receipt,
        kitchen_ticket,
        print_job,
    })
}

fn reject(session: &SessionState, err: ApiError) -> ApiError {
    warn!(code = ?err.code, reason = %err.message, "Sale rejected");
    session.set_checkout(CheckoutState::Rejected {
        reason: err.message.clone(),
    });
    err
}

/// Where the current checkout attempt is.
pub fn checkout_state(session: &SessionState) -> CheckoutState {
    session.checkout_state()
}

/// Loads one sale with its items.
pub async fn get_sale(db: &DbState, sale_id: i64) -> Result<Sale, ApiError> {
    debug!(sale_id, "get_sale command");
    db.inner()
        .sales()
        .get_by_id(sale_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", sale_id))
}

/// All sales, oldest first, with their items.
pub async fn list_sales(db: &DbState) -> Result<Vec<Sale>, ApiError> {
    debug!("list_sales command");
    Ok(db.inner().sales().list_all().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use acaizen_core::{Money, PaymentMethod, StoreConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::commands::cart::add_to_cart;
    use crate::error::ErrorCode;
    use crate::test_support::{product_named, test_context};

    fn cash(received_cents: i64) -> FinalizeSaleRequest {
        FinalizeSaleRequest {
            payment: PaymentInput::cash(Money::from_cents(received_cents)),
            customer_name: None,
            print: false,
        }
    }

    #[tokio::test]
    async fn test_cash_sale_with_addon() {
        let ctx = test_context().await;
        let acai = product_named(&ctx, "Açaí Tradicional 300ml").await;
        let granola = ctx
            .db
            .inner()
            .addons()
            .list_for_product(acai.id)
            .await
            .unwrap()
            .into_iter()
            .find(|a| a.name == "Granola")
            .unwrap();
        add_to_cart(&ctx.db, &ctx.cart, acai.id, Some(2), &[granola.id])
            .await
            .unwrap();

        let response = finalize_sale(&ctx.db, &ctx.cart, &ctx.session, &ctx.printer, &ctx.config.checkout, cash(4000))
            .await
            .unwrap();

        let sale = &response.sale;
        assert_eq!(sale.total_cents, 3580);
        assert_eq!(sale.change_cents, Some(420));
        assert_eq!(sale.cash_received_cents, Some(4000));
        assert_eq!(sale.customer_name, "Cliente");
        assert_eq!(sale.operator_name, "Administrador");
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].addons[0].name, "Granola");

        assert!(response.receipt.plain_text.contains("R$35,80"));
        assert!(response.receipt.plain_text.contains("R$4,20"));
        assert!(response.kitchen_ticket.is_none());
        assert!(response.print_job.is_none());

        // Stored, stock decremented, cart cleared, state moved on
        let stored = get_sale(&ctx.db, sale.id).await.unwrap();
        assert_eq!(stored.total_cents, 3580);
        assert_eq!(stored.items, sale.items);
        let after = ctx.db.inner().products().get_by_id(acai.id).await.unwrap().unwrap();
        assert_eq!(after.stock, acai.stock - 2);
        assert!(ctx.cart.with_cart(|c| c.is_empty()));
        assert_eq!(
            checkout_state(&ctx.session),
            CheckoutState::ReceiptReady { sale_id: sale.id }
        );
    }

    #[tokio::test]
    async fn test_insufficient_cash_keeps_cart_and_stores_nothing() {
        let ctx = test_context().await;
        let acai = product_named(&ctx, "Açaí Tradicional 300ml").await;
        add_to_cart(&ctx.db, &ctx.cart, acai.id, Some(2), &[]).await.unwrap();

        let err = finalize_sale(&ctx.db, &ctx.cart, &ctx.session, &ctx.printer, &ctx.config.checkout, cash(3000))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PaymentError);
        assert_eq!(ctx.db.inner().sales().count().await.unwrap(), 0);
        assert_eq!(ctx.cart.with_cart(|c| c.line_count()), 1);
        assert!(matches!(checkout_state(&ctx.session), CheckoutState::Rejected { .. }));

        let untouched = ctx.db.inner().products().get_by_id(acai.id).await.unwrap().unwrap();
        assert_eq!(untouched.stock, acai.stock);
    }

    #[tokio::test]
    async fn test_empty_cart_and_missing_operator() {
        let ctx = test_context().await;
        let err = finalize_sale(&ctx.db, &ctx.cart, &ctx.session, &ctx.printer, &ctx.config.checkout, cash(100))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        ctx.session.sign_out();
        let err = finalize_sale(&ctx.db, &ctx.cart, &ctx.session, &ctx.printer, &ctx.config.checkout, cash(100))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_card_sale_with_kitchen_ticket_and_customer() {
        let ctx = test_context().await;
        let sandwich = product_named(&ctx, "Sanduíche Natural").await;
        let juice = product_named(&ctx, "Suco Natural").await;
        add_to_cart(&ctx.db, &ctx.cart, sandwich.id, Some(1), &[]).await.unwrap();
        add_to_cart(&ctx.db, &ctx.cart, juice.id, Some(1), &[]).await.unwrap();

        let request = FinalizeSaleRequest {
            payment: PaymentInput {
                method: PaymentMethod::Debit,
                cash_received_cents: Some(5000),
            },
            customer_name: Some("  João ".to_string()),
            print: false,
        };
        let response = finalize_sale(&ctx.db, &ctx.cart, &ctx.session, &ctx.printer, &ctx.config.checkout, request)
            .await
            .unwrap();

        assert_eq!(response.sale.total_cents, 2000);
        assert_eq!(response.sale.change_cents, None);
        assert_eq!(response.sale.cash_received_cents, None);
        assert_eq!(response.sale.customer_name, "João");

        let ticket = response.kitchen_ticket.unwrap();
        assert!(ticket.plain_text.contains("Sanduíche Natural"));
        assert!(!ticket.plain_text.contains("Suco Natural"));
        assert!(!ticket.plain_text.contains("R$"));
    }

    #[tokio::test]
    async fn test_printing_failure_does_not_fail_the_sale() {
        let ctx = test_context().await;
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/print"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/print-kitchen"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let address = server.address();
        let config = StoreConfig {
            printer_host: address.ip().to_string(),
            printer_port: i64::from(address.port()),
            ..StoreConfig::default()
        };
        ctx.printer.reconfigure(&config).await.unwrap();

        let sandwich = product_named(&ctx, "Sanduíche Natural").await;
        add_to_cart(&ctx.db, &ctx.cart, sandwich.id, None, &[]).await.unwrap();

        let request = FinalizeSaleRequest {
            payment: PaymentInput::new(PaymentMethod::Pix),
            customer_name: None,
            print: true,
        };
        let response = finalize_sale(&ctx.db, &ctx.cart, &ctx.session, &ctx.printer, &ctx.config.checkout, request)
            .await
            .unwrap();

        let outcome = response.print_job.unwrap().outcome().await;
        assert_eq!(
            outcome,
            PrintOutcome {
                receipt: true,
                kitchen: Some(false),
            }
        );
        assert_eq!(ctx.db.inner().sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_slow_printer_does_not_hold_the_checkout() {
        let ctx = test_context().await;
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/print"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let address = server.address();
        let config = StoreConfig {
            printer_host: address.ip().to_string(),
            printer_port: i64::from(address.port()),
            ..StoreConfig::default()
        };
        ctx.printer.reconfigure(&config).await.unwrap();

        let soda = product_named(&ctx, "Refrigerante Lata").await;
        add_to_cart(&ctx.db, &ctx.cart, soda.id, None, &[]).await.unwrap();

        let request = FinalizeSaleRequest {
            payment: PaymentInput::new(PaymentMethod::Pix),
            customer_name: None,
            print: true,
        };
        let started = Instant::now();
        let response = finalize_sale(&ctx.db, &ctx.cart, &ctx.session, &ctx.printer, &ctx.config.checkout, request)
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(
            checkout_state(&ctx.session),
            CheckoutState::ReceiptReady {
                sale_id: response.sale.id
            }
        );

        // The next sale can start while the receipt is still printing
        add_to_cart(&ctx.db, &ctx.cart, soda.id, None, &[]).await.unwrap();
        finalize_sale(&ctx.db, &ctx.cart, &ctx.session, &ctx.printer, &ctx.config.checkout, cash(500))
            .await
            .unwrap();
        assert_eq!(ctx.db.inner().sales().count().await.unwrap(), 2);

        let outcome = response.print_job.unwrap().outcome().await;
        assert_eq!(
            outcome,
            PrintOutcome {
                receipt: true,
                kitchen: None,
            }
        );
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_cart_and_rejects() {
        let ctx = test_context().await;
        let acai = product_named(&ctx, "Açaí Tradicional 300ml").await;
        add_to_cart(&ctx.db, &ctx.cart, acai.id, Some(1), &[]).await.unwrap();
        let before = ctx.cart.snapshot();

        sqlx::query("DROP TABLE sale_items")
            .execute(ctx.db.inner().pool())
            .await
            .unwrap();

        let err = finalize_sale(&ctx.db, &ctx.cart, &ctx.session, &ctx.printer, &ctx.config.checkout, cash(2000))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(ctx.cart.snapshot(), before);
        assert_eq!(ctx.db.inner().sales().count().await.unwrap(), 0);
        assert!(matches!(checkout_state(&ctx.session), CheckoutState::Rejected { .. }));

        let untouched = ctx.db.inner().products().get_by_id(acai.id).await.unwrap().unwrap();
        assert_eq!(untouched.stock, acai.stock);
    }

    #[tokio::test]
    async fn test_list_sales_and_missing_sale() {
        let ctx = test_context().await;
        let soda = product_named(&ctx, "Refrigerante Lata").await;
        for _ in 0..2 {
            add_to_cart(&ctx.db, &ctx.cart, soda.id, None, &[]).await.unwrap();
            finalize_sale(&ctx.db, &ctx.cart, &ctx.session, &ctx.printer, &ctx.config.checkout, cash(500))
                .await
                .unwrap();
        }

        let sales = list_sales(&ctx.db).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert!(sales.iter().all(|s| s.change_cents == Some(0)));

        let err = get_sale(&ctx.db, 404).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
