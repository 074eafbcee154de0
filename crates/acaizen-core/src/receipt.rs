//! # Receipt Formatter
//!
//! Pure transformation of a stored sale into two textual artifacts:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   (Sale + items, StoreInfo) ──┬──► plain text (40 columns, thermal)     │
//! │                               │                                         │
//! │                               └──► HTML document (print dialog/file)    │
//! │                                                                         │
//! │   Both are built from the same `ReceiptLines` model, so totals, change  │
//! │   and per-line prices cannot disagree.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Plain-Text Layout
//! ```text
//! Açaízen SmartHUB
//! Rua Arthur Oscar, 220 - Vila Nova, Mansa - RJ
//! Tel: (24) 9933-9007
//! ----------------------------------------
//! Data: 14/03/2025 15:42:07
//! Cliente: Maria
//! Pedido #12
//! ----------------------------------------
//! 2x Açaí 300ml                    R$35,80
//!   + Granola                       R$2,00
//! ----------------------------------------
//! TOTAL:                           R$35,80
//! ----------------------------------------
//! Forma de pagamento: Dinheiro
//! Valor recebido:                  R$40,00
//! Troco:                            R$4,20
//! ----------------------------------------
//! Obrigado pela preferência!
//! @acaizenn | @açaizen
//! Pedido #12
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::checkout::KitchenTicket;
use crate::money::Money;
use crate::types::{PaymentMethod, Sale, StoreConfig};

/// Width of a thermal printer line, in characters.
pub const LINE_WIDTH: usize = 40;

const RULE: &str = "----------------------------------------";
const THANK_YOU: &str = "Obrigado pela preferência!";

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// The store details printed on receipts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub instagram: String,
    pub facebook: String,
    pub utc_offset_minutes: i64,
}

impl From<&StoreConfig> for StoreInfo {
    fn from(config: &StoreConfig) -> Self {
        StoreInfo {
            name: config.store_name.clone(),
            address: config.address.clone(),
            phone: config.phone.clone(),
            instagram: config.instagram.clone(),
            facebook: config.facebook.clone(),
            utc_offset_minutes: config.utc_offset_minutes,
        }
    }
}

impl StoreInfo {
    fn offset(&self) -> FixedOffset {
        StoreConfig {
            utc_offset_minutes: self.utc_offset_minutes,
            ..StoreConfig::default()
        }
        .local_offset()
    }

    fn local_timestamp(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset())
            .format("%d/%m/%Y %H:%M:%S")
            .to_string()
    }

    fn social_line(&self) -> Option<String> {
        let handles: Vec<&str> = [self.instagram.trim(), self.facebook.trim()]
            .into_iter()
            .filter(|h| !h.is_empty())
            .collect();
        if handles.is_empty() {
            None
        } else {
            Some(handles.join(" | "))
        }
    }
}

/// A rendered receipt, immutable once built.
///
/// The caller decides how long to keep it and where to send it (print
/// helper, print dialog, downloaded file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptArtifact {
    pub title: String,
    pub plain_text: String,
    /// Standalone HTML document.
    pub html: String,
    /// Inner `<body>` markup, for hosts that wrap it in their own shell.
    pub html_body: String,
}

// =============================================================================
// Shared Line Model
// =============================================================================

/// One priced row: left text and a right-aligned amount.
struct PricedRow {
    label: String,
    amount: Money,
}

struct ItemBlock {
    row: PricedRow,
    addons: Vec<PricedRow>,
}

/// Everything a sale receipt shows, computed once.
struct ReceiptLines {
    header: Vec<String>,
    details: Vec<String>,
    items: Vec<ItemBlock>,
    total: PricedRow,
    payment_label: String,
    cash_rows: Vec<PricedRow>,
    footer: Vec<String>,
}

impl ReceiptLines {
    fn build(sale: &Sale, store: &StoreInfo) -> Self {
        let mut header = vec![store.name.clone()];
        if !store.address.trim().is_empty() {
            header.push(store.address.clone());
        }
        if !store.phone.trim().is_empty() {
            header.push(format!("Tel: {}", store.phone));
        }

        let mut details = vec![format!("Data: {}", store.local_timestamp(sale.created_at))];
        if !sale.customer_name.trim().is_empty() {
            details.push(format!("Cliente: {}", sale.customer_name));
        }
        if sale.id > 0 {
            details.push(format!("Pedido #{}", sale.id));
        }

        let items = sale
            .items
            .iter()
            .map(|item| ItemBlock {
                row: PricedRow {
                    label: format!("{}x {}", item.quantity, item.product_name),
                    amount: item.total_price(),
                },
                addons: item
                    .addons
                    .iter()
                    .map(|addon| PricedRow {
                        label: format!("  + {}", addon.name),
                        amount: addon.price(),
                    })
                    .collect(),
            })
            .collect();

        // Change is only shown for cash; a missing value prints as zero.
        let cash_rows = match (sale.payment_method, sale.cash_received()) {
            (PaymentMethod::Cash, Some(received)) => vec![
                PricedRow {
                    label: "Valor recebido:".to_string(),
                    amount: received,
                },
                PricedRow {
                    label: "Troco:".to_string(),
                    amount: sale.change().unwrap_or_default(),
                },
            ],
            _ => Vec::new(),
        };

        let mut footer = vec![THANK_YOU.to_string()];
        footer.extend(store.social_line());
        if sale.id > 0 {
            footer.push(format!("Pedido #{}", sale.id));
        }

        ReceiptLines {
            header,
            details,
            items,
            total: PricedRow {
                label: "TOTAL:".to_string(),
                amount: sale.total(),
            },
            payment_label: format!("Forma de pagamento: {}", sale.payment_method.receipt_label()),
            cash_rows,
            footer,
        }
    }
}

// =============================================================================
// Plain Text
// =============================================================================

/// Right-aligns `amount` against `label` on a [`LINE_WIDTH`] line.
///
/// The gap is `max(1, width - label - amount)` characters: when the text is
/// too long the line overflows with a single space instead of being cut.
///
/// ## Example
/// ```rust
/// use acaizen_core::receipt::align_price;
/// use acaizen_core::Money;
///
/// let line = align_price("TOTAL:", Money::from_cents(3580));
/// assert_eq!(line.chars().count(), 40);
/// assert!(line.ends_with(" R$35,80"));
/// ```
pub fn align_price(label: &str, amount: Money) -> String {
    let price = amount.to_brl();
    let used = label.chars().count() + price.chars().count();
    let gap = LINE_WIDTH.saturating_sub(used).max(1);
    format!("{}{}{}", label, " ".repeat(gap), price)
}

fn push_row(out: &mut String, row: &PricedRow) {
    out.push_str(&align_price(&row.label, row.amount));
    out.push('\n');
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn plain_text(lines: &ReceiptLines) -> String {
    let mut out = String::new();

    for line in &lines.header {
        push_line(&mut out, line);
    }
    push_line(&mut out, RULE);
    for line in &lines.details {
        push_line(&mut out, line);
    }
    push_line(&mut out, RULE);

    for item in &lines.items {
        push_row(&mut out, &item.row);
        for addon in &item.addons {
            push_row(&mut out, addon);
        }
    }

    push_line(&mut out, RULE);
    push_row(&mut out, &lines.total);
    push_line(&mut out, RULE);
    push_line(&mut out, &lines.payment_label);
    for row in &lines.cash_rows {
        push_row(&mut out, row);
    }
    push_line(&mut out, RULE);
    for line in &lines.footer {
        push_line(&mut out, line);
    }

    out
}

// =============================================================================
// HTML
// =============================================================================

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Print-dialog behaviour added to an HTML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPrint {
    /// Close the surface after this delay if the dialog never reports back.
    pub fallback_close_ms: u64,
}

/// Wraps receipt markup in a complete, self-contained HTML document.
///
/// With `auto_print` the body opens the print dialog on load, closes the
/// surface after printing, and closes it anyway after the fallback delay.
pub fn html_shell(title: &str, body: &str, auto_print: Option<AutoPrint>) -> String {
    let (body_attrs, script) = match auto_print {
        Some(auto) => (
            r#" onload="window.print()" onafterprint="window.close()""#.to_string(),
            format!(
                "\n<script>\nsetTimeout(function () {{\n  if (document.readyState === 'complete') {{\n    window.close();\n  }}\n}}, {});\n</script>",
                auto.fallback_close_ms
            ),
        ),
        None => (String::new(), String::new()),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8"/>
<title>{title}</title>
<style>
body {{ font-family: monospace; font-size: 12px; padding: 20px; margin: 0; width: 300px; color: #111; }}
@media print {{ body {{ width: 100%; }} }}
.center {{ text-align: center; }}
.rule {{ border-top: 1px dashed #111; margin: 6px 0; }}
.line {{ display: flex; justify-content: space-between; gap: 8px; }}
.addon {{ padding-left: 12px; color: #444; }}
.total {{ font-weight: bold; font-size: 14px; }}
ul {{ list-style: none; margin: 0; padding: 0; }}
</style>
</head>
<body{body_attrs}>
{body}{script}
</body>
</html>
"#,
        title = escape_html(title),
        body_attrs = body_attrs,
        body = body,
        script = script,
    )
}

fn html_row(class: &str, row: &PricedRow) -> String {
    format!(
        "<div class=\"{}\"><span>{}</span><span class=\"amount\">{}</span></div>",
        class,
        escape_html(row.label.trim()),
        row.amount.to_brl()
    )
}

fn html_body(lines: &ReceiptLines) -> String {
    let mut body = String::new();

    body.push_str("<header class=\"center\">");
    for (i, line) in lines.header.iter().enumerate() {
        if i == 0 {
            body.push_str(&format!("<h1>{}</h1>", escape_html(line)));
        } else {
            body.push_str(&format!("<div>{}</div>", escape_html(line)));
        }
    }
    body.push_str("</header>\n<div class=\"rule\"></div>\n<section class=\"details\">");
    for line in &lines.details {
        body.push_str(&format!("<div>{}</div>", escape_html(line)));
    }
    body.push_str("</section>\n<div class=\"rule\"></div>\n<ul class=\"items\">\n");

    for item in &lines.items {
        body.push_str("<li>");
        body.push_str(&html_row("line item", &item.row));
        if !item.addons.is_empty() {
            body.push_str("<ul>");
            for addon in &item.addons {
                body.push_str("<li>");
                body.push_str(&html_row("line addon", addon));
                body.push_str("</li>");
            }
            body.push_str("</ul>");
        }
        body.push_str("</li>\n");
    }

    body.push_str("</ul>\n<div class=\"rule\"></div>\n");
    body.push_str(&html_row("line total", &lines.total));
    body.push_str("\n<div class=\"rule\"></div>\n<section class=\"payment\">");
    body.push_str(&format!("<div>{}</div>", escape_html(&lines.payment_label)));
    for row in &lines.cash_rows {
        body.push_str(&html_row("line cash", row));
    }
    body.push_str("</section>\n<div class=\"rule\"></div>\n<footer class=\"center\">");
    for line in &lines.footer {
        body.push_str(&format!("<div>{}</div>", escape_html(line)));
    }
    body.push_str("</footer>");

    body
}

// =============================================================================
// Public Renderers
// =============================================================================

/// Renders the customer receipt for a stored sale.
pub fn render_receipt(sale: &Sale, store: &StoreInfo) -> ReceiptArtifact {
    let lines = ReceiptLines::build(sale, store);
    let title = format!("Cupom - {}", store.name);
    let body = html_body(&lines);

    ReceiptArtifact {
        plain_text: plain_text(&lines),
        html: html_shell(&title, &body, None),
        html_body: body,
        title,
    }
}

/// Renders the kitchen sub-receipt: names, quantities and addon names only.
pub fn render_kitchen_ticket(ticket: &KitchenTicket, store: &StoreInfo) -> ReceiptArtifact {
    let when = store.local_timestamp(ticket.created_at);

    let mut text = String::new();
    push_line(&mut text, "*** COZINHA ***");
    push_line(&mut text, &format!("Pedido #{}", ticket.order_number));
    push_line(&mut text, &format!("Cliente: {}", ticket.customer_name));
    push_line(&mut text, &format!("Data: {}", when));
    push_line(&mut text, RULE);
    for line in &ticket.lines {
        push_line(&mut text, &format!("{}x {}", line.quantity, line.name));
        for addon in &line.addon_names {
            push_line(&mut text, &format!("  + {}", addon));
        }
    }
    push_line(&mut text, RULE);

    let mut body = format!(
        "<header class=\"center\"><h1>COZINHA</h1><div>Pedido #{}</div><div>Cliente: {}</div><div>Data: {}</div></header>\n<div class=\"rule\"></div>\n<ul class=\"items\">\n",
        ticket.order_number,
        escape_html(&ticket.customer_name),
        escape_html(&when)
    );
    for line in &ticket.lines {
        body.push_str(&format!("<li><strong>{}x {}</strong>", line.quantity, escape_html(&line.name)));
        if !line.addon_names.is_empty() {
            body.push_str("<ul>");
            for addon in &line.addon_names {
                body.push_str(&format!("<li class=\"addon\">+ {}</li>", escape_html(addon)));
            }
            body.push_str("</ul>");
        }
        body.push_str("</li>\n");
    }
    body.push_str("</ul>");

    let title = format!("Cozinha - Pedido #{}", ticket.order_number);
    ReceiptArtifact {
        plain_text: text,
        html: html_shell(&title, &body, None),
        html_body: body,
        title,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::KitchenLine;
    use crate::types::{AddonSnapshot, SaleItem};
    use chrono::TimeZone;

    fn store() -> StoreInfo {
        StoreInfo::from(&StoreConfig::default())
    }

    fn sale(method: PaymentMethod, items: Vec<SaleItem>, received: Option<i64>) -> Sale {
        let total: i64 = items.iter().map(|i| i.total_price_cents).sum();
        let change = received.map(|r| r - total);
        Sale {
            id: 12,
            customer_name: "Maria".to_string(),
            total_cents: total,
            payment_method: method,
            cash_received_cents: received,
            change_cents: change,
            items,
            // 18:42:07 UTC is 15:42:07 in Brasília
            created_at: Utc.with_ymd_and_hms(2025, 3, 14, 18, 42, 7).unwrap(),
            operator_id: "admin-1".to_string(),
            operator_name: "Administrador".to_string(),
        }
    }

    fn acai_item() -> SaleItem {
        SaleItem {
            id: 1,
            sale_id: 12,
            product_id: 1,
            product_name: "Açaí 300ml".to_string(),
            quantity: 2,
            unit_price_cents: 1590,
            addons: vec![AddonSnapshot {
                id: 1,
                name: "Granola".to_string(),
                price_cents: 200,
            }],
            total_price_cents: 3580,
        }
    }

    fn line_starting<'a>(text: &'a str, prefix: &str) -> &'a str {
        text.lines()
            .find(|l| l.starts_with(prefix))
            .unwrap_or_else(|| panic!("no line starting with {prefix:?} in:\n{text}"))
    }

    /// Pulls every `R$` amount out of a text, in order.
    fn amounts(text: &str) -> Vec<String> {
        text.match_indices("R$")
            .map(|(pos, _)| {
                text[pos..]
                    .chars()
                    .take_while(|c| *c == 'R' || *c == '$' || *c == ',' || c.is_ascii_digit())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_cash_scenario_lines() {
        let receipt = render_receipt(&sale(PaymentMethod::Cash, vec![acai_item()], Some(4000)), &store());
        let text = &receipt.plain_text;

        let total = line_starting(text, "TOTAL:");
        assert!(total.ends_with("R$35,80"));
        assert_eq!(total.chars().count(), LINE_WIDTH);

        assert!(line_starting(text, "Troco:").ends_with("R$4,20"));
        assert!(line_starting(text, "Valor recebido:").ends_with("R$40,00"));
        assert!(line_starting(text, "2x Açaí 300ml").ends_with("R$35,80"));
        assert!(line_starting(text, "  + Granola").ends_with("R$2,00"));
        assert!(text.contains("Forma de pagamento: Dinheiro"));
    }

    #[test]
    fn test_header_and_footer() {
        let receipt = render_receipt(&sale(PaymentMethod::Pix, vec![acai_item()], None), &store());
        let text = &receipt.plain_text;

        assert!(text.starts_with("Açaízen SmartHUB\n"));
        assert!(text.contains("Tel: (24) 9933-9007"));
        assert!(text.contains("Data: 14/03/2025 15:42:07"));
        assert!(text.contains("Cliente: Maria"));
        assert!(text.contains("Obrigado pela preferência!"));
        assert!(text.contains("@acaizenn | @açaizen"));
        assert_eq!(text.matches("Pedido #12").count(), 2);
    }

    #[test]
    fn test_non_cash_has_no_change_block() {
        let receipt = render_receipt(&sale(PaymentMethod::Credit, vec![acai_item()], None), &store());
        assert!(receipt.plain_text.contains("Forma de pagamento: Cartão de Crédito"));
        assert!(!receipt.plain_text.contains("Troco:"));
        assert!(!receipt.html.contains("Troco:"));
    }

    #[test]
    fn test_long_name_keeps_one_space() {
        let mut item = acai_item();
        item.product_name = "Açaí Tropical Supremo com Frutas Vermelhas".to_string();
        item.addons.clear();
        let receipt = render_receipt(&sale(PaymentMethod::Pix, vec![item], None), &store());

        let line = line_starting(&receipt.plain_text, "2x Açaí Tropical");
        assert_eq!(
            line,
            "2x Açaí Tropical Supremo com Frutas Vermelhas R$35,80"
        );
    }

    #[test]
    fn test_align_price_uses_character_width() {
        // "Açaí" has multi-byte characters but is four columns wide
        let line = align_price("1x Açaí", Money::from_cents(990));
        assert_eq!(line.chars().count(), LINE_WIDTH);
    }

    #[test]
    fn test_plain_text_and_html_agree() {
        let mut second = acai_item();
        second.id = 2;
        second.product_name = "Água <sem gás>".to_string();
        second.quantity = 3;
        second.unit_price_cents = 300;
        second.addons.clear();
        second.total_price_cents = 900;

        let receipt = render_receipt(
            &sale(PaymentMethod::Cash, vec![acai_item(), second], Some(5000)),
            &store(),
        );

        assert_eq!(amounts(&receipt.plain_text), amounts(&receipt.html_body));
        assert!(receipt.html_body.contains("R$44,80"));
        assert!(receipt.html_body.contains("R$5,20"));
    }

    #[test]
    fn test_html_is_escaped_and_standalone() {
        let mut item = acai_item();
        item.product_name = "Açaí <b>&</b>".to_string();
        let receipt = render_receipt(&sale(PaymentMethod::Pix, vec![item], None), &store());

        assert!(receipt.html.starts_with("<!DOCTYPE html>"));
        assert!(receipt.html.contains("Açaí &lt;b&gt;&amp;&lt;/b&gt;"));
        assert!(!receipt.html.contains("<b>&</b>"));
        assert!(!receipt.html.contains("window.print"));
        assert_eq!(receipt.title, "Cupom - Açaízen SmartHUB");
    }

    #[test]
    fn test_html_shell_auto_print() {
        let html = html_shell("Cupom", "<pre>x</pre>", Some(AutoPrint { fallback_close_ms: 5000 }));
        assert!(html.contains(r#"<body onload="window.print()" onafterprint="window.close()">"#));
        assert!(html.contains("}, 5000);"));
    }

    #[test]
    fn test_kitchen_ticket_has_no_prices() {
        let ticket = KitchenTicket {
            order_number: 12,
            customer_name: "Maria".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 14, 18, 42, 7).unwrap(),
            lines: vec![KitchenLine {
                quantity: 1,
                name: "X-Burger".to_string(),
                addon_names: vec!["Bacon".to_string()],
            }],
        };
        let artifact = render_kitchen_ticket(&ticket, &store());

        assert!(artifact.plain_text.contains("Pedido #12"));
        assert!(artifact.plain_text.contains("1x X-Burger\n  + Bacon\n"));
        assert!(!artifact.plain_text.contains("R$"));
        assert!(!artifact.html.contains("R$"));
    }
}
