//! # Reporting Aggregator
//!
//! Re-derives sales analytics from the full sales log for a date range and
//! an optional payment method.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   sales log ──► filter (date range ∧ payment) ──┬──► count / total /    │
//! │   (read only)                                   │    average ticket     │
//! │                                                 ├──► breakdown for all  │
//! │                                                 │    four methods       │
//! │                                                 └──► top 10 products    │
//! │                                                      by revenue         │
//! │                                                                         │
//! │   summarize() is a pure function: same input, same output.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Day Boundaries
//! Ranges are computed in the store's local time (a fixed UTC offset) and
//! are inclusive on both ends. Weeks start on Monday.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::types::{PaymentMethod, Sale};

/// Number of products kept in the ranking.
pub const TOP_PRODUCTS_LIMIT: usize = 10;

// =============================================================================
// Filters
// =============================================================================

/// Date range selector, relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    Today,
    Yesterday,
    /// Monday to Sunday of the current week.
    Week,
    /// First to last day of the current month.
    Month,
}

impl DateRange {
    /// Title used by report exports.
    pub fn title(&self) -> &'static str {
        match self {
            DateRange::Today => "Hoje",
            DateRange::Yesterday => "Ontem",
            DateRange::Week => "Última Semana",
            DateRange::Month => "Último Mês",
        }
    }

    pub fn parse(code: &str) -> Option<DateRange> {
        match code.trim().to_ascii_lowercase().as_str() {
            "today" => Some(DateRange::Today),
            "yesterday" => Some(DateRange::Yesterday),
            "week" => Some(DateRange::Week),
            "month" => Some(DateRange::Month),
            _ => None,
        }
    }

    /// Inclusive `[start, end]` bounds in UTC for this range.
    ///
    /// ## Example
    /// ```rust
    /// use acaizen_core::report::DateRange;
    /// use chrono::{FixedOffset, TimeZone, Utc};
    ///
    /// let brt = FixedOffset::west_opt(3 * 3600).unwrap();
    /// // 01:00 UTC on the 15th is still the 14th in Brasília
    /// let now = Utc.with_ymd_and_hms(2025, 3, 15, 1, 0, 0).unwrap();
    /// let (start, _) = DateRange::Today.bounds(now, brt);
    /// assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 14, 3, 0, 0).unwrap());
    /// ```
    pub fn bounds(&self, now: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.with_timezone(&offset).date_naive();

        let (first_day, next_first_day) = match self {
            DateRange::Today => (today, today + Duration::days(1)),
            DateRange::Yesterday => (today - Duration::days(1), today),
            DateRange::Week => {
                let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                (monday, monday + Duration::days(7))
            }
            DateRange::Month => {
                let first = today - Duration::days(i64::from(today.day0()));
                // Day 1 + 32 days always lands early in the following month
                let next_month = first + Duration::days(32);
                (first, next_month - Duration::days(i64::from(next_month.day0())))
            }
        };

        (
            local_midnight(first_day, offset),
            local_midnight(next_first_day, offset) - Duration::milliseconds(1),
        )
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let naive_utc = date.and_time(NaiveTime::MIN) - Duration::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&naive_utc)
}

/// Payment method filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFilter {
    #[default]
    All,
    Cash,
    Credit,
    Debit,
    Pix,
}

impl PaymentFilter {
    pub fn matches(&self, method: PaymentMethod) -> bool {
        match self {
            PaymentFilter::All => true,
            PaymentFilter::Cash => method == PaymentMethod::Cash,
            PaymentFilter::Credit => method == PaymentMethod::Credit,
            PaymentFilter::Debit => method == PaymentMethod::Debit,
            PaymentFilter::Pix => method == PaymentMethod::Pix,
        }
    }

    pub fn parse(code: &str) -> Option<PaymentFilter> {
        if code.trim().eq_ignore_ascii_case("all") {
            return Some(PaymentFilter::All);
        }
        PaymentMethod::parse(code).map(PaymentFilter::from)
    }
}

impl From<PaymentMethod> for PaymentFilter {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => PaymentFilter::Cash,
            PaymentMethod::Credit => PaymentFilter::Credit,
            PaymentMethod::Debit => PaymentFilter::Debit,
            PaymentMethod::Pix => PaymentFilter::Pix,
        }
    }
}

/// Both report filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub range: DateRange,
    pub payment: PaymentFilter,
}

// =============================================================================
// Output
// =============================================================================

/// Count and amount for one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub method: PaymentMethod,
    pub label: String,
    pub count: i64,
    pub amount_cents: i64,
}

/// Quantity and revenue for one product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// The computed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub filter: ReportFilter,
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "String")]
    pub end: DateTime<Utc>,
    pub sale_count: i64,
    pub total_cents: i64,
    /// `total / count` rounded half up, 0 when there are no sales.
    pub average_ticket_cents: i64,
    /// Always four entries: cash, credit, debit, pix.
    pub payment_breakdown: Vec<PaymentBreakdown>,
    pub top_products: Vec<TopProduct>,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Computes the report for `filter` as of `now`.
///
/// Products are ranked by revenue, descending, under their sale-time name.
/// Equal revenue keeps the order in which the names were first seen while
/// walking the sales log.
pub fn summarize(sales: &[Sale], filter: ReportFilter, now: DateTime<Utc>, offset: FixedOffset) -> SalesReport {
    let (start, end) = filter.range.bounds(now, offset);

    let selected: Vec<&Sale> = sales
        .iter()
        .filter(|s| s.created_at >= start && s.created_at <= end)
        .filter(|s| filter.payment.matches(s.payment_method))
        .collect();

    let sale_count = selected.len() as i64;
    let total_cents: i64 = selected.iter().map(|s| s.total_cents).sum();
    let average_ticket_cents = if sale_count == 0 {
        0
    } else {
        (total_cents + sale_count / 2) / sale_count
    };

    let payment_breakdown = PaymentMethod::ALL
        .into_iter()
        .map(|method| {
            let of_method = selected.iter().filter(|s| s.payment_method == method);
            PaymentBreakdown {
                method,
                label: method.label().to_string(),
                count: of_method.clone().count() as i64,
                amount_cents: of_method.map(|s| s.total_cents).sum(),
            }
        })
        .collect();

    let mut ranking: Vec<TopProduct> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();
    for item in selected.iter().flat_map(|s| s.items.iter()) {
        let index = *position.entry(item.product_name.as_str()).or_insert_with(|| {
            ranking.push(TopProduct {
                name: item.product_name.clone(),
                quantity: 0,
                revenue_cents: 0,
            });
            ranking.len() - 1
        });
        ranking[index].quantity += item.quantity;
        ranking[index].revenue_cents += item.total_price_cents;
    }
    // sort_by is stable: ties keep first-seen order
    ranking.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents));
    ranking.truncate(TOP_PRODUCTS_LIMIT);

    SalesReport {
        filter,
        start,
        end,
        sale_count,
        total_cents,
        average_ticket_cents,
        payment_breakdown,
        top_products: ranking,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
