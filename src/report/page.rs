//! The report page: income and expenses per currency and per customer.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, UserId,
    endpoints,
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_amount,
    },
    navigation::NavBar,
    report::{
        CurrencyListings, CurrencySums, NO_CUSTOMER_NAME, list_expenses, list_income,
        no_customer_sum_expenses, no_customer_sum_income, sum_expenses, sum_income,
    },
    timezone::get_local_offset,
};

/// The state needed for the report page.
#[derive(Debug, Clone)]
pub struct ReportPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters accepted by the report page.
#[derive(Debug, Deserialize)]
pub struct ReportPageQuery {
    /// The start of the date range (inclusive). Defaults to the start of the
    /// current month.
    pub start: Option<Date>,
    /// The end of the date range (inclusive). Defaults to the end of the
    /// current month.
    pub end: Option<Date>,
}

/// Render the report page for a period.
///
/// Shows per-currency income and expense totals, the totals for journals
/// without a customer, and a per-customer breakdown.
pub async fn get_report_page(
    State(state): State<ReportPageState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<ReportPageQuery>,
) -> Result<Response, Error> {
    let offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = OffsetDateTime::now_utc().to_offset(offset).date();

    let month_start = today.replace_day(1).expect("day 1 is valid in every month");
    let month_end = today
        .replace_day(today.month().length(today.year()))
        .expect("month length is a valid day");

    let start = query.start.unwrap_or(month_start);
    let end = query.end.unwrap_or(month_end);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let income_sums = sum_income(user_id, start, end, &[], &[], &connection)?;
    let expense_sums = sum_expenses(user_id, start, end, &[], &[], &connection)?;
    let untagged_income = no_customer_sum_income(user_id, start, end, &[], &connection)?;
    let untagged_expenses = no_customer_sum_expenses(user_id, start, end, &[], &connection)?;
    let income_listings = list_income(user_id, start, end, &[], &[], &connection)?;
    let expense_listings = list_expenses(user_id, start, end, &[], &[], &connection)?;

    Ok(report_view(
        start,
        end,
        &income_sums,
        &expense_sums,
        &untagged_income,
        &untagged_expenses,
        &income_listings,
        &expense_listings,
    )
    .into_response())
}

fn sums_table(title: &str, sums: &CurrencySums) -> Markup {
    let mut rows: Vec<_> = sums.values().collect();
    rows.sort_by(|a, b| a.currency_code.cmp(&b.currency_code));

    html!(
        section class="space-y-2"
        {
            h2 class="text-lg font-semibold" { (title) }

            @if rows.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "Nothing in this period." }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Currency" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                        }
                    }

                    tbody
                    {
                        @for sum in rows {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (sum.currency_name) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    (format_amount(
                                        &sum.sum,
                                        sum.currency_decimal_places,
                                        &sum.currency_symbol,
                                    ))
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn breakdown_table(title: &str, listings: &CurrencyListings) -> Markup {
    struct BreakdownRow {
        customer_name: String,
        customer_url: Option<String>,
        total: String,
    }

    let mut currencies: Vec<_> = listings.values().collect();
    currencies.sort_by(|a, b| a.currency_code.cmp(&b.currency_code));

    let rows_for = |listing: &crate::report::CurrencyListing| -> Vec<BreakdownRow> {
        let mut rows: Vec<BreakdownRow> = listing
            .customers
            .values()
            .map(|customer| {
                let total: Decimal = customer
                    .transaction_journals
                    .values()
                    .map(|detail| detail.amount)
                    .sum();

                BreakdownRow {
                    customer_name: if customer.id == 0 {
                        NO_CUSTOMER_NAME.to_string()
                    } else {
                        customer.name.clone()
                    },
                    customer_url: (customer.id != 0).then(|| {
                        endpoints::format_endpoint(endpoints::CUSTOMER_VIEW, customer.id)
                    }),
                    total: format_amount(
                        &total,
                        listing.currency_decimal_places,
                        &listing.currency_symbol,
                    ),
                }
            })
            .collect();
        rows.sort_by(|a, b| a.customer_name.cmp(&b.customer_name));

        rows
    };

    html!(
        section class="space-y-2"
        {
            h2 class="text-lg font-semibold" { (title) }

            @if currencies.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "Nothing in this period." }
            }

            @for listing in currencies {
                h3 class="font-medium" { (listing.currency_name) }

                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Customer" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                        }
                    }

                    tbody
                    {
                        @for row in rows_for(listing) {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    @match &row.customer_url {
                                        Some(url) => {
                                            a href=(url) class="underline" { (row.customer_name) }
                                        }
                                        None => { (row.customer_name) }
                                    }
                                }
                                td class=(TABLE_CELL_STYLE) { (row.total) }
                            }
                        }
                    }
                }
            }
        }
    )
}

#[allow(clippy::too_many_arguments)]
fn report_view(
    start: Date,
    end: Date,
    income_sums: &CurrencySums,
    expense_sums: &CurrencySums,
    untagged_income: &CurrencySums,
    untagged_expenses: &CurrencySums,
    income_listings: &CurrencyListings,
    expense_listings: &CurrencyListings,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORT_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-8 lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                header
                {
                    h1 class="text-xl font-bold" { "Customer Report" }

                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "From " (start) " to " (end) "."
                    }
                }

                (sums_table("Income", income_sums))
                (sums_table("Expenses", expense_sums))
                (sums_table("Income without a customer", untagged_income))
                (sums_table("Expenses without a customer", untagged_expenses))
                (breakdown_table("Income by customer", income_listings))
                (breakdown_table("Expenses by customer", expense_listings))
            }
        }
    );

    base("Report", &[], &content)
}
