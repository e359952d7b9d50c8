//! Customers listing page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, UserId,
    customer::{Customer, last_use_date},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, PaginationIndicator, create_pagination_indicators},
};

use super::get_customers;

/// The state needed for the customers listing page.
#[derive(Debug, Clone)]
pub struct CustomersPageState {
    pub pagination_config: PaginationConfig,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CustomersPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            pagination_config: state.pagination_config.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters accepted by the customers page.
#[derive(Debug, Deserialize)]
pub struct CustomersPageQuery {
    /// The page number, starting from 1.
    pub page: Option<u64>,
}

/// A customer annotated with the date it last appeared on a journal.
#[derive(Debug, Clone)]
struct CustomerListRow {
    customer: Customer,
    last_activity: Option<Date>,
    show_url: String,
    edit_url: String,
}

/// Render the customers listing page.
///
/// All of the user's customers are loaded and paginated in memory; each row
/// on the current page is annotated with its last-activity date.
pub async fn get_customers_page(
    State(state): State<CustomersPageState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<CustomersPageQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let customers = get_customers(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve customers: {error}"))?;

    let page_size = state.pagination_config.default_page_size.max(1);
    let page_count = (customers.len() as u64).div_ceil(page_size).max(1);
    let curr_page = query
        .page
        .unwrap_or(state.pagination_config.default_page)
        .clamp(1, page_count);

    let start = ((curr_page - 1) * page_size) as usize;
    let rows = customers
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .map(|customer| {
            let last_activity = last_use_date(customer.id, &[], &connection)?;

            Ok(CustomerListRow {
                show_url: endpoints::format_endpoint(endpoints::CUSTOMER_VIEW, customer.id),
                edit_url: endpoints::format_endpoint(endpoints::EDIT_CUSTOMER_VIEW, customer.id),
                customer,
                last_activity,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let indicators =
        create_pagination_indicators(curr_page, page_count, state.pagination_config.max_pages);

    Ok(customers_view(&rows, &indicators).into_response())
}

fn customers_view(rows: &[CustomerListRow], indicators: &[PaginationIndicator]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CUSTOMERS_VIEW).into_html();

    let table_row = |row: &CustomerListRow| {
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_CUSTOMER, row.customer.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? This will remove it from every transaction.",
            row.customer.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    a href=(row.show_url) class=(LINK_STYLE) { (row.customer.name) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @match row.last_activity {
                        Some(date) => { (date) }
                        None => { "never" }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Customers" }

                    a href=(endpoints::NEW_CUSTOMER_VIEW) class=(LINK_STYLE)
                    {
                        "Create Customer"
                    }
                }

                section class="dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Last activity" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @if rows.is_empty() {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) colspan="3"
                                    {
                                        "No customers yet."
                                    }
                                }
                            }

                            @for row in rows {
                                (table_row(row))
                            }
                        }
                    }
                }

                (pagination_view(indicators))
            }
        }
    );

    base("Customers", &[], &content)
}

fn pagination_view(indicators: &[PaginationIndicator]) -> Markup {
    let page_url = |page: u64| format!("{}?page={page}", endpoints::CUSTOMERS_VIEW);

    html!(
        nav class="flex justify-center gap-2"
        {
            @for indicator in indicators {
                @match indicator {
                    PaginationIndicator::BackButton(page) => {
                        a href=(page_url(*page)) class=(LINK_STYLE) { "Back" }
                    }
                    PaginationIndicator::Page(page) => {
                        a href=(page_url(*page)) class=(LINK_STYLE) { (page) }
                    }
                    PaginationIndicator::CurrPage(page) => {
                        span class="font-bold" { (page) }
                    }
                    PaginationIndicator::Ellipsis => { span { "..." } }
                    PaginationIndicator::NextButton(page) => {
                        a href=(page_url(*page)) class=(LINK_STYLE) { "Next" }
                    }
                }
            }
        }
    )
}
