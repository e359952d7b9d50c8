//! Single-customer pages: journals for a period, the full history, and
//! attachment uploads.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Multipart, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, UserId,
    alert::Alert,
    amount::{forced_negative, forced_positive},
    attachment::{Attachable, AttachmentInfo, list_attachments, save_attachment},
    customer::{Customer, CustomerId, find_customer, first_use_date, get_customer_note},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_amount,
    },
    journal::{JournalQuery, JournalRow, TransactionType, collect_journals},
    navigation::NavBar,
    pagination::PaginationConfig,
    timezone::get_local_offset,
    user::get_user_by_id,
};

/// The state needed for the customer show pages and attachment uploads.
#[derive(Debug, Clone)]
pub struct ShowCustomerPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub pagination_config: PaginationConfig,
    pub upload_directory: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ShowCustomerPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
            upload_directory: state.upload_directory.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters accepted by the customer show page.
#[derive(Debug, Deserialize)]
pub struct ShowPageQuery {
    /// The start of the date range (inclusive). Defaults to the start of the
    /// current month.
    pub start: Option<Date>,
    /// The end of the date range (inclusive). Defaults to the end of the
    /// current month.
    pub end: Option<Date>,
    /// The page of journals to show, starting from 1.
    pub page: Option<u64>,
}

/// The first and last day of the month `today` falls in.
fn month_bounds(today: Date) -> (Date, Date) {
    let start = today.replace_day(1).expect("day 1 is valid in every month");
    let last_day = today.month().length(today.year());
    let end = today
        .replace_day(last_day)
        .expect("month length is a valid day");

    (start, end)
}

fn today_in(local_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(local_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

/// Render a customer with the journals it is tagged on within a date range.
///
/// The range defaults to the current month in the server's local timezone.
pub async fn get_customer_page(
    Path(customer_id): Path<CustomerId>,
    State(state): State<ShowCustomerPageState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<ShowPageQuery>,
) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;
    let (month_start, month_end) = month_bounds(today);
    let start = query.start.unwrap_or(month_start);
    let end = query.end.unwrap_or(month_end);

    render_customer_page(&state, user_id, customer_id, start, end, query.page)
}

/// Render a customer with its full journal history, from its first use date
/// until today.
pub async fn get_customer_all_page(
    Path(customer_id): Path<CustomerId>,
    State(state): State<ShowCustomerPageState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<ShowPageQuery>,
) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;

    let start = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        first_use_date(customer_id, &connection)?.unwrap_or(today)
    };

    render_customer_page(&state, user_id, customer_id, start, today, query.page)
}

fn render_customer_page(
    state: &ShowCustomerPageState,
    user_id: UserId,
    customer_id: CustomerId,
    start: Date,
    end: Date,
    page: Option<u64>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let customer = find_customer(user_id, customer_id, &connection)?.ok_or(Error::NotFound)?;

    let notes = get_customer_note(customer.id, &connection)?;
    let oldest = first_use_date(customer.id, &connection)?;
    let attachments = list_attachments(
        Attachable::Customer,
        customer.id,
        &state.upload_directory,
        &connection,
    )?;

    let journal_query = JournalQuery {
        date_range: Some(start..=end),
        customer_ids: vec![customer.id],
        page,
        limit: Some(state.pagination_config.default_page_size),
        ..JournalQuery::new(user_id)
    };
    let journals = collect_journals(&journal_query, &connection)?;

    Ok(customer_view(
        &customer,
        notes.as_deref(),
        oldest,
        &attachments,
        &journals,
        start,
        end,
    )
    .into_response())
}

/// Handle attachment uploads for a customer.
///
/// Demo accounts cannot upload files; the upload is skipped with an
/// informational message instead of an error.
pub async fn upload_customer_attachment(
    Path(customer_id): Path<CustomerId>,
    State(state): State<ShowCustomerPageState>,
    Extension(user_id): Extension<UserId>,
    mut multipart: Multipart,
) -> Response {
    // Read the whole upload before taking the database lock, which must not
    // be held across an await point.
    let mut files: Vec<(String, axum::body::Bytes)> = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(error) => {
                return Error::MultipartError(error.to_string()).into_alert_response();
            }
        };

        let filename = match field.file_name() {
            Some(filename) => filename.to_owned(),
            None => continue,
        };

        match field.bytes().await {
            Ok(contents) => files.push((filename, contents)),
            Err(error) => {
                return Error::MultipartError(error.to_string()).into_alert_response();
            }
        }
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let customer = match find_customer(user_id, customer_id, &connection) {
        Ok(Some(customer)) => customer,
        Ok(None) => return Error::NotFound.into_response(),
        Err(error) => return error.into_alert_response(),
    };

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("Could not load user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    if user.is_demo {
        return Alert::Info {
            message: "Demo accounts cannot upload attachments, so the file was not saved."
                .to_owned(),
        }
        .into_response();
    }

    let mut saved = 0;

    for (filename, contents) in &files {
        match save_attachment(
            user_id,
            Attachable::Customer,
            customer.id,
            filename,
            contents,
            &state.upload_directory,
            &connection,
        ) {
            Ok(_) => saved += 1,
            Err(error) => {
                tracing::error!("Could not save attachment \"{filename}\": {error}");
                return error.into_alert_response();
            }
        }
    }

    Alert::SuccessSimple {
        message: format!("Uploaded {saved} attachment(s)"),
    }
    .into_response()
}

fn journal_amount(journal: &JournalRow) -> String {
    let amount = match journal.transaction_type {
        TransactionType::Withdrawal => forced_negative(journal.amount),
        TransactionType::Deposit | TransactionType::Transfer => forced_positive(journal.amount),
    };

    format_amount(
        &amount,
        journal.currency.decimal_places,
        &journal.currency.symbol,
    )
}

fn customer_view(
    customer: &Customer,
    notes: Option<&str>,
    oldest: Option<Date>,
    attachments: &[AttachmentInfo],
    journals: &[JournalRow],
    start: Date,
    end: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CUSTOMERS_VIEW).into_html();
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_CUSTOMER_VIEW, customer.id);
    let all_url = endpoints::format_endpoint(endpoints::CUSTOMER_ALL_VIEW, customer.id);

    let journal_row = |journal: &JournalRow| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (journal.date) }
                td class=(TABLE_CELL_STYLE) { (journal.description) }
                td class=(TABLE_CELL_STYLE) { (journal_amount(journal)) }
                td class=(TABLE_CELL_STYLE)
                {
                    (journal.source_account_name) " → " (journal.destination_account_name)
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { (customer.name) }

                    div class="flex gap-4"
                    {
                        a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                        a href=(all_url) class=(LINK_STYLE) { "Show all" }
                    }
                }

                p class="text-gray-500 dark:text-gray-400"
                {
                    "Journals from " (start) " to " (end) "."

                    @if let Some(oldest) = oldest {
                        " First used on " (oldest) "."
                    }
                }

                @if let Some(notes) = notes {
                    p { (notes) }
                }

                @if !attachments.is_empty() {
                    section
                    {
                        h2 class="text-lg font-semibold" { "Attachments" }

                        ul class="list-disc list-inside"
                        {
                            @for attachment in attachments {
                                li
                                {
                                    (attachment.filename)

                                    @if !attachment.file_exists {
                                        " (file missing)"
                                    }

                                    @if !attachment.notes.is_empty() {
                                        ": " (attachment.notes)
                                    }
                                }
                            }
                        }
                    }
                }

                table class="w-full text-sm text-left rtl:text-right
                    text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Accounts" }
                        }
                    }

                    tbody
                    {
                        @if journals.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) colspan="4"
                                {
                                    "No journals in this period."
                                }
                            }
                        }

                        @for journal in journals {
                            (journal_row(journal))
                        }
                    }
                }
            }
        }
    );

    base(customer.name.as_ref(), &[], &content)
}
