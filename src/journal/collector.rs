//! Flattens transaction journals into rows for reports and show pages.

use std::{ops::RangeInclusive, str::FromStr};

use rusqlite::{Connection, ToSql, params_from_iter};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error, UserId,
    database_id::DatabaseId,
    journal::{Currency, JournalRow, TransactionType},
};

/// Defines which journals [collect_journals] should fetch.
///
/// All filters are combined with AND. Empty lists mean "no filter".
#[derive(Debug, Clone)]
pub struct JournalQuery {
    /// The user whose journals to fetch.
    pub user_id: UserId,
    /// Include journals within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Include only journals with one of these types.
    pub transaction_types: Vec<TransactionType>,
    /// Include only journals that touch one of these accounts.
    pub account_ids: Vec<DatabaseId>,
    /// Include only journals tagged with one of these customers.
    pub customer_ids: Vec<DatabaseId>,
    /// Include only journals with no customer tagged on them.
    pub without_customer: bool,
    /// Include only journals whose source account is one of these.
    pub source_account_ids: Vec<DatabaseId>,
    /// Include only journals whose destination account is one of these.
    pub destination_account_ids: Vec<DatabaseId>,
    /// Exclude journals whose source account is one of these.
    pub exclude_source_account_ids: Vec<DatabaseId>,
    /// Exclude journals whose destination account is one of these.
    pub exclude_destination_account_ids: Vec<DatabaseId>,
    /// The page to fetch, starting from 1. Only applied when `limit` is set.
    pub page: Option<u64>,
    /// The maximum number of rows to return.
    pub limit: Option<u64>,
}

impl JournalQuery {
    /// Create a query for all of a user's journals.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            date_range: None,
            transaction_types: Vec::new(),
            account_ids: Vec::new(),
            customer_ids: Vec::new(),
            without_customer: false,
            source_account_ids: Vec::new(),
            destination_account_ids: Vec::new(),
            exclude_source_account_ids: Vec::new(),
            exclude_destination_account_ids: Vec::new(),
            page: None,
            limit: None,
        }
    }
}

/// A row straight out of SQLite, before the amount and transaction type have
/// been parsed.
struct RawJournalRow {
    journal_id: DatabaseId,
    transaction_type: String,
    date: Date,
    description: String,
    transaction_group_id: DatabaseId,
    currency_id: DatabaseId,
    currency_code: String,
    currency_name: String,
    currency_symbol: String,
    currency_decimal_places: u32,
    amount: String,
    source_account_id: DatabaseId,
    source_account_name: String,
    destination_account_id: DatabaseId,
    destination_account_name: String,
    customer_id: DatabaseId,
    customer_name: String,
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Fetch the journals selected by `query`, flattened into one row per
/// journal (per tagged customer, in the rare case a journal has several).
///
/// Each row joins the journal with its currency, its source and destination
/// legs and the customer tagged on it, if any. The amount is the destination
/// leg, i.e. positive; report code normalizes the sign per transaction type.
///
/// # Errors
///
/// Returns an error if the query fails, or if an amount or transaction type
/// column holds a value that cannot be parsed.
pub fn collect_journals(
    query: &JournalQuery,
    connection: &Connection,
) -> Result<Vec<JournalRow>, Error> {
    let mut sql = String::from(
        "SELECT
            j.id, j.transaction_type, j.date, j.description, j.transaction_group_id,
            c.id, c.code, c.name, c.symbol, c.decimal_places,
            dest.amount,
            src.account_id, src_account.name,
            dest.account_id, dest_account.name,
            COALESCE(cust.id, 0), COALESCE(cust.name, '')
        FROM transaction_journal j
        INNER JOIN currency c ON c.id = j.currency_id
        INNER JOIN \"transaction\" dest
            ON dest.transaction_journal_id = j.id AND CAST(dest.amount AS REAL) > 0
        INNER JOIN \"transaction\" src
            ON src.transaction_journal_id = j.id AND CAST(src.amount AS REAL) < 0
        INNER JOIN account src_account ON src_account.id = src.account_id
        INNER JOIN account dest_account ON dest_account.id = dest.account_id
        LEFT JOIN customer_transaction_journal ctj ON ctj.transaction_journal_id = j.id
        LEFT JOIN customer cust ON cust.id = ctj.customer_id AND cust.deleted_at IS NULL
        WHERE j.user_id = ?",
    );
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(query.user_id.as_i64())];

    if let Some(date_range) = &query.date_range {
        sql.push_str(" AND j.date >= ? AND j.date <= ?");
        params.push(Box::new(*date_range.start()));
        params.push(Box::new(*date_range.end()));
    }

    if !query.transaction_types.is_empty() {
        sql.push_str(&format!(
            " AND j.transaction_type IN ({})",
            placeholders(query.transaction_types.len())
        ));
        for transaction_type in &query.transaction_types {
            params.push(Box::new(transaction_type.as_str()));
        }
    }

    if !query.account_ids.is_empty() {
        let list = placeholders(query.account_ids.len());
        sql.push_str(&format!(
            " AND (src.account_id IN ({list}) OR dest.account_id IN ({list}))"
        ));
        for _ in 0..2 {
            for account_id in &query.account_ids {
                params.push(Box::new(*account_id));
            }
        }
    }

    if !query.customer_ids.is_empty() {
        sql.push_str(&format!(
            " AND cust.id IN ({})",
            placeholders(query.customer_ids.len())
        ));
        for customer_id in &query.customer_ids {
            params.push(Box::new(*customer_id));
        }
    }

    if query.without_customer {
        sql.push_str(" AND ctj.customer_id IS NULL");
    }

    if !query.source_account_ids.is_empty() {
        sql.push_str(&format!(
            " AND src.account_id IN ({})",
            placeholders(query.source_account_ids.len())
        ));
        for account_id in &query.source_account_ids {
            params.push(Box::new(*account_id));
        }
    }

    if !query.destination_account_ids.is_empty() {
        sql.push_str(&format!(
            " AND dest.account_id IN ({})",
            placeholders(query.destination_account_ids.len())
        ));
        for account_id in &query.destination_account_ids {
            params.push(Box::new(*account_id));
        }
    }

    if !query.exclude_source_account_ids.is_empty() {
        sql.push_str(&format!(
            " AND src.account_id NOT IN ({})",
            placeholders(query.exclude_source_account_ids.len())
        ));
        for account_id in &query.exclude_source_account_ids {
            params.push(Box::new(*account_id));
        }
    }

    if !query.exclude_destination_account_ids.is_empty() {
        sql.push_str(&format!(
            " AND dest.account_id NOT IN ({})",
            placeholders(query.exclude_destination_account_ids.len())
        ));
        for account_id in &query.exclude_destination_account_ids {
            params.push(Box::new(*account_id));
        }
    }

    sql.push_str(" ORDER BY j.date DESC, j.id DESC");

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ? OFFSET ?");
        let page = query.page.unwrap_or(1).max(1);
        params.push(Box::new(limit as i64));
        params.push(Box::new(((page - 1) * limit) as i64));
    }

    let raw_rows: Vec<RawJournalRow> = connection
        .prepare(&sql)?
        .query_map(params_from_iter(params.iter().map(|p| p.as_ref())), |row| {
            Ok(RawJournalRow {
                journal_id: row.get(0)?,
                transaction_type: row.get(1)?,
                date: row.get(2)?,
                description: row.get(3)?,
                transaction_group_id: row.get(4)?,
                currency_id: row.get(5)?,
                currency_code: row.get(6)?,
                currency_name: row.get(7)?,
                currency_symbol: row.get(8)?,
                currency_decimal_places: row.get(9)?,
                amount: row.get(10)?,
                source_account_id: row.get(11)?,
                source_account_name: row.get(12)?,
                destination_account_id: row.get(13)?,
                destination_account_name: row.get(14)?,
                customer_id: row.get(15)?,
                customer_name: row.get(16)?,
            })
        })?
        .collect::<Result<_, _>>()?;

    raw_rows.into_iter().map(parse_raw_row).collect()
}

fn parse_raw_row(raw: RawJournalRow) -> Result<JournalRow, Error> {
    let transaction_type = TransactionType::from_str(&raw.transaction_type)?;
    let amount =
        Decimal::from_str(&raw.amount).map_err(|_| Error::InvalidAmount(raw.amount.clone()))?;

    Ok(JournalRow {
        journal_id: raw.journal_id,
        transaction_type,
        date: raw.date,
        description: raw.description,
        transaction_group_id: raw.transaction_group_id,
        currency: Currency {
            id: raw.currency_id,
            code: raw.currency_code,
            name: raw.currency_name,
            symbol: raw.currency_symbol,
            decimal_places: raw.currency_decimal_places,
        },
        amount,
        source_account_id: raw.source_account_id,
        source_account_name: raw.source_account_name,
        destination_account_id: raw.destination_account_id,
        destination_account_name: raw.destination_account_name,
        customer_id: raw.customer_id,
        customer_name: raw.customer_name,
    })
}

#[cfg(test)]
mod collect_journals_tests {
    use std::str::FromStr;

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        PasswordHash, UserId,
        customer::{find_or_create_customer, link_customer_to_journal},
        database_id::DatabaseId,
        db::initialize,
        journal::{
            TransactionType, create_account, create_currency, create_transaction_journal,
        },
        user::create_user,
    };

    use super::{JournalQuery, collect_journals};

    struct Fixture {
        connection: Connection,
        user_id: UserId,
        checking: DatabaseId,
        savings: DatabaseId,
        shop: DatabaseId,
        acme_id: DatabaseId,
    }

    fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let user = create_user(
            "foo@bar.baz",
            PasswordHash::new_unchecked("hash"),
            false,
            &connection,
        )
        .unwrap();
        let currency = create_currency("TND", "Tunisian Dinar", "DT", 3, &connection).unwrap();
        let checking = create_account(user.id, "Checking", &connection).unwrap();
        let savings = create_account(user.id, "Savings", &connection).unwrap();
        let shop = create_account(user.id, "Corner Shop", &connection).unwrap();

        let acme = find_or_create_customer(user.id, None, "Acme", &connection)
            .unwrap()
            .unwrap();

        // A tagged withdrawal, an untagged withdrawal and a deposit.
        let tagged = create_transaction_journal(
            user.id,
            currency.id,
            TransactionType::Withdrawal,
            "Paper clips",
            date!(2024 - 03 - 05),
            1,
            checking,
            shop,
            &Decimal::from_str("10.001").unwrap(),
            &connection,
        )
        .unwrap();
        link_customer_to_journal(acme.id, tagged, &connection).unwrap();

        create_transaction_journal(
            user.id,
            currency.id,
            TransactionType::Withdrawal,
            "Groceries",
            date!(2024 - 03 - 10),
            2,
            checking,
            shop,
            &Decimal::from_str("20.5").unwrap(),
            &connection,
        )
        .unwrap();

        create_transaction_journal(
            user.id,
            currency.id,
            TransactionType::Deposit,
            "Salary",
            date!(2024 - 03 - 25),
            3,
            shop,
            checking,
            &Decimal::from_str("1000").unwrap(),
            &connection,
        )
        .unwrap();

        Fixture {
            connection,
            user_id: user.id,
            checking,
            savings,
            shop,
            acme_id: acme.id,
        }
    }

    #[test]
    fn fetches_all_journals_for_user() {
        let fixture = get_fixture();

        let rows = collect_journals(&JournalQuery::new(fixture.user_id), &fixture.connection)
            .unwrap();

        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn filters_by_type() {
        let fixture = get_fixture();
        let query = JournalQuery {
            transaction_types: vec![TransactionType::Deposit],
            ..JournalQuery::new(fixture.user_id)
        };

        let rows = collect_journals(&query, &fixture.connection).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Salary");
        assert_eq!(rows[0].amount, Decimal::from_str("1000").unwrap());
        assert_eq!(rows[0].source_account_id, fixture.shop);
        assert_eq!(rows[0].destination_account_id, fixture.checking);
    }

    #[test]
    fn filters_by_date_range() {
        let fixture = get_fixture();
        let query = JournalQuery {
            date_range: Some(date!(2024 - 03 - 01)..=date!(2024 - 03 - 07)),
            ..JournalQuery::new(fixture.user_id)
        };

        let rows = collect_journals(&query, &fixture.connection).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Paper clips");
    }

    #[test]
    fn filters_by_customer() {
        let fixture = get_fixture();
        let query = JournalQuery {
            customer_ids: vec![fixture.acme_id],
            ..JournalQuery::new(fixture.user_id)
        };

        let rows = collect_journals(&query, &fixture.connection).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_id, fixture.acme_id);
        assert_eq!(rows[0].customer_name, "Acme");
        assert_eq!(rows[0].amount, Decimal::from_str("10.001").unwrap());
    }

    #[test]
    fn without_customer_excludes_tagged_journals() {
        let fixture = get_fixture();
        let query = JournalQuery {
            without_customer: true,
            ..JournalQuery::new(fixture.user_id)
        };

        let rows = collect_journals(&query, &fixture.connection).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.customer_id == 0));
    }

    #[test]
    fn filters_by_account() {
        let fixture = get_fixture();
        let query = JournalQuery {
            account_ids: vec![fixture.savings],
            ..JournalQuery::new(fixture.user_id)
        };

        let rows = collect_journals(&query, &fixture.connection).unwrap();

        assert!(rows.is_empty());
    }

    #[test]
    fn other_users_journals_are_not_returned() {
        let fixture = get_fixture();
        let other_user_id = UserId::new(fixture.user_id.as_i64() + 1);

        let rows = collect_journals(&JournalQuery::new(other_user_id), &fixture.connection)
            .unwrap();

        assert!(rows.is_empty());
    }

    #[test]
    fn pagination_limits_rows() {
        let fixture = get_fixture();
        let query = JournalQuery {
            limit: Some(2),
            page: Some(2),
            ..JournalQuery::new(fixture.user_id)
        };

        let rows = collect_journals(&query, &fixture.connection).unwrap();

        // 3 journals, page size 2: the second page has the single oldest row.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Paper clips");
    }
}
