//! Per-customer sums and listings of expenses, income and transfers.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error, UserId,
    amount::{forced_negative, forced_positive},
    customer::{CustomerId, get_customers},
    database_id::DatabaseId,
    journal::{JournalQuery, JournalRow, TransactionType, collect_journals},
    report::{
        CurrencyListing, CurrencyListings, CurrencySum, CurrencySums, CustomerJournals,
        JournalDetail, NO_CUSTOMER_NAME,
    },
};

/// Resolve the customer filter: when the caller does not name any customers,
/// fall back to all of the user's customers.
fn customer_filter(
    user_id: UserId,
    customers: &[CustomerId],
    connection: &Connection,
) -> Result<Vec<CustomerId>, Error> {
    if !customers.is_empty() {
        return Ok(customers.to_vec());
    }

    Ok(get_customers(user_id, connection)?
        .into_iter()
        .map(|customer| customer.id)
        .collect())
}

fn base_query(
    user_id: UserId,
    start: Date,
    end: Date,
    transaction_type: TransactionType,
    accounts: &[DatabaseId],
    customers: Vec<CustomerId>,
) -> JournalQuery {
    JournalQuery {
        date_range: Some(start..=end),
        transaction_types: vec![transaction_type],
        account_ids: accounts.to_vec(),
        customer_ids: customers,
        ..JournalQuery::new(user_id)
    }
}

fn sum_journals(
    journals: &[JournalRow],
    normalize: impl Fn(rust_decimal::Decimal) -> rust_decimal::Decimal,
) -> CurrencySums {
    let mut sums = CurrencySums::new();

    for journal in journals {
        let entry = sums
            .entry(journal.currency.id)
            .or_insert_with(|| CurrencySum::new(journal));
        entry.sum += normalize(journal.amount);
    }

    sums
}

/// Sum of withdrawal journals in the period for a set of customers, grouped
/// per currency. Amounts are always negative.
///
/// When `customers` is empty, all of the user's customers are counted.
pub fn sum_expenses(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    customers: &[CustomerId],
    connection: &Connection,
) -> Result<CurrencySums, Error> {
    let customers = customer_filter(user_id, customers, connection)?;
    let query = base_query(
        user_id,
        start,
        end,
        TransactionType::Withdrawal,
        accounts,
        customers,
    );
    let journals = collect_journals(&query, connection)?;

    Ok(sum_journals(&journals, forced_negative))
}

/// Sum of deposit journals in the period for a set of customers, grouped per
/// currency. Amounts are always positive.
///
/// When `customers` is empty, all of the user's customers are counted.
pub fn sum_income(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    customers: &[CustomerId],
    connection: &Connection,
) -> Result<CurrencySums, Error> {
    let customers = customer_filter(user_id, customers, connection)?;
    let query = base_query(
        user_id,
        start,
        end,
        TransactionType::Deposit,
        accounts,
        customers,
    );
    let journals = collect_journals(&query, connection)?;

    Ok(sum_journals(&journals, forced_positive))
}

/// Sum of transfer journals in the period for a set of customers, grouped per
/// currency. Amounts are always positive.
///
/// When `customers` is empty, all of the user's customers are counted.
pub fn sum_transfers(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    customers: &[CustomerId],
    connection: &Connection,
) -> Result<CurrencySums, Error> {
    let customers = customer_filter(user_id, customers, connection)?;
    let query = base_query(
        user_id,
        start,
        end,
        TransactionType::Transfer,
        accounts,
        customers,
    );
    let journals = collect_journals(&query, connection)?;

    Ok(sum_journals(&journals, forced_positive))
}

/// List the withdrawal journals in the period, grouped per currency and then
/// per customer. Amounts are always negative.
///
/// Journals without a customer are dropped from the listing.
pub fn list_expenses(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    customers: &[CustomerId],
    connection: &Connection,
) -> Result<CurrencyListings, Error> {
    let customers = customer_filter(user_id, customers, connection)?;
    let query = base_query(
        user_id,
        start,
        end,
        TransactionType::Withdrawal,
        accounts,
        customers,
    );
    let journals = collect_journals(&query, connection)?;

    let mut listings = CurrencyListings::new();

    for journal in &journals {
        // catch "no customer" entries.
        if journal.customer_id == 0 {
            continue;
        }

        add_journal_to_listing(
            &mut listings,
            journal,
            &journal.customer_name,
            forced_negative(journal.amount),
        );
    }

    Ok(listings)
}

/// List the deposit journals in the period, grouped per currency and then per
/// customer. Amounts are always positive.
///
/// Unlike [list_expenses], journals without a customer are kept and listed
/// under ID 0 with a placeholder name. The expense and transfer listings drop
/// that bucket instead; income keeps it visible.
pub fn list_income(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    customers: &[CustomerId],
    connection: &Connection,
) -> Result<CurrencyListings, Error> {
    let customers = customer_filter(user_id, customers, connection)?;
    let query = base_query(
        user_id,
        start,
        end,
        TransactionType::Deposit,
        accounts,
        customers,
    );
    let journals = collect_journals(&query, connection)?;

    let mut listings = CurrencyListings::new();

    for journal in &journals {
        // catch "no customer" entries.
        let customer_name = if journal.customer_id == 0 {
            NO_CUSTOMER_NAME
        } else {
            &journal.customer_name
        };

        add_journal_to_listing(
            &mut listings,
            journal,
            customer_name,
            forced_positive(journal.amount),
        );
    }

    Ok(listings)
}

/// List the transfer journals into `accounts` (and not out of them) in the
/// period, grouped per currency and then per customer. Amounts are always
/// positive.
pub fn list_transferred_in(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    customers: &[CustomerId],
    connection: &Connection,
) -> Result<CurrencyListings, Error> {
    let customers = customer_filter(user_id, customers, connection)?;
    let query = JournalQuery {
        date_range: Some(start..=end),
        transaction_types: vec![TransactionType::Transfer],
        destination_account_ids: accounts.to_vec(),
        exclude_source_account_ids: accounts.to_vec(),
        customer_ids: customers,
        ..JournalQuery::new(user_id)
    };
    let journals = collect_journals(&query, connection)?;

    let mut listings = CurrencyListings::new();

    for journal in &journals {
        // catch "no customer" entries.
        if journal.customer_id == 0 {
            continue;
        }

        add_journal_to_listing(
            &mut listings,
            journal,
            &journal.customer_name,
            forced_positive(journal.amount),
        );
    }

    Ok(listings)
}

/// List the transfer journals out of `accounts` (and not into them) in the
/// period, grouped per currency and then per customer. Amounts are always
/// negative.
pub fn list_transferred_out(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    customers: &[CustomerId],
    connection: &Connection,
) -> Result<CurrencyListings, Error> {
    let customers = customer_filter(user_id, customers, connection)?;
    let query = JournalQuery {
        date_range: Some(start..=end),
        transaction_types: vec![TransactionType::Transfer],
        source_account_ids: accounts.to_vec(),
        exclude_destination_account_ids: accounts.to_vec(),
        customer_ids: customers,
        ..JournalQuery::new(user_id)
    };
    let journals = collect_journals(&query, connection)?;

    let mut listings = CurrencyListings::new();

    for journal in &journals {
        // catch "no customer" entries.
        if journal.customer_id == 0 {
            continue;
        }

        add_journal_to_listing(
            &mut listings,
            journal,
            &journal.customer_name,
            forced_negative(journal.amount),
        );
    }

    Ok(listings)
}

fn add_journal_to_listing(
    listings: &mut CurrencyListings,
    journal: &JournalRow,
    customer_name: &str,
    amount: rust_decimal::Decimal,
) {
    let listing = listings
        .entry(journal.currency.id)
        .or_insert_with(|| CurrencyListing::new(journal));

    let customer = listing
        .customers
        .entry(journal.customer_id)
        .or_insert_with(|| CustomerJournals {
            id: journal.customer_id,
            name: customer_name.to_string(),
            transaction_journals: Default::default(),
        });

    customer
        .transaction_journals
        .insert(journal.journal_id, JournalDetail::new(journal, amount));
}

#[cfg(test)]
mod operations_tests {
    use std::str::FromStr;

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        PasswordHash, UserId,
        customer::{find_or_create_customer, link_customer_to_journal},
        database_id::DatabaseId,
        db::initialize,
        journal::{TransactionType, create_account, create_currency, create_transaction_journal},
        user::create_user,
    };

    use super::{
        list_expenses, list_income, list_transferred_in, list_transferred_out, sum_expenses,
        sum_income, sum_transfers,
    };

    struct Fixture {
        connection: Connection,
        user_id: UserId,
        currency_id: DatabaseId,
        checking: DatabaseId,
        savings: DatabaseId,
        shop: DatabaseId,
        acme_id: DatabaseId,
        globex_id: DatabaseId,
    }

    const START: time::Date = date!(2024 - 03 - 01);
    const END: time::Date = date!(2024 - 03 - 31);

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
        // Three decimal places, to exercise exact decimal sums.
        let currency = create_currency("TND", "Tunisian Dinar", "DT", 3, &connection).unwrap();
        let checking = create_account(user.id, "Checking", &connection).unwrap();
        let savings = create_account(user.id, "Savings", &connection).unwrap();
        let shop = create_account(user.id, "Corner Shop", &connection).unwrap();

        let acme = find_or_create_customer(user.id, None, "Acme", &connection)
            .unwrap()
            .unwrap();
        let globex = find_or_create_customer(user.id, None, "Globex", &connection)
            .unwrap()
            .unwrap();

        Fixture {
            connection,
            user_id: user.id,
            currency_id: currency.id,
            checking,
            savings,
            shop,
            acme_id: acme.id,
            globex_id: globex.id,
        }
    }

    fn insert_journal(
        fixture: &Fixture,
        transaction_type: TransactionType,
        amount: &str,
        source: DatabaseId,
        destination: DatabaseId,
        customer_id: Option<DatabaseId>,
    ) -> DatabaseId {
        let journal_id = create_transaction_journal(
            fixture.user_id,
            fixture.currency_id,
            transaction_type,
            "Test journal",
            date!(2024 - 03 - 15),
            1,
            source,
            destination,
            &Decimal::from_str(amount).unwrap(),
            &fixture.connection,
        )
        .unwrap();

        if let Some(customer_id) = customer_id {
            link_customer_to_journal(customer_id, journal_id, &fixture.connection).unwrap();
        }

        journal_id
    }

    #[test]
    fn sum_expenses_is_negative_and_exact() {
        let fixture = get_fixture();
        insert_journal(
            &fixture,
            TransactionType::Withdrawal,
            "10.001",
            fixture.checking,
            fixture.shop,
            Some(fixture.acme_id),
        );
        insert_journal(
            &fixture,
            TransactionType::Withdrawal,
            "20.002",
            fixture.checking,
            fixture.shop,
            Some(fixture.globex_id),
        );

        let sums = sum_expenses(
            fixture.user_id,
            START,
            END,
            &[],
            &[],
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(sums.len(), 1);
        let sum = &sums[&fixture.currency_id];
        assert_eq!(sum.sum, Decimal::from_str("-30.003").unwrap());
        assert_eq!(sum.currency_code, "TND");
        assert_eq!(sum.currency_decimal_places, 3);
    }

    #[test]
    fn sum_income_is_positive_and_exact() {
        let fixture = get_fixture();
        insert_journal(
            &fixture,
            TransactionType::Deposit,
            "0.1",
            fixture.shop,
            fixture.checking,
            Some(fixture.acme_id),
        );
        insert_journal(
            &fixture,
            TransactionType::Deposit,
            "0.2",
            fixture.shop,
            fixture.checking,
            Some(fixture.acme_id),
        );

        let sums = sum_income(
            fixture.user_id,
            START,
            END,
            &[],
            &[],
            &fixture.connection,
        )
        .unwrap();

        // 0.1 + 0.2 is exactly 0.3 in decimal arithmetic.
        assert_eq!(sums[&fixture.currency_id].sum, Decimal::from_str("0.3").unwrap());
    }

    #[test]
    fn sums_without_customer_filter_exclude_untagged_journals() {
        let fixture = get_fixture();
        insert_journal(
            &fixture,
            TransactionType::Withdrawal,
            "10",
            fixture.checking,
            fixture.shop,
            Some(fixture.acme_id),
        );
        insert_journal(
            &fixture,
            TransactionType::Withdrawal,
            "99",
            fixture.checking,
            fixture.shop,
            None,
        );

        let sums = sum_expenses(
            fixture.user_id,
            START,
            END,
            &[],
            &[],
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(
            sums[&fixture.currency_id].sum,
            Decimal::from_str("-10").unwrap()
        );
    }

    #[test]
    fn sum_with_explicit_customer_filter_only_counts_those_customers() {
        let fixture = get_fixture();
        insert_journal(
            &fixture,
            TransactionType::Withdrawal,
            "10",
            fixture.checking,
            fixture.shop,
            Some(fixture.acme_id),
        );
        insert_journal(
            &fixture,
            TransactionType::Withdrawal,
            "20",
            fixture.checking,
            fixture.shop,
            Some(fixture.globex_id),
        );

        let sums = sum_expenses(
            fixture.user_id,
            START,
            END,
            &[],
            &[fixture.acme_id],
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(
            sums[&fixture.currency_id].sum,
            Decimal::from_str("-10").unwrap()
        );
    }

    #[test]
    fn sum_transfers_is_positive() {
        let fixture = get_fixture();
        insert_journal(
            &fixture,
            TransactionType::Transfer,
            "50",
            fixture.checking,
            fixture.savings,
            Some(fixture.acme_id),
        );

        let sums = sum_transfers(
            fixture.user_id,
            START,
            END,
            &[],
            &[],
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(
            sums[&fixture.currency_id].sum,
            Decimal::from_str("50").unwrap()
        );
    }

    #[test]
    fn list_expenses_groups_by_currency_then_customer() {
        let fixture = get_fixture();
        let journal_id = insert_journal(
            &fixture,
            TransactionType::Withdrawal,
            "10.5",
            fixture.checking,
            fixture.shop,
            Some(fixture.acme_id),
        );

        let listings = list_expenses(
            fixture.user_id,
            START,
            END,
            &[],
            &[],
            &fixture.connection,
        )
        .unwrap();

        let listing = &listings[&fixture.currency_id];
        let customer = &listing.customers[&fixture.acme_id];
        assert_eq!(customer.name, "Acme");

        let detail = &customer.transaction_journals[&journal_id];
        // Expense amounts are always negative.
        assert_eq!(detail.amount, Decimal::from_str("-10.5").unwrap());
        assert_eq!(detail.date, date!(2024 - 03 - 15));
        assert_eq!(detail.source_account_id, fixture.checking);
        assert_eq!(detail.destination_account_id, fixture.shop);
    }

    #[test]
    fn list_income_amounts_are_positive() {
        let fixture = get_fixture();
        let journal_id = insert_journal(
            &fixture,
            TransactionType::Deposit,
            "12.345",
            fixture.shop,
            fixture.checking,
            Some(fixture.acme_id),
        );

        let listings = list_income(
            fixture.user_id,
            START,
            END,
            &[],
            &[],
            &fixture.connection,
        )
        .unwrap();

        let detail = &listings[&fixture.currency_id].customers[&fixture.acme_id]
            .transaction_journals[&journal_id];
        assert_eq!(detail.amount, Decimal::from_str("12.345").unwrap());
    }

    #[test]
    fn list_transferred_in_and_out_are_directional() {
        let fixture = get_fixture();
        // Into savings from checking.
        insert_journal(
            &fixture,
            TransactionType::Transfer,
            "100",
            fixture.checking,
            fixture.savings,
            Some(fixture.acme_id),
        );

        let into_savings = list_transferred_in(
            fixture.user_id,
            START,
            END,
            &[fixture.savings],
            &[],
            &fixture.connection,
        )
        .unwrap();
        let out_of_savings = list_transferred_out(
            fixture.user_id,
            START,
            END,
            &[fixture.savings],
            &[],
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(into_savings.len(), 1);
        assert!(out_of_savings.is_empty());

        let customer = &into_savings[&fixture.currency_id].customers[&fixture.acme_id];
        let detail = customer.transaction_journals.values().next().unwrap();
        assert_eq!(detail.amount, Decimal::from_str("100").unwrap());

        let out_of_checking = list_transferred_out(
            fixture.user_id,
            START,
            END,
            &[fixture.checking],
            &[],
            &fixture.connection,
        )
        .unwrap();
        let detail = out_of_checking[&fixture.currency_id].customers[&fixture.acme_id]
            .transaction_journals
            .values()
            .next()
            .unwrap();
        assert_eq!(detail.amount, Decimal::from_str("-100").unwrap());
    }
}
