//! Sign normalization for currency amounts.
//!
//! Report code never trusts the sign of a stored amount: withdrawals are
//! always shown as negative and deposits and transfers as positive, no matter
//! which leg of the journal the amount was read from.

use rust_decimal::Decimal;

/// Force `amount` to be negative.
pub fn forced_negative(amount: Decimal) -> Decimal {
    if amount.is_sign_positive() {
        -amount
    } else {
        amount
    }
}

/// Force `amount` to be positive.
pub fn forced_positive(amount: Decimal) -> Decimal {
    amount.abs()
}
