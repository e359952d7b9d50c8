//! Core customer domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, UserId, database_id::DatabaseId};

/// The maximum number of characters in a customer name.
pub const CUSTOMER_NAME_MAX_LENGTH: usize = 100;

/// A validated, non-empty customer name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CustomerName(String);

impl CustomerName {
    /// Create a customer name.
    ///
    /// The name is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmptyCustomerName] if `name` is an empty string, or
    /// an [Error::CustomerNameTooLong] if it is longer than
    /// [CUSTOMER_NAME_MAX_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyCustomerName);
        }

        if name.chars().count() > CUSTOMER_NAME_MAX_LENGTH {
            return Err(Error::CustomerNameTooLong);
        }

        Ok(Self(name.to_string()))
    }

    /// Create a customer name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// if the non-empty invariant is violated it will cause incorrect
    /// behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CustomerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CustomerName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CustomerName::new(s)
    }
}

impl Display for CustomerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a customer.
pub type CustomerId = DatabaseId;

/// A person or business that transactions can be tagged with.
///
/// Customers are scoped to one owning user: two users can each have their own
/// customer named "Acme", but a single user cannot have two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Customer {
    /// The ID of the customer.
    pub id: CustomerId,
    /// The user the customer belongs to.
    pub user_id: UserId,
    /// The customer's name, unique within the owning user's scope.
    pub name: CustomerName,
}

/// The validated data used to store or update a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerData {
    /// The customer's name.
    pub name: CustomerName,
    /// The note to attach to the customer. `Some("")` removes an existing
    /// note, `None` leaves any note untouched.
    pub notes: Option<String>,
}

/// Form data for customer creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerFormData {
    pub name: String,
    #[serde(default)]
    pub notes: String,
    /// When set, the user is returned to the creation form after a
    /// successful save, instead of the customers page.
    #[serde(default)]
    pub create_another: Option<String>,
    /// When set, the user is returned to the edit form after a successful
    /// save, instead of the customers page.
    #[serde(default)]
    pub return_to_edit: Option<String>,
}

#[cfg(test)]
mod customer_name_tests {
    use crate::Error;

    use super::{CUSTOMER_NAME_MAX_LENGTH, CustomerName};

    #[test]
    fn new_fails_on_empty_string() {
        let name = CustomerName::new("");

        assert_eq!(name, Err(Error::EmptyCustomerName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let name = CustomerName::new("\n\t \r");

        assert_eq!(name, Err(Error::EmptyCustomerName));
    }

    #[test]
    fn new_fails_on_name_longer_than_max() {
        let raw_name = "x".repeat(CUSTOMER_NAME_MAX_LENGTH + 1);

        let name = CustomerName::new(&raw_name);

        assert_eq!(name, Err(Error::CustomerNameTooLong));
    }

    #[test]
    fn new_trims_whitespace() {
        let name = CustomerName::new("  Acme \n").unwrap();

        assert_eq!(name.as_ref(), "Acme");
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let name = CustomerName::new("🔥");

        assert!(name.is_ok())
    }
}
