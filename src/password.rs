//! Password validation and hashing.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The minimum zxcvbn score for a password to be accepted.
///
/// Scores of 3 and above are considered safe from offline attacks.
const MINIMUM_PASSWORD_SCORE: zxcvbn::Score = zxcvbn::Score::Three;

/// A password that has been validated for strength but not yet hashed.
#[derive(Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Create a validated password.
    ///
    /// `user_inputs` should contain strings associated with the user such as
    /// their email address, so that passwords derived from them are rejected.
    ///
    /// # Errors
    ///
    /// Returns an [Error::TooWeak] if the password is too easy to guess.
    pub fn new(password: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        let entropy = zxcvbn::zxcvbn(password, user_inputs);

        if entropy.score() >= MINIMUM_PASSWORD_SCORE {
            return Ok(Self(password.to_string()));
        }

        let feedback = entropy
            .feedback()
            .and_then(|feedback| feedback.warning())
            .map(|warning| warning.to_string())
            .unwrap_or_else(|| "Try a longer password.".to_string());

        Err(Error::TooWeak(feedback))
    }

    /// Create a validated password without checking its strength.
    ///
    /// Intended for test code and for re-wrapping passwords that were
    /// validated when they were first set.
    pub fn new_unchecked(password: &str) -> Self {
        Self(password.to_string())
    }
}

// Do not leak passwords into logs.
impl Debug for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ValidatedPassword(********)")
    }
}

/// A bcrypt hash of a user's password.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash a validated password with bcrypt.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the hashing library fails, which
    /// should be logged on the server and reported as an internal error.
    pub fn new(password: ValidatedPassword) -> Result<Self, Error> {
        bcrypt::hash(&password.0, bcrypt::DEFAULT_COST)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap an existing hash string, e.g. one loaded from the database.
    pub fn new_unchecked(hash: &str) -> Self {
        Self(hash.to_string())
    }

    /// Check `password` against the hash.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the hash could not be parsed.
    pub fn verify(&self, password: &str) -> Result<bool, Error> {
        bcrypt::verify(password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Do not leak password hashes into logs.
impl Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PasswordHash(********)")
    }
}

#[cfg(test)]
mod validated_password_tests {
    use crate::Error;

    use super::ValidatedPassword;

    #[test]
    fn weak_password_is_rejected() {
        let result = ValidatedPassword::new("password", &[]);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn password_matching_user_input_is_rejected() {
        let result = ValidatedPassword::new("foo@bar.baz", &["foo@bar.baz"]);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn strong_password_is_accepted() {
        let result = ValidatedPassword::new("correcthorsebatterystaple", &[]);

        assert!(result.is_ok());
    }
}

#[cfg(test)]
mod password_hash_tests {
    use super::{PasswordHash, ValidatedPassword};

    #[test]
    fn verify_accepts_correct_password() {
        let password = ValidatedPassword::new_unchecked("averysecretpassword");
        let hash = PasswordHash::new(password).expect("could not hash password");

        assert_eq!(Ok(true), hash.verify("averysecretpassword"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = ValidatedPassword::new_unchecked("averysecretpassword");
        let hash = PasswordHash::new(password).expect("could not hash password");

        assert_eq!(Ok(false), hash.verify("nottherightpassword"));
    }
}
