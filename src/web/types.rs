//! Structs received by the `web` module that need to be validated, their parsing implementations
//! and tests for those.

use derive_more::{Deref, Display};
use lazy_regex::regex_is_match;
use unicode_segmentation::UnicodeSegmentation;

// ###################################
// ->   STRUCTS
// ###################################
/// Validated Subscriber Email
///
/// Validation runs on the raw input, the stored value is lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Deref, Display)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.graphemes(true).count() > 256 {
            return Err(DataParsingError::EmailTooLong);
        }

        if is_valid_email(value) {
            Ok(ValidEmail(value.to_lowercase()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }
}

/// `local-part@domain.tld`, the TLD being at least two letters.
pub fn is_valid_email(candidate: &str) -> bool {
    regex_is_match!(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$", candidate)
}

/// The body of a subscribe request: exactly one `email` field.
#[derive(Debug)]
pub struct SubscribeForm {
    pub email: ValidEmail,
}

impl SubscribeForm {
    /// Parses the decoded `application/x-www-form-urlencoded` pairs.
    pub fn parse(fields: Vec<(String, String)>) -> Result<Self, DataParsingError> {
        let mut email = None;

        for (key, value) in fields {
            if key != "email" {
                return Err(DataParsingError::UnexpectedField(key));
            }
            if email.replace(value).is_some() {
                return Err(DataParsingError::RepeatedField(key));
            }
        }

        let email = email
            .filter(|email| !email.is_empty())
            .ok_or(DataParsingError::EmailMissing)?;

        Ok(SubscribeForm {
            email: ValidEmail::parse(email)?,
        })
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("Missing 'email' field. Please enter your email address.")]
    EmailMissing,
    #[error("Invalid email. Please enter a valid email address.")]
    EmailInvalid,
    #[error("Email too long.")]
    EmailTooLong,

    #[error("Unexpected form field: '{0}'.")]
    UnexpectedField(String),
    #[error("Form field '{0}' was sent more than once.")]
    RepeatedField(String),
}
