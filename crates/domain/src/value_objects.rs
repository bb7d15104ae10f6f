//! Value objects held by read models.
//!
//! Each type validates its input on construction and is immutable afterwards.
//! Deserialization goes through the same validating constructor, so a
//! malformed nested object in an event payload is rejected while decoding.

use serde::{Deserialize, Serialize};

use crate::ValueObjectError;

fn require(field: &'static str, value: String) -> Result<String, ValueObjectError> {
    if value.trim().is_empty() {
        Err(ValueObjectError::Blank { field })
    } else {
        Ok(value)
    }
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AddressFields")]
pub struct Address {
    street: String,
    city: String,
    zip_code: String,
}

#[derive(Deserialize)]
struct AddressFields {
    street: String,
    city: String,
    #[serde(default)]
    zip_code: String,
}

impl Address {
    /// Creates an address. Street and city must not be blank.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Result<Self, ValueObjectError> {
        Ok(Self {
            street: require("street", street.into())?,
            city: require("city", city.into())?,
            zip_code: zip_code.into(),
        })
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }
}

impl TryFrom<AddressFields> for Address {
    type Error = ValueObjectError;

    fn try_from(fields: AddressFields) -> Result<Self, Self::Error> {
        Self::new(fields.street, fields.city, fields.zip_code)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.zip_code.is_empty() {
            write!(f, "{}, {}", self.street, self.city)
        } else {
            write!(f, "{}, {} {}", self.street, self.zip_code, self.city)
        }
    }
}

/// An email address and whether its owner has verified it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "EmailFields")]
pub struct Email {
    address: String,
    verified: bool,
}

#[derive(Deserialize)]
struct EmailFields {
    address: String,
    #[serde(default)]
    verified: bool,
}

impl Email {
    /// Creates an email after checking the address has the shape `local@domain`.
    pub fn new(address: impl Into<String>, verified: bool) -> Result<Self, ValueObjectError> {
        let address = address.into();
        Self::validate_address(&address)?;
        Ok(Self { address, verified })
    }

    /// Checks an address without building an [`Email`].
    pub fn validate_address(address: &str) -> Result<(), ValueObjectError> {
        let valid = match address.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !address.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if valid {
            Ok(())
        } else {
            Err(ValueObjectError::InvalidEmail(address.to_string()))
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Returns a copy with the verification flag replaced.
    pub fn with_verified(&self, verified: bool) -> Self {
        Self {
            address: self.address.clone(),
            verified,
        }
    }
}

impl TryFrom<EmailFields> for Email {
    type Error = ValueObjectError;

    fn try_from(fields: EmailFields) -> Result<Self, Self::Error> {
        Self::new(fields.address, fields.verified)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.address)
    }
}

/// A phone number with its country calling code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PhoneFields")]
pub struct Phone {
    number: String,
    country_code: String,
}

#[derive(Deserialize)]
struct PhoneFields {
    number: String,
    country_code: String,
}

impl Phone {
    /// Creates a phone number.
    ///
    /// Spaces and dashes in `number` are stripped; what remains must be
    /// digits. `country_code` may carry a leading `+`, which is dropped.
    pub fn new(
        number: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Result<Self, ValueObjectError> {
        let raw_number = number.into();
        let digits: String = raw_number
            .chars()
            .filter(|c| *c != ' ' && *c != '-')
            .collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValueObjectError::InvalidPhone {
                field: "number",
                value: raw_number,
            });
        }

        let raw_code = country_code.into();
        let code = raw_code.strip_prefix('+').unwrap_or(&raw_code);
        if code.is_empty() || code.len() > 3 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValueObjectError::InvalidPhone {
                field: "country_code",
                value: raw_code,
            });
        }

        Ok(Self {
            number: digits,
            country_code: code.to_string(),
        })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }
}

impl TryFrom<PhoneFields> for Phone {
    type Error = ValueObjectError;

    fn try_from(fields: PhoneFields) -> Result<Self, Self::Error> {
        Self::new(fields.number, fields.country_code)
    }
}

impl std::fmt::Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "+{} {}", self.country_code, self.number)
    }
}
