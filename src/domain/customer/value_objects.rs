use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::CustomerError;

// ============================================================================
// Customer Value Objects
// ============================================================================

/// Customer phone number, the natural key for customers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(pub String);

impl PhoneNumber {
    pub fn new(phone: impl Into<String>) -> Self {
        Self(phone.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: PhoneNumber,
    pub address: String,
    pub complement: Option<String>,
}

/// Customer details as captured at order intake.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub phone: PhoneNumber,
    pub address: String,
    pub complement: Option<String>,
}

impl NewCustomer {
    pub fn validate(&self) -> Result<(), CustomerError> {
        if self.name.trim().is_empty() {
            return Err(CustomerError::EmptyName);
        }
        if self.phone.as_str().is_empty() {
            return Err(CustomerError::EmptyPhone);
        }
        Ok(())
    }

    /// Upsert semantics: the phone stays, everything else is overwritten.
    pub fn merge_into(self, existing: &mut Customer) {
        existing.name = self.name;
        existing.address = self.address;
        existing.complement = self.complement;
    }
}
