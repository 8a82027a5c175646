use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("address field '{0}' is required")]
pub struct MissingAddressField(pub &'static str);

/// A postal address used for shipping or billing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub full_name: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Address {
    /// Checks that every required field is present and non-blank.
    pub fn validate(&self) -> Result<(), MissingAddressField> {
        let required = [
            ("full_name", &self.full_name),
            ("line1", &self.line1),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(MissingAddressField(*field)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_address() -> Address {
    Address {
        full_name: "Ada Lovelace".to_string(),
        line1: "12 Analytical Row".to_string(),
        line2: None,
        city: "London".to_string(),
        state: None,
        postal_code: "N1 9GU".to_string(),
        country: "GB".to_string(),
        phone: Some("+44 20 7946 0000".to_string()),
    }
}
