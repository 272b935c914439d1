//! # Identity
//!
//! The acting principal, passed explicitly into every mutating call and
//! stamped into `created_by` / `updated_by`.

use serde::{Deserialize, Serialize};

use crate::SYSTEM_USER;

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    display_name: String,
}

impl Identity {
    /// The fallback identity used by jobs and unauthenticated callers.
    pub fn system() -> Self {
        Identity {
            display_name: SYSTEM_USER.to_string(),
        }
    }

    /// Identity for an authenticated principal name, if there is one.
    ///
    /// A missing or blank name falls back to [`Identity::system`].
    pub fn from_principal(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => Identity {
                display_name: name.to_string(),
            },
            _ => Identity::system(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl Default for Identity {
    fn default() -> Self {
        Identity::system()
    }
}
