use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A portal customer, keyed by the identity id of its auth user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub email: String,
    pub company_name: String,
    pub contact_name: String,
}

impl Customer {
    pub fn new(
        id: Uuid,
        email: impl Into<String>,
        company_name: impl Into<String>,
        contact_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            company_name: company_name.into(),
            contact_name: contact_name.into(),
        }
    }
}
