use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Links an auth user to the company whose branding they see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
}

pub const DEFAULT_BRAND_NAME: &str = "PrintHQ";
pub const DEFAULT_BRAND_COLOR: &str = "#4f46e5";

/// Presentation settings for the portal header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
}

impl Default for Brand {
    fn default() -> Self {
        Self {
            name: DEFAULT_BRAND_NAME.to_string(),
            logo_url: None,
            primary_color: DEFAULT_BRAND_COLOR.to_string(),
        }
    }
}

impl From<Company> for Brand {
    /// Missing company fields fall back to the default brand one by one.
    fn from(company: Company) -> Self {
        let default = Brand::default();
        Self {
            name: company.name.unwrap_or(default.name),
            logo_url: company.logo_url,
            primary_color: company.primary_color.unwrap_or(default.primary_color),
        }
    }
}
