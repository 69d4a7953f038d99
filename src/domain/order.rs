use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery speed tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Turnaround {
    #[default]
    Standard,
    Rush,
}

impl Turnaround {
    pub fn label(&self) -> &'static str {
        match self {
            Turnaround::Standard => "3-5 days",
            Turnaround::Rush => "24 hours",
        }
    }
}

/// Production facility preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Location {
    /// Let production pick the fastest/cheapest facility.
    #[default]
    Auto,
    SanJose,
    Dallas,
}

impl Location {
    /// Facility the job is quoted against. An explicit pick shows the
    /// facility's full name; `Auto` currently routes to San Jose.
    pub fn facility(&self) -> &'static str {
        match self {
            Location::Auto => "San Jose",
            Location::SanJose => "San Jose, CA",
            Location::Dallas => "Dallas, TX",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Quote,
    Submitted,
    Approved,
    InProduction,
    Complete,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    /// Whether the job still needs work from the shop.
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            OrderStatus::Complete | OrderStatus::Shipped | OrderStatus::Cancelled
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Quote => "Quote",
            OrderStatus::Submitted => "Submitted",
            OrderStatus::Approved => "Approved",
            OrderStatus::InProduction => "In Production",
            OrderStatus::Complete => "Complete",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// A submitted print job with committed specs and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub title: Option<String>,
    pub product_type: String,
    pub quantity: u32,
    pub paper_type: String,
    pub finishing: Vec<String>,
    pub turnaround: Turnaround,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub standard_price: f64,
    pub rush_price: f64,
    pub final_price: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderCreate {
    pub customer_id: Uuid,
    pub title: Option<String>,
    pub product_type: String,
    pub quantity: u32,
    pub paper_type: String,
    pub finishing: Vec<String>,
    pub turnaround: Turnaround,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub standard_price: f64,
    pub rush_price: f64,
    pub final_price: f64,
    pub status: OrderStatus,
}

impl Order {
    /// Name shown in listings: the job title, or the product type when untitled.
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(&self.product_type)
    }
}
