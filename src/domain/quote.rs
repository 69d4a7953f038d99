use serde::{Deserialize, Serialize};

use super::order::{Location, Turnaround};

/// Job configuration as entered in the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub product_type: String,
    pub quantity: u32,
    pub paper_type: String,
    #[serde(default)]
    pub finishing: Vec<String>,
    #[serde(default)]
    pub turnaround: Turnaround,
    #[serde(default)]
    pub location: Location,
}

impl QuoteRequest {
    pub fn new(
        product_type: impl Into<String>,
        quantity: u32,
        paper_type: impl Into<String>,
    ) -> Self {
        Self {
            product_type: product_type.into(),
            quantity,
            paper_type: paper_type.into(),
            finishing: Vec::new(),
            turnaround: Turnaround::Standard,
            location: Location::Auto,
        }
    }

    pub fn with_finishing(mut self, finishing: Vec<String>) -> Self {
        self.finishing = finishing;
        self
    }

    pub fn with_turnaround(mut self, turnaround: Turnaround) -> Self {
        self.turnaround = turnaround;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

/// Where the prices of a quote came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceBasis {
    Rule {
        paper_cost: f64,
        press_hours: f64,
        press_cost: f64,
        finishing_cost: f64,
    },
    /// No rule matched the product/paper pair; flat per-unit rate.
    Fallback,
}

/// Computed price estimate for a job configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub standard_price: f64,
    pub rush_price: f64,
    pub turnaround: Turnaround,
    pub turnaround_label: String,
    pub location: String,
    pub sheets: u32,
    pub basis: PriceBasis,
}

impl Quote {
    pub fn price_for(&self, turnaround: Turnaround) -> f64 {
        match turnaround {
            Turnaround::Standard => self.standard_price,
            Turnaround::Rush => self.rush_price,
        }
    }

    /// Price of the turnaround the customer picked.
    pub fn final_price(&self) -> f64 {
        self.price_for(self.turnaround)
    }
}
