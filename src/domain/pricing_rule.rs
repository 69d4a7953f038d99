use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference data for one product/paper combination.
///
/// Rows are maintained outside the portal; the portal only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRule {
    /// Seed files may leave this out; a fresh id is assigned.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub product_type: String,
    pub paper_type: String,
    pub paper_cost_per_sheet: f64,
    pub setup_minutes: f64,
    /// Sheets per hour once the press is set up.
    pub run_speed_per_hour: f64,
    pub press_rate_per_hour: f64,
    pub markup: f64,
    pub rush_multiplier: f64,
}

/// Insert payload for `pricing_rules`. Only used to seed stores.
#[derive(Debug, Clone, Serialize)]
pub struct PricingRuleCreate {
    pub product_type: String,
    pub paper_type: String,
    pub paper_cost_per_sheet: f64,
    pub setup_minutes: f64,
    pub run_speed_per_hour: f64,
    pub press_rate_per_hour: f64,
    pub markup: f64,
    pub rush_multiplier: f64,
}
