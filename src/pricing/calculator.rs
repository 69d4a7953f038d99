use crate::domain::{PriceBasis, PricingRule, Quote, QuoteRequest};

use super::PricingError;

/// Finished pieces imposed on one press sheet.
pub const UNITS_PER_SHEET: u32 = 8;
/// Flat charge when any finishing option is selected.
pub const FINISHING_FEE: f64 = 25.0;
/// Per-unit rate when no rule matches the product/paper pair.
pub const FALLBACK_UNIT_PRICE: f64 = 0.25;
pub const FALLBACK_RUSH_MULTIPLIER: f64 = 1.5;

/// Press sheets needed for `quantity` pieces.
pub fn sheets_for(quantity: u32) -> u32 {
    quantity.div_ceil(UNITS_PER_SHEET)
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Parse the quantity field of a job form.
///
/// # Errors
/// `MissingQuantity` for blank input, `InvalidQuantity` for anything that is
/// not a positive whole number.
pub fn parse_quantity(raw: &str) -> Result<u32, PricingError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PricingError::MissingQuantity);
    }
    match trimmed.parse::<u32>() {
        Ok(0) | Err(_) => Err(PricingError::InvalidQuantity(trimmed.to_string())),
        Ok(quantity) => Ok(quantity),
    }
}

pub fn validate_request(request: &QuoteRequest) -> Result<(), PricingError> {
    if request.quantity == 0 {
        return Err(PricingError::InvalidQuantity("0".to_string()));
    }
    Ok(())
}

/// Compute standard and rush prices for a job.
///
/// With a rule, the price is built from paper, press time and finishing, then
/// marked up; rush applies the rule's multiplier to the standard price. Without
/// one, the flat per-unit fallback applies. Both prices are rounded to cents,
/// rush being derived from the rounded standard price.
///
/// # Arguments
/// * `request` - Job configuration; quantity must be positive
/// * `rule` - Pricing rule for the request's product and paper, if one exists
pub fn calculate_quote(request: &QuoteRequest, rule: Option<&PricingRule>) -> Result<Quote, PricingError> {
    validate_request(request)?;
    let sheets = sheets_for(request.quantity);

    let (standard_price, rush_price, basis) = match rule {
        Some(rule) => {
            if rule.run_speed_per_hour <= 0.0 {
                return Err(PricingError::InvalidRule {
                    product_type: rule.product_type.clone(),
                    paper_type: rule.paper_type.clone(),
                    reason: "run speed must be positive".to_string(),
                });
            }

            let sheets = f64::from(sheets);
            let paper_cost = sheets * rule.paper_cost_per_sheet;
            let press_hours = rule.setup_minutes / 60.0 + sheets / rule.run_speed_per_hour;
            let press_cost = press_hours * rule.press_rate_per_hour;
            let finishing_cost = if request.finishing.is_empty() { 0.0 } else { FINISHING_FEE };
            let total = paper_cost + press_cost + finishing_cost;

            let standard = round_cents(total * rule.markup);
            let rush = round_cents(standard * rule.rush_multiplier);
            let basis = PriceBasis::Rule {
                paper_cost: round_cents(paper_cost),
                press_hours,
                press_cost: round_cents(press_cost),
                finishing_cost,
            };
            (standard, rush, basis)
        }
        None => {
            let standard = round_cents(f64::from(request.quantity) * FALLBACK_UNIT_PRICE);
            let rush = round_cents(standard * FALLBACK_RUSH_MULTIPLIER);
            (standard, rush, PriceBasis::Fallback)
        }
    };

    Ok(Quote {
        standard_price,
        rush_price,
        turnaround: request.turnaround,
        turnaround_label: request.turnaround.label().to_string(),
        location: request.location.facility().to_string(),
        sheets,
        basis,
    })
}
