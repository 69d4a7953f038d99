use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::backend::{find_one, AccessToken, Backend};
use crate::domain::{PricingRule, Quote, QuoteRequest};
use crate::pricing::{calculate_quote, validate_request, PricingError};
use crate::table_framework::Query;

/// Client that looks up pricing rules and turns requests into quotes.
#[derive(Clone)]
pub struct PricingClient {
    backend: Arc<dyn Backend>,
}

impl_client_new!(PricingClient);

impl PricingClient {
    #[instrument(skip(self, token))]
    pub async fn find_rule(
        &self,
        token: Option<&AccessToken>,
        product_type: &str,
        paper_type: &str,
    ) -> Result<Option<PricingRule>, PricingError> {
        debug!("Sending request");
        let query = Query::new()
            .eq("product_type", product_type)
            .eq("paper_type", paper_type);
        find_one::<PricingRule, _>(self.backend.as_ref(), token, query)
            .await
            .map_err(|e| {
                error!(error = %e, "Pricing rule lookup failed");
                PricingError::from(e)
            })
    }

    /// Validate, fetch the matching rule (one read) and compute the quote.
    /// A missing rule prices with the fallback rate.
    #[instrument(skip(self, token, request), fields(product = %request.product_type, quantity = request.quantity))]
    pub async fn quote(&self, token: Option<&AccessToken>, request: &QuoteRequest) -> Result<Quote, PricingError> {
        validate_request(request)?;
        let rule = self
            .find_rule(token, &request.product_type, &request.paper_type)
            .await?;
        if rule.is_none() {
            info!("No pricing rule matched, using fallback rate");
        }
        calculate_quote(request, rule.as_ref())
    }
}
