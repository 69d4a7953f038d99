use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::backend::{AccessToken, AuthUser, Backend, RowStore};
use crate::domain::{FileRecord, Order, OrderCreate, OrderStatus, Quote, QuoteRequest};
use crate::orders::OrderError;
use crate::presentation::DashboardView;
use crate::pricing::validate_request;
use crate::table_framework::Query;

/// Free-text job details entered next to the configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl JobDetails {
    pub fn new(title: Option<String>, notes: Option<String>) -> Self {
        Self { title, notes }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Client for the customer's orders.
#[derive(Clone)]
pub struct OrderClient {
    backend: Arc<dyn Backend>,
}

impl_client_new!(OrderClient);

impl OrderClient {
    /// Write one `submitted` order carrying the quote's prices. The final
    /// price is the price of the turnaround chosen in `request`.
    #[instrument(skip(self, token, user, request, quote, details), fields(customer_id = %user.id, product = %request.product_type))]
    pub async fn submit(
        &self,
        token: &AccessToken,
        user: &AuthUser,
        request: &QuoteRequest,
        quote: &Quote,
        details: JobDetails,
    ) -> Result<Order, OrderError> {
        validate_request(request)?;
        if quote.turnaround != request.turnaround {
            return Err(OrderError::ValidationError(
                "quote turnaround does not match the job configuration".to_string(),
            ));
        }

        let payload = OrderCreate {
            customer_id: user.id,
            title: non_blank(&details.title),
            product_type: request.product_type.clone(),
            quantity: request.quantity,
            paper_type: request.paper_type.clone(),
            finishing: request.finishing.clone(),
            turnaround: request.turnaround,
            location: Some(quote.location.clone()),
            notes: non_blank(&details.notes),
            standard_price: quote.standard_price,
            rush_price: quote.rush_price,
            final_price: quote.price_for(request.turnaround),
            status: OrderStatus::Submitted,
        };

        debug!("Sending request");
        let order = RowStore::<Order>::insert(self.backend.as_ref(), Some(token), payload)
            .await
            .map_err(|e| {
                error!(error = %e, "Order insert failed");
                e
            })?;
        info!(order_id = %order.id, final_price = order.final_price, "Order submitted");
        Ok(order)
    }

    /// All orders of the signed-in customer, newest first.
    #[instrument(skip(self, token, user), fields(customer_id = %user.id))]
    pub async fn history(&self, token: &AccessToken, user: &AuthUser) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let query = Query::new().eq("customer_id", user.id).order_desc("created_at");
        Ok(RowStore::<Order>::select(self.backend.as_ref(), Some(token), query).await?)
    }

    #[instrument(skip(self, token, user), fields(customer_id = %user.id))]
    pub async fn dashboard(&self, token: &AccessToken, user: &AuthUser) -> Result<DashboardView, OrderError> {
        let orders = self.history(token, user).await?;
        debug!("Sending request");
        let files = RowStore::<FileRecord>::select(
            self.backend.as_ref(),
            Some(token),
            Query::new().eq("user_id", user.id),
        )
        .await?;
        Ok(DashboardView::build(orders, &files))
    }
}
