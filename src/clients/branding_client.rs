use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::backend::{find_one, AccessToken, AuthUser, Backend, BackendResult};
use crate::domain::{Brand, Company, Profile};
use crate::table_framework::Query;

/// Client that resolves the portal branding of the signed-in user's company.
#[derive(Clone)]
pub struct BrandingClient {
    backend: Arc<dyn Backend>,
}

impl_client_new!(BrandingClient);

impl BrandingClient {
    /// Never fails: any miss or error yields the default brand.
    #[instrument(skip(self, token, user), fields(user_id = %user.id))]
    pub async fn load(&self, token: &AccessToken, user: &AuthUser) -> Brand {
        match self.company_of(token, user).await {
            Ok(Some(company)) => Brand::from(company),
            Ok(None) => {
                debug!("No company linked, using default brand");
                Brand::default()
            }
            Err(e) => {
                warn!(error = %e, "Branding lookup failed, using default brand");
                Brand::default()
            }
        }
    }

    async fn company_of(&self, token: &AccessToken, user: &AuthUser) -> BackendResult<Option<Company>> {
        debug!("Sending request");
        let profile: Option<Profile> =
            find_one(self.backend.as_ref(), Some(token), Query::new().eq("id", user.id)).await?;
        let Some(company_id) = profile.and_then(|profile| profile.company_id) else {
            return Ok(None);
        };
        find_one(self.backend.as_ref(), Some(token), Query::new().eq("id", company_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::backend::BackendError;
    use crate::domain::{DEFAULT_BRAND_COLOR, DEFAULT_BRAND_NAME};
    use crate::mock_framework::{create_mock_backend, expect_select};
    use uuid::Uuid;

    fn user() -> AuthUser {
        AuthUser { id: Uuid::new_v4(), email: None }
    }

    #[tokio::test]
    async fn test_profile_without_company_gets_default_brand() {
        let backend = MemoryBackend::start();
        let user = user();
        backend
            .seed(vec![Profile { id: user.id, company_id: None }])
            .await
            .unwrap();
        let client = BrandingClient::new(Arc::new(backend));

        let brand = client.load(&AccessToken::new("tok"), &user).await;
        assert_eq!(brand, Brand::default());
        assert_eq!(brand.name, DEFAULT_BRAND_NAME);
        assert_eq!(brand.primary_color, DEFAULT_BRAND_COLOR);
    }

    #[tokio::test]
    async fn test_company_fields_fall_back_individually() {
        let backend = MemoryBackend::start();
        let user = user();
        let company_id = Uuid::new_v4();
        backend
            .seed(vec![Profile { id: user.id, company_id: Some(company_id) }])
            .await
            .unwrap();
        backend
            .seed(vec![Company {
                id: company_id,
                name: Some("Acme Insurance".into()),
                logo_url: Some("https://cdn.acme.test/logo.svg".into()),
                primary_color: None,
            }])
            .await
            .unwrap();
        let client = BrandingClient::new(Arc::new(backend));

        let brand = client.load(&AccessToken::new("tok"), &user).await;
        assert_eq!(brand.name, "Acme Insurance");
        assert_eq!(brand.logo_url.as_deref(), Some("https://cdn.acme.test/logo.svg"));
        assert_eq!(brand.primary_color, DEFAULT_BRAND_COLOR);
    }

    #[tokio::test]
    async fn test_lookup_error_gets_default_brand() {
        let (backend, mut calls) = create_mock_backend(4);
        let client = BrandingClient::new(Arc::new(backend));

        let task = tokio::spawn(async move { client.load(&AccessToken::new("tok"), &user()).await });
        let (table, _, responder) = expect_select(&mut calls).await.expect("Expected Select call");
        assert_eq!(table, "profiles");
        responder.send(Err(BackendError::Transport("timed out".into()))).unwrap();

        assert_eq!(task.await.unwrap(), Brand::default());
    }
}
