use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::{BackendConfig, Config, ConfigError};
use crate::auth::AuthGate;
use crate::backend::hosted::HostedBackend;
use crate::backend::memory::MemoryBackend;
use crate::backend::{AccessToken, AuthUser, Backend};
use crate::clients::{AuthClient, BrandingClient, JobDetails, OrderClient, PricingClient, UploadClient};
use crate::domain::{FileRecord, Order, PricingRule};
use crate::orders::OrderError;
use crate::presentation::Submission;
use crate::uploads::UploadError;

/// A job created from a completed wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReceipt {
    pub order: Order,
    pub files: Vec<FileRecord>,
}

#[derive(Debug, Error)]
pub enum SubmitJobError {
    #[error(transparent)]
    Order(#[from] OrderError),
    /// The order exists; some or all of its files do not.
    #[error("Job {job_id} was created but its files were not: {source}")]
    Files { job_id: Uuid, source: UploadError },
}

/// The portal: one backend handle and every client built on top of it.
///
/// Cloning is cheap; the HTTP router uses the system itself as its state.
#[derive(Clone)]
pub struct PortalSystem {
    pub gate: AuthGate,
    pub auth: AuthClient,
    pub pricing: PricingClient,
    pub orders: OrderClient,
    pub uploads: UploadClient,
    pub branding: BrandingClient,
}

impl PortalSystem {
    pub fn new(backend: Arc<dyn Backend>, config: &Config) -> Self {
        Self {
            gate: AuthGate::new(backend.clone(), config.login_path.clone()),
            auth: AuthClient::new(backend.clone()),
            pricing: PricingClient::new(backend.clone()),
            orders: OrderClient::new(backend.clone()),
            uploads: UploadClient::new(backend.clone(), config.art_bucket.clone()),
            branding: BrandingClient::new(backend),
        }
    }

    /// Build the configured backend and wire the clients to it. The in-memory
    /// backend spawns its tables, so this must run inside a tokio runtime.
    ///
    /// # Errors
    /// `PricingRules` when the memory backend's seed file can't be read or parsed.
    pub async fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let backend: Arc<dyn Backend> = match &config.backend {
            BackendConfig::Hosted { url, anon_key } => {
                info!(url = %url, "Using hosted backend");
                Arc::new(HostedBackend::new(url.clone(), anon_key.clone()))
            }
            BackendConfig::Memory { pricing_rules } => {
                let backend = MemoryBackend::start();
                if let Some(path) = pricing_rules {
                    seed_pricing_rules(&backend, path).await?;
                }
                Arc::new(backend)
            }
        };
        Ok(Self::new(backend, config))
    }

    /// Create the order for a finished wizard, then upload its files under
    /// the new job id. A failed upload does not remove the order.
    #[instrument(skip(self, token, user, submission, details), fields(customer_id = %user.id))]
    pub async fn submit_job(
        &self,
        token: &AccessToken,
        user: &AuthUser,
        submission: Submission,
        details: JobDetails,
    ) -> Result<JobReceipt, SubmitJobError> {
        let order = self
            .orders
            .submit(token, user, &submission.request, &submission.quote, details)
            .await?;

        match self
            .uploads
            .upload_files(token, user, order.id, &submission.files)
            .await
        {
            Ok(files) => Ok(JobReceipt { order, files }),
            Err(source) => {
                error!(error = %source, job_id = %order.id, "Job files failed to upload");
                Err(SubmitJobError::Files { job_id: order.id, source })
            }
        }
    }
}

async fn seed_pricing_rules(backend: &MemoryBackend, path: &Path) -> Result<(), ConfigError> {
    let failed = |reason: String| ConfigError::PricingRules {
        path: path.display().to_string(),
        reason,
    };
    let bytes = tokio::fs::read(path).await.map_err(|e| failed(e.to_string()))?;
    let rules: Vec<PricingRule> = serde_json::from_slice(&bytes).map_err(|e| failed(e.to_string()))?;
    let count = backend.seed(rules).await.map_err(|e| failed(e.to_string()))?;
    info!(count, path = %path.display(), "Seeded pricing rules");
    Ok(())
}
