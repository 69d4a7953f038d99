use std::fmt;

use thiserror::Error;

use crate::domain::{Quote, QuoteRequest, SelectedFile};
use crate::pricing::{validate_request, PricingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Upload,
    Configure,
    Quote,
    Proof,
    Submitted,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Upload => "upload",
            WizardStep::Configure => "configure",
            WizardStep::Quote => "quote",
            WizardStep::Proof => "proof",
            WizardStep::Submitted => "submitted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WizardError {
    #[error("Expected the {expected} step, but the wizard is on {actual}")]
    OutOfStep { expected: WizardStep, actual: WizardStep },
    #[error("Please upload at least 1 file.")]
    NoFiles,
    #[error("Configure the job before quoting")]
    NotConfigured,
    #[error("The quote does not match the job configuration")]
    QuoteMismatch,
    #[error("Approve the proof before submitting")]
    ProofNotApproved,
    #[error(transparent)]
    InvalidConfig(#[from] PricingError),
}

/// Everything the portal needs to create the job once the wizard completes.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub request: QuoteRequest,
    pub quote: Quote,
    pub files: Vec<SelectedFile>,
}

/// Local state of the new-job wizard: upload → configure → quote → proof → submit.
///
/// Pricing happens outside; the caller hands the computed quote to
/// [`QuoteWizard::show_quote`].
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteWizard {
    step: WizardStep,
    files: Vec<SelectedFile>,
    config: Option<QuoteRequest>,
    quote: Option<Quote>,
    proof_approved: bool,
}

impl Default for QuoteWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Upload,
            files: Vec::new(),
            config: None,
            quote: None,
            proof_approved: false,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn config(&self) -> Option<&QuoteRequest> {
        self.config.as_ref()
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    pub fn proof_approved(&self) -> bool {
        self.proof_approved
    }

    fn expect_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::OutOfStep {
                expected,
                actual: self.step,
            })
        }
    }

    pub fn attach_files(&mut self, files: Vec<SelectedFile>) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Upload)?;
        if files.is_empty() {
            return Err(WizardError::NoFiles);
        }
        self.files = files;
        self.step = WizardStep::Configure;
        Ok(())
    }

    /// Store the job configuration. A changed configuration drops any quote.
    pub fn configure(&mut self, request: QuoteRequest) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Configure)?;
        validate_request(&request)?;
        if self.config.as_ref() != Some(&request) {
            self.quote = None;
        }
        self.config = Some(request);
        Ok(())
    }

    /// Show the quote for the stored configuration. A quote priced for a
    /// different turnaround or facility is refused.
    pub fn show_quote(&mut self, quote: Quote) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Configure)?;
        let Some(config) = &self.config else {
            return Err(WizardError::NotConfigured);
        };
        if quote.turnaround != config.turnaround || quote.location != config.location.facility() {
            return Err(WizardError::QuoteMismatch);
        }
        self.quote = Some(quote);
        self.step = WizardStep::Quote;
        Ok(())
    }

    pub fn request_proof(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Quote)?;
        self.proof_approved = false;
        self.step = WizardStep::Proof;
        Ok(())
    }

    pub fn approve_proof(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Proof)?;
        self.proof_approved = true;
        Ok(())
    }

    /// Hand over the finished job and close the wizard.
    pub fn submit(&mut self) -> Result<Submission, WizardError> {
        self.expect_step(WizardStep::Proof)?;
        if !self.proof_approved {
            return Err(WizardError::ProofNotApproved);
        }
        let (Some(request), Some(quote)) = (self.config.clone(), self.quote.clone()) else {
            return Err(WizardError::NotConfigured);
        };
        self.step = WizardStep::Submitted;
        Ok(Submission {
            request,
            quote,
            files: std::mem::take(&mut self.files),
        })
    }

    /// Step back one page. Uploading and submitted wizards stay put.
    pub fn back(&mut self) -> WizardStep {
        self.step = match self.step {
            WizardStep::Upload => WizardStep::Upload,
            WizardStep::Configure => WizardStep::Upload,
            WizardStep::Quote => WizardStep::Configure,
            WizardStep::Proof => {
                self.proof_approved = false;
                WizardStep::Quote
            }
            WizardStep::Submitted => WizardStep::Submitted,
        };
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Turnaround};
    use crate::pricing::calculate_quote;

    fn art() -> Vec<SelectedFile> {
        vec![SelectedFile::new("front.pdf", "application/pdf", b"%PDF-1.7".to_vec())]
    }

    fn request() -> QuoteRequest {
        QuoteRequest::new("flyers", 5000, "100# Gloss Text")
    }

    fn quoted_wizard() -> QuoteWizard {
        let mut wizard = QuoteWizard::new();
        wizard.attach_files(art()).unwrap();
        wizard.configure(request()).unwrap();
        wizard.show_quote(calculate_quote(&request(), None).unwrap()).unwrap();
        wizard
    }

    #[test]
    fn test_full_walk_through() {
        let mut wizard = quoted_wizard();
        assert_eq!(wizard.step(), WizardStep::Quote);

        wizard.request_proof().unwrap();
        wizard.approve_proof().unwrap();
        let submission = wizard.submit().unwrap();

        assert_eq!(wizard.step(), WizardStep::Submitted);
        assert_eq!(submission.request, request());
        assert_eq!(submission.quote.standard_price, 1250.0);
        assert_eq!(submission.files, art());
        assert!(wizard.files().is_empty());
    }

    #[test]
    fn test_upload_requires_files() {
        let mut wizard = QuoteWizard::new();
        assert_eq!(wizard.attach_files(vec![]), Err(WizardError::NoFiles));
        assert_eq!(wizard.step(), WizardStep::Upload);
    }

    #[test]
    fn test_out_of_step_operations_are_rejected() {
        let mut wizard = QuoteWizard::new();
        assert_eq!(
            wizard.configure(request()),
            Err(WizardError::OutOfStep { expected: WizardStep::Configure, actual: WizardStep::Upload })
        );

        let mut wizard = quoted_wizard();
        assert_eq!(
            wizard.submit(),
            Err(WizardError::OutOfStep { expected: WizardStep::Proof, actual: WizardStep::Quote })
        );
    }

    #[test]
    fn test_quote_needs_configuration() {
        let mut wizard = QuoteWizard::new();
        wizard.attach_files(art()).unwrap();
        let quote = calculate_quote(&request(), None).unwrap();
        assert_eq!(wizard.show_quote(quote), Err(WizardError::NotConfigured));
    }

    #[test]
    fn test_quote_for_another_configuration_is_refused() {
        let mut wizard = QuoteWizard::new();
        wizard.attach_files(art()).unwrap();
        wizard.configure(request()).unwrap();

        let rush = calculate_quote(&request().with_turnaround(Turnaround::Rush), None).unwrap();
        assert_eq!(wizard.show_quote(rush), Err(WizardError::QuoteMismatch));
        let dallas = calculate_quote(&request().with_location(Location::Dallas), None).unwrap();
        assert_eq!(wizard.show_quote(dallas), Err(WizardError::QuoteMismatch));
        assert_eq!(wizard.step(), WizardStep::Configure);
        assert!(wizard.quote().is_none());

        wizard.show_quote(calculate_quote(&request(), None).unwrap()).unwrap();
        assert_eq!(wizard.step(), WizardStep::Quote);
    }

    #[test]
    fn test_invalid_quantity_is_rejected_on_configure() {
        let mut wizard = QuoteWizard::new();
        wizard.attach_files(art()).unwrap();
        let result = wizard.configure(QuoteRequest::new("flyers", 0, "100# Gloss Text"));
        assert!(matches!(result, Err(WizardError::InvalidConfig(_))));
        assert!(wizard.config().is_none());
    }

    #[test]
    fn test_submit_requires_approved_proof() {
        let mut wizard = quoted_wizard();
        wizard.request_proof().unwrap();
        assert_eq!(wizard.submit(), Err(WizardError::ProofNotApproved));
    }

    #[test]
    fn test_back_from_proof_revokes_approval_and_reconfigure_drops_quote() {
        let mut wizard = quoted_wizard();
        wizard.request_proof().unwrap();
        wizard.approve_proof().unwrap();

        assert_eq!(wizard.back(), WizardStep::Quote);
        assert!(!wizard.proof_approved());
        assert_eq!(wizard.back(), WizardStep::Configure);

        wizard.configure(request().with_finishing(vec!["Folding".into()])).unwrap();
        assert!(wizard.quote().is_none());
        assert_eq!(wizard.back(), WizardStep::Upload);
        assert_eq!(wizard.back(), WizardStep::Upload);
    }
}
