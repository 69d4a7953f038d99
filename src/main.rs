mod app_system;
mod auth;
mod backend;
mod clients;
mod domain;
mod orders;
mod presentation;
mod pricing;
mod server;
mod table_framework;
mod uploads;

#[cfg(test)]
mod mock_framework;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, Instrument};

use crate::app_system::{setup_tracing, Config, PortalSystem, SubmitJobError};
use crate::auth::SignInForm;
use crate::backend::Session;
use crate::clients::JobDetails;
use crate::domain::{Location, QuoteRequest, SelectedFile, Turnaround};
use crate::presentation::QuoteWizard;
use crate::pricing::parse_quantity;

#[derive(Parser)]
#[command(name = "printhq", version, about = "Customer portal for print jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Overrides PORTAL_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Price a job without submitting it
    Quote(JobArgs),
    /// Walk the new-job wizard: upload, configure, quote, proof, submit
    Submit {
        #[command(flatten)]
        login: LoginArgs,
        /// Artwork to attach; repeat for several files
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Approve the proof without asking
        #[arg(long, short = 'y')]
        yes: bool,
        #[command(flatten)]
        job: JobArgs,
    },
    /// Show order history for an account
    Dashboard {
        #[command(flatten)]
        login: LoginArgs,
    },
}

#[derive(Args)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
    password: String,
}

impl LoginArgs {
    fn form(&self) -> SignInForm {
        SignInForm {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Args)]
struct JobArgs {
    #[arg(long)]
    product: String,
    /// Number of finished pieces
    #[arg(long)]
    quantity: String,
    #[arg(long)]
    paper: String,
    /// Finishing option; repeat for several
    #[arg(long = "finishing")]
    finishing: Vec<String>,
    #[arg(long)]
    rush: bool,
    #[arg(long, value_enum, default_value_t = LocationArg::Auto)]
    location: LocationArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum LocationArg {
    Auto,
    SanJose,
    Dallas,
}

impl From<LocationArg> for Location {
    fn from(arg: LocationArg) -> Self {
        match arg {
            LocationArg::Auto => Location::Auto,
            LocationArg::SanJose => Location::SanJose,
            LocationArg::Dallas => Location::Dallas,
        }
    }
}

impl JobArgs {
    fn request(&self) -> Result<QuoteRequest, String> {
        let quantity = parse_quantity(&self.quantity).map_err(|e| e.to_string())?;
        let turnaround = if self.rush { Turnaround::Rush } else { Turnaround::Standard };
        Ok(QuoteRequest::new(self.product.trim(), quantity, self.paper.trim())
            .with_finishing(self.finishing.clone())
            .with_turnaround(turnaround)
            .with_location(self.location.into()))
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("ai") => "application/postscript",
        Some("eps") => "application/postscript",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

async fn read_selected_file(path: &Path) -> Result<SelectedFile, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    Ok(SelectedFile::new(name, content_type_for(path), bytes))
}

async fn sign_in(system: &PortalSystem, login: &LoginArgs) -> Result<Session, String> {
    let span = tracing::info_span!("sign_in");
    async {
        info!("Signing in");
        system.auth.sign_in(&login.form()).await.map_err(|e| e.to_string())
    }
    .instrument(span)
    .await
}

async fn run_quote(system: &PortalSystem, job: &JobArgs) -> Result<(), String> {
    let request = job.request()?;
    let quote = system.pricing.quote(None, &request).await.map_err(|e| e.to_string())?;

    println!("Sheets:          {}", quote.sheets);
    println!("Standard price:  ${:.2}", quote.standard_price);
    println!("Rush price:      ${:.2}", quote.rush_price);
    println!("Turnaround:      {}", quote.turnaround_label);
    println!("Location:        {}", quote.location);
    println!("Your price:      ${:.2}", quote.final_price());
    Ok(())
}

/// Ask a yes/no question on the terminal. Anything but `y`/`yes` is a no.
async fn confirm(prompt: &str) -> Result<bool, String> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush().map_err(|e| e.to_string())?;
    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .map_err(|e| format!("Failed to read answer: {}", e))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn run_submit(
    system: &PortalSystem,
    login: &LoginArgs,
    paths: &[PathBuf],
    details: JobDetails,
    job: &JobArgs,
    approve: bool,
) -> Result<(), String> {
    let session = sign_in(system, login).await?;
    let mut wizard = QuoteWizard::new();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_selected_file(path).await?);
    }
    wizard.attach_files(files).map_err(|e| e.to_string())?;
    debug!(step = %wizard.step(), files = wizard.files().len(), "Files attached");

    wizard.configure(job.request()?).map_err(|e| e.to_string())?;
    let request = wizard.config().cloned().ok_or("Job is not configured")?;

    let span = tracing::info_span!("quote");
    let quote = async {
        info!("Pricing job");
        system
            .pricing
            .quote(Some(&session.access_token), &request)
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;
    wizard.show_quote(quote).map_err(|e| e.to_string())?;
    if let Some(quote) = wizard.quote() {
        println!(
            "Quote: ${:.2} standard / ${:.2} rush, {} at {}",
            quote.standard_price, quote.rush_price, quote.turnaround_label, quote.location
        );
    }

    wizard.request_proof().map_err(|e| e.to_string())?;
    println!(
        "Proof: {} x {} on {} with {} file(s)",
        request.quantity,
        request.product_type,
        request.paper_type,
        wizard.files().len()
    );
    if approve || confirm("Approve the proof and submit?").await? {
        wizard.approve_proof().map_err(|e| e.to_string())?;
    }
    if !wizard.proof_approved() {
        let step = wizard.back();
        info!(step = %step, "Proof not approved");
        println!("Proof not approved; job was not submitted.");
        return Ok(());
    }
    let submission = wizard.submit().map_err(|e| e.to_string())?;

    let span = tracing::info_span!("job_submission");
    let receipt = async {
        info!("Submitting job");
        system
            .submit_job(&session.access_token, &session.user, submission, details)
            .await
    }
    .instrument(span)
    .await
    .map_err(|e| {
        if let SubmitJobError::Files { job_id, source } = &e {
            for file in source.uploaded() {
                println!("Stored {} for job {}", file.file_name, job_id);
            }
        }
        e.to_string()
    })?;

    info!(order_id = %receipt.order.id, files = receipt.files.len(), step = %wizard.step(), "Job submitted");
    println!(
        "Submitted job {} ({} file(s)), final price ${:.2}",
        receipt.order.id,
        receipt.files.len(),
        receipt.order.final_price
    );
    Ok(())
}

async fn run_dashboard(system: &PortalSystem, login: &LoginArgs) -> Result<(), String> {
    let session = sign_in(system, login).await?;
    let brand = system.branding.load(&session.access_token, &session.user).await;
    let view = system
        .orders
        .dashboard(&session.access_token, &session.user)
        .await
        .map_err(|e| e.to_string())?;

    println!("{}", brand.name);
    print!("{}", view.render());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let cli = Cli::parse();

    let config = Config::load().map_err(|e| {
        error!(error = %e, "Configuration failed");
        e.to_string()
    })?;
    info!(backend = ?config.backend, "Starting PrintHQ portal");
    let system = PortalSystem::from_config(&config).await.map_err(|e| {
        error!(error = %e, "Startup failed");
        e.to_string()
    })?;

    let result = match &cli.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.port);
            server::serve(system, port).await.map_err(|e| e.to_string())
        }
        Command::Quote(job) => run_quote(&system, job).await,
        Command::Submit { login, files, title, notes, yes, job } => {
            let details = JobDetails::new(title.clone(), notes.clone());
            run_submit(&system, login, files, details, job, *yes).await
        }
        Command::Dashboard { login } => run_dashboard(&system, login).await,
    };

    if let Err(e) = &result {
        error!(error = %e, "Command failed");
    }
    result
}
