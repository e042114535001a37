use candidate_intake::client::{read_candidates_file, CandidateUploader};
use candidate_intake::utils::error::ErrorSeverity;
use candidate_intake::utils::{logger, validation};
use clap::Parser;

#[derive(Parser)]
#[command(name = "upload-csv")]
#[command(about = "Upload a candidates CSV file to a running candidate-intake server")]
struct Args {
    /// CSV file: Name, Phone, Age, Address, Company, Position, Education
    file: String,

    /// Base URL of the candidate-intake server
    #[arg(short, long, default_value = "http://localhost:3000")]
    server: String,

    /// Batch label stored on every candidate (defaults to the upload time)
    #[arg(short, long)]
    batch: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Parse the file and show what would be uploaded without sending it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);
    tracing::info!("📁 Reading candidates from: {}", args.file);

    validation::validate_file_extensions("file", std::slice::from_ref(&args.file), &["csv", "txt"])?;
    let uploader = CandidateUploader::new(&args.server)?;
    let candidates = read_candidates_file(&args.file)?;

    println!("📋 Upload Summary:");
    println!("  File: {}", args.file);
    println!("  Candidates: {}", candidates.len());
    println!("  Batch: {}", args.batch.as_deref().unwrap_or("(upload time)"));
    println!("  Endpoint: {}", uploader.endpoint());
    println!();

    if args.dry_run {
        println!("🔍 DRY RUN MODE - nothing was uploaded");
        return Ok(());
    }

    match uploader.upload(&candidates, args.batch.as_deref()).await {
        Ok(count) => {
            let skipped = (candidates.len() as u64).saturating_sub(count);
            tracing::info!("✅ Uploaded {} candidates ({} skipped)", count, skipped);
            println!("✅ Successfully uploaded {} candidates!", count);
            if skipped > 0 {
                println!("ℹ️  {} duplicates were skipped", skipped);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Upload failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}
