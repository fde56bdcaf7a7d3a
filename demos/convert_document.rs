//! End-to-end document conversion example for the DocCloud API.
//!
//! This example demonstrates:
//! - Creating a client from environment variables
//! - Uploading a document to start a conversion job
//! - Waiting for the job to complete
//! - Downloading every output file
//! - Handling service errors
//!
//! # Usage
//!
//! Set your access token as an environment variable:
//! ```bash
//! export DOCCLOUD_ACCESS_TOKEN="your-access-token"
//! ```
//!
//! Then run:
//! ```bash
//! cargo run --example convert_document -- report.docx ./converted
//! ```

use integrations_doccloud::observability::{init_logging, LoggingConfig};
use integrations_doccloud::{ConvertState, DocCloudClient, DocCloudError, FilePart, RequestContent};
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging(LoggingConfig::from_env().with_target(false))?;

    let mut args = std::env::args().skip(1);
    let input = PathBuf::from(args.next().unwrap_or_else(|| "document.docx".to_string()));
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));

    println!("=== DocCloud Conversion Example ===\n");

    println!("1. Creating DocCloud client from environment...");
    let client = DocCloudClient::from_env()?;
    println!("   Endpoint: {}\n", client.config().base_url());

    println!("2. Uploading {} for conversion...", input.display());
    let content = RequestContent::MultipartFiles(vec![FilePart::new("0", &input)]);
    let mut job = match client.create_convert(content).await {
        Ok(job) => job,
        Err(DocCloudError::ConversionFailed { message, .. }) => {
            eprintln!("   Conversion rejected: {}", message);
            return Ok(());
        }
        Err(e @ DocCloudError::TemporaryUnavailable { .. }) => {
            eprintln!("   Service unavailable, retry after {:?}", e.retry_after());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("   Job: {}\n", job.url().unwrap_or("<unknown>"));

    println!("3. Waiting for the conversion to finish...");
    job.wait(Duration::from_secs(2), 90).await?;
    assert_eq!(job.state(), ConvertState::Completed);
    println!("   Done\n");

    println!("4. Downloading output to {}...", output_dir.display());
    tokio::fs::create_dir_all(&output_dir).await?;
    for path in job.download_all(Some(output_dir.as_path())).await? {
        println!("   Saved {}", path.display());
    }

    println!("\n5. Deleting the job...");
    job.delete().await?;
    println!("   Deleted");

    Ok(())
}
