use std::time::Duration;

use chrono::Utc;
use clap::Args;

use crate::commands::{CommandContext, CommandError};
use crate::logs::{download_logs, ensure_logs_available, format_size, prepare_output_file, validate_window};

/// Upper bound for downloading every chunk of a window.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Arguments of `api-mesh log-get-bulk`.
#[derive(Debug, Args)]
pub struct LogGetBulkArgs {
    /// Start of the window, YYYY-MM-DDTHH:MM:SSZ
    #[arg(long)]
    pub start_time: String,

    /// End of the window, YYYY-MM-DDTHH:MM:SSZ
    #[arg(long)]
    pub end_time: String,

    /// Empty .csv file the logs are written to
    #[arg(long)]
    pub filename: String,

    /// Skip the download size confirmation
    #[arg(short = 'c', long)]
    pub auto_confirm_action: bool,
}

/// Download the mesh's logs of a time window into a csv file.
/// Returns the number of bytes written.
pub async fn run(context: &CommandContext, args: &LogGetBulkArgs) -> Result<u64, CommandError> {
    let window = validate_window(&args.start_time, &args.end_time, Utc::now())?;
    let path = prepare_output_file(&args.filename, &std::env::current_dir()?).await?;

    let client = context.client()?;
    let mesh_id = context.require_mesh_id(&client, "get logs").await?;

    let urls = client
        .get_presigned_urls(
            &context.settings.workspace,
            &mesh_id,
            &window.start_param(),
            &window.end_param(),
        )
        .await
        .map_err(|e| {
            tracing::error!(mesh_id = %mesh_id, error = %e, "Failed to get presigned urls");
            context.failure("Unable to get the logs. If the error persists please contact support.")
        })?;
    ensure_logs_available(&urls)?;

    let question = format!(
        "The expected file size is {}. Do you want to continue?",
        format_size(urls.total_size)
    );
    if !context.confirm(&question, args.auto_confirm_action)? {
        println!("Log files not downloaded.");
        return Ok(0);
    }

    let written = download_logs(&client, &urls, &path, DOWNLOAD_TIMEOUT).await?;
    println!("Successfully downloaded the logs to {}.", args.filename);
    Ok(written)
}
