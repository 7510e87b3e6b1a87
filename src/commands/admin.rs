//! Admin upload command handler.

use std::process::ExitCode;

use anyhow::{Context, Result};
use eduverza_core::{SubmitError, UploadForm, format_file_size, submit};
use tracing::{info, warn};

use super::CommandContext;
use crate::cli::UploadArgs;
use crate::output;

/// Builds the submission form, reading the document size when one is given.
pub(crate) fn form_from_args(args: &UploadArgs) -> Result<UploadForm> {
    let file_size_bytes = match &args.file {
        Some(path) => {
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to read document '{}'", path.display()))?;
            Some(metadata.len())
        }
        None => None,
    };
    Ok(UploadForm {
        title: args.title.clone(),
        department: args.department.clone(),
        year: args.year,
        sem: args.sem,
        subject: args.subject.clone(),
        resource_type: args.resource_type.clone(),
        description: args.description.clone(),
        file_size_bytes,
    })
}

pub async fn run_admin_upload_command(ctx: &CommandContext, args: &UploadArgs) -> Result<ExitCode> {
    let form = form_from_args(args)?;
    if let (Some(path), Some(bytes)) = (&args.file, form.file_size_bytes) {
        warn!(
            path = %path.display(),
            size = %format_file_size(bytes),
            "document contents are not uploaded; only the size is recorded"
        );
    }

    let spinner = output::start_spinner(ctx.use_spinner, "Uploading...");
    let outcome = submit(ctx.backend.as_ref(), &form).await;
    output::finish_spinner(spinner);

    match outcome {
        Ok(resource) => {
            info!(id = %resource.id, "upload complete");
            println!("Resource uploaded successfully!\n");
            println!("{}", output::render_card(&resource, ctx.width));
            Ok(ExitCode::SUCCESS)
        }
        Err(error @ SubmitError::Invalid { .. }) => {
            eprintln!("Error: {error}");
            Ok(ExitCode::FAILURE)
        }
        Err(SubmitError::Backend(error)) => {
            eprintln!("{}", output::render_error_panel("Failed to upload resource", &error));
            Ok(ExitCode::FAILURE)
        }
    }
}
