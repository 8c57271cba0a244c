//! Device commands.

use super::print_json;
use anyhow::{Context, Result};
use deployments_client::{DeviceClient, DeviceDeploymentStatus, StatusReport};

/// Print the next pending deployment, if any.
pub async fn next(device: &DeviceClient, token: &str, artifact_name: &str, device_type: &str) -> Result<()> {
    let next = device
        .get_next_deployment(token, artifact_name, device_type)
        .await
        .context("Failed to get next deployment")?;

    match next {
        Some(instructions) => print_json(&instructions),
        None => {
            println!("No pending deployment");
            Ok(())
        }
    }
}

/// Report deployment status.
pub async fn status(
    device: &DeviceClient,
    token: &str,
    id: &str,
    status: DeviceDeploymentStatus,
    substate: Option<String>,
) -> Result<()> {
    let report = StatusReport { status, substate };
    device
        .report_status(token, id, report)
        .await
        .with_context(|| format!("Failed to report status {} for deployment {}", status, id))?;
    println!("Reported {} for deployment {}", status, id);
    Ok(())
}

/// Upload log lines.
pub async fn log(device: &DeviceClient, token: &str, id: &str, lines: Vec<String>) -> Result<()> {
    let count = lines.len();
    device
        .upload_log_lines(token, id, lines)
        .await
        .with_context(|| format!("Failed to upload log for deployment {}", id))?;
    println!("Uploaded {} log lines for deployment {}", count, id);
    Ok(())
}
