//! Deployment commands.

use super::print_json;
use anyhow::{Context, Result};
use clap::ValueEnum;
use deployments_client::{
    DeploymentQuery, DeploymentStatusFilter, DeploymentsClient, ExpectedStats, NewDeployment,
    StatCounter,
};

/// Deployment status accepted by `deployments list --status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Inprogress,
    Finished,
    Aborted,
}

impl From<StatusArg> for DeploymentStatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Inprogress => Self::InProgress,
            StatusArg::Finished => Self::Finished,
            StatusArg::Aborted => Self::Aborted,
        }
    }
}

/// Build a list query from command-line filters.
pub fn query(
    search: Option<String>,
    status: Option<StatusArg>,
    page: Option<u32>,
    per_page: Option<u32>,
) -> DeploymentQuery {
    DeploymentQuery {
        search,
        status: status.map(Into::into),
        page,
        per_page,
        ..Default::default()
    }
}

/// Create a deployment and print its ID.
pub async fn create(
    deployments: &DeploymentsClient,
    name: &str,
    artifact_name: &str,
    devices: Vec<String>,
) -> Result<()> {
    tracing::info!(name = %name, artifact = %artifact_name, devices = devices.len(), "Creating deployment");

    let new = NewDeployment::new(name, artifact_name, devices);
    let id = deployments
        .add_deployment(&new)
        .await
        .context("Failed to create deployment")?;
    println!("{}", id);
    Ok(())
}

/// Abort a deployment.
pub async fn abort(deployments: &DeploymentsClient, id: &str) -> Result<()> {
    deployments
        .abort_deployment(id)
        .await
        .with_context(|| format!("Failed to abort deployment {}", id))?;
    println!("Aborted deployment {}", id);
    Ok(())
}

/// Print per-status device counts.
pub async fn stats(deployments: &DeploymentsClient, id: &str) -> Result<()> {
    let stats = deployments
        .get_deployment_stats(id)
        .await
        .with_context(|| format!("Failed to get statistics for deployment {}", id))?;

    for counter in StatCounter::ALL {
        println!("{:<18} {}", counter.as_str(), stats.get(counter));
    }
    println!("{:<18} {}", "total", stats.total());
    Ok(())
}

/// Check device counts against `name=value` expectations.
pub async fn verify(deployments: &DeploymentsClient, id: &str, expected: &[String]) -> Result<()> {
    let expected: ExpectedStats = expected
        .join(" ")
        .parse()
        .context("Invalid expected counters")?;

    deployments
        .verify_deployment_stats(id, &expected)
        .await
        .with_context(|| format!("Statistics check failed for deployment {}", id))?;
    println!("Statistics match for deployment {}", id);
    Ok(())
}

/// Print a deployment.
pub async fn show(deployments: &DeploymentsClient, id: &str) -> Result<()> {
    let deployment = deployments
        .get_deployment(id)
        .await
        .with_context(|| format!("Failed to get deployment {}", id))?;
    print_json(&deployment)
}

/// Print deployments matching a query as a table.
pub async fn list(deployments: &DeploymentsClient, query: &DeploymentQuery) -> Result<()> {
    let found = deployments
        .list_deployments(query)
        .await
        .context("Failed to list deployments")?;

    if found.is_empty() {
        println!("No deployments");
        return Ok(());
    }

    println!("{:<38} {:<24} {:<24} {:<12} CREATED", "ID", "NAME", "ARTIFACT", "STATUS");
    for deployment in &found {
        println!(
            "{:<38} {:<24} {:<24} {:<12} {}",
            deployment.id,
            deployment.name,
            deployment.artifact_name,
            format!("{:?}", deployment.status).to_lowercase(),
            deployment.created
        );
    }
    Ok(())
}

/// Print the per-device status of a deployment.
pub async fn devices(deployments: &DeploymentsClient, id: &str) -> Result<()> {
    let devices = deployments
        .deployment_devices(id)
        .await
        .with_context(|| format!("Failed to list devices of deployment {}", id))?;
    print_json(&devices)
}

/// Print the log a device uploaded.
pub async fn device_log(deployments: &DeploymentsClient, id: &str, device: &str) -> Result<()> {
    let log = deployments
        .device_deployment_log(id, device)
        .await
        .with_context(|| format!("Failed to get log of device {} in deployment {}", device, id))?;
    print!("{}", log);
    Ok(())
}

/// Print releases, optionally only the one named `name`.
pub async fn releases(deployments: &DeploymentsClient, name: Option<&str>) -> Result<()> {
    let releases = deployments
        .list_releases(name)
        .await
        .context("Failed to list releases")?;
    print_json(&releases)
}

/// Print a server limit and its usage.
pub async fn limit(deployments: &DeploymentsClient, name: &str) -> Result<()> {
    let limit = deployments
        .get_limit(name)
        .await
        .with_context(|| format!("Failed to get limit {}", name))?;
    println!("{:<8} {}", "limit", limit.limit);
    println!("{:<8} {}", "usage", limit.usage);
    Ok(())
}
