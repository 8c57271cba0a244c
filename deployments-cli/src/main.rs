//! deployments - command-line driver for the artifact and deployment service.

mod commands;
mod observability;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::ConnectionArgs;
use deployments_client::DeviceDeploymentStatus;
use observability::{TracingConfig, init_tracing};

/// Exercise the deployments, device and inventory APIs by hand.
#[derive(Parser)]
#[command(name = "deployments")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Artifact management
    Artifacts {
        #[command(subcommand)]
        action: ArtifactsAction,
    },

    /// Deployment management
    Deployments {
        #[command(subcommand)]
        action: DeploymentsAction,
    },

    /// Act as a device
    Device {
        #[command(subcommand)]
        action: DeviceAction,
    },

    /// Device inventory
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
}

#[derive(Subcommand)]
enum ArtifactsAction {
    /// Upload an artifact file
    Upload {
        /// Path to the artifact file
        file: String,

        /// Artifact description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete an artifact
    Delete {
        /// Artifact ID
        id: String,
    },

    /// Show artifact metadata
    Show {
        /// Artifact ID
        id: String,
    },

    /// List all artifacts
    List,

    /// Change an artifact's description
    Edit {
        /// Artifact ID
        id: String,

        /// New description
        #[arg(short, long)]
        description: String,
    },

    /// Print a temporary download link
    Link {
        /// Artifact ID
        id: String,
    },
}

#[derive(Subcommand)]
enum DeploymentsAction {
    /// Create a deployment
    Create {
        /// Deployment name
        #[arg(short, long)]
        name: String,

        /// Name of the artifact to deploy
        #[arg(short, long)]
        artifact_name: String,

        /// Target device ID (repeatable)
        #[arg(short, long = "device", required = true)]
        devices: Vec<String>,
    },

    /// Abort a deployment
    Abort {
        /// Deployment ID
        id: String,
    },

    /// Show per-status device counts
    Stats {
        /// Deployment ID
        id: String,
    },

    /// Check device counts; unspecified counters must be zero
    Verify {
        /// Deployment ID
        id: String,

        /// Expected counters (e.g., success=2 pending=1)
        expected: Vec<String>,
    },

    /// Show a deployment
    Show {
        /// Deployment ID
        id: String,
    },

    /// List deployments
    List {
        /// Match deployment or artifact name
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by status
        #[arg(long, value_enum)]
        status: Option<commands::deployments::StatusArg>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Results per page
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// List per-device status of a deployment
    Devices {
        /// Deployment ID
        id: String,
    },

    /// Print the log a device uploaded
    Log {
        /// Deployment ID
        id: String,

        /// Device ID
        device: String,
    },

    /// List releases
    Releases {
        /// Only the release with this artifact name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show a server limit and its usage
    Limit {
        /// Limit name (e.g., storage)
        name: String,
    },
}

#[derive(Subcommand)]
enum DeviceAction {
    /// Ask for the next pending deployment
    Next {
        /// Device token
        #[arg(
            id = "device_token",
            short = 't',
            long = "device-token",
            env = "DEVICE_TOKEN",
            hide_env_values = true
        )]
        device_token: String,

        /// Currently installed artifact name
        #[arg(short, long)]
        artifact_name: String,

        /// Device type
        #[arg(short, long)]
        device_type: String,
    },

    /// Report deployment status
    Status {
        /// Device token
        #[arg(
            id = "device_token",
            short = 't',
            long = "device-token",
            env = "DEVICE_TOKEN",
            hide_env_values = true
        )]
        device_token: String,

        /// Deployment ID
        id: String,

        /// Status (e.g., downloading, installing, success, failure)
        status: DeviceDeploymentStatus,

        /// Optional substate text
        #[arg(long)]
        substate: Option<String>,
    },

    /// Upload deployment log lines
    Log {
        /// Device token
        #[arg(
            id = "device_token",
            short = 't',
            long = "device-token",
            env = "DEVICE_TOKEN",
            hide_env_values = true
        )]
        device_token: String,

        /// Deployment ID
        id: String,

        /// Log lines
        #[arg(required = true)]
        lines: Vec<String>,
    },
}

#[derive(Subcommand)]
enum InventoryAction {
    /// Report inventory attributes as JSON
    Report {
        /// Device token
        #[arg(
            id = "device_token",
            short = 't',
            long = "device-token",
            env = "DEVICE_TOKEN",
            hide_env_values = true
        )]
        device_token: String,

        /// Attributes, e.g. '[{"name":"device_type","value":"beaglebone"}]'
        attributes: String,
    },
}

fn setup_logging(verbosity: u8) -> Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // DEPLOYMENTS_LOG_LEVEL and RUST_LOG take precedence over -v
    let config = TracingConfig::from_env(filter);
    init_tracing(&config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let clients = cli.connection.clients()?;

    match cli.command {
        Commands::Artifacts { action } => {
            let artifacts = &clients.artifacts;
            match action {
                ArtifactsAction::Upload { file, description } => {
                    commands::artifacts::upload(artifacts, &file, &description).await
                }
                ArtifactsAction::Delete { id } => commands::artifacts::delete(artifacts, &id).await,
                ArtifactsAction::Show { id } => commands::artifacts::show(artifacts, &id).await,
                ArtifactsAction::List => commands::artifacts::list(artifacts).await,
                ArtifactsAction::Edit { id, description } => {
                    commands::artifacts::edit(artifacts, &id, &description).await
                }
                ArtifactsAction::Link { id } => commands::artifacts::link(artifacts, &id).await,
            }
        }
        Commands::Deployments { action } => {
            let deployments = &clients.deployments;
            match action {
                DeploymentsAction::Create {
                    name,
                    artifact_name,
                    devices,
                } => commands::deployments::create(deployments, &name, &artifact_name, devices).await,
                DeploymentsAction::Abort { id } => commands::deployments::abort(deployments, &id).await,
                DeploymentsAction::Stats { id } => commands::deployments::stats(deployments, &id).await,
                DeploymentsAction::Verify { id, expected } => {
                    commands::deployments::verify(deployments, &id, &expected).await
                }
                DeploymentsAction::Show { id } => commands::deployments::show(deployments, &id).await,
                DeploymentsAction::List {
                    search,
                    status,
                    page,
                    per_page,
                } => {
                    let query = commands::deployments::query(search, status, page, per_page);
                    commands::deployments::list(deployments, &query).await
                }
                DeploymentsAction::Devices { id } => {
                    commands::deployments::devices(deployments, &id).await
                }
                DeploymentsAction::Log { id, device } => {
                    commands::deployments::device_log(deployments, &id, &device).await
                }
                DeploymentsAction::Releases { name } => {
                    commands::deployments::releases(deployments, name.as_deref()).await
                }
                DeploymentsAction::Limit { name } => {
                    commands::deployments::limit(deployments, &name).await
                }
            }
        }
        Commands::Device { action } => {
            let device = &clients.device;
            match action {
                DeviceAction::Next {
                    device_token,
                    artifact_name,
                    device_type,
                } => {
                    commands::device::next(device, &device_token, &artifact_name, &device_type).await
                }
                DeviceAction::Status {
                    device_token,
                    id,
                    status,
                    substate,
                } => commands::device::status(device, &device_token, &id, status, substate).await,
                DeviceAction::Log {
                    device_token,
                    id,
                    lines,
                } => commands::device::log(device, &device_token, &id, lines).await,
            }
        }
        Commands::Inventory { action } => match action {
            InventoryAction::Report {
                device_token,
                attributes,
            } => {
                commands::inventory::report(clients.inventory.as_ref(), &device_token, &attributes)
                    .await
            }
        },
    }
}
