//! Artifact commands.

use super::print_json;
use anyhow::{Context, Result};
use deployments_client::{ArtifactUpdate, ArtifactUpload, ArtifactsClient};

/// Upload an artifact file and print its ID.
pub async fn upload(artifacts: &ArtifactsClient, file: &str, description: &str) -> Result<()> {
    let upload = ArtifactUpload::from_file(file, description)
        .await
        .with_context(|| format!("Failed to read artifact file: {}", file))?;

    tracing::info!(file = %file, size = upload.size, "Uploading artifact");

    let id = artifacts
        .add_artifact(upload)
        .await
        .context("Failed to upload artifact")?;
    println!("{}", id);
    Ok(())
}

/// Delete an artifact.
pub async fn delete(artifacts: &ArtifactsClient, id: &str) -> Result<()> {
    artifacts
        .delete_artifact(id)
        .await
        .with_context(|| format!("Failed to delete artifact {}", id))?;
    println!("Deleted artifact {}", id);
    Ok(())
}

/// Print artifact metadata.
pub async fn show(artifacts: &ArtifactsClient, id: &str) -> Result<()> {
    let artifact = artifacts
        .get_artifact(id)
        .await
        .with_context(|| format!("Failed to get artifact {}", id))?;
    print_json(&artifact)
}

/// Print all artifacts as a table.
pub async fn list(artifacts: &ArtifactsClient) -> Result<()> {
    let all = artifacts
        .list_artifacts()
        .await
        .context("Failed to list artifacts")?;

    if all.is_empty() {
        println!("No artifacts");
        return Ok(());
    }

    println!("{:<38} {:<30} {:<12} DESCRIPTION", "ID", "NAME", "SIZE");
    for artifact in &all {
        let size = artifact
            .size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<38} {:<30} {:<12} {}",
            artifact.id, artifact.name, size, artifact.description
        );
    }
    Ok(())
}

/// Change an artifact's description.
pub async fn edit(artifacts: &ArtifactsClient, id: &str, description: &str) -> Result<()> {
    let update = ArtifactUpdate {
        description: description.to_string(),
    };
    artifacts
        .edit_artifact(id, &update)
        .await
        .with_context(|| format!("Failed to edit artifact {}", id))?;
    println!("Updated artifact {}", id);
    Ok(())
}

/// Print a temporary download link.
pub async fn link(artifacts: &ArtifactsClient, id: &str) -> Result<()> {
    let link = artifacts
        .artifact_download_link(id)
        .await
        .with_context(|| format!("Failed to get download link for artifact {}", id))?;
    println!("{}", link.uri);
    println!("expires: {}", link.expire);
    Ok(())
}
