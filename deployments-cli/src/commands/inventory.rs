//! Inventory commands.

use anyhow::{Context, Result};
use deployments_client::InventoryClient;

/// Report attributes given as a JSON document.
pub async fn report(inventory: Option<&InventoryClient>, token: &str, attributes: &str) -> Result<()> {
    let inventory = inventory
        .context("No inventory API configured; set --inventory-url, INVENTORY_URL or INVENTORY_HOST")?;

    let attributes: serde_json::Value =
        serde_json::from_str(attributes).context("Attributes must be valid JSON")?;

    inventory
        .report_attributes(token, &attributes)
        .await
        .context("Failed to report inventory attributes")?;
    println!("Reported inventory attributes");
    Ok(())
}
