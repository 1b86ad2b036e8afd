//! Loading a JSON data file into the graph at startup.

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::Value;

use crm_core::{BulkCreateReport, BulkCreateRequest};
use crm_service::EntityService;

const SECTIONS: [&str; 3] = ["customers", "opportunities", "interactions"];

/// Read `path` as a bulk-create document and ingest it.
///
/// Sections other than customers, opportunities and interactions
/// (`products`, `sales_reps`, ...) are skipped with a warning. Per-record
/// failures land in the report; only an unreadable or non-object file is an
/// error.
pub async fn seed_from_file(entities: &EntityService, path: &Path) -> anyhow::Result<BulkCreateReport> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let document: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Seed file {} is not valid JSON", path.display()))?;

    let Some(object) = document.as_object() else {
        bail!("Seed file {} must contain a JSON object", path.display());
    };
    for key in object.keys().filter(|k| !SECTIONS.contains(&k.as_str())) {
        tracing::warn!(section = %key, "Skipping unsupported seed section");
    }

    let request: BulkCreateRequest = serde_json::from_value(document)
        .with_context(|| format!("Seed file {} has malformed sections", path.display()))?;
    let report = entities.create(&request).await;

    tracing::info!(
        path = %path.display(),
        stored = report.stored,
        failed = report.failed,
        "Seed data loaded"
    );
    Ok(report)
}
