//! Project store adapters.

use code_intake_ports::{ProjectDelivery, ProjectStorePort};
use code_intake_shared::{ErrorEnvelope, RequestContext, Result};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Mutex;

/// In-memory store collecting deliveries (tests and scan previews).
#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    deliveries: Mutex<Vec<ProjectDelivery>>,
}

impl MemoryProjectStore {
    /// Build an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return the captured deliveries.
    pub fn take(&self) -> Vec<ProjectDelivery> {
        match self.deliveries.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        }
    }
}

impl ProjectStorePort for MemoryProjectStore {
    fn deliver(
        &self,
        _ctx: &RequestContext,
        delivery: ProjectDelivery,
    ) -> code_intake_ports::BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if let Ok(mut guard) = self.deliveries.lock() {
                guard.push(delivery);
            }
            Ok(())
        })
    }
}

/// Store appending one JSON document per line to a file.
///
/// Line shape: `{"rootId", "relativePath", "contentSha256", "bytes",
/// "content"}` - a self-contained record the downstream analyzer can ingest
/// without touching the original tree.
#[derive(Debug, Clone)]
pub struct JsonlProjectStore {
    output_path: PathBuf,
}

impl JsonlProjectStore {
    /// Build a store writing to the given path (truncated per delivery).
    #[must_use]
    pub const fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    /// Destination path.
    #[must_use]
    pub fn output_path(&self) -> &PathBuf {
        &self.output_path
    }
}

impl ProjectStorePort for JsonlProjectStore {
    fn deliver(
        &self,
        _ctx: &RequestContext,
        delivery: ProjectDelivery,
    ) -> code_intake_ports::BoxFuture<'_, Result<()>> {
        let output_path = self.output_path.clone();
        Box::pin(async move {
            let mut encoded = String::new();
            for document in &delivery.documents {
                let line = serde_json::json!({
                    "rootId": delivery.root_id.as_str(),
                    "relativePath": document.relative_path.as_ref(),
                    "contentSha256": content_sha256(&document.content),
                    "bytes": document.content.len(),
                    "content": document.content.as_ref(),
                });
                let rendered = serde_json::to_string(&line).map_err(|error| {
                    ErrorEnvelope::unexpected(
                        code_intake_shared::ErrorCode::internal(),
                        format!("failed to encode delivery line: {error}"),
                        code_intake_shared::ErrorClass::NonRetriable,
                    )
                })?;
                encoded.push_str(&rendered);
                encoded.push('\n');
            }

            tokio::fs::write(&output_path, encoded)
                .await
                .map_err(ErrorEnvelope::from)?;
            Ok(())
        })
    }
}

fn content_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
