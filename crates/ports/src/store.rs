//! Project store boundary contract.
//!
//! The project store is the downstream collaborator that materializes the
//! resolved import set as analyzable documents. The concrete vendor is an
//! injected implementation so the pipeline stays testable without it.

use crate::BoxFuture;
use code_intake_domain::ImportRootId;
use code_intake_shared::{RequestContext, Result};

/// A document ready for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDocument {
    /// Path relative to the import root.
    pub relative_path: Box<str>,
    /// UTF-8 file content.
    pub content: Box<str>,
}

/// One delivery of resolved documents for an import root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDelivery {
    /// Stable id of the import root.
    pub root_id: ImportRootId,
    /// Documents in resolved order.
    pub documents: Vec<ProjectDocument>,
}

/// Boundary contract for the downstream project store.
pub trait ProjectStorePort: Send + Sync {
    /// Deliver the resolved import set.
    fn deliver(
        &self,
        ctx: &RequestContext,
        delivery: ProjectDelivery,
    ) -> BoxFuture<'_, Result<()>>;
}
