//! Public snapshot publishing.
//!
//! The snapshot is a JSON array holding the public projection of every
//! stored instrument. It is created on first publish and updated in place
//! afterwards.

use async_trait::async_trait;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::store::InstrumentStore;
use crate::constants::{SNAPSHOT_FOLDER, SNAPSHOT_NAME, SNAPSHOT_PROJECT};
use crate::errors::Result;

/// A document to create in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub name: String,
    pub project: String,
    pub folder: String,
    pub content: Value,
}

/// Outcome of updating an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateResult {
    pub changed: bool,
}

/// Remote document store the snapshot is published to.
#[async_trait]
pub trait DocumentPublisher: Send + Sync {
    /// Whether a document exists at `path` (`project/folder/name`).
    async fn exists(&self, path: &str) -> Result<bool>;

    async fn create(&self, document: NewDocument) -> Result<()>;

    /// Replaces the content at `path`. `changed` is false when the content was identical.
    async fn update(&self, path: &str, content: Value) -> Result<UpdateResult>;
}

/// Location of the snapshot document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTarget {
    pub project: String,
    pub folder: String,
    pub name: String,
}

impl SnapshotTarget {
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.project, self.folder, self.name)
    }
}

impl Default for SnapshotTarget {
    fn default() -> Self {
        Self {
            project: SNAPSHOT_PROJECT.to_string(),
            folder: SNAPSHOT_FOLDER.to_string(),
            name: SNAPSHOT_NAME.to_string(),
        }
    }
}

/// What happened to the snapshot in a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Created,
    Updated,
    Unchanged,
    /// The document store rejected or could not be reached.
    Failed { message: String },
}

/// Reads the public projection back from the store and publishes it.
///
/// Store errors propagate. Publisher errors are logged and reported as
/// [`PublishOutcome::Failed`].
pub async fn publish_snapshot(
    store: &dyn InstrumentStore,
    publisher: &dyn DocumentPublisher,
    target: &SnapshotTarget,
) -> Result<PublishOutcome> {
    let records = store.list_public()?;
    let content = serde_json::to_value(&records)?;
    let path = target.path();

    let outcome = match push(publisher, target, &path, content).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Failed to publish {}: {}", path, e);
            return Ok(PublishOutcome::Failed {
                message: e.to_string(),
            });
        }
    };

    match outcome {
        PublishOutcome::Created => info!("Created {} with {} records", path, records.len()),
        PublishOutcome::Unchanged => info!("No changes detected in {}.json", target.name),
        _ => info!("Published {} records to {}", records.len(), path),
    }

    Ok(outcome)
}

async fn push(
    publisher: &dyn DocumentPublisher,
    target: &SnapshotTarget,
    path: &str,
    content: Value,
) -> Result<PublishOutcome> {
    if !publisher.exists(path).await? {
        publisher
            .create(NewDocument {
                name: target.name.clone(),
                project: target.project.clone(),
                folder: target.folder.clone(),
                content,
            })
            .await?;
        return Ok(PublishOutcome::Created);
    }

    let result = publisher.update(path, content).await?;
    Ok(if result.changed {
        PublishOutcome::Updated
    } else {
        PublishOutcome::Unchanged
    })
}
