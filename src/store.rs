//! The subscriber list, persisted as a JSON array in a single flat file.
//!
//! The file is the only source of truth: every operation reads it from disk again.
//! All access goes through a `SubscriberStore`, which serializes readers and writers
//! behind an async mutex. A save writes a temp file next to the target and renames it over.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, info};

use crate::web::types::ValidEmail;

// ###################################
// ->   STRUCTS
// ###################################
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberRecord {
    pub email: String,
    /// RFC 3339 timestamp of the subscription.
    pub created_at: String,
}

impl SubscriberRecord {
    pub fn new(email: &ValidEmail) -> Self {
        SubscriberRecord {
            email: email.to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug)]
pub struct SubscriberStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SubscriberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SubscriberStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A consistent snapshot of all subscribers.
    pub async fn subscribers(&self) -> StoreResult<Vec<SubscriberRecord>> {
        let _guard = self.lock.lock().await;
        load(&self.path).await
    }

    /// Appends a new subscriber unless the address is already stored.
    /// Addresses are compared exactly, `ValidEmail` is already lowercased.
    #[tracing::instrument(name = "Storing subscriber", skip_all, fields(email = %email))]
    pub async fn subscribe(&self, email: &ValidEmail) -> StoreResult<SubscriberRecord> {
        let _guard = self.lock.lock().await;

        let mut records = load(&self.path).await?;
        debug!("{} subscribers on file", records.len());

        if let Some(existing) = records.iter().find(|rec| rec.email == email.as_ref()) {
            return Err(StoreError::Conflict(existing.clone()));
        }

        let record = SubscriberRecord::new(email);
        records.push(record.clone());
        save(&self.path, &records).await?;

        info!("New subscriber succesfully added to the list.");
        Ok(record)
    }
}

// ###################################
// ->   FILE ACCESS
// ###################################
/// Reads the subscriber list. A missing file is created holding `[]`.
pub async fn load(path: impl AsRef<Path>) -> StoreResult<Vec<SubscriberRecord>> {
    let path = path.as_ref();

    match fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(er) if er.kind() == ErrorKind::NotFound => {
            create_empty(path).await?;
            Ok(Vec::new())
        }
        Err(er) => Err(er.into()),
    }
}

/// Replaces the file contents with `records`.
pub async fn save(path: impl AsRef<Path>, records: &[SubscriberRecord]) -> StoreResult<()> {
    let path = path.as_ref();
    let bytes = serde_json::to_vec(records).map_err(StoreError::Encode)?;

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let mut file = fs::File::create(&tmp_path).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    fs::rename(&tmp_path, path).await?;

    Ok(())
}

async fn create_empty(path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let created = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await;

    match created {
        Ok(mut file) => {
            file.write_all(b"[]").await?;
            file.sync_all().await?;
            info!("Created file '{}' with an empty array.", path.display());
            Ok(())
        }
        // Someone else created it in the meantime, keep theirs.
        Err(er) if er.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(er) => Err(er.into()),
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type StoreResult<T> = core::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Email '{}' already exists from '{}'.", .0.email, .0.created_at)]
    Conflict(SubscriberRecord),

    #[error("subscriber file io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed subscriber file: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to encode subscribers: {0}")]
    Encode(serde_json::Error),
}
