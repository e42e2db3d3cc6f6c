//! Content-addressed blob storage for model binaries.
//!
//! `storage_key = sha256(model_id) + ".model"` is a pure function of the
//! model id, so repeated stores of the same id land on the same file —
//! callers (the registry layer) are responsible for guarding against
//! unintentional overwrite. Writes are atomic: bytes land in a `.tmp`
//! sibling first and are renamed into place, so a reader never observes a
//! partially written file.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("blob exceeds the configured size cap of {cap} bytes (got {got})")]
    TooLarge { cap: u64, got: u64 },
    #[error("storage key '{0}' not found")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(String),
}

/// Result of a successful `store` call.
#[derive(Debug, Clone)]
pub struct StoreReceipt {
    pub storage_key: String,
    pub checksum: String,
    pub size: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    pub file_count: u64,
    pub total_bytes: u64,
    pub max_model_size: u64,
}

/// Compute the deterministic on-disk filename for a model id.
pub fn storage_key_for(model_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model_id.as_bytes());
    format!("{}.model", hex::encode(hasher.finalize()))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Parse a human-readable size string (`"1GB"`, `"500MB"`, `"2048"`) into
/// bytes. Per the spec's documented (surprising) behavior, an unparseable
/// string does not fail — it silently defaults to 1 GiB. This is flagged
/// as a reconsideration candidate in DESIGN.md, not corrected, since the
/// spec pins it as current behavior.
pub fn parse_size(input: &str) -> u64 {
    const DEFAULT: u64 = 1024 * 1024 * 1024;
    let s = input.trim().to_uppercase();
    let (digits, unit): (String, String) = s.chars().partition(|c| c.is_ascii_digit() || *c == '.');
    let Ok(value) = digits.parse::<f64>() else {
        return DEFAULT;
    };
    let multiplier: f64 = match unit.as_str() {
        "" | "B" => 1.0,
        "KB" | "K" => 1024.0,
        "MB" | "M" => 1024.0 * 1024.0,
        "GB" | "G" => 1024.0 * 1024.0 * 1024.0,
        "TB" | "T" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return DEFAULT,
    };
    (value * multiplier) as u64
}

/// Filesystem-backed content-addressed model store.
pub struct ModelStore {
    root: PathBuf,
    max_model_size: u64,
}

impl ModelStore {
    /// Create a store rooted at `root`, creating the directory if absent.
    pub async fn new(root: impl Into<PathBuf>, max_model_size: u64) -> std::io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root, max_model_size })
    }

    fn path_for(&self, storage_key: &str) -> PathBuf {
        self.root.join(storage_key)
    }

    /// Store `bytes` under the deterministic key derived from `model_id`.
    pub async fn store(&self, model_id: &str, bytes: &[u8]) -> Result<StoreReceipt, StoreError> {
        let size = bytes.len() as u64;
        if size > self.max_model_size {
            return Err(StoreError::TooLarge {
                cap: self.max_model_size,
                got: size,
            });
        }

        let storage_key = storage_key_for(model_id);
        let checksum = sha256_hex(bytes);
        let final_path = self.path_for(&storage_key);
        let tmp_path = self.root.join(format!("{storage_key}.tmp-{}", uuid::Uuid::new_v4()));

        tokio::fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp_path, &final_path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        Ok(StoreReceipt {
            storage_key,
            checksum,
            size,
        })
    }

    /// Fetch the raw bytes for a storage key.
    pub async fn fetch(&self, storage_key: &str) -> Result<Vec<u8>, StoreError> {
        tokio::fs::read(self.path_for(storage_key))
            .await
            .map_err(|_| StoreError::NotFound(storage_key.to_string()))
    }

    /// Delete a blob. Returns `false` if it did not exist.
    pub async fn delete(&self, storage_key: &str) -> bool {
        tokio::fs::remove_file(self.path_for(storage_key)).await.is_ok()
    }

    /// Recompute the checksum of the stored blob and compare to `expected`.
    pub async fn verify(&self, storage_key: &str, expected: &str) -> Result<bool, StoreError> {
        let bytes = self.fetch(storage_key).await?;
        Ok(sha256_hex(&bytes) == expected)
    }

    /// Aggregate stats over every blob currently on disk.
    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut file_count = 0u64;
        let mut total_bytes = 0u64;
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            if let Ok(meta) = entry.metadata().await {
                if meta.is_file() && !entry.file_name().to_string_lossy().contains(".tmp-") {
                    file_count += 1;
                    total_bytes += meta.len();
                }
            }
        }
        Ok(StoreStats {
            file_count,
            total_bytes,
            max_model_size: self.max_model_size,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
