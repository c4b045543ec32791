//! JSON file repositories for both record books.
//!
//! # Responsibility
//! - Define load/save contracts the services persist through.
//! - Keep file handling and wire shapes out of the service layer.
//!
//! # Invariants
//! - A missing data file loads as an empty book, not an error.
//! - Documents are fully encoded in memory before the file is opened for
//!   writing, so an encoding failure leaves the previous file intact.
//! - Read paths reject invalid persisted state (duplicate ids, dangling
//!   references, failed entity validation) instead of masking it.

pub mod crm_file;
pub mod store_file;

use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for data file persistence.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("failed to access data file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in data file `{}`: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

/// Reads and decodes `path`, returning `None` when the file does not exist.
fn read_document<T: DeserializeOwned>(path: &Path, module: &str) -> RepoResult<Option<T>> {
    let started_at = Instant::now();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                "event=data_load module={module} status=ok outcome=missing_file path={}",
                path.display()
            );
            return Ok(None);
        }
        Err(err) => {
            error!(
                "event=data_load module={module} status=error error_code=read_failed path={} error={err}",
                path.display()
            );
            return Err(RepoError::Io {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    let document = serde_json::from_str(&raw).map_err(|err| {
        error!(
            "event=data_load module={module} status=error error_code=decode_failed path={} error={err}",
            path.display()
        );
        RepoError::Json {
            path: path.to_path_buf(),
            source: err,
        }
    })?;

    info!(
        "event=data_load module={module} status=ok path={} bytes={} duration_ms={}",
        path.display(),
        raw.len(),
        started_at.elapsed().as_millis()
    );
    Ok(Some(document))
}

/// Encodes `document` as indented UTF-8 JSON and writes it to `path`.
fn write_document<T: Serialize + ?Sized>(path: &Path, document: &T, module: &str) -> RepoResult<()> {
    let started_at = Instant::now();
    let encoded = serde_json::to_string_pretty(document).map_err(|err| RepoError::Json {
        path: path.to_path_buf(),
        source: err,
    })?;

    if let Err(err) = std::fs::write(path, encoded.as_bytes()) {
        error!(
            "event=data_save module={module} status=error error_code=write_failed path={} error={err}",
            path.display()
        );
        return Err(RepoError::Io {
            path: path.to_path_buf(),
            source: err,
        });
    }

    info!(
        "event=data_save module={module} status=ok path={} bytes={} duration_ms={}",
        path.display(),
        encoded.len(),
        started_at.elapsed().as_millis()
    );
    Ok(())
}
