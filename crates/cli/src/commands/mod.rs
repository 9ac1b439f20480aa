//! Command implementations and their shared plumbing.

pub mod report;
pub mod validate;

use std::io::Write;
use std::path::{Path, PathBuf};

use bazaar_client::api::{self, ApiResponse};
use bazaar_client::{ApiError, ClientConfig, ConfigError, HttpTransport, SyncCoordinator, SyncError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("could not write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("{0} field(s) failed validation")]
    Invalid(usize),
}

/// Where and how results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as pretty JSON.
    pub fn json(value: &impl Serialize) -> Result<(), CliError> {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, value).map_err(std::io::Error::from)?;
        writeln!(stdout)?;
        Ok(())
    }

    /// Print preformatted lines.
    pub fn lines(lines: &[String]) -> Result<(), CliError> {
        let mut stdout = std::io::stdout().lock();
        for line in lines {
            writeln!(stdout, "{line}")?;
        }
        Ok(())
    }
}

/// Read a JSON document from disk.
pub fn read_json(path: &Path) -> Result<serde_json::Value, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| CliError::Parse {
        path: path.to_owned(),
        message: e.to_string(),
    })
}

/// Read a list from disk, either bare or wrapped in an API envelope.
pub fn load_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CliError> {
    let body = read_json(path)?;
    let items: Vec<T> =
        api::decode(ApiResponse::new(200, body)).map_err(|e| CliError::Parse {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
    tracing::debug!(path = %path.display(), count = items.len(), "loaded from file");
    Ok(items)
}

/// A coordinator for the API configured in the environment.
pub fn connect() -> Result<SyncCoordinator<HttpTransport>, CliError> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(?config, "connecting");
    Ok(SyncCoordinator::from_config(&config)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::models::Product;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bazaar-cli-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_list_accepts_bare_and_enveloped() {
        let product =
            r#"{"_id": "p1", "title": "Jute tote", "category": "accessories", "price": 450}"#;
        let bare = temp_file("bare.json", &format!("[{product}]"));
        let wrapped = temp_file(
            "wrapped.json",
            &format!(r#"{{"success": true, "data": [{product}]}}"#),
        );

        let from_bare: Vec<Product> = load_list(&bare).unwrap();
        let from_wrapped: Vec<Product> = load_list(&wrapped).unwrap();
        assert_eq!(from_bare, from_wrapped);
        assert_eq!(from_bare.len(), 1);
    }

    #[test]
    fn test_load_list_reports_path() {
        let path = temp_file("broken.json", "{not json");
        let err = load_list::<Product>(&path).unwrap_err();
        assert!(matches!(err, CliError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
