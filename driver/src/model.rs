use std::path::PathBuf;

use eyre::{ensure, Context, Result};

pub const DEFAULT_REPO_ID: &str = "QuantFactory/llama-3-sqlcoder-8b-GGUF";
pub const DEFAULT_FILENAME: &str = "llama-3-sqlcoder-8b.Q4_K_M.gguf";

/// Where the GGUF weights come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelSource {
    /// A `.gguf` file already on disk.
    Local(PathBuf),
    /// A file in a Hugging Face repository, fetched into the hub cache on first use.
    Hub { repo_id: String, filename: String },
}

impl Default for ModelSource {
    fn default() -> Self {
        Self::Hub {
            repo_id: DEFAULT_REPO_ID.to_string(),
            filename: DEFAULT_FILENAME.to_string(),
        }
    }
}

impl ModelSource {
    /// Local path wins; otherwise fall back to the hub, filling in defaults.
    pub fn new(path: Option<PathBuf>, repo_id: Option<String>, filename: Option<String>) -> Self {
        match path {
            Some(path) => Self::Local(path),
            None => Self::Hub {
                repo_id: repo_id
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_REPO_ID.to_string()),
                filename: filename
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            },
        }
    }

    /// Path of the weights on disk, downloading them if needed.
    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            Self::Local(path) => {
                ensure!(path.is_file(), "model file {path:?} does not exist");

                Ok(path.clone())
            }
            Self::Hub { repo_id, filename } => {
                tracing::info!("resolving model {repo_id}/{filename}");

                let api = hf_hub::api::sync::Api::new().wrap_err("failed to create hf-hub api")?;

                let path = api
                    .model(repo_id.clone())
                    .get(filename)
                    .wrap_err_with(|| format!("failed to download {repo_id}/{filename}"))?;

                tracing::info!("model available at {}", path.display());

                Ok(path)
            }
        }
    }
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Hub { repo_id, filename } => write!(f, "{repo_id}/{filename}"),
        }
    }
}
