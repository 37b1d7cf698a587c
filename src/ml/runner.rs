use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::Config;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to start forecast script: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Forecast script exited with status {code:?}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Forecast script did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Forecast script produced invalid JSON: {source}")]
    InvalidOutput {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to stage upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Forecast runner is shut down")]
    Closed,
}

/// An uploaded CSV written to the staging directory. The file is removed when
/// this value is dropped.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub async fn write(dir: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.csv", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&path, bytes).await?;
        debug!("Staged {} bytes at {}", bytes.len(), path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove staged file {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Runs `<interpreter> <script> <sales.csv> <inventory.csv>` and returns the
/// JSON document the script prints.
pub struct ForecastRunner {
    interpreter: String,
    script: PathBuf,
    upload_dir: PathBuf,
    timeout: Duration,
    permits: Semaphore,
}

impl ForecastRunner {
    pub fn new(
        interpreter: impl Into<String>,
        script: impl Into<PathBuf>,
        upload_dir: impl Into<PathBuf>,
        timeout: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            upload_dir: upload_dir.into(),
            timeout,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.python_bin.clone(),
            config.forecast_script.clone(),
            config.upload_dir.clone(),
            config.analysis_timeout,
            config.max_concurrent_analyses,
        )
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Stage both uploads, run the script on them, and clean the staged
    /// files up afterwards.
    pub async fn analyze_uploads(
        &self,
        sales: &[u8],
        inventory: &[u8],
    ) -> Result<Value, AnalysisError> {
        let sales = StagedFile::write(&self.upload_dir, sales).await?;
        let inventory = StagedFile::write(&self.upload_dir, inventory).await?;
        self.run(sales.path(), inventory.path()).await
    }

    pub async fn run(&self, sales: &Path, inventory: &Path) -> Result<Value, AnalysisError> {
        let _permit = self.permits.acquire().await.map_err(|_| AnalysisError::Closed)?;

        info!(
            "Running forecast script {} on {} and {}",
            self.script.display(),
            sales.display(),
            inventory.display()
        );
        let child = Command::new(&self.interpreter)
            .arg(&self.script)
            .arg(sales)
            .arg(inventory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!("Could not start {}: {}", self.interpreter, e);
                AnalysisError::Spawn(e)
            })?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                error!("Forecast script timed out after {:?}", self.timeout);
                return Err(AnalysisError::Timeout(self.timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            error!(
                "Forecast script failed with status {:?}:\n{}",
                output.status.code(),
                stderr
            );
            return Err(AnalysisError::Failed {
                code: output.status.code(),
                stderr,
            });
        }

        if !stderr.trim().is_empty() {
            warn!("Forecast script wrote to stderr:\n{}", stderr);
        }

        serde_json::from_str(stdout.trim()).map_err(|source| {
            error!("Forecast output is not JSON:\n{}", stdout);
            AnalysisError::InvalidOutput {
                raw: stdout,
                source,
            }
        })
    }
}
