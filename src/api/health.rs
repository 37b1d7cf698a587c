use poem_openapi::{payload::Json, ApiResponse, Object, OpenApi};
use std::path::PathBuf;

pub struct HealthApi {
    forecast_script: PathBuf,
    output_dir: PathBuf,
}

impl HealthApi {
    pub fn new(forecast_script: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            forecast_script: forecast_script.into(),
            output_dir: output_dir.into(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Object)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub forecast_script_present: bool,
    pub output_dir_present: bool,
}

#[derive(ApiResponse)]
pub enum HealthResponse {
    #[oai(status = 200)]
    Ok(Json<HealthStatus>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<HealthStatus>),
}

#[OpenApi]
impl HealthApi {
    /// Service status and availability of the forecast script
    #[oai(path = "/health", method = "get")]
    async fn health(&self) -> HealthResponse {
        let forecast_script_present = tokio::fs::metadata(&self.forecast_script)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        let output_dir_present = tokio::fs::metadata(&self.output_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);

        let health = HealthStatus {
            status: if forecast_script_present {
                "healthy".to_string()
            } else {
                "degraded".to_string()
            },
            service: "Stockwise".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            forecast_script_present,
            output_dir_present,
        };

        if forecast_script_present {
            HealthResponse::Ok(Json(health))
        } else {
            HealthResponse::ServiceUnavailable(Json(health))
        }
    }
}
