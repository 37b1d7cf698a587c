use poem_openapi::{
    param::Query,
    payload::{Json, PlainText},
    types::multipart::Upload,
    ApiResponse, Multipart, Object, OpenApi,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::ml::{
    build_alerts, build_series, Alert, AlertFilter, AnalysisError, ForecastRunner, OutputError,
    OutputFiles, RawRow, SpikeRecord, SpikeSeries, SPIKE_FILE,
};

pub struct MlApi {
    runner: Arc<ForecastRunner>,
    outputs: OutputFiles,
}

impl MlApi {
    pub fn new(runner: Arc<ForecastRunner>, outputs: OutputFiles) -> Self {
        Self { runner, outputs }
    }
}

#[derive(Debug, Multipart)]
pub struct AnalyzeUpload {
    sales: Option<Upload>,
    inventory: Option<Upload>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Object)]
pub struct AnalysisFailure {
    pub error: String,
    #[oai(skip_serializing_if_is_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[oai(skip_serializing_if_is_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl AnalysisFailure {
    fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            details: None,
            raw: None,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Object)]
pub struct OutputFailure {
    pub message: String,
    #[oai(skip_serializing_if_is_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Object)]
pub struct SpikeRows {
    pub spikes: Vec<RawRow>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Object)]
pub struct AlertFeed {
    pub alerts: Vec<Alert>,
}

#[derive(ApiResponse)]
pub enum AnalyzeResponse {
    /// Script output, passed through untouched
    #[oai(status = 200)]
    Ok(Json<Value>),

    #[oai(status = 400)]
    MissingFiles(Json<AnalysisFailure>),

    #[oai(status = 500)]
    Failed(Json<AnalysisFailure>),

    #[oai(status = 504)]
    TimedOut(Json<AnalysisFailure>),
}

#[derive(ApiResponse)]
pub enum SpikesResponse {
    #[oai(status = 200)]
    Ok(Json<SpikeRows>),

    #[oai(status = 404)]
    NotFound(Json<OutputFailure>),

    #[oai(status = 500)]
    Failed(Json<OutputFailure>),
}

#[derive(ApiResponse)]
pub enum SpikeSeriesResponse {
    #[oai(status = 200)]
    Ok(Json<SpikeSeries>),

    #[oai(status = 404)]
    NotFound(Json<OutputFailure>),

    #[oai(status = 500)]
    Failed(Json<OutputFailure>),
}

#[derive(ApiResponse)]
pub enum AlertsResponse {
    #[oai(status = 200)]
    Ok(Json<AlertFeed>),

    #[oai(status = 404)]
    NotFound(Json<OutputFailure>),

    #[oai(status = 500)]
    Failed(Json<OutputFailure>),
}

/// Splits an output error into (missing, body).
fn output_failure(err: OutputError, missing_message: Option<&str>) -> (bool, OutputFailure) {
    match err {
        OutputError::Missing(file) => (
            true,
            OutputFailure {
                message: missing_message
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} not found", file)),
                error: None,
            },
        ),
        OutputError::Csv { source, .. } => {
            warn!("Failed to parse output CSV: {}", source);
            (
                false,
                OutputFailure {
                    message: "Failed to parse CSV".to_string(),
                    error: Some(source.to_string()),
                },
            )
        }
        OutputError::Io { file, source } => {
            error!("Failed to read output file {}: {}", file, source);
            (
                false,
                OutputFailure {
                    message: format!("Failed to read {}", file),
                    error: Some(source.to_string()),
                },
            )
        }
    }
}

fn analysis_failure(err: AnalysisError) -> AnalyzeResponse {
    match err {
        // The runner has already logged these.
        AnalysisError::Timeout(_) => {
            AnalyzeResponse::TimedOut(Json(AnalysisFailure::new("Python script timed out")))
        }
        AnalysisError::InvalidOutput { raw, .. } => AnalyzeResponse::Failed(Json(AnalysisFailure {
            raw: Some(raw),
            ..AnalysisFailure::new("Output parse error")
        })),
        AnalysisError::Failed { stderr, .. } => AnalyzeResponse::Failed(Json(AnalysisFailure {
            details: Some(stderr),
            ..AnalysisFailure::new("Python script failed")
        })),
        other => {
            error!("Forecast run failed: {}", other);
            AnalyzeResponse::Failed(Json(AnalysisFailure {
                details: Some(other.to_string()),
                ..AnalysisFailure::new("Python script failed")
            }))
        }
    }
}

#[OpenApi]
impl MlApi {
    #[oai(path = "/ml/ping", method = "get")]
    async fn ping(&self) -> PlainText<String> {
        PlainText("ML Route is working".to_string())
    }

    /// Run the forecast script on uploaded sales and inventory CSVs
    #[oai(path = "/ml/analyze", method = "post")]
    async fn analyze(&self, upload: AnalyzeUpload) -> AnalyzeResponse {
        let (sales, inventory) = match (upload.sales, upload.inventory) {
            (Some(sales), Some(inventory)) => (sales, inventory),
            _ => {
                return AnalyzeResponse::MissingFiles(Json(AnalysisFailure::new(
                    "Missing uploaded files.",
                )))
            }
        };

        let sales = match sales.into_vec().await {
            Ok(bytes) => bytes,
            Err(e) => return analysis_failure(AnalysisError::Io(e)),
        };
        let inventory = match inventory.into_vec().await {
            Ok(bytes) => bytes,
            Err(e) => return analysis_failure(AnalysisError::Io(e)),
        };

        match self.runner.analyze_uploads(&sales, &inventory).await {
            Ok(output) => {
                info!("Forecast analysis completed");
                AnalyzeResponse::Ok(Json(output))
            }
            Err(e) => analysis_failure(e),
        }
    }

    /// Rows of the detected spike file, as written
    #[oai(path = "/ml/spikes", method = "get")]
    async fn spikes(&self) -> SpikesResponse {
        match self.outputs.raw_rows(SPIKE_FILE).await {
            Ok(spikes) => SpikesResponse::Ok(Json(SpikeRows { spikes })),
            Err(e) => match output_failure(e, Some("Spike file not found")) {
                (true, body) => SpikesResponse::NotFound(Json(body)),
                (false, body) => SpikesResponse::Failed(Json(body)),
            },
        }
    }

    #[oai(path = "/ml/spike-series", method = "get")]
    async fn spike_series(&self, product: Query<Option<String>>) -> SpikeSeriesResponse {
        match self.outputs.spikes().await {
            Ok(records) => {
                SpikeSeriesResponse::Ok(Json(build_series(records, product.0.as_deref())))
            }
            Err(e) => match output_failure(e, Some("Spike file not found")) {
                (true, body) => SpikeSeriesResponse::NotFound(Json(body)),
                (false, body) => SpikeSeriesResponse::Failed(Json(body)),
            },
        }
    }

    /// Prioritized alert feed built from the latest forecast outputs
    #[oai(path = "/ml/alerts", method = "get")]
    async fn alerts(
        &self,
        product: Query<Option<String>>,
        #[oai(name = "type")] kind: Query<Option<String>>,
        dismissed: Query<Option<String>>,
    ) -> AlertsResponse {
        let feed = async {
            let forecasts = self.outputs.forecasts().await?;
            let spike_rows = self.outputs.raw_rows(SPIKE_FILE).await?;
            let suggestions = self.outputs.suggestions().await?;

            let spikes: Vec<SpikeRecord> = spike_rows.iter().map(SpikeRecord::from_row).collect();
            let raw_surges: Vec<String> = spike_rows
                .iter()
                .map(|row| row.get("surge_percent").cloned().unwrap_or_default())
                .collect();
            Ok::<_, OutputError>(build_alerts(
                &forecasts,
                &spikes,
                Some(&raw_surges),
                &suggestions,
            ))
        };

        match feed.await {
            Ok(alerts) => {
                let filter = AlertFilter::new(
                    product.0.as_deref(),
                    kind.0.as_deref(),
                    dismissed.0.as_deref(),
                );
                AlertsResponse::Ok(Json(AlertFeed {
                    alerts: filter.apply(alerts),
                }))
            }
            Err(e) => match output_failure(e, None) {
                (true, body) => AlertsResponse::NotFound(Json(body)),
                (false, body) => AlertsResponse::Failed(Json(body)),
            },
        }
    }
}
