//! The run handler.
//!
//! [`Pipeline::run`] performs one extract: scheduled events are pulled from
//! the API, written as the raw table, aggregated, and written as the metrics
//! table. [`handle`] wraps a run and converts its result into the invocation
//! response returned to the trigger. It is the only place errors are
//! recovered.

use serde::Serialize;
use tracing::{error, info, info_span, Instrument};

use calendly_etl_core::{
    EtlError, EtlResult, EventRecord, MetricRecord, OutputLayout, RunTimestamp, aggregate,
};
use calendly_etl_providers::{
    CalendlyClient, CredentialProvider, EventExtractor, RecencyFilter, StorageSink, UploadOutcome,
};

use crate::config::EtlConfig;

/// Body message of a successful run.
pub const SUCCESS_MESSAGE: &str = "Storage bucket successfully updated";

/// One extract run, wired to its API client and storage sink.
#[derive(Debug)]
pub struct Pipeline {
    client: CalendlyClient,
    sink: StorageSink,
    layout: OutputLayout,
    recency_filter: RecencyFilter,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub scheduled_calls: UploadOutcome,
    pub metrics: UploadOutcome,
    pub events: usize,
    pub metric_rows: usize,
}

impl Pipeline {
    /// Creates a pipeline with the pass-through recency filter.
    pub fn new(client: CalendlyClient, sink: StorageSink, layout: OutputLayout) -> Self {
        Self {
            client,
            sink,
            layout,
            recency_filter: RecencyFilter::default(),
        }
    }

    /// Builder method to set the recency filter.
    pub fn with_recency_filter(mut self, filter: RecencyFilter) -> Self {
        self.recency_filter = filter;
        self
    }

    /// Builds a pipeline from configuration. No secret or network access
    /// happens here.
    pub fn from_config(config: &EtlConfig) -> EtlResult<Self> {
        config.validate()?;

        let credentials = CredentialProvider::new(config.secret_store(), &config.secret_name);
        let client = CalendlyClient::new(config.calendly_config()?, credentials)?;
        let sink = StorageSink::new(config.object_store(), &config.bucket);

        Ok(Self::new(client, sink, config.layout()).with_recency_filter(config.recency_filter()?))
    }

    /// Runs one extract, naming both objects after `run_at`.
    ///
    /// Stops at the first failure. An object already written stays written.
    pub async fn run(&self, run_at: RunTimestamp) -> EtlResult<RunSummary> {
        let records: Vec<EventRecord> = EventExtractor::new(&self.client)
            .with_recency_filter(self.recency_filter, run_at.instant())
            .extract_events()
            .await?;

        let scheduled_calls = self
            .sink
            .upload(&records, &self.layout.scheduled_calls_key(&run_at))
            .await?;

        let metrics: Vec<MetricRecord> = aggregate(&records)?;
        let metrics_outcome = self
            .sink
            .upload(&metrics, &self.layout.metrics_key(&run_at))
            .await?;

        Ok(RunSummary {
            scheduled_calls,
            metrics: metrics_outcome,
            events: records.len(),
            metric_rows: metrics.len(),
        })
    }
}

/// Invocation metadata supplied by the trigger.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub request_id: Option<String>,
}

/// Machine-readable failure category and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    pub code: String,
    pub message: String,
}

impl From<&EtlError> for ErrorSummary {
    fn from(err: &EtlError) -> Self {
        Self {
            code: err.code().as_str().to_string(),
            message: err.to_string(),
        }
    }
}

/// Structured result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
}

impl RunOutcome {
    /// Outcome of a completed run.
    pub fn success() -> Self {
        Self {
            status: 200,
            message: SUCCESS_MESSAGE.to_string(),
            error: None,
        }
    }

    /// Outcome of a failed run.
    pub fn failure(err: &EtlError) -> Self {
        Self {
            status: 500,
            message: format!("Error: {}", err),
            error: Some(ErrorSummary::from(err)),
        }
    }

    /// Returns true if the run succeeded.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Response returned to the trigger. The body is the JSON encoding of the
/// outcome message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl From<&RunOutcome> for InvocationResponse {
    fn from(outcome: &RunOutcome) -> Self {
        let body = serde_json::to_string(&outcome.message)
            .unwrap_or_else(|_| format!("\"{}\"", outcome.message));
        Self {
            status_code: outcome.status,
            body,
        }
    }
}

/// Runs the pipeline and reports a structured outcome. Never fails.
///
/// The payload is accepted for interface compatibility and otherwise ignored.
pub async fn invoke(
    pipeline: &Pipeline,
    payload: &serde_json::Value,
    context: &InvocationContext,
    run_at: RunTimestamp,
) -> RunOutcome {
    let span = info_span!(
        "run",
        request_id = context.request_id.as_deref().unwrap_or_default(),
        run_at = %run_at.file_stem(),
    );

    async move {
        info!(payload_fields = payload.as_object().map_or(0, |o| o.len()), "starting run");
        match pipeline.run(run_at).await {
            Ok(summary) => {
                info!(
                    events = summary.events,
                    metric_rows = summary.metric_rows,
                    raw_uploaded = summary.scheduled_calls.is_uploaded(),
                    "run complete"
                );
                RunOutcome::success()
            }
            Err(e) => {
                error!(code = %e.code(), "error processing: {}", e);
                RunOutcome::failure(&e)
            }
        }
    }
    .instrument(span)
    .await
}

/// Runs the pipeline and returns the invocation response.
pub async fn handle(
    pipeline: &Pipeline,
    payload: &serde_json::Value,
    context: &InvocationContext,
    run_at: RunTimestamp,
) -> InvocationResponse {
    let outcome = invoke(pipeline, payload, context, run_at).await;
    InvocationResponse::from(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calendly_etl_core::ErrorCode;

    #[test]
    fn success_response() {
        let response = InvocationResponse::from(&RunOutcome::success());
        insta::assert_json_snapshot!(response, @r#"
        {
          "statusCode": 200,
          "body": "\"Storage bucket successfully updated\""
        }
        "#);
    }

    #[test]
    fn failure_outcome_and_response() {
        let err = EtlError::secret_unavailable("calendly", "not found");
        let outcome = RunOutcome::failure(&err);

        assert!(!outcome.is_success());
        let summary = outcome.error.clone().unwrap();
        assert_eq!(summary.code, ErrorCode::SecretUnavailable.as_str());

        let response = InvocationResponse::from(&outcome);
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, format!("\"Error: {}\"", err));
    }

    #[test]
    fn failure_body_escapes_quotes() {
        let err = EtlError::metrics("event \"E1\" has a malformed start_time");
        let response = InvocationResponse::from(&RunOutcome::failure(&err));
        let decoded: String = serde_json::from_str(&response.body).unwrap();
        assert_eq!(decoded, format!("Error: {}", err));
    }

    #[test]
    fn from_config_rejects_invalid_config() {
        let config = EtlConfig {
            bucket: String::new(),
            ..Default::default()
        };
        let err = Pipeline::from_config(&config).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigurationError);
    }
}
