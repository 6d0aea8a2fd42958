// The export collaborator: appends result rows to a spreadsheet through a
// thin web-app proxy (one POST per row, no business logic on the other side).

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{json, Value as JSValue};
use snafu::prelude::*;

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use persona_scoring::QuizResult;

use crate::quiz::{ExportHttpSnafu, ExportRejectedSnafu, QuizCliResult};

/// Receives one appended row per completed questionnaire. The scoring paths
/// depend on this trait rather than on the HTTP client, so tests can
/// substitute an in-memory sink.
pub trait RowSink {
    fn append_row(&mut self, result: &QuizResult) -> QuizCliResult<()>;
}

/// The 13-column row layout expected by the spreadsheet proxy: submission
/// time, identity, the axis split, the six persona scores, completion time.
/// Missing persona columns are filled with zero.
pub fn result_to_row(result: &QuizResult, sent_at: DateTime<Utc>) -> Vec<JSValue> {
    let mut row: Vec<JSValue> = vec![
        json!(sent_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        json!(result.user.id),
        json!(result.user.name),
        json!(result.user.team),
        json!(result.leader_percentage),
        json!(result.player_percentage),
    ];
    for key in ["A", "B", "C", "D", "E", "F"] {
        row.push(json!(result.category_scores.get(key).copied().unwrap_or(0)));
    }
    row.push(json!(result
        .completed_at
        .to_rfc3339_opts(SecondsFormat::Secs, true)));
    row
}

#[derive(Debug, Clone, Deserialize)]
struct AppendResponse {
    success: bool,
    error: Option<String>,
}

/// Appends rows through the configured web-app endpoint.
///
/// Explicitly constructed and handed to the call sites that need it; there
/// is no ambient instance.
pub struct SheetExporter {
    url: String,
    client: reqwest::blocking::Client,
}

impl SheetExporter {
    pub fn new(url: &str) -> QuizCliResult<SheetExporter> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context(ExportHttpSnafu { url })?;
        Ok(SheetExporter {
            url: url.to_string(),
            client,
        })
    }

    /// One GET against the endpoint, logged and never fatal. The append path
    /// raises its own errors.
    pub fn health_check(&self) -> bool {
        match self.client.get(&self.url).send() {
            Ok(resp) if resp.status().is_success() => {
                info!("health check: endpoint {} is up", self.url);
                true
            }
            Ok(resp) => {
                warn!(
                    "health check: endpoint {} answered {}",
                    self.url,
                    resp.status()
                );
                false
            }
            Err(e) => {
                warn!("health check: endpoint {} unreachable: {}", self.url, e);
                false
            }
        }
    }
}

impl RowSink for SheetExporter {
    fn append_row(&mut self, result: &QuizResult) -> QuizCliResult<()> {
        let payload = json!({
            "action": "appendRow",
            "data": result_to_row(result, Utc::now()),
        });
        debug!("append_row: sending {} to {}", payload, self.url);
        let resp = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .context(ExportHttpSnafu {
                url: self.url.clone(),
            })?;
        let status = resp.status();
        ensure!(
            status.is_success(),
            ExportRejectedSnafu {
                url: self.url.clone(),
                message: format!("HTTP status {}", status),
            }
        );
        let body: AppendResponse = resp.json().context(ExportHttpSnafu {
            url: self.url.clone(),
        })?;
        ensure!(
            body.success,
            ExportRejectedSnafu {
                url: self.url.clone(),
                message: body.error.unwrap_or_else(|| "append rejected".to_string()),
            }
        );
        info!("append_row: row appended for id {}", result.user.id);
        Ok(())
    }
}

/// Test double collecting the results instead of sending them out.
#[cfg(test)]
pub struct MemorySink {
    pub rows: Vec<QuizResult>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink { rows: Vec::new() }
    }
}

#[cfg(test)]
impl RowSink for MemorySink {
    fn append_row(&mut self, result: &QuizResult) -> QuizCliResult<()> {
        self.rows.push(result.clone());
        Ok(())
    }
}
