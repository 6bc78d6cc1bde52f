use std::num::NonZeroUsize;
use std::time::Duration;

use serde_json::Value;
use tokio::time::{Instant, sleep, timeout};
use tracing::{info, warn};

use crate::error::{AssistantError, BatchError};
use crate::models::batch::{Batch, DEFAULT_BATCH_SIZE, Row, batch_rows, placeholder_entry};
use crate::models::event::EVENT_FIELDS;
use crate::service::assistant_service::AssistantClient;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub batch_size: NonZeroUsize,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Every element of the parsed array.
    Parsed(Vec<Value>),
    /// The response was not a JSON array; carries the raw text.
    Unparsed(String),
    /// Failure, timeout or transport error; carries the placeholder text.
    Failed(String),
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NormalizeReport {
    pub results: Vec<Value>,
    pub batches: usize,
    pub completed: usize,
    pub placeholders: usize,
}

impl NormalizeReport {
    fn record(&mut self, batch: usize, outcome: BatchOutcome) {
        self.batches += 1;
        match outcome {
            BatchOutcome::Parsed(items) => {
                self.completed += 1;
                self.results.extend(items);
            }
            BatchOutcome::Unparsed(raw) => {
                self.completed += 1;
                self.placeholders += 1;
                self.results.push(placeholder_entry(batch, &raw));
            }
            BatchOutcome::Failed(reason) => {
                self.placeholders += 1;
                self.results.push(placeholder_entry(batch, &reason));
            }
        }
    }
}

pub fn build_batch_prompt(batch: &Batch) -> String {
    let rows = serde_json::to_string_pretty(&batch.rows).unwrap_or_else(|_| "[]".to_string());
    format!(
        "\nBatch #{number}: Process the following tech events and return a JSON list where each event has: {fields}.\n\
         Respond only in strict JSON array format.\n\
         \n\
         Here is the data:\n{rows}",
        number = batch.number,
        fields = EVENT_FIELDS.join(", "),
        rows = rows,
    )
}

/// Sends every batch, in order, over one shared thread. Only thread creation
/// can fail the job; each batch degrades to a placeholder instead.
pub async fn run_normalization<C: AssistantClient + ?Sized>(
    client: &C,
    rows: Vec<Row>,
    options: &NormalizeOptions,
) -> Result<NormalizeReport, AssistantError> {
    let thread_id = client.create_thread().await?;
    info!(thread_id = %thread_id, "assistant thread created");

    let mut report = NormalizeReport::default();
    for batch in batch_rows(rows, options.batch_size) {
        info!(batch = batch.number, events = batch.rows.len(), "processing batch");
        let outcome = process_batch(client, &thread_id, &batch, options).await;
        report.record(batch.number, outcome);
    }

    info!(
        batches = report.batches,
        completed = report.completed,
        placeholders = report.placeholders,
        entries = report.results.len(),
        "normalization finished"
    );
    Ok(report)
}

pub async fn process_batch<C: AssistantClient + ?Sized>(
    client: &C,
    thread_id: &str,
    batch: &Batch,
    options: &NormalizeOptions,
) -> BatchOutcome {
    let response = match send_batch(client, thread_id, batch, options).await {
        Ok(response) => response,
        Err(err) => {
            warn!(batch = batch.number, error = %err, "batch failed");
            return BatchOutcome::Failed(err.placeholder_text());
        }
    };
    interpret_response(batch.number, response)
}

pub fn interpret_response(batch: usize, response: String) -> BatchOutcome {
    match serde_json::from_str::<Value>(&response) {
        Ok(Value::Array(items)) => BatchOutcome::Parsed(items),
        _ => {
            warn!(batch, "batch returned invalid JSON, saving raw response");
            BatchOutcome::Unparsed(response)
        }
    }
}

async fn send_batch<C: AssistantClient + ?Sized>(
    client: &C,
    thread_id: &str,
    batch: &Batch,
    options: &NormalizeOptions,
) -> Result<String, BatchError> {
    client
        .add_user_message(thread_id, &build_batch_prompt(batch))
        .await?;
    let run_id = client.start_run(thread_id).await?;

    let started = Instant::now();
    match timeout(
        options.timeout,
        wait_for_completion(client, thread_id, &run_id, batch.number, options.poll_interval),
    )
    .await
    {
        Ok(result) => result?,
        // Run is abandoned remotely, not cancelled.
        Err(_) => {
            return Err(BatchError::TimedOut {
                batch: batch.number,
                seconds: options.timeout.as_secs(),
            });
        }
    }
    info!(
        batch = batch.number,
        elapsed_secs = started.elapsed().as_secs(),
        "batch completed"
    );

    Ok(client.latest_message(thread_id).await?)
}

async fn wait_for_completion<C: AssistantClient + ?Sized>(
    client: &C,
    thread_id: &str,
    run_id: &str,
    batch: usize,
    poll_interval: Duration,
) -> Result<(), BatchError> {
    loop {
        let status = client.run_status(thread_id, run_id).await?;
        if status.is_completed() {
            return Ok(());
        }
        if status.is_failure() {
            return Err(BatchError::Failed {
                batch,
                status: status.to_string(),
            });
        }
        sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_names_batch_fields_and_rows() {
        let mut row = Row::new();
        row.insert("Event".to_string(), json!("RustConf"));
        let prompt = build_batch_prompt(&Batch {
            number: 3,
            rows: vec![row],
        });
        assert!(prompt.contains("Batch #3:"));
        assert!(prompt.contains("Respond only in strict JSON array format."));
        assert!(prompt.contains("event_name, location, date"));
        assert!(prompt.ends_with("[\n  {\n    \"Event\": \"RustConf\"\n  }\n]"));
    }

    #[test]
    fn arrays_are_parsed_and_everything_else_is_raw() {
        assert_eq!(
            interpret_response(1, "[{\"a\":1},{\"a\":2}]".to_string()),
            BatchOutcome::Parsed(vec![json!({"a": 1}), json!({"a": 2})])
        );
        assert_eq!(
            interpret_response(2, "{\"a\":1}".to_string()),
            BatchOutcome::Unparsed("{\"a\":1}".to_string())
        );
        assert_eq!(
            interpret_response(3, "```json\n[]\n```".to_string()),
            BatchOutcome::Unparsed("```json\n[]\n```".to_string())
        );
    }

    #[test]
    fn report_counts_outcomes() {
        let mut report = NormalizeReport::default();
        report.record(1, BatchOutcome::Parsed(vec![json!(1), json!(2)]));
        report.record(2, BatchOutcome::Unparsed("oops".to_string()));
        report.record(3, BatchOutcome::Failed("Timed out".to_string()));
        assert_eq!(report.batches, 3);
        assert_eq!(report.completed, 2);
        assert_eq!(report.placeholders, 2);
        assert_eq!(
            report.results,
            vec![
                json!(1),
                json!(2),
                json!({"batch": 2, "raw_response": "oops"}),
                json!({"batch": 3, "raw_response": "Timed out"}),
            ]
        );
    }
}
