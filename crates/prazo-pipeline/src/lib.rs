//! # prazo pipeline
//!
//! Turns the raw paginated result set into the sorted tabular collection:
//! partition into fixed-size batches, fan batches out to a bounded worker
//! pool (each worker extracts fields and resolves relations), merge the
//! outputs in completion order, and sort with missing day counts last.

pub mod record;

pub use record::TaskRecord;

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use prazo_core::context::SyncContext;
use prazo_notion::client::NotionClient;
use prazo_notion::{props, relations};

/// Extract one Notion record into a [`TaskRecord`], resolving its relation
/// properties. Malformed properties degrade to defaults, never errors.
pub async fn process_record(client: &NotionClient, ctx: &SyncContext, record: &Value) -> TaskRecord {
    let record_props = &record["properties"];
    let due_date = props::date(record_props, "Data de Entrega");
    TaskRecord {
        professor: props::title(record_props, "Professor"),
        done: props::checkbox(record_props, "Feito?").to_string(),
        kind: props::select(record_props, "Tipo"),
        stage: props::select(record_props, "Estágio"),
        subject: relations::resolve_relation(client, ctx, record_props, "Matéria").await,
        days_remaining: props::days_remaining(&due_date, ctx.today),
        description: props::rich_text(record_props, "Descrição"),
        topics: relations::resolve_relation(client, ctx, record_props, "Tópicos").await,
        due_date,
    }
}

/// Split the full result set into contiguous batches of `size`.
pub fn partition(results: Vec<Value>, size: usize) -> Vec<Vec<Value>> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(results.len().div_ceil(size));
    let mut current = Vec::with_capacity(size);
    for result in results {
        current.push(result);
        if current.len() == size {
            batches.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Process every record through the bounded worker pool and return the
/// merged collection sorted by days remaining (missing values last).
///
/// Batches complete in any order; ordering comes from the final sort.
pub async fn process_all(
    client: Arc<NotionClient>,
    ctx: Arc<SyncContext>,
    results: Vec<Value>,
) -> Vec<TaskRecord> {
    let total = results.len();
    let batches = partition(results, ctx.config.batch_size);
    let semaphore = Arc::new(Semaphore::new(ctx.config.workers.max(1)));

    let mut set = JoinSet::new();
    for batch in batches {
        let client = client.clone();
        let ctx = ctx.clone();
        let semaphore = semaphore.clone();
        set.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return Vec::new();
            };
            let mut rows = Vec::with_capacity(batch.len());
            for record in &batch {
                rows.push(process_record(&client, &ctx, record).await);
            }
            rows
        });
    }

    let mut all = Vec::with_capacity(total);
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(rows) => all.extend(rows),
            Err(e) => tracing::error!("batch worker failed: {e}"),
        }
    }

    sort_by_days_remaining(&mut all);
    all
}

/// Ascending by days remaining; records without a day count go last and
/// are never compared against concrete values.
pub fn sort_by_days_remaining(rows: &mut [TaskRecord]) {
    rows.sort_by(|a, b| match (a.days_remaining, b.days_remaining) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use prazo_core::config::Config;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_ctx(dir: &std::path::Path) -> SyncContext {
        let config = Config {
            notion_api_key: "key".into(),
            notion_database_id: "db".into(),
            telegram_bot_token: "token".into(),
            telegram_chat_id: "1".into(),
            telegram_chat_id_wpp: "2".into(),
            cache_dir: dir.to_path_buf(),
            log_dir: dir.join("logs"),
            page_size: 100,
            batch_size: 2,
            workers: 4,
            cache_max_age_days: 3,
            log_max_age_days: 7,
            reminder_window_days: 7,
        };
        SyncContext::new(config, chrono::NaiveDate::from_ymd_opt(2025, 3, 6).unwrap())
    }

    fn row(days: Option<i64>) -> TaskRecord {
        TaskRecord {
            professor: String::new(),
            done: "No".into(),
            kind: String::new(),
            stage: String::new(),
            subject: String::new(),
            due_date: String::new(),
            days_remaining: days,
            description: String::new(),
            topics: String::new(),
        }
    }

    #[test]
    fn test_partition_sizes() {
        let items: Vec<Value> = (0..5).map(|i| json!(i)).collect();
        let batches = partition(items, 2);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition(Vec::new(), 50).is_empty());
    }

    #[test]
    fn test_sort_nulls_last() {
        let mut rows = vec![row(None), row(Some(7)), row(Some(-2)), row(None), row(Some(0))];
        sort_by_days_remaining(&mut rows);
        let days: Vec<Option<i64>> = rows.iter().map(|r| r.days_remaining).collect();
        assert_eq!(days, vec![Some(-2), Some(0), Some(7), None, None]);
    }

    #[tokio::test]
    async fn test_process_record_extracts_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/pages/rel1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {"Name": {"title": [{"plain_text": "Matemática"}]}}
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let ctx = test_ctx(dir.path());
        let client = NotionClient::new("key", "db").with_base_url(&server.uri());

        let record = json!({
            "properties": {
                "Professor": {"title": [{"plain_text": "Silva"}]},
                "Feito?": {"checkbox": false},
                "Tipo": {"select": {"name": "Prova"}},
                "Estágio": {"select": {"name": "1º"}},
                "Matéria": {"relation": [{"id": "rel1"}]},
                "Data de Entrega": {"date": {"start": "2025-03-10"}},
                "Descrição": {"rich_text": [{"text": {"content": "Capítulos 1-3"}}]},
                "Tópicos": {"relation": []}
            }
        });

        let task = process_record(&client, &ctx, &record).await;
        assert_eq!(task.professor, "Silva");
        assert_eq!(task.done, "No");
        assert_eq!(task.kind, "Prova");
        assert_eq!(task.stage, "1º");
        assert_eq!(task.subject, "Matemática");
        assert_eq!(task.due_date, "2025-03-10");
        assert_eq!(task.days_remaining, Some(4));
        assert_eq!(task.description, "Capítulos 1-3");
        assert_eq!(task.topics, prazo_notion::relations::NO_RELATION);
    }

    #[tokio::test]
    async fn test_process_record_malformed_is_all_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_ctx(dir.path());
        let client = NotionClient::new("key", "db").with_base_url("http://127.0.0.1:1");

        let task = process_record(&client, &ctx, &json!({})).await;
        assert_eq!(task.professor, "");
        assert_eq!(task.done, "No");
        assert_eq!(task.days_remaining, None);
        assert_eq!(task.subject, prazo_notion::relations::NO_RELATION);
    }

    #[tokio::test]
    async fn test_process_all_merges_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Arc::new(test_ctx(dir.path()));
        let client = Arc::new(NotionClient::new("key", "db").with_base_url("http://127.0.0.1:1"));

        // Five records across three batches (batch_size = 2), mixed dates.
        let dates = ["2025-03-13", "2025-03-07", "", "2025-03-09", "2025-03-06"];
        let results: Vec<Value> = dates
            .iter()
            .map(|d| {
                if d.is_empty() {
                    json!({"properties": {}})
                } else {
                    json!({"properties": {"Data de Entrega": {"date": {"start": d}}}})
                }
            })
            .collect();

        let rows = process_all(client, ctx, results).await;
        let days: Vec<Option<i64>> = rows.iter().map(|r| r.days_remaining).collect();
        assert_eq!(days, vec![Some(0), Some(1), Some(3), Some(7), None]);
    }
}
