//! Relation resolution — page identifiers to human-readable titles.
//!
//! Identifiers belonging to one property resolve sequentially; parallelism
//! lives one level up, across tasks. Both caches are consulted before the
//! network is.

use serde_json::Value;

use prazo_core::context::SyncContext;
use prazo_core::error::Result;

use crate::client::NotionClient;
use crate::props;

/// Sentinel for a relation property with no references (and for the case
/// where every reference failed to resolve). Distinct from a partial
/// result, where failed identifiers are silently dropped.
pub const NO_RELATION: &str = "Nenhuma relação encontrada";

/// Title property of the referenced pages.
const TITLE_PROP: &str = "Name";

/// Resolve a relation property into a `", "`-joined list of titles.
pub async fn resolve_relation(
    client: &NotionClient,
    ctx: &SyncContext,
    record_props: &Value,
    name: &str,
) -> String {
    let ids = props::relation_ids(record_props, name);
    if ids.is_empty() {
        return NO_RELATION.to_string();
    }

    let mut titles = Vec::with_capacity(ids.len());
    for id in &ids {
        if let Some(cached) = ctx.titles.get(id).and_then(|v| v.as_str().map(String::from)) {
            tracing::debug!("title cache hit for {id}");
            titles.push(cached);
            continue;
        }
        match fetch_page_cached(client, ctx, id).await {
            Ok(page) => {
                let title = props::title(&page["properties"], TITLE_PROP);
                if !title.is_empty() {
                    ctx.titles.insert(id, Value::String(title.clone()));
                    tracing::debug!("title for {id} cached: {title}");
                    titles.push(title);
                }
            }
            Err(e) => {
                tracing::debug!("dropping relation {id} in '{name}': {e}");
            }
        }
    }

    if titles.is_empty() {
        NO_RELATION.to_string()
    } else {
        titles.join(", ")
    }
}

/// Fetch a page, going through the page cache first.
async fn fetch_page_cached(client: &NotionClient, ctx: &SyncContext, id: &str) -> Result<Value> {
    if let Some(page) = ctx.pages.get(id) {
        tracing::debug!("page cache hit for {id}");
        return Ok(page);
    }
    let page = client.fetch_page(id).await?;
    ctx.pages.insert(id, page.clone());
    Ok(page)
}
