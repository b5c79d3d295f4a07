// file: src/sources/mod.rs
// description: patent source abstraction and paged fetching
// reference: https://docs.rs/futures/latest/futures/stream/fn.try_unfold.html

pub mod google;
pub mod http;
pub mod metadata_api;
pub mod patterns;
pub mod uspto;

use crate::config::{Config, SourceConfig};
use crate::error::Result;
use crate::models::{PatentDetails, PatentRecord, SearchQuery, SourceKind};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub use google::GooglePatentsSource;
pub use metadata_api::MetadataApiSource;
pub use uspto::UsptoPatftSource;

/// One response page from a source.
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
    pub records: Vec<PatentRecord>,
    pub has_more: bool,
}

impl SourcePage {
    pub fn last(records: Vec<PatentRecord>) -> Self {
        Self {
            records,
            has_more: false,
        }
    }
}

#[async_trait]
pub trait PatentSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    fn settings(&self) -> &SourceConfig;

    /// Fetches a single 1-based result page for the query.
    async fn fetch_page(&self, query: &SearchQuery, page: usize) -> Result<SourcePage>;
}

/// Looks up full patent details for records found by a search.
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn fetch_details(&self, patent_number: &str) -> Result<PatentDetails>;
}

struct PageCursor {
    page: usize,
    remaining: usize,
    done: bool,
}

/// Lazily pages through a source's results for one query, yielding one
/// batch of records per response. Stops at the source's `max_pages`, at
/// `max_results` records, or when the source reports no further pages.
pub fn fetch_for_query<'a>(
    source: &'a dyn PatentSource,
    query: &'a SearchQuery,
) -> BoxStream<'a, Result<Vec<PatentRecord>>> {
    let settings = source.settings();
    let max_pages = settings.max_pages.max(1);
    let delay = Duration::from_millis(settings.request_delay_ms);

    let cursor = PageCursor {
        page: 1,
        remaining: settings.max_results,
        done: false,
    };

    stream::try_unfold(cursor, move |cursor| {
        next_page(source, query, cursor, max_pages, delay)
    })
    .boxed()
}

async fn next_page(
    source: &dyn PatentSource,
    query: &SearchQuery,
    cursor: PageCursor,
    max_pages: usize,
    delay: Duration,
) -> Result<Option<(Vec<PatentRecord>, PageCursor)>> {
    if cursor.done || cursor.remaining == 0 || cursor.page > max_pages {
        return Ok(None);
    }

    if cursor.page > 1 && !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    debug!(
        "Fetching page {} of '{}' from {}",
        cursor.page,
        query,
        source.kind()
    );

    let page = source.fetch_page(query, cursor.page).await?;
    let mut records = page.records;
    records.truncate(cursor.remaining);
    for record in &mut records {
        record
            .matched_query
            .get_or_insert_with(|| query.text.clone());
    }

    let next = PageCursor {
        page: cursor.page + 1,
        remaining: cursor.remaining - records.len(),
        done: !page.has_more || records.is_empty(),
    };

    Ok(Some((records, next)))
}

/// Builds every enabled source from configuration, in summary-key order.
pub fn build_sources(config: &Config, client: &Client) -> Vec<Arc<dyn PatentSource>> {
    config
        .sources
        .enabled()
        .map(|(kind, settings)| -> Arc<dyn PatentSource> {
            match kind {
                SourceKind::GooglePatents => {
                    Arc::new(GooglePatentsSource::new(client.clone(), settings.clone()))
                }
                SourceKind::UsptoPatft => {
                    Arc::new(UsptoPatftSource::new(client.clone(), settings.clone()))
                }
                SourceKind::MetadataApi => {
                    Arc::new(MetadataApiSource::new(client.clone(), settings.clone()))
                }
            }
        })
        .collect()
}

/// Detail enrichment always reads Google Patents pages, whether or not
/// Google is enabled as a search source.
pub fn build_detail_fetcher(config: &Config, client: &Client) -> Option<Arc<dyn DetailFetcher>> {
    if !config.pipeline.fetch_details {
        return None;
    }

    Some(Arc::new(GooglePatentsSource::new(
        client.clone(),
        config.sources.google_patents.clone(),
    )))
}
