// file: src/sources/uspto.rs
// description: USPTO PatFT boolean search hit-list scraping

use crate::config::SourceConfig;
use crate::error::{PipelineError, Result};
use crate::models::{PatentRecord, SearchQuery, SourceKind};
use crate::sources::http::fetch_body;
use crate::sources::patterns::{ANCHOR, USPTO_PATENT_PARAM};
use crate::sources::{PatentSource, SourcePage};
use crate::utils::Validator;
use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::Html;
use tracing::debug;

const SOURCE: SourceKind = SourceKind::UsptoPatft;

pub struct UsptoPatftSource {
    client: Client,
    settings: SourceConfig,
}

impl UsptoPatftSource {
    pub fn new(client: Client, settings: SourceConfig) -> Self {
        Self { client, settings }
    }

    fn search_params(&self, query: &SearchQuery, page: usize) -> Vec<(&'static str, String)> {
        // abstract text for terms, current CPC class for codes
        let field = if query.is_classification() { "CPCL" } else { "ABST" };
        let mut params: Vec<(&'static str, String)> = vec![
            ("Sect1", "PTO2".to_string()),
            ("Sect2", "HITOFF".to_string()),
            ("p", page.to_string()),
            ("u", "/netahtml/PTO/search-bool.html".to_string()),
            ("r", "0".to_string()),
            ("f", "S".to_string()),
            ("l", self.settings.max_results.min(50).to_string()),
            ("TERM1", query.text.clone()),
            ("FIELD1", field.to_string()),
            ("co1", "AND".to_string()),
            ("TERM2", String::new()),
            ("FIELD2", String::new()),
            ("d", "PTXT".to_string()),
        ];
        params.extend(
            ["s1", "s2", "s3", "s4", "s5", "s6"]
                .into_iter()
                .map(|key| (key, String::new())),
        );
        params
    }
}

#[async_trait]
impl PatentSource for UsptoPatftSource {
    fn kind(&self) -> SourceKind {
        SOURCE
    }

    fn settings(&self) -> &SourceConfig {
        &self.settings
    }

    async fn fetch_page(&self, query: &SearchQuery, page: usize) -> Result<SourcePage> {
        let base = Url::parse(&self.settings.base_url).map_err(|e| {
            PipelineError::Config(format!("Invalid USPTO PatFT base_url: {}", e))
        })?;
        let request = self
            .client
            .get(base.clone())
            .query(&self.search_params(query, page));

        let body = fetch_body(SOURCE, request).await?;
        let records = parse_hit_list(&body, &base)?;

        debug!("USPTO PatFT returned {} results for '{}'", records.len(), query);

        Ok(SourcePage::last(records))
    }
}

/// Each hit appears twice in the list, once linked by number and once by
/// title. The two links are folded into one record carrying the real title.
pub fn parse_hit_list(body: &str, base: &Url) -> Result<Vec<PatentRecord>> {
    if body.trim().is_empty() {
        return Err(PipelineError::parse(SOURCE.key(), "empty response body"));
    }

    let document = Html::parse_document(body);
    let mut records: Vec<PatentRecord> = Vec::new();

    for anchor in document.select(&ANCHOR) {
        let href = anchor.value().attr("href").unwrap_or_default();
        if !href.contains("/netacgi/nph-Parser") || !href.contains("Sect1=PTO1") {
            continue;
        }
        let Some(caps) = USPTO_PATENT_PARAM.captures(href) else {
            continue;
        };

        let number = &caps[1];
        let text = Validator::normalize_whitespace(&anchor.text().collect::<String>());
        let is_number_label = text.replace(',', "") == number;

        if let Some(existing) = records.iter_mut().find(|r| r.patent_number == number) {
            if !is_number_label && existing.title.replace(',', "") == number {
                existing.title = text;
            }
            continue;
        }

        let mut record = PatentRecord::new(number, text, SOURCE);
        if let Ok(url) = base.join(href) {
            record = record.with_url(url.to_string());
        }
        records.push(record);
    }

    Ok(records)
}
