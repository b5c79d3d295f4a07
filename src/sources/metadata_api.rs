// file: src/sources/metadata_api.rs
// description: PatentsView-style JSON metadata API client with pagination
// reference: https://patentsview.org/apis/api-endpoints/patents

use crate::config::SourceConfig;
use crate::error::{PipelineError, Result};
use crate::models::{PatentRecord, SearchQuery, SourceKind};
use crate::sources::google::google_patent_id;
use crate::sources::http::fetch_body;
use crate::sources::{PatentSource, SourcePage};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const SOURCE: SourceKind = SourceKind::MetadataApi;
const MAX_PER_PAGE: usize = 100;

const FIELDS: &[&str] = &[
    "patent_number",
    "patent_title",
    "patent_abstract",
    "patent_date",
    "app_date",
    "assignee_organization",
    "inventor_first_name",
    "inventor_last_name",
    "cpc_subgroup_id",
];

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    patents: Option<Vec<ApiPatent>>,
    total_patent_count: u64,
}

#[derive(Debug, Deserialize)]
struct ApiPatent {
    patent_number: String,
    #[serde(default)]
    patent_title: Option<String>,
    #[serde(default)]
    patent_abstract: Option<String>,
    #[serde(default)]
    patent_date: Option<String>,
    #[serde(default)]
    applications: Vec<ApiApplication>,
    #[serde(default)]
    assignees: Vec<ApiAssignee>,
    #[serde(default)]
    inventors: Vec<ApiInventor>,
    #[serde(default)]
    cpcs: Vec<ApiCpc>,
}

#[derive(Debug, Deserialize)]
struct ApiApplication {
    app_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiAssignee {
    assignee_organization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiInventor {
    inventor_first_name: Option<String>,
    inventor_last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCpc {
    cpc_subgroup_id: Option<String>,
}

impl From<ApiPatent> for PatentRecord {
    fn from(patent: ApiPatent) -> Self {
        let url = format!(
            "https://patents.google.com/patent/{}",
            google_patent_id(&patent.patent_number)
        );
        let mut record = PatentRecord::new(
            patent.patent_number,
            patent.patent_title.unwrap_or_default(),
            SOURCE,
        )
        .with_abstract(patent.patent_abstract.unwrap_or_default())
        .with_url(url);

        record.publication_date = patent.patent_date;
        record.filing_date = patent.applications.into_iter().find_map(|a| a.app_date);
        record.assignees = patent
            .assignees
            .into_iter()
            .filter_map(|a| a.assignee_organization)
            .collect();
        record.inventors = patent
            .inventors
            .into_iter()
            .filter_map(|i| {
                let name = [i.inventor_first_name, i.inventor_last_name]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                (!name.is_empty()).then_some(name)
            })
            .collect();
        record.classifications = patent
            .cpcs
            .into_iter()
            .filter_map(|c| c.cpc_subgroup_id)
            .collect();
        record.classifications.dedup();
        record
    }
}

pub struct MetadataApiSource {
    client: Client,
    settings: SourceConfig,
}

impl MetadataApiSource {
    pub fn new(client: Client, settings: SourceConfig) -> Self {
        Self { client, settings }
    }

    fn per_page(&self) -> usize {
        self.settings.max_results.clamp(1, MAX_PER_PAGE)
    }

    fn query_params(&self, query: &SearchQuery, page: usize) -> Vec<(&'static str, String)> {
        let criteria = if query.is_classification() {
            json!({ "cpc_subgroup_id": query.text })
        } else {
            json!({ "_or": [
                { "_text_any": { "patent_title": query.text } },
                { "_text_any": { "patent_abstract": query.text } }
            ]})
        };

        vec![
            ("q", criteria.to_string()),
            ("f", json!(FIELDS).to_string()),
            (
                "o",
                json!({ "page": page, "per_page": self.per_page() }).to_string(),
            ),
        ]
    }
}

#[async_trait]
impl PatentSource for MetadataApiSource {
    fn kind(&self) -> SourceKind {
        SOURCE
    }

    fn settings(&self) -> &SourceConfig {
        &self.settings
    }

    async fn fetch_page(&self, query: &SearchQuery, page: usize) -> Result<SourcePage> {
        let request = self
            .client
            .get(&self.settings.base_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&self.query_params(query, page));

        let body = fetch_body(SOURCE, request).await?;
        let page = parse_query_response(&body, page, self.per_page())?;

        debug!(
            "Metadata API returned {} results for '{}'",
            page.records.len(),
            query
        );

        Ok(page)
    }
}

pub fn parse_query_response(body: &str, page: usize, per_page: usize) -> Result<SourcePage> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| PipelineError::parse(SOURCE.key(), e))?;

    let records: Vec<PatentRecord> = response
        .patents
        .unwrap_or_default()
        .into_iter()
        .map(PatentRecord::from)
        .collect();

    let fetched_so_far = (page.saturating_sub(1) * per_page + records.len()) as u64;
    let has_more = !records.is_empty() && fetched_so_far < response.total_patent_count;

    Ok(SourcePage { records, has_more })
}
