// file: src/sources/google.rs
// description: Google Patents search scraping and detail page enrichment
// reference: https://docs.rs/scraper

use crate::config::SourceConfig;
use crate::error::{PipelineError, Result};
use crate::models::{PatentDetails, PatentRecord, SearchQuery, SourceKind};
use crate::sources::http::fetch_body;
use crate::sources::patterns::*;
use crate::sources::{DetailFetcher, PatentSource, SourcePage};
use crate::utils::Validator;
use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

const SOURCE: SourceKind = SourceKind::GooglePatents;

pub struct GooglePatentsSource {
    client: Client,
    settings: SourceConfig,
}

impl GooglePatentsSource {
    pub fn new(client: Client, settings: SourceConfig) -> Self {
        Self { client, settings }
    }

    fn base_url(&self) -> Result<Url> {
        Url::parse(&self.settings.base_url).map_err(|e| {
            PipelineError::Config(format!("Invalid Google Patents base_url: {}", e))
        })
    }

    fn search_params(query: &SearchQuery, page: usize) -> Vec<(&'static str, String)> {
        let key = if query.is_classification() { "cpc" } else { "q" };
        let mut params = vec![
            (key, query.text.clone()),
            ("country", "US".to_string()),
            ("type", "PATENT".to_string()),
        ];
        if page > 1 {
            params.push(("page", (page - 1).to_string()));
        }
        params
    }

    pub fn detail_url(&self, patent_number: &str) -> Result<Url> {
        self.base_url()?
            .join(&format!("patent/{}", google_patent_id(patent_number)))
            .map_err(|e| PipelineError::Config(format!("Invalid detail URL: {}", e)))
    }
}

#[async_trait]
impl PatentSource for GooglePatentsSource {
    fn kind(&self) -> SourceKind {
        SOURCE
    }

    fn settings(&self) -> &SourceConfig {
        &self.settings
    }

    async fn fetch_page(&self, query: &SearchQuery, page: usize) -> Result<SourcePage> {
        let base = self.base_url()?;
        let request = self
            .client
            .get(base.clone())
            .query(&Self::search_params(query, page));

        let body = fetch_body(SOURCE, request).await?;
        let records = parse_search_results(&body, &base)?;

        debug!("Google Patents returned {} results for '{}'", records.len(), query);

        let has_more = !records.is_empty();
        Ok(SourcePage { records, has_more })
    }
}

#[async_trait]
impl DetailFetcher for GooglePatentsSource {
    async fn fetch_details(&self, patent_number: &str) -> Result<PatentDetails> {
        let url = self.detail_url(patent_number)?;
        let body = fetch_body(SOURCE, self.client.get(url)).await?;
        Ok(parse_detail_page(&body))
    }
}

/// Google Patents wants a country prefix; bare grant numbers are US patents.
pub fn google_patent_id(patent_number: &str) -> String {
    let trimmed = patent_number.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("US{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    Validator::normalize_whitespace(&element.text().collect::<String>())
}

pub fn parse_search_results(body: &str, base: &Url) -> Result<Vec<PatentRecord>> {
    if body.trim().is_empty() {
        return Err(PipelineError::parse(SOURCE.key(), "empty response body"));
    }

    let document = Html::parse_document(body);
    let mut records = Vec::new();
    let mut items = 0usize;

    for item in document.select(&RESULT_ITEM) {
        items += 1;

        let Some(link) = item.select(&RESULT_LINK).next() else {
            warn!("Skipping search result without a title link");
            continue;
        };
        let href = link.value().attr("href").unwrap_or_default();
        let Some(caps) = GOOGLE_PATENT_PATH.captures(href) else {
            warn!("Skipping search result with unexpected link: {}", href);
            continue;
        };

        let snippet = item
            .select(&RESULT_SNIPPET)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let mut record = PatentRecord::new(&caps[1], element_text(link), SOURCE)
            .with_abstract(snippet);
        if let Ok(url) = base.join(href) {
            record = record.with_url(url.to_string());
        }
        records.push(record);
    }

    if items > 0 && records.is_empty() {
        return Err(PipelineError::parse(
            SOURCE.key(),
            format!("none of {} result items could be parsed", items),
        ));
    }

    Ok(records)
}

pub fn parse_detail_page(body: &str) -> PatentDetails {
    let document = Html::parse_document(body);

    let first = |selector: &Selector| document.select(selector).next().map(element_text);
    let all = |selector: &Selector| {
        document
            .select(selector)
            .map(element_text)
            .filter(|text: &String| !text.is_empty())
            .collect::<Vec<_>>()
    };

    let mut details = PatentDetails {
        title: first(&DETAIL_TITLE),
        abstract_text: first(&DETAIL_ABSTRACT),
        description: first(&DETAIL_DESCRIPTION),
        inventors: all(&DETAIL_INVENTOR),
        assignees: all(&DETAIL_ASSIGNEE),
        classifications: all(&DETAIL_CPC),
        claims: all(&DETAIL_CLAIM),
        ..PatentDetails::default()
    };
    details.classifications.dedup();

    for time in document.select(&DETAIL_DATE) {
        let element = time.value();
        let (Some(kind), Some(value)) = (element.attr("itemprop"), element.attr("datetime")) else {
            continue;
        };
        let slot = match kind {
            "filingDate" => &mut details.filing_date,
            "publicationDate" => &mut details.publication_date,
            "priorityDate" => &mut details.priority_date,
            _ => continue,
        };
        slot.get_or_insert_with(|| value.to_string());
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEARCH_HTML: &str = r#"
<html><body>
  <article class="result">
    <h3><a href="/patent/US10123456B2/en">Cannabinoid   extraction
      process</a></h3>
    <div class="snippet">A method for extracting <b>cannabinoids</b> using CO2.</div>
  </article>
  <article class="result">
    <h3><a href="/patent/US9999999B1/en">Hemp seed composition</a></h3>
  </article>
  <article class="result">
    <h3>No link here</h3>
  </article>
</body></html>"#;

    const DETAIL_HTML: &str = r#"
<html><body>
  <span itemprop="title">Cannabinoid extraction process
  </span>
  <div class="abstract">Supercritical CO2 extraction of cannabinoids.</div>
  <dl>
    <dd itemprop="inventor">Jane Roe</dd>
    <dd itemprop="inventor">John Doe</dd>
    <dd itemprop="assignee">Acme Botanicals Inc</dd>
  </dl>
  <time itemprop="priorityDate" datetime="2016-02-01">2016-02-01</time>
  <time itemprop="filingDate" datetime="2017-03-01">2017-03-01</time>
  <time itemprop="publicationDate" datetime="2018-11-13">2018-11-13</time>
  <ul><li itemprop="classifications"><span itemprop="Code">A61K36/185</span></li></ul>
  <section itemprop="description"><p>Detailed   description.</p></section>
  <section itemprop="claims">
    <div class="claim">1. A method comprising heating.</div>
    <div class="claim">2. The method of claim 1.</div>
  </section>
</body></html>"#;

    fn base() -> Url {
        Url::parse("https://patents.google.com/").unwrap()
    }

    #[test]
    fn test_parse_search_results() {
        let records = parse_search_results(SEARCH_HTML, &base()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].patent_number, "US10123456B2");
        assert_eq!(records[0].title, "Cannabinoid extraction process");
        assert_eq!(
            records[0].abstract_text,
            "A method for extracting cannabinoids using CO2."
        );
        assert_eq!(
            records[0].url.as_deref(),
            Some("https://patents.google.com/patent/US10123456B2/en")
        );
        assert_eq!(records[1].abstract_text, "");
        assert_eq!(records[1].source, SourceKind::GooglePatents);
    }

    #[test]
    fn test_parse_search_results_empty_page() {
        let body = "<html><body><p>No results</p></body></html>";
        let records = parse_search_results(body, &base()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_search_results_rejects_unusable_markup() {
        assert!(parse_search_results("   ", &base()).is_err());

        let html = r#"<article class="result"><h3><a href="/scholar/123">x</a></h3></article>"#;
        let err = parse_search_results(html, &base()).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }

    #[test]
    fn test_parse_detail_page() {
        let details = parse_detail_page(DETAIL_HTML);

        assert_eq!(details.title.as_deref(), Some("Cannabinoid extraction process"));
        assert_eq!(details.inventors, vec!["Jane Roe", "John Doe"]);
        assert_eq!(details.assignees, vec!["Acme Botanicals Inc"]);
        assert_eq!(details.filing_date.as_deref(), Some("2017-03-01"));
        assert_eq!(details.publication_date.as_deref(), Some("2018-11-13"));
        assert_eq!(details.priority_date.as_deref(), Some("2016-02-01"));
        assert_eq!(details.classifications, vec!["A61K36/185"]);
        assert_eq!(details.description.as_deref(), Some("Detailed description."));
        assert_eq!(details.claims.len(), 2);
    }

    #[test]
    fn test_google_patent_id_and_detail_url() {
        assert_eq!(google_patent_id("10123456"), "US10123456");
        assert_eq!(google_patent_id("US10123456B2"), "US10123456B2");

        let source = GooglePatentsSource::new(
            Client::new(),
            crate::config::SourcesConfig::default().google_patents,
        );
        assert_eq!(
            source.detail_url("10123456").unwrap().as_str(),
            "https://patents.google.com/patent/US10123456"
        );
    }

    #[test]
    fn test_search_params() {
        let query = SearchQuery::classification("A01H5/00");
        let params = GooglePatentsSource::search_params(&query, 2);
        assert_eq!(params[0], ("cpc", "A01H5/00".to_string()));
        assert_eq!(params.last().unwrap(), &("page", "1".to_string()));
    }
}
