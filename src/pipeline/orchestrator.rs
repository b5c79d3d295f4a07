// file: src/pipeline/orchestrator.rs
// description: drives every query/source pair through fetch, enrichment and export
// reference: orchestrates the sequential download workflow

use crate::config::{Config, PipelineConfig, QueryConfig};
use crate::error::{PipelineError, Result};
use crate::exporter::{CorpusExporter, ExportOutcome};
use crate::models::{DownloadSummary, PatentRecord, SearchQuery};
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::sources::{self, DetailFetcher, PatentSource};
use crate::utils::Validator;
use futures::TryStreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What one (query, source) pair produced before it finished or failed.
#[derive(Debug, Default)]
struct PairOutcome {
    fetched: usize,
    written: usize,
    error: Option<PipelineError>,
}

pub struct Pipeline {
    queries: QueryConfig,
    sources: Vec<Arc<dyn PatentSource>>,
    detail_fetcher: Option<Arc<dyn DetailFetcher>>,
    detail_delay: Duration,
    progress_color: Option<bool>,
}

impl Pipeline {
    pub fn new(
        queries: QueryConfig,
        sources: Vec<Arc<dyn PatentSource>>,
        detail_fetcher: Option<Arc<dyn DetailFetcher>>,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self {
            queries,
            sources,
            detail_fetcher,
            detail_delay: Duration::from_millis(pipeline.detail_delay_ms),
            progress_color: None,
        }
    }

    /// Builds the HTTP client and every enabled source from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = sources::http::build_client(&config.pipeline)?;
        Ok(Self::new(
            config.queries.clone(),
            sources::build_sources(config, &client),
            sources::build_detail_fetcher(config, &client),
            &config.pipeline,
        ))
    }

    /// Draws a progress bar over the pairs while running.
    pub fn with_progress(mut self, colored: bool) -> Self {
        self.progress_color = Some(colored);
        self
    }

    /// Every (query, source) pair in run order: queries outermost, each
    /// source limited to its first `max_queries` queries.
    pub fn plan(&self) -> Vec<(SearchQuery, Arc<dyn PatentSource>)> {
        let queries = self.queries.to_queries();
        let mut pairs = Vec::new();

        for (position, query) in queries.iter().enumerate() {
            for source in &self.sources {
                let limit = source.settings().max_queries.unwrap_or(usize::MAX);
                if position < limit {
                    pairs.push((query.clone(), Arc::clone(source)));
                }
            }
        }

        pairs
    }

    pub async fn run_all(&self, exporter: &mut CorpusExporter) -> Result<DownloadSummary> {
        let queries = self.queries.to_queries();
        let plan = self.plan();

        info!(
            "Starting patent download: {} queries, {} sources, {} pairs",
            queries.len(),
            self.sources.len(),
            plan.len()
        );

        let progress = match self.progress_color {
            Some(colored) => ProgressTracker::with_color(plan.len(), colored),
            None => ProgressTracker::hidden(plan.len()),
        };
        let mut summary =
            DownloadSummary::new(exporter.output_dir().display().to_string(), &queries);

        for (i, (query, source)) in plan.iter().enumerate() {
            let kind = source.kind();
            progress.start_pair(&query.text, kind.key());
            info!("Searching {} for '{}'", kind.display_name(), query);

            let outcome = self
                .run_pair(query, source.as_ref(), exporter, &mut summary, &progress)
                .await?;
            exporter.flush()?;

            match outcome.error {
                None => {
                    info!(
                        "Found {} patents for '{}' on {} ({} new)",
                        outcome.fetched,
                        query,
                        kind.display_name(),
                        outcome.written
                    );
                    summary.record_success(query, kind, outcome.fetched);
                    progress.inc_pairs_succeeded();
                }
                Some(error) => {
                    warn!(
                        "Failed to fetch '{}' from {}: {}",
                        query,
                        kind.display_name(),
                        error
                    );
                    summary.record_failure(query, kind, &error);
                    progress.inc_pairs_failed();
                }
            }

            let delay = Duration::from_millis(source.settings().request_delay_ms);
            if i + 1 < plan.len() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let summary_path = exporter.finish(&mut summary)?;
        info!("Summary written to {}", summary_path.display());

        let stats = progress.get_stats();
        progress.finish();
        log_final_stats(&stats, &summary);

        Ok(summary)
    }

    /// Every page of the pair is fetched before anything is written, so a
    /// fetch error leaves no files behind. Fetch errors end the pair and are
    /// returned in the outcome; anything else, such as a failed write, aborts
    /// the run.
    async fn run_pair(
        &self,
        query: &SearchQuery,
        source: &dyn PatentSource,
        exporter: &mut CorpusExporter,
        summary: &mut DownloadSummary,
        progress: &ProgressTracker,
    ) -> Result<PairOutcome> {
        let mut outcome = PairOutcome::default();

        let pages: Vec<Vec<PatentRecord>> =
            match sources::fetch_for_query(source, query).try_collect().await {
                Ok(pages) => pages,
                Err(e) if e.is_fetch_error() => {
                    outcome.error = Some(e);
                    return Ok(outcome);
                }
                Err(e) => return Err(e),
            };

        for record in pages.into_iter().flatten() {
            outcome.fetched += 1;
            if self.store(record, exporter, summary, progress).await? {
                outcome.written += 1;
            }
        }

        Ok(outcome)
    }

    /// Returns whether the record was new and written.
    async fn store(
        &self,
        mut record: PatentRecord,
        exporter: &mut CorpusExporter,
        summary: &mut DownloadSummary,
        progress: &ProgressTracker,
    ) -> Result<bool> {
        if let Err(e) = Validator::validate_patent_number(&record.patent_number) {
            warn!("Skipping record from {}: {}", record.source, e);
            return Ok(false);
        }

        if exporter.is_known(&record) {
            debug!("Skipping duplicate patent {}", record.patent_number);
            summary.record_duplicate();
            progress.add_duplicate();
            return Ok(false);
        }

        if let Some(fetcher) = &self.detail_fetcher {
            self.enrich(fetcher.as_ref(), &mut record, summary).await;
        }

        match exporter.export(&record)? {
            ExportOutcome::Written => {
                summary.record_written(&record.patent_number);
                progress.add_patent();
                Ok(true)
            }
            ExportOutcome::Duplicate => {
                summary.record_duplicate();
                progress.add_duplicate();
                Ok(false)
            }
        }
    }

    async fn enrich(
        &self,
        fetcher: &dyn DetailFetcher,
        record: &mut PatentRecord,
        summary: &mut DownloadSummary,
    ) {
        match fetcher.fetch_details(&record.patent_number).await {
            Ok(details) => record.merge_details(details),
            Err(e) => {
                warn!(
                    "Could not fetch details for {}: {}",
                    record.patent_number, e
                );
                summary.record_enrichment_failure();
            }
        }

        if !self.detail_delay.is_zero() {
            tokio::time::sleep(self.detail_delay).await;
        }
    }
}

fn log_final_stats(stats: &PipelineStats, summary: &DownloadSummary) {
    info!("=== Patent Download Summary ===");
    info!("Duration: {} seconds", stats.duration_secs);
    info!("Pairs attempted: {}", summary.pairs_attempted);
    info!("Pairs failed: {}", summary.pairs_failed);
    info!("Success rate: {:.2}%", stats.success_rate());
    for (source, count) in &summary.per_source {
        info!("  {}: {} patents", source, count);
    }
    info!("New patents written: {}", stats.patents_written);
    info!("Duplicates skipped: {}", stats.duplicates_skipped);
    info!("Enrichment failures: {}", summary.enrichment_failures);
    info!("Speed: {:.2} pairs/sec", stats.pairs_per_second());
    info!("===============================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;
    use crate::error::FetchErrorKind;
    use crate::exporter::{CORPUS_FILE, INDEX_FILE, JsonExporter};
    use crate::models::{PatentDetails, SourceKind};
    use crate::sources::testing::{FakeSource, Scripted, settings};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    struct FakeDetails;

    #[async_trait]
    impl DetailFetcher for FakeDetails {
        async fn fetch_details(&self, patent_number: &str) -> Result<PatentDetails> {
            if patent_number == "US456" {
                return Err(PipelineError::network("google_patents", "HTTP status 404"));
            }
            Ok(PatentDetails {
                inventors: vec!["Jane Roe".to_string()],
                claims: vec!["A composition.".to_string()],
                filing_date: Some("2017-01-10".to_string()),
                ..PatentDetails::default()
            })
        }
    }

    fn no_delay() -> PipelineConfig {
        PipelineConfig {
            detail_delay_ms: 0,
            ..PipelineConfig::default()
        }
    }

    fn terms(list: &[&str]) -> QueryConfig {
        QueryConfig::new(list.iter().map(|s| s.to_string()).collect(), Vec::new())
    }

    fn exporter(dir: &Path) -> CorpusExporter {
        CorpusExporter::new(&OutputConfig {
            directory: dir.to_path_buf(),
            pretty_json: true,
        })
        .unwrap()
    }

    fn cbd_source() -> Arc<dyn PatentSource> {
        Arc::new(
            FakeSource::new(SourceKind::MetadataApi, settings(50, 2))
                .with("CBD", Scripted::Pages(vec![vec!["US123", "US456"]])),
        )
    }

    #[tokio::test]
    async fn test_single_pair_writes_every_artifact() {
        let dir = tempdir().unwrap();
        let mut exporter = exporter(dir.path());
        let pipeline = Pipeline::new(terms(&["CBD"]), vec![cbd_source()], None, &no_delay());

        let summary = pipeline.run_all(&mut exporter).await.unwrap();

        for id in ["US123", "US456"] {
            assert!(dir.path().join(format!("cannabis_patent_{}.json", id)).exists());
            assert!(dir.path().join(format!("cannabis_patent_{}.txt", id)).exists());
        }
        let corpus = fs::read_to_string(dir.path().join(CORPUS_FILE)).unwrap();
        assert_eq!(corpus.lines().count(), 2);
        let index = fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
        assert_eq!(index.lines().count(), 3);

        let mut expected = BTreeMap::new();
        expected.insert(
            "CBD".to_string(),
            BTreeMap::from([("metadata_api".to_string(), 2)]),
        );
        assert_eq!(summary.counts, expected);
        assert_eq!(summary.total_patents, 2);
        assert_eq!(summary.files_created.json_files, 2);
        assert!(dir.path().join("download_summary.json").exists());
    }

    #[tokio::test]
    async fn test_timeout_is_recorded_and_run_continues() {
        let dir = tempdir().unwrap();
        let mut exporter = exporter(dir.path());
        let flaky: Arc<dyn PatentSource> = Arc::new(
            FakeSource::new(SourceKind::GooglePatents, settings(20, 1))
                .with("hemp", Scripted::Timeout)
                .with("CBD", Scripted::Pages(vec![vec!["US999"]])),
        );
        let pipeline = Pipeline::new(terms(&["hemp", "CBD"]), vec![flaky], None, &no_delay());

        let summary = pipeline.run_all(&mut exporter).await.unwrap();

        assert_eq!(summary.pairs_attempted, 2);
        assert_eq!(summary.pairs_failed, 1);
        assert_eq!(summary.failures.len(), 1);
        let failure = &summary.failures[0];
        assert_eq!(failure.query, "hemp");
        assert_eq!(failure.source, SourceKind::GooglePatents);
        assert_eq!(failure.kind, FetchErrorKind::Network);
        assert_eq!(summary.count_for("hemp", SourceKind::GooglePatents), None);

        assert_eq!(summary.downloaded_patents, vec!["US999".to_string()]);
        assert_eq!(summary.files_created.json_files, 1);
    }

    #[tokio::test]
    async fn test_empty_result_counts_zero() {
        let dir = tempdir().unwrap();
        let mut exporter = exporter(dir.path());
        let empty: Arc<dyn PatentSource> =
            Arc::new(FakeSource::new(SourceKind::UsptoPatft, settings(10, 1)));
        let pipeline = Pipeline::new(terms(&["ocimene"]), vec![empty], None, &no_delay());

        let summary = pipeline.run_all(&mut exporter).await.unwrap();

        assert_eq!(summary.count_for("ocimene", SourceKind::UsptoPatft), Some(0));
        assert!(!summary.has_failures());
        assert_eq!(summary.files_created.json_files, 0);
    }

    #[tokio::test]
    async fn test_successes_plus_failures_equal_attempts() {
        let dir = tempdir().unwrap();
        let mut exporter = exporter(dir.path());
        let google: Arc<dyn PatentSource> = Arc::new(
            FakeSource::new(SourceKind::GooglePatents, settings(20, 1))
                .with("cannabis", Scripted::Pages(vec![vec!["US1", "US2"]]))
                .with("hemp", Scripted::Throttled),
        );
        let api: Arc<dyn PatentSource> = Arc::new(
            FakeSource::new(SourceKind::MetadataApi, settings(50, 3))
                .with("cannabis", Scripted::Pages(vec![vec!["US2", "US3"]]))
                .with("hemp", Scripted::Malformed)
                .with("CBD", Scripted::FailOnPage(2, vec![vec!["US4"], vec!["US5"]])),
        );
        let pipeline = Pipeline::new(
            terms(&["cannabis", "hemp", "CBD"]),
            vec![google, api],
            None,
            &no_delay(),
        );

        let summary = pipeline.run_all(&mut exporter).await.unwrap();

        assert_eq!(summary.pairs_attempted, 6);
        assert_eq!(
            summary.pairs_succeeded + summary.pairs_failed,
            summary.pairs_attempted
        );
        assert_eq!(summary.pairs_failed, 3);

        let kinds: Vec<FetchErrorKind> = summary.failures.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FetchErrorKind::RateLimit,
                FetchErrorKind::Parse,
                FetchErrorKind::Network
            ]
        );
        // US2 came back from both sources; the first pair wrote it
        assert_eq!(summary.count_for("cannabis", SourceKind::MetadataApi), Some(2));
        assert_eq!(summary.duplicates_skipped, 1);
        assert_eq!(summary.total_patents, 3);
        let written = JsonExporter::read(&dir.path().join("cannabis_patent_US2.json")).unwrap();
        assert_eq!(written.source, SourceKind::GooglePatents);
    }

    #[tokio::test]
    async fn test_failure_on_later_page_writes_nothing_for_pair() {
        let dir = tempdir().unwrap();
        let mut exporter = exporter(dir.path());
        let api: Arc<dyn PatentSource> = Arc::new(
            FakeSource::new(SourceKind::MetadataApi, settings(50, 3))
                .with("hemp", Scripted::FailOnPage(2, vec![vec!["US4"], vec!["US5"]]))
                .with("CBD", Scripted::Pages(vec![vec!["US6"]])),
        );
        let pipeline = Pipeline::new(terms(&["hemp", "CBD"]), vec![api], None, &no_delay());

        let summary = pipeline.run_all(&mut exporter).await.unwrap();

        assert_eq!(summary.pairs_failed, 1);
        assert_eq!(summary.failures[0].query, "hemp");
        assert_eq!(summary.failures[0].kind, FetchErrorKind::Network);
        assert!(!dir.path().join("cannabis_patent_US4.json").exists());
        assert!(!dir.path().join("cannabis_patent_US4.txt").exists());
        assert_eq!(summary.count_for("hemp", SourceKind::MetadataApi), None);

        let corpus = fs::read_to_string(dir.path().join(CORPUS_FILE)).unwrap();
        assert_eq!(corpus.lines().count(), 1);
        assert_eq!(summary.downloaded_patents, vec!["US6".to_string()]);
        assert_eq!(
            summary.per_source.get("metadata_api").copied(),
            Some(summary.total_patents)
        );
    }

    #[tokio::test]
    async fn test_record_without_identifier_is_skipped() {
        let dir = tempdir().unwrap();
        let mut exporter = exporter(dir.path());
        let source: Arc<dyn PatentSource> = Arc::new(
            FakeSource::new(SourceKind::GooglePatents, settings(20, 1))
                .with("CBD", Scripted::Pages(vec![vec![" - ", "US7"]])),
        );
        let pipeline = Pipeline::new(terms(&["CBD"]), vec![source], None, &no_delay());

        let summary = pipeline.run_all(&mut exporter).await.unwrap();

        assert!(!summary.has_failures());
        assert_eq!(summary.downloaded_patents, vec!["US7".to_string()]);
        assert_eq!(summary.files_created.json_files, 1);
    }

    #[tokio::test]
    async fn test_second_run_adds_no_index_duplicates() {
        let dir = tempdir().unwrap();

        for _ in 0..2 {
            let mut exporter = exporter(dir.path());
            let pipeline = Pipeline::new(terms(&["CBD"]), vec![cbd_source()], None, &no_delay());
            pipeline.run_all(&mut exporter).await.unwrap();
        }

        let mut reader = csv::Reader::from_path(dir.path().join(INDEX_FILE)).unwrap();
        let ids: Vec<String> = reader
            .records()
            .map(|row| row.unwrap()[0].to_string())
            .collect();
        assert_eq!(ids, vec!["US123".to_string(), "US456".to_string()]);

        let corpus = fs::read_to_string(dir.path().join(CORPUS_FILE)).unwrap();
        assert_eq!(corpus.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_json_output_round_trips() {
        let dir = tempdir().unwrap();
        let mut exporter = exporter(dir.path());
        let pipeline = Pipeline::new(terms(&["CBD"]), vec![cbd_source()], None, &no_delay());
        pipeline.run_all(&mut exporter).await.unwrap();

        let record = JsonExporter::read(&dir.path().join("cannabis_patent_US123.json")).unwrap();
        assert_eq!(record.patent_number, "US123");
        assert_eq!(record.title, "Title of US123");
        assert_eq!(record.abstract_text, "Abstract of US123");
        assert_eq!(record.source, SourceKind::MetadataApi);
        assert_eq!(record.matched_query.as_deref(), Some("CBD"));
    }

    #[tokio::test]
    async fn test_detail_enrichment_and_failures() {
        let dir = tempdir().unwrap();
        let mut exporter = exporter(dir.path());
        let pipeline = Pipeline::new(
            terms(&["CBD"]),
            vec![cbd_source()],
            Some(Arc::new(FakeDetails)),
            &no_delay(),
        );

        let summary = pipeline.run_all(&mut exporter).await.unwrap();

        assert_eq!(summary.enrichment_failures, 1);
        assert!(!summary.has_failures());

        let enriched = JsonExporter::read(&dir.path().join("cannabis_patent_US123.json")).unwrap();
        assert_eq!(enriched.inventors, vec!["Jane Roe".to_string()]);
        assert_eq!(enriched.filing_date.as_deref(), Some("2017-01-10"));
        assert_eq!(enriched.title, "Title of US123");

        let plain = JsonExporter::read(&dir.path().join("cannabis_patent_US456.json")).unwrap();
        assert!(plain.inventors.is_empty());
    }

    #[test]
    fn test_plan_honors_max_queries() {
        let mut limited = settings(10, 1);
        limited.max_queries = Some(1);
        let uspto: Arc<dyn PatentSource> =
            Arc::new(FakeSource::new(SourceKind::UsptoPatft, limited));
        let google: Arc<dyn PatentSource> =
            Arc::new(FakeSource::new(SourceKind::GooglePatents, settings(20, 1)));

        let queries = QueryConfig::new(
            vec!["cannabis".to_string(), "hemp".to_string()],
            vec!["A61K31/05".to_string()],
        );
        let pipeline = Pipeline::new(queries, vec![google, uspto], None, &no_delay());

        let plan: Vec<(String, SourceKind)> = pipeline
            .plan()
            .iter()
            .map(|(q, s)| (q.text.clone(), s.kind()))
            .collect();
        assert_eq!(
            plan,
            vec![
                ("cannabis".to_string(), SourceKind::GooglePatents),
                ("cannabis".to_string(), SourceKind::UsptoPatft),
                ("hemp".to_string(), SourceKind::GooglePatents),
                ("A61K31/05".to_string(), SourceKind::GooglePatents),
            ]
        );
    }
}
