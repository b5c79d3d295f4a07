// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::models::{SearchQuery, SourceKind};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const CLASSIFICATION_CODES: &[&str] = &[
    "A61K31/05",   // cannabis compounds
    "A61K36/185",  // cannabis preparations
    "C07D311/58",  // cannabinoid chemistry
    "A23L33/105",  // food products
    "A61P25/30",   // neurological treatments
    "C12N15/8271", // genetic engineering
    "A01H5/00",    // cultivation
    "B01D11/02",   // extraction
];

const SEARCH_TERMS: &[&str] = &[
    // basic
    "cannabis", "marijuana", "marihuana", "hemp", "cannabinoid",
    // compounds
    "tetrahydrocannabinol", "THC", "delta-9-THC", "delta-8-THC",
    "cannabidiol", "CBD", "cannabigerol", "CBG", "cannabinol", "CBN",
    "cannabichromene", "CBC", "tetrahydrocannabivarin", "THCV",
    "cannabidivarin", "CBDV", "cannabigerolic acid", "CBGA",
    // terpenes
    "myrcene", "limonene", "pinene", "linalool", "caryophyllene",
    "humulene", "terpinolene", "ocimene", "bisabolol",
    // processes
    "cannabis extraction", "cannabis cultivation", "cannabis processing",
    "cannabis purification", "cannabis distillation", "cannabis isolation",
    "supercritical CO2 extraction", "butane extraction", "ethanol extraction",
    // products
    "cannabis oil", "cannabis concentrate", "cannabis edible", "cannabis topical",
    "cannabis vaporizer", "cannabis delivery system", "cannabis capsule",
    "cannabis tincture", "cannabis patch", "cannabis inhaler",
    // medical
    "medical marijuana", "medical cannabis", "therapeutic cannabis",
    "cannabis treatment", "cannabis therapy", "cannabis medicine",
    // testing
    "cannabis testing", "cannabis analysis", "cannabis potency",
    "cannabis contamination", "cannabis quality control",
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub queries: QueryConfig,
    pub pipeline: PipelineConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub pretty_json: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    pub search_terms: Vec<String>,
    pub classification_codes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub fetch_details: bool,
    pub detail_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub google_patents: SourceConfig,
    pub uspto_patft: SourceConfig,
    pub metadata_api: SourceConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub enabled: bool,
    pub base_url: String,
    pub max_results: usize,
    #[serde(default)]
    pub max_queries: Option<usize>,
    #[serde(default)]
    pub request_delay_ms: u64,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_max_pages() -> usize {
    1
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("agents/patent-agent/data/corpus"),
            pretty_json: true,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            search_terms: SEARCH_TERMS.iter().map(|s| s.to_string()).collect(),
            classification_codes: CLASSIFICATION_CODES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl QueryConfig {
    pub fn new(search_terms: Vec<String>, classification_codes: Vec<String>) -> Self {
        Self {
            search_terms,
            classification_codes,
        }
    }

    /// Terms first, then classification codes, in configured order.
    pub fn to_queries(&self) -> Vec<SearchQuery> {
        self.search_terms
            .iter()
            .map(SearchQuery::term)
            .chain(
                self.classification_codes
                    .iter()
                    .map(SearchQuery::classification),
            )
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.search_terms.is_empty() && self.classification_codes.is_empty()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_details: true,
            detail_delay_ms: 1000,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            google_patents: SourceConfig {
                enabled: true,
                base_url: "https://patents.google.com/".to_string(),
                max_results: 20,
                max_queries: None,
                request_delay_ms: 2000,
                max_pages: 1,
            },
            uspto_patft: SourceConfig {
                enabled: true,
                base_url: "https://patft.uspto.gov/netacgi/nph-Parser".to_string(),
                max_results: 10,
                max_queries: Some(10),
                request_delay_ms: 3000,
                max_pages: 1,
            },
            metadata_api: SourceConfig {
                enabled: true,
                base_url: "https://api.patentsview.org/patents/query".to_string(),
                max_results: 50,
                max_queries: None,
                request_delay_ms: 1000,
                max_pages: 2,
            },
        }
    }
}

impl SourcesConfig {
    pub fn get(&self, kind: SourceKind) -> &SourceConfig {
        match kind {
            SourceKind::GooglePatents => &self.google_patents,
            SourceKind::UsptoPatft => &self.uspto_patft,
            SourceKind::MetadataApi => &self.metadata_api,
        }
    }

    pub fn enabled(&self) -> impl Iterator<Item = (SourceKind, &SourceConfig)> {
        SourceKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|(_, cfg)| cfg.enabled)
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(
                config::File::from(Path::new("config/default.toml")).required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("PATENT_HARVEST")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.request_timeout_secs == 0 {
            return Err(PipelineError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.output.directory.as_os_str().is_empty() {
            return Err(PipelineError::Config(
                "output.directory must not be empty".to_string(),
            ));
        }

        if self.queries.is_empty() {
            return Err(PipelineError::Config(
                "at least one search term or classification code is required".to_string(),
            ));
        }

        for (kind, source) in self.sources.enabled() {
            if source.max_results == 0 {
                return Err(PipelineError::Config(format!(
                    "sources.{}.max_results must be greater than 0",
                    kind.key()
                )));
            }
            if source.max_pages == 0 {
                return Err(PipelineError::Config(format!(
                    "sources.{}.max_pages must be greater than 0",
                    kind.key()
                )));
            }
            Validator::validate_url(&source.base_url)
                .map_err(|e| PipelineError::Config(format!("sources.{}: {}", kind.key(), e)))?;
        }

        Ok(())
    }
}
