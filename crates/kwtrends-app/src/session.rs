//! The analysis session: user actions over one cache and one result set.

use crate::error::{AppError, AppResult};
use kwtrends_common::Keyword;
use kwtrends_config::Config;
use kwtrends_data::{
    AnalysisOutcome, Batcher, GoogleTrendsClient, KeywordLoader, ResultCache, TrendsFetcher,
    TrendsProvider,
};
use kwtrends_graphs::{ChartModel, ChartRenderer, Exporter, PlotlyFigure};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Session state behind the upload, run, download and clear-cache actions.
///
/// The cache lives as long as the session. A new run replaces the previous
/// outcome; a failed upload leaves nothing to analyze.
#[derive(Debug)]
pub struct Session {
    config: Config,
    loader: KeywordLoader,
    batcher: Batcher,
    fetcher: TrendsFetcher,
    cache: ResultCache,
    renderer: ChartRenderer,
    exporter: Exporter,
    keywords: Option<Vec<Keyword>>,
    outcome: Option<AnalysisOutcome>,
}

impl Session {
    /// Session talking to Google Trends.
    pub fn new(config: Config) -> AppResult<Self> {
        let client = GoogleTrendsClient::new(&config.provider)?;
        Self::with_provider(config, Arc::new(client))
    }

    /// Session using `provider` for every batch.
    pub fn with_provider(config: Config, provider: Arc<dyn TrendsProvider>) -> AppResult<Self> {
        config.validate()?;
        let batcher = Batcher::new(config.batching.batch_size)?;
        let fetcher = TrendsFetcher::new(provider, config.provider.query_params());

        Ok(Self {
            loader: KeywordLoader::new(),
            batcher,
            fetcher,
            cache: ResultCache::new(),
            renderer: ChartRenderer::new(config.chart.clone()),
            exporter: Exporter::new(&config.export),
            keywords: None,
            outcome: None,
            config,
        })
    }

    /// Validated configuration of the session.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Upload a keyword file and return the keywords found.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn upload(&mut self, bytes: &[u8]) -> AppResult<&[Keyword]> {
        self.keywords = None;
        let keywords = self.loader.load(bytes)?;
        info!(
            "Loaded {} keywords in {} batches",
            keywords.len(),
            self.batcher.batch_count(keywords.len())
        );
        let keywords: &[Keyword] = self.keywords.insert(keywords);
        Ok(keywords)
    }

    /// Keywords of the last successful upload.
    pub fn keywords(&self) -> Option<&[Keyword]> {
        self.keywords.as_deref()
    }

    /// Fetch every batch of the uploaded keywords and keep the outcome.
    #[instrument(skip(self))]
    pub async fn run_analysis(&mut self) -> AppResult<&AnalysisOutcome> {
        let keywords = self.keywords.as_deref().ok_or(AppError::NoKeywords)?;
        let batches = self.batcher.split(keywords);
        let outcome = self.fetcher.run(&batches, &self.cache).await;

        if !outcome.is_complete() {
            warn!("{} keywords could not be fetched", outcome.failed_keywords().len());
        }
        let outcome: &AnalysisOutcome = self.outcome.insert(outcome);
        Ok(outcome)
    }

    /// Outcome of the last run.
    pub const fn outcome(&self) -> Option<&AnalysisOutcome> {
        self.outcome.as_ref()
    }

    fn current(&self) -> AppResult<&AnalysisOutcome> {
        self.outcome.as_ref().ok_or(AppError::NoResults)
    }

    /// Chart of the last run.
    pub fn chart(&self) -> AppResult<ChartModel> {
        Ok(self.renderer.render(&self.current()?.table))
    }

    /// Interactive figure of the last run.
    pub fn figure(&self) -> AppResult<PlotlyFigure> {
        Ok(self.renderer.interactive(&self.current()?.table))
    }

    /// CSV download of the last run.
    pub fn download_csv(&self) -> AppResult<Vec<u8>> {
        Ok(self.exporter.csv(&self.current()?.table)?)
    }

    /// PNG download of the last run.
    pub fn download_png(&self) -> AppResult<Vec<u8>> {
        let chart = self.chart()?;
        Ok(self.exporter.png(&chart)?)
    }

    /// Chart figure JSON of the last run.
    pub fn download_chart_json(&self) -> AppResult<Vec<u8>> {
        let chart = self.chart()?;
        Ok(self.exporter.chart_json(&chart)?)
    }

    /// Drop every cached provider result.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// The session result cache.
    pub const fn cache(&self) -> &ResultCache {
        &self.cache
    }
}
