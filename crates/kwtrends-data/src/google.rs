//! Google Trends client with cookie priming and request pacing
//!
//! Talks to the public endpoints behind trends.google.com: an `explore` call
//! yields a token for the `TIMESERIES` widget, which is then exchanged at
//! `widgetdata/multiline` for the interest-over-time series. Requests are
//! spaced by a `governor` rate limiter; failures are reported, never retried.

use crate::provider::TrendsProvider;
use async_trait::async_trait;
use chrono::DateTime;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use kwtrends_common::{Batch, FetchError, QueryParams, Result, TrendsError, TrendsRow};
use kwtrends_config::ProviderConfig;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

const EXPLORE_PATH: &str = "/trends/api/explore";
const MULTILINE_PATH: &str = "/trends/api/widgetdata/multiline";
const TIMESERIES_WIDGET: &str = "TIMESERIES";

/// Google Trends HTTP client
pub struct GoogleTrendsClient {
    client: Client,
    base_url: String,
    category: u32,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
    primed: OnceCell<()>,
}

impl GoogleTrendsClient {
    /// Create a client from the provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .cookie_store(true)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TrendsError::network_with_source("Failed to create HTTP client", e))?;

        // A zero interval disables pacing.
        let rate_limiter = Quota::with_period(Duration::from_secs(config.request_interval_seconds))
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            category: config.category,
            rate_limiter,
            primed: OnceCell::new(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The explore endpoint refuses requests without the session cookie the
    /// home page hands out.
    async fn prime(&self, params: &QueryParams) -> std::result::Result<(), FetchError> {
        self.primed
            .get_or_try_init(|| async {
                let url = format!("{}/trends/explore", self.base_url);
                self.send(Method::GET, &url, &[("geo", params.geo.as_str())]).await?;
                debug!("Obtained provider session cookie");
                Ok::<(), FetchError>(())
            })
            .await
            .map(|_| ())
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<String, FetchError> {
        let response = self
            .client
            .request(method, url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", url, e);
                FetchError::unavailable(format!("request to {url} failed: {e}"))
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Provider throttled request to {}", url);
            return Err(FetchError::rate_limited(format!("{url} returned {status}")));
        }
        if !status.is_success() {
            warn!("Provider returned {} for {}", status, url);
            return Err(FetchError::unavailable(format!("{url} returned {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::unavailable(format!("failed to read response from {url}: {e}")))
    }
}

impl std::fmt::Debug for GoogleTrendsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTrendsClient")
            .field("base_url", &self.base_url)
            .field("category", &self.category)
            .field("paced", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TrendsProvider for GoogleTrendsClient {
    #[instrument(skip(self, params), fields(batch = %batch, geo = %params.geo, timeframe = %params.timeframe))]
    async fn interest_over_time(
        &self,
        batch: &Batch,
        params: &QueryParams,
    ) -> std::result::Result<Vec<TrendsRow>, FetchError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
        self.prime(params).await?;

        let tz = params.tz_offset.to_string();
        let explore_req = serde_json::to_string(&ExploreRequest::new(batch, params, self.category))
            .map_err(|e| FetchError::unavailable(format!("could not encode explore request: {e}")))?;
        let explore_url = format!("{}{EXPLORE_PATH}", self.base_url);
        let body = self
            .send(
                Method::POST,
                &explore_url,
                &[
                    ("hl", params.language.as_str()),
                    ("tz", tz.as_str()),
                    ("req", explore_req.as_str()),
                ],
            )
            .await?;
        let widget = parse_explore(&body)?;

        let widget_req = widget.request.to_string();
        let multiline_url = format!("{}{MULTILINE_PATH}", self.base_url);
        let body = self
            .send(
                Method::GET,
                &multiline_url,
                &[
                    ("hl", params.language.as_str()),
                    ("tz", tz.as_str()),
                    ("req", widget_req.as_str()),
                    ("token", widget.token.as_str()),
                ],
            )
            .await?;

        let rows = parse_timeline(&body, batch)?;
        info!("Received {} interest rows", rows.len());
        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "google-trends"
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExploreRequest<'a> {
    comparison_item: Vec<ComparisonItem<'a>>,
    category: u32,
    property: &'a str,
}

#[derive(Debug, Serialize)]
struct ComparisonItem<'a> {
    keyword: &'a str,
    time: &'a str,
    geo: &'a str,
}

impl<'a> ExploreRequest<'a> {
    fn new(batch: &'a Batch, params: &'a QueryParams, category: u32) -> Self {
        Self {
            comparison_item: batch
                .keywords()
                .iter()
                .map(|k| ComparisonItem {
                    keyword: k.as_str(),
                    time: &params.timeframe,
                    geo: &params.geo,
                })
                .collect(),
            category,
            property: "",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    request: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: Timeline,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Timeline {
    #[serde(default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelinePoint {
    time: String,
    #[serde(default)]
    value: Vec<u32>,
    #[serde(default)]
    has_data: Vec<bool>,
    #[serde(default)]
    is_partial: bool,
}

/// Responses start with an anti-XSSI guard such as `)]}'` before the JSON.
fn strip_guard(body: &str) -> &str {
    body.find('{').map_or(body, |i| &body[i..])
}

fn parse_explore(body: &str) -> std::result::Result<Widget, FetchError> {
    let response: ExploreResponse = serde_json::from_str(strip_guard(body))
        .map_err(|e| FetchError::unavailable(format!("unexpected explore response: {e}")))?;

    response
        .widgets
        .into_iter()
        .find(|w| w.id == TIMESERIES_WIDGET && !w.token.is_empty())
        .ok_or_else(|| FetchError::unavailable("explore response has no TIMESERIES widget"))
}

fn parse_timeline(body: &str, batch: &Batch) -> std::result::Result<Vec<TrendsRow>, FetchError> {
    let response: MultilineResponse = serde_json::from_str(strip_guard(body))
        .map_err(|e| FetchError::unavailable(format!("unexpected timeline response: {e}")))?;

    let points = response.default.timeline_data;
    if points.is_empty() {
        return Err(FetchError::no_data(batch.terms()));
    }

    let partial = points.iter().filter(|p| p.is_partial).count();
    if partial > 0 {
        debug!("{} partial data points in timeline", partial);
    }
    let without_data = points
        .iter()
        .flat_map(|p| &p.has_data)
        .filter(|has| !**has)
        .count();
    if without_data > 0 {
        debug!("{} timeline values flagged without data", without_data);
    }

    let mut rows = Vec::with_capacity(points.len() * batch.len());
    for point in &points {
        let date = point
            .time
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive())
            .ok_or_else(|| FetchError::unavailable(format!("bad timestamp '{}' in timeline", point.time)))?;

        // Values are positional; a short or long point cannot be attributed.
        if point.value.len() != batch.len() {
            warn!(
                "Timeline point {} has {} values for {} keywords",
                point.time,
                point.value.len(),
                batch.len()
            );
            return Err(FetchError::unavailable(format!(
                "timeline has {} values per point for {} keywords",
                point.value.len(),
                batch.len()
            )));
        }

        for (keyword, interest) in batch.keywords().iter().zip(&point.value) {
            rows.push(TrendsRow::new(date, keyword.clone(), *interest));
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwtrends_common::test_utils::{keywords, mock_date};

    const EXPLORE_BODY: &str = r#")]}'
{"widgets":[{"id":"GEO_MAP","token":"geo-token","request":{}},{"id":"TIMESERIES","token":"ts-token","request":{"time":"2024-01-01 2024-03-31","resolution":"DAY"}}]}"#;

    const TIMELINE_BODY: &str = r#")]}',
{"default":{"timelineData":[
{"time":"1704067200","formattedTime":"Jan 1, 2024","value":[40,12],"hasData":[true,true]},
{"time":"1704153600","formattedTime":"Jan 2, 2024","value":[55,0],"hasData":[true,false],"isPartial":true}
]}}"#;

    fn batch(terms: &[&str]) -> Batch {
        Batch::new(keywords(terms))
    }

    #[test]
    fn test_strip_guard() {
        assert_eq!(strip_guard(")]}'\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_guard("{}"), "{}");
        assert_eq!(strip_guard("garbage"), "garbage");
    }

    #[test]
    fn test_explore_request_shape() {
        let params = QueryParams::default();
        let batch = batch(&["cats", "dogs"]);
        let json = serde_json::to_value(ExploreRequest::new(&batch, &params, 0)).unwrap();
        assert_eq!(json["comparisonItem"][1]["keyword"], "dogs");
        assert_eq!(json["comparisonItem"][0]["time"], "today 3-m");
        assert_eq!(json["comparisonItem"][0]["geo"], "DE");
        assert_eq!(json["category"], 0);
        assert_eq!(json["property"], "");
    }

    #[test]
    fn test_parse_explore_picks_timeseries() {
        let widget = parse_explore(EXPLORE_BODY).unwrap();
        assert_eq!(widget.token, "ts-token");
        assert_eq!(widget.request["resolution"], "DAY");
    }

    #[test]
    fn test_parse_explore_without_timeseries() {
        let err = parse_explore(r#"{"widgets":[{"id":"GEO_MAP","token":"t"}]}"#).unwrap_err();
        assert_eq!(err.kind(), "unavailable");
    }

    #[test]
    fn test_parse_explore_html_is_unavailable() {
        let err = parse_explore("<html>sorry</html>").unwrap_err();
        assert_eq!(err.kind(), "unavailable");
    }

    #[test]
    fn test_parse_timeline_rows() {
        let rows = parse_timeline(TIMELINE_BODY, &batch(&["cats", "dogs"])).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].date, mock_date(2024, 1, 1));
        assert_eq!(rows[0].keyword.as_str(), "cats");
        assert_eq!(rows[0].interest, 40);
        assert_eq!(rows[3].date, mock_date(2024, 1, 2));
        assert_eq!(rows[3].keyword.as_str(), "dogs");
        assert_eq!(rows[3].interest, 0);
    }

    #[test]
    fn test_parse_empty_timeline_is_no_data() {
        let err = parse_timeline(r#"{"default":{"timelineData":[]}}"#, &batch(&["zzqx"])).unwrap_err();
        assert_eq!(err, FetchError::no_data(["zzqx"]));
    }

    #[test]
    fn test_parse_timeline_value_count_mismatch() {
        let body = r#"{"default":{"timelineData":[{"time":"1704067200","value":[40],"hasData":[true]}]}}"#;
        let err = parse_timeline(body, &batch(&["cats", "dogs"])).unwrap_err();
        assert_eq!(err.kind(), "unavailable");
        assert!(err.to_string().contains("1 values per point for 2 keywords"));
    }

    #[test]
    fn test_parse_timeline_bad_timestamp() {
        let body = r#"{"default":{"timelineData":[{"time":"soon","value":[1]}]}}"#;
        assert_eq!(parse_timeline(body, &batch(&["a"])).unwrap_err().kind(), "unavailable");
    }

    #[test]
    fn test_client_from_config() {
        let config = ProviderConfig {
            base_url: "https://trends.example.com/".to_string(),
            request_interval_seconds: 0,
            ..ProviderConfig::default()
        };
        let client = GoogleTrendsClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://trends.example.com");
        assert!(client.rate_limiter.is_none());
        assert_eq!(client.name(), "google-trends");

        let paced = GoogleTrendsClient::new(&ProviderConfig::default()).unwrap();
        assert!(paced.rate_limiter.is_some());
    }
}
