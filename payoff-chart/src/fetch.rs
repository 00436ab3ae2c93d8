use std::cell::Cell;

use futures_util::future::LocalBoxFuture;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::renderer::ChartError;
use crate::series::{PayoffResponse, PayoffSeries, ResponseOutcome};

/// Query parameter carrying the cache-defeating token.
pub const CACHE_BUST_PARAM: &str = "cb";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("could not decode payoff response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("payoff response has no '{0}' series")]
    MissingSeries(&'static str),
}

/// HTTP GET returning the response body, whatever the status code.
pub trait PayoffTransport {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<String, FetchError>>;
}

/// What the page exposes to the fetcher: the endpoint, its own query string, the domain
/// inputs and whether a canvas exists. The inputs only gate the request; the URL carries
/// `query` unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSnapshot {
    pub json_url: Option<String>,
    pub query: String,
    pub start: String,
    pub stop: String,
    pub step: String,
    pub has_canvas: bool,
}

impl PageSnapshot {
    pub fn has_domain(&self) -> bool {
        !self.start.is_empty() && !self.stop.is_empty() && !self.step.is_empty()
    }

    /// Endpoint to call, if the page has everything a chart needs.
    pub fn endpoint(&self) -> Option<&str> {
        let url = self.json_url.as_deref().filter(|u| !u.is_empty())?;
        (self.has_canvas && self.has_domain()).then_some(url)
    }
}

/// Hands out strictly increasing tokens, even for calls within the same millisecond.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: Cell<u64>,
}

impl CacheBuster {
    pub fn token(&self, now_ms: u64) -> u64 {
        let next = now_ms.max(self.last.get().saturating_add(1));
        self.last.set(next);
        next
    }
}

/// Tickets for in-flight requests; only the most recently issued one may draw.
#[derive(Debug, Default)]
pub struct LatestRequest {
    issued: Cell<u64>,
}

impl LatestRequest {
    pub fn begin(&self) -> u64 {
        let ticket = self.issued.get() + 1;
        self.issued.set(ticket);
        ticket
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.issued.get() == ticket
    }
}

/// `base` plus the page's query parameters and a fresh `cb` token. Any `cb` already in
/// the page query is replaced.
pub fn request_url(base: &str, page_query: &str, token: u64) -> String {
    let token = format!("{CACHE_BUST_PARAM}={token}");
    let mut params: Vec<&str> = page_query
        .trim_start_matches('?')
        .split('&')
        .filter(|p| !p.is_empty())
        .filter(|p| p.split('=').next() != Some(CACHE_BUST_PARAM))
        .collect();
    params.push(token.as_str());
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}{}", params.join("&"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchReport {
    /// The page lacks an endpoint, a domain or a canvas.
    Skipped,
    Drawn,
    /// The server answered with an `errors` list.
    Rejected(Vec<String>),
    /// Network, decode or draw failure.
    Failed(String),
    /// A later request was started before this one finished.
    Superseded,
}

/// Requests the payoff curve and passes it on to a drawing callback.
///
/// Failures are logged and reported, never raised: the chart is an optional part of
/// the page.
pub struct ChartDataFetcher<T> {
    transport: T,
    cache: CacheBuster,
    latest: LatestRequest,
}

impl<T: PayoffTransport> ChartDataFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            cache: CacheBuster::default(),
            latest: LatestRequest::default(),
        }
    }

    /// Request URL for this invocation, or `None` when the page is not ready for a chart.
    pub fn request_for(&self, page: &PageSnapshot, now_ms: u64) -> Option<String> {
        let base = page.endpoint()?;
        Some(request_url(base, &page.query, self.cache.token(now_ms)))
    }

    pub async fn fetch(&self, url: &str) -> Result<ResponseOutcome, FetchError> {
        let body = self.transport.get(url).await?;
        PayoffResponse::decode(&body)?.into_outcome()
    }

    /// One request, at most one draw. A response that arrives after a newer request was
    /// issued is dropped.
    pub async fn fetch_and_draw<F>(
        &self,
        page: &PageSnapshot,
        now_ms: u64,
        draw: F,
    ) -> FetchReport
    where
        F: FnOnce(PayoffSeries) -> Result<(), ChartError>,
    {
        let Some(url) = self.request_for(page, now_ms) else {
            debug!("payoff chart skipped: missing endpoint, domain or canvas");
            return FetchReport::Skipped;
        };
        let ticket = self.latest.begin();
        let result = self.fetch(&url).await;
        if !self.latest.is_current(ticket) {
            debug!(%url, "payoff response superseded by a newer request");
            return FetchReport::Superseded;
        }
        match result {
            Ok(ResponseOutcome::Series(series)) => match draw(series) {
                Ok(()) => FetchReport::Drawn,
                Err(err) => {
                    error!(%err, "payoff chart draw failed");
                    FetchReport::Failed(err.to_string())
                }
            },
            Ok(ResponseOutcome::ServerErrors(errors)) => {
                warn!(?errors, "payoff endpoint reported errors");
                FetchReport::Rejected(errors)
            }
            Err(err) => {
                error!(%err, %url, "payoff request failed");
                FetchReport::Failed(err.to_string())
            }
        }
    }
}
