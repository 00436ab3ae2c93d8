use futures_util::future::LocalBoxFuture;
use gloo_net::http::Request;

use crate::fetch::{FetchError, PayoffTransport};

/// Browser `fetch` transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTransport;

impl PayoffTransport for BrowserTransport {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<String, FetchError>> {
        Box::pin(async move {
            let resp = Request::get(url)
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            resp.text()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))
        })
    }
}
