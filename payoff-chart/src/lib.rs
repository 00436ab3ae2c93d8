//! Payoff curve retrieval and rendering.
//!
//! [`ChartDataFetcher`] asks the payoff endpoint for a curve and hands it to a
//! [`ChartRenderer`], which keeps at most one live chart per page. The canvas
//! backend and the browser transport only exist on `wasm32`.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod fetch;
#[cfg(target_arch = "wasm32")]
pub mod http;
pub mod plot;
pub mod renderer;
pub mod series;

#[cfg(target_arch = "wasm32")]
pub use canvas::{CanvasChart, CanvasSurface};
pub use fetch::{
    request_url, CacheBuster, ChartDataFetcher, FetchError, FetchReport, LatestRequest,
    PageSnapshot, PayoffTransport, CACHE_BUST_PARAM,
};
#[cfg(target_arch = "wasm32")]
pub use http::BrowserTransport;
pub use plot::{PlotLayout, PlotModel, PlotStyle, Tooltip};
pub use renderer::{draw_shared, ChartError, ChartInstance, ChartRenderer, ChartSurface};
pub use series::{PayoffMetrics, PayoffResponse, PayoffSeries, ResponseOutcome};
