//! Wires the payoff fetcher and canvas renderer into the page.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use js_sys::Date;
use payoff_chart::{
    draw_shared, BrowserTransport, CanvasSurface, ChartDataFetcher, ChartRenderer, FetchReport,
    PageSnapshot, PlotStyle,
};
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlCanvasElement};

use crate::config::PageConfig;
use crate::dom::{by_id, control_value};
use crate::theme::ThemePalette;

/// The page's payoff chart: one renderer, one fetcher, for the life of the page.
pub struct PayoffChart {
    config: PageConfig,
    renderer: Option<Rc<RefCell<ChartRenderer<CanvasSurface>>>>,
    fetcher: Rc<ChartDataFetcher<BrowserTransport>>,
    summary: Option<Element>,
}

impl PayoffChart {
    pub fn new(doc: &Document, config: &PageConfig, theme: &ThemePalette) -> Self {
        let renderer = by_id(doc, &config.ids.canvas)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .map(|canvas| {
                let style = PlotStyle::default().with_text_color(theme.text.clone());
                let renderer = ChartRenderer::new(CanvasSurface::new(canvas))
                    .with_style(style)
                    .with_zero_line(config.zero_line);
                Rc::new(RefCell::new(renderer))
            });
        Self {
            config: config.clone(),
            renderer,
            fetcher: Rc::new(ChartDataFetcher::new(BrowserTransport)),
            summary: by_id(doc, &config.ids.summary),
        }
    }

    fn snapshot(&self, doc: &Document) -> PageSnapshot {
        let ids = &self.config.ids;
        let input = |id: &str| by_id(doc, id).map(|el| control_value(&el)).unwrap_or_default();
        let query = doc
            .location()
            .and_then(|loc| loc.search().ok())
            .unwrap_or_default();
        PageSnapshot {
            json_url: self.config.json_url.clone(),
            query,
            start: input(&ids.start),
            stop: input(&ids.stop),
            step: input(&ids.step),
            has_canvas: self.renderer.is_some(),
        }
    }

    /// Fetch the curve for the page's query string and redraw, after the current task
    /// yields so page setup finishes first. Empty domain inputs skip the fetch.
    pub fn refresh(&self, doc: &Document) {
        let page = self.snapshot(doc);
        let fetcher = self.fetcher.clone();
        let renderer = self.renderer.clone();
        let summary = self.summary.clone();
        spawn_local(async move {
            TimeoutFuture::new(0).await;
            let report = fetcher
                .fetch_and_draw(&page, Date::now() as u64, |series| {
                    if let (Some(el), Some(desc)) = (&summary, series.desc.as_deref()) {
                        el.set_text_content(Some(desc));
                    }
                    draw_shared(renderer.as_deref(), &series)
                })
                .await;
            if report != FetchReport::Skipped {
                debug!(?report, "payoff chart refresh finished");
            }
        });
    }
}
