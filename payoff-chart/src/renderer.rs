use std::cell::RefCell;

use thiserror::Error;

use crate::plot::{PlotModel, PlotStyle};
use crate::series::PayoffSeries;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("payoff series has no finite points")]
    EmptySeries,
    #[error("chart surface failed: {0}")]
    Surface(String),
}

/// A drawn chart that holds resources (listeners, canvas state) until destroyed.
pub trait ChartInstance {
    fn destroy(&mut self);
}

/// Drawing backend: turns a plot model into a live chart instance.
pub trait ChartSurface {
    type Instance: ChartInstance;

    fn create(&mut self, model: &PlotModel) -> Result<Self::Instance, ChartError>;
}

/// Owns the page's single chart instance. Every draw tears the previous instance down
/// before building the next, so redraws never stack.
pub struct ChartRenderer<S: ChartSurface> {
    surface: S,
    style: PlotStyle,
    zero_line: bool,
    current: Option<S::Instance>,
}

impl<S: ChartSurface> ChartRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            style: PlotStyle::default(),
            zero_line: true,
            current: None,
        }
    }

    pub fn with_style(mut self, style: PlotStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_zero_line(mut self, zero_line: bool) -> Self {
        self.zero_line = zero_line;
        self
    }

    /// Replace the current chart with one for `series`. A series with no drawable points
    /// is rejected before the existing chart is touched.
    pub fn draw(&mut self, series: &PayoffSeries) -> Result<(), ChartError> {
        let model = PlotModel::build(series, self.style.clone(), self.zero_line)?;
        self.clear();
        self.current = Some(self.surface.create(&model)?);
        Ok(())
    }

    pub fn clear(&mut self) {
        if let Some(mut old) = self.current.take() {
            old.destroy();
        }
    }

    pub fn is_drawn(&self) -> bool {
        self.current.is_some()
    }

    pub fn instance(&self) -> Option<&S::Instance> {
        self.current.as_ref()
    }
}

impl<S: ChartSurface> Drop for ChartRenderer<S> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Draw `series` through a renderer shared with the rest of the page. A page without a
/// chart surface reports [`ChartError::Surface`].
pub fn draw_shared<S: ChartSurface>(
    renderer: Option<&RefCell<ChartRenderer<S>>>,
    series: &PayoffSeries,
) -> Result<(), ChartError> {
    let renderer = renderer.ok_or_else(|| ChartError::Surface("no canvas".into()))?;
    let mut renderer = renderer.borrow_mut();
    renderer.draw(series)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Surface that counts live and created instances.
    #[derive(Clone, Default)]
    pub(crate) struct CountingSurface {
        pub live: Rc<Cell<i32>>,
        pub created: Rc<Cell<u32>>,
        pub max_live: Rc<Cell<i32>>,
        pub fail: bool,
    }

    pub(crate) struct CountingInstance {
        live: Rc<Cell<i32>>,
        pub model: PlotModel,
    }

    impl ChartInstance for CountingInstance {
        fn destroy(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    impl ChartSurface for CountingSurface {
        type Instance = CountingInstance;

        fn create(&mut self, model: &PlotModel) -> Result<CountingInstance, ChartError> {
            if self.fail {
                return Err(ChartError::Surface("no 2d context".into()));
            }
            self.live.set(self.live.get() + 1);
            self.max_live.set(self.max_live.get().max(self.live.get()));
            self.created.set(self.created.get() + 1);
            Ok(CountingInstance {
                live: self.live.clone(),
                model: model.clone(),
            })
        }
    }

    fn series(y0: f64) -> PayoffSeries {
        PayoffSeries::new(None, vec![1.0, 2.0], vec![y0, 1.0])
    }

    #[test]
    fn redraw_destroys_previous_instance() {
        let surface = CountingSurface::default();
        let mut renderer = ChartRenderer::new(surface.clone());
        for i in 0..5 {
            renderer.draw(&series(-(i as f64))).unwrap();
        }
        assert_eq!(surface.created.get(), 5);
        assert_eq!(surface.live.get(), 1);
        assert_eq!(surface.max_live.get(), 1);
        assert_eq!(renderer.instance().unwrap().model.points[0], (1.0, -4.0));
    }

    #[test]
    fn empty_series_keeps_current_chart() {
        let surface = CountingSurface::default();
        let mut renderer = ChartRenderer::new(surface.clone());
        renderer.draw(&series(-1.0)).unwrap();
        let empty = PayoffSeries::new(None, Vec::new(), Vec::new());
        assert_eq!(renderer.draw(&empty), Err(ChartError::EmptySeries));
        assert!(renderer.is_drawn());
        assert_eq!(surface.live.get(), 1);
    }

    #[test]
    fn surface_failure_leaves_nothing_drawn() {
        let surface = CountingSurface::default();
        let mut renderer = ChartRenderer::new(surface.clone());
        renderer.draw(&series(-1.0)).unwrap();
        renderer.surface.fail = true;
        assert!(renderer.draw(&series(-2.0)).is_err());
        assert!(!renderer.is_drawn());
        assert_eq!(surface.live.get(), 0);
    }

    #[test]
    fn shared_renderer_draws_in_place() {
        let surface = CountingSurface::default();
        let shared = RefCell::new(ChartRenderer::new(surface.clone()));
        draw_shared(Some(&shared), &series(-1.0)).unwrap();
        draw_shared(Some(&shared), &series(-2.0)).unwrap();
        assert_eq!(surface.created.get(), 2);
        assert_eq!(surface.live.get(), 1);
        assert!(shared.try_borrow_mut().is_ok());

        let missing: Option<&RefCell<ChartRenderer<CountingSurface>>> = None;
        assert!(matches!(
            draw_shared(missing, &series(-1.0)),
            Err(ChartError::Surface(_))
        ));
    }

    #[test]
    fn dropping_renderer_releases_instance() {
        let surface = CountingSurface::default();
        {
            let mut renderer = ChartRenderer::new(surface.clone()).with_zero_line(false);
            renderer.draw(&series(-1.0)).unwrap();
            assert!(renderer.instance().unwrap().model.zero_line.is_none());
        }
        assert_eq!(surface.live.get(), 0);
    }
}
