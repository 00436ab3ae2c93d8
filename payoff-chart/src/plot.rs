use crate::renderer::ChartError;
use crate::series::PayoffSeries;

pub const X_AXIS_TITLE: &str = "Underlying price at expiry (S_T)";
pub const Y_AXIS_TITLE: &str = "Profit / Loss";

/// Colors and strokes for one chart. Text color follows the page theme.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    pub line_color: String,
    pub line_width: f64,
    pub zero_line_color: String,
    pub zero_line_width: f64,
    pub zero_line_dash: [f64; 2],
    pub grid_color: String,
    pub text_color: String,
    pub title_color: String,
    pub tooltip_background: String,
    pub font: String,
    pub title_font: String,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            line_color: "whitesmoke".into(),
            line_width: 3.0,
            zero_line_color: "rgba(255,255,255,.7)".into(),
            zero_line_width: 1.5,
            zero_line_dash: [6.0, 4.0],
            grid_color: "rgba(255,255,255,.08)".into(),
            text_color: "#e6edf7".into(),
            title_color: "white".into(),
            tooltip_background: "#0f1724".into(),
            font: "12px 'Inter', sans-serif".into(),
            title_font: "18px 'Inter', sans-serif".into(),
        }
    }
}

impl PlotStyle {
    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = color.into();
        self
    }
}

/// Hover readout for one point.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub title: String,
    pub body: String,
}

impl Tooltip {
    pub fn for_point(x: f64, y: f64) -> Self {
        Self {
            title: format!("S_T: {x}"),
            body: format!("Payoff: {y:.2}"),
        }
    }
}

/// Everything a surface needs to draw one payoff chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotModel {
    pub title: String,
    pub label: String,
    /// Finite points in input order.
    pub points: Vec<(f64, f64)>,
    /// Dashed y = 0 reference spanning the curve's x extent.
    pub zero_line: Option<[(f64, f64); 2]>,
    pub breakevens: Vec<f64>,
    /// Current underlying price, when it falls on the curve's x extent.
    pub spot: Option<f64>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub style: PlotStyle,
}

impl PlotModel {
    pub fn build(series: &PayoffSeries, style: PlotStyle, zero_line: bool) -> Result<Self, ChartError> {
        let points: Vec<(f64, f64)> = series
            .points()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if points.is_empty() {
            return Err(ChartError::EmptySeries);
        }

        let (x_min, x_max) = extent(points.iter().map(|p| p.0));
        let (mut y_min, mut y_max) = extent(points.iter().map(|p| p.1));
        if zero_line {
            y_min = y_min.min(0.0);
            y_max = y_max.max(0.0);
        }
        let pad = (y_max - y_min) * 0.05;

        let title = match &series.name {
            Some(name) => format!("Payoff Diagram: {name}"),
            None => "Payoff Diagram".to_string(),
        };
        let breakevens: Vec<f64> = series
            .metrics
            .as_ref()
            .map(|m| {
                m.breakevens
                    .iter()
                    .copied()
                    .filter(|b| b.is_finite() && *b >= x_min && *b <= x_max)
                    .collect()
            })
            .unwrap_or_default();

        let spot = series
            .spot
            .filter(|s| s.is_finite() && *s >= x_min && *s <= x_max);

        Ok(Self {
            title,
            label: series.label().to_string(),
            zero_line: zero_line.then_some([(x_min, 0.0), (x_max, 0.0)]),
            breakevens,
            spot,
            x_range: widen(x_min, x_max),
            y_range: widen(y_min - pad, y_max + pad),
            points,
            style,
        })
    }

    /// Index of the point closest to `x` along the horizontal axis.
    pub fn nearest_index(&self, x: f64) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 .0 - x).abs().total_cmp(&(b.1 .0 - x).abs()))
            .map(|(i, _)| i)
    }

    pub fn tooltip(&self, index: usize) -> Option<Tooltip> {
        self.points.get(index).map(|&(x, y)| Tooltip::for_point(x, y))
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

// Degenerate ranges get a unit of room on each side so scales stay invertible.
fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}

/// Evenly spaced tick values across `[min, max]`, endpoints included.
pub fn axis_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count < 2 || !(max > min) {
        return Vec::new();
    }
    let step = (max - min) / (count as f64 - 1.0);
    (0..count).map(|i| min + step * i as f64).collect()
}

/// Tick label precision based on the visible span.
pub fn format_tick(value: f64, span: f64) -> String {
    if span >= 20.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Pixel rectangle of the plotting area inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Maps data coordinates to canvas pixels for a given canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLayout {
    pub width: f64,
    pub height: f64,
    pub area: PlotArea,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 48.0;

impl PlotLayout {
    pub fn new(model: &PlotModel, width: f64, height: f64) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let area = PlotArea {
            left: MARGIN_LEFT.min(width * 0.25),
            top: MARGIN_TOP.min(height * 0.25),
            width: (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        };
        Self {
            width,
            height,
            area,
            x_range: model.x_range,
            y_range: model.y_range,
        }
    }

    pub fn x_to_px(&self, x: f64) -> f64 {
        let (lo, hi) = self.x_range;
        self.area.left + (x - lo) / (hi - lo) * self.area.width
    }

    pub fn y_to_px(&self, y: f64) -> f64 {
        let (lo, hi) = self.y_range;
        self.area.top + (1.0 - (y - lo) / (hi - lo)) * self.area.height
    }

    pub fn px_to_x(&self, px: f64) -> f64 {
        let (lo, hi) = self.x_range;
        lo + (px - self.area.left) / self.area.width * (hi - lo)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.area.left
            && px <= self.area.left + self.area.width
            && py >= self.area.top
            && py <= self.area.top + self.area.height
    }

    pub fn x_range(&self) -> (f64, f64) {
        self.x_range
    }

    pub fn y_range(&self) -> (f64, f64) {
        self.y_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PayoffMetrics;

    fn series() -> PayoffSeries {
        PayoffSeries::new(
            Some("Long call".into()),
            vec![80.0, 90.0, 100.0, 110.0, 120.0],
            vec![-5.0, -5.0, -5.0, 5.0, 15.0],
        )
    }

    #[test]
    fn zero_line_spans_curve_extent() {
        let model = PlotModel::build(&series(), PlotStyle::default(), true).unwrap();
        assert_eq!(model.zero_line, Some([(80.0, 0.0), (120.0, 0.0)]));
        assert_eq!(model.title, "Payoff Diagram: Long call");
        assert_eq!(model.label, "Long call");

        let plain = PlotModel::build(&series(), PlotStyle::default(), false).unwrap();
        assert!(plain.zero_line.is_none());
    }

    #[test]
    fn y_range_includes_zero_when_reference_shown() {
        let s = PayoffSeries::new(None, vec![1.0, 2.0], vec![3.0, 5.0]);
        let model = PlotModel::build(&s, PlotStyle::default(), true).unwrap();
        assert!(model.y_range.0 <= 0.0);
        assert_eq!(model.title, "Payoff Diagram");
        let model = PlotModel::build(&s, PlotStyle::default(), false).unwrap();
        assert!(model.y_range.0 > 0.0);
    }

    #[test]
    fn tooltip_reports_price_and_rounded_payoff() {
        let s = PayoffSeries::new(None, vec![100.0, 101.5], vec![1.23456, -0.005]);
        let model = PlotModel::build(&s, PlotStyle::default(), true).unwrap();
        let tip = model.tooltip(model.nearest_index(100.2).unwrap()).unwrap();
        assert_eq!(tip.title, "S_T: 100");
        assert_eq!(tip.body, "Payoff: 1.23");
        let tip = model.tooltip(model.nearest_index(105.0).unwrap()).unwrap();
        assert_eq!(tip.title, "S_T: 101.5");
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let s = PayoffSeries::new(None, vec![1.0, f64::NAN], vec![1.0, 2.0]);
        let model = PlotModel::build(&s, PlotStyle::default(), true).unwrap();
        assert_eq!(model.points.len(), 1);
        let empty = PayoffSeries::new(None, Vec::new(), Vec::new());
        assert_eq!(
            PlotModel::build(&empty, PlotStyle::default(), true),
            Err(ChartError::EmptySeries)
        );
    }

    #[test]
    fn breakevens_outside_range_are_ignored() {
        let mut s = series();
        s.metrics = Some(PayoffMetrics {
            breakevens: vec![105.0, 300.0],
            ..PayoffMetrics::default()
        });
        let model = PlotModel::build(&s, PlotStyle::default(), true).unwrap();
        assert_eq!(model.breakevens, vec![105.0]);
    }

    #[test]
    fn spot_marker_only_inside_curve() {
        let mut s = series();
        s.spot = Some(101.0);
        let model = PlotModel::build(&s, PlotStyle::default(), true).unwrap();
        assert_eq!(model.spot, Some(101.0));
        s.spot = Some(500.0);
        let model = PlotModel::build(&s, PlotStyle::default(), true).unwrap();
        assert_eq!(model.spot, None);
    }

    #[test]
    fn layout_maps_extremes_to_plot_edges() {
        let model = PlotModel::build(&series(), PlotStyle::default(), true).unwrap();
        let layout = PlotLayout::new(&model, 640.0, 400.0);
        assert!((layout.x_to_px(80.0) - layout.area.left).abs() < 1e-9);
        assert!((layout.x_to_px(120.0) - (layout.area.left + layout.area.width)).abs() < 1e-9);
        assert!((layout.px_to_x(layout.x_to_px(97.5)) - 97.5).abs() < 1e-9);
        assert!(layout.y_to_px(model.y_range.1) < layout.y_to_px(model.y_range.0));
    }

    #[test]
    fn ticks_cover_range() {
        assert_eq!(axis_ticks(0.0, 10.0, 3), vec![0.0, 5.0, 10.0]);
        assert!(axis_ticks(1.0, 1.0, 5).is_empty());
        assert_eq!(format_tick(12.346, 5.0), "12.35");
        assert_eq!(format_tick(120.0, 50.0), "120");
    }
}
