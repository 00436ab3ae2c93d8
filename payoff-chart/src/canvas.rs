use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use js_sys::Array;
use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use crate::plot::{axis_ticks, format_tick, PlotLayout, PlotModel, X_AXIS_TITLE, Y_AXIS_TITLE};
use crate::renderer::{ChartError, ChartInstance, ChartSurface};

const X_TICKS: usize = 7;
const Y_TICKS: usize = 6;

fn surface_error(err: JsValue) -> ChartError {
    ChartError::Surface(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// 2D canvas backend for [`crate::ChartRenderer`].
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }
}

impl ChartSurface for CanvasSurface {
    type Instance = CanvasChart;

    fn create(&mut self, model: &PlotModel) -> Result<CanvasChart, ChartError> {
        CanvasChart::mount(self.canvas.clone(), model.clone())
    }
}

struct Painter {
    ctx: CanvasRenderingContext2d,
    model: PlotModel,
    layout: PlotLayout,
    hover: Option<usize>,
}

type MouseListener = (&'static str, Closure<dyn FnMut(MouseEvent)>);

/// A painted chart plus the hover listeners it installed on the canvas.
pub struct CanvasChart {
    canvas: HtmlCanvasElement,
    painter: Rc<RefCell<Painter>>,
    listeners: Vec<MouseListener>,
}

impl CanvasChart {
    fn mount(canvas: HtmlCanvasElement, model: PlotModel) -> Result<Self, ChartError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(surface_error)?
            .ok_or_else(|| ChartError::Surface("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ChartError::Surface("unexpected context type".into()))?;
        let (width, height) = fit_backing_store(&canvas, &ctx)?;
        let layout = PlotLayout::new(&model, width, height);
        debug!(width, height, points = model.points.len(), "mounting payoff chart");

        let painter = Rc::new(RefCell::new(Painter {
            ctx,
            model,
            layout,
            hover: None,
        }));
        painter.borrow().paint();

        let mut chart = Self {
            canvas,
            painter,
            listeners: Vec::new(),
        };

        let painter = chart.painter.clone();
        let canvas = chart.canvas.clone();
        chart.listen("mousemove", move |event: MouseEvent| {
            let rect = canvas.get_bounding_client_rect();
            let px = event.client_x() as f64 - rect.left();
            let py = event.client_y() as f64 - rect.top();
            let mut p = painter.borrow_mut();
            let hover = if p.layout.contains(px, py) {
                let x = p.layout.px_to_x(px);
                p.model.nearest_index(x)
            } else {
                None
            };
            if hover != p.hover {
                p.hover = hover;
                p.paint();
            }
        })?;

        let painter = chart.painter.clone();
        chart.listen("mouseleave", move |_event: MouseEvent| {
            let mut p = painter.borrow_mut();
            if p.hover.take().is_some() {
                p.paint();
            }
        })?;

        Ok(chart)
    }

    fn listen<F>(&mut self, event: &'static str, handler: F) -> Result<(), ChartError>
    where
        F: FnMut(MouseEvent) + 'static,
    {
        let closure = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(handler));
        self.canvas
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(surface_error)?;
        self.listeners.push((event, closure));
        Ok(())
    }
}

impl ChartInstance for CanvasChart {
    fn destroy(&mut self) {
        for (event, closure) in self.listeners.drain(..) {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
        let p = self.painter.borrow();
        p.ctx.clear_rect(0.0, 0.0, p.layout.width, p.layout.height);
    }
}

// Size the backing store to the element's CSS box times the device pixel ratio, then
// scale the context so drawing happens in CSS pixels.
fn fit_backing_store(
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
) -> Result<(f64, f64), ChartError> {
    let rect = canvas.get_bounding_client_rect();
    let (width, height) = if rect.width() >= 1.0 && rect.height() >= 1.0 {
        (rect.width(), rect.height())
    } else {
        (canvas.width() as f64, canvas.height() as f64)
    };
    let ratio = web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .max(1.0);

    let style = canvas.style();
    style
        .set_property("width", &format!("{width}px"))
        .map_err(surface_error)?;
    style
        .set_property("height", &format!("{height}px"))
        .map_err(surface_error)?;
    canvas.set_width((width * ratio).round() as u32);
    canvas.set_height((height * ratio).round() as u32);
    ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0)
        .map_err(surface_error)?;
    Ok((width, height))
}

impl Painter {
    fn paint(&self) {
        let ctx = &self.ctx;
        ctx.clear_rect(0.0, 0.0, self.layout.width, self.layout.height);
        self.paint_grid();
        self.paint_titles();
        self.paint_zero_line();
        self.paint_spot();
        self.paint_curve();
        self.paint_breakevens();
        if let Some(index) = self.hover {
            self.paint_tooltip(index);
        }
    }

    fn paint_grid(&self) {
        let ctx = &self.ctx;
        let style = &self.model.style;
        let area = self.layout.area;
        let (x0, x1) = self.layout.x_range();
        let (y0, y1) = self.layout.y_range();

        ctx.set_stroke_style_str(&style.grid_color);
        ctx.set_fill_style_str(&style.text_color);
        ctx.set_line_width(1.0);
        ctx.set_font(&style.font);

        ctx.set_text_align("center");
        ctx.set_text_baseline("top");
        for x in axis_ticks(x0, x1, X_TICKS) {
            let px = self.layout.x_to_px(x);
            ctx.begin_path();
            ctx.move_to(px, area.top);
            ctx.line_to(px, area.top + area.height);
            ctx.stroke();
            ctx.fill_text(&format_tick(x, x1 - x0), px, area.top + area.height + 6.0)
                .unwrap_or_default();
        }

        ctx.set_text_align("right");
        ctx.set_text_baseline("middle");
        for y in axis_ticks(y0, y1, Y_TICKS) {
            let py = self.layout.y_to_px(y);
            ctx.begin_path();
            ctx.move_to(area.left, py);
            ctx.line_to(area.left + area.width, py);
            ctx.stroke();
            ctx.fill_text(&format_tick(y, y1 - y0), area.left - 8.0, py)
                .unwrap_or_default();
        }
    }

    fn paint_titles(&self) {
        let ctx = &self.ctx;
        let style = &self.model.style;
        let area = self.layout.area;

        ctx.set_fill_style_str(&style.title_color);
        ctx.set_font(&style.title_font);
        ctx.set_text_align("center");
        ctx.set_text_baseline("top");
        ctx.fill_text(&self.model.title, self.layout.width / 2.0, 12.0)
            .unwrap_or_default();

        ctx.set_fill_style_str(&style.text_color);
        ctx.set_font(&style.font);
        ctx.set_text_baseline("bottom");
        ctx.fill_text(X_AXIS_TITLE, area.left + area.width / 2.0, self.layout.height - 4.0)
            .unwrap_or_default();

        ctx.save();
        ctx.translate(14.0, area.top + area.height / 2.0).unwrap_or_default();
        ctx.rotate(-PI / 2.0).unwrap_or_default();
        ctx.set_text_baseline("middle");
        ctx.fill_text(Y_AXIS_TITLE, 0.0, 0.0).unwrap_or_default();
        ctx.restore();
    }

    fn paint_zero_line(&self) {
        let Some([(xa, ya), (xb, yb)]) = self.model.zero_line else {
            return;
        };
        let ctx = &self.ctx;
        let style = &self.model.style;
        let [dash, gap] = style.zero_line_dash;

        ctx.set_stroke_style_str(&style.zero_line_color);
        ctx.set_line_width(style.zero_line_width);
        ctx.set_line_dash(&Array::of2(&JsValue::from_f64(dash), &JsValue::from_f64(gap)))
            .unwrap_or_default();
        ctx.begin_path();
        ctx.move_to(self.layout.x_to_px(xa), self.layout.y_to_px(ya));
        ctx.line_to(self.layout.x_to_px(xb), self.layout.y_to_px(yb));
        ctx.stroke();
        ctx.set_line_dash(&Array::new()).unwrap_or_default();
    }

    fn paint_spot(&self) {
        let Some(spot) = self.model.spot else {
            return;
        };
        let ctx = &self.ctx;
        let style = &self.model.style;
        let area = self.layout.area;
        let px = self.layout.x_to_px(spot);
        let [dash, gap] = style.zero_line_dash;

        ctx.set_stroke_style_str(&style.grid_color);
        ctx.set_line_width(1.0);
        ctx.set_line_dash(&Array::of2(&JsValue::from_f64(dash), &JsValue::from_f64(gap)))
            .unwrap_or_default();
        ctx.begin_path();
        ctx.move_to(px, area.top);
        ctx.line_to(px, area.top + area.height);
        ctx.stroke();
        ctx.set_line_dash(&Array::new()).unwrap_or_default();

        ctx.set_fill_style_str(&style.text_color);
        ctx.set_font(&style.font);
        ctx.set_text_align("left");
        ctx.set_text_baseline("top");
        ctx.fill_text(&format!("S0 {spot:.2}"), px + 4.0, area.top + 4.0)
            .unwrap_or_default();
    }

    fn paint_curve(&self) {
        let ctx = &self.ctx;
        let style = &self.model.style;
        let mut points = self
            .model
            .points
            .iter()
            .map(|&(x, y)| (self.layout.x_to_px(x), self.layout.y_to_px(y)));
        let Some((x, y)) = points.next() else {
            return;
        };

        ctx.set_stroke_style_str(&style.line_color);
        ctx.set_line_width(style.line_width);
        ctx.set_line_join("round");
        ctx.begin_path();
        ctx.move_to(x, y);
        for (x, y) in points {
            ctx.line_to(x, y);
        }
        ctx.stroke();
    }

    fn paint_breakevens(&self) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(&self.model.style.line_color);
        for &b in &self.model.breakevens {
            ctx.begin_path();
            ctx.arc(self.layout.x_to_px(b), self.layout.y_to_px(0.0), 4.0, 0.0, 2.0 * PI)
                .unwrap_or_default();
            ctx.fill();
        }
    }

    fn paint_tooltip(&self, index: usize) {
        let (Some(&(x, y)), Some(tip)) = (self.model.points.get(index), self.model.tooltip(index))
        else {
            return;
        };
        let ctx = &self.ctx;
        let style = &self.model.style;
        let area = self.layout.area;
        let px = self.layout.x_to_px(x);
        let py = self.layout.y_to_px(y);

        ctx.set_stroke_style_str(&style.grid_color);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(px, area.top);
        ctx.line_to(px, area.top + area.height);
        ctx.stroke();

        ctx.set_fill_style_str(&style.line_color);
        ctx.begin_path();
        ctx.arc(px, py, 4.0, 0.0, 2.0 * PI).unwrap_or_default();
        ctx.fill();

        ctx.set_font(&style.font);
        let text_width = |text: &str| {
            ctx.measure_text(text)
                .map(|m| m.width())
                .unwrap_or(text.len() as f64 * 7.0)
        };
        let box_w = text_width(&tip.title).max(text_width(&tip.body)) + 16.0;
        let box_h = 40.0;
        let mut bx = px + 12.0;
        if bx + box_w > self.layout.width {
            bx = px - 12.0 - box_w;
        }
        let by = (py - box_h / 2.0).clamp(0.0, (self.layout.height - box_h).max(0.0));

        ctx.set_fill_style_str(&style.tooltip_background);
        ctx.fill_rect(bx, by, box_w, box_h);
        ctx.set_fill_style_str(&style.text_color);
        ctx.set_text_align("left");
        ctx.set_text_baseline("top");
        ctx.fill_text(&tip.title, bx + 8.0, by + 6.0).unwrap_or_default();
        ctx.fill_text(&tip.body, bx + 8.0, by + 22.0).unwrap_or_default();
    }
}
