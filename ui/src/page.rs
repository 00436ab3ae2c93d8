use std::cell::RefCell;
use std::rc::Rc;

use strategy_core::{parse_initial_legs, LegStore};
use tracing::{debug, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event};

use crate::chart::PayoffChart;
use crate::config::PageConfig;
use crate::dom::{by_id, document, DocumentFields};
use crate::form::{handle_submit, SubmitVerdict};
use crate::legs::LegListView;
use crate::state::{shared_store, LegController, SharedStore, UiEvent};
use crate::telemetry;
use crate::theme::ThemePalette;

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

/// Everything the strategy form page keeps alive after startup.
pub struct Page {
    doc: Document,
    store: SharedStore,
    legs: Option<Rc<LegListView>>,
    chart: PayoffChart,
    _listeners: Vec<(Element, Closure<dyn FnMut(Event)>)>,
}

impl Page {
    fn mount(doc: Document, config: PageConfig) -> Result<Self, JsValue> {
        let seed = by_id(&doc, &config.ids.initial_legs).and_then(|el| el.text_content());
        let store = shared_store(LegStore::seeded(parse_initial_legs(seed.as_deref())));
        info!(legs = store.borrow().list().len(), "strategy form starting");

        let legs = match by_id(&doc, &config.ids.legs_list) {
            Some(container) => {
                let view = LegListView::new(container, store.clone());
                view.render()?;
                Some(view)
            }
            None => {
                debug!(id = %config.ids.legs_list, "no leg container on this page");
                None
            }
        };

        let mut listeners = Vec::new();
        if let (Some(button), Some(view)) = (by_id(&doc, &config.ids.add_leg), &legs) {
            let view = Rc::downgrade(view);
            let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |event: Event| {
                event.prevent_default();
                if let Some(view) = view.upgrade() {
                    view.dispatch(UiEvent::Add);
                }
            }));
            button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            listeners.push((button, closure));
        }

        if let Some(form) = by_id(&doc, &config.ids.form) {
            let store = store.clone();
            let config = config.clone();
            let mut fields = DocumentFields::new(doc.clone());
            let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |event: Event| {
                let verdict = handle_submit(store.borrow().list(), &mut fields, &config);
                if let SubmitVerdict::Abort(message) = verdict {
                    event.prevent_default();
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(&message);
                    }
                }
            }));
            form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())?;
            listeners.push((form, closure));
        }

        let chart = PayoffChart::new(&doc, &config, &ThemePalette::from_document());
        chart.refresh(&doc);

        Ok(Self {
            doc,
            store,
            legs,
            chart,
            _listeners: listeners,
        })
    }

    pub fn legs_json(&self) -> Result<String, JsValue> {
        strategy_core::serialize_legs(self.store.borrow().list())
            .map(|s| s.json)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Mount the page once; a second call keeps the existing page.
pub fn bootstrap() -> Result<(), JsValue> {
    let doc = document()?;
    let config = PageConfig::from_document(&doc);
    telemetry::init(config.log_level);
    if PAGE.with(|p| p.borrow().is_some()) {
        debug!("page already mounted");
        return Ok(());
    }
    let page = Page::mount(doc, config)?;
    PAGE.with(|p| *p.borrow_mut() = Some(page));
    Ok(())
}

/// Run `f` against the mounted page.
pub fn with_page<R>(f: impl FnOnce(&Page) -> R) -> Result<R, JsValue> {
    PAGE.with(|p| match p.borrow().as_ref() {
        Some(page) => Ok(f(page)),
        None => Err(JsValue::from_str("page not mounted")),
    })
}

impl Page {
    pub fn refresh_chart(&self) {
        self.chart.refresh(&self.doc);
    }

    /// Edit a leg from outside the form. The list is rebuilt so the controls show it.
    pub fn set_leg_field(&self, index: usize, name: &str, value: &str) -> Result<(), JsValue> {
        let event = UiEvent::edit_named(index, name, value)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        match &self.legs {
            Some(view) => {
                view.dispatch(event);
                view.render()
            }
            None => {
                LegController::new(self.store.clone()).handle(event);
                Ok(())
            }
        }
    }

    pub fn rerender_legs(&self) -> Result<(), JsValue> {
        match &self.legs {
            Some(view) => view.render(),
            None => Ok(()),
        }
    }
}
