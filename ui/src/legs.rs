use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, error};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlElement};

use crate::dom::control_value;
use crate::render::{render_legs, Binding, Node};
use crate::state::{LegController, RenderAction, SharedStore, UiEvent};
use crate::theme::ThemePalette;

/// A listener that detaches itself when dropped.
struct Listener {
    target: Element,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// The leg cards inside the list container. Owns every listener it installs and drops
/// them all before each rebuild.
pub struct LegListView {
    container: Element,
    controller: LegController,
    listeners: RefCell<Vec<Listener>>,
    this: Weak<LegListView>,
}

impl LegListView {
    pub fn new(container: Element, store: SharedStore) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            container,
            controller: LegController::new(store),
            listeners: RefCell::new(Vec::new()),
            this: this.clone(),
        })
    }

    pub fn dispatch(&self, event: UiEvent) {
        if self.controller.handle(event) == RenderAction::Full {
            if let Err(err) = self.render() {
                error!(?err, "leg list render failed");
            }
        }
    }

    /// Rebuild every card from the store.
    pub fn render(&self) -> Result<(), JsValue> {
        let theme = ThemePalette::from_document();
        let nodes = render_legs(self.controller.store().borrow().list(), &theme);
        let doc = self
            .container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("leg list is detached"))?;

        self.listeners.borrow_mut().clear();
        self.container.set_inner_html("");

        let mut listeners = Vec::new();
        for node in &nodes {
            let el = self.build(&doc, node, &mut listeners)?;
            self.container.append_child(&el)?;
        }
        debug!(legs = nodes.len(), listeners = listeners.len(), "leg list rendered");
        *self.listeners.borrow_mut() = listeners;
        Ok(())
    }

    fn build(
        &self,
        doc: &Document,
        node: &Node,
        listeners: &mut Vec<Listener>,
    ) -> Result<Element, JsValue> {
        let el = doc.create_element(node.tag)?;
        for (name, value) in &node.attrs {
            el.set_attribute(name, value)?;
        }
        if let Some(html) = el.dyn_ref::<HtmlElement>() {
            let style = html.style();
            for (prop, value) in &node.styles {
                style.set_property(prop, value)?;
            }
        }
        if let Some(text) = &node.text {
            el.set_text_content(Some(text));
        }
        for child in &node.children {
            el.append_child(&self.build(doc, child, listeners)?)?;
        }
        if let Some(binding) = node.binding {
            listeners.push(self.bind(&el, binding)?);
        }
        Ok(el)
    }

    fn bind(&self, el: &Element, binding: Binding) -> Result<Listener, JsValue> {
        let this = self.this.clone();
        let handler: Box<dyn FnMut(Event)> = match binding {
            Binding::Edit { index, field } => {
                let control = el.clone();
                Box::new(move |_event: Event| {
                    if let Some(view) = this.upgrade() {
                        let value = control_value(&control);
                        view.dispatch(UiEvent::Edit {
                            index,
                            field,
                            value,
                        });
                    }
                })
            }
            // The rebuild drops this very listener, so it runs after the handler returns.
            Binding::Remove { index } => Box::new(move |_event: Event| {
                let this = this.clone();
                spawn_local(async move {
                    if let Some(view) = this.upgrade() {
                        view.dispatch(UiEvent::Remove(index));
                    }
                });
            }),
        };
        let closure = Closure::<dyn FnMut(Event)>::wrap(handler);
        el.add_event_listener_with_callback(binding.event(), closure.as_ref().unchecked_ref())?;
        Ok(Listener {
            target: el.clone(),
            event: binding.event(),
            closure,
        })
    }
}
