//! Small DOM lookups shared by the page glue.

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, Element, HtmlInputElement, HtmlSelectElement};

use crate::form::FormFields;

pub fn document() -> Result<Document, JsValue> {
    window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub fn by_id(doc: &Document, id: &str) -> Option<Element> {
    doc.get_element_by_id(id)
}

/// String-valued property of the global object, if set.
pub fn read_global(key: &str) -> Option<String> {
    Reflect::get(&js_sys::global(), &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_string())
}

/// Current value of an input or select; empty for anything else.
pub fn control_value(el: &Element) -> String {
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
        select.value()
    } else {
        String::new()
    }
}

/// Form inputs looked up by id in the live document.
pub struct DocumentFields {
    doc: Document,
}

impl DocumentFields {
    pub fn new(doc: Document) -> Self {
        Self { doc }
    }
}

impl FormFields for DocumentFields {
    fn value(&self, id: &str) -> Option<String> {
        by_id(&self.doc, id).map(|el| control_value(&el))
    }

    fn set_value(&mut self, id: &str, value: &str) {
        let input = by_id(&self.doc, id).and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        if let Some(input) = input {
            input.set_value(value);
        }
    }
}
