use strategy_core::SubmitRules;
use tracing::Level;

/// Ids of the page elements the front end attaches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    pub form: String,
    pub legs_list: String,
    pub legs_json: String,
    pub initial_legs: String,
    pub add_leg: String,
    pub start: String,
    pub stop: String,
    pub step: String,
    pub canvas: String,
    pub summary: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            form: "params-form".into(),
            legs_list: "legs-list".into(),
            legs_json: "legs_json".into(),
            initial_legs: "initial-legs-json".into(),
            add_leg: "add-leg".into(),
            start: "start".into(),
            stop: "stop".into(),
            step: "by".into(),
            canvas: "payoffCanvas".into(),
            summary: "payoff-desc".into(),
        }
    }
}

/// Page-level settings. Defaults apply unless the form's `data-*` attributes or the
/// `PAYOFF_*` window globals say otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub ids: ElementIds,
    pub json_url: Option<String>,
    pub zero_line: bool,
    pub enforce_domain_order: bool,
    pub auto_extend_stop: bool,
    pub log_level: Level,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            ids: ElementIds::default(),
            json_url: None,
            zero_line: true,
            enforce_domain_order: true,
            auto_extend_stop: true,
            log_level: Level::INFO,
        }
    }
}

impl PageConfig {
    /// Apply the form's attributes; `attr` returns the value of a `data-*` attribute by
    /// its full name.
    pub fn with_form_attrs<F>(mut self, attr: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = attr("data-json-url").filter(|u| !u.trim().is_empty()) {
            self.json_url = Some(url);
        }
        let flag = |name: &str| attr(name).as_deref().and_then(parse_flag);
        if let Some(on) = flag("data-zero-line") {
            self.zero_line = on;
        }
        if let Some(on) = flag("data-enforce-order") {
            self.enforce_domain_order = on;
        }
        if let Some(on) = flag("data-auto-stop") {
            self.auto_extend_stop = on;
        }
        self
    }

    /// Apply window globals: `PAYOFF_JSON_URL` when the form named no endpoint, and
    /// `PAYOFF_LOG_LEVEL`.
    pub fn with_globals<F>(mut self, global: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.json_url.is_none() {
            self.json_url = global("PAYOFF_JSON_URL").filter(|u| !u.trim().is_empty());
        }
        if let Some(level) = global("PAYOFF_LOG_LEVEL").as_deref().and_then(parse_level) {
            self.log_level = level;
        }
        self
    }

    pub fn submit_rules(&self) -> SubmitRules {
        SubmitRules {
            enforce_domain_order: self.enforce_domain_order,
            auto_extend_stop: self.auto_extend_stop,
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_document(doc: &web_sys::Document) -> Self {
        let config = Self::default();
        let form = doc.get_element_by_id(&config.ids.form);
        config
            .with_form_attrs(|name| form.as_ref().and_then(|f| f.get_attribute(name)))
            .with_globals(crate::dom::read_global)
    }
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_level(raw: &str) -> Option<Level> {
    raw.trim().parse().ok()
}
