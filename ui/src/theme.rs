//! Colors for generated form controls, read from the page's CSS custom properties.

pub const DEFAULT_PANEL: &str = "#0d1520";
pub const DEFAULT_TEXT: &str = "#e6edf7";

/// Background and text colors applied to dynamically created selects, options and
/// inputs so they match the surrounding panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePalette {
    pub panel: String,
    pub text: String,
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self {
            panel: DEFAULT_PANEL.to_string(),
            text: DEFAULT_TEXT.to_string(),
        }
    }
}

impl ThemePalette {
    /// Resolve the palette through `lookup`, which returns the raw value of a custom
    /// property. `--panel-2` wins over `--panel`; blanks count as unset.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            panel: read("--panel-2")
                .or_else(|| read("--panel"))
                .unwrap_or_else(|| DEFAULT_PANEL.to_string()),
            text: read("--text").unwrap_or_else(|| DEFAULT_TEXT.to_string()),
        }
    }

    pub fn control_styles(&self) -> Vec<(&'static str, String)> {
        vec![
            ("background-color", self.panel.clone()),
            ("color", self.text.clone()),
        ]
    }

    /// Computed style of the document root, or the defaults outside a page.
    #[cfg(target_arch = "wasm32")]
    pub fn from_document() -> Self {
        let computed = web_sys::window().and_then(|w| {
            let root = w.document()?.document_element()?;
            w.get_computed_style(&root).ok().flatten()
        });
        match computed {
            Some(css) => Self::resolve(|name| css.get_property_value(name).ok()),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn palette(props: &[(&str, &str)]) -> ThemePalette {
        let props: HashMap<String, String> = props
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ThemePalette::resolve(|name| props.get(name).cloned())
    }

    #[test]
    fn panel_two_takes_precedence() {
        let p = palette(&[("--panel", "#111"), ("--panel-2", " #222 "), ("--text", "#eee")]);
        assert_eq!(p.panel, "#222");
        assert_eq!(p.text, "#eee");
    }

    #[test]
    fn falls_back_to_panel_then_defaults() {
        assert_eq!(palette(&[("--panel", "#111"), ("--panel-2", "  ")]).panel, "#111");
        assert_eq!(palette(&[]), ThemePalette::default());
    }
}
