//! Pure projection of the leg list into an element tree.
//!
//! Nothing here touches the DOM: [`render_legs`] returns [`Node`]s carrying the
//! attributes, inline styles and event [`Binding`]s the browser layer needs, so the
//! markup can be checked natively.

use strategy_core::{Leg, LegField, LegSide, OptionKind};

use crate::theme::ThemePalette;

pub const PLACEHOLDER: &str = "Choose…";
pub const DELETE_LABEL: &str = "Delete";

/// Event hook attached to a rendered control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// `input` on a field control of leg `index`.
    Edit { index: usize, field: LegField },
    /// `click` on a leg's delete button.
    Remove { index: usize },
}

impl Binding {
    pub fn event(&self) -> &'static str {
        match self {
            Binding::Edit { .. } => "input",
            Binding::Remove { .. } => "click",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub styles: Vec<(&'static str, String)>,
    pub text: Option<String>,
    pub children: Vec<Node>,
    pub binding: Option<Binding>,
}

impl Node {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// Boolean attribute such as `selected` or `required`.
    pub fn flag(self, name: &'static str) -> Self {
        self.attr(name, "")
    }

    pub fn styled(mut self, styles: &[(&'static str, String)]) -> Self {
        self.styles.extend_from_slice(styles);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn bind(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr_value(name).is_some()
    }

    /// Depth-first search over this node and its descendants.
    pub fn find_all(&self, pred: &dyn Fn(&Node) -> bool) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect(pred, &mut out);
        out
    }

    fn collect<'a>(&'a self, pred: &dyn Fn(&Node) -> bool, out: &mut Vec<&'a Node>) {
        if pred(self) {
            out.push(self);
        }
        for child in &self.children {
            child.collect(pred, out);
        }
    }

    pub fn field(&self, field: LegField) -> Option<&Node> {
        self.find_all(&|n| n.attr_value("data-field") == Some(field.name()))
            .into_iter()
            .next()
    }
}

pub fn leg_title(index: usize) -> String {
    format!("Leg {}", index + 1)
}

/// One card per leg, in list order. Theme colors are applied from the single palette
/// passed in.
pub fn render_legs(legs: &[Leg], theme: &ThemePalette) -> Vec<Node> {
    let styles = theme.control_styles();
    legs.iter()
        .enumerate()
        .map(|(index, leg)| render_leg(index, leg, &styles))
        .collect()
}

fn render_leg(index: usize, leg: &Leg, styles: &[(&'static str, String)]) -> Node {
    let sides = LegSide::ALL.map(|s| (s.as_str(), s.label()));
    let kinds = OptionKind::ALL.map(|k| (k.as_str(), k.label()));

    let mut head = Node::new("div")
        .attr("class", "leg-head")
        .child(Node::new("div").attr("class", "leg-title").text(leg_title(index)));
    if index > 0 {
        head = head.child(
            Node::new("button")
                .attr("type", "button")
                .attr("class", "btn danger remove-leg")
                .text(DELETE_LABEL)
                .bind(Binding::Remove { index }),
        );
    }

    let grid = Node::new("div")
        .attr("class", "leg-grid")
        .child(labeled("Action", selector(index, LegField::Side, &leg.side, &sides, styles)))
        .child(labeled("Type", selector(index, LegField::Kind, &leg.kind, &kinds, styles)))
        .child(labeled(
            "Strike (K)",
            number_input(index, LegField::Strike, leg, "any", styles).flag("required"),
        ))
        .child(labeled(
            "Premium",
            number_input(index, LegField::Price, leg, "any", styles).flag("required"),
        ))
        .child(labeled(
            "Qty",
            number_input(index, LegField::Qty, leg, "1", styles).attr("min", "1"),
        ));

    Node::new("div")
        .attr("class", "leg")
        .attr("data-index", index.to_string())
        .child(head)
        .child(grid)
}

fn labeled(label: &str, control: Node) -> Node {
    Node::new("label")
        .attr("class", "group")
        .child(Node::new("span").text(label))
        .child(control)
}

fn selector(
    index: usize,
    field: LegField,
    current: &str,
    choices: &[(&'static str, &'static str)],
    styles: &[(&'static str, String)],
) -> Node {
    let known = choices.iter().any(|(value, _)| *value == current);
    let mut placeholder = Node::new("option")
        .attr("value", "")
        .flag("disabled")
        .flag("hidden")
        .styled(styles)
        .text(PLACEHOLDER);
    if !known {
        placeholder = placeholder.flag("selected");
    }

    let mut select = Node::new("select")
        .attr("data-field", field.name())
        .flag("required")
        .styled(styles)
        .bind(Binding::Edit { index, field })
        .child(placeholder);
    for &(value, label) in choices {
        let mut option = Node::new("option").attr("value", value).styled(styles).text(label);
        if value == current {
            option = option.flag("selected");
        }
        select = select.child(option);
    }
    select
}

fn number_input(
    index: usize,
    field: LegField,
    leg: &Leg,
    step: &str,
    styles: &[(&'static str, String)],
) -> Node {
    Node::new("input")
        .attr("type", "number")
        .attr("step", step)
        .attr("data-field", field.name())
        .attr("value", leg.field_value(field))
        .styled(styles)
        .bind(Binding::Edit { index, field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategy_core::{parse_initial_legs, serialize_legs, LegStore};

    fn leg(kind: &str, side: &str, k: f64) -> Leg {
        let mut leg = Leg::new();
        leg.set_field(LegField::Kind, kind);
        leg.set_field(LegField::Side, side);
        leg.set_field(LegField::Strike, &k.to_string());
        leg
    }

    fn titles(cards: &[Node]) -> Vec<String> {
        cards
            .iter()
            .flat_map(|c| c.find_all(&|n| n.attr_value("class") == Some("leg-title")))
            .filter_map(|n| n.text.clone())
            .collect()
    }

    fn delete_buttons(card: &Node) -> usize {
        card.find_all(&|n| matches!(n.binding, Some(Binding::Remove { .. })))
            .len()
    }

    #[test]
    fn first_card_has_no_delete_control() {
        let legs = vec![Leg::new(), Leg::new(), Leg::new()];
        let cards = render_legs(&legs, &ThemePalette::default());
        assert_eq!(titles(&cards), ["Leg 1", "Leg 2", "Leg 3"]);
        assert_eq!(delete_buttons(&cards[0]), 0);
        assert_eq!(delete_buttons(&cards[1]), 1);
        assert_eq!(cards[2].attr_value("data-index"), Some("2"));
    }

    #[test]
    fn seeded_leg_renders_once_and_reserializes_unchanged() {
        let seed = r#"[{"type":"call","side":"long","K":100,"price":5,"Q":2}]"#;
        let store = LegStore::seeded(parse_initial_legs(Some(seed)));
        let cards = render_legs(store.list(), &ThemePalette::default());
        assert_eq!(cards.len(), 1);
        assert_eq!(titles(&cards), ["Leg 1"]);
        assert_eq!(
            cards[0].field(LegField::Strike).unwrap().attr_value("value"),
            Some("100")
        );
        assert_eq!(
            cards[0].field(LegField::Qty).unwrap().attr_value("value"),
            Some("2")
        );
        assert_eq!(serialize_legs(store.list()).unwrap().json, seed);
    }

    #[test]
    fn unset_selectors_show_placeholder() {
        let cards = render_legs(&[Leg::new()], &ThemePalette::default());
        let side = cards[0].field(LegField::Side).unwrap();
        let selected: Vec<&Node> = side.find_all(&|n| n.tag == "option" && n.has_attr("selected"));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].text.as_deref(), Some(PLACEHOLDER));
        assert!(selected[0].has_attr("disabled"));
    }

    #[test]
    fn filled_leg_selects_its_values() {
        let cards = render_legs(&[leg("put", "short", 95.5)], &ThemePalette::default());
        let kind = cards[0].field(LegField::Kind).unwrap();
        let selected = kind.find_all(&|n| n.tag == "option" && n.has_attr("selected"));
        assert_eq!(selected[0].attr_value("value"), Some("put"));
        assert_eq!(selected[0].text.as_deref(), Some("Put"));

        let strike = cards[0].field(LegField::Strike).unwrap();
        assert_eq!(strike.attr_value("value"), Some("95.5"));
        assert_eq!(strike.attr_value("step"), Some("any"));
        let qty = cards[0].field(LegField::Qty).unwrap();
        assert_eq!(qty.attr_value("value"), Some("1"));
        assert_eq!(qty.attr_value("min"), Some("1"));
    }

    #[test]
    fn edit_bindings_target_their_leg() {
        let cards = render_legs(&[Leg::new(), Leg::new()], &ThemePalette::default());
        let price = cards[1].field(LegField::Price).unwrap();
        assert_eq!(
            price.binding,
            Some(Binding::Edit {
                index: 1,
                field: LegField::Price
            })
        );
        assert_eq!(price.binding.unwrap().event(), "input");
    }

    #[test]
    fn controls_carry_theme_colors() {
        let theme = ThemePalette {
            panel: "#123456".into(),
            text: "#abcdef".into(),
        };
        let cards = render_legs(&[Leg::new()], &theme);
        let themed = cards[0].find_all(&|n| matches!(n.tag, "select" | "option" | "input"));
        assert!(!themed.is_empty());
        for node in themed {
            assert!(node.styles.contains(&("background-color", "#123456".to_string())));
            assert!(node.styles.contains(&("color", "#abcdef".to_string())));
        }
    }
}
