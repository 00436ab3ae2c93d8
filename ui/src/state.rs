use std::cell::RefCell;
use std::rc::Rc;

use strategy_core::{LegError, LegField, LegStore};
use tracing::debug;

/// The page's leg collection, shared between the list view and the submit handler.
pub type SharedStore = Rc<RefCell<LegStore>>;

pub fn shared_store(store: LegStore) -> SharedStore {
    Rc::new(RefCell::new(store))
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Add,
    Remove(usize),
    Edit {
        index: usize,
        field: LegField,
        value: String,
    },
}

impl UiEvent {
    /// Edit addressed by the field's wire name (`type`, `side`, `K`, `price`, `Q`).
    pub fn edit_named(index: usize, name: &str, value: &str) -> Result<Self, LegError> {
        Ok(UiEvent::Edit {
            index,
            field: name.parse()?,
            value: value.to_string(),
        })
    }
}

/// What the list view has to do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderAction {
    /// The controls already show the new value.
    Keep,
    /// Indices or titles changed; rebuild the list.
    Full,
}

/// Maps UI events onto store mutations.
pub struct LegController {
    store: SharedStore,
}

impl LegController {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn handle(&self, event: UiEvent) -> RenderAction {
        let mut store = self.store.borrow_mut();
        match event {
            UiEvent::Add => {
                let index = store.add();
                debug!(index, "leg added");
                RenderAction::Full
            }
            UiEvent::Remove(index) => match store.remove(index) {
                Some(_) => {
                    debug!(index, remaining = store.list().len(), "leg removed");
                    RenderAction::Full
                }
                None => RenderAction::Keep,
            },
            UiEvent::Edit {
                index,
                field,
                value,
            } => {
                store.update_field(index, field, &value);
                RenderAction::Keep
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render_legs, Node};
    use crate::theme::ThemePalette;

    fn edit(index: usize, field: LegField, value: &str) -> UiEvent {
        UiEvent::Edit {
            index,
            field,
            value: value.to_string(),
        }
    }

    fn controller() -> LegController {
        LegController::new(shared_store(LegStore::new()))
    }

    #[test]
    fn edits_never_rerender() {
        let c = controller();
        for (field, value) in [
            (LegField::Side, "long"),
            (LegField::Kind, "call"),
            (LegField::Strike, "100"),
            (LegField::Qty, "3.7"),
        ] {
            assert_eq!(c.handle(edit(0, field, value)), RenderAction::Keep);
        }
        let store = c.store().borrow();
        assert_eq!(store.first().qty, 3);
        assert_eq!(store.first().strike, Some(100.0));
    }

    #[test]
    fn named_edits_use_wire_names() {
        let c = controller();
        let event = UiEvent::edit_named(0, "K", "105").unwrap();
        assert_eq!(c.handle(event), RenderAction::Keep);
        assert_eq!(c.store().borrow().first().strike, Some(105.0));
        assert_eq!(
            UiEvent::edit_named(0, "strike", "105"),
            Err(LegError::UnknownField("strike".into()))
        );
    }

    #[test]
    fn structural_changes_rerender() {
        let c = controller();
        assert_eq!(c.handle(UiEvent::Add), RenderAction::Full);
        assert_eq!(c.handle(UiEvent::Remove(1)), RenderAction::Full);
        assert_eq!(c.handle(UiEvent::Remove(0)), RenderAction::Keep);
        assert_eq!(c.handle(UiEvent::Remove(7)), RenderAction::Keep);
        assert_eq!(c.store().borrow().list().len(), 1);
    }

    #[test]
    fn removing_middle_leg_renumbers() {
        let c = controller();
        c.handle(UiEvent::Add);
        c.handle(UiEvent::Add);
        for (i, k) in ["90", "100", "110"].into_iter().enumerate() {
            c.handle(edit(i, LegField::Strike, k));
        }
        c.handle(UiEvent::Remove(1));

        let cards = render_legs(c.store().borrow().list(), &ThemePalette::default());
        let titles: Vec<String> = cards
            .iter()
            .flat_map(|card| card.find_all(&|n: &Node| n.attr_value("class") == Some("leg-title")))
            .filter_map(|n| n.text.clone())
            .collect();
        assert_eq!(titles, ["Leg 1", "Leg 2"]);
        let second_strike = cards[1].field(LegField::Strike).unwrap();
        assert_eq!(second_strike.attr_value("value"), Some("110"));
        assert_eq!(cards[1].attr_value("data-index"), Some("1"));
    }
}
