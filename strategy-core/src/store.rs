use crate::leg::{Leg, LegField};

/// Ordered leg collection backing the form.
///
/// Always holds at least one leg and the first leg cannot be removed. Positions are
/// display-significant: the leg at index `i` is shown as "Leg {i + 1}".
#[derive(Debug, Clone, PartialEq)]
pub struct LegStore {
    legs: Vec<Leg>,
}

impl LegStore {
    /// A store holding a single empty leg.
    pub fn new() -> Self {
        Self {
            legs: vec![Leg::new()],
        }
    }

    /// Seed from previously submitted legs, falling back to a single empty leg.
    pub fn seeded(initial: Option<Vec<Leg>>) -> Self {
        match initial {
            Some(legs) if !legs.is_empty() => Self { legs },
            _ => Self::new(),
        }
    }

    /// Append an empty leg and return its index.
    pub fn add(&mut self) -> usize {
        self.legs.push(Leg::new());
        self.legs.len() - 1
    }

    /// Remove the leg at `index`. Index 0 and out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<Leg> {
        if index == 0 || index >= self.legs.len() {
            return None;
        }
        Some(self.legs.remove(index))
    }

    /// Apply a raw form value to one field of one leg. Returns false when `index` is
    /// out of range.
    pub fn update_field(&mut self, index: usize, field: LegField, raw: &str) -> bool {
        match self.legs.get_mut(index) {
            Some(leg) => {
                leg.set_field(field, raw);
                true
            }
            None => false,
        }
    }

    pub fn list(&self) -> &[Leg] {
        &self.legs
    }

    pub fn first(&self) -> &Leg {
        &self.legs[0]
    }
}

impl Default for LegStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strike_leg(k: &str) -> Leg {
        let mut leg = Leg::new();
        leg.set_field(LegField::Strike, k);
        leg
    }

    #[test]
    fn add_appends_default_leg() {
        let mut store = LegStore::new();
        let idx = store.add();
        assert_eq!(idx, 1);
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.list()[1], Leg::new());
        assert_eq!(store.list()[1].qty, 1);
    }

    #[test]
    fn first_leg_is_never_removed() {
        let mut store = LegStore::new();
        assert!(store.remove(0).is_none());
        store.add();
        assert!(store.remove(0).is_none());
        assert!(store.remove(5).is_none());
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn add_remove_sequences_keep_a_leg() {
        // Deterministic LCG drives a long mix of adds and removes.
        let mut store = LegStore::new();
        let mut seed: u64 = 0x2545_f491;
        for _ in 0..2_000 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let roll = (seed >> 33) as usize;
            if roll % 3 == 0 {
                store.add();
            } else {
                let len = store.list().len();
                let target = roll % (len + 1);
                let removed = store.remove(target);
                if target == 0 {
                    assert!(removed.is_none());
                }
            }
            assert!(!store.list().is_empty());
        }
    }

    #[test]
    fn remove_shifts_later_legs_down() {
        let mut store = LegStore::seeded(Some(vec![
            strike_leg("90"),
            strike_leg("100"),
            strike_leg("110"),
        ]));
        let removed = store.remove(1);
        assert_eq!(removed.and_then(|l| l.strike), Some(100.0));
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.list()[1].strike, Some(110.0));
    }

    #[test]
    fn update_field_coerces_and_ignores_bad_index() {
        let mut store = LegStore::new();
        assert!(store.update_field(0, LegField::Qty, "0"));
        assert_eq!(store.first().qty, 1);
        assert!(store.update_field(0, LegField::Qty, "3.7"));
        assert_eq!(store.first().qty, 3);
        assert!(store.update_field(0, LegField::Strike, ""));
        assert_eq!(store.first().strike, None);
        assert!(!store.update_field(4, LegField::Price, "1"));
    }

    #[test]
    fn seeded_with_nothing_uses_default_leg() {
        assert_eq!(LegStore::seeded(None), LegStore::new());
        assert_eq!(LegStore::seeded(Some(Vec::new())), LegStore::new());
    }
}
