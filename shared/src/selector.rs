//! Multi-select category picker state.
//!
//! Selection is an ordered sequence with set semantics enforced here, at the
//! only two places that mutate it. Order is click order and is preserved all
//! the way into the request body.

use serde::{Deserialize, Serialize};

use crate::category::Category;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySelector {
    selected: Vec<Category>,
    open: bool,
}

impl CategorySelector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes `category` if selected, otherwise appends it.
    /// Returns whether it is selected afterwards.
    pub fn toggle(&mut self, category: Category) -> bool {
        if self.remove(category) {
            false
        } else {
            self.selected.push(category);
            true
        }
    }

    /// Unconditional removal; returns whether anything was removed.
    /// Never touches the open flag.
    pub fn remove(&mut self, category: Category) -> bool {
        match self.selected.iter().position(|c| *c == category) {
            Some(index) => {
                self.selected.remove(index);
                true
            }
            None => false,
        }
    }

    /// Flips the picker open/closed; returns the new state.
    pub fn toggle_open(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn selected(&self) -> &[Category] {
        &self.selected
    }

    #[must_use]
    pub fn contains(&self, category: Category) -> bool {
        self.selected.contains(&category)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn toggle_appends_in_click_order() {
        let mut selector = CategorySelector::new();
        assert!(selector.toggle(Category::Jailbreaking));
        assert!(selector.toggle(Category::PromptInjection));
        assert_eq!(
            selector.selected(),
            &[Category::Jailbreaking, Category::PromptInjection]
        );
    }

    #[test]
    fn toggle_twice_deselects() {
        let mut selector = CategorySelector::new();
        selector.toggle(Category::DataLeakage);
        assert!(!selector.toggle(Category::DataLeakage));
        assert!(selector.is_empty());
    }

    #[test]
    fn reselecting_moves_to_the_end() {
        let mut selector = CategorySelector::new();
        selector.toggle(Category::DataLeakage);
        selector.toggle(Category::CodeInjection);
        selector.toggle(Category::DataLeakage);
        selector.toggle(Category::DataLeakage);
        assert_eq!(
            selector.selected(),
            &[Category::CodeInjection, Category::DataLeakage]
        );
    }

    #[test]
    fn remove_is_idempotent() {
        let mut selector = CategorySelector::new();
        selector.toggle(Category::ModelEvasion);
        selector.toggle(Category::LogicFlaws);

        assert!(selector.remove(Category::ModelEvasion));
        assert_eq!(selector.len(), 1);
        assert!(!selector.remove(Category::ModelEvasion));
        assert_eq!(selector.len(), 1);
    }

    #[test]
    fn remove_does_not_touch_open_state() {
        let mut selector = CategorySelector::new();
        selector.toggle(Category::ModelEvasion);
        assert!(!selector.is_open());
        selector.remove(Category::ModelEvasion);
        assert!(!selector.is_open());

        selector.toggle_open();
        selector.toggle(Category::ModelEvasion);
        selector.remove(Category::ModelEvasion);
        assert!(selector.is_open());
    }

    #[test]
    fn toggle_open_flips() {
        let mut selector = CategorySelector::new();
        assert!(selector.toggle_open());
        assert!(!selector.toggle_open());
    }

    fn any_category() -> impl Strategy<Value = Category> {
        (0..Category::ALL.len()).prop_map(|i| Category::ALL[i])
    }

    proptest! {
        #[test]
        fn toggles_keep_odd_counts_without_duplicates(
            clicks in proptest::collection::vec(any_category(), 0..64)
        ) {
            let mut selector = CategorySelector::new();
            for c in &clicks {
                selector.toggle(*c);
            }

            // Reference: a category ends selected iff clicked an odd number of
            // times, positioned by the click that last selected it.
            let mut expected: Vec<Category> = Vec::new();
            for c in &clicks {
                match expected.iter().position(|e| e == c) {
                    Some(i) => { expected.remove(i); }
                    None => expected.push(*c),
                }
            }

            prop_assert_eq!(selector.selected(), expected.as_slice());
            for category in Category::ALL {
                let count = clicks.iter().filter(|c| **c == category).count();
                prop_assert_eq!(selector.contains(category), count % 2 == 1);
                prop_assert!(selector.selected().iter().filter(|c| **c == category).count() <= 1);
            }
        }

        #[test]
        fn double_remove_never_changes_size(
            clicks in proptest::collection::vec(any_category(), 0..32),
            target in any_category(),
        ) {
            let mut selector = CategorySelector::new();
            for c in &clicks {
                selector.toggle(*c);
            }
            selector.remove(target);
            let after_first = selector.len();
            prop_assert!(!selector.remove(target));
            prop_assert_eq!(selector.len(), after_first);
        }
    }
}
