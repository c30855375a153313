//! Category selection state.
//!
//! Only explicit inclusion renders a place: an empty selection renders
//! nothing. This is distinct from the unloaded state, where no category
//! dataset is available and every place renders with default styling.
//!
//! ```rust
//! use geoview::{Category, CategoryFilterState, Place};
//!
//! let categories = vec![Category::new("c1", "Leaders"), Category::new("c2", "Voters")];
//! let places = vec![
//!     Place::new("1", "Ana", -23.5, -46.6).with_category("c1"),
//!     Place::new("2", "Bia", -23.6, -46.7).with_category("c2"),
//! ];
//!
//! let mut state = CategoryFilterState::new();
//! state.load_categories(&categories);
//! assert!(state.eligible(&places).is_empty());
//!
//! state.toggle("c1");
//! assert_eq!(state.eligible(&places).len(), 1);
//! ```

use geoview_types::{Category, Place};
use rustc_hash::FxHashSet;

/// Selection state for category-based eligibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilterState {
    /// `None` until a category dataset is loaded.
    selected: Option<FxHashSet<String>>,
}

/// Categories sharing a `type_id`, for the type-grouped selection UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub type_id: Option<String>,
    pub type_name: Option<String>,
    pub category_ids: Vec<String>,
}

/// Tri-state of a group's checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSelection {
    All,
    Partial,
    None,
}

impl CategoryFilterState {
    /// Unloaded state: no category dataset yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh, empty selection for a newly loaded category dataset.
    pub fn load_categories(&mut self, categories: &[Category]) {
        log::debug!(
            "Category dataset loaded with {} categories; selection reset",
            categories.len()
        );
        self.selected = Some(FxHashSet::default());
    }

    /// Drop back to the unloaded (degraded) state after a failed load.
    pub fn mark_unavailable(&mut self) {
        log::warn!("Category dataset unavailable; rendering all places with default styling");
        self.selected = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.selected.is_some()
    }

    /// Number of selected categories. Zero when unloaded.
    pub fn len(&self) -> usize {
        self.selected.as_ref().map_or(0, FxHashSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_selected(&self, category_id: &str) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|set| set.contains(category_id))
    }

    /// Selected ids in sorted order.
    pub fn selected_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .selected
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// The selected set, or `None` while unloaded. Mutators are no-ops in
    /// degraded mode so it keeps rendering every place.
    fn set_mut(&mut self) -> Option<&mut FxHashSet<String>> {
        if self.selected.is_none() {
            log::debug!("Ignoring selection change: no category dataset loaded");
        }
        self.selected.as_mut()
    }

    /// Flip one category. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, category_id: &str) -> bool {
        let Some(set) = self.set_mut() else {
            return false;
        };
        if set.remove(category_id) {
            false
        } else {
            set.insert(category_id.to_string());
            true
        }
    }

    pub fn select_all<I, S>(&mut self, category_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(set) = self.set_mut() {
            set.clear();
            set.extend(category_ids.into_iter().map(Into::into));
        }
    }

    pub fn select_none(&mut self) {
        if let Some(set) = self.set_mut() {
            set.clear();
        }
    }

    pub fn select_only(&mut self, category_id: &str) {
        if let Some(set) = self.set_mut() {
            set.clear();
            set.insert(category_id.to_string());
        }
    }

    /// Add every id of a group, keeping the rest of the selection.
    pub fn select_group<I, S>(&mut self, category_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(set) = self.set_mut() {
            set.extend(category_ids.into_iter().map(Into::into));
        }
    }

    /// Remove every id of a group, keeping the rest of the selection.
    pub fn deselect_group<I, S>(&mut self, category_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(set) = self.set_mut() {
            for id in category_ids {
                set.remove(id.as_ref());
            }
        }
    }

    /// Checkbox state for a group of category ids.
    pub fn group_state(&self, group: &CategoryGroup) -> GroupSelection {
        let selected = group
            .category_ids
            .iter()
            .filter(|id| self.is_selected(id))
            .count();

        if selected == 0 {
            GroupSelection::None
        } else if selected == group.category_ids.len() {
            GroupSelection::All
        } else {
            GroupSelection::Partial
        }
    }

    /// Whether a place passes the selection.
    ///
    /// When unloaded every place passes. Otherwise the place's category must
    /// be selected; uncategorized places never pass.
    pub fn admits(&self, place: &Place) -> bool {
        match &self.selected {
            None => true,
            Some(set) => place
                .category_id
                .as_deref()
                .is_some_and(|id| set.contains(id)),
        }
    }

    /// The eligible subset, in dataset order.
    pub fn eligible<'a>(&self, places: &'a [Place]) -> Vec<&'a Place> {
        places.iter().filter(|p| self.admits(p)).collect()
    }
}

/// Group categories by `type_id`, preserving first-seen order of both
/// groups and members. Categories without a type share one group.
pub fn group_by_type(categories: &[Category]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for category in categories {
        match groups.iter_mut().find(|g| g.type_id == category.type_id) {
            Some(group) => group.category_ids.push(category.id.clone()),
            None => groups.push(CategoryGroup {
                type_id: category.type_id.clone(),
                type_name: category.type_name.clone(),
                category_ids: vec![category.id.clone()],
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Category> {
        vec![
            Category::new("c1", "Leaders").with_type("t1", "People"),
            Category::new("c2", "Voters").with_type("t1", "People"),
            Category::new("c3", "Schools").with_type("t2", "Places"),
            Category::new("c4", "Misc"),
        ]
    }

    fn places() -> Vec<Place> {
        vec![
            Place::new("1", "a", -23.5, -46.6).with_category("c1"),
            Place::new("2", "b", -23.5, -46.6).with_category("c2"),
            Place::new("3", "c", -23.5, -46.6).with_category("c3"),
            Place::new("4", "d", -23.5, -46.6),
            Place::new("5", "e", -23.5, -46.6).with_category("gone"),
        ]
    }

    fn loaded() -> CategoryFilterState {
        let mut state = CategoryFilterState::new();
        state.load_categories(&categories());
        state
    }

    #[test]
    fn test_empty_selection_renders_nothing() {
        let state = loaded();
        assert!(state.is_loaded());
        assert!(state.is_empty());
        assert!(state.eligible(&places()).is_empty());
    }

    #[test]
    fn test_unloaded_renders_everything() {
        let state = CategoryFilterState::new();
        assert!(!state.is_loaded());
        assert_eq!(state.eligible(&places()).len(), 5);

        let mut state = loaded();
        state.toggle("c1");
        state.mark_unavailable();
        assert_eq!(state.eligible(&places()).len(), 5);
    }

    #[test]
    fn test_toggle() {
        let mut state = loaded();
        assert!(state.toggle("c1"));
        assert!(state.is_selected("c1"));
        assert!(!state.toggle("c1"));
        assert!(!state.is_selected("c1"));
    }

    #[test]
    fn test_select_all_none_only() {
        let mut state = loaded();
        state.select_all(["c1", "c2", "c3", "c4"]);
        assert_eq!(state.len(), 4);
        let all_places = places();
        let ids: Vec<&str> = state
            .eligible(&all_places)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        state.select_only("c3");
        assert_eq!(state.selected_ids(), vec!["c3"]);

        state.select_none();
        assert!(state.is_empty());
        assert!(state.eligible(&places()).is_empty());
    }

    #[test]
    fn test_dangling_and_uncategorized_never_eligible() {
        let mut state = loaded();
        state.select_all(categories().iter().map(|c| c.id.clone()));
        let all_places = places();
        let eligible = state.eligible(&all_places);
        assert!(eligible.iter().all(|p| p.id != "4" && p.id != "5"));
    }

    #[test]
    fn test_group_selection() {
        let groups = group_by_type(&categories());
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].category_ids, vec!["c1", "c2"]);
        assert_eq!(groups[2].type_id, None);

        let mut state = loaded();
        state.select_only("c3");
        state.select_group(groups[0].category_ids.iter().cloned());
        assert_eq!(state.selected_ids(), vec!["c1", "c2", "c3"]);
        assert_eq!(state.group_state(&groups[0]), GroupSelection::All);

        state.toggle("c2");
        assert_eq!(state.group_state(&groups[0]), GroupSelection::Partial);

        state.deselect_group(&groups[0].category_ids);
        assert_eq!(state.selected_ids(), vec!["c3"]);
        assert_eq!(state.group_state(&groups[0]), GroupSelection::None);
    }

    #[test]
    fn test_mutators_keep_degraded_mode() {
        let mut state = CategoryFilterState::new();
        assert!(!state.toggle("c1"));
        state.select_all(["c1", "c2"]);
        state.select_only("c3");
        state.select_group(["c1"]);
        state.deselect_group(["c2"]);
        state.select_none();

        assert!(!state.is_loaded());
        assert_eq!(state.eligible(&places()).len(), 5);
    }

    #[test]
    fn test_reload_resets_selection() {
        let mut state = loaded();
        state.toggle("c1");
        state.load_categories(&categories());
        assert!(state.is_empty());
    }
}
