// ── Store state ──
//
// Everything the UI reads except the saved-beverage list, which lives in
// its own collection owned by the listener task.

use crate::error::CoreError;
use crate::model::{Base, Component, ComponentKind, Creamer, Syrup, Temperature};

pub(crate) const NAME_REQUIRED: &str = "Please enter a name for your beverage";
pub(crate) const COMPONENTS_REQUIRED: &str = "Please ensure all beverage components are selected";

/// Lifecycle of a store, derived from its status flags.
///
/// `Uninitialized → Initializing → Ready`, with `Initializing → Failed`
/// and `Failed → Initializing` on retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// A blocking, user-facing message raised by a store action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
}

/// Snapshot of the store's selection and status fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreState {
    pub temps: Vec<Temperature>,
    pub current_temp: Option<Temperature>,
    pub bases: Vec<Base>,
    pub current_base: Option<Base>,
    pub creamers: Vec<Creamer>,
    pub current_creamer: Option<Creamer>,
    pub syrups: Vec<Syrup>,
    pub current_syrup: Option<Syrup>,
    pub beverage_name: String,
    pub selected_beverage_id: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_initialized: bool,
}

/// Everything `make_beverage` needs, pulled out of a validated state.
#[derive(Debug, Clone)]
pub(crate) struct Draft {
    pub name: String,
    pub base: Base,
    pub creamer: Creamer,
    pub syrup: Syrup,
    pub temperature: Temperature,
}

impl StoreState {
    pub(crate) fn new(temps: Vec<Temperature>) -> Self {
        Self {
            current_temp: temps.first().cloned(),
            temps,
            ..Self::default()
        }
    }

    pub fn status(&self) -> StoreStatus {
        if self.is_initialized {
            StoreStatus::Ready
        } else if self.is_loading {
            StoreStatus::Initializing
        } else if self.error.is_some() {
            StoreStatus::Failed
        } else {
            StoreStatus::Uninitialized
        }
    }

    /// Loaded options of one kind.
    pub fn components(&self, kind: ComponentKind) -> &[Component] {
        match kind {
            ComponentKind::Base => &self.bases,
            ComponentKind::Creamer => &self.creamers,
            ComponentKind::Syrup => &self.syrups,
        }
    }

    /// Current selection of one kind.
    pub fn current_component(&self, kind: ComponentKind) -> Option<&Component> {
        match kind {
            ComponentKind::Base => self.current_base.as_ref(),
            ComponentKind::Creamer => self.current_creamer.as_ref(),
            ComponentKind::Syrup => self.current_syrup.as_ref(),
        }
    }

    pub(crate) fn set_components(&mut self, kind: ComponentKind, components: Vec<Component>) {
        match kind {
            ComponentKind::Base => self.bases = components,
            ComponentKind::Creamer => self.creamers = components,
            ComponentKind::Syrup => self.syrups = components,
        }
    }

    /// Select the first element of each non-empty option list.
    /// Empty lists leave their selection untouched.
    pub(crate) fn apply_default_components(&mut self) {
        if let Some(base) = self.bases.first() {
            self.current_base = Some(base.clone());
        }
        if let Some(creamer) = self.creamers.first() {
            self.current_creamer = Some(creamer.clone());
        }
        if let Some(syrup) = self.syrups.first() {
            self.current_syrup = Some(syrup.clone());
        }
    }

    /// Back to defaults: first of each list (or nothing), first temperature,
    /// empty name, nothing selected. Loaded lists are kept.
    pub(crate) fn reset_selection(&mut self) {
        self.current_base = self.bases.first().cloned();
        self.current_creamer = self.creamers.first().cloned();
        self.current_syrup = self.syrups.first().cloned();
        self.current_temp = self.temps.first().cloned();
        self.beverage_name.clear();
        self.selected_beverage_id = None;
    }

    /// Validate the current selection for saving.
    pub(crate) fn draft(&self) -> Result<Draft, CoreError> {
        if self.beverage_name.trim().is_empty() {
            return Err(CoreError::Validation {
                message: NAME_REQUIRED.into(),
            });
        }

        match (
            &self.current_base,
            &self.current_creamer,
            &self.current_syrup,
            &self.current_temp,
        ) {
            (Some(base), Some(creamer), Some(syrup), Some(temperature)) => Ok(Draft {
                name: self.beverage_name.clone(),
                base: base.clone(),
                creamer: creamer.clone(),
                syrup: syrup.clone(),
                temperature: temperature.clone(),
            }),
            _ => Err(CoreError::Validation {
                message: COMPONENTS_REQUIRED.into(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::reference::{DEFAULT_TEMPERATURES, format_temperatures};

    fn component(id: &str) -> Component {
        Component {
            id: id.into(),
            name: id.to_uppercase(),
            color: "#000000".into(),
        }
    }

    fn loaded() -> StoreState {
        let mut state = StoreState::new(format_temperatures(&DEFAULT_TEMPERATURES));
        state.bases = vec![component("b1"), component("b2")];
        state.creamers = vec![component("c1")];
        state.syrups = vec![component("s1"), component("s2")];
        state
    }

    #[test]
    fn new_state_selects_first_temperature() {
        let state = StoreState::new(format_temperatures(&DEFAULT_TEMPERATURES));
        assert_eq!(state.current_temp.as_ref().unwrap().name, "Cold");
        assert_eq!(state.status(), StoreStatus::Uninitialized);
    }

    #[test]
    fn defaults_skip_empty_lists() {
        let mut state = loaded();
        state.creamers.clear();
        state.apply_default_components();

        assert_eq!(state.current_base.unwrap().id, "b1");
        assert!(state.current_creamer.is_none());
        assert_eq!(state.current_syrup.unwrap().id, "s1");
    }

    #[test]
    fn status_precedence() {
        let mut state = loaded();
        state.is_loading = true;
        assert_eq!(state.status(), StoreStatus::Initializing);

        state.is_loading = false;
        state.error = Some("offline".into());
        assert_eq!(state.status(), StoreStatus::Failed);

        // Subscription errors after init do not demote a ready store.
        state.is_initialized = true;
        assert_eq!(state.status(), StoreStatus::Ready);
    }

    #[test]
    fn draft_requires_non_blank_name() {
        let mut state = loaded();
        state.apply_default_components();
        state.beverage_name = "   ".into();

        let err = state.draft().unwrap_err();
        assert_eq!(err.to_string(), NAME_REQUIRED);
    }

    #[test]
    fn draft_requires_every_component() {
        let mut state = loaded();
        state.apply_default_components();
        state.beverage_name = "Fog".into();
        state.current_syrup = None;

        let err = state.draft().unwrap_err();
        assert_eq!(err.to_string(), COMPONENTS_REQUIRED);

        state.current_syrup = Some(component("s2"));
        let draft = state.draft().unwrap();
        assert_eq!(draft.syrup.id, "s2");
        assert_eq!(draft.temperature.value, "cold");
    }

    #[test]
    fn reset_keeps_lists_and_restores_defaults() {
        let mut state = loaded();
        state.current_base = Some(component("b2"));
        state.current_temp = state.temps.last().cloned();
        state.beverage_name = "Fog".into();
        state.selected_beverage_id = Some("bev".into());

        state.reset_selection();

        assert_eq!(state.bases.len(), 2);
        assert_eq!(state.current_base.unwrap().id, "b1");
        assert_eq!(state.current_temp.unwrap().id, 1);
        assert!(state.beverage_name.is_empty());
        assert!(state.selected_beverage_id.is_none());
    }
}
