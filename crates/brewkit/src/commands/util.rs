//! Shared helpers for command handlers.

use std::time::Duration;

use brewkit_api::Gateway;
use brewkit_core::{BeverageStore, Component, ComponentKind, StoreState, Temperature};

use crate::error::CliError;

/// Initialize the store, turning a failed attempt into a CLI error.
pub async fn ensure_ready<G: Gateway>(
    store: &BeverageStore<G>,
    source: &str,
) -> Result<(), CliError> {
    if store.init().await {
        return Ok(());
    }
    Err(CliError::InitFailed {
        url: source.to_owned(),
        reason: store
            .state()
            .error
            .unwrap_or_else(|| "unknown error".into()),
    })
}

/// Wait for the first saved-beverage snapshot.
pub async fn wait_synced<G: Gateway>(
    store: &BeverageStore<G>,
    timeout: Duration,
) -> Result<(), CliError> {
    match tokio::time::timeout(timeout, store.synced()).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::Store {
            message: "beverage listener stopped before the first snapshot".into(),
        }),
        Err(_) => Err(CliError::Timeout {
            what: "saved beverages".into(),
            seconds: timeout.as_secs(),
        }),
    }
}

/// Find a component by id, or by case-insensitive name.
pub fn resolve_component(
    state: &StoreState,
    kind: ComponentKind,
    identifier: &str,
) -> Result<Component, CliError> {
    let options = state.components(kind);
    options
        .iter()
        .find(|c| c.id == identifier)
        .or_else(|| {
            options
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(identifier))
        })
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: kind.to_string(),
            identifier: identifier.into(),
            list_command: format!("options {}", kind.collection()),
        })
}

/// Find a temperature by numeric id, name, or value.
pub fn resolve_temperature(state: &StoreState, identifier: &str) -> Result<Temperature, CliError> {
    let by_id = identifier.parse::<u32>().ok();
    state
        .temps
        .iter()
        .find(|t| Some(t.id) == by_id || t.name.eq_ignore_ascii_case(identifier) || t.value == identifier)
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "temperature".into(),
            identifier: identifier.into(),
            list_command: "options temperatures".into(),
        })
}

/// Short display label for an optional selection.
pub fn label(component: Option<&Component>) -> String {
    component.map_or_else(|| "-".into(), |c| c.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewkit_core::{DEFAULT_TEMPERATURES, format_temperatures};

    fn state() -> StoreState {
        StoreState {
            temps: format_temperatures(&DEFAULT_TEMPERATURES),
            bases: vec![Component {
                id: "black-tea".into(),
                name: "Black Tea".into(),
                color: "#8b4513".into(),
            }],
            ..StoreState::default()
        }
    }

    #[test]
    fn components_resolve_by_id_or_name() {
        let s = state();
        assert_eq!(
            resolve_component(&s, ComponentKind::Base, "black-tea").map(|c| c.name).ok(),
            Some("Black Tea".into())
        );
        assert!(resolve_component(&s, ComponentKind::Base, "BLACK TEA").is_ok());
        assert!(matches!(
            resolve_component(&s, ComponentKind::Base, "oolong"),
            Err(CliError::NotFound { .. })
        ));
    }

    #[test]
    fn temperatures_resolve_by_id_name_or_value() {
        let s = state();
        assert_eq!(resolve_temperature(&s, "2").map(|t| t.name).ok(), Some("Hot".into()));
        assert_eq!(resolve_temperature(&s, "iced").map(|t| t.id).ok(), Some(3));
        assert!(resolve_temperature(&s, "Lukewarm").is_err());
    }
}
