//! Static reference data.
//!
//! Temperatures are not stored remotely; they come from an ordered list
//! of names supplied at build/config time and are numbered by position.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::model::Temperature;

/// Names used when configuration does not supply its own list.
pub const DEFAULT_TEMPERATURES: [&str; 3] = ["Cold", "Hot", "Iced"];

/// Turn an ordered list of names into [`Temperature`] records.
///
/// `id` is the 1-based position and `value` the lowercased name.
pub fn format_temperatures<S: AsRef<str>>(names: &[S]) -> Vec<Temperature> {
    names
        .iter()
        .zip(1u32..)
        .map(|(name, id)| {
            let name = name.as_ref();
            Temperature {
                id,
                name: name.to_owned(),
                value: name.to_lowercase(),
            }
        })
        .collect()
}

/// Reject lists that would produce unusable temperature records:
/// empty lists, blank names, and names that collide once lowercased.
pub fn validate_temperature_names<S: AsRef<str>>(names: &[S]) -> Result<(), CoreError> {
    if names.is_empty() {
        return Err(CoreError::InvalidReferenceData {
            message: "temperature list is empty".into(),
        });
    }

    let mut seen = HashSet::new();
    for (index, name) in names.iter().enumerate() {
        let name = name.as_ref();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidReferenceData {
                message: format!("temperature #{} has a blank name", index + 1),
            });
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(CoreError::InvalidReferenceData {
                message: format!("duplicate temperature '{name}'"),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_follow_position_and_values_are_lowercase() {
        let temps = format_temperatures(&DEFAULT_TEMPERATURES);

        assert_eq!(
            temps,
            vec![
                Temperature { id: 1, name: "Cold".into(), value: "cold".into() },
                Temperature { id: 2, name: "Hot".into(), value: "hot".into() },
                Temperature { id: 3, name: "Iced".into(), value: "iced".into() },
            ]
        );
    }

    #[test]
    fn arbitrary_lists_are_numbered_in_order() {
        let names: Vec<String> = (0..7).map(|i| format!("Step {i}")).collect();
        let temps = format_temperatures(&names);

        assert_eq!(temps.len(), names.len());
        for (temp, expected_id) in temps.iter().zip(1u32..) {
            assert_eq!(temp.id, expected_id);
            assert_eq!(temp.value, temp.name.to_lowercase());
        }
    }

    #[test]
    fn empty_list_is_rejected() {
        let names: [&str; 0] = [];
        assert!(validate_temperature_names(&names).is_err());
    }

    #[test]
    fn blank_and_duplicate_names_are_rejected() {
        assert!(validate_temperature_names(&["Hot", "  "]).is_err());
        assert!(validate_temperature_names(&["Hot", "HOT"]).is_err());
        assert!(validate_temperature_names(&DEFAULT_TEMPERATURES).is_ok());
    }
}
