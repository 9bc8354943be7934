//! `options`: list what a beverage can be built from.

use brewkit_api::Gateway;
use brewkit_core::{BeverageStore, ComponentKind, StoreState};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, OptionKind, OptionsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

/// One selectable option, components and temperatures alike.
#[derive(Serialize)]
struct OptionItem {
    kind: &'static str,
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    default: bool,
}

#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Default")]
    default: &'static str,
}

fn collect(state: &StoreState, only: Option<OptionKind>) -> Vec<OptionItem> {
    let wanted = |kind: OptionKind| only.is_none_or(|o| o == kind);
    let mut items = Vec::new();

    for (kind, option_kind) in [
        (ComponentKind::Base, OptionKind::Bases),
        (ComponentKind::Creamer, OptionKind::Creamers),
        (ComponentKind::Syrup, OptionKind::Syrups),
    ] {
        if !wanted(option_kind) {
            continue;
        }
        let current = state.current_component(kind).map(|c| c.id.as_str());
        items.extend(state.components(kind).iter().map(|c| OptionItem {
            kind: kind.collection(),
            id: c.id.clone(),
            name: c.name.clone(),
            color: Some(c.color.clone()),
            value: None,
            default: current == Some(c.id.as_str()),
        }));
    }

    if wanted(OptionKind::Temperatures) {
        let current = state.current_temp.as_ref().map(|t| t.id);
        items.extend(state.temps.iter().map(|t| OptionItem {
            kind: "temperatures",
            id: t.id.to_string(),
            name: t.name.clone(),
            color: None,
            value: Some(t.value.clone()),
            default: current == Some(t.id),
        }));
    }

    items
}

pub async fn handle<G: Gateway>(
    store: &BeverageStore<G>,
    source: &str,
    args: OptionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::ensure_ready(store, source).await?;

    let items = collect(&store.state(), args.kind);
    let color = output::should_color(global.color);

    let out = output::render_list(
        global.output,
        &items,
        |i| OptionRow {
            kind: i.kind,
            id: i.id.clone(),
            name: i.name.clone(),
            color: i
                .color
                .as_deref()
                .map_or_else(String::new, |c| output::swatch(c, color)),
            default: if i.default { "*" } else { "" },
        },
        |i| format!("{}/{}", i.kind, i.id),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
