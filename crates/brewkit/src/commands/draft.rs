//! `draft`: the in-progress beverage.

use brewkit_api::Gateway;
use brewkit_core::{BeverageStore, Component, StoreState, Temperature};
use serde::Serialize;

use crate::cli::{DraftArgs, DraftCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DraftView {
    name: String,
    base: Option<Component>,
    creamer: Option<Component>,
    syrup: Option<Component>,
    temperature: Option<Temperature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_beverage_id: Option<String>,
}

impl From<StoreState> for DraftView {
    fn from(s: StoreState) -> Self {
        Self {
            name: s.beverage_name,
            base: s.current_base,
            creamer: s.current_creamer,
            syrup: s.current_syrup,
            temperature: s.current_temp,
            selected_beverage_id: s.selected_beverage_id,
        }
    }
}

fn detail(d: &DraftView) -> String {
    let name = if d.name.is_empty() {
        "(unnamed)".to_owned()
    } else {
        d.name.clone()
    };
    let mut pairs = vec![
        ("Name", name),
        ("Base", util::label(d.base.as_ref())),
        ("Creamer", util::label(d.creamer.as_ref())),
        ("Syrup", util::label(d.syrup.as_ref())),
        (
            "Temperature",
            d.temperature
                .as_ref()
                .map_or_else(|| "-".into(), |t| t.name.clone()),
        ),
    ];
    if let Some(id) = &d.selected_beverage_id {
        pairs.push(("From", id.clone()));
    }
    output::detail_lines(&pairs)
}

fn print<G: Gateway>(store: &BeverageStore<G>, global: &GlobalOpts) -> Result<(), CliError> {
    let view = DraftView::from(store.state());
    let out = output::render_single(global.output, &view, detail, |d| d.name.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle<G: Gateway>(
    store: &BeverageStore<G>,
    source: &str,
    args: DraftArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command.unwrap_or(DraftCommand::Show) {
        DraftCommand::Show => {
            // Component defaults only exist once the option lists are loaded.
            util::ensure_ready(store, source).await?;
            print(store, global)
        }

        DraftCommand::Set { name, temp } => {
            if name.is_none() && temp.is_none() {
                return Err(CliError::Validation {
                    field: "draft".into(),
                    reason: "pass --name and/or --temp".into(),
                });
            }
            if let Some(temp) = temp {
                let temperature = util::resolve_temperature(&store.state(), &temp)?;
                store.set_temperature(temperature);
            }
            if let Some(name) = name {
                store.set_beverage_name(name);
            }
            print(store, global)
        }

        DraftCommand::Reset => {
            store.reset();
            print(store, global)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_draft_is_labelled() {
        let view = DraftView::from(StoreState::default());
        let out = detail(&view);
        assert!(out.contains("Name: (unnamed)"));
        assert!(out.contains("Base: -"));
        assert!(!out.contains("From"));
    }
}
