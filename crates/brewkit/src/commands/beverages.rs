//! Beverage command handlers.

use std::sync::Arc;
use std::time::Duration;

use brewkit_api::Gateway;
use brewkit_core::{Beverage, BeverageStore, ComponentKind};
use chrono::{DateTime, Utc};
use tabled::Tabled;

use crate::cli::{BeveragesArgs, BeveragesCommand, GlobalOpts, MakeArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct BeverageRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Base")]
    base: String,
    #[tabled(rename = "Creamer")]
    creamer: String,
    #[tabled(rename = "Syrup")]
    syrup: String,
    #[tabled(rename = "Temp")]
    temp: String,
    #[tabled(rename = "Created")]
    created: String,
}

pub(super) fn row(b: &Arc<Beverage>) -> BeverageRow {
    BeverageRow {
        id: b.id.clone(),
        name: b.name.clone(),
        base: b.base.name.clone(),
        creamer: b.creamer.name.clone(),
        syrup: b.syrup.name.clone(),
        temp: b.temperature.name.clone(),
        created: format_created(b.created_at),
    }
}

fn format_created(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map_or_else(|| millis.to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

fn detail(b: &Beverage, color: bool) -> String {
    let component = |c: &brewkit_core::Component| {
        format!("{} ({})", c.name, output::swatch(&c.color, color))
    };
    output::detail_lines(&[
        ("ID", b.id.clone()),
        ("Name", b.name.clone()),
        ("Base", component(&b.base)),
        ("Creamer", component(&b.creamer)),
        ("Syrup", component(&b.syrup)),
        ("Temperature", b.temperature.name.clone()),
        ("Created", format_created(b.created_at)),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<G: Gateway>(
    store: &BeverageStore<G>,
    source: &str,
    args: BeveragesArgs,
    global: &GlobalOpts,
    timeout: Duration,
) -> Result<(), CliError> {
    util::ensure_ready(store, source).await?;
    let color = output::should_color(global.color);

    match args.command {
        BeveragesCommand::List => {
            util::wait_synced(store, timeout).await?;
            let saved = store.saved_beverages();
            let out = output::render_list(global.output, saved.as_slice(), row, |b| b.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BeveragesCommand::Show { id } => {
            util::wait_synced(store, timeout).await?;
            if !store.show_beverage(&id) {
                return Err(CliError::NotFound {
                    resource_type: "beverage".into(),
                    identifier: id,
                    list_command: "beverages list".into(),
                });
            }
            let saved = store.saved_beverages();
            let beverage = saved
                .iter()
                .find(|b| b.id == id)
                .ok_or_else(|| CliError::Store {
                    message: format!("beverage '{id}' disappeared during lookup"),
                })?;
            let out = output::render_single(
                global.output,
                &**beverage,
                |b| detail(b, color),
                |b| b.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BeveragesCommand::Make(make) => {
            let beverage = make_beverage(store, make, timeout).await?;
            let out = output::render_single(
                global.output,
                &beverage,
                |b| detail(b, color),
                |b| b.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

/// Apply the requested selection, save, and (unless told not to) wait for
/// the new beverage to come back through the live query.
async fn make_beverage<G: Gateway>(
    store: &BeverageStore<G>,
    args: MakeArgs,
    timeout: Duration,
) -> Result<Beverage, CliError> {
    let state = store.state();
    let sel = args.selection;

    // Resolve everything before changing anything.
    let resolve = |kind, ident: Option<String>| {
        ident
            .map(|i| util::resolve_component(&state, kind, &i))
            .transpose()
    };
    let base = resolve(ComponentKind::Base, sel.base)?;
    let creamer = resolve(ComponentKind::Creamer, sel.creamer)?;
    let syrup = resolve(ComponentKind::Syrup, sel.syrup)?;
    let temp = sel
        .temp
        .map(|t| util::resolve_temperature(&state, &t))
        .transpose()?;

    if let Some(base) = base {
        store.set_base(base);
    }
    if let Some(creamer) = creamer {
        store.set_creamer(creamer);
    }
    if let Some(syrup) = syrup {
        store.set_syrup(syrup);
    }
    if let Some(temp) = temp {
        store.set_temperature(temp);
    }
    if let Some(name) = args.name {
        store.set_beverage_name(name);
    }

    let beverage = store.make_beverage().await?;
    tracing::debug!(id = %beverage.id, "beverage written");

    if !args.no_wait {
        let mut stream = store.subscribe_beverages();
        let id = beverage.id.clone();
        let arrived = tokio::time::timeout(timeout, async move {
            loop {
                if stream.contains(&id) {
                    return true;
                }
                if stream.changed().await.is_none() {
                    return false;
                }
            }
        })
        .await;

        match arrived {
            Ok(true) => {}
            Ok(false) => tracing::warn!("listener stopped before the new beverage arrived"),
            Err(_) => {
                return Err(CliError::Timeout {
                    what: format!("beverage '{}' to sync", beverage.id),
                    seconds: timeout.as_secs(),
                });
            }
        }
    }

    Ok(beverage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_is_rendered_in_utc() {
        assert_eq!(format_created(1_700_000_000_000), "2023-11-14 22:13");
    }
}
