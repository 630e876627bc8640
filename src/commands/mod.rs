//! Command handlers, one module per command group

pub mod apps;
pub mod containers;
pub mod registry;

use anyhow::{Context as _, Result};
use serde_json::{json, Value};

use crate::api::{ApiClient, ConfigKind};
use crate::document::{self, OnFailure};
use crate::output::Output;
use crate::prompt::Prompter;

/// Everything a command handler needs, built once per invocation
pub struct Context {
    pub api: ApiClient,
    pub out: Output,
    pub prompter: Box<dyn Prompter>,
}

// ============ Shared config commands (registry + containers) ============

/// Parsed config file named on the command line. A file that cannot be used
/// ends the command with an input error.
fn config_from_file(ctx: &Context, path: &str) -> Result<Value> {
    document::load_json_document(path, OnFailure::Terminate, &ctx.out)
        .with_context(|| format!("Could not load {}", path))
}

async fn list_configs(ctx: &Context, kind: ConfigKind, op: &str, create_cmd: &str) -> Result<()> {
    ctx.out.log("debug", &format!("Listing {}s", kind.label()));

    let configs = match ctx.api.list_configs(kind).await {
        Ok(c) => c,
        Err(e) => ctx.out.error(e.to_pebble(op)),
    };

    if ctx.out.is_agent() {
        let names: Vec<&str> = configs.iter().map(|c| c.name.as_str()).collect();
        ctx.out.result(json!({"success": true, "count": names.len(), "names": names}));
        return Ok(());
    }

    if configs.is_empty() {
        ctx.out.say(&format!("No {}s found. Create a new one with", kind.label()));
        ctx.out.say(&format!("$ {}", create_cmd));
    }
    for config in &configs {
        ctx.out.say(&config.name);
    }
    Ok(())
}

async fn get_config(ctx: &Context, kind: ConfigKind, name: &str, op: &str) -> Result<()> {
    match ctx.api.get_config(kind, name).await {
        Ok(config) => ctx.out.result(config),
        Err(e) => ctx.out.error(e.to_pebble(op)),
    }
    Ok(())
}

async fn create_config(
    ctx: &Context,
    kind: ConfigKind,
    name: &str,
    config: &Value,
    team: Option<&str>,
    op: &str,
) -> Result<()> {
    ctx.out.log("debug", &format!("Creating {} {}", kind.label(), name));
    if let Err(e) = ctx.api.create_config(kind, name, config, team).await {
        ctx.out.error(e.to_pebble(op));
    }
    ctx.out.success(&format!("Created {} - {}", kind.label(), name));
    Ok(())
}

async fn update_config(ctx: &Context, kind: ConfigKind, name: &str, config: &Value, op: &str) -> Result<()> {
    ctx.out.log("debug", &format!("Updating {} {}", kind.label(), name));
    if let Err(e) = ctx.api.update_config(kind, name, config).await {
        ctx.out.error(e.to_pebble(op));
    }
    ctx.out.success(&format!("Updated {} - {}", kind.label(), name));
    Ok(())
}

async fn delete_config(ctx: &Context, kind: ConfigKind, name: &str, op: &str) -> Result<()> {
    ctx.out.log("debug", &format!("Deleting {} {}", kind.label(), name));
    if let Err(e) = ctx.api.delete_config(kind, name).await {
        ctx.out.error(e.to_pebble(op));
    }
    ctx.out.success(&format!("Deleted {} - {}", kind.label(), name));
    Ok(())
}
