//! Registry config commands

use anyhow::{Context as _, Result};
use serde_json::{json, Value};

use super::Context;
use crate::api::ConfigKind;
use crate::cli::{RegistryAction, RegistryCommand, RegistrySource};
use crate::credentials;
use crate::output::PebbleError;

const KIND: ConfigKind = ConfigKind::Registry;

pub async fn run(cmd: RegistryCommand, ctx: &mut Context) -> Result<()> {
    match cmd.action {
        RegistryAction::List => super::list_configs(ctx, KIND, "registry.list", "story registry create").await,
        RegistryAction::Get { name } => super::get_config(ctx, KIND, &name, "registry.get").await,
        RegistryAction::Create { name, source, team } => {
            let config = resolve_config(&source, ctx, "registry.create")?;
            super::create_config(ctx, KIND, &name, &config, team.as_deref(), "registry.create").await
        }
        RegistryAction::Update { name, source } => {
            let config = resolve_config(&source, ctx, "registry.update")?;
            super::update_config(ctx, KIND, &name, &config, "registry.update").await
        }
        RegistryAction::Delete { name } => super::delete_config(ctx, KIND, &name, "registry.delete").await,
    }
}

/// The config to send: the file given with --file, otherwise one built from prompts
fn resolve_config(source: &RegistrySource, ctx: &mut Context, op: &str) -> Result<Value> {
    if let Some(path) = &source.file {
        return super::config_from_file(ctx, path);
    }

    if !source.interactive {
        ctx.out.log("debug", "No --file given, generating registry config interactively");
    }

    let session = match credentials::choose_registry_kind(ctx.prompter.as_mut()) {
        Ok(kind) => credentials::build_from_interactive_session(kind, ctx.prompter.as_mut(), &ctx.out),
        Err(e) => Err(e),
    };

    match session {
        Ok(config) => {
            for url in config.auths.keys() {
                if let Some((user, _)) = config.credentials_for(url) {
                    ctx.out.log("debug", &format!("Built credentials for {} as {}", url, user));
                }
            }
            serde_json::to_value(&config).context("Failed to serialize registry config")
        }
        Err(e) => ctx.out.error(
            PebbleError::input("PROMPT_FAILED", &e.to_string())
                .with_op(op)
                .with_details(json!({"hint": "Pass -f/--file to use an existing registry config"})),
        ),
    }
}
