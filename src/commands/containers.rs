//! Container config commands

use anyhow::Result;

use super::Context;
use crate::api::ConfigKind;
use crate::cli::{ContainersAction, ContainersCommand};

const KIND: ConfigKind = ConfigKind::Container;

pub async fn run(cmd: ContainersCommand, ctx: &Context) -> Result<()> {
    match cmd.action {
        ContainersAction::List => super::list_configs(ctx, KIND, "containers.list", "story containers create").await,
        ContainersAction::Get { name } => super::get_config(ctx, KIND, &name, "containers.get").await,
        ContainersAction::Create { name, path, team } => {
            let config = super::config_from_file(ctx, &path)?;
            super::create_config(ctx, KIND, &name, &config, team.as_deref(), "containers.create").await
        }
        ContainersAction::Update { name, path } => {
            let config = super::config_from_file(ctx, &path)?;
            super::update_config(ctx, KIND, &name, &config, "containers.update").await
        }
        ContainersAction::Delete { name } => super::delete_config(ctx, KIND, &name, "containers.delete").await,
    }
}
