//! App management commands

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde_json::json;
use std::io::{IsTerminal, Write};
use std::process::Command;

use super::Context;
use crate::api::App;
use crate::cli::{AppArg, AppCreateArgs, AppsAction, AppsCommand};
use crate::config;
use crate::output::PebbleError;

const MIN_APP_NAME_LEN: usize = 4;

const ADJECTIVES: &[&str] = &[
    "brave", "calm", "eager", "fancy", "gentle", "happy", "jolly", "kind", "lively", "mighty",
    "nimble", "proud", "quiet", "rapid", "shiny", "sunny", "swift", "witty", "zesty", "bold",
];

const NOUNS: &[&str] = &[
    "otter", "falcon", "comet", "maple", "river", "badger", "lantern", "harbor", "meadow", "pebble",
    "thunder", "walrus", "willow", "orbit", "canyon", "ember", "glacier", "heron", "koala", "nebula",
];

pub async fn run(cmd: AppsCommand, ctx: &mut Context) -> Result<()> {
    match cmd.action {
        AppsAction::List => list(ctx).await,
        AppsAction::Create(args) => create(args, ctx).await,
        AppsAction::Url(arg) => url(&arg, ctx),
        AppsAction::Open(arg) => open(&arg, ctx),
        AppsAction::Destroy { app, yes, all } => destroy(&app, yes, all, ctx).await,
    }
}

pub fn app_url(app: &str) -> String {
    format!("https://{}.storyscriptapp.com/", app)
}

fn state_label(maintenance: bool) -> &'static str {
    if maintenance {
        "in maintenance"
    } else {
        "running"
    }
}

/// Random `adjective-noun-NNN` name
pub fn generate_app_name() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("brave");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("otter");
    format!("{}-{}-{}", adjective, noun, rng.random_range(100..1000))
}

/// Accepts RFC 3339 and Postgres-style (`2018-09-20 15:48:32.215146+00`) timestamps
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .ok()
}

/// "3 days ago" style age of `then` relative to `now`
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match now.signed_duration_since(then).to_std() {
        Ok(age) => timeago::Formatter::new().convert(age),
        // Negative durations do not convert
        Err(_) => "in the future".to_string(),
    }
}

/// App named by --app, else the one in story.yml
fn resolve_app(arg: &AppArg, op: &str, ctx: &Context) -> Result<String> {
    if let Some(app) = &arg.app {
        return Ok(app.clone());
    }
    match config::app_from_story_yml()? {
        Some(app) => Ok(app),
        None => ctx.out.error(
            PebbleError::input("NO_APP", "No app specified. Pass --app or run inside a directory with a story.yml")
                .with_op(op),
        ),
    }
}

async fn list(ctx: &Context) -> Result<()> {
    ctx.out.log("debug", "Fetching apps");

    let apps = match ctx.api.list_apps().await {
        Ok(a) => a,
        Err(e) => ctx.out.error(e.to_pebble("apps.list")),
    };

    if apps.is_empty() && !ctx.out.is_agent() {
        ctx.out.say("No application found. Create your first app with");
        ctx.out.say("$ story apps create");
        return Ok(());
    }

    let now = Utc::now();
    let rows: Vec<Vec<String>> = apps
        .iter()
        .map(|app: &App| {
            let created = app
                .timestamp
                .as_deref()
                .and_then(parse_timestamp)
                .map(|t| relative_time(t.with_timezone(&Utc), now))
                .unwrap_or_else(|| "unknown".to_string());
            vec![app.name.clone(), state_label(app.maintenance).to_string(), created]
        })
        .collect();

    ctx.out.table(
        &["NAME", "STATE", "CREATED"],
        &rows,
        json!({"success": true, "count": apps.len(), "apps": apps}),
    );
    Ok(())
}

/// Also reachable as the top-level `story create`
pub async fn create(args: AppCreateArgs, ctx: &Context) -> Result<()> {
    let project_dir = config::project_dir();

    if let Some(existing) = config::find_story_yml(&project_dir) {
        ctx.out.say(&format!(
            "There appears to be an Storyscript Cloud project in {} already.",
            existing.display()
        ));
        ctx.out.say("Are you trying to deploy? Try the following:");
        ctx.out.say("$ story deploy");
        ctx.out.error(
            PebbleError::input("PROJECT_EXISTS", "A story.yml already exists for this project")
                .with_op("apps.create")
                .with_details(json!({"path": existing})),
        );
    }

    let name = args.name.unwrap_or_else(generate_app_name);

    // Sanity check.
    if name.chars().count() < MIN_APP_NAME_LEN {
        ctx.out.error(
            PebbleError::input(
                "NAME_TOO_SHORT",
                &format!(
                    "The name you specified is too short. Please use at least {} characters in your app name.",
                    MIN_APP_NAME_LEN
                ),
            )
            .with_op("apps.create")
            .with_details(json!({"name": name})),
        );
    }

    ctx.out.log("info", &format!("Creating application {}", name));
    if let Err(e) = ctx.api.create_app(&name, args.team.as_deref()).await {
        ctx.out.error(e.to_pebble("apps.create"));
    }

    ctx.out.log("info", "Creating story.yml");
    let story_yml = config::write_story_yml(&project_dir, &name)?;

    if ctx.out.is_agent() {
        ctx.out.result(json!({
            "success": true,
            "name": name,
            "url": app_url(&name),
            "team": args.team,
            "story_yml": story_yml
        }));
        return Ok(());
    }

    ctx.out.say("");
    ctx.out.say(&format!("App Name: {}", name));
    ctx.out.say(&format!("App URL: {}", app_url(&name)));
    ctx.out.say("");
    ctx.out.say("You are now ready to write your first Storyscript!");
    ctx.out.say("");
    ctx.out.say(" - [ ] Write a Story:");
    ctx.out.say("       $ story write http > http.story");
    ctx.out.say("");
    ctx.out.say(" - [ ] Deploy to Storyscript Cloud:");
    ctx.out.say("       $ story deploy");
    ctx.out.say("");
    ctx.out.say("We hope you enjoy your deployment experience!");
    Ok(())
}

fn url(arg: &AppArg, ctx: &Context) -> Result<()> {
    let app = resolve_app(arg, "apps.url", ctx)?;
    let url = app_url(&app);

    if ctx.out.is_agent() {
        ctx.out.result(json!({"success": true, "app": app, "url": url}));
    } else if std::io::stdout().is_terminal() {
        println!("{}", url);
    } else {
        // No trailing newline so $(story apps url) substitutes cleanly
        print!("{}", url);
        std::io::stdout().flush()?;
    }
    Ok(())
}

fn browser_command(url: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

fn open(arg: &AppArg, ctx: &Context) -> Result<()> {
    let app = resolve_app(arg, "apps.open", ctx)?;
    let url = app_url(&app);
    ctx.out.say(&url);

    match browser_command(&url).spawn() {
        Ok(_) => {
            if ctx.out.is_agent() {
                ctx.out.result(json!({"success": true, "app": app, "url": url, "opened": true}));
            }
        }
        Err(e) => ctx.out.error(
            PebbleError::sys("BROWSER_FAILED", &format!("Failed to launch a browser: {}", e))
                .with_op("apps.open")
                .with_details(json!({"url": url})),
        ),
    }
    Ok(())
}

async fn destroy(arg: &AppArg, yes: bool, all: bool, ctx: &mut Context) -> Result<()> {
    let apps: Vec<String> = if all {
        ctx.out.log("info", "Destroying all Storyscript Cloud applications");
        match ctx.api.list_apps().await {
            Ok(apps) => apps.into_iter().map(|a| a.name).collect(),
            Err(e) => ctx.out.error(e.to_pebble("apps.destroy")),
        }
    } else {
        vec![resolve_app(arg, "apps.destroy", ctx)?]
    };

    for app in &apps {
        if !yes {
            let confirmed = match ctx.prompter.confirm(&format!("Do you want to destroy '{}'?", app)) {
                Ok(answer) => answer,
                Err(e) => ctx.out.error(PebbleError::input("PROMPT_FAILED", &e.to_string()).with_op("apps.destroy")),
            };
            if !confirmed {
                ctx.out.error(PebbleError::input("ABORTED", "Aborted!").with_op("apps.destroy"));
            }
        }

        ctx.out.log("info", &format!("Destroying application '{}'", app));
        if let Err(e) = ctx.api.destroy_app(app).await {
            ctx.out.error(e.to_pebble("apps.destroy").with_details(json!({"app": app})));
        }
        ctx.out.success(&format!("Destroyed application - {}", app));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn generated_names_are_long_enough() {
        for _ in 0..20 {
            let name = generate_app_name();
            assert!(name.len() >= MIN_APP_NAME_LEN);
            assert_eq!(name.split('-').count(), 3);
        }
    }

    #[test]
    fn app_url_format() {
        assert_eq!(app_url("hello-world"), "https://hello-world.storyscriptapp.com/");
    }

    #[test]
    fn parses_both_timestamp_styles() {
        let rfc = parse_timestamp("2018-09-20T15:48:32Z").unwrap();
        let pg = parse_timestamp("2018-09-20 15:48:32.215146+00").unwrap();
        assert_eq!(rfc.timestamp(), pg.timestamp());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let ago = |secs: i64| relative_time(now - chrono::Duration::seconds(secs), now);
        assert_eq!(ago(10), "10 seconds ago");
        assert_eq!(ago(60), "1 minute ago");
        assert_eq!(ago(3 * 3600), "3 hours ago");
        assert_eq!(ago(2 * 24 * 3600), "2 days ago");
        assert_eq!(ago(400 * 24 * 3600), "1 year ago");
        assert_eq!(relative_time(now + chrono::Duration::seconds(5), now), "in the future");
    }

    #[test]
    fn state_labels() {
        assert_eq!(state_label(true), "in maintenance");
        assert_eq!(state_label(false), "running");
    }
}
