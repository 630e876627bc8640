//! Pebble Spec v1.1 compliant output
//!
//! - All JSON Lines include schema version (v: 1)
//! - stdout = results (JSON Lines in agent mode)
//! - stderr = human logs

use serde::Serialize;
use serde_json::{json, Value};

const SCHEMA_VERSION: u8 = 1;

/// Event wrapper with schema version
#[derive(Serialize)]
struct Event<T: Serialize> {
    v: u8,
    #[serde(rename = "type")]
    event_type: String,
    payload: T,
}

fn event_line<T: Serialize>(event_type: &str, payload: T) -> String {
    let event = Event {
        v: SCHEMA_VERSION,
        event_type: event_type.to_string(),
        payload,
    };
    serde_json::to_string(&event).unwrap_or_else(|e| {
        format!(
            r#"{{"v":{},"type":"error","payload":{{"code":"SERIALIZE","message":"{}"}}}}"#,
            SCHEMA_VERSION, e
        )
    })
}

fn emit<T: Serialize>(event_type: &str, payload: T) {
    println!("{}", event_line(event_type, payload));
}

/// Output handler
pub struct Output {
    agent_mode: bool,
    verbose: bool,
}

impl Output {
    pub fn new(agent_mode: bool, verbose: bool) -> Self {
        Self { agent_mode, verbose }
    }

    pub fn is_agent(&self) -> bool {
        self.agent_mode
    }

    /// Log message (stderr for human, JSON Lines for agent)
    ///
    /// `debug` messages are dropped unless `--verbose` was given.
    pub fn log(&self, level: &str, message: &str) {
        if level == "debug" && !self.verbose {
            return;
        }
        if self.agent_mode {
            emit("log", json!({"level": level, "message": message}));
        } else {
            eprintln!("[{}] {}", level.to_uppercase(), message);
        }
    }

    /// Plain human-facing line on stdout. Agent mode turns it into an info log.
    pub fn say(&self, text: &str) {
        if self.agent_mode {
            emit("log", json!({"level": "info", "message": text}));
        } else {
            println!("{}", text);
        }
    }

    /// Completion line for a mutating command, e.g. "✔ Created registry config - foo"
    pub fn success(&self, message: &str) {
        if self.agent_mode {
            emit("result", json!({"success": true, "message": message}));
        } else {
            println!("\u{2714} {}", message);
        }
    }

    /// Final result (always JSON to stdout)
    pub fn result<T: Serialize>(&self, data: T) {
        if self.agent_mode {
            emit("result", data);
        } else {
            // Human mode: 4-space indented JSON, the format `get` has always printed
            println!("{}", pretty_json(&data));
        }
    }

    /// Tabular result: aligned columns for humans, `data` as the agent payload
    pub fn table<T: Serialize>(&self, headers: &[&str], rows: &[Vec<String>], data: T) {
        if self.agent_mode {
            emit("result", data);
        } else {
            print!("{}", render_table(headers, rows));
        }
    }

    /// Error output (Pebble Spec v1.1)
    pub fn error(&self, err: PebbleError) -> ! {
        if self.agent_mode {
            emit("error", &err);
        } else {
            eprintln!("Error [{}][{}]: {}", err.cat, err.code, err.message.as_deref().unwrap_or(""));
            if err.retryable {
                if let Some(s) = err.retry_after_s {
                    eprintln!("  Retry after: {}s", s);
                }
            }
            if !err.fix.is_empty() {
                eprintln!("  Fix: {}", err.fix.join(", "));
            }
        }
        std::process::exit(err.exit_code());
    }
}

/// Serialize with 4-space indentation
pub fn pretty_json<T: Serialize>(data: &T) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match data.serialize(&mut ser) {
        Ok(()) => String::from_utf8(buf).unwrap_or_default(),
        Err(e) => format!("<unserializable: {}>", e),
    }
}

/// Left-aligned table with a dashed rule under the header row
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect();
        format!("{}\n", padded.join("   ").trim_end())
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut table = format_row(&header_cells);
    let rule: Vec<String> = widths.iter().map(|w| "=".repeat(*w)).collect();
    table.push_str(&format!("{}\n", rule.join("===")));
    for row in rows {
        table.push_str(&format_row(row));
    }
    table
}

/// Pebble Error (v1.1 spec)
#[derive(Debug, Serialize)]
pub struct PebbleError {
    pub code: String,
    pub cat: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_s: Option<u32>,
    pub fix: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl PebbleError {
    fn new(code: &str, cat: &str, message: &str) -> Self {
        Self {
            code: code.into(),
            cat: cat.into(),
            op: None,
            retryable: false,
            retry_after_s: None,
            fix: Vec::new(),
            message: Some(message.into()),
            details: None,
        }
    }

    /// Network error
    pub fn net(code: &str, message: &str) -> Self {
        Self {
            retryable: true,
            retry_after_s: Some(5),
            fix: vec!["proxy".into(), "wait".into()],
            ..Self::new(code, "net", message)
        }
    }

    /// Input error
    pub fn input(code: &str, message: &str) -> Self {
        Self {
            fix: vec!["param".into()],
            ..Self::new(code, "in", message)
        }
    }

    /// Auth error
    pub fn auth(code: &str, message: &str) -> Self {
        Self {
            fix: vec!["auth".into()],
            ..Self::new(code, "auth", message)
        }
    }

    /// External service error
    pub fn ext(code: &str, message: &str) -> Self {
        Self {
            retryable: true,
            retry_after_s: Some(5),
            fix: vec!["wait".into(), "report".into()],
            ..Self::new(code, "ext", message)
        }
    }

    /// System error
    pub fn sys(code: &str, message: &str) -> Self {
        Self {
            fix: vec!["report".into()],
            ..Self::new(code, "sys", message)
        }
    }

    /// Timeout error
    pub fn timeout(code: &str, message: &str, retry_after: u32) -> Self {
        Self {
            retryable: true,
            retry_after_s: Some(retry_after),
            fix: vec!["wait".into()],
            ..Self::new(code, "time", message)
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: &str) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add details
    pub fn with_details<T: Serialize>(mut self, details: T) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Get exit code based on category
    pub fn exit_code(&self) -> i32 {
        match self.cat.as_str() {
            "in" => 1,
            "auth" => 3,
            "time" => 4,
            _ => 2,
        }
    }
}

/// Print manifest (--manifest) - Pebble Spec v1.1
pub fn print_manifest() {
    let name_opt = json!({"name": "name", "short": "n", "type": "string", "required": true});
    let file_opt = json!({"name": "file", "short": "f", "type": "string"});
    let interactive_opt = json!({"name": "interactive", "short": "i", "type": "bool", "default": false});
    let team_opt = json!({"name": "team", "type": "string"});
    let app_opt = json!({"name": "app", "short": "a", "type": "string"});

    let manifest = json!({
        "schema_version": "1.0",
        "pebble": {
            "name": "story",
            "display_name": "Storyscript Cloud CLI",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Create and manage apps, registry configs and container configs on Storyscript Cloud"
        },
        "capabilities": {
            "agent": true,
            "interactive": true,
            "streaming": false,
            "resume": false
        },
        "actions": [
            {"id": "apps.list", "summary": "List apps", "args": [], "options": []},
            {"id": "apps.create", "summary": "Create an app", "args": [{"name": "name", "required": false}], "options": [team_opt]},
            {"id": "apps.url", "summary": "Print app URL", "args": [], "options": [app_opt]},
            {"id": "apps.open", "summary": "Open app URL in the browser", "args": [], "options": [app_opt]},
            {"id": "apps.destroy", "summary": "Destroy an app", "args": [], "options": [
                app_opt,
                {"name": "yes", "short": "y", "type": "bool", "default": false},
                {"name": "all", "type": "bool", "default": false}
            ]},
            {"id": "registry.list", "summary": "List registry configs", "args": [], "options": []},
            {"id": "registry.get", "summary": "Get a registry config", "args": [], "options": [name_opt]},
            {"id": "registry.create", "summary": "Create a registry config", "args": [], "options": [name_opt, interactive_opt, file_opt, team_opt]},
            {"id": "registry.update", "summary": "Update a registry config", "args": [], "options": [name_opt, interactive_opt, file_opt]},
            {"id": "registry.delete", "summary": "Delete a registry config", "args": [], "options": [name_opt]},
            {"id": "containers.list", "summary": "List container configs", "args": [], "options": []},
            {"id": "containers.get", "summary": "Get a container config", "args": [{"name": "name", "required": true}], "options": []},
            {"id": "containers.create", "summary": "Create a container config", "args": [{"name": "name", "required": true}, {"name": "path", "required": true}], "options": [team_opt]},
            {"id": "containers.update", "summary": "Update a container config", "args": [{"name": "name", "required": true}, {"name": "path", "required": true}], "options": []},
            {"id": "containers.delete", "summary": "Delete a container config", "args": [{"name": "name", "required": true}], "options": []}
        ],
        "permissions": {
            "network": true,
            "network_domains": ["api.storyscript.io"],
            "filesystem": {
                "read": ["$STORY_PROJECT_DIR", "~"],
                "write": ["$STORY_PROJECT_DIR/story.yml"]
            },
            "env_vars": [
                "STORY_API_URL",
                "STORY_ACCESS_TOKEN",
                "STORY_HTTP_TIMEOUT",
                "STORY_PROJECT_DIR"
            ]
        },
        "limits": {
            "default_timeout_s": 30,
            "max_output_mb": 10
        }
    });

    println!("{}", pretty_json(&manifest));
}
