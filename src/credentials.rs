//! Registry credential configs in the Docker `config.json` shape:
//!
//! ```json
//! { "auths": { "<registry-url>": { "auth": "<base64 user:pass>" } } }
//! ```
//!
//! Usernames and passwords are joined with a bare `:`. A colon inside the
//! username cannot be recovered on decode.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::document::{self, OnFailure};
use crate::output::Output;
use crate::prompt::{PromptError, Prompter};

pub const DOCKER_HUB_REGISTRY_URL: &str = "https://index.docker.io/v1/";
pub const GCR_USERNAME: &str = "_json_key";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCredentialConfig {
    pub auths: BTreeMap<String, AuthEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEntry {
    /// Base64-encoded "username:password"
    pub auth: String,
}

impl RegistryCredentialConfig {
    /// Decoded (username, password) for a registry, split on the first `:`
    pub fn credentials_for(&self, registry_url: &str) -> Option<(String, String)> {
        let entry = self.auths.get(registry_url)?;
        let decoded = STANDARD.decode(&entry.auth).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, pass) = decoded.split_once(':')?;
        Some((user.to_string(), pass.to_string()))
    }
}

pub fn build_basic_auth_config(registry_url: &str, username: &str, password: &str) -> RegistryCredentialConfig {
    let auth = STANDARD.encode(format!("{}:{}", username, password));
    let mut auths = BTreeMap::new();
    auths.insert(registry_url.to_string(), AuthEntry { auth });
    RegistryCredentialConfig { auths }
}

// ============ Registry kinds ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    /// Registries that authenticate via `docker login`
    DockerLogin,
    /// Google Container Registry with a service-account JSON key
    Gcr,
}

impl RegistryKind {
    pub const ALL: [RegistryKind; 2] = [RegistryKind::DockerLogin, RegistryKind::Gcr];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryKind::DockerLogin => "docker_login",
            RegistryKind::Gcr => "gcr",
        }
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegistryKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown registry type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcrHostname {
    Global,
    Us,
    Eu,
    Asia,
}

impl GcrHostname {
    pub const ALL: [GcrHostname; 4] = [GcrHostname::Global, GcrHostname::Us, GcrHostname::Eu, GcrHostname::Asia];

    pub fn as_str(&self) -> &'static str {
        match self {
            GcrHostname::Global => "gcr.io",
            GcrHostname::Us => "us.gcr.io",
            GcrHostname::Eu => "eu.gcr.io",
            GcrHostname::Asia => "asia.gcr.io",
        }
    }

    pub fn registry_url(&self) -> String {
        format!("https://{}", self.as_str())
    }
}

impl FromStr for GcrHostname {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GcrHostname::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| format!("'{}' is not a GCR hostname", s))
    }
}

// ============ Interactive sessions ============

/// Ask which kind of registry the config is for
pub fn choose_registry_kind(prompter: &mut dyn Prompter) -> Result<RegistryKind, PromptError> {
    prompter.note("Use type 'docker_login' for registries that authenticate via `$ docker login`");
    prompter.note("");
    prompter.note("Defaults are set to Docker Hub");
    prompter.note("");

    let names: Vec<&str> = RegistryKind::ALL.iter().map(|k| k.as_str()).collect();
    let answer = prompter.choice("Registry Type", &names, Some(RegistryKind::DockerLogin.as_str()))?;
    parse_answer("Registry Type", answer)
}

fn parse_answer<T: FromStr>(label: &str, answer: String) -> Result<T, PromptError> {
    answer.parse().map_err(|_| PromptError::Unexpected {
        label: label.to_string(),
        answer,
    })
}

/// Collect credentials for `kind` and build the config. Nothing is returned
/// unless every prompt was answered.
pub fn build_from_interactive_session(
    kind: RegistryKind,
    prompter: &mut dyn Prompter,
    out: &Output,
) -> Result<RegistryCredentialConfig, PromptError> {
    match kind {
        RegistryKind::DockerLogin => {
            let registry_url = prompter.text("Registry URL", Some(DOCKER_HUB_REGISTRY_URL))?;
            let username = prompter.text("Username", None)?;
            let password = prompter.secret("Password")?;
            Ok(build_basic_auth_config(&registry_url, &username, &password))
        }
        RegistryKind::Gcr => {
            let hostnames: Vec<&str> = GcrHostname::ALL.iter().map(|h| h.as_str()).collect();
            let answer = prompter.choice("Hostname", &hostnames, None)?;
            let hostname: GcrHostname = parse_answer("Hostname", answer)?;
            let key = prompt_service_account_key(prompter, out)?;
            Ok(build_basic_auth_config(&hostname.registry_url(), GCR_USERNAME, &key))
        }
    }
}

/// The key is either pasted on one line or given as a path to the key file.
/// Paths are re-asked until one loads. A key file is used as written, less
/// trailing whitespace.
fn prompt_service_account_key(prompter: &mut dyn Prompter, out: &Output) -> Result<String, PromptError> {
    const LABEL: &str = "Service Account JSON key (contents on a single line, or path to the key file)";

    loop {
        let answer = prompter.text(LABEL, None)?;
        if answer.starts_with('{') {
            return Ok(answer);
        }
        if let Some(key) = document::load_json_text(&answer, OnFailure::ReturnNone, out) {
            return Ok(key.trim_end().to_string());
        }
    }
}
