//! CLI definition using clap (Pebble Spec v1.0)

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "story")]
#[command(version)]
#[command(about = "Storyscript Cloud command-line client")]
#[command(long_about = r#"
Story CLI - create and manage apps on Storyscript Cloud

Commands:
  apps        Create, list, open and destroy apps
  registry    Credentials the platform uses to pull images from container registries
  containers  Container configs used by the platform for authorization

Setup:
  Set STORY_ACCESS_TOKEN (and optionally STORY_API_URL) in the environment
  or in a .env file in the project directory
"#)]
#[command(after_help = r#"
Examples:

  Create a new app in the current directory:
    story apps create my-app

  Store Docker Hub credentials, answering prompts:
    story registry create -n dockerhub

  Store registry credentials from an existing file:
    story registry create -n quay -f ~/.docker/config.json

  Upload a container config:
    story containers create my-config ./config.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Machine output mode (JSON Lines on stdout)
    #[arg(long, global = true)]
    pub agent: bool,

    /// Print tool metadata
    #[arg(long)]
    pub manifest: bool,

    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, list, and manage apps on Storyscript Cloud
    Apps(AppsCommand),

    /// Create a new app (same as `apps create`)
    Create(AppCreateArgs),

    /// Manage the registry configs used by Storyscript Cloud
    Registry(RegistryCommand),

    /// Manage the container configs used by the Storyscript platform for authorization
    Containers(ContainersCommand),
}

// ============ Apps Commands ============

#[derive(Args)]
pub struct AppsCommand {
    #[command(subcommand)]
    pub action: AppsAction,
}

#[derive(Args)]
pub struct AppCreateArgs {
    /// App name (a random one is picked when omitted)
    pub name: Option<String>,

    /// Team name that owns this new Application
    #[arg(long)]
    pub team: Option<String>,
}

#[derive(Args)]
pub struct AppArg {
    /// App name (defaults to app_name in story.yml)
    #[arg(short, long)]
    pub app: Option<String>,
}

#[derive(Subcommand)]
pub enum AppsAction {
    /// List apps that you have access to
    List,

    /// Create a new app
    #[command(after_help = "Examples:
  story apps create
  story apps create my-app --team core")]
    Create(AppCreateArgs),

    /// Display the full URL of an app
    #[command(after_help = "Great to use with $(story apps url) in bash.")]
    Url(AppArg),

    /// Open the full URL of an app, in the browser
    Open(AppArg),

    /// Destroy an app
    #[command(after_help = "Examples:
  story apps destroy -a my-app
  story apps destroy --all --yes")]
    Destroy {
        #[command(flatten)]
        app: AppArg,

        /// Assume yes to destruction confirmation
        #[arg(short, long)]
        yes: bool,

        /// Destroy all Storyscript Cloud apps
        #[arg(long)]
        all: bool,
    },
}

// ============ Registry Commands ============

#[derive(Args)]
pub struct RegistryCommand {
    #[command(subcommand)]
    pub action: RegistryAction,
}

/// Where the registry config comes from
#[derive(Args)]
pub struct RegistrySource {
    /// Generate registry config by answering prompts (the default without --file)
    #[arg(short, long, conflicts_with = "file")]
    pub interactive: bool,

    /// Path of the registry config json file
    #[arg(short, long)]
    pub file: Option<String>,
}

#[derive(Subcommand)]
pub enum RegistryAction {
    /// List all registry configs that you have access to
    List,

    /// Get a registry config
    #[command(after_help = "Examples:
  story registry get -n dockerhub")]
    Get {
        /// Name of the registry config
        #[arg(short, long)]
        name: String,
    },

    /// Create a new registry config
    #[command(after_help = "Examples:
  story registry create -n dockerhub
  story registry create -n quay -f ~/.docker/config.json --team core")]
    Create {
        /// Name of the registry config
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        source: RegistrySource,

        /// Team name that owns this new registry config
        #[arg(long)]
        team: Option<String>,
    },

    /// Update a registry config
    #[command(after_help = "Examples:
  story registry update -n dockerhub -i")]
    Update {
        /// Name of the registry config
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        source: RegistrySource,
    },

    /// Delete a registry config
    Delete {
        /// Name of the registry config
        #[arg(short, long)]
        name: String,
    },
}

// ============ Container Config Commands ============

#[derive(Args)]
pub struct ContainersCommand {
    #[command(subcommand)]
    pub action: ContainersAction,
}

#[derive(Subcommand)]
pub enum ContainersAction {
    /// List all container configs that you have access to
    List,

    /// Get a container config by name
    Get {
        /// Name of the container config
        name: String,
    },

    /// Create a new container config
    #[command(after_help = "Examples:
  story containers create my-config ./config.json")]
    Create {
        /// Name of the container config
        name: String,

        /// Path of the container config json file
        path: String,

        /// Team name that owns this new container config
        #[arg(long)]
        team: Option<String>,
    },

    /// Update a container config by name
    Update {
        /// Name of the container config
        name: String,

        /// Path of the container config json file
        path: String,
    },

    /// Delete a container config by name
    Delete {
        /// Name of the container config
        name: String,
    },
}
