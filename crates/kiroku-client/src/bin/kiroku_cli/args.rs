//! Command-line surface for `kiroku-cli`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kiroku-cli", version, about = "kiroku blog API CLI", long_about = None)]
pub struct Cli {
    /// Site base URL, e.g. <https://blog.example.com>
    #[arg(long, env = "KIROKU_SITE_URL")]
    pub site: Option<String>,

    /// Path to a file containing the access token (takes precedence over env)
    #[arg(long, env = "KIROKU_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Access token from env; no visible flag so tokens stay out of shell history
    #[arg(long = "token", hide = true, env = "KIROKU_TOKEN", hide_env_values = true)]
    pub token_env: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password and print the access token
    SignIn(SignInArgs),
    /// Register an account; the provider sends a confirmation mail
    SignUp(SignUpArgs),
    /// Category administration
    Categories(CategoriesArgs),
    /// Post administration
    Posts(PostsArgs),
    /// Anonymous post reads
    Public(PublicArgs),
    /// Resolve a thumbnail key to its public URL
    Thumbnail(ThumbnailArgs),
}

#[derive(Args, Debug)]
pub struct ProviderArgs {
    /// Identity provider base URL
    #[arg(long, env = "KIROKU_AUTH_URL")]
    pub auth_url: String,
    /// Identity provider public API key
    #[arg(long, env = "KIROKU_AUTH_API_KEY", hide_env_values = true)]
    pub auth_api_key: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "KIROKU_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct SignInArgs {
    #[command(flatten)]
    pub provider: ProviderArgs,
}

#[derive(Args, Debug)]
pub struct SignUpArgs {
    #[command(flatten)]
    pub provider: ProviderArgs,
    /// Where the confirmation link sends the user
    #[arg(long, default_value = "http://localhost:3000/login")]
    pub redirect_to: String,
}

#[derive(Args, Debug)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub action: CategoriesCmd,
}

#[derive(Subcommand, Debug)]
pub enum CategoriesCmd {
    List,
    Show { id: i64 },
    Create {
        #[arg(long)]
        name: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: String,
    },
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub action: PostsCmd,
}

#[derive(Args, Debug, Default)]
pub struct PostFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,
    /// Read the HTML body from a file
    #[arg(long)]
    pub content_file: Option<PathBuf>,
    #[arg(long)]
    pub thumbnail_image_key: Option<String>,
    /// Category to assign
    #[arg(long, conflicts_with = "no_category")]
    pub category: Option<i64>,
    /// Remove the category assignment
    #[arg(long, default_value_t = false)]
    pub no_category: bool,
}

#[derive(Subcommand, Debug)]
pub enum PostsCmd {
    List,
    Show {
        id: i64,
    },
    Create {
        #[command(flatten)]
        fields: PostFields,
    },
    /// Replace a post; omitted fields keep their current values
    Update {
        id: i64,
        #[command(flatten)]
        fields: PostFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
pub struct PublicArgs {
    #[command(subcommand)]
    pub action: PublicCmd,
}

#[derive(Subcommand, Debug)]
pub enum PublicCmd {
    List,
    Show { id: i64 },
}

#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    pub key: String,
    /// Storage base URL; defaults to the site URL
    #[arg(long, env = "KIROKU_STORAGE_URL")]
    pub storage_url: Option<String>,
    #[arg(long, default_value = kiroku_client::thumbnail::DEFAULT_BUCKET)]
    pub bucket: String,
}
