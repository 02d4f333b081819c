use std::fs;

use kiroku_client::cache::SharedError;
use kiroku_client::forms::FormError;
use kiroku_client::{ApiClient, ClientError, SessionProvider, StaticSession};
use thiserror::Error;

use crate::args::Cli;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("site URL is required (use --site or KIROKU_SITE_URL)")]
    MissingSite,
    #[error("access token is required (use --token-file or KIROKU_TOKEN)")]
    MissingToken,
    #[error("failed to read token file: {0}")]
    TokenFile(std::io::Error),
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("{0}")]
    Shared(SharedError),
    #[error("failed to render output: {0}")]
    Output(String),
}

impl From<SharedError> for CliError {
    fn from(err: SharedError) -> Self {
        Self::Shared(err)
    }
}

pub struct Ctx {
    pub api: ApiClient,
    session: SessionProvider<StaticSession>,
}

impl Ctx {
    pub fn new(site: &str, token: Option<String>) -> Result<Self, CliError> {
        Ok(Self {
            api: ApiClient::new(site)?,
            session: SessionProvider::new(StaticSession::new(token)),
        })
    }

    /// Token for admin requests, loaded through the session provider.
    pub async fn token(&self) -> Result<String, CliError> {
        self.session.refresh().await?;
        self.session.token().await.ok_or(CliError::MissingToken)
    }
}

pub fn build_ctx_from_cli(cli: &Cli) -> Result<Ctx, CliError> {
    let site = cli.site.clone().ok_or(CliError::MissingSite)?;
    let token = if let Some(path) = &cli.token_file {
        Some(
            fs::read_to_string(path)
                .map_err(CliError::TokenFile)?
                .trim()
                .to_string(),
        )
    } else {
        cli.token_env.clone()
    };

    Ctx::new(&site, token)
}
