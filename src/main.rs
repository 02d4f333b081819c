use std::{process, sync::Arc};

use kiroku::{
    application::{
        admin::{categories::AdminCategoryService, posts::AdminPostService},
        error::AppError,
        feed::FeedService,
        identity::{IdentityProvider, StaticTokenIdentity},
        repos::{CategoriesRepo, CategoriesWriteRepo, PostsRepo, PostsWriteRepo},
        uploads::{ObjectStorage, ThumbnailUploadService},
    },
    config,
    infra::{
        db::SqliteRepositories,
        error::InfraError,
        http::{self, AdminState, HttpState, RouterState},
        identity::RemoteIdentityProvider,
        telemetry,
        uploads::UploadStorage,
    },
};
use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let router_state = build_router_state(repositories, &settings)?;
    serve_http(&settings, router_state).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    init_repositories(&settings).await?;
    info!(
        target = "kiroku::migrate",
        database = %settings.database.url,
        "Migrations applied"
    );
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<SqliteRepositories>, AppError> {
    let pool = SqliteRepositories::connect(
        &settings.database.url,
        settings.database.max_connections.get(),
    )
    .await
    .map_err(|err| InfraError::database(&settings.database.url, err))?;

    SqliteRepositories::run_migrations(&pool)
        .await
        .map_err(|err| InfraError::database(&settings.database.url, err))?;

    Ok(Arc::new(SqliteRepositories::new(pool)))
}

fn build_identity_provider(
    settings: &config::IdentitySettings,
) -> Result<Arc<dyn IdentityProvider>, AppError> {
    match settings {
        config::IdentitySettings::Remote {
            provider_url,
            api_key,
        } => {
            let provider = RemoteIdentityProvider::new(provider_url, api_key.clone())
                .map_err(InfraError::Identity)?;
            info!(
                target = "kiroku::identity",
                provider = %provider_url,
                "Verifying admin tokens against remote identity provider"
            );
            Ok(Arc::new(provider))
        }
        config::IdentitySettings::Static { admin_tokens } => {
            let provider = StaticTokenIdentity::new(admin_tokens.iter());
            if provider.is_empty() {
                warn!(
                    target = "kiroku::identity",
                    "No identity provider or admin tokens configured; every admin request will be rejected"
                );
            }
            Ok(Arc::new(provider))
        }
    }
}

fn build_router_state(
    repositories: Arc<SqliteRepositories>,
    settings: &config::Settings,
) -> Result<RouterState, AppError> {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let categories_repo: Arc<dyn CategoriesRepo> = repositories.clone();
    let categories_write_repo: Arc<dyn CategoriesWriteRepo> = repositories.clone();

    let upload_storage = Arc::new(
        UploadStorage::new(
            settings.storage.directory.clone(),
            settings.storage.bucket.clone(),
            settings.storage.public_base_url.clone(),
        )
        .map_err(|source| InfraError::Storage {
            directory: settings.storage.directory.display().to_string(),
            source,
        })?,
    );
    let object_storage: Arc<dyn ObjectStorage> = upload_storage.clone();

    let http_state = HttpState {
        feed: Arc::new(FeedService::new(posts_repo.clone())),
        db: repositories,
        upload_storage,
    };

    let admin_state = AdminState {
        identity: build_identity_provider(&settings.identity)?,
        posts: Arc::new(AdminPostService::new(posts_repo, posts_write_repo)),
        categories: Arc::new(AdminCategoryService::new(
            categories_repo,
            categories_write_repo,
        )),
        uploads: Arc::new(ThumbnailUploadService::new(object_storage)),
        upload_body_limit: usize::try_from(settings.storage.max_request_bytes.get())
            .unwrap_or(usize::MAX),
    };

    Ok(RouterState {
        http: http_state,
        admin: admin_state,
    })
}

async fn serve_http(settings: &config::Settings, state: RouterState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|source| InfraError::Bind {
            addr: settings.server.addr,
            source,
        })?;

    info!(
        target = "kiroku::serve",
        addr = %settings.server.addr,
        "Listening"
    );

    let grace = settings.server.graceful_shutdown;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(grace))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal(grace: std::time::Duration) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => error!(error = %err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(
        target = "kiroku::serve",
        grace_seconds = grace.as_secs(),
        "Shutdown signal received, draining connections"
    );
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(target = "kiroku::serve", "Graceful shutdown timed out");
        process::exit(1);
    });
}
