use std::{net::SocketAddr, sync::Arc};

use anyhow::{anyhow, Context};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use ideatown_backend::{
    config::Config,
    db::{
        experiment_repository::ExperimentRepository,
        postgres_experiment_repository::PostgresExperimentRepository,
        postgres_profile_repository::PostgresProfileRepository,
        postgres_user_repository::PostgresUserRepository, profile_repository::ProfileRepository,
        user_repository::UserRepository,
    },
    responses::JsonResponse,
    routes::{
        auth::{fxa_callback, fxa_login},
        experiments::{get_experiment, list_experiments},
        me::handle_me,
    },
    services::{
        account_events::AccountEvents, invites::InviteGate, oauth::fxa::client::FxaOAuthClient,
    },
    utils::jwt::JwtKeys,
    AppState,
};
use reqwest::Client;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorError, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Arc::new(Config::from_env().context("invalid configuration")?);
    let jwt_keys = Arc::new(JwtKeys::from_env().context("invalid JWT_SECRET")?);

    let global_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(config.rate_limit_ms)
            .burst_size(config.rate_limit_burst)
            .use_headers()
            .error_handler(too_many_requests)
            .finish()
            .ok_or_else(|| anyhow!("invalid rate limiter settings"))?,
    );
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(1)
            .burst_size(10)
            .use_headers()
            .error_handler(too_many_requests)
            .finish()
            .ok_or_else(|| anyhow!("invalid auth rate limiter settings"))?,
    );

    for limiter in [
        global_governor_conf.limiter().clone(),
        auth_governor_conf.limiter().clone(),
    ] {
        std::thread::spawn(move || {
            let interval = std::time::Duration::from_secs(60);
            loop {
                std::thread::sleep(interval);
                limiter.retain_recent();
            }
        });
    }

    let pg_pool = establish_connection(&config.database_url).await?;
    let user_repo = Arc::new(PostgresUserRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn UserRepository>;
    let profile_repo = Arc::new(PostgresProfileRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn ProfileRepository>;
    let experiment_repo = Arc::new(PostgresExperimentRepository { pool: pg_pool })
        as Arc<dyn ExperimentRepository>;

    let fxa_oauth = Arc::new(FxaOAuthClient {
        client: Client::new(),
        settings: config.fxa.clone(),
    });

    let account_events = AccountEvents::new().subscribe(Arc::new(InviteGate::new(
        profile_repo.clone(),
        config.invite_mode(),
    )));
    info!(mode = ?config.invite_mode(), "invite gate enabled");

    let state = AppState {
        db: user_repo,
        profiles: profile_repo,
        experiments: experiment_repo,
        fxa_oauth,
        account_events,
        config: config.clone(),
        jwt_keys,
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .context("FRONTEND_ORIGIN is not a valid header value")?,
        )
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/fxa/login", get(fxa_login))
        .route("/fxa/callback", get(fxa_callback))
        .layer(GovernorLayer {
            config: auth_governor_conf,
        });

    let api_routes = Router::new()
        .route("/me", get(handle_me))
        .route("/experiments", get(list_experiments))
        .route("/experiments/{id}", get(get_experiment))
        .layer(GovernorLayer {
            config: global_governor_conf,
        });

    let app = Router::new()
        .route("/", get(root))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, make_service).await?;
    Ok(())
}

/// `RUST_LOG` filters (default `info`); `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn too_many_requests(_err: GovernorError) -> Response {
    JsonResponse::too_many_requests("Too many requests. Please wait a moment and try again.")
        .into_response()
}

/// A simple root route.
async fn root() -> Response {
    JsonResponse::success("Hello, Idea Town!").into_response()
}

/// Establish a connection to the database and verify it.
async fn establish_connection(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPool::connect(database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("failed to verify database connection")?;

    Ok(pool)
}
