//! HTTP daemon: database setup, router assembly and graceful shutdown.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Router,
    extract::State,
    http::{
        HeaderValue,
        Method,
        header::{ACCEPT, CONTENT_TYPE, ORIGIN},
    },
    response::{Html, IntoResponse},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
use url::Url;

use super::{admin, cli::AppConfig, rest};
use crate::{
    chatbot::RapidApiChatbot,
    context::AppContext,
    db::{DEFAULT_POOL_SIZE, DbPool, apply_migrations, establish_pool},
    graphql::{HealthhubSchema, build_schema},
    mail::{LogMailer, Mailer, SmtpMailer, SmtpSettings},
};

/// Run the HTTP server using the supplied configuration.
///
/// # Errors
///
/// Returns any failure reported while preparing the database, binding the
/// socket, or serving requests.
pub async fn run_daemon(cfg: AppConfig) -> Result<()> {
    let pool = setup_database(&cfg.database).await?;
    let ctx = build_context(&cfg, pool)?;
    let app = build_router(ctx, &cfg.cors_origin)?;

    let listener = TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind))?;
    info!(bind = %cfg.bind, cors_origin = %cfg.cors_origin, "healthhub listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("server stopped");
    Ok(())
}

/// Assemble the shared request context from configuration.
///
/// # Errors
///
/// Returns an error when the Argon2 parameters are invalid.
pub fn build_context(cfg: &AppConfig, pool: DbPool) -> Result<AppContext> {
    let argon2 = Arc::new(admin::argon2_from_config(cfg)?);
    if cfg.chatbot_api_key.is_none() || cfg.chatbot_bot_id.is_none() {
        warn!("chatbot credentials not configured; /bot-response will fail");
    }
    let chatbot = RapidApiChatbot::new(
        cfg.chatbot_url.clone(),
        cfg.chatbot_host.clone(),
        cfg.chatbot_api_key.clone().unwrap_or_default(),
        cfg.chatbot_bot_id.clone().unwrap_or_default(),
    );
    Ok(AppContext::new(
        pool,
        argon2,
        mailer_from_config(cfg)?,
        Arc::new(chatbot),
    ))
}

/// Relay through SMTP when a host is configured, otherwise drop mail after
/// logging its envelope.
///
/// # Errors
///
/// Returns an error when the SMTP settings are invalid.
pub fn mailer_from_config(cfg: &AppConfig) -> Result<Arc<dyn Mailer>> {
    let Some(host) = cfg.smtp_host.as_deref() else {
        warn!("smtp_host not configured; verification mail will not be delivered");
        return Ok(Arc::new(LogMailer));
    };
    let mailer = SmtpMailer::new(&SmtpSettings {
        host,
        port: cfg.smtp_port,
        username: cfg.smtp_username.as_deref(),
        password: cfg.smtp_password.as_deref(),
        from: &cfg.mail_from,
    })
    .context("invalid SMTP configuration")?;
    info!(host, port = cfg.smtp_port, "relaying verification mail over SMTP");
    Ok(Arc::new(mailer))
}

/// Build the full router: REST forms, GraphQL, CORS and request tracing.
///
/// # Errors
///
/// Returns an error when `cors_origin` is not a valid header value.
pub fn build_router(ctx: AppContext, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid CORS origin '{cors_origin}'"))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ORIGIN, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let schema = build_schema(ctx.clone());
    let graphql = Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .with_state(schema);

    Ok(rest::routes()
        .with_state(ctx)
        .merge(graphql)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

async fn graphql_handler(
    State(schema): State<HealthhubSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> impl IntoResponse { Html(GraphiQLSource::build().endpoint("/graphql").finish()) }

/// Determine whether the supplied connection string targets Postgres.
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
fn is_postgres_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(u) => matches!(u.scheme(), "postgres" | "postgresql"),
        Err(err) => {
            warn!(target = "server::daemon", "invalid database url '{s}': {err}");
            false
        }
    }
}

/// Build the connection pool, audit backend features and apply migrations.
///
/// # Errors
///
/// Returns an error when the pool cannot be created, the backend lacks a
/// required feature, or migrations fail.
pub async fn setup_database(database: &str) -> Result<DbPool> {
    let pool: DbPool = establish_pool(database, DEFAULT_POOL_SIZE)
        .await
        .with_context(|| format!("failed to open database '{database}'"))?;
    {
        let mut conn = pool.get().await.context("failed to get db connection")?;
        #[cfg(feature = "sqlite")]
        crate::db::audit_sqlite_features(&mut conn).await?;
        #[cfg(all(feature = "postgres", not(feature = "sqlite")))]
        if is_postgres_url(database) {
            crate::db::audit_postgres_features(&mut conn).await?;
        }
        apply_migrations(&mut conn, database).await?;
    }
    Ok(pool)
}

/// Waits for a shutdown signal, completing when termination is requested.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        if let Err(err) = res {
                            warn!(error = %err, "failed to listen for Ctrl-C");
                        }
                    },
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                wait_for_ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await;
    }
    info!("shutdown signal received");
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C");
    }
}
