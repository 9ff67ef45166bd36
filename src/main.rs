mod accounts;
mod admin;
mod app;
mod auth;
mod bootstrap;
mod config;
mod rejection;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "navai=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    if let Some(superuser) = &app_state.config.superuser {
        bootstrap::ensure_superuser(app_state.users.as_ref(), superuser).await?;
    }

    app::serve(app::build_app(app_state)).await
}
