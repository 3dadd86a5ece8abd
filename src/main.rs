use lawlink::{AppState, auth, config::Config, db, email::Mailer, payments::StripeClient};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lawlink=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(&config.database_url)
        .await?;
    db::init(&db_pool).await?;

    let state = AppState {
        clients: auth::Clients::from_config(&config),
        stripe: StripeClient::new(&config),
        mailer: Mailer::new(&config),
        db_pool,
    };

    let app = lawlink::app(state);
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("listening on 0.0.0.0:8080");
    axum::serve(listener, app).await?;

    Ok(())
}
