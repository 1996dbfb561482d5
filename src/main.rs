use polls_site::admin::AdminSite;
use polls_site::config::Config;
use polls_site::db::{self, PgStore};
use polls_site::startup::{AppState, build_router};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "INFO");
        }
    }
    // initialize tracing
    tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let pool = db::init_db(&config.database_url, config.max_connections).await?;
    info!("{}", db::pool_stats(&pool));

    let admin_site = match config.admin_token.clone() {
        Some(token) => Some((AdminSite::with_poll_models()?, token)),
        None => {
            info!("ADMIN_TOKEN not set, admin routes disabled");
            None
        }
    };

    let app = build_router(AppState::new(PgStore::new(pool)), admin_site);

    info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
