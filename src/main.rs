use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use poem::{EndpointExt, Route, Server, listener::TcpListener};
use poem_openapi::OpenApiService;

use roster_backend::api::{AdminApi, AuthApi, EdgeGuard, HealthApi};
use roster_backend::app_data::AppData;
use roster_backend::cli::{self, Cli, Commands};
use roster_backend::config::{BootstrapSettings, SecretManager, init_database, init_logging, migrate_database};
use roster_backend::coordinators::{AdminCoordinator, AuthCoordinator};
use roster_backend::providers::SystemClock;

/// Request path prefix the edge guard protects
const ADMIN_PATH_PREFIX: &str = "/api/admin";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging()?;

    let settings = BootstrapSettings::from_env()?;

    // Migrations need only the database, not secrets
    if cli.command == Some(Commands::Migrate) {
        return cli::migrate::run_migrations(&settings).await;
    }

    let secret_manager = match SecretManager::init() {
        Ok(secrets) => Arc::new(secrets),
        Err(e) => {
            tracing::error!("Failed to load secrets: {}", e);
            std::process::exit(1);
        }
    };

    let db = init_database(&settings).await?;
    migrate_database(&db).await?;

    let app_data = Arc::new(AppData::new(
        db,
        secret_manager,
        Arc::new(SystemClock),
        settings.cookie_secure(),
    ));

    if let Some(command) = cli.command {
        return cli::execute_command(command, app_data).await;
    }

    spawn_purge_sweeper(app_data.clone(), settings.purge_sweep_interval_minutes());

    let auth_api = AuthApi::new(
        Arc::new(AuthCoordinator::new(app_data.clone())),
        app_data.session_resolver.clone(),
        app_data.cookie_secure,
    );
    let admin_api = AdminApi::new(
        Arc::new(AdminCoordinator::new(app_data.clone())),
        app_data.session_resolver.clone(),
    );
    let health_api = HealthApi::new(app_data.clock.clone());

    let api_service = OpenApiService::new((health_api, auth_api, admin_api), "Roster API", "1.0.0")
        .server(format!("http://{}/api", settings.server_address()));

    let ui = api_service.swagger_ui();

    let app = Route::new()
        .nest(
            "/api",
            api_service.with(EdgeGuard::new(app_data.edge_verifier.clone(), ADMIN_PATH_PREFIX)),
        )
        .nest("/swagger", ui);

    tracing::info!(
        address = %settings.server_address(),
        env = ?settings.app_env(),
        "Starting server"
    );
    tracing::info!("Swagger UI available at http://{}/swagger", settings.server_address());

    Server::new(TcpListener::bind(settings.server_address()))
        .run(app)
        .await?;

    Ok(())
}

/// Run the purge sweep on a fixed interval in the background
///
/// An interval of zero disables the task; `roster purge-sweep` can then be
/// scheduled externally.
fn spawn_purge_sweeper(app_data: Arc<AppData>, interval_minutes: u64) {
    if interval_minutes == 0 {
        tracing::info!("Background purge sweep disabled");
        return;
    }

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_minutes * 60));
        loop {
            interval.tick().await;
            if let Err(e) = app_data.purge_sweeper.run().await {
                tracing::error!(error = %e, "Purge sweep could not list candidates");
            }
        }
    });

    tracing::info!(interval_minutes, "Background purge sweep scheduled");
}
