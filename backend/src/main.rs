//! Service entry point and operational commands.
//!
//! One binary, three commands: `serve` runs the HTTP API, `import` folds
//! the legacy signup table into the normalised schema, and `dispatch`
//! sends due reminders for one scheduler tick. Import and dispatch are both
//! idempotent, so cron retries and overlapping runs are safe.

use std::env;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultClock;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use actix_web::web;
use autopilot_backend::api::health::HealthState;
use autopilot_backend::domain::user::DEFAULT_REMINDER_DAYS;
use autopilot_backend::domain::{LegacyImportService, ReminderDispatchService};
use autopilot_backend::outbound::notify::LogOnlyGateway;
use autopilot_backend::outbound::persistence::{
    DbPool, DieselLegacySignupSource, DieselObligationRepository, DieselReminderRepository,
    DieselUserRepository, DieselVehicleRepository, PoolConfig, migrate,
};
use autopilot_backend::server::{ServerConfig, create_server};

#[derive(Parser)]
#[command(name = "autopilot-backend", version, about = "Obligation and reminder ledger")]
struct Cli {
    /// PostgreSQL connection string; defaults to the DATABASE_URL variable.
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server.
    Serve {
        /// Address and port to listen on.
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Import the legacy signup table into the normalised schema.
    Import,
    /// Send due reminders for the given lead times (days before due date).
    Dispatch {
        /// Lead times to dispatch; defaults to the standard ladder.
        #[arg(long = "lead-days")]
        lead_days: Vec<u16>,
    },
}

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let cli = Cli::parse();
    let database_url = match cli.database_url {
        Some(url) => url,
        None => env::var("DATABASE_URL")
            .wrap_err("set DATABASE_URL or pass --database-url")?,
    };

    migrate::run_pending(&database_url)
        .await
        .wrap_err("schema migration failed")?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .wrap_err("connection pool construction failed")?;

    match cli.command {
        Command::Serve { bind } => serve(pool, bind).await,
        Command::Import => import(pool).await,
        Command::Dispatch { lead_days } => dispatch(pool, lead_days).await,
    }
}

async fn serve(pool: DbPool, bind: String) -> Result<()> {
    let config = ServerConfig { bind_addr: bind };
    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr, "starting HTTP server");
    create_server(pool, &config, health_state)
        .wrap_err("server startup failed")?
        .await
        .wrap_err("server terminated abnormally")
}

async fn import(pool: DbPool) -> Result<()> {
    let service = LegacyImportService::new(
        Arc::new(DieselLegacySignupSource::new(pool.clone())),
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselVehicleRepository::new(pool.clone())),
        Arc::new(DieselObligationRepository::new(pool)),
    );
    let report = service.run().await.wrap_err("legacy import failed")?;
    if report.source_missing {
        info!("no legacy table found; database left untouched");
    }
    Ok(())
}

async fn dispatch(pool: DbPool, lead_days: Vec<u16>) -> Result<()> {
    let service = ReminderDispatchService::new(
        Arc::new(DieselObligationRepository::new(pool.clone())),
        Arc::new(DieselReminderRepository::new(pool)),
        Arc::new(LogOnlyGateway),
        Arc::new(DefaultClock),
    );
    let lead_days = if lead_days.is_empty() {
        DEFAULT_REMINDER_DAYS.to_vec()
    } else {
        lead_days
    };
    for lead in lead_days {
        service
            .run(lead)
            .await
            .wrap_err_with(|| format!("dispatch failed at lead time {lead}"))?;
    }
    Ok(())
}
