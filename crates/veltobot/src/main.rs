use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::types::AllowedUpdate;
use teloxide::update_listeners::Polling;

use veltocore::core::init_logger;
use veltocore::onboarding::InMemorySessionStore;
use veltocore::{
    config, create_pool, AdminReporting, MembershipReconciler, OnboardingEngine, QuestionCatalog, RecordStore,
    SqliteStore,
};

use velto::cli::{Cli, Commands};
use velto::health;
use velto::telegram::export::render_csv;
use velto::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TelegramGateway};

/// Main entry point for the Velto onboarding bot
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics from handler tasks instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // .env first so LOG_FILE_PATH and friends can come from it
    let _ = dotenv();
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::Export { output }) => run_export(&output).await,
    }
}

fn load_catalog() -> Result<QuestionCatalog> {
    match config::QUESTIONS_PATH.as_deref() {
        Some(path) => {
            log::info!("Loading questions from {}", path);
            QuestionCatalog::from_json_file(path).with_context(|| format!("Failed to load questions from {path}"))
        }
        None => Ok(QuestionCatalog::default()),
    }
}

async fn run_bot() -> Result<()> {
    let group_id = (*config::GROUP_ID).context("GROUP_ID must be set to the managed group's chat id")?;

    let pool = create_pool(&config::DATABASE_PATH)
        .with_context(|| format!("Failed to open database at {}", *config::DATABASE_PATH))?;
    let records: Arc<dyn RecordStore> = Arc::new(SqliteStore::new(Arc::new(pool)));
    let catalog = Arc::new(load_catalog()?);
    log::info!("Questionnaire has {} questions", catalog.len());

    let bot = create_bot(&config::BOT_TOKEN)?;
    let gateway = Arc::new(TelegramGateway::new(bot.clone(), group_id));

    let engine = Arc::new(OnboardingEngine::new(
        catalog,
        records.clone(),
        Arc::new(InMemorySessionStore::new()),
        gateway.clone(),
    ));
    let reconciler = Arc::new(MembershipReconciler::new(records.clone(), group_id));
    let reporting = Arc::new(AdminReporting::new(records, gateway));
    let deps = HandlerDeps::new(engine, reconciler, reporting, group_id);

    let port = *config::PORT;
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(port).await {
            log::error!("Liveness server stopped: {}", e);
        }
    });

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    log::info!("Starting Velto bot for group {}", group_id);

    let listener = Polling::builder(bot.clone())
        .allowed_updates(vec![
            AllowedUpdate::Message,
            AllowedUpdate::CallbackQuery,
            AllowedUpdate::ChatMember,
        ])
        .drop_pending_updates()
        .build();

    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Writes the user table to `output` without touching Telegram.
async fn run_export(output: &str) -> Result<()> {
    let pool = create_pool(&config::DATABASE_PATH)
        .with_context(|| format!("Failed to open database at {}", *config::DATABASE_PATH))?;
    let store = SqliteStore::new(Arc::new(pool));

    let records = store.all().await?;
    fs_err::write(output, render_csv(&records))?;

    log::info!("Exported {} records to {}", records.len(), output);
    Ok(())
}
