mod repl;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::core::command::{CommandContext, Permissions};
use crate::core::config::{load_config, AppConfig};
use crate::core::error::BotError;
use crate::core::message::{Destination, OutboundMessage};
use crate::core::notifier::{send_logged, Notifier};
use crate::core::session::{OwnerId, PomodoroPlan};
use crate::core::todo::TodoStore;
use crate::dispatch::Dispatcher;
use crate::providers::{create_lms, create_notifier};
use crate::session::SessionManager;
use crate::storage::{Database, MemoryTodoStore};

#[derive(Parser, Debug)]
#[command(name = "study-bot", version, about = "Study-session companion: timers, Pomodoro, to-dos and Canvas deadlines")]
struct Cli {
    /// Run a single command (e.g. "!courses") and exit
    #[arg(short = 'e', long)]
    execute: Option<String>,

    /// Working directory
    #[arg(short = 'c', long = "cwd")]
    working_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// User issuing commands
    #[arg(long, env = "STUDY_BOT_USER", default_value = "local-user")]
    user: String,

    /// Channel replies and reminders go to (defaults to the configured Discord channel)
    #[arg(long)]
    channel: Option<String>,

    /// Guild the session belongs to (defaults to the channel)
    #[arg(long)]
    guild: Option<String>,

    /// Grant administrator permission
    #[arg(long)]
    admin: bool,

    /// Keep to-do lists in memory instead of SQLite
    #[arg(long)]
    memory: bool,
}

pub struct App {
    pub config: AppConfig,
    pub dispatcher: Dispatcher,
    pub notifier: Arc<dyn Notifier>,
    pub context: CommandContext,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let app = build_app(&cli).await?;

    match cli.execute {
        Some(input) => run_once(&app, &input).await,
        None => {
            announce_ready(&app).await;
            repl::run(app).await
        }
    }
}

async fn build_app(cli: &Cli) -> Result<App, BotError> {
    let mut config = load_config(cli.working_dir.clone())?;
    if cli.debug {
        config.debug = true;
    }

    let todos: Arc<dyn TodoStore> = if cli.memory {
        Arc::new(MemoryTodoStore::new())
    } else {
        let db = Database::open(&config).await?;
        db.run_migrations().await?;
        Arc::new(db.todos())
    };

    let notifier = create_notifier(&config);
    let sessions = Arc::new(SessionManager::new(
        Arc::clone(&notifier),
        config.session.max_session_minutes,
    ));

    let mut dispatcher = Dispatcher::new(sessions, todos, config.command_prefix.clone())
        .with_pomodoro_defaults(PomodoroPlan {
            work_minutes: config.session.work_minutes,
            break_minutes: config.session.break_minutes,
            cycles: config.session.cycles,
        });
    if let Some(lms) = create_lms(&config) {
        dispatcher = dispatcher.with_lms(lms);
    }

    let channel = cli
        .channel
        .clone()
        .or_else(|| config.discord.channel_id.clone())
        .unwrap_or_else(|| "local".to_string());
    let context = CommandContext {
        owner: OwnerId(cli.guild.clone().unwrap_or_else(|| channel.clone())),
        user_id: cli.user.clone(),
        channel_id: channel,
        permissions: Permissions {
            administrator: cli.admin || config.is_admin(&cli.user),
        },
    };

    Ok(App {
        config,
        dispatcher,
        notifier,
        context,
    })
}

async fn run_once(app: &App, input: &str) -> Result<()> {
    match app.dispatcher.dispatch(&app.context, input).await {
        Some(reply) => println!("{}", reply.plain_text()),
        None => anyhow::bail!(
            "'{input}' is not a command; commands start with '{}'",
            app.dispatcher.prefix()
        ),
    }
    Ok(())
}

/// Greets the configured Discord channel once the bot is up.
async fn announce_ready(app: &App) {
    if !app.config.has_discord() {
        return;
    }
    if let Some(channel) = &app.config.discord.channel_id {
        send_logged(
            app.notifier.as_ref(),
            &Destination::channel(channel.clone()),
            OutboundMessage::text("Hello! Study bot is ready!"),
        )
        .await;
    }
}
