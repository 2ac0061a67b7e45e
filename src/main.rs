//! Application entry point.
//!
//! # Startup sequence (`run`)
//!
//! 1. Initialise logging.
//! 2. Load the settings store (defaults on first run).
//! 3. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Load the locale table and spawn the feedback thread.
//! 5. Register the hot-key and spawn the listener thread.
//! 6. Spawn the pipeline orchestrator, the provider status monitor and the
//!    settings watcher.
//! 7. Block until Ctrl+C, then let a run in flight finish.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use glotkey::{
    bridge::SystemBridge,
    config::{
        spawn_settings_watcher, AppConfig, AppPaths, ConfigStore, RELOAD_INTERVAL, SETTING_KEYS,
    },
    feedback::{spawn_feedback_thread, Locale},
    hotkey::{HotkeyCombo, HotkeyEvent, HotkeyListener, HotkeyRegistry, TriggerGate},
    intent::BUILTIN_ACTIONS,
    pipeline::{new_shared_state, wait_until_idle, PipelineEvent, PipelineOrchestrator},
    provider::{spawn_status_monitor, HttpProvider, ProviderClient},
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "glotkey", version, about = "Hot-key text translation and rewriting")]
struct Cli {
    /// Settings file to use instead of the platform default.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Listen for the hot-key and process selections (default).
    Run,
    /// List the models the configured provider offers.
    Models {
        /// Make MODEL the model every run uses.
        #[arg(long, value_name = "MODEL")]
        select: Option<String>,
    },
    /// Show the provider settings and whether it is reachable.
    Status,
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Manage custom `::actions`.
    Actions {
        #[command(subcommand)]
        action: ActionsCommand,
    },
    /// Show recent results.
    History {
        /// Delete all entries.
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the current settings.
    Show,
    /// Set one setting, e.g. `config set provider.kind openai`.
    Set { key: String, value: String },
    /// List the keys `set` accepts.
    Keys,
}

#[derive(Debug, Subcommand)]
enum ActionsCommand {
    /// List built-in and custom actions.
    List,
    /// Add or replace a custom action. Use `${text}` for the selection.
    Add { key: String, template: String },
    /// Remove a custom action.
    Remove { key: String },
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // 2. Configuration
    let (store, locales_dir) = match &cli.config {
        Some(path) => {
            let locales_dir = path
                .parent()
                .map(|dir| dir.join("locales"))
                .unwrap_or_else(|| PathBuf::from("locales"));
            (ConfigStore::load_from(path)?, locales_dir)
        }
        None => (ConfigStore::load()?, AppPaths::new().locales_dir),
    };

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&rt, store, locales_dir),
        Command::Models { select } => models(&rt, &store, select),
        Command::Status => {
            let settings = store.snapshot().provider;
            println!("provider: {:?}", settings.kind);
            println!("base url: {}", settings.trimmed_base_url());
            println!(
                "model:    {}",
                if settings.has_model() { settings.model.as_str() } else { "(none)" }
            );
            match rt.block_on(HttpProvider::new().probe_health(&settings)) {
                Ok(()) => println!("status:   online"),
                Err(e) => println!("status:   offline ({e})"),
            }
            Ok(())
        }
        Command::Config { action } => configure(&store, action),
        Command::Actions { action } => actions(&store, action),
        Command::History { clear } => history(&store, clear),
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn run(rt: &tokio::runtime::Runtime, store: ConfigStore, locales_dir: PathBuf) -> Result<()> {
    log::info!("glotkey starting up");
    let config = store.snapshot();

    // 4. Locale + feedback thread
    let locale = Arc::new(Locale::load(&locales_dir, &config.translation.app_language));
    let (event_tx, event_rx) = mpsc::channel::<PipelineEvent>(64);
    let _feedback = spawn_feedback_thread(event_rx).context("failed to spawn feedback thread")?;

    // 5. Hot-key
    let (hotkey_tx, hotkey_rx) = mpsc::channel::<HotkeyEvent>(4);
    let registry = HotkeyRegistry::new();
    if !registry.register(&config.hotkey.shortcut) {
        log::warn!("no hot-key active; run `glotkey config set hotkey.shortcut <combo>`");
    }
    let gate = TriggerGate::new();
    let listener = HotkeyListener::start(registry.clone(), gate.clone(), hotkey_tx)
        .context("failed to spawn hotkey-listener thread")?;

    // 6. Pipeline + status monitor + settings watcher
    let provider: Arc<dyn ProviderClient> = Arc::new(HttpProvider::new());
    let state = new_shared_state();
    let orchestrator = PipelineOrchestrator::new(
        store.clone(),
        Arc::new(SystemBridge::new(config.capture.settle_delay_ms)),
        Arc::clone(&provider),
        locale,
        event_tx.clone(),
        gate,
        Arc::clone(&state),
    );

    rt.block_on(async move {
        let pipeline = tokio::spawn(orchestrator.run(hotkey_rx));
        let monitor = spawn_status_monitor(provider, store.clone(), event_tx);
        let watcher = spawn_settings_watcher(store, RELOAD_INTERVAL, move |old, new| {
            apply_settings_change(&registry, old, new);
        });

        log::info!("ready; press {} on selected text", config.hotkey.shortcut);

        // 7. Wait for Ctrl+C
        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl+C")?;
        log::info!("shutting down");

        drop(listener);
        watcher.abort();
        monitor.abort();

        let phase = wait_until_idle(&state, SHUTDOWN_GRACE).await;
        if phase.is_busy() {
            log::warn!("run still {} after {SHUTDOWN_GRACE:?}; stopping it", phase.label());
        }
        pipeline.abort();
        Ok::<_, anyhow::Error>(())
    })
}

/// How long Ctrl+C waits for a run in flight.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// React to settings saved while the daemon runs.
///
/// Runs read everything else from a fresh snapshot, so only the hot-key
/// needs re-arming here.
fn apply_settings_change(registry: &HotkeyRegistry, old: &AppConfig, new: &AppConfig) {
    if old.hotkey.shortcut != new.hotkey.shortcut && !registry.register(&new.hotkey.shortcut) {
        log::warn!("no hot-key active; {:?} is not a valid shortcut", new.hotkey.shortcut);
    }
    if old.translation.app_language != new.translation.app_language
        || old.capture.settle_delay_ms != new.capture.settle_delay_ms
    {
        log::info!("notification language and settle delay take effect after a restart");
    }
}

fn models(
    rt: &tokio::runtime::Runtime,
    store: &ConfigStore,
    select: Option<String>,
) -> Result<()> {
    let settings = store.snapshot().provider;
    let available = rt.block_on(HttpProvider::new().list_models(&settings))?;

    let Some(model) = select else {
        for model in available {
            let marker = if model == settings.model { "*" } else { " " };
            println!("{marker} {model}");
        }
        return Ok(());
    };

    if !available.contains(&model) {
        bail!(
            "{model:?} is not offered by {}; available: {}",
            settings.trimmed_base_url(),
            available.join(", ")
        );
    }
    store.update(|live| live.provider.model = model.clone())?;
    println!("selected {model}");
    Ok(())
}

fn configure(store: &ConfigStore, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let mut config = store.snapshot();
            config.history.clear();
            if config.provider.api_key.is_some() {
                config.provider.api_key = Some("********".into());
            }
            if let Some(path) = store.path() {
                println!("# {}", path.display());
            }
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommand::Set { key, value } => {
            if key == "hotkey.shortcut" {
                HotkeyCombo::parse(value.trim())?;
            }
            let mut outcome = Ok(());
            store.update(|live| outcome = live.set_value(&key, &value))?;
            outcome?;
            println!("{key} updated");
        }
        ConfigCommand::Keys => {
            for key in SETTING_KEYS {
                println!("{key}");
            }
        }
    }
    Ok(())
}

fn actions(store: &ConfigStore, command: ActionsCommand) -> Result<()> {
    match command {
        ActionsCommand::List => {
            let config = store.snapshot();
            println!("built-in:");
            for (token, action) in BUILTIN_ACTIONS {
                println!("  ::{token:<10} {action:?}");
            }
            println!("custom:");
            if config.custom_actions.is_empty() {
                println!("  (none)");
            }
            for (key, template) in &config.custom_actions {
                println!("  ::{key:<10} {template}");
            }
        }
        ActionsCommand::Add { key, template } => {
            let mut config = store.snapshot();
            let key = config.add_custom_action(&key, &template)?;
            store.update(|live| live.custom_actions = config.custom_actions)?;
            println!("added ::{key}");
        }
        ActionsCommand::Remove { key } => {
            let mut removed = false;
            store.update(|live| removed = live.remove_custom_action(&key))?;
            if removed {
                println!("removed ::{key}");
            } else {
                println!("no custom action named {key:?}");
            }
        }
    }
    Ok(())
}

fn history(store: &ConfigStore, clear: bool) -> Result<()> {
    if clear {
        store.update(|live| live.history.clear())?;
        println!("history cleared");
        return Ok(());
    }

    let history = store.snapshot().history;
    if history.is_empty() {
        println!("(no history)");
    }
    for entry in history {
        println!("[{}] {} ({})", entry.timestamp_ms, entry.original, entry.model);
        println!("  → {}", entry.result);
    }
    Ok(())
}
