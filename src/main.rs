use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devns::app::{App, Focus, InputMode, Screen, StatusLevel};
use devns::config;
use devns::domain::TargetNetwork;
use devns::infrastructure::ethereum::{connect_wallet, ProviderConfig};
use devns::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, WorkerSettings};
use devns::seed;
use devns::session::{ProviderDetector, SessionSettings};
use devns::ui;

#[derive(Debug, Parser)]
#[command(
    name = "devns",
    version,
    about = "devns: register names on an on-chain name registry from the terminal",
    after_help = "With a local anvil node, start it on the registry network: anvil --chain-id 80001"
)]
struct Args {
    /// HTTP JSON-RPC endpoint of the wallet (e.g. http://localhost:8545)
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long, global = true)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long, global = true)]
    ipc: Option<PathBuf>,

    /// Deployed registry contract address
    #[arg(long, global = true)]
    contract: Option<String>,

    /// Wallet implementation to accept (anvil, hardhat, geth, reth)
    #[arg(long, global = true)]
    expected_wallet: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Register the sample names and print every registered name
    Seed,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load();
    let contract = config.contract_address(args.contract.as_deref())?;
    let wallet = wallet_endpoint(&args, &config)?;
    let expected_wallet = args
        .expected_wallet
        .clone()
        .unwrap_or_else(|| config.wallet.expected());

    if let Some(CliCommand::Seed) = args.command {
        init_stderr_logging();
        return run_seed(wallet, config.wallet.chain_poll(), &expected_wallet, contract);
    }

    init_file_logging()?;
    tracing::info!(contract = %contract, wallet = %wallet.display(), "starting devns");

    let target = TargetNetwork::default();
    let settings = WorkerSettings {
        wallet: Some(wallet),
        chain_poll: config.wallet.chain_poll(),
        session: SessionSettings {
            contract,
            target: target.clone(),
            expected_wallet,
            refresh_delay: config.registry.refresh_delay(),
        },
        surface_provider_errors: config.registry.surface_provider_errors,
    };

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create the runtime bridge
    let runtime = RuntimeBridge::new(settings)?;

    let mut app = App::new(config.registry.tld(), target);
    app.contract = Some(contract);
    app.set_status("Looking for a wallet…", StatusLevel::Info);

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

fn init_file_logging() -> Result<()> {
    let path = config::log_path().context("Cannot determine a data directory for the log file")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devns=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devns=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run_seed(
    wallet: ProviderConfig,
    chain_poll: Duration,
    expected_wallet: &str,
    contract: alloy::primitives::Address,
) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;
    rt.block_on(async {
        let wallet = connect_wallet(wallet, chain_poll).await?;
        let provider = ProviderDetector::new(Some(wallet), expected_wallet).detect()?;
        let report = seed::seed_registry(&provider, contract).await?;
        for (name, tx_hash) in &report.registered {
            println!("registered {name}  {tx_hash}");
        }
        println!("All names: {:?}", report.names);
        Ok::<_, anyhow::Error>(())
    })
}

fn wallet_endpoint(args: &Args, config: &config::Config) -> Result<ProviderConfig> {
    fn non_empty(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|s| !s.is_empty())
    }

    // CLI arguments take precedence
    if let Some(ipc) = args.ipc.clone() {
        return ipc_endpoint(ipc);
    }
    if let Some(ws) = non_empty(args.ws.as_deref()) {
        return Ok(ProviderConfig::WebSocket(ws.to_string()));
    }
    if let Some(rpc) = non_empty(args.rpc.as_deref()) {
        return Ok(ProviderConfig::Http(normalize_http_endpoint(rpc)));
    }

    // Config file
    if let Some(ipc) = non_empty(config.wallet.ipc.as_deref()).and_then(expand_path) {
        return ipc_endpoint(ipc);
    }
    if let Some(ws) = non_empty(config.wallet.ws.as_deref()) {
        return Ok(ProviderConfig::WebSocket(ws.to_string()));
    }
    if let Some(rpc) = non_empty(config.wallet.rpc.as_deref()) {
        return Ok(ProviderConfig::Http(normalize_http_endpoint(rpc)));
    }

    Ok(ProviderConfig::Http(normalize_http_endpoint("localhost:8545")))
}

#[cfg(unix)]
fn ipc_endpoint(path: PathBuf) -> Result<ProviderConfig> {
    Ok(ProviderConfig::Ipc(path))
}

#[cfg(not(unix))]
fn ipc_endpoint(_path: PathBuf) -> Result<ProviderConfig> {
    Err(anyhow::anyhow!("IPC is not supported on this platform"))
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    let mut buf = PathBuf::from(trimmed);
    if buf.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            buf = cwd.join(buf);
        }
    }
    Some(buf)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, &runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        app.apply_event(event);
    }

    for cmd in app.take_pending_commands() {
        if let Err(err) = runtime.send(cmd) {
            app.set_status(err.to_string(), StatusLevel::Error);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Alerts block everything until dismissed
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_alert();
        }
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Insert => handle_insert_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }
        (KeyCode::Char('q'), _) => app.should_quit = true,
        (KeyCode::Char('?'), _) => app.help_open = true,
        (KeyCode::Char(':'), _) => app.enter_command(),
        (KeyCode::Char('c'), _) => app.connect(),
        (KeyCode::Char('s'), _) => app.switch_network(),
        (KeyCode::Char('r'), _) => app.refresh(),
        _ if app.screen() != Screen::Registry => {}
        (KeyCode::Tab, _) => app.cycle_focus(),
        (KeyCode::Char('i'), _) => app.enter_insert(),
        (KeyCode::Char('e'), _) => app.start_edit(),
        (KeyCode::Char('j') | KeyCode::Down, _) => app.move_selection(true),
        (KeyCode::Char('k') | KeyCode::Up, _) => app.move_selection(false),
        (KeyCode::Enter, _) if app.focus == Focus::List => app.start_edit(),
        (KeyCode::Enter, _) => app.submit(),
        (KeyCode::Esc, _) if app.editing => app.cancel_edit(),
        _ => {}
    }
}

fn handle_insert_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_insert(),
        KeyCode::Enter => {
            app.exit_insert();
            app.submit();
        }
        KeyCode::Tab => {
            app.cycle_focus();
            if app.focus == Focus::List {
                app.cycle_focus();
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = app.active_field() {
                field.pop();
            }
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            if let Some(field) = app.active_field() {
                field.push(ch);
            }
        }
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}
