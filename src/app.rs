use std::time::{Duration, Instant};

use alloy::primitives::Address;
use chrono::{DateTime, Local};

use crate::core::{parse_command, Command};
use crate::domain::{ConnectionState, LengthTier, MintRecord, NetworkState, TargetNetwork};
use crate::infrastructure::runtime::{NoticeLevel, RuntimeCommand, RuntimeEvent, SessionEvent};
use crate::session::RecordOutcome;

/// What the main panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// No wallet account yet: offer to connect
    Connect,
    /// Connected on another chain: offer to switch
    SwitchNetwork,
    /// Mint form and the list of registered names
    Registry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Domain,
    Record,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the focused form field
    Insert,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl From<NoticeLevel> for StatusLevel {
    fn from(level: NoticeLevel) -> Self {
        match level {
            NoticeLevel::Info => StatusLevel::Info,
            NoticeLevel::Warn => StatusLevel::Warn,
            NoticeLevel::Error => StatusLevel::Error,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub at: DateTime<Local>,
    pub since: Instant,
}

#[derive(Debug)]
pub struct App {
    /// Session the displayed state belongs to
    pub epoch: u64,
    pub contract: Option<Address>,
    pub tld: String,
    pub target: TargetNetwork,
    pub endpoint: String,
    pub wallet_kind: String,
    pub connection: ConnectionState,
    pub network: Option<NetworkState>,
    pub on_target: bool,
    pub loading: bool,
    pub mints: Vec<MintRecord>,
    pub selected_mint: usize,
    pub domain_input: String,
    pub record_input: String,
    /// Updating the record of an owned name instead of minting
    pub editing: bool,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub alert: Option<String>,
    pub status: Option<StatusMessage>,
    pub status_ttl: Duration,
    pub help_open: bool,
    pub should_quit: bool,
    pending: Vec<RuntimeCommand>,
    /// A mint or record update was queued and the worker has not finished it
    submitted: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new("dev", TargetNetwork::default())
    }
}

impl App {
    pub fn new(tld: impl Into<String>, target: TargetNetwork) -> Self {
        Self {
            epoch: 0,
            contract: None,
            tld: tld.into(),
            target,
            endpoint: "not detected".to_string(),
            wallet_kind: "unknown".to_string(),
            connection: ConnectionState::Unchecked,
            network: None,
            on_target: false,
            loading: false,
            mints: Vec::new(),
            selected_mint: 0,
            domain_input: String::new(),
            record_input: String::new(),
            editing: false,
            focus: Focus::Domain,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            alert: None,
            status: None,
            status_ttl: Duration::from_secs(6),
            help_open: false,
            should_quit: false,
            pending: Vec::new(),
            submitted: false,
        }
    }

    pub fn screen(&self) -> Screen {
        if !self.connection.is_connected() {
            Screen::Connect
        } else if !self.on_target {
            Screen::SwitchNetwork
        } else {
            Screen::Registry
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.connection.account()
    }

    pub fn network_label(&self) -> &'static str {
        self.network
            .as_ref()
            .map(|network| network.name.label())
            .unwrap_or("unknown network")
    }

    /// Price of the name currently typed, if it is long enough
    pub fn price_preview(&self) -> Option<&'static str> {
        LengthTier::for_name(self.domain_input.trim())
            .ok()
            .map(LengthTier::price_label)
    }

    pub fn selected_mint(&self) -> Option<&MintRecord> {
        self.mints.get(self.selected_mint)
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            at: Local::now(),
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > self.status_ttl {
                self.status = None;
            }
        }
    }

    /// Drop everything derived from the previous session
    fn reset_session(&mut self, epoch: u64, contract: Address) {
        self.epoch = epoch;
        self.contract = Some(contract);
        self.connection = ConnectionState::Unchecked;
        self.network = None;
        self.on_target = false;
        self.loading = false;
        self.mints.clear();
        self.selected_mint = 0;
        self.domain_input.clear();
        self.record_input.clear();
        self.editing = false;
        self.focus = Focus::Domain;
        self.pending.clear();
        self.submitted = false;
    }

    pub fn apply_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::SessionStarted { epoch, contract } => {
                let rebuilt = self.epoch > 0;
                self.reset_session(epoch, contract);
                if rebuilt {
                    self.set_status("Wallet changed chains, session reloaded", StatusLevel::Info);
                }
            }
            RuntimeEvent::Session { epoch, event } => {
                if epoch == self.epoch {
                    self.apply_session_event(event);
                }
            }
            RuntimeEvent::Error { message } => self.set_status(message, StatusLevel::Error),
        }
    }

    fn apply_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ProviderReady { endpoint, kind } => {
                self.endpoint = endpoint;
                self.wallet_kind = kind;
            }
            SessionEvent::NetworkResolved { network, on_target } => {
                self.network = Some(network);
                self.on_target = on_target;
            }
            SessionEvent::ConnectionChanged(state) => self.connection = state,
            SessionEvent::Loading(active) => {
                self.loading = active;
                if !active {
                    self.submitted = false;
                }
            }
            SessionEvent::MintsReady(mints) => {
                self.mints = mints;
                self.clamp_selection();
            }
            SessionEvent::Registered {
                name,
                tx_hash,
                record,
            } => {
                let url = self.target.tx_url(&tx_hash.to_string());
                match record {
                    RecordOutcome::Failed(_) => {
                        self.set_status(
                            format!("{name}.{} minted, record not set: {url}", self.tld),
                            StatusLevel::Warn,
                        );
                    }
                    RecordOutcome::NotRequested | RecordOutcome::Set(_) => {
                        self.domain_input.clear();
                        self.record_input.clear();
                        self.set_status(
                            format!("Domain minted! {name}.{} {url}", self.tld),
                            StatusLevel::Info,
                        );
                    }
                }
            }
            SessionEvent::RecordUpdated { name, tx_hash } => {
                self.domain_input.clear();
                self.record_input.clear();
                let url = self.target.tx_url(&tx_hash.to_string());
                self.set_status(
                    format!("Record of {name}.{} updated {url}", self.tld),
                    StatusLevel::Info,
                );
            }
            SessionEvent::Alert(message) => {
                self.submitted = false;
                self.alert = Some(message);
            }
            SessionEvent::Notice { message, level } => self.set_status(message, level.into()),
        }
    }

    pub fn dismiss_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }

    pub fn connect(&mut self) {
        self.pending.push(RuntimeCommand::Connect);
    }

    pub fn switch_network(&mut self) {
        self.pending.push(RuntimeCommand::SwitchNetwork);
    }

    pub fn refresh(&mut self) {
        self.pending.push(RuntimeCommand::RefreshMints);
    }

    /// Mint, or set the record when editing. Ignored while an operation runs
    /// or one is queued and not yet picked up by the worker.
    pub fn submit(&mut self) {
        if self.loading || self.submitted {
            self.set_status("Wait for the pending transaction", StatusLevel::Warn);
            return;
        }
        let name = self.domain_input.trim().to_string();
        let record = self.record_input.trim().to_string();
        let cmd = if self.editing {
            if name.is_empty() || record.is_empty() {
                return;
            }
            RuntimeCommand::SetRecord { name, record }
        } else {
            RuntimeCommand::Register { name, record }
        };
        self.submitted = true;
        self.pending.push(cmd);
    }

    /// Start editing the selected name; only names owned by the connected account
    pub fn start_edit(&mut self) {
        let Some(mint) = self.selected_mint() else {
            return;
        };
        let owned = mint.is_owned_by(self.account());
        let name = mint.name.clone();
        if !owned {
            let message = format!("{name}.{} is not owned by this account", self.tld);
            self.set_status(message, StatusLevel::Warn);
            return;
        }
        self.domain_input = name;
        self.editing = true;
        self.focus = Focus::Record;
    }

    pub fn start_edit_named(&mut self, name: &str) {
        match self.mints.iter().position(|mint| mint.name == name) {
            Some(index) => {
                self.selected_mint = index;
                self.start_edit();
            }
            None => self.set_status(format!("{name}.{} not found", self.tld), StatusLevel::Warn),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
        if self.focus == Focus::Record {
            self.focus = Focus::Domain;
        }
    }

    pub fn take_pending_commands(&mut self) -> Vec<RuntimeCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match (self.focus, self.editing) {
            (Focus::Domain, _) => Focus::Record,
            (Focus::Record, _) => Focus::List,
            (Focus::List, true) => Focus::Record,
            (Focus::List, false) => Focus::Domain,
        };
    }

    pub fn enter_insert(&mut self) {
        if self.focus == Focus::List {
            self.focus = if self.editing {
                Focus::Record
            } else {
                Focus::Domain
            };
        }
        self.input_mode = InputMode::Insert;
    }

    pub fn exit_insert(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Field the user is typing into; the name is fixed while editing
    pub fn active_field(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Domain if !self.editing => Some(&mut self.domain_input),
            Focus::Record => Some(&mut self.record_input),
            _ => None,
        }
    }

    pub fn move_selection(&mut self, down: bool) {
        if self.mints.is_empty() {
            return;
        }
        self.selected_mint = if down {
            (self.selected_mint + 1).min(self.mints.len() - 1)
        } else {
            self.selected_mint.saturating_sub(1)
        };
    }

    fn clamp_selection(&mut self) {
        if self.mints.is_empty() {
            self.selected_mint = 0;
        } else if self.selected_mint >= self.mints.len() {
            self.selected_mint = self.mints.len() - 1;
        }
    }

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        if input.is_empty() {
            self.exit_command();
            return;
        }

        let cmd = parse_command(&input);
        self.exit_command();
        if !matches!(cmd, Command::Unknown(_)) {
            self.command.last = Some(input);
        }
        self.execute_command(cmd);
    }

    pub fn execute_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect => self.connect(),
            Command::Switch => self.switch_network(),
            Command::Mint { name, record } => {
                self.editing = false;
                self.domain_input = name;
                self.record_input = record;
                self.submit();
            }
            Command::Set { name, record } => {
                let owned = self
                    .mints
                    .iter()
                    .any(|mint| mint.name == name && mint.is_owned_by(self.account()));
                if !owned {
                    self.set_status(
                        format!("{name}.{} is not owned by this account", self.tld),
                        StatusLevel::Warn,
                    );
                    return;
                }
                self.editing = true;
                self.domain_input = name;
                self.record_input = record;
                self.submit();
            }
            Command::Edit(name) => self.start_edit_named(&name),
            Command::Cancel => self.cancel_edit(),
            Command::Refresh => self.refresh(),
            Command::Quit => self.should_quit = true,
            Command::Help => self.help_open = true,
            Command::Unknown(input) => {
                self.set_status(format!("Unknown command: {input}"), StatusLevel::Error)
            }
        }
    }
}
