//! View state: event application, gating and the command palette

mod common;

use alloy::primitives::TxHash;
use devns::app::{App, Focus, Screen, StatusLevel};
use devns::domain::{ChainId, ConnectionState, MintRecord, NetworkState, TargetNetwork};
use devns::infrastructure::runtime::{NoticeLevel, RuntimeCommand, RuntimeEvent, SessionEvent};
use devns::infrastructure::ethereum::TxReceipt;
use devns::session::RecordOutcome;

use common::{ACCOUNT, CONTRACT, MUMBAI, OTHER};

fn session(app: &mut App, epoch: u64, event: SessionEvent) {
    app.apply_event(RuntimeEvent::Session { epoch, event });
}

fn ready_app() -> App {
    let mut app = App::new("ninja", TargetNetwork::polygon_mumbai());
    app.apply_event(RuntimeEvent::SessionStarted {
        epoch: 1,
        contract: CONTRACT,
    });
    session(
        &mut app,
        1,
        SessionEvent::NetworkResolved {
            network: NetworkState::from_chain_id(ChainId::new(MUMBAI)),
            on_target: true,
        },
    );
    session(
        &mut app,
        1,
        SessionEvent::ConnectionChanged(ConnectionState::Connected(ACCOUNT)),
    );
    session(
        &mut app,
        1,
        SessionEvent::MintsReady(vec![
            MintRecord {
                id: 0,
                name: "mine".to_string(),
                record: "hello".to_string(),
                owner: ACCOUNT,
            },
            MintRecord {
                id: 1,
                name: "theirs".to_string(),
                record: String::new(),
                owner: OTHER,
            },
        ]),
    );
    app
}

#[test]
fn test_screen_follows_connection_and_network() {
    let mut app = App::new("ninja", TargetNetwork::polygon_mumbai());
    assert_eq!(app.screen(), Screen::Connect);

    app.apply_event(RuntimeEvent::SessionStarted {
        epoch: 1,
        contract: CONTRACT,
    });
    session(
        &mut app,
        1,
        SessionEvent::ConnectionChanged(ConnectionState::Connected(ACCOUNT)),
    );
    session(
        &mut app,
        1,
        SessionEvent::NetworkResolved {
            network: NetworkState::from_chain_id(ChainId::new("0x1")),
            on_target: false,
        },
    );
    assert_eq!(app.screen(), Screen::SwitchNetwork);
    assert_eq!(app.network_label(), "Mainnet");

    session(
        &mut app,
        1,
        SessionEvent::NetworkResolved {
            network: NetworkState::from_chain_id(ChainId::new(MUMBAI)),
            on_target: true,
        },
    );
    assert_eq!(app.screen(), Screen::Registry);
}

#[test]
fn test_new_session_discards_derived_state() {
    let mut app = ready_app();
    app.domain_input = "draft".to_string();
    app.editing = true;

    app.apply_event(RuntimeEvent::SessionStarted {
        epoch: 2,
        contract: CONTRACT,
    });
    assert_eq!(app.epoch, 2);
    assert!(app.mints.is_empty());
    assert_eq!(app.connection, ConnectionState::Unchecked);
    assert!(app.network.is_none());
    assert!(app.domain_input.is_empty());
    assert!(!app.editing);
    assert_eq!(app.screen(), Screen::Connect);
}

#[test]
fn test_stale_epoch_events_are_ignored() {
    let mut app = ready_app();
    app.apply_event(RuntimeEvent::SessionStarted {
        epoch: 2,
        contract: CONTRACT,
    });

    session(&mut app, 1, SessionEvent::MintsReady(vec![]));
    session(
        &mut app,
        1,
        SessionEvent::ConnectionChanged(ConnectionState::Connected(ACCOUNT)),
    );
    session(&mut app, 1, SessionEvent::Alert("old".to_string()));
    assert_eq!(app.connection, ConnectionState::Unchecked);
    assert!(app.alert.is_none());
}

#[test]
fn test_submit_mints_with_trimmed_inputs() {
    let mut app = ready_app();
    app.domain_input = " abcde ".to_string();
    app.record_input = "hi".to_string();

    app.submit();
    assert_eq!(
        app.take_pending_commands(),
        vec![RuntimeCommand::Register {
            name: "abcde".to_string(),
            record: "hi".to_string(),
        }]
    );
    assert!(app.take_pending_commands().is_empty());
}

#[test]
fn test_submit_ignored_while_loading() {
    let mut app = ready_app();
    app.domain_input = "abcde".to_string();
    session(&mut app, 1, SessionEvent::Loading(true));

    app.submit();
    assert!(app.take_pending_commands().is_empty());
    assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Warn));

    session(&mut app, 1, SessionEvent::Loading(false));
    app.submit();
    assert_eq!(app.take_pending_commands().len(), 1);
}

#[test]
fn test_second_submit_waits_for_worker() {
    let mut app = ready_app();
    app.domain_input = "abcde".to_string();

    app.submit();
    app.submit();
    assert_eq!(app.take_pending_commands().len(), 1);
    assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Warn));

    session(&mut app, 1, SessionEvent::Loading(true));
    app.submit();
    assert!(app.take_pending_commands().is_empty());

    session(&mut app, 1, SessionEvent::Loading(false));
    app.submit();
    assert_eq!(app.take_pending_commands().len(), 1);
}

#[test]
fn test_rejected_submit_releases_latch() {
    let mut app = ready_app();
    app.domain_input = "ab".to_string();
    app.submit();
    assert_eq!(app.take_pending_commands().len(), 1);

    session(&mut app, 1, SessionEvent::Alert("Domain too short.".to_string()));
    app.dismiss_alert();
    app.domain_input = "abcde".to_string();
    app.submit();
    assert_eq!(app.take_pending_commands().len(), 1);
}

#[test]
fn test_new_session_releases_latch() {
    let mut app = ready_app();
    app.domain_input = "abcde".to_string();
    app.submit();
    assert_eq!(app.take_pending_commands().len(), 1);

    app.apply_event(RuntimeEvent::SessionStarted {
        epoch: 2,
        contract: CONTRACT,
    });
    app.domain_input = "abcde".to_string();
    app.submit();
    assert_eq!(app.take_pending_commands().len(), 1);
}

#[test]
fn test_edit_only_owned_names() {
    let mut app = ready_app();

    app.selected_mint = 1;
    app.start_edit();
    assert!(!app.editing);

    app.selected_mint = 0;
    app.start_edit();
    assert!(app.editing);
    assert_eq!(app.domain_input, "mine");
    assert_eq!(app.focus, Focus::Record);

    app.record_input = "updated".to_string();
    app.submit();
    assert_eq!(
        app.take_pending_commands(),
        vec![RuntimeCommand::SetRecord {
            name: "mine".to_string(),
            record: "updated".to_string(),
        }]
    );

    app.cancel_edit();
    assert!(!app.editing);
}

#[test]
fn test_domain_field_locked_while_editing() {
    let mut app = ready_app();
    app.selected_mint = 0;
    app.start_edit();
    app.focus = Focus::Domain;
    assert!(app.active_field().is_none());

    app.focus = Focus::Record;
    if let Some(field) = app.active_field() {
        field.push('x');
    }
    assert_eq!(app.record_input, "x");
}

#[test]
fn test_registered_clears_inputs_only_on_full_success() {
    let mut app = ready_app();
    app.domain_input = "abcde".to_string();
    app.record_input = "hi".to_string();

    session(
        &mut app,
        1,
        SessionEvent::Registered {
            name: "abcde".to_string(),
            tx_hash: TxHash::with_last_byte(1),
            record: RecordOutcome::Failed("denied".to_string()),
        },
    );
    assert_eq!(app.domain_input, "abcde");
    assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Warn));

    session(
        &mut app,
        1,
        SessionEvent::Registered {
            name: "abcde".to_string(),
            tx_hash: TxHash::with_last_byte(2),
            record: RecordOutcome::Set(TxReceipt {
                tx_hash: TxHash::with_last_byte(3),
                success: true,
                block_number: Some(7),
            }),
        },
    );
    assert!(app.domain_input.is_empty());
    assert!(app.record_input.is_empty());
    let (text, level) = app.status_text().expect("status");
    assert_eq!(level, StatusLevel::Info);
    assert!(text.starts_with("Domain minted!"));
    assert!(text.contains("https://mumbai.polygonscan.com/tx/0x"));
}

#[test]
fn test_alert_is_modal_until_dismissed() {
    let mut app = ready_app();
    session(&mut app, 1, SessionEvent::Alert("Domain too short.".to_string()));
    assert_eq!(app.alert.as_deref(), Some("Domain too short."));
    assert!(app.dismiss_alert());
    assert!(app.alert.is_none());
    assert!(!app.dismiss_alert());
}

#[test]
fn test_notice_sets_status_level() {
    let mut app = ready_app();
    session(
        &mut app,
        1,
        SessionEvent::Notice {
            message: "Network switch rejected".to_string(),
            level: NoticeLevel::Warn,
        },
    );
    assert_eq!(
        app.status_text(),
        Some(("Network switch rejected", StatusLevel::Warn))
    );
}

#[test]
fn test_command_palette_mint_and_set() {
    let mut app = ready_app();

    app.enter_command();
    app.command.input = "mint abcde hello world".to_string();
    app.apply_command();
    assert_eq!(
        app.take_pending_commands(),
        vec![RuntimeCommand::Register {
            name: "abcde".to_string(),
            record: "hello world".to_string(),
        }]
    );

    // Worker finished the mint
    session(&mut app, 1, SessionEvent::Loading(true));
    session(&mut app, 1, SessionEvent::Loading(false));

    app.enter_command();
    app.command.input = "set theirs nope".to_string();
    app.apply_command();
    assert!(app.take_pending_commands().is_empty());

    app.enter_command();
    app.command.input = "set mine yes".to_string();
    app.apply_command();
    assert_eq!(
        app.take_pending_commands(),
        vec![RuntimeCommand::SetRecord {
            name: "mine".to_string(),
            record: "yes".to_string(),
        }]
    );
}

#[test]
fn test_command_palette_wallet_actions() {
    let mut app = ready_app();
    for input in ["connect", "switch", "refresh"] {
        app.enter_command();
        app.command.input = input.to_string();
        app.apply_command();
    }
    assert_eq!(
        app.take_pending_commands(),
        vec![
            RuntimeCommand::Connect,
            RuntimeCommand::SwitchNetwork,
            RuntimeCommand::RefreshMints,
        ]
    );

    app.enter_command();
    app.command.input = "quit".to_string();
    app.apply_command();
    assert!(app.should_quit);
}

#[test]
fn test_price_preview_follows_name_length() {
    let mut app = ready_app();
    app.domain_input = "ab".to_string();
    assert_eq!(app.price_preview(), None);
    app.domain_input = "abc".to_string();
    assert_eq!(app.price_preview(), Some("0.05"));
    app.domain_input = "abcd".to_string();
    assert_eq!(app.price_preview(), Some("0.03"));
    app.domain_input = "abcdef".to_string();
    assert_eq!(app.price_preview(), Some("0.01"));
}
