use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, Focus, InputMode, Screen, StatusLevel};
use crate::domain::{short_address, TargetNetwork};

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    match app.screen() {
        Screen::Connect => draw_connect_prompt(f, areas.main, app),
        Screen::SwitchNetwork => draw_switch_prompt(f, areas.main, app),
        Screen::Registry => {
            draw_form(f, areas, app);
            draw_mint_list(f, areas.list, app);
        }
    }
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size, app);
    }
    if let Some(message) = app.alert.as_deref() {
        draw_alert_popup(f, areas.size, message);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(
            format!(".{} Name Service", app.tld),
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Wallet", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {} ({}) ", app.wallet_kind, app.endpoint)),
    ]);
    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let network_color = if app.on_target {
        Color::LightGreen
    } else {
        Color::LightYellow
    };
    let mut right_spans = vec![
        Span::styled(app.network_label(), Style::default().fg(network_color)),
        Span::raw("  "),
        Span::raw(app.connection.display_name()),
    ];
    if app.loading {
        right_spans.push(Span::styled(
            "  loading...",
            Style::default().fg(Color::Yellow),
        ));
    }
    let right = Paragraph::new(Line::from(right_spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Right);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_connect_prompt(f: &mut Frame, area: Rect, app: &App) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No wallet account connected",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "Press c to connect your {} wallet",
            app.wallet_kind
        )),
    ];
    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Connect"))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn draw_switch_prompt(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Please connect to the {}", app.target.chain_name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Currently on {}", app.network_label())),
        Line::from(""),
        Line::from("Press s to switch network"),
    ];
    if let Some(hint) = local_node_hint(&app.target) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Local node? Start it with `{hint}`"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Wrong network"))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn field_style(app: &App, field: Focus) -> Style {
    if app.focus != field {
        Style::default()
    } else if app.input_mode == InputMode::Insert {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

fn draw_form(f: &mut Frame, areas: layout::UiAreas, app: &App) {
    let domain_title = match app.price_preview() {
        Some(price) if !app.editing => format!("Domain  ({price} MATIC)"),
        _ => "Domain".to_string(),
    };
    let domain_text = if app.editing {
        Span::styled(
            format!("{}.{}", app.domain_input, app.tld),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(format!("{}.{}", app.domain_input, app.tld))
    };
    let domain = Paragraph::new(Line::from(domain_text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(domain_title)
            .border_style(field_style(app, Focus::Domain)),
    );
    f.render_widget(domain, areas.domain_field);

    let record = Paragraph::new(app.record_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Record")
            .border_style(field_style(app, Focus::Record)),
    );
    f.render_widget(record, areas.record_field);

    let key = Style::default().fg(Color::LightCyan);
    let muted = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::new();
    if app.editing {
        lines.push(Line::from(vec![
            Span::styled("Enter", key),
            Span::raw(" Set record   "),
            Span::styled("Esc", key),
            Span::raw(" Cancel"),
        ]));
    } else {
        lines.push(Line::from(vec![Span::styled("Enter", key), Span::raw(" Mint")]));
    }
    if app.loading {
        lines.push(Line::from(Span::styled(
            "Waiting for the wallet...",
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "3 chars 0.05 | 4 chars 0.03 | 5+ chars 0.01",
        muted,
    )));

    let actions = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(actions, areas.actions);
}

fn mint_items(app: &App) -> Vec<ListItem<'static>> {
    let account = app.account();
    app.mints
        .iter()
        .map(|mint| {
            let owned = mint.is_owned_by(account);
            let mut spans = vec![
                Span::styled(
                    format!("{}.{}", mint.name, app.tld),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::raw(mint.record.clone()),
                Span::styled(
                    format!("  {}", short_address(&mint.owner)),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if owned {
                spans.push(Span::styled("  [e] edit", Style::default().fg(Color::LightCyan)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect()
}

fn draw_mint_list(f: &mut Frame, area: Rect, app: &App) {
    let border_style = if app.focus == Focus::List {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let highlight_style = if app.focus == Focus::List {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let list = List::new(mint_items(app))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Recently minted ({})", app.mints.len()))
                .border_style(border_style),
        )
        .highlight_style(highlight_style)
        .highlight_symbol(">> ");

    let mut state = ListState::default();
    if !app.mints.is_empty() {
        state.select(Some(app.selected_mint));
    }
    f.render_stateful_widget(list, chunks[0], &mut state);

    let link = match (app.selected_mint(), app.contract.as_ref()) {
        (Some(mint), Some(contract)) => mint.marketplace_url(contract),
        _ => "--".to_string(),
    };
    let detail = Paragraph::new(Line::from(Span::styled(
        link,
        Style::default().fg(Color::DarkGray),
    )))
    .block(Block::default().borders(Borders::ALL).title("Marketplace"));
    f.render_widget(detail, chunks[1]);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let contract = app
        .contract
        .as_ref()
        .map(short_address)
        .unwrap_or_else(|| "--".to_string());
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Insert => "INSERT",
        InputMode::Command => "COMMAND",
    };
    let spans = vec![
        Span::styled(format!(" {mode} "), Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::raw("  "),
        Span::styled("Registry ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{contract}  ")),
        Span::styled("Session ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("#{}", app.epoch)),
    ];

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("connect", "Connect wallet"),
        ("switch", "Switch to the registry network"),
        ("mint", "mint <name> [record]"),
        ("set", "set <name> <record>"),
        ("edit", "edit <name>"),
        ("cancel", "Leave edit mode"),
        ("refresh", "Reload minted names"),
        ("quit", "Quit"),
    ];

    let word = input.split_whitespace().next().unwrap_or("");
    commands
        .iter()
        .find(|(cmd, _)| cmd.starts_with(word))
        .map(|(_, desc)| *desc)
}

fn action_hints(app: &App) -> Line<'static> {
    let key = Style::default().fg(Color::LightCyan);
    let mut spans = Vec::new();
    let mut push = |k: &'static str, label: &'static str| {
        spans.push(Span::styled(k, key));
        spans.push(Span::raw(format!(" {label}  ")));
    };
    match app.screen() {
        Screen::Connect => push("c", "connect"),
        Screen::SwitchNetwork => push("s", "switch network"),
        Screen::Registry => {
            push("i", "type");
            push("Tab", "focus");
            push("Enter", if app.editing { "set record" } else { "mint" });
            push("e", "edit");
            push("r", "refresh");
        }
    }
    push(":", "command");
    push("?", "help");
    push("q", "quit");
    Line::from(spans)
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint_text = command_hint(&app.command.input).unwrap_or("mint | set | edit | refresh");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.clone()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Insert => Line::from(Span::styled(
            "Enter=submit Tab=next field Esc=done",
            Style::default().fg(Color::DarkGray),
        )),
        InputMode::Normal => {
            if let Some(status) = app.status.as_ref() {
                let color = match status.level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled(
                        format!("{} ", status.at.format("%H:%M:%S")),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(status.text.clone(), Style::default().fg(color)),
                ])
            } else {
                action_hints(app)
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn draw_alert_popup(f: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(50, 24, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Enter / Esc to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title("Alert")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup_area);
}

/// anvil cannot add chains, so a local node has to start on the registry's chain id
pub fn local_node_hint(target: &TargetNetwork) -> Option<String> {
    target
        .chain_id_number()
        .map(|id| format!("anvil --chain-id {id}"))
}

fn draw_help_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect(64, 64, area);
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from("Wallet"),
        Line::from("  c          Connect wallet"),
        Line::from("  s          Switch to the registry network"),
        Line::from(""),
        Line::from("Registry"),
        Line::from("  i          Type into the focused field"),
        Line::from("  Tab        Cycle focus"),
        Line::from("  j / k      Move selection"),
        Line::from("  Enter      Mint / set record"),
        Line::from("  e          Edit record of an owned name"),
        Line::from("  Esc        Cancel edit / dismiss alert"),
        Line::from("  r          Refresh minted names"),
        Line::from(""),
        Line::from("Commands"),
        Line::from("  :mint <name> [record]"),
        Line::from("  :set <name> <record>"),
        Line::from("  :edit <name>   :cancel   :refresh"),
        Line::from("  :connect   :switch   :quit"),
        Line::from(""),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
    ];
    if let Some(hint) = local_node_hint(&app.target) {
        lines.push(Line::from(""));
        lines.push(Line::from("Local node"));
        lines.push(Line::from(format!("  {hint}")));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
