//! Dashboard rendering
//!
//! Pure functions of the current [`DashboardState`]. The text helpers are
//! split from widget construction so the summary and label logic can be
//! tested without a terminal.

use crate::app::state::{ConnectionState, DashboardState, Notice, NoticeKind};
use crate::domain::loan::format_start_time;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

const TITLE: &str = "Nifty Loans";
const SUBTITLE: &str = "Use your NFTs as collateral to borrow.";

/// Labels for the collateral selector, in inventory order
pub fn asset_labels(state: &DashboardState) -> Vec<String> {
    state
        .inventory
        .assets()
        .iter()
        .map(|id| {
            if state.inventory.selected() == Some(*id) {
                format!("NFT {}  [collateral]", id)
            } else {
                format!("NFT {}", id)
            }
        })
        .collect()
}

/// Lines for the outstanding-loan panel
pub fn loan_summary_lines(state: &DashboardState) -> Vec<String> {
    let Some(loan) = &state.loan else {
        return vec!["No outstanding loan".to_string()];
    };
    if loan.has_never_borrowed() {
        return vec!["No outstanding loan".to_string()];
    }
    vec![
        format!("Loan Start Time: {}", format_start_time(loan.start_time)),
        format!("Loan Amount: {} ETH", loan.principal_display()),
        format!("NFT ID: {}", loan.collateral_id),
        loan.status().to_string(),
    ]
}

/// Text shown in the amount entry box
pub fn amount_line(state: &DashboardState) -> String {
    if !state.amount_enabled() {
        "(select an NFT first)".to_string()
    } else if state.amount_input.is_empty() {
        "Enter amount".to_string()
    } else {
        state.amount_input.clone()
    }
}

/// Top-level render entry point
pub fn draw(frame: &mut Frame, state: &DashboardState) {
    let area = frame.size();
    if state.connection.is_connected() {
        draw_dashboard(frame, area, state);
    } else {
        draw_connection_prompt(frame, area, state);
    }

    if let Some(notice) = &state.notice {
        draw_notice(frame, area, notice);
    }
}

fn draw_connection_prompt(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(8)])
        .split(area);

    let status = match state.connection {
        ConnectionState::Connecting => "Requesting account access...",
        _ => "Please connect your wallet to continue.",
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(SUBTITLE, Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from(status),
        Line::from(""),
        Line::from(Span::styled("[c] connect    [q] quit", Style::default().fg(Color::DarkGray))),
    ];
    let prompt = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(TITLE));
    frame.render_widget(prompt, chunks[0]);

    draw_diagnostics(frame, chunks[1], state);
}

fn draw_dashboard(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(9),
            Constraint::Length(3),
            Constraint::Length(8),
        ])
        .split(area);

    draw_header(frame, rows[0], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);
    draw_asset_selector(frame, body[0], state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(6)])
        .split(body[1]);
    draw_amount_input(frame, right[0], state);
    draw_loan_summary(frame, right[1], state);

    draw_status_bar(frame, rows[2], state);
    draw_diagnostics(frame, rows[3], state);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let account = state
        .connection
        .context()
        .map(|ctx| ctx.account().short())
        .unwrap_or_default();
    let line = Line::from(vec![
        Span::styled(SUBTITLE, Style::default().fg(Color::DarkGray)),
        Span::raw("    "),
        Span::styled(account, Style::default().fg(Color::Cyan)),
    ]);
    let header = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title(TITLE));
    frame.render_widget(header, area);
}

fn draw_asset_selector(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default().borders(Borders::ALL).title("Choose collateral NFT");

    if !state.inventory.is_loaded() {
        let placeholder = Paragraph::new("Loading assets...").block(block);
        frame.render_widget(placeholder, area);
        return;
    }
    if state.inventory.is_empty() {
        let placeholder = Paragraph::new("No NFTs found").block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = asset_labels(state).into_iter().map(ListItem::new).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    list_state.select(Some(state.inventory.cursor()));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_amount_input(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let style = if state.amount_enabled() {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(Span::styled(amount_line(state), style))
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL).title("Set Loan Amount"));
    frame.render_widget(input, area);
}

fn draw_loan_summary(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let lines: Vec<Line> = loan_summary_lines(state).into_iter().map(Line::from).collect();
    let summary = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Outstanding Loan"));
    frame.render_widget(summary, area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let line = if state.activity.is_idle() {
        let hint = |label: &str, enabled: bool| {
            let style = if enabled {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(label.to_string(), style)
        };
        Line::from(vec![
            hint("[b] Take Loan", state.can_create_loan()),
            Span::raw("   "),
            hint("[r] Repay Loan", state.can_repay_loan()),
            Span::raw("   "),
            hint("[Enter] Select   [g] Refresh   [q] Quit", true),
        ])
    } else {
        let status = state.activity.status_line().unwrap_or_default();
        Line::from(Span::styled(status, Style::default().fg(Color::Yellow)))
    };
    let bar = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}

fn draw_diagnostics(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = state
        .diagnostics
        .iter()
        .rev()
        .take(visible.max(1))
        .rev()
        .map(|line| Line::from(line.as_str()))
        .collect();
    let log = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Log"));
    frame.render_widget(log, area);
}

fn draw_notice(frame: &mut Frame, area: Rect, notice: &Notice) {
    let (title, color) = match notice.kind {
        NoticeKind::Info => ("Notice", Color::Green),
        NoticeKind::Error => ("Error", Color::Red),
    };
    let popup = centered_rect(60, 20, area);
    let lines = vec![
        Line::from(notice.message.as_str()),
        Line::from(""),
        Line::from(Span::styled("press Esc to dismiss", Style::default().fg(Color::DarkGray))),
    ];
    let dialog = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(Clear, popup);
    frame.render_widget(dialog, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::ConnectionState;
    use crate::chain::provider::{ExecutionContext, SessionToken};
    use crate::domain::loan::{LOAN_START_UNSET, LoanRecord, RawLoanDetails};
    use crate::domain::primitives::{Address, TokenId, Wei};

    fn connected_state() -> DashboardState {
        let mut state = DashboardState::new();
        state.connection = ConnectionState::Connected(ExecutionContext::new(
            Address::from_bytes([0xab; 20]),
            SessionToken::new(1),
        ));
        state
    }

    #[test]
    fn summary_for_active_loan() {
        let mut state = connected_state();
        state.loan = Some(LoanRecord::from_raw(RawLoanDetails {
            borrower: Address::from_bytes([0xab; 20]),
            collateral_contract: Address::from_bytes([0x11; 20]),
            collateral_id: TokenId(7),
            principal: Wei(1_000_000_000_000_000_000),
            start_time: 1_700_000_000,
            is_repaid: false,
        }));

        let lines = loan_summary_lines(&state);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Loan Start Time: "));
        assert!(lines[0].contains("November"));
        assert_eq!(lines[1], "Loan Amount: 1.0 ETH");
        assert_eq!(lines[2], "NFT ID: 7");
        assert_eq!(lines[3], "Loan Active");
    }

    #[test]
    fn summary_for_sentinel_tuple_ignores_other_fields() {
        let mut state = connected_state();
        state.loan = Some(LoanRecord::from_raw(RawLoanDetails {
            borrower: Address::from_bytes([0xab; 20]),
            collateral_contract: Address::from_bytes([0x11; 20]),
            collateral_id: TokenId(42),
            principal: Wei(999),
            start_time: LOAN_START_UNSET,
            is_repaid: false,
        }));

        assert_eq!(loan_summary_lines(&state), vec!["No outstanding loan"]);
    }

    #[test]
    fn summary_before_first_fetch() {
        assert_eq!(loan_summary_lines(&connected_state()), vec!["No outstanding loan"]);
    }

    #[test]
    fn asset_labels_mark_the_selection() {
        let mut state = connected_state();
        state.inventory.replace_all(vec![TokenId(3), TokenId(8)]);
        state.inventory.toggle_at_cursor();

        assert_eq!(asset_labels(&state), vec!["NFT 3  [collateral]", "NFT 8"]);
    }

    #[test]
    fn amount_line_reflects_gating() {
        let mut state = connected_state();
        state.inventory.replace_all(vec![TokenId(3)]);
        assert_eq!(amount_line(&state), "(select an NFT first)");

        state.inventory.toggle_at_cursor();
        assert_eq!(amount_line(&state), "Enter amount");

        state.amount_input = "1.5".to_string();
        assert_eq!(amount_line(&state), "1.5");
    }
}
