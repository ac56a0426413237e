use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::api::ScoringService;
use crate::cards::parse_cards;
use crate::chart::{ChartKind, Viewport};
use crate::display::{
    deal_row, feedback_badge, highlighted_row, render_chart, rules_guide, stats_table,
    terminal_viewport,
};
use crate::reconcile::classify;
use crate::session::{Phase, Session};

/// Starting options. `chart` is the initial kind for both the hand and the
/// crib section; each section then cycles on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    pub chart: ChartKind,
    pub is_crib: bool,
    pub my_crib: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        PlayOptions {
            chart: ChartKind::Line,
            is_crib: false,
            my_crib: true,
        }
    }
}

/// Chart kind per stats section.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Charts {
    hand: ChartKind,
    crib: ChartKind,
}

pub fn play_command(service: &dyn ScoringService, options: PlayOptions) {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();
    run_interactive_session(service, options, &mut reader, &mut writer);
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Toggle(Vec<usize>),
    ToggleCards(String),
    Score,
    Deal,
    HandChart,
    CribChart,
    Clear,
    Rules,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" => return None,
        "s" | "score" => return Some(Command::Score),
        "d" | "deal" | "r" | "redeal" => return Some(Command::Deal),
        "c" | "chart" => return Some(Command::HandChart),
        "cc" | "crib chart" => return Some(Command::CribChart),
        "x" | "clear" => return Some(Command::Clear),
        "g" | "rules" => return Some(Command::Rules),
        "h" | "help" | "?" => return Some(Command::Help),
        "q" | "quit" | "exit" => return Some(Command::Quit),
        _ => {}
    }
    let positions: Option<Vec<usize>> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| t.parse().ok())
        .collect();
    match positions {
        Some(p) if !p.is_empty() => Some(Command::Toggle(p)),
        _ => Some(Command::ToggleCards(line.to_string())),
    }
}

pub fn run_interactive_session(
    service: &dyn ScoringService,
    options: PlayOptions,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) {
    writeln!(writer).ok();
    writeln!(writer, "{}", "Cribbdle: keep four, see what the cut and the crib do".cyan().bold()).ok();
    writeln!(
        writer,
        "Choose four of the six cards, then score the hand. Type {} for commands.\n",
        "'h'".bold()
    )
    .ok();

    let viewport = terminal_viewport();
    let mut charts = Charts {
        hand: options.chart,
        crib: options.chart,
    };
    let mut session = Session::new(options.my_crib);
    deal(&mut session, service, writer);

    loop {
        write!(writer, "{} ", ">".cyan().bold()).ok();
        writer.flush().ok();
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let command = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };
        match command {
            Command::Quit => break,
            Command::Help => print_help(writer),
            Command::Rules => {
                writeln!(writer, "\n{}\n", rules_guide()).ok();
            }
            Command::Deal => deal(&mut session, service, writer),
            Command::Clear => {
                session.clear_selection();
                show_deal(&session, writer);
            }
            Command::Toggle(positions) => {
                for p in positions {
                    if let Err(e) = session.toggle_position(p) {
                        writeln!(writer, "  {}", e.to_string().red()).ok();
                    }
                }
                show_deal(&session, writer);
            }
            Command::ToggleCards(text) => {
                match parse_cards(&text) {
                    Ok(cards) => {
                        for card in cards {
                            if let Err(e) = session.toggle(card) {
                                writeln!(writer, "  {}", e.to_string().red()).ok();
                            }
                        }
                    }
                    Err(e) => {
                        writeln!(writer, "  {}", e.to_string().red()).ok();
                    }
                }
                show_deal(&session, writer);
            }
            Command::Score => score(&mut session, service, options.is_crib, charts, &viewport, writer),
            Command::HandChart => {
                charts.hand = charts.hand.next();
                writeln!(writer, "  Hand chart: {}", charts.hand.label().bold()).ok();
                show_hand(&session, charts.hand, &viewport, writer);
            }
            Command::CribChart => {
                charts.crib = charts.crib.next();
                writeln!(writer, "  Crib chart: {}", charts.crib.label().bold()).ok();
                if session.crib_stats().is_none() {
                    writeln!(writer, "  {}", "Score a hand to see charts.".dimmed()).ok();
                }
                show_crib(&session, charts.crib, &viewport, writer);
            }
        }
    }
    writeln!(writer, "\n{}\n", "Thanks for playing.".cyan().bold()).ok();
}

fn print_help(writer: &mut dyn Write) {
    writeln!(writer, "  {}  toggle cards by position, e.g. {}", "1 2 5 6".bold(), "1 2 5 6".dimmed()).ok();
    writeln!(writer, "  {}  toggle cards by code, e.g. {}", "5H KS".bold(), "5H KS".dimmed()).ok();
    writeln!(writer, "  {}        score the selected four", "s".bold()).ok();
    writeln!(writer, "  {}        re-deal six new cards", "d".bold()).ok();
    writeln!(writer, "  {}        switch the hand chart (histogram, line, box plot)", "c".bold()).ok();
    writeln!(writer, "  {}       switch the crib chart", "cc".bold()).ok();
    writeln!(writer, "  {}        clear the selection", "x".bold()).ok();
    writeln!(writer, "  {}        how cribbage hands are scored", "g".bold()).ok();
    writeln!(writer, "  {}        quit", "q".bold()).ok();
}

fn show_status(session: &Session, writer: &mut dyn Write) {
    let status = session.status();
    if status.is_empty() {
        return;
    }
    if session.phase() == Phase::Error {
        writeln!(writer, "  {}", status.red()).ok();
    } else {
        writeln!(writer, "  {}", status.dimmed()).ok();
    }
}

fn show_deal(session: &Session, writer: &mut dyn Write) {
    if session.deal().is_empty() {
        return;
    }
    writeln!(writer, "  {}", deal_row(session.deal(), session.selected())).ok();
    writeln!(
        writer,
        "  {}",
        format!("{}/4 selected", session.selected().len()).dimmed()
    )
    .ok();
}

fn deal(session: &mut Session, service: &dyn ScoringService, writer: &mut dyn Write) {
    let ticket = session.begin_deal();
    show_status(session, writer);
    let result = service.deal();
    session.complete_deal(ticket, result);
    show_status(session, writer);
    show_deal(session, writer);
}

fn score(
    session: &mut Session,
    service: &dyn ScoringService,
    is_crib: bool,
    charts: Charts,
    viewport: &Viewport,
    writer: &mut dyn Write,
) {
    let (ticket, request) = match session.begin_score(is_crib) {
        Ok(issued) => issued,
        Err(e) => {
            writeln!(writer, "  {}", session.status().red()).ok();
            log::debug!("score rejected: {}", e);
            return;
        }
    };
    show_status(session, writer);
    let result = service.score(&request);
    session.complete_score(ticket, result);
    if session.phase() != Phase::Scored {
        show_status(session, writer);
        return;
    }
    show_hand(session, charts.hand, viewport, writer);

    if let Ok((ticket, request)) = session.begin_crib() {
        show_status(session, writer);
        let result = service.score_crib(&request);
        session.complete_crib(ticket, result);
        if session.phase() == Phase::Error {
            show_status(session, writer);
        } else {
            show_crib(session, charts.crib, viewport, writer);
        }
    }
}

fn show_hand(session: &Session, chart: ChartKind, viewport: &Viewport, writer: &mut dyn Write) {
    let stats = match session.hand_stats() {
        Some(s) => s,
        None => {
            writeln!(writer, "  {}", "Score a hand to see charts.".dimmed()).ok();
            return;
        }
    };
    writeln!(writer).ok();
    if let Some(feedback) = session.feedback() {
        writeln!(writer, "  {}", feedback_badge(&feedback)).ok();
    }
    if let Some(hand) = session.scored_hand() {
        writeln!(
            writer,
            "  {} {}",
            "Optimal keep:".bold(),
            highlighted_row(&stats.best_keep, &classify(hand, &stats.best_keep))
        )
        .ok();
    }
    writeln!(writer, "\n{}", "Hand Analysis".cyan().bold()).ok();
    writeln!(writer, "{}", stats_table(&stats.rows())).ok();
    if let Some(geometry) = session.hand_chart(chart, viewport) {
        writeln!(writer, "{}", render_chart(&geometry, viewport)).ok();
    }
}

fn show_crib(session: &Session, chart: ChartKind, viewport: &Viewport, writer: &mut dyn Write) {
    let stats = match session.crib_stats() {
        Some(s) => s,
        None => return,
    };
    writeln!(writer, "\n{}", "Crib Analysis".cyan().bold()).ok();
    writeln!(writer, "{}", stats_table(&stats.rows())).ok();
    if let Some(geometry) = session.crib_chart(chart, viewport) {
        writeln!(writer, "{}", render_chart(&geometry, viewport)).ok();
    }
}
