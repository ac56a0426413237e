use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use crate::api::{CribRequest, ScoreRequest, ScoringService};
use crate::cards::{parse_cards, same_ranks, sort_by_rank};
use crate::chart::{coerce_values, layout, layout_named, ChartKind};
use crate::client::HttpScoringClient;
use crate::config::Config;
use crate::display::{
    board_display, feedback_badge, highlighted_row, print_error, print_section, print_success,
    render_chart, rules_guide, stats_table, terminal_viewport,
};
use crate::play::{play_command, PlayOptions};
use crate::reconcile::{classify, reconcile};
use crate::session::{CribStats, HandStats};

#[derive(Parser)]
#[command(
    name = "cribbdle",
    version,
    about = "Cribbdle: pick four of six cards and compare your keep with the optimal one."
)]
struct Cli {
    /// Scoring service base URL (env: CRIBBDLE_SERVER)
    #[arg(long, global = true)]
    server: Option<String>,
    /// Path prefix of the scoring API (env: CRIBBDLE_API_PREFIX)
    #[arg(long, global = true)]
    prefix: Option<String>,
    /// Request timeout in seconds (env: CRIBBDLE_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive game: deal, pick four, score, repeat
    Play {
        /// Initial chart: histogram, line or box (env: CRIBBDLE_CHART)
        #[arg(long)]
        chart: Option<String>,
        /// Score the keep as a crib hand
        #[arg(long)]
        crib: bool,
        /// The crib belongs to the opponent
        #[arg(long)]
        opponent_crib: bool,
    },
    /// Deal six cards from the scoring service
    Deal,
    /// Score a four-card keep out of a six-card deal
    Score {
        /// Your four cards (e.g., "5H 5D 9C KS")
        hand: String,
        /// The six dealt cards
        #[arg(long)]
        six: String,
        /// Score the keep as a crib hand
        #[arg(long)]
        crib: bool,
        /// The crib belongs to the opponent
        #[arg(long)]
        opponent_crib: bool,
        /// Also fetch crib stats for the discards
        #[arg(long)]
        with_crib: bool,
        /// Chart: histogram, line or box (env: CRIBBDLE_CHART)
        #[arg(long)]
        chart: Option<String>,
    },
    /// Expected crib value of the two discards
    Crib {
        /// Your four cards
        hand: String,
        /// The six dealt cards
        #[arg(long)]
        six: String,
        /// Chart: histogram, line or box (env: CRIBBDLE_CHART)
        #[arg(long)]
        chart: Option<String>,
    },
    /// Lay out a distribution offline
    Chart {
        /// Outcome values (non-numeric entries count as 0)
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,
        /// Chart: histogram, line or box
        #[arg(short, long, default_value = "histogram")]
        kind: String,
        /// Reference marker, usually the mean
        #[arg(short, long, allow_negative_numbers = true)]
        reference: Option<f64>,
    },
    /// Compare your keep with the optimal keep offline
    Reconcile {
        /// Your four cards
        user: String,
        /// The optimal four cards
        best: String,
    },
    /// Check that the scoring service is up
    Ping,
    /// How cribbage hands are scored
    Rules,
}

pub fn run() {
    let cli = Cli::parse();
    dispatch(cli);
}

pub fn run_with_args(args: Vec<String>) {
    let cli = Cli::parse_from(args);
    dispatch(cli);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init()
        .ok();
}

fn dispatch(cli: Cli) {
    init_logging(cli.verbose);
    let config = Config::from_env().with_overrides(cli.server, cli.prefix, cli.timeout);
    log::debug!("using {}", config.api_url(""));

    match cli.command {
        Commands::Play {
            chart,
            crib,
            opponent_crib,
        } => {
            let Some(chart) = resolve_chart(chart, &config) else {
                return;
            };
            let client = HttpScoringClient::new(&config);
            let options = PlayOptions {
                chart,
                is_crib: crib,
                my_crib: !opponent_crib,
            };
            play_command(&client, options);
        }
        Commands::Deal => cmd_deal(&HttpScoringClient::new(&config)),
        Commands::Score {
            hand,
            six,
            crib,
            opponent_crib,
            with_crib,
            chart,
        } => {
            if let Some(chart) = resolve_chart(chart, &config) {
                cmd_score(
                    &HttpScoringClient::new(&config),
                    hand,
                    six,
                    crib,
                    !opponent_crib,
                    with_crib,
                    chart,
                )
            }
        }
        Commands::Crib { hand, six, chart } => {
            if let Some(chart) = resolve_chart(chart, &config) {
                cmd_crib(&HttpScoringClient::new(&config), hand, six, chart)
            }
        }
        Commands::Chart {
            values,
            kind,
            reference,
        } => cmd_chart(values, &kind, reference),
        Commands::Reconcile { user, best } => cmd_reconcile(user, best),
        Commands::Ping => cmd_ping(&HttpScoringClient::new(&config)),
        Commands::Rules => println!("\n{}\n", rules_guide()),
    }
}

fn cmd_deal(service: &dyn ScoringService) {
    match service.deal() {
        Ok(mut cards) => {
            sort_by_rank(&mut cards);
            println!();
            println!("  Deal: {}", board_display(&cards));
            println!();
        }
        Err(e) => print_error(&format!("Could not deal cards. {}", e)),
    }
}

/// Chart named on the command line, else the configured default.
fn resolve_chart(name: Option<String>, config: &Config) -> Option<ChartKind> {
    let Some(name) = name else {
        return Some(config.chart);
    };
    let kind = ChartKind::parse(&name);
    if kind.is_none() {
        print_error(&format!("Unknown chart '{}'. Use histogram, line or box.", name));
    }
    kind
}

fn print_chart(values: &[f64], reference: Option<f64>, chart: ChartKind) {
    let viewport = terminal_viewport();
    match layout(values, reference, chart, &viewport) {
        Some(geometry) => println!("{}", render_chart(&geometry, &viewport)),
        None => println!("  {}", "(no chart)".dimmed()),
    }
}

fn cmd_score(
    service: &dyn ScoringService,
    hand: String,
    six: String,
    is_crib: bool,
    my_crib: bool,
    with_crib: bool,
    chart: ChartKind,
) {
    let (hand_cards, six_cards) = match (parse_cards(&hand), parse_cards(&six)) {
        (Ok(h), Ok(s)) => (h, s),
        (Err(e), _) | (_, Err(e)) => {
            print_error(&e.to_string());
            return;
        }
    };
    let request = match ScoreRequest::new(&hand_cards, &six_cards, is_crib, my_crib) {
        Ok(r) => r,
        Err(e) => {
            print_error(&e.to_string());
            return;
        }
    };
    let stats = match service.score(&request).and_then(|r| HandStats::from_response(&r)) {
        Ok(s) => s,
        Err(e) => {
            print_error(&format!("Error while scoring hand. {}", e));
            return;
        }
    };

    println!();
    println!("  Keep: {}", board_display(&hand_cards));
    println!("  {}", feedback_badge(&stats.feedback()));
    println!(
        "  Optimal keep: {}",
        highlighted_row(&stats.best_keep, &classify(&hand_cards, &stats.best_keep))
    );
    println!("\n{}", "Hand Analysis".cyan().bold());
    println!("{}", stats_table(&stats.rows()));
    print_chart(&stats.distribution, Some(stats.avg_total), chart);

    if with_crib {
        cmd_crib(service, hand, six, chart);
    } else {
        println!();
    }
}

fn cmd_crib(service: &dyn ScoringService, hand: String, six: String, chart: ChartKind) {
    let request = match (parse_cards(&hand), parse_cards(&six)) {
        (Ok(h), Ok(s)) => CribRequest::new(&h, &s),
        (Err(e), _) | (_, Err(e)) => Err(e),
    };
    let request = match request {
        Ok(r) => r,
        Err(e) => {
            print_error(&e.to_string());
            return;
        }
    };
    match service.score_crib(&request) {
        Ok(response) => {
            let stats = CribStats::from_response(&response);
            println!("\n{}", "Crib Analysis".cyan().bold());
            println!("{}", stats_table(&stats.rows()));
            print_chart(&stats.distribution, Some(stats.avg_score), chart);
            println!();
        }
        Err(e) => print_error(&format!("Could not compute crib stats. {}", e)),
    }
}

fn cmd_chart(values: Vec<String>, kind: &str, reference: Option<f64>) {
    let raw: Vec<Value> = values.into_iter().map(Value::String).collect();
    let values = coerce_values(&raw);
    let viewport = terminal_viewport();
    println!();
    match layout_named(&values, reference, kind, &viewport) {
        Some(geometry) => println!("{}", render_chart(&geometry, &viewport)),
        None => print_error(&format!("Unknown chart '{}'. Use histogram, line or box.", kind)),
    }
    println!();
}

fn cmd_reconcile(user: String, best: String) {
    let (user_cards, best_cards) = match (parse_cards(&user), parse_cards(&best)) {
        (Ok(u), Ok(b)) => (u, b),
        (Err(e), _) | (_, Err(e)) => {
            print_error(&e.to_string());
            return;
        }
    };
    let result = reconcile(&user_cards, &best_cards);
    println!();
    println!(
        "  {}",
        highlighted_row(&best_cards, &classify(&user_cards, &best_cards))
    );
    print_section("Matched", &board_display(&result.matched));
    print_section("Substitutions", &board_display(&result.unmatched));
    println!();
    if same_ranks(&user_cards, &best_cards) {
        print_success("Same ranks as the optimal keep.");
    } else if result.is_complete() {
        print_success("Your keep already covers the optimal ranks.");
    }
}

fn cmd_ping(service: &dyn ScoringService) {
    match service.health() {
        Ok(h) => print_success(&format!("{}: {}", h.status, h.message)),
        Err(e) => print_error(&e.to_string()),
    }
}
