//! Main entry point for the gridiron-sor analytics tool
//!
//! Loads configuration and data once, runs a single analysis and prints a
//! plain-text (or JSON) report.

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use gridiron_sor::analysis::{OpponentLine, Rivalry};
use gridiron_sor::config::{validate_config, AppConfig};
use gridiron_sor::graph::{CancellationToken, Connection};
use gridiron_sor::metrics::MetricsCollector;
use gridiron_sor::service::{AnalyticsService, ConnectionReport, MatchupReport};
use gridiron_sor::types::{AnalysisWindow, Classification, Season, Tier};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Gridiron SOR - strength of record and matchup graph analytics
#[derive(Parser)]
#[command(
    name = "gridiron-sor",
    version,
    about = "Strength-of-record ratings and matchup graph analytics for college football history",
    long_about = "Gridiron SOR builds a graph of every matchup in a window of seasons, rates \
                 teams with a two-pass, tier-aware strength-of-record model and answers \
                 connection, rivalry, conference and schedule-strength questions."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Games file override
    #[arg(long, value_name = "FILE", help = "Override the games JSON file")]
    games: Option<PathBuf>,

    #[command(flatten)]
    window: WindowArgs,

    /// Emit JSON instead of text
    #[arg(long, help = "Print the result as JSON")]
    json: bool,

    /// Dump Prometheus metrics after the run
    #[arg(long, help = "Print the metrics text exposition after the report")]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs)]
struct WindowArgs {
    #[arg(long, global = true, value_name = "YEAR")]
    start_year: Option<Season>,

    #[arg(long, global = true, value_name = "YEAR")]
    end_year: Option<Season>,

    #[arg(long, global = true, value_name = "WEEK")]
    start_week: Option<u32>,

    #[arg(long, global = true, value_name = "WEEK")]
    end_week: Option<u32>,

    /// Include bowl and playoff games
    #[arg(long, global = true)]
    postseason: bool,

    /// Skip games between members of the same conference
    #[arg(long, global = true)]
    non_conference: bool,

    /// Restrict to these classifications (fbs, fcs, ii, iii); repeatable
    #[arg(long = "classification", global = true, value_name = "CLASS")]
    classifications: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Ranked SOR leaderboard
    Leaderboard {
        #[arg(long, default_value_t = 25)]
        limit: usize,
        /// Only list this display tier (1-8)
        #[arg(long)]
        tier: Option<u8>,
        /// Show the best and worst team of every tier
        #[arg(long)]
        extremes: bool,
    },
    /// One team's rating with per-game grades
    Team { team: String },
    /// Shortest chain of games between two teams
    Connect { team: String, opponent: String },
    /// Teams farthest from a team
    Eccentricity { team: String },
    /// Longest shortest connection in the graph
    Diameter,
    /// Graph size and connectivity
    Overview,
    /// Teams a team never played
    Unplayed { team: String },
    /// Head-to-head record, or the chain between two teams that never met
    Matchup { team: String, opponent: String },
    /// Most played, most one-sided and most lopsided series
    Rivalries {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// A team's most played, dominant and toughest opponents
    Opponents {
        team: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// A conference's member records, or its record against another conference
    Conference {
        conference: String,
        #[arg(long)]
        versus: Option<String>,
    },
    /// Strength of schedule for a team, or the league leaderboard
    Sos {
        team: Option<String>,
        #[arg(long)]
        min_games: Option<usize>,
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration from file or environment, then apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if let Some(games) = &args.games {
        config.data.games_path = Some(games.clone());
    }

    validate_config(&config)?;
    Ok(config)
}

fn build_window(defaults: AnalysisWindow, args: &WindowArgs) -> AnalysisWindow {
    let mut window = defaults;
    if let Some(start) = args.start_year {
        window.start_year = start;
    }
    if let Some(end) = args.end_year {
        window.end_year = end;
    }
    window.start_week = args.start_week.or(window.start_week);
    window.end_week = args.end_week.or(window.end_week);
    window.include_postseason |= args.postseason;
    window.non_conference_only |= args.non_conference;
    if !args.classifications.is_empty() {
        window.classifications = args
            .classifications
            .iter()
            .map(|label| Classification::parse(label))
            .collect();
    }
    window
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_connection(report: &ConnectionReport) {
    match &report.connection {
        Connection::Found { path, degrees } => {
            println!("{} ({} degrees)", path.join(" -> "), degrees);
            for link in &report.chain {
                let note = if link.in_window { "" } else { " (outside window)" };
                println!("  {} vs {}: {}{}", link.from, link.to, link.series, note);
            }
        }
        Connection::NoPath => println!("No connection found"),
    }
}

fn print_rivalries(title: &str, rivalries: &[Rivalry]) {
    println!("{}:", title);
    for rivalry in rivalries {
        let leader = rivalry.leader.as_deref().unwrap_or("level");
        println!(
            "  {:<40} {:>4} games  {:>9}  diff {:+}  {} ({:.1}%)",
            rivalry.label(),
            rivalry.games,
            rivalry.record.to_string(),
            rivalry.point_diff,
            leader,
            rivalry.dominance * 100.0
        );
    }
}

fn print_opponents(title: &str, lines: &[&OpponentLine]) {
    println!("{}:", title);
    for line in lines {
        println!(
            "  {:<30} {:>3} games  avg {:+.1}  last {}",
            line.opponent,
            line.games,
            line.avg_diff(),
            line.last_met
        );
    }
}

fn run(service: &AnalyticsService, command: &Command, window: &AnalysisWindow, json: bool) -> Result<()> {
    match command {
        Command::Leaderboard {
            limit,
            tier,
            extremes,
        } => {
            let board = service.leaderboard(window)?;
            if *extremes {
                let extremes = board.tier_extremes();
                if json {
                    return print_json(&extremes);
                }
                for entry in extremes {
                    let name = |e: &Option<gridiron_sor::rating::RankedEntry>| {
                        e.as_ref()
                            .map(|e| format!("#{} {}", e.rank, e.row))
                            .unwrap_or_else(|| "-".to_string())
                    };
                    println!("{:<8} best: {}", entry.tier.label(), name(&entry.best));
                    println!("{:<8} worst: {}", "", name(&entry.worst));
                }
                return Ok(());
            }

            let filter = tier.and_then(Tier::new);
            let entries: Vec<_> = board
                .entries
                .iter()
                .filter(|e| filter.map_or(true, |t| e.row.display_tier == t))
                .take(*limit)
                .collect();
            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("No teams met the minimum games threshold");
            }
            for entry in entries {
                println!(
                    "{:>4}. {:<30} {:<8} {:>9}  SOR {:>8.2}  avg {:>7.2}  diff {:+}",
                    entry.rank,
                    entry.row.team,
                    entry.row.display_tier.label(),
                    entry.row.record(),
                    entry.row.total_score,
                    entry.row.avg_sor,
                    entry.row.point_diff
                );
            }
            for threshold in &board.thresholds {
                info!(
                    "{}: {} games required (leader played {})",
                    threshold.tier.label(),
                    threshold.threshold,
                    threshold.leader_games
                );
            }
        }
        Command::Team { team } => {
            let Some(row) = service.team_report(team, window)? else {
                println!("{} has no graded games in this window", team);
                return Ok(());
            };
            if json {
                return print_json(&row);
            }
            println!("{}", row);
            println!(
                "  avg {:.2}  diff {:+}  calc tier {}  display tier {}  {}",
                row.avg_sor,
                row.point_diff,
                row.calc_tier.label(),
                row.display_tier.label(),
                row.conference.as_deref().unwrap_or("Independent")
            );
            for detail in &row.details {
                let site = if detail.is_home { "vs" } else { "at" };
                println!(
                    "  {} wk {:>2}  {} {:<28} {:<9} {:>8.2}  {}",
                    detail.season,
                    detail.week.map(|w| w.to_string()).unwrap_or_else(|| "-".to_string()),
                    site,
                    detail.opponent,
                    detail.result(),
                    detail.grade,
                    detail.modifiers
                );
            }
        }
        Command::Connect { team, opponent } => {
            let report = service.connect(team, opponent, window)?;
            if json {
                return print_json(&report);
            }
            print_connection(&report);
        }
        Command::Eccentricity { team } => {
            let result = service.eccentricity(team, window, &CancellationToken::new())?;
            if json {
                return print_json(&result);
            }
            println!(
                "{} reaches every connected team within {} degrees; farthest: {}",
                result.team,
                result.distance,
                result.farthest.join(", ")
            );
        }
        Command::Diameter => {
            let result = service.diameter(window, &CancellationToken::new())?;
            if json {
                return print_json(&result);
            }
            println!("Diameter: {} ({} teams measured)", result.value, result.component_size);
            if result.restricted {
                println!("  graph is disconnected; largest component only");
            }
            if !result.path.is_empty() {
                println!("  {}", result.path.join(" -> "));
            }
        }
        Command::Overview => {
            let result = service.overview(window)?;
            if json {
                return print_json(&result);
            }
            println!("Teams: {}", result.teams);
            println!("Matchups: {}", result.matchups);
            println!("Density: {:.4}", result.density);
            println!("Average degree: {:.2}", result.average_degree);
            println!(
                "Components: {} (largest {}){}",
                result.components,
                result.largest_component,
                if result.is_connected() { ", connected" } else { "" }
            );
        }
        Command::Unplayed { team } => {
            let teams = service.unplayed(team, window)?;
            if json {
                return print_json(&teams);
            }
            println!("{} teams never played:", teams.len());
            for name in teams {
                println!("  {}", name);
            }
        }
        Command::Matchup { team, opponent } => {
            let report = service.matchup(team, opponent, window)?;
            if json {
                return print_json(&report);
            }
            match report {
                MatchupReport::HeadToHead(h2h) => {
                    println!(
                        "{} vs {}: {} ({:.1}%)",
                        h2h.team,
                        h2h.opponent,
                        h2h.overall,
                        h2h.overall.win_pct() * 100.0
                    );
                    println!("  at {}: {}", h2h.team, h2h.at_team);
                    println!("  at {}: {}", h2h.opponent, h2h.at_opponent);
                    println!(
                        "  points {}-{} (avg {:.1}-{:.1}), diff {:+} favors {}",
                        h2h.points_for,
                        h2h.points_against,
                        h2h.avg_points_for(),
                        h2h.avg_points_against(),
                        h2h.point_diff(),
                        h2h.favors().unwrap_or("neither")
                    );
                    if let Some(last) = &h2h.last_meeting {
                        println!("  last meeting: {}", last);
                    }
                }
                MatchupReport::Chain(report) => {
                    println!("{} and {} never met; closest connection:", team, opponent);
                    print_connection(&report);
                }
                MatchupReport::NoConnection { team, opponent } => {
                    println!("{} and {} are not connected", team, opponent);
                }
            }
        }
        Command::Rivalries { limit } => {
            let report = service.rivalries(window, *limit)?;
            if json {
                return print_json(&report);
            }
            print_rivalries("Most played", &report.most_played);
            print_rivalries("Most one-sided", &report.most_one_sided);
            print_rivalries("Largest point differential", &report.largest_differential);
        }
        Command::Opponents { team, limit } => {
            let profile = service.opponents(team, window)?;
            if json {
                return print_json(&profile);
            }
            let most: Vec<&OpponentLine> = profile.most_played(*limit).iter().collect();
            print_opponents("Most played", &most);
            print_opponents("Dominant", &profile.dominant(*limit));
            print_opponents("Toughest", &profile.toughest(*limit));
        }
        Command::Conference { conference, versus } => match versus {
            Some(other) => {
                let showdown = service.conference_showdown(conference, other, window)?;
                if json {
                    return print_json(&showdown);
                }
                println!(
                    "{} vs {}: {} over {} games",
                    showdown.first,
                    showdown.second,
                    showdown.record,
                    showdown.games()
                );
                println!("  points {}-{}", showdown.first_points, showdown.second_points);
                println!(
                    "  longest streaks: {} {}, {} {}",
                    showdown.first,
                    showdown.first_longest_streak,
                    showdown.second,
                    showdown.second_longest_streak
                );
                for pair in showdown.series.iter().take(10) {
                    println!("  {} vs {}: {}", pair.team, pair.opponent, pair.record);
                }
            }
            None => {
                let report = service.conference_report(conference, window)?;
                if json {
                    return print_json(&report);
                }
                println!("{}: {} combined", report.conference, report.combined);
                for member in &report.members {
                    println!(
                        "  {:<30} {:>9}  {:.3}  diff {:+}",
                        member.team,
                        member.record.to_string(),
                        member.record.win_pct(),
                        member.point_diff
                    );
                }
            }
        },
        Command::Sos {
            team,
            min_games,
            limit,
        } => match team {
            Some(team) => {
                let Some(report) = service.sos(team, window)? else {
                    println!("{} has no opponents with a record in this window", team);
                    return Ok(());
                };
                if json {
                    return print_json(&report);
                }
                println!("{}: SOS {:.2} over {} games", report.team, report.score, report.games);
                for opponent in report.opponents.iter().take(*limit) {
                    println!(
                        "  {} {:<28} {:<6} {:>9}  {}",
                        opponent.season,
                        opponent.opponent,
                        opponent.classification.as_str(),
                        opponent
                            .record
                            .map(|r| r.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        opponent.result.as_deref().unwrap_or("-")
                    );
                }
            }
            None => {
                let board = service.sos_leaderboard(window, *min_games)?;
                let board: Vec<_> = board.into_iter().take(*limit).collect();
                if json {
                    return print_json(&board);
                }
                for rank in board {
                    println!(
                        "{:>4}. {:<30} {:>7.2}  ({} games)",
                        rank.rank, rank.team, rank.score, rank.games
                    );
                }
            }
        },
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let metrics = Arc::new(MetricsCollector::new()?);
    let window = build_window(config.analysis.window(), &args.window);
    let service = AnalyticsService::from_config(config, metrics.clone())?;

    if let Err(e) = run(&service, &args.command, &window, args.json) {
        error!("Analysis failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.print_metrics {
        print!("{}", metrics.gather_text()?);
    }

    Ok(())
}
