// Subcommand handlers and terminal rendering.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::info;

use wupdraft_core::config::{self, Config};
use wupdraft_core::draft::pick::{Ownership, Position};
use wupdraft_core::draft::state::DraftState;
use wupdraft_core::valuation::lineup::optimal_lineup;
use wupdraft_core::valuation::projections::{load_catalog, Catalog, Player};
use wupdraft_core::valuation::recommend::{
    draft_progress, recommend, DraftContext, Recommendation, RecommendationFilter,
};
use wupdraft_core::valuation::vor::apply_vor;

use crate::cli::{Cli, Command, RecommendArgs};

/// Loaded configuration plus resolved paths for one invocation.
struct Session {
    base_dir: PathBuf,
    config: Config,
    state_path: PathBuf,
}

impl Session {
    fn open(cli: &Cli) -> anyhow::Result<Self> {
        let base_dir = cli.config_dir.clone();
        let config = config::load_config(&base_dir).context("failed to load configuration")?;
        info!(
            "config loaded: league={}, {} teams, {} roster spots",
            config.league.name,
            config.league.num_teams,
            config.roster.total_slots()
        );
        let state_path = cli
            .state
            .clone()
            .unwrap_or_else(|| config.state_file(&base_dir));
        Ok(Session {
            base_dir,
            config,
            state_path,
        })
    }

    fn catalog(&self) -> anyhow::Result<Catalog> {
        load_catalog(&self.config, &self.base_dir).context("failed to load projections")
    }

    fn load_state(&self) -> DraftState {
        DraftState::load_or_default(&self.state_path, self.config.roster.clone())
    }

    fn save_state(&self, state: &DraftState) -> anyhow::Result<()> {
        state
            .save(&self.state_path)
            .with_context(|| format!("failed to save draft state to {}", self.state_path.display()))
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let session = Session::open(&cli)?;

    match &cli.command {
        Command::Recommend(args) => cmd_recommend(&session, args),
        Command::Take { name, position, gone } => cmd_take(&session, name, *position, *gone),
        Command::Undo => cmd_undo(&session),
        Command::Roster => cmd_roster(&session),
        Command::Export { path } => cmd_export(&session, path),
        Command::Import { path } => cmd_import(&session, path),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn cmd_recommend(session: &Session, args: &RecommendArgs) -> anyhow::Result<()> {
    let config = &session.config;
    let catalog = session.catalog()?;
    let state = session.load_state();

    let valuations = apply_vor(catalog.players(), &config.roster, config.league.num_teams);
    let available = state.available(&valuations);
    let my_players = state.my_players(&catalog);

    let ctx = DraftContext {
        roster: &config.roster,
        my_players: &my_players,
        drafted_count: state.drafted_count(),
        league_size: config.league.num_teams,
    };
    let weights = args.weights(config.strategy.weights);
    let candidate_pool = args.candidates.unwrap_or(config.strategy.engine.candidate_pool);
    let recs = recommend(&available, &ctx, &weights, candidate_pool);
    info!("ranked {} available players", recs.len());

    let filter = RecommendationFilter {
        positions: args.positions.clone(),
        search: args.search.clone(),
        limit: Some(args.top.unwrap_or(config.strategy.engine.top_n)),
    };
    let shown = filter.apply(recs);

    let progress = draft_progress(state.drafted_count(), &config.roster, config.league.num_teams);
    println!(
        "{} taken, draft {:.0}% complete, {} available",
        state.drafted_count(),
        progress * 100.0,
        available.len()
    );
    print!("{}", format_recommendations(&shown));
    Ok(())
}

fn cmd_take(session: &Session, name: &str, position: Option<Position>, gone: bool) -> anyhow::Result<()> {
    let catalog = session.catalog()?;
    let mut state = session.load_state();

    let player = resolve_player(&catalog, name, position)?;
    let ownership = if gone { Ownership::Gone } else { Ownership::Mine };
    let slot = state.take(player, ownership)?;
    session.save_state(&state)?;

    match slot {
        Some(slot) => println!("Drafted {} ({}) into {}", player.name, player.position, slot),
        None => println!("Marked {} ({}) as gone", player.name, player.position),
    }
    Ok(())
}

fn cmd_undo(session: &Session) -> anyhow::Result<()> {
    let catalog = session.catalog()?;
    let mut state = session.load_state();

    match state.undo_last(&catalog) {
        Some(pick) => {
            session.save_state(&state)?;
            let whose = if pick.is_mine() { "your roster" } else { "the gone list" };
            println!("Undid {} (removed from {})", pick.player_name, whose);
        }
        None => println!("Nothing to undo"),
    }
    Ok(())
}

fn cmd_roster(session: &Session) -> anyhow::Result<()> {
    let catalog = session.catalog()?;
    let state = session.load_state();
    print!("{}", format_roster(&state, &catalog));
    Ok(())
}

fn cmd_export(session: &Session, path: &Path) -> anyhow::Result<()> {
    let state = session.load_state();
    state
        .save(path)
        .with_context(|| format!("failed to export draft state to {}", path.display()))?;
    println!("Exported {} picks to {}", state.drafted_count(), path.display());
    Ok(())
}

fn cmd_import(session: &Session, path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        bail!("no snapshot at {}", path.display());
    }
    let state = DraftState::load(path, session.config.roster.clone())
        .with_context(|| format!("failed to import draft state from {}", path.display()))?;
    session.save_state(&state)?;
    println!(
        "Imported {} picks ({} on your roster) from {}",
        state.drafted_count(),
        state.roster().filled_count(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Find the catalog row for a typed name: exact match first, then
/// case-insensitive. A name at several positions needs `--position`.
fn resolve_player<'c>(catalog: &'c Catalog, name: &str, position: Option<Position>) -> anyhow::Result<&'c Player> {
    let name = name.trim();
    let mut matches: Vec<&Player> = catalog.players().iter().filter(|p| p.name == name).collect();
    if matches.is_empty() {
        let lower = name.to_lowercase();
        matches = catalog
            .players()
            .iter()
            .filter(|p| p.name.to_lowercase() == lower)
            .collect();
    }
    if let Some(pos) = position {
        matches.retain(|p| p.position == pos);
    }

    match matches.as_slice() {
        [] => match position {
            Some(pos) => bail!("no {pos} named '{name}' in the projections"),
            None => bail!("no player named '{name}' in the projections"),
        },
        [player] => Ok(*player),
        several => {
            let positions: Vec<String> = several.iter().map(|p| p.position.to_string()).collect();
            bail!(
                "'{name}' is listed at {}; pass --position to choose",
                positions.join(", ")
            )
        }
    }
}

/// Recommendation table, one row per player.
pub fn format_recommendations(recs: &[Recommendation]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<26} {:<4} {:<4} {:>7} {:>7} {:>7} {:>6} {:>7} {:>8}",
        "#", "Player", "Pos", "Team", "Proj", "VOR", "Scarc", "Delta", "Score", "Starter"
    );
    for (i, r) in recs.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<26} {:<4} {:<4} {:>7.1} {:>7.1} {:>7.1} {:>6.1} {:>7.2} {:>8}",
            i + 1,
            r.name(),
            r.position().display_str(),
            r.valuation.player.team,
            r.valuation.projection(),
            r.valuation.vor_component(),
            r.scarcity,
            r.delta,
            r.score,
            if r.would_start { "yes" } else { "" }
        );
    }
    if recs.is_empty() {
        let _ = writeln!(out, "     (no players match)");
    }
    out
}

/// Slot fill (`have/need - names`), bench, then the best starting lineup
/// slot by slot with its total.
pub fn format_roster(state: &DraftState, catalog: &Catalog) -> String {
    let config = state.roster_config();
    let roster = state.roster();
    let mut out = String::new();

    for (slot, need) in config.starters() {
        let _ = writeln!(
            out,
            "{:<5} {}/{} - {}",
            slot.display_str(),
            roster.count(slot),
            need,
            roster.names(slot).join(", ")
        );
    }
    let _ = writeln!(
        out,
        "{:<5} {}/{} - {}",
        Position::Bench.display_str(),
        roster.count(Position::Bench),
        config.bench(),
        roster.names(Position::Bench).join(", ")
    );

    let my_players = state.my_players(catalog);
    let lineup = optimal_lineup(&my_players, config);
    let _ = writeln!(out, "Starting lineup: {:.1} projected points", lineup.total());
    for (slot, _) in config.starters() {
        for player in lineup.in_slot(slot) {
            let _ = writeln!(
                out,
                "  {:<5} {:<26} {:>6.1}",
                slot.display_str(),
                format!("{} ({})", player.name, player.position),
                player.projection
            );
        }
    }
    out
}
