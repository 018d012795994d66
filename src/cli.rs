use std::path::Path;

use crate::battle::{
    compare_creatures, compute_damage, estimate_matchup_with_pool, simulate_seeded, WorkerPool,
    DEFAULT_MATCHUP_ITERATIONS, MAX_MATCHUP_ITERATIONS,
};
use crate::config::AppConfig;
use crate::data::{Creature, CreatureRepository, JsonCreatureRepository, ListQuery};
use crate::server;

pub const USAGE: &str = "usage: bestiary <serve|simulate|damage|compare|matchup|list>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Simulate,
    Damage,
    Compare,
    Matchup,
    List,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("simulate") => Some(Command::Simulate),
        Some("damage") => Some(Command::Damage),
        Some("compare") => Some(Command::Compare),
        Some("matchup") => Some(Command::Matchup),
        Some("list") => Some(Command::List),
        _ => None,
    }
}

pub fn run_with_args(args: &[String], config: &AppConfig) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(config),
        Some(Command::Simulate) => with_catalog(config, |repo| handle_simulate(args, repo)),
        Some(Command::Damage) => with_catalog(config, |repo| handle_damage(args, repo)),
        Some(Command::Compare) => with_catalog(config, |repo| handle_compare(args, repo)),
        Some(Command::Matchup) => with_catalog(config, |repo| handle_matchup(args, repo, config)),
        Some(Command::List) => with_catalog(config, |repo| handle_list(args, repo)),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn with_catalog(config: &AppConfig, f: impl FnOnce(&JsonCreatureRepository) -> i32) -> i32 {
    match load_catalog(&config.data_path) {
        Ok(repo) => f(&repo),
        Err(code) => code,
    }
}

fn load_catalog(path: &Path) -> Result<JsonCreatureRepository, i32> {
    JsonCreatureRepository::from_path(path).map_err(|err| {
        eprintln!("failed to load creatures: {err}");
        1
    })
}

fn handle_serve(config: &AppConfig) -> i32 {
    match server::run_server(config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_simulate(args: &[String], repo: &dyn CreatureRepository) -> i32 {
    let Some((a, b)) = resolve_pair(args, repo, "simulate <a> <b> [seed] [--table]") else {
        return exit_code_for_pair(args);
    };
    let seed = parse_u64_arg(args.get(4).filter(|a| !a.starts_with("--")), "seed", 7);
    let as_table = args.iter().any(|arg| arg == "--table");

    let result = simulate_seeded(a, b, seed);

    if as_table {
        let winner = result
            .winner_creature(a, b)
            .map(Creature::display_name)
            .unwrap_or("draw");
        println!("seed\trounds\twinner\thp_a\thp_b\tevent_count");
        println!(
            "{}\t{}\t{}\t{:.2}\t{:.2}\t{}",
            seed,
            result.rounds,
            winner,
            result.final_hp.a,
            result.final_hp.b,
            result.log.len()
        );
        return 0;
    }
    print_json(&result, "simulation result")
}

fn handle_damage(args: &[String], repo: &dyn CreatureRepository) -> i32 {
    let Some((a, b)) = resolve_pair(args, repo, "damage <a> <b>") else {
        return exit_code_for_pair(args);
    };
    print_json(
        &serde_json::json!({
            "a": a.id,
            "b": b.id,
            "a_to_b": compute_damage(&a.base, &b.base),
            "b_to_a": compute_damage(&b.base, &a.base),
        }),
        "damage",
    )
}

fn handle_compare(args: &[String], repo: &dyn CreatureRepository) -> i32 {
    let Some((a, b)) = resolve_pair(args, repo, "compare <a> <b>") else {
        return exit_code_for_pair(args);
    };
    print_json(&compare_creatures(a, b), "comparison")
}

fn handle_matchup(args: &[String], repo: &dyn CreatureRepository, config: &AppConfig) -> i32 {
    let Some((a, b)) = resolve_pair(args, repo, "matchup <a> <b> [iterations] [seed]") else {
        return exit_code_for_pair(args);
    };
    let iterations = matchup_iterations(args.get(4));
    let seed = parse_u64_arg(args.get(5), "seed", 7);
    let pool = WorkerPool::with_workers(config.workers);
    print_json(
        &estimate_matchup_with_pool(a, b, iterations, seed, &pool),
        "matchup summary",
    )
}

fn handle_list(args: &[String], repo: &dyn CreatureRepository) -> i32 {
    let Some((type_filter, search)) = parse_list_args(&args[2..]) else {
        eprintln!("usage: bestiary list [type] [--search <name>]");
        return 2;
    };
    let query = ListQuery {
        type_filter,
        search,
        limit: repo.all().len().max(1),
        ..ListQuery::default()
    };
    let page = repo.list(&query);
    for creature in &page.items {
        println!(
            "{}\t{}\t{}",
            creature.id,
            creature.display_name(),
            creature.types.join("/")
        );
    }
    0
}

/// `[type] [--search <name>]` in any order. `None` on a dangling flag or extra argument.
fn parse_list_args(rest: &[String]) -> Option<(Option<String>, Option<String>)> {
    let mut type_filter = None;
    let mut search = None;
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--search" => search = Some(iter.next()?.clone()),
            _ if arg.starts_with("--") => return None,
            _ if type_filter.is_none() => type_filter = Some(arg.clone()),
            _ => return None,
        }
    }
    Some((type_filter, search))
}

fn resolve_pair<'r>(
    args: &[String],
    repo: &'r dyn CreatureRepository,
    usage: &str,
) -> Option<(&'r Creature, &'r Creature)> {
    let (Some(a_key), Some(b_key)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: bestiary {usage}");
        return None;
    };
    let a = repo.require(a_key);
    let b = repo.require(b_key);
    for err in [a.as_ref().err(), b.as_ref().err()].into_iter().flatten() {
        eprintln!("{err}");
    }
    a.ok().zip(b.ok())
}

/// 2 when the pair was not given at all, 1 when a named creature was not found.
fn exit_code_for_pair(args: &[String]) -> i32 {
    if args.len() < 4 {
        2
    } else {
        1
    }
}

fn print_json<T: serde::Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

/// Requested duel count, capped at [`MAX_MATCHUP_ITERATIONS`].
fn matchup_iterations(raw: Option<&String>) -> usize {
    let requested = parse_u64_arg(raw, "iterations", DEFAULT_MATCHUP_ITERATIONS as u64);
    let capped = usize::try_from(requested)
        .unwrap_or(MAX_MATCHUP_ITERATIONS)
        .min(MAX_MATCHUP_ITERATIONS);
    if capped as u64 != requested {
        eprintln!("iterations capped at {MAX_MATCHUP_ITERATIONS}");
    }
    capped
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command(&args(&["bestiary", "simulate"])), Some(Command::Simulate));
        assert_eq!(parse_command(&args(&["bestiary", "list"])), Some(Command::List));
        assert_eq!(parse_command(&args(&["bestiary", "fight"])), None);
        assert_eq!(parse_command(&args(&["bestiary"])), None);
    }

    #[test]
    fn list_args_accept_type_and_search_in_any_order() {
        assert_eq!(parse_list_args(&args(&[])), Some((None, None)));
        assert_eq!(
            parse_list_args(&args(&["--search", "saur", "grass"])),
            Some((Some("grass".to_string()), Some("saur".to_string())))
        );
        assert_eq!(parse_list_args(&args(&["fire", "--search"])), None);
        assert_eq!(parse_list_args(&args(&["fire", "water"])), None);
        assert_eq!(parse_list_args(&args(&["--table"])), None);
    }

    #[test]
    fn matchup_iterations_are_capped() {
        assert_eq!(matchup_iterations(None), DEFAULT_MATCHUP_ITERATIONS);
        assert_eq!(matchup_iterations(Some(&"250".to_string())), 250);
        assert_eq!(
            matchup_iterations(Some(&u64::MAX.to_string())),
            MAX_MATCHUP_ITERATIONS
        );
        assert_eq!(matchup_iterations(Some(&"0".to_string())), 0);
    }

    #[test]
    fn invalid_numeric_args_fall_back() {
        assert_eq!(parse_u64_arg(Some(&"abc".to_string()), "seed", 7), 7);
        assert_eq!(parse_u64_arg(Some(&"11".to_string()), "seed", 7), 11);
        assert_eq!(parse_u64_arg(None, "seed", 7), 7);
    }
}
