#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use broadside::{
    init_logging, server, Axis, Match, MatchStatus, RoomId, RoomSettings, ScriptedOpponent,
    ServerConfig, SideId, TargetingMode, BOARD_SIZE, FLEET,
};

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::{Rng, SeedableRng};
#[cfg(feature = "std")]
use serde_json::json;
#[cfg(feature = "std")]
use std::net::{IpAddr, SocketAddr};
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    /// Log level (error, warn, info, debug, trace). Overrides BROADSIDE_LOG.
    #[arg(long, global = true)]
    log_level: Option<log::LevelFilter>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum Targeting {
    Omniscient,
    Fair,
}

#[cfg(feature = "std")]
impl From<Targeting> for TargetingMode {
    fn from(t: Targeting) -> Self {
        match t {
            Targeting::Omniscient => TargetingMode::Omniscient,
            Targeting::Fair => TargetingMode::Fair,
        }
    }
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Run the match server.
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "PORT", default_value_t = 3030)]
        port: u16,
        /// Scripted opponent think time in milliseconds.
        #[arg(long, default_value_t = broadside::DEFAULT_THINK_TIME_MS)]
        think_ms: u64,
        /// How scripted opponents choose targets.
        #[arg(long, value_enum, default_value_t = Targeting::Omniscient)]
        targeting: Targeting,
        #[arg(long, help = "Fix RNG seed for reproducible ids and opponents (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Play a scripted opponent against a fair-mode bot and print the result.
    Sim {
        #[arg(long)]
        seed: Option<u64>,
        /// Targeting of the scripted side.
        #[arg(long, value_enum, default_value_t = Targeting::Omniscient)]
        targeting: Targeting,
    },
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Commands::Serve {
            host,
            port,
            think_ms,
            targeting,
            seed,
        } => {
            let config = ServerConfig {
                bind: SocketAddr::new(host, port),
                room: RoomSettings {
                    think_time: Duration::from_millis(think_ms),
                    targeting: targeting.into(),
                },
                seed,
            };
            server::run(config).await?;
        }
        Commands::Sim { seed, targeting } => {
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            let report = simulate(seed, targeting.into())?;
            println!("{}", serde_json::to_string(&report)?);
        }
    }
    Ok(())
}

/// Drive a whole match without timers: side 1 is a fair-mode bot standing
/// in for a human, side 2 is the scripted opponent under test.
#[cfg(feature = "std")]
fn simulate(seed: u64, targeting: TargetingMode) -> anyhow::Result<serde_json::Value> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let human = SideId(1);
    let scripted = SideId(2);
    let mut game = Match::new(RoomId(seed));

    game.join_human(human, "bot")?;
    for def in FLEET.iter() {
        loop {
            let axis = if rng.random() { Axis::Row } else { Axis::Column };
            let row = rng.random_range(0..BOARD_SIZE);
            let col = rng.random_range(0..BOARD_SIZE);
            if game
                .place_vessel(human, def.name(), def.length(), row, col, axis)?
                .accepted
            {
                break;
            }
        }
    }
    let opponent = ScriptedOpponent::new(SmallRng::seed_from_u64(rng.random()), targeting);
    game.join_scripted(scripted, "Computer", opponent)?;
    game.mark_ready(human)?;

    let mut bot = ScriptedOpponent::new(SmallRng::seed_from_u64(rng.random()), TargetingMode::Fair);
    let mut shots = [0usize; 2];
    while game.status() == MatchStatus::Started {
        let (side, coord) = if game.turn() == Some(human) {
            let coord = bot
                .next_move(game.side(scripted)?.combatant().grid())
                .ok_or_else(|| anyhow::anyhow!("bot ran out of targets"))?;
            (human, coord)
        } else {
            game.next_scripted_move()
                .ok_or_else(|| anyhow::anyhow!("scripted side ran out of targets"))?
        };
        let res = game
            .fire(side, coord.row, coord.col)?
            .ok_or_else(|| anyhow::anyhow!("shot from {} was ignored", side))?;
        if side == human {
            bot.observe(coord, res.outcome);
            shots[0] += 1;
        } else {
            shots[1] += 1;
        }
    }

    let winner = match game.winner() {
        Some(id) if id == human => "bot",
        Some(_) => "scripted",
        None => "none",
    };
    Ok(json!({
        "seed": seed,
        "targeting": format!("{:?}", targeting),
        "winner": winner,
        "shots": { "bot": shots[0], "scripted": shots[1] },
    }))
}
