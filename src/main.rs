use std::io;

use dotenv::dotenv;
use keymaker::infra::DefaultObserver;
use keymaker::{Config, Engine, LineProtocol, SimulatedWorld};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keymaker=info,warn"));

    // stdout carries the protocol, so logs go to stderr.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let config = Config::from_env()?;
    tracing::info!("Strategy: {}", config.strategy);

    if let Some(seed) = config.seed {
        tracing::info!("Simulating board for seed {}", seed);
        let world =
            SimulatedWorld::random(seed, config.perception_radius, config.danger_density);
        let expected = world.shortest_distance();
        let mut engine = Engine::new(world, DefaultObserver);
        let summary = engine.run(config.strategy)?;
        println!("{}", summary.outcome);
        tracing::info!("Shortest route with full knowledge: {:?}", expected);
    } else {
        let stdin = io::stdin();
        let mut protocol = LineProtocol::new(stdin.lock(), io::stdout());
        if let Some(folder) = &config.replays_folder {
            protocol = protocol.with_replay_folder(folder, &config.strategy.to_string());
        }
        let mut engine = Engine::new(protocol, DefaultObserver);
        if let Err(e) = engine.run(config.strategy) {
            tracing::error!("Search aborted: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
