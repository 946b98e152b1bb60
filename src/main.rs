use clap::Parser;
use hunt_evo::cancel::{CancelToken, Cancelled};
use hunt_evo::config::Config;
use hunt_evo::evolution::Trainer;
use hunt_evo::server::{self, state_stream::StateStream};

#[derive(Parser, Debug)]
#[command(name = "hunt-evo")]
#[command(about = "Evolves hunter policies for the pursuit arena", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Stop after this many generations (overrides the config; 0 = until cancelled)
    #[arg(short, long)]
    generations: Option<u64>,

    /// Run seed (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    no_server: bool,

    /// Evaluate individuals one at a time instead of across all cores
    #[arg(long)]
    sequential: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = if std::path::Path::new(&args.config).exists() {
        log::info!("Loading config from: {}", args.config);
        Config::load_from_file(&args.config)?
    } else {
        log::info!("Config file not found, using defaults and saving to: {}", args.config);
        let config = Config::default();
        config.save_to_file(&args.config)?;
        config
    };

    if let Some(generations) = args.generations {
        config.evolution.max_generations = generations;
    }
    if args.seed.is_some() {
        config.evolution.seed = args.seed;
    }
    if args.sequential {
        config.evolution.parallel = false;
    }

    let run_seed = config.evolution.seed.unwrap_or_else(rand::random);

    log::info!("Initializing population...");
    let mut trainer = Trainer::new(config.clone(), run_seed)?;
    log::info!(
        "Run seed: {} | Population: {} | Max ticks: {}",
        trainer.run_seed(),
        trainer.population().len(),
        trainer.config().arena.max_ticks
    );

    let cancel = CancelToken::new();
    let stream = StateStream::new(run_seed);
    {
        let stream = stream.clone();
        trainer.on_phase(move |phase| stream.set_phase_blocking(phase));
    }

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Quit requested, stopping after the current tick");
                cancel.cancel();
            }
        });
    }

    if !args.no_server && config.server.enabled {
        let server_config = config.clone();
        let server_stream = stream.clone();
        let server_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = server::run_server(server_config, server_stream, server_cancel).await {
                log::error!("Server error: {}", e);
            }
        });
    }

    let outcome = tokio::task::spawn_blocking(move || run_training(trainer, stream, cancel)).await?;

    match outcome {
        Ok(generations) => log::info!("Training finished after {} generations", generations),
        Err(Cancelled) => log::warn!("Training cancelled"),
    }

    Ok(())
}

fn run_training(mut trainer: Trainer, stream: StateStream, cancel: CancelToken) -> Result<u64, Cancelled> {
    let max_generations = trainer.config().evolution.max_generations;
    let result = trainer.run(max_generations, &cancel, |report| stream.publish_blocking(report));
    stream.mark_stopped_blocking();

    result.map(|()| trainer.generation())
}
