use clap::Parser;
use evote_primitives::{ElGamal, PrimeSearch, SearchConfig, SecureRng};
use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "keygen")]
#[command(about = "Generate a safe-prime group and an ElGamal key pair", long_about = None)]
#[command(version)]
struct Args {
    /// Bit length of the subgroup order q
    #[arg(short, long, env = "EVOTE_BITS", default_value = "256")]
    bits: u32,

    /// Miller-Rabin rounds (overrides configuration)
    #[arg(short, long)]
    rounds: Option<usize>,

    /// Search window width (overrides configuration)
    #[arg(short, long)]
    window: Option<u64>,

    /// Seed a deterministic generator. Never use for real keys.
    #[arg(long)]
    seed: Option<u64>,

    /// Also print the private key
    #[arg(long, default_value = "false")]
    show_private: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.bits < 2 {
        return Err("bits must be at least 2".into());
    }

    let mut config = SearchConfig::from_env().unwrap_or_else(|e| {
        error!("Failed to load configuration: {e}");
        info!("Using default configuration");
        SearchConfig::default()
    });
    if let Some(rounds) = args.rounds {
        config.rounds = rounds;
    }
    if let Some(window) = args.window {
        config.window = window;
    }

    let search = PrimeSearch::new(config)?;
    let n = BigUint::from(1u32) << (args.bits - 1);

    info!(bits = args.bits, "searching for a safe prime");
    let pair = match args.seed {
        Some(seed) => {
            warn!("using a seeded generator; the key is reproducible");
            ElGamal::key_generation(&n, &search, &mut StdRng::seed_from_u64(seed))?
        }
        None => ElGamal::key_generation(&n, &search, &mut SecureRng::new())?,
    };

    let public = pair.public();
    let params = public.params();
    println!("p = {}", params.p().to_str_radix(16));
    println!("q = {}", params.q().to_str_radix(16));
    println!("g = {}", params.g().to_str_radix(16));
    println!("h = {}", public.h().to_str_radix(16));
    println!("public_key = {}", hex::encode(public.to_bytes()));

    if args.show_private {
        println!("x = {}", pair.private().expose_secret().to_str_radix(16));
    }

    Ok(())
}
