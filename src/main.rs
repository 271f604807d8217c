use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use bersync_rs::modulation::QamConstellation;
use bersync_rs::prbs::prbs_sequence;
use bersync_rs::utils::bits::{invert, roll};
use bersync_rs::utils::consts::{DEFAULT_DEMO_LENGTH, DEFAULT_SEED, DUAL_RAIL_QAM_ORDER};
use bersync_rs::utils::logging::init_logging;
use bersync_rs::{BerConfig, Reference, ber, ber_qam_prbs};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Synthesises an impaired test pattern and measures its BER
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with BER configuration (threshold, imax, sync_length, strategy)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Channel {
    /// Number of transmitted bits per rail
    #[arg(short, long, default_value_t = DEFAULT_DEMO_LENGTH)]
    length: usize,
    /// Cyclic delay applied by the channel
    #[arg(short, long, default_value_t = 0)]
    shift: usize,
    /// Flip the polarity of the received bits
    #[arg(long)]
    invert: bool,
    /// Probability of a random bit error
    #[arg(short, long, default_value_t = 0.0)]
    flip_rate: f64,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Random known sequence, rolled by the channel
    Known {
        #[command(flatten)]
        channel: Channel,
    },
    /// PRBS picked up `shift` bits into its period
    Prbs {
        #[arg(short, long, default_value_t = 15)]
        order: u32,
        #[command(flatten)]
        channel: Channel,
    },
    /// QPSK stream with an independent PRBS on each rail
    Qpsk {
        #[arg(long, default_value_t = 7)]
        order_i: u32,
        #[arg(long, default_value_t = 9)]
        order_q: u32,
        /// Hand the receiver the two orders the wrong way round
        #[arg(long)]
        swap: bool,
        #[command(flatten)]
        channel: Channel,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<BerConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(BerConfig::default());
    };
    let config: BerConfig = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    info!(?path, ?config, "loaded configuration");
    Ok(config)
}

fn impair(bits: &[bool], channel: &Channel, rng: &mut StdRng) -> Result<Vec<bool>, Box<dyn Error>> {
    if !(0.0..=1.0).contains(&channel.flip_rate) {
        return Err(format!("flip rate must be in [0, 1], got {}", channel.flip_rate).into());
    }
    let bits = if channel.invert { invert(bits) } else { bits.to_vec() };
    Ok(bits
        .into_iter()
        .map(|b| if rng.random_bool(channel.flip_rate) { !b } else { b })
        .collect())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let report = match cli.command {
        Commands::Known { channel } => {
            let mut rng = StdRng::seed_from_u64(channel.seed);
            let tx: Vec<bool> = (0..channel.length).map(|_| rng.random_bool(0.5)).collect();
            let rx = impair(&roll(&tx, channel.shift as isize), &channel, &mut rng)?;
            info!(bits = rx.len(), shift = channel.shift, "known-sequence channel");

            serde_json::to_string_pretty(&ber(&rx, Reference::Known(&tx), &config)?)?
        }
        Commands::Prbs { order, channel } => {
            let mut rng = StdRng::seed_from_u64(channel.seed);
            let tx = prbs_sequence(order, channel.shift + channel.length)?;
            let rx = impair(&tx[channel.shift..], &channel, &mut rng)?;
            info!(bits = rx.len(), order, "PRBS channel");

            serde_json::to_string_pretty(&ber(&rx, Reference::Prbs { order }, &config)?)?
        }
        Commands::Qpsk {
            order_i,
            order_q,
            swap,
            channel,
        } => {
            let mut rng = StdRng::seed_from_u64(channel.seed);
            let total = channel.shift + channel.length;
            let rail_i = impair(&prbs_sequence(order_i, total)?[channel.shift..], &channel, &mut rng)?;
            let rail_q = impair(&prbs_sequence(order_q, total)?[channel.shift..], &channel, &mut rng)?;

            let bits: Vec<bool> = rail_i
                .iter()
                .zip(&rail_q)
                .flat_map(|(&i, &q)| [i, q])
                .collect();
            let rx = QamConstellation::new(DUAL_RAIL_QAM_ORDER)?.modulate(&bits);
            info!(symbols = rx.len(), order_i, order_q, "QPSK channel");

            let (oi, oq) = if swap { (order_q, order_i) } else { (order_i, order_q) };
            serde_json::to_string_pretty(&ber_qam_prbs(&rx, oi, oq, &config)?)?
        }
    };

    println!("{}", report);
    Ok(())
}
