//! The "who has the larger number" two-party application: reads each
//! party's scaled input, drives `gc`'s garbler/evaluator protocol over a
//! TCP transport, and reports the winner. Ported from the reference
//! implementation's `main.py`/`protocol_manager.py`/`alice.py`/`bob.py`.

use std::fs;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

use gc::circuit::CircuitSet;
use gc::protocol::{run_evaluator, run_garbler};
use gc_cli::comparator::generate_signed_comparator;
use gc_cli::input::{parse_inputs, scale_max_input};
use gc_cli::net::{TcpListenerHandle, TcpTransport};
use gc_cli::{ALICE_INPUT_FILE, BOB_INPUT_FILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Party {
    Alice,
    Bob,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    fn as_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error | LogLevel::Critical => tracing::Level::ERROR,
        }
    }
}

/// Run Yao's garbled-circuit protocol to determine which party holds the
/// larger input, without either party learning the other's exact value.
#[derive(Debug, Parser)]
#[command(name = "gc-cli", about = "Run a two-party garbled-circuit comparison")]
struct Args {
    /// Which party to run as.
    party: Party,

    /// The JSON circuit file. If it is named like
    /// `cmp-<bits>bit-signed_generated.json` and doesn't exist yet, it is
    /// generated on the fly.
    #[arg(
        short = 'c',
        long = "circuit",
        default_value = "cmp-32bit-signed_generated.json"
    )]
    circuit: String,

    /// Disable oblivious transfer (debug/verification mode; no input privacy).
    #[arg(long = "no-oblivious-transfer")]
    no_oblivious_transfer: bool,

    /// Also verify the result without Yao's protocol, by reading both
    /// parties' input files directly.
    #[arg(short = 'v', long = "verify")]
    verify: bool,

    /// The log level (default 'info').
    #[arg(short = 'l', long = "loglevel", default_value = "info")]
    loglevel: LogLevel,

    /// Address the garbler (Alice) listens on and the evaluator (Bob)
    /// connects to.
    #[arg(long = "address", default_value = "127.0.0.1:9009")]
    address: String,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.loglevel.as_tracing_level())
        .init();

    if let Err(err) = run(&args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn load_or_generate_circuit(path: &str) -> Result<CircuitSet> {
    if std::path::Path::new(path).exists() {
        return Ok(CircuitSet::load(path)?);
    }

    let bits = parse_bits_from_filename(path).with_context(|| {
        format!(
            "circuit file '{path}' not found and its name doesn't encode a bit width to generate one"
        )
    })?;
    let set = generate_signed_comparator(bits)?;
    let json = serde_json::to_string_pretty(&set)?;
    fs::write(path, json).with_context(|| format!("writing generated circuit to '{path}'"))?;
    tracing::info!(bits, path, "generated comparator circuit");
    Ok(set)
}

/// Pulls `bits` out of a `cmp-<bits>bit...json` filename, mirroring the
/// naming convention `generate_cmp_signed_circuit.py` writes.
fn parse_bits_from_filename(path: &str) -> Option<u32> {
    let name = std::path::Path::new(path).file_name()?.to_str()?;
    let rest = name.strip_prefix("cmp-")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn read_own_inputs(party: Party) -> Result<String> {
    let file = match party {
        Party::Alice => ALICE_INPUT_FILE,
        Party::Bob => BOB_INPUT_FILE,
    };
    fs::read_to_string(file).with_context(|| format!("reading input file '{file}'"))
}

fn interpret_output(party: Party, bob_wins: bool, mismatch: bool) {
    if !mismatch {
        println!("The other party has the same maximum input.");
    } else if bob_wins {
        match party {
            Party::Alice => println!("Bob has a larger maximum input."),
            Party::Bob => println!("I have the global maximum input."),
        }
    } else {
        match party {
            Party::Alice => println!("I have the global maximum input."),
            Party::Bob => println!("Alice has a larger maximum input."),
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let circuit_set = load_or_generate_circuit(&args.circuit)?;
    if circuit_set.circuits.len() != 1 {
        anyhow::bail!(
            "only single-circuit bundles are supported, found {}",
            circuit_set.circuits.len()
        );
    }
    let circuit = &circuit_set.circuits[0];
    let bits = circuit.alice.len() as u32;

    let raw_inputs = read_own_inputs(args.party)?;
    let parsed = parse_inputs(&raw_inputs)?;
    let scaled = scale_max_input(&parsed, bits)?;
    println!("Inputs: {:?}", scaled.inputs);
    println!("Local maximum: {}", scaled.max_value);

    let use_ot = !args.no_oblivious_transfer;
    let mut rng = ChaCha12Rng::from_os_rng();

    let output = match args.party {
        Party::Alice => {
            let listener = TcpListenerHandle::bind(&args.address)?;
            tracing::info!(address = %args.address, "waiting for evaluator to connect");
            let mut transport = listener.accept_one()?;
            run_garbler(circuit, &scaled.bits, &mut transport, use_ot, true, &mut rng)?
        }
        Party::Bob => {
            let mut transport = TcpTransport::connect(&args.address)?;
            run_evaluator(&scaled.bits, &mut transport, use_ot, &mut rng)?
        }
    };

    let bob_wins = output[&circuit.out[0]];
    let mismatch = output[&circuit.out[1]];
    interpret_output(args.party, bob_wins, mismatch);

    if args.verify {
        verify_without_protocol(args.party, bits, bob_wins, mismatch)?;
    }

    Ok(())
}

fn verify_without_protocol(party: Party, bits: u32, bob_wins: bool, mismatch: bool) -> Result<()> {
    println!("\n=== Verifying result without Yao's protocol ===");
    let other_file = match party {
        Party::Alice => BOB_INPUT_FILE,
        Party::Bob => ALICE_INPUT_FILE,
    };
    let other_raw = fs::read_to_string(other_file).with_context(|| {
        format!("reading other party's input file '{other_file}' for verification")
    })?;
    let other_parsed = parse_inputs(&other_raw)?;
    let other_scaled = scale_max_input(&other_parsed, bits)?;

    let own_raw = read_own_inputs(party)?;
    let own_parsed = parse_inputs(&own_raw)?;
    let own_scaled = scale_max_input(&own_parsed, bits)?;

    let failed = if !mismatch {
        own_scaled.max_value != other_scaled.max_value
    } else if bob_wins {
        match party {
            Party::Alice => own_scaled.max_value >= other_scaled.max_value,
            Party::Bob => own_scaled.max_value <= other_scaled.max_value,
        }
    } else {
        match party {
            Party::Alice => own_scaled.max_value <= other_scaled.max_value,
            Party::Bob => own_scaled.max_value >= other_scaled.max_value,
        }
    };

    if failed {
        println!("VERIFICATION FAILED");
    } else {
        println!("VERIFICATION SUCCESSFUL!");
    }
    Ok(())
}
