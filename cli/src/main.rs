//! `idproof`: prove control of a wallet address by signing a challenge.

mod config;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use idproof_flow::{FlowError, IdentityProofFlow, SessionState, WalletProvider};
use idproof_types::WalletAddress;
use idproof_utils::LogFormat;
use idproof_wallet::{save_key_file, Approval, LocalWallet};

use config::IdproofConfig;
use report::{SessionReport, TamperCheck};

#[derive(Parser)]
#[command(name = "idproof", version, about = "Wallet identity proof by signed challenge")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true, env = "IDPROOF_CONFIG")]
    config: Option<PathBuf>,

    /// Log level filter (overrides the config file).
    #[arg(long, global = true, env = "IDPROOF_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: human or json (overrides the config file).
    #[arg(long, global = true, env = "IDPROOF_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect, sign and verify with a local wallet, printing each step.
    Run(RunArgs),
    /// Create a new private key file.
    Keygen {
        #[arg(long, default_value = "idproof.key")]
        out: PathBuf,
    },
    /// Print the checksummed address for a key file.
    Address {
        #[arg(long, env = "IDPROOF_KEY_FILE")]
        key: Option<PathBuf>,
    },
    /// Sign a message with a key file and print the signature.
    Sign {
        #[arg(long, env = "IDPROOF_KEY_FILE")]
        key: Option<PathBuf>,
        #[arg(long)]
        message: String,
    },
    /// Check that a signature over a message was made by an address.
    Verify {
        #[arg(long)]
        message: String,
        #[arg(long)]
        signature: String,
        #[arg(long)]
        address: String,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Key file for the local wallet; a throwaway key is used when absent.
    #[arg(long, env = "IDPROOF_KEY_FILE")]
    key: Option<PathBuf>,

    /// Text placed before the timestamp in the challenge.
    #[arg(long, env = "IDPROOF_CHALLENGE_PREFIX")]
    challenge_prefix: Option<String>,

    #[arg(long, env = "IDPROOF_NETWORK_NAME")]
    network_name: Option<String>,

    #[arg(long, env = "IDPROOF_CHAIN_ID")]
    chain_id: Option<u64>,

    /// Also verify the signature against an altered challenge.
    #[arg(long)]
    tamper: bool,

    /// Have the wallet decline the connect request.
    #[arg(long)]
    reject_connect: bool,

    /// Have the wallet decline the signature request.
    #[arg(long)]
    reject_sign: bool,

    /// Reset the session afterwards and show the challenge it keeps or reissues.
    #[arg(long)]
    reset: bool,

    #[arg(long, value_enum, default_value_t = Output::Human)]
    output: Output,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    Human,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => IdproofConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => IdproofConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    idproof_utils::init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Run(args) => {
            apply_run_overrides(&mut config, &args);
            run(&config, &args).await
        }
        Command::Keygen { out } => keygen(&out),
        Command::Address { key } => {
            let wallet = load_wallet(key.as_deref().or(config.key_file.as_deref()))?;
            println!("{}", wallet.address());
            Ok(ExitCode::SUCCESS)
        }
        Command::Sign { key, message } => {
            let wallet = load_wallet(key.as_deref().or(config.key_file.as_deref()))?;
            println!("{}", wallet.sign(&message)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify {
            message,
            signature,
            address,
        } => Ok(if verify(&message, &signature, &address)? {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }),
    }
}

fn apply_run_overrides(config: &mut IdproofConfig, args: &RunArgs) {
    if let Some(key) = &args.key {
        config.key_file = Some(key.clone());
    }
    if let Some(prefix) = &args.challenge_prefix {
        config.challenge_prefix = prefix.clone();
    }
    if let Some(name) = &args.network_name {
        config.network_name = name.clone();
    }
    if let Some(chain_id) = args.chain_id {
        config.chain_id = chain_id;
    }
}

fn load_wallet(key: Option<&Path>) -> anyhow::Result<LocalWallet> {
    let Some(path) = key else {
        bail!("no key file given; pass --key or set key_file in the config");
    };
    Ok(LocalWallet::from_key_file(path)?)
}

async fn run(config: &IdproofConfig, args: &RunArgs) -> anyhow::Result<ExitCode> {
    let wallet = match &config.key_file {
        Some(path) => LocalWallet::from_key_file(path)?,
        None => LocalWallet::ephemeral()?,
    };
    let wallet = wallet.with_network(config.network()).with_approval(Approval {
        connect: !args.reject_connect,
        sign: !args.reject_sign,
    });
    tracing::info!(address = %wallet.address(), network = %wallet.network(), "local wallet ready");

    let provider: Arc<dyn WalletProvider> = Arc::new(wallet);
    let flow = IdentityProofFlow::new(Some(provider)).with_config(config.flow_config());
    let report = run_session(&flow, args.tamper, args.reset).await?;

    match args.output {
        Output::Human => print!("{report}"),
        Output::Json => println!("{}", report.to_json()?),
    }

    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// One session from start to finish, with the optional tamper check and reset.
async fn run_session(
    flow: &IdentityProofFlow,
    tamper: bool,
    reset: bool,
) -> anyhow::Result<SessionReport> {
    let mut state = flow.start_session();
    let outcome = drive(flow, &mut state).await;
    let altered = match (&outcome, tamper) {
        (Ok(()), true) => Some(tamper_check(&state)?),
        _ => None,
    };

    let mut report = SessionReport::new(flow.provider_name(), state.clone());
    if let Some(check) = altered {
        report = report.with_tamper_check(check);
    }
    if reset {
        flow.reset(&mut state);
        report = report.with_reset(state.challenge().clone());
    }
    Ok(report)
}

/// Connect, sign and verify, stopping at the first failing step.
async fn drive(flow: &IdentityProofFlow, state: &mut SessionState) -> Result<(), FlowError> {
    flow.connect(state).await?;
    flow.sign(state).await?;
    flow.verify(state)?;
    Ok(())
}

fn tamper_check(state: &SessionState) -> anyhow::Result<TamperCheck> {
    let (Some(signature), Some(address)) = (state.signature(), state.address()) else {
        bail!("session has no signature to tamper with");
    };
    let message = format!("{} (edited)", state.challenge());
    let verification = idproof_flow::verify(&message, signature, address)?;
    Ok(TamperCheck {
        message,
        verification,
    })
}

fn keygen(out: &Path) -> anyhow::Result<ExitCode> {
    let keys = idproof_crypto::generate_keypair()?;
    save_key_file(&keys.private, out)?;
    let address = idproof_crypto::derive_address(&keys.public);
    println!("Wrote {} for {address}", out.display());
    Ok(ExitCode::SUCCESS)
}

/// Print the recovered address and verdict; returns whether it matched.
fn verify(message: &str, signature: &str, address: &str) -> anyhow::Result<bool> {
    let claimed = WalletAddress::parse(address)?;
    let verification = idproof_flow::verify(message, signature, &claimed)?;
    println!("Recovered: {}", verification.recovered_address);
    println!(
        "{}",
        if verification.is_verified {
            "Verified"
        } else {
            "Not Verified"
        }
    );
    Ok(verification.is_verified)
}
