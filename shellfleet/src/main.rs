//! `shellfleet` command-line entry point.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::info;
use tokio_util::sync::CancellationToken;

use shellfleet::task::codec;
use shellfleet::{Error, HostKeyVerification, Orchestrator, SshOptions, TaskFile};

const EXIT_INVALID_TASK: u8 = 2;
const EXIT_RESOURCE: u8 = 3;
const EXIT_INTERRUPTED: u8 = 99;

#[derive(Parser, Debug)]
#[command(
    name = "shellfleet",
    version,
    about = "Run a command sequence over interactive SSH shells on a list of devices"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the activity described by a JSON task file
    Run {
        /// Task file (.json)
        task: PathBuf,

        /// SSH port used for every target
        #[arg(short, long, default_value_t = 22)]
        port: u16,

        /// Connection timeout in seconds
        #[arg(short, long, default_value_t = 30)]
        timeout: u64,

        /// Refuse hosts missing from known_hosts
        #[arg(long)]
        strict_host_keys: bool,

        /// known_hosts file to check against (default: ~/.ssh/known_hosts)
        #[arg(long)]
        known_hosts: Option<PathBuf>,
    },

    /// Scramble a password read from stdin for use in a task file
    Encode {
        /// Username the password belongs to
        #[arg(short, long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Lifecycle events already reach the run log; RUST_LOG=info mirrors them here too
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    match Cli::parse().command {
        Command::Run {
            task,
            port,
            timeout,
            strict_host_keys,
            known_hosts,
        } => {
            let mut options = SshOptions::default()
                .with_port(port)
                .with_timeout(Duration::from_secs(timeout));
            if strict_host_keys {
                options = options.with_host_key_verification(HostKeyVerification::Strict);
            }
            if let Some(path) = known_hosts {
                options = options.with_known_hosts(path);
            }
            run(task, options).await
        }
        Command::Encode { user } => encode(&user),
    }
}

async fn run(task: PathBuf, options: SshOptions) -> ExitCode {
    let activity = match TaskFile::load(&task).and_then(|t| t.into_activity()) {
        Ok(activity) => activity,
        Err(e) => {
            eprintln!("Error: cannot load {}: {}", task.display(), e);
            return ExitCode::from(EXIT_INVALID_TASK);
        }
    };
    if let Err(e) = activity.check() {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_TASK);
    }
    println!("{}", activity.summary());

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current target");
            interrupt.cancel();
        }
    });

    let orchestrator = Orchestrator::new(options).with_cancellation(cancel);
    match orchestrator.run(&activity).await {
        Ok(report) if report.cancelled => {
            eprintln!("Interrupted after {} target(s)", report.targets.len());
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Ok(report) => {
            for path in &report.output_files {
                println!("Output written to {}", path.display());
            }
            info!(
                "{} target(s) succeeded, {} failed",
                report.succeeded(),
                report.failed()
            );
            ExitCode::SUCCESS
        }
        Err(Error::Sink(e)) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_RESOURCE)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn encode(user: &str) -> ExitCode {
    let mut secret = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut secret) {
        eprintln!("Error: cannot read password: {}", e);
        return ExitCode::FAILURE;
    }
    let secret = secret.trim_end_matches(['\r', '\n']);

    match codec::encode(secret, user) {
        Ok(encoded) => {
            println!("{}", encoded);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_INVALID_TASK)
        }
    }
}
