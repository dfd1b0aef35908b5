//! Drive one device session by hand: connect, login, escalate, run, logout.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example single_host -- --host 192.168.1.1 --user admin \
//!     --password secret --type ciscoios --enable en4ble "show version"
//! ```
//!
//! Set `RUST_LOG=trace` to see every line sent.

use std::io;
use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;

use shellfleet::channel::ShellFactory;
use shellfleet::{Credential, DeviceKind, DeviceSession, SshOptions};

#[derive(Parser, Debug)]
struct Args {
    /// Target host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// SSH port
    #[arg(short, long, default_value_t = 22)]
    port: u16,

    /// Username
    #[arg(short, long)]
    user: String,

    /// Password
    #[arg(long)]
    password: String,

    /// Device type tag (ciscoios, ciscowlc, linux or empty)
    #[arg(long = "type", default_value = "")]
    device_type: String,

    /// Escalation password
    #[arg(long)]
    enable: Option<String>,

    /// Commands to run, in order
    #[arg(required = true)]
    commands: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let kind: DeviceKind = args.device_type.parse()?;
    let options = SshOptions::default()
        .with_port(args.port)
        .with_timeout(Duration::from_secs(10));

    let mut session = DeviceSession::new(
        &args.host,
        options.create(),
        kind,
        Credential::new(&args.user, &args.password),
    );

    println!("Connecting to {}:{} as {} ({})...", args.host, args.port, args.user, kind);
    session.connect().await?;
    session.login().await?;

    if let Some(password) = args.enable {
        session.escalate(&SecretString::from(password)).await?;
        println!("Escalated");
    }

    println!("{}", "-".repeat(50));
    let result = session.run_commands(&args.commands, &mut io::stdout()).await;
    println!("\n{}", "-".repeat(50));

    // Log out even when a command failed
    session.logout().await?;
    result?;

    println!("Done ({})", session.state());
    Ok(())
}
