use std::io;
use std::process::exit;

use clap::Parser;

use mftp::{FtpClient, Result, Shell};

#[derive(Parser)]
#[command(name = "mftp", version, about = "A minimal file transfer client")]
struct Cli {
    /// Server host name or address
    host: String,

    /// Server control port
    ctrlport: u16,

    /// Server data port
    dataport: u16,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("mftp: {}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let client = FtpClient::connect(&cli.host, cli.ctrlport, cli.dataport)?;
    let stdin = io::stdin();
    Shell::new(client, io::stdout(), io::stderr()).run(stdin.lock())
}
