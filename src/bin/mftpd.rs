use std::net::IpAddr;
use std::process::exit;

use clap::{Parser, ValueEnum};
use log::{error, info};

use mftp::{
    FtpServer, Listener, PerSessionThreads, Result, SharedQueueThreadPool, ThreadPool, WorkDir,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PoolKind {
    /// A fresh thread for every session
    PerSession,
    /// A fixed set of worker threads sharing one queue
    Shared,
}

#[derive(Parser)]
#[command(name = "mftpd", version, about = "A minimal file transfer server")]
struct Cli {
    /// Port for the control connection
    ctrlport: u16,

    /// Port for the data connection
    dataport: u16,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0", value_name = "IP")]
    addr: IpAddr,

    /// How sessions are given their own worker
    #[arg(long, value_enum, default_value_t = PoolKind::PerSession)]
    pool: PoolKind,

    /// Worker count for the shared pool
    #[arg(long, value_name = "N")]
    threads: Option<u32>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let threads = cli.threads.unwrap_or(num_cpus::get() as u32);
    let root = WorkDir::current_process()?;
    let listener = Listener::bind(cli.addr, cli.ctrlport, cli.dataport)?;
    let (control, data) = listener.local_addrs()?;

    info!("mftpd {}", env!("CARGO_PKG_VERSION"));
    info!("Control channel on {}, data channel on {}", control, data);
    info!("Serving {} with {:?} workers", root.current().display(), cli.pool);

    match cli.pool {
        PoolKind::PerSession => serve(root, PerSessionThreads::new(threads)?, listener),
        PoolKind::Shared => serve(root, SharedQueueThreadPool::new(threads)?, listener),
    }
}

fn serve<P: ThreadPool>(root: WorkDir, pool: P, listener: Listener) -> Result<()> {
    let server = FtpServer::new(root, pool);
    server.run(listener)
}
