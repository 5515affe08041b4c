#![deny(missing_docs)]

//! A minimal remote file access protocol.
//!
//! A client sends line-based commands on a control connection and moves
//! bulk payloads over a separate data connection. The server serves every
//! client pair of connections in its own worker, with its own working
//! directory.

mod client;
mod command;
mod common;
mod error;
mod server;
mod shell;
mod transfer;
mod workdir;
/// Worker pools that give each session its own thread.
pub mod thread_pool;

pub use client::FtpClient;
pub use common::{read_line, split_line, Request, RequestError, Response, LINE_MAX};
pub use error::{FtpError, Result};
pub use server::{FtpServer, Listener, Session};
pub use shell::Shell;
pub use thread_pool::{PerSessionThreads, SharedQueueThreadPool, ThreadPool};
pub use transfer::{transfer, BUFFER_SIZE};
pub use workdir::WorkDir;
