use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::thread;

use mftp::{FtpServer, Listener, PerSessionThreads, ThreadPool, WorkDir};

/// Starts a server rooted at `root` on loopback and returns its
/// control and data ports.
pub fn start_server(root: &Path) -> (u16, u16) {
    let listener = Listener::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, 0).unwrap();
    let (control, data) = listener.local_addrs().unwrap();
    let server = FtpServer::new(
        WorkDir::new(root).unwrap(),
        PerSessionThreads::new(0).unwrap(),
    );
    thread::spawn(move || server.run(listener));
    (control.port(), data.port())
}
