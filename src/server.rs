use std::io::{BufReader, BufWriter};
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};

use log::{debug, error, info};

use crate::command::{execute, respond, Flow};
use crate::common::{read_line, Request, Response};
use crate::thread_pool::ThreadPool;
use crate::workdir::WorkDir;
use crate::Result;

/// The two listening endpoints of a server.
///
/// Both live for the whole life of the server.
pub struct Listener {
    control: TcpListener,
    data: TcpListener,
}

impl Listener {
    /// Binds the control and data endpoints on `addr`.
    ///
    /// Port 0 picks a free port; see [`Listener::local_addrs`].
    pub fn bind(addr: IpAddr, control_port: u16, data_port: u16) -> Result<Self> {
        Ok(Listener {
            control: TcpListener::bind((addr, control_port))?,
            data: TcpListener::bind((addr, data_port))?,
        })
    }

    /// The bound control and data addresses.
    pub fn local_addrs(&self) -> Result<(SocketAddr, SocketAddr)> {
        Ok((self.control.local_addr()?, self.data.local_addr()?))
    }

    /// Accepts one control connection and then one data connection.
    ///
    /// The Nth control connection is paired with the Nth data connection.
    /// Nothing checks that both come from the same client.
    pub fn accept_session(&self) -> Result<Session> {
        let (control, peer) = self.control.accept()?;
        let (data, _) = self.data.accept()?;
        Ok(Session {
            control,
            data,
            peer,
        })
    }
}

/// One client's control and data connections.
pub struct Session {
    control: TcpStream,
    data: TcpStream,
    peer: SocketAddr,
}

impl Session {
    /// Address the control connection came from.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Runs the command loop until the client exits or disconnects.
    ///
    /// Blank lines are skipped. Bad requests get a `fail:` line. Any IO
    /// error ends the session.
    pub fn serve(self, mut dir: WorkDir) -> Result<()> {
        let mut reader = BufReader::new(&self.control);
        let mut writer = BufWriter::new(&self.control);
        let mut data = &self.data;
        let mut line = Vec::new();

        loop {
            if read_line(&mut reader, &mut line)? == 0 {
                debug!("{} closed the control channel", self.peer);
                break;
            }
            let text = String::from_utf8_lossy(&line);
            match Request::decode(&text) {
                Ok(None) => continue,
                Ok(Some(request)) => {
                    debug!("Received request from {}: {:?}", self.peer, request);
                    if execute(request, &mut dir, &mut writer, &mut data)? == Flow::Exit {
                        debug!("{} sent exit", self.peer);
                        break;
                    }
                }
                Err(e) => {
                    debug!("Rejected request from {}: {}", self.peer, e);
                    respond(&mut writer, &Response::Fail(e.to_string()))?;
                }
            }
        }

        Ok(())
    }
}

/// The server side of the protocol.
///
/// Every accepted session is handed to the pool `P` together with its own
/// copy of the starting directory, so sessions share no mutable state.
pub struct FtpServer<P: ThreadPool> {
    root: WorkDir,
    pool: P,
}

impl<P: ThreadPool> FtpServer<P> {
    /// Creates a server whose sessions start in `root`.
    pub fn new(root: WorkDir, pool: P) -> Self {
        Self { root, pool }
    }

    /// Accepts session pairs forever.
    ///
    /// A failed accept or a failed session is logged and never stops the
    /// loop.
    pub fn run(&self, listener: Listener) -> Result<()> {
        loop {
            match listener.accept_session() {
                Ok(session) => {
                    let peer = session.peer_addr();
                    info!("Accepted session from {}", peer);
                    let dir = self.root.clone();
                    let spawned = self.pool.spawn(move || {
                        match session.serve(dir) {
                            Ok(()) => info!("Session from {} ended", peer),
                            Err(e) => error!("Session from {} failed: {}", peer, e),
                        }
                    });
                    if let Err(e) = spawned {
                        error!("Could not start session from {}: {}", peer, e);
                    }
                }
                Err(e) => error!("Accept failed: {}", e),
            }
        }
    }
}
