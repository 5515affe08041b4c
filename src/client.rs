use std::io::{self, BufReader, BufWriter, Write};
use std::net::TcpStream;

use log::debug;

use crate::common::{read_line, Request, Response, LINE_MAX};
use crate::transfer::transfer;
use crate::workdir::WorkDir;
use crate::{FtpError, Result};

/// The client side of a session.
///
/// Requests are strictly sequential: each call blocks until its response,
/// and any payload, has been fully received.
pub struct FtpClient {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    data: TcpStream,
    local: WorkDir,
}

impl FtpClient {
    /// Opens the control connection and then the data connection.
    ///
    /// The server pairs connections by acceptance order, so the order here
    /// matters. Files for `get` and `put` live in the process working
    /// directory until [`FtpClient::local_mut`] changes it.
    pub fn connect(host: &str, control_port: u16, data_port: u16) -> Result<Self> {
        let control = TcpStream::connect((host, control_port))?;
        let data = TcpStream::connect((host, data_port))?;
        Ok(FtpClient {
            reader: BufReader::new(control.try_clone()?),
            writer: BufWriter::new(control),
            data,
            local: WorkDir::current_process()?,
        })
    }

    /// The local directory used by `get` and `put`.
    pub fn local(&self) -> &WorkDir {
        &self.local
    }

    /// Mutable access to the local directory.
    pub fn local_mut(&mut self) -> &mut WorkDir {
        &mut self.local
    }

    /// Has the server restate `text`. The payload ends with a newline.
    ///
    /// Text that would make the request line longer than [`LINE_MAX`] is
    /// refused locally.
    pub fn echo(&mut self, text: Option<&str>) -> Result<Vec<u8>> {
        self.fetch(&Request::Echo(text.map(str::to_owned)))
    }

    /// Lists a remote directory, `.` when `dir` is `None`.
    ///
    /// The payload is one name per line.
    pub fn rls(&mut self, dir: Option<&str>) -> Result<Vec<u8>> {
        self.fetch(&Request::Rls(dir.map(str::to_owned)))
    }

    /// Changes the remote working directory.
    pub fn rcd(&mut self, dir: &str) -> Result<()> {
        if dir.is_empty() {
            return Err(FtpError::Usage("usage: rcd dir".to_owned()));
        }
        self.fetch(&Request::Rcd(dir.to_owned()))?;
        Ok(())
    }

    /// Returns the remote working directory, newline included.
    pub fn rpwd(&mut self) -> Result<Vec<u8>> {
        self.fetch(&Request::Rpwd)
    }

    /// Fetches `file` into the local directory. Returns its size.
    ///
    /// A name containing `/` is refused before anything is sent.
    pub fn get(&mut self, file: &str) -> Result<u64> {
        check_plain_name("get", file)?;
        self.send(&Request::Get(file.to_owned()))?;
        let size = self.expect_success()?;
        match self.local.open_write(file) {
            Ok(mut sink) => {
                transfer(&mut self.data, &mut sink, size)?;
                Ok(size)
            }
            Err(e) => {
                transfer(&mut self.data, &mut io::sink(), size)?;
                Err(FtpError::Local(e))
            }
        }
    }

    /// Stores the local `file` on the server. Returns its size.
    ///
    /// A name containing `/` is refused before anything is sent. The
    /// payload goes out before the response is read.
    pub fn put(&mut self, file: &str) -> Result<u64> {
        check_plain_name("put", file)?;
        let (mut source, size) = self.local.open_read(file).map_err(FtpError::Local)?;
        self.send(&Request::Put {
            file: file.to_owned(),
            size,
        })?;
        transfer(&mut source, &mut self.data, size)?;
        let extra = self.expect_success()?;
        transfer(&mut self.data, &mut io::sink(), extra)?;
        Ok(size)
    }

    /// Sends `exit` and closes both channels. No response is read.
    pub fn exit(mut self) -> Result<()> {
        self.send(&Request::Exit)?;
        // Both channels close when `self` is dropped here.
        Ok(())
    }

    /// Writes one request line. A line over [`LINE_MAX`] bytes would be
    /// split by the server, so it is refused before anything is sent.
    fn send(&mut self, request: &Request) -> Result<()> {
        let line = request.encode();
        if line.len() > LINE_MAX {
            return Err(FtpError::Usage(format!(
                "request line is {} bytes, limit is {}",
                line.len(),
                LINE_MAX
            )));
        }
        debug!("Sending {:?}", request);
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Response> {
        let mut line = Vec::new();
        if read_line(&mut self.reader, &mut line)? == 0 {
            return Err(FtpError::ConnectionClosed);
        }
        Response::decode(&String::from_utf8_lossy(&line))
    }

    /// Reads the response and returns the announced payload size.
    fn expect_success(&mut self) -> Result<u64> {
        match self.receive()? {
            Response::Succ(n) => Ok(n),
            Response::Fail(msg) => Err(FtpError::Remote(msg)),
        }
    }

    /// Sends a request and collects the whole payload in memory.
    fn fetch(&mut self, request: &Request) -> Result<Vec<u8>> {
        self.send(request)?;
        let size = self.expect_success()?;
        let mut payload = Vec::new();
        transfer(&mut self.data, &mut payload, size)?;
        Ok(payload)
    }
}

fn check_plain_name(verb: &str, file: &str) -> Result<()> {
    if file.is_empty() {
        return Err(FtpError::Usage(format!("usage: {} file", verb)));
    }
    if file.contains('/') {
        return Err(FtpError::Usage(format!("{}: cannot use '/'", file)));
    }
    Ok(())
}
