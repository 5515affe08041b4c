use std::fmt;
use std::io::{self, BufRead, Read};

use crate::{FtpError, Result};

/// Longest control line, terminator included.
pub const LINE_MAX: usize = 1024;

/// Request sent from client to server on the control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Restate the text on the data channel.
    Echo(Option<String>),
    /// List a remote directory, `.` when absent.
    Rls(Option<String>),
    /// Change the remote working directory.
    Rcd(String),
    /// Print the remote working directory.
    Rpwd,
    /// Fetch a remote file.
    Get(String),
    /// Store a file; `size` bytes follow on the data channel.
    Put {
        /// Name of the file to write on the server.
        file: String,
        /// Number of bytes the client is about to send.
        size: u64,
    },
    /// End the session.
    Exit,
}

/// Why a request line could not be turned into a [`Request`].
///
/// The `Display` text is what the server puts after `fail: `.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// A known verb with missing or bad arguments.
    Usage(&'static str),
    /// A verb the server does not know.
    UnknownVerb(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Usage(usage) => write!(f, "usage: {}", usage),
            RequestError::UnknownVerb(_) => f.write_str("command not found"),
        }
    }
}

/// Splits a line into its verb and the rest of the line.
///
/// The line terminator is dropped and leading whitespace skipped. The
/// argument is everything after the first space, so paths and echoed
/// text may contain spaces. An empty argument is reported as `None`.
/// Returns `None` for a blank line.
pub fn split_line(line: &str) -> Option<(&str, Option<&str>)> {
    let line = line.trim_end_matches(['\r', '\n']).trim_start();
    if line.is_empty() {
        return None;
    }
    match line.split_once(' ') {
        Some((verb, rest)) if !rest.trim().is_empty() => Some((verb, Some(rest))),
        Some((verb, _)) => Some((verb, None)),
        None => Some((line, None)),
    }
}

impl Request {
    /// Decodes one control line.
    ///
    /// `Ok(None)` means the line held no verb and should be ignored.
    pub fn decode(line: &str) -> std::result::Result<Option<Request>, RequestError> {
        let (verb, arg) = match split_line(line) {
            Some(parts) => parts,
            None => return Ok(None),
        };
        let arg = arg.map(str::to_owned);
        let request = match verb {
            "echo" => Request::Echo(arg),
            "rls" => Request::Rls(arg),
            "rcd" => Request::Rcd(arg.ok_or(RequestError::Usage("rcd dir"))?),
            "rpwd" => Request::Rpwd,
            "get" => Request::Get(arg.ok_or(RequestError::Usage("get file"))?),
            "put" => {
                let usage = RequestError::Usage("put file size");
                let arg = arg.ok_or_else(|| usage.clone())?;
                let (file, size) = arg.rsplit_once(' ').ok_or_else(|| usage.clone())?;
                let size = size.trim().parse::<u64>().map_err(|_| usage.clone())?;
                if file.is_empty() {
                    return Err(usage);
                }
                Request::Put {
                    file: file.to_owned(),
                    size,
                }
            }
            "exit" => Request::Exit,
            other => return Err(RequestError::UnknownVerb(other.to_owned())),
        };
        Ok(Some(request))
    }

    /// Encodes the request as one newline-terminated line.
    pub fn encode(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Echo(None) => f.write_str("echo"),
            Request::Echo(Some(text)) => write!(f, "echo {}", text),
            Request::Rls(dir) => write!(f, "rls {}", dir.as_deref().unwrap_or(".")),
            Request::Rcd(dir) => write!(f, "rcd {}", dir),
            Request::Rpwd => f.write_str("rpwd"),
            Request::Get(file) => write!(f, "get {}", file),
            Request::Put { file, size } => write!(f, "put {} {}", file, size),
            Request::Exit => f.write_str("exit"),
        }
    }
}

/// Response sent from server to client on the control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Success; this many payload bytes follow on the data channel.
    Succ(u64),
    /// Failure with a human-readable message; no payload follows.
    Fail(String),
}

impl Response {
    /// Encodes the response as one newline-terminated line.
    pub fn encode(&self) -> String {
        match self {
            Response::Succ(n) => format!("succ: {}\n", n),
            Response::Fail(msg) => format!("fail: {}\n", msg),
        }
    }

    /// Decodes a response line, splitting on the first space.
    pub fn decode(line: &str) -> Result<Response> {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        let (status, value) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
        match status {
            "succ:" => value
                .trim()
                .parse()
                .map(Response::Succ)
                .map_err(|_| FtpError::MalformedResponse(line.to_owned())),
            "fail:" => Ok(Response::Fail(value.to_owned())),
            _ => Err(FtpError::MalformedResponse(line.to_owned())),
        }
    }
}

/// Reads one control line of at most [`LINE_MAX`] bytes into `buf`.
///
/// Anything past the limit is left in the reader and comes back as the
/// next line. Returns 0 at end of input.
pub fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<usize> {
    buf.clear();
    reader.by_ref().take(LINE_MAX as u64).read_until(b'\n', buf)
}
