use std::io::{BufRead, Write};

use log::debug;

use crate::client::FtpClient;
use crate::common::split_line;
use crate::workdir::os_bytes;
use crate::{FtpError, Result};

const PROMPT: &str = "mftp> ";

/// Reads operator commands and drives an [`FtpClient`].
///
/// Remote payloads go to `out`; diagnostics go to `err`.
pub struct Shell<O: Write, E: Write> {
    client: FtpClient,
    out: O,
    err: E,
}

impl<O: Write, E: Write> Shell<O, E> {
    /// Creates a shell around a connected client.
    pub fn new(client: FtpClient, out: O, err: E) -> Self {
        Self { client, out, err }
    }

    /// Runs until `exit`, end of input, or a fatal session error.
    ///
    /// End of input behaves like `exit`. Non-fatal errors are reported to
    /// the operator and the loop continues.
    pub fn run<I: BufRead>(mut self, mut input: I) -> Result<()> {
        let mut line = String::new();
        loop {
            write!(self.out, "{}", PROMPT)?;
            self.out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let (verb, arg) = match split_line(&line) {
                Some(parts) => parts,
                None => continue,
            };
            if verb == "exit" {
                break;
            }
            debug!("Operator command {:?} {:?}", verb, arg);

            if let Err(e) = self.dispatch(verb, arg) {
                if e.is_fatal() {
                    return Err(e);
                }
                match arg {
                    Some(arg) if matches!(e, FtpError::Remote(_) | FtpError::Local(_)) => {
                        writeln!(self.err, "{}: {}: {}", verb, arg, e)?
                    }
                    _ => writeln!(self.err, "{}: {}", verb, e)?,
                }
            }
        }

        self.out.flush()?;
        self.client.exit()
    }

    fn dispatch(&mut self, verb: &str, arg: Option<&str>) -> Result<()> {
        match verb {
            "echo" => {
                let payload = self.client.echo(arg)?;
                self.out.write_all(&payload)?;
            }
            "rls" => {
                let payload = self.client.rls(arg)?;
                self.out.write_all(&payload)?;
            }
            "rcd" => self.client.rcd(arg.unwrap_or_default())?,
            "rpwd" => {
                let payload = self.client.rpwd()?;
                self.out.write_all(&payload)?;
            }
            "get" => {
                self.client.get(arg.unwrap_or_default())?;
            }
            "put" => {
                self.client.put(arg.unwrap_or_default())?;
            }
            "lls" => {
                let names = self
                    .client
                    .local()
                    .list(arg.unwrap_or("."))
                    .map_err(FtpError::Local)?;
                for name in names {
                    self.out.write_all(&os_bytes(&name))?;
                    self.out.write_all(b"\n")?;
                }
            }
            "lcd" => {
                let dir = arg.ok_or_else(|| FtpError::Usage("usage: lcd dir".to_owned()))?;
                self.client
                    .local_mut()
                    .change(dir)
                    .map_err(FtpError::Local)?;
            }
            "lpwd" => {
                let current = self.client.local().current();
                self.out.write_all(&os_bytes(current.as_os_str()))?;
                self.out.write_all(b"\n")?;
            }
            other => writeln!(self.err, "{}: command not found", other)?,
        }
        Ok(())
    }
}
