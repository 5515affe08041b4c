use std::io::{self, Read, Write};

use log::debug;

use crate::common::{Request, Response};
use crate::error::os_message;
use crate::transfer::transfer;
use crate::workdir::{os_bytes, WorkDir};
use crate::Result;

/// What the session loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Exit,
}

/// Carries out one request on behalf of a session.
///
/// `Ok` covers both `succ:` and `fail:` outcomes. An `Err` means a channel
/// broke and the session must end.
pub(crate) fn execute<C, D>(
    request: Request,
    dir: &mut WorkDir,
    control: &mut C,
    data: &mut D,
) -> Result<Flow>
where
    C: Write + ?Sized,
    D: Read + Write + ?Sized,
{
    match request {
        Request::Echo(text) => {
            let payload = format!("{}\n", text.unwrap_or_default());
            send_payload(control, data, payload.as_bytes())?;
        }
        Request::Rls(target) => match dir.list(target.as_deref().unwrap_or(".")) {
            Ok(names) => {
                let mut payload = Vec::new();
                for name in &names {
                    payload.extend_from_slice(&os_bytes(name));
                    payload.push(b'\n');
                }
                send_payload(control, data, &payload)?;
            }
            Err(e) => respond(control, &fail(&e))?,
        },
        Request::Rcd(target) => match dir.change(&target) {
            Ok(()) => {
                debug!("Session directory is now {}", dir.current().display());
                respond(control, &Response::Succ(0))?;
            }
            Err(e) => respond(control, &fail(&e))?,
        },
        Request::Rpwd => {
            let mut payload = os_bytes(dir.current().as_os_str()).into_owned();
            payload.push(b'\n');
            send_payload(control, data, &payload)?;
        }
        Request::Get(file) => match dir.open_read(&file) {
            Ok((mut source, size)) => {
                respond(control, &Response::Succ(size))?;
                transfer(&mut source, data, size)?;
            }
            Err(e) => respond(control, &fail(&e))?,
        },
        Request::Put { file, size } => match dir.open_write(&file) {
            Ok(mut sink) => {
                transfer(data, &mut sink, size)?;
                respond(control, &Response::Succ(0))?;
            }
            Err(e) => {
                // The client has already sent the payload.
                transfer(data, &mut io::sink(), size)?;
                respond(control, &fail(&e))?;
            }
        },
        Request::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

/// Writes one response line and flushes it.
pub(crate) fn respond<C: Write + ?Sized>(control: &mut C, response: &Response) -> Result<()> {
    control.write_all(response.encode().as_bytes())?;
    control.flush()?;
    Ok(())
}

fn send_payload<C, D>(control: &mut C, data: &mut D, payload: &[u8]) -> Result<()>
where
    C: Write + ?Sized,
    D: Write + ?Sized,
{
    respond(control, &Response::Succ(payload.len() as u64))?;
    data.write_all(payload)?;
    data.flush()?;
    Ok(())
}

fn fail(err: &io::Error) -> Response {
    Response::Fail(os_message(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run(request: &str, dir: &mut WorkDir, data_in: &[u8]) -> (Flow, String, Vec<u8>) {
        let request = Request::decode(request).unwrap().unwrap();
        let mut control = Vec::new();
        let mut data = Cursor::new(data_in.to_vec());
        let flow = execute(request, dir, &mut control, &mut data).unwrap();
        let pos = data.position() as usize;
        let written = data.into_inner();
        // Whatever was written lands after the consumed input.
        let out = if pos > data_in.len() {
            written[data_in.len()..].to_vec()
        } else {
            Vec::new()
        };
        (flow, String::from_utf8(control).unwrap(), out)
    }

    fn setup() -> (TempDir, WorkDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = WorkDir::new(temp_dir.path()).unwrap();
        (temp_dir, dir)
    }

    #[test]
    fn echo_restates_text() {
        let (_tmp, mut dir) = setup();
        let (flow, control, data) = run("echo hello world\n", &mut dir, b"");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(control, "succ: 12\n");
        assert_eq!(data, b"hello world\n");
    }

    #[test]
    fn bare_echo_is_one_newline() {
        let (_tmp, mut dir) = setup();
        let (_, control, data) = run("echo\n", &mut dir, b"");
        assert_eq!(control, "succ: 1\n");
        assert_eq!(data, b"\n");
    }

    #[test]
    fn rls_counts_bytes_not_entries() {
        let (tmp, mut dir) = setup();
        fs::write(tmp.path().join("a"), "").unwrap();
        fs::write(tmp.path().join("b"), "").unwrap();
        let (_, control, data) = run("rls .\n", &mut dir, b"");
        assert_eq!(control, "succ: 4\n");
        assert_eq!(data, b"a\nb\n");

        let (_, control, _) = run("rls nowhere\n", &mut dir, b"");
        assert!(control.starts_with("fail: "));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn rls_sends_raw_name_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (tmp, mut dir) = setup();
        fs::write(tmp.path().join(OsStr::from_bytes(b"caf\xe9")), "").unwrap();
        let (_, control, data) = run("rls\n", &mut dir, b"");
        assert_eq!(control, "succ: 5\n");
        assert_eq!(data, b"caf\xe9\n");
    }

    #[test]
    fn rcd_then_rpwd() {
        let (tmp, mut dir) = setup();
        fs::create_dir(tmp.path().join("inner")).unwrap();
        let (_, control, data) = run("rcd inner\n", &mut dir, b"");
        assert_eq!(control, "succ: 0\n");
        assert!(data.is_empty());

        let expected = format!(
            "{}\n",
            fs::canonicalize(tmp.path().join("inner")).unwrap().display()
        );
        let (_, control, data) = run("rpwd\n", &mut dir, b"");
        assert_eq!(control, format!("succ: {}\n", expected.len()));
        assert_eq!(data, expected.as_bytes());
    }

    #[test]
    fn rcd_missing_fails_and_stays() {
        let (_tmp, mut dir) = setup();
        let before = dir.current().to_path_buf();
        let (_, control, _) = run("rcd missing\n", &mut dir, b"");
        assert!(control.starts_with("fail: "));
        assert!(!control.contains("os error"));
        assert_eq!(dir.current(), before);
    }

    #[test]
    fn get_sends_file_bytes() {
        let (tmp, mut dir) = setup();
        fs::write(tmp.path().join("f.txt"), b"file contents").unwrap();
        let (_, control, data) = run("get f.txt\n", &mut dir, b"");
        assert_eq!(control, "succ: 13\n");
        assert_eq!(data, b"file contents");

        let (_, control, data) = run("get absent\n", &mut dir, b"");
        assert!(control.starts_with("fail: "));
        assert!(data.is_empty());
    }

    #[test]
    fn get_directory_fails() {
        let (tmp, mut dir) = setup();
        fs::create_dir(tmp.path().join("d")).unwrap();
        let (_, control, _) = run("get d\n", &mut dir, b"");
        assert_eq!(control, "fail: Is a directory\n");
    }

    #[test]
    fn put_consumes_exactly_size() {
        let (tmp, mut dir) = setup();
        let mut control = Vec::new();
        let mut data = Cursor::new(b"12345trailing".to_vec());
        let request = Request::decode("put out.bin 5\n").unwrap().unwrap();
        execute(request, &mut dir, &mut control, &mut data).unwrap();

        assert_eq!(control, b"succ: 0\n");
        assert_eq!(data.position(), 5);
        assert_eq!(fs::read(tmp.path().join("out.bin")).unwrap(), b"12345");
    }

    #[test]
    fn put_into_missing_directory_drains_payload() {
        let (_tmp, mut dir) = setup();
        let mut control = Vec::new();
        let mut data = Cursor::new(b"abcdnext".to_vec());
        let request = Request::decode("put no/such/dir 4\n").unwrap().unwrap();
        execute(request, &mut dir, &mut control, &mut data).unwrap();

        assert!(String::from_utf8(control).unwrap().starts_with("fail: "));
        assert_eq!(data.position(), 4);
    }

    #[test]
    fn put_short_payload_is_fatal() {
        let (_tmp, mut dir) = setup();
        let mut control = Vec::new();
        let mut data = Cursor::new(b"ab".to_vec());
        let request = Request::decode("put x 10\n").unwrap().unwrap();
        assert!(execute(request, &mut dir, &mut control, &mut data).is_err());
        assert!(control.is_empty());
    }

    #[test]
    fn exit_writes_nothing() {
        let (_tmp, mut dir) = setup();
        let (flow, control, data) = run("exit\n", &mut dir, b"");
        assert_eq!(flow, Flow::Exit);
        assert!(control.is_empty());
        assert!(data.is_empty());
    }
}
