use std::io::{ErrorKind, Read, Write};

use crate::{FtpError, Result};

/// Size of the intermediate buffer. Only affects efficiency.
pub const BUFFER_SIZE: usize = 8192;

/// Copies exactly `n` bytes from `source` to `sink`.
///
/// Never reads past the `n`th byte, so the source can be the live data
/// channel of a session. If the source runs dry first the two ends are out
/// of sync and [`FtpError::ShortTransfer`] is returned.
pub fn transfer<R, W>(source: &mut R, sink: &mut W, n: u64) -> Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = [0u8; BUFFER_SIZE];
    let mut remaining = n;

    while remaining > 0 {
        let want = remaining.min(BUFFER_SIZE as u64) as usize;
        let got = match source.read(&mut buf[..want]) {
            Ok(0) => {
                return Err(FtpError::ShortTransfer {
                    expected: n,
                    actual: n - remaining,
                })
            }
            Ok(got) => got,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        sink.write_all(&buf[..got])?;
        remaining -= got as u64;
    }

    sink.flush()?;
    Ok(())
}
