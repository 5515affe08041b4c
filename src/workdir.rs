use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// A working directory carried explicitly by one session.
///
/// Threads share the process-wide working directory, so every filesystem
/// call a session makes is resolved against this value instead. Cloning it
/// gives an independent copy; changing one never affects another.
#[derive(Debug, Clone)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Starts at `path`, which must name an existing directory.
    pub fn new(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = fs::canonicalize(path.into())?;
        if !path.is_dir() {
            return Err(not_a_directory());
        }
        Ok(WorkDir { path })
    }

    /// Starts at the process working directory.
    pub fn current_process() -> io::Result<Self> {
        Self::new(std::env::current_dir()?)
    }

    /// The current directory.
    pub fn current(&self) -> &Path {
        &self.path
    }

    /// Resolves `name` against the current directory.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Changes directory. On error the current directory is unchanged.
    ///
    /// Like `chdir`, this needs search permission on the target itself.
    pub fn change(&mut self, dir: &str) -> io::Result<()> {
        let target = fs::canonicalize(self.resolve(dir))?;
        if !fs::metadata(&target)?.is_dir() {
            return Err(not_a_directory());
        }
        fs::metadata(target.join("."))?;
        self.path = target;
        Ok(())
    }

    /// Names in `dir`, sorted bytewise. `.` and `..` are not included.
    ///
    /// Names are returned as the OS gives them. Requests are text, so a
    /// name that is not valid UTF-8 can be listed but not fetched.
    pub fn list(&self, dir: &str) -> io::Result<Vec<OsString>> {
        let mut names = fs::read_dir(self.resolve(dir))?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    /// Opens a regular file for reading and returns it with its size.
    pub fn open_read(&self, name: &str) -> io::Result<(File, u64)> {
        let file = File::open(self.resolve(name))?;
        let meta = file.metadata()?;
        if meta.is_dir() {
            return Err(io::Error::new(io::ErrorKind::Other, "Is a directory"));
        }
        Ok((file, meta.len()))
    }

    /// Creates or truncates a file for writing.
    pub fn open_write(&self, name: &str) -> io::Result<File> {
        File::create(self.resolve(name))
    }
}

/// The raw bytes of a name or path, for writing to a channel.
#[cfg(unix)]
pub(crate) fn os_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(s.as_bytes())
}

#[cfg(not(unix))]
pub(crate) fn os_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    match s.to_string_lossy() {
        Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
        Cow::Owned(text) => Cow::Owned(text.into_bytes()),
    }
}

fn not_a_directory() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "Not a directory")
}
