use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The OS refused to start a thread.
    ThreadCreate {
        name: String,
        code: Option<i32>,
    },
    /// A joined thread terminated by panicking.
    ThreadJoin { name: String },
    /// A non-reentrant lock was acquired twice by the thread holding it.
    DoubleLock,
    /// A singleton service was started while already running.
    SingletonViolation(&'static str),
    /// "Largest id + 1" no longer fits in a timeout id.
    TimeoutIdsExhausted,
    /// The input source reported end-of-file.
    InputEof { errno: Option<i32> },
    /// Waiting for input readiness failed.
    InputUnreadable(io::Error),
    Io(io::Error),
    Settings(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ThreadCreate { name, code } => match code {
                Some(code) => write!(f, "Unable to create thread {}: os error {}", name, code),
                None => write!(f, "Unable to create thread {}", name),
            },
            Error::ThreadJoin { name } => write!(f, "Unable to join thread {}", name),
            Error::DoubleLock => write!(f, "Lock acquired twice by the same thread"),
            Error::SingletonViolation(what) => {
                write!(f, "Attempt to run a singleton thread twice: {}", what)
            }
            Error::TimeoutIdsExhausted => write!(f, "Timeout identifiers exhausted"),
            Error::InputEof { errno } => match errno {
                Some(errno) => write!(
                    f,
                    "Unable to read from stdin: {}",
                    io::Error::from_raw_os_error(*errno)
                ),
                None => write!(f, "Unable to read from stdin: end of file"),
            },
            Error::InputUnreadable(err) => write!(f, "Unable to read from stdin: {}", err),
            Error::Io(err) => write!(f, "Terminal I/O error: {}", err),
            Error::Settings(msg) => write!(f, "Invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InputUnreadable(err) | Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
