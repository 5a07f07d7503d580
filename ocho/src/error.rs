//! Result and errors.
use std::fmt::{self, Display, Formatter};
use std::io;

use crate::constants::MAX_PROGRAM_SIZE;
use crate::vm::Hz;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Attempt to load a program image that can't fit in memory.
    ProgramTooLarge { size: usize },
    /// Instruction rate that the 60 Hz timer period can't divide into.
    ClockRate(Hz),
    /// The presentation surface failed to come up or tore.
    Surface(String),
    Io(io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProgramTooLarge { size } => write!(
                f,
                "program image of {size} bytes exceeds the {MAX_PROGRAM_SIZE} bytes of memory above the reserved space"
            ),
            Self::ClockRate(hz) => write!(
                f,
                "clock frequency {hz:?} is not a positive multiple of 60"
            ),
            Self::Surface(msg) => write!(f, "presentation surface error: {msg}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
