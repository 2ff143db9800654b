use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    OutOfBounds,
    DoubleRelease,
    InodeTableFull,
    UserTableFull,
    NameTooLong(String),
    NotFound(String),
    InvalidSignature,
    Io(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::DoubleRelease => write!(f, "slot is already free"),
            Self::InodeTableFull => write!(f, "no free inode"),
            Self::UserTableFull => write!(f, "no free user slot"),
            Self::NameTooLong(name) => write!(f, "name too long: {name}"),
            Self::NotFound(name) => write!(f, "not found: {name}"),
            Self::InvalidSignature => write!(f, "missing superblock signature"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
