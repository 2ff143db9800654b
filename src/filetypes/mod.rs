mod helpers;
mod raw_file;

pub use helpers::timestamp_now;

/// In-memory copy of one inode's extent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFile {
    pub(crate) data: Vec<u8>,
}
