use std::fmt::Display;

use super::*;
use crate::filetypes::timestamp_now;

impl Inode {
    pub fn new(name: &str, size: u64, uid: u32, first_byte: u64) -> Result<Self, Error> {
        let now = timestamp_now();
        Ok(Self {
            filename: name_to_bytes(name)?,
            ctime: now,
            mtime: now,
            first_byte,
            block_count: size.div_ceil(BLOCK_SIZE),
            size,
            uid,
            in_use: 1,
        })
    }

    pub fn is_free(&self) -> bool {
        self.in_use == 0
    }

    pub fn name(&self) -> String {
        name_from_bytes(&self.filename)
    }

    pub fn first_byte(&self) -> u64 {
        self.first_byte
    }

    pub fn set_first_byte(&mut self, first_byte: u64) {
        self.first_byte = first_byte;
    }

    pub fn block_count(&self) -> u64 {
        self.block_count
    }

    /// Length of the extent in bytes
    pub fn extent_len(&self) -> u64 {
        self.block_count * EXTENT_STRIDE
    }

    /// First byte past the extent
    pub fn extent_end(&self) -> u64 {
        self.first_byte + self.extent_len()
    }
}

impl PermanentIndexed for Inode {
    const START: u64 = INODES_START;
    const COUNT: usize = INODE_TABLE_SIZE;
}

impl Default for Inode {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Display for Inode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "name: {}", self.name())?;
        writeln!(f, "size: {}", self.size)?;
        writeln!(f, "owner: {}", self.uid)?;
        writeln!(
            f,
            "extent: {}..{} ({} blocks)",
            self.first_byte,
            self.extent_end(),
            self.block_count
        )?;
        writeln!(f, "created: {}", self.ctime)?;
        write!(f, "modified: {}", self.mtime)
    }
}
