use std::fmt::Display;
use std::io::{Read, Seek, SeekFrom, Write};

use super::*;

impl Superblock {
    /// Superblock of a freshly formatted disk
    pub fn new() -> Self {
        Self {
            magic: MAGIC_SIGNATURE,
            file_count: 0,
            user_count: 0,
            blocks_used: 0,
            first_free_byte: DATA_START,
        }
    }

    pub(crate) fn load<D: Read + Seek>(block_device: &mut D) -> Result<Self, Error> {
        block_device.seek(SeekFrom::Start(0))?;
        let mut raw = [0u8; SUPERBLOCK_SIZE as usize];
        block_device.read_exact(&mut raw)?;
        let superblock: Self = bytemuck::pod_read_unaligned(&raw);
        if superblock.magic != MAGIC_SIGNATURE {
            return Err(Error::InvalidSignature);
        }
        Ok(superblock)
    }

    pub(crate) fn flush<D: Write + Seek>(&self, block_device: &mut D) -> Result<(), Error> {
        block_device.seek(SeekFrom::Start(0))?;
        block_device.write_all(bytemuck::bytes_of(self))?;
        Ok(())
    }

    /// Point the free-space pointer right past the furthest occupied extent
    pub fn update_first_free_byte(&mut self, inodes: &[Inode]) {
        self.first_free_byte = inodes
            .iter()
            .filter(|inode| !inode.is_free())
            .map(Inode::extent_end)
            .max()
            .unwrap_or(DATA_START)
            .max(DATA_START);
    }

    pub fn first_free_byte(&self) -> u64 {
        self.first_free_byte
    }
}

impl Default for Superblock {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Superblock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Superblock:")?;
        writeln!(f, "files: {}", self.file_count)?;
        writeln!(f, "users: {}", self.user_count)?;
        writeln!(f, "blocks used: {}", self.blocks_used)?;
        write!(f, "first free byte: {}", self.first_free_byte)
    }
}
