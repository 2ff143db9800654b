use std::io::{Read, Seek, Write};

use log::debug;

use super::Disk;
use crate::structs::{PermanentIndexed, Superblock};
use crate::Error;

/// Load every slot of `table` in ascending order, stopping at the first failure
fn load_table<T: PermanentIndexed, D: Read + Seek>(
    block_device: &mut D,
    table: &mut [T],
) -> Result<(), Error> {
    for (index, record) in table.iter_mut().enumerate() {
        *record = T::load(block_device, index)?;
    }
    Ok(())
}

/// Flush every slot of `table` in ascending order, stopping at the first failure
fn flush_table<T: PermanentIndexed, D: Write + Seek>(
    block_device: &mut D,
    table: &[T],
) -> Result<(), Error> {
    for (index, record) in table.iter().enumerate() {
        record.flush(block_device, index)?;
    }
    Ok(())
}

impl Disk {
    pub(crate) fn read_superblock(&mut self) -> Result<(), Error> {
        debug!("Reading superblock");
        self.superblock = Superblock::load(&mut self.device)?;
        Ok(())
    }

    pub(crate) fn read_inode_table(&mut self) -> Result<(), Error> {
        debug!("Reading inode table");
        load_table(&mut self.device, &mut self.inodes)
    }

    pub(crate) fn read_user_table(&mut self) -> Result<(), Error> {
        debug!("Reading user table");
        load_table(&mut self.device, &mut self.users)
    }

    pub(crate) fn write_superblock(&mut self) -> Result<(), Error> {
        debug!("Writing superblock");
        self.superblock.flush(&mut self.device)
    }

    pub(crate) fn write_inode_table(&mut self) -> Result<(), Error> {
        debug!("Writing inode table");
        flush_table(&mut self.device, &self.inodes)
    }

    pub(crate) fn write_user_table(&mut self) -> Result<(), Error> {
        debug!("Writing user table");
        flush_table(&mut self.device, &self.users)
    }
}
