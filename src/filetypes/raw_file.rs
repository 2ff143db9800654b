use std::io::{Read, Seek, SeekFrom, Write};

use log::debug;

use super::RawFile;
use crate::{structs::Inode, Error};

impl RawFile {
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Read the whole extent of `inode` into the buffer
    pub fn read<D: Read + Seek>(
        &mut self,
        block_device: &mut D,
        inode: &Inode,
    ) -> Result<(), Error> {
        debug!(
            "Read extent {}..{}",
            inode.first_byte(),
            inode.extent_end()
        );
        self.data = vec![0; inode.extent_len() as usize];
        block_device.seek(SeekFrom::Start(inode.first_byte()))?;
        block_device.read_exact(&mut self.data)?;
        Ok(())
    }

    /// Write the buffer starting at the first byte of `inode`,
    /// zero-filling the rest of its extent
    pub fn write<D: Write + Seek>(&self, block_device: &mut D, inode: &Inode) -> Result<(), Error> {
        let extent_len = inode.extent_len() as usize;
        if self.data.len() > extent_len {
            return Err(Error::OutOfBounds);
        }
        debug!(
            "Write extent {}..{}",
            inode.first_byte(),
            inode.extent_end()
        );
        block_device.seek(SeekFrom::Start(inode.first_byte()))?;
        block_device.write_all(&self.data)?;
        block_device.write_all(&vec![0; extent_len - self.data.len()])?;
        Ok(())
    }

    /// Zero the extent at the current location of `inode`
    pub fn erase_from_disk<D: Write + Seek>(
        block_device: &mut D,
        inode: &Inode,
    ) -> Result<(), Error> {
        debug!(
            "Erase extent {}..{}",
            inode.first_byte(),
            inode.extent_end()
        );
        Self::erase_range(block_device, inode.first_byte(), inode.extent_end())
    }

    /// Zero the bytes in `start..end`
    pub fn erase_range<D: Write + Seek>(
        block_device: &mut D,
        start: u64,
        end: u64,
    ) -> Result<(), Error> {
        if end <= start {
            return Ok(());
        }
        block_device.seek(SeekFrom::Start(start))?;
        block_device.write_all(&vec![0; (end - start) as usize])?;
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
