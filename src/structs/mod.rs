mod inode;
mod superblock;
mod user;

use std::io::{Read, Seek, SeekFrom, Write};
use std::mem::size_of;

use bytemuck::{Pod, Zeroable};

use crate::Error;

pub const MAGIC_SIGNATURE: u64 = 0x5343_5241_5443_4844;

/// Bytes per data block
pub const BLOCK_SIZE: u64 = 4;
/// Stride between consecutive extents, used for both extent length and
/// the contiguity check during defragmentation
pub const EXTENT_STRIDE: u64 = BLOCK_SIZE;

pub const INODE_TABLE_SIZE: usize = 10;
pub const NB_USERS: usize = 5;
pub const FILENAME_MAX_SIZE: usize = 32;
pub const LOGIN_MAX_SIZE: usize = 32;
pub const ROOT_UID: u32 = 0;

pub const SUPERBLOCK_SIZE: u64 = size_of::<Superblock>() as u64;
pub const INODE_SIZE: u64 = size_of::<Inode>() as u64;
pub const USER_SIZE: u64 = size_of::<User>() as u64;

pub const INODES_START: u64 = SUPERBLOCK_SIZE;
pub const USERS_START: u64 = INODES_START + INODE_TABLE_SIZE as u64 * INODE_SIZE;
/// First byte of the data region, right after the user table
pub const DATA_START: u64 = USERS_START + NB_USERS as u64 * USER_SIZE;

/// Fixed-size record stored in one slot of a table
pub(crate) trait PermanentIndexed: Pod {
    /// Offset of slot 0
    const START: u64;
    /// Number of slots in the table
    const COUNT: usize;

    fn position(index: usize) -> Result<u64, Error> {
        if index >= Self::COUNT {
            return Err(Error::OutOfBounds);
        }
        Ok(Self::START + (index * size_of::<Self>()) as u64)
    }

    fn load<D: Read + Seek>(block_device: &mut D, index: usize) -> Result<Self, Error> {
        let position = Self::position(index)?;
        block_device.seek(SeekFrom::Start(position))?;
        let mut raw = vec![0u8; size_of::<Self>()];
        block_device.read_exact(&mut raw)?;
        Ok(bytemuck::pod_read_unaligned(&raw))
    }

    fn flush<D: Write + Seek>(&self, block_device: &mut D, index: usize) -> Result<(), Error> {
        let position = Self::position(index)?;
        block_device.seek(SeekFrom::Start(position))?;
        block_device.write_all(bytemuck::bytes_of(self))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Superblock {
    /// Magic signature
    pub(crate) magic: u64,
    /// Count of occupied inodes
    pub(crate) file_count: u64,
    /// Count of occupied user slots
    pub(crate) user_count: u64,
    /// Count of data blocks owned by occupied inodes
    pub(crate) blocks_used: u64,
    /// Offset of the first byte past the last extent
    pub(crate) first_free_byte: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Inode {
    /// NUL-padded file name
    pub(crate) filename: [u8; FILENAME_MAX_SIZE],
    /// Creation timestamp in seconds
    pub(crate) ctime: u64,
    /// Last data modification timestamp in seconds
    pub(crate) mtime: u64,
    /// Offset of the extent in the backing store
    pub(crate) first_byte: u64,
    /// Occupied block count
    pub(crate) block_count: u64,
    /// File size in bytes
    pub(crate) size: u64,
    /// Owner UID
    pub(crate) uid: u32,
    /// Nonzero when the slot holds a file
    pub(crate) in_use: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct User {
    /// NUL-padded login
    pub(crate) login: [u8; LOGIN_MAX_SIZE],
    /// BLAKE3 digest of the password
    pub(crate) password_hash: [u8; blake3::OUT_LEN],
    /// Nonzero when the slot holds a user
    pub(crate) in_use: u32,
}

/// Encode `name` into a NUL-padded fixed-width field
pub(crate) fn name_to_bytes<const N: usize>(name: &str) -> Result<[u8; N], Error> {
    if name.len() > N {
        return Err(Error::NameTooLong(name.to_owned()));
    }
    let mut raw = [0u8; N];
    raw[..name.len()].copy_from_slice(name.as_bytes());
    Ok(raw)
}

pub(crate) fn name_from_bytes(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
