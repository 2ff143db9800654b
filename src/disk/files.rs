use std::path::Path;

use log::{debug, info, warn};

use super::Disk;
use crate::filetypes::{timestamp_now, RawFile};
use crate::structs::{Inode, User};
use crate::Error;

impl Disk {
    /// Slot of the occupied inode named `name`
    pub fn find_file(&self, name: &str) -> Option<usize> {
        self.inodes
            .iter()
            .position(|inode| !inode.is_free() && inode.name() == name)
    }

    /// Allocate the first free inode for a file of `size` bytes, placing its
    /// extent at the superblock's first free byte
    pub fn init_inode(&mut self, name: &str, size: u64, uid: u32) -> Result<usize, Error> {
        let index = self
            .inodes
            .iter()
            .position(Inode::is_free)
            .ok_or(Error::InodeTableFull)?;
        let inode = Inode::new(name, size, uid, self.superblock.first_free_byte)?;
        debug!("Acquire inode {index} at byte {}", inode.first_byte());
        self.superblock.file_count += 1;
        self.superblock.blocks_used += inode.block_count();
        self.superblock.first_free_byte = inode.extent_end();
        self.inodes[index] = inode;
        Ok(index)
    }

    /// Release inode at index, zeroing its extent and leaving a hole
    pub fn delete_inode(&mut self, index: usize) -> Result<(), Error> {
        let inode = self.inodes.get(index).ok_or(Error::OutOfBounds)?;
        if inode.is_free() {
            return Err(Error::DoubleRelease);
        }
        debug!("Release inode {index}");
        RawFile::erase_from_disk(&mut self.device, &self.inodes[index])?;
        self.superblock.file_count -= 1;
        self.superblock.blocks_used -= self.inodes[index].block_count();
        self.inodes[index] = Inode::default();
        self.superblock.update_first_free_byte(&self.inodes);
        Ok(())
    }

    /// Create `name` or replace its content. Content that fits the existing
    /// extent is written in place, anything larger is moved to the tail.
    pub fn write_file(&mut self, name: &str, data: &[u8], uid: u32) -> Result<usize, Error> {
        let size = data.len() as u64;
        let index = match self.find_file(name) {
            Some(index) if size <= self.inodes[index].extent_len() => {
                debug!("Overwriting {name} in place");
                let inode = &mut self.inodes[index];
                inode.size = size;
                inode.mtime = timestamp_now();
                index
            }
            Some(index) => {
                debug!("Moving {name} to the end of the data region");
                let ctime = self.inodes[index].ctime;
                self.delete_inode(index)?;
                let index = self.init_inode(name, size, uid)?;
                self.inodes[index].ctime = ctime;
                index
            }
            None => self.init_inode(name, size, uid)?,
        };
        RawFile::from_bytes(data).write(&mut self.device, &self.inodes[index])?;
        Ok(index)
    }

    pub fn read_file(&mut self, name: &str) -> Result<Vec<u8>, Error> {
        let index = self
            .find_file(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        let mut file = RawFile::default();
        file.read(&mut self.device, &self.inodes[index])?;
        let mut data = file.into_bytes();
        data.truncate(self.inodes[index].size as usize);
        Ok(data)
    }

    pub fn delete_file(&mut self, name: &str) -> Result<(), Error> {
        let index = self
            .find_file(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        self.delete_inode(index)
    }

    /// Copy a host file into the disk under its file name
    pub fn load_file_from_host<P: AsRef<Path>>(
        &mut self,
        path: P,
        uid: u32,
    ) -> Result<usize, Error> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::NotFound(path.display().to_string()))?;
        let data = std::fs::read(path)?;
        info!("Loading {} bytes from {}", data.len(), path.display());
        self.write_file(&name, &data, uid)
    }

    /// Copy `name` out of the disk into a host file at `path`
    pub fn store_file_to_host<P: AsRef<Path>>(&mut self, name: &str, path: P) -> Result<(), Error> {
        let data = self.read_file(name)?;
        info!("Storing {name} to {}", path.as_ref().display());
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn find_user(&self, login: &str) -> Option<usize> {
        self.users
            .iter()
            .position(|user| !user.is_free() && user.login() == login)
    }

    pub fn add_user(&mut self, login: &str, password: &str) -> Result<usize, Error> {
        if self.find_user(login).is_some() {
            warn!("User {login} already exists");
        }
        let index = self
            .users
            .iter()
            .position(User::is_free)
            .ok_or(Error::UserTableFull)?;
        self.users[index] = User::new(login, password)?;
        self.superblock.user_count += 1;
        debug!("Acquire user {index}");
        Ok(index)
    }

    pub fn delete_user(&mut self, index: usize) -> Result<(), Error> {
        let user = self.users.get(index).ok_or(Error::OutOfBounds)?;
        if user.is_free() {
            return Err(Error::DoubleRelease);
        }
        debug!("Release user {index}");
        self.users[index] = User::default();
        self.superblock.user_count -= 1;
        Ok(())
    }
}
