use std::ffi::OsString;
use std::fmt::{Debug, Display};
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, error, info};

use crate::structs::*;
use crate::Error;

mod defrag;
mod files;
mod tables;

pub trait BlockDevice: Read + Write + Seek + Debug {}

impl BlockDevice for std::fs::File {}

/// Name of the backing store appended to the disk's path prefix
pub const STORE_NAME: &str = "d0";

/// On-disk region written by [`Disk::save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Superblock,
    InodeTable,
    UserTable,
}

/// Outcome of [`Disk::save`]. Regions after the failed one are not written.
#[derive(Debug)]
pub enum SaveStatus {
    Saved,
    Partial { failed: Region, error: Error },
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

#[derive(Debug)]
pub struct Disk {
    pub(crate) superblock: Superblock,
    pub(crate) inodes: [Inode; INODE_TABLE_SIZE],
    pub(crate) users: [User; NB_USERS],
    pub(crate) device: Box<dyn BlockDevice>,
}

impl Disk {
    /// Open (or create) the backing store at `prefix` + [`STORE_NAME`]
    pub fn open<P: AsRef<Path>>(prefix: P) -> Result<Self, Error> {
        let mut path = OsString::from(prefix.as_ref());
        path.push(STORE_NAME);
        debug!("Opening backing store {path:?}");
        let device = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        Self::load(Box::new(device))
    }

    /// Load tables from a block device. An empty device keeps the defaults
    /// and is formatted with them right away.
    pub(crate) fn load(device: Box<dyn BlockDevice>) -> Result<Self, Error> {
        let mut disk = Self {
            superblock: Superblock::new(),
            inodes: [Inode::default(); INODE_TABLE_SIZE],
            users: [User::default(); NB_USERS],
            device,
        };
        if disk.device.seek(SeekFrom::End(0))? == 0 {
            info!("Disk is empty, formatting");
            disk.write_regions().map_err(|(_, error)| error)?;
            return Ok(disk);
        }
        disk.read_superblock()?;
        disk.read_inode_table()?;
        disk.read_user_table()?;
        info!(
            "Loaded disk with {} files and {} users",
            disk.superblock.file_count, disk.superblock.user_count
        );
        Ok(disk)
    }

    /// Write superblock, inode table and user table, in that order.
    /// Failures are logged and reported, never raised.
    pub fn save(&mut self) -> SaveStatus {
        info!("Saving disk");
        match self.write_regions() {
            Ok(()) => SaveStatus::Saved,
            Err((failed, error)) => {
                error!("Saving {failed:?} failed: {error}");
                SaveStatus::Partial { failed, error }
            }
        }
    }

    fn write_regions(&mut self) -> Result<(), (Region, Error)> {
        self.write_superblock()
            .map_err(|e| (Region::Superblock, e))?;
        self.write_inode_table()
            .map_err(|e| (Region::InodeTable, e))?;
        self.write_user_table()
            .and_then(|_| self.device.flush().map_err(Error::from))
            .map_err(|e| (Region::UserTable, e))?;
        Ok(())
    }

    /// Inode in slot `id`. Panics if `id` is not below [`INODE_TABLE_SIZE`].
    pub fn get_inode(&self, id: usize) -> &Inode {
        &self.inodes[id]
    }

    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn inodes(&self) -> &[Inode] {
        &self.inodes
    }
}

impl Display for Disk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.superblock)?;
        writeln!(f, "Inode table:")?;
        for (index, inode) in self.inodes.iter().enumerate() {
            if !inode.is_free() {
                writeln!(f, "inode {index}:\n{inode}")?;
            }
        }
        writeln!(f, "User table:")?;
        for (index, user) in self.users.iter().enumerate() {
            if !user.is_free() {
                writeln!(f, "user {index}:\n{user}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind, Read, Seek, SeekFrom, Write};

    use super::{BlockDevice, Disk, Region, SaveStatus};
    use crate::structs::*;

    impl BlockDevice for Cursor<Vec<u8>> {}

    /// Device accepting only `budget` written bytes
    #[derive(Debug)]
    pub(crate) struct FailingDevice {
        inner: Cursor<Vec<u8>>,
        budget: usize,
    }

    impl FailingDevice {
        pub(crate) fn new(budget: usize) -> Self {
            Self {
                inner: Cursor::new(Vec::new()),
                budget,
            }
        }
    }

    impl Read for FailingDevice {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Write for FailingDevice {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if buf.len() > self.budget {
                return Err(std::io::Error::new(ErrorKind::Other, "device full"));
            }
            self.budget -= buf.len();
            self.inner.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Seek for FailingDevice {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    impl BlockDevice for FailingDevice {}

    pub(crate) fn empty_disk() -> Disk {
        Disk::load(Box::new(Cursor::new(Vec::new()))).unwrap()
    }

    /// Default tables over `device`, nothing written yet
    pub(crate) fn unformatted_disk(device: Box<dyn BlockDevice>) -> Disk {
        Disk {
            superblock: Superblock::new(),
            inodes: [Inode::default(); INODE_TABLE_SIZE],
            users: [User::default(); NB_USERS],
            device,
        }
    }

    fn store_len(disk: &mut Disk) -> u64 {
        disk.device.seek(SeekFrom::End(0)).unwrap()
    }

    #[test]
    fn empty_store_keeps_defaults() {
        let mut disk = empty_disk();
        assert_eq![store_len(&mut disk), DATA_START];
        assert![disk.inodes().iter().all(Inode::is_free)];
        assert![disk.users().iter().all(User::is_free)];
        assert_eq![disk.inodes().len(), INODE_TABLE_SIZE];
        assert_eq![disk.users().len(), NB_USERS];
        assert_eq![disk.superblock().first_free_byte(), DATA_START];
    }

    #[test]
    fn save_and_load() {
        let mut disk = empty_disk();
        disk.inodes[0] = Inode::new("a.txt", 10, ROOT_UID, DATA_START).unwrap();
        disk.inodes[3] = Inode::new("b.txt", 7, 1, DATA_START + 12).unwrap();
        disk.users[1] = User::new("michel", "bonjour").unwrap();
        disk.superblock.file_count = 2;
        disk.superblock.user_count = 1;
        assert![disk.save().is_saved()];

        let dev = disk.device;
        let disk = Disk::load(dev).unwrap();
        assert_eq![disk.superblock().file_count, 2];
        assert_eq![disk.superblock().user_count, 1];
        for (index, inode) in disk.inodes().iter().enumerate() {
            assert_eq![inode.is_free(), index != 0 && index != 3];
        }
        assert_eq![disk.get_inode(0).first_byte(), DATA_START];
        assert_eq![disk.get_inode(0).block_count(), 3];
        assert_eq![disk.get_inode(3).first_byte(), DATA_START + 12];
        assert_eq![disk.get_inode(3).block_count(), 2];
        assert_eq![disk.get_inode(3).name(), "b.txt"];
        assert![!disk.users()[1].is_free()];
        assert![disk.users()[1].password_matches("bonjour")];
        assert![disk.users()[0].is_free()];
    }

    #[test]
    fn reopen_after_unsaved_write() {
        let mut disk = empty_disk();
        disk.write_file("a", b"hello", ROOT_UID).unwrap();
        let dev = disk.device;
        let mut disk = Disk::load(dev).unwrap();
        assert![disk.inodes().iter().all(Inode::is_free)];
        assert_eq![disk.superblock().file_count, 0];
        assert![store_len(&mut disk) >= DATA_START];
    }

    #[test]
    fn open_with_path_prefix() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path();
        let prefix = format!("{}/", dir.display());
        let mut disk = Disk::open(&prefix).unwrap();
        assert![disk.inodes().iter().all(Inode::is_free)];
        disk.add_user("root", "bonjour").unwrap();
        assert![disk.save().is_saved()];
        drop(disk);

        assert![dir.join("d0").exists()];
        let disk = Disk::open(&prefix).unwrap();
        assert_eq![disk.find_user("root"), Some(0)];
    }

    #[test]
    fn open_formats_new_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let prefix = format!("{}/", dir.path().display());
        drop(Disk::open(&prefix).unwrap());
        let store = dir.path().join("d0");
        assert_eq![std::fs::metadata(&store).unwrap().len(), DATA_START];
        let disk = Disk::open(&prefix).unwrap();
        assert_eq![disk.superblock().first_free_byte(), DATA_START];
    }

    #[test]
    fn load_rejects_foreign_store() {
        let dev = Cursor::new(vec![0xAAu8; DATA_START as usize]);
        assert![Disk::load(Box::new(dev)).is_err()];
    }

    #[test]
    fn load_truncated_store() {
        let mut dev = Cursor::new(Vec::new());
        Superblock::new().flush(&mut dev).unwrap();
        assert![Disk::load(Box::new(dev)).is_err()];
    }

    #[test]
    fn partial_save_reports_region() {
        let dev = FailingDevice::new(SUPERBLOCK_SIZE as usize + INODE_SIZE as usize);
        let mut disk = unformatted_disk(Box::new(dev));
        match disk.save() {
            SaveStatus::Partial { failed, .. } => assert_eq![failed, Region::InodeTable],
            SaveStatus::Saved => panic!("save should fail"),
        }

        let mut disk = unformatted_disk(Box::new(FailingDevice::new(0)));
        match disk.save() {
            SaveStatus::Partial { failed, .. } => assert_eq![failed, Region::Superblock],
            SaveStatus::Saved => panic!("save should fail"),
        }
    }

    #[test]
    fn partial_save_keeps_written_regions() {
        let budget = SUPERBLOCK_SIZE + INODE_TABLE_SIZE as u64 * INODE_SIZE;
        let mut disk = unformatted_disk(Box::new(FailingDevice::new(budget as usize)));
        let last = INODE_TABLE_SIZE - 1;
        disk.inodes[last] = Inode::new("last", 4, ROOT_UID, DATA_START).unwrap();
        match disk.save() {
            SaveStatus::Partial { failed, .. } => assert_eq![failed, Region::UserTable],
            SaveStatus::Saved => panic!("save should fail"),
        }
        assert_eq![store_len(&mut disk), USERS_START];
        let inode = Inode::load(&mut disk.device, last).unwrap();
        assert_eq![inode.name(), "last"];
        assert_eq![inode.first_byte(), DATA_START];
        assert_eq![Superblock::load(&mut disk.device).unwrap().file_count, 0];
    }

    #[test]
    fn snapshot_lists_occupied_slots_in_order() {
        let mut disk = empty_disk();
        disk.inodes[4] = Inode::new("four", 4, ROOT_UID, DATA_START + 4).unwrap();
        disk.inodes[1] = Inode::new("one", 4, ROOT_UID, DATA_START).unwrap();
        disk.users[2] = User::new("michel", "x").unwrap();
        let snapshot = disk.to_string();

        let inodes = snapshot
            .lines()
            .filter(|line| line.starts_with("inode "))
            .collect::<Vec<_>>();
        assert_eq![inodes, ["inode 1:", "inode 4:"]];
        let users = snapshot
            .lines()
            .filter(|line| line.starts_with("user "))
            .collect::<Vec<_>>();
        assert_eq![users, ["user 2:"]];
        assert![snapshot.starts_with("Superblock:")];
        assert![snapshot.find("name: one").unwrap() < snapshot.find("name: four").unwrap()];
        assert![snapshot.contains("login: michel")];
        assert_eq![snapshot.matches("name: ").count(), 2];
    }
}
