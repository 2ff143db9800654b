use log::{debug, info};

use super::Disk;
use crate::filetypes::RawFile;
use crate::structs::DATA_START;
use crate::Error;

/// Summary of one [`Disk::defragment`] pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefragReport {
    /// Relocated inode slots, ascending
    pub relocated: Vec<usize>,
    /// How far the furthest relocated extent end moved toward the front
    pub bytes_reclaimed: u64,
}

impl Disk {
    /// Slide occupied extents toward [`DATA_START`] in slot order so that each
    /// one starts where the previous occupied one ends, then update the
    /// superblock's free-space pointer. Only inode-owned extents move.
    ///
    /// Extents are copied to their targets before any old bytes are erased.
    /// An inode is repointed only once its write succeeded, so when a write
    /// fails the inodes relocated so far point at their new extents and the
    /// rest still point at their old ones. An old extent may already have
    /// been overwritten by an earlier target at that point, and nothing past
    /// the compacted end has been erased yet.
    pub fn defragment(&mut self) -> Result<DefragReport, Error> {
        info!("Defragmenting disk");
        let mut moves = Vec::new();
        let mut cursor = DATA_START;
        for (index, inode) in self.inodes.iter().enumerate() {
            if inode.is_free() {
                continue;
            }
            if inode.first_byte() != cursor {
                moves.push((index, cursor));
            }
            cursor += inode.extent_len();
        }

        // read every extent before touching the disk, so that a target range
        // never overwrites an extent still waiting to move
        let mut files = Vec::with_capacity(moves.len());
        for &(index, _) in &moves {
            let mut file = RawFile::default();
            file.read(&mut self.device, &self.inodes[index])?;
            files.push(file);
        }

        let mut report = DefragReport::default();
        let mut old_extents = Vec::with_capacity(moves.len());
        let (mut old_end, mut new_end) = (0, 0);
        for (&(index, target), file) in moves.iter().zip(&files) {
            let mut moved = self.inodes[index];
            info!(
                "Relocating inode {index} from byte {} to {target}",
                moved.first_byte()
            );
            old_extents.push((moved.first_byte(), moved.extent_end()));
            old_end = old_end.max(moved.extent_end());
            moved.set_first_byte(target);
            new_end = new_end.max(moved.extent_end());
            file.write(&mut self.device, &moved)?;
            self.inodes[index] = moved;
            report.relocated.push(index);
        }

        // occupied extents now tile DATA_START..cursor, only old bytes past it are stale
        for (start, end) in old_extents {
            RawFile::erase_range(&mut self.device, start.max(cursor), end)?;
        }
        self.superblock.update_first_free_byte(&self.inodes);

        report.bytes_reclaimed = old_end.saturating_sub(new_end);
        if report.relocated.is_empty() {
            debug!("No gaps between extents");
        }
        info!("Space reclaimed: {} bytes", report.bytes_reclaimed);
        Ok(report)
    }
}
