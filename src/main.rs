#![allow(dead_code)]

use disk::Disk;
use error::Error;

mod disk;
mod error;
mod filetypes;
mod structs;

const DEFAULT_PREFIX: &str = "/tmp/vdisk/";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = args.first().map(String::as_str).unwrap_or(DEFAULT_PREFIX);
    let mut disk = Disk::open(prefix)?;
    disk.superblock.update_first_free_byte(&disk.inodes);
    if args.get(1).map(String::as_str) == Some("defrag") {
        let report = disk.defragment()?;
        println!(
            "Relocated {} inodes, {} bytes reclaimed",
            report.relocated.len(),
            report.bytes_reclaimed
        );
        if let disk::SaveStatus::Partial { error, .. } = disk.save() {
            return Err(error.into());
        }
    }
    print!("{disk}");
    Ok(())
}
