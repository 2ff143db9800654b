#![allow(dead_code)]

use disk::{Disk, SaveStatus};
use error::Error;
use structs::ROOT_UID;

mod disk;
mod error;
mod filetypes;
mod structs;

fn prompt(separator: &str) -> Option<Vec<String>> {
    use std::io::Write;
    let mut line = String::new();
    print!("{separator}");
    std::io::stdout().flush().ok()?;
    match std::io::stdin().read_line(&mut line) {
        Ok(0) => Some(vec!["q".to_owned()]),
        Ok(_) => Some(line.split_whitespace().map(str::to_string).collect()),
        Err(_) => None,
    }
}

fn save(disk: &mut Disk) -> Result<(), Box<dyn std::error::Error>> {
    match disk.save() {
        SaveStatus::Saved => Ok(()),
        SaveStatus::Partial { failed, error } => {
            Err(format!("saving {failed:?} failed: {error}").into())
        }
    }
}

/// Returns false once the session should end
fn execute(disk: &mut Disk, cmd: &[String]) -> Result<bool, Box<dyn std::error::Error>> {
    if cmd.is_empty() {
        return Ok(true);
    }
    let arg = |n: usize| cmd.get(n).map(String::as_str).ok_or("missing argument");
    match cmd[0].as_str() {
        "s" => println!["{}", disk.superblock()],
        "i" => {
            if cmd.len() == 2 {
                let id: usize = cmd[1].parse()?;
                if id >= disk.inodes().len() {
                    return Err(Error::OutOfBounds.into());
                }
                println!["{}", disk.get_inode(id)];
            } else {
                for (index, inode) in disk.inodes().iter().enumerate() {
                    if !inode.is_free() {
                        println!["{index}: {} at {}", inode.name(), inode.first_byte()];
                    }
                }
            }
        }
        "u" => {
            for (index, user) in disk.users().iter().enumerate() {
                if !user.is_free() {
                    println!["{index}: {}", user.login()];
                }
            }
        }
        "p" => print!["{disk}"],
        "ls" => {
            for inode in disk.inodes().iter().filter(|inode| !inode.is_free()) {
                println!["{}", inode.name()];
            }
        }
        "cat" => {
            let data = disk.read_file(arg(1)?)?;
            println!["{}", String::from_utf8_lossy(&data)];
        }
        "load" => {
            let index = disk.load_file_from_host(arg(1)?, ROOT_UID)?;
            println!["Stored in inode {index}"];
        }
        "store" => {
            let name = arg(1)?;
            disk.store_file_to_host(name, cmd.get(2).map(String::as_str).unwrap_or(name))?;
        }
        "rm" => disk.delete_file(arg(1)?)?,
        "useradd" => {
            let index = disk.add_user(arg(1)?, arg(2)?)?;
            println!["Added user {index}"];
        }
        "d" => {
            let report = disk.defragment()?;
            println![
                "Relocated inodes {:?}, {} bytes reclaimed",
                report.relocated, report.bytes_reclaimed
            ];
        }
        "w" => save(disk)?,
        "q" => {
            save(disk)?;
            return Ok(false);
        }
        other => eprintln!("unknown command: {other}"),
    }
    Ok(true)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut disk = Disk::open(args.first().map(String::as_str).unwrap_or("/tmp/vdisk/"))?;
    while let Some(cmd) = prompt(">> ") {
        match execute(&mut disk, &cmd) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(())
}
