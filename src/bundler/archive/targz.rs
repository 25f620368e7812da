//! Gzip-compressed tar writer with POSIX pax extended headers.
//!
//! Every entry is preceded by a pax extended header carrying its modification
//! time (and its full path when it does not fit the ustar name and prefix
//! fields). Entries are owned by uid/gid 0. Output is held in memory, since
//! Debian control and data members are written into the enclosing `ar`
//! archive as byte slices.

use crate::bundler::error::{ErrorExt, Result};
use flate2::{Compression, write::GzEncoder};
use std::io::{self, Read};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tar::{EntryType, Header};

/// Longest path the plain ustar name field holds.
const USTAR_NAME_LEN: usize = 100;

/// Builds a `.tar.gz` in memory.
pub struct TarGzBuilder {
    builder: tar::Builder<GzEncoder<Vec<u8>>>,
}

impl Default for TarGzBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TarGzBuilder {
    /// Starts an empty archive at default compression.
    pub fn new() -> Self {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        Self {
            builder: tar::Builder::new(encoder),
        }
    }

    /// Adds a directory entry. A trailing `/` is appended to `path` if missing.
    pub fn append_dir(&mut self, path: &str, mode: u32, mtime: u64) -> Result<()> {
        let path = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };
        let header = base_header(EntryType::Directory, mode, mtime, 0)?;
        self.append_entry(header, &path, mtime, io::empty())
    }

    /// Adds a regular file from memory.
    pub fn append_bytes(&mut self, path: &str, data: &[u8], mode: u32, mtime: u64) -> Result<()> {
        let header = base_header(EntryType::Regular, mode, mtime, data.len() as u64)?;
        self.append_entry(header, path, mtime, data)
    }

    /// Adds a regular file from disk, stamped with its last-write time.
    pub fn append_file(&mut self, path: &str, source: &Path, mode: u32) -> Result<()> {
        let metadata = std::fs::metadata(source).fs_context("reading metadata", source)?;
        let mtime = metadata.modified().map(unix_seconds).unwrap_or_else(|_| now());
        let file = std::fs::File::open(source).fs_context("opening file", source)?;
        self.append_reader(path, file, metadata.len(), mode, mtime)
    }

    fn append_reader<R: Read>(
        &mut self,
        path: &str,
        reader: R,
        size: u64,
        mode: u32,
        mtime: u64,
    ) -> Result<()> {
        let header = base_header(EntryType::Regular, mode, mtime, size)?;
        self.append_entry(header, path, mtime, reader)
    }

    /// Writes the pax header for `path` followed by the entry itself.
    fn append_entry<R: Read>(
        &mut self,
        mut header: Header,
        path: &str,
        mtime: u64,
        data: R,
    ) -> Result<()> {
        let mtime = mtime.to_string();
        let mut records: Vec<(&str, &[u8])> = vec![("mtime", mtime.as_bytes())];

        if header.set_path(path).is_err() {
            // The pax record carries the real name; the ustar field gets a prefix of it.
            records.push(("path", path.as_bytes()));
            if let Some(ustar) = header.as_ustar_mut() {
                ustar.prefix = [0; 155];
            }
            let name = &mut header.as_old_mut().name;
            *name = [0; USTAR_NAME_LEN];
            let bytes = path.as_bytes();
            let len = bytes.len().min(USTAR_NAME_LEN);
            name[..len].copy_from_slice(&bytes[..len]);
        }

        self.builder.append_pax_extensions(records)?;
        header.set_cksum();
        self.builder.append(&header, data)?;
        Ok(())
    }

    /// Finishes the tar stream and the gzip member.
    pub fn finish(self) -> Result<Vec<u8>> {
        let encoder = self.builder.into_inner()?;
        Ok(encoder.finish()?)
    }
}

fn base_header(kind: EntryType, mode: u32, mtime: u64, size: u64) -> Result<Header> {
    let mut header = Header::new_ustar();
    header.set_entry_type(kind);
    header.set_mode(mode);
    header.set_mtime(mtime);
    header.set_size(size);
    header.set_uid(0);
    header.set_gid(0);
    header.set_username("root")?;
    header.set_groupname("root")?;
    Ok(header)
}

/// Seconds since the Unix epoch for `time`, clamped at zero.
pub fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Current time in Unix seconds.
pub fn now() -> u64 {
    unix_seconds(SystemTime::now())
}
