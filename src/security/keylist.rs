//! Plain-text key lists.
//!
//! One hex key or address per line. Only the first 64 hex characters of a
//! line (the public key part) are significant; anything after them, such
//! as the nospam and checksum of a full address, is ignored. Lines that do
//! not start with a valid key are skipped.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use confbot_proto::{PUBLIC_KEY_SIZE, PublicKey};

use crate::error::StoreError;

/// A key list file. The file is re-read on every lookup so edits take
/// effect without a restart.
#[derive(Debug, Clone)]
pub struct KeyList {
    path: PathBuf,
}

impl KeyList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All valid keys in the file. A missing file is an empty list.
    pub fn keys(&self) -> Result<Vec<PublicKey>, StoreError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(content
            .split(|&byte| byte == b'\n')
            .filter_map(|line| std::str::from_utf8(line).ok())
            .filter_map(parse_line)
            .collect())
    }

    pub fn contains_key(&self, key: &PublicKey) -> Result<bool, StoreError> {
        Ok(self.keys()?.contains(key))
    }

    /// Append one entry, creating the file if needed.
    pub fn append_key(&self, entry: &str) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        writeln!(file, "{}", entry.trim()).map_err(write_err)
    }
}

fn parse_line(line: &str) -> Option<PublicKey> {
    let head = line.trim().get(..PUBLIC_KEY_SIZE * 2)?;
    let bytes = hex::decode(head).ok()?;
    PublicKey::from_prefix(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use confbot_proto::Address;

    fn key(fill: u8) -> PublicKey {
        PublicKey([fill; PUBLIC_KEY_SIZE])
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let list = KeyList::new(dir.path().join("masterkeys"));
        assert!(list.keys().unwrap().is_empty());
        assert!(!list.contains_key(&key(1)).unwrap());
    }

    #[test]
    fn accepts_keys_and_full_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("masterkeys");
        let address = Address::new(key(2), 99);
        fs::write(&path, format!("{}\n{}\n", key(1).to_hex(), address.to_hex())).unwrap();

        let list = KeyList::new(&path);
        assert!(list.contains_key(&key(1)).unwrap());
        assert!(list.contains_key(&key(2)).unwrap());
        assert!(!list.contains_key(&key(3)).unwrap());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("masterkeys");
        fs::write(
            &path,
            format!("\nshort\n{}\n{}\r\n", "zz".repeat(32), key(4).to_hex().to_lowercase()),
        )
        .unwrap();

        assert_eq!(KeyList::new(&path).keys().unwrap(), vec![key(4)]);
    }

    #[test]
    fn non_utf8_line_does_not_hide_later_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("masterkeys");
        let mut content = vec![0xFF, 0xFE, b'\n'];
        content.extend_from_slice(key(7).to_hex().as_bytes());
        content.push(b'\n');
        fs::write(&path, content).unwrap();

        assert_eq!(KeyList::new(&path).keys().unwrap(), vec![key(7)]);
    }

    #[test]
    fn append_creates_and_extends() {
        let dir = tempfile::tempdir().unwrap();
        let list = KeyList::new(dir.path().join("masterkeys"));
        list.append_key(&key(5).to_hex()).unwrap();
        list.append_key(&format!("  {}  ", key(6).to_hex())).unwrap();
        assert_eq!(list.keys().unwrap(), vec![key(5), key(6)]);
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let list = KeyList::new(dir.path());
        assert!(matches!(list.keys(), Err(StoreError::Read { .. })));
    }
}
