//! Content hashing using blake3
//!
//! Migration candidates are compared by digest: a file hashes its bytes, a
//! directory hashes every entry beneath it in a stable order.

use crate::entry::EntryKind;
use dotagents_core::path::AbsPath;
use dotagents_core::{Error, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use walkdir::WalkDir;

/// Hash a file with buffered reading
pub fn hash_file(path: &Path) -> io::Result<[u8; 32]> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(*hasher.finalize().as_bytes())
}

/// Hash a directory tree
///
/// Entries are visited sorted by name. Each contributes its relative path, a
/// type tag and its content (file bytes or symlink value), so a rename or a
/// file turned into a link changes the digest.
pub fn hash_tree(root: &Path) -> io::Result<[u8; 32]> {
    let mut hasher = blake3::Hasher::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .follow_root_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry.path().strip_prefix(root).map_err(io::Error::other)?;
        hasher.update(rel.to_string_lossy().as_bytes());
        hasher.update(&[0]);

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            hasher.update(b"L");
            let value = fs::read_link(entry.path())?;
            hasher.update(value.to_string_lossy().as_bytes());
        } else if file_type.is_dir() {
            hasher.update(b"D");
        } else {
            hasher.update(b"F");
            hasher.update(&hash_file(entry.path())?);
        }
        hasher.update(&[0]);
    }

    Ok(*hasher.finalize().as_bytes())
}

/// Hex digest of whatever is at `path`
///
/// Files hash their content; directories hash their whole tree.
pub fn digest(path: &AbsPath, kind: EntryKind) -> Result<String> {
    let bytes = match kind {
        EntryKind::Directory => hash_tree(path.as_path()),
        _ => hash_file(path.as_path()),
    }
    .map_err(|e| Error::FileRead {
        path: path.as_path().to_path_buf(),
        source: e,
    })?;
    Ok(blake3::Hash::from_bytes(bytes).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_hash_file_matches_content() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "f.txt", "Test file content");
        assert_eq!(
            hash_file(&temp.path().join("f.txt")).unwrap(),
            *blake3::hash(b"Test file content").as_bytes()
        );
    }

    #[test]
    fn test_hash_file_nonexistent() {
        assert!(hash_file(Path::new("/nonexistent/file")).is_err());
    }

    #[test]
    fn test_identical_trees_share_digest() {
        let temp = TempDir::new().unwrap();
        for side in ["a", "b"] {
            write(temp.path(), &format!("{side}/skill/SKILL.md"), "---\nname: x\n---\n");
            write(temp.path(), &format!("{side}/skill/notes.md"), "notes");
        }
        assert_eq!(
            hash_tree(&temp.path().join("a")).unwrap(),
            hash_tree(&temp.path().join("b")).unwrap()
        );
    }

    #[test]
    fn test_tree_digest_sees_renames_and_content() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a/x.md", "same");
        write(temp.path(), "b/y.md", "same");
        write(temp.path(), "c/x.md", "other");

        let a = hash_tree(&temp.path().join("a")).unwrap();
        assert_ne!(a, hash_tree(&temp.path().join("b")).unwrap());
        assert_ne!(a, hash_tree(&temp.path().join("c")).unwrap());
    }

    #[test]
    fn test_digest_is_hex() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "f.md", "claude");
        let path = AbsPath::new(temp.path().join("f.md")).unwrap();
        let hex = digest(&path, EntryKind::File).unwrap();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
