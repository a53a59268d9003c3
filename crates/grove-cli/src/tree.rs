//! Creating the next numbered `.tree` file.
//!
//! Trees are named with four base-36 digits (`0000`..`zzzz`). A new tree
//! takes the highest existing stem plus one.

use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const STEM_WIDTH: usize = 4;
const MAX_STEM: u32 = 36u32.pow(STEM_WIDTH as u32) - 1;
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("tree directory '{}' does not exist", .0.display())]
    MissingDirectory(PathBuf),
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("refusing to overwrite existing file: {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("all 4-digit base-36 filenames are exhausted (zzzz reached)")]
    Exhausted,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Value of a four-digit base-36 stem, ignoring case.
pub fn parse_stem(stem: &str) -> Option<u32> {
    if stem.len() != STEM_WIDTH || !stem.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    u32::from_str_radix(stem, 36).ok()
}

/// Lower-case four-digit base-36 form of `value`.
pub fn format_stem(value: u32) -> Option<String> {
    if value > MAX_STEM {
        return None;
    }
    let mut buf = [b'0'; STEM_WIDTH];
    let mut n = value;
    for slot in buf.iter_mut().rev() {
        *slot = DIGITS[(n % 36) as usize];
        n /= 36;
    }
    Some(buf.iter().map(|&b| b as char).collect())
}

/// The stem the next tree in `dir` gets.
///
/// Only `*.tree` files with a four-digit base-36 stem count.
pub fn next_stem(dir: &Path) -> Result<String, TreeError> {
    let mut highest: Option<u32> = None;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "tree") {
            continue;
        }
        let Some(value) = path.file_stem().and_then(|s| s.to_str()).and_then(parse_stem) else {
            continue;
        };
        highest = Some(highest.map_or(value, |h| h.max(value)));
    }

    let next = highest.map_or(0, |h| h + 1);
    format_stem(next).ok_or(TreeError::Exhausted)
}

/// Initial content of a tree created on `date`.
pub fn tree_template(date: NaiveDate) -> String {
    format!("\\date{{{}}}\n\n\\import{{base-macros}}\n\n", date.format("%Y-%m-%d"))
}

/// Create the next tree in `dir`, stamped with `date`.
pub fn create_tree(dir: &Path, date: NaiveDate) -> Result<PathBuf, TreeError> {
    if !dir.exists() {
        return Err(TreeError::MissingDirectory(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(TreeError::NotADirectory(dir.to_path_buf()));
    }

    let stem = next_stem(dir)?;
    let target = dir.join(format!("{stem}.tree"));

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(TreeError::AlreadyExists(target));
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(tree_template(date).as_bytes())?;

    tracing::debug!(path = %target.display(), "created tree");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn test_stem_roundtrip_edges() {
        assert_eq!(format_stem(0).as_deref(), Some("0000"));
        assert_eq!(format_stem(35).as_deref(), Some("000z"));
        assert_eq!(format_stem(36).as_deref(), Some("0010"));
        assert_eq!(format_stem(MAX_STEM).as_deref(), Some("zzzz"));
        assert_eq!(format_stem(MAX_STEM + 1), None);
    }

    #[test]
    fn test_parse_stem_ignores_case() {
        assert_eq!(parse_stem("00Az"), parse_stem("00aZ"));
        assert_eq!(parse_stem("0010"), Some(36));
        assert_eq!(parse_stem("010"), None);
        assert_eq!(parse_stem("00-1"), None);
        assert_eq!(parse_stem("+001"), None);
    }

    #[test]
    fn test_next_stem_in_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(next_stem(dir.path()).unwrap(), "0000");
    }

    #[test]
    fn test_next_stem_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "0009.tree");
        touch(dir.path(), "000A.tree");
        touch(dir.path(), "zzzz.md");
        touch(dir.path(), "index.tree");
        touch(dir.path(), "00001.tree");
        assert_eq!(next_stem(dir.path()).unwrap(), "000b");
    }

    #[test]
    fn test_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ZZZZ.tree");
        assert!(matches!(next_stem(dir.path()), Err(TreeError::Exhausted)));
    }

    #[test]
    fn test_create_tree_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "0a1b.tree");
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();

        let path = create_tree(dir.path(), date).unwrap();
        assert_eq!(path, dir.path().join("0a1c.tree"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "\\date{2024-03-07}\n\n\\import{base-macros}\n\n"
        );
    }

    #[test]
    fn test_create_tree_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("trees");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            create_tree(&missing, date),
            Err(TreeError::MissingDirectory(_))
        ));
    }

    #[test]
    fn test_create_tree_on_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "trees");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            create_tree(&dir.path().join("trees"), date),
            Err(TreeError::NotADirectory(_))
        ));
    }
}
