//! Loaders for the line-oriented input files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use siege_primitives::{Address, AddressError};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: invalid address: {source}")]
    Address {
        path: PathBuf,
        line: usize,
        #[source]
        source: AddressError,
    },

    #[error("{0} holds no entries")]
    Empty(PathBuf),
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Split `content` into trimmed entries, skipping blank lines.
pub fn entries(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Read a receiver file: one hex address per line, at least one.
pub fn load_receivers(path: &Path) -> Result<Vec<Address>, LoadError> {
    let content = read(path)?;
    let receivers = entries(&content)
        .map(|(line, entry)| {
            entry.parse().map_err(|source| LoadError::Address {
                path: path.to_path_buf(),
                line,
                source,
            })
        })
        .collect::<Result<Vec<Address>, _>>()?;

    if receivers.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    debug!(path = %path.display(), count = receivers.len(), "Loaded receivers");
    Ok(receivers)
}

/// Read a data file verbatim.
pub fn load_data(path: &Path) -> Result<Bytes, LoadError> {
    fs::read(path)
        .map(Bytes::from)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_skip_blank_lines_and_trim() {
        let got: Vec<_> = entries("  a \n\n\tb\n").collect();
        assert_eq!(got, vec![(1, "a"), (3, "b")]);
    }

    #[test]
    fn loads_receivers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receivers.txt");
        let first = "11".repeat(32);
        let second = format!("0x{}", "22".repeat(32));
        fs::write(&path, format!("{first}\n\n{second}\n")).unwrap();

        let receivers = load_receivers(&path).unwrap();
        assert_eq!(
            receivers,
            vec![Address::new([0x11; 32]), Address::new([0x22; 32])]
        );
    }

    #[test]
    fn reports_the_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receivers.txt");
        fs::write(&path, format!("{}\nnot-hex\n", "11".repeat(32))).unwrap();

        let err = load_receivers(&path).unwrap_err();
        assert!(matches!(err, LoadError::Address { line: 2, .. }));
    }

    #[test]
    fn empty_receiver_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receivers.txt");
        fs::write(&path, "\n\n").unwrap();
        assert!(matches!(load_receivers(&path), Err(LoadError::Empty(_))));
    }

    #[test]
    fn missing_files_are_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_data(&dir.path().join("missing")),
            Err(LoadError::Io { .. })
        ));
    }
}
