//! Expansion of command line input paths to a flat list of files.
//!
//! Files are passed through in argument order. Directories are walked
//! recursively and expand, in place, to all regular files they contain,
//! sorted lexicographically so the expansion is stable across runs.
//! Nonexistent paths are a hard error; nothing is skipped silently.

use std::error;
use std::fmt;
use std::path::PathBuf;

use walkdir::WalkDir;

/// Error resolving the input path list
#[derive(Debug)]
pub enum Error {
    /// An input path does not exist
    PathNotFound(PathBuf),
    /// A directory could not be traversed
    Walk(walkdir::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::PathNotFound(ref path) => {
                write!(f, "input path not found: {}", path.display())
            }
            Error::Walk(ref e) => write!(f, "cannot read directory: {}", e),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(e: walkdir::Error) -> Error {
        Error::Walk(e)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Walk(ref e) => Some(e),
            _ => None,
        }
    }
}

/// Resolves a list of file and/or directory paths to a flat, ordered list
/// of file paths.
pub fn resolve(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.exists() {
            return Err(Error::PathNotFound(input.clone()));
        }
        if input.is_dir() {
            let mut expanded = Vec::new();
            for entry in WalkDir::new(input) {
                let entry = entry?;
                if entry.file_type().is_file() {
                    expanded.push(entry.into_path());
                }
            }
            expanded.sort();
            files.extend(expanded);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}
