use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::PipelineError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Fail unless the file can be opened for reading
    pub fn check_readable<P: AsRef<Path>>(path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        File::open(path).map(|_| ()).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::MissingOutput(path.to_path_buf()),
            _ => PipelineError::Precondition {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })
    }

    /// Check several files, reporting the first one that is not readable
    pub fn check_all_readable<I, P>(paths: I) -> Result<(), PipelineError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            Self::check_readable(path)?;
        }
        Ok(())
    }

    /// Input check used before a phase starts: any failure is a precondition error
    pub fn require_input<P: AsRef<Path>>(path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        File::open(path).map(|_| ()).map_err(|e| PipelineError::Precondition {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Verify an artifact that will be recorded in the run context: it must
    /// be readable and non-empty
    pub fn verify_artifact<P: AsRef<Path>>(path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        Self::check_readable(path)?;
        if !Self::is_non_empty(path) {
            return Err(PipelineError::EmptyOutput(path.to_path_buf()));
        }
        Ok(())
    }

    /// Whether a file exists and has content
    pub fn is_non_empty<P: AsRef<Path>>(path: P) -> bool {
        fs::metadata(path).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
    }

    /// List regular files directly inside `dir` whose names start with `prefix`
    /// and end with `suffix`, sorted by path
    pub fn list_files<P: AsRef<Path>>(dir: P, prefix: &str, suffix: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1) {
            let entry = entry.context("Failed to read directory entry")?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.starts_with(prefix) && name.ends_with(suffix) {
                result.push(entry.path().to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to)
            .with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;

        Ok(())
    }

    /// Move a file, falling back to copy and delete across filesystems
    pub fn move_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        if fs::rename(from, to).is_ok() {
            return Ok(());
        }

        Self::copy_file(from, to)?;
        fs::remove_file(from)
            .with_context(|| format!("Failed to remove {:?} after copying", from))?;

        Ok(())
    }

    /// Append a line to a file, creating it if needed
    pub fn append_line<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?;

        writeln!(file, "{}", content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
