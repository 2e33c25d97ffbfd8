use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Where a run reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPlan {
    /// Absolute input file or directory
    pub input: PathBuf,
    /// Output file (file input) or output directory (directory input)
    pub output: PathBuf,
    /// Whether the input is a single file
    pub is_file: bool,
}

impl PathPlan {
    /// Directory that must exist before any output is written
    pub fn output_dir(&self) -> &Path {
        if self.is_file {
            self.output.parent().unwrap_or(&self.output)
        } else {
            &self.output
        }
    }
}

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
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @resolves: Input and mirrored output locations
    // @params: input, dist (output directory name)
    pub fn resolve_paths<P: AsRef<Path>>(input: P, dist: &str) -> PathPlan {
        let input = input.as_ref();
        let absolute = if input.is_absolute() {
            input.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(input))
                .unwrap_or_else(|_| input.to_path_buf())
        };

        if absolute.is_file() {
            let parent = absolute.parent().map(Path::to_path_buf).unwrap_or_default();
            let file_name = absolute.file_name().map(|n| n.to_os_string()).unwrap_or_default();
            return PathPlan {
                output: parent.join(dist).join(&file_name),
                input: absolute,
                is_file: true,
            };
        }

        // Directories and paths that do not exist yet are both treated as directory targets
        PathPlan {
            output: absolute.join(dist),
            input: absolute,
            is_file: false,
        }
    }

    /// List the regular files directly inside a directory, sorted by name
    pub fn list_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1) {
            let entry = entry.context("Failed to read directory entry")?;
            if entry.file_type().is_file() {
                result.push(entry.into_path());
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

    /// Build the backup name `<stem>.backup.<millis><ext>` next to `path`
    pub fn backup_path_for<P: AsRef<Path>>(path: P, timestamp_millis: i64) -> PathBuf {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or(Path::new(""));
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        dir.join(format!("{}.backup.{}{}", stem, timestamp_millis, ext))
    }

    /// Copy an existing file aside before it gets overwritten
    ///
    /// Returns the backup location, or `None` when there was nothing to back up.
    /// Two backups taken within the same millisecond get successive timestamps.
    pub fn backup_file<P: AsRef<Path>>(path: P) -> Result<Option<PathBuf>> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Ok(None);
        }

        let mut timestamp = chrono::Utc::now().timestamp_millis();
        let mut backup_path = Self::backup_path_for(path, timestamp);
        while backup_path.exists() {
            timestamp += 1;
            backup_path = Self::backup_path_for(path, timestamp);
        }

        fs::copy(path, &backup_path)
            .with_context(|| format!("Failed to back up {:?} to {:?}", path, backup_path))?;

        Ok(Some(backup_path))
    }

    /// Write a file, backing up any previous content first
    pub fn write_with_backup<P: AsRef<Path>>(path: P, content: &str) -> Result<Option<PathBuf>> {
        let backup = Self::backup_file(&path)?;
        Self::write_to_file(&path, content)?;
        Ok(backup)
    }
}
