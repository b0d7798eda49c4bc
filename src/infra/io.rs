use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

pub enum FileContent {
    Mapped(Mmap),
    Buffered(String),
}

impl FileContent {
    /// Borrow as UTF-8, failing on invalid bytes instead of guessing.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            FileContent::Mapped(mmap) => {
                std::str::from_utf8(mmap).context("file is not valid UTF-8")
            }
            FileContent::Buffered(s) => Ok(s.as_str()),
        }
    }
}

pub fn read_file_smart<P: AsRef<Path>>(path: P) -> Result<FileContent> {
    let path = path.as_ref();
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;

    if metadata.len() > MMAP_THRESHOLD {
        let file =
            File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;

        // Safety: read-only map; the document is copied out before any write.
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to memory-map {}", path.display()))?;

        Ok(FileContent::Mapped(mmap))
    } else {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))?;

        Ok(FileContent::Buffered(content))
    }
}

/// Read a whole file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    let content = read_file_smart(path)?;
    let text = content
        .as_str()
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(text.to_string())
}

/// Fully written temp file waiting to replace `target`.
pub struct StagedWrite {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl StagedWrite {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically replace the destination.
    pub fn commit(self) -> Result<()> {
        let target = self.target;
        match self.tmp.persist(&target) {
            Ok(_) => Ok(()),
            Err(e) => {
                // Different filesystem? Try copy fallback
                fs::copy(e.file.path(), &target)
                    .with_context(|| format!("Failed to replace {}", target.display()))?;
                Ok(())
            }
        }
    }
}

/// Write `data` to a temp file next to `path`, preserving its permissions.
pub fn stage_write(path: &Path, data: &[u8]) -> Result<StagedWrite> {
    // Prefer same-dir tempfile; fall back to OS temp on EPERM/ENOENT
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let perms = fs::metadata(path).map(|m| m.permissions()).ok();

    let tmp = match NamedTempFile::new_in(dir) {
        Ok(t) => t,
        Err(_) => NamedTempFile::new().context("create temp file")?,
    };

    let mut file = tmp.as_file();
    file.write_all(data)?;
    file.sync_all()?;

    if let Some(perms) = perms {
        fs::set_permissions(tmp.path(), perms).context("set temp permissions")?;
    }

    Ok(StagedWrite { target: path.to_path_buf(), tmp })
}

/// Atomic write with robust temp file strategy
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    stage_write(path, data)?.commit()?;

    // fsync parent dir to ensure durability on Unix
    #[cfg(unix)]
    {
        if let Some(parent) = path.parent() {
            if let Ok(parent_file) = File::open(parent) {
                let _ = parent_file.sync_all();
            }
        }
    }

    Ok(())
}
