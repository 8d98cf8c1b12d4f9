// Archiver producing `<directory>.tar.gz` next to the directory
// reason: tar for the container, flate2 for gzip; both blocking, so run off the runtime
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use helpdesk_core::port::{ArchiveError, Archiver};

pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Packages a report directory into one gzip-compressed tarball
///
/// Entries are stored under the directory's own name, so extracting the
/// archive recreates `HelpdeskReport_<id>/...`.
#[derive(Debug, Clone)]
pub struct TarGzArchiver {
    level: Compression,
}

impl TarGzArchiver {
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }

    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }
}

impl Default for TarGzArchiver {
    fn default() -> Self {
        Self::new()
    }
}

fn directory_name(directory: &Path) -> Result<String, ArchiveError> {
    directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ArchiveError::DirectoryUnreadable(format!("{} has no name", directory.display())))
}

fn open_destination(path: &Path) -> Result<File, ArchiveError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ArchiveError::AlreadyExists(path.display().to_string()),
            _ => ArchiveError::DestinationUnwritable(format!("{}: {e}", path.display())),
        })
}

fn write_archive(directory: &Path, destination: &Path, level: Compression) -> Result<(), ArchiveError> {
    let name = directory_name(directory)?;
    fs::read_dir(directory)
        .map_err(|e| ArchiveError::DirectoryUnreadable(format!("{}: {e}", directory.display())))?;

    let file = open_destination(destination)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, level));
    builder.follow_symlinks(false);

    let appended = builder.append_dir_all(&name, directory);
    let result = match appended {
        Ok(()) => builder
            .into_inner()
            .and_then(|encoder| encoder.finish())
            .and_then(|file| file.sync_all())
            .map_err(|e| ArchiveError::DestinationUnwritable(format!("{}: {e}", destination.display()))),
        Err(e) => {
            drop(builder);
            Err(ArchiveError::DirectoryUnreadable(format!("{}: {e}", directory.display())))
        }
    };

    if result.is_err() {
        // never leave a truncated archive behind
        let _ = fs::remove_file(destination);
    }
    result
}

#[async_trait]
impl Archiver for TarGzArchiver {
    fn archive_path_for(&self, directory: &Path) -> PathBuf {
        let name = directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        directory.with_file_name(format!("{name}.{ARCHIVE_EXTENSION}"))
    }

    async fn package(&self, directory: &Path) -> Result<PathBuf, ArchiveError> {
        let destination = self.archive_path_for(directory);
        let source = directory.to_path_buf();
        let target = destination.clone();
        let level = self.level;

        let written = tokio::task::spawn_blocking(move || write_archive(&source, &target, level))
            .await
            .map_err(|e| ArchiveError::DestinationUnwritable(format!("archiver task failed: {e}")))?;

        match written {
            Ok(()) => {
                info!(archive = %destination.display(), "Archive written");
                Ok(destination)
            }
            Err(e) => {
                warn!(directory = %directory.display(), error = %e, "Archive failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn report_dir(tmp: &TempDir) -> PathBuf {
        let dir = tmp.path().join("HelpdeskReport_20260314_093000");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a.txt"), "alpha").unwrap();
        fs::write(dir.join("b.txt"), "").unwrap();
        dir
    }

    #[test]
    fn test_archive_path_is_sibling() {
        let path = TarGzArchiver::new().archive_path_for(Path::new("/reports/HelpdeskReport_20260314_093000"));
        assert_eq!(path, PathBuf::from("/reports/HelpdeskReport_20260314_093000.tar.gz"));
    }

    #[tokio::test]
    async fn test_package_writes_one_file() {
        let tmp = TempDir::new().unwrap();
        let dir = report_dir(&tmp);

        let archive = TarGzArchiver::new().package(&dir).await.unwrap();

        assert!(archive.is_file());
        assert_eq!(archive.parent(), dir.parent());
        assert!(fs::metadata(&archive).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_existing_archive_is_never_overwritten() {
        let tmp = TempDir::new().unwrap();
        let dir = report_dir(&tmp);
        let archiver = TarGzArchiver::new();
        fs::write(archiver.archive_path_for(&dir), "previous run").unwrap();

        let err = archiver.package(&dir).await.unwrap_err();

        assert!(matches!(err, ArchiveError::AlreadyExists(_)));
        assert_eq!(fs::read_to_string(archiver.archive_path_for(&dir)).unwrap(), "previous run");
    }

    #[tokio::test]
    async fn test_missing_directory_is_unreadable() {
        let tmp = TempDir::new().unwrap();
        let err = TarGzArchiver::new()
            .package(&tmp.path().join("HelpdeskReport_missing"))
            .await
            .unwrap_err();

        assert!(matches!(err, ArchiveError::DirectoryUnreadable(_)));
        assert!(!tmp.path().join("HelpdeskReport_missing.tar.gz").exists());
    }
}
