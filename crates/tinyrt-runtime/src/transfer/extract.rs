//! Archive extraction
//!
//! Decompression runs on tokio's blocking pool. Entries are unpacked with
//! path validation (`unpack_in` for tar, `enclosed_name` for zip) so an
//! archive cannot write outside the destination directory.

use crate::platform::ArchiveKind;
use async_trait::async_trait;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tinyrt_core::{Result, RuntimeError};

/// Unpacks an archive into a directory
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Unpacks `archive` into `dest` with the method for `kind`
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Extraction` for corrupt archives or write failures.
    async fn extract(&self, archive: &Path, dest: &Path, kind: ArchiveKind) -> Result<()>;
}

/// [`Extractor`] for gzip tar and zip archives
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveExtractor;

#[async_trait]
impl Extractor for ArchiveExtractor {
    async fn extract(&self, archive: &Path, dest: &Path, kind: ArchiveKind) -> Result<()> {
        let archive_path = archive.to_path_buf();
        let dest_dir = dest.to_path_buf();

        tokio::task::spawn_blocking(move || match kind {
            ArchiveKind::TarGz => extract_tar_gz(&archive_path, &dest_dir),
            ArchiveKind::Zip => extract_zip(&archive_path, &dest_dir),
        })
        .await
        .map_err(|e| extraction_failed(archive, e))?
    }
}

/// Extracts a .tar.gz archive
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = fs::File::open(archive_path).map_err(|e| extraction_failed(archive_path, e))?;
    let decompressor = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(decompressor);
    archive.set_preserve_permissions(true);

    fs::create_dir_all(dest_dir).map_err(|e| {
        RuntimeError::io(format!("create directory {}", dest_dir.display()), e)
    })?;

    for entry in archive
        .entries()
        .map_err(|e| extraction_failed(archive_path, e))?
    {
        let mut entry = entry.map_err(|e| extraction_failed(archive_path, e))?;

        entry
            .unpack_in(dest_dir)
            .map_err(|e| extraction_failed(archive_path, e))?;
    }

    Ok(())
}

/// Extracts a .zip archive
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = fs::File::open(archive_path).map_err(|e| extraction_failed(archive_path, e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| extraction_failed(archive_path, e))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| extraction_failed(archive_path, e))?;

        let outpath: PathBuf = match file.enclosed_name() {
            Some(path) => dest_dir.join(path),
            None => {
                tracing::warn!("skipping zip entry with unsafe path: {}", file.name());
                continue;
            }
        };

        if file.is_dir() {
            create_dir(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            create_dir(parent)?;
        }

        let mut outfile = fs::File::create(&outpath)
            .map_err(|e| RuntimeError::io(format!("create file {}", outpath.display()), e))?;
        io::copy(&mut file, &mut outfile).map_err(|e| extraction_failed(archive_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode)).map_err(|e| {
                    RuntimeError::io(format!("set permissions for {}", outpath.display()), e)
                })?;
            }
        }
    }

    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| RuntimeError::io(format!("create directory {}", path.display()), e))
}

fn extraction_failed(archive: &Path, reason: impl std::fmt::Display) -> RuntimeError {
    RuntimeError::Extraction {
        archive: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}
