use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use base64::Engine as _;
use lattice_core::{DownloadContent, DownloadDescriptor};
use lattice_logging::lattice_info;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::disposition::sanitize_filename;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("downloads directory unusable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid data url: {0}")]
    InvalidDataUrl(String),
    #[error("invalid filename {0:?}")]
    InvalidFilename(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Creates the downloads directory if needed.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::OutputDir(format!(
            "{} is not a directory",
            dir.display()
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => fs::create_dir_all(dir)
            .map_err(|err| PersistError::OutputDir(format!("{}: {err}", dir.display()))),
        Err(err) => Err(PersistError::OutputDir(format!("{}: {err}", dir.display()))),
    }
}

/// Writes `{dir}/{filename}` through a sibling temp file, so readers never
/// see a partial download.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// The temp file is deleted on every early return; only a completed
    /// write is renamed into place.
    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(content)?;
        staged.as_file_mut().sync_all()?;

        let target = self.dir.join(filename);
        if target.is_file() {
            fs::remove_file(&target)?;
        }
        staged
            .persist(&target)
            .map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }
}

/// Saves one download descriptor; the host's "browser download".
pub trait DownloadSink: Send + Sync {
    fn save(&self, descriptor: &DownloadDescriptor) -> Result<PathBuf, DownloadError>;
}

/// Writes downloads into a directory, replacing files with the same name.
pub struct DirectoryDownloads {
    writer: AtomicFileWriter,
}

impl DirectoryDownloads {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }
}

impl DownloadSink for DirectoryDownloads {
    /// Byte downloads keep their server-given name; data URLs get an
    /// extension from their mime type when the name has none.
    fn save(&self, descriptor: &DownloadDescriptor) -> Result<PathBuf, DownloadError> {
        let path = match &descriptor.content {
            DownloadContent::Bytes(bytes) => {
                self.writer.write(&safe_filename(&descriptor.filename)?, bytes)?
            }
            DownloadContent::DataUrl(url) => {
                let filename = download_filename(&descriptor.filename, &descriptor.mime_type)?;
                self.writer.write(&filename, &decode_data_url(url)?)?
            }
        };
        lattice_info!("Saved download {:?} ({})", path, descriptor.mime_type);
        Ok(path)
    }
}

/// Sanitized name, with an extension guessed from the mime type when the
/// name has none (`crystal` + `image/png` → `crystal.png`).
pub fn download_filename(filename: &str, mime_type: &str) -> Result<String, DownloadError> {
    let name = safe_filename(filename)?;
    if Path::new(&name).extension().is_some() {
        return Ok(name);
    }
    let essence = mime_type.split(';').next().unwrap_or(mime_type).trim();
    match mime_guess::get_mime_extensions_str(essence).and_then(|exts| exts.first()) {
        Some(ext) => Ok(format!("{name}.{ext}")),
        None => Ok(name),
    }
}

fn safe_filename(filename: &str) -> Result<String, DownloadError> {
    let name = sanitize_filename(filename);
    if name.is_empty() {
        return Err(DownloadError::InvalidFilename(filename.to_string()));
    }
    Ok(name)
}

/// Payload bytes of a `data:` URL (base64 or plain).
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, DownloadError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| DownloadError::InvalidDataUrl("missing data: prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DownloadError::InvalidDataUrl("missing payload separator".into()))?;
    if header.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|err| DownloadError::InvalidDataUrl(err.to_string()))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_png() {
        let bytes = decode_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn rejects_non_data_url() {
        assert!(matches!(
            decode_data_url("https://example.com/a.png"),
            Err(DownloadError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64"),
            Err(DownloadError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn extension_from_mime() {
        assert_eq!(download_filename("crystal", "image/png").unwrap(), "crystal.png");
        assert_eq!(download_filename("export.cif", "text/plain").unwrap(), "export.cif");
        assert_eq!(
            download_filename("export", "application/x-unknown-thing").unwrap(),
            "export"
        );
        assert!(download_filename("..", "image/png").is_err());
    }

    #[test]
    fn byte_downloads_keep_their_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let sink = DirectoryDownloads::new(dir.path().to_path_buf());
        let descriptor = DownloadDescriptor {
            filename: "POSCAR".to_string(),
            content: DownloadContent::Bytes(b"Si2\n1.0\n".to_vec()),
            mime_type: "application/octet-stream".to_string(),
        };

        let saved = sink.save(&descriptor).unwrap();
        assert_eq!(saved, dir.path().join("POSCAR"));
    }
}
