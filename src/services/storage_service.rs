use crate::config::OutputConfig;
use std::{
    io,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const IMAGE_EXTENSION: &str = "png";
const SIDECAR_EXTENSION: &str = "b64";

/// A file written to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_path: PathBuf,
    /// Path the front end requests, e.g. `/output/<uuid>.png`
    pub public_path: String,
}

/// Local-disk image store backing the static `/output` mount.
///
/// Files get random v4 names so concurrent requests never collide; nothing
/// is ever deleted here.
#[derive(Debug, Clone)]
pub struct StorageService {
    output_dir: PathBuf,
    public_prefix: String,
}

impl StorageService {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            output_dir: config.dir.clone(),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory if it does not exist yet
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.output_dir).await
    }

    /// Write image bytes under a fresh random filename
    #[instrument(skip(self, image_data), fields(bytes = image_data.len()))]
    pub async fn save_image(&self, image_data: &[u8]) -> io::Result<StoredFile> {
        self.ensure_dir().await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), IMAGE_EXTENSION);
        let file_path = self.output_dir.join(&file_name);

        tokio::fs::write(&file_path, image_data)
            .await
            .inspect_err(|e| warn!("Failed to write image {}: {}", file_path.display(), e))?;

        let public_path = format!("{}/{}", self.public_prefix, file_name);
        info!("Image stored: {}", public_path);

        Ok(StoredFile {
            file_path,
            public_path,
        })
    }

    /// Keep the original base64 text next to the image as `<image>.b64`
    #[instrument(skip(self, encoded), fields(path = %stored.public_path))]
    pub async fn save_sidecar(&self, stored: &StoredFile, encoded: &str) -> io::Result<PathBuf> {
        let sidecar_path = sidecar_path(&stored.file_path);
        tokio::fs::write(&sidecar_path, encoded).await?;
        Ok(sidecar_path)
    }

    /// Map a public path back to a file in the output directory
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let file_name = public_path
            .strip_prefix(&self.public_prefix)?
            .strip_prefix('/')?;

        if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
            return None;
        }

        Some(self.output_dir.join(file_name))
    }
}

fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut name = image_path.as_os_str().to_owned();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}
