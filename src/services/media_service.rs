use std::path::{Component, Path, PathBuf};

use tokio::fs::{self, File};

use crate::error::{Error, Result};

/// Kinds of files users may upload to their profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Resume,
    ProfilePicture,
}

impl MediaKind {
    pub fn dir(&self) -> &'static str {
        match self {
            MediaKind::Resume => "resumes",
            MediaKind::ProfilePicture => "profile_pics",
        }
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Resume => &["pdf", "doc", "docx", "txt", "rtf"],
            MediaKind::ProfilePicture => &["jpg", "jpeg", "png", "gif", "webp"],
        }
    }
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}

fn content_matches(ext: &str, data: &[u8]) -> bool {
    match ext {
        "pdf" => data.starts_with(b"%PDF"),
        "doc" => data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]),
        "docx" => data.starts_with(b"PK\x03\x04"),
        "rtf" => data.starts_with(b"{\\rtf"),
        "txt" => std::str::from_utf8(data).is_ok() && !data.contains(&0),
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        "png" => data.starts_with(&[0x89, b'P', b'N', b'G']),
        "gif" => data.starts_with(b"GIF8"),
        "webp" => data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP",
        _ => false,
    }
}

/// Checks an upload by extension and leading bytes; returns the normalized extension.
pub fn check_upload(
    kind: MediaKind,
    file_name: &str,
    data: &[u8],
) -> std::result::Result<String, String> {
    if data.is_empty() {
        return Err("The submitted file is empty.".to_string());
    }
    let ext = extension_of(file_name);
    if !kind.allowed_extensions().contains(&ext.as_str()) {
        return Err(format!(
            "File type not allowed. Allowed: {}",
            kind.allowed_extensions().join(", ")
        ));
    }
    if !content_matches(&ext, data) {
        return Err(format!("The file content does not look like a .{} file.", ext));
    }
    Ok(ext)
}

/// Last component of a stored relative path.
pub fn file_name(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

/// Stores uploads below `MEDIA_ROOT` and hands stored files back out.
#[derive(Clone)]
pub struct MediaService {
    root: PathBuf,
}

impl MediaService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a checked upload under a generated name and returns its path relative to the root.
    pub async fn save(&self, kind: MediaKind, file_name: &str, data: &[u8]) -> Result<String> {
        let ext = check_upload(kind, file_name, data).map_err(Error::BadRequest)?;

        let dir = self.root.join(kind.dir());
        fs::create_dir_all(&dir).await?;
        let stored = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        fs::write(dir.join(&stored), data).await?;

        let relative = format!("{}/{}", kind.dir(), stored);
        tracing::info!(path = %relative, bytes = data.len(), "upload stored");
        Ok(relative)
    }

    /// Saves every upload or none of them: a failed write removes the files already stored.
    pub async fn save_all(&self, uploads: &[(MediaKind, &str, &[u8])]) -> Result<Vec<String>> {
        let mut saved = Vec::with_capacity(uploads.len());
        for (kind, file_name, data) in uploads {
            match self.save(*kind, file_name, data).await {
                Ok(relative) => saved.push(relative),
                Err(err) => {
                    self.discard(&saved).await;
                    return Err(err);
                }
            }
        }
        Ok(saved)
    }

    pub async fn discard(&self, relatives: &[String]) {
        for relative in relatives {
            self.remove(relative).await;
        }
    }

    /// Resolves a stored relative path; anything that could leave the root is refused.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let path = Path::new(relative);
        let plain = path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if relative.is_empty() || !plain {
            return Err(Error::BadRequest(format!("invalid media path: {}", relative)));
        }
        Ok(self.root.join(path))
    }

    pub async fn open(&self, relative: &str) -> Result<File> {
        let path = self.resolve(relative)?;
        Ok(File::open(path).await?)
    }

    /// Deletes a stored file. Failures are only logged.
    pub async fn remove(&self, relative: &str) {
        let Ok(path) = self.resolve(relative) else {
            return;
        };
        if let Err(err) = fs::remove_file(&path).await {
            tracing::warn!(path = %relative, error = %err, "could not remove upload");
        }
    }
}
