use std::fs;
use std::path::{Path, PathBuf};

use restyle_contracts::errors::InputError;
use restyle_contracts::image::{is_image_mime, EncodedImage};

/// A file handed over by an input adapter, with the type it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    declared_type: String,
}

impl SourceFile {
    /// Declares the type from the file extension, as a file picker would.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let declared_type = mime_for_path(&path).to_string();
        Self {
            path,
            declared_type,
        }
    }

    /// Keeps a type the adapter was given, falling back to the extension
    /// when it is blank.
    pub fn with_type(path: impl Into<PathBuf>, declared_type: &str) -> Self {
        let declared = declared_type.trim();
        if declared.is_empty() {
            return Self::from_path(path);
        }
        Self {
            path: path.into(),
            declared_type: declared.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn is_image(&self) -> bool {
        is_image_mime(&self.declared_type)
    }
}

/// Reads the whole file and base64-encodes it under its declared type.
///
/// Callers check [`SourceFile::is_image`] first; a non-image type is still
/// refused here so no `EncodedImage` with a foreign type can exist.
pub fn encode(file: &SourceFile) -> Result<EncodedImage, InputError> {
    if !file.is_image() {
        return Err(InputError::InvalidFileType {
            declared: file.declared_type.clone(),
        });
    }
    let bytes = fs::read(&file.path).map_err(|source| InputError::Read {
        path: file.path.clone(),
        source,
    })?;
    EncodedImage::from_bytes(&bytes, &file.declared_type).ok_or_else(|| InputError::EmptyFile {
        path: file.path.clone(),
    })
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use restyle_contracts::errors::InputError;

    use super::{encode, SourceFile};

    #[test]
    fn declared_type_comes_from_extension() {
        assert_eq!(SourceFile::from_path("a/photo.JPG").declared_type(), "image/jpeg");
        assert_eq!(SourceFile::from_path("painting.png").declared_type(), "image/png");
        assert_eq!(SourceFile::from_path("notes.txt").declared_type(), "text/plain");
        assert_eq!(
            SourceFile::from_path("no_extension").declared_type(),
            "application/octet-stream"
        );
        assert!(!SourceFile::from_path("notes.txt").is_image());
    }

    #[test]
    fn with_type_prefers_the_given_type() {
        let dropped = SourceFile::with_type("blob", "image/webp");
        assert_eq!(dropped.declared_type(), "image/webp");
        let blank = SourceFile::with_type("photo.gif", "  ");
        assert_eq!(blank.declared_type(), "image/gif");
    }

    #[test]
    fn encode_reads_bytes_and_keeps_declared_type() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("photo.jpg");
        fs::write(&path, [0xffu8, 0xd8, 0xff, 0xe0])?;

        let image = encode(&SourceFile::from_path(&path))?;
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.data(), "/9j/4A==");
        Ok(())
    }

    #[test]
    fn encode_reports_missing_and_empty_files() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let missing = encode(&SourceFile::from_path(temp.path().join("missing.png")));
        assert!(matches!(missing, Err(InputError::Read { .. })));

        let empty_path = temp.path().join("empty.png");
        fs::write(&empty_path, b"")?;
        let empty = encode(&SourceFile::from_path(&empty_path));
        assert!(matches!(empty, Err(InputError::EmptyFile { .. })));
        Ok(())
    }

    #[test]
    fn encode_refuses_non_image_types() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("notes.txt");
        fs::write(&path, "hello")?;
        let result = encode(&SourceFile::from_path(&path));
        assert!(matches!(result, Err(InputError::InvalidFileType { .. })));
        Ok(())
    }
}
