//! The transient file handed to the controller by a selection event.

use std::path::{Path, PathBuf};

/// Where the bytes of a selected file come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Content already in memory (e.g. handed over by a host file chooser).
    Memory(Vec<u8>),
    /// Content still on disk; read asynchronously during decode.
    Path(PathBuf),
}

/// One candidate file, alive for a single validate + decode cycle.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub source: FileSource,
}

impl SelectedFile {
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source: FileSource::Memory(bytes),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime_type: mime_type.into(),
            source: FileSource::Path(path),
        }
    }

    /// Builds a selection the way a browser file chooser would: the declared
    /// type comes from the file extension, not from the content.
    pub fn from_path_guess_type(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime = guess_mime_type(&path);
        Self::from_path(path, mime)
    }
}

/// Declared MIME type for a path, from its extension alone.
///
/// Unknown extensions get `text/plain` for `.txt` and
/// `application/octet-stream` otherwise.
pub fn guess_mime_type(path: &Path) -> String {
    match image::ImageFormat::from_path(path) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => {
            let is_txt = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case("txt"))
                .unwrap_or(false);
            if is_txt {
                "text/plain".to_string()
            } else {
                "application/octet-stream".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_image_types_from_extension() {
        assert_eq!(guess_mime_type(Path::new("face.png")), "image/png");
        assert_eq!(guess_mime_type(Path::new("face.jpg")), "image/jpeg");
        assert_eq!(guess_mime_type(Path::new("face.JPEG")), "image/jpeg");
    }

    #[test]
    fn guesses_non_image_types() {
        assert_eq!(guess_mime_type(Path::new("notes.txt")), "text/plain");
        assert_eq!(guess_mime_type(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn from_path_uses_file_name() {
        let file = SelectedFile::from_path("/tmp/photos/id.png", "image/png");
        assert_eq!(file.name, "id.png");
        assert!(matches!(file.source, FileSource::Path(_)));
    }
}
