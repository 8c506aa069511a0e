use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use log::debug;
use walkdir::WalkDir;

// @module: File and directory utilities

// @const: Extensions treated as still images
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "webp", "bmp", "gif", "tif", "tiff"];

// @const: Extensions treated as video, common ffmpeg containers
const VIDEO_EXTENSIONS: [&str; 14] = [
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v",
    "mpg", "mpeg", "ogv", "ts", "mts", "m2ts",
];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
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

    // @generates: Output path `<stem>.<suffix>.<extension>` in output_dir
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        suffix: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(suffix);
        output_filename.push('.');
        output_filename.push_str(extension.trim_start_matches('.'));

        output_dir.as_ref().join(output_filename)
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(wanted) {
                        result.push(path.to_path_buf());
                    }
                }
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
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Move a file into a directory, keeping its file name.
    ///
    /// Falls back to copy and delete when a rename is not possible, e.g.
    /// across filesystems. Returns the new path.
    pub fn move_into_dir<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, dir: P2) -> Result<PathBuf> {
        let from = from.as_ref();
        let dir = dir.as_ref();

        if !from.is_file() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        let file_name = from.file_name()
            .ok_or_else(|| anyhow::anyhow!("Source path has no file name: {:?}", from))?;
        Self::ensure_dir(dir)?;
        let to = dir.join(file_name);

        if fs::rename(from, &to).is_err() {
            debug!("Rename failed, copying {:?} to {:?}", from, to);
            fs::copy(from, &to)
                .with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;
            fs::remove_file(from)
                .with_context(|| format!("Failed to remove {:?} after copy", from))?;
        }

        Ok(to)
    }

    /// Classify a media file by its extension
    pub fn detect_media_kind<P: AsRef<Path>>(path: P) -> MediaKind {
        let Some(ext) = path.as_ref().extension() else {
            return MediaKind::Unknown;
        };
        let ext = ext.to_string_lossy().to_lowercase();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Unknown
        }
    }
}

/// Enum representing the kinds of background media
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image
    Image,
    /// Video supported by ffmpeg
    Video,
    /// Unknown file type
    Unknown,
}
