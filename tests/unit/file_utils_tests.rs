/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use reelcap::file_utils::{FileManager, MediaKind};
use crate::common::{create_temp_dir, create_test_file};

/// Test generating output paths for caption files
#[test]
fn test_generate_output_path_shouldAddSuffix() {
    let output = FileManager::generate_output_path(Path::new("/videos/talk.json"), Path::new("/out"), "captions", "json");
    assert_eq!(output, Path::new("/out/talk.captions.json"));

    let output = FileManager::generate_output_path("talk", "out", "captions", ".json");
    assert_eq!(output, Path::new("out/talk.captions.json"));
}

/// Test finding files by extension, recursively and sorted
#[test]
fn test_find_files_shouldMatchExtensionRecursively() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let nested = temp_dir.path().join("nested");
    fs::create_dir(&nested)?;

    create_test_file(temp_dir.path(), "b.json", "{}")?;
    create_test_file(temp_dir.path(), "a.JSON", "{}")?;
    create_test_file(&nested, "c.json", "{}")?;
    create_test_file(temp_dir.path(), "notes.txt", "")?;

    let found = FileManager::find_files(temp_dir.path(), "json")?;

    assert_eq!(found.len(), 3);
    assert!(found.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(found.iter().all(|p| p.extension().unwrap().to_string_lossy().eq_ignore_ascii_case("json")));
    Ok(())
}

#[test]
fn test_write_to_file_shouldCreateParentDirs() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let path = temp_dir.path().join("deep").join("er").join("out.json");

    FileManager::write_to_file(&path, "[]")?;

    assert!(FileManager::file_exists(&path));
    assert_eq!(FileManager::read_to_string(&path)?, "[]");
    Ok(())
}

#[test]
fn test_move_into_dir_shouldRelocateFile() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let source = create_test_file(temp_dir.path(), "clip.mp4", "not really a video")?;
    let public = temp_dir.path().join("captions").join("public");

    let moved = FileManager::move_into_dir(&source, &public)?;

    assert_eq!(moved, public.join("clip.mp4"));
    assert!(!source.exists());
    assert_eq!(fs::read_to_string(&moved)?, "not really a video");

    assert!(FileManager::move_into_dir(&source, &public).is_err());
    Ok(())
}

#[test]
fn test_detect_media_kind_shouldUseExtension() {
    assert_eq!(FileManager::detect_media_kind("shot.PNG"), MediaKind::Image);
    assert_eq!(FileManager::detect_media_kind("photo.jpeg"), MediaKind::Image);
    assert_eq!(FileManager::detect_media_kind("clip.mp4"), MediaKind::Video);
    assert_eq!(FileManager::detect_media_kind("clip.MOV"), MediaKind::Video);
    assert_eq!(FileManager::detect_media_kind("notes.txt"), MediaKind::Unknown);
    assert_eq!(FileManager::detect_media_kind("no_extension"), MediaKind::Unknown);
}

#[test]
fn test_ensure_dir_shouldBeIdempotent() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let dir = temp_dir.path().join("out");

    FileManager::ensure_dir(&dir)?;
    FileManager::ensure_dir(&dir)?;

    assert!(FileManager::dir_exists(&dir));
    Ok(())
}
