/*!
 * Tests for application configuration
 */

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use reelcap::app_config::{Config, LogLevel};
use reelcap::captions::{CaptionMode, CaptionParams, CaptionStyle};
use crate::common::create_temp_dir;

/// Test default configuration values
#[test]
fn test_default_config_shouldBeValid() {
    let config = Config::default();

    assert_eq!(config.caption.style, CaptionStyle::TypingBackground);
    assert!(config.caption.overrides.is_empty());
    assert_eq!(config.render.endpoint, "http://localhost:4505");
    assert_eq!(config.render.render_url(), "http://localhost:4505/caption-video");
    assert_eq!(config.render.public_path(), PathBuf::from("captions").join("public"));
    assert_eq!(config.render.install_command, vec!["npm", "i"]);
    assert_eq!(config.render.start_command, vec!["node", "server.js"]);
    assert!(config.render.auto_start);
    assert_eq!(config.render.retry_count, 2);
    assert_eq!(config.log_level, LogLevel::Info);

    assert!(config.validate().is_ok());
}

#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() -> Result<()> {
    let json = r#"{
        "caption": {"style": "glowing", "max_words": 3},
        "render": {"endpoint": "http://127.0.0.1:9000/"},
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json)?;

    assert_eq!(config.caption.style, CaptionStyle::Glowing);
    assert_eq!(config.caption.overrides.max_words, Some(3));
    assert_eq!(config.render.route, "/caption-video");
    assert_eq!(config.render.render_url(), "http://127.0.0.1:9000/caption-video");
    assert_eq!(config.media.ffprobe_timeout_secs, 60);
    assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);

    let preset = config.caption.resolve();
    assert_eq!(preset.mode, CaptionMode::Flat);
    assert_eq!(preset.params, CaptionParams::new(3, 0.6, 12));

    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let mut config = Config::default();
    config.caption.overrides.max_characters = Some(0);
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.render.endpoint = "ftp://localhost:4505".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.render.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.render.start_command.clear();
    assert!(config.validate().is_err());
    config.render.auto_start = false;
    assert!(config.validate().is_ok());

    let mut config = Config::default();
    config.render.health_poll_ms = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.media.ffmpeg_timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_roundTripThroughFile_shouldPreserveValues() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.caption.style = CaptionStyle::ColorTracking;
    config.caption.overrides.max_overlap_seconds = Some(1.5);
    config.render.retry_count = 0;
    fs::write(&path, serde_json::to_string_pretty(&config)?)?;

    let loaded: Config = serde_json::from_str(&fs::read_to_string(&path)?)?;

    assert_eq!(loaded.caption.style, CaptionStyle::ColorTracking);
    assert_eq!(loaded.caption.resolve().params.max_overlap_seconds, 1.5);
    assert_eq!(loaded.render.retry_count, 0);
    Ok(())
}
