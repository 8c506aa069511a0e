/*!
 * Tests for crop geometry and ffprobe output parsing
 */

use reelcap::errors::MediaError;
use reelcap::media::{parse_frame_rate, parse_probe_output, vertical_image_crop, vertical_video_crop, CropRect, VideoInfo};

#[test]
fn test_verticalVideoCrop_withLandscape_shouldCentreWindow() {
    let crop = vertical_video_crop(1920, 1080).unwrap();
    assert_eq!(crop, CropRect { width: 607, height: 1080, x: 656, y: 0 });
    assert_eq!(crop.filter(), "crop=607:1080:656:0");
}

#[test]
fn test_verticalVideoCrop_withTallFrame_shouldCropHeight() {
    // 1080x2400 is taller than 9:16
    let crop = vertical_video_crop(1080, 2400).unwrap();
    assert_eq!(crop, CropRect { width: 1080, height: 1920, x: 0, y: 240 });
}

#[test]
fn test_verticalVideoCrop_withNearVertical_shouldSkip() {
    assert_eq!(vertical_video_crop(1080, 1920), None);
    assert_eq!(vertical_video_crop(1081, 1920), None);
    assert_eq!(vertical_video_crop(0, 1920), None);
}

#[test]
fn test_verticalImageCrop_shouldOnlySkipExactRatio() {
    assert_eq!(vertical_image_crop(1080, 1920), None);

    let crop = vertical_image_crop(1081, 1920).unwrap();
    assert_eq!(crop, CropRect { width: 1080, height: 1920, x: 0, y: 0 });
    assert_eq!(crop.filter(), "crop=1080:1920:0:0");
}

#[test]
fn test_parseFrameRate_withVariousForms_shouldParse() {
    let ntsc = parse_frame_rate("30000/1001").unwrap();
    assert!((ntsc - 29.97).abs() < 0.001);
    assert_eq!(parse_frame_rate("25"), Some(25.0));
    assert_eq!(parse_frame_rate("24/1"), Some(24.0));
    assert_eq!(parse_frame_rate("0/0"), None);
    assert_eq!(parse_frame_rate("abc"), None);
}

#[test]
fn test_parseProbeOutput_withZeroAvgRate_shouldFallBackToRealRate() {
    let json = r#"{
        "streams": [{"width": 1080, "height": 1920, "avg_frame_rate": "0/0", "r_frame_rate": "30/1"}],
        "format": {"duration": "12.533333"}
    }"#;

    let info = parse_probe_output(json).unwrap();

    assert_eq!(info.width, 1080);
    assert_eq!(info.height, 1920);
    assert_eq!(info.fps, 30.0);
    assert_eq!(info.duration_in_frames(), 375);
}

#[test]
fn test_parseProbeOutput_withoutStreams_shouldReturnInvalidOutput() {
    let result = parse_probe_output(r#"{"streams": [], "format": {}}"#);
    assert!(matches!(result, Err(MediaError::InvalidOutput(_))));

    let result = parse_probe_output("garbage");
    assert!(matches!(result, Err(MediaError::InvalidOutput(_))));
}

#[test]
fn test_durationInFrames_withFractionalFps_shouldTruncateRate() {
    let info = VideoInfo { width: 1080, height: 1920, fps: 29.97, duration_secs: 10.0 };
    assert_eq!(info.duration_in_frames(), 290);
}
