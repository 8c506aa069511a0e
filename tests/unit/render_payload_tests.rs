/*!
 * Tests for the render job wire format
 */

use serde_json::{json, Value};
use reelcap::captions::{CaptionStyle, CaptionTrack, FramedWord};
use reelcap::render::{RenderClient, RenderRequest, RenderResponse};

fn framed(start: i64, end: i64, word: &str) -> FramedWord {
    FramedWord { start, end, word: word.to_string() }
}

#[test]
fn test_renderRequest_withFlatTrack_shouldSerializeFlatList() {
    let track = CaptionTrack::Flat(vec![framed(0, 30, "Hello there friend."), framed(30, 39, "Next")]);
    let request = RenderRequest::new("clip.mp4", 30, 375, track, CaptionStyle::Glowing);

    let value: Value = serde_json::to_value(&request).unwrap();

    assert_eq!(value, json!({
        "video_file": "clip.mp4",
        "fps": 30,
        "durationInFrames": 375,
        "data_subtitles": [
            {"start": 0, "end": 30, "word": "Hello there friend."},
            {"start": 30, "end": 39, "word": "Next"}
        ],
        "subtitle_type": "glowing"
    }));
}

#[test]
fn test_renderRequest_withGroupedTrack_shouldSerializeNestedLists() {
    let track = CaptionTrack::Grouped(vec![vec![framed(0, 2, "ab"), framed(2, 4, "cd")], vec![framed(4, 6, "efghij")]]);
    let request = RenderRequest::new("clip.mp4", 10, 60, track.clone(), CaptionStyle::BackgroundTracking);

    let value: Value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["subtitle_type"], "background_tracking");
    assert_eq!(value["data_subtitles"][1][0]["word"], "efghij");
    assert_eq!(value["data_subtitles"].as_array().unwrap().len(), 2);

    // The untagged track deserializes back to its shape
    let back: RenderRequest = serde_json::from_value(value).unwrap();
    assert_eq!(back.data_subtitles, track);
}

#[test]
fn test_renderResponse_shouldReadOutputLocation() {
    let response: RenderResponse =
        serde_json::from_str(r#"{"message": "Render done!", "outputLocation": "out/clip.mp4"}"#).unwrap();
    assert_eq!(response.output_location, "out/clip.mp4");

    let response: RenderResponse = serde_json::from_str(r#"{"outputLocation": "out/a.mp4"}"#).unwrap();
    assert!(response.message.is_empty());

    assert!(serde_json::from_str::<RenderResponse>(r#"{"message": "no output"}"#).is_err());
}

#[test]
fn test_renderClient_new_shouldJoinRoute() {
    let client = RenderClient::new("http://localhost:4505/", "/caption-video");
    assert_eq!(client.render_url(), "http://localhost:4505/caption-video");
}
