/*!
 * Tests for transcript parsing and word flattening
 */

use anyhow::Result;
use reelcap::errors::CaptionError;
use reelcap::transcript::{Transcript, WordToken};
use crate::common::{create_temp_dir, create_test_file, create_test_transcript, SAMPLE_TRANSCRIPT};

#[test]
fn test_fromJsonStr_withSampleTranscript_shouldKeepWordOrder() -> Result<()> {
    let transcript = Transcript::from_json_str(SAMPLE_TRANSCRIPT)?;

    assert_eq!(transcript.segments.len(), 2);
    assert_eq!(transcript.word_count(), 7);

    let words = transcript.words()?;
    let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec![" Hello", " there", " friend.", " Next", " time,", " bring", " snacks."]);

    // Whitespace survives flattening
    assert_eq!(words[0], WordToken::new(0.0, 0.3, " Hello"));
    Ok(())
}

#[test]
fn test_fromJsonStr_withEmptySegments_shouldYieldNoWords() -> Result<()> {
    let transcript = Transcript::from_json_str(r#"{"segments": [{"words": []}, {"words": []}]}"#)?;
    assert_eq!(transcript.word_count(), 0);
    assert!(transcript.words()?.is_empty());
    Ok(())
}

#[test]
fn test_fromJsonStr_withoutSegments_shouldReturnMalformedInput() {
    let result = Transcript::from_json_str(r#"{"text": "no word timings"}"#);
    assert!(matches!(result, Err(CaptionError::MalformedInput(_))));

    let result = Transcript::from_json_str("not json");
    assert!(matches!(result, Err(CaptionError::MalformedInput(_))));
}

#[test]
fn test_words_withMissingText_shouldNamePosition() -> Result<()> {
    let transcript = Transcript::from_json_str(
        r#"{"segments":[{"words":[{"start":0.0,"end":0.1,"word":"a"}]},{"words":[{"start":0.2,"end":0.3}]}]}"#,
    )?;

    match transcript.words() {
        Err(CaptionError::MalformedInput(message)) => {
            assert_eq!(message, "segment 1 word 0 is missing 'word'");
        }
        other => panic!("expected MalformedInput, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_words_withEndBeforeStart_shouldReturnMalformedInput() -> Result<()> {
    let transcript = Transcript::from_json_str(r#"{"segments":[{"words":[{"start":2.0,"end":1.0,"word":"back"}]}]}"#)?;
    assert!(matches!(transcript.words(), Err(CaptionError::MalformedInput(_))));
    Ok(())
}

#[test]
fn test_words_withMissingStart_shouldNamePosition() -> Result<()> {
    let transcript = Transcript::from_json_str(r#"{"segments":[{"words":[{"end":0.4,"word":"late"}]}]}"#)?;

    match transcript.words() {
        Err(CaptionError::MalformedInput(message)) => {
            assert_eq!(message, "segment 0 word 0 is missing 'start'");
        }
        other => panic!("expected MalformedInput, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_words_withBackwardStart_shouldReturnMalformedInput() {
    let transcript = Transcript::from_words(vec![WordToken::new(5.0, 6.0, "late"), WordToken::new(4.0, 4.5, "early")]);

    match transcript.words() {
        Err(CaptionError::MalformedInput(message)) => {
            assert!(message.starts_with("segment 0 word 1 starts before the previous word"), "{}", message);
        }
        other => panic!("expected MalformedInput, got {:?}", other),
    }
}

#[test]
fn test_words_withBackwardStartAcrossSegments_shouldReturnMalformedInput() -> Result<()> {
    let transcript = Transcript::from_json_str(
        r#"{"segments":[{"words":[{"start":2.0,"end":2.5,"word":"b"}]},{"words":[{"start":1.0,"end":1.5,"word":"a"}]}]}"#,
    )?;

    match transcript.words() {
        Err(CaptionError::MalformedInput(message)) => assert!(message.contains("segment 1 word 0"), "{}", message),
        other => panic!("expected MalformedInput, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_words_withSharedStart_shouldBeAccepted() -> Result<()> {
    let tokens = vec![WordToken::new(1.0, 1.0, "a"), WordToken::new(1.0, 1.2, "b")];
    assert_eq!(Transcript::from_words(tokens.clone()).words()?, tokens);
    Ok(())
}

#[test]
fn test_fromWords_shouldRoundTripTokens() -> Result<()> {
    let tokens = vec![WordToken::new(0.0, 0.5, "one"), WordToken::new(0.5, 1.0, "two")];
    let transcript = Transcript::from_words(tokens.clone());

    assert_eq!(transcript.segments.len(), 1);
    assert_eq!(transcript.words()?, tokens);
    Ok(())
}

#[test]
fn test_fromFile_withTranscriptFile_shouldLoad() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let path = create_test_transcript(temp_dir.path(), "talk.json")?;

    let transcript = Transcript::from_file(&path)?;
    assert_eq!(transcript.word_count(), 7);
    Ok(())
}

#[test]
fn test_fromFile_withBrokenFile_shouldMentionPath() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let path = create_test_file(temp_dir.path(), "broken.json", "{\"segments\": [")?;

    let error = Transcript::from_file(&path).unwrap_err();
    assert!(format!("{:#}", error).contains("broken.json"));

    let missing = Transcript::from_file(temp_dir.path().join("missing.json"));
    assert!(missing.is_err());
    Ok(())
}
