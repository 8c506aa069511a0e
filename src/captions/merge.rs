/*!
 * Merge policies for grouping word tokens into captions.
 *
 * Both policies scan the flat word sequence once, left to right, and close
 * the current accumulation as soon as a candidate word breaks one of the
 * limits in [`CaptionParams`]. They never reorder tokens.
 *
 * The two policies measure the start-time gap differently:
 * - flat: candidate start minus the start of the first word of the caption
 * - grouped: candidate start minus the start of the last word of the group
 */

use crate::captions::CaptionParams;
use crate::transcript::WordToken;

/// Length as counted for the character budget
fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// A caption ends at a word whose trimmed text ends with a period
fn ends_sentence(text: &str) -> bool {
    text.trim().ends_with('.')
}

/// Merge consecutive words into single captions with combined text.
///
/// The accumulated caption keeps the first word's start, takes each joined
/// word's end, and appends its text after a single space. Texts are kept
/// untrimmed here; trimming happens when captions are emitted.
pub fn merge_flat(words: &[WordToken], params: &CaptionParams) -> Vec<WordToken> {
    let mut iter = words.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    let mut current = first.clone();
    let mut current_chars = char_len(&current.text);
    let mut word_count = 1;

    for next in iter {
        let combined_chars = current_chars + 1 + char_len(&next.text);

        let joins = next.start - current.start <= params.max_overlap_seconds
            && combined_chars <= params.max_characters
            && word_count < params.max_words
            && !ends_sentence(&current.text);

        if joins {
            current.end = next.end;
            current.text.push(' ');
            current.text.push_str(&next.text);
            current_chars = combined_chars;
            word_count += 1;
        } else {
            merged.push(std::mem::replace(&mut current, next.clone()));
            current_chars = char_len(&current.text);
            word_count = 1;
        }
    }

    merged.push(current);
    merged
}

/// Split consecutive words into groups of individually timed words.
///
/// Groups are contiguous runs of the input, returned as sub-slices. The
/// character budget sums raw word lengths without separators.
pub fn merge_grouped<'a>(words: &'a [WordToken], params: &CaptionParams) -> Vec<&'a [WordToken]> {
    let mut groups = Vec::new();
    let mut group_start = 0;
    let mut group_chars = 0;

    for (idx, word) in words.iter().enumerate() {
        let word_chars = char_len(&word.text);

        if idx == group_start {
            group_chars = word_chars;
            continue;
        }

        let last = &words[idx - 1];
        let joins = word.start - last.start <= params.max_overlap_seconds
            && idx - group_start < params.max_words
            && group_chars + word_chars <= params.max_characters
            && !ends_sentence(&last.text);

        if joins {
            group_chars += word_chars;
        } else {
            groups.push(&words[group_start..idx]);
            group_start = idx;
            group_chars = word_chars;
        }
    }

    if group_start < words.len() {
        groups.push(&words[group_start..]);
    }

    groups
}
