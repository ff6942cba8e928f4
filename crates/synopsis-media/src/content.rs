//! Interleaving keyframes with a time-coded transcript.

use synopsis_models::{ContentItem, SavedKeyframe, TranscriptSegment};
use tracing::debug;

/// Merge keyframes and transcript segments into one chronological sequence.
///
/// A keyframe's timestamp marks the *end* of the interval it summarises, so
/// each keyframe is first given its predecessor's timestamp as its start (the
/// first starts at zero). The lists are then merged with two pointers: a
/// keyframe goes first when its start is at or before the current segment's
/// start. Whatever remains of either list is appended in order.
pub fn merge_content(keyframes: &[SavedKeyframe], transcript: &[TranscriptSegment]) -> Vec<ContentItem> {
    let starts: Vec<f64> = std::iter::once(0.0)
        .chain(keyframes.iter().map(|k| k.timestamp))
        .take(keyframes.len())
        .collect();

    let mut merged = Vec::with_capacity(keyframes.len() + transcript.len());
    let (mut k, mut t) = (0, 0);
    while k < keyframes.len() && t < transcript.len() {
        if starts[k] <= transcript[t].start {
            merged.push(ContentItem::image(&keyframes[k].reference));
            k += 1;
        } else {
            merged.push(ContentItem::text(&transcript[t].text));
            t += 1;
        }
    }
    merged.extend(keyframes[k..].iter().map(|kf| ContentItem::image(&kf.reference)));
    merged.extend(transcript[t..].iter().map(|seg| ContentItem::text(&seg.text)));

    debug!(
        keyframes = keyframes.len(),
        segments = transcript.len(),
        items = merged.len(),
        "Merged content"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_applies_shift() {
        let keyframes = vec![SavedKeyframe::new("img1", 1.0), SavedKeyframe::new("img2", 6.0)];
        let transcript = vec![
            TranscriptSegment::new(0.0, 2.0, "a"),
            TranscriptSegment::new(5.0, 7.0, "b"),
        ];
        assert_eq!(
            merge_content(&keyframes, &transcript),
            vec![
                ContentItem::image("img1"),
                ContentItem::text("a"),
                ContentItem::image("img2"),
                ContentItem::text("b"),
            ]
        );
    }

    #[test]
    fn test_empty_lists_round_trip() {
        let keyframes = vec![SavedKeyframe::new("x", 3.0), SavedKeyframe::new("y", 9.0)];
        assert_eq!(
            merge_content(&keyframes, &[]),
            vec![ContentItem::image("x"), ContentItem::image("y")]
        );

        let transcript = vec![TranscriptSegment::new(1.0, 2.0, "only")];
        assert_eq!(merge_content(&[], &transcript), vec![ContentItem::text("only")]);
        assert!(merge_content(&[], &[]).is_empty());
    }
}
