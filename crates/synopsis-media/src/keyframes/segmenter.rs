//! Human-presence segmentation.

use serde::{Deserialize, Serialize};
use synopsis_models::SampledIndex;
use tracing::debug;

use crate::human::Presence;

/// Kind of a segment. Centred-presenter frames never form segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Empty,
    HumanSide,
}

impl SegmentKind {
    fn from_presence(presence: Presence) -> Option<Self> {
        match presence {
            Presence::Empty => Some(Self::Empty),
            Presence::Side => Some(Self::HumanSide),
            Presence::Center => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Empty => "empty",
            SegmentKind::HumanSide => "human_side",
        }
    }
}

/// A run of sampled frames sharing one classification.
///
/// Frames are ascending. Centred frames inside the run are skipped, so
/// indices need not be consecutive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub frames: Vec<SampledIndex>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn first(&self) -> Option<SampledIndex> {
        self.frames.first().copied()
    }

    pub fn last(&self) -> Option<SampledIndex> {
        self.frames.last().copied()
    }
}

/// Group classified frames into segments.
///
/// Frames are grouped while their kind is unchanged (centred frames neither
/// start nor extend a run), runs shorter than `min_length` are dropped, and
/// runs of equal kind made adjacent by the drop are merged.
pub fn build_segments(presences: &[Presence], min_length: usize) -> Vec<Segment> {
    let mut runs: Vec<Segment> = Vec::new();
    for (index, presence) in presences.iter().enumerate() {
        let Some(kind) = SegmentKind::from_presence(*presence) else {
            continue;
        };
        match runs.last_mut() {
            Some(run) if run.kind == kind => run.frames.push(SampledIndex(index)),
            _ => runs.push(Segment {
                kind,
                frames: vec![SampledIndex(index)],
            }),
        }
    }

    let total_runs = runs.len();
    let mut segments: Vec<Segment> = Vec::new();
    for run in runs.into_iter().filter(|r| r.len() >= min_length) {
        match segments.last_mut() {
            Some(last) if last.kind == run.kind => last.frames.extend(run.frames),
            _ => segments.push(run),
        }
    }

    debug!(
        runs = total_runs,
        segments = segments.len(),
        min_length,
        "Segmentation complete"
    );
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use Presence::{Center, Empty, Side};

    fn indices(segment: &Segment) -> Vec<usize> {
        segment.frames.iter().map(|i| i.get()).collect()
    }

    fn check_invariants(segments: &[Segment]) {
        for pair in segments.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
            assert!(pair[0].last() < pair[1].first());
        }
        for segment in segments {
            assert!(!segment.is_empty());
            assert!(segment.frames.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_three_segments() {
        let mut presences = vec![Empty; 10];
        presences.extend(vec![Side; 10]);
        presences.extend(vec![Empty; 10]);
        let segments = build_segments(&presences, 5);
        check_invariants(&segments);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].kind, SegmentKind::HumanSide);
        assert_eq!(indices(&segments[1]), (10..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_center_frames_are_skipped_without_splitting() {
        let presences = vec![Empty, Empty, Center, Center, Empty, Empty];
        let segments = build_segments(&presences, 1);
        assert_eq!(segments.len(), 1);
        assert_eq!(indices(&segments[0]), vec![0, 1, 4, 5]);
    }

    #[test]
    fn test_short_runs_dropped_and_neighbours_merged() {
        let mut presences = vec![Empty; 6];
        presences.extend(vec![Side; 2]);
        presences.extend(vec![Empty; 6]);
        let segments = build_segments(&presences, 5);
        check_invariants(&segments);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 12);
        assert!(!indices(&segments[0]).contains(&6));
    }

    #[test]
    fn test_all_center_yields_nothing() {
        assert!(build_segments(&vec![Center; 40], 5).is_empty());
        assert!(build_segments(&[], 5).is_empty());
    }

    #[test]
    fn test_invariants_over_generated_sequences() {
        let kinds = [Empty, Side, Center];
        // Deterministic pseudo-random sequences.
        let mut state: u64 = 0x2545_f491;
        for _ in 0..200 {
            let presences: Vec<Presence> = (0..60)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    kinds[(state % 3) as usize]
                })
                .collect();
            for min_length in [1, 2, 4] {
                let segments = build_segments(&presences, min_length);
                check_invariants(&segments);
                for segment in &segments {
                    for index in &segment.frames {
                        assert_ne!(presences[index.get()], Center);
                    }
                }
            }
        }
    }
}
