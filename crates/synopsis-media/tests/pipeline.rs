//! End-to-end keyframe detection over synthetic lectures.

use image::{Rgb, RgbImage};
use synopsis_media::keyframes::{global_sweep, SegmentKind};
use synopsis_media::{
    merge_content, CellsConfig, CellsStrategy, FrameCursor, HumanRegion, KeyframeDetector,
    LocalImageSink, MediaError, MemoryFrameSource, NoHumanDetector, PrecomputedHumans,
    SceneConfig, StrategyConfig,
};
use synopsis_models::{ContentItem, RawFrameNumber, SampledIndex, TranscriptSegment};

const WIDTH: u32 = 40;
const HEIGHT: u32 = 30;
const FPS: f64 = 10.0;

fn solid(value: u8) -> RgbImage {
    RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([value, value, value]))
}

fn cells_config() -> CellsConfig {
    CellsConfig::default()
        .with_period(1)
        .with_grid(4, 3)
        .with_resize_coef(1.0)
        .with_min_length_secs(0.5)
        .with_back_down_secs(0.0)
        .with_threshold_coefs(2.0, 2.0)
}

/// Empty room for frames 0-9, presenter at the left edge for 10-19, empty
/// again for 20-29. The slide changes between frames 15 and 16.
fn side_presenter_lecture() -> (MemoryFrameSource, PrecomputedHumans) {
    let frames = (0..30).map(|i| if i <= 15 { solid(50) } else { solid(200) }).collect();
    let side = HumanRegion::new(0, 8, 0, HEIGHT);
    let regions = (0..30)
        .map(|i| (10..20).contains(&i).then_some(side))
        .collect();
    (
        MemoryFrameSource::new(frames, FPS),
        PrecomputedHumans::new(regions),
    )
}

fn three_slides() -> MemoryFrameSource {
    let frames = (0..40)
        .map(|i| match i {
            0..=9 => solid(20),
            10..=24 => solid(120),
            _ => solid(220),
        })
        .collect();
    MemoryFrameSource::new(frames, FPS)
}

#[test]
fn test_side_presenter_segments_and_peaks() {
    let (source, mut humans) = side_presenter_lecture();
    let mut cursor = FrameCursor::new(source, 1).unwrap();
    let strategy = CellsStrategy::new(cells_config()).unwrap();

    let analysis = strategy.analyze(&mut cursor, &mut humans).unwrap();

    let kinds: Vec<SegmentKind> = analysis.segments.iter().map(|s| s.segment.kind).collect();
    assert_eq!(
        kinds,
        vec![SegmentKind::Empty, SegmentKind::HumanSide, SegmentKind::Empty]
    );
    assert_eq!(analysis.segments[1].peaks, vec![SampledIndex(15)]);
    assert!(analysis.joint_peaks.is_empty());
    assert_eq!(
        analysis.peaks,
        vec![SampledIndex(9), SampledIndex(15), SampledIndex(29)]
    );
}

#[test]
fn test_detector_reports_raw_frames() {
    let (source, humans) = side_presenter_lecture();
    let mut detector = KeyframeDetector::new(
        source,
        Box::new(humans),
        StrategyConfig::Cells(cells_config()),
    )
    .unwrap();

    let keyframes = detector.detect().unwrap();
    let frames: Vec<RawFrameNumber> = keyframes.iter().map(|k| k.frame).collect();
    assert_eq!(
        frames,
        vec![RawFrameNumber(9), RawFrameNumber(15), RawFrameNumber(29)]
    );
    assert!((keyframes[1].timestamp - 1.5).abs() < 1e-9);
}

#[test]
fn test_centred_presenter_throughout_yields_nothing() {
    let frames = (0..30).map(|i| solid((i * 8) as u8)).collect();
    let centre = HumanRegion::new(16, 24, 0, HEIGHT);
    let humans = PrecomputedHumans::new(vec![Some(centre); 30]);
    let mut detector = KeyframeDetector::new(
        MemoryFrameSource::new(frames, FPS),
        Box::new(humans),
        StrategyConfig::Cells(cells_config()),
    )
    .unwrap();

    assert!(detector.detect().unwrap().is_empty());
}

#[test]
fn test_final_peaks_are_spaced_and_stable() {
    let mut cursor = FrameCursor::new(three_slides(), 1).unwrap();
    let strategy = CellsStrategy::new(cells_config()).unwrap();
    let analysis = strategy.analyze(&mut cursor, &mut NoHumanDetector).unwrap();

    assert!(!analysis.peaks.is_empty());
    for pair in analysis.peaks.windows(2) {
        assert!(pair[1].get() - pair[0].get() > analysis.min_length_frames);
    }
    assert_eq!(
        global_sweep(analysis.peaks.clone(), analysis.min_length_frames),
        analysis.peaks
    );
}

#[test]
fn test_scene_strategy_ignores_presenter() {
    let (source, humans) = side_presenter_lecture();
    let config = StrategyConfig::Scene(SceneConfig::default().with_period(1));
    let mut detector = KeyframeDetector::new(source, Box::new(humans), config).unwrap();

    let keyframes = detector.detect().unwrap();
    assert_eq!(keyframes.len(), 1);
    assert_eq!(keyframes[0].index, SampledIndex(16));
    // One second of rewind at 10 fps.
    assert_eq!(keyframes[0].frame, RawFrameNumber(6));
}

#[test]
fn test_saved_keyframes_merge_with_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let (source, humans) = side_presenter_lecture();
    let mut detector = KeyframeDetector::new(
        source,
        Box::new(humans),
        StrategyConfig::Cells(cells_config()),
    )
    .unwrap();

    let keyframes = detector.detect().unwrap();
    let mut sink = LocalImageSink::new(dir.path()).unwrap();
    let saved = detector.save_keyframes(&keyframes, &mut sink).unwrap();
    assert_eq!(saved.len(), 3);
    for name in ["9.png", "15.png", "29.png"] {
        assert!(dir.path().join(name).is_file(), "missing {}", name);
    }

    let transcript = vec![
        TranscriptSegment::new(0.0, 1.0, "intro"),
        TranscriptSegment::new(1.2, 2.0, "middle"),
        TranscriptSegment::new(2.5, 3.0, "end"),
    ];
    let content = merge_content(&saved, &transcript);
    assert_eq!(
        content,
        vec![
            ContentItem::image(saved[0].reference.clone()),
            ContentItem::text("intro"),
            ContentItem::image(saved[1].reference.clone()),
            ContentItem::text("middle"),
            ContentItem::image(saved[2].reference.clone()),
            ContentItem::text("end"),
        ]
    );
}

#[test]
fn test_keyframe_past_end_of_stream() {
    let (source, humans) = side_presenter_lecture();
    let mut detector = KeyframeDetector::new(
        source,
        Box::new(humans),
        StrategyConfig::Cells(cells_config()),
    )
    .unwrap();

    let mut keyframes = detector.detect().unwrap();
    keyframes.push(synopsis_models::Keyframe::from_sampled(SampledIndex(45), 1, 0, FPS));
    let dir = tempfile::tempdir().unwrap();
    let mut sink = LocalImageSink::new(dir.path()).unwrap();

    let err = detector.save_keyframes(&keyframes, &mut sink).unwrap_err();
    assert!(matches!(
        err,
        MediaError::StreamInconsistency { requested: 45, reached: 30 }
    ));
}
