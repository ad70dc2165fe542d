//! Generate pipeline tests
//!
//! Drive `DeckPipeline` end to end with a fake capturer: validation, cropped
//! images, scratch cleanup and retention.

mod common;

use common::{file_names, part_names, read_part, seed_old_decks, FakeCapturer, PNG_BYTES};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use webdeck::error::{Error, PipelineError};
use webdeck::pipeline::{CaptureRequestItem, DeckPipeline};
use webdeck::retention::RetentionStore;

struct Fixture {
    _root: tempfile::TempDir,
    capturer: Arc<FakeCapturer>,
    pipeline: DeckPipeline,
}

impl Fixture {
    fn new(capturer: FakeCapturer) -> Self {
        let root = tempfile::tempdir().unwrap();
        let capturer = Arc::new(capturer);
        let pipeline = DeckPipeline::new(
            capturer.clone(),
            RetentionStore::new(root.path().join("presentations"), 10),
        )
        .with_scratch_root(root.path().join("scratch"));
        Self {
            _root: root,
            capturer,
            pipeline,
        }
    }

    fn retention_dir(&self) -> &Path {
        self.pipeline.retention().dir()
    }

    fn scratch_dir(&self) -> std::path::PathBuf {
        self.retention_dir().parent().unwrap().join("scratch")
    }
}

fn urls(n: usize) -> Vec<CaptureRequestItem> {
    (0..n)
        .map(|i| CaptureRequestItem::url(format!("https://site{}.example", i)))
        .collect()
}

#[tokio::test]
async fn test_empty_batch_rejected_without_side_effects() {
    let fx = Fixture::new(FakeCapturer::new());
    seed_old_decks(fx.retention_dir(), 12);

    let err = fx.pipeline.generate(Vec::new()).await.unwrap_err();
    assert!(matches!(err, Error::Pipeline(PipelineError::EmptyBatch)));
    assert!(err.is_client_error());
    assert!(fx.capturer.calls().is_empty());
    assert_eq!(file_names(fx.retention_dir()).len(), 12);
}

#[tokio::test]
async fn test_oversized_batch_rejected_before_capture() {
    let fx = Fixture::new(FakeCapturer::new());

    let err = fx.pipeline.generate(urls(21)).await.unwrap_err();
    assert_eq!(err.to_string(), "Pipeline error: Maximum 20 URLs allowed");
    assert!(matches!(
        err,
        Error::Pipeline(PipelineError::BatchTooLarge { max: 20, actual: 21 })
    ));
    assert!(fx.capturer.calls().is_empty());
    assert!(!fx.scratch_dir().exists() || file_names(&fx.scratch_dir()).is_empty());
}

#[tokio::test]
async fn test_max_batch_accepted_in_order() {
    let fx = Fixture::new(FakeCapturer::new());

    let deck = fx.pipeline.generate(urls(20)).await.unwrap();
    assert_eq!(deck.slide_count, 20);

    let expected: Vec<String> = (0..20).map(|i| format!("https://site{}.example", i)).collect();
    assert_eq!(fx.capturer.calls(), expected);

    let bytes = std::fs::read(&deck.path).unwrap();
    let parts = part_names(&bytes);
    assert!(parts.contains(&"ppt/slides/slide21.xml".to_string()));
    assert!(!parts.contains(&"ppt/slides/slide22.xml".to_string()));
}

#[tokio::test]
async fn test_cropped_image_used_verbatim_without_capture() {
    let fx = Fixture::new(FakeCapturer::new());
    let crop = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRuser-crop".to_vec();

    let deck = fx
        .pipeline
        .generate(vec![
            CaptureRequestItem::cropped("https://cropped.example", crop.clone()),
            CaptureRequestItem::url("https://captured.example"),
        ])
        .await
        .unwrap();

    assert_eq!(fx.capturer.calls(), vec!["https://captured.example".to_string()]);

    let bytes = std::fs::read(&deck.path).unwrap();
    assert_eq!(read_part(&bytes, "ppt/media/image1.png").unwrap(), crop);
    assert_eq!(read_part(&bytes, "ppt/media/image2.png").unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn test_deck_title_and_labels() {
    let fx = Fixture::new(FakeCapturer::new());
    let deck = fx.pipeline.generate(urls(2)).await.unwrap();
    let bytes = std::fs::read(&deck.path).unwrap();

    let title = String::from_utf8(read_part(&bytes, "ppt/slides/slide1.xml").unwrap()).unwrap();
    assert!(title.contains("Web Screenshots Presentation"));
    assert!(title.contains("Generated with 2 slides"));

    let second = String::from_utf8(read_part(&bytes, "ppt/slides/slide3.xml").unwrap()).unwrap();
    assert!(second.contains("Slide 2"));
}

#[tokio::test]
async fn test_scratch_directory_removed_after_success() {
    let fx = Fixture::new(FakeCapturer::new());
    fx.pipeline.generate(urls(3)).await.unwrap();
    assert!(file_names(&fx.scratch_dir()).is_empty());
}

#[tokio::test]
async fn test_failure_cleans_up_and_still_prunes() {
    let fx = Fixture::new(FakeCapturer::failing_on("https://site1.example"));
    seed_old_decks(fx.retention_dir(), 11);

    let err = fx.pipeline.generate(urls(3)).await.unwrap_err();
    assert_eq!(err.to_string(), "Pipeline error: Failed to generate presentation");
    assert!(matches!(err, Error::Pipeline(PipelineError::GenerationFailed(_))));
    assert!(err.is_navigation_timeout());

    // No retries, and nothing after the failing item is attempted.
    assert_eq!(
        fx.capturer.calls(),
        vec!["https://site0.example".to_string(), "https://site1.example".to_string()]
    );
    assert!(file_names(&fx.scratch_dir()).is_empty());
    assert_eq!(file_names(fx.retention_dir()).len(), 10);
}

#[tokio::test]
async fn test_retention_keeps_newest_ten() {
    let fx = Fixture::new(FakeCapturer::new());
    let seeded = seed_old_decks(fx.retention_dir(), 12);

    let deck = fx.pipeline.generate(urls(1)).await.unwrap();

    let kept = file_names(fx.retention_dir());
    assert_eq!(kept.len(), 10);
    assert_eq!(kept.last().unwrap(), deck.path.file_name().unwrap().to_str().unwrap());
    for old in &seeded[..3] {
        assert!(!old.exists(), "{} should have been pruned", old.display());
    }
}

#[tokio::test]
async fn test_persisted_name_format() {
    let fx = Fixture::new(FakeCapturer::new());
    let deck = fx.pipeline.generate(urls(1)).await.unwrap();

    let name = deck.path.file_name().unwrap().to_str().unwrap().to_string();
    let stamp = name
        .strip_prefix("presentation_")
        .and_then(|s| s.strip_suffix(".pptx"))
        .unwrap();
    assert!(stamp.parse::<i64>().unwrap() > 1_600_000_000);
    assert_eq!(deck.path.parent().unwrap(), fx.retention_dir());
}

#[tokio::test]
async fn test_deck_bytes_survive_prune_of_own_file() {
    let fx = Fixture::new(FakeCapturer::new());
    std::fs::create_dir_all(fx.retention_dir()).unwrap();
    for i in 0..10u64 {
        let name = format!("presentation_{}.pptx", 9_000_000_000 + i);
        std::fs::write(fx.retention_dir().join(name), b"newer").unwrap();
    }

    let deck = fx.pipeline.generate(urls(1)).await.unwrap();

    assert_eq!(deck.slide_count, 1);
    assert!(!deck.path.exists(), "own deck sorts oldest and is pruned");
    assert!(read_part(&deck.data, "ppt/slides/slide2.xml").is_some());
    assert_eq!(read_part(&deck.data, "ppt/media/image1.png").unwrap(), PNG_BYTES);
    assert_eq!(file_names(fx.retention_dir()).len(), 10);
}
