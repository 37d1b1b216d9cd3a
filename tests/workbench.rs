use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use image::{ImageFormat, Rgba, RgbaImage};
use subject_lift::pipeline::{Pipeline, Settled, Workbench};
use subject_lift::segmentation::{FixtureProvider, InstanceSplitter};
use subject_lift::{Color, Instance, InstanceId, Mask, MaskProvider, ProviderError};

fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn photo() -> RgbaImage {
    RgbaImage::from_fn(40, 20, |x, y| Rgba([x as u8 * 5, y as u8 * 10, 90, 255]))
}

/// Two subjects: a solid square on the left, a soft-edged bar on the right
fn two_subjects() -> FixtureProvider {
    let matte = Mask::from_fn(40, 20, |x, y| {
        if (2..10).contains(&x) && (2..10).contains(&y) {
            1.0
        } else if (25..35).contains(&x) && (5..15).contains(&y) {
            if x == 25 { 0.5 } else { 1.0 }
        } else {
            0.0
        }
    });
    FixtureProvider::from_matte(&matte, InstanceSplitter::new(0.1, 4))
}

#[tokio::test]
async fn load_lists_subjects_left_to_right() {
    let pipeline = Pipeline::new(two_subjects());
    let mut bench = Workbench::new();

    assert_eq!(bench.load(&pipeline, &png_bytes(&photo())).await, Settled::Applied);

    let analysis = bench.analysis().unwrap();
    assert_eq!(analysis.instances().len(), 2);
    let xs: Vec<u32> = analysis
        .by_position()
        .iter()
        .map(|i| i.bounds().unwrap().x)
        .collect();
    assert_eq!(xs, vec![2, 25]);
    assert!(bench.message().is_none());
}

#[tokio::test]
async fn no_instances_keeps_previous_image() {
    let mut bench = Workbench::new();
    let bytes = png_bytes(&photo());

    bench.load(&Pipeline::new(two_subjects()), &bytes).await;
    let before = bench.analysis().unwrap().generation();

    let settled = bench.load(&Pipeline::new(FixtureProvider::empty()), &bytes).await;
    assert_eq!(settled, Settled::Failed);
    assert_eq!(bench.message(), Some(ProviderError::NoInstancesDetected.to_string().as_str()));

    let analysis = bench.analysis().unwrap();
    assert_eq!(analysis.generation(), before);
    assert_eq!(analysis.source(), &photo());
}

#[tokio::test]
async fn undecodable_pick_is_reported() {
    let mut bench = Workbench::new();
    let settled = bench
        .load(&Pipeline::new(two_subjects()), b"not a picture")
        .await;

    assert_eq!(settled, Settled::Failed);
    assert!(bench.analysis().is_none());
    assert!(bench.message().unwrap().contains("not a supported image"));
}

#[tokio::test]
async fn provider_input_errors_surface_once() {
    let failing = FixtureProvider::failing(ProviderError::InvalidInput("grayscale only".to_string()));
    let mut bench = Workbench::new();

    let settled = bench.load(&Pipeline::new(failing), &png_bytes(&photo())).await;
    assert_eq!(settled, Settled::Failed);
    assert_eq!(bench.message(), Some("The image cannot be analyzed: grayscale only"));
}

#[tokio::test]
async fn slow_older_analysis_cannot_overwrite_newer() {
    let slow = Pipeline::new(two_subjects().with_delay(Duration::from_millis(50)));
    let fast = Pipeline::new(FixtureProvider::new(vec![Instance::new(
        InstanceId(7),
        Mask::filled(40, 20, 1.0),
    )]));
    let image = Arc::new(photo());

    let mut bench = Workbench::new();
    let older = bench.begin();
    let newer = bench.begin();

    let (old_result, new_result) = tokio::join!(
        slow.analyze(Arc::clone(&image), older.generation()),
        fast.analyze(Arc::clone(&image), newer.generation()),
    );

    assert_eq!(bench.settle(newer, new_result.map_err(Into::into)), Settled::Applied);
    assert_eq!(bench.settle(older, old_result.map_err(Into::into)), Settled::Stale);

    let analysis = bench.analysis().unwrap();
    assert_eq!(analysis.generation(), newer.generation());
    assert!(analysis.instance(InstanceId(7)).is_some());
}

#[tokio::test]
async fn highlight_preview_extract_and_replace_background() {
    let pipeline = Pipeline::new(two_subjects());
    let mut bench = Workbench::new();
    bench.load(&pipeline, &png_bytes(&photo())).await;

    let ids: Vec<InstanceId> = bench
        .analysis()
        .unwrap()
        .by_position()
        .iter()
        .map(|i| i.id)
        .collect();
    let (left, right) = (ids[0], ids[1]);

    // Combined preview of both highlighted subjects.
    assert!(bench.highlight(left));
    assert!(bench.highlight(right));
    let preview = bench.preview(Color::RED).unwrap();
    assert_eq!(preview.get_pixel(5, 5).0, [255, 0, 0, 255]);
    assert_eq!(preview.get_pixel(30, 10).0, [255, 0, 0, 255]);
    assert_eq!(preview.get_pixel(20, 1).0, [0, 0, 0, 0]);

    // Extraction target stays put while highlights change.
    assert!(bench.select_for_extraction(right));
    bench.unhighlight(right);
    assert_eq!(bench.selection().extracted(), Some(right));

    let cutout = bench.extract().unwrap();
    assert_eq!(cutout.dimensions(), (10, 10));
    assert_eq!(cutout.get_pixel(0, 0)[3], 128);
    assert_eq!(cutout.get_pixel(5, 5), photo().get_pixel(30, 10));

    let background = RgbaImage::from_pixel(10, 10, Rgba([0, 255, 0, 255]));
    let composite = bench.composite(Some(&background)).unwrap();
    assert_eq!(composite.dimensions(), (40, 20));
    assert_eq!(composite.get_pixel(5, 5).0, [0, 255, 0, 255]);
    assert_eq!(composite.get_pixel(30, 10), photo().get_pixel(30, 10));
    assert!(bench.message().is_none());
}

#[tokio::test]
async fn pipelines_can_share_one_provider() {
    let provider: Arc<dyn MaskProvider> = Arc::new(two_subjects());
    let first = Pipeline::with_provider(Arc::clone(&provider));
    let second = Pipeline::with_provider(Arc::clone(&provider));
    assert_eq!(first.provider_name(), "fixture");

    let image = Arc::new(photo());
    let a = first.analyze(Arc::clone(&image), 1).await.unwrap();
    let b = second.analyze(image, 2).await.unwrap();
    assert_eq!(a.instances(), b.instances());
    assert_eq!(Arc::strong_count(&provider), 3);
}
