use image::{Rgb, RgbImage};

use super::*;
use crate::media::fake::FakeTransform;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "slidecast_compose_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, w: u32, h: u32, color: [u8; 3]) {
    RgbImage::from_pixel(w, h, Rgb(color)).save(path).unwrap();
}

fn frames(dir: &Path, captions: &[&str]) -> Vec<CaptionedFrame> {
    captions
        .iter()
        .enumerate()
        .map(|(i, caption)| {
            let image = dir.join(format!("src{i}.png"));
            write_png(&image, 200, 100, [200, 10, 10]);
            CaptionedFrame {
                ordinal: i,
                image,
                caption: (*caption).to_owned(),
            }
        })
        .collect()
}

fn settings(props: &CaptionProperties) -> ComposeSettings<'_> {
    ComposeSettings {
        canvas: Canvas {
            width: 100,
            height: 100,
        },
        props,
        wrap_width: 10,
        threads: Some(2),
    }
}

#[test]
fn frame_names_are_zero_padded() {
    assert_eq!(frame_file_name(0), "image0000.png");
    assert_eq!(frame_file_name(42), "image0042.png");
    assert_eq!(frame_file_name(12345), "image12345.png");
}

#[test]
fn compose_letterboxes_and_hands_wrapped_caption_to_renderer() {
    let dir = scratch_dir("one");
    let out = dir.join("out");
    std::fs::create_dir_all(&out).unwrap();
    let frame = &frames(&dir, &["a caption that needs wrapping"])[0];
    let props = CaptionProperties::default();
    let fake = FakeTransform::default();

    let path = compose(frame, &out, &settings(&props), &fake, &CancelToken::new()).unwrap();
    assert_eq!(path, out.join("image0000.png"));

    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (100, 100));
    assert_eq!(img.get_pixel(50, 5).0, [0, 0, 0]);
    assert_eq!(img.get_pixel(50, 50).0, [200, 10, 10]);

    let drawn = fake.drawn.lock().unwrap();
    assert_eq!(drawn.len(), 1);
    assert_eq!(drawn[0].output, "image0000.png");
    assert_eq!(drawn[0].text, "a caption\nthat needs\nwrapping");

    // Scratch files are gone and the source is untouched.
    let left: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
    assert_eq!(left.len(), 1);
    assert_eq!(image::image_dimensions(&frame.image).unwrap(), (200, 100));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn empty_caption_skips_the_renderer() {
    let dir = scratch_dir("empty");
    let frame = &frames(&dir, &["   "])[0];
    let props = CaptionProperties::default();
    let fake = FakeTransform::default();

    let path = compose(frame, &dir, &settings(&props), &fake, &CancelToken::new()).unwrap();
    assert_eq!(image::image_dimensions(&path).unwrap(), (100, 100));
    assert!(fake.drawn.lock().unwrap().is_empty());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn undecodable_source_fails_with_its_index() {
    let dir = scratch_dir("bad");
    let image = dir.join("broken.png");
    std::fs::write(&image, b"not a png").unwrap();
    let frame = CaptionedFrame {
        ordinal: 7,
        image,
        caption: "x".to_owned(),
    };
    let props = CaptionProperties::default();
    let err = compose(
        &frame,
        &dir,
        &settings(&props),
        &FakeTransform::default(),
        &CancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SlidecastError::CompositionFailed { index: 7, .. }));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn compose_all_returns_paths_in_ordinal_order() {
    let dir = scratch_dir("all");
    let out = dir.join("out");
    std::fs::create_dir_all(&out).unwrap();
    let frames = frames(&dir, &["one", "two", "three", "four", "five"]);
    let props = CaptionProperties::default();
    let fake = FakeTransform::default();

    let paths = compose_all(&frames, &out, &settings(&props), &fake, &CancelToken::new()).unwrap();
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "image0000.png",
            "image0001.png",
            "image0002.png",
            "image0003.png",
            "image0004.png"
        ]
    );

    let mut drawn = fake.drawn.lock().unwrap().clone();
    drawn.sort_by(|a, b| a.output.cmp(&b.output));
    let texts: Vec<&str> = drawn.iter().map(|d| d.text.as_str()).collect();
    assert_eq!(texts, ["one", "two", "three", "four", "five"]);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn compose_all_fails_the_whole_batch_on_one_bad_frame() {
    let dir = scratch_dir("fail");
    let frames = frames(&dir, &["one", "two", "three"]);
    let props = CaptionProperties::default();
    let fake = FakeTransform {
        fail_caption_for: Some("image0001.png".to_owned()),
        ..FakeTransform::default()
    };

    let err = compose_all(&frames, &dir, &settings(&props), &fake, &CancelToken::new())
        .unwrap_err();
    match err {
        SlidecastError::CompositionFailed { index, reason } => {
            assert_eq!(index, 1);
            assert!(reason.contains("drawtext exploded"));
        }
        other => panic!("unexpected error: {other}"),
    }
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn compose_all_honors_run_cancellation() {
    let dir = scratch_dir("cancel");
    let frames = frames(&dir, &["one", "two"]);
    let props = CaptionProperties::default();
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = compose_all(&frames, &dir, &settings(&props), &FakeTransform::default(), &cancel)
        .unwrap_err();
    assert!(matches!(err, SlidecastError::Cancelled));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn zero_threads_is_a_configuration_error() {
    let props = CaptionProperties::default();
    let s = ComposeSettings {
        threads: Some(0),
        ..settings(&props)
    };
    let err = compose_all(
        &[],
        Path::new("."),
        &s,
        &FakeTransform::default(),
        &CancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SlidecastError::Validation(_)));
}
