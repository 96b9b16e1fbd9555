use super::*;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "slidecast_input_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn discovery_filters_extensions_and_sorts_by_lowercase_basename() {
    let dir = scratch_dir("sort");
    for name in ["c.png", "B.JPG", "a.jpeg", "notes.txt", "d.gif", "A2.Png"] {
        std::fs::write(dir.join(name), b"x").unwrap();
    }
    std::fs::create_dir_all(dir.join("z.png")).unwrap();

    let found = discover_images(&dir).unwrap();
    assert_eq!(names(&found), ["a.jpeg", "A2.Png", "B.JPG", "c.png"]);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_directory_is_reported() {
    let dir = std::env::temp_dir().join("slidecast_input_definitely_missing_dir");
    let err = discover_images(&dir).unwrap_err();
    assert!(matches!(err, SlidecastError::DirectoryMissing(p) if p == dir));
}

#[test]
fn empty_directory_yields_no_images() {
    let dir = scratch_dir("empty");
    assert!(discover_images(&dir).unwrap().is_empty());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn pairing_keeps_caption_i_with_image_i() {
    let images: Vec<PathBuf> = ["a.png", "b.png", "c.png"].iter().map(PathBuf::from).collect();
    let captions = vec!["Hi".to_owned(), "Bye".to_owned(), "Done".to_owned()];
    let plan = pair_frames(images, captions);

    assert!(plan.truncation.is_none());
    let got: Vec<(usize, &str, &str)> = plan
        .frames
        .iter()
        .map(|f| (f.ordinal, f.image.to_str().unwrap(), f.caption.as_str()))
        .collect();
    assert_eq!(
        got,
        [(0, "a.png", "Hi"), (1, "b.png", "Bye"), (2, "c.png", "Done")]
    );
}

#[test]
fn count_mismatch_truncates_to_shared_minimum() {
    let images: Vec<PathBuf> = (0..8).map(|i| PathBuf::from(format!("img{i}.png"))).collect();
    let captions: Vec<String> = (0..5).map(|i| format!("caption {i}")).collect();
    let plan = pair_frames(images, captions);

    assert_eq!(plan.frames.len(), 5);
    assert_eq!(
        plan.truncation,
        Some(Truncation {
            images: 8,
            captions: 5,
            kept: 5
        })
    );
    for (i, f) in plan.frames.iter().enumerate() {
        assert_eq!(f.ordinal, i);
        assert_eq!(f.image, PathBuf::from(format!("img{i}.png")));
        assert_eq!(f.caption, format!("caption {i}"));
    }

    let plan = pair_frames(vec![PathBuf::from("only.png")], vec!["a".into(), "b".into()]);
    assert_eq!(plan.frames.len(), 1);
    assert_eq!(plan.truncation.unwrap().kept, 1);
}

#[test]
fn hidden_files_are_not_images() {
    let dir = scratch_dir("hidden");
    for name in ["a.png", "._a.png", ".cover.jpg", "b.jpeg"] {
        std::fs::write(dir.join(name), b"x").unwrap();
    }
    let images = discover_images(&dir).unwrap();
    assert_eq!(names(&images), ["a.png", "b.jpeg"]);
}
