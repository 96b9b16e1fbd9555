use super::*;
use crate::media::fake::FakeTransform;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "slidecast_probe_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_wav(path: &Path, seconds: f64, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let frames = (seconds * f64::from(sample_rate)).round() as u32;
    for i in 0..frames {
        let s = ((i % 100) as i16 - 50) * 100;
        writer.write_sample(s).unwrap();
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn format_detection_is_case_insensitive() {
    assert_eq!(
        AudioFormat::from_path(Path::new("a/Track.MP3")).unwrap(),
        AudioFormat::Mp3
    );
    assert_eq!(
        AudioFormat::from_path(Path::new("x.m4a")).unwrap(),
        AudioFormat::M4a
    );
    assert_eq!(
        AudioFormat::from_path(Path::new("x.wav")).unwrap(),
        AudioFormat::Wav
    );
}

#[test]
fn unknown_or_missing_extension_is_unsupported() {
    for name in ["song.ogg", "song"] {
        let err = AudioFormat::from_path(Path::new(name)).unwrap_err();
        assert!(
            matches!(err, SlidecastError::UnsupportedFormat { .. }),
            "{name}: {err}"
        );
    }
}

#[test]
fn wav_duration_comes_from_header_with_fractional_seconds() {
    let dir = scratch_dir("wav");
    let path = dir.join("tone.wav");
    write_wav(&path, 2.5, 8000);
    let before = std::fs::read(&path).unwrap();

    // The fake would fail on a binary file, so this proves no transform call is made.
    let asset = probe(&path, &FakeTransform::default(), &CancelToken::new()).unwrap();
    assert_eq!(asset.format, AudioFormat::Wav);
    assert!((asset.duration_sec - 2.5).abs() < 1e-9);
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn compressed_formats_use_the_container_probe() {
    let dir = scratch_dir("mp3");
    let path = dir.join("music.mp3");
    std::fs::write(&path, "20.048").unwrap();

    let asset = probe(&path, &FakeTransform::default(), &CancelToken::new()).unwrap();
    assert_eq!(asset.format, AudioFormat::Mp3);
    assert!((asset.duration_sec - 20.048).abs() < 1e-9);
}

#[test]
fn missing_file_is_unsupported_and_named() {
    let dir = scratch_dir("missing");
    let path = dir.join("absent.mp3");
    let err = probe(&path, &FakeTransform::default(), &CancelToken::new()).unwrap_err();
    assert!(matches!(err, SlidecastError::UnsupportedFormat { .. }));
    assert!(err.to_string().contains("absent.mp3"));
}

#[test]
fn corrupt_wav_is_unsupported() {
    let dir = scratch_dir("corrupt");
    let path = dir.join("broken.wav");
    std::fs::write(&path, b"not a riff file").unwrap();
    let err = probe(&path, &FakeTransform::default(), &CancelToken::new()).unwrap_err();
    assert!(matches!(err, SlidecastError::UnsupportedFormat { .. }));
}
