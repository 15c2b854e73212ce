use image::{GrayImage, Luma, RgbImage};
use mask_maker::{MaskError, MaskValue, PixelBuffer, Session, SessionSettings, View};

fn write_grey(path: &std::path::Path, width: u32, height: u32) {
    GrayImage::from_fn(width, height, |x, y| Luma([(x + y) as u8]))
        .save(path)
        .unwrap();
}

#[test]
fn saved_mask_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.png");
    let destination = dir.path().join("destination.png");
    write_grey(&source, 100, 100);
    write_grey(&destination, 200, 150);

    let mut session = Session::open(&source, &destination, SessionSettings::default()).unwrap();
    session.paint(50, 50, MaskValue::Marked);
    session.paint(199, 149, MaskValue::Marked);

    let written = session.save_mask(dir.path().join("mask.png")).unwrap();
    let reloaded = PixelBuffer::open(&written).unwrap();
    assert_eq!(&reloaded, session.mask());
}

#[test]
fn saved_source_matches_canvas_and_uses_destination_extension() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.png");
    let destination = dir.path().join("destination.png");
    write_grey(&source, 100, 100);
    write_grey(&destination, 200, 150);

    let mut session = Session::open(&source, &destination, SessionSettings::default()).unwrap();
    assert_eq!(session.destination_extension(), Some("png"));
    session.pan(5, -3);

    let written = session
        .save_transformed_source(dir.path().join("adjusted"))
        .unwrap();
    assert_eq!(written, dir.path().join("adjusted.png"));
    let reloaded = PixelBuffer::open(&written).unwrap();
    assert_eq!(reloaded.dimensions(), (200, 150));
    assert_eq!(&reloaded, session.transformed_source());
}

#[test]
fn mode_mismatch_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.png");
    let destination = dir.path().join("destination.png");
    write_grey(&source, 10, 10);
    RgbImage::new(10, 10).save(&destination).unwrap();

    let result = Session::open(&source, &destination, SessionSettings::default());
    assert!(matches!(result, Err(MaskError::ModeMismatch { .. })));
}

#[test]
fn unreadable_and_unwritable_paths_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.png");
    let source = dir.path().join("source.png");
    write_grey(&source, 10, 10);

    assert!(matches!(
        Session::open(&missing, &source, SessionSettings::default()),
        Err(MaskError::Image { .. })
    ));

    let mut session = Session::open(&source, &source, SessionSettings::default()).unwrap();
    session.set_active_view(View::Mask);
    let before = session.render().unwrap();
    let result = session.save_mask(dir.path().join("no-such-dir").join("mask.png"));
    assert!(matches!(result, Err(MaskError::Image { .. })));
    assert_eq!(session.render().unwrap(), before);
}
