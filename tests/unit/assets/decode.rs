use std::io::Cursor;

use super::*;

fn encode(img: image::RgbaImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

#[test]
fn decode_png_keeps_straight_alpha() {
    let img = image::RgbaImage::from_raw(2, 1, vec![100, 50, 200, 128, 1, 2, 3, 0]).unwrap();
    let bitmap = decode_image(&encode(img, image::ImageFormat::Png)).unwrap();

    assert_eq!(bitmap.width(), 2);
    assert_eq!(bitmap.height(), 1);
    assert_eq!(bitmap.pixel(0, 0), [100, 50, 200, 128]);
    assert_eq!(bitmap.alpha(1, 0), 0);
    assert_eq!(
        &bitmap.premultiplied()[..4],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_rejects_garbage_as_decode_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, CutframeError::Decode(_)));

    let mut png = encode(
        image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255])),
        image::ImageFormat::Png,
    );
    png.truncate(png.len() / 2);
    assert!(matches!(
        decode_image(&png).unwrap_err(),
        CutframeError::Decode(_)
    ));
}

#[test]
fn validate_accepts_the_four_input_encodings() {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]));
    let png = encode(img.clone(), image::ImageFormat::Png);
    assert_eq!(validate_input(&png, Some("image/png")).unwrap(), InputFormat::Png);
    assert_eq!(validate_input(&png, None).unwrap(), InputFormat::Png);

    let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
    let mut jpg = Vec::new();
    image::DynamicImage::ImageRgb8(rgb)
        .write_to(&mut Cursor::new(&mut jpg), image::ImageFormat::Jpeg)
        .unwrap();
    assert_eq!(validate_input(&jpg, Some("image/jpg")).unwrap(), InputFormat::Jpeg);
}

#[test]
fn validate_rejects_unsupported_media_type_before_sniffing() {
    let png = encode(
        image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255])),
        image::ImageFormat::Png,
    );
    let err = validate_input(&png, Some("image/tiff")).unwrap_err();
    assert!(matches!(err, CutframeError::Validation(_)));
    assert!(err.notice_text().contains("JPG, PNG, GIF, or WebP"));

    let bmp = encode(
        image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255])),
        image::ImageFormat::Bmp,
    );
    assert!(matches!(
        validate_input(&bmp, None).unwrap_err(),
        CutframeError::Validation(_)
    ));
}

#[test]
fn validate_rejects_oversized_input() {
    let big = vec![0u8; MAX_SOURCE_BYTES + 1];
    let err = validate_input(&big, Some("image/png")).unwrap_err();
    assert!(err.notice_text().contains("smaller than 10MB"));
    assert!(matches!(
        decode_image(&big).unwrap_err(),
        CutframeError::Decode(_)
    ));
}

#[test]
fn bitmap_png_roundtrip_preserves_pixels() {
    let bitmap = AlphaBitmap::from_fn(3, 2, |x, y| [x as u8 * 40, y as u8 * 90, 7, 255]).unwrap();
    let back = decode_image(&bitmap.to_png().unwrap()).unwrap();
    assert_eq!(back.pixels(), bitmap.pixels());
}

#[test]
fn bitmap_rejects_mismatched_buffers() {
    assert!(AlphaBitmap::from_rgba8(2, 2, vec![0u8; 15]).is_err());
    assert!(AlphaBitmap::from_rgba8(0, 2, vec![]).is_err());
}
