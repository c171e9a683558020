//! Timestamp band rendering.
//!
//! The band is drawn with a small built-in bitmap font covering exactly the
//! characters a `YYYY-MM-DD HH:MM:SS` timestamp needs, so stamping has no
//! dependency on system fonts.

use chrono::NaiveDateTime;
use image::{DynamicImage, Rgb, RgbImage, imageops};

pub const BAND_HEIGHT: u32 = 30;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

const TEXT_LEFT: u32 = 10;
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_SCALE: u32 = 2;
const GLYPH_ADVANCE: u32 = (GLYPH_WIDTH + 1) * GLYPH_SCALE;

/// Rows of a 5x7 glyph, most significant of the low five bits is the left column.
type Glyph = [u8; GLYPH_HEIGHT as usize];

fn glyph(c: char) -> Option<Glyph> {
    let rows = match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        ' ' => [0x00; GLYPH_HEIGHT as usize],
        _ => return None,
    };
    Some(rows)
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Copy `image` onto a white canvas that is `BAND_HEIGHT` rows taller.
pub fn with_band(image: &DynamicImage) -> RgbImage {
    let source = image.to_rgb8();
    let mut canvas = RgbImage::from_pixel(source.width(), source.height() + BAND_HEIGHT, WHITE);
    imageops::replace(&mut canvas, &source, 0, 0);
    canvas
}

/// Draw `text` in black with its top-left corner at (`x`, `y`).
///
/// Pixels that land outside the canvas are dropped.
fn draw_text(canvas: &mut RgbImage, text: &str, x: u32, y: u32) {
    let (width, height) = canvas.dimensions();

    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else { continue };
        let origin_x = x + i as u32 * GLYPH_ADVANCE;

        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                for dy in 0..GLYPH_SCALE {
                    for dx in 0..GLYPH_SCALE {
                        let px = origin_x + col * GLYPH_SCALE + dx;
                        let py = y + row as u32 * GLYPH_SCALE + dy;
                        if px < width && py < height {
                            canvas.put_pixel(px, py, BLACK);
                        }
                    }
                }
            }
        }
    }
}

/// Append the white band below `image` and write `timestamp` into it.
pub fn stamp(image: &DynamicImage, timestamp: &NaiveDateTime) -> RgbImage {
    let band_top = image.height();
    let mut canvas = with_band(image);

    let text = format_timestamp(timestamp);
    let text_top = band_top + (BAND_HEIGHT - GLYPH_HEIGHT * GLYPH_SCALE) / 2;
    draw_text(&mut canvas, &text, TEXT_LEFT, text_top);

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn red(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 10, 10])))
    }

    #[test]
    fn timestamp_uses_canonical_format() {
        let text = format_timestamp(&ts(2024, 1, 15, 14, 30, 5));
        assert_eq!(text, "2024-01-15 14:30:05");
        assert_eq!(text.len(), 19);
    }

    #[test]
    fn timestamp_is_zero_padded_24_hour() {
        assert_eq!(format_timestamp(&ts(2024, 3, 7, 0, 0, 0)), "2024-03-07 00:00:00");
        assert_eq!(format_timestamp(&ts(2024, 12, 31, 23, 59, 59)), "2024-12-31 23:59:59");
    }

    #[test]
    fn every_timestamp_character_has_a_glyph() {
        let text = format_timestamp(&ts(2026, 10, 16, 9, 41, 27));
        assert!(text.chars().all(|c| glyph(c).is_some()), "{text}");
        assert!(glyph('x').is_none());
    }

    #[test]
    fn band_is_appended_and_white() {
        let canvas = with_band(&red(64, 40));
        assert_eq!(canvas.dimensions(), (64, 70));

        for y in 40..70 {
            for x in 0..64 {
                assert_eq!(*canvas.get_pixel(x, y), WHITE, "({x}, {y})");
            }
        }
    }

    #[test]
    fn original_rows_are_untouched() {
        let canvas = stamp(&red(300, 20), &ts(2024, 1, 15, 14, 30, 5));
        for y in 0..20 {
            for x in 0..300 {
                assert_eq!(*canvas.get_pixel(x, y), Rgb([200, 10, 10]));
            }
        }
    }

    #[test]
    fn text_is_black_and_inside_the_band() {
        let canvas = stamp(&red(300, 20), &ts(2024, 1, 15, 14, 30, 5));
        assert_eq!(canvas.dimensions(), (300, 50));

        let black: Vec<(u32, u32)> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == BLACK)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!black.is_empty());

        let min_x = black.iter().map(|p| p.0).min().unwrap();
        let min_y = black.iter().map(|p| p.1).min().unwrap();
        let max_y = black.iter().map(|p| p.1).max().unwrap();
        assert!(min_x >= TEXT_LEFT);
        assert!(min_y >= 20 + 8);
        assert!(max_y < 20 + 8 + GLYPH_HEIGHT * GLYPH_SCALE);

        // everything in the band that is not glyph ink stays white
        for (x, y, p) in canvas.enumerate_pixels().filter(|(_, y, _)| *y >= 20) {
            assert!(*p == WHITE || *p == BLACK, "({x}, {y}) = {p:?}");
        }
    }

    #[test]
    fn narrow_images_clip_the_text() {
        let canvas = stamp(&red(16, 16), &ts(2024, 1, 15, 14, 30, 5));
        assert_eq!(canvas.dimensions(), (16, 46));
    }

    #[test]
    fn alpha_is_flattened_to_rgb() {
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::new(8, 8));
        let canvas = stamp(&rgba, &ts(2024, 1, 15, 14, 30, 5));
        assert_eq!(canvas.dimensions(), (8, 38));
    }

    const CHARSET: &str = "0123456789-: ";

    /// Reads `len` characters back out of a stamped band by sampling the top-left
    /// pixel of every scaled glyph cell.
    fn read_band(canvas: &RgbImage, text_top: u32, len: u32) -> String {
        (0..len)
            .map(|i| {
                let mut rows: Glyph = [0; GLYPH_HEIGHT as usize];
                for (row, bits) in rows.iter_mut().enumerate() {
                    for col in 0..GLYPH_WIDTH {
                        let x = TEXT_LEFT + i * GLYPH_ADVANCE + col * GLYPH_SCALE;
                        let y = text_top + row as u32 * GLYPH_SCALE;
                        if *canvas.get_pixel(x, y) == BLACK {
                            *bits |= 0x10 >> col;
                        }
                    }
                }
                CHARSET
                    .chars()
                    .find(|c| glyph(*c) == Some(rows))
                    .unwrap_or('?')
            })
            .collect()
    }

    #[test]
    fn glyphs_are_distinguishable() {
        for a in CHARSET.chars() {
            for b in CHARSET.chars().filter(|b| *b != a) {
                assert_ne!(glyph(a), glyph(b), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn band_reads_back_as_the_timestamp() {
        for when in [
            ts(2024, 1, 15, 14, 30, 5),
            ts(1999, 12, 31, 23, 59, 59),
            ts(2026, 10, 16, 0, 7, 48),
        ] {
            let canvas = stamp(&red(300, 20), &when);
            assert_eq!(read_band(&canvas, 20 + 8, 19), format_timestamp(&when));
        }
    }

    #[test]
    fn different_timestamps_produce_different_bands() {
        let image = red(300, 20);
        let a = stamp(&image, &ts(2024, 1, 15, 14, 30, 5));
        let b = stamp(&image, &ts(2024, 1, 15, 14, 30, 6));
        let again = stamp(&image, &ts(2024, 1, 15, 14, 30, 5));

        assert_eq!(a, again);
        assert_ne!(a, b);
    }
}
