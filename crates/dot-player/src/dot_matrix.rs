//! Dot-matrix rendering data: the dotted album art and the timer font.

use std::collections::BTreeMap;
use std::path::Path;

use image::GrayImage;
use serde::Deserialize;

use crate::error::PlayerError;

/// Power applied to brightness so dark and bright dots separate more.
const CONTRAST_EXPONENT: f32 = 1.5;

const BUILTIN_FONT: &str = include_str!("../assets/dot_font.json");

/// Brightness grid for one album cover, row-major, values in `[0, 1]`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DotMatrixArt {
    pub matrix: Vec<f32>,
    pub cols: usize,
}

/// One dot of the album art, positioned as fractions of the art area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArtDot {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl DotMatrixArt {
    /// # Errors
    ///
    /// Returns [`PlayerError::Format`] if `raw` is not a `{matrix, cols}` object.
    pub fn from_json(raw: &str) -> Result<Self, PlayerError> {
        serde_json::from_str(raw).map_err(|source| PlayerError::Format {
            what: "dot-matrix art",
            source,
        })
    }

    /// Samples a grayscale cover every `spacing` pixels, starting at the
    /// top-left pixel. Each sample becomes its brightness over 255.
    pub fn from_luma(image: &GrayImage, spacing: u32) -> Self {
        let step = spacing.max(1);
        let (width, height) = image.dimensions();
        let matrix = (0..height)
            .step_by(step as usize)
            .flat_map(move |y| {
                (0..width)
                    .step_by(step as usize)
                    .map(move |x| f32::from(image.get_pixel(x, y)[0]) / 255.0)
            })
            .collect();
        Self {
            matrix,
            cols: width.div_ceil(step) as usize,
        }
    }

    /// Decodes an encoded cover (JPEG or PNG) and samples it.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Image`] if the bytes are not a decodable image.
    pub fn from_image_bytes(bytes: &[u8], spacing: u32) -> Result<Self, PlayerError> {
        let image = image::load_from_memory(bytes).map_err(|source| PlayerError::Image {
            what: "in-memory cover".to_string(),
            source,
        })?;
        Ok(Self::from_luma(&image.to_luma8(), spacing))
    }

    /// Opens a cover file and samples it.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Image`] if the file is missing or cannot be decoded.
    pub fn from_image_path(path: &Path, spacing: u32) -> Result<Self, PlayerError> {
        let image = image::open(path).map_err(|source| PlayerError::Image {
            what: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_luma(&image.to_luma8(), spacing))
    }

    /// Number of rows as `len / cols`. A ragged last row counts fractionally,
    /// so the rows above it keep their spacing.
    pub fn row_span(&self) -> f32 {
        if self.cols == 0 {
            0.0
        } else {
            self.matrix.len() as f32 / self.cols as f32
        }
    }

    /// Dots in matrix order. A zero-column matrix has no dots.
    pub fn dots(&self) -> impl Iterator<Item = ArtDot> + '_ {
        let cols = self.cols;
        let rows = self.row_span();
        let len = if cols == 0 { 0 } else { self.matrix.len() };
        self.matrix[..len].iter().enumerate().map(move |(i, &brightness)| ArtDot {
            x: (i % cols) as f32 / cols as f32,
            y: (i / cols) as f32 / rows,
            scale: brightness.clamp(0.0, 1.0).powf(CONTRAST_EXPONENT),
        })
    }
}

/// A single character of the timer font.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Glyph {
    pub cols: usize,
    pub bits: Vec<bool>,
}

impl Glyph {
    pub fn rows(&self) -> usize {
        if self.cols == 0 {
            0
        } else {
            self.bits.len() / self.cols
        }
    }

    pub fn is_lit(&self, row: usize, col: usize) -> bool {
        col < self.cols && self.bits.get(row * self.cols + col).copied().unwrap_or(false)
    }
}

/// Bitmap font for the dot-matrix timer (digits and colon).
///
/// The page ships it as JSON: each key is one character and each value is a
/// list of rows written as `'0'`/`'1'` strings.
#[derive(Clone, Debug, Default)]
pub struct DotFont {
    glyphs: BTreeMap<char, Glyph>,
    rows: usize,
}

impl DotFont {
    /// # Errors
    ///
    /// Returns [`PlayerError::Format`] for malformed JSON and
    /// [`PlayerError::GlyphKey`] for a key that is not a single character.
    pub fn from_json(raw: &str) -> Result<Self, PlayerError> {
        let table: BTreeMap<String, Vec<String>> =
            serde_json::from_str(raw).map_err(|source| PlayerError::Format {
                what: "dot font",
                source,
            })?;

        let mut glyphs = BTreeMap::new();
        let mut rows = 0;
        for (key, pattern) in table {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return Err(PlayerError::GlyphKey(key));
            };
            let cols = pattern.iter().map(|row| row.chars().count()).max().unwrap_or(0);
            let bits = pattern
                .iter()
                .flat_map(|row| {
                    let mut padded: Vec<bool> = row.chars().map(|bit| bit == '1').collect();
                    padded.resize(cols, false);
                    padded
                })
                .collect();
            rows = rows.max(pattern.len());
            glyphs.insert(ch, Glyph { cols, bits });
        }

        Ok(Self { glyphs, rows })
    }

    /// The 5x7 font bundled with the crate, used when the page has none.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_FONT).unwrap_or_default()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Glyph for `ch`, or an all-off glyph of digit width if the font lacks it.
    pub fn glyph(&self, ch: char) -> Glyph {
        if let Some(glyph) = self.glyphs.get(&ch) {
            return glyph.clone();
        }
        let cols = self.glyphs.get(&'0').map_or(5, |g| g.cols);
        Glyph {
            cols,
            bits: vec![false; cols * self.rows],
        }
    }

    pub fn render(&self, text: &str) -> Vec<Glyph> {
        text.chars().map(|ch| self.glyph(ch)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn art_dots_are_laid_out_row_major() {
        let art = DotMatrixArt {
            matrix: vec![0.0, 1.0, 0.25, 0.5, 1.0, 0.0],
            cols: 3,
        };
        assert_eq!(art.row_span(), 2.0);

        let dots: Vec<ArtDot> = art.dots().collect();
        assert_eq!(dots.len(), 6);
        assert_eq!((dots[1].x, dots[1].y), (1.0 / 3.0, 0.0));
        assert_eq!((dots[3].x, dots[3].y), (0.0, 0.5));
        assert!(dots.iter().all(|d| (0.0..1.0).contains(&d.x) && (0.0..1.0).contains(&d.y)));
    }

    #[test]
    fn art_scale_boosts_contrast() {
        let art = DotMatrixArt {
            matrix: vec![0.25, 1.0, 1.7],
            cols: 3,
        };
        let scales: Vec<f32> = art.dots().map(|d| d.scale).collect();
        assert!((scales[0] - 0.125).abs() < 1e-6);
        assert_eq!(scales[1], 1.0);
        assert_eq!(scales[2], 1.0);
    }

    #[test]
    fn zero_column_art_has_no_dots() {
        let art = DotMatrixArt {
            matrix: vec![0.5; 4],
            cols: 0,
        };
        assert_eq!(art.row_span(), 0.0);
        assert_eq!(art.dots().count(), 0);
    }

    #[test]
    fn art_parses_from_page_json() {
        let art = DotMatrixArt::from_json(r#"{"matrix": [0.1, 0.9], "cols": 2}"#).unwrap();
        assert_eq!(art.cols, 2);
        assert!(DotMatrixArt::from_json("null").is_err());
    }

    #[test]
    fn builtin_font_covers_timer_characters() {
        let font = DotFont::builtin();
        assert_eq!(font.rows(), 7);
        for ch in "0123456789:".chars() {
            let glyph = font.glyph(ch);
            assert_eq!(glyph.rows(), 7, "glyph {ch}");
            assert!(glyph.bits.iter().any(|&b| b), "glyph {ch} is blank");
        }
        assert_eq!(font.glyph(':').cols, 3);
    }

    #[test]
    fn missing_glyph_renders_blank() {
        let font = DotFont::builtin();
        let glyphs = font.render("1?");
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[1].cols, 5);
        assert_eq!(glyphs[1].rows(), 7);
        assert!(glyphs[1].bits.iter().all(|&b| !b));
    }

    #[test]
    fn font_rows_are_padded_to_widest() {
        let font = DotFont::from_json(r#"{"1": ["01", "1"]}"#).unwrap();
        let glyph = font.glyph('1');
        assert_eq!(glyph.cols, 2);
        assert!(glyph.is_lit(0, 1));
        assert!(glyph.is_lit(1, 0));
        assert!(!glyph.is_lit(1, 1));
    }

    #[test]
    fn multi_char_glyph_key_is_rejected() {
        let err = DotFont::from_json(r#"{"10": ["1"]}"#).unwrap_err();
        assert!(matches!(err, PlayerError::GlyphKey(key) if key == "10"));
    }

    #[test]
    fn ragged_last_row_keeps_row_spacing() {
        let art = DotMatrixArt {
            matrix: vec![1.0; 5],
            cols: 2,
        };
        assert_eq!(art.row_span(), 2.5);
        let ys: Vec<f32> = art.dots().map(|d| d.y).collect();
        assert_eq!(ys, vec![0.0, 0.0, 0.4, 0.4, 0.8]);
    }

    #[test]
    fn cover_is_sampled_every_spacing_pixels() {
        // brightness grows left to right: 0, 51, 102, 153, 204
        let image = GrayImage::from_fn(5, 3, |x, _| image::Luma([(x * 51) as u8]));
        let art = DotMatrixArt::from_luma(&image, 2);
        assert_eq!(art.cols, 3);
        assert_eq!(art.matrix.len(), 6);
        assert_eq!(art.matrix[..3], [0.0, 102.0 / 255.0, 204.0 / 255.0]);
        assert_eq!(art.matrix[..3], art.matrix[3..]);

        let full = DotMatrixArt::from_luma(&image, 0);
        assert_eq!((full.cols, full.matrix.len()), (5, 15));
    }

    #[test]
    fn encoded_cover_is_decoded_before_sampling() {
        let image = GrayImage::from_pixel(4, 4, image::Luma([255]));
        let mut png = std::io::Cursor::new(Vec::new());
        image.write_to(&mut png, image::ImageFormat::Png).unwrap();

        let art = DotMatrixArt::from_image_bytes(png.get_ref(), 2).unwrap();
        assert_eq!(art.cols, 2);
        assert!(art.matrix.iter().all(|&b| b == 1.0));

        let err = DotMatrixArt::from_image_bytes(b"not an image", 2).unwrap_err();
        assert!(matches!(err, PlayerError::Image { .. }));
    }
}
