//! Label width measurement.
//!
//! Widths come from a per-glyph advance table scaled by the font size, so
//! measurements are deterministic and need no rendering backend. Results are
//! cached by `(text, max_width, font)`; the cache only grows, bounded by the
//! number of distinct labels seen in a session.

use std::collections::HashMap;

/// Font used for node labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Font {
    pub family: String,
    pub size_px: u32,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size_px: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    text: String,
    max_width: u32,
    font: Font,
}

/// Measures label widths in pixels, with caching.
#[derive(Debug, Clone, Default)]
pub struct LabelMeasurer {
    font: Font,
    cache: HashMap<MeasureKey, f32>,
}

impl LabelMeasurer {
    pub fn new(font: Font) -> Self {
        Self {
            font,
            cache: HashMap::new(),
        }
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Width of `text` in pixels, capped at `max_width`.
    pub fn measure(&mut self, text: &str, max_width: f32) -> f32 {
        let key = MeasureKey {
            text: text.to_string(),
            max_width: max_width.to_bits(),
            font: self.font.clone(),
        };
        if let Some(&width) = self.cache.get(&key) {
            return width;
        }

        let em: f32 = text.chars().map(glyph_advance).sum();
        let width = (em * self.font.size_px as f32).min(max_width);
        self.cache.insert(key, width);
        width
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

/// Advance width of a glyph in ems.
fn glyph_advance(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.28,
        'f' | 't' | 'r' | '/' | '\\' | '(' | ')' | '[' | ']' | '-' | ' ' => 0.36,
        'm' | 'w' | 'M' | 'W' | '@' => 0.86,
        c if c.is_ascii_uppercase() => 0.68,
        c if c.is_ascii_digit() => 0.56,
        c if c.is_ascii() => 0.54,
        // CJK and other wide scripts
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_is_cached() {
        let mut measurer = LabelMeasurer::default();
        let first = measurer.measure("index.ts", 200.0);
        let second = measurer.measure("index.ts", 200.0);
        assert_eq!(first, second);
        assert_eq!(measurer.cache_len(), 1);

        measurer.measure("index.ts", 20.0);
        assert_eq!(measurer.cache_len(), 2);
    }

    #[test]
    fn test_measure_respects_max_width() {
        let mut measurer = LabelMeasurer::default();
        let long = "a-very-long-component-file-name.module.tsx";
        assert_eq!(measurer.measure(long, 100.0), 100.0);
    }

    #[test]
    fn test_wider_glyphs_measure_wider() {
        let mut measurer = LabelMeasurer::default();
        assert!(measurer.measure("mmmm", 500.0) > measurer.measure("iiii", 500.0));
        assert_eq!(measurer.measure("", 500.0), 0.0);
    }

    #[test]
    fn test_font_size_scales() {
        let mut small = LabelMeasurer::new(Font {
            family: "mono".into(),
            size_px: 10,
        });
        let mut large = LabelMeasurer::new(Font {
            family: "mono".into(),
            size_px: 20,
        });
        let a = small.measure("app.js", 1000.0);
        let b = large.measure("app.js", 1000.0);
        assert!((b - 2.0 * a).abs() < 1e-3);
    }
}
