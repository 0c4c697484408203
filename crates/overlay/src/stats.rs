use crate::font;
use std::collections::BTreeMap;
use std::time::Duration;

/// Scale factor applied to the 8x8 glyphs when rasterizing.
const TEXT_SCALE: u32 = 2;
/// Vertical gap between label lines, in pixels.
const LINE_SPACING: u32 = 2;
/// Top-left corner of the first label line.
const TEXT_ORIGIN: (u32, u32) = (1, 1);
const TEXT_COLOR: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// CPU-side RGBA8 pixel buffer the overlay text is rasterized into.
///
/// Out-of-bounds writes are clipped, so text longer than the buffer is
/// simply cut off at the edge.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major, tightly packed.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.pixels[i..i + 4].copy_from_slice(&color);
    }

    /// Rasterize one line of text at the given top-left position.
    ///
    /// Characters without a glyph (outside printable ASCII) still advance
    /// the cursor so spacing stays consistent.
    fn draw_text(&mut self, x: u32, y: u32, scale: u32, color: [u8; 4], text: &str) {
        let cell = font::GLYPH_SIZE * scale;
        let mut pen_x = x;
        for c in text.chars() {
            if let Some(rows) = font::glyph(c) {
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..font::GLYPH_SIZE {
                        // LSB is the leftmost pixel
                        if (bits >> col) & 1 == 0 {
                            continue;
                        }
                        let px = pen_x + col * scale;
                        let py = y + row as u32 * scale;
                        for dy in 0..scale {
                            for dx in 0..scale {
                                self.set_pixel(px + dx, py + dy, color);
                            }
                        }
                    }
                }
            }
            pen_x += cell;
        }
    }
}

/// Frame-rate overlay state: label map, FPS accumulator, and text buffer.
///
/// Drive it with [`Statistics::update`] once per frame and
/// [`Statistics::count_frame`] once per draw. The buffer re-renders once
/// per elapsed second; [`Statistics::take_dirty`] reports when the render
/// backend should re-upload it.
pub struct Statistics {
    labels: BTreeMap<String, String>,
    frame_rate: u32,
    frame_counter: u32,
    elapsed: Duration,
    buffer: PixelBuffer,
    dirty: bool,
}

impl Statistics {
    pub fn new(width: u32, height: u32) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert("fps".to_string(), "0".to_string());
        Self {
            labels,
            frame_rate: 0,
            frame_counter: 0,
            elapsed: Duration::ZERO,
            buffer: PixelBuffer::new(width, height),
            dirty: false,
        }
    }

    /// Accumulate elapsed time and, once more than a second has passed,
    /// recompute the frame rate and re-render the overlay text.
    ///
    /// Returns whether a re-render happened. The sub-second remainder
    /// carries into the next sample window.
    pub fn update(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        if self.elapsed <= Duration::from_secs(1) {
            return false;
        }
        self.elapsed -= Duration::from_secs(1);

        self.frame_rate = self.frame_counter;
        self.frame_counter = 0;
        self.labels
            .insert("fps".to_string(), self.frame_rate.to_string());
        tracing::debug!(fps = self.frame_rate, "frame rate sampled");

        self.render_text();
        true
    }

    /// Count one drawn frame toward the next FPS sample.
    pub fn count_frame(&mut self) {
        self.frame_counter += 1;
    }

    /// Set an arbitrary display string. It shows up on the next re-render.
    pub fn set(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.labels.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.labels.get(label).map(String::as_str)
    }

    /// Most recently sampled frame rate.
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Reallocate the buffer for a new window size and re-render into it.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.buffer = PixelBuffer::new(width, height);
        self.render_text();
    }

    /// Whether the buffer changed since the last call. Clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn render_text(&mut self) {
        self.buffer.clear();
        let (x, mut y) = TEXT_ORIGIN;
        let line_height = font::GLYPH_SIZE * TEXT_SCALE + LINE_SPACING;
        for (label, value) in &self.labels {
            let line = format!("{label}: {value}");
            self.buffer.draw_text(x, y, TEXT_SCALE, TEXT_COLOR, &line);
            y += line_height;
        }
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sample_before_one_second() {
        let mut stats = Statistics::new(64, 64);
        stats.count_frame();
        assert!(!stats.update(Duration::from_millis(500)));
        assert!(!stats.update(Duration::from_millis(400)));
        assert_eq!(stats.frame_rate(), 0);
    }

    #[test]
    fn samples_once_per_second_and_resets_counter() {
        let mut stats = Statistics::new(64, 64);
        for _ in 0..60 {
            stats.count_frame();
        }
        assert!(stats.update(Duration::from_millis(1100)));
        assert_eq!(stats.frame_rate(), 60);
        assert_eq!(stats.get("fps"), Some("60"));

        // Counter was reset: a slower second yields the new count.
        for _ in 0..30 {
            stats.count_frame();
        }
        assert!(stats.update(Duration::from_millis(1000)));
        assert_eq!(stats.frame_rate(), 30);
    }

    #[test]
    fn subsecond_remainder_carries_over() {
        let mut stats = Statistics::new(64, 64);
        assert!(!stats.update(Duration::from_millis(900)));
        // 900 + 200 = 1100ms: sample fires, 100ms remainder stays.
        assert!(stats.update(Duration::from_millis(200)));
        // 100 + 950 = 1050ms: the carried remainder makes this fire too.
        assert!(stats.update(Duration::from_millis(950)));
    }

    #[test]
    fn label_accessor_round_trip() {
        let mut stats = Statistics::new(64, 64);
        stats.set("camera", "(0.0, 10.0, 30.0)");
        assert_eq!(stats.get("camera"), Some("(0.0, 10.0, 30.0)"));
        assert_eq!(stats.get("missing"), None);
        stats.set("camera", "(1.0, 0.0, 0.0)");
        assert_eq!(stats.get("camera"), Some("(1.0, 0.0, 0.0)"));
    }

    #[test]
    fn render_writes_pixels_and_sets_dirty() {
        let mut stats = Statistics::new(256, 64);
        assert!(!stats.take_dirty());
        assert!(stats.update(Duration::from_millis(1001)));
        assert!(stats.buffer().pixels().iter().any(|&b| b != 0));
        assert!(stats.take_dirty());
        assert!(!stats.take_dirty());
    }

    #[test]
    fn long_text_is_clipped_not_panicking() {
        let mut stats = Statistics::new(8, 8);
        stats.set("a-rather-long-label", "with an even longer value string");
        assert!(stats.update(Duration::from_millis(1500)));
    }

    #[test]
    fn resize_reallocates_and_rerenders() {
        let mut stats = Statistics::new(64, 64);
        stats.resize(128, 32);
        assert_eq!(stats.buffer().width(), 128);
        assert_eq!(stats.buffer().height(), 32);
        assert_eq!(stats.buffer().pixels().len(), 128 * 32 * 4);
        assert!(stats.take_dirty());
    }
}
