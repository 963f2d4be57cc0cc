//! Decoded map pixels.

use crate::error::ProviderError;

/// Bits per pixel used when a request does not specify the depth.
pub const DEFAULT_BPP: u8 = 24;

/// Rectangle of pixels in the image space of one map.
///
/// `x` and `y` are the top-left corner, `y` grows downwards. A `bpp` of 0 in a request means
/// "any depth".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bits per pixel.
    pub bpp: u8,
}

impl PixelRect {
    /// Creates a rectangle without a pixel depth.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            bpp: 0,
        }
    }

    /// Rectangle covering a whole `width` x `height` image.
    pub fn whole(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Sets the pixel depth.
    pub fn with_bpp(mut self, bpp: u8) -> Self {
        self.bpp = bpp;
        self
    }

    /// Column after the last one.
    pub fn x_end(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// Row after the last one.
    pub fn y_end(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    /// Returns true if the rectangle has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes used by one pixel, rounded up.
    pub fn bytes_per_pixel(&self) -> usize {
        (usize::from(self.bpp) + 7) / 8
    }

    /// Bytes in one row.
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    /// Bytes needed to hold the whole rectangle.
    pub fn byte_len(&self) -> usize {
        self.row_stride() * self.height as usize
    }

    /// Returns true if `other` lies inside this rectangle and, when `other` specifies a depth, the
    /// depths are the same.
    pub fn contains(&self, other: &PixelRect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.x_end() <= self.x_end()
            && other.y_end() <= self.y_end()
            && (other.bpp == 0 || other.bpp == self.bpp)
    }

    /// Returns true if the rectangle is non-empty and lies inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_empty() && self.x_end() <= u64::from(width) && self.y_end() <= u64::from(height)
    }
}

/// Block of decoded pixels, stored row by row without padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuf {
    rect: PixelRect,
    data: Vec<u8>,
}

impl PixelBuf {
    /// Wraps decoded bytes. The length must match the rectangle and its depth.
    pub fn new(rect: PixelRect, data: Vec<u8>) -> Result<Self, ProviderError> {
        if rect.bpp == 0 {
            return Err(ProviderError::UnsupportedDepth(0));
        }
        if data.len() != rect.byte_len() {
            return Err(ProviderError::InvalidBuffer {
                expected: rect.byte_len(),
                actual: data.len(),
            });
        }

        Ok(Self { rect, data })
    }

    /// Rectangle of the map covered by the buffer.
    pub fn rect(&self) -> &PixelRect {
        &self.rect
    }

    /// Bits per pixel.
    pub fn bpp(&self) -> u8 {
        self.rect.bpp
    }

    /// Bytes in one row.
    pub fn row_stride(&self) -> usize {
        self.rect.row_stride()
    }

    /// Raw bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer, returning raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Bytes of the map row `y`, if the buffer has it.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y < self.rect.y || u64::from(y) >= self.rect.y_end() {
            return None;
        }

        let start = (y - self.rect.y) as usize * self.row_stride();
        self.data.get(start..start + self.row_stride())
    }

    /// Bytes of the map pixel at `(x, y)`, if the buffer has it.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x < self.rect.x || u64::from(x) >= self.rect.x_end() {
            return None;
        }

        let bpp = self.rect.bytes_per_pixel();
        let start = (x - self.rect.x) as usize * bpp;
        self.row(y)?.get(start..start + bpp)
    }

    /// Copies a part of the buffer. `rect` is in map coordinates and must lie inside the buffer.
    pub fn extract(&self, rect: &PixelRect) -> Option<PixelBuf> {
        if !self.rect.contains(rect) {
            return None;
        }

        let rect = rect.with_bpp(self.rect.bpp);
        let bpp = rect.bytes_per_pixel();
        let offset = (rect.x - self.rect.x) as usize * bpp;
        let mut data = Vec::with_capacity(rect.byte_len());
        for y in rect.y..rect.y + rect.height {
            let row = self.row(y)?;
            data.extend_from_slice(row.get(offset..offset + rect.row_stride())?);
        }

        Some(Self { rect, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn gradient(rect: PixelRect) -> PixelBuf {
        let mut data = Vec::new();
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                data.push(x as u8);
                data.push(y as u8);
            }
        }
        PixelBuf::new(rect, data).expect("valid buffer")
    }

    #[test]
    fn contains_respects_depth() {
        let stored = PixelRect::new(0, 0, 100, 100).with_bpp(24);
        assert!(stored.contains(&PixelRect::new(10, 10, 20, 20)));
        assert!(stored.contains(&PixelRect::new(10, 10, 20, 20).with_bpp(24)));
        assert!(!stored.contains(&PixelRect::new(10, 10, 20, 20).with_bpp(16)));
        assert!(!stored.contains(&PixelRect::new(90, 10, 20, 20)));
        assert!(stored.contains(&stored));
    }

    #[test]
    fn sizes() {
        let rect = PixelRect::new(0, 0, 10, 4).with_bpp(24);
        assert_eq!(rect.row_stride(), 30);
        assert_eq!(rect.byte_len(), 120);
        assert_eq!(PixelRect::new(0, 0, 10, 4).with_bpp(16).byte_len(), 80);
    }

    #[test]
    fn fits_within() {
        assert!(PixelRect::new(0, 0, 10, 10).fits_within(10, 10));
        assert!(!PixelRect::new(1, 0, 10, 10).fits_within(10, 10));
        assert!(!PixelRect::new(0, 0, 0, 10).fits_within(10, 10));
        assert!(!PixelRect::new(u32::MAX, 0, 2, 1).fits_within(u32::MAX, 10));
    }

    #[test]
    fn new_checks_length() {
        let rect = PixelRect::new(0, 0, 2, 2).with_bpp(8);
        assert_matches!(
            PixelBuf::new(rect, vec![0; 3]),
            Err(ProviderError::InvalidBuffer {
                expected: 4,
                actual: 3
            })
        );
        assert_matches!(
            PixelBuf::new(PixelRect::new(0, 0, 2, 2), vec![0; 4]),
            Err(ProviderError::UnsupportedDepth(0))
        );
    }

    #[test]
    fn pixel_uses_map_coordinates() {
        let buf = gradient(PixelRect::new(10, 20, 5, 5).with_bpp(16));
        assert_eq!(buf.pixel(12, 23), Some(&[12u8, 23][..]));
        assert_eq!(buf.pixel(9, 23), None);
        assert_eq!(buf.pixel(12, 25), None);
    }

    #[test]
    fn extract_sub_rect() {
        let buf = gradient(PixelRect::new(10, 20, 8, 8).with_bpp(16));
        let part = buf
            .extract(&PixelRect::new(12, 21, 3, 2))
            .expect("inside the buffer");
        assert_eq!(part.rect(), &PixelRect::new(12, 21, 3, 2).with_bpp(16));
        assert_eq!(part.bytes(), &[12, 21, 13, 21, 14, 21, 12, 22, 13, 22, 14, 22]);
        assert!(buf.extract(&PixelRect::new(0, 0, 3, 2)).is_none());
    }
}
