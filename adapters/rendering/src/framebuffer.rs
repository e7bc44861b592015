use digital_rain_core::{PixelPoint, PixelRect, Surface, TrueColorImage};
use glam::UVec2;

use crate::RenderingError;

/// In-memory `0x00RRGGBB` surface shared by the window and headless hosts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    size: UVec2,
    pixels: Vec<u32>,
    available: bool,
}

impl FrameBuffer {
    /// Creates a black frame buffer of the provided size.
    pub fn new(size: UVec2) -> Result<Self, RenderingError> {
        if size.x == 0 || size.y == 0 {
            return Err(RenderingError::EmptyFrame { size });
        }

        Ok(Self {
            size,
            pixels: vec![0; size.x as usize * size.y as usize],
            available: true,
        })
    }

    /// Size of the frame buffer in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> UVec2 {
        self.size
    }

    /// Row-major pixels.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at the provided location, if it lies inside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    /// Replaces the contents with black pixels of a new size.
    pub fn resize(&mut self, size: UVec2) -> Result<(), RenderingError> {
        *self = Self {
            available: self.available,
            ..Self::new(size)?
        };
        Ok(())
    }

    /// Sets every pixel to `pixel`.
    pub fn clear(&mut self, pixel: u32) {
        self.pixels.fill(pixel);
    }

    /// Marks whether the buffer may receive blits, mirroring a host losing its surface.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Expands the pixels into opaque RGBA bytes, reusing `out`.
    pub fn write_rgba8(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.pixels.len() * 4);
        for pixel in &self.pixels {
            out.extend_from_slice(&[(pixel >> 16) as u8, (pixel >> 8) as u8, *pixel as u8, 0xff]);
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.size.x as usize + x as usize
    }
}

impl Surface for FrameBuffer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn blit(&mut self, source: &TrueColorImage, source_rect: PixelRect, destination: PixelPoint) {
        let origin = source_rect.origin();
        if origin.x() >= source.width() || destination.x() >= self.size.x {
            return;
        }

        let span = source_rect
            .width()
            .min(source.width() - origin.x())
            .min(self.size.x - destination.x()) as usize;

        for offset in 0..source_rect.height() {
            let source_y = origin.y() + offset;
            let target_y = destination.y() + offset;
            if source_y >= source.height() || target_y >= self.size.y {
                break;
            }

            let from = origin.x() as usize;
            let row = &source.row(source_y)[from..from + span];
            let start = self.index(destination.x(), target_y);
            self.pixels[start..start + span].copy_from_slice(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> TrueColorImage {
        let pixels = (0..width * height).map(|index| index + 1).collect();
        TrueColorImage::new(width, height, pixels).expect("consistent image")
    }

    #[test]
    fn rejects_empty_sizes() {
        assert_eq!(
            FrameBuffer::new(UVec2::new(0, 4)),
            Err(RenderingError::EmptyFrame {
                size: UVec2::new(0, 4)
            })
        );
    }

    #[test]
    fn blit_copies_rectangle_to_destination() {
        let source = checker(4, 4);
        let mut frame = FrameBuffer::new(UVec2::new(6, 6)).expect("frame");

        frame.blit(
            &source,
            PixelRect::new(PixelPoint::new(1, 1), 2, 2),
            PixelPoint::new(3, 2),
        );

        assert_eq!(frame.pixel(3, 2), source.pixel(1, 1));
        assert_eq!(frame.pixel(4, 2), source.pixel(2, 1));
        assert_eq!(frame.pixel(3, 3), source.pixel(1, 2));
        assert_eq!(frame.pixel(4, 3), source.pixel(2, 2));
        assert_eq!(frame.pixels().iter().filter(|pixel| **pixel != 0).count(), 4);
    }

    #[test]
    fn blit_clips_at_the_right_and_bottom_edges() {
        let source = checker(4, 4);
        let mut frame = FrameBuffer::new(UVec2::new(5, 5)).expect("frame");

        frame.blit(
            &source,
            PixelRect::new(PixelPoint::new(0, 0), 4, 4),
            PixelPoint::new(3, 3),
        );

        assert_eq!(frame.pixel(3, 3), source.pixel(0, 0));
        assert_eq!(frame.pixel(4, 4), source.pixel(1, 1));
        assert_eq!(frame.pixels().iter().filter(|pixel| **pixel != 0).count(), 4);
    }

    #[test]
    fn blit_outside_the_frame_is_discarded() {
        let source = checker(2, 2);
        let mut frame = FrameBuffer::new(UVec2::new(3, 3)).expect("frame");

        frame.blit(
            &source,
            PixelRect::new(PixelPoint::new(0, 0), 2, 2),
            PixelPoint::new(3, 0),
        );
        frame.blit(
            &source,
            PixelRect::new(PixelPoint::new(0, 0), 2, 2),
            PixelPoint::new(0, 7),
        );

        assert!(frame.pixels().iter().all(|pixel| *pixel == 0));
    }

    #[test]
    fn rgba_expansion_orders_channels() {
        let mut frame = FrameBuffer::new(UVec2::new(1, 1)).expect("frame");
        frame.clear(0x0012_3456);
        let mut bytes = Vec::new();

        frame.write_rgba8(&mut bytes);

        assert_eq!(bytes, vec![0x12, 0x34, 0x56, 0xff]);
    }

    #[test]
    fn resize_keeps_availability_and_clears() {
        let mut frame = FrameBuffer::new(UVec2::new(2, 2)).expect("frame");
        frame.clear(7);
        frame.set_available(false);

        frame.resize(UVec2::new(3, 1)).expect("resize");

        assert_eq!(frame.dimensions(), UVec2::new(3, 1));
        assert!(frame.pixels().iter().all(|pixel| *pixel == 0));
        assert!(!frame.is_available());
    }
}
