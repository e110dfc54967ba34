//! The packed framebuffer shared by the 1-bit panels

use bit_field::BitField;

use crate::color::Color;
use crate::traits::PixelSink;

/// Display rotation, only 90° increments supported
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate by 90 degrees clockwise
    Rotate90,
    /// Rotate by 180 degrees clockwise
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

/// Full-panel 1-bit-per-pixel image in row-major byte order with
/// MSB-first bit packing. A set bit is a black pixel.
///
/// The buffer doubles as the page store for paged drawing: while a page
/// is active only that page's rows are mapped (rebased to the start of
/// the buffer) and writes to any other row are dropped.
///
/// - `WIDTH`/`HEIGHT`: panel size in pixel when the display is not rotated
/// - `BYTECOUNT`: WIDTH / 8 * HEIGHT (redundant until const generic
///   expressions are stabilized)
/// - `PAGES`: page count for paged drawing, must divide HEIGHT
pub struct PackedFramebuffer<
    const WIDTH: u32,
    const HEIGHT: u32,
    const BYTECOUNT: usize,
    const PAGES: u32,
> {
    buffer: [u8; BYTECOUNT],
    rotation: DisplayRotation,
    /// Active page in [0, PAGES), or -1 when not paging
    page: i32,
}

impl<const WIDTH: u32, const HEIGHT: u32, const BYTECOUNT: usize, const PAGES: u32> Default
    for PackedFramebuffer<WIDTH, HEIGHT, BYTECOUNT, PAGES>
{
    // inline is necessary here to allow heap allocation via Box on stack limited programs
    #[inline(always)]
    fn default() -> Self {
        Self {
            // all bits cleared, which is all pixels white
            buffer: [0u8; BYTECOUNT],
            rotation: DisplayRotation::default(),
            page: -1,
        }
    }
}

impl<const WIDTH: u32, const HEIGHT: u32, const BYTECOUNT: usize, const PAGES: u32>
    PackedFramebuffer<WIDTH, HEIGHT, BYTECOUNT, PAGES>
{
    pub(crate) const LINE_BYTES: usize = WIDTH as usize / 8;
    pub(crate) const PAGE_HEIGHT: u32 = HEIGHT / PAGES;
    pub(crate) const PAGE_SIZE: usize = BYTECOUNT / PAGES as usize;

    /// Get the internal buffer, e.g. to stream it to the panel yourself
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The active page, or -1 when not paging
    pub fn current_page(&self) -> i32 {
        self.page
    }

    pub(crate) fn set_page(&mut self, page: u32) {
        self.page = page as i32;
    }

    pub(crate) fn clear_page(&mut self) {
        self.page = -1;
    }

    /// Draws a bitmap in Adafruit GFX byte order through the pixel layer,
    /// so it may be cropped and rotated. A set bit stays white, a cleared
    /// bit gets `color`.
    pub fn draw_bitmap_at(&mut self, x: i32, y: i32, bitmap: &[u8], w: i32, h: i32, color: Color) {
        for x1 in x..x + w {
            for y1 in y..y + h {
                let i = (x1 / 8 + y1 * w / 8) as usize;
                if i >= bitmap.len() {
                    continue;
                }
                let pixelcolor = if bitmap[i] & (0x80 >> (x1 % 8)) != 0 {
                    Color::White
                } else {
                    color
                };
                self.set_pixel(x1, y1, pixelcolor);
            }
        }
    }
}

impl<const WIDTH: u32, const HEIGHT: u32, const BYTECOUNT: usize, const PAGES: u32> PixelSink
    for PackedFramebuffer<WIDTH, HEIGHT, BYTECOUNT, PAGES>
{
    type Color = Color;

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || x >= self.width() as i32 || y < 0 || y >= self.height() as i32 {
            return;
        }

        // move the pixel around according to the rotation
        let (x, y) = match self.rotation {
            DisplayRotation::Rotate0 => (x, y),
            DisplayRotation::Rotate90 => (WIDTH as i32 - 1 - y, x),
            DisplayRotation::Rotate180 => (WIDTH as i32 - 1 - x, HEIGHT as i32 - 1 - y),
            DisplayRotation::Rotate270 => (y, HEIGHT as i32 - 1 - x),
        };

        let mut index = x as usize / 8 + y as usize * Self::LINE_BYTES;
        if self.page < 0 {
            if index >= BYTECOUNT {
                return;
            }
        } else {
            // clip to the active page and rebase into the page slice
            let page_start = Self::PAGE_SIZE * self.page as usize;
            if index < page_start || index >= page_start + Self::PAGE_SIZE {
                return;
            }
            index -= page_start;
        }

        let bit = 7 - (x as usize % 8);
        self.buffer[index].set_bit(bit, color.get_bit_value() == 1);
    }

    fn fill(&mut self, color: Color) {
        let value = color.get_byte_value();
        for byte in self.buffer.iter_mut() {
            *byte = value;
        }
    }

    fn set_rotation(&mut self, rotation: DisplayRotation) {
        self.rotation = rotation;
    }

    fn rotation(&self) -> DisplayRotation {
        self.rotation
    }

    fn width(&self) -> u32 {
        match self.rotation {
            DisplayRotation::Rotate0 | DisplayRotation::Rotate180 => WIDTH,
            DisplayRotation::Rotate90 | DisplayRotation::Rotate270 => HEIGHT,
        }
    }

    fn height(&self) -> u32 {
        match self.rotation {
            DisplayRotation::Rotate0 | DisplayRotation::Rotate180 => HEIGHT,
            DisplayRotation::Rotate90 | DisplayRotation::Rotate270 => WIDTH,
        }
    }
}

#[cfg(feature = "graphics")]
mod graphics {
    use super::{DisplayRotation, PackedFramebuffer};
    use crate::color::Color;
    use crate::traits::PixelSink;
    use embedded_graphics_core::prelude::*;

    impl<const WIDTH: u32, const HEIGHT: u32, const BYTECOUNT: usize, const PAGES: u32> DrawTarget
        for PackedFramebuffer<WIDTH, HEIGHT, BYTECOUNT, PAGES>
    {
        type Color = Color;
        type Error = core::convert::Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                self.set_pixel(point.x, point.y, color);
            }
            Ok(())
        }
    }

    impl<const WIDTH: u32, const HEIGHT: u32, const BYTECOUNT: usize, const PAGES: u32>
        OriginDimensions for PackedFramebuffer<WIDTH, HEIGHT, BYTECOUNT, PAGES>
    {
        fn size(&self) -> Size {
            match self.rotation() {
                DisplayRotation::Rotate0 | DisplayRotation::Rotate180 => Size::new(WIDTH, HEIGHT),
                DisplayRotation::Rotate90 | DisplayRotation::Rotate270 => Size::new(HEIGHT, WIDTH),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 200x200 in 5 pages, the 1.54" layout
    type Frame = PackedFramebuffer<200, 200, 5000, 5>;

    fn bit_of(frame: &Frame, x: usize, y: usize) -> bool {
        frame.buffer()[x / 8 + y * 25].get_bit(7 - x % 8)
    }

    #[test]
    fn pixel_read_back_rotation_0() {
        let mut frame = Frame::default();
        frame.set_pixel(13, 7, Color::Black);
        assert!(bit_of(&frame, 13, 7));
        frame.set_pixel(13, 7, Color::White);
        assert!(!bit_of(&frame, 13, 7));
    }

    #[test]
    fn rotation_90_matches_remapped_rotation_0() {
        let mut rotated = Frame::default();
        rotated.set_rotation(DisplayRotation::Rotate90);
        rotated.set_pixel(30, 40, Color::Black);

        let mut straight = Frame::default();
        straight.set_pixel(200 - 1 - 40, 30, Color::Black);

        assert_eq!(rotated.buffer(), straight.buffer());
    }

    #[test]
    fn rotation_270_matches_remapped_rotation_0() {
        let mut rotated = Frame::default();
        rotated.set_rotation(DisplayRotation::Rotate270);
        rotated.set_pixel(30, 40, Color::Black);

        let mut straight = Frame::default();
        straight.set_pixel(40, 200 - 1 - 30, Color::Black);

        assert_eq!(rotated.buffer(), straight.buffer());
    }

    #[test]
    fn rotation_180_read_back() {
        let mut frame = Frame::default();
        frame.set_rotation(DisplayRotation::Rotate180);
        frame.set_pixel(0, 0, Color::Black);
        assert!(bit_of(&frame, 199, 199));
    }

    #[test]
    fn out_of_bounds_is_a_no_op() {
        let mut frame = Frame::default();
        for (x, y) in [(-1, 0), (0, -1), (200, 0), (0, 200), (i32::MAX, i32::MAX)] {
            frame.set_pixel(x, y, Color::Black);
        }
        assert!(frame.buffer().iter().all(|&b| b == 0x00));
    }

    #[test]
    fn fill_round_trip() {
        let mut frame = Frame::default();
        frame.fill(Color::Black);
        frame.fill(Color::White);
        assert!(frame.buffer().iter().all(|&b| b == 0x00));

        frame.fill(Color::White);
        frame.fill(Color::Black);
        assert!(frame.buffer().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn bitmap_bits_map_to_colors() {
        let mut frame = Frame::default();
        // 8x2 bitmap, set bits stay white, cleared bits get the color
        let bitmap = [0xFF, 0x00];
        frame.draw_bitmap_at(0, 0, &bitmap, 8, 2, Color::Black);
        assert_eq!(frame.buffer()[0], 0x00);
        assert_eq!(frame.buffer()[25], 0xFF);
    }

    #[test]
    fn paging_rebases_into_the_page_slice() {
        let mut frame = Frame::default();
        frame.set_page(2);
        // rows 80..120 belong to page 2
        frame.set_pixel(0, 80, Color::Black);
        assert!(frame.buffer()[0].get_bit(7));

        frame.clear_page();
        assert_eq!(frame.current_page(), -1);
    }

    #[test]
    fn paging_drops_writes_outside_the_active_page() {
        let mut frame = Frame::default();
        frame.set_page(2);
        frame.set_pixel(0, 0, Color::Black);
        frame.set_pixel(0, 79, Color::Black);
        frame.set_pixel(0, 120, Color::Black);
        assert!(frame.buffer().iter().all(|&b| b == 0x00));
    }
}
