//! A driver for the 6" GDE060BA 4-gray-level E-Ink panel
//!
//! Unlike the SPI connected panels this one has no controller of its
//! own: the host scans complete waveform frames over a parallel source
//! driver bus, one row at a time. The bus itself is board specific and
//! injected through [`FrameScanBus`], as is the storage for the two
//! full frames ([`FrameBuffers`]) which at 2 bits per pixel exceed the
//! RAM of most microcontrollers.

use crate::buffer::DisplayRotation;
use crate::color::Gray;
use crate::traits::PixelSink;

pub(crate) mod constants;
use self::constants::{FRAME_BEGIN_SIZE, FRAME_END_SIZE, WAVE_BEGIN, WAVE_END};

/// Width of the display
pub const WIDTH: u32 = 800;

/// Height of the display
pub const HEIGHT: u32 = 600;

/// Default background color
pub const DEFAULT_BACKGROUND_COLOR: Gray = Gray::White;

/// Bytes per full frame, 2 bits per pixel
pub const BUFFER_SIZE: usize = (WIDTH * HEIGHT / 4) as usize;

/// Bytes per scanned row, 4 pixels per byte
const ROW_BUFFER_SIZE: usize = (WIDTH / 4) as usize;

/// CL pulse stretch handed to the bus per row, in bus ticks. Matches
/// the CL period of the vendor demo code.
const CL_DELAY: u32 = 13;

/// One precomputed wave row per possible framebuffer byte
const WAVE_TABLE_SIZE: usize = 256;

/// The board specific parallel bus scanning frames into the panel
///
/// A refresh consists of several frames. Each frame is opened with
/// `start_frame`, then every panel row is pushed with `write_row`
/// (top to bottom), then closed with `end_frame`. The source voltages
/// are only valid between `power_on` and `power_off`.
pub trait FrameScanBus {
    /// Bus fault type
    type Error;

    /// Enables the panel supply voltages
    fn power_on(&mut self) -> Result<(), Self::Error>;

    /// Disables the panel supply voltages
    fn power_off(&mut self) -> Result<(), Self::Error>;

    /// Starts a frame scan at the first gate line
    fn start_frame(&mut self) -> Result<(), Self::Error>;

    /// Latches one row of 2-bit drive values and advances the gate
    /// scan. `cl_delay` stretches the CL clock per transferred byte.
    fn write_row(&mut self, row: &[u8], cl_delay: u32) -> Result<(), Self::Error>;

    /// Ends the frame scan
    fn end_frame(&mut self) -> Result<(), Self::Error>;
}

/// The two injected frame stores of the driver
///
/// `active` holds the image being drawn, `erase` the image currently on
/// the glass (needed to drive every pixel back to white before drawing).
pub struct FrameBuffers<'a> {
    active: &'a mut [u8],
    erase: &'a mut [u8],
}

impl<'a> FrameBuffers<'a> {
    /// Wraps two frame-sized slices, `None` unless both are exactly
    /// [`BUFFER_SIZE`] bytes long.
    pub fn new(active: &'a mut [u8], erase: &'a mut [u8]) -> Option<Self> {
        if active.len() != BUFFER_SIZE || erase.len() != BUFFER_SIZE {
            return None;
        }
        Some(FrameBuffers { active, erase })
    }
}

/// GDE060BA driver
pub struct Gde060ba<'a, IO> {
    io: IO,
    rotation: DisplayRotation,
    buffers: FrameBuffers<'a>,
    /// Wave rows per framebuffer byte, filled by [`init`](Self::init)
    wave_begin_table: [[u8; FRAME_BEGIN_SIZE]; WAVE_TABLE_SIZE],
    wave_end_table: [[u8; FRAME_END_SIZE]; WAVE_TABLE_SIZE],
    row_buffer: [u8; ROW_BUFFER_SIZE],
}

impl<'a, IO> Gde060ba<'a, IO>
where
    IO: FrameScanBus,
{
    /// Creates a new driver over the given bus and frame stores
    ///
    /// The panel is not touched until [`init`](Self::init).
    pub fn new(io: IO, buffers: FrameBuffers<'a>) -> Self {
        Gde060ba {
            io,
            rotation: DisplayRotation::default(),
            buffers,
            wave_begin_table: [[0; FRAME_BEGIN_SIZE]; WAVE_TABLE_SIZE],
            wave_end_table: [[0; FRAME_END_SIZE]; WAVE_TABLE_SIZE],
            row_buffer: [0; ROW_BUFFER_SIZE],
        }
    }

    /// Consumes the driver and hands the bus back
    pub fn into_io(self) -> IO {
        self.io
    }

    /// Precomputes the per-byte wave tables and clears both frame
    /// stores to white
    pub fn init(&mut self) {
        for value in 0..WAVE_TABLE_SIZE {
            for frame in 0..FRAME_BEGIN_SIZE {
                self.wave_begin_table[value][frame] = pack_wave(value as u8, frame, &WAVE_BEGIN);
            }
            for frame in 0..FRAME_END_SIZE {
                self.wave_end_table[value][frame] = pack_wave(value as u8, frame, &WAVE_END);
            }
        }
        let white = DEFAULT_BACKGROUND_COLOR.get_byte_value();
        self.buffers.active.fill(white);
        self.buffers.erase.fill(white);
    }

    /// Refreshes the panel with the stored image
    ///
    /// Scans the erase frames keyed by the previous image, then the
    /// draw frames keyed by the stored image, and remembers the stored
    /// image as the new previous one.
    pub fn update(&mut self) -> Result<(), IO::Error> {
        self.io.power_on()?;
        self.scan_begin_frames()?;
        self.scan_end_frames()?;
        self.buffers.erase.copy_from_slice(&self.buffers.active);
        self.io.power_off()
    }

    /// Draws a full-frame 2-bit bitmap, padded with white if it is
    /// shorter than a full frame. No separate update call needed.
    pub fn draw_bitmap(&mut self, bitmap: &[u8]) -> Result<(), IO::Error> {
        let white = DEFAULT_BACKGROUND_COLOR.get_byte_value();
        let len = bitmap.len().min(BUFFER_SIZE);
        self.buffers.active[..len].copy_from_slice(&bitmap[..len]);
        self.buffers.active[len..].fill(white);
        self.update()
    }

    /// Turns the display white by scanning the erase frames keyed by
    /// the given bitmap. The previous bitmap gives the cleanest result,
    /// but any image works.
    pub fn erase_bitmap(&mut self, bitmap: &[u8]) -> Result<(), IO::Error> {
        let white = DEFAULT_BACKGROUND_COLOR.get_byte_value();
        let len = bitmap.len().min(BUFFER_SIZE);
        self.buffers.erase[..len].copy_from_slice(&bitmap[..len]);
        self.buffers.erase[len..].fill(white);

        self.io.power_on()?;
        self.scan_begin_frames()?;
        self.buffers.erase.fill(white);
        self.io.power_off()
    }

    /// Turns the display white using the remembered previous image
    pub fn erase_display(&mut self) -> Result<(), IO::Error> {
        self.io.power_on()?;
        self.scan_begin_frames()?;
        self.buffers
            .erase
            .fill(DEFAULT_BACKGROUND_COLOR.get_byte_value());
        self.io.power_off()
    }

    /// Draws a 1-bit bitmap in Adafruit GFX byte order through the
    /// pixel layer, so it may be cropped and rotated. A set bit stays
    /// white, a cleared bit gets `color`. Update needed.
    pub fn draw_bitmap_at(&mut self, x: i32, y: i32, bitmap: &[u8], w: i32, h: i32, color: Gray) {
        for x1 in x..x + w {
            for y1 in y..y + h {
                let i = (x1 / 8 + y1 * w / 8) as usize;
                if i >= bitmap.len() {
                    continue;
                }
                let pixelcolor = if bitmap[i] & (0x80 >> (x1 % 8)) != 0 {
                    Gray::White
                } else {
                    color
                };
                self.set_pixel(x1, y1, pixelcolor);
            }
        }
    }

    /// Scans all erase frames keyed by the previous-image store
    fn scan_begin_frames(&mut self) -> Result<(), IO::Error> {
        for frame in 0..FRAME_BEGIN_SIZE {
            self.io.start_frame()?;
            for row in 0..HEIGHT as usize {
                let start = row * ROW_BUFFER_SIZE;
                for i in 0..ROW_BUFFER_SIZE {
                    let data = self.buffers.erase[start + i];
                    self.row_buffer[i] = self.wave_begin_table[data as usize][frame];
                }
                self.io.write_row(&self.row_buffer, CL_DELAY)?;
            }
            self.io.end_frame()?;
        }
        Ok(())
    }

    /// Scans all draw frames keyed by the stored image
    fn scan_end_frames(&mut self) -> Result<(), IO::Error> {
        for frame in 0..FRAME_END_SIZE {
            self.io.start_frame()?;
            for row in 0..HEIGHT as usize {
                let start = row * ROW_BUFFER_SIZE;
                for i in 0..ROW_BUFFER_SIZE {
                    let data = self.buffers.active[start + i];
                    self.row_buffer[i] = self.wave_end_table[data as usize][frame];
                }
                self.io.write_row(&self.row_buffer, CL_DELAY)?;
            }
            self.io.end_frame()?;
        }
        Ok(())
    }
}

/// Packs the wave drive values of a byte's four pixels for one frame
fn pack_wave<const FRAMES: usize>(value: u8, frame: usize, table: &[[u8; FRAMES]; 4]) -> u8 {
    table[(value >> 6) as usize & 0x3][frame] << 6
        | table[(value >> 4) as usize & 0x3][frame] << 4
        | table[(value >> 2) as usize & 0x3][frame] << 2
        | table[value as usize & 0x3][frame]
}

impl<'a, IO> PixelSink for Gde060ba<'a, IO> {
    type Color = Gray;

    fn set_pixel(&mut self, x: i32, y: i32, color: Gray) {
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

        let index = x as usize / 4 + y as usize * ROW_BUFFER_SIZE;
        if index >= BUFFER_SIZE {
            return;
        }

        // 4 pixels per byte, leftmost pixel in the top bits
        let shift = (3 - (x as usize % 4)) * 2;
        let byte = self.buffers.active[index];
        self.buffers.active[index] =
            byte & !(0x3 << shift) | color.get_two_bit_value() << shift;
    }

    fn fill(&mut self, color: Gray) {
        self.buffers.active.fill(color.get_byte_value());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epd_size() {
        assert_eq!(WIDTH, 800);
        assert_eq!(HEIGHT, 600);
        assert_eq!(BUFFER_SIZE, 120_000);
        assert_eq!(ROW_BUFFER_SIZE, 200);
    }

    #[test]
    fn wave_packing_repeats_uniform_pixels() {
        // four white pixels, draw frame 1 drives value 1 on all of them
        assert_eq!(pack_wave(0xFF, 1, &WAVE_END), 0x55);
        // erase frame 4 drives value 2 everywhere
        assert_eq!(pack_wave(0xFF, 4, &WAVE_BEGIN), 0xAA);
        // black pixels sit out the first erase frames
        assert_eq!(pack_wave(0x00, 1, &WAVE_BEGIN), 0x00);
    }

    #[test]
    fn wave_packing_mixes_levels_per_position() {
        // pixel levels 3,2,1,0 from left to right, erase frame 3
        let value = 0b11_10_01_00;
        let expected = WAVE_BEGIN[3][3] << 6
            | WAVE_BEGIN[2][3] << 4
            | WAVE_BEGIN[1][3] << 2
            | WAVE_BEGIN[0][3];
        assert_eq!(pack_wave(value, 3, &WAVE_BEGIN), expected);
    }

    #[test]
    fn frame_buffers_validate_their_length() {
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        assert!(FrameBuffers::new(&mut a, &mut b).is_none());
    }
}
