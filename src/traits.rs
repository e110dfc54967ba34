//! The capability interfaces shared by the panel drivers

use crate::buffer::DisplayRotation;
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

/// All commands need to have this trait which gives the address of the command
/// which needs to be send via SPI with activated CommandsPin (Data/Command Pin in CommandMode)
pub(crate) trait Command: Copy {
    fn address(self) -> u8;
}

/// Separates the two waveform LUTs of the refresh process
///
/// Switching mode requires the full init sequence to be re-issued, the
/// drivers remember the mode of the last refresh and reinitialize on a
/// switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// The flicker-heavy full waveform. Slow, but clears ghosting.
    #[default]
    Full,
    /// The quick partial waveform. Lower quality, used for incremental
    /// redraws.
    Partial,
}

/// A rotation-aware 1-bit (or 2-bit) pixel store
///
/// Out-of-range writes are silently clipped, never an error: application
/// code of the reference firmware relies on the clip.
pub trait PixelSink {
    /// The color type stored per pixel
    type Color;

    /// Sets a single pixel, no-op when (x, y) is outside the logical bounds
    fn set_pixel(&mut self, x: i32, y: i32, color: Self::Color);

    /// Fills the whole buffer with the given color
    fn fill(&mut self, color: Self::Color);

    /// Set the rotation applied to all future `set_pixel` calls
    fn set_rotation(&mut self, rotation: DisplayRotation);

    /// Get the current rotation
    fn rotation(&self) -> DisplayRotation;

    /// Logical width, swapped with height under 90°/270° rotation
    fn width(&self) -> u32;

    /// Logical height, swapped with width under 90°/270° rotation
    fn height(&self) -> u32;
}

/// The refresh surface of the SPI connected panels
///
/// All entry points run the complete update sequence: power-on,
/// RAM transfer, trigger, power-off. They block (bounded by the busy
/// timeout) until the panel has latched the data.
pub trait Refreshable<SPI, DELAY>: PixelSink
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    /// Error type of all operations
    type Error;

    /// The pixel store handed to the [`draw_paged`](Refreshable::draw_paged) callback
    type Frame: PixelSink;

    /// Full refresh of the entire stored buffer
    fn update(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), Self::Error>;

    /// Streams an externally supplied image straight to the panel RAM,
    /// bypassing the stored buffer.
    ///
    /// The bitmap must already be in controller byte order. If it is
    /// shorter than a full frame the rest is padded with the panel's
    /// fill byte.
    fn draw_bitmap(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &[u8],
        mode: RefreshMode,
    ) -> Result<(), Self::Error>;

    /// Partial refresh of a sub-rectangle of the stored buffer
    ///
    /// (x, y) is the top left corner in unrotated panel coordinates.
    /// A window outside the panel is silently clipped.
    fn update_window(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), Self::Error>;

    /// Draws a full image with only one page of buffer RAM alive at a time
    ///
    /// `draw` is invoked once per page and must draw the same full image
    /// each time; writes outside the active page are dropped.
    fn draw_paged<F>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        draw: F,
    ) -> Result<(), Self::Error>
    where
        F: FnMut(&mut Self::Frame);

    /// Turns the whole panel white
    fn erase_display(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        mode: RefreshMode,
    ) -> Result<(), Self::Error>;
}
