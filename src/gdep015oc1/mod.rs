//! A driver for the 1.54" GDEP015OC1 E-Ink panel via SPI
//!
//! Supports full refresh, quick partial refresh of a window, streaming
//! an external bitmap, and paged drawing for memory constrained hosts.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::buffer::{DisplayRotation, PackedFramebuffer};
use crate::color::Color;
use crate::error::ErrorKind;
use crate::interface::DisplayInterface;
use crate::traits::{PixelSink, RefreshMode, Refreshable};
use crate::type_a::command::Command;
use crate::type_a::{controller_window, mirror_invert, ControllerWindow};

pub(crate) mod constants;
use self::constants::{LUT_FULL_UPDATE, LUT_PARTIAL_UPDATE};

/// Width of the display
pub const WIDTH: u32 = 200;

/// Height of the display
pub const HEIGHT: u32 = 200;

/// Page count for paged drawing, divides HEIGHT
pub const PAGES: u32 = 5;

/// Default background color
pub const DEFAULT_BACKGROUND_COLOR: Color = Color::White;

const BUFFER_SIZE: usize = crate::buffer_len(WIDTH as usize, HEIGHT as usize);

/// Pad byte when a supplied bitmap is shorter than a full frame
const BITMAP_FILL: u8 = 0xFF;

/// Display-update-control profiles staged before master activation
const UPDATE_FULL: u8 = 0xC4;
const UPDATE_PART: u8 = 0x04;
const POWER_ON: u8 = 0xC0;
const POWER_OFF: u8 = 0xC3;

/// The controller needs the partial-window data twice with this settle
/// time in between to latch it reliably
const SETTLE_MS: u32 = 300;

/// Framebuffer of the 1.54" panel
pub type Frame = PackedFramebuffer<WIDTH, HEIGHT, BUFFER_SIZE, PAGES>;

/// GDEP015OC1 driver
pub struct Gdep015oc1<SPI, BUSY, DC, RST, DELAY> {
    /// Connection Interface
    interface: DisplayInterface<SPI, BUSY, DC, RST, DELAY>,
    /// The stored image
    frame: Frame,
    /// Whether the last refresh left the partial LUT loaded
    partial_in_use: bool,
}

impl<SPI, BUSY, DC, RST, DELAY> Gdep015oc1<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Creates a new driver from the BUSY, DC and RST pins
    ///
    /// `busy_timeout_ms` bounds every busy wait, `None` selects the
    /// default. The panel is not touched until [`init`](Self::init).
    pub fn new(busy: BUSY, dc: DC, rst: RST, busy_timeout_ms: Option<u32>) -> Self {
        Gdep015oc1 {
            interface: DisplayInterface::new(busy, dc, rst, busy_timeout_ms),
            frame: Frame::default(),
            partial_in_use: false,
        }
    }

    /// Releases the reset line and clears the stored image to white
    pub fn init(&mut self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.release_reset()?;
        self.frame.fill(DEFAULT_BACKGROUND_COLOR);
        Ok(())
    }

    /// Direct access to the stored image, e.g. for `embedded-graphics`
    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    /// The stored image
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The active page during [`draw_paged`](Refreshable::draw_paged), -1 otherwise
    pub fn current_page(&self) -> i32 {
        self.frame.current_page()
    }

    /// Panel configuration burst: gate count, soft start, VCOM, gate
    /// timing and the RAM entry mode, then the full-frame RAM window.
    fn init_display(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.cmd_with_data(
            spi,
            delay,
            Command::DriverOutputControl,
            &[((HEIGHT - 1) % 256) as u8, ((HEIGHT - 1) / 256) as u8, 0x00],
        )?;
        self.interface.cmd_with_data(
            spi,
            delay,
            Command::BoosterSoftStartControl,
            &[0xD7, 0xD6, 0x9D],
        )?;
        self.interface
            .cmd_with_data(spi, delay, Command::WriteVcomRegister, &[0x9B])?;
        // 4 dummy lines per gate
        self.interface
            .cmd_with_data(spi, delay, Command::SetDummyLinePeriod, &[0x1A])?;
        // 2us per line
        self.interface
            .cmd_with_data(spi, delay, Command::SetGateLineWidth, &[0x08])?;
        // X increment, Y decrement
        self.interface
            .cmd_with_data(spi, delay, Command::DataEntryModeSetting, &[0x01])?;
        self.use_full_frame(spi, delay)
    }

    fn init_full(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.init_display(spi, delay)?;
        self.interface
            .cmd_with_data(spi, delay, Command::WriteLutRegister, &LUT_FULL_UPDATE)?;
        self.power_on(spi, delay)
    }

    fn init_part(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.init_display(spi, delay)?;
        self.interface
            .cmd_with_data(spi, delay, Command::WriteLutRegister, &LUT_PARTIAL_UPDATE)?;
        self.power_on(spi, delay)
    }

    fn power_on(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface
            .cmd_with_data(spi, delay, Command::DisplayUpdateControl2, &[POWER_ON])?;
        self.interface.cmd(spi, delay, Command::MasterActivation)
    }

    fn power_off(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface
            .cmd_with_data(spi, delay, Command::DisplayUpdateControl2, &[POWER_OFF])?;
        self.interface.cmd(spi, delay, Command::MasterActivation)
    }

    /// Stages the given clock/analog profile, triggers it and terminates
    /// the frame write.
    ///
    /// Master activation must not be interrupted, therefore the
    /// terminating command is sent right away.
    fn trigger_update(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        control: u8,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface
            .cmd_with_data(spi, delay, Command::DisplayUpdateControl2, &[control])?;
        self.interface.cmd(spi, delay, Command::MasterActivation)?;
        self.interface.cmd(spi, delay, Command::Nop)
    }

    /// Programs the active RAM window. X is byte granular, the 16 bit Y
    /// values are split into low/high pairs for the 8 bit register
    /// interface.
    fn set_ram_area(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        x_start: u8,
        x_end: u8,
        y_start: u16,
        y_end: u16,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.cmd_with_data(
            spi,
            delay,
            Command::SetRamXAddressStartEndPosition,
            &[x_start, x_end],
        )?;
        self.interface.cmd_with_data(
            spi,
            delay,
            Command::SetRamYAddressStartEndPosition,
            &[
                (y_start % 256) as u8,
                (y_start / 256) as u8,
                (y_end % 256) as u8,
                (y_end / 256) as u8,
            ],
        )
    }

    /// Programs the RAM write pointer. Must follow `set_ram_area`, the
    /// controller does not reset it after a short transfer.
    fn set_ram_pointer(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        x: u8,
        y: u16,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface
            .cmd_with_data(spi, delay, Command::SetRamXAddressCounter, &[x])?;
        self.interface.cmd_with_data(
            spi,
            delay,
            Command::SetRamYAddressCounter,
            &[(y % 256) as u8, (y / 256) as u8],
        )
    }

    /// Full-frame RAM window, pointer at the top (controller Y counts down)
    fn use_full_frame(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.set_ram_area(
            spi,
            delay,
            0x00,
            ((WIDTH - 1) / 8) as u8,
            (HEIGHT - 1) as u16,
            0x00,
        )?;
        self.set_ram_pointer(spi, delay, 0x00, (HEIGHT - 1) as u16)
    }

    /// Streams `row_count` full-width rows of the stored image, each row
    /// byte-reversed and remapped to wire format.
    fn write_frame_rows(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        row_count: u32,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.cmd(spi, delay, Command::WriteRam)?;
        let mut row = [0u8; Frame::LINE_BYTES];
        for y in 0..row_count as usize {
            let start = y * Frame::LINE_BYTES;
            for (i, x) in (0..Frame::LINE_BYTES).rev().enumerate() {
                let data = self.frame.buffer().get(start + x).copied().unwrap_or(0x00);
                row[i] = mirror_invert(data);
            }
            self.interface.data(spi, &row)?;
        }
        Ok(())
    }

    /// Streams the window's rows from the stored image in wire format
    fn write_window_rows(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        win: &ControllerWindow,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.cmd(spi, delay, Command::WriteRam)?;
        let mut row = [0u8; Frame::LINE_BYTES];
        for y in win.ys..=win.ye {
            let mut len = 0;
            for x in (win.xs_bx..win.xe_bx).rev() {
                let idx = y as usize * Frame::LINE_BYTES + x as usize;
                let data = self.frame.buffer().get(idx).copied().unwrap_or(0x00);
                row[len] = mirror_invert(data);
                len += 1;
            }
            self.interface.data(spi, &row[..len])?;
        }
        Ok(())
    }

    /// Window + pointer + gated RAM write of one window pass
    fn write_window_pass(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        win: &ControllerWindow,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.set_ram_area(spi, delay, win.p_xs, win.p_xe, win.p_ys, win.p_ye)?;
        self.set_ram_pointer(spi, delay, win.p_xs, win.p_ys)?;
        self.interface.wait_while_busy(delay)?;
        self.write_window_rows(spi, delay, win)
    }

    /// Transfers the active page as a partial window, twice with the
    /// settle delay, as the controller requires for partial data.
    fn draw_current_page(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        page: u32,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let win = match controller_window(
            WIDTH,
            HEIGHT,
            0,
            page * Frame::PAGE_HEIGHT,
            WIDTH,
            Frame::PAGE_HEIGHT,
        ) {
            Some(win) => win,
            None => return Ok(()),
        };

        self.set_ram_area(spi, delay, win.p_xs, win.p_xe, win.p_ys, win.p_ye)?;
        self.set_ram_pointer(spi, delay, win.p_xs, win.p_ys)?;
        self.interface.wait_while_busy(delay)?;
        self.write_frame_rows(spi, delay, Frame::PAGE_HEIGHT)?;
        self.trigger_update(spi, delay, UPDATE_PART)?;
        delay.delay_ms(SETTLE_MS);

        self.set_ram_area(spi, delay, win.p_xs, win.p_xe, win.p_ys, win.p_ye)?;
        self.set_ram_pointer(spi, delay, win.p_xs, win.p_ys)?;
        self.interface.wait_while_busy(delay)?;
        self.write_frame_rows(spi, delay, Frame::PAGE_HEIGHT)?;
        delay.delay_ms(SETTLE_MS);
        Ok(())
    }

    /// Streams a raw bitmap (already in wire format), padded to a full
    /// frame with the panel's fill byte.
    fn write_bitmap(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.cmd(spi, delay, Command::WriteRam)?;
        let len = bitmap.len().min(BUFFER_SIZE);
        self.interface.data(spi, &bitmap[..len])?;
        self.interface
            .data_x_times(spi, BITMAP_FILL, (BUFFER_SIZE - len) as u32)
    }
}

impl<SPI, BUSY, DC, RST, DELAY> PixelSink for Gdep015oc1<SPI, BUSY, DC, RST, DELAY> {
    type Color = Color;

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.frame.set_pixel(x, y, color);
    }

    fn fill(&mut self, color: Color) {
        self.frame.fill(color);
    }

    fn set_rotation(&mut self, rotation: DisplayRotation) {
        self.frame.set_rotation(rotation);
    }

    fn rotation(&self) -> DisplayRotation {
        self.frame.rotation()
    }

    fn width(&self) -> u32 {
        self.frame.width()
    }

    fn height(&self) -> u32 {
        self.frame.height()
    }
}

impl<SPI, BUSY, DC, RST, DELAY> Refreshable<SPI, DELAY> for Gdep015oc1<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    type Error = ErrorKind<SPI, BUSY, DC, RST>;
    type Frame = Frame;

    fn update(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), Self::Error> {
        // not meaningful while a page is active
        if self.frame.current_page() != -1 {
            return Ok(());
        }
        self.partial_in_use = false;
        self.init_full(spi, delay)?;
        self.write_frame_rows(spi, delay, HEIGHT)?;
        self.trigger_update(spi, delay, UPDATE_FULL)?;
        self.power_off(spi, delay)
    }

    fn draw_bitmap(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &[u8],
        mode: RefreshMode,
    ) -> Result<(), Self::Error> {
        match mode {
            RefreshMode::Partial => {
                self.partial_in_use = true;
                self.init_part(spi, delay)?;
                self.use_full_frame(spi, delay)?;
                self.write_bitmap(spi, delay, bitmap)?;
                self.trigger_update(spi, delay, UPDATE_PART)?;
            }
            RefreshMode::Full => {
                self.partial_in_use = false;
                self.init_full(spi, delay)?;
                self.write_bitmap(spi, delay, bitmap)?;
                self.trigger_update(spi, delay, UPDATE_FULL)?;
            }
        }
        self.power_off(spi, delay)
    }

    fn update_window(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), Self::Error> {
        let win = match controller_window(WIDTH, HEIGHT, x, y, width, height) {
            Some(win) => win,
            None => return Ok(()),
        };
        self.init_part(spi, delay)?;

        self.write_window_pass(spi, delay, &win)?;
        self.trigger_update(spi, delay, UPDATE_PART)?;
        delay.delay_ms(SETTLE_MS);

        // second transfer refreshes the RAM for the next partial update
        self.write_window_pass(spi, delay, &win)?;
        delay.delay_ms(SETTLE_MS);

        self.power_off(spi, delay)
    }

    fn draw_paged<F>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        mut draw: F,
    ) -> Result<(), Self::Error>
    where
        F: FnMut(&mut Frame),
    {
        // the partial waveform needs a clean base image
        if !self.partial_in_use {
            self.erase_display(spi, delay, RefreshMode::Full)?;
            self.erase_display(spi, delay, RefreshMode::Partial)?;
        }
        self.partial_in_use = true;
        self.init_part(spi, delay)?;
        for page in 0..PAGES {
            self.frame.set_page(page);
            self.frame.fill(DEFAULT_BACKGROUND_COLOR);
            draw(&mut self.frame);
            self.draw_current_page(spi, delay, page)?;
        }
        self.frame.clear_page();
        self.power_off(spi, delay)
    }

    fn erase_display(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        mode: RefreshMode,
    ) -> Result<(), Self::Error> {
        match mode {
            RefreshMode::Partial => {
                self.partial_in_use = true;
                self.init_part(spi, delay)?;
                self.interface.cmd(spi, delay, Command::WriteRam)?;
                self.interface
                    .data_x_times(spi, 0xFF, BUFFER_SIZE as u32)?;
                self.trigger_update(spi, delay, UPDATE_PART)?;
            }
            RefreshMode::Full => {
                self.init_full(spi, delay)?;
                self.interface.cmd(spi, delay, Command::WriteRam)?;
                self.interface
                    .data_x_times(spi, 0xFF, BUFFER_SIZE as u32)?;
                self.trigger_update(spi, delay, UPDATE_FULL)?;
            }
        }
        self.power_off(spi, delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epd_size() {
        assert_eq!(WIDTH, 200);
        assert_eq!(HEIGHT, 200);
        assert_eq!(BUFFER_SIZE, 5000);
        assert_eq!(Frame::PAGE_HEIGHT, 40);
        assert_eq!(Frame::PAGE_SIZE, 1000);
        assert_eq!(DEFAULT_BACKGROUND_COLOR, Color::White);
    }
}
