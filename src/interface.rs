use core::marker::PhantomData;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::error::ErrorKind;
use crate::traits::Command;

/// Poll interval of the busy gate
const BUSY_POLL_MS: u32 = 1;

/// Default limit for one busy wait. A full refresh on these panels takes
/// well under two seconds, anything beyond this is a dead panel.
const DEFAULT_BUSY_TIMEOUT_MS: u32 = 10_000;

/// The connection interface of the GDE panels
///
/// Every command byte is gated on the BUSY line: if the controller is
/// still executing, the gate blocks (up to the timeout) before the
/// command is clocked out.
pub(crate) struct DisplayInterface<SPI, BUSY, DC, RST, DELAY> {
    /// SPI
    _spi: PhantomData<(SPI, DELAY)>,
    /// High while the controller is executing, wait until it is ready!
    busy: BUSY,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Pin for Resetting
    rst: RST,
    /// Upper bound for one busy wait, in ms
    busy_timeout_ms: u32,
}

impl<SPI, BUSY, DC, RST, DELAY> DisplayInterface<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Creates a new `DisplayInterface` struct
    ///
    /// If no busy timeout is given, a default of 10s is used.
    pub fn new(busy: BUSY, dc: DC, rst: RST, busy_timeout_ms: Option<u32>) -> Self {
        DisplayInterface {
            _spi: PhantomData,
            busy,
            dc,
            rst,
            busy_timeout_ms: busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }

    /// Basic function for sending [Commands](Command).
    ///
    /// The command is gated: a busy controller is waited out first.
    pub(crate) fn cmd<T: Command>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        command: T,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        if self.is_busy()? {
            self.wait_while_busy(delay)?;
        }

        // low for commands
        self.dc.set_low().map_err(ErrorKind::Dc)?;

        // Transfer the command over spi
        self.write(spi, &[command.address()])
    }

    /// Basic function for sending an array of u8-values of data over spi
    pub(crate) fn data(
        &mut self,
        spi: &mut SPI,
        data: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        // high for data
        self.dc.set_high().map_err(ErrorKind::Dc)?;

        self.write(spi, data)
    }

    /// Basic function for sending [Commands](Command) and the data belonging to it.
    pub(crate) fn cmd_with_data<T: Command>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        command: T,
        data: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.cmd(spi, delay, command)?;
        self.data(spi, data)
    }

    /// Basic function for sending the same byte of data (one u8) multiple times over spi
    pub(crate) fn data_x_times(
        &mut self,
        spi: &mut SPI,
        val: u8,
        repetitions: u32,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        // high for data
        self.dc.set_high().map_err(ErrorKind::Dc)?;
        for _ in 0..repetitions {
            self.write(spi, &[val])?;
        }
        Ok(())
    }

    // spi write helper/abstraction function
    fn write(&mut self, spi: &mut SPI, data: &[u8]) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        // transfer spi data
        // Be careful!! Linux has a default limit of 4096 bytes per spi transfer
        // see https://raspberrypi.stackexchange.com/questions/65595/spi-transfer-fails-with-buffer-size-greater-than-4096
        if cfg!(target_os = "linux") {
            for data_chunk in data.chunks(4096) {
                spi.write(data_chunk).map_err(ErrorKind::Spi)?;
            }
            Ok(())
        } else {
            spi.write(data).map_err(ErrorKind::Spi)
        }
    }

    /// Checks if the controller is still busy (BUSY line high)
    pub(crate) fn is_busy(&mut self) -> Result<bool, ErrorKind<SPI, BUSY, DC, RST>> {
        self.busy.is_high().map_err(ErrorKind::Busy)
    }

    /// Waits until the controller isn't busy anymore
    ///
    /// Polls the BUSY line once per millisecond. The reference firmware
    /// spins forever here; a stuck line is reported as
    /// [`ErrorKind::BusyTimeout`] instead.
    pub(crate) fn wait_while_busy(
        &mut self,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let mut elapsed_ms = 0u32;
        while self.is_busy()? {
            if elapsed_ms >= self.busy_timeout_ms {
                return Err(ErrorKind::BusyTimeout);
            }
            delay.delay_ms(BUSY_POLL_MS);
            elapsed_ms += BUSY_POLL_MS;
        }
        Ok(())
    }

    /// Takes the controller out of reset
    ///
    /// The panels only need the RST line driven high before the first
    /// command, there is no reset pulse in the reference sequence.
    pub(crate) fn release_reset(&mut self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.rst.set_high().map_err(ErrorKind::Rst)
    }
}
