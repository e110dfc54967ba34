//! Driver error type

use core::fmt::{Debug, Formatter};

use embedded_hal::digital;
use embedded_hal::spi;

/// Epd error type
///
/// Every fallible driver operation reports the peripheral that failed.
/// `BusyTimeout` replaces the indefinite busy-wait of the reference
/// firmware: a stuck BUSY line is a hardware fault and is reported
/// instead of hanging the caller forever.
pub enum ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: spi::ErrorType,
    BUSY: digital::ErrorType,
    DC: digital::ErrorType,
    RST: digital::ErrorType,
{
    /// Encountered an SPI error
    Spi(SPI::Error),

    /// Encountered an error on the BUSY GPIO
    Busy(BUSY::Error),

    /// Encountered an error on the DC GPIO
    Dc(DC::Error),

    /// Encountered an error on the RST GPIO
    Rst(RST::Error),

    /// The BUSY line stayed asserted past the configured timeout
    BusyTimeout,
}

impl<SPI, BUSY, DC, RST> Debug for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: spi::ErrorType,
    BUSY: digital::ErrorType,
    DC: digital::ErrorType,
    RST: digital::ErrorType,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(err) => f.debug_tuple("Spi").field(err).finish(),
            Self::Busy(err) => f.debug_tuple("Busy").field(err).finish(),
            Self::Dc(err) => f.debug_tuple("Dc").field(err).finish(),
            Self::Rst(err) => f.debug_tuple("Rst").field(err).finish(),
            Self::BusyTimeout => write!(f, "BusyTimeout"),
        }
    }
}

impl<SPI, BUSY, DC, RST> Clone for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: spi::ErrorType,
    SPI::Error: Copy,
    BUSY: digital::ErrorType,
    BUSY::Error: Copy,
    DC: digital::ErrorType,
    DC::Error: Copy,
    RST: digital::ErrorType,
    RST::Error: Copy,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<SPI, BUSY, DC, RST> Copy for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: spi::ErrorType,
    SPI::Error: Copy,
    BUSY: digital::ErrorType,
    BUSY::Error: Copy,
    DC: digital::ErrorType,
    DC::Error: Copy,
    RST: digital::ErrorType,
    RST::Error: Copy,
{
}
