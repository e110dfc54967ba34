//! A Driver for the GDE series E-Ink Displays from GoodDisplay
//!
//! This driver was built using [`embedded-hal`] traits.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/~1.0
//!
//! # Requirements
//!
//! ### SPI
//!
//! - MISO is not connected/available
//! - SPI_MODE_0 is used (CPHL = 0, CPOL = 0)
//! - 8 bits per word, MSB first
//! - the panels are specified for a 4MHz clock (250ns > 150ns min RD cycle)
//!
//! ### Other....
//!
//! - The drivers own their framebuffer: draw with [`PixelSink`](traits::PixelSink)
//!   (or `embedded-graphics` with the `graphics` feature) and then call one of the
//!   refresh entry points.
//! - All refresh entry points block on the panel's BUSY line. A stuck line is
//!   reported as [`ErrorKind::BusyTimeout`](error::ErrorKind::BusyTimeout)
//!   instead of hanging forever.
//!
//! # Examples
//!
//! ```ignore
//! use gde_epd::{gdep015oc1::Gdep015oc1, prelude::*};
//!
//! let mut epd = Gdep015oc1::new(busy, dc, rst, None);
//! epd.init()?;
//!
//! epd.fill(Color::White);
//! epd.set_pixel(100, 100, Color::Black);
//!
//! // full refresh of the stored buffer
//! epd.update(&mut spi, &mut delay)?;
//!
//! // fast partial refresh of a sub-rectangle
//! epd.update_window(&mut spi, &mut delay, 10, 10, 8, 8)?;
//! ```
#![no_std]

pub mod color;

pub mod error;

pub mod traits;

/// Interface for the physical connection between display and the controlling device
mod interface;

pub mod buffer;

pub(crate) mod type_a;

pub mod gde0213b1;

pub mod gde060ba;

pub mod gdep015oc1;

pub mod prelude {
    //! Everything needed to drive a panel

    pub use crate::buffer::DisplayRotation;
    pub use crate::color::{Color, Gray};
    pub use crate::error::ErrorKind;
    pub use crate::traits::{PixelSink, RefreshMode, Refreshable};
    pub use crate::SPI_MODE;
}

use embedded_hal::spi::{Mode, Phase, Polarity};

/// SPI mode -
/// For more infos see [Requirements: SPI](index.html#spi)
pub const SPI_MODE: Mode = Mode {
    phase: Phase::CaptureOnFirstTransition,
    polarity: Polarity::IdleLow,
};

/// Computes the needed buffer length. Takes care of rounding up in case
/// width is not divisible by 8.
pub const fn buffer_len(width: usize, height: usize) -> usize {
    (width + 7) / 8 * height
}
