//! Colors understood by the panel framebuffers

/// Color for the black/white panels
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Color {
    /// Black
    Black,
    /// White
    #[default]
    White,
}

impl Color {
    /// Get the color encoding of the color for one bit
    ///
    /// In the framebuffer a set bit is a black pixel
    pub fn get_bit_value(self) -> u8 {
        match self {
            Color::White => 0u8,
            Color::Black => 1u8,
        }
    }

    /// Gets a full byte of black or white pixels
    pub fn get_byte_value(self) -> u8 {
        match self {
            Color::White => 0x00,
            Color::Black => 0xFF,
        }
    }

    /// Inverses the given color from Black to White or from White to Black
    pub fn inverse(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl From<u8> for Color {
    /// Mirrors the original firmware's color convention: zero is black,
    /// any nonzero value is white.
    fn from(value: u8) -> Self {
        if value == 0 {
            Color::Black
        } else {
            Color::White
        }
    }
}

/// One of the four gray levels of the 6" panel (2 bits per pixel)
///
/// The numeric value is the gray-counter level the waveform tables
/// drive towards, GC0 (black) up to GC3 (white).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum Gray {
    /// GC0
    Black = 0,
    /// GC1
    DarkGray = 1,
    /// GC2
    LightGray = 2,
    /// GC3
    #[default]
    White = 3,
}

impl Gray {
    /// The two framebuffer bits for one pixel of this level
    pub fn get_two_bit_value(self) -> u8 {
        self as u8
    }

    /// A full byte (four pixels) of this level
    pub fn get_byte_value(self) -> u8 {
        let v = self as u8;
        v << 6 | v << 4 | v << 2 | v
    }

    pub(crate) fn from_two_bits(value: u8) -> Self {
        match value & 0x3 {
            0 => Gray::Black,
            1 => Gray::DarkGray,
            2 => Gray::LightGray,
            _ => Gray::White,
        }
    }
}

#[cfg(feature = "graphics")]
mod graphics {
    use super::{Color, Gray};
    use embedded_graphics_core::pixelcolor::raw::{RawU1, RawU2};
    use embedded_graphics_core::pixelcolor::{BinaryColor, PixelColor};
    use embedded_graphics_core::prelude::RawData;

    impl PixelColor for Color {
        type Raw = RawU1;
    }

    impl From<RawU1> for Color {
        fn from(raw: RawU1) -> Self {
            match raw.into_inner() {
                0 => Color::White,
                _ => Color::Black,
            }
        }
    }

    impl From<BinaryColor> for Color {
        fn from(value: BinaryColor) -> Self {
            match value {
                BinaryColor::On => Color::Black,
                BinaryColor::Off => Color::White,
            }
        }
    }

    impl PixelColor for Gray {
        type Raw = RawU2;
    }

    impl From<RawU2> for Gray {
        fn from(raw: RawU2) -> Self {
            Gray::from_two_bits(raw.into_inner())
        }
    }
}
