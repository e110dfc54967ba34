//! SPI commands shared by the 1.54" and 2.13" panel controllers

use crate::traits;

/// Command set of the SSD-family controller
///
/// Should rarely (never?) be needed directly.
///
/// For more infos about the addresses and what they are doing look into the pdfs
#[allow(dead_code)]
#[derive(Copy, Clone)]
pub(crate) enum Command {
    /// Driver Output control
    ///     3 Databytes:
    ///     A[7:0]
    ///     0.. A[8]
    ///     0.. B[2:0]
    ///     A[8:0] is the gate count (height - 1)
    DriverOutputControl = 0x01,
    /// Booster Soft start control
    ///     3 Databytes:
    ///     1.. A[6:0]
    ///     1.. B[6:0]
    ///     1.. C[6:0]
    BoosterSoftStartControl = 0x0C,
    /// Data Entry mode setting, address auto-increment direction
    ///     1 Databyte
    DataEntryModeSetting = 0x11,

    /// Triggers whatever DisplayUpdateControl2 staged
    MasterActivation = 0x20,

    /// Stages the clock/analog/display phases for the next activation
    ///     1 Databyte
    DisplayUpdateControl2 = 0x22,

    /// Data bytes go to controller RAM at the current pointer
    WriteRam = 0x24,

    /// VCOM voltage
    ///     1 Databyte
    WriteVcomRegister = 0x2C,

    /// Waveform table upload, 30 data bytes
    WriteLutRegister = 0x32,

    /// Dummy lines per gate
    ///     1 Databyte
    SetDummyLinePeriod = 0x3A,

    /// Gate line width (time per line)
    ///     1 Databyte
    SetGateLineWidth = 0x3B,

    /// Active window X range, in bytes
    ///     2 Databytes: start, end
    SetRamXAddressStartEndPosition = 0x44,

    /// Active window Y range
    ///     4 Databytes: start low/high, end low/high
    SetRamYAddressStartEndPosition = 0x45,

    /// RAM write pointer X, in bytes
    ///     1 Databyte
    SetRamXAddressCounter = 0x4E,

    /// RAM write pointer Y
    ///     2 Databytes: low, high
    SetRamYAddressCounter = 0x4F,

    /// Terminates the frame write after a master activation. Carries no
    /// data but is required by the controller protocol.
    Nop = 0xFF,
}

impl traits::Command for Command {
    /// Returns the address of the command
    fn address(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::Command;
    use crate::traits::Command as CommandTrait;

    #[test]
    fn command_addr() {
        assert_eq!(Command::DriverOutputControl.address(), 0x01);

        assert_eq!(Command::WriteRam.address(), 0x24);

        assert_eq!(Command::SetRamXAddressCounter.address(), 0x4E);

        assert_eq!(Command::Nop.address(), 0xFF);
    }
}
