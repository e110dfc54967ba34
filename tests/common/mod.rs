//! Recording bus stubs shared by the integration tests
//!
//! The SPI stub and the DC pin share one state cell, so every written
//! byte lands in the log tagged as command or data depending on the
//! level the driver put the DC line at.
#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi::{self, Operation, SpiDevice};

/// One logged bus event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A command byte, written with DC low
    Cmd(u8),
    /// A data burst, written with DC high
    Data(Vec<u8>),
}

#[derive(Default)]
pub struct State {
    dc_high: bool,
    pub log: Vec<Entry>,
    /// Total time the driver spent in delays
    pub ns_delayed: u64,
}

impl State {
    /// All command bytes in issue order
    pub fn commands(&self) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|e| match e {
                Entry::Cmd(c) => Some(*c),
                Entry::Data(_) => None,
            })
            .collect()
    }

    /// The data burst following the first occurrence of `cmd`
    pub fn data_after(&self, cmd: u8) -> Vec<u8> {
        self.all_data_after(cmd).into_iter().next().unwrap_or_default()
    }

    /// The data bursts following every occurrence of `cmd`
    pub fn all_data_after(&self, cmd: u8) -> Vec<Vec<u8>> {
        let mut bursts = Vec::new();
        let mut collecting = false;
        for entry in &self.log {
            match entry {
                Entry::Cmd(c) => {
                    collecting = *c == cmd;
                    if collecting {
                        bursts.push(Vec::new());
                    }
                }
                Entry::Data(bytes) => {
                    if collecting {
                        if let Some(last) = bursts.last_mut() {
                            last.extend_from_slice(bytes);
                        }
                    }
                }
            }
        }
        bursts
    }
}

/// SPI stub appending everything it is told to write to the log
pub struct LogSpi(Rc<RefCell<State>>);

impl spi::ErrorType for LogSpi {
    type Error = Infallible;
}

impl SpiDevice for LogSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        let mut state = self.0.borrow_mut();
        for op in operations {
            if let Operation::Write(words) = op {
                if state.dc_high {
                    if let Some(Entry::Data(bytes)) = state.log.last_mut() {
                        bytes.extend_from_slice(words);
                        continue;
                    }
                    state.log.push(Entry::Data(words.to_vec()));
                } else {
                    for byte in words.iter() {
                        state.log.push(Entry::Cmd(*byte));
                    }
                }
            }
        }
        Ok(())
    }
}

/// BUSY line of an idle controller
pub struct ReadyBusy;

impl digital::ErrorType for ReadyBusy {
    type Error = Infallible;
}

impl InputPin for ReadyBusy {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(true)
    }
}

/// BUSY line of a hung controller, never deasserts
pub struct StuckBusy;

impl digital::ErrorType for StuckBusy {
    type Error = Infallible;
}

impl InputPin for StuckBusy {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(true)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(false)
    }
}

/// DC pin, toggles the command/data tag of the shared state
pub struct DcLine(Rc<RefCell<State>>);

impl digital::ErrorType for DcLine {
    type Error = Infallible;
}

impl OutputPin for DcLine {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().dc_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().dc_high = true;
        Ok(())
    }
}

/// RST pin stub
pub struct RstLine;

impl digital::ErrorType for RstLine {
    type Error = Infallible;
}

impl OutputPin for RstLine {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Delay stub accumulating the requested time in the shared state
pub struct LogDelay(Rc<RefCell<State>>);

impl DelayNs for LogDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().ns_delayed += u64::from(ns);
    }
}

/// A full set of stubs over one fresh state cell
pub fn harness() -> (Rc<RefCell<State>>, LogSpi, ReadyBusy, DcLine, RstLine, LogDelay) {
    let state = Rc::new(RefCell::new(State::default()));
    (
        state.clone(),
        LogSpi(state.clone()),
        ReadyBusy,
        DcLine(state.clone()),
        RstLine,
        LogDelay(state),
    )
}
