//! Command/data stream tests of the 2.13" driver

mod common;

use common::{harness, LogSpi};
use embedded_hal_mock::eh1::delay::NoopDelay;
use gde_epd::gde0213b1::Gde0213b1;
use gde_epd::prelude::*;

#[test]
fn full_update_streams_a_white_frame() {
    let (state, mut spi, busy, dc, rst, _) = harness();
    let mut delay = NoopDelay::new();
    let mut epd = Gde0213b1::new(busy, dc, rst, None);
    epd.init().unwrap();

    epd.update(&mut spi, &mut delay).unwrap();

    // all white mirrors and inverts to an all-0xFF wire stream
    let ram = state.borrow().data_after(0x24);
    assert_eq!(ram.len(), 4000);
    assert!(ram.iter().all(|&b| b == 0xFF));
}

#[test]
fn full_update_uses_the_panels_control_bytes() {
    let (state, mut spi, busy, dc, rst, _) = harness();
    let mut delay = NoopDelay::new();
    let mut epd = Gde0213b1::new(busy, dc, rst, None);
    epd.init().unwrap();

    epd.update(&mut spi, &mut delay).unwrap();

    // power on, full-refresh trigger of this panel, power off
    assert_eq!(
        state.borrow().all_data_after(0x22),
        vec![vec![0xC0], vec![0xC7], vec![0xC3]]
    );

    // this panel's VCOM level
    assert_eq!(state.borrow().data_after(0x2C), vec![0xA8]);

    // 249 gate lines
    assert_eq!(state.borrow().data_after(0x01), vec![0xF9, 0x00, 0x00]);
}

#[test]
fn bitmap_shorter_than_the_frame_is_padded() {
    let (state, mut spi, busy, dc, rst, _) = harness();
    let mut delay = NoopDelay::new();
    let mut epd = Gde0213b1::new(busy, dc, rst, None);
    epd.init().unwrap();

    let bitmap = [0xABu8; 100];
    epd.draw_bitmap(&mut spi, &mut delay, &bitmap, RefreshMode::Full)
        .unwrap();

    let ram = state.borrow().data_after(0x24);
    assert_eq!(ram.len(), 4000);
    assert!(ram[..100].iter().all(|&b| b == 0xAB));
    assert!(ram[100..].iter().all(|&b| b == 0x00));
}

#[test]
fn rotation_swaps_the_logical_size() {
    let (_state, _spi, busy, dc, rst, _) = harness();
    let mut epd: Gde0213b1<LogSpi, _, _, _, NoopDelay> = Gde0213b1::new(busy, dc, rst, None);

    assert_eq!(epd.width(), 128);
    assert_eq!(epd.height(), 250);

    epd.set_rotation(DisplayRotation::Rotate90);
    assert_eq!(epd.width(), 250);
    assert_eq!(epd.height(), 128);
}
