//! Command/data stream tests of the 1.54" driver

mod common;

use common::{harness, LogDelay, LogSpi, StuckBusy};
use gde_epd::gdep015oc1::Gdep015oc1;
use gde_epd::prelude::*;

#[test]
fn full_update_streams_the_mirrored_frame() {
    let (state, mut spi, busy, dc, rst, mut delay) = harness();
    let mut epd = Gdep015oc1::new(busy, dc, rst, None);
    epd.init().unwrap();

    epd.set_pixel(100, 100, Color::Black);
    epd.update(&mut spi, &mut delay).unwrap();

    // one black pixel at (100, 100): buffer byte 2512 holds 0x08, which
    // mirrors and inverts to 0xEF on the wire, everything else is white
    let ram = state.borrow().data_after(0x24);
    assert_eq!(ram.len(), 5000);
    for (i, byte) in ram.iter().enumerate() {
        if i == 2512 {
            assert_eq!(*byte, 0xEF, "at offset {}", i);
        } else {
            assert_eq!(*byte, 0xFF, "at offset {}", i);
        }
    }
}

#[test]
fn full_update_command_order() {
    let (state, mut spi, busy, dc, rst, mut delay) = harness();
    let mut epd = Gdep015oc1::new(busy, dc, rst, None);
    epd.init().unwrap();

    epd.update(&mut spi, &mut delay).unwrap();

    // init burst, RAM window, LUT, power on, frame, trigger + NOP, power off
    assert_eq!(
        state.borrow().commands(),
        vec![
            0x01, 0x0C, 0x2C, 0x3A, 0x3B, 0x11, 0x44, 0x45, 0x4E, 0x4F, 0x32, 0x22, 0x20, 0x24,
            0x22, 0x20, 0xFF, 0x22, 0x20,
        ]
    );

    // power on, full-refresh trigger, power off
    assert_eq!(
        state.borrow().all_data_after(0x22),
        vec![vec![0xC0], vec![0xC4], vec![0xC3]]
    );
}

#[test]
fn window_update_transfers_twice_and_settles() {
    let (state, mut spi, busy, dc, rst, mut delay) = harness();
    let mut epd = Gdep015oc1::new(busy, dc, rst, None);
    epd.init().unwrap();

    epd.update_window(&mut spi, &mut delay, 10, 10, 8, 8).unwrap();

    let state = state.borrow();
    let ram_writes = state.commands().iter().filter(|&&c| c == 0x24).count();
    assert_eq!(ram_writes, 2);

    // partial waveform, one trigger after the first transfer
    assert_eq!(
        state.all_data_after(0x22),
        vec![vec![0xC0], vec![0x04], vec![0xC3]]
    );

    // two 300 ms settle delays, the BUSY line never stalled us
    assert!(state.ns_delayed >= 600_000_000);
}

#[test]
fn window_outside_the_panel_sends_nothing() {
    let (state, mut spi, busy, dc, rst, mut delay) = harness();
    let mut epd = Gdep015oc1::new(busy, dc, rst, None);
    epd.init().unwrap();

    epd.update_window(&mut spi, &mut delay, 200, 0, 8, 8).unwrap();
    epd.update_window(&mut spi, &mut delay, 0, 0, 0, 8).unwrap();

    assert!(state.borrow().log.is_empty());
}

#[test]
fn paged_drawing_runs_the_callback_once_per_page() {
    let (state, mut spi, busy, dc, rst, mut delay) = harness();
    let mut epd = Gdep015oc1::new(busy, dc, rst, None);
    epd.init().unwrap();
    assert_eq!(epd.current_page(), -1);

    let mut calls = 0;
    epd.draw_paged(&mut spi, &mut delay, |frame| {
        calls += 1;
        assert!(frame.current_page() >= 0);
        assert!(frame.current_page() < 5);
        frame.set_pixel(0, 0, Color::Black);
    })
    .unwrap();

    assert_eq!(calls, 5);
    assert_eq!(epd.current_page(), -1);

    // each page goes out twice (double transfer), after the initial
    // full + partial erase of the first paged draw
    let ram_writes = state
        .borrow()
        .commands()
        .iter()
        .filter(|&&c| c == 0x24)
        .count();
    assert_eq!(ram_writes, 2 + 2 * 5);
}

#[cfg(feature = "graphics")]
#[test]
fn embedded_graphics_draws_into_the_frame() {
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    let (_state, _spi, busy, dc, rst, _delay) = harness();
    let mut epd: Gdep015oc1<LogSpi, _, _, _, LogDelay> = Gdep015oc1::new(busy, dc, rst, None);
    epd.init().unwrap();

    Line::new(Point::new(0, 0), Point::new(7, 0))
        .into_styled(PrimitiveStyle::with_stroke(Color::Black, 1))
        .draw(epd.frame_mut())
        .unwrap();

    assert_eq!(epd.frame().buffer()[0], 0xFF);
}

#[test]
fn stuck_busy_line_reports_a_timeout() {
    let (_state, mut spi, _busy, dc, rst, mut delay) = harness();
    let mut epd = Gdep015oc1::new(StuckBusy, dc, rst, Some(50));
    epd.init().unwrap();

    let result = epd.update(&mut spi, &mut delay);
    assert!(matches!(result, Err(ErrorKind::BusyTimeout)));
}
