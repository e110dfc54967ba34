//! Shared protocol pieces of the SSD-family controllers driving the
//! 1.54" and 2.13" panels

pub(crate) mod command;

/// Remaps one framebuffer byte to controller RAM byte order.
///
/// The controller expects every byte bit-reversed (bit 0 first) and
/// inverted (a written pixel is a 1 on the wire, while the framebuffer
/// packs black as 1). Applied to every byte of every RAM transfer.
pub(crate) const fn mirror_invert(mut b: u8) -> u8 {
    b = (b & 0xF0) >> 4 | (b & 0x0F) << 4;
    b = (b & 0xCC) >> 2 | (b & 0x33) << 2;
    b = (b & 0xAA) >> 1 | (b & 0x55) << 1;
    !b
}

/// A partial-update rectangle translated to controller RAM coordinates
///
/// The controller's Y axis runs opposite to the framebuffer's, so the
/// controller scan starts at `p_ys` and counts *down* to `p_ye`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ControllerWindow {
    /// First framebuffer byte column of the window
    pub xs_bx: u32,
    /// One past the last framebuffer byte column of the window
    pub xe_bx: u32,
    /// First logical row
    pub ys: u32,
    /// Last logical row, inclusive
    pub ye: u32,
    /// Controller X start, in bytes
    pub p_xs: u8,
    /// Controller X end, in bytes
    pub p_xe: u8,
    /// Controller Y start (the larger row number)
    pub p_ys: u16,
    /// Controller Y end (the smaller row number)
    pub p_ye: u16,
}

/// Clips a logical window against the panel and remaps it to controller
/// coordinates. Returns `None` for a window fully outside the panel.
pub(crate) fn controller_window(
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
) -> Option<ControllerWindow> {
    if x >= width || y >= height || w == 0 || h == 0 {
        return None;
    }
    let xe = width.min(x + w) - 1;
    let ye = height.min(y + h) - 1;
    Some(ControllerWindow {
        xs_bx: x / 8,
        xe_bx: (xe + 7) / 8,
        ys: y,
        ye,
        p_xs: ((width - xe - 1) / 8) as u8,
        p_xe: ((width - x - 1) / 8) as u8,
        p_ys: (height - y - 1) as u16,
        p_ye: (height - ye - 1) as u16,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_invert_spot_checks() {
        assert_eq!(mirror_invert(0x00), 0xFF);
        assert_eq!(mirror_invert(0xFF), 0x00);
        // bit 4 of the source lands on bit 3 of the wire, inverted
        assert_eq!(mirror_invert(0x08), 0xEF);
        assert_eq!(mirror_invert(0x01), 0x7F);
    }

    #[test]
    fn mirror_invert_round_trip() {
        for b in 0..=u8::MAX {
            assert_eq!(mirror_invert(mirror_invert(b)), b);
        }
    }

    #[test]
    fn window_remap_inverts_the_y_axis() {
        // 8x8 window at (10, 10) on the 128x250 panel
        let win = controller_window(128, 250, 10, 10, 8, 8).unwrap();
        assert_eq!(win.xs_bx, 1);
        assert_eq!(win.xe_bx, 3);
        assert_eq!(win.p_xs, 13);
        assert_eq!(win.p_xe, 14);
        assert_eq!(win.p_ys, 239);
        assert_eq!(win.p_ye, 232);
        assert!(win.p_xs <= win.p_xe);
        assert!(win.p_ys >= win.p_ye);
    }

    #[test]
    fn window_is_clipped_to_the_panel() {
        let win = controller_window(200, 200, 192, 196, 100, 100).unwrap();
        assert_eq!(win.ye, 199);
        assert_eq!(win.p_xs, 0);
        assert_eq!(win.p_ye, 0);
    }

    #[test]
    fn window_outside_the_panel_is_dropped() {
        assert!(controller_window(200, 200, 200, 0, 8, 8).is_none());
        assert!(controller_window(200, 200, 0, 200, 8, 8).is_none());
    }
}
