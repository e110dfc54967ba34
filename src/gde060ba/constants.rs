//! Waveform tables of the GDE060BA panel
//!
//! A refresh scans two sets of frames over the parallel bus. The begin
//! frames drive every pixel from its previous gray level towards white,
//! the end frames drive from white down to the target level. Each table
//! row holds the 2-bit source-driver value per frame for one gray level.

/// Frames of the erase phase (old level -> GC3)
pub(crate) const FRAME_BEGIN_SIZE: usize = 8;

/// Frames of the draw phase (GC3 -> target level)
pub(crate) const FRAME_END_SIZE: usize = 18;

/// Erase-phase drive values, indexed by the pixel's previous level
pub(crate) const WAVE_BEGIN: [[u8; FRAME_BEGIN_SIZE]; 4] = [
    [0, 0, 0, 0, 2, 2, 2, 0], // GC0 -> GC3
    [0, 0, 0, 1, 2, 2, 2, 0], // GC1 -> GC3
    [0, 0, 1, 1, 2, 2, 2, 0], // GC2 -> GC3
    [0, 1, 1, 1, 2, 2, 2, 0], // GC3 -> GC3
];

/// Draw-phase drive values, indexed by the pixel's target level
pub(crate) const WAVE_END: [[u8; FRAME_END_SIZE]; 4] = [
    [0, 1, 1, 1, 2, 2, 2, 1, 1, 1, 2, 2, 2, 1, 1, 1, 0, 0], // GC3 -> GC0
    [0, 1, 1, 1, 2, 2, 2, 1, 1, 1, 2, 2, 2, 1, 1, 0, 0, 0], // GC3 -> GC1
    [0, 1, 1, 1, 2, 2, 2, 1, 1, 1, 2, 2, 2, 1, 0, 0, 0, 0], // GC3 -> GC2
    [0, 1, 1, 1, 2, 2, 2, 1, 1, 1, 2, 2, 2, 0, 0, 0, 0, 0], // GC3 -> GC3
];
