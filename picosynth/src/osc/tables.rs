//! Built-in single-cycle waveforms.
//!
//! The generators are `const fn`, so tables land in flash:
//!
//! ```ignore
//! static SAW: [i8; 512] = saw_table::<512>();
//! ```

/// One cycle of a sine, 256 cells, amplitude 127.
pub static SIN256_INT8: [i8; 256] = [
    0, 3, 6, 9, 12, 16, 19, 22, 25, 28, 31, 34, 37, 40, 43, 46,
    49, 51, 54, 57, 60, 63, 65, 68, 71, 73, 76, 78, 81, 83, 85, 88,
    90, 92, 94, 96, 98, 100, 102, 104, 106, 107, 109, 111, 112, 113, 115, 116,
    117, 118, 120, 121, 122, 122, 123, 124, 125, 125, 126, 126, 126, 127, 127, 127,
    127, 127, 127, 127, 126, 126, 126, 125, 125, 124, 123, 122, 122, 121, 120, 118,
    117, 116, 115, 113, 112, 111, 109, 107, 106, 104, 102, 100, 98, 96, 94, 92,
    90, 88, 85, 83, 81, 78, 76, 73, 71, 68, 65, 63, 60, 57, 54, 51,
    49, 46, 43, 40, 37, 34, 31, 28, 25, 22, 19, 16, 12, 9, 6, 3,
    0, -3, -6, -9, -12, -16, -19, -22, -25, -28, -31, -34, -37, -40, -43, -46,
    -49, -51, -54, -57, -60, -63, -65, -68, -71, -73, -76, -78, -81, -83, -85, -88,
    -90, -92, -94, -96, -98, -100, -102, -104, -106, -107, -109, -111, -112, -113, -115, -116,
    -117, -118, -120, -121, -122, -122, -123, -124, -125, -125, -126, -126, -126, -127, -127, -127,
    -127, -127, -127, -127, -126, -126, -126, -125, -125, -124, -123, -122, -122, -121, -120, -118,
    -117, -116, -115, -113, -112, -111, -109, -107, -106, -104, -102, -100, -98, -96, -94, -92,
    -90, -88, -85, -83, -81, -78, -76, -73, -71, -68, -65, -63, -60, -57, -54, -51,
    -49, -46, -43, -40, -37, -34, -31, -28, -25, -22, -19, -16, -12, -9, -6, -3,
];

/// Rising ramp from -128 to just under 128.
pub const fn saw_table<const N: usize>() -> [i8; N] {
    let mut table = [0i8; N];
    let mut i = 0;
    while i < N {
        table[i] = ((i * 256 / N) as i32 - 128) as i8;
        i += 1;
    }
    table
}

/// Triangle starting at -128, peaking mid-table.
pub const fn triangle_table<const N: usize>() -> [i8; N] {
    let mut table = [0i8; N];
    let mut i = 0;
    while i < N {
        let pos = (i * 512 / N) as i32; // 0..512
        let v = if pos < 256 { pos - 128 } else { 383 - pos };
        table[i] = v as i8;
        i += 1;
    }
    table
}

/// High for the first half, low for the second.
pub const fn square_table<const N: usize>() -> [i8; N] {
    let mut table = [0i8; N];
    let mut i = 0;
    while i < N {
        table[i] = if i < N / 2 { 127 } else { -128 };
        i += 1;
    }
    table
}
