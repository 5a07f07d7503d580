//! Constant values of the emulated machine.

/// Number of general purpose registers (V0-VF).
pub const REGISTER_COUNT: usize = 0x10; // 16

/// The lower memory space was historically reserved for the interpreter
/// itself; here it holds only the builtin font sprites.
pub const MEM_START: usize = 0x200; // 512
pub const MEM_SIZE: usize = 0x1000; // 4096

/// Largest program image that fits above the reserved space.
pub const MAX_PROGRAM_SIZE: usize = MEM_SIZE - MEM_START;

/// Levels of nesting allowed in the call stack.
///
/// The original RCA 1802 implementation allocated 48 bytes
/// for up to 12 levels of nesting. 16 gives well-formed
/// programs some headroom.
pub const STACK_DEPTH: usize = 0x10;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const DISPLAY_BUFFER_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

/// Number of keys on the keypad (0x0-0xF).
pub const KEY_COUNT: usize = 16;

/// Rate at which the delay and sound timers count down, and at which the
/// framebuffer is handed to the presentation surface.
pub const TIMER_FREQUENCY: u64 = 60;

/// Default instruction rate. Must stay an integer multiple of
/// [`TIMER_FREQUENCY`] so timer ticks land on instruction boundaries.
pub const DEFAULT_CLOCK_FREQUENCY: u64 = 720;

/// Number of nanoseconds in a second.
#[doc(hidden)]
pub const NANOS_IN_SECOND: u64 = 1_000_000_000;

/// Address of the builtin font sprites.
pub const FONT_START: usize = 0x000;

/// Height in bytes of a single font glyph.
pub const FONT_SPRITE_BYTES: usize = 5;

/// Builtin sprites for the hexadecimal digits 0-F, 4x5 pixels each,
/// packed one row per byte in the high nibble.
#[rustfmt::skip]
pub const FONT_DATA: [u8; 16 * FONT_SPRITE_BYTES] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
