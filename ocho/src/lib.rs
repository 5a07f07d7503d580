mod bytecode;
mod clock;
pub mod constants;
mod cpu;
mod devices;
mod error;
mod shutdown;
mod vm;

pub use self::devices::{NullSurface, Surface};
pub use self::error::{Error, Result};
pub use self::shutdown::ShutdownToken;
pub use self::vm::{Hz, Vm, VmConf};

/// Row-major 64x32 framebuffer, one bool per pixel, origin top-left.
pub type FrameBuffer = [bool; constants::DISPLAY_BUFFER_SIZE];

pub mod prelude {
    pub use super::{
        constants::*, Error, FrameBuffer, Hz, NullSurface, Result, ShutdownToken, Surface, Vm,
        VmConf,
    };
}
