//! Presentation surface interface.
use crate::{constants::KEY_COUNT, error::Result, FrameBuffer};

/// Hooks connecting the interpreter to the outside world: a display for
/// the framebuffer and a 16-key keypad.
///
/// The scheduler calls [`Surface::poll_keys`] once per tick and
/// [`Surface::present`] whenever a redraw falls due. Implementations are
/// expected to copy the snapshot out in `present` and do their actual
/// rendering on their own loop.
pub trait Surface {
    /// Acquire whatever resources the surface needs. Failure here is fatal
    /// to startup.
    fn initialize(&mut self) -> Result<()>;

    /// Hand over a snapshot of the framebuffer. Idempotent; may be called
    /// from a different thread than the surface's own loop. A snapshot
    /// arriving while the previous one is still unrendered replaces it.
    fn present(&mut self, frame: &FrameBuffer);

    /// Sample the current pressed state of the 16 keys.
    fn poll_keys(&mut self) -> [bool; KEY_COUNT];

    /// Release resources. Idempotent.
    fn shutdown(&mut self);
}

/// Surface that renders nowhere and reports no keys. Useful for tests and
/// headless runs.
#[derive(Default)]
pub struct NullSurface {
    /// Number of snapshots handed over so far.
    pub presented: usize,
}

impl NullSurface {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Surface for NullSurface {
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn present(&mut self, _frame: &FrameBuffer) {
        self.presented += 1;
    }

    fn poll_keys(&mut self) -> [bool; KEY_COUNT] {
        [false; KEY_COUNT]
    }

    fn shutdown(&mut self) {}
}
