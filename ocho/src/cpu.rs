//! Machine state.
use crate::{constants::*, FrameBuffer};

/// The complete state of the emulated machine. Pure data; all behavior
/// lives in the interpreter.
pub(crate) struct Machine {
    // ------------------------------------------------------------------------
    // Registers
    /// Program counter. Advanced by 2 when an instruction is fetched;
    /// control-flow instructions overwrite it afterwards.
    pub(crate) pc: u16,
    /// General purpose registers V0-VF.
    ///
    /// VF doubles as the flag output of arithmetic, shift and draw
    /// instructions; a flag write clobbers whatever value it held.
    pub(crate) registers: [u8; REGISTER_COUNT],
    /// (I) Address register used by memory-relative operations.
    pub(crate) index: u16,
    /// (DT) Delay timer that counts down to 0 at 60 Hz.
    pub(crate) delay_timer: u8,
    /// (ST) Sound timer that counts down to 0 at 60 Hz.
    pub(crate) sound_timer: u8,

    // ------------------------------------------------------------------------
    // Memory
    /// Main memory. Font sprites live below [`MEM_START`], the program
    /// image starts at it.
    pub(crate) ram: Box<[u8; MEM_SIZE]>,
    /// Return addresses pushed by `CALL`, popped by `RET`.
    pub(crate) stack: [u16; STACK_DEPTH],
    /// Stack pointer, one past the top of the stack.
    pub(crate) sp: usize,
    /// Screen buffer that sprites are blitted into.
    pub(crate) framebuffer: Box<FrameBuffer>,
    /// Set whenever the framebuffer changes, cleared once a snapshot has
    /// been handed to the presentation surface.
    pub(crate) redraw: bool,

    // ------------------------------------------------------------------------
    // Input
    /// Key state as of the current tick's sample.
    pub(crate) keys: [bool; KEY_COUNT],
    /// Key that transitioned from released to pressed this tick, if any.
    pub(crate) last_key: Option<u8>,
    /// Destination register of an in-progress `WaitKey`. While set, the
    /// scheduler withholds fetches instead of rewinding the program counter.
    pub(crate) awaiting_key: Option<u8>,
}

impl Default for Machine {
    fn default() -> Self {
        let mut ram = Box::new([0; MEM_SIZE]);
        ram[FONT_START..FONT_START + FONT_DATA.len()].copy_from_slice(&FONT_DATA);

        Self {
            pc: MEM_START as u16,
            registers: [0; REGISTER_COUNT],
            index: 0,
            delay_timer: 0,
            sound_timer: 0,

            ram,
            stack: [0; STACK_DEPTH],
            sp: 0,
            framebuffer: Box::new([false; DISPLAY_BUFFER_SIZE]),
            redraw: false,

            keys: [false; KEY_COUNT],
            last_key: None,
            awaiting_key: None,
        }
    }
}

impl Machine {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    /// Extract the big-endian instruction word at the program counter.
    #[inline(always)]
    pub(crate) fn fetch(&self) -> u16 {
        let pc = self.pc as usize & (MEM_SIZE - 1);
        let hi = self.ram[pc];
        let lo = self.ram[(pc + 1) & (MEM_SIZE - 1)];
        u16::from_be_bytes([hi, lo])
    }

    /// Replace the key snapshot, recording the first key that went from
    /// released to pressed since the previous sample.
    pub(crate) fn sample_keys(&mut self, keys: [bool; KEY_COUNT]) {
        self.last_key = keys
            .iter()
            .zip(self.keys.iter())
            .position(|(now, before)| *now && !*before)
            .map(|k| k as u8);
        self.keys = keys;
    }

    /// Count both timers down one step. They stop at zero.
    pub(crate) fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_font_loaded_once() {
        let machine = Machine::new();
        assert_eq!(&machine.ram[..FONT_DATA.len()], &FONT_DATA[..]);
        // Rest of the reserved space and the program area stay zeroed.
        assert!(machine.ram[FONT_DATA.len()..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_fetch_big_endian() {
        let mut machine = Machine::new();
        machine.ram[0x200] = 0xA2;
        machine.ram[0x201] = 0x1C;
        machine.pc = 0x200;
        assert_eq!(machine.fetch(), 0xA21C);
    }

    #[test]
    fn test_key_edge_detection() {
        let mut machine = Machine::new();
        let mut keys = [false; KEY_COUNT];

        keys[5] = true;
        machine.sample_keys(keys);
        assert_eq!(machine.last_key, Some(5));

        // Still held: no new edge.
        machine.sample_keys(keys);
        assert_eq!(machine.last_key, None);

        // Released and pressed again: a fresh edge.
        machine.sample_keys([false; KEY_COUNT]);
        assert_eq!(machine.last_key, None);
        machine.sample_keys(keys);
        assert_eq!(machine.last_key, Some(5));
    }

    #[test]
    fn test_first_edge_wins() {
        let mut machine = Machine::new();
        let mut keys = [false; KEY_COUNT];
        keys[3] = true;
        keys[9] = true;
        machine.sample_keys(keys);
        assert_eq!(machine.last_key, Some(3));
    }

    #[test]
    fn test_timers_stop_at_zero() {
        let mut machine = Machine::new();
        machine.delay_timer = 2;
        machine.sound_timer = 1;
        for _ in 0..5 {
            machine.tick_timers();
        }
        assert_eq!(machine.delay_timer, 0);
        assert_eq!(machine.sound_timer, 0);
    }
}
