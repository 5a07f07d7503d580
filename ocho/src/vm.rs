//! Virtual machine: instruction execution and the timing scheduler.
use std::time::Duration;

use log::{trace, warn};
use rand::prelude::*;

use crate::{
    bytecode::{decode, Instr},
    clock::Clock,
    constants::*,
    cpu::Machine,
    devices::Surface,
    error::{Error, Result},
    shutdown::ShutdownToken,
};

/// VM configuration parameters.
#[derive(Clone)]
pub struct VmConf {
    /// Instruction rate. Must be a positive multiple of [`TIMER_FREQUENCY`]
    /// so that timer decrements land on instruction boundaries.
    pub clock_frequency: Hz,
}

impl Default for VmConf {
    fn default() -> Self {
        Self {
            clock_frequency: Hz(DEFAULT_CLOCK_FREQUENCY),
        }
    }
}

/// Clock frequency, in hertz (per second).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hz(pub u64);

impl From<Hz> for Duration {
    fn from(freq: Hz) -> Self {
        if freq.0 == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(NANOS_IN_SECOND / freq.0)
        }
    }
}

/// The interpreter core. Owns all emulated state; nothing else may
/// alias it.
pub struct Vm {
    machine: Machine,
    conf: VmConf,
    /// Instructions executed since the program was loaded.
    ticks: u64,
    /// Instructions per timer period: clock frequency / 60.
    ticks_per_timer: u64,
}

impl Vm {
    pub fn new(conf: VmConf) -> Result<Self> {
        let Hz(freq) = conf.clock_frequency;
        if freq == 0 || freq % TIMER_FREQUENCY != 0 {
            return Err(Error::ClockRate(conf.clock_frequency));
        }

        Ok(Vm {
            machine: Machine::new(),
            ticks_per_timer: freq / TIMER_FREQUENCY,
            ticks: 0,
            conf,
        })
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &VmConf {
        &self.conf
    }

    /// Copy a program image into memory at the start address and reset all
    /// machine state, ready for execution.
    ///
    /// Fails, reporting the image size, if the image does not fit.
    pub fn load_program(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > MAX_PROGRAM_SIZE {
            return Err(Error::ProgramTooLarge { size: image.len() });
        }

        // Fresh state so a previous program can't leak through.
        self.machine = Machine::new();
        self.machine.ram[MEM_START..MEM_START + image.len()].copy_from_slice(image);
        self.ticks = 0;

        Ok(())
    }

    /// Drive the scheduler until the shutdown token is triggered.
    ///
    /// Two periods share this one loop: every tick an instruction is fetched
    /// and executed and the keypad is sampled; every `ticks_per_timer` ticks
    /// the timers count down and a framebuffer snapshot is handed to the
    /// surface if anything was drawn. The remainder of each instruction
    /// period is slept away; an iteration that overruns simply drifts.
    pub fn run(&mut self, surface: &mut dyn Surface, shutdown: &ShutdownToken) -> Result<()> {
        let mut clock = Clock::new(self.conf.clock_frequency.into());

        while !shutdown.is_triggered() {
            clock.begin();

            let keys = surface.poll_keys();
            self.tick(keys);

            if self.ticks % self.ticks_per_timer == 0 && self.machine.redraw {
                surface.present(&self.machine.framebuffer);
                self.machine.redraw = false;
            }

            clock.wait();
        }

        Ok(())
    }

    /// One scheduler tick: sample keys, then fetch-decode-execute a single
    /// instruction, then count the timers down if a timer period elapsed.
    ///
    /// While a `WaitKey` is pending no instruction is fetched; the pending
    /// register is filled as soon as a key press edge arrives, and normal
    /// fetching resumes on the following tick.
    pub(crate) fn tick(&mut self, keys: [bool; KEY_COUNT]) {
        self.machine.sample_keys(keys);

        if let Some(x) = self.machine.awaiting_key {
            if let Some(key) = self.machine.last_key {
                self.machine.registers[x as usize] = key;
                self.machine.awaiting_key = None;
            }
        } else {
            let word = self.machine.fetch();
            let instr = decode(word);
            trace!("{:04X}: {:04X} {:?}", self.machine.pc, word, instr);

            self.machine.pc = self.machine.pc.wrapping_add(2);
            self.execute(instr);
        }

        self.ticks += 1;
        if self.ticks % self.ticks_per_timer == 0 {
            self.machine.tick_timers();
        }
    }

    /// Apply exactly one instruction's semantics to the machine state.
    ///
    /// Never fails: per-instruction error conditions are state transitions
    /// (skip or no skip, push or no push), so the fixed-rate timing contract
    /// holds no matter what the program does.
    fn execute(&mut self, instr: Instr) {
        use Instr::*;

        let m = &mut self.machine;

        match instr {
            Cls => {
                m.framebuffer.fill(false);
                m.redraw = true;
            }
            Ret => {
                if m.sp == 0 {
                    // Almost certainly a malformed program, not a host error.
                    warn!("return with an empty call stack at {:#05X}", m.pc);
                } else {
                    m.sp -= 1;
                    m.pc = m.stack[m.sp];
                }
            }
            Jp(nnn) => m.pc = nnn,
            Call(nnn) => {
                if m.sp == STACK_DEPTH {
                    warn!("call stack exhausted at {:#05X}, jumping without push", m.pc);
                } else {
                    m.stack[m.sp] = m.pc;
                    m.sp += 1;
                }
                m.pc = nnn;
            }
            SeByte(x, nn) => {
                if m.registers[x as usize] == nn {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            SneByte(x, nn) => {
                if m.registers[x as usize] != nn {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            SeReg(x, y) => {
                if m.registers[x as usize] == m.registers[y as usize] {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            LdByte(x, nn) => m.registers[x as usize] = nn,
            AddByte(x, nn) => {
                // Wraps without touching the flag register.
                m.registers[x as usize] = m.registers[x as usize].wrapping_add(nn);
            }
            LdReg(x, y) => m.registers[x as usize] = m.registers[y as usize],
            Or(x, y) => m.registers[x as usize] |= m.registers[y as usize],
            And(x, y) => m.registers[x as usize] &= m.registers[y as usize],
            Xor(x, y) => m.registers[x as usize] ^= m.registers[y as usize],
            AddReg(x, y) => {
                let sum = m.registers[x as usize] as u16 + m.registers[y as usize] as u16;
                m.registers[x as usize] = (sum & 0xFF) as u8;
                m.registers[0xF] = (sum > 0xFF) as u8;
            }
            Sub(x, y) => {
                let (vx, vy) = (m.registers[x as usize], m.registers[y as usize]);
                m.registers[x as usize] = vx.wrapping_sub(vy);
                m.registers[0xF] = (vx >= vy) as u8;
            }
            Shr(x, y) => {
                let vy = m.registers[y as usize];
                m.registers[x as usize] = vy >> 1;
                m.registers[0xF] = vy & 1;
            }
            Subn(x, y) => {
                let (vx, vy) = (m.registers[x as usize], m.registers[y as usize]);
                m.registers[x as usize] = vy.wrapping_sub(vx);
                m.registers[0xF] = (vy >= vx) as u8;
            }
            Shl(x, y) => {
                let vy = m.registers[y as usize];
                m.registers[x as usize] = vy << 1;
                m.registers[0xF] = vy & 1;
            }
            SneReg(x, y) => {
                if m.registers[x as usize] != m.registers[y as usize] {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            LdIndex(nnn) => m.index = nnn,
            JpV0(nnn) => m.pc = nnn.wrapping_add(m.registers[0] as u16),
            Rnd(x, nn) => {
                m.registers[x as usize] = thread_rng().gen::<u8>() & nn;
            }
            Drw(x, y, n) => {
                // The origin wraps around the framebuffer edges, but the
                // sprite itself clips against them.
                let ox = m.registers[x as usize] as usize % DISPLAY_WIDTH;
                let oy = m.registers[y as usize] as usize % DISPLAY_HEIGHT;
                m.registers[0xF] = 0;

                for row in 0..n as usize {
                    let py = oy + row;
                    if py >= DISPLAY_HEIGHT {
                        break;
                    }
                    let sprite = m.ram[(m.index as usize + row) & (MEM_SIZE - 1)];

                    for col in 0..8 {
                        let px = ox + col;
                        if px >= DISPLAY_WIDTH {
                            break;
                        }
                        if sprite >> (7 - col) & 1 == 0 {
                            continue;
                        }
                        let pixel = &mut m.framebuffer[py * DISPLAY_WIDTH + px];
                        if *pixel {
                            // Erasing a lit pixel counts as a collision.
                            *pixel = false;
                            m.registers[0xF] = 1;
                        } else {
                            *pixel = true;
                        }
                    }
                }

                m.redraw = true;
            }
            Skp(x) => {
                let key = m.registers[x as usize] as usize;
                if key < KEY_COUNT && m.keys[key] {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            Sknp(x) => {
                let key = m.registers[x as usize] as usize;
                if key < KEY_COUNT && !m.keys[key] {
                    m.pc = m.pc.wrapping_add(2);
                }
            }
            LdDelay(x) => m.registers[x as usize] = m.delay_timer,
            WaitKey(x) => {
                // Blocks the instruction stream, not the process; the
                // scheduler withholds fetches until a key edge arrives.
                match m.last_key {
                    Some(key) => m.registers[x as usize] = key,
                    None => m.awaiting_key = Some(x),
                }
            }
            SetDelay(x) => m.delay_timer = m.registers[x as usize],
            SetSound(x) => m.sound_timer = m.registers[x as usize],
            AddIndex(x) => {
                m.index = m.index.wrapping_add(m.registers[x as usize] as u16);
            }
            LdFont(x) => {
                let glyph = m.registers[x as usize] as usize;
                m.index = (FONT_START + glyph * FONT_SPRITE_BYTES) as u16;
            }
            Bcd(x) => {
                let vx = m.registers[x as usize];
                let base = m.index as usize;
                m.ram[base & (MEM_SIZE - 1)] = vx / 100 % 10;
                m.ram[(base + 1) & (MEM_SIZE - 1)] = vx / 10 % 10;
                m.ram[(base + 2) & (MEM_SIZE - 1)] = vx % 10;
            }
            Store(x) => {
                let base = m.index as usize;
                for v in 0..=x as usize {
                    m.ram[(base + v) & (MEM_SIZE - 1)] = m.registers[v];
                }
                m.index = m.index.wrapping_add(x as u16 + 1);
            }
            Load(x) => {
                let base = m.index as usize;
                for v in 0..=x as usize {
                    m.registers[v] = m.ram[(base + v) & (MEM_SIZE - 1)];
                }
                m.index = m.index.wrapping_add(x as u16 + 1);
            }
            Nop(_) => {}
        }
    }
}

/// Troubleshooting
#[allow(dead_code)]
#[doc(hidden)]
impl Vm {
    /// Returns the contents of the framebuffer as a human readable string.
    pub fn dump_framebuffer(&self) -> String {
        let mut buf = String::new();

        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                buf.push(if self.machine.framebuffer[y * DISPLAY_WIDTH + x] {
                    '#'
                } else {
                    '.'
                });
            }
            buf.push('\n');
        }

        buf
    }
}
