//! Terminal presentation surface.
//!
//! Renders the framebuffer into a raw-mode terminal and feeds keyboard
//! input back to the interpreter. The surface runs its own event/redraw
//! loop ([`TermSurface::run`]) on a dedicated thread; the interpreter
//! talks to it only through the [`Surface`] trait.
//!
//! Two hand-offs cross the thread boundary:
//!
//! - framebuffer snapshots go interpreter -> terminal through a mutex
//!   slot with last-writer-wins semantics (no backpressure: a snapshot
//!   arriving mid-render replaces the pending one),
//! - key state goes terminal -> interpreter through 16 `AtomicBool`s,
//!   each read individually (no cross-key atomicity needed).
use std::io::{self, Write};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute, queue,
    style::Print,
    terminal,
};
use log::{debug, info};

use ocho::{
    constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, KEY_COUNT},
    Error, FrameBuffer, Result, ShutdownToken, Surface,
};

/// Left-hand side of a QWERTY keyboard, mapped to the 4x4 keypad layout
/// of the original machine:
///
/// ```text
/// 1 2 3 C        1 2 3 4
/// 4 5 6 D   <-   q w e r
/// 7 8 9 E        a s d f
/// A 0 B F        z x c v
/// ```
const KEYMAP: [(char, u8); KEY_COUNT] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0A),
    ('c', 0x0B),
    ('4', 0x0C),
    ('r', 0x0D),
    ('f', 0x0E),
    ('v', 0x0F),
];

/// Terminals report key presses but no releases, so a key counts as held
/// for this long after its last repeat event.
const KEY_HOLD: Duration = Duration::from_millis(150);

/// How long the event loop naps between pump iterations.
const PUMP_NAP: Duration = Duration::from_millis(2);

fn keypad_index(ch: char) -> Option<usize> {
    KEYMAP
        .iter()
        .find(|(mapped, _)| *mapped == ch.to_ascii_lowercase())
        .map(|(_, key)| *key as usize)
}

/// State shared between the interpreter-facing handle and the event loop.
struct Shared {
    keys: [AtomicBool; KEY_COUNT],
    /// Latest framebuffer snapshot awaiting a render, if any.
    frame: Mutex<Option<Box<FrameBuffer>>>,
    /// Whether the terminal is currently in raw mode.
    active: AtomicBool,
}

/// A cheaply clonable handle onto the terminal surface. One clone runs the
/// event loop, another is handed to the scheduler as `dyn Surface`.
#[derive(Clone)]
pub struct TermSurface {
    shared: Arc<Shared>,
}

impl TermSurface {
    pub fn new() -> Self {
        TermSurface {
            shared: Arc::new(Shared {
                keys: std::array::from_fn(|_| AtomicBool::new(false)),
                frame: Mutex::new(None),
                active: AtomicBool::new(false),
            }),
        }
    }

    /// The event/redraw loop. Call on a dedicated thread; returns when the
    /// shutdown token is triggered or the terminal tears.
    pub fn run(&self, shutdown: &ShutdownToken) -> Result<()> {
        self.pump(shutdown)
            .map_err(|err| Error::Surface(err.to_string()))
    }

    fn pump(&self, shutdown: &ShutdownToken) -> crossterm::Result<()> {
        // Time of each key's most recent press event, for hold decay.
        let mut pressed_at: [Option<Instant>; KEY_COUNT] = [None; KEY_COUNT];

        while !shutdown.is_triggered() {
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(KeyEvent { code, modifiers, .. }) => match code {
                        KeyCode::Esc => {
                            if shutdown.trigger() {
                                info!("quit requested, shutting down");
                            }
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            // Raw mode turns the interrupt keystroke into an
                            // ordinary event; only the first one counts.
                            if shutdown.trigger() {
                                info!("interrupted, shutting down");
                            }
                        }
                        KeyCode::Char(ch) => {
                            if let Some(key) = keypad_index(ch) {
                                self.shared.keys[key].store(true, Ordering::Relaxed);
                                pressed_at[key] = Some(Instant::now());
                            }
                        }
                        _ => {}
                    },
                    _ => {}
                }
            }

            for (key, since) in pressed_at.iter_mut().enumerate() {
                if since.is_some_and(|at| at.elapsed() >= KEY_HOLD) {
                    self.shared.keys[key].store(false, Ordering::Relaxed);
                    *since = None;
                }
            }

            let frame = match self.shared.frame.lock() {
                Ok(mut slot) => slot.take(),
                Err(_) => None,
            };
            if let Some(frame) = frame {
                render(&frame)?;
            }

            std::thread::sleep(PUMP_NAP);
        }

        Ok(())
    }
}

impl Default for TermSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TermSurface {
    fn initialize(&mut self) -> Result<()> {
        init_terminal().map_err(|err| Error::Surface(err.to_string()))?;
        self.shared.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn present(&mut self, frame: &FrameBuffer) {
        // Copy the snapshot out; the event loop never touches
        // interpreter-owned memory. Replacing an unrendered snapshot is
        // fine, the newest frame wins.
        if let Ok(mut slot) = self.shared.frame.lock() {
            *slot = Some(Box::new(*frame));
        }
    }

    fn poll_keys(&mut self) -> [bool; KEY_COUNT] {
        std::array::from_fn(|key| self.shared.keys[key].load(Ordering::Relaxed))
    }

    fn shutdown(&mut self) {
        // Idempotent: only the holder of the swap restores the terminal.
        if self.shared.active.swap(false, Ordering::SeqCst) {
            if let Err(err) = restore_terminal() {
                debug!("failed to restore the terminal: {err}");
            }
        }
    }
}

fn init_terminal() -> crossterm::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(
        io::stdout(),
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::Clear(terminal::ClearType::All)
    )
}

fn restore_terminal() -> crossterm::Result<()> {
    terminal::disable_raw_mode()?;
    execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen)
}

/// Draw a full frame, two terminal columns per pixel.
fn render(frame: &FrameBuffer) -> crossterm::Result<()> {
    let mut out = io::stdout();

    for y in 0..DISPLAY_HEIGHT {
        let mut line = String::with_capacity(DISPLAY_WIDTH * 2);
        for x in 0..DISPLAY_WIDTH {
            line.push_str(if frame[y * DISPLAY_WIDTH + x] {
                "██"
            } else {
                "  "
            });
        }
        queue!(out, cursor::MoveTo(0, y as u16), Print(line))?;
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_keymap_covers_all_keys() {
        let mut seen = [false; KEY_COUNT];
        for (ch, _) in KEYMAP {
            let key = keypad_index(ch).unwrap();
            assert!(!seen[key], "key {key:X} mapped twice");
            seen[key] = true;
        }
        assert!(seen.iter().all(|s| *s));

        // Case-insensitive; unmapped characters are ignored.
        assert_eq!(keypad_index('Q'), Some(0x4));
        assert_eq!(keypad_index('7'), None);
    }

    #[test]
    fn test_present_last_writer_wins() {
        let mut surface = TermSurface::new();

        let mut first = [false; DISPLAY_WIDTH * DISPLAY_HEIGHT];
        first[0] = true;
        let mut second = [false; DISPLAY_WIDTH * DISPLAY_HEIGHT];
        second[1] = true;

        surface.present(&first);
        surface.present(&second);

        let frame = surface.shared.frame.lock().unwrap().take().unwrap();
        assert!(!frame[0]);
        assert!(frame[1]);
        // Slot drained: nothing left to render.
        assert!(surface.shared.frame.lock().unwrap().is_none());
    }

    #[test]
    fn test_poll_keys_reads_shared_state() {
        let mut surface = TermSurface::new();
        let handle = surface.clone();

        handle.shared.keys[0xB].store(true, Ordering::Relaxed);
        let keys = surface.poll_keys();
        assert!(keys[0xB]);
        assert_eq!(keys.iter().filter(|k| **k).count(), 1);
    }
}
