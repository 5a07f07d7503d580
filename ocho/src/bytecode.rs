//! Instruction decoding.
//!
//! Instructions are 16 bits wide, stored big-endian. The most-significant
//! nibble selects the instruction family; a few families sub-dispatch on the
//! least-significant nibble or byte. Decoding happens exactly once per fetch,
//! into an [`Instr`] value carrying its operand fields:
//!
//! - `X`   bits 8-11, register index
//! - `Y`   bits 4-7, register index
//! - `N`   bits 0-3
//! - `NN`  bits 0-7
//! - `NNN` bits 0-11

/// A single decoded instruction.
///
/// Register operands are always in `0..16` because they come from 4-bit
/// fields, so the executor can index the register file without checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    /// 00E0 - clear the framebuffer.
    Cls,
    /// 00EE - return from subroutine.
    Ret,
    /// 1NNN - jump to address.
    Jp(u16),
    /// 2NNN - call subroutine.
    Call(u16),
    /// 3XNN - skip next instruction if VX == NN.
    SeByte(u8, u8),
    /// 4XNN - skip next instruction if VX != NN.
    SneByte(u8, u8),
    /// 5XY0 - skip next instruction if VX == VY.
    SeReg(u8, u8),
    /// 6XNN - VX := NN.
    LdByte(u8, u8),
    /// 7XNN - VX := VX + NN, wrapping, no flag.
    AddByte(u8, u8),
    /// 8XY0 - VX := VY.
    LdReg(u8, u8),
    /// 8XY1 - VX := VX | VY.
    Or(u8, u8),
    /// 8XY2 - VX := VX & VY.
    And(u8, u8),
    /// 8XY3 - VX := VX ^ VY.
    Xor(u8, u8),
    /// 8XY4 - VX := VX + VY; VF := carry.
    AddReg(u8, u8),
    /// 8XY5 - VX := VX - VY; VF := no borrow.
    Sub(u8, u8),
    /// 8XY6 - VX := VY >> 1; VF := dropped bit.
    Shr(u8, u8),
    /// 8XY7 - VX := VY - VX; VF := no borrow.
    Subn(u8, u8),
    /// 8XYE - VX := VY << 1; VF := bit 0 of VY.
    Shl(u8, u8),
    /// 9XY0 - skip next instruction if VX != VY.
    SneReg(u8, u8),
    /// ANNN - I := NNN.
    LdIndex(u16),
    /// BNNN - jump to NNN + V0.
    JpV0(u16),
    /// CXNN - VX := random byte & NN.
    Rnd(u8, u8),
    /// DXYN - blit an 8xN sprite from memory at I to (VX, VY).
    Drw(u8, u8, u8),
    /// EX9E - skip next instruction if key VX is pressed.
    Skp(u8),
    /// EXA1 - skip next instruction if key VX is not pressed.
    Sknp(u8),
    /// FX07 - VX := delay timer.
    LdDelay(u8),
    /// FX0A - stall until a key press edge, then VX := key.
    WaitKey(u8),
    /// FX15 - delay timer := VX.
    SetDelay(u8),
    /// FX18 - sound timer := VX.
    SetSound(u8),
    /// FX1E - I := I + VX, no flag.
    AddIndex(u8),
    /// FX29 - I := address of the font glyph for VX.
    LdFont(u8),
    /// FX33 - store the decimal digits of VX at I, I+1, I+2.
    Bcd(u8),
    /// FX55 - copy V0..=VX to memory at I; I := I + X + 1.
    Store(u8),
    /// FX65 - copy memory at I into V0..=VX; I := I + X + 1.
    Load(u8),
    /// Anything unrecognized, including 0NNN machine-code calls.
    /// Executes as a no-op.
    Nop(u16),
}

/// Decode a single big-endian instruction word.
pub fn decode(word: u16) -> Instr {
    use Instr::*;

    let x = ((word >> 8) & 0xF) as u8;
    let y = ((word >> 4) & 0xF) as u8;
    let n = (word & 0xF) as u8;
    let nn = (word & 0xFF) as u8;
    let nnn = word & 0xFFF;

    match word >> 12 {
        0x0 => match word {
            0x00E0 => Cls,
            0x00EE => Ret,
            _ => Nop(word),
        },
        0x1 => Jp(nnn),
        0x2 => Call(nnn),
        0x3 => SeByte(x, nn),
        0x4 => SneByte(x, nn),
        0x5 if n == 0 => SeReg(x, y),
        0x6 => LdByte(x, nn),
        0x7 => AddByte(x, nn),
        0x8 => match n {
            0x0 => LdReg(x, y),
            0x1 => Or(x, y),
            0x2 => And(x, y),
            0x3 => Xor(x, y),
            0x4 => AddReg(x, y),
            0x5 => Sub(x, y),
            0x6 => Shr(x, y),
            0x7 => Subn(x, y),
            0xE => Shl(x, y),
            _ => Nop(word),
        },
        0x9 if n == 0 => SneReg(x, y),
        0xA => LdIndex(nnn),
        0xB => JpV0(nnn),
        0xC => Rnd(x, nn),
        0xD => Drw(x, y, n),
        0xE => match nn {
            0x9E => Skp(x),
            0xA1 => Sknp(x),
            _ => Nop(word),
        },
        0xF => match nn {
            0x07 => LdDelay(x),
            0x0A => WaitKey(x),
            0x15 => SetDelay(x),
            0x18 => SetSound(x),
            0x1E => AddIndex(x),
            0x29 => LdFont(x),
            0x33 => Bcd(x),
            0x55 => Store(x),
            0x65 => Load(x),
            _ => Nop(word),
        },
        _ => Nop(word),
    }
}
