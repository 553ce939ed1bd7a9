//! Fetch-decode-execute loop, register file, bounds checks and the
//! syscall bridge.
//!
//! This is a direct, memory-safe re-expression of the reference's
//! `evm_run`: the register file keeps `ip` as a separate field and the
//! stack pointer as a named accessor over register slot 0 (see the design
//! notes on register packing), and every bounds check the reference
//! expresses as a `CHKREG`/`CHKMEM`/`CHKCOD` macro is a named method here.

pub mod opcode;

use crate::image::{Bounds, Image, ImageError};
use crate::word::Word;
use opcode::OpInfo;
use std::fmt;

/// Number of general-purpose registers (`r1..rN`). Register slot 0 is
/// always the stack pointer.
pub const NUM_REGS: usize = 4;

/// `(ip, sp, r1..rN)`. `sp` is a named accessor over register slot 0 so
/// that register-indexed instructions can address the stack pointer
/// uniformly with the general registers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regs {
    pub ip: i32,
    slots: [Word; NUM_REGS + 1],
}

impl Regs {
    pub fn new(ip: i32, sp: i32) -> Regs {
        let mut slots = [Word::ZERO; NUM_REGS + 1];
        slots[0] = Word::from_i32(sp);
        Regs { ip, slots }
    }

    pub fn sp(&self) -> i32 {
        self.slots[0].as_i32()
    }

    pub fn set_sp(&mut self, v: i32) {
        self.slots[0] = Word::from_i32(v);
    }

    /// Read register slot `index` (0 = `sp`, 1..=N = general registers).
    /// Panics if `index` is out of `[0, NUM_REGS]` -- callers must
    /// `check_register` first, exactly as the reference's `CHKREG` gates
    /// every `r.r[arg]` access.
    pub fn slot(&self, index: usize) -> Word {
        self.slots[index]
    }

    pub fn set_slot(&mut self, index: usize, value: Word) {
        self.slots[index] = value;
    }

    /// The general registers `r1..rN`, in order, for display purposes.
    pub fn general_registers(&self) -> &[Word] {
        &self.slots[1..]
    }
}

/// A fault kind, without the register snapshot. See [`Fault`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaultKind {
    ImageInvalid(ImageError),
    BadIp,
    BadSp,
    BadRegister,
    BadMemory,
    BadCodeAddress,
    NoSyscallHook,
    UnknownOpcode,
    DivByZero,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::ImageInvalid(e) => write!(f, "{}", e),
            FaultKind::BadIp => write!(f, "instruction pointer out of code segment"),
            FaultKind::BadSp => write!(f, "stack pointer out of data segment"),
            FaultKind::BadRegister => write!(f, "encountered invalid register"),
            FaultKind::BadMemory => write!(f, "encountered invalid memory address"),
            FaultKind::BadCodeAddress => write!(f, "encountered invalid code address"),
            FaultKind::NoSyscallHook => write!(
                f,
                "encountered syscall instruction, but no syscall callback provided"
            ),
            FaultKind::UnknownOpcode => write!(f, "encountered unrecognized instruction"),
            FaultKind::DivByZero => write!(f, "division by zero"),
        }
    }
}

/// A fault, carrying the register snapshot at the moment it occurred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fault {
    pub kind: FaultKind,
    pub regs: Regs,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// The outcome of a `run` call.
#[derive(Debug, Clone, Copy)]
pub struct Status {
    pub regs: Regs,
    pub stopped: bool,
    pub error: Option<Fault>,
}

/// A syscall hook bridges interpreter state to the outside world: it
/// receives the current register file and the full memory image, and
/// returns the register file that should replace it.
pub type SyscallHook<'a> = dyn FnMut(Regs, &mut Image) -> Regs + 'a;

fn fault(kind: FaultKind, regs: Regs) -> Status {
    Status {
        regs,
        stopped: false,
        error: Some(Fault { kind, regs }),
    }
}

fn check_register(index: i32, regs: Regs) -> Result<usize, Status> {
    if index < 0 || index > NUM_REGS as i32 {
        Err(fault(FaultKind::BadRegister, regs))
    } else {
        Ok(index as usize)
    }
}

fn check_mem(addr: i32, bounds: &Bounds, regs: Regs) -> Result<usize, Status> {
    if bounds.contains_data(addr) {
        Ok(addr as usize)
    } else {
        Err(fault(FaultKind::BadMemory, regs))
    }
}

fn check_code(addr: i32, bounds: &Bounds, regs: Regs) -> Result<(), Status> {
    if bounds.contains_code(addr) {
        Ok(())
    } else {
        Err(fault(FaultKind::BadCodeAddress, regs))
    }
}

/// Run `image` to completion (or one step, if `single_step`), starting
/// from `initial` if given, otherwise from `ip = len_data`,
/// `sp = len_data - 1`.
pub fn run(
    image: &mut Image,
    mut syscall: Option<&mut SyscallHook<'_>>,
    initial: Option<Regs>,
    single_step: bool,
) -> Status {
    let bounds = match image.validate() {
        Ok(b) => b,
        Err(e) => {
            return Status {
                regs: Regs::new(0, 0),
                stopped: false,
                error: Some(Fault {
                    kind: FaultKind::ImageInvalid(e),
                    regs: Regs::new(0, 0),
                }),
            };
        }
    };

    let mut regs = initial.unwrap_or_else(|| Regs::new(bounds.start_code, bounds.end_data - 1));

    loop {
        if !bounds.contains_code(regs.ip) {
            return fault(FaultKind::BadIp, regs);
        }
        if !bounds.contains_data(regs.sp()) {
            return fault(FaultKind::BadSp, regs);
        }

        let ip = regs.ip as usize;
        let op = image.mem()[ip].as_i32();

        let info: &OpInfo = match opcode::by_opcode(op) {
            Some(info) => info,
            None => return fault(FaultKind::UnknownOpcode, regs),
        };

        log::trace!("ip={:#06x} {}", regs.ip, info.mnemonic);

        // Arguments are decoded lazily: an instruction with nargs < 2 must
        // not read past its own argument words.
        let arg1 = if info.nargs >= 1 {
            Some(image.mem()[ip + 1])
        } else {
            None
        };
        let arg2 = if info.nargs >= 2 {
            Some(image.mem()[ip + 2])
        } else {
            None
        };

        macro_rules! try_status {
            ($e:expr) => {
                match $e {
                    Ok(v) => v,
                    Err(status) => return status,
                }
            };
        }

        match info.opcode {
            opcode::OP_STOP => {
                return Status {
                    regs,
                    stopped: true,
                    error: None,
                };
            }
            opcode::OP_NOP => {}
            opcode::OP_SYSCALL => match syscall.as_deref_mut() {
                Some(hook) => regs = hook(regs, image),
                None => return fault(FaultKind::NoSyscallHook, regs),
            },
            opcode::OP_LD => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let m = try_status!(check_mem(arg2.unwrap().as_i32(), &bounds, regs));
                let v = image.mem()[m];
                regs.set_slot(r, v);
            }
            opcode::OP_ST => {
                let m = try_status!(check_mem(arg1.unwrap().as_i32(), &bounds, regs));
                let r = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                image.mem_mut()[m] = regs.slot(r);
            }
            opcode::OP_SET => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                regs.set_slot(r, arg2.unwrap());
            }
            opcode::OP_FSET => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                regs.set_slot(r, arg2.unwrap());
            }
            opcode::OP_CPY => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let v = regs.slot(rs);
                regs.set_slot(rd, v);
            }
            opcode::OP_PUSH => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                // sp was already range-checked by this iteration's
                // pre-dispatch check; no further CHKMEM here, matching the
                // reference. The post-decrement may leave sp out of range,
                // but that's only caught at the top of the next iteration.
                let sp = regs.sp();
                image.mem_mut()[sp as usize] = regs.slot(r);
                regs.set_sp(sp - 1);
            }
            opcode::OP_POP => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let sp = regs.sp();
                let v = image.mem()[sp as usize];
                regs.set_slot(r, v);
                regs.set_sp(sp + 1);
            }
            opcode::OP_ADD => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let v = regs.slot(rd).as_i32().wrapping_add(regs.slot(rs).as_i32());
                regs.set_slot(rd, Word::from_i32(v));
            }
            opcode::OP_SUB => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let v = regs.slot(rd).as_i32().wrapping_sub(regs.slot(rs).as_i32());
                regs.set_slot(rd, Word::from_i32(v));
            }
            opcode::OP_MUL => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let v = regs.slot(rd).as_i32().wrapping_mul(regs.slot(rs).as_i32());
                regs.set_slot(rd, Word::from_i32(v));
            }
            opcode::OP_DIV => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let divisor = regs.slot(rs).as_i32();
                if divisor == 0 {
                    return fault(FaultKind::DivByZero, regs);
                }
                let v = regs.slot(rd).as_i32().wrapping_div(divisor);
                regs.set_slot(rd, Word::from_i32(v));
            }
            opcode::OP_FADD => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let v = regs.slot(rd).as_f32() + regs.slot(rs).as_f32();
                regs.set_slot(rd, Word::from_f32(v));
            }
            opcode::OP_FSUB => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let v = regs.slot(rd).as_f32() - regs.slot(rs).as_f32();
                regs.set_slot(rd, Word::from_f32(v));
            }
            opcode::OP_FMUL => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let v = regs.slot(rd).as_f32() * regs.slot(rs).as_f32();
                regs.set_slot(rd, Word::from_f32(v));
            }
            opcode::OP_FDIV => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                // IEEE-754 division by zero yields inf/nan, not a fault.
                let v = regs.slot(rd).as_f32() / regs.slot(rs).as_f32();
                regs.set_slot(rd, Word::from_f32(v));
            }
            opcode::OP_NOT => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let v = !regs.slot(r).as_u32();
                regs.set_slot(r, Word::from_u32(v));
            }
            opcode::OP_LNOT => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let v = if regs.slot(r).as_i32() == 0 { 1 } else { 0 };
                regs.set_slot(r, Word::from_i32(v));
            }
            opcode::OP_AND => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let v = regs.slot(rd).as_u32() & regs.slot(rs).as_u32();
                regs.set_slot(rd, Word::from_u32(v));
            }
            opcode::OP_OR => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let v = regs.slot(rd).as_u32() | regs.slot(rs).as_u32();
                regs.set_slot(rd, Word::from_u32(v));
            }
            opcode::OP_XOR => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let v = regs.slot(rd).as_u32() ^ regs.slot(rs).as_u32();
                regs.set_slot(rd, Word::from_u32(v));
            }
            opcode::OP_JP => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let target = arg2.unwrap().as_i32();
                try_status!(check_code(target, &bounds, regs));
                if regs.slot(r).as_i32() > 0 {
                    regs.ip = target;
                    continue;
                }
            }
            opcode::OP_JPZ => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let target = arg2.unwrap().as_i32();
                try_status!(check_code(target, &bounds, regs));
                if regs.slot(r).as_i32() >= 0 {
                    regs.ip = target;
                    continue;
                }
            }
            opcode::OP_JZ => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let target = arg2.unwrap().as_i32();
                try_status!(check_code(target, &bounds, regs));
                if regs.slot(r).as_i32() == 0 {
                    regs.ip = target;
                    continue;
                }
            }
            opcode::OP_JN => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let target = arg2.unwrap().as_i32();
                try_status!(check_code(target, &bounds, regs));
                if regs.slot(r).as_i32() < 0 {
                    regs.ip = target;
                    continue;
                }
            }
            opcode::OP_JNZ => {
                // Despite the mnemonic, this is "jump if non-positive"
                // (<= 0), inherited verbatim from the reference. See the
                // design notes: preserved, not "fixed".
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let target = arg2.unwrap().as_i32();
                try_status!(check_code(target, &bounds, regs));
                if regs.slot(r).as_i32() <= 0 {
                    regs.ip = target;
                    continue;
                }
            }
            opcode::OP_J => {
                let target = arg1.unwrap().as_i32();
                try_status!(check_code(target, &bounds, regs));
                regs.ip = target;
                continue;
            }
            opcode::OP_CVTFI => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let v = regs.slot(r).as_f32() as i32;
                regs.set_slot(r, Word::from_i32(v));
            }
            opcode::OP_CVTIF => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let v = regs.slot(r).as_i32() as f32;
                regs.set_slot(r, Word::from_f32(v));
            }
            opcode::OP_PUT => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                println!("{}", regs.slot(r).as_i32());
            }
            opcode::OP_FPUT => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                println!("{:.6}", regs.slot(r).as_f32());
            }
            opcode::OP_LDA => {
                let r = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let m = arg2.unwrap().as_i32();
                try_status!(check_mem(m, &bounds, regs));
                regs.set_slot(r, Word::from_i32(m));
            }
            opcode::OP_LDD => {
                let rd = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let ra = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let addr = regs.slot(ra).as_i32();
                let m = try_status!(check_mem(addr, &bounds, regs));
                let v = image.mem()[m];
                regs.set_slot(rd, v);
            }
            opcode::OP_STD => {
                let ra = try_status!(check_register(arg1.unwrap().as_i32(), regs));
                let rs = try_status!(check_register(arg2.unwrap().as_i32(), regs));
                let addr = regs.slot(ra).as_i32();
                let m = try_status!(check_mem(addr, &bounds, regs));
                image.mem_mut()[m] = regs.slot(rs);
            }
            _ => unreachable!("OPCODES only contains opcode values in [0, OP_INVAL)"),
        }

        regs.ip += 1 + info.nargs as i32;

        if single_step {
            return Status {
                regs,
                stopped: false,
                error: None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;

    /// A one-word data segment (stack space for `sp`'s initial slot) plus
    /// `code`. `len_data = 0` would leave the initial `sp = end_data - 1 =
    /// -1` outside the (empty) data range, faulting `BadSp` before the
    /// first instruction ever runs -- EduVM genuinely requires `len_data
    /// >= 1` for a runnable image, matching `push_past_bottom_of_data...`
    /// below.
    fn tiny_image(code: Vec<Word>) -> Image {
        Image::new(1, code.len() as i32, vec![Word::ZERO], code)
    }

    #[test]
    fn smallest_valid_program_stops() {
        let mut img = tiny_image(vec![Word::from_i32(opcode::OP_STOP as i32)]);
        let status = run(&mut img, None, None, false);
        assert!(status.stopped);
        assert!(status.error.is_none());
    }

    #[test]
    fn arithmetic_and_put() {
        let code = vec![
            Word::from_i32(opcode::OP_SET as i32),
            Word::from_i32(1),
            Word::from_i32(7),
            Word::from_i32(opcode::OP_SET as i32),
            Word::from_i32(2),
            Word::from_i32(5),
            Word::from_i32(opcode::OP_SUB as i32),
            Word::from_i32(1),
            Word::from_i32(2),
            Word::from_i32(opcode::OP_STOP as i32),
        ];
        let mut img = tiny_image(code);
        let status = run(&mut img, None, None, false);
        assert!(status.stopped);
        assert_eq!(status.regs.slot(1).as_i32(), 2);
    }

    #[test]
    fn push_past_bottom_of_data_faults_on_next_step() {
        // data segment has one word (the slot a push can still land in);
        // the interpreter itself starts sp at end_data - 1 == 0.
        let code = vec![
            Word::from_i32(opcode::OP_PUSH as i32),
            Word::from_i32(1),
            Word::from_i32(opcode::OP_PUSH as i32),
            Word::from_i32(1),
        ];
        let mut img = Image::new(1, code.len() as i32, vec![Word::ZERO], code);
        let status = run(&mut img, None, None, false);
        assert_eq!(status.error.unwrap().kind, FaultKind::BadSp);
    }

    #[test]
    fn div_by_zero_faults() {
        let code = vec![
            Word::from_i32(opcode::OP_SET as i32),
            Word::from_i32(1),
            Word::from_i32(10),
            Word::from_i32(opcode::OP_SET as i32),
            Word::from_i32(2),
            Word::from_i32(0),
            Word::from_i32(opcode::OP_DIV as i32),
            Word::from_i32(1),
            Word::from_i32(2),
        ];
        let mut img = tiny_image(code);
        let status = run(&mut img, None, None, false);
        assert_eq!(status.error.unwrap().kind, FaultKind::DivByZero);
    }

    #[test]
    fn fdiv_by_zero_yields_infinity_not_a_fault() {
        let code = vec![
            Word::from_i32(opcode::OP_FSET as i32),
            Word::from_i32(1),
            Word::from_f32(1.0),
            Word::from_i32(opcode::OP_FSET as i32),
            Word::from_i32(2),
            Word::from_f32(0.0),
            Word::from_i32(opcode::OP_FDIV as i32),
            Word::from_i32(1),
            Word::from_i32(2),
            Word::from_i32(opcode::OP_STOP as i32),
        ];
        let mut img = tiny_image(code);
        let status = run(&mut img, None, None, false);
        assert!(status.stopped);
        assert!(status.regs.slot(1).as_f32().is_infinite());
    }

    #[test]
    fn cvtfi_truncates_toward_zero() {
        let code = vec![
            Word::from_i32(opcode::OP_FSET as i32),
            Word::from_i32(1),
            Word::from_f32(-3.9),
            Word::from_i32(opcode::OP_CVTFI as i32),
            Word::from_i32(1),
            Word::from_i32(opcode::OP_STOP as i32),
        ];
        let mut img = tiny_image(code);
        let status = run(&mut img, None, None, false);
        assert_eq!(status.regs.slot(1).as_i32(), -3);
    }

    #[test]
    fn unknown_opcode_faults() {
        let mut img = tiny_image(vec![Word::from_i32(opcode::OP_INVAL as i32)]);
        let status = run(&mut img, None, None, false);
        assert_eq!(status.error.unwrap().kind, FaultKind::UnknownOpcode);
    }

    #[test]
    fn syscall_without_hook_faults() {
        let mut img = tiny_image(vec![Word::from_i32(opcode::OP_SYSCALL as i32)]);
        let status = run(&mut img, None, None, false);
        assert_eq!(status.error.unwrap().kind, FaultKind::NoSyscallHook);
    }

    #[test]
    fn syscall_hook_replaces_registers() {
        let mut img = tiny_image(vec![
            Word::from_i32(opcode::OP_SYSCALL as i32),
            Word::from_i32(opcode::OP_STOP as i32),
        ]);
        let mut hook = |mut regs: Regs, _mem: &mut Image| {
            regs.set_slot(1, Word::from_i32(99));
            regs
        };
        let status = run(&mut img, Some(&mut hook), None, false);
        assert!(status.stopped);
        assert_eq!(status.regs.slot(1).as_i32(), 99);
    }

    #[test]
    fn single_step_executes_one_instruction() {
        let code = vec![
            Word::from_i32(opcode::OP_SET as i32),
            Word::from_i32(1),
            Word::from_i32(5),
            Word::from_i32(opcode::OP_STOP as i32),
        ];
        let mut img = tiny_image(code);
        let status = run(&mut img, None, None, true);
        assert!(!status.stopped);
        assert_eq!(status.regs.slot(1).as_i32(), 5);
        // code starts at mem index len_data == 1; `set r1, 5` is 3 words.
        assert_eq!(status.regs.ip, 4);
    }

    #[rstest::rstest]
    #[case(opcode::OP_ADD, 7, 5, 12)]
    #[case(opcode::OP_SUB, 7, 5, 2)]
    #[case(opcode::OP_MUL, 7, 5, 35)]
    #[case(opcode::OP_DIV, 7, 5, 1)]
    #[case(opcode::OP_AND, 0b1100, 0b1010, 0b1000)]
    #[case(opcode::OP_OR, 0b1100, 0b1010, 0b1110)]
    #[case(opcode::OP_XOR, 0b1100, 0b1010, 0b0110)]
    fn binary_alu_opcodes_combine_r1_and_r2_into_r1(
        #[case] op: u8,
        #[case] lhs: i32,
        #[case] rhs: i32,
        #[case] expected: i32,
    ) {
        let code = vec![
            Word::from_i32(opcode::OP_SET as i32),
            Word::from_i32(1),
            Word::from_i32(lhs),
            Word::from_i32(opcode::OP_SET as i32),
            Word::from_i32(2),
            Word::from_i32(rhs),
            Word::from_i32(op as i32),
            Word::from_i32(1),
            Word::from_i32(2),
            Word::from_i32(opcode::OP_STOP as i32),
        ];
        let mut img = tiny_image(code);
        let status = run(&mut img, None, None, false);
        assert!(status.stopped);
        assert_eq!(status.regs.slot(1).as_i32(), expected);
    }

    #[rstest::rstest]
    #[case(opcode::OP_JP, 1, true)]
    #[case(opcode::OP_JP, 0, false)]
    #[case(opcode::OP_JP, -1, false)]
    #[case(opcode::OP_JZ, 0, true)]
    #[case(opcode::OP_JZ, 1, false)]
    #[case(opcode::OP_JN, -1, true)]
    #[case(opcode::OP_JN, 0, false)]
    #[case(opcode::OP_JPZ, 0, true)]
    #[case(opcode::OP_JPZ, 1, true)]
    #[case(opcode::OP_JPZ, -1, false)]
    #[case(opcode::OP_JNZ, 0, true)]
    #[case(opcode::OP_JNZ, -1, true)]
    #[case(opcode::OP_JNZ, 1, false)]
    fn conditional_jump_opcodes_take_or_skip_per_register_sign(
        #[case] op: u8,
        #[case] r1: i32,
        #[case] taken: bool,
    ) {
        // set r1, r1 / <op> r1, skip_target / set r1, 99 / skip_target: stop
        // code starts at mem index len_data == 1, so the `stop` at the end
        // of this 10-word code segment sits at absolute index 10.
        let code = vec![
            Word::from_i32(opcode::OP_SET as i32),
            Word::from_i32(1),
            Word::from_i32(r1),
            Word::from_i32(op as i32),
            Word::from_i32(1),
            Word::from_i32(10),
            Word::from_i32(opcode::OP_SET as i32),
            Word::from_i32(1),
            Word::from_i32(99),
            Word::from_i32(opcode::OP_STOP as i32),
        ];
        let mut img = tiny_image(code);
        let status = run(&mut img, None, None, false);
        assert!(status.stopped);
        let landed_on_set = status.regs.slot(1).as_i32() == 99;
        assert_eq!(!taken, landed_on_set);
    }

    #[test]
    fn image_invalid_reports_as_fault() {
        let mut img = Image::from_words(vec![Word::ZERO; 2]);
        let status = run(&mut img, None, None, false);
        match status.error.unwrap().kind {
            FaultKind::ImageInvalid(_) => {}
            other => panic!("expected ImageInvalid, got {:?}", other),
        }
    }
}
