//! The static opcode table: mnemonic, argument count and argument types
//! per opcode. Shared by the interpreter's dispatcher, the assembler's
//! code generator and the disassembler's renderer, exactly as the
//! reference's single `evm_ops[]` table is shared by all three.

/// How an instruction's argument word should be interpreted.
///
/// Note there is a single `Mem` variant for both data addresses (`ld`,
/// `st`, `lda`) and code addresses (`jp`, `j`, ...): the assembler accepts
/// the same surface syntax (a label or an integer literal) for both, and
/// only the interpreter's dispatcher -- keyed on the opcode itself, not on
/// this type -- decides whether to bounds-check the resolved address
/// against the data segment (`CHKMEM`) or the code segment (`CHKCOD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    /// A label-or-literal address, resolved into a data or code address
    /// depending on which opcode it belongs to.
    Mem,
    /// An integer immediate.
    ImmI,
    /// A float immediate.
    ImmF,
    /// A register index (`sp` or `r1`..`r4`).
    Reg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub nargs: u8,
    pub argtypes: [ArgType; 2],
}

macro_rules! op {
    ($opcode:expr, $mnemonic:expr) => {
        OpInfo {
            opcode: $opcode,
            mnemonic: $mnemonic,
            nargs: 0,
            argtypes: [ArgType::ImmI, ArgType::ImmI],
        }
    };
    ($opcode:expr, $mnemonic:expr, $a0:expr) => {
        OpInfo {
            opcode: $opcode,
            mnemonic: $mnemonic,
            nargs: 1,
            argtypes: [$a0, ArgType::ImmI],
        }
    };
    ($opcode:expr, $mnemonic:expr, $a0:expr, $a1:expr) => {
        OpInfo {
            opcode: $opcode,
            mnemonic: $mnemonic,
            nargs: 2,
            argtypes: [$a0, $a1],
        }
    };
}

pub const OP_STOP: u8 = 0x00;
pub const OP_NOP: u8 = 0x01;
pub const OP_SYSCALL: u8 = 0x02;
pub const OP_LD: u8 = 0x03;
pub const OP_ST: u8 = 0x04;
pub const OP_SET: u8 = 0x05;
pub const OP_FSET: u8 = 0x06;
pub const OP_CPY: u8 = 0x07;
pub const OP_PUSH: u8 = 0x08;
pub const OP_POP: u8 = 0x09;
pub const OP_ADD: u8 = 0x0a;
pub const OP_SUB: u8 = 0x0b;
pub const OP_MUL: u8 = 0x0c;
pub const OP_DIV: u8 = 0x0d;
pub const OP_FADD: u8 = 0x0e;
pub const OP_FSUB: u8 = 0x0f;
pub const OP_FMUL: u8 = 0x10;
pub const OP_FDIV: u8 = 0x11;
pub const OP_NOT: u8 = 0x12;
pub const OP_AND: u8 = 0x13;
pub const OP_OR: u8 = 0x14;
pub const OP_XOR: u8 = 0x15;
pub const OP_JP: u8 = 0x16;
pub const OP_JPZ: u8 = 0x17;
pub const OP_JZ: u8 = 0x18;
pub const OP_JN: u8 = 0x19;
pub const OP_JNZ: u8 = 0x1a;
pub const OP_J: u8 = 0x1b;
pub const OP_CVTFI: u8 = 0x1c;
pub const OP_CVTIF: u8 = 0x1d;
pub const OP_PUT: u8 = 0x1e;
pub const OP_FPUT: u8 = 0x1f;
pub const OP_LNOT: u8 = 0x20;
pub const OP_LDA: u8 = 0x21;
pub const OP_LDD: u8 = 0x22;
pub const OP_STD: u8 = 0x23;

/// One past the last valid opcode; also the sentinel "invalid opcode"
/// value used by the assembler and disassembler.
pub const OP_INVAL: u8 = 0x24;

/// Indexed by opcode value, `OPCODES[OP_STOP as usize..]`. Deliberately a
/// flat array rather than a `match` so the assembler, interpreter and
/// disassembler all consult the exact same nargs/argtypes per opcode.
pub const OPCODES: [OpInfo; OP_INVAL as usize] = [
    op!(OP_STOP, "stop"),
    op!(OP_NOP, "nop"),
    op!(OP_SYSCALL, "syscall"),
    op!(OP_LD, "ld", ArgType::Reg, ArgType::Mem),
    op!(OP_ST, "st", ArgType::Mem, ArgType::Reg),
    op!(OP_SET, "set", ArgType::Reg, ArgType::ImmI),
    op!(OP_FSET, "fset", ArgType::Reg, ArgType::ImmF),
    op!(OP_CPY, "cpy", ArgType::Reg, ArgType::Reg),
    op!(OP_PUSH, "push", ArgType::Reg),
    op!(OP_POP, "pop", ArgType::Reg),
    op!(OP_ADD, "add", ArgType::Reg, ArgType::Reg),
    op!(OP_SUB, "sub", ArgType::Reg, ArgType::Reg),
    op!(OP_MUL, "mul", ArgType::Reg, ArgType::Reg),
    op!(OP_DIV, "div", ArgType::Reg, ArgType::Reg),
    op!(OP_FADD, "fadd", ArgType::Reg, ArgType::Reg),
    op!(OP_FSUB, "fsub", ArgType::Reg, ArgType::Reg),
    op!(OP_FMUL, "fmul", ArgType::Reg, ArgType::Reg),
    op!(OP_FDIV, "fdiv", ArgType::Reg, ArgType::Reg),
    op!(OP_NOT, "not", ArgType::Reg),
    op!(OP_AND, "and", ArgType::Reg, ArgType::Reg),
    op!(OP_OR, "or", ArgType::Reg, ArgType::Reg),
    op!(OP_XOR, "xor", ArgType::Reg, ArgType::Reg),
    op!(OP_JP, "jp", ArgType::Reg, ArgType::Mem),
    op!(OP_JPZ, "jpz", ArgType::Reg, ArgType::Mem),
    op!(OP_JZ, "jz", ArgType::Reg, ArgType::Mem),
    op!(OP_JN, "jn", ArgType::Reg, ArgType::Mem),
    op!(OP_JNZ, "jnz", ArgType::Reg, ArgType::Mem),
    op!(OP_J, "j", ArgType::Mem),
    op!(OP_CVTFI, "cvtfi", ArgType::Reg),
    op!(OP_CVTIF, "cvtif", ArgType::Reg),
    op!(OP_PUT, "put", ArgType::Reg),
    op!(OP_FPUT, "fput", ArgType::Reg),
    op!(OP_LNOT, "lnot", ArgType::Reg),
    op!(OP_LDA, "lda", ArgType::Reg, ArgType::Mem),
    op!(OP_LDD, "ldd", ArgType::Reg, ArgType::Reg),
    op!(OP_STD, "std", ArgType::Reg, ArgType::Reg),
];

/// Look up an opcode's static info by mnemonic, case-insensitively (the
/// assembler lower-cases instruction identifiers before matching).
pub fn by_mnemonic(mnemonic: &str) -> Option<&'static OpInfo> {
    OPCODES
        .iter()
        .find(|op| op.mnemonic.eq_ignore_ascii_case(mnemonic))
}

/// Look up an opcode's static info by numeric value.
pub fn by_opcode(opcode: i32) -> Option<&'static OpInfo> {
    if opcode >= OP_STOP as i32 && opcode < OP_INVAL as i32 {
        Some(&OPCODES[opcode as usize])
    } else {
        None
    }
}
