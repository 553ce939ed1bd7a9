//! Renders a validated image as annotated text: a tabular data-segment
//! dump followed by one line per code-segment instruction.

use crate::image::{Image, ImageError};
use crate::interpreter::opcode::{self, ArgType};
use std::fmt;
use std::fmt::Write as _;

/// An opcode word in the code segment fell outside `[OP_STOP, OP_INVAL)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IllegalInstruction {
    pub addr: i32,
    pub opcode: i32,
}

impl fmt::Display for IllegalInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Illegal instruction 0x{:08x}", self.opcode)
    }
}

#[derive(Debug)]
pub enum DisassembleError {
    ImageInvalid(ImageError),
    IllegalInstruction(IllegalInstruction),
}

impl fmt::Display for DisassembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisassembleError::ImageInvalid(e) => write!(f, "{}", e),
            DisassembleError::IllegalInstruction(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DisassembleError {}

impl From<ImageError> for DisassembleError {
    fn from(e: ImageError) -> DisassembleError {
        DisassembleError::ImageInvalid(e)
    }
}

fn render_register(value: i32) -> String {
    if value == 0 {
        "sp".to_string()
    } else {
        format!("r{}", value)
    }
}

fn render_operand(argtype: ArgType, word: crate::word::Word) -> String {
    match argtype {
        ArgType::Reg => render_register(word.as_i32()),
        ArgType::Mem => format!("{:x}", word.as_u32()),
        ArgType::ImmI => format!("{}", word.as_i32()),
        // Matches C's "%f": six fractional digits.
        ArgType::ImmF => format!("{:.6}", word.as_f32()),
    }
}

/// Render `image`'s data and code segments as text. `highlight_ip`, if
/// given, marks that code address with a `>>` gutter, as the interactive
/// stepper does for the current instruction.
pub fn disassemble(image: &Image, highlight_ip: Option<i32>) -> Result<String, DisassembleError> {
    let bounds = image.validate()?;
    let mem = image.mem();
    let mut out = String::new();

    writeln!(out, "--- DATA SECTION ---------------------------------").ok();
    writeln!(out, "address     hex        decimal int      float   ascii").ok();
    for i in 0..bounds.len_data() as usize {
        let w = mem[i];
        let bytes = w.to_le_bytes();
        let ascii: String = bytes
            .iter()
            .map(|&b| if b > 31 && b < 127 { b as char } else { '.' })
            .collect();
        writeln!(
            out,
            "{:08x}:   {:08x}   {:11}   {:8.6}   {}",
            i,
            w.as_u32(),
            w.as_i32(),
            w.as_f32(),
            ascii
        )
        .ok();
    }

    writeln!(out, "--- CODE SECTION ---------------------------------").ok();
    let mut i = bounds.start_code;
    while i < bounds.end_code {
        let idx = i as usize;
        let op = mem[idx].as_i32();
        let info = match opcode::by_opcode(op) {
            Some(info) => info,
            None => {
                return Err(DisassembleError::IllegalInstruction(IllegalInstruction {
                    addr: i,
                    opcode: op,
                }));
            }
        };

        let marker = if Some(i) == highlight_ip { ">>" } else { "  " };

        write!(out, "{:08x}:   {:08x} ", i, op).ok();
        if info.nargs > 0 {
            write!(out, "{:08x} ", mem[idx + 1].as_u32()).ok();
        } else {
            write!(out, "         ").ok();
        }
        if info.nargs == 2 {
            write!(out, "{:08x} {}", mem[idx + 2].as_u32(), marker).ok();
        } else {
            write!(out, "         {}", marker).ok();
        }

        write!(out, "{:<8}", info.mnemonic).ok();
        if info.nargs > 0 {
            write!(out, "{}", render_operand(info.argtypes[0], mem[idx + 1])).ok();
            if info.nargs > 1 {
                write!(out, ", {}", render_operand(info.argtypes[1], mem[idx + 2])).ok();
            }
        }
        writeln!(out).ok();

        i += 1 + info.nargs as i32;
    }

    Ok(out)
}
