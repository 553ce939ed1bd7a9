//! The two code passes: pass 1 walks the code section advancing a running
//! position and recording labels without emitting anything (so forward
//! jumps resolve); pass 2 re-walks the identical token stream and emits
//! opcode + argument words against the now-complete label table.

use super::error::AssembleError;
use super::labels::Labels;
use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use crate::interpreter::opcode::{self, ArgType};
use crate::word::Word;

fn peek_tokens(lex: &Lexer, n: usize) -> Result<Vec<Token>, AssembleError> {
    let mut tmp = lex.clone();
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(
            tmp.next()
                .map_err(|pos| AssembleError::new("Unrecognized token", pos))?,
        );
    }
    Ok(out)
}

fn swallow(lex: &mut Lexer, n: usize) -> Result<(), AssembleError> {
    for _ in 0..n {
        lex.next()
            .map_err(|pos| AssembleError::new("Unrecognized token", pos))?;
    }
    Ok(())
}

/// `sp` or `r<1..=NUM_REGS>` -> register index; any other identifier (or
/// non-identifier) -> `-1`, the reference's corrected failure sentinel.
fn parse_register(tok: &Token) -> i32 {
    let TokenKind::Id(s) = &tok.kind else {
        return -1;
    };
    if s == "sp" {
        return 0;
    }
    let bytes = s.as_bytes();
    if bytes.len() != 2 || bytes[0] != b'r' || !bytes[1].is_ascii_digit() {
        return -1;
    }
    let n = (bytes[1] - b'0') as i32;
    if n >= 1 && n <= crate::interpreter::NUM_REGS as i32 {
        n
    } else {
        -1
    }
}

fn describe_argtype(t: ArgType) -> &'static str {
    match t {
        ArgType::Reg => "a register",
        ArgType::Mem => "a label or memory address",
        ArgType::ImmI => "an immediate value (integer)",
        ArgType::ImmF => "an immediate value (float)",
    }
}

fn check_arg(tok: &Token, argtype: ArgType, mnemonic: &str) -> Result<(), AssembleError> {
    let ok = match argtype {
        ArgType::Reg => matches!(tok.kind, TokenKind::Id(_)) && parse_register(tok) >= 0,
        ArgType::Mem => matches!(tok.kind, TokenKind::Id(_) | TokenKind::IntLit(_)),
        ArgType::ImmI => matches!(tok.kind, TokenKind::IntLit(_)),
        ArgType::ImmF => matches!(tok.kind, TokenKind::FloatLit(_)),
    };
    if ok {
        Ok(())
    } else {
        Err(AssembleError::new(
            format!(
                "{} instruction argument must be {}",
                mnemonic,
                describe_argtype(argtype)
            ),
            tok.pos,
        ))
    }
}

fn emit_argument(tok: &Token, argtype: ArgType, labels: &Labels) -> Result<Word, AssembleError> {
    match argtype {
        ArgType::Reg => {
            let r = parse_register(tok);
            if r < 0 {
                return Err(AssembleError::new("Invalid register", tok.pos));
            }
            Ok(Word::from_i32(r))
        }
        ArgType::Mem => match &tok.kind {
            TokenKind::Id(name) => Ok(Word::from_i32(labels.lookup(name, tok.pos)?)),
            TokenKind::IntLit(v) => Ok(Word::from_i32(*v)),
            _ => unreachable!("check_arg already rejected this token"),
        },
        ArgType::ImmI => match tok.kind {
            TokenKind::IntLit(v) => Ok(Word::from_i32(v)),
            _ => unreachable!("check_arg already rejected this token"),
        },
        ArgType::ImmF => match tok.kind {
            // The reference returns the immediate's raw `int` union field
            // here instead of the float bit pattern -- a labeled source
            // bug (`return t.i; // haha`). This emits the actual float
            // bits, which is what `fset` and the disassembler expect.
            TokenKind::FloatLit(v) => Ok(Word::from_f32(v)),
            _ => unreachable!("check_arg already rejected this token"),
        },
    }
}

/// Parse and (on pass 2) emit one statement. Returns `Ok(false)` at EOF.
fn statement(
    lex: &mut Lexer,
    labels: &mut Labels,
    pass: u8,
    mempos: &mut i32,
    out: &mut Option<&mut Vec<Word>>,
) -> Result<bool, AssembleError> {
    let toks = peek_tokens(lex, 5)?;

    if toks[0].is_eof() {
        return Ok(false);
    }

    if toks[0].is_eol() {
        swallow(lex, 1)?;
        return Ok(true);
    }

    if let TokenKind::Id(name) = &toks[0].kind {
        if matches!(toks[1].kind, TokenKind::Colon) {
            if pass == 1 {
                labels.add(name.clone(), *mempos, toks[0].pos)?;
            }
            swallow(lex, 2)?;
            return Ok(true);
        }
    }

    let TokenKind::Id(mnemonic) = &toks[0].kind else {
        return Err(AssembleError::new("Invalid source line", toks[0].pos));
    };

    let info = opcode::by_mnemonic(mnemonic)
        .ok_or_else(|| AssembleError::new("Invalid instruction", toks[0].pos))?;

    match info.nargs {
        0 => {
            if !toks[1].is_eol() {
                return Err(AssembleError::new(
                    format!(
                        "{} instruction takes no arguments (newline must follow)",
                        info.mnemonic
                    ),
                    toks[1].pos,
                ));
            }
            if pass == 2 {
                out.as_mut().unwrap().push(Word::from_i32(info.opcode as i32));
            }
            *mempos += 1;
            swallow(lex, 2)?;
        }
        1 => {
            check_arg(&toks[1], info.argtypes[0], info.mnemonic)?;
            if !toks[2].is_eol() {
                return Err(AssembleError::new(
                    format!(
                        "{} instruction takes one argument (newline must follow)",
                        info.mnemonic
                    ),
                    toks[2].pos,
                ));
            }
            if pass == 2 {
                let arg = emit_argument(&toks[1], info.argtypes[0], labels)?;
                let o = out.as_mut().unwrap();
                o.push(Word::from_i32(info.opcode as i32));
                o.push(arg);
            }
            *mempos += 2;
            swallow(lex, 3)?;
        }
        2 => {
            check_arg(&toks[1], info.argtypes[0], info.mnemonic)?;
            if !matches!(toks[2].kind, TokenKind::Comma) {
                return Err(AssembleError::new(
                    "instruction arguments must be separated by a comma",
                    toks[2].pos,
                ));
            }
            check_arg(&toks[3], info.argtypes[1], info.mnemonic)?;
            if !toks[4].is_eol() {
                return Err(AssembleError::new(
                    format!(
                        "{} instruction takes two arguments (newline must follow)",
                        info.mnemonic
                    ),
                    toks[4].pos,
                ));
            }
            if pass == 2 {
                let arg0 = emit_argument(&toks[1], info.argtypes[0], labels)?;
                let arg1 = emit_argument(&toks[3], info.argtypes[1], labels)?;
                let o = out.as_mut().unwrap();
                o.push(Word::from_i32(info.opcode as i32));
                o.push(arg0);
                o.push(arg1);
            }
            *mempos += 3;
            swallow(lex, 5)?;
        }
        _ => unreachable!("no opcode takes more than two arguments"),
    }

    Ok(true)
}

/// Pass 1: advance `mempos` past every instruction, recording labels.
/// Returns the final `mempos` (`len_data + len_code`).
pub fn collect_labels(lex: &mut Lexer, labels: &mut Labels, len_data: i32) -> Result<i32, AssembleError> {
    let mut mempos = len_data;
    let mut out = None;
    while statement(lex, labels, 1, &mut mempos, &mut out)? {}
    Ok(mempos)
}

/// Pass 2: re-walk the same statements, emitting opcode and argument words.
pub fn emit(lex: &mut Lexer, labels: &mut Labels, len_data: i32) -> Result<Vec<Word>, AssembleError> {
    let mut mempos = len_data;
    let mut code = Vec::new();
    let mut out = Some(&mut code);
    while statement(lex, labels, 2, &mut mempos, &mut out)? {}
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_label_reference_resolves() {
        let src = "j end\nend: stop\n";
        let mut lex = Lexer::new(src);
        let mut labels = Labels::new();
        collect_labels(&mut lex.clone(), &mut labels, 0).unwrap();
        let code = emit(&mut lex, &mut labels, 0).unwrap();
        assert_eq!(code[0].as_i32(), opcode::OP_J as i32);
        assert_eq!(code[1].as_i32(), 2);
        assert_eq!(code[2].as_i32(), opcode::OP_STOP as i32);
    }

    #[test]
    fn two_argument_instruction_emits_opcode_and_both_operands() {
        let src = "add r1, r2\n";
        let mut lex = Lexer::new(src);
        let mut labels = Labels::new();
        collect_labels(&mut lex.clone(), &mut labels, 0).unwrap();
        let code = emit(&mut lex, &mut labels, 0).unwrap();
        assert_eq!(code, vec![
            Word::from_i32(opcode::OP_ADD as i32),
            Word::from_i32(1),
            Word::from_i32(2),
        ]);
    }

    #[test]
    fn float_immediate_emits_float_bit_pattern() {
        let src = "fset r1, 2.5\n";
        let mut lex = Lexer::new(src);
        let mut labels = Labels::new();
        collect_labels(&mut lex.clone(), &mut labels, 0).unwrap();
        let code = emit(&mut lex, &mut labels, 0).unwrap();
        assert_eq!(code[2].as_f32(), 2.5);
    }

    #[test]
    fn unknown_mnemonic_is_an_error() {
        let mut lex = Lexer::new("bogus r1\n");
        let mut labels = Labels::new();
        assert!(collect_labels(&mut lex, &mut labels, 0).is_err());
    }

    #[test]
    fn missing_comma_between_operands_is_an_error() {
        let mut lex = Lexer::new("add r1 r2\n");
        let mut labels = Labels::new();
        assert!(collect_labels(&mut lex, &mut labels, 0).is_err());
    }

    #[rstest::rstest]
    #[case("stop\n", opcode::OP_STOP, vec![])]
    #[case("push r1\n", opcode::OP_PUSH, vec![1])]
    #[case("pop sp\n", opcode::OP_POP, vec![0])]
    #[case("add r1, r2\n", opcode::OP_ADD, vec![1, 2])]
    #[case("sub r2, r1\n", opcode::OP_SUB, vec![2, 1])]
    #[case("mul r1, r1\n", opcode::OP_MUL, vec![1, 1])]
    #[case("set r3, 9\n", opcode::OP_SET, vec![3, 9])]
    #[case("ldd r1, r2\n", opcode::OP_LDD, vec![1, 2])]
    #[case("std r1, r2\n", opcode::OP_STD, vec![1, 2])]
    fn per_mnemonic_code_generator_emits_opcode_then_operands(
        #[case] src: &str,
        #[case] opcode: u8,
        #[case] operands: Vec<i32>,
    ) {
        let mut lex = Lexer::new(src);
        let mut labels = Labels::new();
        collect_labels(&mut lex.clone(), &mut labels, 0).unwrap();
        let code = emit(&mut lex, &mut labels, 0).unwrap();

        let mut expected = vec![Word::from_i32(opcode as i32)];
        expected.extend(operands.into_iter().map(Word::from_i32));
        assert_eq!(code, expected);
    }
}
