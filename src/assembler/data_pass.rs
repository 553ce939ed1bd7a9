//! Parses the data section: a sequence of (optionally labeled) data
//! statements, terminated by the sentinel `start` line.

use super::error::AssembleError;
use super::labels::Labels;
use super::lexer::Lexer;
use super::token::{Token, TokenKind};
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

/// Packs `bytes` four-to-a-word, little-endian, zero-padding a trailing
/// partial word -- the same layout `memcpy(mem+pos, s, len)` produces on a
/// little-endian host.
fn push_string(data: &mut Vec<Word>, bytes: &[u8]) {
    for chunk in bytes.chunks(4) {
        let mut buf = [0u8; 4];
        buf[..chunk.len()].copy_from_slice(chunk);
        data.push(Word::from_le_bytes(buf));
    }
}

/// Consume data-section lines until (and including) the `start` sentinel,
/// appending words to `data` and labels to `labels`. Leaves `lex` positioned
/// just after the `start` line's newline.
pub fn run(lex: &mut Lexer, labels: &mut Labels, data: &mut Vec<Word>) -> Result<(), AssembleError> {
    loop {
        let toks = peek_tokens(lex, 5)?;
        let pos0 = toks[0].pos;

        if toks[0].is_eof() {
            return Err(AssembleError::new(
                "Unexpected end of file (no 'start' statement)",
                pos0,
            ));
        }

        if toks[0].is_eol() {
            swallow(lex, 1)?;
            continue;
        }

        if let TokenKind::Id(name) = &toks[0].kind {
            if matches!(toks[1].kind, TokenKind::Colon) {
                if toks[2].is_id("zeros") {
                    if let TokenKind::IntLit(n) = toks[3].kind {
                        if toks[4].is_eol() {
                            labels.add(name.clone(), data.len() as i32, pos0)?;
                            for _ in 0..n {
                                data.push(Word::ZERO);
                            }
                            swallow(lex, 5)?;
                            continue;
                        }
                    }
                } else if let TokenKind::IntLit(v) = toks[2].kind {
                    if toks[3].is_eol() {
                        labels.add(name.clone(), data.len() as i32, pos0)?;
                        data.push(Word::from_i32(v));
                        swallow(lex, 4)?;
                        continue;
                    }
                } else if let TokenKind::FloatLit(v) = toks[2].kind {
                    if toks[3].is_eol() {
                        labels.add(name.clone(), data.len() as i32, pos0)?;
                        data.push(Word::from_f32(v));
                        swallow(lex, 4)?;
                        continue;
                    }
                } else if let TokenKind::StringLit(bytes) = &toks[2].kind {
                    if toks[3].is_eol() {
                        labels.add(name.clone(), data.len() as i32, pos0)?;
                        push_string(data, bytes);
                        swallow(lex, 4)?;
                        continue;
                    }
                }
            }
        }

        if toks[0].is_id("zeros") {
            if let TokenKind::IntLit(n) = toks[1].kind {
                if toks[2].is_eol() {
                    for _ in 0..n {
                        data.push(Word::ZERO);
                    }
                    swallow(lex, 3)?;
                    continue;
                }
            }
        }

        if let TokenKind::IntLit(v) = toks[0].kind {
            if toks[1].is_eol() {
                data.push(Word::from_i32(v));
                swallow(lex, 2)?;
                continue;
            }
        }

        if let TokenKind::FloatLit(v) = toks[0].kind {
            if toks[1].is_eol() {
                data.push(Word::from_f32(v));
                swallow(lex, 2)?;
                continue;
            }
        }

        if let TokenKind::StringLit(bytes) = &toks[0].kind {
            if toks[1].is_eol() {
                push_string(data, bytes);
                swallow(lex, 2)?;
                continue;
            }
        }

        if toks[0].is_id("start") && toks[1].is_eol() {
            swallow(lex, 2)?;
            return Ok(());
        }

        return Err(AssembleError::new("Invalid line in data section", pos0));
    }
}
