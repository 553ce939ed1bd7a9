//! Character-level tokenizer.
//!
//! Deliberately not line-based: the grammar lets a float literal and an
//! integer literal overlap on a common prefix (`10` vs `10.5`), which a
//! per-line regex split can't disambiguate the way `strtof`/`strtol`'s
//! "longest match wins" rule does. This walks the source byte-by-byte the
//! way the reference's `tok_next` does.

use super::token::{Token, TokenKind};

#[derive(Clone)]
pub struct Lexer<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Lexer<'a> {
        Lexer {
            buf: src.as_bytes(),
            pos: 0,
        }
    }

    pub fn source(&self) -> &'a [u8] {
        self.buf
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn byte(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.byte(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }
    }

    fn skip_comment(&mut self) {
        if self.byte() == Some(b'#') {
            while !matches!(self.byte(), None | Some(b'\n')) {
                self.pos += 1;
            }
        }
    }

    /// Longest-match numeric-literal prefix starting at `start`, following
    /// `strtol`'s auto-base rule (`0x`/`0X` hex, leading `0` octal,
    /// otherwise decimal) and `strtof`'s float grammar (optional sign,
    /// digits, optional fraction, optional exponent). Returns whichever of
    /// the int or float lexeme is strictly longer; ties resolve to the
    /// integer lexeme, matching the reference's `ncharsf > ncharsi` test.
    fn try_parse_number(&self, start: usize) -> Option<(usize, TokenKind)> {
        let int_match = Self::match_intlit(self.buf, start);
        let float_match = Self::match_floatlit(self.buf, start);

        match (int_match, float_match) {
            (Some((ilen, ival)), Some((flen, fval))) => {
                if flen > ilen {
                    Some((flen, TokenKind::FloatLit(fval)))
                } else {
                    Some((ilen, TokenKind::IntLit(ival)))
                }
            }
            (Some((ilen, ival)), None) => Some((ilen, TokenKind::IntLit(ival))),
            (None, Some((flen, fval))) => Some((flen, TokenKind::FloatLit(fval))),
            (None, None) => None,
        }
    }

    fn match_intlit(buf: &[u8], start: usize) -> Option<(usize, i32)> {
        let mut i = start;
        let neg = match buf.get(i) {
            Some(b'-') => {
                i += 1;
                true
            }
            Some(b'+') => {
                i += 1;
                false
            }
            _ => false,
        };

        // strtol's auto-base rule: a leading '0' always commits to octal,
        // even if what follows isn't a valid octal digit -- "08" stops
        // after consuming just the "0" (value 0), it does not fall back to
        // parsing "08" as decimal 8.
        let (radix, prefix_len) = if buf.get(i) == Some(&b'0')
            && matches!(buf.get(i + 1), Some(b'x') | Some(b'X'))
        {
            (16, 2)
        } else if buf.get(i) == Some(&b'0') {
            (8, 0)
        } else {
            (10, 0)
        };
        i += prefix_len;

        let value_start = i;
        while buf.get(i).is_some_and(|b| (*b as char).is_digit(radix)) {
            i += 1;
        }

        if i == value_start {
            // Either no digits at all ("abc"), or a bare hex/octal prefix
            // with nothing following ("0x"); either way, no literal here.
            return None;
        }

        let digits = std::str::from_utf8(&buf[value_start..i]).ok()?;
        let mut value = if digits.is_empty() {
            0
        } else {
            i64::from_str_radix(digits, radix).ok()?
        };
        if neg {
            value = -value;
        }
        Some((i - start, value as i32))
    }

    fn match_floatlit(buf: &[u8], start: usize) -> Option<(usize, f32)> {
        let mut i = start;
        if matches!(buf.get(i), Some(b'-') | Some(b'+')) {
            i += 1;
        }

        let mut saw_digits = false;
        while buf.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
            saw_digits = true;
        }

        if buf.get(i) == Some(&b'.') {
            i += 1;
            while buf.get(i).is_some_and(u8::is_ascii_digit) {
                i += 1;
                saw_digits = true;
            }
        }

        // strtof accepts a bare digit run with no dot or exponent too (it's
        // just a float with an integral value) -- no extra requirement
        // here. The int/float tie-break in `try_parse_number` is what keeps
        // a plain "10" reading as an integer; this match only wins ties
        // when the integer lexeme is strictly shorter, e.g. "09" where
        // strtol's octal parse stops at the "0" but strtof reads "09"
        // whole.
        if !saw_digits {
            return None;
        }

        let mantissa_end = i;
        let mut exponent_end = i;
        if matches!(buf.get(i), Some(b'e') | Some(b'E')) {
            let mut j = i + 1;
            if matches!(buf.get(j), Some(b'-') | Some(b'+')) {
                j += 1;
            }
            let exp_digits_start = j;
            while buf.get(j).is_some_and(u8::is_ascii_digit) {
                j += 1;
            }
            if j > exp_digits_start {
                exponent_end = j;
            }
        }

        let end = exponent_end;
        let text = std::str::from_utf8(&buf[start..end]).ok()?;
        let value: f32 = text.parse().ok()?;
        Some((end - start, value))
    }

    fn try_parse_string(&self, start: usize) -> Option<(usize, Vec<u8>)> {
        let quote = *self.buf.get(start)?;
        if quote != b'\'' && quote != b'"' {
            return None;
        }
        let mut i = start + 1;
        while let Some(b) = self.buf.get(i) {
            if *b == quote || *b == b'\n' || *b == b'\r' {
                break;
            }
            i += 1;
        }
        if self.buf.get(i) == Some(&quote) {
            Some((i + 1 - start, self.buf[start + 1..i].to_vec()))
        } else {
            None
        }
    }

    fn try_parse_identifier(&self, start: usize) -> Option<(usize, String)> {
        let is_alpha = |b: u8| b.is_ascii_alphabetic();
        let is_alnum = |b: u8| b.is_ascii_alphanumeric();

        if !self.buf.get(start).is_some_and(|b| is_alpha(*b)) {
            return None;
        }
        let mut i = start + 1;
        while self.buf.get(i).is_some_and(|b| is_alnum(*b)) {
            i += 1;
        }
        let text = std::str::from_utf8(&self.buf[start..i]).ok()?.to_string();
        Some((i - start, text))
    }

    /// Produce the next token, or an error at the current position if the
    /// input can't be tokenized at all.
    pub fn next(&mut self) -> Result<Token, usize> {
        self.skip_whitespace();
        self.skip_comment();

        let start = self.pos;

        match self.byte() {
            None => Ok(Token {
                kind: TokenKind::Eof,
                pos: start,
            }),
            Some(b':') => {
                self.pos += 1;
                Ok(Token {
                    kind: TokenKind::Colon,
                    pos: start,
                })
            }
            Some(b',') => {
                self.pos += 1;
                Ok(Token {
                    kind: TokenKind::Comma,
                    pos: start,
                })
            }
            Some(b'\n') | Some(b'\r') => {
                self.pos += 1;
                Ok(Token {
                    kind: TokenKind::Eol,
                    pos: start,
                })
            }
            _ => {
                if let Some((len, kind)) = self.try_parse_number(start) {
                    self.pos = start + len;
                    return Ok(Token { kind, pos: start });
                }
                if let Some((len, bytes)) = self.try_parse_string(start) {
                    self.pos = start + len;
                    return Ok(Token {
                        kind: TokenKind::StringLit(bytes),
                        pos: start,
                    });
                }
                if let Some((len, text)) = self.try_parse_identifier(start) {
                    self.pos = start + len;
                    return Ok(Token {
                        kind: TokenKind::Id(text),
                        pos: start,
                    });
                }
                Err(start)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lex = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let t = lex.next().unwrap();
            let eof = t.is_eof();
            out.push(t.kind);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn integer_wins_the_tie() {
        assert_eq!(kinds("10\n"), vec![TokenKind::IntLit(10), TokenKind::Eol, TokenKind::Eof]);
    }

    #[test]
    fn float_with_a_dot_is_a_float() {
        assert_eq!(
            kinds("10.5\n"),
            vec![TokenKind::FloatLit(10.5), TokenKind::Eol, TokenKind::Eof]
        );
    }

    #[test]
    fn hex_and_octal_and_decimal() {
        assert_eq!(kinds("0x1F\n")[0], TokenKind::IntLit(31));
        assert_eq!(kinds("010\n")[0], TokenKind::IntLit(8));
        assert_eq!(kinds("10\n")[0], TokenKind::IntLit(10));
    }

    #[test]
    fn octal_prefix_stops_at_first_non_octal_digit() {
        // strtol's auto-base octal parse of "08"/"09" consumes only the
        // leading "0" (value 0, 1 byte); strtof reads the whole "08"/"09"
        // as a float, so the longer float lexeme wins the tie.
        assert_eq!(kinds("08\n")[0], TokenKind::FloatLit(8.0));
        assert_eq!(kinds("09\n")[0], TokenKind::FloatLit(9.0));
    }

    #[test]
    fn negative_integer() {
        assert_eq!(kinds("-5\n")[0], TokenKind::IntLit(-5));
    }

    #[test]
    fn string_literal_either_quote() {
        assert_eq!(
            kinds("'hi'\n")[0],
            TokenKind::StringLit(b"hi".to_vec())
        );
        assert_eq!(
            kinds("\"hi\"\n")[0],
            TokenKind::StringLit(b"hi".to_vec())
        );
    }

    #[test]
    fn comment_is_skipped_to_end_of_line() {
        assert_eq!(kinds("r1 # comment\n"), vec![
            TokenKind::Id("r1".to_string()),
            TokenKind::Eol,
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn colon_and_comma_and_identifier() {
        assert_eq!(
            kinds("loop: add r1, r2\n"),
            vec![
                TokenKind::Id("loop".to_string()),
                TokenKind::Colon,
                TokenKind::Id("add".to_string()),
                TokenKind::Id("r1".to_string()),
                TokenKind::Comma,
                TokenKind::Id("r2".to_string()),
                TokenKind::Eol,
                TokenKind::Eof,
            ]
        );
    }
}
