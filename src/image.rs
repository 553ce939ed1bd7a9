//! Memory-image header, layout and validation.
//!
//! An image is a flat sequence of [`Word`]s: a four-word header followed by
//! the data segment and then the code segment. This module is the single
//! place that derives segment bounds from the header, so the interpreter,
//! disassembler and interactive stepper all agree on where data ends and
//! code begins.

use crate::word::Word;
use std::fmt;

/// `('E'<<16)|('V'<<8)|'M'`
pub const MAGIC: u32 = (('E' as u32) << 16) | (('V' as u32) << 8) | ('M' as u32);
pub const VERSION: i32 = 1;

/// Number of header words: `magic`, `version`, `len_data`, `len_code`.
pub const HEADER_WORDS: usize = 4;

/// An image failed one of the validity checks in §3 of the specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageError {
    /// Buffer is smaller than the header itself.
    TooSmall,
    /// `header + len_data + len_code` would run past the end of the buffer.
    Overflow,
    /// `len_data` or `len_code` is negative.
    NegativeLength,
    /// `magic` does not match [`MAGIC`].
    BadMagic,
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ImageError::TooSmall => "invalid memory image: buffer too small",
            ImageError::Overflow => {
                "invalid memory image: header indicates memory overflows provided buffer"
            }
            ImageError::NegativeLength => {
                "invalid memory image: data or code segment length is negative"
            }
            ImageError::BadMagic => "invalid memory image: wrong magic number",
        };
        write!(f, "{}", msg)
    }
}

impl std::error::Error for ImageError {}

/// Segment bounds derived from a validated header, expressed as word
/// indices *relative to the start of the memory region* (i.e. excluding
/// the header, matching the reference's `evm_word *mem = memory->mem`).
///
/// Signed so that an out-of-range `ip`/`sp` (including a negative one,
/// which a stack underflow can produce) can be range-checked directly
/// without first having to prove it's non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub start_data: i32,
    pub end_data: i32,
    pub start_code: i32,
    pub end_code: i32,
}

impl Bounds {
    pub fn contains_data(&self, addr: i32) -> bool {
        addr >= self.start_data && addr < self.end_data
    }

    pub fn contains_code(&self, addr: i32) -> bool {
        addr >= self.start_code && addr < self.end_code
    }

    pub fn len_data(&self) -> i32 {
        self.end_data - self.start_data
    }

    pub fn len_code(&self) -> i32 {
        self.end_code - self.start_code
    }
}

/// An owned memory image: header words followed by the data and code
/// segments, all as [`Word`]s.
#[derive(Debug, Clone)]
pub struct Image {
    words: Vec<Word>,
}

impl Image {
    /// Build a fresh image from a header plus data/code words.
    pub fn new(len_data: i32, len_code: i32, data: Vec<Word>, code: Vec<Word>) -> Image {
        let mut words = Vec::with_capacity(HEADER_WORDS + data.len() + code.len());
        words.push(Word::from_u32(MAGIC));
        words.push(Word::from_i32(VERSION));
        words.push(Word::from_i32(len_data));
        words.push(Word::from_i32(len_code));
        words.extend(data);
        words.extend(code);
        Image { words }
    }

    /// Wrap an already-assembled buffer of words (header included).
    pub fn from_words(words: Vec<Word>) -> Image {
        Image { words }
    }

    /// Parse a little-endian byte buffer into whole words. A trailing
    /// partial word (fewer than 4 bytes) is dropped -- callers that care
    /// about strict file sizes should check `bytes.len() % 4` themselves.
    pub fn from_bytes(bytes: &[u8]) -> Image {
        let words = bytes
            .chunks_exact(4)
            .map(|c| Word::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Image { words }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.words.len() * 4);
        for w in &self.words {
            out.extend_from_slice(&w.to_le_bytes());
        }
        out
    }

    pub fn magic(&self) -> u32 {
        self.words.first().map(|w| w.as_u32()).unwrap_or(0)
    }

    pub fn version(&self) -> i32 {
        self.words.get(1).map(|w| w.as_i32()).unwrap_or(0)
    }

    pub fn len_data(&self) -> i32 {
        self.words.get(2).map(|w| w.as_i32()).unwrap_or(0)
    }

    pub fn len_code(&self) -> i32 {
        self.words.get(3).map(|w| w.as_i32()).unwrap_or(0)
    }

    /// Whole backing buffer, header included -- used for on-disk serialization.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// The memory region addressable by the interpreter: data segment
    /// followed by code segment, header excluded.
    pub fn mem(&self) -> &[Word] {
        if self.words.len() <= HEADER_WORDS {
            &[]
        } else {
            &self.words[HEADER_WORDS..]
        }
    }

    pub fn mem_mut(&mut self) -> &mut [Word] {
        if self.words.len() <= HEADER_WORDS {
            &mut []
        } else {
            &mut self.words[HEADER_WORDS..]
        }
    }

    /// Validate the header and derive segment bounds. This is the single
    /// source of truth for where data ends and code begins; the
    /// interpreter, disassembler and stepper all call this instead of
    /// re-deriving the same arithmetic.
    pub fn validate(&self) -> Result<Bounds, ImageError> {
        if self.words.len() < HEADER_WORDS {
            return Err(ImageError::TooSmall);
        }

        let len_data = self.len_data();
        let len_code = self.len_code();

        if HEADER_WORDS as i64 + len_data as i64 + len_code as i64 > self.words.len() as i64 {
            return Err(ImageError::Overflow);
        }

        if len_data < 0 || len_code < 0 {
            return Err(ImageError::NegativeLength);
        }

        if self.magic() != MAGIC {
            return Err(ImageError::BadMagic);
        }

        let start_data = 0;
        let end_data = len_data;
        let start_code = end_data;
        let end_code = start_code + len_code;

        Ok(Bounds {
            start_data,
            end_data,
            start_code,
            end_code,
        })
    }
}
