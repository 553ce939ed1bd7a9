//! A small register-based bytecode VM toolchain, featuring:
//! - an interpreter (fetch-decode-execute loop, fault model, syscall hook)
//! - a two-pass assembler (tokenizer, data pass, label-collection and
//!   emission code passes)
//! - a disassembler
//! - an interactive single-stepper

pub mod assembler;
pub mod disassembler;
pub mod image;
pub mod interpreter;
pub mod logging;
pub mod stepper;
pub mod word;