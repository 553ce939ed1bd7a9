//! Two-pass assembler: tokenize source text, parse the data section, then
//! parse the code section twice -- once to collect labels, once to emit
//! against the now-complete label table.

pub mod code_pass;
pub mod data_pass;
pub mod error;
pub mod labels;
pub mod lexer;
pub mod token;

use crate::image::Image;
use error::AssembleError;
use labels::Labels;
use lexer::Lexer;

/// Assemble `source` into a memory image. On failure, the returned error
/// carries the byte offset of the failing token; pair it with
/// [`AssembleError::render_context`] and the original source to print a
/// context window.
pub fn assemble(source: &str) -> Result<Image, AssembleError> {
    let mut lex = Lexer::new(source);
    let mut labels = Labels::new();
    let mut data = Vec::new();

    data_pass::run(&mut lex, &mut labels, &mut data)?;
    let len_data = data.len() as i32;
    log::debug!("data pass complete: {} words", len_data);

    let code_start = lex.clone();
    let len_total = code_pass::collect_labels(&mut lex, &mut labels, len_data)?;
    log::debug!("code pass 1 complete: {} words of code", len_total - len_data);

    let mut lex = code_start;
    let code = code_pass::emit(&mut lex, &mut labels, len_data)?;
    log::debug!("code pass 2 complete: emitted {} words", code.len());

    Ok(Image::new(len_data, code.len() as i32, data, code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smallest_valid_program() {
        let img = assemble("start\nstop\n").unwrap();
        assert_eq!(img.len_data(), 0);
        assert_eq!(img.len_code(), 1);
    }

    #[test]
    fn integer_arithmetic_program() {
        let img = assemble("start\nset r1, 7\nset r2, 5\nsub r1, r2\nput r1\nstop\n").unwrap();
        assert_eq!(img.len_code(), 11);
    }

    #[test]
    fn stack_round_trip_program() {
        let img = assemble(
            "zeros 4\nstart\nset r1, 42\npush r1\nset r1, 0\npop r1\nput r1\nstop\n",
        )
        .unwrap();
        assert_eq!(img.len_data(), 4);
    }

    #[test]
    fn forward_jump_resolves_through_full_pipeline() {
        let img = assemble("start\nj skip\nset r1, 1\nskip: stop\n").unwrap();
        // j(2) + set r1,1(3) = 5: "skip" must resolve to that address.
        assert_eq!(img.mem()[1].as_i32(), 5);
        assert_eq!(img.mem()[5].as_i32(), crate::interpreter::opcode::OP_STOP as i32);
    }

    #[test]
    fn unterminated_data_section_reports_context() {
        let err = assemble("7\n").unwrap_err();
        let rendered = err.render_context("7\n");
        assert!(rendered.contains("HERE>>>"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let src = "start\nset r1, 7\nstop\n";
        let a = assemble(src).unwrap();
        let b = assemble(src).unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    // A dataless program (`len_data == 0`) assembles fine, but the
    // interpreter's initial `sp = end_data - 1 == -1` falls outside the
    // (empty) data range, so `run` faults `BadSp` before the first
    // instruction executes -- see `interpreter::tests::tiny_image`. A
    // runnable program, even one that never touches the stack, needs at
    // least one reserved data word. These two mirror the distilled spec's
    // "smallest valid program" and "integer arithmetic" scenarios with that
    // one-word reservation added.
    #[test]
    fn smallest_runnable_program_stops() {
        let mut img = assemble("zeros 1\nstart\nstop\n").unwrap();
        let status = crate::interpreter::run(&mut img, None, None, false);
        assert!(status.stopped);
        assert!(status.error.is_none());
    }

    #[test]
    fn integer_arithmetic_program_runs_to_completion() {
        let mut img =
            assemble("zeros 1\nstart\nset r1, 7\nset r2, 5\nsub r1, r2\nput r1\nstop\n").unwrap();
        let status = crate::interpreter::run(&mut img, None, None, false);
        assert!(status.stopped);
        assert_eq!(status.regs.slot(1).as_i32(), 2);
    }
}
