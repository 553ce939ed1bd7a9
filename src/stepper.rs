//! The interactive single-stepper: alternate-screen terminal mode plus a
//! render/read-input/step loop.

use crate::disassembler;
use crate::image::Image;
use crate::interpreter::{self, Regs};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, ExecutableCommand};
use std::io::{self, Write};

/// Scoped acquisition of the terminal's alternate screen: entered on
/// construction, released on drop regardless of which path out of
/// [`run`] triggered it (stop, fault, or I/O error).
struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    fn enter() -> io::Result<TerminalGuard> {
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(TerminalGuard { active: true })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = io::stdout().execute(LeaveAlternateScreen);
        }
    }
}

fn clear_screen() {
    print!("\x1b[2J\x1b[H");
    let _ = io::stdout().flush();
}

fn render_registers(regs: &Regs) -> String {
    let mut out = String::new();
    out.push_str("--- CPU STATE ------------------------------------\n");
    out.push_str(&format!("\tip  {:08x}\n", regs.ip));
    out.push_str(&format!("\tsp  {:08x}\n", regs.sp()));
    for (i, r) in regs.general_registers().iter().enumerate() {
        out.push_str(&format!(
            "\tr{}  {:08x} ({}) ({:.6})\n",
            i + 1,
            r.as_u32(),
            r.as_i32(),
            r.as_f32()
        ));
    }
    out
}

/// Drive `image` one instruction at a time, rendering disassembly and
/// register state before each step and waiting for a line of input (its
/// contents are ignored) to advance. Returns the final interpreter status.
///
/// A fault is rendered on the iteration that produced it, then the loop
/// stops without stepping again -- mirroring the reference's
/// `while (!stat.errmsg)` gate, which skips re-rendering once a fault has
/// already been reported.
pub fn run(image: &mut Image) -> io::Result<interpreter::Status> {
    let bounds = image
        .validate()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    let _guard = TerminalGuard::enter()?;

    let mut status = interpreter::Status {
        regs: Regs::new(bounds.start_code, bounds.end_data - 1),
        stopped: false,
        error: None,
    };
    let mut input = String::new();

    loop {
        if status.error.is_some() {
            break;
        }

        clear_screen();

        let disasm_failed = match disassembler::disassemble(image, Some(status.regs.ip)) {
            Ok(text) => {
                print!("{}", text);
                false
            }
            Err(e) => {
                println!("{}", e);
                true
            }
        };
        print!("{}", render_registers(&status.regs));
        let _ = io::stdout().flush();

        if status.stopped || disasm_failed {
            break;
        }

        input.clear();
        io::stdin().read_line(&mut input)?;

        status = interpreter::run(image, None, Some(status.regs), true);
    }

    Ok(status)
}
