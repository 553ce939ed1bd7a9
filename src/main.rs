use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use evm::assembler;
use evm::image::Image;
use evm::interpreter::{self, Regs};
use evm::{disassembler, logging, stepper};

/// A small register-based bytecode VM: interpreter, assembler,
/// disassembler and interactive stepper.
#[derive(Parser)]
#[command(name = "evm", version, about)]
struct Cli {
    /// Assemble FILE (a source program) and write the image to stdout
    #[arg(short = 'a', long = "assemble", conflicts_with_all = ["disassemble", "interactive"])]
    assemble: bool,

    /// Disassemble FILE (a memory image) to stdout
    #[arg(short = 'd', long = "disassemble", conflicts_with_all = ["assemble", "interactive"])]
    disassemble: bool,

    /// Load FILE (a memory image) and single-step it interactively
    #[arg(short = 'i', long = "interactive", conflicts_with_all = ["assemble", "disassemble"])]
    interactive: bool,

    /// Source file (assemble mode) or memory image (all other modes)
    file: PathBuf,
}

enum Mode {
    Run,
    Assemble,
    Disassemble,
    Interactive,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.assemble {
            Mode::Assemble
        } else if self.disassemble {
            Mode::Disassemble
        } else if self.interactive {
            Mode::Interactive
        } else {
            Mode::Run
        }
    }
}

fn report_fault_registers(regs: &Regs) {
    eprintln!("\tip  {}", regs.ip);
    eprintln!("\tsp  {}", regs.sp());
    for (i, r) in regs.general_registers().iter().enumerate() {
        eprintln!(
            "\tr{}  {} ({:x}) ({:.6})",
            i + 1,
            r.as_i32(),
            r.as_u32(),
            r.as_f32()
        );
    }
}

fn run_mode(file: &PathBuf) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("couldn't open {}", file.display()))?;
    let mut image = Image::from_bytes(&bytes);
    let status = interpreter::run(&mut image, None, None, false);

    if let Some(fault) = status.error {
        logging::error(fault.to_string());
        report_fault_registers(&fault.regs);
        std::process::exit(1);
    }

    Ok(())
}

fn assemble_mode(file: &PathBuf) -> Result<()> {
    let source =
        fs::read_to_string(file).with_context(|| format!("couldn't open {}", file.display()))?;
    match assembler::assemble(&source) {
        Ok(image) => {
            io::stdout().write_all(&image.to_bytes())?;
            Ok(())
        }
        Err(e) => {
            logging::error(e.to_string());
            eprintln!("{}", e.render_context(&source));
            std::process::exit(1);
        }
    }
}

fn disassemble_mode(file: &PathBuf) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("couldn't open {}", file.display()))?;
    let image = Image::from_bytes(&bytes);
    match disassembler::disassemble(&image, None) {
        Ok(text) => {
            print!("{}", text);
            Ok(())
        }
        Err(e) => {
            logging::error(e.to_string());
            std::process::exit(1);
        }
    }
}

fn interactive_mode(file: &PathBuf) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("couldn't open {}", file.display()))?;
    let mut image = Image::from_bytes(&bytes);
    let status = stepper::run(&mut image)?;

    if let Some(fault) = status.error {
        logging::error(fault.to_string());
        report_fault_registers(&fault.regs);
        std::process::exit(1);
    }

    Ok(())
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.mode() {
        Mode::Run => run_mode(&cli.file),
        Mode::Assemble => assemble_mode(&cli.file),
        Mode::Disassemble => disassemble_mode(&cli.file),
        Mode::Interactive => interactive_mode(&cli.file),
    }
}
