//! Command-line front end: assemble a source file, load it, run it.

use crate::asm::{AsmError, Assembler};
use crate::cpu::CPU;
use crate::error::VmError;
use crate::io::Io;
use crate::memory::Memory;
use crate::{opcode_of, operand_of, Word, OPERAND_MASK};
use clap::Parser;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MEM_SIZE: usize = 0x10000;

/// Little Man Computer virtual machine
#[derive(Debug, Parser)]
#[command(version, about, arg_required_else_help(true))]
pub struct Cli {
    /// LMC assembly file to run
    pub file: PathBuf,

    /// Memory size in words
    #[arg(short, long, default_value_t = DEFAULT_MEM_SIZE)]
    pub mem_size: usize,

    /// Do not print a prompt before reading a number
    #[arg(long)]
    pub no_prompt: bool,

    /// Reject the non-standard OTC instruction
    #[arg(long)]
    pub no_extensions: bool,

    /// Append a HLT to the end of the program
    #[arg(long)]
    pub append_hlt: bool,

    /// Print the encoded program instead of running it
    #[arg(short, long)]
    pub dump: bool,

    /// Log machine events to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Asm(#[from] AsmError),

    #[error("program of {len} words does not fit in {mem_size} words of memory")]
    TooLarge { len: usize, mem_size: usize },

    #[error(transparent)]
    Vm(#[from] VmError),
}

pub type CliResult<T> = Result<T, CliError>;

impl Cli {
    pub fn assembler(&self) -> Assembler {
        Assembler::new()
            .extensions(!self.no_extensions)
            .append_hlt(self.append_hlt)
    }

    pub fn load_program(&self) -> CliResult<Vec<Word>> {
        let src = fs::read_to_string(&self.file).map_err(|source| CliError::Read {
            path: self.file.clone(),
            source,
        })?;
        let program = self.assembler().assemble(&src)?;
        info!("assembled {} words from {}", program.len(), self.file.display());
        Ok(program)
    }

    pub fn build_memory(&self, program: &[Word]) -> CliResult<Memory> {
        if program.len() > self.mem_size {
            return Err(CliError::TooLarge {
                len: program.len(),
                mem_size: self.mem_size,
            });
        }
        if self.mem_size > OPERAND_MASK as usize + 1 {
            warn!(
                "memory of {} words is larger than the {} words an operand can address",
                self.mem_size,
                OPERAND_MASK as usize + 1
            );
        }
        Ok(Memory::copy_resized(program, self.mem_size))
    }
}

pub fn dump<W: Write>(program: &[Word], mut out: W) -> io::Result<()> {
    for (addr, &word) in program.iter().enumerate() {
        writeln!(
            out,
            "{:>5}  {:#010x}  {:>2} {}",
            addr,
            word as u32,
            opcode_of(word),
            operand_of(word)
        )?;
    }
    Ok(())
}

/// Loads the program named by `cli` and runs it against the given streams.
pub fn run_with<R: BufRead, W: Write>(cli: &Cli, input: R, mut output: W) -> CliResult<()> {
    let program = cli.load_program()?;
    if cli.dump {
        dump(&program, &mut output).map_err(VmError::from)?;
        return Ok(());
    }

    let memory = cli.build_memory(&program)?;
    let mut cpu = CPU::new(memory, Io::new(input, output, !cli.no_prompt))
        .with_extensions(!cli.no_extensions);
    cpu.run()?;
    Ok(())
}

pub fn run(cli: &Cli) -> CliResult<()> {
    run_with(cli, io::stdin().lock(), io::stdout().lock())
}
