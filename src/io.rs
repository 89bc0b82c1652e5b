use crate::error::{VmError, VmResult};
use crate::Word;
use std::io::{BufRead, Write};

pub const PROMPT: &str = ">? ";
pub const NOT_AN_INTEGER: &str = "Input must be an integer";
pub const TOO_BIG: &str = "Input too big or malformed";

/// Why a line of input was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejected {
    NotAnInteger,
    TooBig,
}

/// The machine's terminal: numeric input, numeric and character output.
///
/// Numbers normally get a line each. Once a character has been written the
/// channel is mid-line, and numbers join that line until a `'\n'` ends it,
/// so `OTC 'a'; OUT 1; OUT 2` prints `a12`.
pub struct Io<R, W> {
    input: R,
    output: W,
    line_mode: bool,
    prompt: bool,
}

impl<R: BufRead, W: Write> Io<R, W> {
    pub fn new(input: R, output: W, prompt: bool) -> Self {
        Io {
            input,
            output,
            line_mode: false,
            prompt,
        }
    }

    pub fn is_line_mode(&self) -> bool {
        self.line_mode
    }

    pub fn prompt_enabled(&self) -> bool {
        self.prompt
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn flush(&mut self) -> VmResult<()> {
        self.output.flush()?;
        Ok(())
    }

    pub fn write_char(&mut self, val: Word) -> VmResult<()> {
        let ch = char::from_u32(val as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
        write!(self.output, "{}", ch)?;
        self.line_mode = ch != '\n';
        Ok(())
    }

    pub fn write_num(&mut self, val: Word) -> VmResult<()> {
        if self.line_mode {
            write!(self.output, "{}", val)?;
        } else {
            writeln!(self.output, "{}", val)?;
        }
        Ok(())
    }

    /// Blocks until a line holding exactly one integer arrives. Bad lines
    /// are reported and skipped; running out of input is an error.
    pub fn read_num(&mut self) -> VmResult<Word> {
        loop {
            if self.prompt {
                write!(self.output, "{}", PROMPT)?;
            }
            self.output.flush()?;

            let line = self.next_filled_line()?;
            match parse_line(&line) {
                Ok(val) => return Ok(val),
                Err(Rejected::NotAnInteger) => writeln!(self.output, "{}", NOT_AN_INTEGER)?,
                Err(Rejected::TooBig) => writeln!(self.output, "{}", TOO_BIG)?,
            }
        }
    }

    fn next_filled_line(&mut self) -> VmResult<Vec<u8>> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.input.read_until(b'\n', &mut line)? == 0 {
                return Err(VmError::InputExhausted);
            }
            if !is_line_end(skip_blanks(&line)) {
                return Ok(line);
            }
        }
    }
}

fn skip_blanks(bytes: &[u8]) -> &[u8] {
    let n = bytes
        .iter()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .count();
    &bytes[n..]
}

// Input that ends without a newline still terminates the line.
fn is_line_end(bytes: &[u8]) -> bool {
    matches!(bytes, [] | [b'\n'] | [b'\r'] | [b'\r', b'\n'])
}

fn parse_line(line: &[u8]) -> Result<Word, Rejected> {
    let rest = skip_blanks(line);
    let sign = match rest.first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0,
    };
    let digits = rest[sign..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return Err(Rejected::NotAnInteger);
    }

    let (token, tail) = rest.split_at(sign + digits);
    if !is_line_end(skip_blanks(tail)) {
        return Err(Rejected::TooBig);
    }

    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse::<Word>().ok())
        .ok_or(Rejected::TooBig)
}
