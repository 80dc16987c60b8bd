use std::io::{self, Write};

use crate::bytecode::Op;
use crate::frontend::scanner::Spanned;

pub struct SymbolDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints the source symbol instead of the op name
}

impl Default for SymbolDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl SymbolDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump(&self, symbols: &[Spanned], out: &mut impl Write) -> io::Result<()> {
        for s in symbols {
            self.write_one(s, out)?;
        }
        Ok(())
    }

    fn write_one(&self, s: &Spanned, out: &mut impl Write) -> io::Result<()> {
        let line = s.span.line;
        let col = s.span.col;

        let kind = self.kind(s.op);
        let colr = if self.color { self.color(s.op) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        if self.show_debug_repr {
            writeln!(
                out,
                "[{:02}:{:02}] {}{:<8} {:?}{}",
                line, col, colr, kind, s.op, reset
            )
        } else {
            writeln!(
                out,
                "[{:02}:{:02}] {}{:<8} '{}'{}",
                line,
                col,
                colr,
                kind,
                s.op.symbol(),
                reset
            )
        }
    }

    fn kind(&self, op: Op) -> &'static str {
        match op {
            Op::Inc | Op::Dec => "CELL",
            Op::Right | Op::Left => "MOVE",
            Op::Read | Op::Write => "IO",
            Op::LoopStart | Op::LoopEnd => "BRACKET",
        }
    }

    fn color(&self, op: Op) -> &'static str {
        match op {
            Op::Inc | Op::Dec => Self::CYN,
            Op::Right | Op::Left => Self::YEL,
            Op::Read | Op::Write => Self::GRN,
            Op::LoopStart | Op::LoopEnd => Self::MAG,
        }
    }
}
