use std::iter::Peekable;

use tracing::debug;

use crate::{
    bytecode::{Instruction, Op, Program, syntax_error::SyntaxError},
    frontend::{Scanner, Span, Spanned},
};

/// Single-pass compiler from source text to a [`Program`].
///
/// Runs of the same simple op collapse into one instruction carrying the run
/// length. Brackets are matched with an explicit stack: `[` is emitted with a
/// placeholder target and backfilled once its `]` shows up, so both ends of
/// every loop know each other's index before execution starts.
pub struct Compiler {
    /// Output instruction stream
    program: Vec<Instruction>,

    /// Open `[` brackets: (instruction index, source location)
    loop_stack: Vec<(usize, Span)>,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            program: Vec::new(),
            loop_stack: Vec::new(),
        }
    }

    pub fn compile(mut self, source: &str) -> Result<Program, SyntaxError> {
        let mut symbols = Scanner::new(source).peekable();

        while let Some(symbol) = symbols.next() {
            match symbol.op {
                Op::LoopStart => self.open_loop(symbol.span),
                Op::LoopEnd => self.close_loop(symbol.span)?,
                op => {
                    let run = Self::run_length(symbol, &mut symbols);
                    self.program.push(Instruction::new(op, run));
                }
            }
        }

        // innermost unclosed bracket is the one reported
        if let Some((_, span)) = self.loop_stack.pop() {
            return Err(SyntaxError::UnmatchedOpen { span });
        }

        let program = Program::from_compiled(self.program);
        debug!(
            source_chars = source.chars().count(),
            instructions = program.len(),
            loops = program.loop_count(),
            "compiled program"
        );

        Ok(program)
    }

    /// Count `first` plus every directly following copy of the same op.
    ///
    /// Only textually adjacent symbols form a run: `++ +` is two
    /// instructions, not one.
    fn run_length(first: Spanned, symbols: &mut Peekable<Scanner>) -> usize {
        let mut run = 1;
        let mut next_offset = first.offset + 1;

        loop {
            let expected = next_offset;
            match symbols.next_if(|s| s.op == first.op && s.offset == expected) {
                Some(_) => {
                    run += 1;
                    next_offset += 1;
                }
                None => return run,
            }
        }
    }

    fn open_loop(&mut self, span: Span) {
        // target is backfilled by the matching `]`
        self.loop_stack.push((self.program.len(), span));
        self.program.push(Instruction::new(Op::LoopStart, 0));
    }

    fn close_loop(&mut self, span: Span) -> Result<(), SyntaxError> {
        let (start, _) = self
            .loop_stack
            .pop()
            .ok_or(SyntaxError::UnmatchedClose { span })?;

        let end = self.program.len();
        self.program.push(Instruction::new(Op::LoopEnd, start));
        self.program[start].arg = end;

        Ok(())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile `source` with a fresh [`Compiler`].
pub fn compile(source: &str) -> Result<Program, SyntaxError> {
    Compiler::new().compile(source)
}
