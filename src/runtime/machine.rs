use crate::bytecode::jump_check::check_jumps;
use crate::bytecode::{Instruction, Op, Program};
use crate::runtime::runtime_error::RuntimeError;
use crate::runtime::tape::{BoundsPolicy, OutOfBounds, Tape};
use std::io::{self, Read, Write};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub tape_size: usize,
    pub bounds: BoundsPolicy,
    pub max_steps: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            tape_size: 30_000,
            bounds: BoundsPolicy::Abort,
            max_steps: None,
        }
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Instructions executed.
    pub steps: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Executes one compiled [`Program`] against its own tape.
///
/// The machine owns the program, the instruction pointer and the tape for
/// the whole run. The I/O handles are whatever the caller passes in; pass
/// `&mut` references to keep ownership on the caller's side.
pub struct Machine<R, W> {
    program: Program,
    ip: usize,
    tape: Tape,
    input: R,
    output: W,
    input_exhausted: bool,
    config: MachineConfig,
    summary: RunSummary,
}

impl<R: Read, W: Write> Machine<R, W> {
    pub fn new(program: Program, input: R, output: W) -> Self {
        Self::with_config(program, input, output, MachineConfig::default())
    }

    pub fn with_config(program: Program, input: R, output: W, config: MachineConfig) -> Self {
        Self {
            tape: Tape::new(config.tape_size, config.bounds),
            program,
            ip: 0,
            input,
            output,
            input_exhausted: false,
            config,
            summary: RunSummary::default(),
        }
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn data_pointer(&self) -> usize {
        self.tape.pointer()
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }

    pub fn is_done(&self) -> bool {
        self.ip >= self.program.len()
    }

    pub fn into_io(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Run until the instruction pointer falls off the end of the program.
    ///
    /// Output is flushed before returning, on success and on failure alike.
    pub fn run(&mut self) -> Result<RunSummary, RuntimeError> {
        check_jumps(&self.program)?;

        debug!(
            instructions = self.program.len(),
            tape_size = self.tape.len(),
            bounds = ?self.config.bounds,
            "run started"
        );

        let result = self.exec_loop();
        let flushed = self.flush();
        result?;
        flushed?;

        debug!(
            steps = self.summary.steps,
            bytes_read = self.summary.bytes_read,
            bytes_written = self.summary.bytes_written,
            "run finished"
        );

        Ok(self.summary)
    }

    // Execution

    fn exec_loop(&mut self) -> Result<(), RuntimeError> {
        while !self.is_done() {
            self.check_limits()?;
            self.step()?;
        }
        Ok(())
    }

    fn check_limits(&mut self) -> Result<(), RuntimeError> {
        if let Some(limit) = self.config.max_steps {
            if self.summary.steps >= limit {
                return Err(RuntimeError::StepLimit { limit });
            }
        }
        self.summary.steps += 1;
        Ok(())
    }

    /// Execute the instruction at `ip` and move `ip` to the next one.
    fn step(&mut self) -> Result<(), RuntimeError> {
        let Instruction { op, arg } = self.program[self.ip];

        match op {
            Op::Inc => self.tape.inc_by(arg),
            Op::Dec => self.tape.dec_by(arg),
            Op::Right => {
                let from = self.tape.pointer();
                self.tape
                    .move_right(arg)
                    .map_err(|OutOfBounds| self.bounds_error(op, arg, from))?;
            }
            Op::Left => {
                let from = self.tape.pointer();
                self.tape
                    .move_left(arg)
                    .map_err(|OutOfBounds| self.bounds_error(op, arg, from))?;
            }
            Op::Read => self.read(arg)?,
            Op::Write => self.write(arg)?,
            Op::LoopStart => {
                if self.tape.is_zero() {
                    // skip the body and the LoopEnd test alike
                    self.ip = arg + 1;
                    return Ok(());
                }
            }
            Op::LoopEnd => {
                if !self.tape.is_zero() {
                    self.ip = arg;
                    return Ok(());
                }
            }
        }

        self.ip += 1;
        Ok(())
    }

    fn bounds_error(&self, op: Op, by: usize, pointer: usize) -> RuntimeError {
        RuntimeError::TapeBounds {
            ip: self.ip,
            op,
            by,
            pointer,
            tape_size: self.tape.len(),
        }
    }

    /// Read `count` bytes into the current cell; the last byte read wins.
    /// At end of input the cell keeps whatever it held.
    fn read(&mut self, count: usize) -> Result<(), RuntimeError> {
        if self.input_exhausted {
            return Ok(());
        }

        // anything already written should be visible before we block
        self.flush()?;

        let mut byte = [0u8; 1];
        for _ in 0..count {
            match self.input.read_exact(&mut byte) {
                Ok(()) => {
                    self.tape.set(byte[0]);
                    self.summary.bytes_read += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    trace!(ip = self.ip, "input exhausted");
                    self.input_exhausted = true;
                    break;
                }
                Err(e) => return Err(RuntimeError::io(self.ip, e)),
            }
        }

        Ok(())
    }

    /// Emit the current cell `count` times.
    fn write(&mut self, count: usize) -> Result<(), RuntimeError> {
        let mut repeated = io::repeat(self.tape.get()).take(count as u64);
        let written = io::copy(&mut repeated, &mut self.output)
            .map_err(|e| RuntimeError::io(self.ip, e))?;
        self.summary.bytes_written += written;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RuntimeError> {
        self.output
            .flush()
            .map_err(|e| RuntimeError::io(self.ip, e))
    }
}

/// Run `program` to completion with the default configuration.
pub fn execute<R: Read, W: Write>(
    program: Program,
    input: R,
    output: W,
) -> Result<RunSummary, RuntimeError> {
    Machine::new(program, input, output).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile::compile;

    const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

    // ============================================================
    // Test Helpers
    // ============================================================

    fn machine<'a>(
        source: &str,
        input: &'a [u8],
        config: MachineConfig,
    ) -> Machine<&'a [u8], Vec<u8>> {
        let program = compile(source).expect("test source should compile");
        Machine::with_config(program, input, Vec::new(), config)
    }

    /// Run source with the given input and return everything it wrote
    fn run_source(source: &str, input: &[u8]) -> Result<Vec<u8>, RuntimeError> {
        let mut m = machine(source, input, MachineConfig::default());
        m.run()?;
        Ok(m.into_io().1)
    }

    /// Run source and return the machine for inspection
    fn run_machine<'a>(source: &str, input: &'a [u8]) -> Machine<&'a [u8], Vec<u8>> {
        let mut m = machine(source, input, MachineConfig::default());
        m.run().expect("execution should succeed");
        m
    }

    /// Output sink that rejects every write
    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Input source that fails with a non-EOF error
    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "no input"))
        }
    }

    // ============================================================
    // End-to-end programs
    // ============================================================

    #[test]
    fn test_hello_world() {
        let out = run_source(HELLO_WORLD, b"").unwrap();
        assert_eq!(out, b"Hello World!\n");
    }

    #[test]
    fn test_hello_world_with_filler_and_line_breaks() {
        let source = "
            ++++++++[>++++[>++>+++>+++>+<<
            <<-]>+>+>->>+[<]<-]>>.>---.+++
            ++++..+++.>>.<-.<.+++.------.-
            -------.>>+.>++.
        ";
        assert_eq!(run_source(source, b"").unwrap(), b"Hello World!\n");
    }

    #[test]
    fn test_read_then_write() {
        assert_eq!(run_source(",.", &[0x41]).unwrap(), vec![0x41]);
    }

    #[test]
    fn test_repeated_write_emits_same_byte() {
        assert_eq!(run_source("+++...", b"").unwrap(), vec![3, 3, 3]);
    }

    #[test]
    fn test_cat_until_zero_byte() {
        // copy input up to a zero byte; EOF alone would leave the cell
        // non-zero and loop forever
        let out = run_source(",[.,]", b"abc\0").unwrap();
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_empty_program_does_nothing() {
        let m = run_machine("", b"");
        assert_eq!(m.instruction_pointer(), 0);
        assert!(m.is_done());
    }

    // ============================================================
    // Arithmetic and pointer movement
    // ============================================================

    #[test]
    fn test_256_increments_wrap() {
        let source = "+".repeat(256);
        let m = run_machine(&source, b"");
        assert_eq!(m.tape().get(), 0);
    }

    #[test]
    fn test_decrement_from_zero_wraps() {
        let m = run_machine("-", b"");
        assert_eq!(m.tape().get(), 255);
    }

    #[test]
    fn test_pointer_moves() {
        let m = run_machine(">>>+<", b"");
        assert_eq!(m.data_pointer(), 2);
        assert_eq!(m.tape().cells()[3], 1);
    }

    // ============================================================
    // Loops
    // ============================================================

    #[test]
    fn test_loop_runs_exactly_v_times() {
        // cell 0 = 5; each iteration moves one unit to cell 1
        let m = run_machine("+++++[->+<]", b"");
        assert_eq!(m.tape().cells()[0], 0);
        assert_eq!(m.tape().cells()[1], 5);
    }

    #[test]
    fn test_loop_over_zero_cell_is_skipped() {
        let m = run_machine("[+++>]+", b"");
        assert_eq!(m.data_pointer(), 0);
        assert_eq!(m.tape().get(), 1);
    }

    #[test]
    fn test_skipped_loop_resumes_after_loop_end() {
        // [ ] at 0 and 1, Inc at 2
        let mut m = machine("[]+", b"", MachineConfig::default());
        let summary = m.run().unwrap();
        assert_eq!(summary.steps, 2);
        assert_eq!(m.tape().get(), 1);
    }

    #[test]
    fn test_empty_loop_on_zero_cell_terminates() {
        let m = run_machine("[]", b"");
        assert!(m.is_done());
    }

    #[test]
    fn test_empty_loop_on_nonzero_cell_never_exits() {
        let config = MachineConfig {
            max_steps: Some(1_000),
            ..MachineConfig::default()
        };
        let mut m = machine("+[]", b"", config);
        assert!(matches!(
            m.run(),
            Err(RuntimeError::StepLimit { limit: 1_000 })
        ));
    }

    #[test]
    fn test_nested_loops_multiply() {
        // 3 * 4 into cell 2
        let m = run_machine("+++[>++++[>+<-]<-]", b"");
        assert_eq!(m.tape().cells()[..3], [0, 0, 12]);
    }

    // ============================================================
    // Input
    // ============================================================

    #[test]
    fn test_multi_read_last_byte_wins() {
        let m = run_machine(",,,", b"xyz");
        assert_eq!(m.tape().get(), b'z');
        assert_eq!(m.data_pointer(), 0);
    }

    #[test]
    fn test_read_at_eof_keeps_cell() {
        let m = run_machine("+++++,", b"");
        assert_eq!(m.tape().get(), 5);
    }

    #[test]
    fn test_short_input_keeps_last_byte_read() {
        let mut m = machine(",,,", b"q", MachineConfig::default());
        let summary = m.run().unwrap();
        assert_eq!(m.tape().get(), b'q');
        assert_eq!(summary.bytes_read, 1);
    }

    #[test]
    fn test_reads_after_eof_are_noops() {
        let out = run_source(",>,<.>.", b"A").unwrap();
        assert_eq!(out, vec![b'A', 0]);
    }

    #[test]
    fn test_read_error_is_fatal() {
        let program = compile(",").unwrap();
        let err = Machine::new(program, FailingReader, Vec::new())
            .run()
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Io { ip: 0, .. }));
    }

    // ============================================================
    // Output
    // ============================================================

    #[test]
    fn test_write_failure_is_fatal() {
        let program = compile("+>+.").unwrap();
        let err = Machine::new(program, io::empty(), FailingWriter)
            .run()
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Io { ip: 3, .. }));
        assert!(err.to_string().contains("sink closed"));
    }

    #[test]
    fn test_summary_counts() {
        let mut m = machine(",+..", b"a", MachineConfig::default());
        let summary = m.run().unwrap();
        assert_eq!(
            summary,
            RunSummary {
                steps: 3,
                bytes_read: 1,
                bytes_written: 2,
            }
        );
        assert_eq!(m.into_io().1, b"bb");
    }

    #[test]
    fn test_caller_keeps_io_ownership() {
        let program = compile(",+.").unwrap();
        let mut input: &[u8] = b"0";
        let mut output = Vec::new();

        execute(program, &mut input, &mut output).unwrap();

        assert_eq!(output, b"1");
        assert!(input.is_empty());
    }

    // ============================================================
    // Tape bounds
    // ============================================================

    #[test]
    fn test_move_left_of_origin_aborts() {
        let err = run_source("+<", b"").unwrap_err();
        match err {
            RuntimeError::TapeBounds {
                ip,
                op,
                by,
                pointer,
                tape_size,
            } => {
                assert_eq!((ip, op, by, pointer), (1, Op::Left, 1, 0));
                assert_eq!(tape_size, 30_000);
            }
            other => panic!("expected tape bounds error, got {:?}", other),
        }
    }

    #[test]
    fn test_move_past_end_aborts() {
        let config = MachineConfig {
            tape_size: 4,
            ..MachineConfig::default()
        };
        let mut m = machine(">>>>", b"", config);
        assert!(matches!(
            m.run(),
            Err(RuntimeError::TapeBounds { op: Op::Right, by: 4, .. })
        ));
    }

    #[test]
    fn test_output_before_bounds_error_is_flushed() {
        let config = MachineConfig {
            tape_size: 2,
            ..MachineConfig::default()
        };
        let mut m = machine("+.>>", b"", config);
        assert!(m.run().is_err());
        assert_eq!(m.into_io().1, vec![1]);
    }

    #[test]
    fn test_wrap_policy_wraps_pointer() {
        let config = MachineConfig {
            tape_size: 4,
            bounds: BoundsPolicy::Wrap,
            ..MachineConfig::default()
        };
        let mut m = machine("<+", b"", config);
        m.run().unwrap();
        assert_eq!(m.data_pointer(), 3);
        assert_eq!(m.tape().cells(), &[0, 0, 0, 1]);
    }

    // ============================================================
    // Limits and validation
    // ============================================================

    #[test]
    fn test_step_limit_allows_exact_budget() {
        let config = MachineConfig {
            max_steps: Some(3),
            ..MachineConfig::default()
        };
        let mut m = machine("+>+", b"", config);
        assert_eq!(m.run().unwrap().steps, 3);
    }

    #[test]
    fn test_invalid_program_is_rejected_before_running() {
        let forged = Program::from_compiled(vec![
            Instruction::new(Op::Write, 1),
            Instruction::new(Op::LoopEnd, 0),
        ]);
        let mut m = Machine::new(forged, io::empty(), Vec::new());

        assert!(matches!(m.run(), Err(RuntimeError::InvalidProgram(_))));
        assert!(m.into_io().1.is_empty());
    }
}
