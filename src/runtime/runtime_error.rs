use crate::bytecode::Op;
use crate::bytecode::jump_check::JumpCheckError;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(
        "runtime error: data pointer left the tape at instruction {ip}: \
         {op:?} by {by} from cell {pointer} (tape has {tape_size} cells)"
    )]
    TapeBounds {
        ip: usize,
        op: Op,
        by: usize,
        pointer: usize,
        tape_size: usize,
    },

    #[error("runtime error: i/o failure at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("runtime error: execution step limit exceeded ({limit})")]
    StepLimit { limit: u64 },

    #[error("runtime error: refusing to run invalid program: {0}")]
    InvalidProgram(#[from] JumpCheckError),
}

impl RuntimeError {
    pub fn io(ip: usize, source: std::io::Error) -> Self {
        RuntimeError::Io { ip, source }
    }

    /// Index of the instruction that failed, if the error is tied to one.
    pub fn ip(&self) -> Option<usize> {
        match self {
            RuntimeError::TapeBounds { ip, .. } | RuntimeError::Io { ip, .. } => Some(*ip),
            RuntimeError::StepLimit { .. } | RuntimeError::InvalidProgram(_) => None,
        }
    }
}
