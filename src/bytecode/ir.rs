use crate::bytecode::Op;
use crate::bytecode::jump_check::{JumpCheckError, check_jumps};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Header written in front of every encoded program.
pub const ARTIFACT_MAGIC: &[u8; 4] = b"TVM1";

/// One compiled instruction.
///
/// For `LoopStart`/`LoopEnd`, `arg` is the index of the matching bracket.
/// For every other op it is the repeat count (always at least 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Op,
    pub arg: usize,
}

impl Instruction {
    pub fn new(op: Op, arg: usize) -> Self {
        Self { op, arg }
    }
}

/// A compiled program: a flat instruction stream with every loop resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    instructions: Vec<Instruction>,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact error: missing 'TVM1' header")]
    BadMagic,

    #[error("artifact error: cannot decode program: {0}")]
    Decode(#[from] postcard::Error),

    #[error("artifact error: {0}")]
    Invalid(#[from] JumpCheckError),
}

impl Program {
    /// Wrap an instruction stream produced by the compiler. The compiler
    /// guarantees bracket pairing, so no check runs here.
    pub(crate) fn from_compiled(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Build a program from arbitrary instructions, verifying every jump.
    pub fn from_instructions(instructions: Vec<Instruction>) -> Result<Self, JumpCheckError> {
        check_jumps(&instructions)?;
        Ok(Self { instructions })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn loop_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|ins| ins.op == Op::LoopStart)
            .count()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        let body = postcard::to_allocvec(self)?;
        let mut bytes = Vec::with_capacity(ARTIFACT_MAGIC.len() + body.len());
        bytes.extend_from_slice(ARTIFACT_MAGIC);
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Decode an artifact written by [`Program::to_bytes`]. The decoded
    /// program goes through the jump check before it is handed out.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let body = bytes
            .strip_prefix(ARTIFACT_MAGIC.as_slice())
            .ok_or(ArtifactError::BadMagic)?;
        let program: Program = postcard::from_bytes(body)?;
        check_jumps(&program.instructions)?;
        Ok(program)
    }
}

impl Deref for Program {
    type Target = [Instruction];

    fn deref(&self) -> &Self::Target {
        &self.instructions
    }
}
