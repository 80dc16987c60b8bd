use crate::bytecode::{Instruction, Op};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JumpCheckError {
    #[error("jump-check error: {op:?} at {at} targets {target}, out of range for {len} instructions")]
    OutOfRange {
        at: usize,
        op: Op,
        target: usize,
        len: usize,
    },

    #[error("jump-check error: {op:?} at {at} has a repeat count of zero")]
    ZeroCount { at: usize, op: Op },

    #[error("jump-check error: LoopEnd at {at} has no open LoopStart")]
    UnopenedEnd { at: usize },

    #[error("jump-check error: LoopStart at {at} is never closed")]
    UnclosedStart { at: usize },

    #[error("jump-check error: brackets at {start} and {end} do not point at each other")]
    Mismatched { start: usize, end: usize },
}

/// Verify that every loop bracket is paired with its nesting partner and
/// that the pair cross-reference each other, and that every counted op
/// repeats at least once.
///
/// Compiler output always passes; this exists for programs that arrive
/// from elsewhere, such as a decoded artifact.
pub fn check_jumps(ins: &[Instruction]) -> Result<(), JumpCheckError> {
    let len = ins.len();
    let mut open: Vec<usize> = Vec::new();

    for (at, instruction) in ins.iter().enumerate() {
        let Instruction { op, arg } = *instruction;

        if !op.is_jump() {
            if arg == 0 {
                return Err(JumpCheckError::ZeroCount { at, op });
            }
            continue;
        }

        if arg >= len {
            return Err(JumpCheckError::OutOfRange {
                at,
                op,
                target: arg,
                len,
            });
        }

        match op {
            Op::LoopStart => open.push(at),
            Op::LoopEnd => {
                let start = open.pop().ok_or(JumpCheckError::UnopenedEnd { at })?;
                if arg != start || ins[start].arg != at {
                    return Err(JumpCheckError::Mismatched { start, end: at });
                }
            }
            _ => unreachable!("only brackets are jumps"),
        }
    }

    match open.pop() {
        Some(at) => Err(JumpCheckError::UnclosedStart { at }),
        None => Ok(()),
    }
}
