use serde::{Deserialize, Serialize};

// =============================================================================
// OP - Instruction kinds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    // cell arithmetic, wraps modulo 256
    Inc,
    Dec,

    // data pointer movement
    Right,
    Left,

    // I/O
    Read,
    Write,

    // ==========================================================================
    // Control flow - jump targets resolved at compile time
    // ==========================================================================
    /// Jump to the matching `LoopEnd` if the current cell is zero.
    LoopStart,

    /// Jump back to the matching `LoopStart` if the current cell is non-zero.
    LoopEnd,
}

impl Op {
    /// Map a source character to its op. Anything else is inert filler.
    pub fn from_symbol(ch: char) -> Option<Op> {
        Some(match ch {
            '+' => Op::Inc,
            '-' => Op::Dec,
            '>' => Op::Right,
            '<' => Op::Left,
            ',' => Op::Read,
            '.' => Op::Write,
            '[' => Op::LoopStart,
            ']' => Op::LoopEnd,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Op::Inc => '+',
            Op::Dec => '-',
            Op::Right => '>',
            Op::Left => '<',
            Op::Read => ',',
            Op::Write => '.',
            Op::LoopStart => '[',
            Op::LoopEnd => ']',
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Inc => "INC",
            Op::Dec => "DEC",
            Op::Right => "RIGHT",
            Op::Left => "LEFT",
            Op::Read => "READ",
            Op::Write => "WRITE",
            Op::LoopStart => "LOOP_START",
            Op::LoopEnd => "LOOP_END",
        }
    }

    /// Jump ops carry an instruction index in `arg`; every other op carries
    /// a repeat count.
    pub fn is_jump(self) -> bool {
        matches!(self, Op::LoopStart | Op::LoopEnd)
    }
}
