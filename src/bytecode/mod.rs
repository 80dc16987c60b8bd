pub mod compile;
pub mod disasm;
pub mod ir;
pub mod jump_check;
pub mod op;
pub mod syntax_error;

pub use ir::{Instruction, Program};
pub use op::Op;
