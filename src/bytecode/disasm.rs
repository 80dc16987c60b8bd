use crate::bytecode::{Instruction, Op, Program};
use std::fmt::Write;

/// Print disassembly of a compiled program
pub fn print_bc(program: &Program) {
    print!("{}", disassemble(program));
}

/// Render a program listing: header, then one line per instruction with the
/// loop body indented under its brackets.
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "════════════════════════════════════════");
    let _ = writeln!(out, " main");
    let _ = writeln!(
        out,
        " {} instructions, {} loops",
        program.len(),
        program.loop_count()
    );
    let _ = writeln!(out, "════════════════════════════════════════");
    disassemble_ops(program.instructions(), &mut out);

    out
}

/// Disassemble a slice of instructions into `out`
pub fn disassemble_ops(ops: &[Instruction], out: &mut String) {
    let mut depth: usize = 0;

    for (ip, ins) in ops.iter().enumerate() {
        if ins.op == Op::LoopEnd {
            depth = depth.saturating_sub(1);
        }

        let prefix = "  ".repeat(depth);
        let _ = writeln!(out, "{:04}  {}{}", ip, prefix, format_instruction(ins));

        if ins.op == Op::LoopStart {
            depth += 1;
        }
    }
}

fn format_instruction(ins: &Instruction) -> String {
    match ins.op {
        Op::LoopStart => format!("{:<11} ; if zero -> {:04}", ins.op.mnemonic(), ins.arg),
        Op::LoopEnd => format!("{:<11} ; if nonzero -> {:04}", ins.op.mnemonic(), ins.arg),
        op if ins.arg == 1 => op.mnemonic().to_string(),
        op => format!("{:<11} x{}", op.mnemonic(), ins.arg),
    }
}
