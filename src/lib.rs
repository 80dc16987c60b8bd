//! # tapevm
//!
//! A small virtual machine for the eight-symbol tape language.
//!
//! Source text goes through two stages:
//!
//! - [`bytecode::compile`] scans the text once, folds runs of the same
//!   operator into a single counted instruction and resolves every loop
//!   bracket to the index of its partner.
//! - [`runtime::Machine`] walks the resulting [`bytecode::Program`] over a
//!   fixed-size byte tape, reading from and writing to caller-supplied
//!   byte streams.
//!
//! ```
//! let program = tapevm::bytecode::compile::compile(",+.").unwrap();
//! let mut output = Vec::new();
//! tapevm::runtime::execute(program, &b"A"[..], &mut output).unwrap();
//! assert_eq!(output, b"B");
//! ```

pub mod bytecode;
pub mod frontend;
pub mod runtime;
