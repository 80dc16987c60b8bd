pub mod scanner;
pub mod symbol_dumper;

pub use scanner::{Scanner, Span, Spanned};
