use crate::frontend::Span;

/// Compilation failures. Both are fatal: no partial program is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// A `]` with no open `[` before it.
    #[error("syntax error: {span}: unmatched ']'\n  hint: remove it or add a '[' before it")]
    UnmatchedClose { span: Span },

    /// A `[` still open when the source ran out. When several are open, the
    /// innermost one is reported.
    #[error("syntax error: {span}: unmatched '['\n  hint: every '[' needs a closing ']'")]
    UnmatchedOpen { span: Span },
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::UnmatchedClose { span } | SyntaxError::UnmatchedOpen { span } => *span,
        }
    }
}
