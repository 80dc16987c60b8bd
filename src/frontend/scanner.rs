use crate::bytecode::Op;

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned {
    pub op: Op,
    pub span: Span,
    /// Character index into the source.
    pub offset: usize,
}

/// Walks source text and yields only the recognized operator symbols.
///
/// There is no comment syntax: every character that is not one of the eight
/// operators is skipped, but still advances the line/column counters so
/// spans point at the right place in the original text.
pub struct Scanner {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }

    /// Collect every remaining symbol.
    pub fn scan(mut self) -> Vec<Spanned> {
        self.by_ref().collect()
    }
}

impl Iterator for Scanner {
    type Item = Spanned;

    fn next(&mut self) -> Option<Spanned> {
        loop {
            let span = self.span();
            let offset = self.pos;
            let ch = self.advance()?;
            if let Some(op) = Op::from_symbol(ch) {
                return Some(Spanned { op, span, offset });
            }
        }
    }
}
