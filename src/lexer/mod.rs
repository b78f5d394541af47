pub mod token;

use logos::Logos;

use crate::diagnostics::CompileError;
use crate::span::Span;
use token::{Token, TokenKind};

/// Lex one source unit. `line_offset` is the number of lines of text preceding this unit
/// in the analyzed stream and feeds `Token::actual_line`.
pub fn lex_unit(source: &str, file_id: u32, line_offset: usize) -> Result<Vec<Token>, CompileError> {
    let line_starts = line_starts(source);
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::with_file(range.start, range.end, file_id);
        match result {
            Ok(kind) => {
                let (line, column) = line_col(&line_starts, range.start);
                tokens.push(Token {
                    kind,
                    lexeme: lexer.slice().to_string(),
                    line,
                    column,
                    actual_line: line + line_offset,
                    span,
                });
            }
            Err(()) if lexer.slice().starts_with("/*") => {
                return Err(CompileError::syntax("unterminated block comment", span));
            }
            Err(()) => {
                return Err(CompileError::syntax(
                    format!("unexpected character '{}'", &source[range.start..range.end]),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}

/// Lex user text on its own.
pub fn lex(source: &str) -> Result<Vec<Token>, CompileError> {
    lex_unit(source, crate::span::USER_FILE, 0)
}

/// Number of lines a source unit occupies.
pub fn line_count(source: &str) -> usize {
    source.lines().count().max(1)
}

/// 1-based line and column of a byte offset.
pub fn position(source: &str, offset: usize) -> (usize, usize) {
    line_col(&line_starts(source), offset)
}

fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn line_col(line_starts: &[usize], offset: usize) -> (usize, usize) {
    let line = match line_starts.binary_search(&offset) {
        Ok(i) => i,
        Err(i) => i - 1,
    };
    (line + 1, offset - line_starts[line] + 1)
}
