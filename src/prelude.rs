use crate::diagnostics::CompileError;
use crate::lexer::{self, token::Token};
use crate::span::{STDLIB_FILE, USER_FILE};

/// Standard library text, analyzed ahead of every user unit. It ends with the
/// `STANDARDLIB_MI_FINISH_CODE;` sentinel, which leaves stdlib mode.
pub const STDLIB_SOURCE: &str = include_str!("../stdlib/std.mi");

/// Lex the stdlib (if enabled) followed by `user_source` into one token stream.
/// User tokens' `actual_line` continues from the last stdlib line.
pub fn token_stream(user_source: &str, with_stdlib: bool) -> Result<Vec<Token>, CompileError> {
    if !with_stdlib {
        return lexer::lex_unit(user_source, USER_FILE, 0);
    }
    let mut tokens = lexer::lex_unit(STDLIB_SOURCE, STDLIB_FILE, 0)?;
    tokens.extend(lexer::lex_unit(user_source, USER_FILE, lexer::line_count(STDLIB_SOURCE))?);
    Ok(tokens)
}
