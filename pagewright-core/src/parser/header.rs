//! PDF Header Parser

use super::lexer::{LexError, TokenKind};
use super::{ParseError, ParseResult, Parser};

/// Reads the `%PDF-M.N` line and returns `"M.N"`.
pub(crate) fn parse_header(parser: &mut Parser<'_>) -> ParseResult<String> {
    parser.seek(0)?;
    let token = parser.next_token("%PDF- header")?;
    match token.kind {
        TokenKind::Version(version) => Ok(version),
        _ => Err(ParseError::Lex(LexError::InvalidVersion {
            position: token.offset,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let mut parser = Parser::new(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n1 0 obj");
        assert_eq!(parse_header(&mut parser).unwrap(), "1.7");
        assert_eq!(parser.next_token("object").unwrap().kind, TokenKind::Integer(1));
    }

    #[test]
    fn test_pdf2_header() {
        let mut parser = Parser::new(b"%PDF-2.0\r\n");
        assert_eq!(parse_header(&mut parser).unwrap(), "2.0");
    }

    #[test]
    fn test_missing_header() {
        let mut parser = Parser::new(b"1 0 obj null endobj");
        assert!(matches!(
            parse_header(&mut parser),
            Err(ParseError::Lex(LexError::InvalidVersion { position: 0 }))
        ));
    }
}
