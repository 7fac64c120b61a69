//! # Lexer for the Stack Machine Assembly Language

use logos::Logos;

/// Tokens of one source line
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")] // Skip comments
pub enum Token {
    /// `#pragma` directive
    #[token("#pragma")]
    Pragma,

    /// Label definition (`name:`)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*:", |lex| {
        let slice = lex.slice();
        slice[..slice.len() - 1].to_string()
    })]
    LabelDef(String),

    /// Identifier (mnemonics, branch targets)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// Decimal literal, optionally signed
    #[regex(r"[+-]?[0-9]+", |lex| lex.slice().to_string())]
    Number(String),

    /// Hexadecimal literal, optionally signed
    #[regex(r"[+-]?0[xX][0-9a-fA-F]+", |lex| lex.slice().to_string())]
    Hex(String),

    /// Operator mnemonic (`<`, `&&`, `||`, `==`, `!`, `|`, `&`, `^`, `~`)
    #[regex(r"[<>=!&|^~]+", |lex| lex.slice().to_string())]
    Symbol(String),
}

impl Token {
    /// Source text of a literal token
    pub fn literal(&self) -> Option<&str> {
        match self {
            Token::Number(text) | Token::Hex(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Token::lexer(source).map(|t| t.unwrap()).collect()
    }

    #[test]
    fn test_lexer_pragma() {
        assert_eq!(
            tokens("#pragma version 5"),
            vec![
                Token::Pragma,
                Token::Identifier("version".to_string()),
                Token::Number("5".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_numbers() {
        assert_eq!(
            tokens("42 -10 +3 0x1A"),
            vec![
                Token::Number("42".to_string()),
                Token::Number("-10".to_string()),
                Token::Number("+3".to_string()),
                Token::Hex("0x1A".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_signed_hex() {
        assert_eq!(
            tokens("-0x10 +0xff"),
            vec![
                Token::Hex("-0x10".to_string()),
                Token::Hex("+0xff".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_symbols() {
        assert_eq!(
            tokens("|| && ! ~ ^ == <"),
            ["||", "&&", "!", "~", "^", "==", "<"]
                .iter()
                .map(|s| Token::Symbol(s.to_string()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_lexer_labels() {
        assert_eq!(
            tokens("else_0: bz end_1"),
            vec![
                Token::LabelDef("else_0".to_string()),
                Token::Identifier("bz".to_string()),
                Token::Identifier("end_1".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_comments() {
        assert_eq!(
            tokens("cover 2 // sink the sign"),
            vec![
                Token::Identifier("cover".to_string()),
                Token::Number("2".to_string()),
            ]
        );
        assert!(tokens("// only a comment").is_empty());
    }

    #[test]
    fn test_lexer_rejects_stray_characters() {
        let mut lex = Token::lexer("pushint $5");
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("pushint".to_string()))));
        assert_eq!(lex.next(), Some(Err(())));
    }
}
