//! Tokenizer for the test grammars.

use logos::Logos;
use lrkit::Token;

/// The attribute value carried by tokens and synthesized by actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Num(i64),
    Name(String),
}

impl Value {
    pub fn num(&self) -> i64 {
        match self {
            Self::Num(n) => *n,
            Self::Name(name) => panic!("expected a number, found name {:?}", name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Num(n) => panic!("expected a name, found number {}", n),
        }
    }
}

#[derive(Debug, Clone, Logos, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Lexeme<'source> {
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Num(i64),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word(&'source str),

    #[regex(r"[()+*/=;-]")]
    Punct(&'source str),
}

/// Maps lexemes onto the terminals of a grammar.
///
/// Numbers become `number` tokens, words become `name` tokens unless they are
/// one of `keywords`. Punctuation and keywords are bare tokens named after
/// their text.
#[derive(Debug, Clone)]
pub struct Lexer {
    pub number: &'static str,
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

impl Lexer {
    pub fn tokenize(&self, source: &str) -> anyhow::Result<Vec<Token<Value>>> {
        let mut tokens = vec![];
        let mut lexemes = Lexeme::lexer(source);
        while let Some(lexeme) = lexemes.next() {
            let lexeme = lexeme.map_err(|_| {
                anyhow::anyhow!("lexer error at {:?}: {:?}", lexemes.span(), lexemes.slice())
            })?;
            tokens.push(match lexeme {
                Lexeme::Num(n) => Token::new(self.number, Value::Num(n)),
                Lexeme::Word(word) => match self.keywords.iter().find(|k| **k == word) {
                    Some(keyword) => Token::bare(*keyword),
                    None => Token::new(self.name, Value::Name(word.to_owned())),
                },
                Lexeme::Punct(punct) => Token::bare(punct.to_owned()),
            });
        }
        tokens.push(Token::eof());
        Ok(tokens)
    }

    /// Tokenize `source`, keeping numbers as plain integers.
    pub fn tokenize_numbers(&self, source: &str) -> anyhow::Result<Vec<Token<i64>>> {
        let tokens = self
            .tokenize(source)?
            .into_iter()
            .map(|token| Token {
                terminal: token.terminal,
                value: token.value.map(|value| value.num()),
            })
            .collect();
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEXER: Lexer = Lexer {
        number: "id",
        name: "var",
        keywords: &["let"],
    };

    #[test]
    fn splits_words_numbers_and_punctuation() {
        let tokens = LEXER.tokenize("X= let (12)").unwrap();
        let terminals: Vec<_> = tokens.iter().map(|t| t.terminal.as_str()).collect();
        assert_eq!(terminals, ["var", "=", "let", "(", "id", ")", "$eof"]);
        assert_eq!(tokens[0].value, Some(Value::Name("X".into())));
        assert_eq!(tokens[4].value, Some(Value::Num(12)));
    }

    #[test]
    fn rejects_unknown_characters() {
        assert!(LEXER.tokenize("1 # 2").is_err());
    }

    #[test]
    fn rejects_overflowing_numbers() {
        assert!(LEXER.tokenize("99999999999999999999").is_err());
    }
}
