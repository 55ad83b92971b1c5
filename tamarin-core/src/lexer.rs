use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Illegal(Rc<str>),
    Ident(Rc<str>),
    Int(Rc<str>),
    String(Rc<str>),

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,

    Equal,
    NotEqual,

    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    Comma,
    SemiColon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,

    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TokenKind::*;
        let name = match self {
            Illegal(_) => "ILLEGAL",
            Ident(_) => "IDENT",
            Int(_) => "INT",
            String(_) => "STRING",
            Assign => "=",
            Plus => "+",
            Minus => "-",
            Bang => "!",
            Asterisk => "*",
            Slash => "/",
            Equal => "==",
            NotEqual => "!=",
            LessThan => "<",
            LessEqual => "<=",
            GreaterThan => ">",
            GreaterEqual => ">=",
            Comma => ",",
            SemiColon => ";",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Function => "FUNCTION",
            Let => "LET",
            True => "TRUE",
            False => "FALSE",
            If => "IF",
            Else => "ELSE",
            Return => "RETURN",
            Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// A lexical unit together with the byte range it was read from.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// The source text matched by this token. String literals are returned
    /// without their surrounding quotes.
    pub fn literal(&self) -> String {
        match &self.kind {
            TokenKind::Illegal(text)
            | TokenKind::Ident(text)
            | TokenKind::Int(text)
            | TokenKind::String(text) => text.to_string(),
            TokenKind::Function => "fn".to_owned(),
            TokenKind::Eof => String::new(),
            keyword_or_symbol => keyword_or_symbol.to_string().to_lowercase(),
        }
    }
}

fn keywords(ident: &str) -> Option<TokenKind> {
    match ident {
        "fn" => Some(TokenKind::Function),
        "let" => Some(TokenKind::Let),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "return" => Some(TokenKind::Return),
        _ => None,
    }
}

#[derive(Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        Self { input, iter }
    }

    fn is_letter(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    /// Reads the next token. Once the input is exhausted every call returns
    /// an `Eof` token positioned at the end of the input.
    pub fn next_token(&mut self) -> Token {
        while self.iter.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}

        let Some((idx, ch)) = self.iter.next() else {
            return Token {
                kind: TokenKind::Eof,
                start: self.input.len(),
                end: self.input.len(),
            };
        };

        let kind = match ch {
            '=' => self.either('=', TokenKind::Equal, TokenKind::Assign),
            '!' => self.either('=', TokenKind::NotEqual, TokenKind::Bang),
            '<' => self.either('=', TokenKind::LessEqual, TokenKind::LessThan),
            '>' => self.either('=', TokenKind::GreaterEqual, TokenKind::GreaterThan),
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            ',' => TokenKind::Comma,
            ';' => TokenKind::SemiColon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '"' => self.read_string(idx),
            c if Tokenizer::is_letter(c) => self.read_identifier(idx),
            c if c.is_ascii_digit() => self.read_number(idx),
            c => TokenKind::Illegal(c.to_string().into()),
        };

        Token {
            kind,
            start: idx,
            end: self.next_idx(),
        }
    }

    fn either(&mut self, second: char, matched: TokenKind, single: TokenKind) -> TokenKind {
        if self.iter.next_if(|(_, ch)| *ch == second).is_some() {
            matched
        } else {
            single
        }
    }

    fn read_identifier(&mut self, start: usize) -> TokenKind {
        while self
            .iter
            .next_if(|(_, ch)| Self::is_letter(*ch) || ch.is_ascii_digit())
            .is_some()
        {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        keywords(ident).unwrap_or_else(|| TokenKind::Ident(ident.into()))
    }

    fn read_number(&mut self, start: usize) -> TokenKind {
        while self.iter.next_if(|(_, ch)| ch.is_ascii_digit()).is_some() {}

        let end = self.next_idx();
        TokenKind::Int(self.input[start..end].into())
    }

    fn read_string(&mut self, start: usize) -> TokenKind {
        loop {
            match self.iter.next() {
                Some((end, '"')) => return TokenKind::String(self.input[start + 1..end].into()),
                None => return TokenKind::Illegal(self.input[start..].into()),
                _ => {}
            }
        }
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        match token.kind {
            TokenKind::Eof => None,
            _ => Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TokenKind, Tokenizer};
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Tokenizer::new(input).map(|token| token.kind).collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Ident(name.into())
    }

    fn int(value: &str) -> TokenKind {
        TokenKind::Int(value.into())
    }

    #[test]
    fn test_single_characters() {
        let input = "=+(){},;[]";

        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Assign,
                TokenKind::Plus,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::SemiColon,
                TokenKind::LBracket,
                TokenKind::RBracket,
            ]
        );
    }

    #[test]
    fn test_let_statement_ends_with_eof() {
        let mut tokenizer = Tokenizer::new("let five = 5;");
        let mut output = Vec::new();
        loop {
            let token = tokenizer.next_token();
            let done = token.kind == TokenKind::Eof;
            output.push(token.kind);
            if done {
                break;
            }
        }

        assert_eq!(
            output,
            vec![
                TokenKind::Let,
                ident("five"),
                TokenKind::Assign,
                int("5"),
                TokenKind::SemiColon,
                TokenKind::Eof,
            ]
        );
        // exhausted tokenizers keep answering Eof
        assert_eq!(tokenizer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_program() {
        let input = "let five = 5;
    let ten = 10;
    let add = fn(x, y) {
    x + y;
    };
    let result = add(five, ten);
    ";
        let expected_output = vec![
            TokenKind::Let,
            ident("five"),
            TokenKind::Assign,
            int("5"),
            TokenKind::SemiColon,
            TokenKind::Let,
            ident("ten"),
            TokenKind::Assign,
            int("10"),
            TokenKind::SemiColon,
            TokenKind::Let,
            ident("add"),
            TokenKind::Assign,
            TokenKind::Function,
            TokenKind::LParen,
            ident("x"),
            TokenKind::Comma,
            ident("y"),
            TokenKind::RParen,
            TokenKind::LBrace,
            ident("x"),
            TokenKind::Plus,
            ident("y"),
            TokenKind::SemiColon,
            TokenKind::RBrace,
            TokenKind::SemiColon,
            TokenKind::Let,
            ident("result"),
            TokenKind::Assign,
            ident("add"),
            TokenKind::LParen,
            ident("five"),
            TokenKind::Comma,
            ident("ten"),
            TokenKind::RParen,
            TokenKind::SemiColon,
        ];

        assert_eq!(kinds(input), expected_output)
    }

    #[test]
    fn test_operators() {
        let input = "
    !-/*5;
    5 < 10 > 5;
    ";

        let expected_output = vec![
            TokenKind::Bang,
            TokenKind::Minus,
            TokenKind::Slash,
            TokenKind::Asterisk,
            int("5"),
            TokenKind::SemiColon,
            int("5"),
            TokenKind::LessThan,
            int("10"),
            TokenKind::GreaterThan,
            int("5"),
            TokenKind::SemiColon,
        ];

        assert_eq!(kinds(input), expected_output)
    }

    #[test]
    fn test_keywords() {
        let input = "if (5 < 10) {
    return true;
    } else {
    return false;
    }";

        let expected_output = vec![
            TokenKind::If,
            TokenKind::LParen,
            int("5"),
            TokenKind::LessThan,
            int("10"),
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Return,
            TokenKind::True,
            TokenKind::SemiColon,
            TokenKind::RBrace,
            TokenKind::Else,
            TokenKind::LBrace,
            TokenKind::Return,
            TokenKind::False,
            TokenKind::SemiColon,
            TokenKind::RBrace,
        ];

        assert_eq!(kinds(input), expected_output)
    }

    #[test]
    fn test_two_character_operators() {
        let input = "10 == 10; 10 != 9; a <= b >= c;";

        let expected_output = vec![
            int("10"),
            TokenKind::Equal,
            int("10"),
            TokenKind::SemiColon,
            int("10"),
            TokenKind::NotEqual,
            int("9"),
            TokenKind::SemiColon,
            ident("a"),
            TokenKind::LessEqual,
            ident("b"),
            TokenKind::GreaterEqual,
            ident("c"),
            TokenKind::SemiColon,
        ];

        assert_eq!(kinds(input), expected_output)
    }

    #[test]
    fn test_strings_and_identifiers() {
        let input = r#""foobar" "foo bar" _private x1y2 "" 123abc"#;

        assert_eq!(
            kinds(input),
            vec![
                TokenKind::String("foobar".into()),
                TokenKind::String("foo bar".into()),
                ident("_private"),
                ident("x1y2"),
                TokenKind::String("".into()),
                int("123"),
                ident("abc"),
            ]
        );
    }

    #[test]
    fn test_illegal_characters() {
        assert_eq!(
            kinds("5 @ \"open"),
            vec![
                int("5"),
                TokenKind::Illegal("@".into()),
                TokenKind::Illegal("\"open".into()),
            ]
        );
    }

    #[test]
    fn test_unterminated_string_keeps_its_source_text() {
        let tokens: Vec<_> = Tokenizer::new("let s = \"abc def").collect();
        let last = &tokens[tokens.len() - 1];

        assert_eq!(last.kind, TokenKind::Illegal("\"abc def".into()));
        assert_eq!(last.literal(), "\"abc def");
        assert_eq!((last.start, last.end), (8, 16));
    }

    #[test]
    fn test_token_spans_and_literals() {
        let tokens: Vec<_> = Tokenizer::new("let x >= \"hi\"").collect();

        assert_eq!((tokens[0].start, tokens[0].end), (0, 3));
        assert_eq!(tokens[0].literal(), "let");
        assert_eq!(tokens[1].literal(), "x");
        assert_eq!((tokens[2].start, tokens[2].end), (6, 8));
        assert_eq!(tokens[2].literal(), ">=");
        assert_eq!(tokens[3].literal(), "hi");
    }
}
