use crate::ExprError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Num(value) => format!("number {value}"),
            Self::Ident(name) => format!("identifier {name:?}"),
            Self::Plus => "'+'".into(),
            Self::Minus => "'-'".into(),
            Self::Star => "'*'".into(),
            Self::Slash => "'/'".into(),
            Self::Caret => "'^'".into(),
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::Comma => "','".into(),
        }
    }
}

/// Token plus its byte span in the source.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match ch {
            '0'..='9' | '.' => {
                let mut end = start;
                let mut seen_dot = false;
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_ascii_digit() || (c == '.' && !seen_dot) {
                        seen_dot |= c == '.';
                        end = idx + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &source[start..end];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExprError::UnexpectedChar { pos: start, found: ch })?;
                tokens.push(Token {
                    kind: TokenKind::Num(value),
                    start,
                    end,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() => {
                let mut end = start;
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_ascii_alphabetic() {
                        end = idx + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(source[start..end].to_ascii_lowercase()),
                    start,
                    end,
                });
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            found => return Err(ExprError::UnexpectedChar { pos: start, found }),
        };

        chars.next();
        tokens.push(Token {
            kind,
            start,
            end: start + ch.len_utf8(),
        });
    }

    Ok(tokens)
}
