use crate::template::script::ScriptError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Punct(&'static str),
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

// Longest first so `==` wins over `=`.
const PUNCTUATION: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "(", ")", "{", "}", "[", "]", ",", ".",
    ";", "?", ":", "=", "!", "<", ">", "+", "-", "*", "/",
];

pub fn tokenize(src: &str) -> Result<Vec<Spanned>, ScriptError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if src[pos..].starts_with("//") {
            pos = src[pos..].find('\n').map_or(bytes.len(), |i| pos + i);
            continue;
        }
        if src[pos..].starts_with("/*") {
            pos = src[pos + 2..]
                .find("*/")
                .map(|i| pos + 2 + i + 2)
                .ok_or_else(|| syntax("Unterminated comment", pos))?;
            continue;
        }

        let start = pos;
        let token = if c.is_ascii_digit() {
            pos = scan_number(bytes, pos);
            let text = &src[start..pos];
            let n = text
                .parse::<f64>()
                .map_err(|_| syntax(&format!("Invalid number '{text}'"), start))?;
            Token::Num(n)
        } else if c.is_ascii_alphabetic() || c == b'_' || c == b'$' {
            while pos < bytes.len()
                && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_' || bytes[pos] == b'$')
            {
                pos += 1;
            }
            Token::Ident(src[start..pos].to_string())
        } else if c == b'"' || c == b'\'' {
            let (text, end) = scan_string(src, pos)?;
            pos = end;
            Token::Str(text)
        } else if let Some(p) = PUNCTUATION.iter().find(|p| src[pos..].starts_with(**p)) {
            pos += p.len();
            Token::Punct(match *p {
                "===" => "==",
                "!==" => "!=",
                other => other,
            })
        } else {
            let ch = src[pos..].chars().next().unwrap_or('?');
            return Err(syntax(&format!("Unexpected character '{ch}'"), pos));
        };

        tokens.push(Spanned {
            token,
            offset: start,
        });
    }

    tokens.push(Spanned {
        token: Token::Eof,
        offset: src.len(),
    });
    Ok(tokens)
}

fn scan_number(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    // A fraction needs a digit after the dot; `skills.0.name` keeps its dots.
    if pos + 1 < bytes.len() && bytes[pos] == b'.' && bytes[pos + 1].is_ascii_digit() {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    pos
}

fn scan_string(src: &str, start: usize) -> Result<(String, usize), ScriptError> {
    let mut chars = src[start..].char_indices();
    let (_, quote) = chars.next().ok_or_else(|| syntax("Unexpected end", start))?;
    let mut out = String::new();

    while let Some((i, c)) = chars.next() {
        match c {
            c if c == quote => return Ok((out, start + i + c.len_utf8())),
            '\\' => {
                let (_, escaped) = chars
                    .next()
                    .ok_or_else(|| syntax("Unterminated string literal", start))?;
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            }
            '\n' => return Err(syntax("Unterminated string literal", start)),
            other => out.push(other),
        }
    }
    Err(syntax("Unterminated string literal", start))
}

fn syntax(message: &str, offset: usize) -> ScriptError {
    ScriptError::Syntax {
        message: message.to_string(),
        offset,
    }
}
