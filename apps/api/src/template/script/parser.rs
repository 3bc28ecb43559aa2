use serde_json::Value;

use crate::template::path::number;
use crate::template::script::lexer::{tokenize, Spanned, Token};
use crate::template::script::{ScriptError, MAX_DEPTH};

const KEYWORDS: &[&str] = &[
    "let", "return", "throw", "delete", "if", "else", "true", "false", "null",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let { name: String, value: Expr },
    Assign { target: Place, value: Expr },
    Delete(Place),
    Return(Option<Expr>),
    Throw(Expr),
    If {
        cond: Expr,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Field(String),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Array(Vec<Expr>),
    Var(String),
    Member { object: Box<Expr>, key: Key },
    Call { name: String, args: Vec<Expr> },
    Not(Box<Expr>),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

/// A variable followed by property keys, e.g. `profile.skills[0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub root: String,
    pub keys: Vec<Key>,
}

impl Place {
    /// Flattens a member chain rooted at a variable. Returns `None` for
    /// anything else (calls, literals).
    pub fn from_expr(expr: &Expr) -> Option<Place> {
        match expr {
            Expr::Var(name) => Some(Place {
                root: name.clone(),
                keys: Vec::new(),
            }),
            Expr::Member { object, key } => {
                let mut place = Place::from_expr(object)?;
                place.keys.push(key.clone());
                Some(place)
            }
            _ => None,
        }
    }
}

pub fn parse(src: &str) -> Result<Vec<Stmt>, ScriptError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let mut program = Vec::new();
    while !parser.at_eof() {
        if parser.eat(";") {
            continue;
        }
        program.push(parser.statement()?);
    }
    Ok(program)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos].offset
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, punct: &str) -> bool {
        matches!(self.peek(), Token::Punct(p) if *p == punct)
    }

    fn check_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Token::Ident(w) if w == word)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if self.check(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), ScriptError> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> ScriptError {
        let message = match self.peek() {
            Token::Eof => "Unexpected end of script".to_string(),
            Token::Ident(name) => format!("Unexpected identifier '{name}'"),
            Token::Str(s) => format!("Unexpected string \"{s}\""),
            Token::Num(n) => format!("Unexpected number {n}"),
            Token::Punct(p) => format!("Unexpected token '{p}'"),
        };
        ScriptError::Syntax {
            message,
            offset: self.offset(),
        }
    }

    /// Runs `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ScriptError>,
    ) -> Result<T, ScriptError> {
        self.depth += 1;
        let result = if self.depth > MAX_DEPTH {
            Err(ScriptError::TooDeep(MAX_DEPTH))
        } else {
            f(self)
        };
        self.depth -= 1;
        result
    }

    fn identifier(&mut self) -> Result<String, ScriptError> {
        match self.peek() {
            Token::Ident(name) if !KEYWORDS.contains(&name.as_str()) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    // ── statements ──────────────────────────────────────────────────────────

    fn statement(&mut self) -> Result<Stmt, ScriptError> {
        let stmt = if self.check_keyword("let") {
            self.advance();
            let name = self.identifier()?;
            self.expect("=")?;
            Stmt::Let {
                name,
                value: self.expression()?,
            }
        } else if self.check_keyword("return") {
            self.advance();
            if self.check(";") || self.check("}") || self.at_eof() {
                Stmt::Return(None)
            } else {
                Stmt::Return(Some(self.expression()?))
            }
        } else if self.check_keyword("throw") {
            self.advance();
            Stmt::Throw(self.expression()?)
        } else if self.check_keyword("delete") {
            self.advance();
            let offset = self.offset();
            let expr = self.expression()?;
            match Place::from_expr(&expr) {
                Some(place) if !place.keys.is_empty() => Stmt::Delete(place),
                _ => {
                    return Err(ScriptError::Syntax {
                        message: "delete expects a property".to_string(),
                        offset,
                    })
                }
            }
        } else if self.check_keyword("if") {
            return self.if_statement();
        } else {
            let offset = self.offset();
            let expr = self.expression()?;
            if !self.eat("=") {
                return Err(self.unexpected());
            }
            let target = Place::from_expr(&expr).ok_or_else(|| ScriptError::Syntax {
                message: "Invalid left-hand side in assignment".to_string(),
                offset,
            })?;
            Stmt::Assign {
                target,
                value: self.expression()?,
            }
        };
        self.eat(";");
        Ok(stmt)
    }

    fn if_statement(&mut self) -> Result<Stmt, ScriptError> {
        self.advance();
        self.expect("(")?;
        let cond = self.expression()?;
        self.expect(")")?;
        let then = self.block()?;
        let otherwise = if self.check_keyword("else") {
            self.advance();
            if self.check_keyword("if") {
                vec![self.if_statement()?]
            } else {
                self.block()?
            }
        } else {
            Vec::new()
        };
        Ok(Stmt::If {
            cond,
            then,
            otherwise,
        })
    }

    /// `{ stmt* }` or a single statement.
    fn block(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        self.nested(Self::block_body)
    }

    fn block_body(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        if !self.eat("{") {
            return Ok(vec![self.statement()?]);
        }
        let mut stmts = Vec::new();
        while !self.eat("}") {
            if self.at_eof() {
                return Err(self.unexpected());
            }
            if self.eat(";") {
                continue;
            }
            stmts.push(self.statement()?);
        }
        Ok(stmts)
    }

    // ── expressions ─────────────────────────────────────────────────────────

    fn expression(&mut self) -> Result<Expr, ScriptError> {
        self.nested(Self::conditional)
    }

    fn conditional(&mut self) -> Result<Expr, ScriptError> {
        let cond = self.or()?;
        if !self.eat("?") {
            return Ok(cond);
        }
        let then = self.expression()?;
        self.expect(":")?;
        let otherwise = self.expression()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn or(&mut self) -> Result<Expr, ScriptError> {
        let mut lhs = self.and()?;
        while self.eat("||") {
            lhs = Expr::Or(Box::new(lhs), Box::new(self.and()?));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, ScriptError> {
        let mut lhs = self.equality()?;
        while self.eat("&&") {
            lhs = Expr::And(Box::new(lhs), Box::new(self.equality()?));
        }
        Ok(lhs)
    }

    fn equality(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(&[("==", BinaryOp::Eq), ("!=", BinaryOp::Ne)], Self::comparison)
    }

    fn comparison(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(
            &[
                ("<=", BinaryOp::Le),
                (">=", BinaryOp::Ge),
                ("<", BinaryOp::Lt),
                (">", BinaryOp::Gt),
            ],
            Self::additive,
        )
    }

    fn additive(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(&[("+", BinaryOp::Add), ("-", BinaryOp::Sub)], Self::multiplicative)
    }

    fn multiplicative(&mut self) -> Result<Expr, ScriptError> {
        self.binary_level(&[("*", BinaryOp::Mul), ("/", BinaryOp::Div)], Self::unary)
    }

    fn binary_level(
        &mut self,
        ops: &[(&str, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, ScriptError>,
    ) -> Result<Expr, ScriptError> {
        let mut lhs = next(self)?;
        'outer: loop {
            for (punct, op) in ops {
                if self.eat(punct) {
                    let rhs = next(self)?;
                    lhs = Expr::Binary {
                        op: *op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    };
                    continue 'outer;
                }
            }
            return Ok(lhs);
        }
    }

    fn unary(&mut self) -> Result<Expr, ScriptError> {
        if self.eat("!") {
            return Ok(Expr::Not(Box::new(self.nested(Self::unary)?)));
        }
        if self.eat("-") {
            return Ok(Expr::Neg(Box::new(self.nested(Self::unary)?)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(".") {
                let key = match self.peek().clone() {
                    Token::Ident(name) => Key::Field(name),
                    Token::Num(n) => Key::Computed(Box::new(Expr::Literal(
                        number(n).unwrap_or(Value::Null),
                    ))),
                    _ => return Err(self.unexpected()),
                };
                self.advance();
                expr = Expr::Member {
                    object: Box::new(expr),
                    key,
                };
            } else if self.eat("[") {
                let index = self.expression()?;
                self.expect("]")?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    key: Key::Computed(Box::new(index)),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ScriptError> {
        match self.peek().clone() {
            Token::Num(n) => {
                self.advance();
                Ok(Expr::Literal(number(n).unwrap_or(Value::Null)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Value::String(s)))
            }
            Token::Ident(word) if word == "true" || word == "false" => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(word == "true")))
            }
            Token::Ident(word) if word == "null" => {
                self.advance();
                Ok(Expr::Literal(Value::Null))
            }
            Token::Ident(_) => {
                let name = self.identifier()?;
                if self.eat("(") {
                    let args = self.list(")")?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Token::Punct("[") => {
                self.advance();
                Ok(Expr::Array(self.list("]")?))
            }
            Token::Punct("(") => {
                self.advance();
                let inner = self.expression()?;
                self.expect(")")?;
                Ok(inner)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed.
    fn list(&mut self, close: &str) -> Result<Vec<Expr>, ScriptError> {
        let mut items = Vec::new();
        while !self.eat(close) {
            items.push(self.expression()?);
            if !self.eat(",") {
                self.expect(close)?;
                break;
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_assignment_and_return() {
        let program = parse("profile.basics.name = \"X\"; return profile;").unwrap();
        assert_eq!(program.len(), 2);
        match &program[0] {
            Stmt::Assign { target, value } => {
                assert_eq!(target.root, "profile");
                assert_eq!(
                    target.keys,
                    vec![Key::Field("basics".into()), Key::Field("name".into())]
                );
                assert_eq!(value, &Expr::Literal(json!("X")));
            }
            other => panic!("unexpected statement {other:?}"),
        }
        assert_eq!(program[1], Stmt::Return(Some(Expr::Var("profile".into()))));
    }

    #[test]
    fn test_semicolons_are_optional() {
        let program = parse("let a = 1\nlet b = a + 2\nprofile.x = b").unwrap();
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn test_precedence() {
        let program = parse("let a = 1 + 2 * 3").unwrap();
        let Stmt::Let { value, .. } = &program[0] else {
            panic!("expected let");
        };
        match value {
            Expr::Binary {
                op: BinaryOp::Add,
                rhs,
                ..
            } => assert!(matches!(**rhs, Expr::Binary { op: BinaryOp::Mul, .. })),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_if_else_chain() {
        let program = parse("if (a) { b = 1 } else if (c) b = 2 else { b = 3 }").unwrap();
        let Stmt::If { otherwise, .. } = &program[0] else {
            panic!("expected if");
        };
        assert!(matches!(otherwise[0], Stmt::If { .. }));
    }

    #[test]
    fn test_bare_expression_statement_is_rejected() {
        assert!(parse("upper(profile.name)").is_err());
    }

    #[test]
    fn test_assignment_to_call_is_rejected() {
        assert!(parse("upper(x) = 1").is_err());
    }

    #[test]
    fn test_keywords_cannot_be_bound() {
        assert!(parse("let return = 1").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let src = format!("let a = {}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&src), Err(ScriptError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_trailing_comma_in_array() {
        let program = parse("let a = [1, 2,]").unwrap();
        let Stmt::Let { value, .. } = &program[0] else {
            panic!("expected let");
        };
        assert!(matches!(value, Expr::Array(items) if items.len() == 2));
    }
}
