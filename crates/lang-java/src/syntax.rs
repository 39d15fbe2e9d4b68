//! Parser for Java type syntax as written in type descriptions.
//!
//! Produces unresolved [`TypeExpr`] trees; names are bound to classes and type
//! variables later by the loader, which knows the declaration scope.
//!
//! Accepted forms:
//!
//! ```text
//! int    java.lang.String    List<? extends T>[]    Map.Entry<K, V>    String...
//! <T extends Number & Comparable<? super T>, V extends T>
//! ```

use crate::error::{DescriptionError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A possibly dotted name with optional type arguments.
    ///
    /// `owner_parameterized` records that an enclosing segment carried type
    /// arguments (`Outer<T>.Inner`), which makes the use generic even when the
    /// innermost segment has none.
    Named {
        name: String,
        args: Vec<TypeExpr>,
        owner_parameterized: bool,
    },
    Wildcard {
        upper: Vec<TypeExpr>,
        lower: Vec<TypeExpr>,
    },
    Array(Box<TypeExpr>),
}

/// One entry of a type parameter clause: `T extends A & B`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamExpr {
    pub name: String,
    pub bounds: Vec<TypeExpr>,
}

/// Parsed parameter or return type, remembering a trailing `...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamExpr {
    pub ty: TypeExpr,
    pub is_varargs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Lt,
    Gt,
    Comma,
    Dot,
    Amp,
    Question,
    Brackets,
    Ellipsis,
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            c if c.is_whitespace() => i += 1,
            '<' => {
                tokens.push((i, Token::Lt));
                i += 1;
            }
            '>' => {
                tokens.push((i, Token::Gt));
                i += 1;
            }
            ',' => {
                tokens.push((i, Token::Comma));
                i += 1;
            }
            '&' => {
                tokens.push((i, Token::Amp));
                i += 1;
            }
            '?' => {
                tokens.push((i, Token::Question));
                i += 1;
            }
            '[' => {
                let mut j = i + 1;
                while j < bytes.len() && (bytes[j] as char).is_whitespace() {
                    j += 1;
                }
                if j >= bytes.len() || bytes[j] != b']' {
                    return Err(DescriptionError::syntax(input, i, "expected `]`"));
                }
                tokens.push((i, Token::Brackets));
                i = j + 1;
            }
            '.' => {
                if input[i..].starts_with("...") {
                    tokens.push((i, Token::Ellipsis));
                    i += 3;
                } else {
                    tokens.push((i, Token::Dot));
                    i += 1;
                }
            }
            c if c == '_' || c == '$' || c.is_alphabetic() => {
                let start = i;
                while i < bytes.len() {
                    let ch = input[i..].chars().next().unwrap_or(' ');
                    if ch == '_' || ch == '$' || ch.is_alphanumeric() {
                        i += ch.len_utf8();
                    } else {
                        break;
                    }
                }
                tokens.push((start, Token::Ident(input[start..i].to_string())));
            }
            _ => {
                return Err(DescriptionError::syntax(
                    input,
                    i,
                    format!("unexpected character `{c}`"),
                ));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self> {
        Ok(Self {
            input,
            tokens: tokenize(input)?,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(o, _)| *o)
            .unwrap_or(self.input.len())
    }

    fn error(&self, message: impl Into<String>) -> DescriptionError {
        DescriptionError::syntax(self.input, self.offset(), message)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn keyword(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(name)) if name == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn finish(&self) -> Result<()> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }

    fn type_expr(&mut self) -> Result<TypeExpr> {
        if self.eat(&Token::Question) {
            return self.wildcard();
        }
        let mut ty = self.named()?;
        while self.eat(&Token::Brackets) {
            ty = TypeExpr::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn wildcard(&mut self) -> Result<TypeExpr> {
        if self.keyword("extends") {
            Ok(TypeExpr::Wildcard {
                upper: self.bound_list()?,
                lower: vec![],
            })
        } else if self.keyword("super") {
            Ok(TypeExpr::Wildcard {
                upper: vec![],
                lower: self.bound_list()?,
            })
        } else {
            Ok(TypeExpr::Wildcard {
                upper: vec![],
                lower: vec![],
            })
        }
    }

    fn bound_list(&mut self) -> Result<Vec<TypeExpr>> {
        let mut bounds = vec![self.type_expr()?];
        while self.eat(&Token::Amp) {
            bounds.push(self.type_expr()?);
        }
        Ok(bounds)
    }

    /// `a.b.C<X>.D<Y>`: arguments attached to an outer segment of a chain are
    /// dropped; only the innermost class keeps its own arguments.
    fn named(&mut self) -> Result<TypeExpr> {
        let mut name = self.ident()?;
        let mut args = self.type_args()?;
        let mut owner_parameterized = false;
        while self.peek() == Some(&Token::Dot) {
            self.pos += 1;
            owner_parameterized |= !args.is_empty();
            name.push('.');
            name.push_str(&self.ident()?);
            args = self.type_args()?;
        }
        Ok(TypeExpr::Named {
            name,
            args,
            owner_parameterized,
        })
    }

    fn type_args(&mut self) -> Result<Vec<TypeExpr>> {
        if !self.eat(&Token::Lt) {
            return Ok(vec![]);
        }
        let mut args = vec![self.type_expr()?];
        while self.eat(&Token::Comma) {
            args.push(self.type_expr()?);
        }
        self.expect(&Token::Gt, "`>`")?;
        Ok(args)
    }

    fn type_params(&mut self) -> Result<Vec<TypeParamExpr>> {
        self.expect(&Token::Lt, "`<`")?;
        let mut params = vec![self.type_param()?];
        while self.eat(&Token::Comma) {
            params.push(self.type_param()?);
        }
        self.expect(&Token::Gt, "`>`")?;
        Ok(params)
    }

    fn type_param(&mut self) -> Result<TypeParamExpr> {
        let name = self.ident()?;
        let bounds = if self.keyword("extends") {
            self.bound_list()?
        } else {
            vec![]
        };
        Ok(TypeParamExpr { name, bounds })
    }
}

/// Parse a single type, e.g. `java.util.List<? super T>[]`.
pub fn parse_type(input: &str) -> Result<TypeExpr> {
    let mut parser = Parser::new(input)?;
    let ty = parser.type_expr()?;
    parser.finish()?;
    Ok(ty)
}

/// Parse a parameter type, accepting a trailing `...`.
pub fn parse_param(input: &str) -> Result<ParamExpr> {
    let mut parser = Parser::new(input)?;
    let mut ty = parser.type_expr()?;
    let is_varargs = parser.eat(&Token::Ellipsis);
    if is_varargs {
        ty = TypeExpr::Array(Box::new(ty));
    }
    parser.finish()?;
    Ok(ParamExpr { ty, is_varargs })
}

/// Parse a type parameter clause. Blank input yields no parameters; the
/// surrounding angle brackets are required otherwise.
pub fn parse_type_params(input: &str) -> Result<Vec<TypeParamExpr>> {
    if input.trim().is_empty() {
        return Ok(vec![]);
    }
    let mut parser = Parser::new(input)?;
    let params = parser.type_params()?;
    parser.finish()?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, args: Vec<TypeExpr>) -> TypeExpr {
        TypeExpr::Named {
            name: name.to_string(),
            args,
            owner_parameterized: false,
        }
    }

    #[test]
    fn parses_nested_generic_array() {
        let ty = parse_type("java.util.List<? extends T>[]").unwrap();
        assert_eq!(
            ty,
            TypeExpr::Array(Box::new(named(
                "java.util.List",
                vec![TypeExpr::Wildcard {
                    upper: vec![named("T", vec![])],
                    lower: vec![],
                }]
            )))
        );
    }

    #[test]
    fn parses_member_type_chain() {
        let ty = parse_type("Map.Entry<K, V>").unwrap();
        assert_eq!(
            ty,
            named("Map.Entry", vec![named("K", vec![]), named("V", vec![])])
        );
    }

    #[test]
    fn remembers_parameterized_owner() {
        let ty = parse_type("Outer<T>.Inner").unwrap();
        assert_eq!(
            ty,
            TypeExpr::Named {
                name: "Outer.Inner".to_string(),
                args: vec![],
                owner_parameterized: true,
            }
        );
    }

    #[test]
    fn parses_varargs_parameter() {
        let param = parse_param("String...").unwrap();
        assert!(param.is_varargs);
        assert_eq!(param.ty, TypeExpr::Array(Box::new(named("String", vec![]))));
    }

    #[test]
    fn parses_type_params_with_intersection_bounds() {
        let params =
            parse_type_params("<T extends Number & Comparable<? super T>, V extends T>").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "T");
        assert_eq!(params[0].bounds.len(), 2);
        assert_eq!(params[1].bounds, vec![named("T", vec![])]);
    }

    #[test]
    fn blank_type_params_are_empty() {
        assert!(parse_type_params("  ").unwrap().is_empty());
    }

    #[test]
    fn rejects_unbalanced_arguments() {
        let err = parse_type("List<String").unwrap_err();
        assert!(err.to_string().contains("expected `>`"));
    }

    #[test]
    fn rejects_trailing_input() {
        assert!(parse_type("String String").is_err());
    }
}
