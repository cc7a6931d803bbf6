use super::TypeName;
use std::fmt;

/// Deepest generic argument nesting accepted by [`parse`].
pub const MAX_GENERIC_DEPTH: usize = 32;

/// Error raised for malformed type name syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNameParseError {
    /// The input was empty or whitespace only
    Empty,
    /// A type name was expected at the given byte offset but none was found
    EmptyName { position: usize },
    /// The generic arity marker after a backtick was not a number
    InvalidArity { position: usize },
    /// An unexpected character was found
    Unexpected { found: char, position: usize },
    /// The input ended while a closing character was still expected
    UnexpectedEnd { expected: char },
    /// Generic arguments nest deeper than [`MAX_GENERIC_DEPTH`]
    TooDeep { position: usize },
}

impl fmt::Display for TypeNameParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNameParseError::Empty => write!(f, "type name is empty"),
            TypeNameParseError::EmptyName { position } => {
                write!(f, "expected a type name at offset {position}")
            }
            TypeNameParseError::InvalidArity { position } => {
                write!(f, "invalid generic arity at offset {position}")
            }
            TypeNameParseError::Unexpected { found, position } => {
                write!(f, "unexpected '{found}' at offset {position}")
            }
            TypeNameParseError::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of type name, expected '{expected}'")
            }
            TypeNameParseError::TooDeep { position } => write!(
                f,
                "generic arguments nested deeper than {MAX_GENERIC_DEPTH} at offset {position}"
            ),
        }
    }
}

impl std::error::Error for TypeNameParseError {}

/// Parse a Json.NET style type name.
///
/// # Errors
///
/// Returns a [`TypeNameParseError`] when brackets are unbalanced, a name is
/// missing, generic arguments nest too deeply, or trailing input remains after
/// the type.
pub fn parse(input: &str) -> Result<TypeName, TypeNameParseError> {
    if input.trim().is_empty() {
        return Err(TypeNameParseError::Empty);
    }
    let mut parser = Parser {
        src: input,
        pos: 0,
        depth: 0,
    };
    let type_name = parser.parse_type(true)?;
    parser.skip_ws();
    match parser.peek() {
        None => Ok(type_name),
        Some(found) => Err(TypeNameParseError::Unexpected {
            found,
            position: parser.pos,
        }),
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    /// Open generic argument lists
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    /// First non-whitespace character after the current one.
    fn peek_after(&self) -> Option<char> {
        self.src[self.pos..]
            .chars()
            .skip(1)
            .find(|c| !c.is_whitespace())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeNameParseError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(found) => Err(TypeNameParseError::Unexpected {
                found,
                position: self.pos - found.len_utf8(),
            }),
            None => Err(TypeNameParseError::UnexpectedEnd { expected }),
        }
    }

    fn parse_type(&mut self, allow_assembly: bool) -> Result<TypeName, TypeNameParseError> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '[' | ']' | ',') {
                break;
            }
            self.bump();
        }
        let raw = self.src[start..self.pos].trim();
        if raw.is_empty() {
            return Err(TypeNameParseError::EmptyName { position: start });
        }

        let qualified = match raw.split_once('`') {
            Some((name, arity)) => {
                if arity.is_empty() || !arity.chars().all(|c| c.is_ascii_digit()) {
                    return Err(TypeNameParseError::InvalidArity {
                        position: start + name.len() + 1,
                    });
                }
                name
            }
            None => raw,
        };
        let (namespace, name) = match qualified.rsplit_once('.') {
            Some((ns, name)) => (ns.to_string(), name.to_string()),
            None => (String::new(), qualified.to_string()),
        };
        if name.is_empty() {
            return Err(TypeNameParseError::EmptyName {
                position: start + qualified.len(),
            });
        }

        let mut generic_args = Vec::new();
        if self.peek() == Some('[') && !matches!(self.peek_after(), Some(']' | ',')) {
            generic_args = self.parse_generic_args()?;
        }

        let mut array_suffix = Vec::new();
        self.skip_ws();
        while self.peek() == Some('[') {
            if !matches!(self.peek_after(), Some(']' | ',')) {
                return Err(TypeNameParseError::Unexpected {
                    found: '[',
                    position: self.pos,
                });
            }
            array_suffix.push(self.parse_array_rank()?);
            self.skip_ws();
        }

        let mut assembly = None;
        if allow_assembly && self.peek() == Some(',') {
            self.bump();
            let asm_start = self.pos;
            while let Some(c) = self.peek() {
                if c == ']' {
                    break;
                }
                self.bump();
            }
            let asm = self.src[asm_start..self.pos].trim();
            if asm.is_empty() {
                return Err(TypeNameParseError::EmptyName {
                    position: asm_start,
                });
            }
            assembly = Some(asm.to_string());
        }

        Ok(TypeName {
            namespace,
            name,
            generic_args,
            array_suffix,
            assembly,
        })
    }

    fn parse_generic_args(&mut self) -> Result<Vec<TypeName>, TypeNameParseError> {
        if self.depth >= MAX_GENERIC_DEPTH {
            return Err(TypeNameParseError::TooDeep { position: self.pos });
        }
        self.depth += 1;
        self.expect('[')?;
        let mut args = Vec::new();
        loop {
            self.skip_ws();
            let arg = if self.peek() == Some('[') {
                self.bump();
                let arg = self.parse_type(true)?;
                self.skip_ws();
                self.expect(']')?;
                arg
            } else {
                self.parse_type(false)?
            };
            args.push(arg);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(']') => break,
                Some(found) => {
                    return Err(TypeNameParseError::Unexpected {
                        found,
                        position: self.pos - found.len_utf8(),
                    })
                }
                None => return Err(TypeNameParseError::UnexpectedEnd { expected: ']' }),
            }
        }
        self.depth -= 1;
        Ok(args)
    }

    fn parse_array_rank(&mut self) -> Result<String, TypeNameParseError> {
        self.expect('[')?;
        let mut suffix = String::from("[");
        loop {
            self.skip_ws();
            match self.bump() {
                Some(',') => suffix.push(','),
                Some(']') => break,
                Some(found) => {
                    return Err(TypeNameParseError::Unexpected {
                        found,
                        position: self.pos - found.len_utf8(),
                    })
                }
                None => return Err(TypeNameParseError::UnexpectedEnd { expected: ']' }),
            }
        }
        suffix.push(']');
        Ok(suffix)
    }
}
