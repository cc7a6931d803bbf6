//! # Type Name Module
//!
//! Parses the assembly-qualified type names that Json.NET writes into the `$type`
//! key of serialized values, e.g.
//!
//! ```text
//! System.Collections.Generic.Dictionary`2[[System.String, mscorlib],[System.Int32, mscorlib]], mscorlib
//! ```
//!
//! The classification engine only needs [`TypeName::display_name`] to recognise
//! dump containers; the format providers use [`TypeName::format`] to print type
//! headers in the configured [`TypeNameStyle`].

mod parser;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use parser::{parse, TypeNameParseError, MAX_GENERIC_DEPTH};

/// How type names are printed in rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeNameStyle {
    /// Namespace-qualified names, e.g. `System.Collections.Generic.List<System.Int32>`
    Full,
    /// Short names with C# keyword aliases, e.g. `List<int>`
    #[default]
    Normal,
    /// No type names at all
    None,
}

impl fmt::Display for TypeNameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeNameStyle::Full => "full",
            TypeNameStyle::Normal => "normal",
            TypeNameStyle::None => "none",
        };
        f.write_str(s)
    }
}

/// A parsed type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// Dotted namespace, empty for types in the global namespace
    pub namespace: String,
    /// Type name without namespace or generic arity marker; nested types keep `+`
    pub name: String,
    /// Generic type arguments, in declaration order
    pub generic_args: Vec<TypeName>,
    /// Array rank suffixes such as `[]` or `[,]`, outermost last
    pub array_suffix: Vec<String>,
    /// Assembly part after the top-level comma, if present
    pub assembly: Option<String>,
}

const KEYWORD_ALIASES: &[(&str, &str)] = &[
    ("Boolean", "bool"),
    ("Byte", "byte"),
    ("SByte", "sbyte"),
    ("Char", "char"),
    ("Decimal", "decimal"),
    ("Double", "double"),
    ("Single", "float"),
    ("Int16", "short"),
    ("UInt16", "ushort"),
    ("Int32", "int"),
    ("UInt32", "uint"),
    ("Int64", "long"),
    ("UInt64", "ulong"),
    ("Object", "object"),
    ("String", "string"),
    ("Void", "void"),
];

impl TypeName {
    /// Short, human-facing name: no namespace, no generic arguments.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name.replace('+', ".")
    }

    /// Render the type name in the requested style.
    #[must_use]
    pub fn format(&self, style: TypeNameStyle) -> String {
        match style {
            TypeNameStyle::None => String::new(),
            TypeNameStyle::Full => self.format_full(),
            TypeNameStyle::Normal => self.format_normal(),
        }
    }

    fn format_full(&self) -> String {
        let mut out = if self.namespace.is_empty() {
            self.display_name()
        } else {
            format!("{}.{}", self.namespace, self.display_name())
        };
        if !self.generic_args.is_empty() {
            let args: Vec<String> = self.generic_args.iter().map(Self::format_full).collect();
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        for suffix in &self.array_suffix {
            out.push_str(suffix);
        }
        out
    }

    fn format_normal(&self) -> String {
        let mut out = if self.is_system("Nullable") && self.generic_args.len() == 1 {
            format!("{}?", self.generic_args[0].format_normal())
        } else if let Some(alias) = self.keyword_alias() {
            alias.to_string()
        } else {
            let mut base = self.display_name();
            if !self.generic_args.is_empty() {
                let args: Vec<String> =
                    self.generic_args.iter().map(Self::format_normal).collect();
                base.push('<');
                base.push_str(&args.join(", "));
                base.push('>');
            }
            base
        };
        for suffix in &self.array_suffix {
            out.push_str(suffix);
        }
        out
    }

    fn is_system(&self, name: &str) -> bool {
        self.namespace == "System" && self.name == name
    }

    fn keyword_alias(&self) -> Option<&'static str> {
        if self.namespace != "System" || !self.generic_args.is_empty() {
            return None;
        }
        KEYWORD_ALIASES
            .iter()
            .find(|(clr, _)| *clr == self.name)
            .map(|(_, alias)| *alias)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_full())
    }
}
