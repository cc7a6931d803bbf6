//! # Formatter Module
//!
//! The formatter module is the dump classification engine. Incoming values carry no
//! schema; instead the producer follows Json.NET conventions and marks intent with a
//! handful of reserved keys:
//!
//! - `$type` - the type tag (an assembly-qualified type name, or `"html"`)
//! - `$html` - preformatted markup, honoured only when `$type` is `"html"`
//! - `$values` - the element list of a collection
//!
//! [`classify`] inspects those markers once and resolves the value into a
//! [`Formatter`], a closed set of variants that downstream code matches on
//! statically.
//!
//! ## Precedence
//!
//! The first matching rule wins:
//!
//! 1. `null` or absent → [`Variant::Raw`]
//! 2. `$type == "html"` with a string `$html` → [`Variant::Html`]
//! 3. `$type` parses to a type named `DumpContainer` → [`Variant::DumpContainer`]
//! 4. `$values` present → [`Variant::Grid`] when the first element is object-shaped,
//!    otherwise [`Variant::Array`]
//! 5. `$type` present → [`Variant::Object`]
//! 6. anything else → [`Variant::Raw`]
//!
//! Classification never fails. A type tag that cannot be parsed is treated as "not a
//! dump container" and the value falls through to rules 4 and 5.
//!
//! ## Settings
//!
//! [`FormatSettings`] choose how the chosen provider renders, never which variant is
//! chosen. The one cross-cutting rule: a `single` display style forces the type-name
//! style to `none` for every non-raw variant.

mod providers;
mod templates;

pub use providers::{
    ArrayFormatProvider, DumpContainerFormatProvider, FormatProvider, GridFormatProvider,
    HtmlFormatProvider, ObjectFormatProvider, RawFormatProvider,
};
pub use templates::{RenderError, Templates};

use crate::type_name::{self, TypeNameStyle};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Reserved key holding the type tag.
pub const TYPE_KEY: &str = "$type";
/// Reserved key holding preformatted markup.
pub const HTML_KEY: &str = "$html";
/// Reserved key holding a collection's elements.
pub const VALUES_KEY: &str = "$values";

const HTML_TYPE_TAG: &str = "html";
const DUMP_CONTAINER_NAME: &str = "DumpContainer";

/// Whether the source expression of a dump is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpSourceStyle {
    #[default]
    Show,
    Hide,
}

/// Layout of a dump container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpDisplayStyle {
    #[default]
    Full,
    /// Compact one-line dumps; also suppresses type names
    Single,
}

/// Style flags consulted when building and rendering a [`Formatter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSettings {
    pub type_name_style: TypeNameStyle,
    pub dump_source_style: DumpSourceStyle,
    pub dump_display_style: DumpDisplayStyle,
    pub show_time_on_dumps: bool,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            type_name_style: TypeNameStyle::Normal,
            dump_source_style: DumpSourceStyle::Show,
            dump_display_style: DumpDisplayStyle::Full,
            show_time_on_dumps: true,
        }
    }
}

impl FormatSettings {
    /// Type-name style after applying the `single` display override.
    #[must_use]
    pub fn effective_name_style(&self) -> TypeNameStyle {
        if self.dump_display_style == DumpDisplayStyle::Single {
            TypeNameStyle::None
        } else {
            self.type_name_style
        }
    }
}

/// Discriminant of a [`Formatter`], for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Html,
    DumpContainer,
    Grid,
    Array,
    Object,
    Raw,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Variant::Html => "html",
            Variant::DumpContainer => "dump_container",
            Variant::Grid => "grid",
            Variant::Array => "array",
            Variant::Object => "object",
            Variant::Raw => "raw",
        };
        f.write_str(s)
    }
}

/// A classified value together with the provider that renders it.
#[derive(Debug, Clone, PartialEq)]
pub enum Formatter {
    Html(HtmlFormatProvider),
    DumpContainer(DumpContainerFormatProvider),
    Grid(GridFormatProvider),
    Array(ArrayFormatProvider),
    Object(ObjectFormatProvider),
    Raw(RawFormatProvider),
}

impl Formatter {
    #[must_use]
    pub fn variant(&self) -> Variant {
        match self {
            Formatter::Html(_) => Variant::Html,
            Formatter::DumpContainer(_) => Variant::DumpContainer,
            Formatter::Grid(_) => Variant::Grid,
            Formatter::Array(_) => Variant::Array,
            Formatter::Object(_) => Variant::Object,
            Formatter::Raw(_) => Variant::Raw,
        }
    }

    /// Type-name style the selected provider renders with, `None` for raw and html.
    #[must_use]
    pub fn name_style(&self) -> Option<TypeNameStyle> {
        match self {
            Formatter::Grid(p) => Some(p.name_style),
            Formatter::Array(p) => Some(p.name_style),
            Formatter::Object(p) => Some(p.name_style),
            Formatter::DumpContainer(p) => Some(p.settings.effective_name_style()),
            Formatter::Html(_) | Formatter::Raw(_) => None,
        }
    }

    fn provider(&self) -> &dyn FormatProvider {
        match self {
            Formatter::Html(p) => p,
            Formatter::DumpContainer(p) => p,
            Formatter::Grid(p) => p,
            Formatter::Array(p) => p,
            Formatter::Object(p) => p,
            Formatter::Raw(p) => p,
        }
    }
}

impl FormatProvider for Formatter {
    fn render_at(&self, templates: &Templates, depth: usize) -> Result<String, RenderError> {
        self.provider().render_at(templates, depth)
    }
}

/// Classify a possibly absent value. An absent value is raw.
#[must_use]
pub fn classify_optional(target: Option<Value>, settings: &FormatSettings) -> Formatter {
    match target {
        Some(value) => classify(value, settings),
        None => Formatter::Raw(RawFormatProvider::new(Value::Null)),
    }
}

/// Decide which provider renders `target`.
#[must_use]
pub fn classify(target: Value, settings: &FormatSettings) -> Formatter {
    let Value::Object(fields) = &target else {
        return Formatter::Raw(RawFormatProvider::new(target));
    };
    let name_style = settings.effective_name_style();

    if let (Some(Value::String(tag)), Some(Value::String(html))) =
        (fields.get(TYPE_KEY), fields.get(HTML_KEY))
    {
        if tag == HTML_TYPE_TAG {
            return Formatter::Html(HtmlFormatProvider::new(html.clone()));
        }
    }

    let type_tag = fields.get(TYPE_KEY).filter(|tag| is_truthy(tag));

    if let Some(tag) = type_tag {
        if is_dump_container(tag) {
            return Formatter::DumpContainer(DumpContainerFormatProvider::new(target, *settings));
        }
    }

    if let Some(values) = fields.get(VALUES_KEY).filter(|values| is_truthy(values)) {
        let grid = match values {
            Value::Array(items) => items.first().is_some_and(is_object_shaped),
            _ => false,
        };
        return if grid {
            Formatter::Grid(GridFormatProvider::new(target, name_style, *settings))
        } else {
            Formatter::Array(ArrayFormatProvider::new(target, name_style, *settings))
        };
    }

    if type_tag.is_some() {
        return Formatter::Object(ObjectFormatProvider::new(target, name_style, *settings));
    }

    Formatter::Raw(RawFormatProvider::new(target))
}

fn is_dump_container(tag: &Value) -> bool {
    let Value::String(tag) = tag else {
        debug!(tag = %tag, "non-string type tag, not a dump container");
        return false;
    };
    match type_name::parse(tag) {
        Ok(parsed) => parsed.display_name() == DUMP_CONTAINER_NAME,
        Err(err) => {
            debug!(tag = %tag, error = %err, "type tag did not parse, not a dump container");
            false
        }
    }
}

/// A collection element counts as object-shaped when it is a nested object or array.
fn is_object_shaped(element: &Value) -> bool {
    matches!(element, Value::Object(_) | Value::Array(_))
}

/// Producer-side truthiness: null, false, zero and the empty string are false.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
