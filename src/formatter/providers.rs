use super::templates::{RenderError, Templates};
use super::{classify, is_truthy, DumpDisplayStyle, DumpSourceStyle, FormatSettings, TYPE_KEY, VALUES_KEY};
use crate::type_name::{self, TypeNameStyle};
use minijinja::{context, Value as TemplateValue};
use serde_json::{Map, Value};

/// Nesting depth past which values are printed as plain JSON text.
pub const MAX_RENDER_DEPTH: usize = 32;

/// Renders one classified value into an HTML fragment.
pub trait FormatProvider {
    /// Render a top-level value.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if a template fails to render.
    fn render(&self, templates: &Templates) -> Result<String, RenderError> {
        self.render_at(templates, 0)
    }

    /// Render a value found `depth` levels below the top-level dump.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if a template fails to render.
    fn render_at(&self, templates: &Templates, depth: usize) -> Result<String, RenderError>;
}

/// Classify and render a value nested inside another one.
fn render_nested(
    value: &Value,
    settings: &FormatSettings,
    templates: &Templates,
    depth: usize,
) -> Result<TemplateValue, RenderError> {
    let html = if depth >= MAX_RENDER_DEPTH {
        RawFormatProvider::new(value.clone()).render_at(templates, depth)?
    } else {
        classify(value.clone(), settings).render_at(templates, depth)?
    };
    Ok(TemplateValue::from_safe_string(html))
}

/// Header text for a value's `$type`, empty when unnamed or when the style hides names.
fn type_header(fields: &Map<String, Value>, style: TypeNameStyle) -> String {
    match fields.get(TYPE_KEY) {
        Some(Value::String(tag)) => match type_name::parse(tag) {
            Ok(parsed) => parsed.format(style),
            Err(_) if style == TypeNameStyle::None => String::new(),
            Err(_) => tag.clone(),
        },
        _ => String::new(),
    }
}

fn data_fields(fields: &Map<String, Value>) -> impl Iterator<Item = (&String, &Value)> {
    fields.iter().filter(|(key, _)| !key.starts_with('$'))
}

fn field<'a>(fields: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| fields.get(*name))
}

/// Preformatted markup, passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlFormatProvider {
    pub html: String,
}

impl HtmlFormatProvider {
    #[must_use]
    pub fn new(html: String) -> Self {
        Self { html }
    }
}

impl FormatProvider for HtmlFormatProvider {
    fn render_at(&self, _templates: &Templates, _depth: usize) -> Result<String, RenderError> {
        Ok(self.html.clone())
    }
}

/// Anything without structural markers, printed as JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFormatProvider {
    pub value: Value,
}

impl RawFormatProvider {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    fn text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl FormatProvider for RawFormatProvider {
    fn render_at(&self, templates: &Templates, _depth: usize) -> Result<String, RenderError> {
        let kind = match &self.value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) | Value::Object(_) => "json",
        };
        templates.render("raw.html", context! { kind => kind, text => self.text() })
    }
}

/// A tagged object rendered as a key/value table.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectFormatProvider {
    pub value: Value,
    pub name_style: TypeNameStyle,
    pub settings: FormatSettings,
}

impl ObjectFormatProvider {
    #[must_use]
    pub fn new(value: Value, name_style: TypeNameStyle, settings: FormatSettings) -> Self {
        Self {
            value,
            name_style,
            settings,
        }
    }
}

impl FormatProvider for ObjectFormatProvider {
    fn render_at(&self, templates: &Templates, depth: usize) -> Result<String, RenderError> {
        let empty = Map::new();
        let fields = self.value.as_object().unwrap_or(&empty);
        let rows = data_fields(fields)
            .map(|(key, value)| {
                let rendered = render_nested(value, &self.settings, templates, depth + 1)?;
                Ok(context! { key => key, value => rendered })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;
        templates.render(
            "object.html",
            context! { type_name => type_header(fields, self.name_style), rows => rows },
        )
    }
}

/// A collection of scalars rendered on one line.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayFormatProvider {
    pub value: Value,
    pub name_style: TypeNameStyle,
    pub settings: FormatSettings,
}

impl ArrayFormatProvider {
    #[must_use]
    pub fn new(value: Value, name_style: TypeNameStyle, settings: FormatSettings) -> Self {
        Self {
            value,
            name_style,
            settings,
        }
    }
}

impl FormatProvider for ArrayFormatProvider {
    fn render_at(&self, templates: &Templates, depth: usize) -> Result<String, RenderError> {
        let empty = Map::new();
        let fields = self.value.as_object().unwrap_or(&empty);
        let items = match fields.get(VALUES_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| render_nested(item, &self.settings, templates, depth + 1))
                .collect::<Result<Vec<_>, RenderError>>()?,
            Some(other) if is_truthy(other) => {
                vec![render_nested(other, &self.settings, templates, depth + 1)?]
            }
            _ => Vec::new(),
        };
        templates.render(
            "array.html",
            context! { type_name => type_header(fields, self.name_style), items => items },
        )
    }
}

/// A collection of objects rendered as a table, one row per element.
#[derive(Debug, Clone, PartialEq)]
pub struct GridFormatProvider {
    pub value: Value,
    pub name_style: TypeNameStyle,
    pub settings: FormatSettings,
}

impl GridFormatProvider {
    #[must_use]
    pub fn new(value: Value, name_style: TypeNameStyle, settings: FormatSettings) -> Self {
        Self {
            value,
            name_style,
            settings,
        }
    }

    /// Union of the data keys of every object element, in first-seen order.
    fn columns(items: &[Value]) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for fields in items.iter().filter_map(Value::as_object) {
            for (key, _) in data_fields(fields) {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        columns
    }
}

impl FormatProvider for GridFormatProvider {
    fn render_at(&self, templates: &Templates, depth: usize) -> Result<String, RenderError> {
        let empty = Map::new();
        let fields = self.value.as_object().unwrap_or(&empty);
        let items: &[Value] = match fields.get(VALUES_KEY) {
            Some(Value::Array(items)) => items,
            _ => &[],
        };
        let mut columns = Self::columns(items);
        if columns.is_empty() {
            columns.push("Value".to_string());
        }

        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let mut cells = Vec::with_capacity(columns.len());
            match item.as_object() {
                Some(element) if element.keys().any(|k| !k.starts_with('$')) => {
                    for column in &columns {
                        match element.get(column) {
                            Some(value) => cells.push(render_nested(
                                value,
                                &self.settings,
                                templates,
                                depth + 1,
                            )?),
                            None => cells.push(TemplateValue::from("")),
                        }
                    }
                }
                _ => {
                    cells.push(render_nested(item, &self.settings, templates, depth + 1)?);
                    cells.resize(columns.len(), TemplateValue::from(""));
                }
            }
            rows.push(cells);
        }

        templates.render(
            "grid.html",
            context! {
                type_name => type_header(fields, self.name_style),
                columns => columns,
                rows => rows,
            },
        )
    }
}

/// The outer wrapper of one dump: source expression, timestamp and the dumped value.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpContainerFormatProvider {
    pub value: Value,
    pub source_style: DumpSourceStyle,
    pub display_style: DumpDisplayStyle,
    pub show_time: bool,
    /// Settings used to classify the wrapped value
    pub settings: FormatSettings,
}

impl DumpContainerFormatProvider {
    #[must_use]
    pub fn new(value: Value, settings: FormatSettings) -> Self {
        Self {
            value,
            source_style: settings.dump_source_style,
            display_style: settings.dump_display_style,
            show_time: settings.show_time_on_dumps,
            settings,
        }
    }
}

impl FormatProvider for DumpContainerFormatProvider {
    fn render_at(&self, templates: &Templates, depth: usize) -> Result<String, RenderError> {
        let empty = Map::new();
        let fields = self.value.as_object().unwrap_or(&empty);

        let source = match (self.source_style, field(fields, &["Source", "source"])) {
            (DumpSourceStyle::Show, Some(Value::String(s))) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
        let time = match (self.show_time, field(fields, &["Time", "time"])) {
            (true, Some(Value::String(t))) if !t.is_empty() => Some(t.clone()),
            _ => None,
        };
        let inner = field(fields, &["Value", "value"]).unwrap_or(&Value::Null);
        let value = render_nested(inner, &self.settings, templates, depth + 1)?;

        templates.render(
            "dump_container.html",
            context! {
                single => self.display_style == DumpDisplayStyle::Single,
                source => source,
                time => time,
                value => value,
            },
        )
    }
}
