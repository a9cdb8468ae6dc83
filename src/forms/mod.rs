//! Declarative forms.
//!
//! A form is a static [`FormSpec`]: the fields, how each one is parsed, which
//! validators apply and which widget renders it. [`FormSpec::clean`] turns raw
//! urlencoded pairs into typed [`Cleaned`] values or a set of [`FieldErrors`];
//! the same spec drives rendering in `templates::fields`.

pub mod accounts;
pub mod blog;
pub mod catalog;

use std::collections::{BTreeMap, HashMap};

use jiff::civil::Date;
use serde::Deserialize;
use url::Url;

pub const REQUIRED: &str = "This field is required.";

/// Raw form submission, keeping repeated keys (multi-selects) and order.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.0.iter().filter(|(k, _)| k == name).map(|(_, v)| v.as_str()).collect()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Drops `name`, e.g. so a rejected password is not echoed back.
    pub fn without(mut self, name: &str) -> Self {
        self.0.retain(|(k, _)| k != name);
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Adds `name` only when there is a value, mirroring how an empty optional
    /// column is shown as an empty input.
    pub fn with_opt(self, name: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.with(name, v.to_string()),
            None => self,
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Clone, Copy, Debug)]
pub enum FieldKind {
    Text,
    Integer,
    Date,
    /// Absolute `http` / `https` URL.
    Url,
    /// One of a fixed set of `(code, label)` pairs.
    Choice(&'static [(&'static str, &'static str)]),
    /// Id of a single related row.
    ForeignKey,
    /// Ids of any number of related rows, submitted as repeated keys.
    ManyToMany,
}

#[derive(Clone, Copy, Debug)]
pub enum Validator {
    MaxLength(usize),
    MinValue(i64),
    NotAfterToday,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Widget {
    Input,
    TextArea,
    DateInput,
    Password,
    Select,
    SelectMultiple,
    /// Select fed by the autocomplete endpoint at the given URL.
    Autocomplete(&'static str),
    AutocompleteMultiple(&'static str),
}

#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub validators: &'static [Validator],
    pub widget: Widget,
}

impl FieldSpec {
    /// A required text input; the builder methods below adjust the rest.
    pub const fn new(
        name: &'static str,
        label: &'static str,
        validators: &'static [Validator],
    ) -> Self {
        Self { name, label, kind: FieldKind::Text, required: true, validators, widget: Widget::Input }
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub const fn widget(mut self, widget: Widget) -> Self {
        self.widget = widget;
        self
    }
}

#[derive(Debug)]
pub struct FormSpec {
    pub fields: &'static [FieldSpec],
}

/// Select options for relation fields, keyed by field name.
pub type Options = HashMap<&'static str, Vec<(i32, String)>>;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Empty,
    Text(String),
    Int(i64),
    Date(Date),
    Id(i32),
    Ids(Vec<i32>),
}

#[derive(Debug, Default)]
pub struct Cleaned {
    values: BTreeMap<&'static str, Value>,
}

impl Cleaned {
    pub fn text(&self, name: &str) -> Option<String> {
        match self.values.get(name) {
            Some(Value::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<Date> {
        match self.values.get(name) {
            Some(Value::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn id(&self, name: &str) -> Option<i32> {
        match self.values.get(name) {
            Some(Value::Id(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn ids(&self, name: &str) -> Vec<i32> {
        match self.values.get(name) {
            Some(Value::Ids(ids)) => ids.clone(),
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
    general: Vec<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_error(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn general_error(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add_general(message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn add_general(&mut self, message: impl Into<String>) {
        self.general.push(message.into());
    }

    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn general(&self) -> &[String] {
        &self.general
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_empty()
    }

    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl FormSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validates `data` against every field; keys are looked up as `{prefix}{name}`.
    pub fn clean(&self, data: &FormData, prefix: &str, today: Date) -> Result<Cleaned, FieldErrors> {
        let mut cleaned = Cleaned::default();
        let mut errors = FieldErrors::new();

        for field in self.fields {
            let key = format!("{prefix}{}", field.name);
            match clean_field(field, &data.get_all(&key), today) {
                Ok(value) => {
                    cleaned.values.insert(field.name, value);
                },
                Err(message) => errors.add(field.name, message),
            }
        }

        errors.into_result(cleaned)
    }

}

fn clean_field(field: &FieldSpec, raw: &[&str], today: Date) -> Result<Value, String> {
    if let FieldKind::ManyToMany = field.kind {
        let mut ids = Vec::new();
        for value in raw.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
            let id = parse_id(value)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.is_empty() && field.required {
            return Err(REQUIRED.to_string());
        }
        return Ok(Value::Ids(ids));
    }

    let value = raw.first().map(|v| v.trim()).unwrap_or("");
    if value.is_empty() {
        return if field.required { Err(REQUIRED.to_string()) } else { Ok(Value::Empty) };
    }

    let parsed = match field.kind {
        FieldKind::Text => Value::Text(value.to_string()),
        FieldKind::Integer => Value::Int(
            value.parse::<i32>().map(i64::from).map_err(|_| "Enter a whole number.".to_string())?,
        ),
        FieldKind::Date => {
            Value::Date(value.parse().map_err(|_| "Enter a valid date.".to_string())?)
        },
        FieldKind::Url => {
            if !is_http_url(value) {
                return Err("Enter a valid URL.".to_string());
            }
            Value::Text(value.to_string())
        },
        FieldKind::Choice(choices) => {
            if !choices.iter().any(|(code, _)| *code == value) {
                return Err(format!(
                    "Select a valid choice. {value} is not one of the available choices."
                ));
            }
            Value::Text(value.to_string())
        },
        FieldKind::ForeignKey => Value::Id(parse_id(value)?),
        FieldKind::ManyToMany => unreachable!("handled above"),
    };

    for validator in field.validators {
        validate(validator, &parsed, today)?;
    }
    Ok(parsed)
}

fn validate(validator: &Validator, value: &Value, today: Date) -> Result<(), String> {
    match (validator, value) {
        (Validator::MaxLength(max), Value::Text(s)) => {
            let len = s.chars().count();
            if len > *max {
                return Err(format!(
                    "Ensure this value has at most {max} characters (it has {len})."
                ));
            }
        },
        (Validator::MinValue(min), Value::Int(n)) => {
            if n < min {
                return Err(format!("Ensure this value is greater than or equal to {min}."));
            }
        },
        (Validator::NotAfterToday, Value::Date(d)) => {
            if *d > today {
                return Err(format!("Ensure this value is less than or equal to {today}."));
            }
        },
        _ => {},
    }
    Ok(())
}

fn parse_id(value: &str) -> Result<i32, String> {
    value
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| format!("Select a valid choice. {value} is not one of the available choices."))
}

/// Absolute http(s) URL with a host. Whitespace is refused outright since the
/// parser would silently strip tabs and newlines.
fn is_http_url(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    const SIZES: &[(&str, &str)] = &[("S", "Small"), ("L", "Large")];

    static SPEC: FormSpec = FormSpec {
        fields: &[
            FieldSpec::new("name", "Name", &[Validator::MaxLength(5)]),
            FieldSpec::new("count", "Count", &[Validator::MinValue(1)])
                .kind(FieldKind::Integer)
                .optional(),
            FieldSpec::new("day", "Day", &[Validator::NotAfterToday])
                .kind(FieldKind::Date)
                .optional(),
            FieldSpec::new("link", "Link", &[]).kind(FieldKind::Url).optional(),
            FieldSpec::new("size", "Size", &[]).kind(FieldKind::Choice(SIZES)).optional(),
            FieldSpec::new("tags", "Tags", &[]).kind(FieldKind::ManyToMany).optional(),
        ],
    };

    fn today() -> Date {
        date(2024, 6, 1)
    }

    #[test]
    fn cleans_typed_values() {
        let data: FormData = [
            ("name", " Jo "),
            ("count", "3"),
            ("day", "2024-06-01"),
            ("link", "https://example.com/watch?v=1"),
            ("size", "L"),
            ("tags", "2"),
            ("tags", "5"),
            ("tags", "2"),
        ]
        .into_iter()
        .collect();

        let cleaned = SPEC.clean(&data, "", today()).expect("valid");
        assert_eq!(cleaned.text("name").as_deref(), Some("Jo"));
        assert_eq!(cleaned.int("count"), Some(3));
        assert_eq!(cleaned.date("day"), Some(today()));
        assert_eq!(cleaned.text("size").as_deref(), Some("L"));
        assert_eq!(cleaned.ids("tags"), vec![2, 5]);
    }

    #[test]
    fn reports_every_failing_field() {
        let data: FormData = [
            ("name", "toolong"),
            ("count", "0"),
            ("day", "2024-06-02"),
            ("link", "ftp://example.com"),
            ("size", "XL"),
            ("tags", "x"),
        ]
        .into_iter()
        .collect();

        let errors = SPEC.clean(&data, "", today()).expect_err("invalid");
        assert_eq!(errors.field("name"), ["Ensure this value has at most 5 characters (it has 7)."]);
        assert_eq!(errors.field("count"), ["Ensure this value is greater than or equal to 1."]);
        assert_eq!(errors.field("day"), ["Ensure this value is less than or equal to 2024-06-01."]);
        assert_eq!(errors.field("link"), ["Enter a valid URL."]);
        assert_eq!(errors.field("size").len(), 1);
        assert_eq!(errors.field("tags").len(), 1);
    }

    #[test]
    fn missing_required_field() {
        let errors = SPEC.clean(&FormData::new(), "", today()).expect_err("name is required");
        assert_eq!(errors.field("name"), [REQUIRED]);
        assert!(errors.field("count").is_empty());
    }

    #[test]
    fn reads_prefixed_keys() {
        let data = FormData::new().with("rows-0-name", "abc").with("name", "ignored!");
        let cleaned = SPEC.clean(&data, "rows-0-", today()).expect("valid");
        assert_eq!(cleaned.text("name").as_deref(), Some("abc"));
        assert!(SPEC.clean(&data, "rows-1-", today()).is_err());
    }

    #[test]
    fn not_a_number() {
        let data = FormData::new().with("name", "a").with("count", "1.5");
        let errors = SPEC.clean(&data, "", today()).expect_err("invalid");
        assert_eq!(errors.field("count"), ["Enter a whole number."]);
    }

    #[test]
    fn url_needs_a_host() {
        assert!(is_http_url("http://a.example"));
        assert!(is_http_url("https://www.youtube.com/watch?v=abc#t=10"));
        assert!(is_http_url("http://127.0.0.1:8080/trailer"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("https://bad host"));
        assert!(!is_http_url("example.com"));
        assert!(!is_http_url("ftp://files.example/trailer.mp4"));
        assert!(!is_http_url("javascript:alert(1)"));
    }

    #[test]
    fn malformed_urls_are_rejected() {
        for value in ["http://:::", "http://a:notaport/", "https://[::1", "http://exa%mple"] {
            assert!(!is_http_url(value), "{value} accepted");
        }
    }
}
