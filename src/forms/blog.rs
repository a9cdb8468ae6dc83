use std::collections::BTreeMap;

use jiff::civil::Date;

use super::{FieldErrors, FieldKind, FieldSpec, FormData, FormSpec, Validator, Widget};
use crate::{
    entities::{comment, post, section},
    models::ImagePosition,
};

pub static POST_FORM: FormSpec = FormSpec {
    fields: &[
        FieldSpec::new("name", "Title", &[Validator::MaxLength(250)]),
        FieldSpec::new("icon", "Icon", &[Validator::MaxLength(255)]).optional(),
    ],
};

pub static SECTION_FORM: FormSpec = FormSpec {
    fields: &[
        FieldSpec::new("name", "Heading", &[Validator::MaxLength(250)]),
        FieldSpec::new("body", "Text", &[]).widget(Widget::TextArea),
        FieldSpec::new("position", "Position", &[]).kind(FieldKind::Integer),
        FieldSpec::new("image", "Image", &[Validator::MaxLength(255)]).optional(),
        FieldSpec::new("image_position", "Image placement", &[])
            .kind(FieldKind::Choice(ImagePosition::CHOICES))
            .widget(Widget::Select),
    ],
};

pub static COMMENT_FORM: FormSpec =
    FormSpec { fields: &[FieldSpec::new("body", "Comment", &[]).widget(Widget::TextArea)] };

pub const SECTIONS_PREFIX: &str = "sections";
pub const MAX_SECTION_ROWS: usize = 100;

pub fn total_forms_key() -> String {
    format!("{SECTIONS_PREFIX}-TOTAL_FORMS")
}

pub fn row_prefix(index: usize) -> String {
    format!("{SECTIONS_PREFIX}-{index}-")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostInput {
    pub name: String,
    pub icon: Option<String>,
}

impl PostInput {
    pub fn parse(data: &FormData, today: Date) -> Result<Self, FieldErrors> {
        let cleaned = POST_FORM.clean(data, "", today)?;
        Ok(Self { name: cleaned.text("name").unwrap_or_default(), icon: cleaned.text("icon") })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentInput {
    pub body: String,
}

impl CommentInput {
    pub fn parse(data: &FormData, today: Date) -> Result<Self, FieldErrors> {
        let cleaned = COMMENT_FORM.clean(data, "", today)?;
        Ok(Self { body: cleaned.text("body").unwrap_or_default() })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionInput {
    pub name: String,
    pub body: String,
    pub position: i32,
    pub image: Option<String>,
    pub image_position: ImagePosition,
}

/// One row of a submitted section formset, resolved against the row's id and
/// delete flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SectionChange {
    Insert(SectionInput),
    Update(i32, SectionInput),
    Delete(i32),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormsetErrors {
    rows: BTreeMap<usize, FieldErrors>,
    general: Vec<String>,
}

impl FormsetErrors {
    pub fn general_error(message: impl Into<String>) -> Self {
        Self { rows: BTreeMap::new(), general: vec![message.into()] }
    }

    pub fn row(&self, index: usize) -> Option<&FieldErrors> {
        self.rows.get(&index)
    }

    pub fn general(&self) -> &[String] {
        &self.general
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.general.is_empty()
    }
}

/// Parses every row of the section formset. Nothing is returned unless all
/// rows are valid.
pub fn parse_sections(data: &FormData, today: Date) -> Result<Vec<SectionChange>, FormsetErrors> {
    let total = data
        .get(&total_forms_key())
        .and_then(|v| v.trim().parse::<usize>().ok())
        .ok_or_else(|| {
            FormsetErrors::general_error("Section data is missing or has been tampered with.")
        })?;
    if total > MAX_SECTION_ROWS {
        return Err(FormsetErrors::general_error(format!(
            "Please submit at most {MAX_SECTION_ROWS} sections."
        )));
    }

    let mut errors = FormsetErrors::default();
    let mut changes = Vec::new();
    let mut seen_ids = Vec::new();

    for index in 0..total {
        let prefix = row_prefix(index);
        let id = match data.get(&format!("{prefix}id")).map(str::trim).filter(|v| !v.is_empty()) {
            None => None,
            Some(raw) => match raw.parse::<i32>() {
                Ok(id) if id > 0 => Some(id),
                _ => {
                    errors.rows.insert(index, FieldErrors::field_error("id", "Invalid section id."));
                    continue;
                },
            },
        };

        if let Some(id) = id {
            if seen_ids.contains(&id) {
                errors.general.push(format!("Section {id} was submitted more than once."));
                continue;
            }
            seen_ids.push(id);
        }

        if is_checked(data.get(&format!("{prefix}DELETE"))) {
            if let Some(id) = id {
                changes.push(SectionChange::Delete(id));
            }
            continue;
        }

        if id.is_none() && row_is_blank(data, &prefix) {
            continue;
        }

        match SECTION_FORM.clean(data, &prefix, today) {
            Ok(cleaned) => {
                let input = SectionInput {
                    name: cleaned.text("name").unwrap_or_default(),
                    body: cleaned.text("body").unwrap_or_default(),
                    position: cleaned.int("position").unwrap_or_default() as i32,
                    image: cleaned.text("image"),
                    image_position: cleaned
                        .text("image_position")
                        .and_then(|code| ImagePosition::from_code(&code))
                        .unwrap_or_default(),
                };
                changes.push(match id {
                    Some(id) => SectionChange::Update(id, input),
                    None => SectionChange::Insert(input),
                });
            },
            Err(row_errors) => {
                errors.rows.insert(index, row_errors);
            },
        }
    }

    if errors.is_empty() { Ok(changes) } else { Err(errors) }
}

/// Spare rows are left blank by the user; their placement select always
/// submits a value, so it does not count.
fn row_is_blank(data: &FormData, prefix: &str) -> bool {
    SECTION_FORM
        .fields
        .iter()
        .filter(|f| !matches!(f.kind, FieldKind::Choice(_)))
        .all(|f| data.get(&format!("{prefix}{}", f.name)).is_none_or(|v| v.trim().is_empty()))
}

fn is_checked(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some(v) if !v.is_empty() && v != "false" && v != "off" && v != "0")
}

/// URL-safe slug derived from a post title.
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug.trim_end_matches('-').chars().take(250).collect();
    if slug.is_empty() { "post".to_string() } else { slug }
}

pub fn post_data(post: &post::Model) -> FormData {
    FormData::new().with("name", &post.name).with_opt("icon", post.icon.as_ref())
}

pub fn comment_data(comment: &comment::Model) -> FormData {
    FormData::new().with("body", &comment.body)
}

/// Formset fields for the existing `sections` followed by `extra` blank rows.
pub fn sections_data(sections: &[section::Model], extra: usize) -> FormData {
    let mut data = FormData::new().with(total_forms_key(), (sections.len() + extra).to_string());
    for (index, section) in sections.iter().enumerate() {
        let prefix = row_prefix(index);
        data.push(format!("{prefix}id"), section.id.to_string());
        data.push(format!("{prefix}name"), &section.name);
        data.push(format!("{prefix}body"), &section.body);
        data.push(format!("{prefix}position"), section.position.to_string());
        if let Some(image) = &section.image {
            data.push(format!("{prefix}image"), image);
        }
        data.push(format!("{prefix}image_position"), &section.image_position);
    }
    for index in sections.len()..sections.len() + extra {
        data.push(format!("{}image_position", row_prefix(index)), ImagePosition::default().as_code());
    }
    data
}

/// Number of rows a formset submission claims, clamped to what can be shown.
pub fn row_count(data: &FormData) -> usize {
    data.get(&total_forms_key())
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0)
        .min(MAX_SECTION_ROWS)
}
