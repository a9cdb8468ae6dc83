use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ImagePosition {
    Left,
    Right,
    #[default]
    BeforeTitle,
    AfterTitle,
    Bottom,
}

impl ImagePosition {
    pub const CHOICES: &'static [(&'static str, &'static str)] = &[
        ("L", "Left"),
        ("R", "Right"),
        ("BT", "Before title"),
        ("AT", "After title"),
        ("B", "Bottom"),
    ];

    pub fn as_code(self) -> &'static str {
        match self {
            ImagePosition::Left => "L",
            ImagePosition::Right => "R",
            ImagePosition::BeforeTitle => "BT",
            ImagePosition::AfterTitle => "AT",
            ImagePosition::Bottom => "B",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "L" => Some(ImagePosition::Left),
            "R" => Some(ImagePosition::Right),
            "BT" => Some(ImagePosition::BeforeTitle),
            "AT" => Some(ImagePosition::AfterTitle),
            "B" => Some(ImagePosition::Bottom),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Warning,
}

/// One item of an autocomplete response, in the shape select widgets expect.
#[derive(Clone, Debug, Serialize)]
pub struct AutocompleteItem {
    pub id: String,
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct AutocompletePagination {
    pub more: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct AutocompleteResponse {
    pub results: Vec<AutocompleteItem>,
    pub pagination: AutocompletePagination,
}
