use jiff::civil::Date;

use super::{FieldErrors, FieldKind, FieldSpec, FormData, FormSpec, Validator, Widget};
use crate::entities::{country, film, genre, person};

pub const COUNTRY_AUTOCOMPLETE: &str = "/countries/autocomplete";
pub const PERSON_AUTOCOMPLETE: &str = "/people/autocomplete";

pub static COUNTRY_FORM: FormSpec =
    FormSpec { fields: &[FieldSpec::new("name", "Name", &[Validator::MaxLength(200)])] };

pub static GENRE_FORM: FormSpec =
    FormSpec { fields: &[FieldSpec::new("name", "Name", &[Validator::MaxLength(200)])] };

pub static PERSON_FORM: FormSpec = FormSpec {
    fields: &[
        FieldSpec::new("name", "Name", &[Validator::MaxLength(400)]),
        FieldSpec::new("origin_name", "Original name", &[Validator::MaxLength(400)]).optional(),
        FieldSpec::new("birthday", "Birthday", &[Validator::NotAfterToday])
            .kind(FieldKind::Date)
            .widget(Widget::DateInput)
            .optional(),
        FieldSpec::new("photo", "Photo", &[Validator::MaxLength(255)]).optional(),
        FieldSpec::new("kinopoisk_id", "Kinopoisk ID", &[Validator::MinValue(0)])
            .kind(FieldKind::Integer)
            .optional(),
    ],
};

pub const EARLIEST_FILM_YEAR: i64 = 1885;

pub static FILM_FORM: FormSpec = FormSpec {
    fields: &[
        FieldSpec::new("name", "Title", &[Validator::MaxLength(1024)]),
        FieldSpec::new("origin_name", "Original title", &[Validator::MaxLength(1024)]).optional(),
        FieldSpec::new("slogan", "Tagline", &[Validator::MaxLength(2048)]).optional(),
        FieldSpec::new("length", "Length (min)", &[Validator::MinValue(0)])
            .kind(FieldKind::Integer)
            .optional(),
        FieldSpec::new("year", "Year", &[Validator::MinValue(EARLIEST_FILM_YEAR)])
            .kind(FieldKind::Integer)
            .optional(),
        FieldSpec::new("trailer_url", "Trailer", &[Validator::MaxLength(200)])
            .kind(FieldKind::Url)
            .optional(),
        FieldSpec::new("cover", "Cover", &[Validator::MaxLength(255)]).optional(),
        FieldSpec::new("description", "Description", &[])
            .widget(Widget::TextArea)
            .optional(),
        FieldSpec::new("country", "Country", &[])
            .kind(FieldKind::ForeignKey)
            .widget(Widget::Autocomplete(COUNTRY_AUTOCOMPLETE)),
        FieldSpec::new("genres", "Genres", &[])
            .kind(FieldKind::ManyToMany)
            .widget(Widget::SelectMultiple),
        FieldSpec::new("director", "Director", &[])
            .kind(FieldKind::ForeignKey)
            .widget(Widget::Autocomplete(PERSON_AUTOCOMPLETE)),
        FieldSpec::new("people", "Cast", &[])
            .kind(FieldKind::ManyToMany)
            .widget(Widget::AutocompleteMultiple(PERSON_AUTOCOMPLETE)),
        FieldSpec::new("kinopoisk_id", "Kinopoisk ID", &[Validator::MinValue(0)])
            .kind(FieldKind::Integer)
            .optional(),
    ],
};

/// Country and genre rows carry nothing but a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameInput {
    pub name: String,
}

impl NameInput {
    pub fn parse(spec: &FormSpec, data: &FormData, today: Date) -> Result<Self, FieldErrors> {
        let cleaned = spec.clean(data, "", today)?;
        Ok(Self { name: cleaned.text("name").unwrap_or_default() })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonInput {
    pub name: String,
    pub origin_name: Option<String>,
    pub birthday: Option<Date>,
    pub photo: Option<String>,
    pub kinopoisk_id: Option<i32>,
}

impl PersonInput {
    pub fn parse(data: &FormData, today: Date) -> Result<Self, FieldErrors> {
        let cleaned = PERSON_FORM.clean(data, "", today)?;
        Ok(Self {
            name: cleaned.text("name").unwrap_or_default(),
            origin_name: cleaned.text("origin_name"),
            birthday: cleaned.date("birthday"),
            photo: cleaned.text("photo"),
            kinopoisk_id: cleaned.int("kinopoisk_id").map(|n| n as i32),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilmInput {
    pub name: String,
    pub origin_name: Option<String>,
    pub slogan: Option<String>,
    pub length: Option<i32>,
    pub year: Option<i32>,
    pub trailer_url: Option<String>,
    pub cover: Option<String>,
    pub description: Option<String>,
    pub country_id: i32,
    pub genre_ids: Vec<i32>,
    pub director_id: i32,
    pub people_ids: Vec<i32>,
    pub kinopoisk_id: Option<i32>,
}

impl FilmInput {
    pub fn parse(data: &FormData, today: Date) -> Result<Self, FieldErrors> {
        let cleaned = FILM_FORM.clean(data, "", today)?;
        Ok(Self {
            name: cleaned.text("name").unwrap_or_default(),
            origin_name: cleaned.text("origin_name"),
            slogan: cleaned.text("slogan"),
            length: cleaned.int("length").map(|n| n as i32),
            year: cleaned.int("year").map(|n| n as i32),
            trailer_url: cleaned.text("trailer_url"),
            cover: cleaned.text("cover"),
            description: cleaned.text("description"),
            country_id: cleaned.id("country").unwrap_or_default(),
            genre_ids: cleaned.ids("genres"),
            director_id: cleaned.id("director").unwrap_or_default(),
            people_ids: cleaned.ids("people"),
            kinopoisk_id: cleaned.int("kinopoisk_id").map(|n| n as i32),
        })
    }
}

pub fn country_data(country: &country::Model) -> FormData {
    FormData::new().with("name", &country.name)
}

pub fn genre_data(genre: &genre::Model) -> FormData {
    FormData::new().with("name", &genre.name)
}

pub fn person_data(person: &person::Model) -> FormData {
    FormData::new()
        .with("name", &person.name)
        .with_opt("origin_name", person.origin_name.as_ref())
        .with_opt("birthday", person.birthday.as_ref())
        .with_opt("photo", person.photo.as_ref())
        .with_opt("kinopoisk_id", person.kinopoisk_id)
}

pub fn film_data(film: &film::Model, genre_ids: &[i32], people_ids: &[i32]) -> FormData {
    let mut data = FormData::new()
        .with("name", &film.name)
        .with_opt("origin_name", film.origin_name.as_ref())
        .with_opt("slogan", film.slogan.as_ref())
        .with_opt("length", film.length)
        .with_opt("year", film.year)
        .with_opt("trailer_url", film.trailer_url.as_ref())
        .with_opt("cover", film.cover.as_ref())
        .with_opt("description", film.description.as_ref())
        .with("country", film.country_id.to_string())
        .with("director", film.director_id.to_string())
        .with_opt("kinopoisk_id", film.kinopoisk_id);
    for id in genre_ids {
        data.push("genres", id.to_string());
    }
    for id in people_ids {
        data.push("people", id.to_string());
    }
    data
}
