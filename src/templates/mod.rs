pub mod accounts;
pub mod blog;
pub mod catalog;

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{
    entities::user,
    forms::{FieldErrors, FieldKind, FieldSpec, FormData, FormSpec, Options, Widget},
    models::FlashLevel,
    pagination::Page,
    session::Flash,
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
const AUTOCOMPLETE_JS: &str = include_str!("autocomplete.js");

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str = "rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";
const DANGER_CLASS: &str = "rounded-md bg-red-600 px-4 py-2 font-semibold text-white hover:bg-red-700";
const LINK_CLASS: &str = "text-blue-600 hover:text-blue-800";

/// Per-request page furniture: who is signed in and the pending flash message.
#[derive(Clone, Copy, Default)]
pub struct Chrome<'a> {
    pub user: Option<&'a user::Model>,
    pub flash: Option<&'a Flash>,
}

impl Chrome<'_> {
    pub fn is_admin(&self) -> bool {
        self.user.is_some_and(|u| u.is_admin)
    }

    pub fn can_modify(&self, author_id: i32) -> bool {
        self.user.is_some_and(|u| u.is_admin || u.id == author_id)
    }
}

pub fn page(chrome: &Chrome, title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                (nav(chrome))
                main class="max-w-4xl mx-auto px-6 py-10" {
                    @if let Some(flash) = chrome.flash {
                        (flash_banner(flash))
                    }
                    (body)
                }
                script { (PreEscaped(AUTOCOMPLETE_JS)) }
            }
        }
    }
    .into_string()
}

fn nav(chrome: &Chrome) -> Markup {
    html! {
        nav class="bg-white shadow" {
            div class="max-w-4xl mx-auto px-6 py-4 flex items-center justify-between gap-6" {
                div class="flex items-center gap-4 text-sm font-medium text-gray-700" {
                    a class="text-lg font-bold text-gray-900" href="/" { "Films" }
                    a class="hover:text-gray-900" href="/people/" { "People" }
                    a class="hover:text-gray-900" href="/countries/" { "Countries" }
                    a class="hover:text-gray-900" href="/genres/" { "Genres" }
                    a class="hover:text-gray-900" href="/posts/" { "Posts" }
                }
                div class="flex items-center gap-4 text-sm" {
                    @if let Some(user) = chrome.user {
                        span class="text-gray-600" {
                            (user.username)
                            @if user.is_admin { span class="ml-1 text-xs text-gray-400" { "(admin)" } }
                        }
                        form method="post" action="/logout" {
                            button class=(LINK_CLASS) type="submit" { "Sign out" }
                        }
                    } @else {
                        a class=(LINK_CLASS) href="/login" { "Sign in" }
                        a class=(LINK_CLASS) href="/register" { "Register" }
                    }
                }
            }
        }
    }
}

fn flash_banner(flash: &Flash) -> Markup {
    let class = match flash.level {
        FlashLevel::Success => "mb-6 rounded-md border border-green-200 bg-green-50 px-4 py-3 text-green-800",
        FlashLevel::Warning => "mb-6 rounded-md border border-yellow-200 bg-yellow-50 px-4 py-3 text-yellow-800",
    };
    html! { div class=(class) role="status" { (flash.message) } }
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    page(
        &Chrome::default(),
        title,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { (status.as_u16()) " " (title) }
                p class="mt-4 text-gray-700" { (message) }
                a class=(format!("mt-6 inline-block {LINK_CLASS}")) href="/" { "Back" }
            }
        },
    )
}

/// A standalone form page for a single `spec`.
pub struct FormPage<'a> {
    pub title: &'a str,
    pub action: &'a str,
    pub cancel: &'a str,
    pub spec: &'a FormSpec,
    pub data: &'a FormData,
    pub errors: Option<&'a FieldErrors>,
    pub options: &'a Options,
}

pub fn form_page(chrome: &Chrome, form: FormPage) -> String {
    page(
        chrome,
        form.title,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { (form.title) }
                form class="mt-6 space-y-6" method="post" action=(form.action) {
                    (general_errors(form.errors))
                    (fields(form.spec, form.data, "", form.errors, form.options))
                    (form_buttons("Save", form.cancel))
                }
            }
        },
    )
}

pub fn form_buttons(submit: &str, cancel: &str) -> Markup {
    html! {
        div class="flex items-center gap-4" {
            button class=(BUTTON_CLASS) type="submit" { (submit) }
            a class=(LINK_CLASS) href=(cancel) { "Cancel" }
        }
    }
}

pub fn general_errors(errors: Option<&FieldErrors>) -> Markup {
    html! {
        @if let Some(errors) = errors.filter(|e| !e.general().is_empty()) {
            ul class="rounded-md border border-red-200 bg-red-50 px-4 py-3 text-sm text-red-700" {
                @for message in errors.general() { li { (message) } }
            }
        }
    }
}

/// Renders every field of `spec`, keyed `{prefix}{name}`, with the submitted
/// values and their errors.
pub fn fields(
    spec: &FormSpec,
    data: &FormData,
    prefix: &str,
    errors: Option<&FieldErrors>,
    options: &Options,
) -> Markup {
    html! {
        @for field in spec.fields {
            (field_row(field, data, prefix, errors.map(|e| e.field(field.name)).unwrap_or(&[]), options))
        }
    }
}

fn field_row(
    field: &FieldSpec,
    data: &FormData,
    prefix: &str,
    errors: &[String],
    options: &Options,
) -> Markup {
    let key = format!("{prefix}{}", field.name);
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(key) {
                (field.label)
                @if field.required { span class="text-red-500" { " *" } }
            }
            (widget(field, &key, data, options))
            @for message in errors {
                p class="mt-1 text-sm text-red-600" { (message) }
            }
        }
    }
}

fn widget(field: &FieldSpec, key: &str, data: &FormData, options: &Options) -> Markup {
    let value = data.get(key).unwrap_or("");
    let selected = data.get_all(key);
    let related = options.get(field.name).map(Vec::as_slice).unwrap_or(&[]);

    match field.widget {
        Widget::Input => {
            let input_type = match field.kind {
                FieldKind::Integer => "number",
                FieldKind::Url => "url",
                _ => "text",
            };
            html! { input class=(INPUT_CLASS) type=(input_type) name=(key) id=(key) value=(value); }
        },
        Widget::DateInput => {
            html! { input class=(INPUT_CLASS) type="date" name=(key) id=(key) value=(value); }
        },
        Widget::Password => {
            html! { input class=(INPUT_CLASS) type="password" name=(key) id=(key); }
        },
        Widget::TextArea => {
            html! { textarea class=(INPUT_CLASS) name=(key) id=(key) rows="6" { (value) } }
        },
        Widget::Select => html! {
            select class=(INPUT_CLASS) name=(key) id=(key) {
                @if let FieldKind::Choice(choices) = field.kind {
                    @for (code, label) in choices {
                        option value=(code) selected[*code == value] { (label) }
                    }
                } @else {
                    (related_options(related, &selected, !field.required))
                }
            }
        },
        Widget::SelectMultiple => html! {
            select class=(INPUT_CLASS) name=(key) id=(key) multiple size="6" {
                (related_options(related, &selected, false))
            }
        },
        Widget::Autocomplete(url) => html! {
            select class=(INPUT_CLASS) name=(key) id=(key) data-autocomplete-url=(url) {
                (related_options(related, &selected, true))
            }
        },
        Widget::AutocompleteMultiple(url) => html! {
            select class=(INPUT_CLASS) name=(key) id=(key) multiple size="6" data-autocomplete-url=(url) {
                (related_options(related, &selected, false))
            }
        },
    }
}

fn related_options(related: &[(i32, String)], selected: &[&str], blank: bool) -> Markup {
    html! {
        @if blank { option value="" { "---------" } }
        @for (id, label) in related {
            option value=(id) selected[selected.contains(&id.to_string().as_str())] { (label) }
        }
    }
}

/// GET side of every delete endpoint.
pub fn confirm_delete(chrome: &Chrome, what: &str, name: &str, action: &str, cancel: &str) -> String {
    page(
        chrome,
        &format!("Delete {what}"),
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { "Delete " (what) }
                p class="mt-4 text-gray-700" {
                    "Are you sure you want to delete \"" (name) "\"? This cannot be undone."
                }
                form class="mt-6 flex items-center gap-4" method="post" action=(action) {
                    button class=(DANGER_CLASS) type="submit" { "Delete" }
                    a class=(LINK_CLASS) href=(cancel) { "Cancel" }
                }
            }
        },
    )
}

pub fn search_box(action: &str, query: Option<&str>) -> Markup {
    html! {
        form class="mt-6 flex gap-2" method="get" action=(action) {
            input class="w-full rounded-md border border-gray-300 px-3 py-2" type="search" name="query" value=(query.unwrap_or("")) placeholder="Search";
            button class=(BUTTON_CLASS) type="submit" { "Search" }
        }
    }
}

/// Previous / next links preserving the search term.
pub fn pager<T>(page: &Page<T>, base: &str, query: Option<&str>) -> Markup {
    let href = |number: u64| match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{base}?query={}&page={number}", urlencoding::encode(q)),
        None => format!("{base}?page={number}"),
    };
    html! {
        @if page.num_pages > 1 {
            div class="mt-6 flex items-center justify-between text-sm text-gray-600" {
                @if page.has_previous() {
                    a class=(LINK_CLASS) href=(href(page.number - 1)) { "← Previous" }
                } @else { span {} }
                span { "Page " (page.number) " of " (page.num_pages) }
                @if page.has_next() {
                    a class=(LINK_CLASS) href=(href(page.number + 1)) { "Next →" }
                } @else { span {} }
            }
        }
    }
}

/// Edit and delete links for a detail page, shown to those allowed to use them.
pub fn admin_links(show: bool, update: &str, delete: &str) -> Markup {
    html! {
        @if show {
            div class="mt-6 flex gap-4 text-sm" {
                a class=(LINK_CLASS) href=(update) { "Edit" }
                a class="text-red-600 hover:text-red-800" href=(delete) { "Delete" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{Validator, catalog::FILM_FORM};

    static SPEC: FormSpec = FormSpec {
        fields: &[
            FieldSpec::new("name", "Name", &[Validator::MaxLength(5)]),
            FieldSpec::new("secret", "Secret", &[]).widget(Widget::Password),
        ],
    };

    #[test]
    fn fields_keep_values_and_errors() {
        let data = FormData::new().with("name", "<b>Jo</b>").with("secret", "hunter2");
        let errors = FieldErrors::field_error("name", "Too long.");
        let out = fields(&SPEC, &data, "", Some(&errors), &Options::new()).into_string();

        assert!(out.contains("value=\"&lt;b&gt;Jo&lt;/b&gt;\""));
        assert!(out.contains("Too long."));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn relation_widgets_mark_selected_options() {
        let mut options = Options::new();
        options.insert("genres", vec![(1, "Drama".to_string()), (2, "Horror".to_string())]);
        let data = FormData::new().with("genres", "2");
        let out = fields(&FILM_FORM, &data, "", None, &options).into_string();

        assert!(out.contains(r#"<option value="2" selected>Horror</option>"#));
        assert!(out.contains(r#"<option value="1">Drama</option>"#));
        assert!(out.contains(r#"data-autocomplete-url="/people/autocomplete""#));
    }

    #[test]
    fn pages_carry_the_autocomplete_script() {
        let out = page(&Chrome::default(), "Films", html! { p { "x" } });
        assert!(out.contains("select[data-autocomplete-url]"));
        assert!(out.contains("data.pagination.more"));
    }

    #[test]
    fn error_page_shows_status() {
        let out = error_page(StatusCode::NOT_FOUND, "Film not found");
        assert!(out.contains("404 Not Found"));
        assert!(out.contains("Film not found"));
    }
}
