mod accounts;
mod comments;
mod countries;
mod films;
mod genres;
mod people;
mod posts;

use axum::{
    Router,
    routing::{get, post},
};
use jiff::civil::Date;
use serde::Deserialize;

use crate::AppState;

/// `?query=&page=` on list views.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub query: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AutocompleteQuery {
    pub q: Option<String>,
    pub page: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(films::list))
        .route("/films/", get(films::list))
        .route("/films/create", get(films::create_form).post(films::create))
        .route("/films/{id}/", get(films::detail))
        .route("/films/{id}/update", get(films::update_form).post(films::update))
        .route("/films/{id}/delete", get(films::delete_form).post(films::delete))
        .route("/countries/", get(countries::list))
        .route("/countries/autocomplete", get(countries::autocomplete))
        .route("/countries/create", get(countries::create_form).post(countries::create))
        .route("/countries/{id}/", get(countries::detail))
        .route("/countries/{id}/update", get(countries::update_form).post(countries::update))
        .route("/countries/{id}/delete", get(countries::delete_form).post(countries::delete))
        .route("/genres/", get(genres::list))
        .route("/genres/create", get(genres::create_form).post(genres::create))
        .route("/genres/{id}/", get(genres::detail))
        .route("/genres/{id}/update", get(genres::update_form).post(genres::update))
        .route("/genres/{id}/delete", get(genres::delete_form).post(genres::delete))
        .route("/people/", get(people::list))
        .route("/people/autocomplete", get(people::autocomplete))
        .route("/people/create", get(people::create_form).post(people::create))
        .route("/people/{id}/", get(people::detail))
        .route("/people/{id}/update", get(people::update_form).post(people::update))
        .route("/people/{id}/delete", get(people::delete_form).post(people::delete))
        .route("/posts/", get(posts::list))
        .route("/post/create", get(posts::create_form).post(posts::create))
        .route("/posts/{id}/", get(posts::detail).post(comments::create))
        .route("/posts/{id}/update", get(posts::update_form).post(posts::update))
        .route("/posts/{id}/delete", get(posts::delete_form).post(posts::delete))
        .route(
            "/posts/{post_id}/comment/{comment_id}/update",
            get(comments::update_form).post(comments::update),
        )
        .route(
            "/posts/{post_id}/comment/{comment_id}/delete",
            get(comments::delete_form).post(comments::delete),
        )
        .route("/login", get(accounts::login_form).post(accounts::login))
        .route("/logout", post(accounts::logout))
        .route("/register", get(accounts::register_form).post(accounts::register))
        .with_state(state)
}

pub fn today() -> Date {
    jiff::Zoned::now().date()
}
