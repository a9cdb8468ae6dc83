use axum::{
    extract::{Form, Path, Query, State},
    http::Uri,
    response::Response,
};
use tracing::instrument;

use super::{ListQuery, today};
use crate::{
    AppState,
    error::{AppResult, SaveError, SaveResult},
    forms::{
        FieldErrors, FormData, Options,
        catalog::{FILM_FORM, FilmInput, film_data},
    },
    session::{Flash, Session},
    templates::{
        self, FormPage,
        catalog::{film_page, films_page},
    },
};

#[instrument(skip(state, session))]
pub async fn list(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let films = state.catalog.films(query.query.as_deref(), query.page.as_deref()).await?;
    let html = films_page(&session.chrome(), &films, query.query.as_deref());
    Ok(session.render(html))
}

#[instrument(skip(state, session))]
pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let detail = state.catalog.film_detail(id).await?;
    let html = film_page(&session.chrome(), &detail);
    Ok(session.render(html))
}

struct FilmForm<'a> {
    title: &'a str,
    action: &'a str,
    cancel: &'a str,
}

fn form(
    session: &Session,
    film: FilmForm,
    data: &FormData,
    errors: Option<&FieldErrors>,
    options: &Options,
) -> String {
    templates::form_page(
        &session.chrome(),
        FormPage {
            title: film.title,
            action: film.action,
            cancel: film.cancel,
            spec: &FILM_FORM,
            data,
            errors,
            options,
        },
    )
}

#[instrument(skip(state, session))]
pub async fn create_form(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
) -> AppResult<Response> {
    let session = session.require_admin(uri.path())?;
    let options = state.catalog.film_options().await?;
    let target = FilmForm { title: "New film", action: "/films/create", cancel: "/films/" };
    let html = form(&session, target, &FormData::new(), None, &options);
    Ok(session.render(html))
}

#[instrument(skip(state, session, data))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Form(data): Form<FormData>,
) -> AppResult<Response> {
    let session = session.require_admin(uri.path())?;
    let saved: SaveResult<_> = async {
        let input = FilmInput::parse(&data, today())?;
        state.catalog.create_film(input).await
    }
    .await;

    match saved {
        Ok(film) => Ok(session.redirect_with(
            Flash::success(format!("\"{}\" was added.", film.name)),
            &format!("/films/{}/", film.id),
        )),
        Err(SaveError::Invalid(errors)) => {
            let options = state.catalog.film_options().await?;
            let target = FilmForm { title: "New film", action: "/films/create", cancel: "/films/" };
            let html = form(&session, target, &data, Some(&errors), &options);
            Ok(session.render_invalid(html))
        },
        Err(SaveError::App(err)) => Err(err),
    }
}

#[instrument(skip(state, session))]
pub async fn update_form(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let session = session.require_admin(uri.path())?;
    let film = state.catalog.film(id).await?;
    let (genre_ids, people_ids) = state.catalog.film_links(&film).await?;
    let options = state.catalog.film_options().await?;

    let title = format!("Edit {}", film.name);
    let cancel = format!("/films/{id}/");
    let target = FilmForm { title: &title, action: uri.path(), cancel: &cancel };
    let html = form(&session, target, &film_data(&film, &genre_ids, &people_ids), None, &options);
    Ok(session.render(html))
}

#[instrument(skip(state, session, data))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i32>,
    Form(data): Form<FormData>,
) -> AppResult<Response> {
    let session = session.require_admin(uri.path())?;
    let film = state.catalog.film(id).await?;
    let title = format!("Edit {}", film.name);
    let saved: SaveResult<_> = async {
        let input = FilmInput::parse(&data, today())?;
        state.catalog.update_film(film, input).await
    }
    .await;

    match saved {
        Ok(film) => Ok(session.redirect_with(
            Flash::success(format!("\"{}\" was updated.", film.name)),
            &format!("/films/{id}/"),
        )),
        Err(SaveError::Invalid(errors)) => {
            let options = state.catalog.film_options().await?;
            let cancel = format!("/films/{id}/");
            let target = FilmForm { title: &title, action: uri.path(), cancel: &cancel };
            let html = form(&session, target, &data, Some(&errors), &options);
            Ok(session.render_invalid(html))
        },
        Err(SaveError::App(err)) => Err(err),
    }
}

#[instrument(skip(state, session))]
pub async fn delete_form(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let session = session.require_admin(uri.path())?;
    let film = state.catalog.film(id).await?;
    let html = templates::confirm_delete(
        &session.chrome(),
        "film",
        &film.name,
        uri.path(),
        &format!("/films/{id}/"),
    );
    Ok(session.render(html))
}

#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let session = session.require_admin(uri.path())?;
    let film = state.catalog.film(id).await?;
    let name = film.name.clone();
    state.catalog.delete_film(film).await?;
    Ok(session.redirect_with(Flash::success(format!("\"{name}\" was deleted.")), "/films/"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{self, TestApp, body_text, location, set_cookie};

    async fn fixtures(app: &TestApp) -> String {
        let uk = test_support::country(&app.db, "UK").await;
        let horror = test_support::genre(&app.db, "Horror").await;
        let scott = test_support::person(&app.db, "Ridley Scott").await;
        format!("name=Alien&country={}&genres={}&director={}&people={}", uk.id, horror.id, scott.id, scott.id)
    }

    #[tokio::test]
    async fn year_has_a_lower_bound() {
        let app = TestApp::new().await;
        let admin = test_support::user(&app.db, "boss", true).await;
        let cookie = app.cookie_for(&admin);
        let body = fixtures(&app).await;

        let response = app.post_form("/films/create", Some(&cookie), &format!("{body}&year=1884")).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("greater than or equal to 1885"));

        let response = app.post_form("/films/create", Some(&cookie), &format!("{body}&year=1885")).await;
        let url = location(&response).to_string();
        assert!(set_cookie(&response, "_flash").is_some());

        let page = body_text(app.get(&url, None).await).await;
        assert!(page.contains("Alien"));
        assert!(page.contains("Ridley Scott"));
        assert!(page.contains("Horror"));
    }

    #[tokio::test]
    async fn home_page_lists_films() {
        let app = TestApp::new().await;
        let uk = test_support::country(&app.db, "UK").await;
        let horror = test_support::genre(&app.db, "Horror").await;
        let scott = test_support::person(&app.db, "Ridley Scott").await;
        test_support::film(&app.db, "Alien", &uk, &horror, &scott).await;

        let response = app.get("/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Alien"));
    }

    #[tokio::test]
    async fn missing_film_is_not_found() {
        let app = TestApp::new().await;
        let response = app.get("/films/42/", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
