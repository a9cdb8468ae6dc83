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
        catalog::{GENRE_FORM, NameInput, genre_data},
    },
    session::{Flash, Session},
    templates::{
        self, FormPage,
        catalog::{GENRES, named_detail, named_list},
    },
};

#[instrument(skip(state, session))]
pub async fn list(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let rows: Vec<_> = state.catalog.genres().await?.into_iter().map(|g| (g.id, g.name)).collect();
    let html = named_list(&session.chrome(), &GENRES, &rows);
    Ok(session.render(html))
}

#[instrument(skip(state, session, query))]
pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let genre = state.catalog.genre(id).await?;
    let films = state.catalog.genre_films(&genre, query.page.as_deref()).await?;
    let html = named_detail(&session.chrome(), &GENRES, genre.id, &genre.name, &films);
    Ok(session.render(html))
}

fn form(session: &Session, title: &str, action: &str, cancel: &str, data: &FormData, errors: Option<&FieldErrors>) -> String {
    templates::form_page(
        &session.chrome(),
        FormPage { title, action, cancel, spec: &GENRE_FORM, data, errors, options: &Options::new() },
    )
}

#[instrument(skip(session))]
pub async fn create_form(session: Session, uri: Uri) -> AppResult<Response> {
    let session = session.require_admin(uri.path())?;
    let html = form(&session, "New genre", "/genres/create", "/genres/", &FormData::new(), None);
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
        let input = NameInput::parse(&GENRE_FORM, &data, today())?;
        state.catalog.create_genre(input).await
    }
    .await;

    match saved {
        Ok(genre) => Ok(session.redirect_with(
            Flash::success(format!("Genre \"{}\" was added.", genre.name)),
            &format!("/genres/{}/", genre.id),
        )),
        Err(SaveError::Invalid(errors)) => {
            let html = form(&session, "New genre", "/genres/create", "/genres/", &data, Some(&errors));
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
    let genre = state.catalog.genre(id).await?;
    let html = form(
        &session,
        &format!("Edit {}", genre.name),
        uri.path(),
        &format!("/genres/{id}/"),
        &genre_data(&genre),
        None,
    );
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
    let genre = state.catalog.genre(id).await?;
    let title = format!("Edit {}", genre.name);
    let saved: SaveResult<_> = async {
        let input = NameInput::parse(&GENRE_FORM, &data, today())?;
        state.catalog.update_genre(genre, input).await
    }
    .await;

    match saved {
        Ok(genre) => Ok(session.redirect_with(
            Flash::success(format!("Genre \"{}\" was updated.", genre.name)),
            &format!("/genres/{id}/"),
        )),
        Err(SaveError::Invalid(errors)) => {
            let html = form(&session, &title, uri.path(), &format!("/genres/{id}/"), &data, Some(&errors));
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
    let genre = state.catalog.genre(id).await?;
    let html = templates::confirm_delete(
        &session.chrome(),
        "genre",
        &genre.name,
        uri.path(),
        &format!("/genres/{id}/"),
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
    let genre = state.catalog.genre(id).await?;
    let name = genre.name.clone();
    state.catalog.delete_genre(genre).await?;
    Ok(session.redirect_with(Flash::success(format!("Genre \"{name}\" was deleted.")), "/genres/"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{self, TestApp, body_text, location};

    #[tokio::test]
    async fn non_admin_update_changes_nothing() {
        let app = TestApp::new().await;
        let user = test_support::user(&app.db, "reader", false).await;
        let drama = test_support::genre(&app.db, "Drama").await;
        let cookie = app.cookie_for(&user);

        let url = format!("/genres/{}/update", drama.id);
        let response = app.post_form(&url, Some(&cookie), "name=Comedy").await;
        assert!(location(&response).starts_with("/login?next="));
        assert_eq!(app.state.catalog.genre(drama.id).await.unwrap().name, "Drama");
    }

    #[tokio::test]
    async fn admin_renames_genre() {
        let app = TestApp::new().await;
        let admin = test_support::user(&app.db, "boss", true).await;
        let drama = test_support::genre(&app.db, "Drama").await;
        let cookie = app.cookie_for(&admin);

        let url = format!("/genres/{}/update", drama.id);
        let response = app.get(&url, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"value="Drama""#));

        let response = app.post_form(&url, Some(&cookie), "name=Melodrama").await;
        assert_eq!(location(&response), format!("/genres/{}/", drama.id));
        assert_eq!(app.state.catalog.genre(drama.id).await.unwrap().name, "Melodrama");
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let app = TestApp::new().await;
        let admin = test_support::user(&app.db, "boss", true).await;
        let cookie = app.cookie_for(&admin);

        let response = app.post_form("/genres/create", Some(&cookie), "name=++").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("This field is required."));
        assert!(app.state.catalog.genres().await.unwrap().is_empty());
    }
}
