use axum::{
    Json,
    extract::{Form, Path, Query, State},
    http::Uri,
    response::Response,
};
use tracing::instrument;

use super::{AutocompleteQuery, ListQuery, today};
use crate::{
    AppState,
    error::{AppResult, SaveError, SaveResult},
    forms::{
        FieldErrors, FormData, Options,
        catalog::{COUNTRY_FORM, NameInput, country_data},
    },
    models::AutocompleteResponse,
    session::{Flash, Session},
    templates::{
        self, FormPage,
        catalog::{COUNTRIES, named_detail, named_list},
    },
};

#[instrument(skip(state, session))]
pub async fn list(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let rows: Vec<_> = state.catalog.countries().await?.into_iter().map(|c| (c.id, c.name)).collect();
    let html = named_list(&session.chrome(), &COUNTRIES, &rows);
    Ok(session.render(html))
}

#[instrument(skip(state, session, query))]
pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let country = state.catalog.country(id).await?;
    let films = state.catalog.country_films(&country, query.page.as_deref()).await?;
    let html = named_detail(&session.chrome(), &COUNTRIES, country.id, &country.name, &films);
    Ok(session.render(html))
}

#[instrument(skip(state))]
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(query): Query<AutocompleteQuery>,
) -> AppResult<Json<AutocompleteResponse>> {
    let response = state
        .catalog
        .autocomplete_countries(query.q.as_deref().unwrap_or(""), query.page.as_deref())
        .await?;
    Ok(Json(response))
}

fn form(session: &Session, title: &str, action: &str, cancel: &str, data: &FormData, errors: Option<&FieldErrors>) -> String {
    templates::form_page(
        &session.chrome(),
        FormPage { title, action, cancel, spec: &COUNTRY_FORM, data, errors, options: &Options::new() },
    )
}

#[instrument(skip(session))]
pub async fn create_form(session: Session, uri: Uri) -> AppResult<Response> {
    let session = session.require_admin(uri.path())?;
    let html = form(&session, "New country", "/countries/create", "/countries/", &FormData::new(), None);
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
        let input = NameInput::parse(&COUNTRY_FORM, &data, today())?;
        state.catalog.create_country(input).await
    }
    .await;

    match saved {
        Ok(country) => Ok(session.redirect_with(
            Flash::success(format!("Country \"{}\" was added.", country.name)),
            &format!("/countries/{}/", country.id),
        )),
        Err(SaveError::Invalid(errors)) => {
            let html = form(&session, "New country", "/countries/create", "/countries/", &data, Some(&errors));
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
    let country = state.catalog.country(id).await?;
    let html = form(
        &session,
        &format!("Edit {}", country.name),
        uri.path(),
        &format!("/countries/{id}/"),
        &country_data(&country),
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
    let country = state.catalog.country(id).await?;
    let title = format!("Edit {}", country.name);
    let saved: SaveResult<_> = async {
        let input = NameInput::parse(&COUNTRY_FORM, &data, today())?;
        state.catalog.update_country(country, input).await
    }
    .await;

    match saved {
        Ok(country) => Ok(session.redirect_with(
            Flash::success(format!("Country \"{}\" was updated.", country.name)),
            &format!("/countries/{id}/"),
        )),
        Err(SaveError::Invalid(errors)) => {
            let html = form(&session, &title, uri.path(), &format!("/countries/{id}/"), &data, Some(&errors));
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
    let country = state.catalog.country(id).await?;
    let html = templates::confirm_delete(
        &session.chrome(),
        "country",
        &country.name,
        uri.path(),
        &format!("/countries/{id}/"),
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
    let country = state.catalog.country(id).await?;
    let name = country.name.clone();
    state.catalog.delete_country(country).await?;
    Ok(session.redirect_with(Flash::success(format!("Country \"{name}\" was deleted.")), "/countries/"))
}
