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
        catalog::{PERSON_FORM, PersonInput, person_data},
    },
    models::AutocompleteResponse,
    session::{Flash, Session},
    templates::{
        self, FormPage,
        catalog::{people_page, person_page},
    },
};

#[instrument(skip(state, session))]
pub async fn list(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let people = state.catalog.people(query.query.as_deref(), query.page.as_deref()).await?;
    let html = people_page(&session.chrome(), &people, query.query.as_deref());
    Ok(session.render(html))
}

#[instrument(skip(state, session))]
pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let detail = state.catalog.person_detail(id).await?;
    let html = person_page(&session.chrome(), &detail, today());
    Ok(session.render(html))
}

#[instrument(skip(state))]
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(query): Query<AutocompleteQuery>,
) -> AppResult<Json<AutocompleteResponse>> {
    let response = state
        .catalog
        .autocomplete_people(query.q.as_deref().unwrap_or(""), query.page.as_deref())
        .await?;
    Ok(Json(response))
}

fn form(session: &Session, title: &str, action: &str, cancel: &str, data: &FormData, errors: Option<&FieldErrors>) -> String {
    templates::form_page(
        &session.chrome(),
        FormPage { title, action, cancel, spec: &PERSON_FORM, data, errors, options: &Options::new() },
    )
}

#[instrument(skip(session))]
pub async fn create_form(session: Session, uri: Uri) -> AppResult<Response> {
    let session = session.require_admin(uri.path())?;
    let html = form(&session, "New person", "/people/create", "/people/", &FormData::new(), None);
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
        let input = PersonInput::parse(&data, today())?;
        state.catalog.create_person(input).await
    }
    .await;

    match saved {
        Ok(person) => Ok(session.redirect_with(
            Flash::success(format!("\"{}\" was added.", person.name)),
            &format!("/people/{}/", person.id),
        )),
        Err(SaveError::Invalid(errors)) => {
            let html = form(&session, "New person", "/people/create", "/people/", &data, Some(&errors));
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
    let person = state.catalog.person(id).await?;
    let html = form(
        &session,
        &format!("Edit {}", person.name),
        uri.path(),
        &format!("/people/{id}/"),
        &person_data(&person),
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
    let person = state.catalog.person(id).await?;
    let title = format!("Edit {}", person.name);
    let saved: SaveResult<_> = async {
        let input = PersonInput::parse(&data, today())?;
        state.catalog.update_person(person, input).await
    }
    .await;

    match saved {
        Ok(person) => Ok(session.redirect_with(
            Flash::success(format!("\"{}\" was updated.", person.name)),
            &format!("/people/{id}/"),
        )),
        Err(SaveError::Invalid(errors)) => {
            let html = form(&session, &title, uri.path(), &format!("/people/{id}/"), &data, Some(&errors));
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
    let person = state.catalog.person(id).await?;
    let html = templates::confirm_delete(
        &session.chrome(),
        "person",
        &person.name,
        uri.path(),
        &format!("/people/{id}/"),
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
    let person = state.catalog.person(id).await?;
    let name = person.name.clone();
    state.catalog.delete_person(person).await?;
    Ok(session.redirect_with(Flash::success(format!("\"{name}\" was deleted.")), "/people/"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::{
        routes::today,
        test_support::{self, TestApp, body_text, location},
    };

    #[tokio::test]
    async fn future_birthday_is_rejected() {
        let app = TestApp::new().await;
        let admin = test_support::user(&app.db, "boss", true).await;
        let cookie = app.cookie_for(&admin);
        let tomorrow = today().tomorrow().unwrap();

        let body = format!("name=Jodie+Foster&birthday={tomorrow}");
        let response = app.post_form("/people/create", Some(&cookie), &body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Ensure this value is less than or equal to"));

        let body = format!("name=Jodie+Foster&birthday={}", today());
        let response = app.post_form("/people/create", Some(&cookie), &body).await;
        assert!(location(&response).starts_with("/people/"));
    }

    #[tokio::test]
    async fn list_filters_by_query() {
        let app = TestApp::new().await;
        for name in ["Jodie Foster", "Anthony Hopkins", "Scott Glenn"] {
            test_support::person(&app.db, name).await;
        }

        let response = app.get("/people/?query=HOP", None).await;
        let body = body_text(response).await;
        assert!(body.contains("Anthony Hopkins"));
        assert!(!body.contains("Jodie Foster"));
    }

    #[tokio::test]
    async fn list_page_out_of_range_shows_boundary_page() {
        let app = TestApp::new().await;
        for i in 0..12 {
            test_support::person(&app.db, &format!("Person {i:02}")).await;
        }

        let last = body_text(app.get("/people/?page=2", None).await).await;
        let beyond = body_text(app.get("/people/?page=99", None).await).await;
        assert!(beyond.contains("Page 2 of 2"));
        assert_eq!(last, beyond);

        let first = body_text(app.get("/people/?page=0", None).await).await;
        assert!(first.contains("Person 00"));
        assert!(first.contains("Page 1 of 2"));
    }
}
