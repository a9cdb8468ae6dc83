use axum::{
    extract::{Form, Query, State},
    response::Response,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::today;
use crate::{
    AppState,
    error::{AppResult, SaveError},
    forms::{FieldErrors, FormData, accounts::Credentials},
    session::{Flash, Session, safe_next},
    templates::accounts::{login_page, register_page},
};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[instrument(skip(session))]
pub async fn login_form(session: Session, Query(query): Query<NextQuery>) -> AppResult<Response> {
    let next = safe_next(query.next.as_deref());
    let html = login_page(&session.chrome(), &FormData::new(), None, next);
    Ok(session.render(html))
}

#[instrument(skip(state, session, data))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
    Form(data): Form<FormData>,
) -> AppResult<Response> {
    let next = safe_next(query.next.as_deref());
    let user = match Credentials::parse_login(&data, today()) {
        Ok(credentials) => state.accounts.authenticate(&credentials).await?.ok_or_else(|| {
            FieldErrors::general_error(
                "Please enter a correct username and password. Note that both fields may be case-sensitive.",
            )
        }),
        Err(errors) => Err(errors),
    };

    match user {
        Ok(user) => {
            info!(user_id = user.id, "signed in");
            let welcome = Flash::success(format!("Welcome back, {}.", user.username));
            Ok(session.sign_in(user).redirect_with(welcome, next))
        },
        Err(errors) => {
            let html = login_page(&session.chrome(), &data.without("password"), Some(&errors), next);
            Ok(session.render_invalid(html))
        },
    }
}

#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Some(user_id) = session.user_id() {
        info!(user_id, "signed out");
    }
    session.sign_out().redirect_with(Flash::success("You have been signed out."), "/")
}

#[instrument(skip(session))]
pub async fn register_form(session: Session) -> AppResult<Response> {
    let html = register_page(&session.chrome(), &FormData::new(), None);
    Ok(session.render(html))
}

#[instrument(skip(state, session, data))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(data): Form<FormData>,
) -> AppResult<Response> {
    let saved = match Credentials::parse_registration(&data, today()) {
        Ok(credentials) => state.accounts.register(&credentials).await,
        Err(errors) => Err(SaveError::Invalid(errors)),
    };

    match saved {
        Ok(user) => {
            let welcome = Flash::success(format!("Welcome, {}.", user.username));
            Ok(session.sign_in(user).redirect_with(welcome, "/"))
        },
        Err(SaveError::Invalid(errors)) => {
            let data = data.without("password").without("password_confirm");
            let html = register_page(&session.chrome(), &data, Some(&errors));
            Ok(session.render_invalid(html))
        },
        Err(SaveError::App(err)) => Err(err),
    }
}
