use axum::{
    extract::{Form, Path, Query, State},
    http::Uri,
    response::Response,
};
use tracing::{info, instrument};

use super::{ListQuery, today};
use crate::{
    AppState,
    error::{AppError, AppResult, SaveError},
    forms::{
        FieldErrors, FormData,
        blog::{FormsetErrors, PostInput, parse_sections, post_data, sections_data},
    },
    session::{Flash, Session},
    templates::{
        self,
        blog::{PostForm, post_form_page, post_page, posts_page},
    },
};

const NOT_YOURS: &str = "You can only change your own posts.";

#[instrument(skip(state, session))]
pub async fn list(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let posts = state.blog.posts(query.query.as_deref(), query.page.as_deref()).await?;
    let html = posts_page(&session.chrome(), &posts, query.query.as_deref());
    Ok(session.render(html))
}

#[instrument(skip(state, session))]
pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let detail = state.blog.post_detail(id).await?;
    let html = post_page(&session.chrome(), &detail, &FormData::new(), None);
    Ok(session.render(html))
}

struct Target<'a> {
    title: &'a str,
    action: &'a str,
    cancel: &'a str,
}

fn form(
    session: &Session,
    target: Target,
    post: &FormData,
    sections: &FormData,
    post_errors: Option<&FieldErrors>,
    section_errors: Option<&FormsetErrors>,
) -> String {
    post_form_page(
        &session.chrome(),
        PostForm {
            title: target.title,
            action: target.action,
            cancel: target.cancel,
            post,
            post_errors,
            sections,
            section_errors,
        },
    )
}

const NEW_POST: Target<'static> = Target { title: "New post", action: "/post/create", cancel: "/posts/" };

#[instrument(skip(state, session))]
pub async fn create_form(State(state): State<AppState>, session: Session, uri: Uri) -> AppResult<Response> {
    let session = session.require_login(uri.path())?;
    let sections = sections_data(&[], state.config.section_extra_forms);
    let html = form(&session, NEW_POST, &FormData::new(), &sections, None, None);
    Ok(session.render(html))
}

/// Nothing is written unless the post and every section row validate.
#[instrument(skip(state, session, data))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Form(data): Form<FormData>,
) -> AppResult<Response> {
    let session = session.require_login(uri.path())?;
    let author_id = signed_in(&session)?;

    let (input, changes) = match (PostInput::parse(&data, today()), parse_sections(&data, today())) {
        (Ok(input), Ok(changes)) => (input, changes),
        (post, sections) => {
            info!(author_id, "rejected post submission");
            let html = form(&session, NEW_POST, &data, &data, post.err().as_ref(), sections.err().as_ref());
            return Ok(session.render_invalid(html));
        },
    };

    match state.blog.create_post(author_id, input, changes).await {
        Ok(post) => Ok(session.redirect_with(
            Flash::success(format!("Post \"{}\" was published.", post.name)),
            &format!("/posts/{}/", post.id),
        )),
        Err(SaveError::Invalid(errors)) => {
            let html = form(&session, NEW_POST, &data, &data, Some(&errors), None);
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
    let post = state.blog.post(id).await?;
    let detail_url = format!("/posts/{id}/");
    let session = session.require_login(uri.path())?.require_owner(post.author_id, &detail_url, NOT_YOURS)?;

    let sections = state.blog.sections(&post).await?;
    let title = format!("Edit {}", post.name);
    let target = Target { title: &title, action: uri.path(), cancel: &detail_url };
    let html = form(
        &session,
        target,
        &post_data(&post),
        &sections_data(&sections, state.config.section_extra_forms),
        None,
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
    let post = state.blog.post(id).await?;
    let detail_url = format!("/posts/{id}/");
    let session = session.require_login(uri.path())?.require_owner(post.author_id, &detail_url, NOT_YOURS)?;
    let title = format!("Edit {}", post.name);
    let target = || Target { title: &title, action: uri.path(), cancel: &detail_url };

    let (input, changes) = match (PostInput::parse(&data, today()), parse_sections(&data, today())) {
        (Ok(input), Ok(changes)) => (input, changes),
        (post, sections) => {
            let html = form(&session, target(), &data, &data, post.err().as_ref(), sections.err().as_ref());
            return Ok(session.render_invalid(html));
        },
    };

    match state.blog.update_post(post, input, changes).await {
        Ok(post) => Ok(session.redirect_with(
            Flash::success(format!("Post \"{}\" was updated.", post.name)),
            &detail_url,
        )),
        Err(SaveError::Invalid(errors)) => {
            let html = form(&session, target(), &data, &data, Some(&errors), None);
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
    let post = state.blog.post(id).await?;
    let detail_url = format!("/posts/{id}/");
    let session = session.require_login(uri.path())?.require_owner(post.author_id, &detail_url, NOT_YOURS)?;
    let html = templates::confirm_delete(&session.chrome(), "post", &post.name, uri.path(), &detail_url);
    Ok(session.render(html))
}

#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let post = state.blog.post(id).await?;
    let detail_url = format!("/posts/{id}/");
    let session = session.require_login(uri.path())?.require_owner(post.author_id, &detail_url, NOT_YOURS)?;
    let name = post.name.clone();
    state.blog.delete_post(post).await?;
    Ok(session.redirect_with(Flash::success(format!("Post \"{name}\" was deleted.")), "/posts/"))
}

/// Id of the user behind a session that already passed `require_login`.
pub(super) fn signed_in(session: &Session) -> AppResult<i32> {
    session
        .user_id()
        .ok_or_else(|| AppError::Other(anyhow::anyhow!("signed-in session without a user")))
}
