use axum::{
    extract::{Form, Path, State},
    http::Uri,
    response::Response,
};
use tracing::instrument;

use super::{posts::signed_in, today};
use crate::{
    AppState,
    error::AppResult,
    forms::{
        FieldErrors, FormData, Options,
        blog::{COMMENT_FORM, CommentInput, comment_data},
    },
    session::{Flash, Session},
    templates::{self, FormPage, blog::post_page},
};

const NOT_YOURS: &str = "You can only change your own comments.";

/// POST to a post's detail page adds a comment.
#[instrument(skip(state, session, data))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i32>,
    Form(data): Form<FormData>,
) -> AppResult<Response> {
    let session = session.require_login(uri.path())?;
    let author_id = signed_in(&session)?;
    let post = state.blog.post(id).await?;

    match CommentInput::parse(&data, today()) {
        Ok(input) => {
            state.blog.add_comment(&post, author_id, input).await?;
            Ok(session.redirect_with(Flash::success("Your comment was added."), uri.path()))
        },
        Err(errors) => {
            let detail = state.blog.post_detail(post.id).await?;
            let html = post_page(&session.chrome(), &detail, &data, Some(&errors));
            Ok(session.render_invalid(html))
        },
    }
}

fn form(session: &Session, action: &str, cancel: &str, data: &FormData, errors: Option<&FieldErrors>) -> String {
    templates::form_page(
        &session.chrome(),
        FormPage {
            title: "Edit comment",
            action,
            cancel,
            spec: &COMMENT_FORM,
            data,
            errors,
            options: &Options::new(),
        },
    )
}

#[instrument(skip(state, session))]
pub async fn update_form(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path((post_id, comment_id)): Path<(i32, i32)>,
) -> AppResult<Response> {
    let comment = state.blog.comment(post_id, comment_id).await?;
    let detail_url = format!("/posts/{post_id}/");
    let session =
        session.require_login(uri.path())?.require_owner(comment.author_id, &detail_url, NOT_YOURS)?;
    let html = form(&session, uri.path(), &detail_url, &comment_data(&comment), None);
    Ok(session.render(html))
}

#[instrument(skip(state, session, data))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path((post_id, comment_id)): Path<(i32, i32)>,
    Form(data): Form<FormData>,
) -> AppResult<Response> {
    let comment = state.blog.comment(post_id, comment_id).await?;
    let detail_url = format!("/posts/{post_id}/");
    let session =
        session.require_login(uri.path())?.require_owner(comment.author_id, &detail_url, NOT_YOURS)?;

    match CommentInput::parse(&data, today()) {
        Ok(input) => {
            state.blog.update_comment(comment, input).await?;
            Ok(session.redirect_with(Flash::success("The comment was updated."), &detail_url))
        },
        Err(errors) => {
            let html = form(&session, uri.path(), &detail_url, &data, Some(&errors));
            Ok(session.render_invalid(html))
        },
    }
}

#[instrument(skip(state, session))]
pub async fn delete_form(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path((post_id, comment_id)): Path<(i32, i32)>,
) -> AppResult<Response> {
    let comment = state.blog.comment(post_id, comment_id).await?;
    let detail_url = format!("/posts/{post_id}/");
    let session =
        session.require_login(uri.path())?.require_owner(comment.author_id, &detail_url, NOT_YOURS)?;
    let excerpt: String = comment.body.chars().take(60).collect();
    let html = templates::confirm_delete(&session.chrome(), "comment", &excerpt, uri.path(), &detail_url);
    Ok(session.render(html))
}

#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path((post_id, comment_id)): Path<(i32, i32)>,
) -> AppResult<Response> {
    let comment = state.blog.comment(post_id, comment_id).await?;
    let detail_url = format!("/posts/{post_id}/");
    let session =
        session.require_login(uri.path())?.require_owner(comment.author_id, &detail_url, NOT_YOURS)?;
    state.blog.delete_comment(comment).await?;
    Ok(session.redirect_with(Flash::success("The comment was deleted."), &detail_url))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::{
        entities::{comment, post},
        forms::blog::{CommentInput, PostInput},
        test_support::{self, TestApp, body_text, location},
    };

    async fn seeded(app: &TestApp, author_id: i32, commenter_id: i32) -> (post::Model, comment::Model) {
        let post = app
            .state
            .blog
            .create_post(author_id, PostInput { name: "News".into(), icon: None }, vec![])
            .await
            .unwrap();
        let comment = app
            .state
            .blog
            .add_comment(&post, commenter_id, CommentInput { body: "First!".into() })
            .await
            .unwrap();
        (post, comment)
    }

    #[tokio::test]
    async fn signed_in_users_comment_on_the_detail_page() {
        let app = TestApp::new().await;
        let writer = test_support::user(&app.db, "writer", false).await;
        let reader = test_support::user(&app.db, "reader", false).await;
        let post = app
            .state
            .blog
            .create_post(writer.id, PostInput { name: "News".into(), icon: None }, vec![])
            .await
            .unwrap();
        let url = format!("/posts/{}/", post.id);

        let response = app.post_form(&url, None, "body=Hello").await;
        assert!(location(&response).starts_with("/login"));

        let cookie = app.cookie_for(&reader);
        let response = app.post_form(&url, Some(&cookie), "body=").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app.post_form(&url, Some(&cookie), "body=Great+read").await;
        assert_eq!(location(&response), url);
        let detail = app.state.blog.post_detail(post.id).await.unwrap();
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].comment.author_id, reader.id);
    }

    #[tokio::test]
    async fn non_author_edit_is_refused() {
        let app = TestApp::new().await;
        let writer = test_support::user(&app.db, "writer", false).await;
        let reader = test_support::user(&app.db, "reader", false).await;
        let (post, comment) = seeded(&app, writer.id, reader.id).await;
        let url = format!("/posts/{}/comment/{}/update", post.id, comment.id);

        // The post's author did not write the comment.
        let response = app.post_form(&url, Some(&app.cookie_for(&writer)), "body=Edited").await;
        assert_eq!(location(&response), format!("/posts/{}/", post.id));
        assert_eq!(app.state.blog.comment(post.id, comment.id).await.unwrap().body, "First!");

        let response = app.post_form(&url, Some(&app.cookie_for(&reader)), "body=Second!").await;
        assert_eq!(location(&response), format!("/posts/{}/", post.id));
        assert_eq!(app.state.blog.comment(post.id, comment.id).await.unwrap().body, "Second!");
    }

    #[tokio::test]
    async fn admin_may_delete_any_comment() {
        let app = TestApp::new().await;
        let writer = test_support::user(&app.db, "writer", false).await;
        let admin = test_support::user(&app.db, "boss", true).await;
        let (post, comment) = seeded(&app, writer.id, writer.id).await;

        let url = format!("/posts/{}/comment/{}/delete", post.id, comment.id);
        let response = app.get(&url, Some(&app.cookie_for(&admin))).await;
        assert!(body_text(response).await.contains("First!"));

        let response = app.post_form(&url, Some(&app.cookie_for(&admin)), "").await;
        assert_eq!(location(&response), format!("/posts/{}/", post.id));
        assert!(app.state.blog.comment(post.id, comment.id).await.is_err());
    }

    #[tokio::test]
    async fn comment_must_belong_to_the_post_in_the_url() {
        let app = TestApp::new().await;
        let writer = test_support::user(&app.db, "writer", false).await;
        let (_, comment) = seeded(&app, writer.id, writer.id).await;
        let (other, _) = seeded(&app, writer.id, writer.id).await;

        let url = format!("/posts/{}/comment/{}/update", other.id, comment.id);
        let response = app.get(&url, Some(&app.cookie_for(&writer))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
