use maud::{Markup, PreEscaped, html};

use super::{
    BUTTON_CLASS, Chrome, LINK_CLASS, fields, form_buttons, general_errors, page, pager,
    search_box,
};
use crate::{
    blog::{PostDetail, PostSummary},
    entities::section,
    forms::{
        FieldErrors, FormData, Options,
        blog::{COMMENT_FORM, FormsetErrors, POST_FORM, SECTION_FORM, row_count, row_prefix, total_forms_key},
    },
    markdown,
    models::ImagePosition,
    pagination::Page,
};

pub fn posts_page(chrome: &Chrome, posts: &Page<PostSummary>, query: Option<&str>) -> String {
    page(
        chrome,
        "Posts",
        html! {
            div class="flex items-center justify-between" {
                h1 class="text-3xl font-bold text-gray-900" { "Posts" }
                @if chrome.user.is_some() {
                    a class=(LINK_CLASS) href="/post/create" { "Write a post" }
                }
            }
            (search_box("/posts/", query))
            @if posts.items.is_empty() {
                p class="mt-6 text-gray-600" { "No posts yet." }
            } @else {
                div class="mt-6 space-y-3" {
                    @for summary in &posts.items {
                        div class="bg-white shadow rounded-lg p-4 flex items-center gap-4" {
                            @if let Some(icon) = &summary.post.icon {
                                img class="h-10 w-10 rounded object-cover" src=(icon) alt="";
                            }
                            div {
                                a class="text-lg font-semibold text-gray-900 hover:text-blue-700" href=(format!("/posts/{}/", summary.post.id)) {
                                    (summary.post.name)
                                }
                                p class="text-sm text-gray-500" { "by " (summary.author) }
                            }
                        }
                    }
                }
            }
            (pager(posts, "/posts/", query))
        },
    )
}

/// The post with its sections and comments; the comment form re-renders
/// with `comment_errors` after a rejected submission.
pub fn post_page(
    chrome: &Chrome,
    detail: &PostDetail,
    comment: &FormData,
    comment_errors: Option<&FieldErrors>,
) -> String {
    let post = &detail.post;
    let detail_url = format!("/posts/{}/", post.id);
    page(
        chrome,
        &post.name,
        html! {
            article class="bg-white shadow rounded-lg p-8" {
                div class="flex items-center gap-4" {
                    @if let Some(icon) = &post.icon {
                        img class="h-12 w-12 rounded object-cover" src=(icon) alt="";
                    }
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { (post.name) }
                        p class="text-sm text-gray-500" { "by " (detail.author) }
                    }
                }
                @if chrome.can_modify(post.author_id) {
                    div class="mt-4 flex gap-4 text-sm" {
                        a class=(LINK_CLASS) href=(format!("/posts/{}/update", post.id)) { "Edit" }
                        a class="text-red-600 hover:text-red-800" href=(format!("/posts/{}/delete", post.id)) { "Delete" }
                    }
                }
                @for section in &detail.sections {
                    (section_block(section))
                }
            }

            section class="mt-8" {
                h2 class="text-xl font-semibold text-gray-900" { "Comments" }
                @if detail.comments.is_empty() {
                    p class="mt-2 text-gray-600" { "No comments yet." }
                }
                ul class="mt-4 space-y-3" {
                    @for view in &detail.comments {
                        li class="bg-white shadow rounded-md p-4" {
                            p class="text-sm font-medium text-gray-900" { (view.author) }
                            p class="mt-1 whitespace-pre-line text-gray-700" { (view.comment.body) }
                            @if chrome.can_modify(view.comment.author_id) {
                                div class="mt-2 flex gap-4 text-xs" {
                                    a class=(LINK_CLASS) href=(format!("/posts/{}/comment/{}/update", post.id, view.comment.id)) { "Edit" }
                                    a class="text-red-600 hover:text-red-800" href=(format!("/posts/{}/comment/{}/delete", post.id, view.comment.id)) { "Delete" }
                                }
                            }
                        }
                    }
                }
                @if chrome.user.is_some() {
                    form class="mt-6 space-y-4" method="post" action=(detail_url) {
                        (fields(&COMMENT_FORM, comment, "", comment_errors, &Options::new()))
                        button class=(BUTTON_CLASS) type="submit" { "Add comment" }
                    }
                } @else {
                    p class="mt-6 text-sm text-gray-600" {
                        a class=(LINK_CLASS) href=(crate::session::login_url(&detail_url)) { "Sign in" }
                        " to leave a comment."
                    }
                }
            }
        },
    )
}

fn section_block(section: &section::Model) -> Markup {
    let placement = ImagePosition::from_code(&section.image_position).unwrap_or_default();
    let image = |class: &str| -> Markup {
        html! {
            @if let Some(src) = &section.image {
                img class=(class) src=(src) alt=(section.name);
            }
        }
    };
    let body = PreEscaped(markdown::render(&section.body));

    html! {
        section class="mt-8 clear-both" {
            @if placement == ImagePosition::BeforeTitle { (image("mb-4 w-full rounded-md")) }
            h2 class="text-2xl font-semibold text-gray-900" { (section.name) }
            @if placement == ImagePosition::AfterTitle { (image("mt-4 w-full rounded-md")) }
            div class="prose mt-4 max-w-none text-gray-800" {
                @match placement {
                    ImagePosition::Left => { (image("float-left mr-4 mb-2 w-1/3 rounded-md")) },
                    ImagePosition::Right => { (image("float-right ml-4 mb-2 w-1/3 rounded-md")) },
                    _ => {},
                }
                (body)
            }
            @if placement == ImagePosition::Bottom { (image("mt-4 w-full rounded-md clear-both")) }
        }
    }
}

pub struct PostForm<'a> {
    pub title: &'a str,
    pub action: &'a str,
    pub cancel: &'a str,
    pub post: &'a FormData,
    pub post_errors: Option<&'a FieldErrors>,
    pub sections: &'a FormData,
    pub section_errors: Option<&'a FormsetErrors>,
}

/// Post fields followed by the section formset.
pub fn post_form_page(chrome: &Chrome, form: PostForm) -> String {
    let rows = row_count(form.sections);
    let no_options = Options::new();
    page(
        chrome,
        form.title,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { (form.title) }
                form class="mt-6 space-y-6" method="post" action=(form.action) {
                    (general_errors(form.post_errors))
                    (fields(&POST_FORM, form.post, "", form.post_errors, &no_options))

                    h2 class="pt-4 text-xl font-semibold text-gray-900" { "Sections" }
                    input type="hidden" name=(total_forms_key()) value=(rows);
                    @if let Some(errors) = form.section_errors {
                        @if !errors.general().is_empty() {
                            ul class="rounded-md border border-red-200 bg-red-50 px-4 py-3 text-sm text-red-700" {
                                @for message in errors.general() { li { (message) } }
                            }
                        }
                    }
                    @for index in 0..rows {
                        (section_row(form.sections, index, form.section_errors, &no_options))
                    }
                    (form_buttons("Save", form.cancel))
                }
            }
        },
    )
}

fn section_row(
    data: &FormData,
    index: usize,
    errors: Option<&FormsetErrors>,
    options: &Options,
) -> Markup {
    let prefix = row_prefix(index);
    let id_key = format!("{prefix}id");
    let delete_key = format!("{prefix}DELETE");
    let id = data.get(&id_key).filter(|v| !v.is_empty());
    let row_errors = errors.and_then(|e| e.row(index));

    html! {
        fieldset class="space-y-4 rounded-md border border-gray-200 p-4" {
            legend class="px-2 text-sm text-gray-500" {
                @if id.is_some() { "Section " (index + 1) } @else { "New section" }
            }
            @if let Some(id) = id {
                input type="hidden" name=(id_key) value=(id);
            }
            @if let Some(row_errors) = row_errors {
                @for message in row_errors.field("id") {
                    p class="text-sm text-red-600" { (message) }
                }
            }
            (fields(&SECTION_FORM, data, &prefix, row_errors, options))
            @if id.is_some() {
                label class="flex items-center gap-2 text-sm text-gray-700" {
                    input type="checkbox" name=(delete_key) value="on" checked[data.get(&delete_key).is_some()];
                    "Delete this section"
                }
            }
        }
    }
}
