use maud::html;

use super::{BUTTON_CLASS, Chrome, LINK_CLASS, fields, general_errors, page};
use crate::forms::{
    FieldErrors, FormData, Options,
    accounts::{LOGIN_FORM, REGISTER_FORM},
};

pub fn login_page(chrome: &Chrome, data: &FormData, errors: Option<&FieldErrors>, next: &str) -> String {
    let action = format!("/login?next={}", urlencoding::encode(next));
    page(
        chrome,
        "Sign in",
        html! {
            div class="mx-auto max-w-md bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { "Sign in" }
                form class="mt-6 space-y-6" method="post" action=(action) {
                    (general_errors(errors))
                    (fields(&LOGIN_FORM, data, "", errors, &Options::new()))
                    button class=(format!("w-full {BUTTON_CLASS}")) type="submit" { "Sign in" }
                }
                p class="mt-6 text-sm text-gray-600" {
                    "No account? " a class=(LINK_CLASS) href="/register" { "Register" }
                }
            }
        },
    )
}

pub fn register_page(chrome: &Chrome, data: &FormData, errors: Option<&FieldErrors>) -> String {
    page(
        chrome,
        "Register",
        html! {
            div class="mx-auto max-w-md bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { "Register" }
                form class="mt-6 space-y-6" method="post" action="/register" {
                    (general_errors(errors))
                    (fields(&REGISTER_FORM, data, "", errors, &Options::new()))
                    button class=(format!("w-full {BUTTON_CLASS}")) type="submit" { "Create account" }
                }
            }
        },
    )
}
