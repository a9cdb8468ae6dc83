use jiff::civil::Date;
use maud::{Markup, html};

use super::{Chrome, LINK_CLASS, admin_links, page, pager, search_box};
use crate::{
    catalog::{FilmDetail, PersonDetail},
    entities::{film, person},
    pagination::Page,
};

/// Country and genre pages share one layout.
pub struct Kind {
    pub title: &'static str,
    pub singular: &'static str,
    pub base: &'static str,
}

pub const COUNTRIES: Kind = Kind { title: "Countries", singular: "country", base: "/countries" };
pub const GENRES: Kind = Kind { title: "Genres", singular: "genre", base: "/genres" };

pub fn named_list(chrome: &Chrome, kind: &Kind, rows: &[(i32, String)]) -> String {
    page(
        chrome,
        kind.title,
        html! {
            div class="flex items-center justify-between" {
                h1 class="text-3xl font-bold text-gray-900" { (kind.title) }
                @if chrome.is_admin() {
                    a class=(LINK_CLASS) href=(format!("{}/create", kind.base)) { "Add " (kind.singular) }
                }
            }
            @if rows.is_empty() {
                p class="mt-6 text-gray-600" { "Nothing here yet." }
            } @else {
                ul class="mt-6 grid gap-2 sm:grid-cols-2" {
                    @for (id, name) in rows {
                        li class="bg-white shadow rounded-md px-4 py-3" {
                            a class=(LINK_CLASS) href=(format!("{}/{id}/", kind.base)) { (name) }
                        }
                    }
                }
            }
        },
    )
}

pub fn named_detail(
    chrome: &Chrome,
    kind: &Kind,
    id: i32,
    name: &str,
    films: &Page<film::Model>,
) -> String {
    let base = format!("{}/{id}/", kind.base);
    page(
        chrome,
        name,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { (name) }
            (admin_links(
                chrome.is_admin(),
                &format!("{}/{id}/update", kind.base),
                &format!("{}/{id}/delete", kind.base),
            ))
            h2 class="mt-8 text-xl font-semibold text-gray-900" { "Films" }
            (film_list(&films.items))
            (pager(films, &base, None))
        },
    )
}

pub fn films_page(chrome: &Chrome, films: &Page<film::Model>, query: Option<&str>) -> String {
    page(
        chrome,
        "Films",
        html! {
            div class="flex items-center justify-between" {
                h1 class="text-3xl font-bold text-gray-900" { "Films" }
                @if chrome.is_admin() {
                    a class=(LINK_CLASS) href="/films/create" { "Add film" }
                }
            }
            (search_box("/films/", query))
            (film_list(&films.items))
            (pager(films, "/films/", query))
        },
    )
}

fn film_list(films: &[film::Model]) -> Markup {
    html! {
        @if films.is_empty() {
            p class="mt-6 text-gray-600" { "No films found." }
        } @else {
            div class="mt-6 space-y-3" {
                @for film in films {
                    div class="bg-white shadow rounded-lg p-4 flex items-baseline justify-between gap-4" {
                        a class="text-lg font-semibold text-gray-900 hover:text-blue-700" href=(format!("/films/{}/", film.id)) {
                            (film.name)
                        }
                        @if let Some(year) = film.year {
                            span class="text-gray-500" { (year) }
                        }
                    }
                }
            }
        }
    }
}

pub fn film_page(chrome: &Chrome, detail: &FilmDetail) -> String {
    let film = &detail.film;
    page(
        chrome,
        &film.name,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                div class="flex gap-6" {
                    @if let Some(cover) = &film.cover {
                        img class="w-40 rounded-md object-cover" src=(cover) alt=(film.name);
                    }
                    div {
                        h1 class="text-3xl font-bold text-gray-900" {
                            (film.name)
                            @if let Some(year) = film.year {
                                span class="ml-2 font-normal text-gray-500" { "(" (year) ")" }
                            }
                        }
                        @if let Some(origin) = &film.origin_name {
                            p class="mt-1 text-gray-500" { (origin) }
                        }
                        @if let Some(slogan) = &film.slogan {
                            p class="mt-2 italic text-gray-700" { "“" (slogan) "”" }
                        }
                        dl class="mt-4 grid grid-cols-[auto_1fr] gap-x-4 gap-y-1 text-sm" {
                            dt class="text-gray-500" { "Country" }
                            dd {
                                @match &detail.country {
                                    Some(c) => { a class=(LINK_CLASS) href=(format!("/countries/{}/", c.id)) { (c.name) } },
                                    None => { "—" },
                                }
                            }
                            dt class="text-gray-500" { "Director" }
                            dd {
                                @match &detail.director {
                                    Some(p) => { a class=(LINK_CLASS) href=(format!("/people/{}/", p.id)) { (p.name) } },
                                    None => { "—" },
                                }
                            }
                            dt class="text-gray-500" { "Genres" }
                            dd {
                                @for (i, genre) in detail.genres.iter().enumerate() {
                                    @if i > 0 { ", " }
                                    a class=(LINK_CLASS) href=(format!("/genres/{}/", genre.id)) { (genre.name) }
                                }
                            }
                            @if let Some(length) = film.length {
                                dt class="text-gray-500" { "Length" }
                                dd { (length) " min" }
                            }
                            @if let Some(trailer) = &film.trailer_url {
                                dt class="text-gray-500" { "Trailer" }
                                dd { a class=(LINK_CLASS) href=(trailer) target="_blank" rel="noopener noreferrer" { "Watch" } }
                            }
                            @if let Some(id) = film.kinopoisk_id {
                                dt class="text-gray-500" { "Kinopoisk" }
                                dd {
                                    a class=(LINK_CLASS) href=(format!("https://www.kinopoisk.ru/film/{id}/")) target="_blank" rel="noopener noreferrer" { (id) }
                                }
                            }
                        }
                    }
                }
                @if let Some(description) = &film.description {
                    p class="mt-6 whitespace-pre-line text-gray-700" { (description) }
                }
                @if !detail.people.is_empty() {
                    h2 class="mt-8 text-xl font-semibold text-gray-900" { "Cast" }
                    ul class="mt-2 grid gap-1 sm:grid-cols-2" {
                        @for person in &detail.people {
                            li { a class=(LINK_CLASS) href=(format!("/people/{}/", person.id)) { (person.name) } }
                        }
                    }
                }
                (admin_links(
                    chrome.is_admin(),
                    &format!("/films/{}/update", film.id),
                    &format!("/films/{}/delete", film.id),
                ))
            }
        },
    )
}

pub fn people_page(
    chrome: &Chrome,
    people: &Page<person::Model>,
    query: Option<&str>,
) -> String {
    page(
        chrome,
        "People",
        html! {
            div class="flex items-center justify-between" {
                h1 class="text-3xl font-bold text-gray-900" { "People" }
                @if chrome.is_admin() {
                    a class=(LINK_CLASS) href="/people/create" { "Add person" }
                }
            }
            (search_box("/people/", query))
            @if people.items.is_empty() {
                p class="mt-6 text-gray-600" { "No people found." }
            } @else {
                ul class="mt-6 space-y-2" {
                    @for person in &people.items {
                        li class="bg-white shadow rounded-md px-4 py-3" {
                            a class=(LINK_CLASS) href=(format!("/people/{}/", person.id)) { (person.name) }
                            @if let Some(origin) = &person.origin_name {
                                span class="ml-2 text-sm text-gray-500" { (origin) }
                            }
                        }
                    }
                }
            }
            (pager(people, "/people/", query))
        },
    )
}

pub fn person_page(chrome: &Chrome, detail: &PersonDetail, today: Date) -> String {
    let person = &detail.person;
    page(
        chrome,
        &person.name,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                div class="flex gap-6" {
                    @if let Some(photo) = &person.photo {
                        img class="w-32 rounded-md object-cover" src=(photo) alt=(person.name);
                    }
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { (person.name) }
                        @if let Some(origin) = &person.origin_name {
                            p class="mt-1 text-gray-500" { (origin) }
                        }
                        @if let (Some(birthday), Some(age)) = (&person.birthday, person.age(today)) {
                            p class="mt-2 text-sm text-gray-700" { "Born " (birthday) " (age " (age) ")" }
                        }
                    }
                }
                @if !detail.directed.is_empty() {
                    h2 class="mt-8 text-xl font-semibold text-gray-900" { "Director" }
                    (film_list(&detail.directed))
                }
                @if !detail.acted.is_empty() {
                    h2 class="mt-8 text-xl font-semibold text-gray-900" { "Cast member" }
                    (film_list(&detail.acted))
                }
                (admin_links(
                    chrome.is_admin(),
                    &format!("/people/{}/update", person.id),
                    &format!("/people/{}/delete", person.id),
                ))
            }
        },
    )
}
