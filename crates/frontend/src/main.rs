mod api;
mod browser;
mod components;
mod image_db;
mod pages;
mod state;
mod storage;

use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Editor {},
}

#[component]
fn Editor() -> Element {
    rsx! {
        pages::editor::Editor {}
    }
}

const CSS: Asset = asset!("/assets/main.css");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}
