mod app;
mod auth;
mod bridge;
mod console;
mod context;
mod geo;
mod leaflet;
mod live;
mod views;

fn main() {
    console::init();
    leptos::mount_to_body(app::App)
}
