use leptos::prelude::*;
use notepanes::app::App;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("logging unavailable: {err}").into());
    }
    mount_to_body(|| {
        view! { <App/> }
    })
}
