#![deny(clippy::all, clippy::pedantic)]
#![allow(non_snake_case, clippy::module_name_repetitions)]

use leptos::{component, view, IntoView};
use leptos_router::{Route, Router, Routes, A};
use tracing::info;
use wasm_tracing::WASMLayerConfigBuilder;

use crate::dashboard::DashboardPage;

mod components;
mod config;
mod dashboard;
mod datetime;
mod request;
mod sequence;
mod types;

fn main() {
    console_error_panic_hook::set_once();
    wasm_tracing::set_as_global_default_with_config(
        WASMLayerConfigBuilder::new()
            .set_max_level(config::log_level())
            .build(),
    );
    info!(api = config::API_URL, energy_device = config::ENERGY_DEVICE, "starting dashboard");
    leptos::mount_to_body(|| view! { <App /> });
}

#[component]
fn App() -> impl IntoView {
    view! {
        <main class="container">
            <Router>
                <nav>
                    <ul>
                        <li>
                            <strong>
                                <A href="/">"Machine energy correlation"</A>
                            </strong>
                        </li>
                    </ul>
                </nav>
                <Routes>
                    <Route path="/" view=DashboardPage />
                    <Route path="/*any" view=|| view! { <h1>"Not Found"</h1> } />
                </Routes>
            </Router>
        </main>
    }
}
