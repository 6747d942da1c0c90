use leptos::{component, view, IntoView};

#[component]
pub fn Spinner(label: &'static str) -> impl IntoView {
    view! { <p aria-busy="true">{label}</p> }
}
