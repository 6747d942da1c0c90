use chrono::{DateTime, Utc};
use leptos::{
    component, event_target_checked, event_target_value, view, CollectView, For, IntoView,
    RwSignal, Show, Signal, SignalGet, SignalUpdate, SignalWith,
};

use crate::components::Spinner;
use crate::datetime::display_datetime;

use super::create_dashboard::{
    change_machine, create_dashboard, run_analysis, select_bound, CreateDashboardReturn,
};
use super::state::{Dashboard, FieldChoice, FieldGroup, Results, ANALYZING_MESSAGE};
use super::table::CorrelationTable;
use super::time_range::{start_presets, stop_presets, TimeBound, TimeRange};

#[component]
pub fn DashboardPage() -> impl IntoView {
    let CreateDashboardReturn {
        dashboard,

        is_loading_machines,
        is_loading_fields,
        sections_visible,
        machine_options,
        machine_fields,
        electrical_fields,
        time_range,
        window,
        results,
    } = create_dashboard();

    view! {
        <article>
            <label for="machine-select">"Machine"</label>
            <select
                id="machine-select"
                aria-busy=move || is_loading_machines.get().to_string()
                prop:value=move || {
                    dashboard.with(|dashboard| dashboard.machine().unwrap_or_default().to_string())
                }
                on:change=move |evt| change_machine(dashboard, &event_target_value(&evt))
            >
                {move || {
                    machine_options
                        .get()
                        .into_iter()
                        .map(|option| view! { <option value=option.value>{option.label}</option> })
                        .collect_view()
                }}
            </select>

            <Show when=move || is_loading_fields.get()>
                <Spinner label="Loading machine parameters..." />
            </Show>

            <div class:hidden=move || !sections_visible.get()>
                <FieldList
                    title="Machine fields"
                    group=FieldGroup::Machine
                    fields=machine_fields
                    dashboard
                />
                <FieldList
                    title="Electrical parameters"
                    group=FieldGroup::Electrical
                    fields=electrical_fields
                    dashboard
                />
                <TimeSelection time_range window dashboard />
                <button on:click=move |_| run_analysis(dashboard)>"Analyze"</button>
            </div>

            <ResultsPanel results />
        </article>
    }
}

#[component]
fn FieldList(
    title: &'static str,
    group: FieldGroup,
    fields: Signal<Vec<FieldChoice>>,
    dashboard: RwSignal<Dashboard>,
) -> impl IntoView {
    view! {
        <fieldset>
            <legend>{title}</legend>
            {move || {
                fields
                    .get()
                    .into_iter()
                    .map(|field| {
                        let name = field.name.clone();
                        view! {
                            <label>
                                <input
                                    type="checkbox"
                                    value=field.name
                                    prop:checked=field.checked
                                    on:change=move |evt| {
                                        let checked = event_target_checked(&evt);
                                        dashboard
                                            .update(|dashboard| {
                                                dashboard.set_field_checked(group, &name, checked);
                                            });
                                    }
                                />
                                " "
                                {field.label}
                            </label>
                        }
                    })
                    .collect_view()
            }}
        </fieldset>
    }
}

#[component]
fn TimeSelection(
    time_range: Signal<TimeRange>,
    window: Signal<(DateTime<Utc>, DateTime<Utc>)>,
    dashboard: RwSignal<Dashboard>,
) -> impl IntoView {
    view! {
        <fieldset class="grid">
            <label>
                "Start"
                <select
                    prop:value=move || time_range.get().start.to_flux()
                    on:change=move |evt| {
                        select_bound(dashboard, &event_target_value(&evt), Dashboard::set_start);
                    }
                >
                    <BoundOptions presets=start_presets() />
                </select>
            </label>
            <label>
                "Stop"
                <select
                    prop:value=move || time_range.get().stop.to_flux()
                    on:change=move |evt| {
                        select_bound(dashboard, &event_target_value(&evt), Dashboard::set_stop);
                    }
                >
                    <BoundOptions presets=stop_presets() />
                </select>
            </label>
        </fieldset>
        <small>
            {move || {
                let (start, stop) = window.get();
                format!("{} → {}", display_datetime(start), display_datetime(stop))
            }}
        </small>
    }
}

#[component]
fn BoundOptions(presets: Vec<TimeBound>) -> impl IntoView {
    presets
        .into_iter()
        .map(|bound| view! { <option value=bound.to_flux()>{bound.label()}</option> })
        .collect_view()
}

#[component]
fn ResultsPanel(results: Signal<Results>) -> impl IntoView {
    view! {
        <section class:hidden=move || results.with(|results| *results == Results::Hidden)>
            {move || match results.get() {
                Results::Hidden => ().into_view(),
                Results::Message(message) => view! { <p>{message}</p> }.into_view(),
                Results::Analyzing => view! { <Spinner label=ANALYZING_MESSAGE /> }.into_view(),
                Results::Table(table) => view! { <CorrelationTableView table /> }.into_view(),
            }}
        </section>
    }
}

#[component]
fn CorrelationTableView(table: CorrelationTable) -> impl IntoView {
    let CorrelationTable { columns, rows } = table;

    view! {
        <div class="overflow-auto">
            <table class="correlation-table">
                <thead>
                    <tr>
                        <th scope="col">"Machine Field"</th>
                        {columns
                            .into_iter()
                            .map(|column| view! { <th scope="col">{column}</th> })
                            .collect_view()}
                    </tr>
                </thead>
                <tbody>
                    <For each=move || rows.clone() key=|row| row.field.clone() let:row>
                        <tr>
                            <th scope="row">{row.field}</th>
                            {row
                                .cells
                                .into_iter()
                                .map(|cell| {
                                    view! {
                                        <td style:background-color=cell.background>{cell.text}</td>
                                    }
                                })
                                .collect_view()}
                        </tr>
                    </For>
                </tbody>
            </table>
        </div>
    }
}
