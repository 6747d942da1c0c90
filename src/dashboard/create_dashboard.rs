use chrono::{DateTime, Utc};
use leptos::{
    create_memo, create_resource, create_rw_signal, create_signal, spawn_local, RwSignal, Signal,
    SignalGet, SignalSet, SignalUpdate, SignalWith,
};
use leptos_use::use_interval_fn;
use tracing::{error, info, warn};

use crate::request::{fetch_correlations, fetch_machine_fields, fetch_machines};

use super::{
    state::{
        machine_options, Dashboard, FieldChoice, FieldGroup, MachineList, Results, SelectOption,
        Stage,
    },
    time_range::{TimeBound, TimeRange},
};

const CLOCK_REFRESH_MS: u64 = 1000;

pub struct CreateDashboardReturn {
    pub dashboard: RwSignal<Dashboard>,

    pub is_loading_machines: Signal<bool>,
    pub is_loading_fields: Signal<bool>,
    pub sections_visible: Signal<bool>,
    pub machine_options: Signal<Vec<SelectOption>>,
    pub machine_fields: Signal<Vec<FieldChoice>>,
    pub electrical_fields: Signal<Vec<FieldChoice>>,
    pub time_range: Signal<TimeRange>,
    pub window: Signal<(DateTime<Utc>, DateTime<Utc>)>,
    pub results: Signal<Results>,
}

pub fn create_dashboard() -> CreateDashboardReturn {
    let dashboard = create_rw_signal(Dashboard::default());

    let machines = create_resource(|| (), |()| load_machines());
    let options = create_memo(move |_| machine_options(machines.get().as_ref()));

    let (now, set_now) = create_signal(Utc::now());
    use_interval_fn(move || set_now.set(Utc::now()), CLOCK_REFRESH_MS);

    let time_range = create_memo(move |_| dashboard.with(Dashboard::time_range));
    let window = create_memo(move |_| time_range.get().window(now.get()));

    CreateDashboardReturn {
        dashboard,

        is_loading_machines: machines.loading().into(),
        is_loading_fields: create_memo(move |_| {
            dashboard.with(|dashboard| dashboard.stage() == Stage::LoadingFields)
        })
        .into(),
        sections_visible: create_memo(move |_| dashboard.with(Dashboard::sections_visible)).into(),
        machine_options: options.into(),
        machine_fields: fields_memo(dashboard, FieldGroup::Machine),
        electrical_fields: fields_memo(dashboard, FieldGroup::Electrical),
        time_range: time_range.into(),
        window: window.into(),
        results: create_memo(move |_| dashboard.with(|dashboard| dashboard.results().clone())).into(),
    }
}

fn fields_memo(dashboard: RwSignal<Dashboard>, group: FieldGroup) -> Signal<Vec<FieldChoice>> {
    create_memo(move |_| dashboard.with(|dashboard| dashboard.fields(group).to_vec())).into()
}

async fn load_machines() -> MachineList {
    match fetch_machines().await {
        Ok(machines) => {
            info!(count = machines.len(), "machines loaded");
            MachineList::Loaded(machines)
        }
        Err(err) => {
            error!("machines request error: {err}");
            MachineList::Failed
        }
    }
}

pub fn change_machine(dashboard: RwSignal<Dashboard>, machine: &str) {
    let Some(request) = dashboard
        .try_update(|dashboard| dashboard.select_machine(machine))
        .flatten()
    else {
        return;
    };

    info!(machine = %request.machine, "machine selected");

    spawn_local(async move {
        let fields = fetch_machine_fields(&request.machine).await;
        dashboard.update(|dashboard| dashboard.fields_loaded(request.token, fields));
    });
}

pub fn run_analysis(dashboard: RwSignal<Dashboard>) {
    let Some(request) = dashboard.try_update(Dashboard::analyze).flatten() else {
        return;
    };

    info!(
        machine = %request.query.machine,
        start = %request.query.start,
        stop = %request.query.stop,
        "analyzing correlations"
    );

    spawn_local(async move {
        let outcome = fetch_correlations(&request.query).await;
        dashboard.update(|dashboard| dashboard.analysis_finished(request.token, outcome));
    });
}

pub fn select_bound(
    dashboard: RwSignal<Dashboard>,
    expression: &str,
    apply: fn(&mut Dashboard, TimeBound),
) {
    match TimeBound::parse(expression) {
        Ok(bound) => dashboard.update(|dashboard| apply(dashboard, bound)),
        Err(err) => warn!("ignoring time bound: {err:#}"),
    }
}
