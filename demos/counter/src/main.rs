//! Counter example binary
//!
//! Assembles the `counter` and `user` slices, dispatches a few wrapped
//! actions and prints the state after each one. Store metrics are collected
//! by a Prometheus recorder and printed at the end.

use counter::{
    app_store, CounterActionDispatch, CounterSlice, CounterState, Profile, UserActionDispatch,
    UserSlice, UserState,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use slicekit_runtime::{StoreConfig, StoreError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counter=debug,slicekit_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Collect metrics in-process; no HTTP listener
    let metrics = PrometheusBuilder::new().install_recorder()?;
    slicekit_runtime::metrics::register_metrics();

    println!("=== Counter Example: slices, wrapped actions and paths ===\n");

    let store = app_store(StoreConfig::default().with_name("counter-demo").with_log_actions(true))?;
    println!("Slices: {:?}", store.slice_names());
    println!("Initial state: {}", store.snapshot()?);

    let mut actions = store.subscribe_actions();
    let counter = store.slice::<CounterSlice>("counter")?;
    let user = store.slice::<UserSlice>("user")?;

    println!("\n>>> counter.increment(5)");
    counter.increment(5)?;
    println!("counter.count = {}", store.read_path("counter.count")?);

    println!("\n>>> counter.decrement(2)");
    counter.decrement(2)?;
    println!("counter.count = {}", counter.read(CounterState::count)?);

    let mut count = counter.watch(CounterState::count);

    println!("\n>>> user.rename(\"ada\"), user.set_age(36), user.add_tag(\"admin\")");
    user.rename("ada".to_string())?;
    user.set_age(36)?;
    user.add_tag("admin".to_string())?;

    let age = UserState::profile.then(Profile::age);
    println!("{age} (typed)   = {}", user.read(age.clone())?);
    println!("user.{age} (dynamic) = {}", store.read_path(&format!("user.{age}"))?);
    println!("user.profile.displayName = {}", store.read_path("user.profile.displayName")?);

    println!("\n>>> user.set_age(200)");
    match user.set_age(200) {
        Err(StoreError::Reducer { source, .. }) => println!("Rejected: {source}"),
        other => println!("Unexpected: {other:?}"),
    }
    println!("user.profile.age is still {}", user.read(age)?);

    println!("\n>>> counter.reset()");
    counter.reset()?;
    if count.refresh() {
        tracing::info!(count = ?count.get(), "Count changed");
    }

    println!("\nApplied actions:");
    for _ in 0..store.version() {
        let record = actions.recv().await?;
        println!("  {} {}", record.action_type, record.payload);
    }

    println!("\nFinal state: {}", store.snapshot()?);
    println!("Store version: {}", store.version());
    println!("\nMetrics:\n{}", metrics.render());
    println!("\nAction types: {:?}", store.action_types().iter().map(ToString::to_string).collect::<Vec<_>>());

    Ok(())
}
