//! # XenAPI Demo
//!
//! Starts an in-memory pool, logs in and walks one VM through its life:
//! create, tag, start (asynchronously), snapshot, shut down and destroy.
//!
//! Credentials come from `XENAPI_USERNAME` / `XENAPI_PASSWORD` when set, see
//! [`ClientConfig::from_env`]. Log output is controlled with `RUST_LOG`.

use std::time::Duration;
use tracing::{error, info, Instrument};
use xenapi::framework::{FailureKind, Result};
use xenapi::lifecycle::{setup_tracing, ClientConfig, LocalPool};
use xenapi::model::{Task, Vm, VmRecord};
use xenapi::sim::SimConfig;
use xenapi::Connection;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = ClientConfig::from_env();
    info!(username = %config.username, "Starting demo against a local pool");

    let pool = LocalPool::start(SimConfig {
        username: config.username.clone(),
        password: config.password.clone(),
        ..Default::default()
    });

    let conn = Connection::login_with_password(
        pool.transport(),
        &config.username,
        &config.password,
        &config.login_version,
        &config.originator,
    )
    .await?;
    let version = conn.check_api_version().await?;
    info!(%version, "Connected");

    let span = tracing::info_span!("vm_lifecycle");
    let outcome = vm_lifecycle(&conn).instrument(span).await;
    if let Err(e) = &outcome {
        error!(error = %e, "Demo failed");
    }

    conn.logout().await?;
    pool.shutdown().await?;
    outcome?;

    info!("Demo completed successfully");
    Ok(())
}

async fn vm_lifecycle(conn: &Connection) -> Result<()> {
    for (vm, record) in Vm::get_all_records(conn).await? {
        info!(%vm, name = %record.name_label, state = %record.power_state, "Existing VM");
    }

    let record = VmRecord {
        name_label: "demo-vm".into(),
        name_description: "Created by the demo".into(),
        vcpus_max: 2,
        vcpus_at_startup: 2,
        memory_static_min: 512 << 20,
        memory_dynamic_min: 512 << 20,
        memory_dynamic_max: 1 << 30,
        memory_static_max: 1 << 30,
        ..Default::default()
    };
    let vm = Vm::create(conn, &record).await?;
    info!(%vm, "Created VM");

    Vm::add_to_other_config(conn, &vm, "owner", "demo").await?;
    Vm::add_tags(conn, &vm, "demo").await?;

    let task = Vm::async_start(conn, &vm, false, false).await?;
    let finished = Task::wait(conn, &task, Duration::from_millis(100)).await?;
    info!(%task, status = %finished.status, "Start finished");

    match Vm::start(conn, &vm, false, false).await {
        Err(e) if e.failure_kind() == Some(FailureKind::VmBadPowerState) => {
            info!(error = %e, "Second start refused")
        }
        other => other?,
    }

    let snapshot = Vm::snapshot(conn, &vm, "demo-vm-snapshot").await?;
    info!(%snapshot, "Snapshot taken");

    Vm::clean_shutdown(conn, &vm).await?;
    Vm::destroy(conn, &snapshot).await?;
    Vm::destroy(conn, &vm).await?;
    info!(%vm, "VM destroyed");
    Ok(())
}
