use chrono::{Duration as TimeDelta, Utc};
use std::collections::HashMap;
use std::time::Duration;
use xenapi::framework::{ApiVersion, Error, FailureKind, Ref};
use xenapi::lifecycle::LocalPool;
use xenapi::model::{
    Cls, Message, Pbd, Session, Sr, Task, TaskStatusType, Vbd, VbdMode, VbdRecord, VbdType, Vdi,
    VdiRecord, Vm, VmPowerState, VmRecord,
};
use xenapi::sim::SimConfig;
use xenapi::Connection;

const POLL: Duration = Duration::from_millis(10);

async fn login(pool: &LocalPool) -> Connection {
    Connection::login_with_password(pool.transport(), "root", "xenroot", "1.0", "integration-test")
        .await
        .expect("Failed to log in")
}

async fn new_vm(conn: &Connection, name: &str) -> Ref<Vm> {
    let record = VmRecord {
        name_label: name.to_string(),
        ..Default::default()
    };
    Vm::create(conn, &record).await.expect("Failed to create VM")
}

/// Full session lifecycle against a simulated pool, ending with a clean
/// shutdown of the simulator.
#[tokio::test]
async fn test_session_lifecycle() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;

    let version = conn.check_api_version().await.expect("Version check failed");
    assert_eq!(version, ApiVersion::new(2, 21));

    let vms = Vm::get_all(&conn).await.expect("Failed to list VMs");
    assert_eq!(vms.len(), 1, "only the control domain exists at startup");
    let dom0 = Vm::get_record(&conn, &vms[0]).await.unwrap();
    assert!(dom0.is_control_domain);
    assert_eq!(dom0.power_state, VmPowerState::Running);

    conn.logout().await.expect("Failed to log out");
    pool.shutdown().await.expect("Simulator did not stop cleanly");
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let stale = Connection::new(pool.transport(), conn.session().clone());

    assert!(Vm::get_all(&stale).await.is_ok());
    conn.logout().await.unwrap();

    let err = Vm::get_all(&stale).await.unwrap_err();
    let failure = err.failure().expect("Expected a server failure");
    assert_eq!(failure.kind, FailureKind::SessionInvalid);
    assert_eq!(failure.param(0), Some(stale.session().as_str()));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let pool = LocalPool::start(SimConfig::default());
    let err = Connection::login_with_password(pool.transport(), "root", "nope", "1.0", "test")
        .await
        .unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::SessionAuthenticationFailed));
}

#[tokio::test]
async fn test_version_mismatch_is_reported() {
    let pool = LocalPool::start(SimConfig {
        api_version_major: 3,
        ..Default::default()
    });
    let conn = login(&pool).await;

    match conn.check_api_version().await {
        Err(Error::VersionMismatch { client, server }) => {
            assert_eq!(client, ApiVersion::LATEST);
            assert_eq!(server, ApiVersion::new(3, 21));
        }
        other => panic!("Expected a version mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_other_config_round_trip() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let vm = new_vm(&conn, "config-vm").await;

    let record = Vm::get_record(&conn, &vm).await.unwrap();
    assert!(record.other_config.is_empty());
    assert_eq!(record.name_label, "config-vm");
    assert_eq!(record.power_state, VmPowerState::Halted);

    Vm::add_to_other_config(&conn, &vm, "owner", "ops").await.unwrap();
    let config = Vm::get_other_config(&conn, &vm).await.unwrap();
    assert_eq!(config.get("owner").map(String::as_str), Some("ops"));

    let err = Vm::add_to_other_config(&conn, &vm, "owner", "dev").await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::MapDuplicateKey));

    Vm::remove_from_other_config(&conn, &vm, "owner").await.unwrap();
    assert!(Vm::get_other_config(&conn, &vm).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_removing_absent_entries_is_a_no_op() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let vm = new_vm(&conn, "no-op-vm").await;

    Vm::remove_from_other_config(&conn, &vm, "never-set").await.unwrap();
    Vm::remove_tags(&conn, &vm, "never-tagged").await.unwrap();

    Vm::add_tags(&conn, &vm, "web").await.unwrap();
    Vm::add_tags(&conn, &vm, "web").await.unwrap();
    assert_eq!(Vm::get_tags(&conn, &vm).await.unwrap(), vec!["web".to_string()]);
}

#[tokio::test]
async fn test_async_start_returns_a_task() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let vm = new_vm(&conn, "async-vm").await;

    let task = Vm::async_start(&conn, &vm, false, false).await.unwrap();
    let record = Task::wait(&conn, &task, POLL).await.expect("Task failed");
    assert_eq!(record.status, TaskStatusType::Success);
    assert_eq!(record.progress, 1.0);

    assert_eq!(Vm::get_power_state(&conn, &vm).await.unwrap(), VmPowerState::Running);
    let master = xenapi::model::Session::get_this_host(&conn, conn.session()).await.unwrap();
    assert_eq!(Vm::get_resident_on(&conn, &vm).await.unwrap(), master);
}

#[tokio::test]
async fn test_async_create_resolves_to_a_reference() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let record = VmRecord {
        name_label: "from-task".into(),
        ..Default::default()
    };

    let direct = Vm::create(&conn, &record).await.unwrap();
    assert!(!direct.is_null());

    let task = Vm::async_create(&conn, &record).await.unwrap();
    let finished = Task::wait(&conn, &task, POLL).await.unwrap();
    let created: Ref<Vm> = finished.result_as().unwrap();

    assert_ne!(created, direct);
    assert_eq!(Vm::get_name_label(&conn, &created).await.unwrap(), "from-task");
    assert_eq!(Vm::get_by_uuid(&conn, &Vm::get_uuid(&conn, &created).await.unwrap()).await.unwrap(), created);
}

#[tokio::test]
async fn test_bad_power_state_is_typed() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let vm = new_vm(&conn, "halted-vm").await;

    let err = Vm::pause(&conn, &vm).await.unwrap_err();
    let failure = err.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::VmBadPowerState);
    assert!(failure.is_one_of(Vm::PAUSE_FAILURES));
    assert_eq!(failure.params, vec![vm.to_string(), "running".into(), "halted".into()]);

    // The same failure reached through a task.
    let task = Vm::async_pause(&conn, &vm).await.unwrap();
    let err = Task::wait(&conn, &task, POLL).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::VmBadPowerState));
    let record = Task::get_record(&conn, &task).await.unwrap();
    assert_eq!(record.status, TaskStatusType::Failure);
    assert_eq!(record.error_info[0], "VM_BAD_POWER_STATE");
}

#[tokio::test]
async fn test_devices_follow_their_vm() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let vm = new_vm(&conn, "disk-vm").await;

    let sr = xenapi::model::Sr::get_by_name_label(&conn, "Local storage").await.unwrap()[0].clone();
    let vdi = Vdi::create(
        &conn,
        &VdiRecord {
            name_label: "root".into(),
            sr: sr.clone(),
            virtual_size: 8 << 30,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let vbd = Vbd::create(
        &conn,
        &VbdRecord {
            vm: vm.clone(),
            vdi: vdi.clone(),
            userdevice: "0".into(),
            bootable: true,
            mode: VbdMode::Rw,
            vbd_type: VbdType::Disk,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(Vm::get_vbds(&conn, &vm).await.unwrap(), vec![vbd.clone()]);
    assert_eq!(Vdi::get_vbds(&conn, &vdi).await.unwrap(), vec![vbd.clone()]);

    let err = Vbd::plug(&conn, &vbd).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::VmBadPowerState));

    Vm::start(&conn, &vm, false, false).await.unwrap();
    assert!(Vbd::get_currently_attached(&conn, &vbd).await.unwrap());
    let err = Vbd::plug(&conn, &vbd).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::DeviceAlreadyAttached));

    Vbd::unplug(&conn, &vbd).await.unwrap();
    let err = Vbd::unplug(&conn, &vbd).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::DeviceAlreadyDetached));

    let err = Vdi::destroy(&conn, &vdi).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::VdiInUse));

    Vm::hard_shutdown(&conn, &vm).await.unwrap();
    Vm::destroy(&conn, &vm).await.unwrap();
    let err = Vbd::get_record(&conn, &vbd).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::HandleInvalid));
    Vdi::destroy(&conn, &vdi).await.unwrap();
}

#[tokio::test]
async fn test_snapshot_and_revert() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let vm = new_vm(&conn, "snap-vm").await;

    let snapshot = Vm::snapshot(&conn, &vm, "before-upgrade").await.unwrap();
    let record = Vm::get_record(&conn, &snapshot).await.unwrap();
    assert!(record.is_a_snapshot);
    assert_eq!(record.snapshot_of, vm);
    assert_eq!(Vm::get_snapshots(&conn, &vm).await.unwrap(), vec![snapshot.clone()]);

    Vm::start(&conn, &vm, false, false).await.unwrap();
    Vm::revert(&conn, &snapshot).await.unwrap();
    assert_eq!(Vm::get_power_state(&conn, &vm).await.unwrap(), VmPowerState::Halted);

    Vm::destroy(&conn, &snapshot).await.unwrap();
    assert!(Vm::get_snapshots(&conn, &vm).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_task_cancel() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;

    let task = Task::create(&conn, "import", "waiting for upload").await.unwrap();
    assert!(Task::get_record(&conn, &task).await.unwrap().is_pending());

    Task::cancel(&conn, &task).await.unwrap();
    assert_eq!(Task::get_status(&conn, &task).await.unwrap(), TaskStatusType::Cancelled);

    let err = Task::cancel(&conn, &task).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::OperationNotAllowed));

    Task::destroy(&conn, &task).await.unwrap();
    let err = Task::get_record(&conn, &task).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::HandleInvalid));
}

#[tokio::test]
async fn test_checkpoint_can_be_destroyed() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let vm = new_vm(&conn, "cp-vm").await;

    let err = Vm::checkpoint(&conn, &vm, "too-early").await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::VmBadPowerState));

    Vm::start(&conn, &vm, false, false).await.unwrap();
    let checkpoint = Vm::checkpoint(&conn, &vm, "cp").await.unwrap();
    let record = Vm::get_record(&conn, &checkpoint).await.unwrap();
    assert!(record.is_a_snapshot);
    assert_eq!(record.power_state, VmPowerState::Suspended);
    assert_eq!(record.snapshot_of, vm);
    assert_eq!(Vm::get_power_state(&conn, &vm).await.unwrap(), VmPowerState::Running);

    Vm::destroy(&conn, &checkpoint).await.expect("Checkpoint should be destroyable");
    assert!(Vm::get_snapshots(&conn, &vm).await.unwrap().is_empty());

    // A suspended VM that is not a snapshot still has to be halted first.
    Vm::suspend(&conn, &vm).await.unwrap();
    let err = Vm::destroy(&conn, &vm).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::VmBadPowerState));
}

#[tokio::test]
async fn test_clone_and_copy() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let vm = new_vm(&conn, "source-vm").await;
    Vm::add_to_other_config(&conn, &vm, "role", "web").await.unwrap();

    let clone = Vm::clone(&conn, &vm, "clone-vm").await.unwrap();
    let record = Vm::get_record(&conn, &clone).await.unwrap();
    assert_eq!(record.name_label, "clone-vm");
    assert!(!record.is_a_snapshot);
    assert_ne!(record.uuid, Vm::get_uuid(&conn, &vm).await.unwrap());
    assert_eq!(record.other_config.get("role").map(String::as_str), Some("web"));

    let sr = Sr::get_by_name_label(&conn, "Local storage").await.unwrap()[0].clone();
    let copy = Vm::copy(&conn, &vm, "copy-vm", &sr).await.unwrap();
    assert_eq!(Vm::get_name_label(&conn, &copy).await.unwrap(), "copy-vm");
    assert_eq!(Vm::get_power_state(&conn, &copy).await.unwrap(), VmPowerState::Halted);

    let err = Vm::copy(&conn, &vm, "nowhere", &Ref::new("OpaqueRef:missing")).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::HandleInvalid));

    Vm::start(&conn, &vm, false, false).await.unwrap();
    let err = Vm::clone(&conn, &vm, "running-clone").await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::VmBadPowerState));
}

#[tokio::test]
async fn test_storage_repository_lifecycle() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let host = Session::get_this_host(&conn, conn.session()).await.unwrap();
    assert_eq!(xenapi::model::Host::get_pbds(&conn, &host).await.unwrap().len(), 1);

    let device_config = HashMap::from([("server".to_string(), "nfs.local".to_string())]);
    let sr = Sr::create(
        &conn,
        &host,
        &device_config,
        100 << 30,
        "nfs-store",
        "shared storage",
        "nfs",
        "user",
        true,
        &HashMap::new(),
    )
    .await
    .unwrap();
    let pbds = Sr::get_pbds(&conn, &sr).await.unwrap();
    assert_eq!(pbds.len(), 1);
    assert!(Pbd::get_currently_attached(&conn, &pbds[0]).await.unwrap());
    assert_eq!(xenapi::model::Host::get_pbds(&conn, &host).await.unwrap().len(), 2);

    let err = Sr::destroy(&conn, &sr).await.unwrap_err();
    let failure = err.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::SrHasPbd);
    assert!(failure.is_one_of(Sr::DESTROY_FAILURES));
    let err = Sr::forget(&conn, &sr).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::SrHasPbd));

    Pbd::unplug(&conn, &pbds[0]).await.unwrap();
    let vdi = Vdi::create(
        &conn,
        &VdiRecord {
            name_label: "data".into(),
            sr: sr.clone(),
            virtual_size: 1 << 30,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = Sr::destroy(&conn, &sr).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::SrNotEmpty));

    Sr::forget(&conn, &sr).await.unwrap();
    assert_eq!(xenapi::model::Host::get_pbds(&conn, &host).await.unwrap().len(), 1);
    let err = Vdi::get_record(&conn, &vdi).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::HandleInvalid));
    let err = Sr::get_record(&conn, &sr).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::HandleInvalid));
}

#[tokio::test]
async fn test_empty_repository_is_destroyed() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let host = Session::get_this_host(&conn, conn.session()).await.unwrap();

    let sr = Sr::create(&conn, &host, &HashMap::new(), 0, "scratch", "", "ext", "user", false, &HashMap::new())
        .await
        .unwrap();
    let pbd = Sr::get_pbds(&conn, &sr).await.unwrap()[0].clone();
    Pbd::unplug(&conn, &pbd).await.unwrap();

    Sr::destroy(&conn, &sr).await.unwrap();
    let err = Pbd::get_record(&conn, &pbd).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::HandleInvalid));
}

#[tokio::test]
async fn test_messages_are_filtered_by_object_and_time() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;
    let vm = new_vm(&conn, "noisy-vm").await;
    let vm_uuid = Vm::get_uuid(&conn, &vm).await.unwrap();
    let before = Utc::now() - TimeDelta::seconds(60);

    let alert = Message::create(&conn, "VM_STARTED", 3, Cls::Vm, &vm_uuid, "started").await.unwrap();
    Message::create(&conn, "HOST_CLOCK_SKEW", 2, Cls::Host, "some-host", "skew").await.unwrap();

    let all = Message::get_since(&conn, before).await.unwrap();
    assert_eq!(all.len(), 2);

    let about_vm = Message::get(&conn, Cls::Vm, &vm_uuid, before).await.unwrap();
    assert_eq!(about_vm.len(), 1);
    let record = &about_vm[&alert];
    assert_eq!(record.name, "VM_STARTED");
    assert_eq!(record.priority, 3);
    assert_eq!(record.cls, Cls::Vm);
    assert_eq!(record.body, "started");

    let later = Utc::now() + TimeDelta::seconds(60);
    assert!(Message::get_since(&conn, later).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_local_login_and_logout() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = Connection::slave_local_login_with_password(pool.transport(), "root", "xenroot")
        .await
        .expect("Failed to log in locally");
    let stale = Connection::new(pool.transport(), conn.session().clone());

    assert_eq!(Vm::get_all(&conn).await.unwrap().len(), 1);
    conn.local_logout().await.unwrap();

    let err = Vm::get_all(&stale).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::SessionInvalid));

    let err = Connection::slave_local_login_with_password(pool.transport(), "root", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::SessionAuthenticationFailed));
}

#[tokio::test]
async fn test_change_password() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;

    let err = Session::change_password(&conn, "not-it", "s3cret").await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::SessionAuthenticationFailed));

    Session::change_password(&conn, "xenroot", "s3cret").await.unwrap();
    let err = Connection::login_with_password(pool.transport(), "root", "xenroot", "1.0", "test")
        .await
        .unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::SessionAuthenticationFailed));

    let fresh = Connection::login_with_password(pool.transport(), "root", "s3cret", "1.0", "test")
        .await
        .unwrap();
    fresh.logout().await.unwrap();
}

#[tokio::test]
async fn test_subject_logout_leaves_local_sessions() {
    let pool = LocalPool::start(SimConfig::default());
    let conn = login(&pool).await;

    assert!(Session::get_all_subject_identifiers(&conn).await.unwrap().is_empty());
    Session::logout_subject_identifier(&conn, "S-1-5-21-1004").await.unwrap();
    Session::logout_subject_identifier(&conn, "").await.unwrap();

    assert!(Vm::get_all(&conn).await.is_ok(), "superuser session survives");
}
