//! # Remote Classes
//!
//! One module per class the server exposes. Each declares its schema once
//! (record fields with wire keys, types and mutability, then its operations)
//! and the schema macros generate the typed call surface from it.
//!
//! Every call is an associated function on the kind marker taking the
//! [`Connection`](crate::Connection) first:
//!
//! ```ignore
//! let vm = Vm::get_by_uuid(&conn, uuid).await?;
//! Vm::set_name_label(&conn, &vm, "web-01").await?;
//! Vm::add_to_other_config(&conn, &vm, "owner", "ops").await?;
//! let task = Vm::async_start(&conn, &vm, false, false).await?;
//! ```
//!
//! Long-running operations also have an `async_*` form that returns a
//! [`Ref<Task>`](crate::framework::Ref) straight away, and each operation
//! publishes the failure kinds it is declared to raise as `<OP>_FAILURES`.

#![allow(clippy::too_many_arguments)]

mod console;
mod enums;
mod host;
mod host_metrics;
mod message;
mod network;
mod pbd;
mod pif;
mod pool;
mod secret;
mod session;
mod sr;
mod task;
mod user;
mod vbd;
mod vdi;
mod vif;
mod vm;
mod vm_metrics;

pub use console::{Console, ConsoleRecord};
pub use enums::*;
pub use host::{Host, HostRecord};
pub use host_metrics::{HostMetrics, HostMetricsRecord};
pub use message::{Message, MessageRecord};
pub use network::{Network, NetworkRecord};
pub use pbd::{Pbd, PbdRecord};
pub use pif::{Pif, PifRecord};
pub use pool::{Pool, PoolRecord};
pub use secret::{Secret, SecretRecord};
pub use session::{Session, SessionRecord};
pub use sr::{Sr, SrRecord};
pub use task::{Task, TaskRecord};
pub use user::{User, UserRecord};
pub use vbd::{Vbd, VbdRecord};
pub use vdi::{Vdi, VdiRecord};
pub use vif::{Vif, VifRecord};
pub use vm::{Vm, VmRecord};
pub use vm_metrics::{VmMetrics, VmMetricsRecord};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockServer;
    use crate::framework::{FailureKind, FromValue, Record, Ref, ToValue, Value};
    use crate::wire_struct;
    use std::collections::HashMap;

    const SESSION: &str = "OpaqueRef:session";

    #[tokio::test]
    async fn getters_send_session_then_reference() {
        let mut server = MockServer::new();
        server.expect("VM.get_name_label").return_value("web-01");

        let conn = server.connection(SESSION);
        let vm: Ref<Vm> = Ref::new("OpaqueRef:vm");
        let label = Vm::get_name_label(&conn, &vm).await.unwrap();

        assert_eq!(label, "web-01");
        assert_eq!(
            server.calls()[0].params,
            vec![Value::from(SESSION), Value::from("OpaqueRef:vm")]
        );
        server.verify();
    }

    #[tokio::test]
    async fn wire_keys_keep_server_capitalisation() {
        let mut server = MockServer::new();
        server.expect("VM.get_VCPUs_max").return_value(Value::from("4"));
        server.expect("host.get_resident_VMs").return_value(vec![Value::from("OpaqueRef:a")]);

        let conn = server.connection(SESSION);
        let vcpus = Vm::get_vcpus_max(&conn, &Ref::new("OpaqueRef:vm")).await.unwrap();
        let resident = Host::get_resident_vms(&conn, &Ref::new("OpaqueRef:h")).await.unwrap();

        assert_eq!(vcpus, 4);
        assert_eq!(resident, vec![Ref::<Vm>::new("OpaqueRef:a")]);
        server.verify();
    }

    #[tokio::test]
    async fn map_mutators_send_key_and_value() {
        let mut server = MockServer::new();
        server.expect("VM.add_to_other_config").return_value("");
        server.expect("VM.remove_from_blocked_operations").return_value("");

        let conn = server.connection(SESSION);
        let vm: Ref<Vm> = Ref::new("OpaqueRef:vm");
        Vm::add_to_other_config(&conn, &vm, "owner", "ops").await.unwrap();
        Vm::remove_from_blocked_operations(&conn, &vm, VmOperations::Start).await.unwrap();

        let calls = server.calls();
        assert_eq!(calls[0].params[2..], [Value::from("owner"), Value::from("ops")]);
        assert_eq!(calls[1].params[2], Value::from("start"));
    }

    #[tokio::test]
    async fn set_mutators_use_the_field_name() {
        let mut server = MockServer::new();
        server.expect("VIF.add_ipv4_allowed").return_value("");
        server.expect("SR.remove_tags").return_value("");

        let conn = server.connection(SESSION);
        Vif::add_ipv4_allowed(&conn, &Ref::new("OpaqueRef:vif"), "10.0.0.2").await.unwrap();
        Sr::remove_tags(&conn, &Ref::new("OpaqueRef:sr"), "gold").await.unwrap();
        server.verify();
    }

    #[tokio::test]
    async fn async_variants_route_to_the_async_prefix() {
        let mut server = MockServer::new();
        server.expect("Async.VM.start").return_value("OpaqueRef:task");
        server.expect("VM.start").return_value("");

        let conn = server.connection(SESSION);
        let vm: Ref<Vm> = Ref::new("OpaqueRef:vm");
        let task = Vm::async_start(&conn, &vm, false, true).await.unwrap();
        Vm::start(&conn, &vm, false, true).await.unwrap();

        assert_eq!(task.as_str(), "OpaqueRef:task");
        let calls = server.calls();
        assert_eq!(
            calls[0].params,
            vec![Value::from(SESSION), Value::from("OpaqueRef:vm"), Value::Bool(false), Value::Bool(true)]
        );
        assert_eq!(calls[0].params, calls[1].params);
    }

    #[tokio::test]
    async fn renamed_operations_use_their_wire_name() {
        let mut server = MockServer::new();
        server.expect("VIF.move").return_value("");
        server.expect("Async.VM.set_VCPUs_number_live").return_value("OpaqueRef:t");

        let conn = server.connection(SESSION);
        Vif::move_to(&conn, &Ref::new("OpaqueRef:vif"), &Ref::new("OpaqueRef:net")).await.unwrap();
        Vm::async_set_vcpus_number_live(&conn, &Ref::new("OpaqueRef:vm"), 4).await.unwrap();
        server.verify();
    }

    #[tokio::test]
    async fn create_returns_the_new_reference() {
        let mut server = MockServer::new();
        server.expect("VM.create").return_value("OpaqueRef:new");

        let conn = server.connection(SESSION);
        let record = VmRecord {
            name_label: "web-01".into(),
            ..Default::default()
        };
        let vm = Vm::create(&conn, &record).await.unwrap();

        assert_eq!(vm, Ref::new("OpaqueRef:new"));
        let sent = &server.calls()[0].params[1];
        assert_eq!(sent.get("name_label"), Some(&Value::from("web-01")));
        assert_eq!(sent.get("VCPUs_max"), Some(&Value::Int(0)));
        assert_eq!(sent.get("other_config"), Some(&Value::Struct(Default::default())));
    }

    #[tokio::test]
    async fn declared_failures_surface_typed() {
        let mut server = MockServer::new();
        server
            .expect("VM.start")
            .return_failure("VM_BAD_POWER_STATE", &["OpaqueRef:vm", "halted", "running"]);

        let conn = server.connection(SESSION);
        let err = Vm::start(&conn, &Ref::new("OpaqueRef:vm"), false, false).await.unwrap_err();
        let failure = err.failure().unwrap();

        assert_eq!(failure.kind, FailureKind::VmBadPowerState);
        assert!(failure.is_one_of(Vm::START_FAILURES));
        assert_eq!(failure.param(2), Some("running"));
    }

    #[tokio::test]
    async fn unknown_error_codes_keep_code_and_params() {
        let mut server = MockServer::new();
        server.expect("SR.scan").return_failure("SR_BRAND_NEW_ERROR", &["x", "y"]);

        let conn = server.connection(SESSION);
        let err = Sr::scan(&conn, &Ref::new("OpaqueRef:sr")).await.unwrap_err();
        let failure = err.failure().unwrap();

        assert_eq!(failure.kind, FailureKind::Unrecognized);
        assert_eq!(failure.code, "SR_BRAND_NEW_ERROR");
        assert_eq!(failure.params, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn wrong_payload_shape_is_a_bad_response() {
        let mut server = MockServer::new();
        server.expect("VM.get_all").return_value("not a list");

        let conn = server.connection(SESSION);
        let err = Vm::get_all(&conn).await.unwrap_err();
        assert!(matches!(err, crate::framework::Error::BadServerResponse(_)));
    }

    #[test]
    fn records_fill_missing_fields_with_defaults() {
        let wire = wire_struct! {
            "uuid" => "d3c9",
            "power_state" => "Running",
            "VCPUs_max" => "2",
            "domain_type" => "some_future_type",
        };
        let record = VmRecord::from_value(&wire).unwrap();

        assert_eq!(record.uuid, "d3c9");
        assert_eq!(record.power_state, VmPowerState::Running);
        assert_eq!(record.vcpus_max, 2);
        assert_eq!(record.domain_type, DomainType::Unrecognized);
        assert!(record.other_config.is_empty());
        assert!(record.resident_on.is_null());
        assert_eq!(record.snapshot_time.timestamp(), 0);
    }

    #[test]
    fn unset_other_config_round_trips_to_empty() {
        let record = VdiRecord::default();
        let decoded = VdiRecord::from_value(&record.to_value()).unwrap();
        assert!(decoded.other_config.is_empty());
        assert_eq!(decoded, record);
    }

    #[test]
    fn records_encode_every_field() {
        let record = PbdRecord {
            device_config: HashMap::from([("device".to_string(), "/dev/sdb".to_string())]),
            ..Default::default()
        };
        let fields = record.to_fields();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields["SR"], Value::from(crate::framework::NULL_REF));
    }
}
