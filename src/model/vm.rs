//! Virtual machines, templates and snapshots.
//!
//! A template is a VM with `is_a_template` set; a snapshot is a VM with
//! `is_a_snapshot` set. Power operations move a VM between the states of
//! [`VmPowerState`]:
//!
//! ```text
//!             start                pause
//!   Halted ----------> Running ----------> Paused
//!     ^  <----------     |  ^  <----------
//!     |  shutdown        |  |   unpause
//!     |         suspend  v  |  resume
//!     +-------------- Suspended
//!        hard_shutdown
//! ```

use crate::framework::Ref;
use crate::model::{
    Console, DomainType, Host, OnCrashBehaviour, OnNormalExit, Sr, Vbd, Vdi, Vif, VmMetrics,
    VmOperations, VmPowerState,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

xenapi_class! {
    /// A virtual machine (or template, or snapshot).
    pub class Vm = "VM";

    pub record VmRecord {
        ro uuid: String = "uuid";
        ro allowed_operations: Vec<VmOperations> = "allowed_operations";
        ro current_operations: HashMap<String, VmOperations> = "current_operations";
        rw name_label: String = "name_label";
        rw name_description: String = "name_description";
        ro power_state: VmPowerState = "power_state";
        rw user_version: i64 = "user_version";
        rw is_a_template: bool = "is_a_template";
        ro is_default_template: bool = "is_default_template";
        ro suspend_vdi: Ref<Vdi> = "suspend_VDI";
        ro resident_on: Ref<Host> = "resident_on";
        rw affinity: Ref<Host> = "affinity";
        ro memory_overhead: i64 = "memory_overhead";
        ro memory_target: i64 = "memory_target";
        ro memory_static_max: i64 = "memory_static_max";
        ro memory_dynamic_max: i64 = "memory_dynamic_max";
        ro memory_dynamic_min: i64 = "memory_dynamic_min";
        ro memory_static_min: i64 = "memory_static_min";
        map vcpus_params: HashMap<String, String> = "VCPUs_params";
        ro vcpus_max: i64 = "VCPUs_max";
        ro vcpus_at_startup: i64 = "VCPUs_at_startup";
        rw actions_after_shutdown: OnNormalExit = "actions_after_shutdown";
        rw actions_after_reboot: OnNormalExit = "actions_after_reboot";
        rw actions_after_crash: OnCrashBehaviour = "actions_after_crash";
        ro consoles: Vec<Ref<Console>> = "consoles";
        ro vifs: Vec<Ref<Vif>> = "VIFs";
        ro vbds: Vec<Ref<Vbd>> = "VBDs";
        rw pv_bootloader: String = "PV_bootloader";
        rw pv_kernel: String = "PV_kernel";
        rw pv_ramdisk: String = "PV_ramdisk";
        rw pv_args: String = "PV_args";
        rw pv_bootloader_args: String = "PV_bootloader_args";
        rw hvm_boot_policy: String = "HVM_boot_policy";
        map hvm_boot_params: HashMap<String, String> = "HVM_boot_params";
        map platform: HashMap<String, String> = "platform";
        map other_config: HashMap<String, String> = "other_config";
        ro domid: i64 = "domid";
        ro domarch: String = "domarch";
        ro last_boot_cpu_flags: HashMap<String, String> = "last_boot_CPU_flags";
        ro is_control_domain: bool = "is_control_domain";
        ro metrics: Ref<VmMetrics> = "metrics";
        ro last_booted_record: String = "last_booted_record";
        rw recommendations: String = "recommendations";
        map xenstore_data: HashMap<String, String> = "xenstore_data";
        rw ha_restart_priority: String = "ha_restart_priority";
        ro is_a_snapshot: bool = "is_a_snapshot";
        ro snapshot_of: Ref<Vm> = "snapshot_of";
        ro snapshots: Vec<Ref<Vm>> = "snapshots";
        ro snapshot_time: DateTime<Utc> = "snapshot_time";
        ro transportable_snapshot_id: String = "transportable_snapshot_id";
        set tags: Vec<String> = "tags";
        /// Operations refused with the mapped message while the key is present.
        map blocked_operations: HashMap<VmOperations, String> = "blocked_operations";
        ro bios_strings: HashMap<String, String> = "bios_strings";
        ro has_vendor_device: bool = "has_vendor_device";
        ro requires_reboot: bool = "requires_reboot";
        ro reference_label: String = "reference_label";
        rw domain_type: DomainType = "domain_type";
        rw start_delay: i64 = "start_delay";
        rw shutdown_delay: i64 = "shutdown_delay";
    }
}

xenapi_methods! {
    impl Vm = "VM" {
        fn get_all() -> Vec<Ref<Vm>>;
        fn get_all_records() -> HashMap<Ref<Vm>, VmRecord>;
        fn get_by_name_label(label: &str) -> Vec<Ref<Vm>>;

        /// Creates a VM from `record`. Unset fields take their defaults.
        task fn create(record: &VmRecord) -> Ref<Vm>;
        task fn destroy(this: &Ref<Vm>) -> (), raises [OperationNotAllowed, VmBadPowerState];

        task fn snapshot(this: &Ref<Vm>, new_name: &str) -> Ref<Vm>,
            raises [VmBadPowerState, SrFull, OperationNotAllowed];
        task fn checkpoint(this: &Ref<Vm>, new_name: &str) -> Ref<Vm>,
            raises [VmBadPowerState, SrFull, OperationNotAllowed, VmCheckpointSuspendFailed];
        task fn clone(this: &Ref<Vm>, new_name: &str) -> Ref<Vm>,
            raises [SrFull, OperationNotAllowed];
        task fn copy(this: &Ref<Vm>, new_name: &str, sr: &Ref<Sr>) -> Ref<Vm>,
            raises [SrFull, OperationNotAllowed];
        /// Reverts the VM a snapshot was taken of to the snapshot's state.
        task fn revert(snapshot: &Ref<Vm>) -> (),
            raises [VmBadPowerState, OperationNotAllowed, SrFull];
        task fn provision(this: &Ref<Vm>) -> (),
            raises [VmBadPowerState, SrFull, OperationNotAllowed];

        task fn start(this: &Ref<Vm>, start_paused: bool, force: bool) -> (),
            raises [
                VmBadPowerState, VmHvmRequired, VmIsTemplate, OtherOperationInProgress,
                OperationNotAllowed, BootloaderFailed, UnknownBootloader, NoHostsAvailable,
                LicenceRestriction,
            ];
        task fn start_on(this: &Ref<Vm>, host: &Ref<Host>, start_paused: bool, force: bool) -> (),
            raises [
                VmBadPowerState, VmIsTemplate, OtherOperationInProgress, OperationNotAllowed,
                BootloaderFailed, UnknownBootloader, HostNotEnoughFreeMemory, HostOffline,
            ];
        task fn pause(this: &Ref<Vm>) -> (),
            raises [VmBadPowerState, OtherOperationInProgress, OperationNotAllowed, VmIsTemplate];
        task fn unpause(this: &Ref<Vm>) -> (),
            raises [VmBadPowerState, OperationNotAllowed, VmIsTemplate];
        task fn clean_shutdown(this: &Ref<Vm>) -> (),
            raises [VmBadPowerState, OtherOperationInProgress, OperationNotAllowed, VmIsTemplate];
        task fn shutdown(this: &Ref<Vm>) -> (),
            raises [OtherOperationInProgress, OperationNotAllowed, VmIsTemplate];
        task fn clean_reboot(this: &Ref<Vm>) -> (),
            raises [VmBadPowerState, OtherOperationInProgress, OperationNotAllowed, VmIsTemplate];
        task fn hard_shutdown(this: &Ref<Vm>) -> (),
            raises [VmBadPowerState, OtherOperationInProgress, OperationNotAllowed, VmIsTemplate];
        task fn hard_reboot(this: &Ref<Vm>) -> (),
            raises [VmBadPowerState, OtherOperationInProgress, OperationNotAllowed, VmIsTemplate];
        fn power_state_reset(this: &Ref<Vm>) -> ();
        task fn suspend(this: &Ref<Vm>) -> (),
            raises [VmBadPowerState, OtherOperationInProgress, OperationNotAllowed, VmIsTemplate];
        task fn resume(this: &Ref<Vm>, start_paused: bool, force: bool) -> (),
            raises [VmBadPowerState, OperationNotAllowed, VmIsTemplate];
        task fn resume_on(this: &Ref<Vm>, host: &Ref<Host>, start_paused: bool, force: bool) -> (),
            raises [VmBadPowerState, OperationNotAllowed, VmIsTemplate];
        task fn pool_migrate(this: &Ref<Vm>, host: &Ref<Host>, options: &HashMap<String, String>) -> (),
            raises [VmBadPowerState, OtherOperationInProgress, VmIsTemplate, OperationNotAllowed,
                VmMigrateFailed, VmMissingPvDrivers];
        task fn assert_can_boot_here(this: &Ref<Vm>, host: &Ref<Host>) -> (),
            raises [HostNotEnoughFreeMemory, VmRequiresSr, HostOffline, HostNotLive];

        fn set_vcpus_max = "set_VCPUs_max"(this: &Ref<Vm>, value: i64) -> ();
        fn set_vcpus_at_startup = "set_VCPUs_at_startup"(this: &Ref<Vm>, value: i64) -> ();
        task fn set_vcpus_number_live = "set_VCPUs_number_live"(this: &Ref<Vm>, nvcpu: i64) -> (),
            raises [OperationNotAllowed, LicenceRestriction];
        task fn set_memory_limits(
            this: &Ref<Vm>,
            static_min: i64,
            static_max: i64,
            dynamic_min: i64,
            dynamic_max: i64,
        ) -> ();
        task fn set_memory_dynamic_range(this: &Ref<Vm>, min: i64, max: i64) -> ();

        /// The record as it was when the VM last booted.
        fn get_boot_record(this: &Ref<Vm>) -> VmRecord;
        fn get_allowed_vbd_devices = "get_allowed_VBD_devices"(this: &Ref<Vm>) -> Vec<String>;
        fn get_allowed_vif_devices = "get_allowed_VIF_devices"(this: &Ref<Vm>) -> Vec<String>;
        task fn call_plugin(
            this: &Ref<Vm>,
            plugin: &str,
            function: &str,
            args: &HashMap<String, String>,
        ) -> String;
    }
}
