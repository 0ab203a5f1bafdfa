use crate::framework::Ref;
use crate::model::{HostAllowedOperations, HostMetrics, Pbd, Pif, Sr, Vm};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

xenapi_class! {
    /// A physical host.
    pub class Host = "host";

    pub record HostRecord {
        ro uuid: String = "uuid";
        rw name_label: String = "name_label";
        rw name_description: String = "name_description";
        ro memory_overhead: i64 = "memory_overhead";
        ro allowed_operations: Vec<HostAllowedOperations> = "allowed_operations";
        ro current_operations: HashMap<String, HostAllowedOperations> = "current_operations";
        ro api_version_major: i64 = "API_version_major";
        ro api_version_minor: i64 = "API_version_minor";
        ro api_version_vendor: String = "API_version_vendor";
        ro software_version: HashMap<String, String> = "software_version";
        ro enabled: bool = "enabled";
        map other_config: HashMap<String, String> = "other_config";
        ro capabilities: Vec<String> = "capabilities";
        ro cpu_configuration: HashMap<String, String> = "cpu_configuration";
        ro sched_policy: String = "sched_policy";
        ro supported_bootloaders: Vec<String> = "supported_bootloaders";
        ro resident_vms: Vec<Ref<Vm>> = "resident_VMs";
        map logging: HashMap<String, String> = "logging";
        ro pifs: Vec<Ref<Pif>> = "PIFs";
        rw suspend_image_sr: Ref<Sr> = "suspend_image_sr";
        rw crash_dump_sr: Ref<Sr> = "crash_dump_sr";
        ro pbds: Vec<Ref<Pbd>> = "PBDs";
        rw hostname: String = "hostname";
        rw address: String = "address";
        ro metrics: Ref<HostMetrics> = "metrics";
        ro license_params: HashMap<String, String> = "license_params";
        ro edition: String = "edition";
        set tags: Vec<String> = "tags";
        ro cpu_info: HashMap<String, String> = "cpu_info";
    }
}

xenapi_methods! {
    impl Host = "host" {
        fn get_all() -> Vec<Ref<Host>>;
        fn get_all_records() -> HashMap<Ref<Host>, HostRecord>;
        fn get_by_name_label(label: &str) -> Vec<Ref<Host>>;
        fn destroy(this: &Ref<Host>) -> (), raises [HostCannotDestroySelf];
        /// Stops new VMs from starting on the host.
        task fn disable(this: &Ref<Host>) -> (), raises [HostInEmergencyMode];
        task fn enable(this: &Ref<Host>) -> (), raises [HostInEmergencyMode];
        task fn shutdown(this: &Ref<Host>) -> (), raises [OperationNotAllowed];
        task fn reboot(this: &Ref<Host>) -> (), raises [OperationNotAllowed];
        task fn evacuate(this: &Ref<Host>) -> (), raises [OperationNotAllowed, HostNotEnoughFreeMemory];
        task fn compute_free_memory(this: &Ref<Host>) -> i64;
        fn get_servertime(this: &Ref<Host>) -> DateTime<Utc>;
        task fn call_plugin(this: &Ref<Host>, plugin: &str, function: &str, args: &HashMap<String, String>) -> String;
    }
}
