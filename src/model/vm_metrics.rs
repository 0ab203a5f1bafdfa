use crate::framework::Ref;
use crate::model::DomainType;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

xenapi_class! {
    /// Runtime figures for a running VM.
    pub class VmMetrics = "VM_metrics";

    pub record VmMetricsRecord {
        ro uuid: String = "uuid";
        ro memory_actual: i64 = "memory_actual";
        ro vcpus_number: i64 = "VCPUs_number";
        /// Utilisation per vCPU index, from 0.0 to 1.0.
        ro vcpus_utilisation: HashMap<i64, f64> = "VCPUs_utilisation";
        ro vcpus_cpu: HashMap<i64, i64> = "VCPUs_CPU";
        ro vcpus_params: HashMap<String, String> = "VCPUs_params";
        ro vcpus_flags: HashMap<i64, Vec<String>> = "VCPUs_flags";
        ro state: Vec<String> = "state";
        ro start_time: DateTime<Utc> = "start_time";
        ro install_time: DateTime<Utc> = "install_time";
        ro last_updated: DateTime<Utc> = "last_updated";
        map other_config: HashMap<String, String> = "other_config";
        ro hvm: bool = "hvm";
        ro nested_virt: bool = "nested_virt";
        ro nomigrate: bool = "nomigrate";
        ro current_domain_type: DomainType = "current_domain_type";
    }
}

xenapi_methods! {
    impl VmMetrics = "VM_metrics" {
        fn get_all() -> Vec<Ref<VmMetrics>>;
        fn get_all_records() -> HashMap<Ref<VmMetrics>, VmMetricsRecord>;
    }
}
