use crate::framework::Ref;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

xenapi_class! {
    /// Live memory figures for a host.
    pub class HostMetrics = "host_metrics";

    pub record HostMetricsRecord {
        ro uuid: String = "uuid";
        ro memory_total: i64 = "memory_total";
        ro memory_free: i64 = "memory_free";
        ro live: bool = "live";
        ro last_updated: DateTime<Utc> = "last_updated";
        map other_config: HashMap<String, String> = "other_config";
    }
}

xenapi_methods! {
    impl HostMetrics = "host_metrics" {
        fn get_all() -> Vec<Ref<HostMetrics>>;
        fn get_all_records() -> HashMap<Ref<HostMetrics>, HostMetricsRecord>;
    }
}
