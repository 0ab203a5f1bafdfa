use crate::framework::Ref;
use crate::model::{Host, Pbd, StorageOperations, Vdi};
use std::collections::HashMap;

xenapi_class! {
    /// A storage repository.
    pub class Sr = "SR";

    pub record SrRecord {
        ro uuid: String = "uuid";
        rw name_label: String = "name_label";
        rw name_description: String = "name_description";
        ro allowed_operations: Vec<StorageOperations> = "allowed_operations";
        ro current_operations: HashMap<String, StorageOperations> = "current_operations";
        ro vdis: Vec<Ref<Vdi>> = "VDIs";
        ro pbds: Vec<Ref<Pbd>> = "PBDs";
        ro virtual_allocation: i64 = "virtual_allocation";
        ro physical_utilisation: i64 = "physical_utilisation";
        ro physical_size: i64 = "physical_size";
        ro sr_type: String = "type";
        ro content_type: String = "content_type";
        rw shared: bool = "shared";
        map other_config: HashMap<String, String> = "other_config";
        set tags: Vec<String> = "tags";
        map sm_config: HashMap<String, String> = "sm_config";
        ro local_cache_enabled: bool = "local_cache_enabled";
        ro clustered: bool = "clustered";
        ro is_tools_sr: bool = "is_tools_sr";
    }
}

xenapi_methods! {
    impl Sr = "SR" {
        fn get_all() -> Vec<Ref<Sr>>;
        fn get_all_records() -> HashMap<Ref<Sr>, SrRecord>;
        fn get_by_name_label(label: &str) -> Vec<Ref<Sr>>;
        fn get_supported_types() -> Vec<String>;

        /// Creates the storage and plugs it into `host`.
        task fn create(
            host: &Ref<Host>,
            device_config: &HashMap<String, String>,
            physical_size: i64,
            name_label: &str,
            name_description: &str,
            sr_type: &str,
            content_type: &str,
            shared: bool,
            sm_config: &HashMap<String, String>,
        ) -> Ref<Sr>, raises [SrUnknownDriver, SrBackendFailure];
        /// Records existing storage in the database without touching it.
        task fn introduce(
            uuid: &str,
            name_label: &str,
            name_description: &str,
            sr_type: &str,
            content_type: &str,
            shared: bool,
            sm_config: &HashMap<String, String>,
        ) -> Ref<Sr>, raises [SrUnknownDriver];
        /// Removes the repository from the database only.
        task fn forget(this: &Ref<Sr>) -> (), raises [SrHasPbd];
        task fn destroy(this: &Ref<Sr>) -> (), raises [SrHasPbd, SrNotEmpty, SrBackendFailure];
        task fn scan(this: &Ref<Sr>) -> (), raises [SrBackendFailure];
        task fn update(this: &Ref<Sr>) -> ();
        /// Asks the storage driver what repositories exist at `device_config`.
        task fn probe(
            host: &Ref<Host>,
            device_config: &HashMap<String, String>,
            sr_type: &str,
            sm_config: &HashMap<String, String>,
        ) -> String, raises [SrUnknownDriver, SrBackendFailure];
    }
}
