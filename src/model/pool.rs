use crate::framework::Ref;
use crate::model::{Host, PoolAllowedOperations, Sr};
use std::collections::HashMap;

xenapi_class! {
    /// A pool of hosts. There is exactly one per deployment.
    pub class Pool = "pool";

    pub record PoolRecord {
        ro uuid: String = "uuid";
        rw name_label: String = "name_label";
        rw name_description: String = "name_description";
        ro master: Ref<Host> = "master";
        rw default_sr: Ref<Sr> = "default_SR";
        rw suspend_image_sr: Ref<Sr> = "suspend_image_SR";
        rw crash_dump_sr: Ref<Sr> = "crash_dump_SR";
        map other_config: HashMap<String, String> = "other_config";
        ro ha_enabled: bool = "ha_enabled";
        ro ha_configuration: HashMap<String, String> = "ha_configuration";
        ro ha_host_failures_to_tolerate: i64 = "ha_host_failures_to_tolerate";
        ro allowed_operations: Vec<PoolAllowedOperations> = "allowed_operations";
        ro current_operations: HashMap<String, PoolAllowedOperations> = "current_operations";
        set tags: Vec<String> = "tags";
        map gui_config: HashMap<String, String> = "gui_config";
        rw wlb_enabled: bool = "wlb_enabled";
        ro redo_log_enabled: bool = "redo_log_enabled";
        ro restrictions: HashMap<String, String> = "restrictions";
    }
}

xenapi_methods! {
    impl Pool = "pool" {
        fn get_all() -> Vec<Ref<Pool>>;
        fn get_all_records() -> HashMap<Ref<Pool>, PoolRecord>;
        /// Makes the host this session is on join the pool mastered at
        /// `master_address`.
        task fn join(master_address: &str, master_username: &str, master_password: &str) -> (),
            raises [JoiningHostCannotContainSharedSrs, PoolJoiningHostConnectionFailed];
        task fn eject(host: &Ref<Host>) -> (), raises [OperationNotAllowed];
        task fn sync_database() -> ();
        task fn designate_new_master(host: &Ref<Host>) -> ();
    }
}
