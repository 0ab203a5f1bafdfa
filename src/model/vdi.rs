use crate::framework::Ref;
use crate::model::{OnBoot, Pool, Sr, Vbd, VdiOperations, VdiType};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

xenapi_class! {
    /// A virtual disk image.
    pub class Vdi = "VDI";

    pub record VdiRecord {
        ro uuid: String = "uuid";
        rw name_label: String = "name_label";
        rw name_description: String = "name_description";
        ro allowed_operations: Vec<VdiOperations> = "allowed_operations";
        ro current_operations: HashMap<String, VdiOperations> = "current_operations";
        ro sr: Ref<Sr> = "SR";
        ro vbds: Vec<Ref<Vbd>> = "VBDs";
        ro virtual_size: i64 = "virtual_size";
        ro physical_utilisation: i64 = "physical_utilisation";
        ro vdi_type: VdiType = "type";
        rw sharable: bool = "sharable";
        rw read_only: bool = "read_only";
        map other_config: HashMap<String, String> = "other_config";
        ro storage_lock: bool = "storage_lock";
        ro location: String = "location";
        ro managed: bool = "managed";
        ro missing: bool = "missing";
        map xenstore_data: HashMap<String, String> = "xenstore_data";
        map sm_config: HashMap<String, String> = "sm_config";
        ro is_a_snapshot: bool = "is_a_snapshot";
        ro snapshot_of: Ref<Vdi> = "snapshot_of";
        ro snapshots: Vec<Ref<Vdi>> = "snapshots";
        ro snapshot_time: DateTime<Utc> = "snapshot_time";
        set tags: Vec<String> = "tags";
        rw allow_caching: bool = "allow_caching";
        rw on_boot: OnBoot = "on_boot";
        ro metadata_of_pool: Ref<Pool> = "metadata_of_pool";
        ro metadata_latest: bool = "metadata_latest";
        ro is_tools_iso: bool = "is_tools_iso";
        ro cbt_enabled: bool = "cbt_enabled";
    }
}

xenapi_methods! {
    impl Vdi = "VDI" {
        fn get_all() -> Vec<Ref<Vdi>>;
        fn get_all_records() -> HashMap<Ref<Vdi>, VdiRecord>;
        fn get_by_name_label(label: &str) -> Vec<Ref<Vdi>>;

        task fn create(record: &VdiRecord) -> Ref<Vdi>,
            raises [SrFull, SrOperationNotSupported];
        task fn destroy(this: &Ref<Vdi>) -> (),
            raises [VdiInUse, OperationNotAllowed, SrOperationNotSupported];
        /// Records an existing disk in the database without touching storage.
        task fn introduce(
            uuid: &str,
            name_label: &str,
            name_description: &str,
            sr: &Ref<Sr>,
            vdi_type: VdiType,
            sharable: bool,
            read_only: bool,
            other_config: &HashMap<String, String>,
            location: &str,
            xenstore_data: &HashMap<String, String>,
            sm_config: &HashMap<String, String>,
            managed: bool,
            virtual_size: i64,
            physical_utilisation: i64,
            metadata_of_pool: &Ref<Pool>,
            is_a_snapshot: bool,
            snapshot_time: DateTime<Utc>,
            snapshot_of: &Ref<Vdi>,
        ) -> Ref<Vdi>, raises [SrOperationNotSupported];
        /// Removes the disk from the database only; its data stays on storage.
        task fn forget(this: &Ref<Vdi>) -> ();
        task fn snapshot(this: &Ref<Vdi>, driver_params: &HashMap<String, String>) -> Ref<Vdi>,
            raises [SrFull, SrOperationNotSupported, VdiReadonly];
        task fn clone(this: &Ref<Vdi>, driver_params: &HashMap<String, String>) -> Ref<Vdi>,
            raises [SrFull, SrOperationNotSupported, VdiReadonly];
        task fn copy(this: &Ref<Vdi>, sr: &Ref<Sr>) -> Ref<Vdi>,
            raises [SrFull, VdiReadonly];
        task fn resize(this: &Ref<Vdi>, size: i64) -> (),
            raises [VdiInUse, SrFull, SrOperationNotSupported];
        task fn enable_cbt(this: &Ref<Vdi>) -> (),
            raises [SrOperationNotSupported, VdiMissing, VdiIncompatibleType];
        task fn disable_cbt(this: &Ref<Vdi>) -> (),
            raises [SrOperationNotSupported, VdiMissing, VdiIncompatibleType];
    }
}
