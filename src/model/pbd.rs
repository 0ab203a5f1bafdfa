use crate::framework::Ref;
use crate::model::{Host, Sr};
use std::collections::HashMap;

xenapi_class! {
    /// A physical block device: how a host reaches a storage repository.
    pub class Pbd = "PBD";

    pub record PbdRecord {
        ro uuid: String = "uuid";
        ro host: Ref<Host> = "host";
        ro sr: Ref<Sr> = "SR";
        ro device_config: HashMap<String, String> = "device_config";
        ro currently_attached: bool = "currently_attached";
        map other_config: HashMap<String, String> = "other_config";
    }
}

xenapi_methods! {
    impl Pbd = "PBD" {
        fn get_all() -> Vec<Ref<Pbd>>;
        fn get_all_records() -> HashMap<Ref<Pbd>, PbdRecord>;

        task fn create(record: &PbdRecord) -> Ref<Pbd>;
        task fn destroy(this: &Ref<Pbd>) -> (), raises [OperationNotAllowed];
        task fn plug(this: &Ref<Pbd>) -> (), raises [SrBackendFailure];
        task fn unplug(this: &Ref<Pbd>) -> (), raises [SrBackendFailure];
        task fn set_device_config(this: &Ref<Pbd>, value: &HashMap<String, String>) -> ();
    }
}
