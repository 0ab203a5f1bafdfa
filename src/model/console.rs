use crate::framework::Ref;
use crate::model::{ConsoleProtocol, Vm};
use std::collections::HashMap;

xenapi_class! {
    /// A console a VM can be reached on.
    pub class Console = "console";

    pub record ConsoleRecord {
        ro uuid: String = "uuid";
        ro protocol: ConsoleProtocol = "protocol";
        ro location: String = "location";
        ro vm: Ref<Vm> = "VM";
        map other_config: HashMap<String, String> = "other_config";
    }
}

xenapi_methods! {
    impl Console = "console" {
        fn get_all() -> Vec<Ref<Console>>;
        fn get_all_records() -> HashMap<Ref<Console>, ConsoleRecord>;
        task fn create(record: &ConsoleRecord) -> Ref<Console>;
        task fn destroy(this: &Ref<Console>) -> ();
    }
}
