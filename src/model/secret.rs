use crate::framework::Ref;
use std::collections::HashMap;

xenapi_class! {
    /// A secret stored by the server, referenced by UUID from other objects'
    /// configuration.
    pub class Secret = "secret";

    pub record SecretRecord {
        ro uuid: String = "uuid";
        rw value: String = "value";
        map other_config: HashMap<String, String> = "other_config";
    }
}

xenapi_methods! {
    impl Secret = "secret" {
        fn get_all() -> Vec<Ref<Secret>>;
        fn get_all_records() -> HashMap<Ref<Secret>, SecretRecord>;
        task fn create(record: &SecretRecord) -> Ref<Secret>;
        task fn destroy(this: &Ref<Secret>) -> ();
    }
}
