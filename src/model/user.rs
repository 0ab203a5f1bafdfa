use std::collections::HashMap;

xenapi_class! {
    /// A local user account.
    pub class User = "user";

    pub record UserRecord {
        ro uuid: String = "uuid";
        ro short_name: String = "short_name";
        rw fullname: String = "fullname";
        map other_config: HashMap<String, String> = "other_config";
    }
}
