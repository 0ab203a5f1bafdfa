use crate::framework::Ref;
use crate::model::{Host, Task, User};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

xenapi_class! {
    /// An authenticated connection context. Login and logout live on
    /// [`Connection`](crate::Connection).
    pub class Session = "session";

    pub record SessionRecord {
        ro uuid: String = "uuid";
        ro this_host: Ref<Host> = "this_host";
        ro this_user: Ref<User> = "this_user";
        ro last_active: DateTime<Utc> = "last_active";
        ro pool: bool = "pool";
        map other_config: HashMap<String, String> = "other_config";
        ro is_local_superuser: bool = "is_local_superuser";
        ro validation_time: DateTime<Utc> = "validation_time";
        ro auth_user_sid: String = "auth_user_sid";
        ro auth_user_name: String = "auth_user_name";
        ro rbac_permissions: Vec<String> = "rbac_permissions";
        ro tasks: Vec<Ref<Task>> = "tasks";
        ro parent: Ref<Session> = "parent";
        ro originator: String = "originator";
    }
}

xenapi_methods! {
    impl Session = "session" {
        fn change_password(old_pwd: &str, new_pwd: &str) -> (),
            raises [SessionAuthenticationFailed];
        fn get_all_subject_identifiers() -> Vec<String>;
        fn logout_subject_identifier(subject_identifier: &str) -> ();
    }
}
