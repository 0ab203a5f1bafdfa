use crate::framework::Ref;
use crate::model::Cls;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

xenapi_class! {
    /// An alert raised about some object.
    pub class Message = "message";

    pub record MessageRecord {
        ro uuid: String = "uuid";
        ro name: String = "name";
        ro priority: i64 = "priority";
        ro cls: Cls = "cls";
        ro obj_uuid: String = "obj_uuid";
        ro timestamp: DateTime<Utc> = "timestamp";
        ro body: String = "body";
    }
}

xenapi_methods! {
    impl Message = "message" {
        fn get_all() -> Vec<Ref<Message>>;
        fn get_all_records() -> HashMap<Ref<Message>, MessageRecord>;
        fn create(name: &str, priority: i64, cls: Cls, obj_uuid: &str, body: &str) -> Ref<Message>;
        fn destroy(this: &Ref<Message>) -> ();
        /// Messages about one object raised after `since`.
        fn get(cls: Cls, obj_uuid: &str, since: DateTime<Utc>) -> HashMap<Ref<Message>, MessageRecord>;
        fn get_since(since: DateTime<Utc>) -> HashMap<Ref<Message>, MessageRecord>;
    }
}
