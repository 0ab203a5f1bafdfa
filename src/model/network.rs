use crate::framework::Ref;
use crate::model::{NetworkDefaultLockingMode, NetworkOperations, NetworkPurpose, Pif, Vif};
use std::collections::HashMap;

xenapi_class! {
    /// A virtual network.
    pub class Network = "network";

    pub record NetworkRecord {
        ro uuid: String = "uuid";
        rw name_label: String = "name_label";
        rw name_description: String = "name_description";
        ro allowed_operations: Vec<NetworkOperations> = "allowed_operations";
        ro current_operations: HashMap<String, NetworkOperations> = "current_operations";
        ro vifs: Vec<Ref<Vif>> = "VIFs";
        ro pifs: Vec<Ref<Pif>> = "PIFs";
        rw mtu: i64 = "MTU";
        map other_config: HashMap<String, String> = "other_config";
        ro bridge: String = "bridge";
        ro managed: bool = "managed";
        set tags: Vec<String> = "tags";
        ro default_locking_mode: NetworkDefaultLockingMode = "default_locking_mode";
        ro assigned_ips: HashMap<Ref<Vif>, String> = "assigned_ips";
        ro purpose: Vec<NetworkPurpose> = "purpose";
    }
}

xenapi_methods! {
    impl Network = "network" {
        fn get_all() -> Vec<Ref<Network>>;
        fn get_all_records() -> HashMap<Ref<Network>, NetworkRecord>;
        fn get_by_name_label(label: &str) -> Vec<Ref<Network>>;

        task fn create(record: &NetworkRecord) -> Ref<Network>;
        task fn destroy(this: &Ref<Network>) -> (),
            raises [NetworkContainsPif, NetworkContainsVif];
        task fn set_default_locking_mode(this: &Ref<Network>, value: NetworkDefaultLockingMode) -> ();
        task fn add_purpose(this: &Ref<Network>, value: NetworkPurpose) -> ();
        task fn remove_purpose(this: &Ref<Network>, value: NetworkPurpose) -> ();
    }
}
