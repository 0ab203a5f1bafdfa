use crate::framework::Ref;
use crate::model::{Network, Vm, VifIpv4ConfigurationMode, VifLockingMode, VifOperations};
use std::collections::HashMap;

xenapi_class! {
    /// A virtual network interface.
    pub class Vif = "VIF";

    pub record VifRecord {
        ro uuid: String = "uuid";
        ro allowed_operations: Vec<VifOperations> = "allowed_operations";
        ro current_operations: HashMap<String, VifOperations> = "current_operations";
        ro device: String = "device";
        ro network: Ref<Network> = "network";
        ro vm: Ref<Vm> = "VM";
        ro mac: String = "MAC";
        ro mtu: i64 = "MTU";
        map other_config: HashMap<String, String> = "other_config";
        ro currently_attached: bool = "currently_attached";
        ro status_code: i64 = "status_code";
        ro status_detail: String = "status_detail";
        ro runtime_properties: HashMap<String, String> = "runtime_properties";
        rw qos_algorithm_type: String = "qos_algorithm_type";
        map qos_algorithm_params: HashMap<String, String> = "qos_algorithm_params";
        ro qos_supported_algorithms: Vec<String> = "qos_supported_algorithms";
        ro mac_autogenerated: bool = "MAC_autogenerated";
        rw locking_mode: VifLockingMode = "locking_mode";
        set ipv4_allowed: Vec<String> = "ipv4_allowed";
        set ipv6_allowed: Vec<String> = "ipv6_allowed";
        ro ipv4_configuration_mode: VifIpv4ConfigurationMode = "ipv4_configuration_mode";
        ro ipv4_addresses: Vec<String> = "ipv4_addresses";
        ro ipv4_gateway: String = "ipv4_gateway";
    }
}

xenapi_methods! {
    impl Vif = "VIF" {
        fn get_all() -> Vec<Ref<Vif>>;
        fn get_all_records() -> HashMap<Ref<Vif>, VifRecord>;

        task fn create(record: &VifRecord) -> Ref<Vif>, raises [MacInvalid, DeviceAlreadyExists];
        task fn destroy(this: &Ref<Vif>) -> (), raises [OperationNotAllowed];
        task fn plug(this: &Ref<Vif>) -> (), raises [DeviceAlreadyAttached];
        task fn unplug(this: &Ref<Vif>) -> (), raises [DeviceAlreadyDetached];
        task fn unplug_force(this: &Ref<Vif>) -> (), raises [DeviceAlreadyDetached];
        /// Moves the interface to another network, live if the VM is running.
        task fn move_to = "move"(this: &Ref<Vif>, network: &Ref<Network>) -> ();
        task fn configure_ipv4(
            this: &Ref<Vif>,
            mode: VifIpv4ConfigurationMode,
            address: &str,
            gateway: &str,
        ) -> ();
    }
}
