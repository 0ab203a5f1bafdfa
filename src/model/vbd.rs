use crate::framework::Ref;
use crate::model::{Vdi, Vm, VbdMode, VbdOperations, VbdType};
use std::collections::HashMap;

xenapi_class! {
    /// A virtual block device: the attachment of a VDI to a VM.
    pub class Vbd = "VBD";

    pub record VbdRecord {
        ro uuid: String = "uuid";
        ro allowed_operations: Vec<VbdOperations> = "allowed_operations";
        ro current_operations: HashMap<String, VbdOperations> = "current_operations";
        ro vm: Ref<Vm> = "VM";
        ro vdi: Ref<Vdi> = "VDI";
        ro device: String = "device";
        rw userdevice: String = "userdevice";
        rw bootable: bool = "bootable";
        rw mode: VbdMode = "mode";
        rw vbd_type: VbdType = "type";
        rw unpluggable: bool = "unpluggable";
        ro storage_lock: bool = "storage_lock";
        ro empty: bool = "empty";
        map other_config: HashMap<String, String> = "other_config";
        ro currently_attached: bool = "currently_attached";
        ro status_code: i64 = "status_code";
        ro status_detail: String = "status_detail";
        ro runtime_properties: HashMap<String, String> = "runtime_properties";
        rw qos_algorithm_type: String = "qos_algorithm_type";
        map qos_algorithm_params: HashMap<String, String> = "qos_algorithm_params";
        ro qos_supported_algorithms: Vec<String> = "qos_supported_algorithms";
    }
}

xenapi_methods! {
    impl Vbd = "VBD" {
        fn get_all() -> Vec<Ref<Vbd>>;
        fn get_all_records() -> HashMap<Ref<Vbd>, VbdRecord>;

        task fn create(record: &VbdRecord) -> Ref<Vbd>, raises [DeviceAlreadyExists];
        task fn destroy(this: &Ref<Vbd>) -> (), raises [OperationNotAllowed];
        /// Removes the media from a removable device.
        task fn eject(this: &Ref<Vbd>) -> (), raises [VbdNotRemovableMedia, VbdIsEmpty];
        task fn insert(this: &Ref<Vbd>, vdi: &Ref<Vdi>) -> (),
            raises [VbdNotRemovableMedia, VbdNotEmpty];
        task fn plug(this: &Ref<Vbd>) -> (), raises [DeviceAlreadyAttached];
        task fn unplug(this: &Ref<Vbd>) -> (),
            raises [DeviceDetachRejected, DeviceAlreadyDetached, VbdNotUnpluggable];
        task fn unplug_force(this: &Ref<Vbd>) -> (), raises [DeviceAlreadyDetached];
        task fn assert_attachable(this: &Ref<Vbd>) -> ();
    }
}
