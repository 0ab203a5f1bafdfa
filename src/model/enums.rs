//! Enumerations used by record fields and operation arguments.
//!
//! Each one decodes unknown wire strings to `Unrecognized`, so records from
//! newer servers still decode.

wire_enum! {
    /// Power state of a VM.
    pub enum VmPowerState {
        Halted = "Halted",
        Paused = "Paused",
        Running = "Running",
        Suspended = "Suspended",
    }
}

wire_enum! {
    pub enum VmOperations {
        Snapshot = "snapshot",
        Clone = "clone",
        Copy = "copy",
        CreateTemplate = "create_template",
        Revert = "revert",
        Checkpoint = "checkpoint",
        SnapshotWithQuiesce = "snapshot_with_quiesce",
        Provision = "provision",
        Start = "start",
        StartOn = "start_on",
        Pause = "pause",
        Unpause = "unpause",
        CleanShutdown = "clean_shutdown",
        CleanReboot = "clean_reboot",
        HardShutdown = "hard_shutdown",
        PowerStateReset = "power_state_reset",
        HardReboot = "hard_reboot",
        Suspend = "suspend",
        Csvm = "csvm",
        Resume = "resume",
        ResumeOn = "resume_on",
        PoolMigrate = "pool_migrate",
        MigrateSend = "migrate_send",
        GetBootRecord = "get_boot_record",
        SendSysrq = "send_sysrq",
        SendTrigger = "send_trigger",
        QueryServices = "query_services",
        Shutdown = "shutdown",
        CallPlugin = "call_plugin",
        ChangingMemoryLive = "changing_memory_live",
        AwaitingMemoryLive = "awaiting_memory_live",
        ChangingDynamicRange = "changing_dynamic_range",
        ChangingStaticRange = "changing_static_range",
        ChangingMemoryLimits = "changing_memory_limits",
        ChangingShadowMemory = "changing_shadow_memory",
        ChangingShadowMemoryLive = "changing_shadow_memory_live",
        ChangingVcpus = "changing_VCPUs",
        ChangingVcpusLive = "changing_VCPUs_live",
        AssertOperationValid = "assert_operation_valid",
        DataSourceOp = "data_source_op",
        UpdateAllowedOperations = "update_allowed_operations",
        MakeIntoTemplate = "make_into_template",
        ImportSetup = "import_setup",
        Import = "import",
        Export = "export",
        MetadataExport = "metadata_export",
        Reverting = "reverting",
        Destroy = "destroy",
    }
}

wire_enum! {
    /// What to do when a VM shuts down or reboots.
    pub enum OnNormalExit {
        Destroy = "destroy",
        Restart = "restart",
    }
}

wire_enum! {
    pub enum OnCrashBehaviour {
        CoredumpAndDestroy = "coredump_and_destroy",
        CoredumpAndRestart = "coredump_and_restart",
        Destroy = "destroy",
        Preserve = "preserve",
        RenameRestart = "rename_restart",
        Restart = "restart",
    }
}

wire_enum! {
    pub enum DomainType {
        Hvm = "hvm",
        Pv = "pv",
        PvInPvh = "pv_in_pvh",
        Pvh = "pvh",
    }
}

wire_enum! {
    pub enum VbdType {
        Cd = "CD",
        Disk = "Disk",
        Floppy = "Floppy",
    }
}

wire_enum! {
    pub enum VbdMode {
        Ro = "RO",
        Rw = "RW",
    }
}

wire_enum! {
    pub enum VbdOperations {
        Attach = "attach",
        Eject = "eject",
        Insert = "insert",
        Plug = "plug",
        Unplug = "unplug",
        UnplugForce = "unplug_force",
        Pause = "pause",
        Unpause = "unpause",
    }
}

wire_enum! {
    pub enum VdiType {
        System = "system",
        User = "user",
        Ephemeral = "ephemeral",
        Suspend = "suspend",
        Crashdump = "crashdump",
        HaStatefile = "ha_statefile",
        Metadata = "metadata",
        RedoLog = "redo_log",
        Rrd = "rrd",
        PvsCache = "pvs_cache",
        CbtMetadata = "cbt_metadata",
    }
}

wire_enum! {
    pub enum VdiOperations {
        Clone = "clone",
        Copy = "copy",
        Resize = "resize",
        ResizeOnline = "resize_online",
        Snapshot = "snapshot",
        MirrorOp = "mirror",
        Destroy = "destroy",
        Forget = "forget",
        Update = "update",
        ForceUnlock = "force_unlock",
        GenerateConfig = "generate_config",
        EnableCbt = "enable_cbt",
        DisableCbt = "disable_cbt",
        DataDestroy = "data_destroy",
        ListChangedBlocks = "list_changed_blocks",
        SetOnBoot = "set_on_boot",
        Blocked = "blocked",
    }
}

wire_enum! {
    /// Whether a VDI keeps its contents across VM boots.
    pub enum OnBoot {
        Reset = "reset",
        Persist = "persist",
    }
}

wire_enum! {
    pub enum StorageOperations {
        Scan = "scan",
        Destroy = "destroy",
        Forget = "forget",
        Plug = "plug",
        Unplug = "unplug",
        Update = "update",
        VdiCreate = "vdi_create",
        VdiIntroduce = "vdi_introduce",
        VdiDestroy = "vdi_destroy",
        VdiResize = "vdi_resize",
        VdiClone = "vdi_clone",
        VdiSnapshot = "vdi_snapshot",
        VdiMirror = "vdi_mirror",
        VdiEnableCbt = "vdi_enable_cbt",
        VdiDisableCbt = "vdi_disable_cbt",
        VdiDataDestroy = "vdi_data_destroy",
        VdiListChangedBlocks = "vdi_list_changed_blocks",
        VdiSetOnBoot = "vdi_set_on_boot",
        PbdCreate = "pbd_create",
        PbdDestroy = "pbd_destroy",
    }
}

wire_enum! {
    pub enum TaskStatusType {
        Pending = "pending",
        Success = "success",
        Failure = "failure",
        Cancelling = "cancelling",
        Cancelled = "cancelled",
    }
}

wire_enum! {
    pub enum TaskAllowedOperations {
        Cancel = "cancel",
        Destroy = "destroy",
    }
}

wire_enum! {
    pub enum IpConfigurationMode {
        None = "None",
        Dhcp = "DHCP",
        Static = "Static",
    }
}

wire_enum! {
    pub enum Ipv6ConfigurationMode {
        None = "None",
        Dhcp = "DHCP",
        Static = "Static",
        Autoconf = "Autoconf",
    }
}

wire_enum! {
    pub enum PrimaryAddressType {
        Ipv4 = "IPv4",
        Ipv6 = "IPv6",
    }
}

wire_enum! {
    pub enum NetworkOperations {
        Attaching = "attaching",
    }
}

wire_enum! {
    pub enum NetworkDefaultLockingMode {
        Unlocked = "unlocked",
        Disabled = "disabled",
    }
}

wire_enum! {
    pub enum NetworkPurpose {
        Nbd = "nbd",
        InsecureNbd = "insecure_nbd",
    }
}

wire_enum! {
    pub enum VifLockingMode {
        NetworkDefault = "network_default",
        Locked = "locked",
        Unlocked = "unlocked",
        Disabled = "disabled",
    }
}

wire_enum! {
    pub enum VifOperations {
        Attach = "attach",
        Plug = "plug",
        Unplug = "unplug",
    }
}

wire_enum! {
    pub enum VifIpv4ConfigurationMode {
        None = "None",
        Static = "Static",
    }
}

wire_enum! {
    pub enum HostAllowedOperations {
        Provision = "provision",
        Evacuate = "evacuate",
        Shutdown = "shutdown",
        Reboot = "reboot",
        PowerOn = "power_on",
        VmStart = "vm_start",
        VmResume = "vm_resume",
        VmMigrate = "vm_migrate",
        ApplyUpdates = "apply_updates",
        Enable = "enable",
    }
}

wire_enum! {
    pub enum ConsoleProtocol {
        Vt100 = "vt100",
        Rfb = "rfb",
        Rdp = "rdp",
    }
}

wire_enum! {
    /// Class of the object a message is about.
    pub enum Cls {
        Vm = "VM",
        Host = "Host",
        Sr = "SR",
        Pool = "Pool",
        VmPp = "VMPP",
        VmSs = "VMSS",
        PvsProxy = "PVS_proxy",
        Vdi = "VDI",
        Certificate = "Certificate",
    }
}

wire_enum! {
    pub enum PoolAllowedOperations {
        HaEnable = "ha_enable",
        HaDisable = "ha_disable",
        ClusterCreate = "cluster_create",
        DesignateNewMaster = "designate_new_master",
        ApplyUpdates = "apply_updates",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{FromValue, ToValue, Value};

    #[test]
    fn unknown_strings_decode_to_unrecognized() {
        let state = VmPowerState::from_value(&Value::from("Hibernating")).unwrap();
        assert_eq!(state, VmPowerState::Unrecognized);
        assert_eq!(state.to_value(), Value::from("UNRECOGNIZED"));
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(VmPowerState::from_wire("running"), VmPowerState::Running);
        assert_eq!(VbdType::from_wire("cd"), VbdType::Cd);
        assert_eq!(VbdType::Cd.to_string(), "CD");
    }

    #[test]
    fn default_is_unrecognized() {
        assert_eq!(OnBoot::default(), OnBoot::Unrecognized);
        assert!(!OnBoot::KNOWN.contains(&OnBoot::Unrecognized));
    }

    #[test]
    fn non_strings_are_bad_responses() {
        assert!(VdiType::from_value(&Value::Int(1)).is_err());
    }
}
