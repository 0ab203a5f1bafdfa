//! # Remote Failures
//!
//! When the server answers with `Status: Failure`, the first element of
//! `ErrorDescription` is an error code and the rest are positional parameters.
//! [`Failure`] keeps both, plus the typed [`FailureKind`] the code maps to.
//! Codes this client does not know map to [`FailureKind::Unrecognized`], so a
//! newer server never breaks decoding.

use std::fmt;

wire_enum! {
    /// Error codes the server is known to raise.
    pub enum FailureKind {
        SessionAuthenticationFailed = "SESSION_AUTHENTICATION_FAILED",
        SessionInvalid = "SESSION_INVALID",
        SessionNotRegistered = "SESSION_NOT_REGISTERED",
        HostIsSlave = "HOST_IS_SLAVE",
        HandleInvalid = "HANDLE_INVALID",
        UuidInvalid = "UUID_INVALID",
        MessageMethodUnknown = "MESSAGE_METHOD_UNKNOWN",
        MessageParameterCountMismatch = "MESSAGE_PARAMETER_COUNT_MISMATCH",
        MessageDeprecated = "MESSAGE_DEPRECATED",
        MessageRemoved = "MESSAGE_REMOVED",
        FieldTypeError = "FIELD_TYPE_ERROR",
        InvalidValue = "INVALID_VALUE",
        ValueNotSupported = "VALUE_NOT_SUPPORTED",
        MapDuplicateKey = "MAP_DUPLICATE_KEY",
        PermissionDenied = "PERMISSION_DENIED",
        RbacPermissionDenied = "RBAC_PERMISSION_DENIED",
        InternalError = "INTERNAL_ERROR",
        OperationNotAllowed = "OPERATION_NOT_ALLOWED",
        OtherOperationInProgress = "OTHER_OPERATION_IN_PROGRESS",
        TaskCancelled = "TASK_CANCELLED",
        LicenceRestriction = "LICENCE_RESTRICTION",
        NoHostsAvailable = "NO_HOSTS_AVAILABLE",
        HostOffline = "HOST_OFFLINE",
        HostNotLive = "HOST_NOT_LIVE",
        HostNotEnoughFreeMemory = "HOST_NOT_ENOUGH_FREE_MEMORY",
        HostInEmergencyMode = "HOST_IN_EMERGENCY_MODE",
        CannotContactHost = "CANNOT_CONTACT_HOST",
        VmBadPowerState = "VM_BAD_POWER_STATE",
        VmIsTemplate = "VM_IS_TEMPLATE",
        VmHvmRequired = "VM_HVM_REQUIRED",
        VmMissingPvDrivers = "VM_MISSING_PV_DRIVERS",
        VmRequiresSr = "VM_REQUIRES_SR",
        VmMigrateFailed = "VM_MIGRATE_FAILED",
        VmCheckpointSuspendFailed = "VM_CHECKPOINT_SUSPEND_FAILED",
        VmShutdownTimeout = "VM_SHUTDOWN_TIMEOUT",
        VmNoSuspendSr = "VM_NO_SUSPEND_SR",
        BootloaderFailed = "BOOTLOADER_FAILED",
        UnknownBootloader = "UNKNOWN_BOOTLOADER",
        SrFull = "SR_FULL",
        SrHasPbd = "SR_HAS_PBD",
        SrHasNoPbds = "SR_HAS_NO_PBDS",
        SrOperationNotSupported = "SR_OPERATION_NOT_SUPPORTED",
        SrUnknownDriver = "SR_UNKNOWN_DRIVER",
        SrBackendFailure = "SR_BACKEND_FAILURE",
        SrNotEmpty = "SR_NOT_EMPTY",
        VdiInUse = "VDI_IN_USE",
        VdiIsAPhysicalDevice = "VDI_IS_A_PHYSICAL_DEVICE",
        VdiMissing = "VDI_MISSING",
        VdiReadonly = "VDI_READONLY",
        VdiNotAvailable = "VDI_NOT_AVAILABLE",
        VdiIncompatibleType = "VDI_INCOMPATIBLE_TYPE",
        DeviceAlreadyAttached = "DEVICE_ALREADY_ATTACHED",
        DeviceAlreadyDetached = "DEVICE_ALREADY_DETACHED",
        DeviceAlreadyExists = "DEVICE_ALREADY_EXISTS",
        DeviceDetachRejected = "DEVICE_DETACH_REJECTED",
        VbdNotEmpty = "VBD_NOT_EMPTY",
        VbdIsEmpty = "VBD_IS_EMPTY",
        VbdNotRemovableMedia = "VBD_NOT_REMOVABLE_MEDIA",
        VbdNotUnpluggable = "VBD_NOT_UNPLUGGABLE",
        PifIsPhysical = "PIF_IS_PHYSICAL",
        PifConfigurationError = "PIF_CONFIGURATION_ERROR",
        PifDoesNotAllowUnplug = "PIF_DOES_NOT_ALLOW_UNPLUG",
        NetworkContainsPif = "NETWORK_CONTAINS_PIF",
        NetworkContainsVif = "NETWORK_CONTAINS_VIF",
        MacInvalid = "MAC_INVALID",
        PoolJoiningHostConnectionFailed = "POOL_JOINING_HOST_CONNECTION_FAILED",
        JoiningHostCannotContainSharedSrs = "JOINING_HOST_CANNOT_CONTAIN_SHARED_SRS",
        HostCannotDestroySelf = "HOST_CANNOT_DESTROY_SELF",
        EventsLost = "EVENTS_LOST",
    }
}

impl FailureKind {
    /// Maps a server error code onto a kind.
    ///
    /// Storage backend errors carry a numeric suffix (`SR_BACKEND_FAILURE_46`), so
    /// they are matched by prefix.
    pub fn from_code(code: &str) -> Self {
        match FailureKind::from_wire(code) {
            FailureKind::Unrecognized if code.starts_with("SR_BACKEND_FAILURE_") => {
                FailureKind::SrBackendFailure
            }
            kind => kind,
        }
    }
}

/// A failure reported by the server.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}{}", FormatParams(.params))]
pub struct Failure {
    /// Typed classification of [`Failure::code`].
    pub kind: FailureKind,
    /// The error code exactly as the server sent it.
    pub code: String,
    /// Positional parameters that followed the code.
    pub params: Vec<String>,
}

impl Failure {
    pub fn new(code: impl Into<String>, params: Vec<String>) -> Self {
        let code = code.into();
        Self {
            kind: FailureKind::from_code(&code),
            code,
            params,
        }
    }

    pub fn is(&self, kind: FailureKind) -> bool {
        self.kind == kind
    }

    /// Whether this failure is one of `declared`, usually an operation's
    /// `*_FAILURES` list.
    pub fn is_one_of(&self, declared: &[FailureKind]) -> bool {
        declared.contains(&self.kind)
    }

    /// Parameter at `index`, if the server sent that many.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }
}

struct FormatParams<'a>(&'a [String]);

impl fmt::Display for FormatParams<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, " [{}]", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_kinds() {
        let failure = Failure::new(
            "VM_BAD_POWER_STATE",
            vec!["OpaqueRef:vm".into(), "halted".into(), "running".into()],
        );
        assert_eq!(failure.kind, FailureKind::VmBadPowerState);
        assert_eq!(failure.param(2), Some("running"));
        assert_eq!(
            failure.to_string(),
            "VM_BAD_POWER_STATE [OpaqueRef:vm, halted, running]"
        );
    }

    #[test]
    fn unknown_codes_keep_the_raw_code() {
        let failure = Failure::new("SOME_FUTURE_ERROR", vec!["x".into()]);
        assert_eq!(failure.kind, FailureKind::Unrecognized);
        assert_eq!(failure.code, "SOME_FUTURE_ERROR");
        assert_eq!(failure.params, vec!["x".to_string()]);
    }

    #[test]
    fn backend_failures_match_by_prefix() {
        let failure = Failure::new("SR_BACKEND_FAILURE_46", vec![]);
        assert_eq!(failure.kind, FailureKind::SrBackendFailure);
        assert_eq!(failure.to_string(), "SR_BACKEND_FAILURE_46");
    }

    #[test]
    fn declared_subsets() {
        let failure = Failure::new("VDI_IN_USE", vec![]);
        assert!(failure.is_one_of(&[FailureKind::VdiInUse, FailureKind::OperationNotAllowed]));
        assert!(!failure.is_one_of(&[FailureKind::SrFull]));
    }
}
