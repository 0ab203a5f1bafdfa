use super::config::SimConfig;
use super::store::{fail, Database, Fields, SimResult};
use super::transport::{SimRequest, SimTransport};
use crate::framework::{Failure, FailureKind, FromValue, Value, ASYNC_PREFIX, NULL_REF};
use crate::model::{TaskStatusType, VmPowerState};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// The arguments of a call after the session reference was taken off.
struct Args {
    method: String,
    params: Vec<Value>,
}

impl Args {
    fn take<const N: usize>(self) -> SimResult<[Value; N]> {
        let Args { method, params } = self;
        let received = params.len();
        <[Value; N]>::try_from(params).map_err(|_| {
            fail(
                FailureKind::MessageParameterCountMismatch,
                [method, N.to_string(), received.to_string()],
            )
        })
    }
}

/// An in-memory pool with one host, answering calls over a channel.
///
/// Requests are handled one at a time in arrival order, so the object tables
/// need no locking. Build one with [`SimServer::new`], spawn [`SimServer::run`]
/// and talk to it through the returned [`SimTransport`].
pub struct SimServer {
    receiver: mpsc::Receiver<SimRequest>,
    db: Database,
    config: SimConfig,
    master: String,
    next_domid: i64,
}

impl SimServer {
    /// Builds the simulator with its pool, host, local storage and
    /// management network already in place.
    pub fn new(buffer_size: usize, config: SimConfig) -> (Self, SimTransport) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let mut db = Database::new();
        let now = Value::DateTime(Utc::now());

        let metrics = insert_with(&mut db, "host_metrics", [
            ("memory_total", Value::from(config.host_memory)),
            ("memory_free", Value::from(config.host_memory)),
            ("live", Value::from(true)),
            ("last_updated", now.clone()),
        ]);
        let master = insert_with(&mut db, "host", [
            ("name_label", Value::from(config.host_name.as_str())),
            ("hostname", Value::from(config.host_name.as_str())),
            ("address", Value::from("127.0.0.1")),
            ("API_version_major", Value::from(config.api_version_major)),
            ("API_version_minor", Value::from(config.api_version_minor)),
            ("API_version_vendor", Value::from("XenSource")),
            ("enabled", Value::from(true)),
            ("metrics", Value::from(metrics)),
            ("software_version", crate::wire_struct! { "product_brand" => "XenServer" }),
        ]);
        let sr = insert_with(&mut db, "SR", [
            ("name_label", Value::from("Local storage")),
            ("type", Value::from("lvm")),
            ("content_type", Value::from("user")),
            ("physical_size", Value::from(500i64 << 30)),
        ]);
        insert_with(&mut db, "PBD", [
            ("host", Value::from(master.as_str())),
            ("SR", Value::from(sr.as_str())),
            ("device_config", crate::wire_struct! { "device" => "/dev/sda3" }),
            ("currently_attached", Value::from(true)),
        ]);
        let network = insert_with(&mut db, "network", [
            ("name_label", Value::from("Pool-wide network associated with eth0")),
            ("bridge", Value::from("xenbr0")),
            ("MTU", Value::from(1500i64)),
            ("managed", Value::from(true)),
        ]);
        insert_with(&mut db, "PIF", [
            ("device", Value::from("eth0")),
            ("network", Value::from(network)),
            ("host", Value::from(master.as_str())),
            ("MAC", Value::from("00:16:3e:00:00:01")),
            ("MTU", Value::from(1500i64)),
            ("physical", Value::from(true)),
            ("management", Value::from(true)),
            ("currently_attached", Value::from(true)),
        ]);
        insert_with(&mut db, "pool", [
            ("name_label", Value::from(config.pool_name.as_str())),
            ("master", Value::from(master.as_str())),
            ("default_SR", Value::from(sr.as_str())),
            ("suspend_image_SR", Value::from(sr.as_str())),
            ("crash_dump_SR", Value::from(sr)),
        ]);
        let dom0 = insert_with(&mut db, "VM", [
            ("name_label", Value::from(format!("Control domain on host: {}", config.host_name))),
            ("is_control_domain", Value::from(true)),
            ("power_state", Value::from(VmPowerState::Running.as_str())),
            ("resident_on", Value::from(master.as_str())),
            ("domid", Value::from(0i64)),
        ]);
        if let Err(failure) = db.set_membership("host", &master, "resident_VMs", Value::from(dom0), true) {
            error!(code = %failure.code, params = ?failure.params, "Failed to seed the control domain");
        }

        let server = Self {
            receiver,
            db,
            config,
            master,
            next_domid: 1,
        };
        (server, SimTransport::new(sender))
    }

    /// Answers requests until every transport is dropped.
    pub async fn run(mut self) {
        info!(pool = %self.config.pool_name, host = %self.config.host_name, "Simulator started");

        while let Some(SimRequest { method, params, respond_to }) = self.receiver.recv().await {
            debug!(%method, args = params.len(), "Request");
            let result = self.handle(&method, params);
            if let Err(failure) = &result {
                warn!(%method, code = %failure.code, "Request failed");
            }
            let _ = respond_to.send(respond(result));
        }

        info!(objects = self.db.objects(), "Shutdown");
    }

    fn handle(&mut self, method: &str, params: Vec<Value>) -> SimResult {
        if let Some(inner) = method.strip_prefix(ASYNC_PREFIX) {
            return self.handle_async(inner, params);
        }
        let (class, op) = method.split_once('.').ok_or_else(|| unknown(method))?;
        let args = Args {
            method: method.to_string(),
            params,
        };
        match (class, op) {
            ("session", "login_with_password") => {
                let [username, password, _version, originator] = args.take()?;
                self.login(&username, &password, text(&originator)?)
            }
            ("session", "slave_local_login_with_password") => {
                let [username, password] = args.take()?;
                self.login(&username, &password, String::new())
            }
            _ => {
                let (session, args) = self.authenticate(args)?;
                self.dispatch(class, op, &session, args)
            }
        }
    }

    /// Runs the call behind an `Async.` method and records its outcome in a
    /// finished task. Malformed calls fail directly, as the server does.
    fn handle_async(&mut self, inner: &str, params: Vec<Value>) -> SimResult {
        let session = params.first().and_then(Value::as_str).unwrap_or_default().to_string();
        if !self.db.contains("session", &session) {
            return Err(fail(FailureKind::SessionInvalid, [session]));
        }

        let created = Value::DateTime(Utc::now());
        let outcome = self.handle(inner, params);
        if matches!(&outcome, Err(failure) if failure.is_one_of(&[
            FailureKind::MessageMethodUnknown,
            FailureKind::MessageParameterCountMismatch,
        ])) {
            return outcome;
        }

        let mut task = self.blank("task");
        put(&mut task, "name_label", format!("{ASYNC_PREFIX}{inner}"));
        put(&mut task, "created", created);
        put(&mut task, "finished", Value::DateTime(Utc::now()));
        put(&mut task, "progress", 1.0);
        put(&mut task, "resident_on", self.master.as_str());
        match outcome {
            Ok(value) => {
                put(&mut task, "status", TaskStatusType::Success.as_str());
                put(&mut task, "result", format!("<value>{value}</value>"));
            }
            Err(failure) => {
                put(&mut task, "status", TaskStatusType::Failure.as_str());
                put(&mut task, "error_info", error_description(failure));
            }
        }
        let task = self.db.insert("task", task);
        debug!(%task, method = inner, "Task finished");
        Ok(Value::from(task))
    }

    fn login(&mut self, username: &Value, password: &Value, originator: String) -> SimResult {
        let username = text(username)?;
        if username != self.config.username || text(password)? != self.config.password {
            warn!(%username, "Authentication failed");
            return Err(fail(
                FailureKind::SessionAuthenticationFailed,
                [username.as_str(), "Authentication failure"],
            ));
        }

        let now = Value::DateTime(Utc::now());
        let mut session = self.blank("session");
        put(&mut session, "this_host", self.master.as_str());
        put(&mut session, "last_active", now.clone());
        put(&mut session, "validation_time", now);
        put(&mut session, "is_local_superuser", true);
        put(&mut session, "auth_user_name", username.as_str());
        put(&mut session, "originator", originator);
        let session = self.db.insert("session", session);
        info!(%username, %session, "Logged in");
        Ok(Value::from(session))
    }

    /// Splits off and validates the session reference every call but login
    /// carries first.
    fn authenticate(&mut self, args: Args) -> SimResult<(String, Args)> {
        let Args { method, mut params } = args;
        let session = if params.is_empty() {
            String::new()
        } else {
            params.remove(0).as_str().unwrap_or_default().to_string()
        };
        if !self.db.contains("session", &session) {
            return Err(fail(FailureKind::SessionInvalid, [session]));
        }
        self.db
            .set_field("session", &session, "last_active", Value::DateTime(Utc::now()))?;
        Ok((session, Args { method, params }))
    }

    fn dispatch(&mut self, class: &str, op: &str, session: &str, args: Args) -> SimResult {
        match (class, op) {
            ("session", "logout" | "local_logout") => {
                args.take::<0>()?;
                self.db.remove("session", session)?;
                info!(session, "Logged out");
                Ok(void())
            }
            ("session", "change_password") => {
                let [old, new] = args.take()?;
                if text(&old)? != self.config.password {
                    return Err(fail(
                        FailureKind::SessionAuthenticationFailed,
                        [self.config.username.as_str(), "Old password does not match"],
                    ));
                }
                self.config.password = text(&new)?;
                info!(username = %self.config.username, "Password changed");
                Ok(void())
            }
            ("session", "get_all_subject_identifiers") => {
                args.take::<0>()?;
                Ok(Value::Array(Vec::new()))
            }
            ("session", "logout_subject_identifier") => {
                let [subject] = args.take()?;
                let subject = text(&subject)?;
                // Local superuser sessions carry no subject and are never matched.
                let sessions: Vec<String> = self
                    .db
                    .table("session")
                    .filter(|(_, fields)| {
                        let sid = str_field(fields, "auth_user_sid");
                        !sid.is_empty() && sid == subject
                    })
                    .map(|(opaque, _)| opaque.clone())
                    .collect();
                for session in sessions {
                    self.db.remove("session", &session)?;
                }
                Ok(void())
            }
            ("host", "get_servertime") => {
                let [host] = args.take()?;
                self.db.get("host", &text(&host)?)?;
                Ok(Value::DateTime(Utc::now()))
            }
            ("task", "create") => {
                let [label, description] = args.take()?;
                let mut task = self.blank("task");
                put(&mut task, "name_label", label);
                put(&mut task, "name_description", description);
                put(&mut task, "status", TaskStatusType::Pending.as_str());
                put(&mut task, "created", Value::DateTime(Utc::now()));
                put(&mut task, "resident_on", self.master.as_str());
                Ok(Value::from(self.db.insert("task", task)))
            }
            ("task", "cancel") => {
                let [task] = args.take()?;
                let task = text(&task)?;
                let status = TaskStatusType::from_wire(str_field(self.db.get("task", &task)?, "status"));
                if status != TaskStatusType::Pending {
                    return Err(fail(
                        FailureKind::OperationNotAllowed,
                        [format!("task {task} is {status}")],
                    ));
                }
                self.db.set_field("task", &task, "status", TaskStatusType::Cancelled.as_str().into())?;
                self.db.set_field("task", &task, "finished", Value::DateTime(Utc::now()))?;
                info!(%task, "Task cancelled");
                Ok(void())
            }
            ("message", "create") => {
                let [name, priority, cls, obj_uuid, body] = args.take()?;
                let mut message = self.blank("message");
                put(&mut message, "name", name);
                put(&mut message, "priority", priority);
                put(&mut message, "cls", cls);
                put(&mut message, "obj_uuid", obj_uuid);
                put(&mut message, "body", body);
                put(&mut message, "timestamp", Value::DateTime(Utc::now()));
                Ok(Value::from(self.db.insert("message", message)))
            }
            ("message", "get_since") => {
                let [since] = args.take()?;
                self.messages_since(&since, |_| true)
            }
            ("message", "get") => {
                let [cls, obj_uuid, since] = args.take()?;
                let (cls, obj_uuid) = (text(&cls)?, text(&obj_uuid)?);
                self.messages_since(&since, |fields| {
                    str_field(fields, "cls") == cls && str_field(fields, "obj_uuid") == obj_uuid
                })
            }
            ("SR", "create") => self.create_sr(args),
            ("SR", "destroy" | "forget") => self.destroy_sr(op, args),
            ("SR", "scan" | "update") => {
                let [sr] = args.take()?;
                self.db.get("SR", &text(&sr)?)?;
                Ok(void())
            }
            ("VDI", "destroy") => {
                let [vdi] = args.take()?;
                let vdi = text(&vdi)?;
                if !refs(self.db.field("VDI", &vdi, "VBDs")?).is_empty() {
                    return Err(fail(FailureKind::VdiInUse, [vdi.as_str(), "destroy"]));
                }
                self.db.remove("VDI", &vdi)?;
                Ok(void())
            }
            ("VM", "destroy") => self.destroy_vm(args),
            ("VM", "snapshot" | "checkpoint" | "clone" | "copy") => self.copy_vm(op, args),
            ("VM", "revert") => self.revert_vm(args),
            ("VM", _) if power_transition(op).is_some() => self.change_power_state(op, args),
            ("VBD" | "VIF" | "PBD" | "PIF", "plug" | "unplug" | "unplug_force") => {
                self.plug(class, op, args)
            }
            _ => self.generic(class, op, args),
        }
    }

    /// The operations every class shares, derived from its field table.
    fn generic(&mut self, class: &str, op: &str, args: Args) -> SimResult {
        let class = self.db.class(class).ok_or_else(|| unknown(&args.method))?;
        match op {
            "get_all" => {
                args.take::<0>()?;
                Ok(Value::Array(
                    self.db.table(class).map(|(opaque, _)| Value::from(opaque.as_str())).collect(),
                ))
            }
            "get_all_records" => {
                args.take::<0>()?;
                Ok(Value::Struct(
                    self.db
                        .table(class)
                        .map(|(opaque, fields)| (opaque.clone(), Value::Struct(fields.clone())))
                        .collect(),
                ))
            }
            "get_record" => {
                let [this] = args.take()?;
                Ok(Value::Struct(self.db.get(class, &text(&this)?)?.clone()))
            }
            "get_by_uuid" => {
                let [uuid] = args.take()?;
                self.db.by_uuid(class, &text(&uuid)?).map(Value::from)
            }
            "get_by_name_label" => {
                let [label] = args.take()?;
                let label = text(&label)?;
                Ok(Value::Array(
                    self.db
                        .table(class)
                        .filter(|(_, fields)| str_field(fields, "name_label") == label)
                        .map(|(opaque, _)| Value::from(opaque.as_str()))
                        .collect(),
                ))
            }
            "create" => {
                let [record] = args.take()?;
                self.create(class, record)
            }
            "destroy" => {
                let [this] = args.take()?;
                let this = text(&this)?;
                self.db.remove(class, &this)?;
                info!(class, opaque = %this, "Destroyed");
                Ok(void())
            }
            _ => self.field_operation(class, op, args),
        }
    }

    fn field_operation(&mut self, class: &'static str, op: &str, args: Args) -> SimResult {
        let method = args.method.clone();
        if let Some(field) = op.strip_prefix("get_") {
            let [this] = args.take()?;
            return self.db.field(class, &text(&this)?, field).cloned();
        }
        if let Some(field) = op.strip_prefix("set_") {
            let [this, value] = args.take()?;
            self.db.set_field(class, &text(&this)?, field, value)?;
            return Ok(void());
        }
        if let Some(field) = op.strip_prefix("add_to_") {
            let [this, key, value] = args.take()?;
            let (this, key) = (text(&this)?, text(&key)?);
            let Value::Struct(map) = self.db.field_mut(class, &this, field)? else {
                return Err(unknown(&method));
            };
            if map.contains_key(&key) {
                return Err(fail(
                    FailureKind::MapDuplicateKey,
                    [class, field, this.as_str(), key.as_str()],
                ));
            }
            map.insert(key, value);
            return Ok(void());
        }
        if let Some(field) = op.strip_prefix("remove_from_") {
            let [this, key] = args.take()?;
            let (this, key) = (text(&this)?, text(&key)?);
            let Value::Struct(map) = self.db.field_mut(class, &this, field)? else {
                return Err(unknown(&method));
            };
            map.remove(&key);
            return Ok(void());
        }
        for (prefix, present) in [("add_", true), ("remove_", false)] {
            if let Some(field) = op.strip_prefix(prefix) {
                let [this, item] = args.take()?;
                if !matches!(self.db.field(class, &text(&this)?, field)?, Value::Array(_)) {
                    return Err(unknown(&method));
                }
                self.db.set_membership(class, &text(&this)?, field, item, present)?;
                return Ok(void());
            }
        }
        Err(unknown(&method))
    }

    /// Stores `record` over a blank object. Fields the server owns are reset.
    fn create(&mut self, class: &'static str, record: Value) -> SimResult {
        let Value::Struct(given) = record else {
            return Err(fail(FailureKind::FieldTypeError, ["record"]));
        };
        let mut fields = self.blank(class);
        for (key, value) in given {
            if let Some(slot) = fields.get_mut(&key) {
                *slot = value;
            }
        }
        put(&mut fields, "uuid", "");
        match class {
            "VM" => {
                put(&mut fields, "power_state", VmPowerState::Halted.as_str());
                put(&mut fields, "resident_on", NULL_REF);
                put(&mut fields, "domid", -1i64);
            }
            "VBD" | "VIF" => put(&mut fields, "currently_attached", false),
            _ => {}
        }
        let opaque = self.db.insert(class, fields);
        info!(class, %opaque, "Created");
        Ok(Value::from(opaque))
    }

    fn create_sr(&mut self, args: Args) -> SimResult {
        let [host, device_config, physical_size, name_label, name_description, sr_type, content_type, shared, sm_config] =
            args.take()?;
        let host = text(&host)?;
        self.db.get("host", &host)?;

        let mut sr = self.blank("SR");
        put(&mut sr, "name_label", name_label);
        put(&mut sr, "name_description", name_description);
        put(&mut sr, "physical_size", physical_size);
        put(&mut sr, "type", sr_type);
        put(&mut sr, "content_type", content_type);
        put(&mut sr, "shared", shared);
        put(&mut sr, "sm_config", sm_config);
        let sr = self.db.insert("SR", sr);

        let mut pbd = self.blank("PBD");
        put(&mut pbd, "host", host);
        put(&mut pbd, "SR", sr.as_str());
        put(&mut pbd, "device_config", device_config);
        put(&mut pbd, "currently_attached", true);
        self.db.insert("PBD", pbd);

        info!(%sr, "Created SR");
        Ok(Value::from(sr))
    }

    /// Both refuse a repository still plugged into a host. `destroy` also
    /// refuses one that holds disks; `forget` drops them along with it.
    fn destroy_sr(&mut self, op: &str, args: Args) -> SimResult {
        let [sr] = args.take()?;
        let sr = text(&sr)?;
        let pbds = refs(self.db.field("SR", &sr, "PBDs")?);
        for pbd in &pbds {
            if self.db.field("PBD", pbd, "currently_attached")? == &Value::Bool(true) {
                return Err(fail(FailureKind::SrHasPbd, [sr]));
            }
        }
        let vdis = refs(self.db.field("SR", &sr, "VDIs")?);
        if op == "destroy" && !vdis.is_empty() {
            return Err(fail(FailureKind::SrNotEmpty, Vec::<String>::new()));
        }
        for vdi in vdis {
            self.db.remove("VDI", &vdi)?;
        }
        for pbd in pbds {
            self.db.remove("PBD", &pbd)?;
        }
        self.db.remove("SR", &sr)?;
        info!(%sr, op, "Removed SR");
        Ok(void())
    }

    fn destroy_vm(&mut self, args: Args) -> SimResult {
        let [vm] = args.take()?;
        let vm = text(&vm)?;
        // Checkpoints keep the suspended state they were taken in.
        let allowed: &[VmPowerState] = if self.db.field("VM", &vm, "is_a_snapshot")? == &Value::Bool(true) {
            &[VmPowerState::Halted, VmPowerState::Suspended]
        } else {
            &[VmPowerState::Halted]
        };
        self.expect_power_state(&vm, allowed)?;
        for (class, set) in [("VBD", "VBDs"), ("VIF", "VIFs"), ("console", "consoles")] {
            for device in refs(self.db.field("VM", &vm, set)?) {
                self.db.remove(class, &device)?;
            }
        }
        self.db.remove("VM", &vm)?;
        info!(%vm, "Destroyed VM");
        Ok(void())
    }

    fn copy_vm(&mut self, op: &str, args: Args) -> SimResult {
        let (source, name) = if op == "copy" {
            let [vm, name, sr] = args.take()?;
            let sr = text(&sr)?;
            if sr != NULL_REF {
                self.db.get("SR", &sr)?;
            }
            (text(&vm)?, text(&name)?)
        } else {
            let [vm, name] = args.take()?;
            (text(&vm)?, text(&name)?)
        };

        use VmPowerState::*;
        let allowed: &[VmPowerState] = match op {
            "snapshot" => &[Halted, Running, Paused, Suspended],
            "checkpoint" => &[Running],
            _ => &[Halted],
        };
        self.expect_power_state(&source, allowed)?;

        let mut fields = self.db.get("VM", &source)?.clone();
        put(&mut fields, "uuid", "");
        put(&mut fields, "name_label", name);
        put(&mut fields, "power_state", Halted.as_str());
        put(&mut fields, "resident_on", NULL_REF);
        put(&mut fields, "domid", -1i64);
        if op == "snapshot" || op == "checkpoint" {
            put(&mut fields, "is_a_snapshot", true);
            put(&mut fields, "is_a_template", true);
            put(&mut fields, "snapshot_of", source.as_str());
            put(&mut fields, "snapshot_time", Value::DateTime(Utc::now()));
            if op == "checkpoint" {
                put(&mut fields, "power_state", Suspended.as_str());
            }
        } else {
            put(&mut fields, "is_a_snapshot", false);
            put(&mut fields, "snapshot_of", NULL_REF);
        }
        let copy = self.db.insert("VM", fields);
        info!(%source, %copy, op, "Copied VM");
        Ok(Value::from(copy))
    }

    /// Puts the VM a snapshot was taken of back into the snapshot's state.
    fn revert_vm(&mut self, args: Args) -> SimResult {
        let [snapshot] = args.take()?;
        let snapshot = text(&snapshot)?;
        let fields = self.db.get("VM", &snapshot)?.clone();
        if fields.get("is_a_snapshot") != Some(&Value::Bool(true)) {
            return Err(fail(
                FailureKind::OperationNotAllowed,
                [format!("{snapshot} is not a snapshot")],
            ));
        }
        let vm = str_field(&fields, "snapshot_of").to_string();
        self.db.get("VM", &vm)?;
        for key in ["VCPUs_max", "VCPUs_at_startup", "memory_static_max", "memory_dynamic_max", "platform", "other_config"] {
            if let Some(value) = fields.get(key) {
                self.db.set_field("VM", &vm, key, value.clone())?;
            }
        }
        let state = VmPowerState::from_wire(str_field(&fields, "power_state"));
        let host = self.master.clone();
        self.set_power_state(&vm, state, &host)?;
        info!(%vm, %snapshot, "Reverted VM");
        Ok(void())
    }

    fn change_power_state(&mut self, op: &str, args: Args) -> SimResult {
        let (vm, host, start_paused) = match op {
            "start" | "resume" => {
                let [vm, paused, _force] = args.take()?;
                (text(&vm)?, None, flag(&paused)?)
            }
            "start_on" | "resume_on" => {
                let [vm, host, paused, _force] = args.take()?;
                (text(&vm)?, Some(text(&host)?), flag(&paused)?)
            }
            _ => {
                let [vm] = args.take()?;
                (text(&vm)?, None, false)
            }
        };
        let Some((from, to)) = power_transition(op) else {
            return Err(unknown(op));
        };

        let fields = self.db.get("VM", &vm)?;
        if fields.get("is_a_template") == Some(&Value::Bool(true)) {
            return Err(fail(FailureKind::VmIsTemplate, [vm.as_str(), op]));
        }
        self.expect_power_state(&vm, from)?;

        let host = match host {
            Some(host) => {
                self.db.get("host", &host)?;
                host
            }
            None => self.master.clone(),
        };
        let target = match to {
            VmPowerState::Running if start_paused => VmPowerState::Paused,
            other => other,
        };
        self.set_power_state(&vm, target, &host)?;
        info!(%vm, op, state = %target, "Power state changed");
        Ok(void())
    }

    fn set_power_state(&mut self, vm: &str, state: VmPowerState, host: &str) -> SimResult<()> {
        let live = matches!(state, VmPowerState::Running | VmPowerState::Paused);
        let fields = self.db.get("VM", vm)?;
        let previous_host = str_field(fields, "resident_on").to_string();
        let was_live = i64::from_value(fields.get("domid").unwrap_or(&Value::Nil)).unwrap_or(-1) >= 0;

        if self.db.contains("host", &previous_host) {
            self.db
                .set_membership("host", &previous_host, "resident_VMs", Value::from(vm), false)?;
        }
        if live {
            self.db.set_membership("host", host, "resident_VMs", Value::from(vm), true)?;
        }

        let domid = match (live, was_live) {
            (true, false) => {
                self.next_domid += 1;
                self.next_domid - 1
            }
            (true, true) => i64::from_value(self.db.field("VM", vm, "domid")?).unwrap_or(-1),
            (false, _) => -1,
        };
        self.db.set_field("VM", vm, "power_state", state.as_str().into())?;
        self.db.set_field("VM", vm, "resident_on", Value::from(if live { host } else { NULL_REF }))?;
        self.db.set_field("VM", vm, "domid", Value::from(domid))?;

        for (class, set) in [("VBD", "VBDs"), ("VIF", "VIFs")] {
            for device in refs(self.db.field("VM", vm, set)?) {
                self.db.set_field(class, &device, "currently_attached", Value::from(live))?;
            }
        }
        Ok(())
    }

    fn plug(&mut self, class: &str, op: &str, args: Args) -> SimResult {
        let [this] = args.take()?;
        let this = text(&this)?;
        let attached = self.db.field(class, &this, "currently_attached")? == &Value::Bool(true);
        let plugging = op == "plug";

        if matches!(class, "VBD" | "VIF") {
            let vm = str_field(self.db.get(class, &this)?, "VM").to_string();
            if vm != NULL_REF {
                self.expect_power_state(&vm, &[VmPowerState::Running])?;
            }
        }
        match (plugging, attached) {
            (true, true) => Err(fail(FailureKind::DeviceAlreadyAttached, [this])),
            (false, false) => Err(fail(FailureKind::DeviceAlreadyDetached, [this])),
            _ => {
                self.db
                    .set_field(class, &this, "currently_attached", Value::from(plugging))?;
                info!(class, device = %this, op, "Device state changed");
                Ok(void())
            }
        }
    }

    /// Fails with `VM_BAD_POWER_STATE` unless `vm` is in one of `allowed`.
    fn expect_power_state(&self, vm: &str, allowed: &[VmPowerState]) -> SimResult<VmPowerState> {
        let current = VmPowerState::from_wire(str_field(self.db.get("VM", vm)?, "power_state"));
        if allowed.contains(&current) {
            return Ok(current);
        }
        let expected = allowed.first().copied().unwrap_or_default();
        Err(fail(
            FailureKind::VmBadPowerState,
            [
                vm.to_string(),
                expected.as_str().to_lowercase(),
                current.as_str().to_lowercase(),
            ],
        ))
    }

    fn messages_since(&self, since: &Value, keep: impl Fn(&Fields) -> bool) -> SimResult {
        let since = DateTime::<Utc>::from_value(since)
            .map_err(|_| fail(FailureKind::FieldTypeError, ["since"]))?;
        Ok(Value::Struct(
            self.db
                .table("message")
                .filter(|(_, fields)| {
                    fields
                        .get("timestamp")
                        .and_then(|stamp| DateTime::<Utc>::from_value(stamp).ok())
                        .is_some_and(|stamp| stamp > since)
                })
                .filter(|(_, fields)| keep(*fields))
                .map(|(opaque, fields)| (opaque.clone(), Value::Struct(fields.clone())))
                .collect(),
        ))
    }

    fn blank(&self, class: &str) -> Fields {
        self.db.blank(class).unwrap_or_default()
    }
}

/// `(states the operation starts from, state it leaves the VM in)`.
fn power_transition(op: &str) -> Option<(&'static [VmPowerState], VmPowerState)> {
    use VmPowerState::*;
    let transition: (&'static [VmPowerState], VmPowerState) = match op {
        "start" | "start_on" => (&[Halted], Running),
        "pause" => (&[Running], Paused),
        "unpause" => (&[Paused], Running),
        "clean_shutdown" => (&[Running], Halted),
        "shutdown" | "hard_shutdown" => (&[Running, Paused, Suspended], Halted),
        "clean_reboot" => (&[Running], Running),
        "hard_reboot" => (&[Running, Paused], Running),
        "suspend" => (&[Running], Suspended),
        "resume" | "resume_on" => (&[Suspended], Running),
        "power_state_reset" => (&[Halted, Running, Paused, Suspended], Halted),
        _ => return None,
    };
    Some(transition)
}

fn insert_with<const N: usize>(db: &mut Database, class: &'static str, values: [(&str, Value); N]) -> String {
    let mut fields = db.blank(class).unwrap_or_default();
    for (key, value) in values {
        put(&mut fields, key, value);
    }
    db.insert(class, fields)
}

fn put(fields: &mut Fields, key: &str, value: impl Into<Value>) {
    fields.insert(key.to_string(), value.into());
}

fn str_field<'a>(fields: &'a Fields, key: &str) -> &'a str {
    fields.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn refs(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn text(value: &Value) -> SimResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| fail(FailureKind::FieldTypeError, [value.kind()]))
}

fn flag(value: &Value) -> SimResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(fail(FailureKind::FieldTypeError, [other.kind()])),
    }
}

fn void() -> Value {
    Value::from("")
}

fn unknown(method: &str) -> Failure {
    fail(FailureKind::MessageMethodUnknown, [method])
}

fn error_description(failure: Failure) -> Vec<Value> {
    std::iter::once(failure.code)
        .chain(failure.params)
        .map(Value::from)
        .collect()
}

fn respond(result: SimResult) -> Value {
    match result {
        Ok(value) => crate::wire_struct! { "Status" => "Success", "Value" => value },
        Err(failure) => crate::wire_struct! {
            "Status" => "Failure",
            "ErrorDescription" => error_description(failure),
        },
    }
}
