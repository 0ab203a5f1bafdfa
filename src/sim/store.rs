//! Object tables of the simulator.
//!
//! Objects are stored as raw field maps keyed by wire field name, exactly as
//! they travel. The blank field map of each class comes from the default of
//! its record type, so the tables always agree with the model's schema.

use crate::framework::{Class, Failure, FailureKind, Record, Value};
use crate::model::*;
use std::collections::BTreeMap;

pub(crate) type Fields = BTreeMap<String, Value>;
pub(crate) type SimResult<T = Value> = std::result::Result<T, Failure>;

pub(crate) fn fail<I, S>(kind: FailureKind, params: I) -> Failure
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Failure::new(kind.as_str(), params.into_iter().map(Into::into).collect())
}

fn blank<R: Record>() -> Fields {
    R::default().to_fields()
}

const CLASSES: &[(&str, fn() -> Fields)] = &[
    (Session::NAME, blank::<SessionRecord>),
    (User::NAME, blank::<UserRecord>),
    (Task::NAME, blank::<TaskRecord>),
    (Pool::NAME, blank::<PoolRecord>),
    (Host::NAME, blank::<HostRecord>),
    (HostMetrics::NAME, blank::<HostMetricsRecord>),
    (Vm::NAME, blank::<VmRecord>),
    (VmMetrics::NAME, blank::<VmMetricsRecord>),
    (Vdi::NAME, blank::<VdiRecord>),
    (Vbd::NAME, blank::<VbdRecord>),
    (Vif::NAME, blank::<VifRecord>),
    (Network::NAME, blank::<NetworkRecord>),
    (Pif::NAME, blank::<PifRecord>),
    (Sr::NAME, blank::<SrRecord>),
    (Pbd::NAME, blank::<PbdRecord>),
    (Console::NAME, blank::<ConsoleRecord>),
    (Secret::NAME, blank::<SecretRecord>),
    (Message::NAME, blank::<MessageRecord>),
];

/// `(child class, child field, parent class, parent set field)`: creating a
/// child adds it to the parent's set, destroying it removes it.
const BACK_REFERENCES: &[(&str, &str, &str, &str)] = &[
    ("VBD", "VM", "VM", "VBDs"),
    ("VBD", "VDI", "VDI", "VBDs"),
    ("VIF", "VM", "VM", "VIFs"),
    ("VIF", "network", "network", "VIFs"),
    ("VDI", "SR", "SR", "VDIs"),
    ("PBD", "SR", "SR", "PBDs"),
    ("PBD", "host", "host", "PBDs"),
    ("PIF", "network", "network", "PIFs"),
    ("PIF", "host", "host", "PIFs"),
    ("console", "VM", "VM", "consoles"),
    ("VM", "snapshot_of", "VM", "snapshots"),
];

pub(crate) fn new_ref() -> String {
    format!("OpaqueRef:{}", uuid::Uuid::new_v4())
}

pub(crate) fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug)]
pub(crate) struct Database {
    tables: BTreeMap<&'static str, BTreeMap<String, Fields>>,
}

impl Database {
    pub fn new() -> Self {
        Self {
            tables: CLASSES.iter().map(|(name, _)| (*name, BTreeMap::new())).collect(),
        }
    }

    /// Canonical name of `class`, if the simulator knows it.
    pub fn class(&self, class: &str) -> Option<&'static str> {
        CLASSES.iter().map(|(name, _)| *name).find(|name| *name == class)
    }

    /// Field map of a fresh object of `class`, every field at its default.
    pub fn blank(&self, class: &str) -> Option<Fields> {
        CLASSES
            .iter()
            .find(|(name, _)| *name == class)
            .map(|(_, blank)| blank())
    }

    pub fn objects(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }

    pub fn table(&self, class: &str) -> impl Iterator<Item = (&String, &Fields)> {
        self.tables.get(class).into_iter().flat_map(|table| table.iter())
    }

    pub fn contains(&self, class: &str, opaque: &str) -> bool {
        self.tables.get(class).is_some_and(|table| table.contains_key(opaque))
    }

    pub fn get(&self, class: &str, opaque: &str) -> SimResult<&Fields> {
        self.tables
            .get(class)
            .and_then(|table| table.get(opaque))
            .ok_or_else(|| fail(FailureKind::HandleInvalid, [class, opaque]))
    }

    pub fn get_mut(&mut self, class: &str, opaque: &str) -> SimResult<&mut Fields> {
        self.tables
            .get_mut(class)
            .and_then(|table| table.get_mut(opaque))
            .ok_or_else(|| fail(FailureKind::HandleInvalid, [class, opaque]))
    }

    pub fn field(&self, class: &str, opaque: &str, key: &str) -> SimResult<&Value> {
        let fields = self.get(class, opaque)?;
        fields
            .get(key)
            .ok_or_else(|| fail(FailureKind::MessageMethodUnknown, [format!("{class}.get_{key}")]))
    }

    pub fn field_mut(&mut self, class: &str, opaque: &str, key: &str) -> SimResult<&mut Value> {
        let fields = self.get_mut(class, opaque)?;
        fields
            .get_mut(key)
            .ok_or_else(|| fail(FailureKind::MessageMethodUnknown, [format!("{class}.get_{key}")]))
    }

    pub fn set_field(&mut self, class: &str, opaque: &str, key: &str, value: Value) -> SimResult<()> {
        let fields = self.get_mut(class, opaque)?;
        match fields.get_mut(key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(fail(FailureKind::MessageMethodUnknown, [format!("{class}.set_{key}")])),
        }
    }

    /// Stores a new object and links it into its parents' sets. Sets that
    /// only its children fill start out empty.
    pub fn insert(&mut self, class: &'static str, mut fields: Fields) -> String {
        let opaque = new_ref();
        let uuid_missing = fields.get("uuid").and_then(Value::as_str).map_or(true, str::is_empty);
        if uuid_missing {
            fields.insert("uuid".into(), Value::String(new_uuid()));
        }
        for (_, _, parent, set) in BACK_REFERENCES {
            if *parent == class {
                fields.insert(set.to_string(), Value::Array(Vec::new()));
            }
        }
        self.link(class, &opaque, &fields, true);
        self.tables.entry(class).or_default().insert(opaque.clone(), fields);
        opaque
    }

    pub fn remove(&mut self, class: &str, opaque: &str) -> SimResult<Fields> {
        let fields = self
            .tables
            .get_mut(class)
            .and_then(|table| table.remove(opaque))
            .ok_or_else(|| fail(FailureKind::HandleInvalid, [class, opaque]))?;
        self.link(class, opaque, &fields, false);
        Ok(fields)
    }

    pub fn by_uuid(&self, class: &str, uuid: &str) -> SimResult<String> {
        self.table(class)
            .find(|(_, fields)| fields.get("uuid").and_then(Value::as_str) == Some(uuid))
            .map(|(opaque, _)| opaque.clone())
            .ok_or_else(|| fail(FailureKind::UuidInvalid, [class, uuid]))
    }

    /// Adds `item` to, or removes it from, the set field `key`.
    pub fn set_membership(
        &mut self,
        class: &str,
        opaque: &str,
        key: &str,
        item: Value,
        present: bool,
    ) -> SimResult<()> {
        let Value::Array(items) = self.field_mut(class, opaque, key)? else {
            return Err(fail(FailureKind::FieldTypeError, [key]));
        };
        items.retain(|existing| *existing != item);
        if present {
            items.push(item);
        }
        Ok(())
    }

    fn link(&mut self, class: &str, opaque: &str, fields: &Fields, add: bool) {
        for (child, field, parent, set) in BACK_REFERENCES {
            if *child != class {
                continue;
            }
            let Some(parent_ref) = fields.get(*field).and_then(Value::as_str) else {
                continue;
            };
            let parent_ref = parent_ref.to_string();
            let Ok(parent_fields) = self.get_mut(parent, &parent_ref) else {
                continue;
            };
            if let Some(Value::Array(items)) = parent_fields.get_mut(*set) {
                let item = Value::from(opaque);
                items.retain(|existing| *existing != item);
                if add {
                    items.push(item);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_records_follow_the_schema() {
        let db = Database::new();
        let vm = db.blank("VM").unwrap();
        assert_eq!(vm.get("power_state"), Some(&Value::from("UNRECOGNIZED")));
        assert!(vm.contains_key("VCPUs_max"));
        assert!(db.blank("VMX").is_none());
    }

    #[test]
    fn children_are_linked_to_parents() {
        let mut db = Database::new();
        let vm = db.insert("VM", db.blank("VM").unwrap());

        let mut vbd = db.blank("VBD").unwrap();
        vbd.insert("VM".into(), Value::from(vm.as_str()));
        let vbd = db.insert("VBD", vbd);
        assert_eq!(
            db.field("VM", &vm, "VBDs").unwrap(),
            &Value::Array(vec![Value::from(vbd.as_str())])
        );

        db.remove("VBD", &vbd).unwrap();
        assert_eq!(db.field("VM", &vm, "VBDs").unwrap(), &Value::Array(vec![]));
    }

    #[test]
    fn copied_parents_start_without_children() {
        let mut db = Database::new();
        let mut vm = db.blank("VM").unwrap();
        vm.insert("VIFs".into(), Value::Array(vec![Value::from("OpaqueRef:stale")]));
        let vm = db.insert("VM", vm);
        assert_eq!(db.field("VM", &vm, "VIFs").unwrap(), &Value::Array(vec![]));
    }

    #[test]
    fn set_membership_is_idempotent() {
        let mut db = Database::new();
        let host = db.insert("host", db.blank("host").unwrap());
        for _ in 0..2 {
            db.set_membership("host", &host, "tags", Value::from("gold"), true).unwrap();
        }
        assert_eq!(db.field("host", &host, "tags").unwrap(), &Value::Array(vec![Value::from("gold")]));

        db.set_membership("host", &host, "tags", Value::from("gold"), false).unwrap();
        db.set_membership("host", &host, "tags", Value::from("gold"), false).unwrap();
        assert_eq!(db.field("host", &host, "tags").unwrap(), &Value::Array(vec![]));
    }

    #[test]
    fn unknown_handles_and_uuids_fail() {
        let db = Database::new();
        let err = db.get("VM", "OpaqueRef:nope").unwrap_err();
        assert_eq!(err.kind, FailureKind::HandleInvalid);
        assert_eq!(err.params, vec!["VM", "OpaqueRef:nope"]);

        let err = db.by_uuid("VM", "0000").unwrap_err();
        assert_eq!(err.kind, FailureKind::UuidInvalid);
    }
}
