//! # Schema Macros
//!
//! Every remote class is described once, as a table: its wire name, the fields
//! of its record (with wire key, type and mutability) and its declared
//! operations. These macros turn that table into code:
//!
//! - [`wire_enum!`] generates a closed enum with an `Unrecognized` fallback.
//! - [`xenapi_class!`] generates the kind marker, the record struct, its codec
//!   and one accessor per field.
//! - [`xenapi_methods!`] generates the remaining operations, including the
//!   `async_*` form of long-running ones and the declared failure list of each.
//!
//! The macros are crate-internal; the model module is their only user.

/// Declares a wire enum.
///
/// Matching on the wire is case-insensitive. Unknown strings decode to
/// `Unrecognized`, which is also the default and encodes as `"UNRECOGNIZED"`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $wire:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
            /// A value this client does not know about.
            #[default]
            Unrecognized,
        }

        impl $name {
            /// Every variant except `Unrecognized`.
            pub const KNOWN: &'static [$name] = &[$($name::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )*
                    $name::Unrecognized => "UNRECOGNIZED",
                }
            }

            pub fn from_wire(s: &str) -> Self {
                $(
                    if s.eq_ignore_ascii_case($wire) {
                        return $name::$variant;
                    }
                )*
                $name::Unrecognized
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::framework::FromValue for $name {
            fn from_value(value: &$crate::framework::Value) -> $crate::framework::Result<Self> {
                match value {
                    $crate::framework::Value::String(s) => Ok(Self::from_wire(s)),
                    other => Err($crate::framework::codec::unexpected(stringify!($name), other)),
                }
            }
        }

        impl $crate::framework::ToValue for $name {
            fn to_value(&self) -> $crate::framework::Value {
                $crate::framework::Value::String(self.as_str().to_string())
            }
        }

        impl $crate::framework::MapKey for $name {
            fn to_key(&self) -> String {
                self.as_str().to_string()
            }

            fn from_key(key: &str) -> $crate::framework::Result<Self> {
                Ok(Self::from_wire(key))
            }
        }
    };
}

/// Builds `"<Class>.<op>"`, or `"<Class>.<wire>"` when the operation's wire
/// name differs from its Rust name.
macro_rules! __wire_name {
    ($class:literal, $op:ident) => {
        concat!($class, ".", stringify!($op))
    };
    ($class:literal, $op:ident, $opwire:literal) => {
        concat!($class, ".", $opwire)
    };
}

/// Declares a class: kind marker, record and field accessors.
///
/// Field modes:
/// - `ro`: getter only.
/// - `rw`: getter and setter.
/// - `map`: getter, setter, `add_to_*` and `remove_from_*`.
/// - `set`: getter, setter, `add_*` and `remove_*`.
macro_rules! xenapi_class {
    (
        $(#[$cmeta:meta])*
        pub class $marker:ident = $wire:literal;
        $(#[$rmeta:meta])*
        pub record $record:ident {
            $( $(#[$fmeta:meta])* $mode:ident $field:ident : $ty:ty = $key:literal; )*
        }
    ) => {
        $(#[$cmeta])*
        pub enum $marker {}

        impl $crate::framework::Class for $marker {
            const NAME: &'static str = $wire;
        }

        $(#[$rmeta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $record {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl $crate::framework::Record for $record {
            fn from_fields(
                fields: &::std::collections::BTreeMap<String, $crate::framework::Value>,
            ) -> $crate::framework::Result<Self> {
                Ok(Self {
                    $( $field: $crate::framework::codec::field(fields, $key)?, )*
                })
            }

            fn to_fields(&self) -> ::std::collections::BTreeMap<String, $crate::framework::Value> {
                let mut fields = ::std::collections::BTreeMap::new();
                $(
                    fields.insert(
                        String::from($key),
                        $crate::framework::ToValue::to_value(&self.$field),
                    );
                )*
                fields
            }
        }

        impl $crate::framework::FromValue for $record {
            fn from_value(value: &$crate::framework::Value) -> $crate::framework::Result<Self> {
                $crate::framework::codec::record_from_value(value)
            }
        }

        impl $crate::framework::ToValue for $record {
            fn to_value(&self) -> $crate::framework::Value {
                $crate::framework::Value::Struct($crate::framework::Record::to_fields(self))
            }
        }

        impl $marker {
            /// Fetches every field of `this` in one call.
            pub async fn get_record(
                conn: &$crate::connection::Connection,
                this: &$crate::framework::Ref<$marker>,
            ) -> $crate::framework::Result<$record> {
                conn.call(
                    concat!($wire, ".get_record"),
                    vec![$crate::framework::ToValue::to_value(this)],
                )
                .await
            }

            /// Looks up the reference with the given UUID.
            pub async fn get_by_uuid(
                conn: &$crate::connection::Connection,
                uuid: &str,
            ) -> $crate::framework::Result<$crate::framework::Ref<$marker>> {
                conn.call(
                    concat!($wire, ".get_by_uuid"),
                    vec![$crate::framework::ToValue::to_value(uuid)],
                )
                .await
            }

            $( __xenapi_field!($mode $marker, $wire, $field, $ty, $key); )*
        }
    };
}

macro_rules! __xenapi_field {
    (@get $marker:ident, $wire:literal, $field:ident, $ty:ty, $key:literal) => {
        ::paste::paste! {
            pub async fn [<get_ $field>](
                conn: &$crate::connection::Connection,
                this: &$crate::framework::Ref<$marker>,
            ) -> $crate::framework::Result<$ty> {
                conn.call(
                    concat!($wire, ".get_", $key),
                    vec![$crate::framework::ToValue::to_value(this)],
                )
                .await
            }
        }
    };
    (@set $marker:ident, $wire:literal, $field:ident, $ty:ty, $key:literal) => {
        ::paste::paste! {
            pub async fn [<set_ $field>](
                conn: &$crate::connection::Connection,
                this: &$crate::framework::Ref<$marker>,
                value: impl Into<$ty>,
            ) -> $crate::framework::Result<()> {
                let value: $ty = value.into();
                conn.call(
                    concat!($wire, ".set_", $key),
                    vec![
                        $crate::framework::ToValue::to_value(this),
                        $crate::framework::ToValue::to_value(&value),
                    ],
                )
                .await
            }
        }
    };
    (ro $marker:ident, $wire:literal, $field:ident, $ty:ty, $key:literal) => {
        __xenapi_field!(@get $marker, $wire, $field, $ty, $key);
    };
    (rw $marker:ident, $wire:literal, $field:ident, $ty:ty, $key:literal) => {
        __xenapi_field!(@get $marker, $wire, $field, $ty, $key);
        __xenapi_field!(@set $marker, $wire, $field, $ty, $key);
    };
    (map $marker:ident, $wire:literal, $field:ident, $ty:ty, $key:literal) => {
        __xenapi_field!(@get $marker, $wire, $field, $ty, $key);
        __xenapi_field!(@set $marker, $wire, $field, $ty, $key);

        ::paste::paste! {
            pub async fn [<add_to_ $field>](
                conn: &$crate::connection::Connection,
                this: &$crate::framework::Ref<$marker>,
                key: impl Into<<$ty as $crate::framework::codec::MapField>::Key>,
                value: impl Into<<$ty as $crate::framework::codec::MapField>::Val>,
            ) -> $crate::framework::Result<()> {
                let key: <$ty as $crate::framework::codec::MapField>::Key = key.into();
                let value: <$ty as $crate::framework::codec::MapField>::Val = value.into();
                conn.call(
                    concat!($wire, ".add_to_", $key),
                    vec![
                        $crate::framework::ToValue::to_value(this),
                        $crate::framework::ToValue::to_value(&key),
                        $crate::framework::ToValue::to_value(&value),
                    ],
                )
                .await
            }

            /// Removing a key that is not present is a no-op on the server.
            pub async fn [<remove_from_ $field>](
                conn: &$crate::connection::Connection,
                this: &$crate::framework::Ref<$marker>,
                key: impl Into<<$ty as $crate::framework::codec::MapField>::Key>,
            ) -> $crate::framework::Result<()> {
                let key: <$ty as $crate::framework::codec::MapField>::Key = key.into();
                conn.call(
                    concat!($wire, ".remove_from_", $key),
                    vec![
                        $crate::framework::ToValue::to_value(this),
                        $crate::framework::ToValue::to_value(&key),
                    ],
                )
                .await
            }
        }
    };
    (set $marker:ident, $wire:literal, $field:ident, $ty:ty, $key:literal) => {
        __xenapi_field!(@get $marker, $wire, $field, $ty, $key);
        __xenapi_field!(@set $marker, $wire, $field, $ty, $key);

        ::paste::paste! {
            pub async fn [<add_ $field>](
                conn: &$crate::connection::Connection,
                this: &$crate::framework::Ref<$marker>,
                value: impl Into<<$ty as $crate::framework::codec::SetField>::Item>,
            ) -> $crate::framework::Result<()> {
                let value: <$ty as $crate::framework::codec::SetField>::Item = value.into();
                conn.call(
                    concat!($wire, ".add_", $key),
                    vec![
                        $crate::framework::ToValue::to_value(this),
                        $crate::framework::ToValue::to_value(&value),
                    ],
                )
                .await
            }

            /// Removing a value that is not present is a no-op on the server.
            pub async fn [<remove_ $field>](
                conn: &$crate::connection::Connection,
                this: &$crate::framework::Ref<$marker>,
                value: impl Into<<$ty as $crate::framework::codec::SetField>::Item>,
            ) -> $crate::framework::Result<()> {
                let value: <$ty as $crate::framework::codec::SetField>::Item = value.into();
                conn.call(
                    concat!($wire, ".remove_", $key),
                    vec![
                        $crate::framework::ToValue::to_value(this),
                        $crate::framework::ToValue::to_value(&value),
                    ],
                )
                .await
            }
        }
    };
}

/// Declares the operations of a class beyond its field accessors.
///
/// ```text
/// xenapi_methods! {
///     impl Vm = "VM" {
///         task fn start(this: &Ref<Vm>, start_paused: bool, force: bool) -> (),
///             raises [VmBadPowerState, VmIsTemplate];
///         fn move_to = "move"(this: &Ref<Vif>, network: &Ref<Network>) -> ();
///     }
/// }
/// ```
///
/// A `task fn` also gets an `async_<op>` twin that routes to `Async.<Class>.<op>`
/// and returns the task reference. Every operation publishes its declared
/// failures as `<OP>_FAILURES`.
macro_rules! xenapi_methods {
    (impl $marker:ident = $wire:literal { $($body:tt)* }) => {
        impl $marker {
            __xenapi_methods!(@munch $marker, $wire; $($body)*);
        }
    };
}

macro_rules! __xenapi_methods {
    (@munch $marker:ident, $wire:literal; ) => {};

    (@munch $marker:ident, $wire:literal;
        $(#[$meta:meta])*
        task fn $op:ident $(= $opwire:literal)? ( $($arg:ident : $argty:ty),* $(,)? ) -> $ret:ty
        $(, raises [$($kind:ident),* $(,)?])? ;
        $($rest:tt)*
    ) => {
        __xenapi_methods!(@op $wire; $(#[$meta])* $op $(= $opwire)? ($($arg : $argty),*) -> $ret;
            [$($($kind),*)?]);
        ::paste::paste! {
            /// Asynchronous form: returns the server task tracking the operation.
            pub async fn [<async_ $op>](
                conn: &$crate::connection::Connection,
                $($arg: $argty),*
            ) -> $crate::framework::Result<$crate::framework::Ref<$crate::model::Task>> {
                conn.call_async(
                    __wire_name!($wire, $op $(, $opwire)?),
                    vec![$($crate::framework::ToValue::to_value(&$arg)),*],
                )
                .await
            }
        }
        __xenapi_methods!(@munch $marker, $wire; $($rest)*);
    };

    (@munch $marker:ident, $wire:literal;
        $(#[$meta:meta])*
        fn $op:ident $(= $opwire:literal)? ( $($arg:ident : $argty:ty),* $(,)? ) -> $ret:ty
        $(, raises [$($kind:ident),* $(,)?])? ;
        $($rest:tt)*
    ) => {
        __xenapi_methods!(@op $wire; $(#[$meta])* $op $(= $opwire)? ($($arg : $argty),*) -> $ret;
            [$($($kind),*)?]);
        __xenapi_methods!(@munch $marker, $wire; $($rest)*);
    };

    (@op $wire:literal;
        $(#[$meta:meta])*
        $op:ident $(= $opwire:literal)? ( $($arg:ident : $argty:ty),* ) -> $ret:ty;
        [$($kind:ident),*]
    ) => {
        $(#[$meta])*
        pub async fn $op(
            conn: &$crate::connection::Connection,
            $($arg: $argty),*
        ) -> $crate::framework::Result<$ret> {
            conn.call(
                __wire_name!($wire, $op $(, $opwire)?),
                vec![$($crate::framework::ToValue::to_value(&$arg)),*],
            )
            .await
        }

        ::paste::paste! {
            /// Failure kinds this operation is declared to raise.
            pub const [<$op:upper _FAILURES>]: &'static [$crate::framework::FailureKind] =
                &[$($crate::framework::FailureKind::$kind),*];
        }
    };
}
