//! Field schema for bindable records.
//!
//! A record lists its fields once through [`Record::fields`]; each [`Field`]
//! pairs a name and its annotations with a typed [`Slot`] that borrows the
//! struct member it writes to.
//!
//! ```
//! use confbind::{Field, Record};
//!
//! #[derive(Default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! impl Record for Server {
//!     fn fields(&mut self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::new("host", &mut self.host).tag("conf", "server.host,required"),
//!             Field::new("port", &mut self.port).tag("conf", "server.port"),
//!         ]
//!     }
//! }
//! ```
//!
//! The [`record!`](crate::record!) macro writes the same impl from inline
//! annotations.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

/// A struct whose fields can be populated from a document.
pub trait Record {
    /// Returns the struct's fields in declaration order.
    fn fields(&mut self) -> Vec<Field<'_>>;
}

/// One declared field of a [`Record`].
#[derive(Debug)]
pub struct Field<'a> {
    name: &'static str,
    tags: Vec<(&'static str, &'static str)>,
    slot: Slot<'a>,
}

impl<'a> Field<'a> {
    pub fn new<T: Bindable + ?Sized>(name: &'static str, target: &'a mut T) -> Self {
        Self {
            name,
            tags: Vec::new(),
            slot: target.slot(),
        }
    }

    /// Attaches an annotation under `key`. A later annotation for the same
    /// key replaces the earlier one.
    pub fn tag(mut self, key: &'static str, annotation: &'static str) -> Self {
        self.tags.retain(|(k, _)| *k != key);
        self.tags.push((key, annotation));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn annotation(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, annotation)| *annotation)
    }

    pub(crate) fn into_slot(self) -> Slot<'a> {
        self.slot
    }
}

/// Mutable view of a field, tagged with the kind of value it accepts.
#[derive(Debug)]
pub enum Slot<'a> {
    Bool(&'a mut bool),
    Int(IntSlot<'a>),
    Uint(UintSlot<'a>),
    Float(FloatSlot<'a>),
    Str(&'a mut String),
    StrSeq(&'a mut Vec<String>),
    Duration(DurationSlot<'a>),
    Time(TimeSlot<'a>),
    /// A type with no coercion rule; binding it fails with the type's name.
    Unsupported(&'static str),
}

#[derive(Debug)]
pub enum IntSlot<'a> {
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
}

#[derive(Debug)]
pub enum UintSlot<'a> {
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
}

#[derive(Debug)]
pub enum FloatSlot<'a> {
    F32(&'a mut f32),
    F64(&'a mut f64),
}

#[derive(Debug)]
pub enum DurationSlot<'a> {
    Std(&'a mut Duration),
    Delta(&'a mut TimeDelta),
}

#[derive(Debug)]
pub enum TimeSlot<'a> {
    Fixed(&'a mut DateTime<FixedOffset>),
    Utc(&'a mut DateTime<Utc>),
}

/// Returned when a coerced value does not fit the narrower target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OutOfRange(pub &'static str);

macro_rules! narrowing_set {
    ($slot:ident, $wide:ty, { $($variant:ident => $ty:ty),* $(,)? }) => {
        impl $slot<'_> {
            pub fn type_name(&self) -> &'static str {
                match self {
                    $( $slot::$variant(_) => stringify!($ty), )*
                }
            }

            pub(crate) fn set(self, value: $wide) -> Result<(), OutOfRange> {
                match self {
                    $(
                        $slot::$variant(target) => {
                            *target = <$ty>::try_from(value)
                                .map_err(|_| OutOfRange(stringify!($ty)))?;
                        }
                    )*
                }
                Ok(())
            }
        }
    };
}

narrowing_set!(IntSlot, i64, {
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    Isize => isize,
});

narrowing_set!(UintSlot, u64, {
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
    Usize => usize,
});

impl FloatSlot<'_> {
    pub fn type_name(&self) -> &'static str {
        match self {
            FloatSlot::F32(_) => "f32",
            FloatSlot::F64(_) => "f64",
        }
    }

    pub(crate) fn set(self, value: f64) -> Result<(), OutOfRange> {
        match self {
            FloatSlot::F32(target) => {
                let narrowed = value as f32;
                if value.is_finite() && narrowed.is_infinite() {
                    return Err(OutOfRange("f32"));
                }
                *target = narrowed;
            }
            FloatSlot::F64(target) => *target = value,
        }
        Ok(())
    }
}

impl Slot<'_> {
    /// Name of the Rust type behind the slot, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Slot::Bool(_) => "bool",
            Slot::Int(s) => s.type_name(),
            Slot::Uint(s) => s.type_name(),
            Slot::Float(s) => s.type_name(),
            Slot::Str(_) => "String",
            Slot::StrSeq(_) => "Vec<String>",
            Slot::Duration(DurationSlot::Std(_)) => "std::time::Duration",
            Slot::Duration(DurationSlot::Delta(_)) => "chrono::TimeDelta",
            Slot::Time(TimeSlot::Fixed(_)) => "chrono::DateTime<FixedOffset>",
            Slot::Time(TimeSlot::Utc(_)) => "chrono::DateTime<Utc>",
            Slot::Unsupported(name) => *name,
        }
    }
}

/// Types a [`Field`] can point at.
pub trait Bindable {
    fn slot(&mut self) -> Slot<'_>;
}

macro_rules! bindable {
    ($($ty:ty => |$v:ident| $slot:expr;)*) => {
        $(
            impl Bindable for $ty {
                fn slot(&mut self) -> Slot<'_> {
                    let $v = self;
                    $slot
                }
            }
        )*
    };
}

bindable! {
    bool => |v| Slot::Bool(v);
    i8 => |v| Slot::Int(IntSlot::I8(v));
    i16 => |v| Slot::Int(IntSlot::I16(v));
    i32 => |v| Slot::Int(IntSlot::I32(v));
    i64 => |v| Slot::Int(IntSlot::I64(v));
    isize => |v| Slot::Int(IntSlot::Isize(v));
    u8 => |v| Slot::Uint(UintSlot::U8(v));
    u16 => |v| Slot::Uint(UintSlot::U16(v));
    u32 => |v| Slot::Uint(UintSlot::U32(v));
    u64 => |v| Slot::Uint(UintSlot::U64(v));
    usize => |v| Slot::Uint(UintSlot::Usize(v));
    f32 => |v| Slot::Float(FloatSlot::F32(v));
    f64 => |v| Slot::Float(FloatSlot::F64(v));
    String => |v| Slot::Str(v);
    Vec<String> => |v| Slot::StrSeq(v);
    Duration => |v| Slot::Duration(DurationSlot::Std(v));
    TimeDelta => |v| Slot::Duration(DurationSlot::Delta(v));
    DateTime<FixedOffset> => |v| Slot::Time(TimeSlot::Fixed(v));
    DateTime<Utc> => |v| Slot::Time(TimeSlot::Utc(v));
}

// Declarable but never bindable: collections other than string lists.
bindable! {
    Vec<bool> => |_v| Slot::Unsupported("Vec<bool>");
    Vec<i64> => |_v| Slot::Unsupported("Vec<i64>");
    Vec<u64> => |_v| Slot::Unsupported("Vec<u64>");
    Vec<f64> => |_v| Slot::Unsupported("Vec<f64>");
    HashMap<String, String> => |_v| Slot::Unsupported("HashMap<String, String>");
    BTreeMap<String, String> => |_v| Slot::Unsupported("BTreeMap<String, String>");
}

/// Declares a struct and implements [`Record`] for it.
///
/// Annotations follow the field type after `=>`, one per tag key:
///
/// ```
/// use std::time::Duration;
///
/// confbind::record! {
///     #[derive(Debug, Default)]
///     pub struct Server {
///         pub host: String => { conf = "server.host,required" },
///         pub port: u16 => { conf = "server.port", env = "PORT" },
///         pub timeout: Duration => { conf = "server.timeout" },
///         pub notes: String,
///     }
/// }
///
/// let mut server = Server::default();
/// confbind::bind_str(&mut server, "[server]\nhost = \"db\"\ntimeout = \"5s\"", None)?;
/// assert_eq!(server.host, "db");
/// assert_eq!(server.timeout, Duration::from_secs(5));
/// # Ok::<(), confbind::ConfigError>(())
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(=> { $($key:ident = $tag:literal),* $(,)? })?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        impl $crate::Record for $name {
            fn fields(&mut self) -> ::std::vec::Vec<$crate::Field<'_>> {
                ::std::vec![
                    $(
                        $crate::Field::new(::core::stringify!($field), &mut self.$field)
                            $($( .tag(::core::stringify!($key), $tag) )*)?
                    ),*
                ]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::record! {
        #[derive(Debug, Default)]
        struct Sample {
            name: String => { conf = "sample.name,required", env = "NAME" },
            count: u8 => { conf = "sample.count" },
            untagged: bool,
        }
    }

    #[test]
    fn test_macro_declares_fields_in_order() {
        let mut sample = Sample::default();
        let fields = sample.fields();
        let names: Vec<_> = fields.iter().map(Field::name).collect();
        assert_eq!(names, ["name", "count", "untagged"]);
        assert_eq!(fields[0].annotation("conf"), Some("sample.name,required"));
        assert_eq!(fields[0].annotation("env"), Some("NAME"));
        assert_eq!(fields[1].annotation("env"), None);
        assert_eq!(fields[2].annotation("conf"), None);
    }

    #[test]
    fn test_later_tag_replaces_earlier() {
        let mut flag = false;
        let field = Field::new("flag", &mut flag).tag("conf", "a").tag("conf", "b");
        assert_eq!(field.annotation("conf"), Some("b"));
    }

    #[test]
    fn test_narrowing_is_range_checked() {
        let mut small = 0u8;
        assert_eq!(UintSlot::U8(&mut small).set(300), Err(OutOfRange("u8")));
        assert_eq!(small, 0);
        UintSlot::U8(&mut small).set(255).unwrap();
        assert_eq!(small, 255);

        let mut signed = 0i16;
        assert!(IntSlot::I16(&mut signed).set(-40_000).is_err());
        IntSlot::I16(&mut signed).set(-4).unwrap();
        assert_eq!(signed, -4);

        let mut single = 0f32;
        assert_eq!(FloatSlot::F32(&mut single).set(1e300), Err(OutOfRange("f32")));
        FloatSlot::F32(&mut single).set(0.5).unwrap();
        assert_eq!(single, 0.5);
    }

    #[test]
    fn test_type_names() {
        let mut seq: Vec<String> = Vec::new();
        assert_eq!(seq.slot().type_name(), "Vec<String>");
        let mut map: HashMap<String, String> = HashMap::new();
        assert_eq!(map.slot().type_name(), "HashMap<String, String>");
        let mut port = 0u16;
        assert_eq!(port.slot().type_name(), "u16");
    }
}
