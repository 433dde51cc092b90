use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OBJECT_SCHEMA_VERSION: u8 = 1;

/// Opaque reference to a persistent world object.
///
/// Equality is by identifier value. [`ObjRef::NOTHING`] is the distinguished
/// absence marker: it never identifies a real object, and every operation in
/// this crate treats it as "no object" rather than a valid target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef(pub i64);

impl ObjRef {
    /// The "no object" sentinel, also used as the failure return of the
    /// creation operations.
    pub const NOTHING: ObjRef = ObjRef(-1);

    pub fn is_nothing(&self) -> bool {
        *self == Self::NOTHING
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// A location container. Rooms hold other objects through those objects'
    /// `location` field.
    Room,
    /// A portable object. Created into its creator's inventory.
    Thing,
}

/// A named, owned, visibility-flagged value slot attached to a world object.
///
/// Names are unique within one object's property collection. The owner is
/// fixed when the property is created and does not change on value updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Value,
    pub owner: ObjRef,
    /// Readable by callers other than the owner.
    #[serde(default)]
    pub readable: bool,
    /// Writeable by callers other than the object's owner.
    #[serde(default)]
    pub writeable: bool,
}

impl Property {
    pub fn new(name: &str, value: Value, owner: ObjRef) -> Self {
        Self {
            name: name.to_string(),
            value,
            owner,
            readable: false,
            writeable: false,
        }
    }
}

/// Result vocabulary for script-facing property reads.
///
/// `Absent` covers both "no such property" and "object unreachable within the
/// operation deadline"; the two are deliberately indistinguishable. `Denied`
/// is the distinguished permission sentinel: the property exists, but the
/// caller may not see its value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropRead {
    Value(Value),
    Absent,
    Denied,
}

impl PropRead {
    pub fn is_denied(&self) -> bool {
        matches!(self, PropRead::Denied)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, PropRead::Absent)
    }
}

/// A persistent world object: a room or a thing.
///
/// Identifiers are assigned by the store at creation, are globally unique and
/// never reused. Every object has exactly one owner at any time. Mutation
/// only reaches the store through an explicit save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectRecord {
    pub id: ObjRef,
    pub kind: ObjectKind,
    pub name: String,
    pub owner: ObjRef,
    pub location: ObjRef,
    pub parent: ObjRef,
    #[serde(default)]
    pub contents: BTreeSet<ObjRef>,
    #[serde(default)]
    pub properties: Vec<Property>,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl ObjectRecord {
    pub fn new(id: ObjRef, kind: ObjectKind, name: &str) -> Self {
        Self {
            id,
            kind,
            name: name.to_string(),
            owner: ObjRef::NOTHING,
            location: ObjRef::NOTHING,
            parent: ObjRef::NOTHING,
            contents: BTreeSet::new(),
            properties: Vec::new(),
            created_at: Utc::now(),
            schema_version: OBJECT_SCHEMA_VERSION,
        }
    }

    /// Look up a property by exact name match (read path).
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Look up a property position by ASCII case-insensitive match (write
    /// path). The read path matches exactly; this asymmetry is kept on
    /// purpose, see DESIGN.md.
    pub fn property_position_ci(&self, name: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Reduced view handed to callers that do not own this object: properties
    /// not flagged public-readable are stripped. Structural fields (location,
    /// parent, contents) stay visible.
    pub fn sanitized(&self) -> Self {
        let mut view = self.clone();
        view.properties.retain(|p| p.readable);
        view
    }
}
