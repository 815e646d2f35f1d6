//! Static resource-definition metadata for the branch attribute surface.
//!
//! The schema is consumed by the surrounding declarative framework (for diff
//! computation and plan rendering) and by documentation generation. It is
//! not a runtime component of reconciliation itself.

/// Attribute value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    /// UTF-8 string attribute.
    String,
    /// 64-bit integer attribute.
    Int,
}

/// Definition of a single declared attribute.
#[derive(Debug, Clone, Copy)]
pub struct AttrDef {
    /// Attribute name.
    pub name: &'static str,
    /// Value type.
    pub ty: AttrType,
    /// The orchestrator must supply a value.
    pub required: bool,
    /// The orchestrator may supply a value.
    pub optional: bool,
    /// The remote assigns a value when none is supplied.
    pub computed: bool,
    /// A change cannot be applied in place and forces destroy + recreate.
    pub force_new: bool,
    /// Attributes that may not be set together with this one.
    pub conflicts_with: &'static [&'static str],
    /// Documentation string.
    pub description: &'static str,
}

impl AttrDef {
    /// Whether the attribute is populated exclusively by the remote.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// Declared attribute surface of the branch resource.
pub const SCHEMA: &[AttrDef] = &[
    AttrDef {
        name: "project_id",
        ty: AttrType::String,
        required: true,
        optional: false,
        computed: false,
        force_new: false,
        conflicts_with: &[],
        description: "Project ID.",
    },
    AttrDef {
        name: "name",
        ty: AttrType::String,
        required: false,
        optional: true,
        computed: true,
        force_new: false,
        conflicts_with: &[],
        description: "Branch name.",
    },
    AttrDef {
        name: "parent_id",
        ty: AttrType::String,
        required: false,
        optional: true,
        computed: true,
        force_new: false,
        conflicts_with: &[],
        description: "ID of the branch to checkout.",
    },
    AttrDef {
        name: "parent_lsn",
        ty: AttrType::String,
        required: false,
        optional: true,
        computed: true,
        force_new: true,
        conflicts_with: &["parent_timestamp"],
        description: "Log Sequence Number (LSN) horizon for the data to be present in the new branch.",
    },
    AttrDef {
        name: "parent_timestamp",
        ty: AttrType::Int,
        required: false,
        optional: true,
        computed: true,
        force_new: true,
        conflicts_with: &["parent_lsn"],
        description: "Timestamp horizon for the data to be present in the new branch, defined as Unix epoch seconds.",
    },
    AttrDef {
        name: "physical_size_mb",
        ty: AttrType::Int,
        required: false,
        optional: false,
        computed: true,
        force_new: false,
        conflicts_with: &[],
        description: "Branch physical size in MB.",
    },
    AttrDef {
        name: "logical_size_mb",
        ty: AttrType::Int,
        required: false,
        optional: false,
        computed: true,
        force_new: false,
        conflicts_with: &[],
        description: "Branch logical size in MB.",
    },
    AttrDef {
        name: "current_state",
        ty: AttrType::String,
        required: false,
        optional: false,
        computed: true,
        force_new: false,
        conflicts_with: &[],
        description: "Branch state.",
    },
    AttrDef {
        name: "pending_state",
        ty: AttrType::String,
        required: false,
        optional: false,
        computed: true,
        force_new: false,
        conflicts_with: &[],
        description: "Branch pending state.",
    },
    AttrDef {
        name: "created_at",
        ty: AttrType::String,
        required: false,
        optional: false,
        computed: true,
        force_new: false,
        conflicts_with: &[],
        description: "Branch creation timestamp.",
    },
    AttrDef {
        name: "updated_at",
        ty: AttrType::String,
        required: false,
        optional: false,
        computed: true,
        force_new: false,
        conflicts_with: &[],
        description: "Branch last update timestamp.",
    },
];

/// Look up an attribute definition by name.
#[must_use]
pub fn attr(name: &str) -> Option<&'static AttrDef> {
    SCHEMA.iter().find(|def| def.name == name)
}
