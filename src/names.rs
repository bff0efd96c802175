//! Maps record field names onto parse tree entries.
//!
//! Serde hands the deserializer the effective name of every field (after any
//! `#[serde(rename = "...")]`), so resolution works on those names. A few names are
//! reserved:
//!
//! - `-` never binds in either direction
//! - `*` on a top level collection of records binds every section
//! - `ININame` on a section bound record receives the section's header text

/// Field name that receives a section's header text
pub const ORIGIN_NAME: &str = "ININame";

/// Field name that opts a collection of records into receiving every section
pub const WILDCARD: &str = "*";

/// Field name that excludes a field from binding
pub const SKIP: &str = "-";

/// Where the record being bound lives in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// The root record: global properties and sections
    Top,

    /// A record bound to a section
    Section,
}

/// The outcome of resolving a field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedField {
    pub name: &'static str,
    pub wildcard: bool,
    pub origin_name: bool,
    pub skip: bool,
}

pub(crate) fn resolve(name: &'static str, scope: Scope) -> ResolvedField {
    ResolvedField {
        name,
        wildcard: scope == Scope::Top && name == WILDCARD,
        origin_name: scope == Scope::Section && name == ORIGIN_NAME,
        skip: name == SKIP,
    }
}

/// The resolved fields of a record, built once per bind of that record. Skipped fields stay
/// in the table so the record still sees them (bound to their zero value).
#[derive(Debug)]
pub(crate) struct FieldTable {
    fields: Vec<ResolvedField>,
}

impl FieldTable {
    pub(crate) fn new(fields: &'static [&'static str], scope: Scope) -> Self {
        let fields = fields
            .iter()
            .map(|&x| resolve(x, scope))
            .collect();
        FieldTable { fields }
    }

    pub(crate) fn get(&self, idx: usize) -> Option<ResolvedField> {
        self.fields.get(idx).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.fields.len()
    }
}
