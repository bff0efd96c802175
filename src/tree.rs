//! The INI parse tree: global properties plus named sections.
//!
//! The tree is the hand-off point between the text format and the bind engine. All values
//! are raw strings; nothing is coerced until a record asks for a specific type.
//!
//! ```
//! use inibind::Ini;
//!
//! let tree = Ini::from_slice(b"name=demo\n[Server]\nport=80\n[Server]\nport=81")?;
//! assert_eq!(tree.global().value("name"), Some("demo"));
//! assert_eq!(tree.sections_named("Server").count(), 2);
//! assert_eq!(tree.section("Server").and_then(|s| s.value("port")), Some("80"));
//! # Ok::<(), inibind::Error>(())
//! ```

use indexmap::IndexMap;

/// A parsed INI document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ini {
    global: Section,
    sections: Vec<Section>,
}

impl Ini {
    /// Creates an empty tree
    pub fn new() -> Self {
        Ini::default()
    }

    /// Properties that appear before the first section header
    pub fn global(&self) -> &Section {
        &self.global
    }

    /// Mutable access to the global properties
    pub fn global_mut(&mut self) -> &mut Section {
        &mut self.global
    }

    /// Every section in the order it was encountered
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The first section with the given name
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|x| x.name == name)
    }

    /// All sections with the given name, in order
    pub fn sections_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Section> + 'a {
        self.sections.iter().filter(move |x| x.name == name)
    }

    /// Append a section. Sections that share a name are kept as separate instances.
    pub fn push_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Open a new section at the end of the document and return it for population
    pub fn add_section(&mut self, name: impl Into<String>) -> &mut Section {
        self.sections.push(Section::new(name));
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    pub(crate) fn last_section_mut(&mut self) -> Option<&mut Section> {
        self.sections.last_mut()
    }

    /// Returns true if there are no global properties and no sections
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.sections.is_empty()
    }
}

/// A named group of properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    properties: IndexMap<String, Property>,
}

impl Section {
    /// Creates an empty section with the given header text
    pub fn new(name: impl Into<String>) -> Self {
        Section {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    /// The header text. Empty for the global section.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Look up a property by key
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    /// The first plain value of a property
    pub fn value(&self, key: &str) -> Option<&str> {
        self.property(key)
            .and_then(|x| x.values("").first())
            .map(String::as_str)
    }

    /// Iterate over properties in insertion order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Record an occurrence of `key=value` (or `key[map_key]=value` when `map_key` is
    /// non-empty). Repeated occurrences accumulate.
    pub fn push_value(
        &mut self,
        key: impl Into<String>,
        map_key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.properties
            .entry(key.into())
            .or_default()
            .push(map_key, value);
    }

    /// Number of distinct property keys
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns true if the section has no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// The raw values recorded for one key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Property {
    values: IndexMap<String, Vec<String>>,
}

impl Property {
    /// The values recorded under the map key, empty if none. Plain `key=value` entries are
    /// stored under the empty map key.
    pub fn values(&self, map_key: &str) -> &[String] {
        self.values.get(map_key).map_or(&[][..], Vec::as_slice)
    }

    /// Iterate over every map key and its values in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns true if any value was recorded with `key[map_key]=value` syntax
    pub fn is_keyed(&self) -> bool {
        self.values.keys().any(|k| !k.is_empty())
    }

    /// Returns true if no values are recorded
    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
    }

    fn push(&mut self, map_key: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(map_key.into())
            .or_default()
            .push(value.into());
    }
}
