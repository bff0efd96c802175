use crate::names::{FieldTable, ResolvedField, Scope};
use crate::{
    DeserializeError, DeserializeErrorKind, Error, Ini, IniParser, Options, Property, Scalar,
    ScalarError, Section,
};
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, Deserialize, DeserializeOwned, DeserializeSeed, Deserializer, Visitor};
use std::marker::PhantomData;

/// Convenience method for parsing the given INI data and binding it to a record.
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Config {
///     name: String,
///     #[serde(rename = "Database")]
///     database: Database,
/// }
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Database {
///     #[serde(rename = "Port")]
///     port: u16,
///     #[serde(rename = "Encrypted")]
///     encrypted: bool,
/// }
///
/// let data = b"name=demo\n[Database]\nPort=143\nEncrypted=false";
/// let config: Config = inibind::from_slice(&data[..])?;
/// assert_eq!(config, Config {
///     name: String::from("demo"),
///     database: Database { port: 143, encrypted: false },
/// });
/// # Ok::<(), inibind::Error>(())
/// ```
pub fn from_slice<T>(data: &[u8]) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    from_slice_with_options(data, Options::default())
}

/// Parse the given INI data with the tokenizer options and bind it to a record.
pub fn from_slice_with_options<T>(data: &[u8], options: Options) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let tree = IniParser::with_options(options).parse_slice(data)?;
    from_tree(&tree)
}

/// Parse the given INI text and bind it to a record.
pub fn from_str<T>(data: &str) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let tree = IniParser::new().parse_str(data)?;
    from_tree(&tree)
}

/// Bind an already parsed tree to a record. The record may borrow strings from the tree.
pub fn from_tree<'de, T>(tree: &'de Ini) -> Result<T, Error>
where
    T: Deserialize<'de>,
{
    Ok(T::deserialize(IniDeserializer::new(tree))?)
}

/// A structure to deserialize an INI parse tree into Rust values.
///
/// The root must be a record (a struct). Its fields are matched against the global
/// properties and the sections of the document:
///
/// - scalars and collections of scalars bind to global properties
/// - records bind to the first section with the field's name
/// - collections of records bind to every section with the field's name, or to every
///   section when the field is named `*`
///
/// Inside a section, a field named `ININame` receives the section's header text. Fields
/// without a matching property or section keep their zero value.
///
/// ```
/// use inibind::{Ini, IniDeserializer};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Peer {
///     #[serde(rename = "ININame")]
///     name: String,
///     allowed: Vec<String>,
/// }
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Doc {
///     #[serde(rename = "*")]
///     peers: Vec<Peer>,
/// }
///
/// let tree = Ini::from_slice(b"[a]\nallowed=1\nallowed=2\n[b]")?;
/// let doc = Doc::deserialize(IniDeserializer::new(&tree))?;
/// assert_eq!(doc.peers[0].allowed, vec!["1", "2"]);
/// assert_eq!(doc.peers[1].name, "b");
/// assert!(doc.peers[1].allowed.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IniDeserializer<'de> {
    tree: &'de Ini,
}

impl<'de> IniDeserializer<'de> {
    /// Create a deserializer over the given tree
    pub fn new(tree: &'de Ini) -> Self {
        IniDeserializer { tree }
    }
}

/// Identifies the record field a value is bound to, for error messages
#[derive(Debug, Clone, Copy, Default)]
struct Ctx {
    record: Option<&'static str>,
    field: Option<&'static str>,
}

impl Ctx {
    fn field_name(&self) -> &'static str {
        self.field.unwrap_or("")
    }
}

impl<'de> de::Deserializer<'de> for IniDeserializer<'de> {
    type Error = DeserializeError;

    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(DeserializeError::type_mismatch(
            "a value that is not a record",
            "an INI document",
        ))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        tracing::debug!(
            record = name,
            fields = fields.len(),
            sections = self.tree.sections().len(),
            "binding ini document"
        );
        visitor.visit_map(RecordAccess::new(Source::Top(self.tree), name, fields))
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

/// What a record's fields are looked up in
#[derive(Debug, Clone, Copy)]
enum Source<'de> {
    Top(&'de Ini),
    Section(&'de Section),

    /// Nothing to bind: every field receives its zero value
    Absent,
}

/// Presents every declared field of a record to its visitor, in declaration order.
struct RecordAccess<'de> {
    source: Source<'de>,
    record: &'static str,
    fields: FieldTable,
    idx: usize,
}

impl<'de> RecordAccess<'de> {
    fn new(source: Source<'de>, record: &'static str, fields: &'static [&'static str]) -> Self {
        let scope = match source {
            Source::Top(_) => Scope::Top,
            Source::Section(_) | Source::Absent => Scope::Section,
        };

        RecordAccess {
            source,
            record,
            fields: FieldTable::new(fields, scope),
            idx: 0,
        }
    }

    fn ctx(&self, field: &ResolvedField) -> Ctx {
        Ctx {
            record: Some(self.record),
            field: Some(field.name),
        }
    }

    /// The field whose key was handed out last
    fn current(&self) -> Result<ResolvedField, DeserializeError> {
        self.idx
            .checked_sub(1)
            .and_then(|idx| self.fields.get(idx))
            .ok_or_else(|| {
                <DeserializeError as de::Error>::custom("record value requested before its key")
            })
    }

    fn bind<V>(
        &self,
        field: ResolvedField,
        seed: V,
        option: OptionMode,
    ) -> Result<V::Value, DeserializeError>
    where
        V: DeserializeSeed<'de>,
    {
        let ctx = self.ctx(&field);

        if field.skip {
            return seed.deserialize(Value { raw: None, ctx });
        }

        match self.source {
            Source::Top(tree) => seed.deserialize(TopValue {
                tree,
                field,
                option,
                ctx,
            }),
            Source::Section(section) if field.origin_name => seed.deserialize(Value {
                raw: Some(section.name()),
                ctx,
            }),
            Source::Section(section) => seed.deserialize(PropertyValue {
                property: section.property(field.name),
                option,
                ctx,
            }),
            Source::Absent => seed.deserialize(Value { raw: None, ctx }),
        }
    }
}

impl<'de> de::MapAccess<'de> for RecordAccess<'de> {
    type Error = DeserializeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.fields.get(self.idx) {
            Some(field) => {
                self.idx += 1;
                seed.deserialize(BorrowedStrDeserializer::new(field.name))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let field = self.current()?;
        self.bind(field, seed, OptionMode::Present)
    }

    // Derived records call this with the field's type, so an optional field whose entry
    // doesn't fit the inner type can be bound again as `None`.
    fn next_value<V>(&mut self) -> Result<V, Self::Error>
    where
        V: Deserialize<'de>,
    {
        let field = self.current()?;
        match self.bind(field, PhantomData::<V>, OptionMode::Probe) {
            Err(e) if e.is_missing_value() => {
                self.bind(field, PhantomData::<V>, OptionMode::Vacant)
            }
            x => x,
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len().saturating_sub(self.idx))
    }
}

/// How an `Option` destination chooses between `Some` and `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionMode {
    /// `Some` whenever anything is stored under the field's name
    Present,

    /// As `Present`, but an entry that doesn't fit the inner type is reported as
    /// `MissingValue` so the field can be bound again as `None`
    Probe,

    /// Inside a probed `Some`
    Required,

    /// Always `None`
    Vacant,
}

impl OptionMode {
    fn some(self) -> OptionMode {
        match self {
            OptionMode::Probe | OptionMode::Required => OptionMode::Required,
            x => x,
        }
    }
}

fn missing_value(ctx: Ctx, expected: &'static str) -> DeserializeError {
    DeserializeError {
        kind: DeserializeErrorKind::MissingValue {
            field: ctx.field_name(),
            expected,
        },
    }
}

/// A top level field. Records bind to a section, collections of records to many
/// sections, and everything else to a global property.
struct TopValue<'de> {
    tree: &'de Ini,
    field: ResolvedField,
    option: OptionMode,
    ctx: Ctx,
}

impl<'de> TopValue<'de> {
    fn property(&self) -> PropertyValue<'de> {
        PropertyValue {
            property: self.tree.global().property(self.field.name),
            option: OptionMode::Present,
            ctx: self.ctx,
        }
    }

    /// The global property for a scalar request. Sections are never considered.
    fn scalar(&self) -> Result<PropertyValue<'de>, DeserializeError> {
        let property = self.property();
        if self.option == OptionMode::Required && !property.is_present() {
            return Err(missing_value(self.ctx, "global property"));
        }

        Ok(property)
    }

    fn has_sections(&self) -> bool {
        if self.field.wildcard {
            !self.tree.sections().is_empty()
        } else {
            self.tree.section(self.field.name).is_some()
        }
    }
}

macro_rules! forward_to_scalar {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                self.scalar()?.$method(visitor)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for TopValue<'de> {
    type Error = DeserializeError;

    forward_to_scalar! {
        deserialize_any deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32
        deserialize_i64 deserialize_i128 deserialize_u8 deserialize_u16 deserialize_u32
        deserialize_u64 deserialize_u128 deserialize_f32 deserialize_f64 deserialize_char
        deserialize_str deserialize_string deserialize_bytes deserialize_byte_buf
        deserialize_unit deserialize_map deserialize_identifier deserialize_ignored_any
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.option == OptionMode::Vacant {
            return visitor.visit_none();
        }

        if self.has_sections() || self.property().is_present() {
            visitor.visit_some(TopValue {
                option: self.option.some(),
                ..self
            })
        } else {
            visitor.visit_none()
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let sections = if self.field.wildcard {
            self.tree.sections().iter().collect()
        } else {
            self.tree.sections_named(self.field.name).collect()
        };

        visitor.visit_seq(TopSeq {
            sections,
            values: self.property().values(),
            kind: None,
            idx: 0,
            ctx: self.ctx,
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.tree.section(self.field.name) {
            Some(section) => visitor.visit_map(RecordAccess::new(
                Source::Section(section),
                name,
                fields,
            )),
            None if self.option == OptionMode::Required => {
                Err(missing_value(self.ctx, "section"))
            }
            None => visitor.visit_map(RecordAccess::new(Source::Absent, name, fields)),
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit_struct<V>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.scalar()?.deserialize_unit_struct(name, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.scalar()?.deserialize_enum(name, variants, visitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Record,
    Scalar,
}

/// A top level collection. The first element decides whether the collection holds
/// records (one per matching section) or scalars (one per global value).
struct TopSeq<'de> {
    sections: Vec<&'de Section>,
    values: &'de [String],
    kind: Option<ElementKind>,
    idx: usize,
    ctx: Ctx,
}

impl<'de> de::SeqAccess<'de> for TopSeq<'de> {
    type Error = DeserializeError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        let idx = self.idx;
        self.idx += 1;

        match self.kind {
            Some(ElementKind::Record) => match self.sections.get(idx).copied() {
                Some(section) => seed
                    .deserialize(SectionDeserializer {
                        section,
                        ctx: self.ctx,
                    })
                    .map(Some),
                None => Ok(None),
            },
            Some(ElementKind::Scalar) => match self.values.get(idx) {
                Some(raw) => seed
                    .deserialize(Value {
                        raw: Some(raw.as_str()),
                        ctx: self.ctx,
                    })
                    .map(Some),
                None => Ok(None),
            },
            None => {
                let first = FirstElement {
                    section: self.sections.first().copied(),
                    value: self.values.first().map(String::as_str),
                    kind: &mut self.kind,
                    ctx: self.ctx,
                };

                match seed.deserialize(first) {
                    Ok(x) => Ok(Some(x)),

                    // Undecided: nothing of the requested shape exists
                    Err(_) if self.kind.is_none() => Ok(None),
                    Err(e) => Err(e),
                }
            }
        }
    }
}

/// The first element of a top level collection. Records its shape once the element's
/// type asks for one.
struct FirstElement<'a, 'de> {
    section: Option<&'de Section>,
    value: Option<&'de str>,
    kind: &'a mut Option<ElementKind>,
    ctx: Ctx,
}

impl<'a, 'de> FirstElement<'a, 'de> {
    fn scalar(self) -> Result<Value<'de>, DeserializeError> {
        match self.value {
            Some(raw) => {
                *self.kind = Some(ElementKind::Scalar);
                Ok(Value {
                    raw: Some(raw),
                    ctx: self.ctx,
                })
            }
            None => Err(missing_value(self.ctx, "global value")),
        }
    }
}

impl<'a, 'de> de::Deserializer<'de> for FirstElement<'a, 'de> {
    type Error = DeserializeError;

    forward_to_scalar! {
        deserialize_any deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32
        deserialize_i64 deserialize_i128 deserialize_u8 deserialize_u16 deserialize_u32
        deserialize_u64 deserialize_u128 deserialize_f32 deserialize_f64 deserialize_char
        deserialize_str deserialize_string deserialize_bytes deserialize_byte_buf
        deserialize_unit deserialize_seq deserialize_map deserialize_identifier
        deserialize_ignored_any
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.section {
            Some(section) => {
                *self.kind = Some(ElementKind::Record);
                SectionDeserializer {
                    section,
                    ctx: self.ctx,
                }
                .deserialize_struct(name, fields, visitor)
            }
            None => Err(missing_value(self.ctx, "section")),
        }
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.scalar()?.deserialize_tuple(len, visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.scalar()?.deserialize_tuple_struct(name, len, visitor)
    }

    fn deserialize_unit_struct<V>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.scalar()?.deserialize_unit_struct(name, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.scalar()?.deserialize_enum(name, variants, visitor)
    }
}

/// A section can only be bound to a record
struct SectionDeserializer<'de> {
    section: &'de Section,
    ctx: Ctx,
}

impl<'de> de::Deserializer<'de> for SectionDeserializer<'de> {
    type Error = DeserializeError;

    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(DeserializeError::type_mismatch(
            "a value that is not a record",
            format!(
                "section {:?} (field {:?})",
                self.section.name(),
                self.ctx.field_name()
            ),
        ))
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(RecordAccess::new(
            Source::Section(self.section),
            name,
            fields,
        ))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

/// A property bound to a record field
#[derive(Clone, Copy)]
struct PropertyValue<'de> {
    property: Option<&'de Property>,
    option: OptionMode,
    ctx: Ctx,
}

impl<'de> PropertyValue<'de> {
    fn is_present(&self) -> bool {
        self.property.map_or(false, |x| !x.is_empty())
    }

    /// Values stored without a map key
    fn values(&self) -> &'de [String] {
        self.property.map_or(&[][..], |x| x.values(""))
    }

    /// The one raw value a scalar field binds to. Duplicated keys and map-style keys can't
    /// be represented by a scalar.
    fn single(&self, ty: &'static str) -> Result<Value<'de>, DeserializeError> {
        let property = match self.property {
            Some(x) if !x.is_empty() => x,
            _ => {
                return Ok(Value {
                    raw: None,
                    ctx: self.ctx,
                })
            }
        };

        match property.values("") {
            [] => Err(DeserializeError::type_mismatch(
                ty,
                format!("map-style key {:?}", self.ctx.field_name()),
            )),
            [raw] => Ok(Value {
                raw: Some(raw.as_str()),
                ctx: self.ctx,
            }),
            many => Err(DeserializeError::type_mismatch(
                ty,
                format!(
                    "{} values of duplicated key {:?}",
                    many.len(),
                    self.ctx.field_name()
                ),
            )),
        }
    }
}

macro_rules! forward_to_single {
    ($($method:ident => $ty:expr),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                self.single($ty)?.$method(visitor)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for PropertyValue<'de> {
    type Error = DeserializeError;

    forward_to_single! {
        deserialize_bool => "bool",
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_i128 => "i128",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_u128 => "u128",
        deserialize_f32 => "f32",
        deserialize_f64 => "f64",
        deserialize_char => "char",
        deserialize_str => "string",
        deserialize_string => "string",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_identifier => "identifier",
    }

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.property {
            Some(x) if x.is_keyed() => self.deserialize_map(visitor),
            Some(x) if x.values("").len() > 1 => self.deserialize_seq(visitor),
            _ => self.single("any value")?.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.option != OptionMode::Vacant && self.is_present() {
            visitor.visit_some(PropertyValue {
                option: self.option.some(),
                ..self
            })
        } else {
            visitor.visit_none()
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_seq(ValueSeq {
            values: self.values().iter().map(String::as_str),
            ctx: self.ctx,
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.property {
            Some(property) => visitor.visit_map(KeyedAccess {
                entries: property.entries(),
                value: None,
                ctx: self.ctx,
            }),
            None => visitor.visit_map(KeyedAccess {
                entries: std::iter::empty(),
                value: None,
                ctx: self.ctx,
            }),
        }
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.option == OptionMode::Required {
            return Err(missing_value(self.ctx, "record inside a section"));
        }

        tracing::debug!(
            field = self.ctx.field_name(),
            "skipping record nested inside a section"
        );
        visitor.visit_map(RecordAccess::new(Source::Absent, name, fields))
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.single(name)?.deserialize_enum(name, variants, visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// The elements of a collection of scalars. A record element means the collection is
/// nested too deep; the collection is then left empty.
struct ValueSeq<I> {
    values: I,
    ctx: Ctx,
}

impl<'de, I> de::SeqAccess<'de> for ValueSeq<I>
where
    I: Iterator<Item = &'de str>,
{
    type Error = DeserializeError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        let raw = match self.values.next() {
            Some(x) => x,
            None => return Ok(None),
        };

        match seed.deserialize(Value {
            raw: Some(raw),
            ctx: self.ctx,
        }) {
            Ok(x) => Ok(Some(x)),
            Err(e) if e.is_nested_record() => {
                tracing::debug!(
                    field = self.ctx.field_name(),
                    "skipping collection of records nested inside a section"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.values.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// The entries of a map-style property
struct KeyedAccess<'de, I> {
    entries: I,
    value: Option<&'de [String]>,
    ctx: Ctx,
}

impl<'de, I> de::MapAccess<'de> for KeyedAccess<'de, I>
where
    I: Iterator<Item = (&'de str, &'de [String])>,
{
    type Error = DeserializeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((key, values)) => {
                self.value = Some(values);
                seed.deserialize(Value {
                    raw: Some(key),
                    ctx: self.ctx,
                })
                .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let values = self
            .value
            .take()
            .ok_or_else(|| {
                <DeserializeError as de::Error>::custom("map value requested before its key")
            })?;
        seed.deserialize(Values {
            values,
            ctx: self.ctx,
        })
    }
}

/// The values of one map key: a collection takes all of them, a scalar takes the first,
/// and a record is left at its zero value.
struct Values<'de> {
    values: &'de [String],
    ctx: Ctx,
}

impl<'de> Values<'de> {
    fn first(&self) -> Value<'de> {
        Value {
            raw: self.values.first().map(String::as_str),
            ctx: self.ctx,
        }
    }
}

macro_rules! forward_to_first {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                self.first().$method(visitor)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Values<'de> {
    type Error = DeserializeError;

    forward_to_first! {
        deserialize_any deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32
        deserialize_i64 deserialize_i128 deserialize_u8 deserialize_u16 deserialize_u32
        deserialize_u64 deserialize_u128 deserialize_f32 deserialize_f64 deserialize_char
        deserialize_str deserialize_string deserialize_bytes deserialize_byte_buf
        deserialize_unit deserialize_map deserialize_identifier deserialize_ignored_any
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.values.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_seq(ValueSeq {
            values: self.values.iter().map(String::as_str),
            ctx: self.ctx,
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        tracing::debug!(
            field = self.ctx.field_name(),
            "skipping record stored under a map key"
        );
        visitor.visit_map(RecordAccess::new(Source::Absent, name, fields))
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit_struct<V>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.first().deserialize_unit_struct(name, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.first().deserialize_enum(name, variants, visitor)
    }
}

/// A single raw value. A missing value deserializes as the destination's zero value.
#[derive(Clone, Copy)]
struct Value<'de> {
    raw: Option<&'de str>,
    ctx: Ctx,
}

impl<'de> Value<'de> {
    fn convert<T, F>(&self, raw: &str, ty: &'static str, f: F) -> Result<T, DeserializeError>
    where
        F: FnOnce(Scalar) -> Result<T, ScalarError>,
    {
        f(Scalar::new(raw)).map_err(|source| DeserializeError {
            kind: DeserializeErrorKind::Conversion {
                value: raw.to_owned(),
                ty,
                record: self.ctx.record,
                field: self.ctx.field,
                source,
            },
        })
    }
}

macro_rules! deserialize_number {
    ($method:ident, $visit:ident, $ty:ty, $zero:expr, $conv:expr) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: Visitor<'de>,
        {
            match self.raw {
                None => visitor.$visit($zero),
                Some(raw) => visitor.$visit(self.convert(raw, stringify!($ty), $conv)?),
            }
        }
    };
    ($method:ident, $visit:ident, $ty:ty) => {
        deserialize_number!($method, $visit, $ty, 0, |s: Scalar| s.to_int::<$ty>());
    };
}

impl<'de> de::Deserializer<'de> for Value<'de> {
    type Error = DeserializeError;

    deserialize_number!(deserialize_i8, visit_i8, i8);
    deserialize_number!(deserialize_i16, visit_i16, i16);
    deserialize_number!(deserialize_i32, visit_i32, i32);
    deserialize_number!(deserialize_i64, visit_i64, i64);
    deserialize_number!(deserialize_i128, visit_i128, i128);
    deserialize_number!(deserialize_u8, visit_u8, u8);
    deserialize_number!(deserialize_u16, visit_u16, u16);
    deserialize_number!(deserialize_u32, visit_u32, u32);
    deserialize_number!(deserialize_u64, visit_u64, u64);
    deserialize_number!(deserialize_u128, visit_u128, u128);
    deserialize_number!(deserialize_f32, visit_f32, f32, 0.0, |s: Scalar| s.to_f32());
    deserialize_number!(deserialize_f64, visit_f64, f64, 0.0, |s: Scalar| s.to_f64());
    deserialize_number!(deserialize_bool, visit_bool, bool, false, |s: Scalar| {
        s.to_bool()
    });

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.raw {
            Some(raw) => visitor.visit_borrowed_str(raw),
            None => visitor.visit_unit(),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.raw {
            Some(_) => self.deserialize_str(visitor),
            None => visitor.visit_char('\0'),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.raw.unwrap_or(""))
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(self.raw.unwrap_or("").as_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.raw {
            Some(_) => visitor.visit_some(self),
            None => visitor.visit_none(),
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_seq(ValueSeq {
            values: self.raw.into_iter(),
            ctx: self.ctx,
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.raw {
            Some(raw) => Err(DeserializeError::type_mismatch(
                "a map",
                format!("value {:?}", raw),
            )),
            None => visitor.visit_map(KeyedAccess {
                entries: std::iter::empty(),
                value: None,
                ctx: self.ctx,
            }),
        }
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.raw {
            Some(_) => Err(DeserializeError {
                kind: DeserializeErrorKind::NestedRecord {
                    field: self.ctx.field_name(),
                },
            }),
            None => visitor.visit_map(RecordAccess::new(Source::Absent, name, fields)),
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.raw {
            Some(raw) => visitor.visit_enum(BorrowedStrDeserializer::new(raw)),
            None => Err(de::Error::custom(format_args!(
                "missing value for {} (field {:?})",
                name,
                self.ctx.field_name()
            ))),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}
