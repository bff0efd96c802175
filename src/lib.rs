/*!

Bind INI configuration text to typed records, and encode records back to INI text, with
[serde](https://serde.rs/derive.html).

## Features

- ✔ Typed: Bind sections and properties straight into your own structs
- ✔ Forgiving: Fields that don't appear in the document keep their zero value
- ✔ Repetition aware: Duplicate keys fill collections and repeated sections fill collections
  of records
- ✔ Symmetric: The record that was read can be written back out
- ✔ Inspectable: Work with the raw parse tree when a record doesn't fit

## Quick Start

```rust
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, PartialEq, Debug)]
#[serde(rename_all = "PascalCase")]
struct Database {
    server: String,
    port: u16,
    encrypted: bool,
    size: u64,
    value: f64,
}

#[derive(Deserialize, Serialize, PartialEq, Debug)]
struct Config {
    #[serde(rename = "Database")]
    database: Database,
}

let data = b"[Database]\nServer=192.0.2.62\nPort=143\nEncrypted=false\nSize=1234\nValue=12.34";

let expected = Config {
    database: Database {
        server: "192.0.2.62".to_string(),
        port: 143,
        encrypted: false,
        size: 1234,
        value: 12.34,
    },
};

let actual: Config = inibind::from_slice(&data[..]).unwrap();
assert_eq!(actual, expected);

let text = inibind::to_string(&actual).unwrap();
assert_eq!(text.as_bytes(), &data[..]);
```

## Naming

A field binds to the key or section with the field's serde name, so `#[serde(rename)]` and
`#[serde(rename_all)]` control the INI name. A few names are reserved:

- `-` never binds: the field keeps its zero value when reading and is not written
- `*` on a top level collection of records binds every section of the document
- `ININame` inside a section bound record holds the section's header text

```rust
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, Debug)]
struct Peer {
    #[serde(rename = "ININame")]
    name: String,
    allowed: Vec<String>,
    size: HashMap<String, u32>,
}

#[derive(Deserialize, Debug)]
struct Document {
    #[serde(rename = "*")]
    peers: Vec<Peer>,
}

let data = b"[a]\nallowed=10.0.0.1\nallowed=10.0.0.2\nsize[small]=1\n[b]";
let doc: Document = inibind::from_slice(&data[..]).unwrap();
assert_eq!(doc.peers[0].name, "a");
assert_eq!(doc.peers[0].allowed, vec!["10.0.0.1", "10.0.0.2"]);
assert_eq!(doc.peers[0].size["small"], 1);
assert_eq!(doc.peers[1].name, "b");
```

## Caveats

Records nest at most one level: the root record holds sections and each section holds
properties. A record nested inside a section record is neither read nor written (it keeps
its zero value). A collection of records inside a section is left empty, and a map whose
values are records holds zero valued records.

## One Level Lower

It can be the case that binding to a record is inappropriate. Then one can work with the
parse tree directly.

```rust
use inibind::Ini;

let tree = Ini::from_slice(b"app=demo\n[Database]\nPort=143").unwrap();
assert_eq!(tree.global().value("app"), Some("demo"));
assert_eq!(tree.section("Database").and_then(|x| x.value("Port")), Some("143"));
```

*/

mod de;
mod errors;
mod names;
mod scalar;
mod ser;
pub mod text;
mod tree;

pub use self::de::*;
pub use self::errors::*;
pub use self::names::{ORIGIN_NAME, SKIP, WILDCARD};
pub use self::scalar::{Scalar, ScalarError};
pub use self::ser::{to_string, to_tree, to_vec, to_writer};
pub use self::text::*;
pub use self::tree::{Ini, Property, Section};
