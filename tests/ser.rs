use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Main {
    host: String,
    port: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Server {
    weight: u32,
    aliases: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Doc {
    title: String,
    count: i64,
    ratio: f64,
    enabled: bool,
    tags: Vec<String>,
    limits: BTreeMap<String, u32>,
    #[serde(rename = "Main")]
    main: Main,
    #[serde(rename = "server")]
    servers: Vec<Server>,
}

/// Values that survive the trimming and line splitting of the text format
fn word(g: &mut Gen) -> String {
    String::arbitrary(g)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn words(g: &mut Gen) -> Vec<String> {
    let len = usize::arbitrary(g) % 4;
    (0..len).map(|_| word(g)).collect()
}

fn finite(g: &mut Gen) -> f64 {
    let x = f64::arbitrary(g);
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

impl Arbitrary for Doc {
    fn arbitrary(g: &mut Gen) -> Self {
        let servers = (0..usize::arbitrary(g) % 4)
            .map(|_| Server {
                weight: u32::arbitrary(g),
                aliases: words(g),
            })
            .collect();

        let limits = (0..usize::arbitrary(g) % 4)
            .map(|_| (format!("k{}", word(g)), u32::arbitrary(g)))
            .collect();

        Doc {
            title: word(g),
            count: i64::arbitrary(g),
            ratio: finite(g),
            enabled: bool::arbitrary(g),
            tags: words(g),
            limits,
            main: Main {
                host: word(g),
                port: u16::arbitrary(g),
            },
            servers,
        }
    }
}

#[quickcheck]
fn encode_then_decode_is_identity(doc: Doc) -> bool {
    let data = inibind::to_vec(&doc).unwrap();
    let actual: Doc = inibind::from_slice(&data).unwrap();
    actual == doc
}

#[test]
fn canonical_database() {
    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Database {
        server: String,
        port: i32,
        encrypted: bool,
        size: u32,
        value: f64,
    }

    #[derive(Serialize)]
    struct Input {
        #[serde(rename = "Database")]
        database: Database,
    }

    let input = Input {
        database: Database {
            server: String::from("192.0.2.62"),
            port: 143,
            encrypted: false,
            size: 1234,
            value: 12.34,
        },
    };

    assert_eq!(
        inibind::to_vec(&input).unwrap(),
        b"[Database]\nServer=192.0.2.62\nPort=143\nEncrypted=false\nSize=1234\nValue=12.34"
    );
}

#[test]
fn wildcard_sections_round_trip_through_origin_name() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Item {
        #[serde(rename = "ININame")]
        name: String,
        value: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Doc {
        #[serde(rename = "*")]
        items: Vec<Item>,
    }

    let doc = Doc {
        items: vec![
            Item {
                name: String::from("A"),
                value: 1,
            },
            Item {
                name: String::from("B"),
                value: 2,
            },
        ],
    };

    let text = inibind::to_string(&doc).unwrap();
    assert_eq!(text, "[A]\nvalue=1\n[B]\nvalue=2");

    let actual: Doc = inibind::from_str(&text).unwrap();
    assert_eq!(actual, doc);
}

#[test]
fn skip_serializing_none_matches_omitted_options() {
    #[skip_serializing_none]
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Section {
        a: Option<u32>,
        b: Option<String>,
        c: Option<bool>,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Doc {
        section: Section,
        top: Option<u8>,
    }

    let doc = Doc {
        section: Section {
            a: Some(1),
            b: None,
            c: Some(false),
        },
        top: None,
    };

    let text = inibind::to_string(&doc).unwrap();
    assert_eq!(text, "[section]\na=1\nc=false");

    let actual: Doc = inibind::from_str(&text).unwrap();
    assert_eq!(actual, doc);
}

#[test]
fn skipped_fields_are_not_written() {
    #[derive(Serialize)]
    struct Doc {
        #[serde(rename = "-")]
        secret: &'static str,
        #[serde(skip)]
        cache: Vec<u8>,
        shown: u8,
    }

    let doc = Doc {
        secret: "hunter2",
        cache: vec![1, 2, 3],
        shown: 1,
    };
    assert_eq!(inibind::to_string(&doc).unwrap(), "shown=1");
}

#[test]
fn map_entries_write_sub_keys() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Doc {
        size: BTreeMap<String, u32>,
    }

    let mut size = BTreeMap::new();
    size.insert(String::from("large"), 10);
    size.insert(String::from("small"), 1);

    let doc = Doc { size };
    let text = inibind::to_string(&doc).unwrap();
    assert_eq!(text, "size[large]=10\nsize[small]=1");
    assert_eq!(inibind::from_str::<Doc>(&text).unwrap(), doc);
}

#[test]
fn multiline_values_need_the_option_to_read_back() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Doc {
        motd: String,
    }

    let doc = Doc {
        motd: String::from("hello\nworld"),
    };
    let data = inibind::to_vec(&doc).unwrap();
    assert_eq!(data, b"motd=hello\\\nworld");

    let options = inibind::Options {
        allow_multiline_values: true,
        ..inibind::Options::default()
    };
    let actual: Doc = inibind::from_slice_with_options(&data, options).unwrap();
    assert_eq!(actual, doc);
}

#[test]
fn invalid_keys_are_rejected() {
    #[derive(Serialize)]
    struct Doc {
        #[serde(rename = "a=b")]
        field: u8,
    }

    let err = inibind::to_vec(&Doc { field: 1 }).unwrap_err();
    assert!(matches!(
        err.kind(),
        inibind::ErrorKind::InvalidName { what: "key", .. }
    ));
}
