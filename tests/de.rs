use inibind::{DeserializeErrorKind, ErrorKind, Ini, Options};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Deserialize, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Interface {
    private_key: String,
    listen_port: u16,
    address: Vec<String>,
    #[serde(rename = "DNS")]
    dns: Option<String>,
    mtu: Option<u16>,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Peer {
    #[serde(rename = "ININame")]
    header: String,
    public_key: String,
    #[serde(rename = "AllowedIPs")]
    allowed_ips: Vec<String>,
    persistent_keepalive: Option<u16>,
    endpoint: Option<String>,
}

#[derive(Deserialize, Debug, PartialEq)]
struct WireGuard {
    #[serde(rename = "Interface")]
    interface: Interface,
    #[serde(rename = "Peer")]
    peers: Vec<Peer>,
}

fn deserialize_kind(err: inibind::Error) -> DeserializeErrorKind {
    match err.into_kind() {
        ErrorKind::Deserialize(e) => e.kind().clone(),
        x => panic!("unexpected error: {:?}", x),
    }
}

#[test]
fn wireguard_config() {
    let data = include_bytes!("./fixtures/wireguard.ini");
    let actual: WireGuard = inibind::from_slice(&data[..]).unwrap();

    assert_eq!(
        actual.interface,
        Interface {
            private_key: String::from("yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk="),
            listen_port: 51820,
            address: vec![
                String::from("10.200.100.1/24"),
                String::from("fd42:42:42::1/64")
            ],
            dns: Some(String::from("10.200.100.1")),
            mtu: None,
        }
    );

    assert_eq!(actual.peers.len(), 2);
    assert_eq!(actual.peers[0].header, "Peer");
    assert_eq!(
        actual.peers[0].allowed_ips,
        vec!["10.200.100.2/32", "fd42:42:42::2/128"]
    );
    assert_eq!(actual.peers[0].persistent_keepalive, Some(25));
    assert_eq!(actual.peers[0].endpoint, None);
    assert_eq!(
        actual.peers[1].public_key,
        "TrMvSoP4jYQlY6RIzBgbssQqY3vxI2Pi+y71lOWWXX0="
    );
    assert_eq!(actual.peers[1].persistent_keepalive, None);
    assert_eq!(
        actual.peers[1].endpoint.as_deref(),
        Some("192.95.5.69:51820")
    );
}

#[test]
fn app_config_with_globals_maps_and_repeated_sections() {
    #[derive(Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct Database {
        server: String,
        port: u16,
        encrypted: bool,
        size: u64,
        value: f64,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Cache {
        ttl: u32,
        servers: Vec<String>,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct App {
        name: String,
        version: u32,
        debug: bool,
        tags: Vec<String>,
        limit: BTreeMap<String, u32>,
        #[serde(rename = "Database")]
        database: Database,
        #[serde(rename = "Cache")]
        caches: Vec<Cache>,
    }

    let data = include_bytes!("./fixtures/app.ini");
    let actual: App = inibind::from_slice(&data[..]).unwrap();

    let mut limit = BTreeMap::new();
    limit.insert(String::from("cpu"), 2);
    limit.insert(String::from("memory"), 512);

    assert_eq!(
        actual,
        App {
            name: String::from("demo"),
            version: 3,
            debug: true,
            tags: vec![String::from("web"), String::from("api")],
            limit,
            database: Database {
                server: String::from("192.0.2.62"),
                port: 143,
                encrypted: false,
                size: 1234,
                value: 12.34,
            },
            caches: vec![
                Cache {
                    ttl: 30,
                    servers: vec![String::from("10.0.0.1"), String::from("10.0.0.2")],
                },
                Cache {
                    ttl: 60,
                    servers: Vec::new(),
                },
            ],
        }
    );
}

#[test]
fn wildcard_binds_every_section_in_order() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Item {
        #[serde(rename = "ININame")]
        name: String,
        value: Option<i32>,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        #[serde(rename = "*")]
        items: Vec<Item>,
    }

    let data = b"ignored=1\n[A]\nvalue=1\n[B]\n[C]\nvalue=-3";
    let actual: Doc = inibind::from_slice(&data[..]).unwrap();
    assert_eq!(
        actual.items,
        vec![
            Item {
                name: String::from("A"),
                value: Some(1)
            },
            Item {
                name: String::from("B"),
                value: None
            },
            Item {
                name: String::from("C"),
                value: Some(-3)
            },
        ]
    );
}

#[test]
fn wildcard_name_is_literal_outside_record_collections() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        #[serde(rename = "*")]
        star: String,
    }

    let actual: Doc = inibind::from_slice(b"*=value\n[A]").unwrap();
    assert_eq!(actual.star, "value");
}

#[test]
fn origin_name_is_an_ordinary_key_at_the_top() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        #[serde(rename = "ININame")]
        name: String,
    }

    let actual: Doc = inibind::from_slice(b"ININame=root").unwrap();
    assert_eq!(actual.name, "root");
}

#[test]
fn unknown_keys_and_sections_are_ignored() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        a: u8,
    }

    let actual: Doc = inibind::from_slice(b"b=2\na=1\n[x]\na=5").unwrap();
    assert_eq!(actual, Doc { a: 1 });
}

#[test]
fn zero_values_for_empty_document() {
    #[derive(Deserialize, Debug, PartialEq, Default)]
    struct Inner {
        flag: bool,
        count: i16,
    }

    #[derive(Deserialize, Debug, PartialEq, Default)]
    struct Doc {
        text: String,
        num: u64,
        float: f64,
        list: Vec<u8>,
        map: HashMap<String, String>,
        inner: Inner,
        opt: Option<Inner>,
    }

    let actual: Doc = inibind::from_slice(b"").unwrap();
    assert_eq!(actual, Doc::default());
}

#[test]
fn conversion_error_names_record_and_field() {
    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    struct Database {
        #[allow(dead_code)]
        port: u16,
    }

    #[derive(Deserialize, Debug)]
    struct Doc {
        #[serde(rename = "Database")]
        #[allow(dead_code)]
        database: Database,
    }

    let err = inibind::from_slice::<Doc>(b"[Database]\nPort=70000").unwrap_err();
    assert_eq!(
        err.to_string(),
        "deserialize error: cannot convert \"70000\" into u16 (field Database.Port): caused an overflow: 70000"
    );
}

#[test]
fn bool_literals() {
    #[derive(Deserialize, Debug)]
    struct Doc {
        a: bool,
        b: bool,
        c: bool,
        d: bool,
    }

    let actual: Doc = inibind::from_slice(b"a=1\nb=T\nc=FALSE\nd=true").unwrap();
    assert!(actual.a && actual.b && !actual.c && actual.d);

    let err = inibind::from_slice::<Doc>(b"a=yes").unwrap_err();
    assert!(matches!(
        deserialize_kind(err),
        DeserializeErrorKind::Conversion { ty: "bool", .. }
    ));
}

#[test]
fn duplicate_key_into_scalar_is_an_error() {
    #[derive(Deserialize, Debug)]
    struct Doc {
        #[allow(dead_code)]
        name: String,
    }

    let err = inibind::from_slice::<Doc>(b"name=a\nname=b").unwrap_err();
    assert!(matches!(
        deserialize_kind(err),
        DeserializeErrorKind::TypeMismatch { .. }
    ));
}

#[test]
fn parse_errors_surface_with_line() {
    #[derive(Deserialize, Debug)]
    struct Doc {}

    let err = inibind::from_slice::<Doc>(b"a=1\n\n[broken").unwrap_err();
    assert_eq!(err.line(), Some(3));
    assert!(matches!(err.kind(), ErrorKind::Parse(_)));
}

#[test]
fn options_affect_tokenizing_only() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        motd: String,
        next: u8,
    }

    let data = b"# banner\nmotd = welcome\n    to the server\nnext=1";
    let options = Options {
        allow_multiline_values: true,
        allow_number_sign_comments: true,
    };

    let actual: Doc = inibind::from_slice_with_options(&data[..], options).unwrap();
    assert_eq!(
        actual,
        Doc {
            motd: String::from("welcome\nto the server"),
            next: 1,
        }
    );
}

#[test]
fn borrow_from_tree() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Section<'a> {
        #[serde(rename = "ININame")]
        name: &'a str,
        key: &'a str,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc<'a> {
        #[serde(borrow, rename = "*")]
        sections: Vec<Section<'a>>,
    }

    let tree = Ini::from_slice(b"[one]\nkey=a\n[two]\nkey=b").unwrap();
    let doc: Doc = inibind::from_tree(&tree).unwrap();
    assert_eq!(
        doc.sections,
        vec![
            Section {
                name: "one",
                key: "a"
            },
            Section {
                name: "two",
                key: "b"
            },
        ]
    );
}

#[test]
fn serde_defaults_and_custom_fields_still_apply() {
    fn default_port() -> u16 {
        8080
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Doc {
        // Every declared field is presented to the record, so an absent field is its zero
        // value rather than the serde default
        #[serde(default = "default_port")]
        port: u16,
        #[serde(skip)]
        cache: Vec<u8>,
    }

    let actual: Doc = inibind::from_slice(b"").unwrap();
    assert_eq!(
        actual,
        Doc {
            port: 0,
            cache: Vec::new()
        }
    );
}
