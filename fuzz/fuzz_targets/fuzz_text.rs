#![no_main]
use libfuzzer_sys::fuzz_target;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
struct Config {
    name: String,
    tags: Vec<String>,
    limit: HashMap<String, u32>,
    #[serde(rename = "Database")]
    database: Database,
    #[serde(rename = "*")]
    sections: Vec<Section>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Database {
    server: String,
    port: u16,
    encrypted: bool,
    value: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
struct Section {
    #[serde(rename = "ININame")]
    name: String,
    values: Vec<String>,
    size: Option<i64>,
}

fuzz_target!(|data: &[u8]| {
    let options = inibind::Options {
        allow_multiline_values: data.first().map_or(false, |x| x & 1 == 1),
        allow_number_sign_comments: data.first().map_or(false, |x| x & 2 == 2),
    };

    let tree = match inibind::IniParser::with_options(options).parse_slice(data) {
        Ok(x) => x,
        Err(_) => return,
    };

    let mut out = Vec::new();
    if inibind::IniWriter::new(&mut out).write_tree(&tree).is_ok() {
        let _ = inibind::IniParser::with_options(options).parse_slice(&out);
    }

    if let Ok(config) = inibind::from_tree::<Config>(&tree) {
        let _ = inibind::to_vec(&config);
    }
});
