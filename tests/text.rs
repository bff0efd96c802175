use inibind::{Ini, IniParser, IniWriter, Lexer, Options, ParseErrorKind, Token};
use rstest::*;

fn normalize(data: &[u8]) -> String {
    let tree = IniParser::new()
        .number_sign_comments(true)
        .multiline_values(true)
        .parse_slice(data)
        .unwrap();

    let mut out = Vec::new();
    IniWriter::new(&mut out).write_tree(&tree).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn wireguard_tree() {
    let data = include_bytes!("./fixtures/wireguard.ini");
    let tree = Ini::from_slice(&data[..]).unwrap();

    assert!(tree.global().is_empty());
    let names: Vec<_> = tree.sections().iter().map(|x| x.name()).collect();
    assert_eq!(names, vec!["Interface", "Peer", "Peer"]);

    let interface = tree.section("Interface").unwrap();
    assert_eq!(
        interface.property("Address").unwrap().values(""),
        ["10.200.100.1/24", "fd42:42:42::1/64"]
    );

    // Values keep everything after the first `=`
    assert_eq!(
        interface.value("PrivateKey"),
        Some("yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=")
    );

    let peers: Vec<_> = tree.sections_named("Peer").collect();
    assert_eq!(peers[1].value("Endpoint"), Some("192.95.5.69:51820"));
    assert!(peers[0].property("Endpoint").is_none());
}

#[test]
fn normalized_output_is_stable() {
    let data = include_bytes!("./fixtures/app.ini");
    let first = normalize(&data[..]);
    let second = normalize(first.as_bytes());
    assert_eq!(first, second);
    assert!(first.starts_with("name=demo\nversion=3\ndebug=true\ntags=web\ntags=api\n"));
    assert!(first.ends_with("[Cache]\nttl=60"));
}

#[test]
fn crlf_input() {
    let tree = Ini::from_slice(b"a=1\r\n[s]\r\nb=2\r\n").unwrap();
    assert_eq!(tree.global().value("a"), Some("1"));
    assert_eq!(tree.section("s").and_then(|x| x.value("b")), Some("2"));
}

#[rstest]
#[case(b"[open", 1, ParseErrorKind::UnterminatedSection)]
#[case(b"a=1\n[]", 2, ParseErrorKind::EmptySectionName)]
#[case(b"a=1\nb=2\n = 3", 3, ParseErrorKind::EmptyKey)]
#[case(b"\n\njunk", 3, ParseErrorKind::MissingSeparator(String::from("junk")))]
#[case(b"k[x=1", 1, ParseErrorKind::UnterminatedMapKey(String::from("k[x")))]
#[case(b"ok=1\n\xfe", 2, ParseErrorKind::InvalidUtf8)]
fn parse_errors(#[case] input: &[u8], #[case] line: usize, #[case] kind: ParseErrorKind) {
    let err = Ini::from_slice(input).unwrap_err();
    assert_eq!(err.line(), Some(line));
    match err.into_kind() {
        inibind::ErrorKind::Parse(e) => assert_eq!(e.kind(), &kind),
        x => panic!("unexpected error: {:?}", x),
    }
}

#[test]
fn lexer_reports_comments() {
    let options = Options {
        allow_number_sign_comments: true,
        ..Options::default()
    };
    let tokens: Vec<_> = Lexer::new("; one\n# two\nkey=v", options)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0], Token::Comment("one"));
    assert_eq!(tokens[1], Token::Comment("two"));
}

#[test]
fn built_tree_writes_like_parsed_tree() {
    let mut tree = Ini::new();
    tree.global_mut().push_value("app", "", "demo");
    tree.add_section("Database").push_value("Port", "", "143");

    let mut out = Vec::new();
    IniWriter::new(&mut out).write_tree(&tree).unwrap();
    assert_eq!(out, b"app=demo\n[Database]\nPort=143");
    assert_eq!(Ini::from_slice(&out).unwrap(), tree);
}
