mod support;

use test_case::test_case;

use gbnf::symbol::{
    alter, concat, define, nterm, repeat, repeat_at_least, rules_def, term, term_range,
};
use gbnf::{Grammar, Lexer, LexerConfig, NoDiagnostics, SrConfig, SrParser};

use support::sketch;

/// A small JSON dialect: objects, arrays, strings over `[a-z]`,
/// integers, booleans and null. The keywords overlap the string
/// character range, so the lexer fragments them into candidate sets
/// and the parser resolves each use from its context.
fn json() -> Grammar {
    let digit_terms = (b'0'..=b'9').map(|b| term([b]));
    Grammar::new(rules_def([
        define(nterm("digit"), alter(digit_terms)),
        define(nterm("number"), repeat_at_least(1, nterm("digit"))),
        define(nterm("character"), repeat(term_range(b'a', b'z'))),
        define(
            nterm("string"),
            concat([term("\""), repeat(nterm("character")), term("\"")]),
        ),
        define(nterm("boolean"), alter([term("true"), term("false")])),
        define(nterm("null"), term("null")),
        define(
            nterm("array"),
            concat([
                term("["),
                nterm("json"),
                repeat(concat([term(","), nterm("json")])),
                term("]"),
            ]),
        ),
        define(
            nterm("member"),
            concat([nterm("string"), term(":"), nterm("json")]),
        ),
        define(
            nterm("object"),
            concat([
                term("{"),
                nterm("member"),
                repeat(concat([term(","), nterm("member")])),
                term("}"),
            ]),
        ),
        define(
            nterm("json"),
            alter([
                nterm("array"),
                nterm("boolean"),
                nterm("null"),
                nterm("number"),
                nterm("object"),
                nterm("string"),
            ]),
        ),
    ]))
    .unwrap()
}

#[test_case(br#"{"a":1}"#; "flat object")]
#[test_case(b"[1,true]"; "mixed array")]
#[test_case(br#""true""#; "keyword in a string position")]
#[test_case(b"[[12],null]"; "nested arrays")]
#[test_case(br#"{"k":{"v":false},"w":[0]}"#; "nested objects")]
fn documents_parse_and_reproduce_their_input(input: &[u8]) {
    let grammar = json();
    let lexer = Lexer::new(&grammar, LexerConfig::advanced().handle_duplicates()).unwrap();
    let tokens = lexer.run(input).unwrap();
    let parser = SrParser::new(&grammar, SrConfig::new().lookahead());
    let tree = parser.run(b"json", &tokens, &mut NoDiagnostics).unwrap();
    assert_eq!(tree.text(), input.to_vec());
}

/// The keyword `true` reduces to a boolean in value position but to
/// string characters between quotes.
#[test]
fn keywords_resolve_by_context() {
    let grammar = json();
    let lexer = Lexer::new(&grammar, LexerConfig::advanced().handle_duplicates()).unwrap();
    let parser = SrParser::new(&grammar, SrConfig::new().lookahead());

    let tokens = lexer.run(b"[true]").unwrap();
    let tree = parser.run(b"json", &tokens, &mut NoDiagnostics).unwrap();
    assert_eq!(
        sketch(&tree),
        r#"json(array("[", json(boolean("true")), "]"))"#
    );

    let tokens = lexer.run(br#""true""#).unwrap();
    let tree = parser.run(b"json", &tokens, &mut NoDiagnostics).unwrap();
    assert_eq!(
        sketch(&tree),
        r#"json(string("\"", character("true"), "\""))"#
    );
}

#[test]
fn object_trees_nest_members() {
    let grammar = json();
    let lexer = Lexer::new(&grammar, LexerConfig::advanced().handle_duplicates()).unwrap();
    let parser = SrParser::new(&grammar, SrConfig::new().lookahead());

    let tokens = lexer.run(br#"{"a":1}"#).unwrap();
    let tree = parser.run(b"json", &tokens, &mut NoDiagnostics).unwrap();
    let string_a = r#"string("\"", character("a"), "\"")"#;
    let expected = format!(
        r#"json(object("{{", member({string_a}, ":", json(number(digit("1")))), "}}"))"#
    );
    assert_eq!(sketch(&tree), expected);
}
