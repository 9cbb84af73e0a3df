//! Property-based tests for the literal codec, the canonical script text and
//! the cursor algebra of the engine.

use proptest::prelude::*;
use sxd_document::Package;
use xdirect::arg::{decode, encode, escape, is_legal};
use xdirect::dom::Tree;
use xdirect::engine::{Cursor, Engine};
use xdirect::xml::XmlDocument;
use xdirect::{apply, Arg, Directive, Script};

/// Strategy for strings made only of XML-legal characters
fn legal_text() -> impl Strategy<Value = String> {
    any::<String>().prop_map(|s| s.chars().filter(|c| is_legal(*c)).collect())
}

/// Strategy for short element names
fn element_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}"
}

fn arg() -> impl Strategy<Value = Arg> {
    legal_text().prop_map(|s| Arg::new(s).unwrap())
}

/// Strategy covering every directive kind
fn directive() -> impl Strategy<Value = Directive> {
    prop_oneof![
        arg().prop_map(Directive::Add),
        arg().prop_map(Directive::AddIfAbsent),
        Just(Directive::Remove),
        arg().prop_map(Directive::SetText),
        arg().prop_map(Directive::SetComputedText),
        (arg(), arg()).prop_map(|(name, value)| Directive::SetAttr { name, value }),
        (arg(), arg()).prop_map(|(name, query)| Directive::SetComputedAttr { name, query }),
        arg().prop_map(Directive::AddComment),
        arg().prop_map(Directive::AddCData),
        (arg(), arg()).prop_map(|(target, data)| Directive::AddProcessingInstruction { target, data }),
        arg().prop_map(Directive::AddNamespace),
        Just(Directive::Up),
        arg().prop_map(Directive::NavigateTo),
        (0usize..1000).prop_map(Directive::AssertCount),
        Just(Directive::Push),
        Just(Directive::Pop),
    ]
}

/// Strategy for a two-level tree: the number of grandchildren under each child
fn shape() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..4, 1..6)
}

fn build(shape: &[usize]) -> Script {
    let mut source = String::from("ADD 'r';");
    for grandchildren in shape {
        source.push_str("ADD 'c';");
        for _ in 0..*grandchildren {
            source.push_str("ADD 'g';UP;");
        }
        source.push_str("UP;");
    }
    Script::parse(&source).unwrap()
}

fn run(shape: &[usize], tail: &str) -> bool {
    let package = Package::new();
    let mut doc = XmlDocument::new(package.as_document());
    apply(&mut doc, &build(shape)).unwrap();
    apply(&mut doc, &Script::parse(tail).unwrap()).is_ok()
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_encode_decode_identity(text in legal_text()) {
            prop_assert_eq!(decode(&encode(&text)).unwrap(), text);
        }

        #[test]
        fn test_single_quotes_decode_alike(text in legal_text()) {
            let single = format!("'{}'", escape(&text));
            prop_assert_eq!(decode(&single).unwrap(), text);
        }

        #[test]
        fn test_encoded_literal_has_no_raw_controls(text in legal_text()) {
            let encoded = encode(&text);
            prop_assert!(!encoded.chars().any(|c| (c as u32) < 0x20));
            prop_assert!(!encoded[1..encoded.len() - 1].contains('"'));
        }

        #[test]
        fn test_canonical_text_parses_back(directives in prop::collection::vec(directive(), 0..40)) {
            let script = Script::new(directives);
            let reparsed = Script::parse(&script.to_string()).unwrap();
            prop_assert_eq!(reparsed, script);
        }

        #[test]
        fn test_canonical_text_is_stable(directives in prop::collection::vec(directive(), 0..40)) {
            let text = Script::new(directives).to_string();
            let again = Script::parse(&text).unwrap().to_string();
            prop_assert_eq!(again, text);
        }

        #[test]
        fn test_add_keeps_cursor_size(shape in shape(), name in element_name()) {
            let total: usize = shape.iter().sum();
            prop_assume!(total > 0);
            let tail = format!("XPATH '/r/c/g'; ADD '{}'; STRICT '{}';", name, total);
            prop_assert!(run(&shape, &tail));
        }

        #[test]
        fn test_up_yields_distinct_parents(shape in shape()) {
            let total: usize = shape.iter().sum();
            prop_assume!(total > 0);
            let parents = shape.iter().filter(|n| **n > 0).count();
            let tail = format!("XPATH '/r/c/g'; UP; STRICT '{}'; UP; STRICT '1';", parents);
            prop_assert!(run(&shape, &tail));
        }

        #[test]
        fn test_remove_yields_distinct_parents(shape in shape()) {
            let total: usize = shape.iter().sum();
            prop_assume!(total > 0);
            let parents = shape.iter().filter(|n| **n > 0).count();
            let tail = format!("XPATH '/r/c/g'; REMOVE; STRICT '{}'; XPATH '/r/c/g'; STRICT '0';", parents);
            prop_assert!(run(&shape, &tail));
        }

        #[test]
        fn test_push_pop_restores_cursor(
            shape in shape(),
            steps in prop::collection::vec(0u8..3, 0..12),
        ) {
            let package = Package::new();
            let mut doc = XmlDocument::new(package.as_document());
            apply(&mut doc, &build(&shape)).unwrap();

            let mut engine = Engine::new(&mut doc);
            let root = engine.tree().root();
            let start = engine
                .execute(&Directive::xpath("/r/c").unwrap(), Cursor::single(root))
                .unwrap();
            let mut cursor = engine.execute(&Directive::Push, start.clone()).unwrap();
            for step in steps {
                let directive = match step {
                    0 => Directive::add("x").unwrap(),
                    1 => Directive::attr("seen", "yes").unwrap(),
                    _ => Directive::xpath("/r//*").unwrap(),
                };
                cursor = engine.execute(&directive, cursor).unwrap();
            }
            let restored = engine.execute(&Directive::Pop, cursor).unwrap();
            prop_assert_eq!(restored, start);
            prop_assert!(engine.stack().is_empty());
        }
    }
}
