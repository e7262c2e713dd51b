mod common;

use common::{doc, rendered};
use pbquery::tests::{household_document, person_document};
use pbquery::{
    DocumentValue, FieldDescriptor, InvalidQuery, MessageTree, Scalar, compile, query, xpath,
};
use serde_json::json;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn metadata_hash(tree: &MessageTree) -> u64 {
    let mut hasher = DefaultHasher::new();
    let descriptors: Vec<&FieldDescriptor> = tree.descriptors().collect();
    descriptors.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn person_scenario() {
    let doc = person_document();
    let root = doc.root();

    assert_eq!(rendered(&query(root, "pet[2]/name").unwrap()), vec![json!("Fido")]);
    assert_eq!(
        rendered(&query(root, "pet/name").unwrap()),
        vec![json!("Rex"), json!("Fido")]
    );
    assert_eq!(query(root, "count(pet)").unwrap(), vec![DocumentValue::owned(2)]);
    assert_eq!(
        query(root, "self::node()").unwrap(),
        vec![DocumentValue::Message(root)]
    );
    assert!(matches!(
        query(root, "following-sibling::pet"),
        Err(InvalidQuery::UnsupportedAxis(_))
    ));
}

#[test]
fn malformed_queries_fail_to_compile() {
    for text in ["pet[2", "pet[2]]", "count(pet", "pet/[1]", "'open"] {
        assert!(
            matches!(compile(text), Err(InvalidQuery::Syntax { .. })),
            "{text:?} should be a syntax error"
        );
    }
}

#[test]
fn evaluation_never_touches_metadata() {
    let doc = household_document();
    let before = metadata_hash(&doc);
    for text in [
        "self::node()",
        "..",
        "//pet[last()]/name",
        "member/pet/parent::node()",
        "descendant-or-self::*",
        "count(//*)",
    ] {
        query(doc.root(), text).unwrap();
    }
    assert_eq!(metadata_hash(&doc), before);
}

#[test]
fn self_node_law() {
    let doc = household_document();
    let root = doc.root();
    assert_eq!(
        query(root, "member/self::node()").unwrap(),
        query(root, "member").unwrap()
    );
    assert!(query(root, "self::member").unwrap().is_empty());
    assert!(query(root, "@name/self::node()").unwrap().is_empty());
    assert_eq!(query(root, "@name/self::*").unwrap(), query(root, "@name").unwrap());
}

#[test]
fn descendant_or_self_law() {
    let doc = household_document();
    let root = doc.root();
    for test in ["*", "node()", "pet", "member", "note", "missing"] {
        let combined = query(root, &format!("descendant-or-self::{test}")).unwrap();
        let mut expected = query(root, &format!("self::{test}")).unwrap();
        expected.extend(query(root, &format!("descendant::{test}")).unwrap());
        assert_eq!(combined, expected, "law fails for node test {test}");
    }
}

#[test]
fn positional_predicate_law() {
    let doc = household_document();
    let root = doc.root();
    let all = query(root, "descendant::*").unwrap();
    let n = all.len();
    for k in 0..=n + 1 {
        let selected = query(root, &format!("(descendant::*)[{k}]")).unwrap();
        if (1..=n).contains(&k) {
            assert_eq!(selected, vec![all[k - 1].clone()]);
        } else {
            assert!(selected.is_empty());
        }
    }
}

#[test]
fn count_law() {
    let doc = household_document();
    let root = doc.root();
    for text in ["missing", "member", "member/pet", "//*", "tag", "descendant::*"] {
        let m = query(root, text).unwrap().len();
        assert_eq!(
            query(root, &format!("count({text})")).unwrap(),
            vec![DocumentValue::owned(m as f64)],
            "count({text})"
        );
    }
}

#[test]
fn last_is_scoped_to_the_filtered_set() {
    let doc = household_document();
    let root = doc.root();
    // Outer set: 2 members. Inner set: Ann's 2 pets, Bob's 0.
    assert_eq!(
        rendered(&query(root, "member[last()]/name").unwrap()),
        vec![json!("Bob")]
    );
    assert_eq!(
        rendered(&query(root, "member[1]/pet[last() = 2][1]/name").unwrap()),
        vec![json!("Rex")]
    );
    assert_eq!(
        rendered(&query(root, "tag[last()]").unwrap()),
        vec![json!("quiet")]
    );
}

#[test]
fn json_documents() {
    let doc = doc(json!({
        "store": {
            "book": [
                {"title": "Dune", "price": 9.5, "tags": ["scifi", "classic"]},
                {"title": "Emma", "price": 4, "tags": ["romance"]},
                {"title": "Ulysses", "price": 12}
            ]
        }
    }));
    let root = doc.root();

    assert_eq!(
        rendered(&xpath(root, "store/book[price < 10]/title").unwrap()),
        vec![json!("Dune"), json!("Emma")]
    );
    assert_eq!(
        rendered(&xpath(root, "sum(//book/price)").unwrap()),
        vec![json!(25.5)]
    );
    assert_eq!(
        rendered(&xpath(root, "//book[tags = 'romance']/title").unwrap()),
        vec![json!("Emma")]
    );
    assert_eq!(
        rendered(&xpath(root, "//book[starts-with(title, 'U')]").unwrap()),
        vec![json!({"title": "Ulysses", "price": 12})]
    );
    assert_eq!(
        rendered(&xpath(root, "//book[not(tags)]/title | count(//tags)").unwrap()),
        vec![json!("Ulysses"), json!(3)]
    );
}

#[test]
fn scalar_results_are_owned() {
    let doc = person_document();
    let values = query(doc.root(), "concat(name, ' has ', count(pet), ' pets')").unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].as_scalar(), Some(&Scalar::from("Ann has 2 pets")));
    assert!(matches!(values[0], DocumentValue::Scalar(std::borrow::Cow::Owned(_))));
}

#[test]
fn unimplemented_functions_fail() {
    let doc = person_document();
    for name in ["local-name", "name", "substring", "normalize-space", "translate", "lang"] {
        assert_eq!(
            query(doc.root(), &format!("{name}(pet)")),
            Err(InvalidQuery::UnimplementedFunction(name.to_string()))
        );
    }
}

#[test]
fn boolean_functions_see_single_values() {
    let doc = doc(json!({
        "flag": false,
        "zero": 0,
        "items": [
            {"deleted": false, "n": 1},
            {"deleted": true, "n": 2},
            {"n": 3}
        ]
    }));
    let root = doc.root();

    assert_eq!(rendered(&query(root, "not(flag)").unwrap()), vec![json!(true)]);
    assert_eq!(rendered(&query(root, "boolean(zero)").unwrap()), vec![json!(false)]);
    assert_eq!(rendered(&query(root, "boolean(items)").unwrap()), vec![json!(true)]);
    assert_eq!(
        rendered(&query(root, "items[not(deleted)]/n").unwrap()),
        vec![json!(1), json!(3)]
    );
    assert!(matches!(
        query(person_document().root(), "not(pet[1])"),
        Err(InvalidQuery::MessageCoercion { .. })
    ));
}

#[test]
fn integer_division_and_floored_modulo() {
    let doc = person_document();
    let root = doc.root();
    assert_eq!(query(root, "@age div 4").unwrap(), vec![DocumentValue::owned(7)]);
    assert_eq!(query(root, "7 div 2").unwrap(), vec![DocumentValue::owned(3)]);
    assert_eq!(query(root, "-7 mod 3").unwrap(), vec![DocumentValue::owned(2)]);
    assert_eq!(query(root, "7 mod -3").unwrap(), vec![DocumentValue::owned(-2)]);
}

#[test]
fn two_strings_compare_lexically() {
    let doc = doc(json!({"p": [{"name": "Ann"}, {"name": "Zed"}]}));
    let root = doc.root();
    assert_eq!(rendered(&query(root, "p[name > 'M']/name").unwrap()), vec![json!("Zed")]);
    assert_eq!(rendered(&query(root, "'b' > 'a'").unwrap()), vec![json!(true)]);
    assert_eq!(rendered(&query(root, "'10' < 9").unwrap()), vec![json!(false)]);
}
