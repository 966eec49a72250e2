//! Allow-list matching vectors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]


use amqgate_core::pattern::{self, AddressRule, AllowList};

#[test]
fn allow_list_vectors() {
    for v in vector_loader::load("allow_list.json") {
        let got = pattern::is_allowed(&v.user, &v.allow, &v.proposed);
        assert_eq!(got, v.expect, "{}", v.description);
    }
}

#[test]
fn compiled_list_agrees_with_one_shot() {
    for v in vector_loader::load("allow_list.json") {
        let list = AllowList::parse(&v.allow);
        assert_eq!(list.is_allowed(&v.user, &v.proposed), v.expect, "{}", v.description);
    }
}

#[test]
fn compile_tokens() {
    let list = AllowList::parse("*,queue.*,topic");
    assert_eq!(
        list.rules(),
        &[
            AddressRule::Any,
            AddressRule::Prefix("queue.".into()),
            AddressRule::Exact("topic".into()),
        ]
    );
    assert_eq!(list.as_str(), "*,queue.*,topic");
}

#[test]
fn substitution_replaces_first_occurrence_only() {
    assert_eq!(
        pattern::substitute_user("al", "al/al").as_deref(),
        Some("${user}/al")
    );
    assert_eq!(pattern::substitute_user("zed", "al/al"), None);
    assert_eq!(pattern::substitute_user("", "al"), None);
}
