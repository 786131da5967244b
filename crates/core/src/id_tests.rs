// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

crate::define_id! {
    pub struct TestId;
}

#[test]
fn display_and_as_str_agree() {
    let id = TestId::new("web");
    assert_eq!(id.as_str(), "web");
    assert_eq!(id.to_string(), "web");
}

#[test]
fn eq_against_str() {
    let id = TestId::from("worker");
    assert_eq!(id, "worker");
    assert_eq!(id, *"worker");
}

#[test]
fn short_truncates() {
    assert_eq!("abcdef".short(3), "abc");
    assert_eq!("ab".short(3), "ab");
}

use crate::ShortId;
