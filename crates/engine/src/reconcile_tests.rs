// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pmtr_core::JobDef;

fn def(name: &str, cmd: &str) -> JobDef {
    let mut d = JobDef::new(name);
    d.cmd = vec![cmd.to_string()];
    d
}

#[test]
fn unchanged_job_keeps_its_running_instance() {
    let mut previous = JobTable::new();
    let mut job = Job::new(def("web", "/bin/true"));
    job.instance.pid = 555;
    job.instance.start_ts = 100;
    previous.push(job);

    let result = rescan(previous, vec![def("web", "/bin/true")]);
    let web = result.by_name("web").unwrap();
    assert_eq!(web.instance.pid, 555, "identity preserved across an unchanged reload");
    assert_eq!(web.instance.start_ts, 100);
}

#[test]
fn changed_definition_triggers_graceful_restart() {
    let mut previous = JobTable::new();
    let mut job = Job::new(def("web", "/bin/true"));
    job.instance.pid = 555;
    previous.push(job);

    let result = rescan(previous, vec![def("web", "/bin/false")]);
    let web = result.by_name("web").unwrap();
    assert_eq!(web.instance.pid, 555, "pid carried over so the old process can still be signaled");
    assert_eq!(web.instance.terminate, 1, "must restart under new settings");
}

#[test]
fn changed_but_not_running_job_has_no_pending_terminate() {
    let previous = JobTable::from_defs(vec![def("web", "/bin/true")]);
    let result = rescan(previous, vec![def("web", "/bin/false")]);
    assert_eq!(result.by_name("web").unwrap().instance.terminate, 0);
}

#[test]
fn brand_new_job_starts_fresh() {
    let previous = JobTable::new();
    let result = rescan(previous, vec![def("web", "/bin/true")]);
    let web = result.by_name("web").unwrap();
    assert!(!web.instance.is_running());
    assert!(web.instance.respawn);
}

#[test]
fn removed_but_running_job_is_renamed_and_marked_for_deletion() {
    let mut previous = JobTable::new();
    let mut job = Job::new(def("web", "/bin/true"));
    job.instance.pid = 555;
    previous.push(job);

    let result = rescan(previous, vec![]);
    assert!(result.by_name("web").is_none());
    let renamed = result.by_name("web(deleted)").unwrap();
    assert_eq!(renamed.instance.pid, 555);
    assert_eq!(renamed.instance.terminate, 1);
    assert!(!renamed.instance.respawn);
    assert!(renamed.instance.delete_when_collected);
}

#[test]
fn removed_and_not_running_job_is_dropped() {
    let previous = JobTable::from_defs(vec![def("web", "/bin/true")]);
    let result = rescan(previous, vec![]);
    assert!(result.is_empty());
}

#[test]
fn result_is_sorted_by_order() {
    let previous = JobTable::new();
    let mut a = def("a", "/bin/true");
    a.order = 2;
    let mut b = def("b", "/bin/true");
    b.order = 1;
    let result = rescan(previous, vec![a, b]);
    let names: Vec<_> = result.iter().map(|j| j.name().to_string()).collect();
    assert_eq!(names, vec!["b", "a"]);
}
