// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hcagent_core::{ArgMap, Command, CommandKind, FakeClock};
use tempfile::tempdir;

fn new_manager() -> (JobManager<FakeClock>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let store = JobStore::new(dir.path()).unwrap();
    (JobManager::new(store, FakeClock::new()), dir)
}

fn install_cmd() -> Command {
    Command::new(CommandKind::InstallModule, ArgMap::new())
}

#[test]
fn enqueue_then_get_round_trips() {
    let (mgr, _dir) = new_manager();
    let id = mgr.enqueue(install_cmd(), vec![]).unwrap();
    let view = mgr.get(id).unwrap();
    assert_eq!(view.job.id, id);
    assert_eq!(view.job.status, JobStatus::Queued);
    assert_eq!(view.events.len(), 1);
}

#[test]
fn get_missing_job_is_not_found() {
    let (mgr, _dir) = new_manager();
    let err = mgr.get(JobId::new()).unwrap_err();
    assert!(matches!(err, ManagerError::NotFound(_)));
}

#[test]
fn enqueue_rejects_missing_dependency() {
    let (mgr, _dir) = new_manager();
    let missing = JobId::new();
    let err = mgr.enqueue(install_cmd(), vec![missing]).unwrap_err();
    assert!(matches!(err, EnqueueError::Graph(GraphError::DependencyNotFound(_))));
}

#[test]
fn list_all_orders_newest_first() {
    let (mgr, _dir) = new_manager();
    let first = mgr.enqueue(install_cmd(), vec![]).unwrap();
    let second = mgr.enqueue(install_cmd(), vec![]).unwrap();
    let views = mgr.list_all().unwrap();
    let ids: Vec<JobId> = views.iter().map(|v| v.job.id).collect();
    assert!(ids.iter().position(|x| *x == second).unwrap() <= ids.iter().position(|x| *x == first).unwrap());
}

#[test]
fn list_all_topo_sorted_respects_dependency_order() {
    let (mgr, _dir) = new_manager();
    let a = mgr.enqueue(install_cmd(), vec![]).unwrap();
    let b = mgr.enqueue(install_cmd(), vec![a]).unwrap();
    let views = mgr.list_all_topo_sorted().unwrap();
    let pos_a = views.iter().position(|v| v.job.id == a).unwrap();
    let pos_b = views.iter().position(|v| v.job.id == b).unwrap();
    assert!(pos_a < pos_b);
}

#[test]
fn get_queued_excludes_non_queued_jobs() {
    let (mgr, _dir) = new_manager();
    let queued = mgr.enqueue(install_cmd(), vec![]).unwrap();
    let will_run = mgr.enqueue(install_cmd(), vec![]).unwrap();
    mgr.update_status(will_run, JobStatus::Running, Some(1), None, None, None).unwrap();

    let jobs = mgr.get_queued().unwrap();
    let ids: Vec<JobId> = jobs.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![queued]);
}

#[test]
fn get_pending_returns_only_pending_jobs() {
    let (mgr, _dir) = new_manager();
    let id = mgr.enqueue(install_cmd(), vec![]).unwrap();
    mgr.update_status(id, JobStatus::Running, Some(1), None, None, None).unwrap();
    mgr.update_status(id, JobStatus::Pending, None, None, None, None).unwrap();

    let jobs = mgr.get_pending().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, id);
}

#[test]
fn cancel_queued_job_succeeds() {
    let (mgr, _dir) = new_manager();
    let id = mgr.enqueue(install_cmd(), vec![]).unwrap();
    mgr.cancel(id).unwrap();
    let view = mgr.get(id).unwrap();
    assert_eq!(view.job.status, JobStatus::Cancelled);
}

#[test]
fn cancel_running_job_is_rejected() {
    let (mgr, _dir) = new_manager();
    let id = mgr.enqueue(install_cmd(), vec![]).unwrap();
    mgr.update_status(id, JobStatus::Running, Some(1), None, None, None).unwrap();
    let err = mgr.cancel(id).unwrap_err();
    assert!(matches!(err, ManagerError::NotQueued(_, JobStatus::Running)));
}

#[test]
fn cancelling_a_job_cascades_to_queued_dependents() {
    let (mgr, _dir) = new_manager();
    let a = mgr.enqueue(install_cmd(), vec![]).unwrap();
    let b = mgr.enqueue(install_cmd(), vec![a]).unwrap();
    let c = mgr.enqueue(install_cmd(), vec![b]).unwrap();

    mgr.cancel(a).unwrap();

    assert_eq!(mgr.get(a).unwrap().job.status, JobStatus::Cancelled);
    assert_eq!(mgr.get(b).unwrap().job.status, JobStatus::Cancelled);
    assert_eq!(mgr.get(c).unwrap().job.status, JobStatus::Cancelled);
}

#[test]
fn cascade_message_at_each_level_names_its_own_direct_dependency() {
    let (mgr, _dir) = new_manager();
    let a = mgr.enqueue(install_cmd(), vec![]).unwrap();
    let b = mgr.enqueue(install_cmd(), vec![a]).unwrap();
    let c = mgr.enqueue(install_cmd(), vec![b]).unwrap();

    mgr.update_status(a, JobStatus::Running, Some(1), None, None, None).unwrap();
    mgr.update_status(a, JobStatus::Failed, None, Some(2), None, Some("git clone failed".into())).unwrap();

    let b_error = mgr.get(b).unwrap().job.error.unwrap();
    assert!(b_error.contains(&a.to_string()), "B's message should name A: {b_error}");
    assert!(b_error.contains("git clone failed"));

    let c_error = mgr.get(c).unwrap().job.error.unwrap();
    assert!(c_error.contains(&b.to_string()), "C's message should name its direct dependency B: {c_error}");
    assert!(!c_error.starts_with(&format!("cancelled: dependency '{a}'")), "C must not attribute directly to the root cause A");
}

#[test]
fn failing_a_running_job_cascades_cancel_to_dependents_only() {
    let (mgr, _dir) = new_manager();
    let a = mgr.enqueue(install_cmd(), vec![]).unwrap();
    let unrelated = mgr.enqueue(install_cmd(), vec![]).unwrap();
    let dependent = mgr.enqueue(install_cmd(), vec![a]).unwrap();

    mgr.update_status(a, JobStatus::Running, Some(1), None, None, None).unwrap();
    mgr.update_status(a, JobStatus::Failed, None, Some(2), None, Some("boom".into())).unwrap();

    assert_eq!(mgr.get(dependent).unwrap().job.status, JobStatus::Cancelled);
    assert_eq!(mgr.get(unrelated).unwrap().job.status, JobStatus::Queued);
}

#[test]
fn cascade_does_not_touch_dependents_already_running() {
    let (mgr, _dir) = new_manager();
    let a = mgr.enqueue(install_cmd(), vec![]).unwrap();
    let dependent = mgr.enqueue(install_cmd(), vec![a]).unwrap();
    mgr.update_status(dependent, JobStatus::Running, Some(1), None, None, None).unwrap();

    mgr.update_status(a, JobStatus::Running, Some(1), None, None, None).unwrap();
    mgr.update_status(a, JobStatus::Failed, None, Some(2), None, Some("boom".into())).unwrap();

    assert_eq!(mgr.get(dependent).unwrap().job.status, JobStatus::Running);
}

#[test]
fn update_status_rejects_invalid_transition() {
    let (mgr, _dir) = new_manager();
    let id = mgr.enqueue(install_cmd(), vec![]).unwrap();
    let err = mgr.update_status(id, JobStatus::Completed, None, None, None, None).unwrap_err();
    assert!(matches!(err, ManagerError::InvalidTransition(_, JobStatus::Queued, JobStatus::Completed)));
}

#[test]
fn delete_forbidden_while_running() {
    let (mgr, _dir) = new_manager();
    let id = mgr.enqueue(install_cmd(), vec![]).unwrap();
    mgr.update_status(id, JobStatus::Running, Some(1), None, None, None).unwrap();
    let err = mgr.delete(id).unwrap_err();
    assert!(matches!(err, ManagerError::RunningCannotBeDeleted(_)));
}

#[test]
fn delete_succeeds_for_terminal_job() {
    let (mgr, _dir) = new_manager();
    let id = mgr.enqueue(install_cmd(), vec![]).unwrap();
    mgr.cancel(id).unwrap();
    mgr.delete(id).unwrap();
    assert!(matches!(mgr.get(id).unwrap_err(), ManagerError::NotFound(_)));
}

#[test]
fn delete_where_skips_running_jobs() {
    let (mgr, _dir) = new_manager();
    let done = mgr.enqueue(install_cmd(), vec![]).unwrap();
    mgr.cancel(done).unwrap();
    let running = mgr.enqueue(install_cmd(), vec![]).unwrap();
    mgr.update_status(running, JobStatus::Running, Some(1), None, None, None).unwrap();

    let deleted = mgr.delete_where(|_| true).unwrap();
    assert_eq!(deleted, 1);
    assert!(mgr.get(running).is_ok());
}

#[test]
fn list_by_tag_finds_jobs_sharing_a_bundle_tag() {
    let (mgr, _dir) = new_manager();
    let mut args = ArgMap::new();
    args.insert("tags", serde_json::json!(["bdl-xyz"]));
    let tagged = Command::new(CommandKind::BundleInstall, args);
    let id = mgr.enqueue(tagged, vec![]).unwrap();
    let other = mgr.enqueue(install_cmd(), vec![]).unwrap();

    let matches = mgr.list_by_tag("bdl-xyz").unwrap();
    let ids: Vec<JobId> = matches.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![id]);
    assert!(!ids.contains(&other));
}

#[test]
fn update_metadata_merges_without_clobbering_other_keys() {
    let (mgr, _dir) = new_manager();
    let id = mgr.enqueue(install_cmd(), vec![]).unwrap();

    let mut first = Metadata::new();
    first.insert("a".to_string(), serde_json::json!(1));
    mgr.update_metadata(id, first).unwrap();

    let mut second = Metadata::new();
    second.insert("b".to_string(), serde_json::json!(2));
    mgr.update_metadata(id, second).unwrap();

    let view = mgr.get(id).unwrap();
    assert_eq!(view.job.metadata.get("a"), Some(&serde_json::json!(1)));
    assert_eq!(view.job.metadata.get("b"), Some(&serde_json::json!(2)));
}

#[test]
fn append_event_adds_to_the_log() {
    let (mgr, _dir) = new_manager();
    let id = mgr.enqueue(install_cmd(), vec![]).unwrap();
    mgr.append_event(id, hcagent_core::Event::progress(1500, "halfway")).unwrap();
    let view = mgr.get(id).unwrap();
    assert_eq!(view.events.len(), 2);
    assert_eq!(view.events[1].message, "halfway");
}
