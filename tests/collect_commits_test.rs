//! Integration tests for local commit collection using temporary repositories.

mod common;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use common::TestRepo;
use standup::commit::{FileStatus, group_commits};
use standup::git::{CollectOptions, collect_commits, previous_working_day};

fn options(hours: i64) -> CollectOptions {
    let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    CollectOptions {
        since,
        until: since + Duration::hours(hours),
        author_email: None,
        repository: "acme/app".to_string(),
    }
}

fn at(hour: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

#[test]
fn test_empty_window_yields_no_commits() {
    let test_repo = TestRepo::new();
    test_repo.commit_file("a.txt", "1\n", "initial", "dev@acme.io", at(9));

    let mut opts = options(24);
    opts.since = at(12);
    let commits = collect_commits(&test_repo.repo, &opts).unwrap();
    assert!(commits.is_empty());
}

#[test]
fn test_commits_across_branches_are_deduplicated() {
    let test_repo = TestRepo::new();
    let base = test_repo.commit_file("a.txt", "1\n", "initial", "dev@acme.io", at(9));

    test_repo.checkout_new_branch("feature/WEB-12-search", base);
    test_repo.commit_file("search.rs", "fn search() {}\n", "add search", "dev@acme.io", at(10));
    test_repo.commit_file(
        "search.rs",
        "fn search() {}\nfn rank() {}\n",
        "rank results",
        "dev@acme.io",
        at(11),
    );

    let commits = collect_commits(&test_repo.repo, &options(24)).unwrap();
    let subjects: Vec<&str> = commits.iter().map(|c| c.subject()).collect();
    assert_eq!(subjects, vec!["initial", "add search", "rank results"]);

    let branches: Vec<Option<&str>> = commits.iter().map(|c| c.branch.as_deref()).collect();
    assert_eq!(
        branches,
        vec![
            None,
            Some("feature/WEB-12-search"),
            Some("feature/WEB-12-search")
        ]
    );
    assert!(commits.iter().all(|c| c.repository == "acme/app"));

    let added = &commits[1].diff.as_ref().unwrap().files[0];
    assert_eq!(added.filename, "search.rs");
    assert_eq!(added.status, FileStatus::Added);
    assert_eq!(commits[1].additions, 1);

    let modified = &commits[2].diff.as_ref().unwrap().files[0];
    assert_eq!(modified.status, FileStatus::Modified);
    assert!(modified.patch.as_deref().unwrap().contains("+fn rank() {}"));
}

#[test]
fn test_collected_commits_group_by_branch_ticket() {
    let test_repo = TestRepo::new();
    let base = test_repo.commit_file(
        "deps.txt",
        "1\n",
        "chore: bump deps on main",
        "dev@acme.io",
        at(8),
    );
    test_repo.checkout_new_branch("feature/WEB-12-search", base);
    test_repo.commit_file("s.rs", "x\n", "add search", "dev@acme.io", at(9));

    let commits = collect_commits(&test_repo.repo, &options(24)).unwrap();
    let grouping = group_commits(&commits, &Default::default());

    assert_eq!(grouping.ticket_ids(), vec!["WEB-12"]);
    let members: Vec<&str> = grouping.groups[0].commits.iter().map(|c| c.subject()).collect();
    assert_eq!(members, vec!["add search"]);
    assert_eq!(grouping.orphans.len(), 1);
    assert_eq!(grouping.orphans[0].subject(), "chore: bump deps on main");
}

#[test]
fn test_author_filter() {
    let test_repo = TestRepo::new();
    test_repo.commit_file("a.txt", "1\n", "mine", "dev@acme.io", at(9));
    test_repo.commit_file("a.txt", "2\n", "someone else", "other@acme.io", at(10));

    let mut opts = options(24);
    opts.author_email = Some("DEV@acme.io".to_string());
    let commits = collect_commits(&test_repo.repo, &opts).unwrap();

    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].author.email, "dev@acme.io");
}

#[test]
fn test_previous_working_day_for_a_week() {
    let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let friday = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert_eq!(previous_working_day(monday), friday);

    for offset in 1..5u64 {
        let day = monday + chrono::Days::new(offset);
        assert_eq!(previous_working_day(day), day - chrono::Days::new(1));
    }
}
