//! Settings file lookup and validation.

use std::path::PathBuf;

use agentspack_core::{
    settings::{self, LOCAL_SETTINGS_FILE},
    ApplyMode, CommitAuthor, ConfigError, SyncSettings,
};
use assert_fs::prelude::*;
use predicates::prelude::predicate;

#[test]
fn full_settings_file_roundtrips() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child(LOCAL_SETTINGS_FILE);
    file.write_str(
        r#"
target_branch: trunk
apply_mode: pr
manifest: repos.txt
output_dir: out
jobs: 1
branch_prefix: bots
clone_url: "git@github.com:{owner}/{name}.git"
commit_message: "sync agents"
review_title: "Sync agents"
review_body: "Automated."
commit_author:
  name: Sync Bot
  email: bot@example.com
"#,
    )
    .expect("write");

    let s = settings::load_from(file.path()).expect("load");
    assert_eq!(s.target_branch, "trunk");
    assert_eq!(s.apply_mode, ApplyMode::ReviewRequest);
    assert_eq!(s.manifest, PathBuf::from("repos.txt"));
    assert_eq!(s.jobs, 1);
    assert_eq!(
        s.commit_author,
        Some(CommitAuthor {
            name: "Sync Bot".into(),
            email: "bot@example.com".into()
        })
    );

    let run = s.run_config();
    assert_eq!(run.target_branch, "trunk");

    let yaml = serde_yaml::to_string(&s).expect("serialize");
    let back: SyncSettings = serde_yaml::from_str(&yaml).expect("deserialize");
    assert_eq!(back, s);
}

#[test]
fn user_settings_path_is_under_home() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = settings::user_settings_path_at(home.path());
    assert!(path.ends_with(".agentspack/config.yaml"));
    home.child(".agentspack").assert(predicate::path::missing());
}

#[test]
fn clone_url_without_name_placeholder_is_rejected() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child(LOCAL_SETTINGS_FILE);
    file.write_str("clone_url: https://example.com/fixed.git\n").expect("write");

    let err = settings::load_from(file.path()).unwrap_err();
    assert!(
        matches!(err, ConfigError::Invalid { field: "clone_url", .. }),
        "got: {err}"
    );
}

#[test]
fn unknown_apply_mode_is_a_parse_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child(LOCAL_SETTINGS_FILE);
    file.write_str("apply_mode: yolo\n").expect("write");

    let err = settings::resolve_at(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}
