// End-to-end dispatch behaviour against a scripted transport.
mod support;

use letscrate::catalog::LIST_FILES_PATH;
use letscrate::model::ResourceKind;
use letscrate::ui::Recorder;
use letscrate::{Error, Summary};
use serde_json::json;
use support::{run_cli, sample_catalog, StubTransport};

const LOGIN: [&str; 2] = ["-l", "freddy:secret"];

fn with_login<'a>(words: &[&'a str]) -> Vec<&'a str> {
    let mut all: Vec<&'a str> = LOGIN.to_vec();
    all.extend_from_slice(words);
    all
}

#[test]
fn two_actions_fail_before_any_network_call() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    let err = run_cli(&with_login(&["-a", "-d", "beach"]), &transport, &mut rec).unwrap_err();

    assert!(matches!(err, Error::TooManyActionsSelected(2)));
    assert_eq!(transport.total(), 0);
    assert!(rec.lines.is_empty());
}

#[test]
fn no_action_does_nothing() {
    let transport = StubTransport::new();
    let mut rec = Recorder::new();
    assert_eq!(run_cli(&with_login(&[]), &transport, &mut rec).unwrap(), None);
    assert_eq!(transport.total(), 0);
}

#[test]
fn delete_crate_by_name_shows_captured_name() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-D", "archive"]), &transport, &mut rec).unwrap();

    assert_eq!(
        transport.paths(),
        vec![LIST_FILES_PATH, "crates/destroy/00042.json"]
    );
    // The stub answers the destroy call with an empty body.
    assert_eq!(rec.out(), vec!["Archive2021 deleted"]);
}

#[test]
fn delete_crate_by_id_still_shows_name() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-D", "00042"]), &transport, &mut rec).unwrap();

    assert_eq!(transport.count("crates/destroy/00042.json"), 1);
    assert_eq!(rec.out(), vec!["Archive2021 deleted"]);
}

#[test]
fn delete_by_unknown_id_falls_back_to_typed_argument() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-d", "00999"]), &transport, &mut rec).unwrap();

    assert_eq!(rec.out(), vec!["00999 deleted"]);
}

#[test]
fn arguments_are_processed_in_input_order() {
    let transport = StubTransport::new()
        .respond("files/show/00003.json", json!({"item": {"id": "00003", "name": "c", "short_code": "s3"}}))
        .respond("files/show/00001.json", json!({"item": {"id": "00001", "name": "a", "short_code": "s1"}}))
        .respond("files/show/00002.json", json!({"item": {"id": "00002", "name": "b", "short_code": "s2"}}));
    let mut rec = Recorder::new();

    let summary = run_cli(&with_login(&["-i", "00001", "00002", "00003"]), &transport, &mut rec)
        .unwrap()
        .unwrap();

    assert_eq!(
        transport.paths(),
        vec![
            "files/show/00001.json",
            "files/show/00002.json",
            "files/show/00003.json"
        ]
    );
    let names: Vec<&str> = rec
        .out()
        .into_iter()
        .map(|l| l.split('\t').next().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(
        summary,
        Summary {
            processed: 3,
            failed: 0
        }
    );
}

#[test]
fn one_failure_does_not_stop_the_batch() {
    let transport = StubTransport::new()
        .with_catalog(sample_catalog())
        .respond(
            "files/destroy/00102.json",
            json!({"status": "failure", "message": "File is locked"}),
        )
        .fail("files/destroy/00201.json", 503);
    let mut rec = Recorder::new();

    let summary = run_cli(
        &with_login(&["-d", "beach", "sunset", "notes"]),
        &transport,
        &mut rec,
    )
    .unwrap()
    .unwrap();

    assert_eq!(transport.count("files/destroy/00101.json"), 1);
    assert_eq!(transport.count("files/destroy/00102.json"), 1);
    assert_eq!(transport.count("files/destroy/00201.json"), 1);
    assert_eq!(rec.out(), vec!["beach.jpg deleted"]);
    assert_eq!(
        rec.errors(),
        vec![
            "Error: File is locked\t<sunset>",
            "Error: Server answered 503: upstream unavailable\t<notes>",
        ]
    );
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.failed, 2);
}

#[test]
fn bad_identifier_is_reported_per_item_without_a_call() {
    let transport = StubTransport::new()
        .respond("files/show/00101.json", json!({"item": {"id": "00101", "name": "beach.jpg", "short_code": "bj01"}}));
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-i", "beach", "00101"]), &transport, &mut rec).unwrap();

    assert_eq!(transport.paths(), vec!["files/show/00101.json"]);
    assert_eq!(
        rec.errors(),
        vec!["Error: A file ID is a 5 digit number. Use -a to list your files's IDs.\t<beach>"]
    );
    assert_eq!(rec.out().len(), 1);
}

#[test]
fn unresolvable_name_aborts_the_whole_batch() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    let err = run_cli(&with_login(&["-d", "beach", "mountain"]), &transport, &mut rec).unwrap_err();

    // beach matched, mountain did not: one id for two names.
    assert!(matches!(err, Error::CountMismatch { .. }));
    assert_eq!(transport.paths(), vec![LIST_FILES_PATH]);

    let err = run_cli(&with_login(&["-d", "mountain"]), &transport, &mut rec).unwrap_err();
    match err {
        Error::NotFound { kind, query } => {
            assert_eq!(kind, ResourceKind::File);
            assert_eq!(query, "mountain");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(rec.lines.is_empty());
}

#[test]
fn ambiguous_name_is_fatal() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    let err = run_cli(&with_login(&["-D", "photos"]), &transport, &mut rec).unwrap_err();

    assert!(matches!(err, Error::Ambiguous { kind: ResourceKind::Crate, .. }));
    assert_eq!(transport.count("crates/destroy/00010.json"), 0);
    assert_eq!(transport.count("crates/destroy/00020.json"), 0);
}

#[test]
fn regexp_deletes_every_match() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-r", "-d", r"\.jpg$"]), &transport, &mut rec).unwrap();

    assert_eq!(
        transport.paths(),
        vec![
            LIST_FILES_PATH,
            "files/destroy/00101.json",
            "files/destroy/00102.json"
        ]
    );
    assert_eq!(rec.out(), vec!["beach.jpg deleted", "sunset.jpg deleted"]);
}

#[test]
fn regexp_without_matches_reports_once() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    let summary = run_cli(&with_login(&["-r", "-D", "^video"]), &transport, &mut rec)
        .unwrap()
        .unwrap();

    assert_eq!(transport.paths(), vec![LIST_FILES_PATH]);
    assert_eq!(
        rec.errors(),
        vec!["Error: No crates were found that match that name.\t<^video>"]
    );
    assert_eq!(summary.failed, 1);
}

#[test]
fn mixed_ids_and_names_are_not_silently_fixed() {
    // An id next to a name is dropped by the lookup, so the counts disagree
    // and nothing is deleted.
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    let err = run_cli(&with_login(&["-d", "00201", "beach"]), &transport, &mut rec).unwrap_err();

    assert!(matches!(
        err,
        Error::CountMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));
    assert_eq!(transport.paths(), vec![LIST_FILES_PATH]);
}

#[test]
fn upload_resolves_crate_once_and_sends_every_file() {
    let transport = StubTransport::new()
        .with_catalog(sample_catalog())
        .respond(
            "files/upload.json",
            json!({"status": "success", "file": {"id": "00301", "name": "x", "short_code": "up01"}}),
        );
    let mut rec = Recorder::new();

    run_cli(
        &with_login(&["-u", "backup", "/tmp/a.txt", "docs/b.txt"]),
        &transport,
        &mut rec,
    )
    .unwrap();

    assert_eq!(
        transport.paths(),
        vec![LIST_FILES_PATH, "files/upload.json", "files/upload.json"]
    );
    let first = transport.params(1);
    assert_eq!(first.get("crate_id"), Some("00020"));
    assert_eq!(first.file.as_deref(), Some(std::path::Path::new("/tmp/a.txt")));
    assert_eq!(
        rec.out(),
        vec![
            "a.txt\t\tURL: http://lts.cr/up01\tID: 00301",
            "b.txt\t\tURL: http://lts.cr/up01\tID: 00301"
        ]
    );
}

#[test]
fn upload_to_crate_id_skips_the_catalog() {
    let transport = StubTransport::new().respond(
        "files/upload.json",
        json!({"status": "success", "file": {"id": "00301", "name": "x", "short_code": "up01"}}),
    );
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-u", "00010", "a.txt"]), &transport, &mut rec).unwrap();

    assert_eq!(transport.paths(), vec!["files/upload.json"]);
    assert_eq!(transport.params(0).get("crate_id"), Some("00010"));
}

#[test]
fn upload_to_unknown_crate_is_fatal() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    let err = run_cli(&with_login(&["-u", "videos", "a.txt"]), &transport, &mut rec).unwrap_err();

    assert!(matches!(err, Error::NotFound { kind: ResourceKind::Crate, .. }));
    assert_eq!(transport.count("files/upload.json"), 0);
}

#[test]
fn rename_reports_old_name() {
    let transport = StubTransport::new()
        .with_catalog(sample_catalog())
        .respond(
            "crates/rename/00042.json",
            json!({"status": "success", "crate": {"id": "00042", "name": "Old Stuff", "short_code": "ar42"}}),
        );
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-R", "archive", "Old Stuff"]), &transport, &mut rec).unwrap();

    assert_eq!(transport.params(1).get("name"), Some("Old Stuff"));
    assert_eq!(rec.out(), vec!["renamed Archive2021 to Old Stuff"]);
}

#[test]
fn search_fetches_catalog_once_for_many_queries() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-s", "BEACH", "mountain", "t"]), &transport, &mut rec).unwrap();

    assert_eq!(transport.paths(), vec![LIST_FILES_PATH]);
    assert_eq!(
        rec.lines,
        vec![
            out("BEACH:"),
            out("beach.jpg\t\tURL: http://lts.cr/bj01\tID: 00101"),
            out(""),
            err("Error: No files were found that match that name.\t<mountain>"),
            out("t:"),
            out("sunset.jpg\t\tURL: http://lts.cr/sj02\tID: 00102"),
            out("notes.txt\t\tURL: http://lts.cr/nt01\tID: 00201"),
            out(""),
        ]
    );
}

#[test]
fn search_terms_are_patterns_without_regexp_flag() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-s", r"\.jpg$"]), &transport, &mut rec).unwrap();

    assert!(rec.errors().is_empty());
    assert_eq!(
        rec.out(),
        vec![
            r"\.jpg$:",
            "beach.jpg\t\tURL: http://lts.cr/bj01\tID: 00101",
            "sunset.jpg\t\tURL: http://lts.cr/sj02\tID: 00102",
            "",
        ]
    );
}

#[test]
fn crate_search_uses_patterns_too() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-S", "^photos$"]), &transport, &mut rec).unwrap();

    assert_eq!(
        rec.out(),
        vec!["^photos$:", "Photos\t\tURL: http://lts.cr/ph10\tID: 00010", ""]
    );
}

#[test]
fn failure_names_the_pattern_that_found_the_item() {
    // Two arguments and two matches, but both matches come from "jpg".
    let transport = StubTransport::new().with_catalog(sample_catalog()).respond(
        "files/destroy/00102.json",
        json!({"status": "failure", "message": "File is locked"}),
    );
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-r", "-d", "jpg", "zzz"]), &transport, &mut rec).unwrap();

    assert_eq!(rec.out(), vec!["beach.jpg deleted"]);
    assert_eq!(rec.errors(), vec!["Error: File is locked\t<jpg>"]);
}

#[test]
fn list_crates_with_names_behaves_like_search() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-A", "backup"]), &transport, &mut rec).unwrap();

    assert_eq!(transport.paths(), vec![LIST_FILES_PATH]);
    assert_eq!(
        rec.out(),
        vec!["backup:", "Photos Backup\t\tURL: http://lts.cr/pb20\tID: 00020", ""]
    );
}

#[test]
fn list_crates_without_names_calls_the_service() {
    let transport = StubTransport::new().respond(
        "crates/list.json",
        json!({"status": "success", "crates": [{"id": "00010", "name": "Photos", "short_code": "ph10"}]}),
    );
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-A"]), &transport, &mut rec).unwrap();

    assert_eq!(transport.paths(), vec!["crates/list.json"]);
    assert_eq!(rec.out(), vec!["Photos\t\tURL: http://lts.cr/ph10\tID: 00010"]);
}

#[test]
fn list_files_ignores_positional_arguments() {
    let transport = StubTransport::new().with_catalog(sample_catalog());
    let mut rec = Recorder::new();

    let summary = run_cli(&with_login(&["-a", "stray"]), &transport, &mut rec)
        .unwrap()
        .unwrap();

    assert_eq!(transport.paths(), vec![LIST_FILES_PATH]);
    assert_eq!(summary.processed, 1);
    assert!(rec.out().contains(&"* Crate is empty."));
}

#[test]
fn actions_needing_arguments_fail_without_them() {
    let transport = StubTransport::new();
    let mut rec = Recorder::new();

    let err = run_cli(&with_login(&["-d"]), &transport, &mut rec).unwrap_err();

    assert!(matches!(err, Error::MissingArguments("delete")));
    assert_eq!(transport.total(), 0);
}

#[test]
fn credential_check() {
    let ok = StubTransport::new().respond("users/authenticate.json", json!({"status": "success"}));
    let mut rec = Recorder::new();
    run_cli(&with_login(&["-t"]), &ok, &mut rec).unwrap();
    assert_eq!(rec.out(), vec!["The credentials are valid"]);

    let bad = StubTransport::new().respond(
        "users/authenticate.json",
        json!({"status": "failure", "message": "Unauthorized"}),
    );
    let mut rec = Recorder::new();
    run_cli(&with_login(&["-t"]), &bad, &mut rec).unwrap();
    assert_eq!(
        rec.errors(),
        vec!["Error: The credentials are invalid\t<User:freddy>"]
    );
}

#[test]
fn create_crates_one_call_each() {
    let transport = StubTransport::new().respond(
        "crates/add.json",
        json!({"status": "success", "crate": {"id": "00050", "name": "New", "short_code": "nw50"}}),
    );
    let mut rec = Recorder::new();

    run_cli(&with_login(&["-N", "New", "Other"]), &transport, &mut rec).unwrap();

    assert_eq!(transport.count("crates/add.json"), 2);
    assert_eq!(transport.params(0).get("name"), Some("New"));
    assert_eq!(transport.params(1).get("name"), Some("Other"));
}

fn out(s: &str) -> letscrate::ui::Line {
    letscrate::ui::Line::Out(s.to_string())
}

fn err(s: &str) -> letscrate::ui::Line {
    letscrate::ui::Line::Err(s.to_string())
}
