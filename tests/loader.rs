mod common;

use std::time::Duration;

use common::{Route, TestWorkspace, closed_port_url, serve};
use opsboard::{
    error::LoadError,
    source::{Base, Loader, Source},
};

const PROJECTS: &str = "\
عنوان,Applicant,,Date
پروژه A,Design Office - X,note,2024/01/12
پروژه B,متقاضی تجهیزات
";

fn loader() -> Loader {
    Loader::new(Duration::from_secs(5)).expect("loader")
}

fn remote(base: &str, location: &str) -> Source {
    let base = Base::parse(base).expect("base url");
    Source::resolve(location, Some(&base)).expect("resolve")
}

#[test]
fn loads_utf8_csv_over_http() {
    let base = serve(vec![Route::ok("/data/projects_curr.csv", PROJECTS)]);
    let dataset = loader()
        .load(&remote(&base, "data/projects_curr.csv"))
        .expect("load over http");

    assert_eq!(
        dataset.header().names(),
        ["عنوان", "Applicant", "Column 3", "Date"]
    );
    assert_eq!(dataset.row_count(), 2);
    let second = &dataset.records()[1];
    assert_eq!(second.get("عنوان"), Some("پروژه B"));
    assert_eq!(second.get("Applicant"), Some("متقاضی تجهیزات"));
    assert_eq!(second.get("Date"), Some(""));
}

#[test]
fn non_success_status_is_a_fetch_error() {
    let base = serve(Vec::new());
    let err = loader()
        .load(&remote(&base, "data/x.csv"))
        .expect_err("404 must fail");
    assert!(err.is_fetch());
    assert!(err.to_string().contains("404"), "unexpected message: {err}");
}

#[test]
fn empty_body_is_rejected() {
    let base = serve(vec![Route::ok("/empty.csv", " \r\n")]);
    let err = loader()
        .load(&remote(&base, "empty.csv"))
        .expect_err("empty body must fail");
    assert!(matches!(err, LoadError::EmptyBody { .. }));
}

#[test]
fn refused_connection_is_a_fetch_error() {
    let err = loader()
        .load(&remote(&closed_port_url(), "data/x.csv"))
        .expect_err("nothing is listening");
    assert!(matches!(err, LoadError::Fetch { .. }));
}

#[test]
fn invalid_utf8_body_is_a_decode_error() {
    let base = serve(vec![Route {
        path: "/latin.csv",
        status: "200 OK",
        body: vec![b'c', b'a', b'f', 0xE9, b'\n'],
    }]);
    let err = loader()
        .load(&remote(&base, "latin.csv"))
        .expect_err("not utf-8");
    assert!(matches!(err, LoadError::Decode { .. }));
    assert!(err.is_fetch());
}

#[test]
fn unterminated_quote_is_a_parse_error() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("broken.csv", "a,b\n\"open,1\n");
    let err = loader()
        .load(&Source::Path(path))
        .expect_err("open quote must fail");
    assert!(matches!(err, LoadError::Parse { .. }));
    assert!(!err.is_fetch());
    assert!(err.to_string().contains("line 2"), "unexpected message: {err}");
}

#[test]
fn unterminated_quote_over_http_is_a_parse_error() {
    let base = serve(vec![Route::ok("/broken.csv", "a,b\n1,2\n\"tail,3\n")]);
    let err = loader()
        .load(&remote(&base, "broken.csv"))
        .expect_err("open quote must fail");
    assert!(matches!(err, LoadError::Parse { .. }));
}

#[test]
fn stray_quote_inside_a_field_is_kept_literally() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("stray.csv", "a,b\nx\"y,1\n");
    let dataset = loader().load(&Source::Path(path)).expect("stray quote loads");
    assert_eq!(dataset.records()[0].get("a"), Some("x\"y"));
}

#[test]
fn local_files_resolve_against_base_directory() {
    let workspace = TestWorkspace::new();
    workspace.write("data/service_equipments.csv", "Name,Serial\nPump,\n");
    let base = Base::parse(workspace.path().to_str().expect("utf-8 path")).expect("base dir");
    let source = Source::resolve("data/service_equipments.csv", Some(&base)).expect("resolve");
    let dataset = loader().load(&source).expect("load file");
    assert_eq!(dataset.records()[0].get("Serial"), Some(""));
}
