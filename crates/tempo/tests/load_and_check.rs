use std::io::Write;
use std::path::Path;

use tempo::diagnostics::{diagnostics_to_json, render_diagnostic};
use tempo::{check_source, load_source, print_source, TempoError};

#[test]
fn loads_and_parses_a_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    write!(
        file,
        "func page(title string) {{\n\t<h1>\n\t\"hello \\{{title}}\"\n\t</h1>\n}}\n"
    )
    .expect("write temp file");

    let (source, diags) = load_source(file.path()).expect("load_source");
    assert!(
        diags.is_empty(),
        "unexpected diagnostics: {diags:#?}"
    );
    assert_eq!(source.funcs.len(), 1);
    assert_eq!(source.funcs[0].name.name, "page");
}

#[test]
fn missing_file_is_an_invalid_path() {
    let err = load_source(Path::new("no/such/file.tempo")).unwrap_err();
    assert!(matches!(err, TempoError::InvalidPath(_)), "got: {err}");
}

#[test]
fn check_source_reports_parse_then_analysis_diagnostics() {
    // `<div` is missing its `>` and sits in a zero-parameter function, so
    // both phases have something to say.
    let src = "func page() {\n\t<div\n}\n";
    let (_, diags) = check_source(Path::new("page.tempo"), src);
    let codes: Vec<&str> = diags.iter().map(|d| d.diagnostic.code.as_str()).collect();
    assert_eq!(codes, vec!["E1510", "E1601"]);
}

#[test]
fn diagnostics_render_with_path_and_position() {
    let src = "func page() {\n\t\"x \\{y}\"\n}\n";
    let (_, diags) = check_source(Path::new("page.tempo"), src);
    assert_eq!(diags.len(), 1);
    let rendered = render_diagnostic(&diags[0].path, &diags[0].diagnostic);
    assert!(
        rendered.starts_with("error[E1603] page.tempo:2:"),
        "got: {rendered}"
    );

    let json = diagnostics_to_json(&diags);
    assert!(json.contains("\"E1603\""), "got: {json}");
}

#[test]
fn accepted_source_survives_a_print_cycle() {
    let src = "func page(title string) {\n\t<div @class=\"box\">\n\t\"hi \\{title}\"\n\t</div>\n}\n";
    let (file, diags) = check_source(Path::new("page.tempo"), src);
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:#?}");
    let printed = print_source(&file);
    let (reparsed, diags) = check_source(Path::new("page.tempo"), &printed);
    assert!(diags.is_empty(), "printed form has diagnostics: {diags:#?}");
    assert_eq!(printed, print_source(&reparsed));
}
