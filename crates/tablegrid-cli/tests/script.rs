//! Script sessions and the `tgrid` binary

use std::io::Write;
use std::process::Command;

use pretty_assertions::assert_eq;
use tablegrid::prelude::*;
use tablegrid_cli::{demo, Session};

fn run(session: &mut Session, script: &str) -> String {
    let mut out = Vec::new();
    session.run(script, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn session() -> Session {
    Session::new(CellModel::new(GridOptions::with_size(20, 10)))
}

#[test]
fn merge_lookup_and_bounds() {
    let mut session = session();
    let output = run(
        &mut session,
        "# comment\n\
         set C3 Hello\n\
         merge C3:D5\n\
         get D4\n\
         bounds C3:D5\n\
         at 250 70\n",
    );

    assert_eq!(
        output,
        "merged C3:D5\n\
         C3 = \"Hello\" [base] merged C3:D5\n\
         C3:D5: left=240 top=60 width=240 height=90\n\
         C3 = \"Hello\" [base] merged C3:D5\n"
    );
}

#[test]
fn conflicting_merge_is_reported() {
    let mut session = session();
    let output = run(&mut session, "merge B2:D4\nmerge C3:E6\nmerge B2:D4\n");
    assert_eq!(
        output,
        "merged B2:D4\nconflict: C3:E6 overlaps a merged region\nmerged B2:D4\n"
    );
}

#[test]
fn structural_edits_and_visibility() {
    let mut session = session();
    run(
        &mut session,
        "set A6 moved\n\
         insert-rows 3 2\n\
         delete-columns 8 2\n\
         resize-rows 10 0-1\n\
         hide-rows 4 10-11\n\
         hide-columns 0\n",
    );

    let model = session.model();
    assert_eq!(model.row_count(), 22);
    assert_eq!(model.column_count(), 8);
    assert_eq!(
        model.get_cell(7, 0).unwrap().value,
        CellValue::string("moved")
    );
    assert_eq!(model.row_size(1), 10.0);
    assert!(model.is_row_hidden(11));
    assert!(model.is_column_hidden(0));

    let output = run(&mut session, "show-all\nsize\n");
    assert_eq!(output, "22 rows x 8 columns, 960 x 620 px, 0 merged\n");
}

#[test]
fn rect_lists_each_cell_once() {
    let mut session = session();
    let output = run(&mut session, "merge B2:C3\nrect 100 20 200 30\n");
    // Columns 0..=2, rows 0..=1; B2:C3 is reached through B2 and C2
    assert_eq!(output, "merged B2:C3\n5 cells: A1 B1 C1 A2 B2:C3\n");
}

#[test]
fn view_draws_viewport() {
    let mut session = session();
    let output = run(&mut session, "set A1 x\nmerge A1:B1\nview 0 0 240 30\n");
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[2].starts_with("     1 |x"));
    assert!(lines[2].contains("|<"));
}

#[test]
fn failing_line_is_named() {
    let mut session = session();
    let mut out = Vec::new();
    let err = session
        .run("size\nfrobnicate 1\n", &mut out)
        .unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("line 2"), "{}", message);
    assert!(message.contains("unknown command 'frobnicate'"), "{}", message);

    let err = session.run("set K1 out\n", &mut out).unwrap_err();
    assert!(format!("{:#}", err).contains("out of bounds"));
}

#[test]
fn grid_command_replaces_the_model() {
    let mut session = session();
    let output = run(&mut session, "merge A1:B2\ngrid 3 4\nsize\n");
    assert_eq!(
        output,
        "merged A1:B2\ngrid 3 x 4\n3 rows x 4 columns, 480 x 90 px, 0 merged\n"
    );
}

#[test]
fn demo_walkthrough() {
    let mut out = Vec::new();
    demo::run(&mut out).unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(output.starts_with("1001 rows x 1001 columns"));
    assert!(output.contains("C3:D5: left=170 top=60 width=240 height=90"));
    assert!(output.contains("C3 = \"4\" [base] merged C3:D5"));
    assert!(output.contains("4 cells: B2 C2 B3 C3:D5"));
    assert!(output.ends_with("split\nD4 = \"9\" [base]\n"));
}

#[test]
fn binary_runs_script_file() {
    let mut script = tempfile::NamedTempFile::new().unwrap();
    writeln!(script, "merge A1:C1").unwrap();
    writeln!(script, "get B1").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_tgrid"))
        .arg("run")
        .arg(script.path())
        .args(["--rows", "5", "--columns", "5"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "merged A1:C1\nA1 = \"\" [base] merged A1:C1\n"
    );
}

#[test]
fn binary_reports_missing_script() {
    let output = Command::new(env!("CARGO_BIN_EXE_tgrid"))
        .args(["run", "/nonexistent/grid.script"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}
