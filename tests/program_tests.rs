// Golden-output tests: every tests/programs/<name>.dcl is run with
// <name>.in (if present) as input and must print exactly <name>.out.

use dcl::interpreter::Interpreter;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

fn program_files() -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("programs");
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .expect("tests/programs exists")
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "dcl").unwrap_or(false))
        .collect();
    files.sort();
    files
}

#[test]
fn test_golden_programs() {
    let files = program_files();
    assert!(!files.is_empty());

    let mut failures = Vec::new();
    for path in &files {
        let source = fs::read_to_string(path).unwrap();
        let input = fs::read_to_string(path.with_extension("in")).unwrap_or_default();
        let expected = fs::read_to_string(path.with_extension("out")).unwrap();

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let mut interp = Interpreter::new();
        interp.set_source_file(path.display().to_string());
        interp.set_output(buffer.clone());
        interp.set_input(Cursor::new(input));

        if let Err(err) = interp.run_source(&source) {
            failures.push(format!("{}: {:?}", path.display(), err));
            continue;
        }

        let actual = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        if actual != expected {
            failures.push(format!("{}:\nexpected:\n{}\ngot:\n{}", path.display(), expected, actual));
        }
    }

    assert!(failures.is_empty(), "{}", failures.join("\n"));
}
