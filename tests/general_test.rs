use keygroup_toml::parse_named;
use miette::Report;
use std::fs;

#[test]
fn test_all_ok_files() {
    let tests_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/ok");
    let entries = fs::read_dir(tests_dir).expect("Failed to read tests/ok directory");

    for entry in entries {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();

        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            println!("Parsing file: {:?}", path);
            let source = fs::read_to_string(&path)
                .unwrap_or_else(|_| panic!("Failed to read file: {:?}", path));

            if let Err(err) = parse_named(&source, &path.to_string_lossy()) {
                panic!("Failed to parse {:?}. Error: {:?}", path, Report::new(err));
            }
        }
    }
}

#[test]
fn test_all_bad_files() {
    let tests_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/bad");
    let entries = fs::read_dir(tests_dir).expect("Failed to read tests/bad directory");

    for entry in entries {
        let path = entry.expect("Failed to read directory entry").path();

        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            let source = fs::read_to_string(&path)
                .unwrap_or_else(|_| panic!("Failed to read file: {:?}", path));
            assert!(
                parse_named(&source, &path.to_string_lossy()).is_err(),
                "{:?} should not parse",
                path
            );
        }
    }
}
