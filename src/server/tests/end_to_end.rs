use common::config::ServerConfig;
use common::testutil::init;
use common::{PAGES_PER_FILE, PAGE_STRIDE};
use server::Server;
use std::fs;

/// Run a full command script through the server against a fresh temp
/// directory, returning the config for post-mortem inspection.
fn run_script(script: &str) -> ServerConfig {
    init();
    let config = ServerConfig::temporary();
    fs::write(&config.input_file, script).unwrap();
    let mut server = Server::new(config.clone());
    server.run().unwrap();
    config
}

fn output_lines(config: &ServerConfig) -> Vec<String> {
    fs::read_to_string(&config.output_file)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

fn log_statuses(config: &ServerConfig) -> Vec<String> {
    fs::read_to_string(&config.op_log)
        .unwrap()
        .lines()
        .map(|l| l.rsplit(',').next().unwrap().to_string())
        .collect()
}

#[test]
fn test_full_person_lifecycle() {
    let script = "\
create type person 3 1 name str age int city str
list type
create record person alice 30 paris
search person alice
create record person bob 25 rome
list record person
filter person >alice
filter person =carol
update person alice alice 31 paris
search person alice
delete record person alice
list record person
delete type person
search person bob
";
    let config = run_script(script);

    assert_eq!(
        output_lines(&config),
        vec![
            "person",
            "alice 30 paris",
            "alice 30 paris",
            "bob 25 rome",
            "bob 25 rome",
            "alice 31 paris",
            "bob 25 rome",
        ]
    );

    let statuses = log_statuses(&config);
    assert_eq!(statuses.len(), 14);
    let expected_failures = [7, 13];
    for (i, status) in statuses.iter().enumerate() {
        if expected_failures.contains(&i) {
            assert_eq!(status, "failure", "line {} should have failed", i + 1);
        } else {
            assert_eq!(status, "success", "line {} should have succeeded", i + 1);
        }
    }

    // The type took everything with it: index file, record files, and the
    // now-empty catalog file.
    assert!(!config.data_dir.join("B+person.txt").exists());
    assert!(!config.data_dir.join("records1.txt").exists());
    assert!(!config.data_dir.join("types1.txt").exists());
}

#[test]
fn test_heap_files_have_fixed_layout() {
    let script = "\
create type person 3 1 name str age int city str
create record person alice 30 paris
";
    let config = run_script(script);

    for name in ["types1.txt", "records1.txt"] {
        let content = fs::read_to_string(config.data_dir.join(name)).unwrap();
        assert_eq!(content.len(), PAGES_PER_FILE * PAGE_STRIDE, "{}", name);
        let first_line = content.lines().next().unwrap();
        assert_eq!(first_line.len(), 89);
        assert!(first_line.starts_with("PAGE:1,Empty:2-3-4-5-6-7-8-9-10,Records:1"));
    }

    let index = fs::read_to_string(config.data_dir.join("B+person.txt")).unwrap();
    assert_eq!(index, "alice-records1.txt:1:1\n");
}

#[test]
fn test_state_survives_restart() {
    init();
    let config = ServerConfig::temporary();

    fs::write(
        &config.input_file,
        "create type person 3 1 name str age int city str\ncreate record person alice 30 paris\n",
    )
    .unwrap();
    Server::new(config.clone()).run().unwrap();

    // Second run over the same data directory picks up where the first
    // left off.
    fs::write(
        &config.input_file,
        "create record person bob 25 rome\nlist record person\n",
    )
    .unwrap();
    Server::new(config.clone()).run().unwrap();

    assert_eq!(
        output_lines(&config),
        vec!["alice 30 paris", "bob 25 rome"]
    );
    // The op log appended across runs instead of truncating.
    assert_eq!(log_statuses(&config).len(), 4);
}

#[test]
fn test_blank_and_unrecognized_lines() {
    let script = "\

create type person 3 1 name str age int city str

drop table person
list type
";
    let config = run_script(script);

    assert_eq!(output_lines(&config), vec!["person"]);
    // Blank lines are skipped silently; the bogus command logs a failure.
    let statuses = log_statuses(&config);
    assert_eq!(statuses, vec!["success", "failure", "success"]);
}

#[test]
fn test_rejected_commands_leave_no_trace() {
    let script = "\
create type person 3 1 name str age int city str
create record person alice 30 paris
create record person alice 99 oslo
create record ghost 1 2
search person alice
";
    let config = run_script(script);

    // The duplicate insert and the unknown type changed nothing.
    assert_eq!(output_lines(&config), vec!["alice 30 paris"]);
    let index = fs::read_to_string(config.data_dir.join("B+person.txt")).unwrap();
    assert_eq!(index.lines().count(), 1);
    assert_eq!(
        log_statuses(&config),
        vec!["success", "success", "failure", "failure", "success"]
    );
}

#[test]
fn test_multiple_types_interleaved() {
    let script = "\
create type person 3 1 name str age int city str
create type sensor 2 2 label str id int
create record person alice 30 paris
create record sensor fan 100
create record sensor pump 9
list type
list record sensor
delete type sensor
list type
search person alice
";
    let config = run_script(script);

    assert_eq!(
        output_lines(&config),
        vec![
            "person",
            "sensor",
            "pump 9",
            "fan 100",
            "person",
            "alice 30 paris",
        ]
    );
    assert!(!config.data_dir.join("B+sensor.txt").exists());
    assert!(config.data_dir.join("B+person.txt").exists());
}
