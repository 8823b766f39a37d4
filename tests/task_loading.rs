//! Task directory listing and task-file loading against real files on disk.

use std::fs;

use arc_synth::errors::GPError;
use arc_synth::task::{list_tasks, Task, MAX_TEST_INPUT};

#[test]
fn lists_and_loads_a_task_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("flip.json"),
        r#"{"train":[{"input":[[1,0],[0,1]],"output":[[0,1],[1,0]]}],"test":[{"input":[[1,1]]}]}"#,
    )
    .unwrap();
    fs::write(dir.path().join("notes.md"), "not a task").unwrap();

    let listed = list_tasks(dir.path()).unwrap();
    assert_eq!(listed.len(), 1);

    let task = Task::load(&listed[0]).unwrap();
    assert_eq!(task.name, "flip");
    assert_eq!(task.train[0].input, vec![vec![1, 0], vec![0, 1]]);
    assert_eq!(task.train[0].output, Some(vec![vec![0, 1], vec![1, 0]]));
    assert!(task.test[0].output.is_none());
}

#[test]
fn rejects_a_task_with_too_many_test_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.json");
    let mut test_examples = String::from("[");
    for i in 0..(MAX_TEST_INPUT + 1) {
        if i > 0 {
            test_examples.push(',');
        }
        test_examples.push_str(r#"{"input":[[0]]}"#);
    }
    test_examples.push(']');
    fs::write(&path, format!(r#"{{"train":[],"test":{test_examples}}}"#)).unwrap();

    assert!(matches!(Task::load(&path), Err(GPError::TaskTooLarge { .. })));
}

#[test]
fn missing_task_file_surfaces_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(matches!(Task::load(&missing), Err(GPError::Io(_))));
}
