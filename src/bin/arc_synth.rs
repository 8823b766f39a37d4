//! CLI entry point. With no arguments, lists the tasks under `data/`; with
//! a task name, loads it and samples the guide against it, optionally
//! appending each successful sample to a CSV file. Mirrors the argv
//! handling in `original_source/src/main.c`, minus that file's
//! exhaustive-search loop (replaced by guide-driven sampling, per
//! spec.md's driver design).

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use arc_synth::driver::Driver;
use arc_synth::guide::UniformBackbone;
use arc_synth::task::{list_tasks, Task};

const TASK_DIR: &str = "data";
const SAMPLES_PER_RUN: usize = 200;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let task_dir = Path::new(TASK_DIR);

    match args.as_slice() {
        [] => {
            for path in list_tasks(task_dir)? {
                println!("{}", path.file_stem().unwrap_or_default().to_string_lossy());
            }
        }
        [task_name] => run_task(task_name, None)?,
        [task_name, csv_path] => run_task(task_name, Some(csv_path))?,
        _ => {
            eprintln!("usage: arc-synth [task_name] [csv_path]");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn run_task(task_name: &str, csv_path: Option<&str>) -> anyhow::Result<()> {
    let path = Path::new(TASK_DIR).join(format!("{task_name}.json"));
    let task = Task::load(&path)?;
    tracing::info!(task = %task.name, train = task.train.len(), "loaded task");

    let mut csv_file = match csv_path {
        Some(p) => {
            let exists = Path::new(p).exists();
            let mut file = OpenOptions::new().create(true).append(true).open(p)?;
            if !exists {
                writeln!(file, "task,example,loss,reconstructed,abstraction,filter,transform")?;
            }
            Some(file)
        }
        None => None,
    };

    let mut driver = Driver::new(vec![task], Box::new(UniformBackbone), 42);
    for _ in 0..SAMPLES_PER_RUN {
        if let Some(record) = driver.run_iteration()? {
            tracing::debug!(loss = record.loss, reconstructed = record.reconstructed, "sample");
            if let Some(file) = csv_file.as_mut() {
                writeln!(
                    file,
                    "{},{},{},{},{},{},{}",
                    record.task, record.example, record.loss, record.reconstructed, record.abstraction, record.filter, record.transform
                )?;
            }
        }
    }

    Ok(())
}
