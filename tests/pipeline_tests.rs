//! Executor, failure handling, symbol table loading and config file tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use declgen::error::{BuildError, IntrospectError};
use declgen::pipeline::{Failure, check_for_failed_roots, run_in_parallel};
use declgen::utils::{WorkerLimits, apply_file_to_opts, load_declgen_toml};
use declgen::{Keep, Name, Opts, SymbolSource, Warning, load_known_symbols};

// --- executor ---

#[test]
fn test_results_follow_input_order() {
    let items: Vec<usize> = (0..6).collect();
    let outcome = run_in_parallel(
        &items,
        |&i, _sink| {
            // Earlier items finish last.
            thread::sleep(Duration::from_millis(((6 - i) * 5) as u64));
            Ok(i * 10)
        },
        Some(3),
        None,
    );
    let got: Vec<Option<usize>> = outcome.results;
    assert_eq!(
        got,
        vec![Some(0), Some(10), Some(20), Some(30), Some(40), Some(50)]
    );
    assert!(outcome.failures.is_empty());
}

#[test]
fn test_sequential_when_single_worker() {
    let items = vec!["a", "b", "c"];
    let outcome = run_in_parallel(
        &items,
        |s, _sink| Ok(s.to_uppercase()),
        Some(1),
        None,
    );
    let got: Vec<String> = outcome.results.into_iter().flatten().collect();
    assert_eq!(got, vec!["A", "B", "C"]);
}

#[test]
fn test_failures_and_panics_are_isolated() {
    let items: Vec<usize> = (0..4).collect();
    let outcome = run_in_parallel(
        &items,
        |&i, _sink| {
            if i == 1 {
                anyhow::bail!("item one refused");
            }
            if i == 2 {
                panic!("item two exploded");
            }
            Ok(i)
        },
        Some(2),
        None,
    );
    assert_eq!(outcome.results, vec![Some(0), None, None, Some(3)]);
    assert!(outcome.is_degraded());
    let indices: Vec<usize> = outcome.failures.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![1, 2]);
    assert!(outcome.failures[0].message.contains("item one refused"));
    assert!(outcome.failures[1].message.contains("worker panicked"));
    assert!(outcome.failures[1].message.contains("item two exploded"));
    assert!(outcome.failures.iter().all(|f| !f.fatal));
}

#[test]
fn test_listener_errors_are_marked_fatal() {
    let items: Vec<usize> = (0..3).collect();
    let outcome = run_in_parallel(
        &items,
        |&i, _sink| -> anyhow::Result<usize> {
            match i {
                0 => Err(anyhow::Error::from(BuildError::listener(
                    "docs",
                    anyhow::anyhow!("index corrupt"),
                )))
                .context("build tree for ::A"),
                1 => Err(BuildError::from(IntrospectError::inspect("B", "raised")))
                    .context("build tree for ::B"),
                _ => Ok(i),
            }
        },
        Some(1),
        None,
    );
    let fatal: Vec<(usize, bool)> = outcome.failures.iter().map(|f| (f.index, f.fatal)).collect();
    assert_eq!(fatal, vec![(0, true), (1, false)]);
    assert_eq!(outcome.results[2], Some(2));
}

#[test]
fn test_warnings_grouped_by_item_in_order() {
    let items: Vec<usize> = (0..4).collect();
    let outcome = run_in_parallel(
        &items,
        |&i, sink| {
            thread::sleep(Duration::from_millis(((4 - i) * 5) as u64));
            sink.emit(Warning::new(None, format!("{i}a")));
            sink.emit(Warning::new(None, format!("{i}b")));
            Ok(())
        },
        Some(4),
        None,
    );
    let messages: Vec<&str> = outcome.warnings.iter().map(|w| w.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["0a", "0b", "1a", "1b", "2a", "2b", "3a", "3b"]
    );
}

#[test]
fn test_on_done_called_per_item() {
    let items: Vec<usize> = (0..5).collect();
    let done = AtomicUsize::new(0);
    let on_done: &(dyn Fn() + Sync) = &|| {
        done.fetch_add(1, Ordering::SeqCst);
    };
    let outcome = run_in_parallel(
        &items,
        |&i, _sink| {
            if i == 3 {
                anyhow::bail!("nope");
            }
            Ok(i)
        },
        Some(2),
        Some(on_done),
    );
    assert_eq!(done.load(Ordering::SeqCst), 5);
    assert_eq!(outcome.failures.len(), 1);
}

#[test]
fn test_empty_input() {
    let items: Vec<usize> = Vec::new();
    let outcome = run_in_parallel(&items, |&i, _sink| Ok(i), None, None);
    assert!(outcome.results.is_empty());
    assert!(!outcome.is_degraded());
}

#[test]
fn test_default_worker_count_is_clamped() {
    assert_eq!(WorkerLimits { threads: 0 }.default_workers(), WorkerLimits::MIN_WORKERS);
    assert_eq!(WorkerLimits { threads: 4 }.default_workers(), 8);
    assert_eq!(
        WorkerLimits { threads: 1_000 }.default_workers(),
        WorkerLimits::MAX_WORKERS
    );
}

// --- failed roots ---

fn failures() -> Vec<Failure> {
    vec![Failure {
        index: 1,
        message: "failed to inspect B: boom".to_string(),
        fatal: false,
    }]
}

#[test]
fn test_failed_roots_reported_when_not_strict() {
    let roots = vec![Name::new("A"), Name::new("B")];
    let failed = check_for_failed_roots(&Opts::default(), &roots, &failures()).unwrap();
    assert_eq!(failed, vec![Name::new("B")]);
}

#[test]
fn test_failed_roots_error_when_strict() {
    let roots = vec![Name::new("A"), Name::new("B")];
    let opts = Opts {
        strict: true,
        ..Default::default()
    };
    let err = check_for_failed_roots(&opts, &roots, &failures()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("::B"), "{msg}");
    assert!(msg.contains("boom"), "{msg}");
}

#[test]
fn test_fatal_failure_errors_without_strict() {
    let roots = vec![Name::new("A"), Name::new("B"), Name::new("C")];
    let failures = vec![
        Failure {
            index: 0,
            message: "worker panicked: oops".to_string(),
            fatal: false,
        },
        Failure {
            index: 2,
            message: "listener `x` failed: boom".to_string(),
            fatal: true,
        },
    ];
    let err = check_for_failed_roots(&Opts::default(), &roots, &failures).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("::C"), "{msg}");
    assert!(msg.contains("listener `x`"), "{msg}");
}

#[test]
fn test_no_failures_is_ok_in_strict_mode() {
    let roots = vec![Name::new("A")];
    let opts = Opts {
        strict: true,
        ..Default::default()
    };
    assert!(check_for_failed_roots(&opts, &roots, &[]).unwrap().is_empty());
}

// --- symbol table sources ---

const TABLE: &str = r#"{
  "kind": "CLASS_OR_MODULE",
  "name": { "name": "<root>" },
  "children": [
    { "kind": "CLASS_OR_MODULE", "name": { "name": "Post" } }
  ]
}"#;

#[test]
fn test_load_symbols_none_is_empty() {
    let set = load_known_symbols(&SymbolSource::None).unwrap();
    assert!(set.is_empty());
}

#[test]
fn test_load_symbols_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("symbols.json");
    std::fs::write(&path, TABLE).unwrap();
    let set = load_known_symbols(&SymbolSource::File(path)).unwrap();
    assert!(set.contains(&Name::new("Post")));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_load_symbols_missing_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert!(load_known_symbols(&SymbolSource::File(path)).is_err());
}

#[cfg(unix)]
#[test]
fn test_load_symbols_from_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("symbols.json");
    std::fs::write(&path, TABLE).unwrap();
    let source = SymbolSource::Command(vec![
        "cat".to_string(),
        path.to_string_lossy().into_owned(),
    ]);
    let set = load_known_symbols(&source).unwrap();
    assert!(set.contains(&Name::new("Post")));
}

#[cfg(unix)]
#[test]
fn test_load_symbols_command_failure_errors() {
    let source = SymbolSource::Command(vec!["false".to_string()]);
    let err = load_known_symbols(&source).unwrap_err();
    assert!(err.to_string().contains("false"));
}

#[test]
fn test_load_symbols_empty_command_errors() {
    assert!(load_known_symbols(&SymbolSource::Command(Vec::new())).is_err());
}

// --- config file ---

#[test]
fn test_config_file_missing_is_none() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_declgen_toml(dir.path()).is_none());
}

#[test]
fn test_config_file_applies_present_fields() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".declgen.toml"),
        r#"
[settings]
workers = 3
keep = "right"
strict = true
exclude = ["Foo::Internal*"]
boundary = ["lib/"]
symbols = "sorbet/symbols.json"
"#,
    )
    .unwrap();
    let file = load_declgen_toml(dir.path()).unwrap();
    let mut opts = Opts {
        verbose: true,
        ..Default::default()
    };
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.workers, Some(3));
    assert_eq!(opts.keep, Keep::Right);
    assert!(opts.strict);
    // Absent from the file, so untouched.
    assert!(opts.verbose);
    assert_eq!(opts.exclude, vec!["Foo::Internal*".to_string()]);
    assert_eq!(opts.boundary, vec!["lib/".to_string()]);
    assert_eq!(
        opts.symbols.as_deref(),
        Some(std::path::Path::new("sorbet/symbols.json"))
    );
    assert!(opts.output.is_none());
}

#[test]
fn test_config_file_with_bad_toml_is_none() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".declgen.toml"), "[settings\nworkers = ").unwrap();
    assert!(load_declgen_toml(dir.path()).is_none());
}
