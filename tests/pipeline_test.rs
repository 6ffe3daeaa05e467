use itertools::Itertools;
use std::collections::HashMap;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use stindex::multi_stream::OpenPolicy;
use stindex::{Job, JobConfig, OrderedTermMap, TermIndex, TermTree};

fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content).unwrap();
    path
}

fn run_pipeline<I: TermIndex>(inputs: Vec<PathBuf>, capacity: usize, out: &Path, policy: OpenPolicy) -> (u64, String) {
    let config = JobConfig::new(NonZeroUsize::new(capacity).unwrap(), inputs, out).with_open_policy(policy);
    let mut job: Job<I> = Job::new(config);
    job.run().unwrap();
    job.persist_results().unwrap();
    (job.stats().terms_processed, fs::read_to_string(out).unwrap())
}

/// Deterministic pseudo-random term log with plenty of repeats and noise.
fn generated_lines(seed: u64, count: usize) -> Vec<String> {
    let words = ["alpha", "beta", "gamma", "delta", "epsilon", "Zeta", "ÿ", "a b", "beer", "aeon"];
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let word = words[(state >> 33) as usize % words.len()];
            match (state >> 20) % 7 {
                0 => String::new(),
                1 => format!("  {}\t", word),
                _ => word.to_string(),
            }
        })
        .collect()
}

#[test]
fn test_scenario_across_file_arrangements() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();
    let expected = "aeon\nbeer\nbeer\ncurry\none\n";

    let arrangements: Vec<Vec<Vec<&str>>> = vec![
        vec![vec!["one", "beer", "beer", "curry", "aeon"]],
        vec![vec!["one", "beer"], vec!["beer", "curry", "aeon"]],
        vec![vec!["one"], vec!["beer"], vec!["beer"], vec!["curry"], vec!["aeon"]],
    ];

    for (i, arrangement) in arrangements.iter().enumerate() {
        let inputs: Vec<PathBuf> = arrangement
            .iter()
            .enumerate()
            .map(|(j, lines)| write_file(dir, &format!("arr{}_{}.log", i, j), lines))
            .collect();
        let out = dir.join(format!("out{}.log", i));

        let (terms, output) = run_pipeline::<TermTree>(inputs, 2, &out, OpenPolicy::Eager);
        assert_eq!(terms, 5);
        assert_eq!(output, expected, "arrangement {}", i);
    }
}

#[test]
fn test_blank_lines_and_whitespace() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = write_file(temp_dir.path(), "in.log", &["a", "", "a", " b "]);
    let out = temp_dir.path().join("out.log");

    let (terms, output) = run_pipeline::<TermTree>(vec![input], 10, &out, OpenPolicy::Eager);
    assert_eq!(terms, 3);
    assert_eq!(output, "a\na\nb\n");
}

#[test]
fn test_unreadable_file_between_readable_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();
    let first = write_file(dir, "first.log", &["e", "d", "c", "b", "a"]);
    let missing = dir.join("missing.log");
    let second = write_file(dir, "second.log", &["c", "x", "y"]);

    for policy in [OpenPolicy::Eager, OpenPolicy::Lazy] {
        let out = dir.join(format!("out_{:?}.log", policy));
        let (terms, output) = run_pipeline::<TermTree>(vec![first.clone(), missing.clone(), second.clone()], 3, &out, policy);
        assert_eq!(terms, 8);
        assert_eq!(output, "a\nb\nc\nc\nd\ne\nx\ny\n");
    }
}

#[test]
fn test_output_properties_hold_for_generated_input() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();

    let lines = generated_lines(7, 2_000);
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let inputs = vec![
        write_file(dir, "g1.log", &refs[..700]),
        write_file(dir, "g2.log", &refs[700..1500]),
        write_file(dir, "g3.log", &refs[1500..]),
    ];
    let out = dir.join("out.log");
    let (terms, output) = run_pipeline::<TermTree>(inputs, 64, &out, OpenPolicy::Eager);

    let input_terms: Vec<&str> = lines.iter().map(|l| l.trim()).filter(|t| !t.is_empty()).collect();
    let output_lines: Vec<&str> = output.lines().collect();

    // total and distinct counts line up
    assert_eq!(terms as usize, input_terms.len());
    assert_eq!(output_lines.len(), input_terms.len());
    assert_eq!(
        output_lines.iter().unique().count(),
        input_terms.iter().unique().count()
    );

    // non-decreasing byte order
    assert!(output_lines.windows(2).all(|w| w[0].as_bytes() <= w[1].as_bytes()));

    // each term appears as one contiguous run of its input count
    let input_counts: HashMap<&str, usize> = input_terms.iter().copied().counts();
    let runs: Vec<(usize, &str)> = output_lines.iter().copied().dedup_with_count().collect();
    assert_eq!(runs.len(), input_counts.len());
    for (run_len, term) in runs {
        assert_eq!(Some(&run_len), input_counts.get(term), "term {:?}", term);
    }
}

#[test]
fn test_capacity_one_and_full_capacity_are_identical() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();
    let lines = generated_lines(42, 500);
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let input = write_file(dir, "in.log", &refs);

    let (_, small) = run_pipeline::<TermTree>(vec![input.clone()], 1, &dir.join("small.log"), OpenPolicy::Eager);
    let (_, full) = run_pipeline::<TermTree>(vec![input], lines.len(), &dir.join("full.log"), OpenPolicy::Eager);
    assert_eq!(small.as_bytes(), full.as_bytes());
}

#[test]
fn test_input_order_does_not_change_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();
    let a = write_file(dir, "a.log", &["pear", "apple", "pear"]);
    let b = write_file(dir, "b.log", &["fig", "apple"]);
    let c = write_file(dir, "c.log", &["kiwi"]);

    let (_, forward) = run_pipeline::<TermTree>(vec![a.clone(), b.clone(), c.clone()], 2, &dir.join("f.log"), OpenPolicy::Eager);
    let (_, reversed) = run_pipeline::<TermTree>(vec![c, b, a], 2, &dir.join("r.log"), OpenPolicy::Lazy);
    assert_eq!(forward, reversed);
    assert_eq!(forward, "apple\napple\nfig\nkiwi\npear\npear\n");
}

#[test]
fn test_tree_and_ordered_map_produce_same_bytes() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();
    let lines = generated_lines(99, 1_000);
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let input = write_file(dir, "in.log", &refs);

    let (tree_terms, tree) = run_pipeline::<TermTree>(vec![input.clone()], 16, &dir.join("tree.log"), OpenPolicy::Eager);
    let (map_terms, map) = run_pipeline::<OrderedTermMap>(vec![input], 16, &dir.join("map.log"), OpenPolicy::Eager);
    assert_eq!(tree_terms, map_terms);
    assert_eq!(tree, map);
}

#[test]
fn test_non_utf8_terms_keep_their_bytes_and_counts() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();
    let first = dir.join("1.log");
    fs::write(&first, b"a\xff\n a\xfe \n").unwrap();
    let second = dir.join("2.log");
    fs::write(&second, b"caf\xe9\na\xff\ncaf\xc3\xa9\n").unwrap();

    for policy in [OpenPolicy::Eager, OpenPolicy::Lazy] {
        let out = dir.join(format!("raw_{:?}.log", policy));
        let config = JobConfig::new(NonZeroUsize::new(2).unwrap(), vec![first.clone(), second.clone()], &out)
            .with_open_policy(policy);
        let mut job: Job = Job::new(config);
        job.run().unwrap();
        job.persist_results().unwrap();

        assert_eq!(job.stats().terms_processed, 5);
        assert_eq!(job.stats().distinct_terms, 4);
        assert_eq!(
            fs::read(&out).unwrap(),
            b"a\xfe\na\xff\na\xff\ncaf\xc3\xa9\ncaf\xe9\n".to_vec()
        );
    }
}
