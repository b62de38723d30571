// B-Tree Algorithm Tests
// Exercises the engine through its public contract across degrees and
// randomized workloads, checking the structural invariants after every
// mutation.

use anyhow::Result;
use gamedex::btree::{all_leaves_at_same_level, check_invariants, is_valid_btree};
use gamedex::{BTree, Catalog, MinDegree, Record, RemoveOutcome};
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn record(name: &str) -> Record {
    Record::new(name, "Test", vec!["Somewhere".to_string()])
}

fn tree_of_degree(t: usize) -> BTree {
    BTree::new(MinDegree::new(t).expect("valid degree"))
}

#[test]
fn test_sequential_insert_preserves_invariants() -> Result<()> {
    for t in [2, 3, 4, 8] {
        let mut tree = tree_of_degree(t);
        for i in 0..200 {
            tree.insert(record(&format!("key{i:04}")));
            check_invariants(&tree)?;
        }
        assert_eq!(tree.len(), 200);
        assert!(all_leaves_at_same_level(&tree));
    }
    Ok(())
}

#[test]
fn test_shuffled_insert_then_remove_all() -> Result<()> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
    let mut names: Vec<String> = (0..150).map(|i| format!("game{i:03}")).collect();

    for t in [2, 3, 5] {
        names.shuffle(&mut rng);
        let mut tree = tree_of_degree(t);
        for name in &names {
            tree.insert(record(name));
        }
        check_invariants(&tree)?;
        assert_eq!(tree.len(), names.len());

        names.shuffle(&mut rng);
        for (i, name) in names.iter().enumerate() {
            assert_eq!(
                tree.remove(name),
                RemoveOutcome::Removed,
                "degree {t}: {name} should be present"
            );
            check_invariants(&tree)?;
            assert_eq!(tree.len(), names.len() - i - 1);
        }
        assert!(tree.is_empty());
    }
    Ok(())
}

#[test]
fn test_search_correctness_for_present_and_absent_keys() {
    let mut tree = tree_of_degree(3);
    let present: Vec<String> = (0..50).map(|i| format!("present{i:02}")).collect();
    for name in &present {
        tree.insert(record(name));
    }

    for name in &present {
        let found = tree.search(name).expect("inserted key must be found");
        assert_eq!(found.key().as_str(), name.as_str());
    }
    for i in 0..50 {
        assert!(tree.search(&format!("absent{i:02}")).is_none());
    }

    // Fully removed keys become absent again.
    for name in present.iter().take(25) {
        assert!(tree.remove(name).removed());
    }
    for name in present.iter().take(25) {
        assert!(tree.search(name).is_none());
    }
    for name in present.iter().skip(25) {
        assert!(tree.search(name).is_some());
    }
}

#[test]
fn test_traversal_is_sorted_and_complete() {
    let mut tree = tree_of_degree(2);
    let names = ["pear", "apple", "zebra", "mango", "fig", "kiwi", "date"];
    for name in names {
        tree.insert(record(name));
    }

    let keys: Vec<&str> = tree.traverse().iter().map(|r| r.key().as_str()).collect();
    assert_eq!(keys.len(), names.len());
    for pair in keys.windows(2) {
        assert!(pair[0] <= pair[1], "{} sorted before {}", pair[1], pair[0]);
    }
}

#[test]
fn test_double_remove_of_absent_key_is_stable() {
    let mut tree = tree_of_degree(3);
    for name in ["a", "b", "c", "d", "e", "f", "g"] {
        tree.insert(record(name));
    }
    let shape_before: Vec<String> = tree
        .traverse()
        .iter()
        .map(|r| r.key().as_str().to_string())
        .collect();

    assert_eq!(tree.remove("missing"), RemoveOutcome::NotFound);
    assert_eq!(tree.remove("missing"), RemoveOutcome::NotFound);

    let shape_after: Vec<String> = tree
        .traverse()
        .iter()
        .map(|r| r.key().as_str().to_string())
        .collect();
    assert_eq!(shape_before, shape_after);
    assert!(is_valid_btree(&tree));
}

#[test]
fn test_duplicate_derived_keys_survive_churn() -> Result<()> {
    let mut tree = tree_of_degree(2);
    // All three names derive the key "nier".
    tree.insert(Record::new("NieR", "RPG", vec![]));
    tree.insert(Record::new("Nier!", "RPG", vec![]));
    tree.insert(Record::new("ni-er", "RPG", vec![]));
    for i in 0..40 {
        tree.insert(record(&format!("filler{i:02}")));
    }
    check_invariants(&tree)?;
    assert_eq!(tree.len(), 43);

    // Each removal takes exactly one of the duplicates.
    assert!(tree.remove("nier").removed());
    assert!(tree.remove("nier").removed());
    assert!(tree.search("nier").is_some());
    assert!(tree.remove("nier").removed());
    assert!(tree.search("nier").is_none());
    check_invariants(&tree)?;
    Ok(())
}

#[test]
fn test_interleaved_insert_remove_workload() -> Result<()> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let mut tree = tree_of_degree(3);
    let mut live: Vec<String> = Vec::new();

    for round in 0..400 {
        if round % 3 == 2 && !live.is_empty() {
            let victim = live.swap_remove(round % live.len());
            assert!(tree.remove(&victim).removed(), "{victim} should be live");
        } else {
            let name = format!("entry{round:04}");
            tree.insert(record(&name));
            live.push(name);
        }
        check_invariants(&tree)?;
    }

    live.shuffle(&mut rng);
    assert_eq!(tree.len(), live.len());
    for name in &live {
        assert!(tree.search(name).is_some());
    }
    Ok(())
}
