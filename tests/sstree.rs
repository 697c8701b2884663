use spatial_index::{Data, Embedding, SSTree};

fn embedding_at(x: f64) -> Embedding {
    Embedding::new(vec![x, 0.0, 0.0])
}

#[test]
fn a_fifth_insert_splits_a_four_point_leaf_into_a_balanced_root() {
    let mut tree = SSTree::new(4).unwrap();
    for (i, x) in [0.0, 1.0, 2.0, 3.0, 100.0].into_iter().enumerate() {
        tree.insert(Data::new(embedding_at(x), format!("/doc/{i}")));
    }

    let root = tree.root().unwrap();
    let root_ref = root.borrow();
    assert!(!root_ref.is_leaf());
    assert_eq!(root_ref.children().len(), 2);

    let total_points: usize = root_ref.children().iter().map(|c| c.borrow().data().len()).sum();
    assert_eq!(total_points, 5);

    // Median split on x puts the two smallest values in one leaf and the
    // rest (including the x=100 outlier) in the other, per spec.md's own
    // seed scenario 5: siblings {0,1} and {2,3,100}.
    let mut leaf_sizes: Vec<usize> = root_ref.children().iter().map(|c| c.borrow().data().len()).collect();
    leaf_sizes.sort_unstable();
    assert_eq!(leaf_sizes, vec![2, 3]);

    let outlier_leaf = root_ref
        .children()
        .iter()
        .find(|c| c.borrow().data().iter().any(|d| d.path() == "/doc/4"))
        .unwrap();
    assert_eq!(outlier_leaf.borrow().data().len(), 3);
}

#[test]
fn reinserting_the_same_path_is_idempotent() {
    let mut tree = SSTree::new(4).unwrap();
    tree.insert(Data::new(embedding_at(1.0), "/doc/a"));
    tree.insert(Data::new(embedding_at(2.0), "/doc/b"));

    let before = tree.root().unwrap().borrow().data().len();
    tree.insert(Data::new(embedding_at(999.0), "/doc/a"));
    let after = tree.root().unwrap().borrow().data().len();

    assert_eq!(before, after);
    let original = tree
        .root()
        .unwrap()
        .borrow()
        .data()
        .iter()
        .find(|d| d.path() == "/doc/a")
        .unwrap()
        .clone();
    assert!(tree.search(original.as_ref()).is_some());
}

#[test]
fn knn_returns_the_closest_entries_first() {
    let mut tree = SSTree::new(4).unwrap();
    for (i, x) in [0.0, 5.0, 10.0, 50.0, 51.0, 52.0].into_iter().enumerate() {
        tree.insert(Data::new(embedding_at(x), format!("/doc/{i}")));
    }

    let results = tree.knn(&embedding_at(51.0), 3);
    let paths: Vec<&str> = results.iter().map(|d| d.path()).collect();
    assert_eq!(paths.len(), 3);
    assert!(paths.contains(&"/doc/3"));
    assert!(paths.contains(&"/doc/4"));
    assert!(paths.contains(&"/doc/5"));
}
