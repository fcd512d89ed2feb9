//! Integration tests for the six concrete scenarios in spec §8.

use flexvec::{DynVec, Elem, OverflowMode, VectorBuilder};

fn contents(d: &DynVec<i32>) -> Vec<i32> {
    (0..d.len()).map(|i| *d.get(i).unwrap()).collect()
}

#[test]
fn scenario_1_push_then_pop_twice() {
    let mut v: DynVec<i32> = DynVec::new(8).unwrap();
    v.push(Elem::Value(1)).unwrap();
    v.push(Elem::Value(2)).unwrap();
    v.push(Elem::Value(3)).unwrap();

    assert_eq!(v.len(), 3);
    assert_eq!(*v.get(0).unwrap(), 1);
    assert_eq!(*v.get(1).unwrap(), 2);
    assert_eq!(*v.get(2).unwrap(), 3);

    let first = match v.pop().unwrap() {
        Elem::Value(x) => x,
        Elem::Ref(_) => panic!("by-value vector returned a reference"),
    };
    assert_eq!(first, 3);

    let second = match v.pop().unwrap() {
        Elem::Value(x) => x,
        Elem::Ref(_) => panic!("by-value vector returned a reference"),
    };
    assert_eq!(second, 2);

    assert_eq!(v.len(), 1);
}

#[test]
fn scenario_2_front_insert_grows_left() {
    let mut v: DynVec<i32> = DynVec::new(4).unwrap();
    let cap_before = v.capacity();
    for x in 1..=6 {
        v.push_front(Elem::Value(x)).unwrap();
    }
    assert_eq!(contents(&v), vec![6, 5, 4, 3, 2, 1]);
    assert_eq!(v.len(), 6);
    assert!(v.capacity() >= 6);
    assert!(v.capacity() > cap_before);
}

#[test]
fn scenario_3_sort_then_bsearch() {
    let mut v: DynVec<i32> = DynVec::new(8).unwrap();
    for x in [5, 2, 8, 1, 9, 3] {
        v.push(Elem::Value(x)).unwrap();
    }
    v.sort_by(|a, b| a.cmp(b));
    assert_eq!(contents(&v), vec![1, 2, 3, 5, 8, 9]);

    let found = v.bsearch_by(|x| x.cmp(&8));
    assert!(found.is_found());
    assert_eq!(found.index(), 4);

    let missing = v.bsearch_by(|x| x.cmp(&4));
    assert!(!missing.is_found());
    assert_eq!(missing.index(), 3);
}

#[test]
fn scenario_4_by_reference_delete_leaves_pointees_alone() {
    let mut p1 = 10i32;
    let mut p2 = 20i32;
    let mut p3 = 30i32;

    let mut v: DynVec<i32> = VectorBuilder::new().by_reference().build(4).unwrap();
    v.push(Elem::Ref(&mut p1)).unwrap();
    v.push(Elem::Ref(&mut p2)).unwrap();
    v.push(Elem::Ref(&mut p3)).unwrap();

    v.delete_at(1, 0).unwrap();
    assert_eq!(v.len(), 2);
    assert_eq!(*v.get(0).unwrap(), p1);
    assert_eq!(*v.get(1).unwrap(), p3);

    // Deleting a by-reference slot never touches the pointee.
    assert_eq!(p1, 10);
    assert_eq!(p2, 20);
    assert_eq!(p3, 30);
}

#[test]
fn scenario_5_circular_overwrite_keeps_fixed_window() {
    let mut v: DynVec<char> = VectorBuilder::new().circular().build(4).unwrap();
    for c in ['a', 'b', 'c', 'd', 'e'] {
        v.push(Elem::Value(c)).unwrap();
        assert!(v.len() <= 3);
    }
    assert_eq!(v.len(), 3);
    // The resolved reading (DESIGN.md #5): a monotonic write cursor rather
    // than literal put-at delegation, which keeps FIFO eviction order.
    assert_eq!(contents_char(&v), vec!['c', 'd', 'e']);
}

fn contents_char(d: &DynVec<char>) -> Vec<char> {
    (0..d.len()).map(|i| *d.get(i).unwrap()).collect()
}

#[test]
fn scenario_6_merge_concatenates_and_consumes_source() {
    let mut v1: DynVec<i32> = DynVec::new(8).unwrap();
    for x in [1, 2, 3] {
        v1.push(Elem::Value(x)).unwrap();
    }
    let mut v2: DynVec<i32> = DynVec::new(8).unwrap();
    for x in [4, 5, 6] {
        v2.push(Elem::Value(x)).unwrap();
    }

    v1.merge(&mut v2).unwrap();
    assert_eq!(contents(&v1), vec![1, 2, 3, 4, 5, 6]);
    // `v2` is consumed: further operations fail with undefined-vector.
    let err = v2.pop().unwrap_err();
    assert_eq!(err, flexvec::VectorError::UndefinedVector);
}

#[test]
fn append_on_overflow_coerces_out_of_range_insert() {
    let mut v: DynVec<i32> = DynVec::new(8).unwrap();
    for x in [1, 2, 3] {
        v.push(Elem::Value(x)).unwrap();
    }
    v.insert_at(Elem::Value(99), 50, OverflowMode::AppendOnOverflow).unwrap();
    assert_eq!(v.len(), 4);
}

#[test]
fn strict_overflow_rejects_out_of_range_insert() {
    let mut v: DynVec<i32> = DynVec::new(8).unwrap();
    v.push(Elem::Value(1)).unwrap();
    assert!(v.insert_at(Elem::Value(2), 50, OverflowMode::Strict).is_err());
}
