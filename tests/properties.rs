//! Round-trip and idempotence laws from spec §8, checked against a plain
//! `Vec<i32>` reference model with `proptest`.

use flexvec::{DynVec, Elem};
use proptest::prelude::*;

fn contents(d: &DynVec<i32>) -> Vec<i32> {
    (0..d.len()).map(|i| *d.get(i).unwrap()).collect()
}

fn filled(vals: &[i32]) -> DynVec<i32> {
    let mut d = DynVec::new(4).unwrap();
    for &x in vals {
        d.push(Elem::Value(x)).unwrap();
    }
    d
}

proptest! {
    #[test]
    fn put_then_get_round_trips(vals in prop::collection::vec(any::<i32>(), 1..64), idx in 0usize..63, new_val in any::<i32>()) {
        let mut d = filled(&vals);
        let idx = idx % d.len();
        d.put_at(Elem::Value(new_val), idx).unwrap();
        prop_assert_eq!(*d.get(idx).unwrap(), new_val);
    }

    #[test]
    fn push_pop_round_trips_and_restores_size(vals in prop::collection::vec(any::<i32>(), 0..64), x in any::<i32>()) {
        let mut d = filled(&vals);
        let size_before = d.len();
        d.push(Elem::Value(x)).unwrap();
        let popped = match d.pop().unwrap() {
            Elem::Value(v) => v,
            Elem::Ref(_) => unreachable!(),
        };
        prop_assert_eq!(popped, x);
        prop_assert_eq!(d.len(), size_before);
    }

    #[test]
    fn push_front_pop_front_round_trips_and_restores_size(vals in prop::collection::vec(any::<i32>(), 0..64), x in any::<i32>()) {
        let mut d = filled(&vals);
        let size_before = d.len();
        d.push_front(Elem::Value(x)).unwrap();
        let popped = match d.pop_front().unwrap() {
            Elem::Value(v) => v,
            Elem::Ref(_) => unreachable!(),
        };
        prop_assert_eq!(popped, x);
        prop_assert_eq!(d.len(), size_before);
    }

    #[test]
    fn rotate_left_then_right_is_identity(vals in prop::collection::vec(any::<i32>(), 1..64), k in 0usize..128) {
        let mut d = filled(&vals);
        let before = contents(&d);
        d.rotate_left(k).unwrap();
        d.rotate_right(k).unwrap();
        prop_assert_eq!(contents(&d), before);
    }

    #[test]
    fn sort_is_idempotent_and_searchable(vals in prop::collection::vec(any::<i32>(), 1..64)) {
        let mut d = filled(&vals);
        d.sort_by(|a, b| a.cmp(b));
        let once = contents(&d);
        d.sort_by(|a, b| a.cmp(b));
        prop_assert_eq!(contents(&d), once.clone());

        for (i, &v) in once.iter().enumerate() {
            let found = d.bsearch_by(|x| x.cmp(&v));
            prop_assert!(found.is_found());
            prop_assert_eq!(once[found.index()], v);
            let _ = i;
        }
    }

    #[test]
    fn merge_concatenates_v1_and_v2(a in prop::collection::vec(any::<i32>(), 0..32), b in prop::collection::vec(any::<i32>(), 0..32)) {
        let mut v1 = filled(&a);
        let mut v2 = filled(&b);
        v1.merge(&mut v2).unwrap();
        let mut expected = a.clone();
        expected.extend_from_slice(&b);
        prop_assert_eq!(contents(&v1), expected);
        prop_assert_eq!(v2.len(), 0);
    }
}
