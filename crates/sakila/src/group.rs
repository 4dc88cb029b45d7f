//! Folding flat one-to-many join rows into `(parent, children)` pairs.

use crate::error::StoreResult;
use std::collections::HashMap;
use std::hash::Hash;

/// Group rows by parent, preserving the order in which parents are first seen.
///
/// `child_of` returns `None` for a row whose child projection is null (an outer
/// join without a match); such rows still register their parent, which then
/// appears with an empty list. Parents are compared by value.
pub fn group_rows<R, P, C>(
    rows: impl IntoIterator<Item = R>,
    mut parent_of: impl FnMut(&R) -> StoreResult<P>,
    mut child_of: impl FnMut(&R) -> StoreResult<Option<C>>,
) -> StoreResult<Vec<(P, Vec<C>)>>
where
    P: Eq + Hash + Clone,
{
    let mut index: HashMap<P, usize> = HashMap::new();
    let mut out: Vec<(P, Vec<C>)> = Vec::new();

    for row in rows {
        let parent = parent_of(&row)?;
        let slot = match index.get(&parent) {
            Some(&i) => i,
            None => {
                index.insert(parent.clone(), out.len());
                out.push((parent, Vec::new()));
                out.len() - 1
            }
        };
        if let Some(child) = child_of(&row)? {
            out[slot].1.push(child);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn group(rows: Vec<(&'static str, Option<&'static str>)>) -> Vec<(&'static str, Vec<&'static str>)> {
        group_rows(rows, |r| Ok(r.0), |r| Ok(r.1)).unwrap()
    }

    #[test]
    fn null_child_registers_parent_with_empty_list() {
        let out = group(vec![("P1", Some("C1")), ("P1", Some("C2")), ("P2", None)]);
        assert_eq!(out, vec![("P1", vec!["C1", "C2"]), ("P2", vec![])]);
    }

    #[test]
    fn first_seen_order_is_kept_for_interleaved_rows() {
        let out = group(vec![
            ("B", Some("b1")),
            ("A", Some("a1")),
            ("B", Some("b2")),
            ("A", None),
        ]);
        assert_eq!(out, vec![("B", vec!["b1", "b2"]), ("A", vec!["a1"])]);
    }

    #[test]
    fn counts_match_input() {
        let rows = vec![
            ("P1", Some("C1")),
            ("P2", None),
            ("P1", Some("C2")),
            ("P3", Some("C3")),
            ("P2", None),
        ];
        let distinct: HashSet<_> = rows.iter().map(|r| r.0).collect();
        let non_null = rows.iter().filter(|r| r.1.is_some()).count();

        let out = group(rows);
        assert_eq!(out.len(), distinct.len());
        assert_eq!(out.iter().map(|(_, c)| c.len()).sum::<usize>(), non_null);
    }

    #[test]
    fn decode_errors_propagate() {
        let rows = vec![("P1", Some("C1"))];
        let err = group_rows(
            rows,
            |_| Err::<&str, _>(crate::StoreError::decode("actor__actor_id", "bad")),
            |r| Ok(r.1),
        )
        .unwrap_err();
        assert!(matches!(err, crate::StoreError::Decode { .. }));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(group(Vec::new()).is_empty());
    }
}
