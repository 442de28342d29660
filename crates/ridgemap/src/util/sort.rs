//! Parallel-array sorts over small rank/item pairs.
//!
//! Neighbor lists and DFT wave rankings keep a rank array and an item array
//! in lock-step. Sizes are tiny (a handful of neighbors, a handful of wave
//! forms), so a stable bubble sort is fine and keeps tie order reproducible:
//! equal keys retain first-smaller-index order.

/// Sort `ranks` ascending, carrying `items` along.
pub fn sort_parallel_asc(ranks: &mut [f64], items: &mut [usize]) {
    debug_assert_eq!(ranks.len(), items.len());
    let n = ranks.len();
    for pass in (1..n).rev() {
        for j in 0..pass {
            if ranks[j] > ranks[j + 1] {
                ranks.swap(j, j + 1);
                items.swap(j, j + 1);
            }
        }
    }
}

/// Sort `ranks` descending, carrying `items` along.
pub fn sort_parallel_desc(ranks: &mut [f64], items: &mut [usize]) {
    debug_assert_eq!(ranks.len(), items.len());
    let n = ranks.len();
    for pass in (1..n).rev() {
        for j in 0..pass {
            if ranks[j] < ranks[j + 1] {
                ranks.swap(j, j + 1);
                items.swap(j, j + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_keeps_items_in_lockstep() {
        let mut ranks = vec![3.0, 1.0, 2.0];
        let mut items = vec![30, 10, 20];
        sort_parallel_asc(&mut ranks, &mut items);
        assert_eq!(ranks, vec![1.0, 2.0, 3.0]);
        assert_eq!(items, vec![10, 20, 30]);
    }

    #[test]
    fn descending_keeps_items_in_lockstep() {
        let mut ranks = vec![0.5, 2.5, 1.5];
        let mut items = vec![5, 25, 15];
        sort_parallel_desc(&mut ranks, &mut items);
        assert_eq!(ranks, vec![2.5, 1.5, 0.5]);
        assert_eq!(items, vec![25, 15, 5]);
    }

    #[test]
    fn equal_keys_keep_first_index_first() {
        let mut ranks = vec![1.0, 1.0, 0.0];
        let mut items = vec![0, 1, 2];
        sort_parallel_asc(&mut ranks, &mut items);
        assert_eq!(items, vec![2, 0, 1]);

        let mut ranks = vec![1.0, 1.0, 2.0];
        let mut items = vec![0, 1, 2];
        sort_parallel_desc(&mut ranks, &mut items);
        assert_eq!(items, vec![2, 0, 1]);
    }

    #[test]
    fn empty_and_single_are_noops() {
        let mut ranks: Vec<f64> = vec![];
        let mut items: Vec<usize> = vec![];
        sort_parallel_asc(&mut ranks, &mut items);
        let mut ranks = vec![7.0];
        let mut items = vec![0];
        sort_parallel_desc(&mut ranks, &mut items);
        assert_eq!(items, vec![0]);
    }
}
