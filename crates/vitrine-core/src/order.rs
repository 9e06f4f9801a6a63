//! Sparse gallery ordering
//!
//! Positions are integers spaced [`ORDER_GAP`] apart so that moving one item usually
//! rewrites a single order value: the midpoint between its new neighbours. When the
//! neighbours are adjacent integers there is no midpoint and the whole list is
//! rebalanced instead. Any value `<= 0` counts as "unset".

use crate::constants::ORDER_GAP;

/// Anything that carries a gallery position.
pub trait Sequenced {
    fn order(&self) -> i64;
    fn set_order(&mut self, order: i64);
}

/// Order of the item at `index` in a freshly numbered list.
pub fn initial_order(index: usize) -> i64 {
    (index as i64 + 1) * ORDER_GAP
}

/// Order for an item appended after `last`.
pub fn append_order(last: Option<i64>) -> i64 {
    match last {
        Some(last) if last > 0 => last + ORDER_GAP,
        _ => initial_order(0),
    }
}

/// Repair the list so orders strictly increase in list order.
///
/// Items that are unset or not above their predecessor get `previous + ORDER_GAP`;
/// everything else keeps its value. Returns the indices that changed.
pub fn rebalance<T: Sequenced>(items: &mut [T]) -> Vec<usize> {
    let mut changed = Vec::new();
    let mut previous = 0;
    for (index, item) in items.iter_mut().enumerate() {
        let order = item.order();
        if order <= 0 || order <= previous {
            previous += ORDER_GAP;
            item.set_order(previous);
            changed.push(index);
        } else {
            previous = order;
        }
    }
    changed
}

/// Order strictly between two neighbours, or `None` when they leave no room.
///
/// A missing predecessor counts as 0; a missing successor leaves one full gap.
pub fn insert_between(prev: Option<i64>, next: Option<i64>) -> Option<i64> {
    let low = prev.unwrap_or(0).max(0);
    match next {
        None => Some(low + ORDER_GAP),
        Some(high) => {
            let candidate = low + (high - low).div_euclid(2);
            (candidate > low && candidate < high).then_some(candidate)
        }
    }
}

/// Move one item and assign it a new order.
///
/// Tries a midpoint between the new neighbours first and falls back to a full
/// [`rebalance`]. Returns the indices (after the move) whose order changed; an
/// out-of-range index or `from == to` moves nothing.
pub fn move_item<T: Sequenced>(items: &mut Vec<T>, from: usize, to: usize) -> Vec<usize> {
    if from == to || from >= items.len() || to >= items.len() {
        return Vec::new();
    }

    let item = items.remove(from);
    items.insert(to, item);

    let prev = to.checked_sub(1).map(|i| items[i].order());
    let next = items.get(to + 1).map(Sequenced::order);

    match insert_between(prev, next) {
        Some(order) => {
            items[to].set_order(order);
            vec![to]
        }
        None => rebalance(items),
    }
}

/// True when orders strictly increase in list order and are all set.
pub fn is_strictly_increasing<T: Sequenced>(items: &[T]) -> bool {
    items.first().is_none_or(|first| first.order() > 0)
        && items.windows(2).all(|pair| pair[0].order() < pair[1].order())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(i64);

    impl Sequenced for Item {
        fn order(&self) -> i64 {
            self.0
        }

        fn set_order(&mut self, order: i64) {
            self.0 = order;
        }
    }

    fn items(orders: &[i64]) -> Vec<Item> {
        orders.iter().copied().map(Item).collect()
    }

    fn orders(items: &[Item]) -> Vec<i64> {
        items.iter().map(|i| i.0).collect()
    }

    #[test]
    fn initial_orders_are_spaced_by_gap() {
        assert_eq!(initial_order(0), 10);
        assert_eq!(initial_order(2), 30);
        assert_eq!(append_order(None), 10);
        assert_eq!(append_order(Some(30)), 40);
        assert_eq!(append_order(Some(0)), 10);
    }

    #[test]
    fn rebalance_fills_unset_and_duplicate_orders() {
        let mut list = items(&[0, 0, 15, 15, 3]);
        let changed = rebalance(&mut list);
        assert_eq!(orders(&list), vec![10, 20, 30, 40, 50]);
        assert_eq!(changed, vec![0, 1, 3, 4]);
        assert!(is_strictly_increasing(&list));
    }

    #[test]
    fn rebalance_keeps_valid_orders() {
        let mut list = items(&[5, 7, 100]);
        assert!(rebalance(&mut list).is_empty());
        assert_eq!(orders(&list), vec![5, 7, 100]);
    }

    #[test]
    fn rebalance_is_idempotent() {
        let mut list = items(&[30, 10, 10, 0, 45]);
        rebalance(&mut list);
        let once = orders(&list);
        let changed = rebalance(&mut list);
        assert!(changed.is_empty());
        assert_eq!(orders(&list), once);
    }

    #[test]
    fn insert_between_midpoints() {
        assert_eq!(insert_between(Some(10), Some(20)), Some(15));
        assert_eq!(insert_between(None, Some(10)), Some(5));
        assert_eq!(insert_between(Some(30), None), Some(40));
        assert_eq!(insert_between(None, None), Some(10));
        assert_eq!(insert_between(Some(10), Some(11)), None);
        assert_eq!(insert_between(None, Some(1)), None);
    }

    #[test]
    fn move_last_to_front_takes_half_of_first() {
        let mut list = items(&[10, 20, 30]);
        let changed = move_item(&mut list, 2, 0);
        assert_eq!(orders(&list), vec![5, 10, 20]);
        assert_eq!(changed, vec![0]);
    }

    #[test]
    fn move_first_to_end_appends_one_gap() {
        let mut list = items(&[10, 20, 30]);
        let changed = move_item(&mut list, 0, 2);
        assert_eq!(orders(&list), vec![20, 30, 40]);
        assert_eq!(changed, vec![2]);
    }

    #[test]
    fn move_into_tight_gap_rebalances() {
        let mut list = items(&[10, 11, 12]);
        let changed = move_item(&mut list, 2, 1);
        assert!(is_strictly_increasing(&list));
        assert!(!changed.is_empty());
    }

    #[test]
    fn repeated_moves_to_front_stay_increasing() {
        let mut list = items(&[10, 20, 30, 40, 50]);
        for _ in 0..20 {
            let last = list.len() - 1;
            move_item(&mut list, last, 0);
            assert!(is_strictly_increasing(&list), "{:?}", orders(&list));
        }
    }

    #[test]
    fn move_out_of_range_is_a_no_op() {
        let mut list = items(&[10, 20]);
        assert!(move_item(&mut list, 0, 5).is_empty());
        assert!(move_item(&mut list, 1, 1).is_empty());
        assert_eq!(orders(&list), vec![10, 20]);
    }
}
