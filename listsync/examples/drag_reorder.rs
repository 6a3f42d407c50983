use listsync::{MemoryStore, OrderMaintainer, OrderOptions, PositionStore, diff};

fn main() {
    // Example: a reorderable list persisted with sparse position keys.
    //
    // Each move rewrites one position; the list view only ever sees the diff between the
    // identity order before and after.
    let store = MemoryStore::from_ids(["milk", "eggs", "bread", "tea", "rice"], 100)
        .expect("ids are unique");
    let mut order =
        OrderMaintainer::new(store, OrderOptions::new()).expect("default gap is positive");

    let mut shown = order.store().identities().expect("in-memory reads do not fail");
    println!("initial: {shown:?}");

    // Drag "bread" behind "rice".
    order
        .move_to_after(&"bread", &"rice")
        .expect("both records exist");
    let now = order.store().identities().expect("in-memory reads do not fail");
    println!(
        "bread -> end: {now:?} ops={:?} pos={:?}",
        diff(&shown, &now),
        order.store().position_of(&"bread")
    );
    shown = now;

    // Keep bisecting the front slot until the gap runs out; the maintainer renumbers once.
    let mut right = "milk";
    for id in ["eggs", "tea", "rice", "bread"] {
        order
            .move_to_between(&id, None, Some(&right))
            .expect("moving to the front never collides");
        right = id;
    }
    let now = order.store().identities().expect("in-memory reads do not fail");
    println!("reversed: {now:?} ops={:?}", diff(&shown, &now));

    for _ in 0..8 {
        order
            .move_to_between(&"tea", Some(&"rice"), Some(&"eggs"))
            .expect("rebalance makes room");
        order
            .swap_adjacent(&"rice", &"tea")
            .expect("both records exist");
    }
    println!(
        "after churn: {:?} rebalances={}",
        order.store().identities().expect("in-memory reads do not fail"),
        order.rebalance_count()
    );
}
