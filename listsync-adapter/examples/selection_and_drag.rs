use listsync::{MemoryStore, OrderMaintainer, OrderOptions};
use listsync_adapter::ListAdapter;

fn main() {
    // Example: an adapter keeps the on-screen snapshot and turns store changes into display
    // operations.
    let store = MemoryStore::from_ids(1u32..=6, 100).expect("ids are unique");
    let mut order =
        OrderMaintainer::new(store, OrderOptions::new()).expect("default gap is positive");

    let mut list = ListAdapter::default();
    println!("load: {:?}", list.sync_from(order.store()));

    // Shift-click style multi-selection.
    println!("select 1: {:?}", list.set_selected(true, 1));
    println!("extend to 4: {:?}", list.extend_selection_to(4));
    let saved = list.selection_state();
    println!("saved selection: {saved:?}");

    // A drag from row 5 to row 2. The change notification clears the selection and reports
    // the move.
    list.on_move(&mut order, 5, 2).expect("rows are on screen");
    println!("after drag: {:?}", list.sync_from(order.store()));
    println!("ids: {:?} selected={}", list.ids(), list.selected_count());

    println!("restore: {:?}", list.restore_selection_state(&saved));
    println!("close: {:?}", list.close());
}
