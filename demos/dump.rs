//! Builds a small map, removes one entry through a cursor and prints the tree shape.
//!
//! Run with `RUST_LOG=avlmap=trace` to see rotations as they happen.

use avlmap::AvlTreeMap;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "avlmap=info".into()))
        .init();

    let mut map = AvlTreeMap::from_pair(5, String::from("hello"));
    for (key, value) in [
        (3, "bye"),
        (6, "me"),
        (4, "you"),
        (12, "ok"),
        (9, "micky"),
        (7, "john"),
        (10, "jimmy"),
        (15, "russel"),
        (16, "joe"),
        (17, "magnus"),
    ] {
        map.insert(key, value.to_string());
    }

    if map.contains_key(&12) {
        let mut cursor = map.find_mut(&15);
        if let Some((key, value)) = cursor.remove_current() {
            println!("removed {key} : {value}");
        }
    }

    print!("{map}");
}
