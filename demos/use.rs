use avlmap::{AvlTreeMap, ReverseOrder};

fn main() {
    let mut map = AvlTreeMap::new();
    map.insert(0, "zero");
    map.insert(1, "one");
    map.insert(2, "two");
    map.insert(2, "deux");
    map.insert(3, "three");
    map.insert(4, "four");
    map.insert(5, "five");
    assert_eq!(map.get(&1), Some(&"one"));
    assert_eq!(map.get(&2), Some(&"two"));
    map.remove(&1);
    assert!(map.get(&1).is_none());

    for (k, v) in &map {
        println!("{k} => {v}");
    }

    // Remove every even key while walking the map
    let mut cursor = map.cursor_front_mut();
    while let Some(key) = cursor.key().copied() {
        if key % 2 == 0 {
            cursor.remove_current();
        } else {
            cursor.move_next();
        }
    }
    println!("{:?}", map);

    let mut descending = AvlTreeMap::with_comparator(ReverseOrder);
    descending.extend((0..5).map(|x| (x, x * x)));
    print!("{{ ");
    for (k, v) in &descending {
        print!("{k}: {v}, ");
    }
    println!("}}");

    match map.at(&42) {
        Ok(value) => println!("42 => {value}"),
        Err(err) => println!("42: {err}"),
    }
}
