use recency::{
    DoublyLinkedList,
    Error,
    Matrix,
    MatrixCache,
};
use tracing_subscriber::EnvFilter;

fn show(label: &str, list: &DoublyLinkedList<i32>) {
    let items: Vec<_> = list.iter().map(i32::to_string).collect();
    println!("{label:>14}: {}", items.join(""));
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut list = DoublyLinkedList::new();
    list.insert_tail(3);
    list.insert_tail(4);
    list.insert_head(5);
    list.insert_head(6);
    show("inserted", &list);

    list.delete_head();
    list.delete_tail();
    show("trimmed", &list);

    list.insert_tail(4);
    list.insert_tail(6);
    show("refilled", &list);

    let three = list.next(list.begin())?;
    let after = list.erase(three)?;
    show("erased 3", &list);
    println!("{:>14}: {}", "now at", list.get(after)?);

    let six = list.next(after)?;
    list.erase(six)?;
    show("erased 6", &list);

    let mut cache = MatrixCache::try_new(2)?;
    cache.put(1, Matrix::identity(2));
    cache.put(2, Matrix::from_rows(vec![vec![1, 2, 3]])?);
    cache.get(&1);
    if let Some((key, _)) = cache.put(3, Matrix::new(1, 1)) {
        println!("evicted matrix {key}");
    }
    cache.print();

    Ok(())
}
