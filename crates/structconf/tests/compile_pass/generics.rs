//! Generic records with bounded members.

use structconf::{Discover, Settable};

#[derive(Settable, Default)]
pub struct Wrapper<T: Discover> {
    #[conf("env:WRAPPER_NAME")]
    pub name: String,
    pub inner: T,
}

#[derive(Settable, Default)]
pub struct Leaf {
    #[conf("default:1")]
    pub level: u8,
}

fn main() {
    let mut wrapper = Wrapper::<Leaf>::default();
    let fields = structconf::settable_fields(&mut wrapper).unwrap();
    assert_eq!(fields.len(), 2);
}
