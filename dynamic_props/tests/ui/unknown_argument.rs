//! Only `extends` is accepted as an argument.

use dynamic_props::dynamic_property_sources;

struct Child;

#[dynamic_property_sources(parent = Child)]
impl Child {}

fn main() {
    let _ = Child;
}
