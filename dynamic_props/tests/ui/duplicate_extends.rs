//! `extends` may only be given once.

use dynamic_props::dynamic_property_sources;

struct Child;

#[dynamic_property_sources(extends = Child, extends = Child)]
impl Child {}

fn main() {
    let _ = Child;
}
