//! Generic impl blocks cannot be described.

use dynamic_props::dynamic_property_sources;

struct Tests;

#[dynamic_property_sources]
impl<T> Tests {}

fn main() {
    let _ = Tests;
}
