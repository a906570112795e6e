//! Only inherent impl blocks can be described.

use dynamic_props::dynamic_property_sources;

struct Tests;

#[dynamic_property_sources]
impl Default for Tests {
    fn default() -> Self {
        Self
    }
}

fn main() {
    let _ = Tests;
}
