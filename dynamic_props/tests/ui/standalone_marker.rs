//! The marker reports an error outside a `#[dynamic_property_sources]` block.

use dynamic_props::dynamic_property_source;

#[dynamic_property_source]
fn properties() {}

fn main() {
    properties();
}
