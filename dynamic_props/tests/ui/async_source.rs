//! Marked functions must be callable through a plain function pointer.

use dynamic_props::dynamic_property_sources;

struct Tests;

#[dynamic_property_sources]
impl Tests {
    #[dynamic_property_source]
    async fn properties(_values: &mut dyn dynamic_props::DynamicPropertyRegistry) {}
}

fn main() {
    let _ = Tests;
}
