//! Locates marked methods across a class chain.

use std::collections::HashMap;

use crate::{ClassDescriptor, MethodDescriptor, MethodSignature};

/// Collect every marked method visible from `class`.
///
/// Methods are visited root class first. A method whose signature matches
/// one declared by an ancestor takes over the ancestor's slot, and the slot
/// counts as marked when either declaration carries the marker. Each
/// signature is therefore reported at most once.
#[must_use]
pub fn find_marked_methods(class: &ClassDescriptor) -> Vec<MethodDescriptor> {
    let mut slots: Vec<(&MethodDescriptor, bool)> = Vec::new();
    let mut by_signature: HashMap<&MethodSignature, usize> = HashMap::new();

    for ancestor in class.ancestry() {
        for method in ancestor.methods() {
            if let Some(slot) = by_signature
                .get(method.signature())
                .and_then(|&position| slots.get_mut(position))
            {
                slot.1 |= method.is_marked();
                slot.0 = method;
            } else {
                by_signature.insert(method.signature(), slots.len());
                slots.push((method, method.is_marked()));
            }
        }
    }

    let found: Vec<MethodDescriptor> = slots
        .into_iter()
        .filter(|&(_, marked)| marked)
        .map(|(method, _)| method.clone())
        .collect();
    tracing::debug!(
        class = class.name(),
        count = found.len(),
        "discovered dynamic property source methods"
    );
    found
}
