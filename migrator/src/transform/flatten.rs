//! Flatten a v3 resource tree into its data leaves.
//!
//! ```text
//! HERITAGE_RESOURCE.E18                    flat fields (in order)
//! ├── NAMES.E41 (structural)               ─────────────────────
//! │   ├── NAME.E41 = "Old Mill"        →   NAME.E41  = "Old Mill"
//! │   └── NAME_TYPE.E55 = "Primary"    →   NAME_TYPE.E55 = "Primary"
//! └── PLACE.E53 (structural)
//!     └── ADDRESS.E45 = "1 Mill Lane"  →   TOWN.E44 = "Bath"   (child first)
//!         └── TOWN.E44 = "Bath"        →   ADDRESS.E45 = "1 Mill Lane"
//! ```
//!
//! Depth-first; a node's children are emitted before the node itself.
//! Structural nodes (no business table) emit nothing but are still walked.

use crate::models::{ChildEntity, FlatField, SourceResource};

/// All data leaves of a resource, children before parents.
pub fn flatten(resource: &SourceResource) -> Vec<FlatField> {
    let mut fields = Vec::new();
    visit(&resource.children, &mut fields);
    fields
}

fn visit(nodes: &[ChildEntity], out: &mut Vec<FlatField>) {
    for node in nodes {
        visit(&node.children, out);
        if !node.is_structural() {
            out.push(FlatField {
                old_id: node.entity_type_id.clone(),
                value: node.value.clone(),
            });
        }
    }
}
