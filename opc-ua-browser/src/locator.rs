use crate::inventory::Inventory;
use opc_ua_client::NodeHandle;

/// Find a node by display name.
///
/// Linear scan across all buckets in the fixed tag order, then discovery
/// order within a bucket; ASCII-case-insensitive exact match. When several
/// nodes share a display name the first encountered wins; ambiguity is not
/// detected or reported.
pub fn find_by_name<'a>(inventory: &'a Inventory, name: &str) -> Option<&'a NodeHandle> {
    inventory
        .handles()
        .find(|handle| handle.display_name.eq_ignore_ascii_case(name))
}

/// Recover the bare display name from a rendered list entry of the form
/// `"<name>: <value>"`. Text without a separator passes through unchanged.
pub fn display_name_of_entry(entry: &str) -> &str {
    match entry.split_once(':') {
        Some((name, _)) => name.trim(),
        None => entry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TypeTag;
    use opc_ua_client::NodeClass;

    fn sample_inventory() -> Inventory {
        let mut inventory = Inventory::new();
        inventory.insert(
            &TypeTag::Boolean,
            NodeHandle::new("ns=2;s=Running", "Running", NodeClass::Variable),
        );
        inventory.insert(
            &TypeTag::Int32,
            NodeHandle::new("ns=2;s=MotorSpeed", "MotorSpeed", NodeClass::Variable),
        );
        inventory.insert(
            &TypeTag::String,
            NodeHandle::new("ns=2;s=Label", "Label", NodeClass::Variable),
        );
        inventory
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let inventory = sample_inventory();
        let found = find_by_name(&inventory, "motorspeed").unwrap();
        assert_eq!(found.node_id.as_str(), "ns=2;s=MotorSpeed");
        assert_eq!(found.display_name, "MotorSpeed");
    }

    #[test]
    fn test_find_misses_report_none() {
        let inventory = sample_inventory();
        assert!(find_by_name(&inventory, "NoSuchNode").is_none());
        assert!(find_by_name(&Inventory::new(), "MotorSpeed").is_none());
    }

    #[test]
    fn test_duplicate_names_resolve_to_first_bucket_hit() {
        let mut inventory = Inventory::new();
        // Same display name under two tags: Boolean bucket precedes Int32
        // in tag order, so it wins regardless of insertion sequence.
        inventory.insert(
            &TypeTag::Int32,
            NodeHandle::new("ns=2;s=Dup.Int", "Setpoint", NodeClass::Variable),
        );
        inventory.insert(
            &TypeTag::Boolean,
            NodeHandle::new("ns=2;s=Dup.Bool", "Setpoint", NodeClass::Variable),
        );
        let found = find_by_name(&inventory, "setpoint").unwrap();
        assert_eq!(found.node_id.as_str(), "ns=2;s=Dup.Bool");
    }

    #[test]
    fn test_display_name_of_entry() {
        assert_eq!(display_name_of_entry("MotorSpeed: 120"), "MotorSpeed");
        assert_eq!(display_name_of_entry("Temps: Array (3 items)"), "Temps");
        assert_eq!(display_name_of_entry("BareName"), "BareName");
    }
}
