//! Port accounting — total / active / available for any node.
//!
//! Pure derivation over a declared capacity and an authored outputs list;
//! callable at arbitrary nesting depth.

use crate::model::{Capacity, DeviceNode, Olt, OutputRef};

/// Port usage summary for one node.
///
/// `available` is signed and never clamped: a negative value means the
/// outputs list exceeds declared capacity (over-provisioned). Creation
/// flows reject new children on such nodes; views render it as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSummary {
    pub total: u32,
    pub active: u32,
    pub available: i64,
}

impl PortSummary {
    /// Derive a summary from a capacity and outputs list.
    pub fn derive(capacity: &Capacity, outputs: &[OutputRef]) -> Self {
        let total = capacity.total();
        let active = u32::try_from(outputs.len()).unwrap_or(u32::MAX);
        Self {
            total,
            active,
            available: i64::from(total) - i64::from(active),
        }
    }

    /// More recorded connections than declared ports.
    pub fn is_over_provisioned(self) -> bool {
        self.available < 0
    }

    /// At least one port free for a new child.
    pub fn has_free_port(self) -> bool {
        self.available > 0
    }

    /// Compact `active/total` usage label.
    pub fn usage_label(self) -> String {
        format!("{}/{}", self.active, self.total)
    }
}

impl DeviceNode {
    pub fn ports(&self) -> PortSummary {
        PortSummary::derive(&self.capacity, &self.outputs)
    }
}

impl Olt {
    pub fn ports(&self) -> PortSummary {
        PortSummary::derive(&self.capacity, &self.outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutputTarget;
    use pretty_assertions::assert_eq;

    fn outputs(n: usize) -> Vec<OutputRef> {
        (0..n)
            .map(|i| OutputRef {
                target: OutputTarget::User,
                id: format!("U{i}"),
                description: None,
            })
            .collect()
    }

    #[test]
    fn split_capacity_yields_total() {
        let s = PortSummary::derive(&Capacity::Split("1x8".to_owned()), &[]);
        assert_eq!(s.total, 8);
        assert_eq!(s.active, 0);
        assert_eq!(s.available, 8);
    }

    #[test]
    fn malformed_split_yields_zero_total() {
        let s = PortSummary::derive(&Capacity::Split("bogus".to_owned()), &outputs(2));
        assert_eq!(s.total, 0);
        assert_eq!(s.active, 2);
        assert_eq!(s.available, -2);
        assert!(s.is_over_provisioned());
    }

    #[test]
    fn undeclared_capacity_yields_zero_total() {
        let s = PortSummary::derive(&Capacity::Undeclared, &[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.available, 0);
        assert!(!s.has_free_port());
    }

    #[test]
    fn available_goes_negative_without_clamping() {
        let s = PortSummary::derive(&Capacity::Ports(4), &outputs(6));
        assert_eq!(s.available, -2);
        assert!(s.is_over_provisioned());
        assert!(!s.has_free_port());
    }

    #[test]
    fn exactly_full_is_not_over_provisioned() {
        let s = PortSummary::derive(&Capacity::Ports(4), &outputs(4));
        assert_eq!(s.available, 0);
        assert!(!s.is_over_provisioned());
        assert!(!s.has_free_port());
    }

    #[test]
    fn usage_label_reads_active_over_total() {
        let s = PortSummary::derive(&Capacity::Ports(8), &outputs(1));
        assert_eq!(s.usage_label(), "1/8");
    }
}
