//! The in-memory OLT device graph: one fetched snapshot, indexed once.
//!
//! Child discovery derives entirely from `input` back-references, built
//! into a parent → ordered-children index at construction. The authored
//! `outputs` lists stay authoritative for port accounting only; the two
//! sources are compared by [`DeviceGraph::validate`] and disagreements
//! surface as warnings, never silently.

use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::model::{DeviceKind, DeviceNode, NodeKey, Olt, OutputTarget};
use crate::ports::PortSummary;

// ── Consistency report ──────────────────────────────────────────────

/// One outputs-vs-children disagreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMismatch {
    pub parent: NodeKey,
    /// Device-target entries in the authored outputs list.
    pub recorded: usize,
    /// Children discovered through `input` back-references.
    pub discovered: usize,
}

/// Non-fatal inconsistencies found while validating a snapshot.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyReport {
    /// Devices whose `input` is missing or names a nonexistent parent.
    /// They never appear in the tree.
    pub orphans: Vec<NodeKey>,
    pub output_mismatches: Vec<OutputMismatch>,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty() && self.output_mismatches.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.orphans.len() + self.output_mismatches.len()
    }
}

// ── Tree rows ───────────────────────────────────────────────────────

/// One visible row of the flattened tree, in pre-order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub key: NodeKey,
    pub depth: u16,
    pub is_last_child: bool,
    pub has_children: bool,
}

// ── Graph ───────────────────────────────────────────────────────────

/// Immutable snapshot of one OLT and its descendant devices.
///
/// Owned exclusively by the view that fetched it; a refetch replaces the
/// whole graph rather than mutating it.
#[derive(Debug, Clone)]
pub struct DeviceGraph {
    olt: Olt,
    /// All devices in fixed scan order: MS, then FDB, then SUBMS, then X2.
    /// Rendering order is this order, never sorted by name or id.
    devices: Vec<DeviceNode>,
    by_key: HashMap<NodeKey, usize>,
    children: HashMap<NodeKey, Vec<NodeKey>>,
}

impl DeviceGraph {
    /// Build the graph from the root and the four collections.
    ///
    /// `devices` must already be concatenated in scan order (MS, FDB,
    /// SUBMS, X2) — `convert` does this when decoding a backend response.
    pub fn new(olt: Olt, devices: Vec<DeviceNode>) -> Self {
        let mut by_key = HashMap::with_capacity(devices.len());
        for (i, dev) in devices.iter().enumerate() {
            by_key.insert(dev.key(), i);
        }

        let root = olt.key();
        let mut children: HashMap<NodeKey, Vec<NodeKey>> = HashMap::new();
        for dev in &devices {
            let Some(ref input) = dev.input else { continue };
            let parent = input.parent_key();
            if parent != root && !by_key.contains_key(&parent) {
                // Orphan: listed under nothing. validate() reports it.
                continue;
            }
            children.entry(parent).or_default().push(dev.key());
        }

        Self {
            olt,
            devices,
            by_key,
            children,
        }
    }

    pub fn olt(&self) -> &Olt {
        &self.olt
    }

    pub fn root_key(&self) -> NodeKey {
        self.olt.key()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceNode> {
        self.devices.iter()
    }

    /// Look up a device node. The root OLT is not a `DeviceNode`; use
    /// [`Self::olt`] for it.
    pub fn node(&self, key: &NodeKey) -> Option<&DeviceNode> {
        self.by_key.get(key).map(|&i| &self.devices[i])
    }

    /// Children of a node, in scan order (MS, FDB, SUBMS, X2; insertion
    /// order within each kind).
    pub fn children_of(&self, parent: &NodeKey) -> &[NodeKey] {
        self.children.get(parent).map_or(&[], Vec::as_slice)
    }

    /// Port summary for any node, root included.
    pub fn ports_of(&self, key: &NodeKey) -> Option<PortSummary> {
        if *key == self.root_key() {
            return Some(self.olt.ports());
        }
        self.node(key).map(DeviceNode::ports)
    }

    /// Kinds that may be added below `key` right now: the kind's allowed
    /// children, but only when a port is free.
    pub fn addable_kinds(&self, key: &NodeKey) -> &'static [DeviceKind] {
        match self.ports_of(key) {
            Some(ports) if ports.has_free_port() => key.kind.allowed_children(),
            _ => &[],
        }
    }

    // ── Validation ──────────────────────────────────────────────────

    /// Check the snapshot for cycles (fatal) and consistency issues
    /// (reported). Run once at load, before any rendering.
    pub fn validate(&self) -> Result<ConsistencyReport, CoreError> {
        self.check_cycles()?;

        let root = self.root_key();
        let mut report = ConsistencyReport::default();

        for dev in &self.devices {
            let orphaned = match dev.input {
                None => true,
                Some(ref input) => {
                    let parent = input.parent_key();
                    parent != root && !self.by_key.contains_key(&parent)
                }
            };
            if orphaned {
                report.orphans.push(dev.key());
            }
        }

        let mut keys: Vec<NodeKey> = Vec::with_capacity(self.devices.len() + 1);
        keys.push(root);
        keys.extend(self.devices.iter().map(DeviceNode::key));

        for key in keys {
            let recorded = self
                .outputs_of(&key)
                .iter()
                .filter(|o| matches!(o.target, OutputTarget::Device(_)))
                .count();
            let discovered = self.children_of(&key).len();
            if recorded != discovered {
                report.output_mismatches.push(OutputMismatch {
                    parent: key,
                    recorded,
                    discovered,
                });
            }
        }

        if !report.is_clean() {
            tracing::warn!(
                orphans = report.orphans.len(),
                mismatches = report.output_mismatches.len(),
                "graph snapshot has consistency warnings"
            );
        }

        Ok(report)
    }

    fn outputs_of(&self, key: &NodeKey) -> &[crate::model::OutputRef] {
        if *key == self.root_key() {
            &self.olt.outputs
        } else {
            self.node(key).map_or(&[], |n| n.outputs.as_slice())
        }
    }

    /// Each device has at most one parent, so the parent relation is
    /// functional: walk it upward from every device, and any repeat
    /// within one walk is a cycle.
    fn check_cycles(&self) -> Result<(), CoreError> {
        let root = self.root_key();
        let mut safe: HashSet<NodeKey> = HashSet::with_capacity(self.devices.len());

        for dev in &self.devices {
            let mut path: Vec<NodeKey> = Vec::new();
            let mut on_path: HashSet<NodeKey> = HashSet::new();
            let mut current = dev.key();

            loop {
                if current == root || safe.contains(&current) {
                    safe.extend(path.drain(..));
                    break;
                }
                if !on_path.insert(current.clone()) {
                    return Err(CoreError::CyclicTopology {
                        id: current.id.to_string(),
                    });
                }
                path.push(current.clone());

                match self.node(&current).and_then(|n| n.input.as_ref()) {
                    Some(input) => current = input.parent_key(),
                    // Orphan chain — terminates, so it is safe.
                    None => {
                        safe.extend(path.drain(..));
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    // ── Flattening ──────────────────────────────────────────────────

    /// Flatten the tree into visible rows, pre-order from the root.
    ///
    /// A node's children appear only when its key is in `expanded`; the
    /// root row itself is always present. Revisiting a key mid-walk means
    /// the snapshot is cyclic and the walk fails fast instead of
    /// recursing forever.
    pub fn flatten(&self, expanded: &HashSet<NodeKey>) -> Result<Vec<TreeRow>, CoreError> {
        let mut rows: Vec<TreeRow> = Vec::with_capacity(self.devices.len() + 1);
        let mut visited: HashSet<NodeKey> = HashSet::with_capacity(self.devices.len() + 1);
        let mut stack: Vec<(NodeKey, u16)> = vec![(self.root_key(), 0)];

        while let Some((key, depth)) = stack.pop() {
            if !visited.insert(key.clone()) {
                return Err(CoreError::CyclicTopology {
                    id: key.id.to_string(),
                });
            }

            let kids = self.children_of(&key);
            rows.push(TreeRow {
                key: key.clone(),
                depth,
                is_last_child: false, // computed below
                has_children: !kids.is_empty(),
            });

            if expanded.contains(&key) {
                for kid in kids.iter().rev() {
                    stack.push((kid.clone(), depth + 1));
                }
            }
        }

        // is_last_child from the flat list: a row is last among its
        // siblings when no later row shares its depth before the walk
        // pops back above it.
        let len = rows.len();
        for i in 0..len {
            let d = rows[i].depth;
            let mut is_last = true;
            for row in &rows[i + 1..] {
                if row.depth == d {
                    is_last = false;
                    break;
                }
                if row.depth < d {
                    break;
                }
            }
            rows[i].is_last_child = is_last;
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Capacity, DeviceId, GeoPoint, InputRef, OltStatus, OutputRef, PowerState};
    use pretty_assertions::assert_eq;

    fn olt(id: &str, power: u32, outputs: usize) -> Olt {
        Olt {
            id: DeviceId::from(id),
            name: Some("Test OLT".to_owned()),
            ip: None,
            mac: None,
            serial: None,
            location: Some(GeoPoint {
                latitude: 26.9,
                longitude: 75.8,
            }),
            capacity: Capacity::Ports(power),
            status: OltStatus::Active,
            power: PowerState::On,
            outputs: device_outputs(outputs),
            owned_by: None,
        }
    }

    fn device_outputs(n: usize) -> Vec<OutputRef> {
        (0..n)
            .map(|i| OutputRef {
                target: OutputTarget::Device(DeviceKind::Fdb),
                id: format!("OUT{i}"),
                description: None,
            })
            .collect()
    }

    fn node(
        kind: DeviceKind,
        id: &str,
        capacity: Capacity,
        parent: Option<(DeviceKind, &str)>,
        outputs: usize,
    ) -> DeviceNode {
        DeviceNode {
            kind,
            id: DeviceId::from(id),
            name: Some(format!("{id} name")),
            capacity,
            location: None,
            input: parent.map(|(k, pid)| InputRef {
                kind: k,
                id: DeviceId::from(pid),
                port: None,
            }),
            outputs: device_outputs(outputs),
            attachments: Vec::new(),
        }
    }

    fn key(kind: DeviceKind, id: &str) -> NodeKey {
        NodeKey::new(kind, id)
    }

    /// OLT1 → MS1 → FDB1, the canonical two-level example.
    fn two_level_graph() -> DeviceGraph {
        let ms = node(
            DeviceKind::Ms,
            "MS1",
            Capacity::Split("1x4".to_owned()),
            Some((DeviceKind::Olt, "OLT1")),
            1,
        );
        let fdb = node(
            DeviceKind::Fdb,
            "FDB1",
            Capacity::Ports(8),
            Some((DeviceKind::Ms, "MS1")),
            0,
        );
        DeviceGraph::new(olt("OLT1", 8, 1), vec![ms, fdb])
    }

    #[test]
    fn child_discovery_follows_input_refs() {
        let graph = two_level_graph();

        assert_eq!(
            graph.children_of(&key(DeviceKind::Olt, "OLT1")),
            &[key(DeviceKind::Ms, "MS1")]
        );
        assert_eq!(
            graph.children_of(&key(DeviceKind::Ms, "MS1")),
            &[key(DeviceKind::Fdb, "FDB1")]
        );
        assert!(graph.children_of(&key(DeviceKind::Fdb, "FDB1")).is_empty());
    }

    #[test]
    fn children_keep_scan_order_across_kinds() {
        // Two FDBs and one MS under the root, fed in scan order
        // (MS first, then FDB). Insertion order must survive.
        let ms = node(
            DeviceKind::Ms,
            "MS9",
            Capacity::Split("1x4".to_owned()),
            Some((DeviceKind::Olt, "OLT1")),
            0,
        );
        let fdb_b = node(
            DeviceKind::Fdb,
            "FDB-B",
            Capacity::Ports(4),
            Some((DeviceKind::Olt, "OLT1")),
            0,
        );
        let fdb_a = node(
            DeviceKind::Fdb,
            "FDB-A",
            Capacity::Ports(4),
            Some((DeviceKind::Olt, "OLT1")),
            0,
        );
        let graph = DeviceGraph::new(olt("OLT1", 8, 3), vec![ms, fdb_b, fdb_a]);

        // MS before FDBs, and FDB-B before FDB-A (not name-sorted).
        assert_eq!(
            graph.children_of(&key(DeviceKind::Olt, "OLT1")),
            &[
                key(DeviceKind::Ms, "MS9"),
                key(DeviceKind::Fdb, "FDB-B"),
                key(DeviceKind::Fdb, "FDB-A"),
            ]
        );
    }

    #[test]
    fn flatten_collapsed_shows_root_only() {
        let graph = two_level_graph();
        let rows = graph.flatten(&HashSet::new()).expect("flatten");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, key(DeviceKind::Olt, "OLT1"));
        assert_eq!(rows[0].depth, 0);
        assert!(rows[0].has_children);
    }

    #[test]
    fn flatten_expands_only_requested_nodes() {
        let graph = two_level_graph();
        let mut expanded = HashSet::new();
        expanded.insert(key(DeviceKind::Olt, "OLT1"));

        let rows = graph.flatten(&expanded).expect("flatten");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].key, key(DeviceKind::Ms, "MS1"));
        assert_eq!(rows[1].depth, 1);
        assert!(rows[1].is_last_child);
        assert!(rows[1].has_children);

        expanded.insert(key(DeviceKind::Ms, "MS1"));
        let rows = graph.flatten(&expanded).expect("flatten");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].key, key(DeviceKind::Fdb, "FDB1"));
        assert_eq!(rows[2].depth, 2);
    }

    #[test]
    fn expansion_toggle_is_idempotent() {
        let graph = two_level_graph();
        let mut expanded: HashSet<NodeKey> = HashSet::new();
        let before = graph.flatten(&expanded).expect("flatten");

        // Toggle on, then off — O(1) set ops, no graph mutation.
        let root = key(DeviceKind::Olt, "OLT1");
        expanded.insert(root.clone());
        assert_eq!(graph.flatten(&expanded).expect("flatten").len(), 2);
        expanded.remove(&root);

        let after = graph.flatten(&expanded).expect("flatten");
        assert_eq!(before, after);
        assert_eq!(graph.device_count(), 2);
    }

    #[test]
    fn cyclic_topology_is_a_hard_error() {
        // FDB1 and FDB2 claim each other as parent.
        let a = node(
            DeviceKind::Fdb,
            "FDB1",
            Capacity::Ports(4),
            Some((DeviceKind::Fdb, "FDB2")),
            0,
        );
        let b = node(
            DeviceKind::Fdb,
            "FDB2",
            Capacity::Ports(4),
            Some((DeviceKind::Fdb, "FDB1")),
            0,
        );
        let graph = DeviceGraph::new(olt("OLT1", 8, 0), vec![a, b]);

        let err = graph.validate().expect_err("cycle must fail validation");
        assert!(matches!(err, CoreError::CyclicTopology { .. }));
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let a = node(
            DeviceKind::Fdb,
            "FDB1",
            Capacity::Ports(4),
            Some((DeviceKind::Fdb, "FDB1")),
            0,
        );
        let graph = DeviceGraph::new(olt("OLT1", 8, 0), vec![a]);

        let err = graph.validate().expect_err("self-cycle must fail");
        match err {
            CoreError::CyclicTopology { id } => assert_eq!(id, "FDB1"),
            other => panic!("expected CyclicTopology, got {other}"),
        }
    }

    #[test]
    fn orphans_are_reported_not_fatal() {
        let orphan = node(
            DeviceKind::Fdb,
            "FDB-LOST",
            Capacity::Ports(4),
            Some((DeviceKind::Ms, "MS-MISSING")),
            0,
        );
        let graph = DeviceGraph::new(olt("OLT1", 8, 0), vec![orphan]);

        let report = graph.validate().expect("orphans are non-fatal");
        assert_eq!(report.orphans, vec![key(DeviceKind::Fdb, "FDB-LOST")]);
        assert!(!report.is_clean());

        // Orphans never render.
        let mut expanded = HashSet::new();
        expanded.insert(key(DeviceKind::Olt, "OLT1"));
        assert_eq!(graph.flatten(&expanded).expect("flatten").len(), 1);
    }

    #[test]
    fn output_mismatch_is_reported() {
        // OLT records zero device outputs but one child claims it.
        let ms = node(
            DeviceKind::Ms,
            "MS1",
            Capacity::Split("1x4".to_owned()),
            Some((DeviceKind::Olt, "OLT1")),
            0,
        );
        let graph = DeviceGraph::new(olt("OLT1", 8, 0), vec![ms]);

        let report = graph.validate().expect("validate");
        assert_eq!(report.output_mismatches.len(), 1);
        let mismatch = &report.output_mismatches[0];
        assert_eq!(mismatch.parent, key(DeviceKind::Olt, "OLT1"));
        assert_eq!(mismatch.recorded, 0);
        assert_eq!(mismatch.discovered, 1);
    }

    #[test]
    fn end_to_end_port_accounting() {
        // OLT power 8 with one MS consuming one output: 1/8, 7 free.
        // The MS is a 1x4 splitter with all four outputs in use: 4/4, 0 free.
        let ms = DeviceNode {
            outputs: (0..4)
                .map(|i| OutputRef {
                    target: OutputTarget::User,
                    id: format!("CUST{i}"),
                    description: None,
                })
                .collect(),
            ..node(
                DeviceKind::Ms,
                "MS1",
                Capacity::Split("1x4".to_owned()),
                Some((DeviceKind::Olt, "OLT1")),
                0,
            )
        };
        let root = Olt {
            outputs: vec![OutputRef {
                target: OutputTarget::Device(DeviceKind::Ms),
                id: "MS1".to_owned(),
                description: None,
            }],
            ..olt("OLT1", 8, 0)
        };
        let graph = DeviceGraph::new(root, vec![ms]);

        let olt_ports = graph.ports_of(&key(DeviceKind::Olt, "OLT1")).expect("olt");
        assert_eq!(olt_ports.usage_label(), "1/8");
        assert_eq!(olt_ports.available, 7);
        assert!(!graph.addable_kinds(&key(DeviceKind::Olt, "OLT1")).is_empty());

        let ms_ports = graph.ports_of(&key(DeviceKind::Ms, "MS1")).expect("ms");
        assert_eq!(ms_ports.usage_label(), "4/4");
        assert_eq!(ms_ports.available, 0);
        // Full parent offers no add affordance.
        assert!(graph.addable_kinds(&key(DeviceKind::Ms, "MS1")).is_empty());
    }

    #[test]
    fn x2_offers_no_add_affordance_even_with_free_ports() {
        let x2 = node(
            DeviceKind::X2,
            "X2-1",
            Capacity::Ports(2),
            Some((DeviceKind::Olt, "OLT1")),
            0,
        );
        let graph = DeviceGraph::new(olt("OLT1", 8, 1), vec![x2]);

        assert!(graph.addable_kinds(&key(DeviceKind::X2, "X2-1")).is_empty());
    }
}
