//! Roadmap progress and node unlock rules.
//!
//! A user's progress on a roadmap is a flat list of [`NodeProgress`] entries.
//! Everything else (node lock state, overall percentage) is derived from that
//! list and the roadmap's node outlines by a full scan. Roadmaps have a few
//! dozen nodes at most, so nothing here is incremental.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::percentage;

/// Status of a node for a given user.
///
/// `Locked` is only ever derived for display; it is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStatus {
    Locked,
    Unlocked,
    InProgress,
    Completed,
}

impl NodeStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

/// Persisted progress for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProgress {
    pub node_id: String,
    pub status: NodeStatus,
    #[serde(default)]
    pub completed_subtopics: Vec<String>,
}

/// The parts of a roadmap node that progress computation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutline {
    pub id: String,
    pub prerequisites: Vec<String>,
    pub subtopic_ids: Vec<String>,
}

/// A node's status as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub node_id: String,
    pub status: NodeStatus,
    pub completed_subtopics: Vec<String>,
    pub total_subtopics: usize,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProgressError {
    #[error("Node '{0}' is locked until its prerequisites are completed")]
    NodeLocked(String),
    #[error("Subtopic '{subtopic}' does not belong to node '{node}'")]
    UnknownSubtopic { node: String, subtopic: String },
}

fn find<'a>(progress: &'a [NodeProgress], node_id: &str) -> Option<&'a NodeProgress> {
    progress.iter().find(|p| p.node_id == node_id)
}

/// Stored status of a node, if the user has touched it.
pub fn stored_status(progress: &[NodeProgress], node_id: &str) -> Option<NodeStatus> {
    find(progress, node_id).map(|p| p.status)
}

/// A node is unlocked when every prerequisite node is completed.
pub fn is_node_unlocked(node: &NodeOutline, progress: &[NodeProgress]) -> bool {
    node.prerequisites
        .iter()
        .all(|prereq| stored_status(progress, prereq) == Some(NodeStatus::Completed))
}

/// Completed subtopics of `node`, ignoring ids that are no longer part of it.
fn completed_in(node: &NodeOutline, progress: &[NodeProgress]) -> Vec<String> {
    let Some(entry) = find(progress, &node.id) else {
        return Vec::new();
    };
    node.subtopic_ids
        .iter()
        .filter(|id| entry.completed_subtopics.contains(id))
        .cloned()
        .collect()
}

/// Status implied by how many of a node's subtopics are done.
pub fn derive_status(completed: usize, total: usize) -> NodeStatus {
    if total > 0 && completed >= total {
        NodeStatus::Completed
    } else if completed > 0 {
        NodeStatus::InProgress
    } else {
        NodeStatus::Unlocked
    }
}

/// `round(completed subtopics / total subtopics * 100)` across the roadmap.
pub fn overall_progress(nodes: &[NodeOutline], progress: &[NodeProgress]) -> i32 {
    let total: usize = nodes.iter().map(|n| n.subtopic_ids.len()).sum();
    let completed: usize = nodes.iter().map(|n| completed_in(n, progress).len()).sum();
    percentage(completed as i32, total as i32)
}

/// Whether a roadmap percentage means the roadmap is finished.
pub const fn is_complete(overall: i32) -> bool {
    overall >= 100
}

fn entry_mut<'a>(progress: &'a mut Vec<NodeProgress>, node_id: &str) -> &'a mut NodeProgress {
    let index = match progress.iter().position(|p| p.node_id == node_id) {
        Some(index) => index,
        None => {
            progress.push(NodeProgress {
                node_id: node_id.to_owned(),
                status: NodeStatus::Unlocked,
                completed_subtopics: Vec::new(),
            });
            progress.len() - 1
        }
    };
    &mut progress[index]
}

fn ensure_unlocked(node: &NodeOutline, progress: &[NodeProgress]) -> Result<(), ProgressError> {
    // Work already recorded on a node stays editable even if a prerequisite was reopened
    let has_work = find(progress, &node.id).is_some_and(|p| !p.completed_subtopics.is_empty());
    if has_work || is_node_unlocked(node, progress) {
        Ok(())
    } else {
        Err(ProgressError::NodeLocked(node.id.clone()))
    }
}

/// Mark a single subtopic as done or not done and re-derive the node status.
pub fn set_subtopic(
    progress: &mut Vec<NodeProgress>,
    node: &NodeOutline,
    subtopic_id: &str,
    completed: bool,
) -> Result<NodeStatus, ProgressError> {
    if !node.subtopic_ids.iter().any(|s| s == subtopic_id) {
        return Err(ProgressError::UnknownSubtopic {
            node: node.id.clone(),
            subtopic: subtopic_id.to_owned(),
        });
    }
    ensure_unlocked(node, progress)?;

    let entry = entry_mut(progress, &node.id);
    let already = entry.completed_subtopics.iter().any(|s| s == subtopic_id);
    if completed && !already {
        entry.completed_subtopics.push(subtopic_id.to_owned());
    } else if !completed && already {
        entry.completed_subtopics.retain(|s| s != subtopic_id);
    }

    let done = node
        .subtopic_ids
        .iter()
        .filter(|id| entry.completed_subtopics.contains(id))
        .count();
    entry.status = derive_status(done, node.subtopic_ids.len());
    Ok(entry.status)
}

/// Mark every subtopic of a node as done, or clear them all.
///
/// A node without subtopics can still be completed explicitly.
pub fn set_node_completed(
    progress: &mut Vec<NodeProgress>,
    node: &NodeOutline,
    completed: bool,
) -> Result<NodeStatus, ProgressError> {
    ensure_unlocked(node, progress)?;

    let entry = entry_mut(progress, &node.id);
    if completed {
        entry.completed_subtopics = node.subtopic_ids.clone();
        entry.status = NodeStatus::Completed;
    } else {
        entry.completed_subtopics.clear();
        entry.status = NodeStatus::Unlocked;
    }
    Ok(entry.status)
}

/// Status of every node, including the derived `Locked` state.
pub fn node_views(nodes: &[NodeOutline], progress: &[NodeProgress]) -> Vec<NodeView> {
    nodes
        .iter()
        .map(|node| {
            let completed = completed_in(node, progress);
            let status = match stored_status(progress, &node.id) {
                Some(status) if !completed.is_empty() || status == NodeStatus::Completed => status,
                _ if is_node_unlocked(node, progress) => NodeStatus::Unlocked,
                _ => NodeStatus::Locked,
            };
            NodeView {
                node_id: node.id.clone(),
                status,
                completed_subtopics: completed,
                total_subtopics: node.subtopic_ids.len(),
            }
        })
        .collect()
}

/// Node ids that are not part of the roadmap any more.
pub fn orphaned_nodes(nodes: &[NodeOutline], progress: &[NodeProgress]) -> Vec<String> {
    let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    progress
        .iter()
        .filter(|p| !known.contains(p.node_id.as_str()))
        .map(|p| p.node_id.clone())
        .collect()
}

/// Move a node's progress entry to its new id.
///
/// Returns `false` when there was nothing to move.
pub fn rename_node(progress: &mut Vec<NodeProgress>, old_id: &str, new_id: &str) -> bool {
    if old_id == new_id || find(progress, old_id).is_none() {
        return false;
    }
    progress.retain(|p| p.node_id != new_id);
    if let Some(entry) = progress.iter_mut().find(|p| p.node_id == old_id) {
        entry.node_id = new_id.to_string();
    }
    true
}

/// Bring stored progress in line with the roadmap's current nodes.
///
/// Entries for removed nodes are dropped, subtopics a node no longer has are
/// forgotten and every status is derived again. Returns whether anything
/// changed.
pub fn reconcile(nodes: &[NodeOutline], progress: &mut Vec<NodeProgress>) -> bool {
    let orphaned = orphaned_nodes(nodes, progress);
    let mut changed = !orphaned.is_empty();
    progress.retain(|p| !orphaned.contains(&p.node_id));

    for entry in progress.iter_mut() {
        let Some(node) = nodes.iter().find(|n| n.id == entry.node_id) else {
            continue;
        };
        let before = entry.completed_subtopics.len();
        entry.completed_subtopics.retain(|s| node.subtopic_ids.contains(s));
        let status = if node.subtopic_ids.is_empty() {
            // nothing to derive from, an explicit completion stands
            match entry.status {
                NodeStatus::Completed => NodeStatus::Completed,
                _ => NodeStatus::Unlocked,
            }
        } else {
            derive_status(entry.completed_subtopics.len(), node.subtopic_ids.len())
        };
        if status != entry.status || before != entry.completed_subtopics.len() {
            entry.status = status;
            changed = true;
        }
    }
    changed
}
