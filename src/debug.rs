//! Reporting and integrity checks for both tree levels.

use std::fmt::Write as _;
use std::io;

use crate::name_tree::{NameNode, NameTree};
use crate::record::Tag;
use crate::tag_tree::{Node, TagTree};

impl TagTree {
    /// Parenthesized shape dump: `(left tag:size:vacant right)` per node.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            Self::dump_node(root, &mut out);
        }
        out
    }

    fn dump_node(node: &Node, out: &mut String) {
        out.push('(');
        if let Some(left) = node.left.as_deref() {
            Self::dump_node(left, out);
        }
        let _ = write!(out, "{}:{}:{}", node.tag(), node.size, node.vacant_count);
        if let Some(right) = node.right.as_deref() {
            Self::dump_node(right, out);
        }
        out.push(')');
    }

    /// Verify tree integrity - returns list of issues found.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if let Some(root) = self.root() {
            Self::verify_node(root, None, None, &mut issues);
        }
        issues
    }

    /// Returns the recomputed `(size, vacant_count)` of the subtree.
    fn verify_node(
        node: &Node,
        lower: Option<Tag>,
        upper: Option<Tag>,
        issues: &mut Vec<String>,
    ) -> (usize, usize) {
        let tag = node.tag();
        if lower.is_some_and(|lo| tag <= lo) || upper.is_some_and(|hi| tag >= hi) {
            issues.push(format!(
                "tag {tag} out of order (bounds {lower:?}..{upper:?})"
            ));
        }
        if node.vacant && node.is_leaf() {
            issues.push(format!("vacant leaf {tag} should have been pruned"));
        }

        let (left_size, left_vacant) = node
            .left
            .as_deref()
            .map_or((0, 0), |l| Self::verify_node(l, lower, Some(tag), issues));
        let (right_size, right_vacant) = node
            .right
            .as_deref()
            .map_or((0, 0), |r| Self::verify_node(r, Some(tag), upper, issues));

        let size = 1 + left_size + right_size;
        let vacant = usize::from(node.vacant) + left_vacant + right_vacant;
        if node.size != size {
            issues.push(format!("tag {tag} stores size {} but has {size}", node.size));
        }
        if node.vacant_count != vacant {
            issues.push(format!(
                "tag {tag} stores vacant count {} but has {vacant}",
                node.vacant_count
            ));
        }
        (size, vacant)
    }
}

impl NameTree {
    /// Parenthesized shape dump: `(left name:height:count right)` per node.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            Self::dump_node(root, &mut out);
        }
        out
    }

    fn dump_node(node: &NameNode, out: &mut String) {
        out.push('(');
        if let Some(left) = node.left.as_deref() {
            Self::dump_node(left, out);
        }
        let _ = write!(out, "{}:{}:{}", node.name, node.height, node.tags.len());
        if let Some(right) = node.right.as_deref() {
            Self::dump_node(right, out);
        }
        out.push(')');
    }

    /// Writes every live record, ordered by name and tag, one block each.
    pub fn write_records<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        for record in self.iter() {
            writeln!(out, "{record}")?;
        }
        Ok(())
    }

    /// Print every live record to stdout.
    pub fn print_records(&self) {
        for record in self.iter() {
            println!("{record}");
        }
    }

    /// Verify both levels - returns list of issues found.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut names = 0usize;
        let mut records = 0usize;
        if let Some(root) = self.root() {
            Self::verify_node(root, None, None, &mut names, &mut records, &mut issues);
        }
        if names != self.name_count() {
            issues.push(format!(
                "name count {} but {names} nodes reachable",
                self.name_count()
            ));
        }
        if records != self.len() {
            issues.push(format!(
                "record count {} but {records} live records reachable",
                self.len()
            ));
        }
        issues
    }

    /// Returns the recomputed height of the subtree.
    fn verify_node<'a>(
        node: &'a NameNode,
        lower: Option<&'a str>,
        upper: Option<&'a str>,
        names: &mut usize,
        records: &mut usize,
        issues: &mut Vec<String>,
    ) -> i32 {
        let name = node.name.as_str();
        if lower.is_some_and(|lo| name <= lo) || upper.is_some_and(|hi| name >= hi) {
            issues.push(format!("name {name:?} out of order"));
        }

        *names += 1;
        *records += node.tags.len();
        if node.tags.is_empty() {
            issues.push(format!("name {name:?} has no live records"));
        }
        if let Some(stray) = node.tags.iter().find(|r| r.name() != name) {
            issues.push(format!(
                "record {}#{} filed under {name:?}",
                stray.name(),
                stray.tag()
            ));
        }
        for issue in node.tags.verify_integrity() {
            issues.push(format!("{name:?}: {issue}"));
        }

        let left_height = node.left.as_deref().map_or(-1, |l| {
            Self::verify_node(l, lower, Some(name), names, records, issues)
        });
        let right_height = node.right.as_deref().map_or(-1, |r| {
            Self::verify_node(r, Some(name), upper, names, records, issues)
        });

        let height = 1 + left_height.max(right_height);
        if node.height != height {
            issues.push(format!(
                "name {name:?} stores height {} but has {height}",
                node.height
            ));
        }
        if (left_height - right_height).abs() > 1 {
            issues.push(format!(
                "name {name:?} unbalanced ({left_height} vs {right_height})"
            ));
        }
        height
    }
}
