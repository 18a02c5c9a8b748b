// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prints the failing tests inside a result tree.
//!
//! Result trees nest to any depth. Every failing [`TestLeaf`] is printed under the name of its
//! nearest enclosing group, with the group header printed once per contiguous run of failures
//! from that group:
//!
//! ```text
//!    in ui
//!      login: expected true
//!        got false
//!      logout: timed out
//!    in api
//!      fetch: 500
//! ```

use super::{
    events::{AgentResultDetails, ResultNode, TestLeaf},
    helpers::Styles,
};
use crate::output::OutputSink;
use indexmap::IndexMap;
use owo_colors::OwoColorize;
use std::io;

const GROUP_INDENT: &str = "   ";
const TEST_INDENT: &str = "     ";
const CONTINUATION_INDENT: &str = "       ";

/// Walks a result tree, printing each failing leaf.
pub(crate) struct FailureWalker<'a> {
    styles: &'a Styles,
    last_group: Option<&'a str>,
}

impl<'a> FailureWalker<'a> {
    pub(crate) fn new(styles: &'a Styles) -> Self {
        Self {
            styles,
            last_group: None,
        }
    }

    /// Prints every failure in `details`, then a blank separator line.
    ///
    /// Leaves directly under the root are grouped under the script name.
    pub(crate) fn walk(
        mut self,
        details: &'a AgentResultDetails,
        sink: &mut dyn OutputSink,
    ) -> io::Result<()> {
        self.walk_children(&details.name, &details.children, sink)?;
        sink.puts("")
    }

    fn walk_children(
        &mut self,
        group: &'a str,
        children: &'a IndexMap<String, ResultNode>,
        sink: &mut dyn OutputSink,
    ) -> io::Result<()> {
        for node in children.values() {
            match node {
                ResultNode::Suite(suite) => {
                    self.walk_children(&suite.name, &suite.children, sink)?;
                }
                ResultNode::TestLeaf(leaf) => self.report_leaf(group, leaf, sink)?,
            }
        }
        Ok(())
    }

    fn report_leaf(
        &mut self,
        group: &'a str,
        leaf: &TestLeaf,
        sink: &mut dyn OutputSink,
    ) -> io::Result<()> {
        if !leaf.is_failure() {
            return Ok(());
        }

        if self.last_group != Some(group) {
            sink.puts(&format!("{GROUP_INDENT}in {}", group.style(self.styles.name)))?;
            self.last_group = Some(group);
        }

        let mut lines = leaf.message.split('\n');
        // split always yields at least one item.
        let first = lines.next().unwrap_or_default();
        sink.puts(&format!(
            "{TEST_INDENT}{}: {first}",
            leaf.name.style(self.styles.fail_name)
        ))?;
        for line in lines {
            sink.puts(&format!("{CONTINUATION_INDENT}{line}"))?;
        }
        Ok(())
    }
}
