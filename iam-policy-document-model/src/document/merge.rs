//! Sid-based merging of policy documents

use super::PolicyDocument;

impl PolicyDocument {
    /// Merge `source` into this document.
    ///
    /// - A non-empty source `Id` replaces ours.
    /// - The source `Version` wins if it sorts after ours.
    /// - Statements without a Sid are appended.
    /// - A statement whose Sid matches an existing one replaces the first match
    ///   in place; otherwise it is appended.
    pub fn merge(&mut self, source: PolicyDocument) {
        if let Some(id) = source.id.filter(|id| !id.is_empty()) {
            self.id = Some(id);
        }

        if source.version > self.version {
            log::debug!(
                "Upgrading policy version from '{}' to '{}'",
                self.version,
                source.version
            );
            self.version = source.version;
        }

        for statement in source.statements {
            if statement.sid.is_empty() {
                self.statements.push(statement);
                continue;
            }

            match self
                .statements
                .iter_mut()
                .find(|existing| existing.sid == statement.sid)
            {
                Some(existing) => {
                    log::trace!("Replacing statement with Sid '{}'", statement.sid);
                    *existing = statement;
                }
                None => self.statements.push(statement),
            }
        }
    }
}
