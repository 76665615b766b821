use crate::expression::{OperandLeaf, OperandTable};
use crate::type_system::TypeChecker;
use tracing::trace;

/// Enumerates every verified way of fixing each referenced group slot to one
/// dimension. Group slots the tree never refers to are left open.
///
/// Group slots are processed in signature order and each slot's candidates in
/// their stored (ascending) order, so the output order is reproducible.
pub struct ExpansionEngine<'c, 'a> {
    checker: &'c TypeChecker<'a>,
}

impl<'c, 'a> ExpansionEngine<'c, 'a> {
    pub fn new(checker: &'c TypeChecker<'a>) -> Self {
        Self { checker }
    }

    /// Expands an already propagated operand table.
    pub fn expand(&self, root: &OperandTable) -> Vec<OperandTable> {
        let groups = root.referenced_group_slots(self.checker.expr());
        let mut resolved = Vec::new();

        if groups.is_empty() {
            if self.checker.verify(root) {
                resolved.push(root.clone());
            }
            return resolved;
        }

        self.recurse(root, &groups, 0, &mut resolved);
        resolved
    }

    fn recurse(&self, operands: &OperandTable, groups: &[usize], position: usize, resolved: &mut Vec<OperandTable>) {
        let slot = groups[position];
        let candidates = match operands.get(slot) {
            Some(OperandLeaf::Group { candidates, .. }) => candidates.clone(),
            _ => return,
        };

        for dimension in candidates.iter() {
            let mut branch = operands.clone();
            branch.fix(slot, dimension);

            if position + 1 < groups.len() {
                self.recurse(&branch, groups, position + 1, resolved);
                continue;
            }

            let verified = self.checker.verify(&branch);
            trace!(slot, dimension, verified, "expansion branch complete");
            if verified {
                resolved.push(branch);
            }
        }
    }
}
