//! Selection set to store projection compilation.
//!
//! Walks the selections of the field being resolved, splicing in named and
//! inline fragments, and collects the collection fields the query reads.
//! A selected computed field needs the whole document, so it disables the
//! projection entirely.

use std::collections::{HashMap, HashSet};

use async_graphql::Name;
use async_graphql::dynamic::ResolverContext;
use async_graphql_parser::Positioned;
use async_graphql_parser::types::{FragmentDefinition, Selection, SelectionSet};
use docgraph_core::CollectionDef;
use docgraph_storage::Projection;
use tracing::trace;

/// Fragment definitions of the executing operation.
pub type Fragments = HashMap<Name, Positioned<FragmentDefinition>>;

/// The selections below one field together with the fragments they may spread.
#[derive(Clone, Copy)]
pub struct SelectionScope<'a> {
    pub selection_set: &'a SelectionSet,
    pub fragments: &'a Fragments,
}

impl<'a> SelectionScope<'a> {
    pub fn new(selection_set: &'a SelectionSet, fragments: &'a Fragments) -> Self {
        Self {
            selection_set,
            fragments,
        }
    }

    /// Selections of the field currently being resolved.
    pub(crate) fn from_resolver(ctx: &'a ResolverContext<'_>) -> Self {
        Self {
            selection_set: &ctx.ctx.item.node.selection_set.node,
            fragments: &ctx.ctx.query_env.fragments,
        }
    }
}

/// Compiles the minimal projection for a selection, or `None` when every
/// field must be fetched.
pub fn compile_projection(collection: &CollectionDef, scope: SelectionScope<'_>) -> Option<Projection> {
    if collection.fields.is_empty() || scope.selection_set.items.is_empty() {
        return None;
    }

    let mut projection = Projection::new();
    let mut spread: HashSet<&Name> = HashSet::new();
    let mut worklist: Vec<&Positioned<Selection>> =
        scope.selection_set.items.iter().rev().collect();

    while let Some(selection) = worklist.pop() {
        match &selection.node {
            Selection::Field(field) => {
                let name = field.node.name.node.as_str();
                match collection.get_field(name) {
                    Some(def) if def.is_computed() => {
                        trace!(
                            collection = %collection.name,
                            field = name,
                            "Computed field selected, projection disabled"
                        );
                        return None;
                    }
                    Some(_) => projection.include(name),
                    None => {}
                }
            }
            Selection::FragmentSpread(fragment_spread) => {
                let fragment_name = &fragment_spread.node.fragment_name.node;
                if !spread.insert(fragment_name) {
                    continue;
                }
                if let Some(fragment) = scope.fragments.get(fragment_name) {
                    worklist.extend(fragment.node.selection_set.node.items.iter().rev());
                }
            }
            Selection::InlineFragment(inline) => {
                worklist.extend(inline.node.selection_set.node.items.iter().rev());
            }
        }
    }

    Some(projection)
}
