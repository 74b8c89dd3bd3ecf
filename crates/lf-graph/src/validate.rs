//! Layout validation logic.

use std::collections::HashMap;
use lf_core::BlockId;

use crate::error::{GraphError, GraphResult};
use crate::indexing::BlockLayout;

/// Check that every state and output name is declared exactly once across
/// the whole network. States and outputs share one namespace.
pub(crate) fn validate_unique_names<'a, I>(layouts: I) -> GraphResult<()>
where
    I: IntoIterator<Item = &'a BlockLayout>,
{
    let mut seen: HashMap<&'a str, BlockId> = HashMap::new();
    for (i, layout) in layouts.into_iter().enumerate() {
        let block = BlockId::from_index(i as u32);
        for name in layout.states.iter().chain(layout.outputs.iter()) {
            if let Some(&first) = seen.get(name.as_str()) {
                return Err(GraphError::DuplicateName {
                    name: name.clone(),
                    first,
                    second: block,
                });
            }
            seen.insert(name.as_str(), block);
        }
    }
    Ok(())
}
