// Placeholder extraction and normalization for the output document.
// Nothing in here touches the filesystem or the network.

use std::collections::BTreeMap;

pub mod normalizer;
pub mod placeholders;

/// Template placeholder name (e.g. `{FullName}`) → value.
pub type PlaceholderMap = BTreeMap<String, String>;
