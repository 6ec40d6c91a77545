//! Model identity normalization.
//!
//! Upstream providers occasionally rename models. Chats created before a
//! rename still carry the old identifier, so every write of a chat's model
//! selection goes through [`normalize_model_id`] first — downstream readers
//! only ever observe canonical identifiers.

/// Renamed upstream model ids mapped to their current canonical ids.
///
/// Invariant: canonical ids never appear on the left-hand side, so a single
/// lookup pass is enough and normalization is idempotent.
const MODEL_ALIASES: &[(&str, &str)] = &[
    ("grok-4-fast", "grok-4.1-fast"),
    ("grok-4-fast-reasoning", "grok-4.1-fast-reasoning"),
    ("grok-4-fast-non-reasoning", "grok-4.1-fast-non-reasoning"),
];

/// Map a possibly-stale model identifier to its canonical form.
///
/// Total: identifiers absent from the alias table are assumed already
/// canonical and returned unchanged.
pub fn normalize_model_id(model_id: &str) -> &str {
    MODEL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == model_id)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(model_id)
}
