//! Cross-crate tests for the pose link live under `tests/`.
