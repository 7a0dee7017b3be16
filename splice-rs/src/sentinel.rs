//! Placeholder text written in place of values that could not be produced.
//!
//! A logging call never fails; every malformed template or argument list
//! degrades to one of these markers in the output instead.

/// An unkeyed `{}` site ran out of positional arguments.
pub const MISSING_ARG: &str = "!missing-arg";

/// A keyed `{name}` site whose key no attribute supplied.
pub const MISSING_ATTR: &str = "!missing-attr";

/// Value of an attribute built from a trailing bare-string key.
pub const MISSING_KEY: &str = "!missing-key";

/// A `{` with no closing `}`; appended after the literal tail.
pub const MISSING_RIGHT_BRACKET: &str = "!missing-right-bracket";

/// Key given to a non-string argument found where a key was expected.
pub const BAD_KEY: &str = "!bad-key";

/// Prefix for a verb the value's kind cannot honour: `!bad-verb(<verb>)`.
pub const BAD_VERB: &str = "!bad-verb";

/// A lazy value kept producing lazy values past the resolution limit.
pub const LAZY_OVERFLOW: &str = "!lazy-overflow";
