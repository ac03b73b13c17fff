use crate::model::Callee;

/// String and memory routines that may be replaced by architecture-specific
/// implementations the analysis cannot see into. Calls to them are reported
/// as a whole.
pub const KNOWN_PRIMITIVES: &[&str] = &[
    "strstr",
    "strspn",
    "strsep",
    "strrchr",
    "strpbrk",
    "strnstr",
    "strnlen",
    "strnicmp",
    "strncpy",
    "strncmp",
    "strnchr",
    "strncat",
    "strncasecmp",
    "strlen",
    "strlcpy",
    "strlcat",
    "strcspn",
    "strcpy",
    "strcmp",
    "strchr",
    "strcat",
    "strcasecmp",
    "memset",
    "memcpy",
    "memcmp",
    "memscan",
    "memmove",
    "memchr",
    "__memcpy",
];

/// Exact-name membership in [`KNOWN_PRIMITIVES`].
pub fn is_known_primitive(name: &str) -> bool {
    KNOWN_PRIMITIVES.contains(&name)
}

/// Whether a call to `callee` is reported. Indirect calls never are.
pub fn is_interesting_call(callee: &Callee) -> bool {
    callee.name().is_some_and(is_known_primitive)
}
