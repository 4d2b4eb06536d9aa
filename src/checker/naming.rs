//! Test names derived from free-form workflow display names.

/// Prefix Galaxy adds to the name of an imported shared workflow.
pub const IMPORTED_PREFIX: &str = "imported: ";

/// Strip the import prefix, if any.
pub fn display_name(raw: &str) -> &str {
    raw.strip_prefix(IMPORTED_PREFIX).unwrap_or(raw)
}

/// Map a display name onto `[A-Za-z0-9_-]*`.
///
/// Whitespace becomes `_`, `.` becomes `-`, anything else outside the
/// allowed set becomes `_`. Total, and a no-op on already clean input.
pub fn test_name_fragment(display: &str) -> String {
    display
        .chars()
        .map(|c| match c {
            '.' => '-',
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => c,
            _ => '_',
        })
        .collect()
}

/// `check_validity.<fragment>` for a raw workflow name.
pub fn validity_test_name(raw: &str) -> String {
    format!("check_validity.{}", test_name_fragment(display_name(raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_imported_prefix() {
        assert_eq!(display_name("imported: RNA-seq QC"), "RNA-seq QC");
        assert_eq!(display_name("RNA-seq QC"), "RNA-seq QC");
        // Only a leading prefix counts.
        assert_eq!(display_name("x imported: y"), "x imported: y");
    }

    #[test]
    fn test_fragment_mapping() {
        assert_eq!(test_name_fragment("RNA-seq QC v1.2"), "RNA-seq_QC_v1-2");
        assert_eq!(test_name_fragment("a\tb\nc"), "a_b_c");
        assert_eq!(test_name_fragment("50% (beta)"), "50___beta_");
        assert_eq!(test_name_fragment("Ünïcode"), "_n_code");
    }

    #[test]
    fn test_fragment_is_total() {
        assert_eq!(test_name_fragment(""), "");
        let clean = "already_clean-Name01";
        assert_eq!(test_name_fragment(clean), clean);
        assert_eq!(test_name_fragment(&test_name_fragment("a b.c")), "a_b-c");
    }

    #[test]
    fn test_validity_test_name() {
        assert_eq!(
            validity_test_name("imported: Variant calling 2.0"),
            "check_validity.Variant_calling_2-0"
        );
        assert_eq!(validity_test_name(""), "check_validity.");
    }
}
