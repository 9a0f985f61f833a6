//! Class name resolution for both pipeline variants.
//!
//! The scan is textual: it does not skip comments or string literals, and only
//! the first `public class` line counts.

use crate::types::SOURCE_EXTENSION;

const PUBLIC_CLASS: &str = "public class ";

/// Find the name of the first public top-level class in `code`.
///
/// `public class Test extends Base {` yields `Test`. Returns `None` when no
/// trimmed line starts with `public class `, or when that line has no name.
pub fn extract_public_class(code: &str) -> Option<&str> {
    let rest = code
        .split('\n')
        .map(str::trim)
        .find_map(|line| line.strip_prefix(PUBLIC_CLASS))?;

    let end = rest
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(rest.len());

    match &rest[..end] {
        "" => None,
        name => Some(name),
    }
}

/// Class name for the fixed-name variant: the caller's file name minus `.java`.
pub fn class_name_from_filename(filename: &str) -> &str {
    filename
        .strip_suffix(SOURCE_EXTENSION)
        .and_then(|stem| stem.strip_suffix('.'))
        .unwrap_or(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_class() {
        assert_eq!(
            extract_public_class("public class Test { public static void main(String[] a) {} }"),
            Some("Test")
        );
    }

    #[test]
    fn test_extends_clause() {
        assert_eq!(
            extract_public_class("public class Test extends Base {"),
            Some("Test")
        );
    }

    #[test]
    fn test_brace_without_space() {
        assert_eq!(extract_public_class("public class Test{"), Some("Test"));
    }

    #[test]
    fn test_tab_after_name() {
        assert_eq!(extract_public_class("public class Test\t{"), Some("Test"));
    }

    #[test]
    fn test_indented_declaration_after_imports() {
        let code = r#"
            import java.util.List;

            public class Main {
                public static void main(String[] args) {}
            }
        "#;
        assert_eq!(extract_public_class(code), Some("Main"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let code = "import java.io.*;\r\npublic class Windows\r\n{\r\n}\r\n";
        assert_eq!(extract_public_class(code), Some("Windows"));
    }

    #[test]
    fn test_first_public_class_wins() {
        let code = "public class First {}\npublic class Second {}";
        assert_eq!(extract_public_class(code), Some("First"));
    }

    #[test]
    fn test_not_found() {
        assert_eq!(extract_public_class(""), None);
        assert_eq!(extract_public_class("class Hidden {}"), None);
        assert_eq!(extract_public_class("public final class Sealed {}"), None);
        assert_eq!(extract_public_class("public interface Shape {}"), None);
    }

    #[test]
    fn test_declaration_must_start_the_line() {
        assert_eq!(extract_public_class("class A {} public class B {}"), None);
    }

    #[test]
    fn test_commented_out_declaration_still_matches() {
        // Comments are not recognised.
        let code = "/*\npublic class Ghost {\n*/\npublic class Real {}";
        assert_eq!(extract_public_class(code), Some("Ghost"));
    }

    #[test]
    fn test_generic_name_is_taken_verbatim() {
        assert_eq!(
            extract_public_class("public class Box<T> {"),
            Some("Box<T>")
        );
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(extract_public_class("public class  {"), None);
        assert_eq!(extract_public_class("public class {"), None);
    }

    #[test]
    fn test_filename_stem() {
        assert_eq!(class_name_from_filename("Test.java"), "Test");
        assert_eq!(class_name_from_filename("Test"), "Test");
        assert_eq!(class_name_from_filename("Test.javax"), "Test.javax");
        assert_eq!(class_name_from_filename("Archive.java.java"), "Archive.java");
    }
}
