//! Splitting of `---`-delimited frontmatter from markdown text.
//!
//! Shared by the agent parser and the metadata hasher so both agree on where
//! frontmatter starts and ends.

/// A document split into its frontmatter and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    /// Raw text between the delimiter lines, without the delimiters
    pub yaml: &'a str,
    /// Everything after the closing delimiter line
    pub body: &'a str,
}

/// Why a document has no usable frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrontmatterError {
    #[error("empty file")]
    Empty,
    #[error("missing frontmatter delimiter '---'")]
    MissingDelimiter,
    #[error("unterminated frontmatter: no closing '---'")]
    Unterminated,
}

const DELIMITER: &str = "---";

/// Split `text` into frontmatter and body.
///
/// The first line must be the opening delimiter. Delimiter lines are compared
/// after trimming surrounding whitespace, so `\r\n` endings work.
pub fn split_frontmatter(text: &str) -> Result<Frontmatter<'_>, FrontmatterError> {
    if text.is_empty() {
        return Err(FrontmatterError::Empty);
    }

    let mut offset = 0;
    let mut yaml_start = None;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let trimmed = line.trim();

        match yaml_start {
            None if trimmed == DELIMITER => yaml_start = Some(offset),
            None => return Err(FrontmatterError::MissingDelimiter),
            Some(start) if trimmed == DELIMITER => {
                return Ok(Frontmatter {
                    yaml: &text[start..line_start],
                    body: &text[offset..],
                });
            }
            Some(_) => {}
        }
    }

    Err(FrontmatterError::Unterminated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_yaml_and_body() {
        let doc = "---\nname: a\n---\n# Body\n";
        let fm = split_frontmatter(doc).unwrap();
        assert_eq!(fm.yaml, "name: a\n");
        assert_eq!(fm.body, "# Body\n");
    }

    #[test]
    fn handles_crlf() {
        let doc = "---\r\nname: a\r\n---\r\nbody";
        let fm = split_frontmatter(doc).unwrap();
        assert_eq!(fm.yaml, "name: a\r\n");
        assert_eq!(fm.body, "body");
    }

    #[test]
    fn opening_delimiter_must_be_first_line() {
        assert_eq!(
            split_frontmatter("\n\n---\nname: a\n---\n"),
            Err(FrontmatterError::MissingDelimiter)
        );
        let fm = split_frontmatter("  ---\r\nname: a\n---\n").unwrap();
        assert_eq!(fm.yaml, "name: a\n");
    }

    #[test]
    fn closing_delimiter_at_eof_without_newline() {
        let fm = split_frontmatter("---\nname: a\n---").unwrap();
        assert_eq!(fm.yaml, "name: a\n");
        assert_eq!(fm.body, "");
    }

    #[test]
    fn empty_and_whitespace_only() {
        assert_eq!(split_frontmatter(""), Err(FrontmatterError::Empty));
        assert_eq!(
            split_frontmatter("  \n\t\n"),
            Err(FrontmatterError::MissingDelimiter)
        );
    }

    #[test]
    fn missing_opening_delimiter() {
        assert_eq!(
            split_frontmatter("no frontmatter here"),
            Err(FrontmatterError::MissingDelimiter)
        );
    }

    #[test]
    fn unterminated() {
        assert_eq!(
            split_frontmatter("---\nname: a\nversion: 1\n"),
            Err(FrontmatterError::Unterminated)
        );
    }
}
