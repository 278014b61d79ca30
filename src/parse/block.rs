//! Splits process text into top-level blocks and their body lines.

/// One source line with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub raw: &'a str,
}

impl<'a> SourceLine<'a> {
    pub fn text(&self) -> &'a str {
        self.raw.trim()
    }
}

/// A top-level line plus every non-blank line up to the next top-level line.
#[derive(Debug, Clone)]
pub struct RawBlock<'a> {
    /// First token of the header, trailing colon stripped.
    pub keyword: String,
    pub header: SourceLine<'a>,
    pub body: Vec<SourceLine<'a>>,
}

#[derive(Debug, Default)]
pub struct SplitText<'a> {
    pub blocks: Vec<RawBlock<'a>>,
    /// Indented lines that appear before the first top-level line.
    pub orphans: Vec<SourceLine<'a>>,
}

/// A line is top-level if it is non-empty and does not start with whitespace.
pub fn is_top_level(line: &str) -> bool {
    line.chars().next().is_some_and(|c| !c.is_whitespace())
}

/// Single pass over the text; every line is looked at exactly once.
pub fn split_blocks(text: &str) -> SplitText<'_> {
    let mut out = SplitText::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = SourceLine {
            number: idx + 1,
            raw,
        };

        if is_top_level(raw) {
            let first = raw.split_whitespace().next().unwrap_or_default();
            out.blocks.push(RawBlock {
                keyword: first.trim_end_matches(':').to_string(),
                header: line,
                body: Vec::new(),
            });
            continue;
        }

        if raw.trim().is_empty() {
            continue;
        }

        match out.blocks.last_mut() {
            Some(block) => block.body.push(line),
            None => out.orphans.push(line),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_and_bodies() {
        let text = "Config:\n  Name: x\n\n  Start: a from b\nPath: a\n  Invoke s\n";
        let split = split_blocks(text);
        assert_eq!(split.blocks.len(), 2);
        assert_eq!(split.blocks[0].keyword, "Config");
        assert_eq!(split.blocks[0].body.len(), 2);
        assert_eq!(split.blocks[0].body[1].number, 4);
        assert_eq!(split.blocks[1].keyword, "Path");
        assert_eq!(split.blocks[1].body[0].text(), "Invoke s");
        assert!(split.orphans.is_empty());
    }

    #[test]
    fn indented_lines_before_any_block_are_orphans() {
        let split = split_blocks("  Invoke s\nPath: a");
        assert_eq!(split.orphans.len(), 1);
        assert_eq!(split.blocks.len(), 1);
        assert!(split.blocks[0].body.is_empty());
    }

    #[test]
    fn whitespace_only_text_has_no_blocks() {
        let split = split_blocks("   \n\t\n");
        assert!(split.blocks.is_empty());
        assert!(split.orphans.is_empty());
    }
}
