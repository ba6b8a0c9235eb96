//! Display formatting of entries for the selection filter
//!
//! Every entry renders as a block of [`BLOCK_LINES`] lines:
//!
//! ```text
//! • Netflix            (netflix.com)
//! ✉ n@example.com      [Root]
//!  »shared account«
//! ```
//!
//! The first column is padded to the widest first-column cell of all entries
//! rendered together, like a plain text table.

use crate::models::Entry;

/// Lines in every rendered block
pub const BLOCK_LINES: usize = 3;

/// Separator placed between blocks while rendering a table
///
/// The ASCII record separator never survives field sanitizing, so splitting
/// on it always yields exactly one block per entry.
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Placeholder for a line with nothing to show, keeping the height fixed
pub const EMPTY_LINE: &str = "·";

const ELLIPSIS: &str = "...";

/// Truncates `s` to at most `max` characters, ending in `...` when cut
#[must_use]
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Upper-cases the first character and lower-cases the rest
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}

/// Replaces control characters (newlines, tabs, separators) with spaces
fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Renders entries into fixed-height display blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryFormatter {
    /// Maximum width of title, URL and username
    pub long_width: usize,
    /// Maximum width of group and notes
    pub short_width: usize,
}

impl Default for EntryFormatter {
    fn default() -> Self {
        Self {
            long_width: 40,
            short_width: 30,
        }
    }
}

impl EntryFormatter {
    #[must_use]
    pub const fn new(long_width: usize, short_width: usize) -> Self {
        Self {
            long_width,
            short_width,
        }
    }

    fn title(&self, x: &str) -> String {
        format!("• {}", truncate(&capitalize(x), self.long_width))
    }

    fn url(&self, x: &str) -> String {
        format!("({})", truncate(x, self.long_width))
    }

    fn username(&self, x: &str) -> String {
        format!("✉ {}", truncate(x, self.long_width))
    }

    fn group(&self, x: &str) -> String {
        format!("[{}]", truncate(x, self.short_width))
    }

    fn notes(&self, x: &str) -> String {
        format!(" »{}«", truncate(x, self.short_width))
    }

    /// The table cells of one entry, one `[left, right]` pair per line
    fn cells(&self, entry: &Entry) -> [[String; 2]; BLOCK_LINES] {
        let field = |value: &str, render: &dyn Fn(&str) -> String| {
            let value = sanitize(value);
            if value.is_empty() {
                String::new()
            } else {
                render(&value)
            }
        };
        [
            [
                field(&entry.title, &|x| self.title(x)),
                field(&entry.url, &|x| self.url(x)),
            ],
            [
                field(&entry.username, &|x| self.username(x)),
                field(&entry.group, &|x| self.group(x)),
            ],
            [field(&entry.notes, &|x| self.notes(x)), String::new()],
        ]
    }

    /// Renders a single entry on its own
    #[must_use]
    pub fn render(&self, entry: &Entry) -> String {
        self.render_all([entry]).pop().unwrap_or_default()
    }

    /// Renders entries as one table and returns one block per entry
    ///
    /// Blocks are joined with [`RECORD_SEPARATOR`] and split apart again, so
    /// the result always holds one block per input entry.
    #[must_use]
    pub fn render_all<'a>(&self, entries: impl IntoIterator<Item = &'a Entry>) -> Vec<String> {
        let cells: Vec<_> = entries.into_iter().map(|e| self.cells(e)).collect();
        let width = cells
            .iter()
            .flatten()
            .map(|[left, _]| left.chars().count())
            .max()
            .unwrap_or(0);

        let table = cells
            .iter()
            .map(|rows| {
                rows.iter()
                    .map(|[left, right]| {
                        let line = format!("{left:<width$}  {right}");
                        let line = line.trim_end();
                        if line.trim_start().is_empty() {
                            EMPTY_LINE.to_string()
                        } else {
                            line.to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join(&RECORD_SEPARATOR.to_string());

        if cells.is_empty() {
            return Vec::new();
        }
        table
            .split(RECORD_SEPARATOR)
            .map(|block| block.trim_end_matches('\n').to_string())
            .collect()
    }
}
