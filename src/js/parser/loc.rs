use std::ops::Range;

/// Start and end positions are byte offsets in the source file.
pub type Pos = usize;

/// Half open interval describing a source location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Loc {
    pub start: Pos,
    pub end: Pos,
}

impl Loc {
    pub fn new(start: Pos, end: Pos) -> Loc {
        Loc { start, end }
    }

    pub fn to_range(&self) -> Range<Pos> {
        self.start..self.end
    }

    /// Smallest location that covers both this and the other location.
    pub fn join(&self, other: Loc) -> Loc {
        Loc { start: self.start.min(other.start), end: self.end.max(other.end) }
    }
}

pub const EMPTY_LOC: Loc = Loc { start: 0, end: 0 };

/// A 1-indexed line and 0-indexed column, as reported in ESTree `loc` objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

/// Calculate the byte offsets of the start of each line.
pub fn calculate_line_offsets(source: &str) -> Vec<usize> {
    let mut line_offsets = vec![0];

    let bytes = source.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\n' => line_offsets.push(pos + 1),
            // A lone carriage return also terminates a line
            b'\r' if bytes.get(pos + 1) != Some(&b'\n') => line_offsets.push(pos + 1),
            // Line and paragraph separators are encoded as E2 80 A8 and E2 80 A9
            0xE2 if bytes.get(pos + 1) == Some(&0x80)
                && matches!(bytes.get(pos + 2), Some(0xA8) | Some(0xA9)) =>
            {
                pos += 2;
                line_offsets.push(pos + 1);
            }
            _ => {}
        }

        pos += 1;
    }

    line_offsets
}

/// Return the 1-indexed line and 0-indexed column number for a Pos, given the set of line start
/// offsets. Columns count UTF-16 code units like ESTree consumers expect.
pub fn find_line_col_for_pos(pos: Pos, line_offsets: &[usize], source: &str) -> LineCol {
    // Binary search to find the largest line start offset that is smaller than the pos. This is
    // the line number.
    let line = find_largest_offset_less_than_or_equal(pos, line_offsets);

    let line_start = line_offsets[line];
    let column = match source.get(line_start..pos) {
        Some(prefix) => prefix.chars().map(char::len_utf16).sum(),
        None => pos - line_start,
    };

    LineCol { line: line + 1, column }
}

fn find_largest_offset_less_than_or_equal(target: Pos, line_offsets: &[usize]) -> usize {
    let mut lo = 0;
    let mut hi = line_offsets.len();

    while lo < hi {
        let mid = (lo + hi) / 2;
        if line_offsets[mid] < target + 1 {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    lo - 1
}
