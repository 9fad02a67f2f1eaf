// src/diff.rs
//! Bounded, line-based unified diff between two text snapshots.
//!
//! The edit script is a Myers shortest edit script over the lines left after
//! trimming the common prefix and suffix. Hunks are grouped with `context` lines
//! of surrounding text; hunks separated by at most `2 * context` unchanged lines
//! are merged. Output longer than `max_lines` keeps its head and tail around a
//! placeholder that states how many lines were dropped.

pub const DEFAULT_CONTEXT: usize = 12;
pub const DEFAULT_MAX_LINES: usize = 200;

/// Past this many edits the middle section is reported as one replacement.
const MAX_EDIT_DISTANCE: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Equal,
    Replace,
    Delete,
    Insert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Opcode {
    tag: Tag,
    i1: usize,
    i2: usize,
    j1: usize,
    j2: usize,
}

impl Opcode {
    fn new(tag: Tag, i1: usize, i2: usize, j1: usize, j2: usize) -> Self {
        Self { tag, i1, i2, j1, j2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Equal,
    Delete,
    Insert,
}

/// Unified diff with the default context (12) and line cap (200).
pub fn unified_diff(old: &str, new: &str) -> String {
    unified_diff_with(old, new, DEFAULT_CONTEXT, DEFAULT_MAX_LINES)
}

pub fn unified_diff_with(old: &str, new: &str, context: usize, max_lines: usize) -> String {
    let a: Vec<&str> = old.lines().collect();
    let b: Vec<&str> = new.lines().collect();

    let mut out: Vec<String> = Vec::new();
    for group in grouped_opcodes(&opcodes(&a, &b), context) {
        if out.is_empty() {
            out.push("--- previous".to_string());
            out.push("+++ current".to_string());
        }
        let (first, last) = (group[0], group[group.len() - 1]);
        out.push(format!(
            "@@ -{} +{} @@",
            format_range(first.i1, last.i2),
            format_range(first.j1, last.j2)
        ));
        for op in &group {
            if op.tag == Tag::Equal {
                out.extend(a[op.i1..op.i2].iter().map(|l| format!(" {l}")));
                continue;
            }
            if matches!(op.tag, Tag::Replace | Tag::Delete) {
                out.extend(a[op.i1..op.i2].iter().map(|l| format!("-{l}")));
            }
            if matches!(op.tag, Tag::Replace | Tag::Insert) {
                out.extend(b[op.j1..op.j2].iter().map(|l| format!("+{l}")));
            }
        }
    }

    truncate_middle(out, max_lines).join("\n")
}

/// Keep the first and last `max_lines / 2` lines; replace the rest with a marker.
fn truncate_middle(lines: Vec<String>, max_lines: usize) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    let half = max_lines / 2;
    let omitted = lines.len() - 2 * half;
    let mut out = Vec::with_capacity(2 * half + 3);
    out.extend_from_slice(&lines[..half]);
    out.push("...".to_string());
    out.push(format!("[diff truncated: {omitted} lines omitted]"));
    out.push("...".to_string());
    out.extend_from_slice(&lines[lines.len() - half..]);
    out
}

/// `start,len` hunk range; a single line omits the length, an empty range
/// points at the line before it.
fn format_range(start: usize, stop: usize) -> String {
    let length = stop - start;
    match length {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{length}", start + 1),
    }
}

fn opcodes(a: &[&str], b: &[&str]) -> Vec<Opcode> {
    let (n, m) = (a.len(), b.len());
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mid_a = &a[prefix..n - suffix];
    let mid_b = &b[prefix..m - suffix];
    let edits = if mid_a.is_empty() || mid_b.is_empty() {
        None
    } else {
        myers(mid_a, mid_b)
    }
    .unwrap_or_else(|| {
        let mut e = vec![Edit::Delete; mid_a.len()];
        e.extend(std::iter::repeat(Edit::Insert).take(mid_b.len()));
        e
    });

    let mut ops = Vec::new();
    if prefix > 0 {
        ops.push(Opcode::new(Tag::Equal, 0, prefix, 0, prefix));
    }

    let (mut i, mut j, mut idx) = (prefix, prefix, 0);
    while idx < edits.len() {
        let (i1, j1) = (i, j);
        if edits[idx] == Edit::Equal {
            while idx < edits.len() && edits[idx] == Edit::Equal {
                i += 1;
                j += 1;
                idx += 1;
            }
            ops.push(Opcode::new(Tag::Equal, i1, i, j1, j));
        } else {
            while idx < edits.len() && edits[idx] != Edit::Equal {
                match edits[idx] {
                    Edit::Delete => i += 1,
                    Edit::Insert => j += 1,
                    Edit::Equal => {}
                }
                idx += 1;
            }
            let tag = match (i > i1, j > j1) {
                (true, true) => Tag::Replace,
                (true, false) => Tag::Delete,
                _ => Tag::Insert,
            };
            ops.push(Opcode::new(tag, i1, i, j1, j));
        }
    }

    if suffix > 0 {
        ops.push(Opcode::new(Tag::Equal, n - suffix, n, m - suffix, m));
    }
    ops
}

/// Split opcodes into hunks with up to `n` lines of context around each change.
fn grouped_opcodes(ops: &[Opcode], n: usize) -> Vec<Vec<Opcode>> {
    if ops.iter().all(|op| op.tag == Tag::Equal) {
        return Vec::new();
    }

    let mut codes = ops.to_vec();
    if let Some(first) = codes.first_mut().filter(|op| op.tag == Tag::Equal) {
        first.i1 = first.i1.max(first.i2.saturating_sub(n));
        first.j1 = first.j1.max(first.j2.saturating_sub(n));
    }
    if let Some(last) = codes.last_mut().filter(|op| op.tag == Tag::Equal) {
        last.i2 = last.i2.min(last.i1 + n);
        last.j2 = last.j2.min(last.j1 + n);
    }

    let mut groups = Vec::new();
    let mut group = Vec::new();
    for mut op in codes {
        if op.tag == Tag::Equal && op.i2 - op.i1 > 2 * n {
            group.push(Opcode::new(
                Tag::Equal,
                op.i1,
                op.i2.min(op.i1 + n),
                op.j1,
                op.j2.min(op.j1 + n),
            ));
            groups.push(std::mem::take(&mut group));
            op.i1 = op.i1.max(op.i2.saturating_sub(n));
            op.j1 = op.j1.max(op.j2.saturating_sub(n));
        }
        group.push(op);
    }
    if !(group.is_empty() || (group.len() == 1 && group[0].tag == Tag::Equal)) {
        groups.push(group);
    }
    // A leading all-context group can appear when n == 0
    groups.retain(|g| g.iter().any(|op| op.tag != Tag::Equal));
    groups
}

/// Myers O(ND) shortest edit script. `None` when the distance exceeds the bound.
fn myers(a: &[&str], b: &[&str]) -> Option<Vec<Edit>> {
    let (n, m) = (a.len() as isize, b.len() as isize);
    let max = a.len() + b.len();
    let limit = max.min(MAX_EDIT_DISTANCE) as isize;
    let offset = max as isize + 1;
    let mut v = vec![0isize; 2 * max + 3];
    // trace[d] holds v[-d..=d] as it was before step d
    let mut trace: Vec<Vec<isize>> = Vec::new();

    for d in 0..=limit {
        trace.push(v[(offset - d) as usize..=(offset + d) as usize].to_vec());
        let mut k = -d;
        while k <= d {
            let idx = (offset + k) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                return Some(backtrack(&trace, n, m));
            }
            k += 2;
        }
    }
    None
}

fn backtrack(trace: &[Vec<isize>], n: isize, m: isize) -> Vec<Edit> {
    let mut edits = Vec::new();
    let (mut x, mut y) = (n, m);

    for d in (0..trace.len()).rev() {
        if d == 0 {
            while x > 0 && y > 0 {
                edits.push(Edit::Equal);
                x -= 1;
                y -= 1;
            }
            break;
        }
        let d = d as isize;
        let snapshot = &trace[d as usize];
        let at = |k: isize| snapshot[(k + d) as usize];

        let k = x - y;
        let prev_k = if k == -d || (k != d && at(k - 1) < at(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = at(prev_k);
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            edits.push(Edit::Equal);
            x -= 1;
            y -= 1;
        }
        edits.push(if x == prev_x { Edit::Insert } else { Edit::Delete });
        x = prev_x;
        y = prev_y;
    }

    edits.reverse();
    edits
}
