use ahash::{AHashMap, AHashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    InProgress,
    Done,
}

/// Finds every distinct cycle reachable by depth-first search from `nodes`.
///
/// Uses three-colour marking with an explicit stack. A back edge to an
/// in-progress node records the stack slice from that node forward, closed by
/// repeating it, e.g. `[a, b, c, a]`. Rotations of the same ring are reported once.
pub fn find_cycles<'s, 'a: 's, F>(nodes: &[&'a str], successors: F) -> Vec<Vec<String>>
where
    F: Fn(&str) -> &'s [&'a str],
{
    let mut color: AHashMap<&'a str, Color> = AHashMap::new();
    let mut seen: AHashSet<Vec<&'a str>> = AHashSet::new();
    let mut cycles = Vec::new();

    for &start in nodes {
        if color.get(start).copied().unwrap_or(Color::Unvisited) != Color::Unvisited {
            continue;
        }

        color.insert(start, Color::InProgress);
        let mut stack: Vec<(&'a str, usize)> = vec![(start, 0)];

        while let Some(&(node, next_child)) = stack.last() {
            let children = successors(node);
            if next_child >= children.len() {
                color.insert(node, Color::Done);
                stack.pop();
                continue;
            }
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            let child = children[next_child];
            match color.get(child).copied().unwrap_or(Color::Unvisited) {
                Color::Unvisited => {
                    color.insert(child, Color::InProgress);
                    stack.push((child, 0));
                }
                Color::InProgress => {
                    let Some(from) = stack.iter().position(|(n, _)| *n == child) else {
                        continue;
                    };
                    let ring: Vec<&'a str> = stack[from..].iter().map(|(n, _)| *n).collect();
                    if seen.insert(canonical(&ring)) {
                        let mut cycle: Vec<String> = ring.iter().map(|n| n.to_string()).collect();
                        cycle.push(child.to_string());
                        cycles.push(cycle);
                    }
                }
                Color::Done => {}
            }
        }
    }

    cycles
}

/// Rotates a ring so its smallest id comes first.
fn canonical<'a>(ring: &[&'a str]) -> Vec<&'a str> {
    let start = ring
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(i, _)| i)
        .unwrap_or(0);
    ring[start..].iter().chain(ring[..start].iter()).copied().collect()
}
