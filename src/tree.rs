#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf {
        class: usize,
        depth: usize,
    },
    Split {
        attr: usize,
        threshold: f64,
        left: usize,
        right: usize,
        depth: usize,
    },
}

impl Node {
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { depth, .. } | Node::Split { depth, .. } => *depth,
        }
    }
}

/// A fitted tree stored as an arena; node 0 is the root.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

/// Best split found for a set of instances.
#[derive(Debug, Clone, Copy)]
pub struct SplitCandidate {
    pub attr: usize,
    pub threshold: f64,
    /// Reduction in weighted gini impurity.
    pub gain: f64,
}

impl DecisionTree {
    /// Grow a tree on row-major `x`. `max_depth` of `None` grows until
    /// every leaf is pure or no split separates the instances.
    pub fn fit(x: &[Vec<f64>], y: &[usize], n_classes: usize, max_depth: Option<usize>) -> Self {
        let attrs: Vec<usize> = (0..x.first().map_or(0, Vec::len)).collect();
        Self::grow(x, y, n_classes, &attrs, max_depth)
    }

    /// A single split restricted to the given attributes.
    pub fn stump(x: &[Vec<f64>], y: &[usize], n_classes: usize, attrs: &[usize]) -> Self {
        Self::grow(x, y, n_classes, attrs, Some(1))
    }

    /// Depth-first growth over an explicit work list, so a degenerate tree
    /// (one instance peeled off per level) does not exhaust the call stack.
    fn grow(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        attrs: &[usize],
        max_depth: Option<usize>,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { class: 0, depth: 0 }];
        let mut pending: Vec<(usize, Vec<usize>, usize)> = vec![(0, (0..y.len()).collect(), 0)];

        while let Some((id, idx, depth)) = pending.pop() {
            let counts = class_counts(y, &idx, n_classes);
            nodes[id] = Node::Leaf {
                class: majority(&counts),
                depth,
            };

            let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            if pure || max_depth.is_some_and(|m| depth >= m) {
                continue;
            }
            let Some(split) = best_split(x, y, n_classes, &idx, attrs) else {
                continue;
            };

            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = idx
                .iter()
                .partition(|&&i| x[i][split.attr] <= split.threshold);
            let (left, right) = (nodes.len(), nodes.len() + 1);
            let child = Node::Leaf {
                class: 0,
                depth: depth + 1,
            };
            nodes.push(child.clone());
            nodes.push(child);
            nodes[id] = Node::Split {
                attr: split.attr,
                threshold: split.threshold,
                left,
                right,
                depth,
            };
            pending.push((right, right_idx, depth + 1));
            pending.push((left, left_idx, depth + 1));
        }

        DecisionTree { nodes }
    }

    pub fn predict_one(&self, row: &[f64]) -> usize {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { class, .. } => return *class,
                Node::Split {
                    attr,
                    threshold,
                    left,
                    right,
                    ..
                } => id = if row[*attr] <= *threshold { *left } else { *right },
            }
        }
    }

    pub fn predict(&self, x: &[Vec<f64>], idx: &[usize]) -> Vec<usize> {
        idx.iter().map(|&i| self.predict_one(&x[i])).collect()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. }))
    }

    pub fn n_splits(&self) -> usize {
        self.nodes.len() - self.leaves().count()
    }
}

fn class_counts(y: &[usize], idx: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &i in idx {
        counts[y[i]] += 1;
    }
    counts
}

/// Most frequent class; ties go to the lowest class index.
fn majority(counts: &[usize]) -> usize {
    counts
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
        .map_or(0, |(c, _)| c)
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

/// Best threshold split over `attrs`, or `None` when no split has a
/// positive gain.
pub fn best_split(
    x: &[Vec<f64>],
    y: &[usize],
    n_classes: usize,
    idx: &[usize],
    attrs: &[usize],
) -> Option<SplitCandidate> {
    attrs
        .iter()
        .filter_map(|&a| split_on(x, y, n_classes, idx, a))
        .filter(|s| s.gain > 0.0)
        .fold(None, |best: Option<SplitCandidate>, s| match best {
            Some(b) if b.gain >= s.gain => Some(b),
            _ => Some(s),
        })
}

/// Best threshold on a single attribute.
pub fn split_on(
    x: &[Vec<f64>],
    y: &[usize],
    n_classes: usize,
    idx: &[usize],
    attr: usize,
) -> Option<SplitCandidate> {
    let mut order: Vec<usize> = idx.to_vec();
    order.sort_by(|&a, &b| x[a][attr].total_cmp(&x[b][attr]));

    let total = order.len();
    let parent = class_counts(y, &order, n_classes);
    let parent_gini = gini(&parent, total);

    let mut left = vec![0; n_classes];
    let mut right = parent;
    let mut best: Option<SplitCandidate> = None;

    for k in 0..total.saturating_sub(1) {
        let i = order[k];
        left[y[i]] += 1;
        right[y[i]] -= 1;
        let (v, next) = (x[i][attr], x[order[k + 1]][attr]);
        if v == next {
            continue;
        }
        let n_left = k + 1;
        let n_right = total - n_left;
        let weighted = (n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right))
            / total as f64;
        let gain = parent_gini - weighted;
        if best.map_or(true, |b| gain > b.gain) {
            best = Some(SplitCandidate {
                attr,
                threshold: (v + next) / 2.0,
                gain,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let x = vec![
            vec![0.0, 5.0],
            vec![1.0, 5.0],
            vec![2.0, 5.0],
            vec![10.0, 5.0],
            vec![11.0, 5.0],
            vec![12.0, 5.0],
        ];
        (x, vec![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn test_single_split_separates() {
        let (x, y) = separable();
        let tree = DecisionTree::fit(&x, &y, 2, None);
        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(tree.n_splits(), 1);
        assert_eq!(tree.leaves().count(), 2);
        assert_eq!(tree.predict(&x, &[0, 5]), vec![0, 1]);
        match tree.nodes[0] {
            Node::Split { attr, threshold, .. } => {
                assert_eq!(attr, 0);
                assert_eq!(threshold, 6.0);
            }
            _ => panic!("root should split"),
        }
    }

    #[test]
    fn test_stump_on_constant_attribute() {
        let (x, y) = separable();
        assert!(split_on(&x, &y, 2, &[0, 1, 2, 3, 4, 5], 1).is_none());
        let stump = DecisionTree::stump(&x, &y, 2, &[1]);
        assert_eq!(stump.nodes.len(), 1);
    }

    #[test]
    fn test_alternating_labels_grow_full_tree() {
        // Alternating labels on one attribute: every split isolates a single row.
        let n = 3000;
        let x: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64]).collect();
        let y: Vec<usize> = (0..n).map(|i| i % 2).collect();
        let tree = DecisionTree::fit(&x, &y, 2, None);
        assert_eq!(tree.leaves().count(), n);
        assert_eq!(tree.n_splits(), n - 1);
        assert_eq!(tree.predict(&x, &[0, 1, n - 1]), vec![0, 1, (n - 1) % 2]);
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let x = vec![vec![1.0], vec![2.0]];
        let tree = DecisionTree::fit(&x, &[1, 1], 2, None);
        assert_eq!(tree.nodes, vec![Node::Leaf { class: 1, depth: 0 }]);
    }
}
