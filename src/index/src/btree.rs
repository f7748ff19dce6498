use common::prelude::*;
use std::cmp::Ordering;
use std::str::FromStr;

/// Maximum number of keys a node may reach before it splits.
pub(crate) const TREE_ORDER: usize = 4;

/// Order keys under a dtype: numerically for int keys, byte-wise otherwise.
/// Falls back to byte-wise order when an int key fails to parse.
pub fn compare_keys(a: &str, b: &str, dtype: DataType) -> Ordering {
    match dtype {
        DataType::Int => match (a.parse::<i64>(), b.parse::<i64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.cmp(b),
        },
        DataType::Str => a.cmp(b),
    }
}

/// A primary-key range condition: `=v`, `<v` or `>v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq(String),
    Lt(String),
    Gt(String),
}

impl FromStr for Condition {
    type Err = HoradrimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.get(1..).unwrap_or("");
        if value.is_empty() {
            return Err(h_err(&format!("malformed filter condition {:?}", s)));
        }
        match s.as_bytes()[0] {
            b'=' => Ok(Condition::Eq(value.to_string())),
            b'<' => Ok(Condition::Lt(value.to_string())),
            b'>' => Ok(Condition::Gt(value.to_string())),
            _ => Err(h_err(&format!("malformed filter condition {:?}", s))),
        }
    }
}

#[derive(Debug, Default)]
struct Node {
    keys: Vec<String>,
    /// Leaf payloads, one value list per key. Empty for interior nodes.
    entries: Vec<Vec<String>>,
    /// Interior children. Empty for leaves.
    children: Vec<Node>,
}

struct Split {
    pivot: String,
    right: Node,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Index of the child to descend into: the first routing key exceeding
    /// the search key, else the rightmost child.
    fn route(&self, key: &str) -> usize {
        self.keys
            .iter()
            .position(|k| key < k.as_str())
            .unwrap_or(self.keys.len())
    }

    fn insert(&mut self, key: &str, value: &str) -> Option<Split> {
        if self.is_leaf() {
            match self.keys.iter().position(|k| key <= k.as_str()) {
                Some(i) if self.keys[i] == key => self.entries[i].push(value.to_string()),
                Some(i) => {
                    self.keys.insert(i, key.to_string());
                    self.entries.insert(i, vec![value.to_string()]);
                }
                None => {
                    self.keys.push(key.to_string());
                    self.entries.push(vec![value.to_string()]);
                }
            }
            if self.keys.len() == TREE_ORDER {
                return Some(self.split_leaf());
            }
            None
        } else {
            let idx = self.route(key);
            let split = self.children[idx].insert(key, value)?;
            // The promoted pivot sits between keys[idx-1] and keys[idx].
            self.keys.insert(idx, split.pivot);
            self.children.insert(idx + 1, split.right);
            if self.keys.len() == TREE_ORDER {
                return Some(self.split_interior());
            }
            None
        }
    }

    /// Leaf split: the right half keeps its first key, which is copied up
    /// as the pivot so equal keys route right of it.
    fn split_leaf(&mut self) -> Split {
        let mid = TREE_ORDER / 2;
        let right_keys = self.keys.split_off(mid);
        let right_entries = self.entries.split_off(mid);
        let pivot = right_keys[0].clone();
        Split {
            pivot,
            right: Node {
                keys: right_keys,
                entries: right_entries,
                children: Vec::new(),
            },
        }
    }

    /// Interior split: the middle key moves up and out of both halves.
    fn split_interior(&mut self) -> Split {
        let mid = TREE_ORDER / 2;
        let mut right_keys = self.keys.split_off(mid);
        let pivot = right_keys.remove(0);
        let right_children = self.children.split_off(mid + 1);
        Split {
            pivot,
            right: Node {
                keys: right_keys,
                entries: Vec::new(),
                children: right_children,
            },
        }
    }
}

/// An order-4 B+ tree over string keys, with an auxiliary key list kept
/// sorted under the key's declared dtype. The tree serves point lookups;
/// the key list serves ordered iteration and range conditions.
///
/// Routing inside the tree compares keys byte-wise regardless of dtype;
/// every externally observable ordering goes through the sorted key list.
pub struct BPlusTree {
    root: Node,
    key_dtype: DataType,
    sorted_keys: Vec<String>,
}

impl BPlusTree {
    pub fn new(key_dtype: DataType) -> Self {
        BPlusTree {
            root: Node::default(),
            key_dtype,
            sorted_keys: Vec::new(),
        }
    }

    pub fn key_dtype(&self) -> DataType {
        self.key_dtype
    }

    /// Insert a key/value pair. Duplicate keys extend the existing value
    /// list; the dispatcher never feeds duplicates in normal operation.
    pub fn insert(&mut self, key: &str, value: &str) {
        if let Some(split) = self.root.insert(key, value) {
            let old_root = std::mem::take(&mut self.root);
            self.root = Node {
                keys: vec![split.pivot],
                entries: Vec::new(),
                children: vec![old_root, split.right],
            };
        }
        let dtype = self.key_dtype;
        let pos = self
            .sorted_keys
            .partition_point(|k| compare_keys(k, key, dtype) == Ordering::Less);
        self.sorted_keys.insert(pos, key.to_string());
    }

    /// The value list for a key, or None when absent.
    pub fn retrieve(&self, key: &str) -> Option<&[String]> {
        let mut node = &self.root;
        while !node.is_leaf() {
            node = &node.children[node.route(key)];
        }
        node.keys
            .iter()
            .position(|k| k == key)
            .map(|i| node.entries[i].as_slice())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.retrieve(key).is_some()
    }

    /// All keys in ascending order under the key dtype.
    pub fn keys(&self) -> &[String] {
        &self.sorted_keys
    }

    pub fn len(&self) -> usize {
        self.sorted_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_keys.is_empty()
    }

    /// Number of levels, counting the root.
    pub fn height(&self) -> usize {
        let mut node = &self.root;
        let mut h = 1;
        while !node.is_leaf() {
            node = &node.children[0];
            h += 1;
        }
        h
    }

    /// Keys satisfying a condition, ascending. `=v` consults the tree;
    /// the range forms walk the sorted key list.
    pub fn matching_keys(&self, cond: &Condition) -> Vec<String> {
        let dtype = self.key_dtype;
        match cond {
            Condition::Eq(v) => {
                if self.contains(v) {
                    vec![v.clone()]
                } else {
                    Vec::new()
                }
            }
            Condition::Lt(v) => self
                .sorted_keys
                .iter()
                .filter(|k| compare_keys(k, v, dtype) == Ordering::Less)
                .cloned()
                .collect(),
            Condition::Gt(v) => self
                .sorted_keys
                .iter()
                .filter(|k| compare_keys(k, v, dtype) == Ordering::Greater)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tree_with(keys: &[&str], dtype: DataType) -> BPlusTree {
        let mut tree = BPlusTree::new(dtype);
        for (i, k) in keys.iter().enumerate() {
            tree.insert(k, &format!("records1.txt:1:{}", i + 1));
        }
        tree
    }

    #[test]
    fn test_insert_and_retrieve() {
        let tree = tree_with(&["bob", "alice", "carol"], DataType::Str);
        assert_eq!(tree.retrieve("alice").unwrap(), ["records1.txt:1:2"]);
        assert_eq!(tree.retrieve("bob").unwrap(), ["records1.txt:1:1"]);
        assert!(tree.retrieve("dave").is_none());
        assert_eq!(tree.keys(), ["alice", "bob", "carol"]);
    }

    #[test]
    fn test_split_promotes_pivot() {
        // Four keys force the first leaf split.
        let tree = tree_with(&["a", "b", "c", "d"], DataType::Str);
        assert_eq!(tree.height(), 2);
        for k in ["a", "b", "c", "d"] {
            assert!(tree.contains(k), "lost {} after split", k);
        }
        assert_eq!(tree.keys(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_cascading_splits_stay_consistent() {
        // Enough keys to overflow interior nodes and grow past two levels.
        let keys: Vec<String> = (0..200).map(|i| format!("k{:03}", i)).collect();
        let mut tree = BPlusTree::new(DataType::Str);
        for k in &keys {
            tree.insert(k, &format!("v-{}", k));
        }
        assert!(tree.height() >= 3);
        assert_eq!(tree.len(), keys.len());
        for k in &keys {
            assert_eq!(tree.retrieve(k).unwrap(), [format!("v-{}", k)]);
        }
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(tree.keys(), &sorted[..]);
    }

    #[test]
    fn test_descending_inserts() {
        let keys: Vec<String> = (0..50).rev().map(|i| format!("k{:02}", i)).collect();
        let mut tree = BPlusTree::new(DataType::Str);
        for k in &keys {
            tree.insert(k, "v");
        }
        for k in &keys {
            assert!(tree.contains(k));
        }
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(tree.keys(), &sorted[..]);
    }

    #[test]
    fn test_int_keys_sort_numerically() {
        let tree = tree_with(&["10", "9", "100", "2"], DataType::Int);
        assert_eq!(tree.keys(), ["2", "9", "10", "100"]);

        // The same keys as strings sort byte-wise.
        let tree = tree_with(&["10", "9", "100", "2"], DataType::Str);
        assert_eq!(tree.keys(), ["10", "100", "2", "9"]);
    }

    #[test]
    fn test_duplicate_keys_extend_value_list() {
        let mut tree = BPlusTree::new(DataType::Str);
        tree.insert("alice", "v1");
        tree.insert("alice", "v2");
        assert_eq!(tree.retrieve("alice").unwrap(), ["v1", "v2"]);
    }

    #[test]
    fn test_condition_parsing() {
        assert_eq!(
            "=carol".parse::<Condition>().unwrap(),
            Condition::Eq("carol".to_string())
        );
        assert_eq!(
            "<30".parse::<Condition>().unwrap(),
            Condition::Lt("30".to_string())
        );
        assert_eq!(
            ">alice".parse::<Condition>().unwrap(),
            Condition::Gt("alice".to_string())
        );
        assert!("30".parse::<Condition>().is_err());
        assert!("=".parse::<Condition>().is_err());
        assert!("".parse::<Condition>().is_err());
    }

    #[test]
    fn test_matching_keys_str() {
        let tree = tree_with(&["alice", "bob", "carol"], DataType::Str);
        assert_eq!(
            tree.matching_keys(&"=bob".parse().unwrap()),
            vec!["bob".to_string()]
        );
        assert!(tree.matching_keys(&"=dave".parse().unwrap()).is_empty());
        assert_eq!(
            tree.matching_keys(&">alice".parse().unwrap()),
            vec!["bob".to_string(), "carol".to_string()]
        );
        assert_eq!(
            tree.matching_keys(&"<carol".parse().unwrap()),
            vec!["alice".to_string(), "bob".to_string()]
        );
    }

    #[test]
    fn test_matching_keys_int() {
        let tree = tree_with(&["5", "40", "300"], DataType::Int);
        // Strictly less / strictly greater, compared as integers.
        assert_eq!(
            tree.matching_keys(&"<300".parse().unwrap()),
            vec!["5".to_string(), "40".to_string()]
        );
        assert_eq!(
            tree.matching_keys(&">5".parse().unwrap()),
            vec!["40".to_string(), "300".to_string()]
        );
        assert!(tree.matching_keys(&">300".parse().unwrap()).is_empty());
    }
}
