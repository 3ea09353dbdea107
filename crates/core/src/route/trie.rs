use modroute_api::{ExtensionKey, RouteMatch};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

/// A file bound to a route node. Never modified once inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppBinding {
    pub path: PathBuf,
    pub module: String,
    pub route_prefix: String,
    pub extension: ExtensionKey,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNode {
    route_prefix: String,
    depth: usize,
    /// At most one binding per extension key, in insertion order.
    bindings: Vec<AppBinding>,
    children: BTreeMap<String, RouteNode>,
}

impl RouteNode {
    fn root() -> Self {
        Self {
            route_prefix: "/".to_string(),
            depth: 0,
            bindings: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn bindings(&self) -> &[AppBinding] {
        &self.bindings
    }

    pub fn child(&self, segment: &str) -> Option<&RouteNode> {
        self.children.get(segment)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &RouteNode)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn binding(&self, key: &ExtensionKey) -> Option<&AppBinding> {
        self.bindings.iter().find(|b| &b.extension == key)
    }

    fn child_or_insert(&mut self, segment: &str) -> &mut RouteNode {
        let route_prefix = if self.route_prefix == "/" {
            format!("/{segment}")
        } else {
            format!("{}/{segment}", self.route_prefix)
        };
        let depth = self.depth + 1;
        self.children
            .entry(segment.to_string())
            .or_insert_with(|| RouteNode {
                route_prefix,
                depth,
                bindings: Vec::new(),
                children: BTreeMap::new(),
            })
    }

    /// Bind `path` under `extension` unless the slot is taken.
    fn bind(&mut self, path: PathBuf, module: &str, extension: ExtensionKey) -> bool {
        if self.binding(&extension).is_some() {
            return false;
        }
        self.bindings.push(AppBinding {
            path,
            module: module.to_string(),
            route_prefix: self.route_prefix.clone(),
            extension,
            depth: self.depth,
        });
        true
    }

    /// Pick the binding answering `requested`, falling back to the
    /// extension-less one. With no requested extension any binding will do,
    /// but its extension is then reported as unknown.
    fn select(&self, requested: &str) -> Option<(&AppBinding, Option<ExtensionKey>)> {
        let key = ExtensionKey::from_extension(requested);
        if let Some(binding) = self.binding(&key) {
            return Some((binding, Some(key)));
        }
        if let Some(binding) = self.binding(&ExtensionKey::Default) {
            return Some((binding, Some(ExtensionKey::Default)));
        }
        if requested.is_empty() {
            return self.bindings.first().map(|binding| (binding, None));
        }
        None
    }
}

/// Tree of request path segments built from module directory scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTrie {
    root: RouteNode,
    suffix: String,
    index: String,
}

impl RouteTrie {
    /// Empty trie for files ending in `suffix`, with `index` as the stem that
    /// binds to its own directory.
    pub fn new(suffix: &str, index: &str) -> Self {
        Self {
            root: RouteNode::root(),
            suffix: suffix.to_string(),
            index: index.to_string(),
        }
    }

    pub fn root(&self) -> &RouteNode {
        &self.root
    }

    /// Insert one scanned file given its path relative to the module root.
    ///
    /// Returns `false` if an earlier module already holds the slot.
    pub fn insert(&mut self, module: &str, relative: &[String], path: PathBuf) -> bool {
        let Some((file_name, dirs)) = relative.split_last() else {
            return false;
        };

        let mut node = &mut self.root;
        for segment in dirs {
            node = node.child_or_insert(segment);
        }

        let stem = file_name
            .strip_suffix(self.suffix.as_str())
            .unwrap_or(file_name);
        if stem == self.index {
            return node.bind(path, module, ExtensionKey::Default);
        }

        let (name, extension) = match stem.rsplit_once('.') {
            Some((name, ext)) if !name.is_empty() && !ext.is_empty() => {
                (name, ExtensionKey::from_extension(ext))
            }
            _ => (stem, ExtensionKey::Default),
        };
        node.child_or_insert(name).bind(path, module, extension)
    }

    /// Match request segments against the trie.
    ///
    /// Descends one segment per level while a child matches (with
    /// `extension` stripped from the segment when present). The first
    /// segment without a matching child, unless it is empty or the index
    /// stem, starts the remainder.
    pub fn resolve(&self, segments: Vec<String>, extension: &str) -> Option<RouteMatch> {
        let mut segments = VecDeque::from(segments);
        let mut node = &self.root;

        while let Some(segment) = segments.pop_front() {
            let key = if !extension.is_empty() && segment.ends_with(extension) {
                &segment[..segment.len() - extension.len()]
            } else {
                segment.as_str()
            };
            if let Some(child) = node.child(key) {
                node = child;
                continue;
            }
            if !segment.is_empty() && segment != self.index {
                segments.push_front(segment);
            }
            break;
        }

        let (binding, ext) = node.select(extension)?;
        Some(RouteMatch {
            path: binding.path.clone(),
            module: binding.module.clone(),
            route: binding.route_prefix.clone(),
            ext,
            depth: binding.depth,
            remainder: segments.into(),
        })
    }

    /// Every binding, parents before children.
    pub fn walk(&self) -> Vec<&AppBinding> {
        let mut out = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            out.extend(node.bindings.iter());
            // Reverse so children come out in key order
            stack.extend(node.children.values().rev());
        }
        out
    }

    pub fn binding_count(&self) -> usize {
        self.walk().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(path: &str) -> Vec<String> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    fn sample() -> RouteTrie {
        let mut trie = RouteTrie::new(".php", "index");
        for file in ["foo/bar.json.php", "foo/bar.php", "foo/boo.json.php", "index.php"] {
            trie.insert("app", &segments(file), PathBuf::from(format!("/app/{file}")));
        }
        trie
    }

    #[test]
    fn test_route_prefixes_and_depths() {
        let trie = sample();
        let foo = trie.root().child("foo").unwrap();
        let bar = foo.child("bar").unwrap();
        assert_eq!(trie.root().route_prefix(), "/");
        assert_eq!(foo.route_prefix(), "/foo");
        assert_eq!(bar.route_prefix(), "/foo/bar");
        assert_eq!(bar.depth(), 2);
        assert_eq!(bar.bindings().len(), 2);
    }

    #[test]
    fn test_first_binding_wins() {
        let mut trie = RouteTrie::new(".php", "index");
        assert!(trie.insert("high", &segments("page.php"), PathBuf::from("/high/page.php")));
        assert!(!trie.insert("low", &segments("page.php"), PathBuf::from("/low/page.php")));

        let found = trie.resolve(segments("page"), "").unwrap();
        assert_eq!(found.module, "high");
    }

    #[test]
    fn test_extension_negotiation() {
        let trie = sample();

        let plain = trie.resolve(segments("foo/bar"), "").unwrap();
        assert_eq!(plain.path, PathBuf::from("/app/foo/bar.php"));
        assert_eq!(plain.ext, Some(ExtensionKey::Default));

        let json = trie.resolve(segments("foo/bar"), ".json").unwrap();
        assert_eq!(json.path, PathBuf::from("/app/foo/bar.json.php"));

        assert_eq!(trie.resolve(segments("foo/boo"), ".xml"), None);

        let only = trie.resolve(segments("foo/boo"), "").unwrap();
        assert_eq!(only.path, PathBuf::from("/app/foo/boo.json.php"));
        assert_eq!(only.ext, None);
    }

    #[test]
    fn test_extension_is_stripped_from_segment() {
        let trie = sample();
        let found = trie.resolve(segments("foo/bar.json"), ".json").unwrap();
        assert_eq!(found.path, PathBuf::from("/app/foo/bar.json.php"));
        assert!(found.remainder.is_empty());
    }

    #[test]
    fn test_remainder_after_deepest_match() {
        let trie = sample();
        let found = trie.resolve(segments("foo/bar/baz/qux"), "").unwrap();
        assert_eq!(found.path, PathBuf::from("/app/foo/bar.php"));
        assert_eq!(found.route, "/foo/bar");
        assert_eq!(found.remainder, vec!["baz", "qux"]);
    }

    #[test]
    fn test_unmatched_top_level_falls_back_to_index() {
        let trie = sample();
        let found = trie.resolve(segments("missing"), "").unwrap();
        assert_eq!(found.path, PathBuf::from("/app/index.php"));
        assert_eq!(found.route, "/");
        assert_eq!(found.remainder, vec!["missing"]);
    }

    #[test]
    fn test_literal_index_segment_is_consumed() {
        let trie = sample();
        let found = trie.resolve(segments("index"), "").unwrap();
        assert_eq!(found.path, PathBuf::from("/app/index.php"));
        assert!(found.remainder.is_empty());
    }

    #[test]
    fn test_directory_without_binding_is_not_found() {
        let mut trie = RouteTrie::new(".php", "index");
        trie.insert("app", &segments("admin/users.php"), PathBuf::from("/app/admin/users.php"));
        // Descent into "admin" commits; it has no binding of its own
        assert_eq!(trie.resolve(segments("admin/settings"), ""), None);
    }

    #[test]
    fn test_walk_lists_parents_first() {
        let trie = sample();
        let routes: Vec<&str> = trie.walk().iter().map(|b| b.route_prefix.as_str()).collect();
        assert_eq!(routes, vec!["/", "/foo/bar", "/foo/bar", "/foo/boo"]);
        assert_eq!(trie.binding_count(), 4);
    }
}
