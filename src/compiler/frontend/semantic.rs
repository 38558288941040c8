//! Semantic analysis: template registration and import resolution

use crate::compiler::frontend::ast::{ComponentNode, Node, Program};
use crate::compiler::frontend::parse_source;
use crate::compiler::middle_end::registry::ComponentRegistry;
use crate::error::{CompilerError, Result};
use crate::utils::resolve_import_path;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves imports into a shared registry. Failures on individual imports
/// are recorded as warnings and never abort the compile.
pub struct SemanticAnalyzer<'r> {
    registry: &'r mut ComponentRegistry,
    base_dir: PathBuf,
    search_paths: Vec<PathBuf>,
    warnings: Vec<String>,
    imports_processed: usize,
}

impl<'r> SemanticAnalyzer<'r> {
    pub fn new(registry: &'r mut ComponentRegistry, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            base_dir: base_dir.into(),
            search_paths: Vec::new(),
            warnings: Vec::new(),
            imports_processed: 0,
        }
    }

    /// Extra directories tried when an import is not found next to the importing file
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn imports_processed(&self) -> usize {
        self.imports_processed
    }

    /// Analyze the root program. `visited` should already hold the root file's
    /// canonical path when the program came from disk.
    pub fn analyze(&mut self, program: &Program, visited: &mut HashSet<PathBuf>) -> Result<()> {
        let base_dir = self.base_dir.clone();
        self.process_imports(program, &base_dir, visited);

        // Local definitions win over unprefixed imports of the same name
        for definition in program.definitions() {
            if let Some(name) = &definition.name {
                self.registry.register(name.clone(), definition.clone());
            }
        }

        Ok(())
    }

    fn process_imports(&mut self, program: &Program, dir: &Path, visited: &mut HashSet<PathBuf>) {
        for (path, alias) in program.imports() {
            if let Err(err) = self.process_import(path, alias, dir, visited) {
                let message = err.to_string();
                log::warn!("Skipping import: {}", message);
                self.warnings.push(message);
            }
        }
    }

    fn process_import(
        &mut self,
        import_path: &str,
        alias: Option<&str>,
        dir: &Path,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let resolved = self.locate(import_path, dir).ok_or_else(|| {
            CompilerError::import(import_path, "file not found")
        })?;
        let canonical = fs::canonicalize(&resolved)
            .map_err(|e| CompilerError::import(import_path, e.to_string()))?;

        if visited.contains(&canonical) {
            log::debug!("Import '{}' already processed, skipping", canonical.display());
            return Ok(());
        }
        visited.insert(canonical.clone());

        let source = fs::read_to_string(&canonical)
            .map_err(|e| CompilerError::import(import_path, e.to_string()))?;

        // Parse against a scratch copy so the file's private templates stay private
        let mut scratch = self.registry.clone();
        let imported = parse_source(&source, &canonical.to_string_lossy(), &mut scratch)
            .map_err(|e| CompilerError::import(import_path, e.to_string()))?;
        self.imports_processed += 1;

        let import_dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dir.to_path_buf());
        self.process_imports(&imported, &import_dir, visited);

        let prefix = alias.or_else(|| imported.package());
        let exported: Vec<&ComponentNode> = imported
            .definitions()
            .filter(|definition| definition.is_exported)
            .collect();
        let sibling_names: HashSet<&str> = exported
            .iter()
            .filter_map(|definition| definition.name.as_deref())
            .collect();

        for definition in &exported {
            let Some(name) = definition.name.as_deref() else {
                continue;
            };
            let mut template = (*definition).clone();
            let qualified = match prefix {
                Some(prefix) => {
                    qualify_siblings(&mut template.children, &sibling_names, prefix);
                    format!("{}.{}", prefix, name)
                }
                None => name.to_string(),
            };
            log::debug!("Registering imported template '{}'", qualified);
            self.registry.register(qualified, template);
        }

        Ok(())
    }

    fn locate(&self, import_path: &str, dir: &Path) -> Option<PathBuf> {
        std::iter::once(dir)
            .chain(self.search_paths.iter().map(PathBuf::as_path))
            .map(|base| resolve_import_path(base, import_path))
            .find(|candidate| candidate.is_file())
    }
}

/// Rewrite unresolved references to exported siblings into their qualified names
fn qualify_siblings(children: &mut [Node], siblings: &HashSet<&str>, prefix: &str) {
    for child in children {
        match child {
            Node::Component(node) => {
                if node.template.is_none() && siblings.contains(node.type_name.as_str()) {
                    node.type_name = format!("{}.{}", prefix, node.type_name);
                }
                qualify_siblings(&mut node.children, siblings, prefix);
            }
            Node::Conditional(cond) => {
                qualify_siblings(&mut cond.then_branch, siblings, prefix);
                if let Some(else_branch) = cond.else_branch.as_mut() {
                    qualify_siblings(else_branch, siblings, prefix);
                }
            }
            Node::For(for_node) => qualify_siblings(&mut for_node.body, siblings, prefix),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn analyze_file(dir: &Path, file: &str) -> (ComponentRegistry, Vec<String>, usize) {
        let path = dir.join(file);
        let source = fs::read_to_string(&path).unwrap();
        let mut registry = ComponentRegistry::new();
        let program = parse_source(&source, file, &mut registry).unwrap();

        let mut visited = HashSet::new();
        visited.insert(fs::canonicalize(&path).unwrap());

        let mut analyzer = SemanticAnalyzer::new(&mut registry, dir);
        analyzer.analyze(&program, &mut visited).unwrap();
        let warnings = analyzer.warnings().to_vec();
        let processed = analyzer.imports_processed();
        (registry, warnings, processed)
    }

    #[test]
    fn test_alias_prefix_and_export_gate() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("widgets.nota"),
            "export Item Button { color: blue }\nItem Secret { color: black }",
        )
        .unwrap();
        fs::write(dir.path().join("main.nota"), "import widgets as w\nApp { w.Button { } }").unwrap();

        let (registry, warnings, processed) = analyze_file(dir.path(), "main.nota");
        assert!(warnings.is_empty());
        assert_eq!(processed, 1);
        assert!(registry.contains("w.Button"));
        assert!(!registry.contains("Button"));
        assert!(!registry.contains("Secret"));
        assert!(!registry.contains("w.Secret"));
    }

    #[test]
    fn test_package_prefix_and_nested_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("ui/forms")).unwrap();
        fs::write(
            dir.path().join("ui/forms/input.nota"),
            "package forms\nexport Item Field { height: 30 }",
        )
        .unwrap();
        fs::write(dir.path().join("main.nota"), "import ui.forms.input\nApp { }").unwrap();

        let (registry, _, _) = analyze_file(dir.path(), "main.nota");
        assert!(registry.contains("forms.Field"));
    }

    #[test]
    fn test_unprefixed_import() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("card.nota"), "export Item Card { }").unwrap();
        fs::write(dir.path().join("main.nota"), "import \"card.nota\"\nApp { }").unwrap();

        let (registry, _, _) = analyze_file(dir.path(), "main.nota");
        assert!(registry.contains("Card"));
    }

    #[test]
    fn test_import_cycle_terminates_and_registers_once() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.nota"),
            "package a\nimport b\nexport Item Alpha { }",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.nota"),
            "package b\nimport a\nexport Item Beta { }",
        )
        .unwrap();
        fs::write(dir.path().join("main.nota"), "import a\nimport b\nApp { }").unwrap();

        let (registry, warnings, processed) = analyze_file(dir.path(), "main.nota");
        assert!(warnings.is_empty());
        assert_eq!(processed, 2);

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names.iter().filter(|n| **n == "a.Alpha").count(), 1);
        assert_eq!(names.iter().filter(|n| **n == "b.Beta").count(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_self_import_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.nota"), "import main\nexport Item Local { }\nApp { }").unwrap();

        let (registry, warnings, processed) = analyze_file(dir.path(), "main.nota");
        assert!(warnings.is_empty());
        assert_eq!(processed, 0);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Local"]);
    }

    #[test]
    fn test_missing_and_broken_imports_are_warnings() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.nota"), "export Item Oops { width 10 }").unwrap();
        fs::write(dir.path().join("good.nota"), "export Item Fine { }").unwrap();
        fs::write(
            dir.path().join("main.nota"),
            "import missing\nimport broken\nimport good\nApp { }",
        )
        .unwrap();

        let (registry, warnings, _) = analyze_file(dir.path(), "main.nota");
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("missing"));
        assert!(warnings[1].contains("broken"));
        assert!(registry.contains("Fine"));
    }

    #[test]
    fn test_sibling_references_are_qualified() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("kit.nota"),
            "export Item Panel { Badge { } }\nexport Item Badge { color: red }",
        )
        .unwrap();
        fs::write(dir.path().join("main.nota"), "import kit as k\nApp { }").unwrap();

        let (registry, _, _) = analyze_file(dir.path(), "main.nota");
        let panel = registry.lookup("k.Panel").unwrap();
        let child = match &panel.children[0] {
            Node::Component(node) => node,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(child.type_name, "k.Badge");
    }

    #[test]
    fn test_search_paths() {
        let dir = TempDir::new().unwrap();
        let lib = TempDir::new().unwrap();
        fs::write(lib.path().join("shared.nota"), "export Item Shared { }").unwrap();
        fs::write(dir.path().join("main.nota"), "import shared as s\nApp { }").unwrap();

        let mut registry = ComponentRegistry::new();
        let program = parse_source("import shared as s\nApp { }", "main.nota", &mut registry).unwrap();
        let mut visited = HashSet::new();
        let mut analyzer = SemanticAnalyzer::new(&mut registry, dir.path())
            .with_search_paths(vec![lib.path().to_path_buf()]);
        analyzer.analyze(&program, &mut visited).unwrap();
        assert!(registry.contains("s.Shared"));
    }
}
