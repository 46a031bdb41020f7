use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::markdown::Documentation;

/// Module information reported by `go list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Module {
    /// Module path, the import-path prefix shared by its packages.
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub main: bool,
}

/// One discovered package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Package {
    /// Directory containing the package sources.
    #[serde(default)]
    pub dir: PathBuf,
    /// Unique key within a corpus.
    pub import_path: String,
    #[serde(default)]
    pub name: String,
    /// Package doc comment as reported by discovery, replaced by analysis.
    #[serde(default)]
    pub doc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<Module>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    /// Import path of the nearest enclosing package, set by the tree builder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_import_path: Option<String>,
    /// Import paths of direct children, in discovery order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_packages: Vec<String>,

    /// Filled in by the analysis phase.
    #[serde(skip_deserializing)]
    pub declarations: Declarations,
    #[serde(skip_deserializing)]
    pub documentation: Documentation,
}

impl Package {
    /// Creates a package with just an import path and module root.
    pub fn new(import_path: impl Into<String>, module_path: impl Into<String>) -> Self {
        let import_path = import_path.into();
        let name = import_path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            import_path,
            name,
            module: Some(Module {
                path: module_path.into(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Root path of the enclosing module, empty outside module mode.
    pub fn module_path(&self) -> &str {
        self.module.as_ref().map(|m| m.path.as_str()).unwrap_or("")
    }

    /// Whether this package is the module root itself.
    pub fn is_module_root(&self) -> bool {
        self.import_path == self.module_path()
    }

    /// Final path segment, used in the sidebar.
    pub fn short_name(&self) -> &str {
        self.import_path.rsplit('/').next().unwrap_or(&self.import_path)
    }
}

/// Packages keyed by import path, in discovery order.
pub type PackageIndex = IndexMap<String, Package>;

/// Declarations found in a package's sources.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Declarations {
    /// Name from the `package` clause.
    pub name: String,
    /// Package doc comment, preferring `doc.go`.
    pub doc: String,
    pub filenames: Vec<String>,
    /// Constant groups not associated with a type.
    pub consts: Vec<ValueDoc>,
    /// Variable groups not associated with a type.
    pub vars: Vec<ValueDoc>,
    pub types: Vec<TypeDoc>,
    /// Package-level functions not attached to a type.
    pub funcs: Vec<FuncDoc>,
    /// `Example` and `Example_suffix` functions from test files.
    pub examples: Vec<ExampleDoc>,
}

impl Declarations {
    pub fn find_type(&self, name: &str) -> Option<&TypeDoc> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn find_type_mut(&mut self, name: &str) -> Option<&mut TypeDoc> {
        self.types.iter_mut().find(|t| t.name == name)
    }
}

/// A `const` or `var` declaration, grouped as written.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValueDoc {
    /// Declared names in source order.
    pub names: Vec<String>,
    pub doc: String,
    pub documentation: Documentation,
    /// Declaration source text.
    pub decl: String,
}

impl ValueDoc {
    /// A group is shown when any of its names is exported.
    pub fn exported(&self) -> bool {
        self.names.iter().any(|name| is_exported(name))
    }
}

/// A runnable example taken from an `Example*` function in a test file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExampleDoc {
    /// Function name, e.g. `ExampleClient_Do_retry`.
    pub name: String,
    /// Lower-case suffix distinguishing several examples of one item.
    pub suffix: String,
    pub doc: String,
    /// Body without the enclosing braces or the output comment.
    pub code: String,
    /// Expected output from a trailing `// Output:` comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Output order is not checked.
    pub unordered: bool,
}

/// Shape of a type declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Struct,
    Interface,
    #[default]
    Other,
}

/// A documented type declaration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeDoc {
    pub name: String,
    pub kind: TypeKind,
    pub doc: String,
    pub documentation: Documentation,
    /// Declaration source text.
    pub decl: String,
    /// Constant groups whose values all have this type.
    pub consts: Vec<ValueDoc>,
    pub vars: Vec<ValueDoc>,
    /// Functions returning this type.
    pub funcs: Vec<FuncDoc>,
    /// Methods with this type as receiver.
    pub methods: Vec<FuncDoc>,
    pub examples: Vec<ExampleDoc>,
}

impl TypeDoc {
    pub fn exported(&self) -> bool {
        is_exported(&self.name)
    }

    /// Constructors then methods.
    pub fn all_funcs(&self) -> impl Iterator<Item = &FuncDoc> {
        self.funcs.iter().chain(self.methods.iter())
    }

    pub fn all_funcs_mut(&mut self) -> impl Iterator<Item = &mut FuncDoc> {
        self.funcs.iter_mut().chain(self.methods.iter_mut())
    }
}

/// A documented function or method.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FuncDoc {
    pub name: String,
    /// Receiver type expression, e.g. `*Client`, for methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recv: Option<String>,
    pub doc: String,
    pub documentation: Documentation,
    /// Declaration line without the body.
    pub signature: String,
    pub examples: Vec<ExampleDoc>,
}

impl FuncDoc {
    pub fn exported(&self) -> bool {
        is_exported(&self.name)
    }
}

/// Go visibility rule: exported names start with an uppercase letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_decodes_go_list_keys() {
        let json = r#"{
            "Dir": "/src/app/a",
            "ImportPath": "example.com/app/a",
            "Name": "a",
            "Doc": "Package a does things.",
            "Module": {"Path": "example.com/app", "Main": true},
            "Imports": ["fmt"],
            "GoFiles": ["a.go"]
        }"#;
        let pkg: Package = serde_json::from_str(json).unwrap();
        assert_eq!(pkg.import_path, "example.com/app/a");
        assert_eq!(pkg.module_path(), "example.com/app");
        assert!(!pkg.is_module_root());
        assert_eq!(pkg.imports, vec!["fmt".to_string()]);
        assert!(pkg.parent_import_path.is_none());
    }

    #[test]
    fn test_is_exported() {
        assert!(is_exported("Client"));
        assert!(!is_exported("client"));
        assert!(!is_exported("_x"));
        assert!(!is_exported(""));
    }

    #[test]
    fn test_value_group_exported_if_any_name_is() {
        let group = ValueDoc {
            names: vec!["maxRetries".into(), "DefaultTimeout".into()],
            ..Default::default()
        };
        assert!(group.exported());
        let private = ValueDoc {
            names: vec!["limit".into()],
            ..Default::default()
        };
        assert!(!private.exported());
        assert!(!ValueDoc::default().exported());
    }

    #[test]
    fn test_short_name() {
        let pkg = Package::new("example.com/app/a/b", "example.com/app");
        assert_eq!(pkg.short_name(), "b");
        assert_eq!(pkg.name, "b");
    }
}
